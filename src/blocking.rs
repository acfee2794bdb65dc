use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_io::{ErrorType, Write};
use crate::address::{cgram_address, set_cursor_instruction};
use crate::error::ignore_out_of_range;
use crate::protocol::{init_sequence, InitStep, Register};
use crate::{pin_state, Bus, Command, DisplayControl, EntryMode, Geometry, Glyph, LcdError, LcdPins, ShiftDirection, Timing};

/// a display session driven with blocking waits
///
/// every call returns only after the controller had time to execute it,
/// waits under a millisecond are busy-waits of the delay provider
pub struct Lcd<
    EN: OutputPin,
    RS: OutputPin,
    B: Bus<E>,
    DELAY: DelayNs,
    E = Infallible
> {
    pins: LcdPins<EN, RS, B>,
    delay: DELAY,
    geometry: Geometry,
    timing: Timing,
    _error: PhantomData<E>
}

impl<
    EN: OutputPin,
    RS: OutputPin,
    B: Bus<E>,
    DELAY: DelayNs,
    E: From<EN::Error> + From<RS::Error>
> Lcd<EN, RS, B, DELAY, E> {
    /// runs the power-up sequence with the default [`Timing`]
    ///
    /// the display is left on, cleared, cursor hidden, address auto-increment
    pub fn new(pins: LcdPins<EN, RS, B>, delay: DELAY, geometry: Geometry) -> Result<Self, E> {
        Self::with_timing(pins, delay, geometry, Timing::default())
    }

    pub fn with_timing(pins: LcdPins<EN, RS, B>, delay: DELAY, geometry: Geometry, timing: Timing) -> Result<Self, E> {
        let mut v = Self {
            pins,
            delay,
            geometry,
            timing,
            _error: PhantomData
        };
        v.init()?;
        Ok(v)
    }

    fn init(&mut self) -> Result<(), E> {
        #[cfg(feature = "defmt")]
        defmt::debug!("lcd init, {} bus, {}", <B as Bus<E>>::WIDTH, self.geometry);

        self.pins.rs.set_low()?;
        self.pins.en.set_low()?;
        for step in init_sequence(<B as Bus<E>>::WIDTH, self.timing) {
            match step {
                InitStep::WaitMs(ms) => self.delay.delay_ms(ms),
                InitStep::WaitUs(us) => self.delay.delay_us(us),
                InitStep::Nibble(value) => self.send_nibble(value)?,
                InitStep::Instruction(byte) => self.command(byte)?
            }
        }
        Ok(())
    }

    fn pulse(&mut self) -> Result<(), E> {
        self.pins.en.set_high()?;
        self.delay.delay_us(self.timing.settle_us);
        self.pins.en.set_low()?;
        self.delay.delay_us(self.timing.settle_us);
        Ok(())
    }

    fn send(&mut self, byte: u8, register: Register) -> Result<(), E> {
        #[cfg(feature = "defmt")]
        defmt::trace!("send {=u8:#x} to {}", byte, register);

        self.pins.rs.set_state(pin_state(register.rs()))?;
        for frame in <B as Bus<E>>::WIDTH.frames(byte) {
            <B as Bus<E>>::write_frame(&mut self.pins.bus, frame)?;
            self.delay.delay_us(self.timing.settle_us);
            self.pulse()?;
        }
        self.delay.delay_us(self.timing.instruction_us);
        Ok(())
    }

    /// upper nibble only, a single pulse whatever the bus width
    fn send_nibble(&mut self, value: u8) -> Result<(), E> {
        self.pins.rs.set_low()?;
        <B as Bus<E>>::write_nibble(&mut self.pins.bus, value)?;
        self.delay.delay_us(self.timing.settle_us);
        self.pulse()?;
        self.delay.delay_us(self.timing.instruction_us);
        Ok(())
    }

    fn command(&mut self, command: u8) -> Result<(), E> {
        self.send(command, Register::Instruction)
    }

    /// writes one character code at the current address, the address moves on by one
    ///
    /// codes 0..=7 show the user defined glyphs
    pub fn write_byte(&mut self, c: u8) -> Result<(), E> {
        self.send(c, Register::Data)
    }

    /// writes `text` byte by byte from the current address
    ///
    /// each byte is sent as a character code as is, a non-ASCII char becomes
    /// several codes from the controller's own font table.
    /// nothing checks that the text fits on the row, past the visible window
    /// it lands in hidden memory or on another row
    pub fn print(&mut self, text: &str) -> Result<(), E> {
        for c in text.bytes() {
            self.write_byte(c)?;
        }
        Ok(())
    }

    /// blanks the display and moves the cursor to (0, 0)
    pub fn clear(&mut self) -> Result<(), E> {
        self.command(Command::ClearDisplay as u8)?;
        self.delay.delay_ms(self.timing.clear_ms);
        Ok(())
    }

    /// same as `set_cursor(0, 0)`
    pub fn home(&mut self) -> Result<(), E> {
        self.set_cursor(0, 0)
    }

    /// moves the cursor to (0, 0) and undoes any display shift
    pub fn return_home(&mut self) -> Result<(), E> {
        self.command(Command::ReturnHome as u8)?;
        self.delay.delay_ms(self.timing.clear_ms);
        Ok(())
    }

    /// moves the cursor, positions outside the geometry are ignored
    pub fn set_cursor(&mut self, column: u8, row: u8) -> Result<(), E> {
        ignore_out_of_range(self.try_set_cursor(column, row))
    }

    pub fn try_set_cursor(&mut self, column: u8, row: u8) -> Result<(), LcdError<E>> {
        let Some(instruction) = set_cursor_instruction(self.geometry, column, row) else {
            #[cfg(feature = "defmt")]
            defmt::debug!("cursor ({}, {}) outside {}", column, row, self.geometry);
            return Err(LcdError::CursorOutOfRange { column, row });
        };
        Ok(self.command(instruction)?)
    }

    /// stores `glyph` in CGRAM slot 0..=7, other slots are ignored
    ///
    /// the address counter is left in CGRAM, move the cursor before printing again
    pub fn define_glyph(&mut self, slot: u8, glyph: &Glyph) -> Result<(), E> {
        ignore_out_of_range(self.try_define_glyph(slot, glyph))
    }

    pub fn try_define_glyph(&mut self, slot: u8, glyph: &Glyph) -> Result<(), LcdError<E>> {
        let Some(address) = cgram_address(slot) else {
            #[cfg(feature = "defmt")]
            defmt::debug!("glyph slot {} rejected", slot);
            return Err(LcdError::GlyphSlotOutOfRange { slot });
        };
        self.command(address)?;
        for row in glyph {
            self.write_byte(*row)?;
        }
        Ok(())
    }

    /// shows the glyph stored in `slot` at the current address, other slots are ignored
    pub fn write_glyph(&mut self, slot: u8) -> Result<(), E> {
        ignore_out_of_range(self.try_write_glyph(slot))
    }

    pub fn try_write_glyph(&mut self, slot: u8) -> Result<(), LcdError<E>> {
        if cgram_address(slot).is_none() {
            #[cfg(feature = "defmt")]
            defmt::debug!("glyph slot {} rejected", slot);
            return Err(LcdError::GlyphSlotOutOfRange { slot });
        }
        Ok(self.write_byte(slot)?)
    }

    pub fn shift_left(&mut self) -> Result<(), E> {
        self.command(ShiftDirection::Left as u8)
    }

    pub fn shift_right(&mut self) -> Result<(), E> {
        self.command(ShiftDirection::Right as u8)
    }

    /// `true` shows a blinking cursor, `false` a steady one
    ///
    /// both leave the cursor visible, `set_blink(false)` sends the same byte
    /// as `set_cursor_visible(true)`
    pub fn set_blink(&mut self, blink: bool) -> Result<(), E> {
        self.set_display_control(DisplayControl::new(true, true, blink))
    }

    /// hiding the cursor also stops blinking, `set_cursor_visible(false)`
    /// sends the same byte as `set_display(true)`
    pub fn set_cursor_visible(&mut self, visible: bool) -> Result<(), E> {
        self.set_display_control(DisplayControl::new(true, visible, false))
    }

    /// the display memory is kept while off, the backlight isn't ours to switch
    pub fn set_display(&mut self, on: bool) -> Result<(), E> {
        self.set_display_control(DisplayControl::new(on, false, false))
    }

    pub fn set_display_control(&mut self, control: DisplayControl) -> Result<(), E> {
        self.command(control.instruction())
    }

    pub fn set_entry_mode(&mut self, entry: EntryMode) -> Result<(), E> {
        self.command(entry.instruction())
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// ends the session and hands the pins and the delay back
    pub fn release(self) -> (LcdPins<EN, RS, B>, DELAY) {
        (self.pins, self.delay)
    }
}

impl<
    EN: OutputPin,
    RS: OutputPin,
    B: Bus<E>,
    DELAY: DelayNs,
    E: From<EN::Error> + From<RS::Error> + core::fmt::Debug
> ErrorType for Lcd<EN, RS, B, DELAY, E> {
    type Error = LcdError<E>;
}

impl<
    EN: OutputPin,
    RS: OutputPin,
    B: Bus<E>,
    DELAY: DelayNs,
    E: From<EN::Error> + From<RS::Error> + core::fmt::Debug
> Write for Lcd<EN, RS, B, DELAY, E> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for x in buf {
            self.write_byte(*x)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<
    EN: OutputPin,
    RS: OutputPin,
    B: Bus<E>,
    DELAY: DelayNs,
    E: From<EN::Error> + From<RS::Error>
> core::fmt::Write for Lcd<EN, RS, B, DELAY, E> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.print(s).map_err(|_| core::fmt::Error)
    }
}
