use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{ErrorType, Write};
use crate::address::{cgram_address, set_cursor_instruction};
use crate::error::ignore_out_of_range;
use crate::protocol::{init_sequence, InitStep, Register};
use crate::{pin_state, Bus, Command, DisplayControl, EntryMode, Geometry, Glyph, LcdError, LcdPins, ShiftDirection, Timing};

/// a display session that awaits the waits
///
/// same operations and byte sequences as [`crate::blocking::Lcd`], pin levels
/// are still set synchronously, only the delays yield.
/// a future dropped half way leaves the controller in an unknown state,
/// construct a new `Lcd` to run the power-up sequence again
///
/// example
/// ```rust,ignore
/// pub struct EmbassyDelayNs;
///
/// impl DelayNs for EmbassyDelayNs {
///     async fn delay_ns(&mut self, ns: u32) {
///         embassy_time::Timer::after_micros(ns.div_ceil(1000) as u64).await;
///     }
/// }
///     let mut lcd = Lcd::<_, _, _, _, Infallible>::new(
///         LcdPins {
///             en: pins.d7.into_output(),
///             rs: pins.d6.into_output(),
///             bus: FourLineBus {
///                 d4: pins.d8.into_output(),
///                 d5: pins.d9.into_output(),
///                 d6: pins.d10.into_output(),
///                 d7: pins.d11.into_output()
///             }
///         },
///         EmbassyDelayNs,
///         Geometry::LCD1602
///     ).await.unwrap();
///
///     lcd.set_cursor(0, 1).await.unwrap();
///     lcd.write_all("second line".as_bytes()).await.unwrap();
/// ```
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
    pub async fn new(pins: LcdPins<EN, RS, B>, delay: DELAY, geometry: Geometry) -> Result<Self, E> {
        Self::with_timing(pins, delay, geometry, Timing::default()).await
    }

    pub async fn with_timing(pins: LcdPins<EN, RS, B>, delay: DELAY, geometry: Geometry, timing: Timing) -> Result<Self, E> {
        let mut v = Self {
            pins,
            delay,
            geometry,
            timing,
            _error: PhantomData
        };
        v.init().await?;
        Ok(v)
    }

    async fn init(&mut self) -> Result<(), E> {
        #[cfg(feature = "defmt")]
        defmt::debug!("lcd init, {} bus, {}", <B as Bus<E>>::WIDTH, self.geometry);

        self.pins.rs.set_low()?;
        self.pins.en.set_low()?;
        for step in init_sequence(<B as Bus<E>>::WIDTH, self.timing) {
            match step {
                InitStep::WaitMs(ms) => self.delay.delay_ms(ms).await,
                InitStep::WaitUs(us) => self.delay.delay_us(us).await,
                InitStep::Nibble(value) => self.send_nibble(value).await?,
                InitStep::Instruction(byte) => self.command(byte).await?
            }
        }
        Ok(())
    }

    async fn pulse(&mut self) -> Result<(), E> {
        self.pins.en.set_high()?;
        self.delay.delay_us(self.timing.settle_us).await;
        self.pins.en.set_low()?;
        self.delay.delay_us(self.timing.settle_us).await;
        Ok(())
    }

    async fn send(&mut self, byte: u8, register: Register) -> Result<(), E> {
        #[cfg(feature = "defmt")]
        defmt::trace!("send {=u8:#x} to {}", byte, register);

        self.pins.rs.set_state(pin_state(register.rs()))?;
        for frame in <B as Bus<E>>::WIDTH.frames(byte) {
            <B as Bus<E>>::write_frame(&mut self.pins.bus, frame)?;
            self.delay.delay_us(self.timing.settle_us).await;
            self.pulse().await?;
        }
        self.delay.delay_us(self.timing.instruction_us).await; //most instructions need 37us
        Ok(())
    }

    async fn send_nibble(&mut self, value: u8) -> Result<(), E> {
        self.pins.rs.set_low()?;
        <B as Bus<E>>::write_nibble(&mut self.pins.bus, value)?;
        self.delay.delay_us(self.timing.settle_us).await;
        self.pulse().await?;
        self.delay.delay_us(self.timing.instruction_us).await;
        Ok(())
    }

    async fn command(&mut self, command: u8) -> Result<(), E> {
        self.send(command, Register::Instruction).await
    }

    /// writes one character code at the current address, the address moves on by one
    ///
    /// codes 0..=7 show the user defined glyphs
    pub async fn write_byte(&mut self, c: u8) -> Result<(), E> {
        self.send(c, Register::Data).await
    }

    /// writes `text` byte by byte from the current address
    ///
    /// each byte is sent as a character code as is, a non-ASCII char becomes
    /// several codes from the controller's own font table.
    /// nothing checks that the text fits on the row
    pub async fn print(&mut self, text: &str) -> Result<(), E> {
        for c in text.bytes() {
            self.write_byte(c).await?;
        }
        Ok(())
    }

    /// blanks the display and moves the cursor to (0, 0)
    pub async fn clear(&mut self) -> Result<(), E> {
        self.command(Command::ClearDisplay as u8).await?;
        self.delay.delay_ms(self.timing.clear_ms).await;
        Ok(())
    }

    /// same as `set_cursor(0, 0)`
    pub async fn home(&mut self) -> Result<(), E> {
        self.set_cursor(0, 0).await
    }

    /// moves the cursor to (0, 0) and undoes any display shift
    pub async fn return_home(&mut self) -> Result<(), E> {
        self.command(Command::ReturnHome as u8).await?;
        self.delay.delay_ms(self.timing.clear_ms).await;
        Ok(())
    }

    /// moves the cursor, positions outside the geometry are ignored
    pub async fn set_cursor(&mut self, column: u8, row: u8) -> Result<(), E> {
        ignore_out_of_range(self.try_set_cursor(column, row).await)
    }

    pub async fn try_set_cursor(&mut self, column: u8, row: u8) -> Result<(), LcdError<E>> {
        let Some(instruction) = set_cursor_instruction(self.geometry, column, row) else {
            #[cfg(feature = "defmt")]
            defmt::debug!("cursor ({}, {}) outside {}", column, row, self.geometry);
            return Err(LcdError::CursorOutOfRange { column, row });
        };
        Ok(self.command(instruction).await?)
    }

    /// stores `glyph` in CGRAM slot 0..=7, other slots are ignored
    ///
    /// the address counter is left in CGRAM, move the cursor before printing again
    pub async fn define_glyph(&mut self, slot: u8, glyph: &Glyph) -> Result<(), E> {
        ignore_out_of_range(self.try_define_glyph(slot, glyph).await)
    }

    pub async fn try_define_glyph(&mut self, slot: u8, glyph: &Glyph) -> Result<(), LcdError<E>> {
        let Some(address) = cgram_address(slot) else {
            #[cfg(feature = "defmt")]
            defmt::debug!("glyph slot {} rejected", slot);
            return Err(LcdError::GlyphSlotOutOfRange { slot });
        };
        self.command(address).await?;
        for row in glyph {
            self.write_byte(*row).await?;
        }
        Ok(())
    }

    /// shows the glyph stored in `slot` at the current address, other slots are ignored
    pub async fn write_glyph(&mut self, slot: u8) -> Result<(), E> {
        ignore_out_of_range(self.try_write_glyph(slot).await)
    }

    pub async fn try_write_glyph(&mut self, slot: u8) -> Result<(), LcdError<E>> {
        if cgram_address(slot).is_none() {
            #[cfg(feature = "defmt")]
            defmt::debug!("glyph slot {} rejected", slot);
            return Err(LcdError::GlyphSlotOutOfRange { slot });
        }
        Ok(self.write_byte(slot).await?)
    }

    pub async fn shift_left(&mut self) -> Result<(), E> {
        self.command(ShiftDirection::Left as u8).await
    }

    pub async fn shift_right(&mut self) -> Result<(), E> {
        self.command(ShiftDirection::Right as u8).await
    }

    /// `true` shows a blinking cursor, `false` a steady one
    ///
    /// both leave the cursor visible, `set_blink(false)` sends the same byte
    /// as `set_cursor_visible(true)`
    pub async fn set_blink(&mut self, blink: bool) -> Result<(), E> {
        self.set_display_control(DisplayControl::new(true, true, blink)).await
    }

    /// hiding the cursor also stops blinking, `set_cursor_visible(false)`
    /// sends the same byte as `set_display(true)`
    pub async fn set_cursor_visible(&mut self, visible: bool) -> Result<(), E> {
        self.set_display_control(DisplayControl::new(true, visible, false)).await
    }

    /// the display memory is kept while off, the backlight isn't ours to switch
    pub async fn set_display(&mut self, on: bool) -> Result<(), E> {
        self.set_display_control(DisplayControl::new(on, false, false)).await
    }

    pub async fn set_display_control(&mut self, control: DisplayControl) -> Result<(), E> {
        self.command(control.instruction()).await
    }

    pub async fn set_entry_mode(&mut self, entry: EntryMode) -> Result<(), E> {
        self.command(entry.instruction()).await
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
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for x in buf {
            self.write_byte(*x).await?;
        }
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
