#![no_std]

//! embedded-hal driver for HD44780 character LCDs wired to plain GPIO lines
//!
//! the display is driven open-loop: the RW line is not used, so the busy flag
//! is never read and every instruction is followed by a fixed wait instead.
//! a wiring fault or a dead controller can't be told apart from a working one,
//! it just shows up as a blank or garbled panel.
//! if your controller is slower than the datasheet (eg. some ks0066 clones)
//! pass a longer [`Timing`] to `Lcd::with_timing`
//!
//! both bus widths are supported, the width is fixed by the bus type you pass in
//! ([`FourLineBus`] or [`EightLineBus`])
//!
//! example
//! ```rust,ignore
//! let mut lcd = Lcd::<_, _, _, _, Infallible>::new(
//!     LcdPins {
//!         en: pins.d7.into_output(),
//!         rs: pins.d6.into_output(),
//!         bus: FourLineBus {
//!             d4: pins.d8.into_output(),
//!             d5: pins.d9.into_output(),
//!             d6: pins.d10.into_output(),
//!             d7: pins.d11.into_output()
//!         }
//!     },
//!     delay,
//!     Geometry::LCD1602
//! )?;
//!
//! lcd.set_cursor(3, 0)?;
//! lcd.print("first line")?;
//! lcd.set_cursor(3, 1)?;
//! lcd.write_glyph(0)?;
//! ```

#[cfg(test)]
extern crate std;

pub mod address;
pub mod blocking;
mod bus;
mod error;
pub mod nonblocking;
pub mod protocol;
mod timing;

pub use address::{Glyph, ROW_OFFSETS};
pub use bus::{Bus, BusWidth, EightLineBus, FourLineBus, LcdPins};
pub use error::LcdError;
pub use timing::Timing;

use embedded_hal::digital::PinState;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    ClearDisplay   = 0b00000001,
    ReturnHome     = 0b00000010,
    EntryModeSet   = 0b00000100,
    DisplayControl = 0b00001000,
    CursorShift    = 0b00010000,
    FunctionSet    = 0b00100000,
    SetCGRamAddr   = 0b01000000,
    SetDDRamAddr   = 0b10000000
}

/// first byte of the power-up sequence, only its upper nibble reaches the controller
pub const WAKE_UP: u8 = 0b00110000;

const FULL_WIDTH_BUS: u8 = 0b00010000;
const TWO_ROWS: u8 = 0b00001000;
const FONT_5X8: u8 = 0b00000000;

const SHIFT_DISPLAY: u8 = 0b1000;
const SHIFT_RIGHT: u8 = 0b0100;

/// shifts the whole display window, the stored characters stay where they are
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftDirection {
    Left  = Command::CursorShift as u8 | SHIFT_DISPLAY,
    Right = Command::CursorShift as u8 | SHIFT_DISPLAY | SHIFT_RIGHT
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IncrementMode {
    Decremental = 0b00,
    Incremental = 0b10,
}

/// panel size, trusted as given
///
/// one-row panels and the 5x10 font aren't supported, four row panels are
/// driven as two two-row halves like the controller expects
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    pub rows: u8,
    pub columns: u8
}

impl Geometry {
    pub const LCD1602: Geometry = Geometry { rows: 2, columns: 16 };
    pub const LCD2004: Geometry = Geometry { rows: 4, columns: 20 };
}

/// function set instruction for the given bus width
///
/// always two-row mode with the 5x8 font
pub const fn function_set(width: BusWidth) -> u8 {
    let data_length = match width {
        BusWidth::FourLine => 0,
        BusWidth::EightLine => FULL_WIDTH_BUS
    };
    Command::FunctionSet as u8 | data_length | TWO_ROWS | FONT_5X8
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayControl(u8);

impl DisplayControl {
    const DISPLAY: u8 = 0b100;
    const CURSOR: u8 = 0b010;
    const BLINK: u8 = 0b001;

    pub const fn new(display_on: bool, cursor: bool, blink: bool) -> Self {
        let mut v = 0;
        if display_on {
            v |= Self::DISPLAY;
        }
        if cursor {
            v |= Self::CURSOR;
        }
        if blink {
            v |= Self::BLINK;
        }
        Self(v)
    }

    pub fn set_display_on(&mut self, v: bool) {
        self.set(Self::DISPLAY, v);
    }

    pub fn set_cursor(&mut self, v: bool) {
        self.set(Self::CURSOR, v);
    }

    pub fn set_blink(&mut self, v: bool) {
        self.set(Self::BLINK, v);
    }

    fn set(&mut self, flag: u8, v: bool) {
        self.0 &= !flag;
        if v {
            self.0 |= flag;
        }
    }

    /// the complete display control instruction byte
    pub const fn instruction(self) -> u8 {
        Command::DisplayControl as u8 | self.0
    }
}

impl Default for DisplayControl {
    fn default() -> Self {
        Self::new(true, false, false)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EntryMode(u8);

impl EntryMode {
    pub fn set_increment_mode(&mut self, increment_mode: IncrementMode) {
        self.0 = (self.0 & !0b010) | increment_mode as u8;
    }

    pub fn set_scroll(&mut self, v: bool) {
        const FLAG: u8 = 0b001;
        self.0 &= !FLAG;
        if v {
            self.0 |= FLAG;
        }
    }

    pub const fn instruction(self) -> u8 {
        Command::EntryModeSet as u8 | self.0
    }
}

impl Default for EntryMode {
    fn default() -> Self {
        Self(IncrementMode::Incremental as u8)
    }
}

pub(crate) fn pin_state(v: bool) -> PinState {
    match v {
        true => PinState::High,
        false => PinState::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_set_per_width() {
        assert_eq!(function_set(BusWidth::FourLine), 0x28);
        assert_eq!(function_set(BusWidth::EightLine), 0x38);
    }

    #[test]
    fn display_control_bytes() {
        assert_eq!(DisplayControl::new(false, false, false).instruction(), 0x08);
        assert_eq!(DisplayControl::default().instruction(), 0x0C);
        assert_eq!(DisplayControl::new(true, true, false).instruction(), 0x0E);
        assert_eq!(DisplayControl::new(true, true, true).instruction(), 0x0F);

        let mut dc = DisplayControl::new(true, true, true);
        dc.set_blink(false);
        dc.set_cursor(false);
        assert_eq!(dc, DisplayControl::default());
    }

    #[test]
    fn entry_mode_bytes() {
        assert_eq!(EntryMode::default().instruction(), 0x06);

        let mut entry = EntryMode::default();
        entry.set_scroll(true);
        entry.set_increment_mode(IncrementMode::Decremental);
        assert_eq!(entry.instruction(), 0x05);
    }

    #[test]
    fn shift_bytes() {
        assert_eq!(ShiftDirection::Left as u8, 0x18);
        assert_eq!(ShiftDirection::Right as u8, 0x1C);
    }
}
