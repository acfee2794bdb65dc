//! display and character generator memory addressing

use crate::{Command, Geometry};

/// DDRAM start address of every row
///
/// row 2 continues row 0 and row 3 continues row 1, four row panels are two
/// two-row controllers sharing one address space
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// number of CGRAM glyph slots
pub const GLYPH_SLOTS: u8 = 8;

/// one user defined 5x8 character, one byte per pixel row, top row first
///
/// only the low 5 bits of each row are shown
pub type Glyph = [u8; 8];

/// DDRAM address of (column, row), `None` when the position is rejected
///
/// a position is rejected when the row or column exceeds the configured
/// geometry or the row has no start address.
/// the column is compared to the visible width only, the result isn't clamped
/// to the per-row memory window, keeping `column` inside the controller's
/// memory is up to the caller
pub fn ddram_address(geometry: Geometry, column: u8, row: u8) -> Option<u8> {
    if row > geometry.rows || column > geometry.columns {
        return None;
    }
    ROW_OFFSETS
        .get(row as usize)
        .map(|offset| offset.wrapping_add(column))
}

/// set DDRAM address instruction for (column, row)
pub fn set_cursor_instruction(geometry: Geometry, column: u8, row: u8) -> Option<u8> {
    ddram_address(geometry, column, row).map(|addr| Command::SetDDRamAddr as u8 | addr)
}

/// set CGRAM address instruction pointing at the first row of `slot`
pub fn cgram_address(slot: u8) -> Option<u8> {
    if slot >= GLYPH_SLOTS {
        return None;
    }
    Some(Command::SetCGRamAddr as u8 + slot * 8)
}
