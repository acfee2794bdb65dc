use core::fmt::Debug;
use embedded_io::ErrorKind;

/// errors of the strict `try_*` operations and of the byte sinks
///
/// the plain operations only fail on pin errors, out of range arguments are
/// silently ignored there
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LcdError<E> {
    #[error("pin error: {0:?}")]
    Pin(E),
    #[error("cursor position ({column}, {row}) is outside the display")]
    CursorOutOfRange { column: u8, row: u8 },
    #[error("glyph slot {slot} is not in 0..=7")]
    GlyphSlotOutOfRange { slot: u8 },
}

impl<E> From<E> for LcdError<E> {
    fn from(e: E) -> Self {
        LcdError::Pin(e)
    }
}

impl<E: Debug> embedded_io::Error for LcdError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            LcdError::Pin(_) => ErrorKind::Other,
            LcdError::CursorOutOfRange { .. } | LcdError::GlyphSlotOutOfRange { .. } => ErrorKind::InvalidInput,
        }
    }
}

/// keeps pin errors, drops range errors
pub(crate) fn ignore_out_of_range<E>(result: Result<(), LcdError<E>>) -> Result<(), E> {
    match result {
        Err(LcdError::Pin(e)) => Err(e),
        _ => Ok(())
    }
}
