//! register selection and the power-up script shared by both drivers

use crate::{function_set, BusWidth, Command, DisplayControl, EntryMode, Timing, WAKE_UP};

/// which controller register a byte goes to, selected by the RS line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// RS low
    Instruction,
    /// RS high, character codes and glyph rows
    Data
}

impl Register {
    pub fn rs(self) -> bool {
        self == Register::Data
    }
}

/// one step of the power-up sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStep {
    WaitMs(u32),
    WaitUs(u32),
    /// instruction of which only the upper nibble is sent, with a single pulse
    Nibble(u8),
    Instruction(u8)
}

const MAX_STEPS: usize = 14;

/// the reset by instruction sequence
///
/// the controller powers up in 8-bit mode and may be anywhere in a nibble pair,
/// three wake-up nibbles get it into a known state before the width is set.
/// the order and the waits can't be changed without the controller losing
/// track of which nibble it is on
pub fn init_sequence(width: BusWidth, timing: Timing) -> impl Iterator<Item = InitStep> {
    let mut steps = [InitStep::WaitUs(0); MAX_STEPS];
    let mut len = 0;
    let mut push = |step| {
        steps[len] = step;
        len += 1;
    };

    push(InitStep::WaitMs(timing.startup_ms));
    for wait in timing.wake_up_ms {
        push(InitStep::Nibble(WAKE_UP));
        push(InitStep::WaitMs(wait));
    }
    push(InitStep::Nibble(WAKE_UP));
    push(InitStep::WaitUs(timing.instruction_us));
    if width == BusWidth::FourLine {
        push(InitStep::Nibble(Command::FunctionSet as u8));
    }
    push(InitStep::Instruction(function_set(width)));
    push(InitStep::Instruction(DisplayControl::new(false, false, false).instruction()));
    push(InitStep::Instruction(Command::ClearDisplay as u8));
    push(InitStep::WaitMs(timing.clear_ms));
    push(InitStep::Instruction(EntryMode::default().instruction()));
    push(InitStep::Instruction(DisplayControl::default().instruction()));

    steps.into_iter().take(len)
}
