use embedded_hal::digital::OutputPin;
use crate::pin_state;

/// electrical width of the data bus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusWidth {
    /// D4..D7, a byte goes over as two nibbles
    FourLine,
    /// D0..D7, a byte goes over at once
    EightLine
}

impl BusWidth {
    /// values presented on the data lines for one protocol byte, one per enable pulse
    ///
    /// a four-line bus only looks at bits 7..4 of each frame, so the low nibble
    /// is moved up for the second frame
    pub fn frames(self, byte: u8) -> impl Iterator<Item = u8> {
        let (frames, len) = match self {
            BusWidth::FourLine => ([byte, byte << 4], 2),
            BusWidth::EightLine => ([byte, 0], 1)
        };
        frames.into_iter().take(len)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FourLineBus<
    D4: OutputPin,
    D5: OutputPin,
    D6: OutputPin,
    D7: OutputPin
> {
    pub d4: D4,
    pub d5: D5,
    pub d6: D6,
    pub d7: D7
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EightLineBus<
    D0: OutputPin,
    D1: OutputPin,
    D2: OutputPin,
    D3: OutputPin,
    D4: OutputPin,
    D5: OutputPin,
    D6: OutputPin,
    D7: OutputPin
> {
    pub d0: D0,
    pub d1: D1,
    pub d2: D2,
    pub d3: D3,
    pub d4: D4,
    pub d5: D5,
    pub d6: D6,
    pub d7: D7
}

/// data lines of one bus width
///
/// `E` is the error type every pin error converts into
pub trait Bus<E> {
    const WIDTH: BusWidth;

    /// drives every data line the bus owns from the matching bits of `frame`,
    /// a four-line bus takes bits 7..4
    fn write_frame(&mut self, frame: u8) -> Result<(), E>;

    /// drives only D7..D4 from bits 7..4 of `value`, whatever the width
    fn write_nibble(&mut self, value: u8) -> Result<(), E>;
}

impl<
    D4: OutputPin,
    D5: OutputPin,
    D6: OutputPin,
    D7: OutputPin,
    E: From<D4::Error> + From<D5::Error> + From<D6::Error> + From<D7::Error>
> Bus<E> for FourLineBus<D4, D5, D6, D7> {
    const WIDTH: BusWidth = BusWidth::FourLine;

    fn write_frame(&mut self, frame: u8) -> Result<(), E> {
        <Self as Bus<E>>::write_nibble(self, frame)
    }

    fn write_nibble(&mut self, value: u8) -> Result<(), E> {
        self.d7.set_state(pin_state(value & 0x80 != 0))?;
        self.d6.set_state(pin_state(value & 0x40 != 0))?;
        self.d5.set_state(pin_state(value & 0x20 != 0))?;
        self.d4.set_state(pin_state(value & 0x10 != 0))?;
        Ok(())
    }
}

impl<
    D0: OutputPin,
    D1: OutputPin,
    D2: OutputPin,
    D3: OutputPin,
    D4: OutputPin,
    D5: OutputPin,
    D6: OutputPin,
    D7: OutputPin,
    E:
        From<D0::Error> + From<D1::Error> + From<D2::Error> + From<D3::Error> +
        From<D4::Error> + From<D5::Error> + From<D6::Error> + From<D7::Error>
> Bus<E> for EightLineBus<D0, D1, D2, D3, D4, D5, D6, D7> {
    const WIDTH: BusWidth = BusWidth::EightLine;

    fn write_frame(&mut self, frame: u8) -> Result<(), E> {
        <Self as Bus<E>>::write_nibble(self, frame)?;
        self.d3.set_state(pin_state(frame & 0x08 != 0))?;
        self.d2.set_state(pin_state(frame & 0x04 != 0))?;
        self.d1.set_state(pin_state(frame & 0x02 != 0))?;
        self.d0.set_state(pin_state(frame & 0x01 != 0))?;
        Ok(())
    }

    fn write_nibble(&mut self, value: u8) -> Result<(), E> {
        self.d7.set_state(pin_state(value & 0x80 != 0))?;
        self.d6.set_state(pin_state(value & 0x40 != 0))?;
        self.d5.set_state(pin_state(value & 0x20 != 0))?;
        self.d4.set_state(pin_state(value & 0x10 != 0))?;
        Ok(())
    }
}

/// every line the driver owns
///
/// pins must already be outputs, the driver never changes their direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LcdPins<
    EN: OutputPin,
    RS: OutputPin,
    B
> {
    pub en: EN,
    pub rs: RS,
    pub bus: B
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_line_frames_are_high_then_low_nibble() {
        let mut frames = BusWidth::FourLine.frames(0xA5);
        assert_eq!(frames.next(), Some(0xA5));
        assert_eq!(frames.next(), Some(0x50));
        assert_eq!(frames.next(), None);
    }

    #[test]
    fn eight_line_sends_the_byte_once() {
        let frames = BusWidth::EightLine.frames(0x3C);
        assert_eq!(frames.count(), 1);
        assert_eq!(BusWidth::EightLine.frames(0x3C).next(), Some(0x3C));
    }
}
