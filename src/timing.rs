/// waits the driver uses instead of polling the busy flag
///
/// the defaults are on the safe side of the datasheet, raise them for slow
/// compatible controllers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// data lines and enable line settle time, also the enable pulse width
    pub settle_us: u32,
    /// time the controller needs to execute an ordinary instruction or data write
    pub instruction_us: u32,
    /// clear display and return home touch the whole DDRAM
    pub clear_ms: u32,
    /// power-up wait before the first wake-up nibble
    pub startup_ms: u32,
    /// wait after the first two wake-up nibbles, the third one only gets
    /// `instruction_us`
    pub wake_up_ms: [u32; 2],
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_us: 5,
            instruction_us: 70,
            clear_ms: 20,
            startup_ms: 100,
            wake_up_ms: [20, 5],
        }
    }
}
