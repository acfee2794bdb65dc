//! Recording pins and delays sharing one event log, so the order of pin
//! transitions across lines and the waits between them can be checked.

#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use hd44780_parallel::{EightLineBus, FourLineBus, LcdPins};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    Rs,
    En,
    D(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Set(Line, bool),
    DelayNs(u32),
    DelayUs(u32),
    DelayMs(u32),
}

/// What the controller sees on a rising enable edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Latch {
    pub rs: bool,
    /// D7..D0, lines never driven read as low
    pub bits: u8,
}

#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<Event>>>);

impl Log {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn pin(&self, line: Line) -> RecordingPin {
        RecordingPin { line, log: self.clone() }
    }

    pub fn delay(&self) -> RecordingDelay {
        RecordingDelay { log: self.clone() }
    }

    /// Line levels at every rising enable edge, in order.
    ///
    /// Levels are tracked over the whole log, clearing it forgets them, so
    /// only call this on logs that start before the lines were first driven
    /// or that drive every line again.
    pub fn latches(&self) -> Vec<Latch> {
        let mut rs = false;
        let mut bits = 0u8;
        let mut latches = Vec::new();
        for event in self.events() {
            match event {
                Event::Set(Line::Rs, level) => rs = level,
                Event::Set(Line::D(n), level) => {
                    if level {
                        bits |= 1 << n;
                    } else {
                        bits &= !(1 << n);
                    }
                }
                Event::Set(Line::En, true) => latches.push(Latch { rs, bits }),
                _ => {}
            }
        }
        latches
    }

    /// Bytes sent over a four-line bus, pairing up nibble latches.
    pub fn four_line_bytes(&self) -> Vec<(bool, u8)> {
        self.latches()
            .chunks(2)
            .map(|pair| {
                assert_eq!(pair.len(), 2, "odd number of nibbles");
                assert_eq!(pair[0].rs, pair[1].rs, "RS changed between nibbles");
                (pair[0].rs, (pair[0].bits & 0xF0) | (pair[1].bits >> 4))
            })
            .collect()
    }

    /// Bytes sent over an eight-line bus.
    pub fn eight_line_bytes(&self) -> Vec<(bool, u8)> {
        self.latches().into_iter().map(|l| (l.rs, l.bits)).collect()
    }

    pub fn delays_ms(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::DelayMs(ms) => Some(ms),
                _ => None,
            })
            .collect()
    }

    pub fn four_line_pins(
        &self,
    ) -> LcdPins<RecordingPin, RecordingPin, FourLineBus<RecordingPin, RecordingPin, RecordingPin, RecordingPin>> {
        LcdPins {
            en: self.pin(Line::En),
            rs: self.pin(Line::Rs),
            bus: FourLineBus {
                d4: self.pin(Line::D(4)),
                d5: self.pin(Line::D(5)),
                d6: self.pin(Line::D(6)),
                d7: self.pin(Line::D(7)),
            },
        }
    }

    #[allow(clippy::type_complexity)]
    pub fn eight_line_pins(
        &self,
    ) -> LcdPins<
        RecordingPin,
        RecordingPin,
        EightLineBus<
            RecordingPin,
            RecordingPin,
            RecordingPin,
            RecordingPin,
            RecordingPin,
            RecordingPin,
            RecordingPin,
            RecordingPin,
        >,
    > {
        LcdPins {
            en: self.pin(Line::En),
            rs: self.pin(Line::Rs),
            bus: EightLineBus {
                d0: self.pin(Line::D(0)),
                d1: self.pin(Line::D(1)),
                d2: self.pin(Line::D(2)),
                d3: self.pin(Line::D(3)),
                d4: self.pin(Line::D(4)),
                d5: self.pin(Line::D(5)),
                d6: self.pin(Line::D(6)),
                d7: self.pin(Line::D(7)),
            },
        }
    }
}

pub struct RecordingPin {
    line: Line,
    log: Log,
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.push(Event::Set(self.line, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.push(Event::Set(self.line, true));
        Ok(())
    }
}

pub struct RecordingDelay {
    log: Log,
}

impl embedded_hal::delay::DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.push(Event::DelayNs(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.log.push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.push(Event::DelayMs(ms));
    }
}

impl embedded_hal_async::delay::DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.log.push(Event::DelayNs(ns));
    }

    async fn delay_us(&mut self, us: u32) {
        self.log.push(Event::DelayUs(us));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.log.push(Event::DelayMs(ms));
    }
}

/// Events of one byte sent over a four-line bus with the default timing.
pub fn four_line_byte_events(byte: u8, rs: bool) -> Vec<Event> {
    let mut events = vec![Event::Set(Line::Rs, rs)];
    for nibble in [byte, byte << 4] {
        for n in (4..8).rev() {
            events.push(Event::Set(Line::D(n), nibble & (1 << n) != 0));
        }
        events.extend(pulse_events());
    }
    events.push(Event::DelayUs(70));
    events
}

/// Events of one byte sent over an eight-line bus with the default timing.
pub fn eight_line_byte_events(byte: u8, rs: bool) -> Vec<Event> {
    let mut events = vec![Event::Set(Line::Rs, rs)];
    for n in (0..8).rev() {
        events.push(Event::Set(Line::D(n), byte & (1 << n) != 0));
    }
    events.extend(pulse_events());
    events.push(Event::DelayUs(70));
    events
}

fn pulse_events() -> [Event; 5] {
    [
        Event::DelayUs(5),
        Event::Set(Line::En, true),
        Event::DelayUs(5),
        Event::Set(Line::En, false),
        Event::DelayUs(5),
    ]
}
