//! A recording pin pair and a simulated TM1637 that decodes what was sent on them.
#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal_1::digital::{ErrorType, OutputPin};
use tm1637::{BitBangingBusDriver, Config, Tm1637};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    Clock,
    Dio,
}

use self::Line::{Clock, Dio};

pub type PinLog = Rc<RefCell<Vec<(Line, bool)>>>;

/// Mock GPIO pin which appends every write to a log shared with the other pin
pub struct RecordingPin {
    line: Line,
    log: PinLog,
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push((self.line, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push((self.line, true));
        Ok(())
    }
}

pub fn recording_pins() -> (RecordingPin, RecordingPin, PinLog) {
    let log = PinLog::default();
    let clock = RecordingPin {
        line: Clock,
        log: log.clone(),
    };
    let dio = RecordingPin {
        line: Dio,
        log: log.clone(),
    };

    (clock, dio, log)
}

const START: [(Line, bool); 2] = [(Dio, false), (Clock, false)];
const STOP: [(Line, bool); 3] = [(Dio, false), (Clock, true), (Dio, true)];
const CLOCK_PULSE: [(Line, bool); 2] = [(Clock, true), (Clock, false)];

/// Split a pin log into the bytes of each start/stop frame, panicking on anything that doesn't
/// follow the protocol exactly.
pub fn decode_frames(events: &[(Line, bool)]) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    let mut i = 0;

    while i < events.len() {
        assert_eq!(
            events.get(i..i + 2),
            Some(&START[..]),
            "expected start condition at event {i}"
        );
        i += 2;

        let mut frame = Vec::new();
        loop {
            // A DIO rising edge while CLK is high ends the frame; anything else is a data bit
            if events.get(i..i + 3) == Some(&STOP[..]) {
                i += 3;
                break;
            }

            let mut byte = 0u8;
            for bit in 0..8 {
                let (line, level) = events[i];
                assert_eq!(line, Dio, "expected data bit at event {i}");
                assert_eq!(
                    events.get(i + 1..i + 3),
                    Some(&CLOCK_PULSE[..]),
                    "expected clock pulse at event {}",
                    i + 1
                );
                if level {
                    byte |= 1 << bit;
                }
                i += 3;
            }

            assert_eq!(
                events.get(i..i + 2),
                Some(&CLOCK_PULSE[..]),
                "expected ack clock pulse at event {i}"
            );
            i += 2;

            frame.push(byte);
        }

        frames.push(frame);
    }

    frames
}

/// Just enough of a TM1637 to check what a sequence of frames would leave on the display
#[derive(Debug, Default)]
pub struct SimulatedChip {
    pub ram: [u8; 6],
    pub display_on: bool,
    pub brightness: u8,
    fixed_addressing: bool,
}

impl SimulatedChip {
    pub fn apply(&mut self, frame: &[u8]) {
        let command = frame[0];
        match command & 0b1100_0000 {
            0b0100_0000 => {
                assert_eq!(command & 0b0000_0011, 0, "only display writes are expected");
                self.fixed_addressing = command & 0b0000_0100 != 0;
            }
            0b1100_0000 => {
                let mut address = (command & 0b0000_0111) as usize;
                for byte in &frame[1..] {
                    self.ram[address] = *byte;
                    if !self.fixed_addressing {
                        address += 1;
                    }
                }
            }
            0b1000_0000 => {
                assert_eq!(frame.len(), 1);
                self.display_on = command & 0b0000_1000 != 0;
                self.brightness = command & 0b0000_0111;
            }
            _ => panic!("unexpected command byte {command:#04x}"),
        }
    }

    /// What the first `digit_count` digits show, accounting for the display being off
    pub fn visible(&self, digit_count: usize) -> Vec<u8> {
        if self.display_on {
            self.ram[..digit_count].to_vec()
        } else {
            vec![0; digit_count]
        }
    }
}

pub type TestDisplay = Tm1637<BitBangingBusDriver<RecordingPin, RecordingPin>>;

/// A display wired to recording pins, with a simulated chip following along
pub struct Harness {
    pub display: TestDisplay,
    pub chip: SimulatedChip,
    log: PinLog,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        let (clock, dio, log) = recording_pins();
        let display = Tm1637::builder()
            .with_config(config)
            .with_bit_banging_driver(clock, dio)
            .build();

        let mut harness = Self {
            display,
            chip: SimulatedChip::default(),
            log,
        };

        // Construction idles the lines before anything else
        let idle = harness.log.borrow_mut().drain(..2).collect::<Vec<_>>();
        assert_eq!(idle, [(Clock, false), (Dio, false)]);

        harness.sync();
        harness
    }

    pub fn with_digits(digit_count: u8) -> Self {
        Self::new(Config::new().with_digit_count(digit_count))
    }

    /// Decode the frames sent since the last call and apply them to the simulated chip.
    pub fn sync(&mut self) -> Vec<Vec<u8>> {
        let events: Vec<_> = self.log.borrow_mut().drain(..).collect();
        let frames = decode_frames(&events);
        for frame in &frames {
            self.chip.apply(frame);
        }
        frames
    }

    pub fn visible(&self) -> Vec<u8> {
        self.chip.visible(self.display.digit_count() as usize)
    }
}
