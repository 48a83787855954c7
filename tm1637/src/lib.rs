#![no_std]

#[cfg(test)]
extern crate std;

mod bus;
mod config;
mod font;

use core::marker::PhantomData;

use embedded_hal_1::digital::OutputPin;

pub use bus::*;
pub use config::*;
pub use font::{digit_segments, BLANK_SEGMENTS, DECIMAL_POINT, DIGIT_SEGMENTS, MINUS_SEGMENTS};

/// Build a [`Tm1637`] bit-banging the bus on the given pins, the way most boards are wired up.
///
/// `intensity` is 0 (off) to 8 (brightest), `digit_count` is the number of digits on the display.
/// Out of range values are clamped.  The display is initialized and blank when this returns.
pub fn create<Clk: OutputPin, Dio: OutputPin>(
    clock: Clk,
    dio: Dio,
    intensity: u8,
    digit_count: u8,
) -> Tm1637<BitBangingBusDriver<Clk, Dio>> {
    Tm1637::builder()
        .with_config(
            Config::new()
                .with_intensity(intensity)
                .with_digit_count(digit_count),
        )
        .with_bit_banging_driver(clock, dio)
        .build()
}

pub struct Tm1637Builder {
    config: Config,
}

impl Tm1637Builder {
    /// Replace the whole [`Config`] at once
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// See [`Config::with_intensity`]
    pub fn intensity(mut self, intensity: u8) -> Self {
        self.config = self.config.with_intensity(intensity);
        self
    }

    /// See [`Config::with_digit_count`]
    pub fn digit_count(mut self, digit_count: u8) -> Self {
        self.config = self.config.with_digit_count(digit_count);
        self
    }

    /// See [`Config::with_blank_leading_zeros`]
    pub fn blank_leading_zeros(mut self, blank: bool) -> Self {
        self.config = self.config.with_blank_leading_zeros(blank);
        self
    }

    /// Use an arbitrary [`BusDriver`] implementation; nothing more needs to be specified!
    pub fn with_bus_driver<D: BusDriver>(self, driver: D) -> Tm1637Builder3<D> {
        Tm1637Builder3 {
            config: self.config,
            driver,
        }
    }

    /// Use an arbitrary [`Timer`] implementation with the bit-banging driver.
    pub fn with_timer<T: Timer>(self) -> Tm1637Builder1<T> {
        Tm1637Builder1 {
            config: self.config,
            _timer: PhantomData,
        }
    }

    /// Use the bit-banging driver with no delays between pin writes
    pub fn with_bit_banging_driver<Clk: OutputPin, Dio: OutputPin>(
        self,
        clock: Clk,
        dio: Dio,
    ) -> Tm1637Builder2<Clk, Dio, NoDelay> {
        self.with_timer::<NoDelay>().with_bit_banging_driver(clock, dio)
    }

    #[cfg(feature = "embassy-time")]
    /// Use the [`Timer`] implementation built using `embassy-time`
    pub fn with_embassy_timer(self) -> Tm1637Builder1<EmbassyTimeTimer> {
        self.with_timer::<EmbassyTimeTimer>()
    }
}

pub struct Tm1637Builder1<T: Timer> {
    config: Config,
    _timer: PhantomData<T>,
}

impl<T: Timer> Tm1637Builder1<T> {
    /// Use the bit-banging driver, with any pair of `embedded-hal` output pins
    pub fn with_bit_banging_driver<Clk: OutputPin, Dio: OutputPin>(
        self,
        clock: Clk,
        dio: Dio,
    ) -> Tm1637Builder2<Clk, Dio, T> {
        Tm1637Builder2 {
            config: self.config,
            driver: BitBangingBusDriver::new(clock, dio),
        }
    }

    /// Use a bit-banging driver talking to the specified Embassy RP HAL pins
    #[cfg(feature = "embassy-rp")]
    pub fn with_embassy_rp_pins<
        'a,
        ClockPin: embassy_rp::gpio::Pin,
        DioPin: embassy_rp::gpio::Pin,
    >(
        self,
        clock: ClockPin,
        dio: DioPin,
    ) -> Tm1637Builder2<EmbassyRpPin<'a, ClockPin>, EmbassyRpPin<'a, DioPin>, T> {
        self.with_bit_banging_driver(EmbassyRpPin::new(clock), EmbassyRpPin::new(dio))
    }
}

pub struct Tm1637Builder2<Clk: OutputPin, Dio: OutputPin, T: Timer> {
    config: Config,
    driver: BitBangingBusDriver<Clk, Dio, T>,
}

impl<Clk: OutputPin, Dio: OutputPin, T: Timer> Tm1637Builder2<Clk, Dio, T> {
    /// Construct and initialize the [`Tm1637`] instance using the bit-banging driver.
    pub fn build(self) -> Tm1637<BitBangingBusDriver<Clk, Dio, T>> {
        Tm1637::new(self.driver, self.config)
    }
}

pub struct Tm1637Builder3<D: BusDriver> {
    config: Config,
    driver: D,
}

impl<D: BusDriver> Tm1637Builder3<D> {
    /// Construct and initialize the [`Tm1637`] instance using the selected driver.
    pub fn build(self) -> Tm1637<D> {
        Tm1637::new(self.driver, self.config)
    }
}

/// Driver for TM1637 7-segment display controllers.
///
/// The implementation is generalized over the implementation of the underlying bus protocol
/// driver, behind the [`BusDriver`] trait.  [`BitBangingBusDriver`] works with any pair of
/// `embedded-hal` output pins.
///
/// A `Tm1637` only exists in the initialized state: every way of constructing one resets the
/// lines and clears the display before handing it over.
///
/// Positions are numbered from 1 (the left-most digit) to the digit count.  Positions past the
/// end wrap around, so on a 4 digit display position 5 is the same as position 1.
///
/// The driver keeps a copy of the segments last written to each digit, which is what lets
/// [`Self::show_decimal_point`] change a single segment without redrawing the digit.  It's never
/// read back from the chip (the chip can't do that), so all writes must go through this driver.
///
/// ```
/// # #[cfg(all(feature = "embassy-time", feature = "embassy-rp"))]
/// # {
/// let p = embassy_rp::init(Default::default());
/// let mut display = tm1637::Tm1637::builder()
///     .digit_count(4)
///     .intensity(5)
///     .with_embassy_timer()
///     .with_embassy_rp_pins(p.PIN_6, p.PIN_7)
///     .build();
/// display.show_decimal_number(1234);
/// # }
/// ```
pub struct Tm1637<Driver> {
    driver: Driver,
    segments: [u8; MAX_DIGITS],
    digit_count: u8,
    brightness: u8,
    display_on: bool,
    blank_leading_zeros: bool,
}

impl Tm1637<()> {
    /// Return a builder pattern implementation to ease some of the type parameter complexity
    /// around creating the bus driver and timer.
    pub fn builder() -> Tm1637Builder {
        Tm1637Builder {
            config: Config::default(),
        }
    }
}

impl<Driver: BusDriver> Tm1637<Driver> {
    /// Take over the chip behind `driver` and initialize it according to `config`.
    pub fn new(driver: Driver, config: Config) -> Self {
        let mut me = Self {
            driver,
            segments: [0; MAX_DIGITS],
            digit_count: config.digit_count(),
            brightness: config.brightness(),
            display_on: config.display_on(),
            blank_leading_zeros: config.blank_leading_zeros(),
        };

        me.initialize();

        me
    }

    /// Reset the bus lines and blank every digit.
    fn initialize(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "initializing TM1637 with {=u8} digits, brightness {=u8}, on={=bool}",
            self.digit_count,
            self.brightness,
            self.display_on
        );

        self.driver.idle();
        self.clear_all();
    }

    /// Set the intensity from 0 (off) to 8 (brightest).
    ///
    /// Anything above 8 is treated as 8.  An intensity of 0 is the same as [`Self::turn_off`] and
    /// leaves the brightness as it was.
    pub fn set_intensity(&mut self, intensity: u8) {
        if intensity < 1 {
            self.turn_off();
            return;
        }

        self.display_on = true;
        self.brightness = intensity.min(MAX_INTENSITY) - 1;
        self.write_display_control();
    }

    /// Light exactly the segments in `segments` at `position`.
    ///
    /// `segments` is a bitmask in which the least significant 7 bits correspond to segments A to G
    /// on the display, and the most significant bit corresponds to the decimal point.
    pub fn light_segments_at(&mut self, segments: u8, position: u8) {
        let index = self.index_of(position);
        self.write_digit(index, segments);
    }

    /// Show `digit` at `position`.  Values 10 to 15 are shown as the hex digits `A` to `F`, and
    /// `digit` is taken mod 16.
    pub fn show_digit_at(&mut self, digit: u8, position: u8) {
        self.light_segments_at(font::digit_segments(digit), position);
    }

    /// Show `value` in decimal, right aligned.
    ///
    /// A negative value puts a minus sign in the left-most position and the digits in the rest.
    /// If the value has more digits than fit, only the low-order digits are shown.
    pub fn show_decimal_number(&mut self, value: i32) {
        self.show_number(value, 10);
    }

    /// Show `value` in hex, right aligned, laid out just like [`Self::show_decimal_number`].
    pub fn show_hex_number(&mut self, value: i32) {
        self.show_number(value, 16);
    }

    /// Turn the decimal point at `position` on or off, leaving the rest of the digit alone.
    pub fn show_decimal_point(&mut self, position: u8, show: bool) {
        let index = self.index_of(position);

        let segments = if show {
            self.segments[index] | DECIMAL_POINT
        } else {
            self.segments[index] & !DECIMAL_POINT
        };

        self.write_digit(index, segments);
    }

    /// Blank every digit on the display
    pub fn clear_all(&mut self) {
        for index in 0..self.digit_count as usize {
            self.write_digit(index, BLANK_SEGMENTS);
        }
    }

    /// Turn the display on, showing whatever was on it before it was turned off.
    pub fn turn_on(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::debug!("display on");

        self.display_on = true;
        self.write_display_control();
    }

    /// Turn the display off.  The chip keeps the digits, so [`Self::turn_on`] brings them back.
    pub fn turn_off(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::debug!("display off");

        self.display_on = false;
        self.write_display_control();
    }

    /// The segments last written to each digit, left-most first
    pub fn segments(&self) -> &[u8] {
        &self.segments[..self.digit_count as usize]
    }

    pub fn digit_count(&self) -> u8 {
        self.digit_count
    }

    /// The chip's brightness register value, 0 to 7.  Kept while the display is off.
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// The intensity as passed to [`Self::set_intensity`], 0 if the display is off
    pub fn intensity(&self) -> u8 {
        if self.display_on {
            self.brightness + 1
        } else {
            0
        }
    }

    pub fn is_on(&self) -> bool {
        self.display_on
    }

    /// Convert a 1-based position into an index into the segment buffer, wrapping past either end.
    fn index_of(&self, position: u8) -> usize {
        (i16::from(position) - 1).rem_euclid(i16::from(self.digit_count)) as usize
    }

    fn show_number(&mut self, value: i32, radix: u32) {
        let mut first_position = 1;

        if value < 0 {
            self.light_segments_at(MINUS_SEGMENTS, 1);
            first_position = 2;
        }

        let mut rendered = [BLANK_SEGMENTS; MAX_DIGITS];
        let rendered = &mut rendered[..(self.digit_count - (first_position - 1)) as usize];
        font::render_number(
            value.unsigned_abs(),
            radix,
            self.blank_leading_zeros,
            rendered,
        );

        // Right-most digit first
        for (offset, segments) in rendered.iter().enumerate().rev() {
            self.light_segments_at(*segments, first_position + offset as u8);
        }
    }

    /// Write one digit's segments to the chip and to the local copy, then refresh the display
    /// control so the chip shows it.
    fn write_digit(&mut self, index: usize, segments: u8) {
        self.segments[index] = segments;

        self.apply_write_command(WriteCommand::SetIncrementalAddressing);
        self.apply_write_command(WriteCommand::WriteSingleChar {
            display_number: index as u8,
            segment_mask: segments,
        });
        self.apply_write_command(WriteCommand::DisplayControl {
            on: self.display_on,
            brightness: self.brightness,
        });
    }

    fn write_display_control(&mut self) {
        self.apply_write_command(WriteCommand::SetIncrementalAddressing);
        self.apply_write_command(WriteCommand::DisplayControl {
            on: self.display_on,
            brightness: self.brightness,
        });
    }

    /// Apply the command to the controller
    fn apply_write_command(&mut self, command: WriteCommand) {
        let (command_byte, data_bytes) = command.encode();

        #[cfg(feature = "defmt")]
        defmt::trace!("command byte = {=u8:x}", command_byte);

        if let Some(data_bytes) = data_bytes {
            self.driver.send_command_write_data(command_byte, data_bytes);
        } else {
            self.driver.send_command(command_byte);
        }
    }
}

/// Represents the write commands sent to the TM1637 as Rust enums for greater readability.
#[derive(Debug)]
enum WriteCommand {
    /// Data command: write to the display registers, incrementing the address after each byte.
    SetIncrementalAddressing,

    /// Address command followed by the segment mask for that digit.
    WriteSingleChar {
        /// The 0-based digit to write to
        display_number: u8,

        /// The bit mask controlling which segments on the display are illuminated
        segment_mask: u8,
    },

    /// Display control command: on/off and brightness
    DisplayControl {
        on: bool,

        /// Brightness, in a range from 0 to 7.  Larger values are taken mod 8.
        brightness: u8,
    },
}

impl WriteCommand {
    /// Convert this command into the appropriate byte sequence to send to the controller.
    ///
    /// Return value is a tuple consisting of the following:
    ///
    /// - Command byte to send to controller
    /// - (Optional) slice of data bytes to send along with command byte
    ///
    /// The command byte and data bytes (if any) are sent together, in a single start/stop frame.
    fn encode(&self) -> (u8, Option<&[u8]>) {
        match self {
            WriteCommand::SetIncrementalAddressing => (0b0100_0000, None),
            WriteCommand::WriteSingleChar {
                display_number,
                segment_mask,
            } => {
                #[cfg(feature = "defmt")]
                defmt::debug_assert!((*display_number as usize) < MAX_DIGITS);
                (
                    0b1100_0000 | (display_number & 0b0000_0111),
                    Some(core::slice::from_ref(segment_mask)),
                )
            }
            WriteCommand::DisplayControl { on, brightness } => {
                let on = if *on { 0b0000_1000 } else { 0 };
                (0b1000_0000 | on | (brightness & 0b0000_0111), None)
            }
        }
    }
}
