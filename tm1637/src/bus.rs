//! Module describing the [`BusDriver`] trait and the bit-banging implementation of the TM1637
//! two-wire bus.
//!
//! The TM1637 uses a two-wire bus that looks a lot like I2C (a start condition, bytes clocked out
//! on CLK with an acknowledge slot after each one, a stop condition), but it has no device
//! address, sends bits LSB first, and doesn't care what the ACK bit polarity would be in I2C.  So
//! an I2C peripheral can't be used and the bus has to be bit-banged on two GPIO pins.
//!
//! This crate only ever writes to the chip.  The ninth clock pulse after each byte is the slot in
//! which the chip pulls DIO low to acknowledge; we pulse the clock for it but never look at DIO.

use core::marker::PhantomData;

use embedded_hal_1::digital::{OutputPin, PinState};

/// This trait represents some low-level implementation of the TM1637 bus interface, likely in
/// terms of some platform-specific HAL.
///
/// [`crate::Tm1637`] only talks to the chip through this trait, so an alternative transport (PIO,
/// or something recording the traffic) can be swapped in without touching the display logic.
///
/// None of the methods can fail.  The protocol has no way to report a failed transfer back to us,
/// and a bad write just shows up as a garbled digit which the next write corrects.
pub trait BusDriver {
    /// Put both lines into their initial state: CLK low, then DIO low.
    fn idle(&mut self);

    /// Send a single command, with no payload, framed by a start and a stop condition.
    fn send_command(&mut self, b: u8);

    /// Send a command followed by data bytes, all inside a single start/stop frame.
    fn send_command_write_data(&mut self, b: u8, data: &[u8]);
}

/// Abstraction on platform-specific timers to pace the bus driver between pin writes.
///
/// The TM1637 is slow compared to the pin toggling speed of most MCUs it's paired with, but on
/// the small ones the latency of the pin write itself is enough, so the default [`NoDelay`] timer
/// inserts no wait at all.  If your MCU toggles pins faster than the chip can follow, use a timer
/// that actually waits.
pub trait Timer {
    /// Wait long enough for the chip to see the pin change that was just made.
    fn wait_clock_tick();
}

/// A [`Timer`] that doesn't wait; each pin write follows the previous one immediately.
pub struct NoDelay;

impl Timer for NoDelay {
    #[inline(always)]
    fn wait_clock_tick() {}
}

#[cfg(feature = "embassy-time")]
mod embassy_time_timer {
    use embassy_time::{block_for, Duration};

    /// Use a 1uS clock tick to ensure the TM1637 picks up the value
    const CLOCK_TICK: Duration = Duration::from_micros(1);

    /// [`super::Timer`] which busy-waits on the `embassy-time` clock.
    ///
    /// The bus is driven synchronously, so this blocks instead of yielding to the executor.
    pub struct EmbassyTimeTimer;

    impl super::Timer for EmbassyTimeTimer {
        fn wait_clock_tick() {
            block_for(CLOCK_TICK)
        }
    }
}

#[cfg(feature = "embassy-time")]
pub use embassy_time_timer::EmbassyTimeTimer;

/// Set a pin and discard the outcome.
///
/// Pin writes are treated as infallible; there is nothing the protocol could do with an error.
fn drive<P: OutputPin>(pin: &mut P, high: bool) {
    if pin.set_state(PinState::from(high)).is_err() {
        #[cfg(feature = "defmt")]
        defmt::warn!("TM1637 pin write failed; ignoring");
    }
}

/// Implementation of [`BusDriver`] which bit-bangs the protocol on any two
/// [`embedded_hal_1::digital::OutputPin`]s.
///
/// Works with any [`Timer`] implementation; [`NoDelay`] is used unless told otherwise.
pub struct BitBangingBusDriver<Clk: OutputPin, Dio: OutputPin, T: Timer = NoDelay> {
    clock: Clk,
    dio: Dio,
    _timer: PhantomData<T>,
}

impl<Clk: OutputPin, Dio: OutputPin, T: Timer> BitBangingBusDriver<Clk, Dio, T> {
    /// Take ownership of the pins.  They're left as they are until [`BusDriver::idle`] is called.
    pub fn new(clock: Clk, dio: Dio) -> Self {
        Self {
            clock,
            dio,
            _timer: PhantomData,
        }
    }

    /// Issue a start condition (DIO low, then CLK low) and return the [`Frame`] through which
    /// bytes are written.
    ///
    /// The stop condition is issued when the frame is stopped or dropped, so it's not possible to
    /// write bytes outside of a start/stop pair.
    pub fn start(&mut self) -> Frame<'_, Clk, Dio, T> {
        self.set_dio(false);
        self.set_clock(false);

        Frame { bus: self }
    }

    fn set_clock(&mut self, high: bool) {
        drive(&mut self.clock, high);
        T::wait_clock_tick();
    }

    fn set_dio(&mut self, high: bool) {
        drive(&mut self.dio, high);
        T::wait_clock_tick();
    }

    /// One low-high-low pulse on CLK.  The chip latches DIO on the rising edge.
    fn pulse_clock(&mut self) {
        self.set_clock(true);
        self.set_clock(false);
    }
}

impl<Clk: OutputPin, Dio: OutputPin, T: Timer> BusDriver for BitBangingBusDriver<Clk, Dio, T> {
    fn idle(&mut self) {
        self.set_clock(false);
        self.set_dio(false);
    }

    fn send_command(&mut self, b: u8) {
        let mut frame = self.start();
        frame.write_byte(b);
        frame.stop();
    }

    fn send_command_write_data(&mut self, b: u8, data: &[u8]) {
        #[cfg(feature = "defmt")]
        defmt::debug_assert!(!data.is_empty());

        let mut frame = self.start();
        frame.write_byte(b);
        for b in data {
            #[cfg(feature = "defmt")]
            defmt::trace!("data byte = {=u8:x}", b);
            frame.write_byte(*b);
        }
        frame.stop();
    }
}

/// A transmission in progress, between a start and a stop condition.
pub struct Frame<'a, Clk: OutputPin, Dio: OutputPin, T: Timer> {
    bus: &'a mut BitBangingBusDriver<Clk, Dio, T>,
}

impl<'a, Clk: OutputPin, Dio: OutputPin, T: Timer> Frame<'a, Clk, Dio, T> {
    /// Shift the byte value out on the DIO pin, LSB first, followed by the clock pulse for the
    /// chip's ACK slot.
    pub fn write_byte(&mut self, b: u8) {
        for bit in 0..8 {
            let mask = 1 << bit;
            self.bus.set_dio((b & mask) != 0);
            self.bus.pulse_clock();
        }

        // ACK slot.  The chip pulls DIO low here; nobody is listening.
        self.bus.pulse_clock();
    }

    /// End the transmission with a stop condition: DIO low, CLK high, DIO high.
    pub fn stop(self) {}
}

impl<'a, Clk: OutputPin, Dio: OutputPin, T: Timer> Drop for Frame<'a, Clk, Dio, T> {
    fn drop(&mut self) {
        self.bus.set_dio(false);
        self.bus.set_clock(true);
        self.bus.set_dio(true);
    }
}

#[cfg(feature = "embassy-rp")]
mod embassy_rp_pin {
    use core::convert::Infallible;
    use embassy_rp::gpio;
    use embedded_hal_1::digital::{ErrorType, OutputPin};

    /// An `embassy-rp` output pin usable as a CLK or DIO line for
    /// [`super::BitBangingBusDriver`].
    ///
    /// The pin starts out low.
    pub struct EmbassyRpPin<'a, P: gpio::Pin> {
        output: gpio::Output<'a, P>,
    }

    impl<'a, P: gpio::Pin> EmbassyRpPin<'a, P> {
        pub fn new(pin: P) -> Self {
            Self {
                output: gpio::Output::new(pin, gpio::Level::Low),
            }
        }
    }

    impl<'a, P: gpio::Pin> ErrorType for EmbassyRpPin<'a, P> {
        type Error = Infallible;
    }

    impl<'a, P: gpio::Pin> OutputPin for EmbassyRpPin<'a, P> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.output.set_low();
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.output.set_high();
            Ok(())
        }
    }
}

#[cfg(feature = "embassy-rp")]
pub use embassy_rp_pin::EmbassyRpPin;
