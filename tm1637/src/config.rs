//! Construction-time settings for a [`crate::Tm1637`].

/// The TM1637 has six grid outputs, so it can drive at most six digits
pub const MAX_DIGITS: usize = 6;

/// Intensity runs from 0 (off) to 8 (brightest)
pub const MAX_INTENSITY: u8 = 8;

pub const DEFAULT_INTENSITY: u8 = 7;

/// Most TM1637 boards sold are 4 digit clock displays
pub const DEFAULT_DIGIT_COUNT: u8 = 4;

/// How a display is wired up and how it should start out.
///
/// Out of range values are clamped by the setters rather than rejected, so a `Config` always
/// describes something the driver can render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    intensity: u8,
    digit_count: u8,
    blank_leading_zeros: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            intensity: DEFAULT_INTENSITY,
            digit_count: DEFAULT_DIGIT_COUNT,
            blank_leading_zeros: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial intensity, from 0 (display off) to [`MAX_INTENSITY`].  Larger values are clamped.
    pub fn with_intensity(mut self, intensity: u8) -> Self {
        self.intensity = intensity.min(MAX_INTENSITY);
        self
    }

    /// Number of digits physically wired to the chip, from 1 to [`MAX_DIGITS`].
    pub fn with_digit_count(mut self, digit_count: u8) -> Self {
        self.digit_count = digit_count.clamp(1, MAX_DIGITS as u8);
        self
    }

    /// When rendering numbers, leave positions to the left of the most significant digit blank
    /// instead of showing `0`.
    pub fn with_blank_leading_zeros(mut self, blank: bool) -> Self {
        self.blank_leading_zeros = blank;
        self
    }

    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    pub fn digit_count(&self) -> u8 {
        self.digit_count
    }

    pub fn blank_leading_zeros(&self) -> bool {
        self.blank_leading_zeros
    }

    /// The brightness register value (0-7) this intensity maps to.
    ///
    /// Intensity 0 means "off" rather than "dimmest", so it maps to the same register value as
    /// intensity 1.
    pub(crate) fn brightness(&self) -> u8 {
        self.intensity.max(1) - 1
    }

    pub(crate) fn display_on(&self) -> bool {
        self.intensity > 0
    }
}
