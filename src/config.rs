//! Speedometer configuration.
//!
//! Every timing constant the measurement core depends on lives here with its
//! unit spelled out. Defaults reproduce a 1 MHz, 16-bit timer setup with a
//! 32 ms debounce poll and a 20-overflow timeout.
//!
//! Uses `heapless::String` for the display labels so the whole config stays
//! `no_std` friendly.
//!
//! # Example
//!
//! ```rust
//! use rs_speedo::config::{Config, TimingConfig, WheelConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.timing.poll_interval_ticks, 32_000);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_timing(TimingConfig::default().with_timeout_overflows(10))
//!     .with_wheel(WheelConfig::default().with_diameter_m(0.622));
//! ```

use heapless::String as HString;

/// Maximum length for short config strings (labels, units)
pub const MAX_SHORT_STRING: usize = 16;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    let take = s.len().min(MAX_SHORT_STRING);
    // Find valid UTF-8 boundary
    let valid_end = s
        .char_indices()
        .take_while(|(i, c)| i + c.len_utf8() <= take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete speedometer configuration
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Counter and event timing
    pub timing: TimingConfig,
    /// Wheel geometry and plausibility limit
    pub wheel: WheelConfig,
    /// Display labels
    pub display: DisplayConfig,
}

impl Config {
    /// Set timing configuration
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Set wheel configuration
    pub fn with_wheel(mut self, wheel: WheelConfig) -> Self {
        self.wheel = wheel;
        self
    }

    /// Set display configuration
    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }
}

// ============================================================================
// Timing Config
// ============================================================================

/// Counter and event timing.
///
/// All durations are in counter ticks; `clock_hz` converts them to seconds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    /// Counter rate in ticks per second
    pub clock_hz: u32,
    /// Debounce poll period in ticks
    pub poll_interval_ticks: u32,
    /// Number of distinct counter values before the counter wraps to zero
    pub counter_range: u32,
    /// Overflows without a rotation before the wheel is declared stopped
    pub timeout_overflows: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            clock_hz: 1_000_000,
            poll_interval_ticks: 32_000,
            counter_range: 1 << 16,
            timeout_overflows: 20,
        }
    }
}

impl TimingConfig {
    /// Set the counter rate (at least 1 Hz)
    pub fn with_clock_hz(mut self, hz: u32) -> Self {
        self.clock_hz = hz.max(1);
        self
    }

    /// Set the debounce poll period in ticks (at least 1)
    pub fn with_poll_interval_ticks(mut self, ticks: u32) -> Self {
        self.poll_interval_ticks = ticks.max(1);
        self
    }

    /// Set the counter range (at least 1)
    pub fn with_counter_range(mut self, range: u32) -> Self {
        self.counter_range = range.max(1);
        self
    }

    /// Set the timeout threshold in overflows (at least 1)
    pub fn with_timeout_overflows(mut self, overflows: u32) -> Self {
        self.timeout_overflows = overflows.max(1);
        self
    }

    /// Converts a tick count to seconds.
    #[inline]
    pub fn ticks_to_seconds(&self, ticks: u64) -> f32 {
        ticks as f32 / self.clock_hz as f32
    }

    /// Debounce poll period in milliseconds.
    pub fn poll_interval_ms(&self) -> f32 {
        self.ticks_to_seconds(self.poll_interval_ticks as u64) * 1000.0
    }

    /// Time for one full counter wrap in milliseconds.
    pub fn overflow_period_ms(&self) -> f32 {
        self.ticks_to_seconds(self.counter_range as u64) * 1000.0
    }

    /// Time without rotation before the timeout fires, in milliseconds.
    pub fn timeout_ms(&self) -> f32 {
        self.overflow_period_ms() * self.timeout_overflows as f32
    }
}

// ============================================================================
// Wheel Config
// ============================================================================

/// Wheel geometry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WheelConfig {
    /// Tire diameter in meters
    pub diameter_m: f32,
    /// Readings above this speed (km/h) are treated as sensor glitches
    pub max_plausible_kmh: u16,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            diameter_m: 0.285,
            max_plausible_kmh: 150,
        }
    }
}

impl WheelConfig {
    /// Set the tire diameter in meters (negative values clamp to zero)
    pub fn with_diameter_m(mut self, diameter_m: f32) -> Self {
        self.diameter_m = diameter_m.max(0.0);
        self
    }

    /// Set the plausibility limit in km/h
    pub fn with_max_plausible_kmh(mut self, kmh: u16) -> Self {
        self.max_plausible_kmh = kmh;
        self
    }

    /// Distance covered by one revolution, in meters.
    #[inline]
    pub fn circumference_m(&self) -> f32 {
        core::f32::consts::PI * self.diameter_m
    }
}

// ============================================================================
// Display Config
// ============================================================================

/// Labels rendered on the two display lines.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayConfig {
    /// First-line caption
    pub title: ShortString,
    /// Unit suffix after the number on the second line
    pub unit: ShortString,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: short_string("Speed"),
            unit: short_string("kmph"),
        }
    }
}

impl DisplayConfig {
    /// Set the first-line caption
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = short_string(title);
        self
    }

    /// Set the unit suffix
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = short_string(unit);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
