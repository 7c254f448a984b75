//! Period-to-speed conversion.
//!
//! [`speed_kmh`] is the bare formula. [`SpeedEstimator::estimate`] wraps it
//! with the plausibility guard the measurement path uses, so a glitch that
//! produces a zero or absurdly short period never reaches the display.

use crate::config::{TimingConfig, WheelConfig};

/// m/s to km/h.
pub const MPS_TO_KMH: f32 = 3.6;

/// One completed rotation period.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    /// Window length in counter ticks.
    pub elapsed_ticks: u64,
    /// Window length in seconds.
    pub elapsed_seconds: f32,
}

impl Measurement {
    /// Builds a measurement from a tick count using the configured clock rate.
    pub fn from_ticks(elapsed_ticks: u64, timing: &TimingConfig) -> Self {
        Self {
            elapsed_ticks,
            elapsed_seconds: timing.ticks_to_seconds(elapsed_ticks),
        }
    }
}

/// Wheel speed in whole km/h.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedReading {
    /// Speed in km/h, truncated.
    pub kmh: u16,
}

impl SpeedReading {
    /// The reading shown when the wheel is stopped.
    pub const ZERO: SpeedReading = SpeedReading { kmh: 0 };

    /// Creates a reading.
    #[inline]
    pub const fn new(kmh: u16) -> Self {
        Self { kmh }
    }
}

/// Why a period produced no reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PeriodRejected {
    /// Period was zero, negative or not a number.
    NonPositive,
    /// Period implies a speed above the plausibility limit.
    TooFast {
        /// The implied speed in km/h.
        kmh: f32,
    },
}

/// Converts a rotation period into km/h, truncated.
///
/// Pure and monotonic: a shorter period never yields a lower speed. The
/// caller must guard `elapsed_s <= 0`; such input saturates to `u16::MAX`
/// (or `0` for NaN) instead of panicking.
///
/// # Examples
///
/// ```
/// use rs_speedo::estimator::speed_kmh;
///
/// let circumference = core::f32::consts::PI * 0.285;
/// assert_eq!(speed_kmh(circumference, 1.0), 3);
/// assert_eq!(speed_kmh(circumference, 0.1), 32);
/// ```
#[inline]
pub fn speed_kmh(circumference_m: f32, elapsed_s: f32) -> u16 {
    (circumference_m / elapsed_s * MPS_TO_KMH) as u16
}

/// Guarded speed conversion for a fixed wheel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedEstimator {
    circumference_m: f32,
    max_plausible_kmh: u16,
}

impl SpeedEstimator {
    /// Creates an estimator for a wheel of the given circumference.
    pub fn new(circumference_m: f32, max_plausible_kmh: u16) -> Self {
        Self {
            circumference_m,
            max_plausible_kmh,
        }
    }

    /// Creates an estimator from the wheel configuration.
    pub fn from_config(wheel: &WheelConfig) -> Self {
        Self::new(wheel.circumference_m(), wheel.max_plausible_kmh)
    }

    /// Wheel circumference in meters.
    #[inline]
    pub fn circumference_m(&self) -> f32 {
        self.circumference_m
    }

    /// Converts a measurement, rejecting non-physical periods.
    pub fn estimate(&self, measurement: &Measurement) -> Result<SpeedReading, PeriodRejected> {
        let elapsed = measurement.elapsed_seconds;
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return Err(PeriodRejected::NonPositive);
        }

        let kmh = self.circumference_m / elapsed * MPS_TO_KMH;
        if kmh > self.max_plausible_kmh as f32 {
            return Err(PeriodRejected::TooFast { kmh });
        }

        Ok(SpeedReading::new(speed_kmh(self.circumference_m, elapsed)))
    }
}
