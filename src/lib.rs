//! # rs-speedo
//!
//! A bicycle-style wheel speedometer driven by a single pulse per revolution
//! from a hall-effect sensor, with a 16x2 character display.
//!
//! ## Features
//!
//! - **Period measurement**: a hardware counter times each revolution; counter
//!   overflows are counted so windows of any length are reconstructed exactly
//! - **Debouncing**: after a pulse the sensor is polled on a short periodic
//!   timer until the magnet has passed, so one pass is one rotation
//! - **Stop detection**: once a window grows past a configurable number of
//!   overflows the display drops to zero, exactly once
//! - **Plausibility filtering**: periods implying impossible speeds are
//!   dropped instead of shown
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Counter, sensor and display abstractions
//! - `state` - Shared measurement state and the phase guard
//! - `measurer` - Edge and debounce-poll handling
//! - `timeout` - Overflow counting and stop detection
//! - `estimator` - Period to speed conversion
//! - `speedo` - The [`Speedometer`] that ties everything together
//! - `hal` - Concrete implementations (mock for testing, LCD and ESP32 drivers)
//!
//! ## Example
//!
//! ```rust
//! use rs_speedo::{
//!     hal::{MockDisplay, MockSensor, MockTimeBase},
//!     Config, Event, Speedometer,
//! };
//!
//! let mut speedo = Speedometer::new(
//!     MockTimeBase::new(),
//!     MockSensor::new(),
//!     MockDisplay::new(),
//!     Config::default(),
//! );
//! speedo.start().unwrap();
//!
//! // One full counter range plus 34_464 ticks: a 100 ms revolution
//! speedo.handle(Event::CounterOverflow).unwrap();
//! speedo.timer_mut().set_counter(34_464);
//! speedo.handle(Event::SensorEdge).unwrap();
//!
//! assert_eq!(speedo.display().last_lines(), Some((" Speed", " 32 kmph")));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Core traits for the counter, sensor and display.
pub mod traits;

/// Configuration for timing, wheel geometry and display text.
pub mod config;
/// Period to speed conversion.
pub mod estimator;
/// Fixed-width display lines.
pub mod format;
/// Rotation period measurement and debouncing.
pub mod measurer;
/// The speedometer and its event dispatch.
pub mod speedo;
/// Measurement state shared by the handlers.
pub mod state;
/// Overflow counting and stop detection.
pub mod timeout;

/// Mutex-wrapped speedometer for multi-threaded hosts.
#[cfg(feature = "std")]
pub mod shared;

// Re-exports for convenience
pub use config::{Config, DisplayConfig, TimingConfig, WheelConfig};
pub use estimator::{Measurement, PeriodRejected, SpeedEstimator, SpeedReading};
pub use measurer::{PeriodMeasurer, PollOutcome, PollReport};
pub use speedo::{Event, SpeedoState, Speedometer, Transition};
pub use state::{MeasurementState, MotionState, SensorPhase};
pub use timeout::{OverflowOutcome, TimeoutMonitor};
pub use traits::{EdgeDetector, SensorLine, SpeedDisplay, TimeBase, TimerMode};

#[cfg(feature = "std")]
pub use shared::SharedSpeedometer;
