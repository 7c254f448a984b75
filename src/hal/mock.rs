//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware traits, enabling
//! development and testing on desktop without a sensor, timer or display.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockTimeBase`] | [`TimeBase`] | Settable counter, mode history, simulated time |
//! | [`MockSensor`] | [`EdgeDetector`] + [`SensorLine`] | Magnet position and edge masking |
//! | [`MockDisplay`] | [`SpeedDisplay`] | Records every screen |
//!
//! # Example
//!
//! ```rust
//! use rs_speedo::hal::{MockDisplay, MockSensor, MockTimeBase};
//! use rs_speedo::{Config, Speedometer};
//!
//! let mut speedo = Speedometer::new(
//!     MockTimeBase::new(),
//!     MockSensor::new(),
//!     MockDisplay::new(),
//!     Config::default(),
//! );
//! speedo.start().unwrap();
//!
//! // Drive simulated time until the next hardware event
//! let (used, event) = speedo.timer_mut().advance(70_000);
//! assert_eq!(used, 65_536);
//! assert!(event.is_some());
//! ```
//!
//! [`TimeBase`]: crate::traits::TimeBase
//! [`EdgeDetector`]: crate::traits::EdgeDetector
//! [`SensorLine`]: crate::traits::SensorLine
//! [`SpeedDisplay`]: crate::traits::SpeedDisplay

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::speedo::Event;
use crate::traits::{EdgeDetector, SensorLine, SpeedDisplay, TimeBase, TimerMode};

// ============================================================================
// Time Base
// ============================================================================

/// Mock time base.
///
/// Holds a counter that tests can set directly, records every mode change,
/// and can simulate the passage of time with [`advance`](Self::advance).
///
/// # Example
///
/// ```rust
/// use rs_speedo::hal::MockTimeBase;
/// use rs_speedo::traits::{TimeBase, TimerMode};
/// use rs_speedo::Event;
///
/// let mut timer = MockTimeBase::new();
/// timer.configure(TimerMode::PeriodicCompare(32_000)).unwrap();
///
/// assert_eq!(timer.advance(10_000), (10_000, None));
/// assert_eq!(timer.counter(), 10_000);
/// assert_eq!(timer.advance(50_000), (22_000, Some(Event::PollTick)));
/// assert_eq!(timer.counter(), 0);
/// ```
#[derive(Debug)]
pub struct MockTimeBase {
    mode: TimerMode,
    counter: u32,
    range: u32,
    fail_in: Option<usize>,
    /// Every mode passed to `configure`, in order.
    pub history: Vec<TimerMode>,
}

impl MockTimeBase {
    /// Creates an idle 16-bit time base.
    pub fn new() -> Self {
        Self::with_range(1 << 16)
    }

    /// Creates an idle time base that wraps after `range` ticks.
    pub fn with_range(range: u32) -> Self {
        Self {
            mode: TimerMode::Idle,
            counter: 0,
            range: range.max(1),
            fail_in: None,
            history: Vec::new(),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Counter range.
    pub fn range(&self) -> u32 {
        self.range
    }

    /// Overwrites the counter value.
    pub fn set_counter(&mut self, ticks: u32) {
        self.counter = ticks;
    }

    /// Makes the next `configure` call fail.
    pub fn fail_next(&mut self) {
        self.fail_after(0);
    }

    /// Lets `calls` more `configure` calls succeed, then fails one.
    pub fn fail_after(&mut self, calls: usize) {
        self.fail_in = Some(calls);
    }

    /// Lets up to `ticks` pass, stopping at the first hardware event.
    ///
    /// Returns the ticks actually consumed and the event raised, if any.
    /// An idle counter consumes everything and raises nothing.
    pub fn advance(&mut self, ticks: u64) -> (u64, Option<Event>) {
        let (limit, event) = match self.mode {
            TimerMode::Idle => return (ticks, None),
            TimerMode::PeriodicCompare(interval) => (interval.max(1), Event::PollTick),
            TimerMode::FreeRunningOverflow => (self.range, Event::CounterOverflow),
        };

        let remaining = (limit as u64).saturating_sub(self.counter as u64);
        if ticks < remaining {
            self.counter += ticks as u32;
            (ticks, None)
        } else {
            self.counter = 0;
            (remaining, Some(event))
        }
    }
}

impl Default for MockTimeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeBase for MockTimeBase {
    type Error = ();

    fn configure(&mut self, mode: TimerMode) -> Result<(), ()> {
        match self.fail_in {
            Some(0) => {
                self.fail_in = None;
                return Err(());
            }
            Some(n) => self.fail_in = Some(n - 1),
            None => {}
        }
        self.history.push(mode);
        if !mode.is_idle() {
            self.counter = 0;
        }
        self.mode = mode;
        Ok(())
    }

    fn counter(&self) -> u32 {
        self.counter
    }
}

// ============================================================================
// Sensor
// ============================================================================

/// Mock pulse sensor.
///
/// `active` is the magnet position; edge masking follows the
/// [`EdgeDetector`] contract, so an edge that happens while masked is lost.
///
/// # Example
///
/// ```rust
/// use rs_speedo::hal::MockSensor;
/// use rs_speedo::traits::EdgeDetector;
/// use rs_speedo::Event;
///
/// let mut sensor = MockSensor::new();
/// assert_eq!(sensor.set_active(true), None); // masked
/// sensor.set_active(false);
///
/// sensor.enable();
/// assert_eq!(sensor.set_active(true), Some(Event::SensorEdge));
/// assert_eq!(sensor.set_active(true), None); // no new edge
/// ```
#[derive(Debug, Default)]
pub struct MockSensor {
    /// Whether the magnet currently holds the sensor active.
    pub active: bool,
    enabled: bool,
    /// Number of `enable` calls.
    pub enable_calls: usize,
    /// Number of `disable` calls.
    pub disable_calls: usize,
}

impl MockSensor {
    /// Creates a released, masked sensor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the magnet. Returns the edge event the hardware would raise.
    pub fn set_active(&mut self, active: bool) -> Option<Event> {
        let falling = active && !self.active;
        self.active = active;
        if falling && self.enabled {
            Some(Event::SensorEdge)
        } else {
            None
        }
    }
}

impl EdgeDetector for MockSensor {
    fn enable(&mut self) {
        self.enabled = true;
        self.enable_calls += 1;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.disable_calls += 1;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl SensorLine for MockSensor {
    fn is_active(&self) -> bool {
        self.active
    }
}

// ============================================================================
// Display
// ============================================================================

/// Mock display that records every screen.
///
/// # Example
///
/// ```rust
/// use rs_speedo::hal::MockDisplay;
/// use rs_speedo::traits::SpeedDisplay;
///
/// let mut display = MockDisplay::new();
/// display.init().unwrap();
/// display.show_lines(" Speed", " 12 kmph").unwrap();
/// assert_eq!(display.last_lines(), Some((" Speed", " 12 kmph")));
/// assert_eq!(display.show_count, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockDisplay {
    /// Whether init() was called.
    pub initialized: bool,
    /// Every (line1, line2) pair shown, oldest first.
    pub screens: Vec<(String, String)>,
    /// Number of successful show_lines() calls.
    pub show_count: usize,
    /// Number of clear() calls.
    pub clear_count: usize,
    fail: bool,
}

impl MockDisplay {
    /// Creates a new mock display.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// The most recent screen.
    pub fn last_lines(&self) -> Option<(&str, &str)> {
        self.screens
            .last()
            .map(|(l1, l2)| (l1.as_str(), l2.as_str()))
    }
}

impl SpeedDisplay for MockDisplay {
    type Error = ();

    fn init(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.initialized = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.clear_count += 1;
        Ok(())
    }

    fn show_lines(&mut self, line1: &str, line2: &str) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.screens.push((line1.into(), line2.into()));
        self.show_count += 1;
        Ok(())
    }
}
