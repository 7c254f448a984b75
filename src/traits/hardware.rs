//! Hardware abstraction traits for the time base and the pulse sensor.
//!
//! These are the only hardware seams the measurement core depends on. Each
//! trait is small on purpose so that the same core runs against the mock
//! implementations in [`crate::hal::mock`], the HD44780/ESP32 bindings, or a
//! simulation harness.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`TimeBase`] | Free-running counter with compare and overflow events |
//! | [`EdgeDetector`] | Falling-edge notification on the sensor line |
//! | [`SensorLine`] | Direct read of the sensor level |
//!
//! # Example
//!
//! ```rust
//! use rs_speedo::traits::{TimeBase, TimerMode};
//! use rs_speedo::hal::MockTimeBase;
//!
//! let mut timer = MockTimeBase::new();
//! timer.configure(TimerMode::FreeRunningOverflow).unwrap();
//! timer.set_counter(1234);
//! assert_eq!(timer.counter(), 1234);
//! ```

/// Operating mode of the hardware counter.
///
/// The counter is owned by exactly one protocol at a time: the debounce
/// protocol runs it in [`PeriodicCompare`](Self::PeriodicCompare), the armed
/// protocol and the timeout monitor in
/// [`FreeRunningOverflow`](Self::FreeRunningOverflow).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimerMode {
    /// Counter halted, no events.
    #[default]
    Idle,
    /// Counter cleared and restarted; a compare event fires after the given
    /// number of ticks.
    PeriodicCompare(u32),
    /// Counter cleared and restarted; an overflow event fires each time it
    /// wraps past its range.
    FreeRunningOverflow,
}

impl TimerMode {
    /// Returns true if the counter is stopped in this mode.
    #[inline]
    pub const fn is_idle(&self) -> bool {
        matches!(self, TimerMode::Idle)
    }
}

/// Hardware time base.
///
/// # Implementation Notes
///
/// - `configure` must take effect synchronously. Switching to any running
///   mode clears the counter.
/// - Switching to [`TimerMode::Idle`] halts the counter but keeps its value so
///   it can still be read with [`counter()`](Self::counter).
/// - Events (compare match, overflow) are delivered by the platform glue as
///   [`Event`](crate::Event)s; this trait only covers configuration.
pub trait TimeBase {
    /// Error type for timer configuration.
    type Error: core::fmt::Debug;

    /// Switches the counter to a new mode.
    fn configure(&mut self, mode: TimerMode) -> Result<(), Self::Error>;

    /// Returns the current counter value in ticks.
    fn counter(&self) -> u32;

    /// Halts the counter. Equivalent to configuring [`TimerMode::Idle`].
    fn halt(&mut self) -> Result<(), Self::Error> {
        self.configure(TimerMode::Idle)
    }
}

/// Edge notification source for the pulse sensor.
///
/// Notifications must be suppressible: after `disable()` no edge event is
/// delivered, and `enable()` must not replay edges that happened while
/// disabled.
pub trait EdgeDetector {
    /// Enables falling-edge notification, discarding any pending edge.
    fn enable(&mut self);

    /// Disables edge notification.
    fn disable(&mut self);

    /// Returns true if edge notification is currently enabled.
    fn is_enabled(&self) -> bool;
}

/// Direct read access to the sensor line.
pub trait SensorLine {
    /// Returns true while the magnet holds the sensor in its active (low)
    /// state.
    fn is_active(&self) -> bool;
}
