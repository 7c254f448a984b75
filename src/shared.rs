//! Thread-safe wrapper for feeding events from several contexts.
//!
//! On bare metal the interrupt controller guarantees that only one handler
//! runs at a time. On a hosted target (simulation, ESP-IDF tasks, tests) the
//! same guarantee comes from [`SharedSpeedometer`], which holds its mutex for
//! the full duration of each handler.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rs_speedo::hal::{MockDisplay, MockSensor, MockTimeBase};
//! use rs_speedo::{Config, Event, SharedSpeedometer, Speedometer};
//!
//! let speedo = Speedometer::new(
//!     MockTimeBase::new(),
//!     MockSensor::new(),
//!     MockDisplay::new(),
//!     Config::default(),
//! );
//! let shared = Arc::new(SharedSpeedometer::new(speedo));
//! shared.with_speedometer(|s| s.start()).unwrap();
//!
//! let isr = Arc::clone(&shared);
//! std::thread::spawn(move || isr.handle(Event::CounterOverflow))
//!     .join()
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(shared.state().overflow_epoch, 1);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::estimator::SpeedReading;
use crate::speedo::{Event, SpeedoState, Speedometer, Transition};
use crate::traits::{EdgeDetector, SensorLine, SpeedDisplay, TimeBase};

/// A [`Speedometer`] behind a mutex.
///
/// # Thread Safety
///
/// - Every handler runs with the lock held, so handlers never interleave.
/// - Change detection has its own lock so a UI thread polling for new
///   readings does not hold up event handling.
pub struct SharedSpeedometer<T, S, D>
where
    T: TimeBase,
    S: EdgeDetector + SensorLine,
    D: SpeedDisplay,
{
    speedo: Mutex<Speedometer<T, S, D>>,
    last_seen: Mutex<Option<SpeedReading>>,
}

impl<T, S, D> SharedSpeedometer<T, S, D>
where
    T: TimeBase,
    S: EdgeDetector + SensorLine,
    D: SpeedDisplay,
{
    /// Wraps a speedometer.
    pub fn new(speedo: Speedometer<T, S, D>) -> Self {
        Self {
            speedo: Mutex::new(speedo),
            last_seen: Mutex::new(None),
        }
    }

    /// A handler that panicked mid-update leaves no torn state behind that a
    /// later handler could not cope with, so a poisoned lock is recovered.
    fn lock(&self) -> MutexGuard<'_, Speedometer<T, S, D>> {
        self.speedo.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one handler with the lock held.
    pub fn handle(&self, event: Event) -> Result<Transition, T::Error> {
        self.lock().handle(event)
    }

    /// Runs a closure with exclusive access to the speedometer.
    pub fn with_speedometer<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Speedometer<T, S, D>) -> R,
    {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SpeedoState {
        self.lock().state()
    }

    /// Returns the latest reading if it differs from the one returned by
    /// the previous call.
    pub fn check_changes(&self) -> Option<SpeedReading> {
        let current = self.lock().last_reading();

        let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        if current != *last_seen {
            *last_seen = current;
            current
        } else {
            None
        }
    }
}
