//! Shared measurement state mutated by the event handlers.
//!
//! All process-wide state of the speedometer lives in one
//! [`MeasurementState`] value. Handlers receive it by exclusive reference, so
//! the borrow checker enforces the one-handler-at-a-time contract that
//! interrupt priorities would enforce on bare metal.
//!
//! The sensor phase sits in a [`PhaseCell`] whose transitions are a single
//! compare-and-swap. A handler that finds the phase already moved on (a stale
//! or duplicated event) backs off without touching anything else.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::estimator::SpeedReading;

/// Which event source is authoritative for the sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum SensorPhase {
    /// Waiting for the next falling edge.
    #[default]
    Armed = 0,
    /// Polling the sensor line until the magnet has passed.
    Debouncing = 1,
}

impl SensorPhase {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => SensorPhase::Armed,
            _ => SensorPhase::Debouncing,
        }
    }
}

/// Atomic holder for [`SensorPhase`].
///
/// Always holds exactly one phase; there is no intermediate value a reader
/// could observe.
#[derive(Debug)]
pub struct PhaseCell(AtomicU8);

impl PhaseCell {
    /// Creates a cell holding `phase`.
    pub const fn new(phase: SensorPhase) -> Self {
        Self(AtomicU8::new(phase as u8))
    }

    /// Current phase.
    #[inline]
    pub fn get(&self) -> SensorPhase {
        SensorPhase::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves from `from` to `to` if and only if the cell currently holds
    /// `from`. Returns false and leaves the cell untouched otherwise.
    #[inline]
    pub fn transition(&self, from: SensorPhase, to: SensorPhase) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Overwrites the phase unconditionally. Only for recovery after a
    /// hardware fault, when no handler holds the phase.
    #[inline]
    pub fn force(&self, phase: SensorPhase) {
        self.0.store(phase as u8, Ordering::Release);
    }
}

impl Default for PhaseCell {
    fn default() -> Self {
        Self::new(SensorPhase::Armed)
    }
}

/// Whether the wheel is considered moving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MotionState {
    /// Rotations are arriving within the timeout window.
    #[default]
    Active,
    /// No rotation for the configured number of overflows. A zero reading
    /// has been reported.
    Timeout,
}

/// Reconstructs the length of a measurement window from its parts.
///
/// `tick + epoch * range`, computed in 64 bits so no realistic epoch count
/// can overflow.
///
/// # Examples
///
/// ```
/// use rs_speedo::state::reconstruct_elapsed;
///
/// assert_eq!(reconstruct_elapsed(65_535, 0, 65_536), 65_535);
/// assert_eq!(reconstruct_elapsed(0, 1, 65_536), 65_536);
/// assert_eq!(reconstruct_elapsed(10, 3, 65_536), 196_618);
/// ```
#[inline]
pub const fn reconstruct_elapsed(tick: u32, epoch: u32, range: u32) -> u64 {
    tick as u64 + epoch as u64 * range as u64
}

/// Process-wide measurement state.
///
/// Initialized once (`Armed`, `Active`, epoch 0) and afterwards only
/// mutated by the handlers in [`crate::measurer`] and [`crate::timeout`].
#[derive(Debug, Default)]
pub struct MeasurementState {
    pub(crate) phase: PhaseCell,
    pub(crate) motion: MotionState,
    /// Counter wraps since the window started.
    pub(crate) overflow_epoch: u32,
    /// Ticks accounted while debouncing, always below the counter range.
    pub(crate) base_ticks: u32,
    pub(crate) rotations: u32,
    pub(crate) last_reading: Option<SpeedReading>,
    /// The window was restarted mid-rotation and does not span a whole turn.
    pub(crate) partial_window: bool,
}

impl MeasurementState {
    /// Creates the startup state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current sensor phase.
    #[inline]
    pub fn phase(&self) -> SensorPhase {
        self.phase.get()
    }

    /// Current motion state.
    #[inline]
    pub fn motion(&self) -> MotionState {
        self.motion
    }

    /// Counter wraps since the current window started.
    #[inline]
    pub fn overflow_epoch(&self) -> u32 {
        self.overflow_epoch
    }

    /// Debounce ticks carried into the current window.
    #[inline]
    pub fn base_ticks(&self) -> u32 {
        self.base_ticks
    }

    /// Confirmed rotations since startup.
    #[inline]
    pub fn rotations(&self) -> u32 {
        self.rotations
    }

    /// Last speed handed to the display, if any.
    #[inline]
    pub fn last_reading(&self) -> Option<SpeedReading> {
        self.last_reading
    }

    /// Total ticks in the current window given the live counter value.
    pub fn elapsed_ticks(&self, tick: u32, range: u32) -> u64 {
        self.base_ticks as u64 + reconstruct_elapsed(tick, self.overflow_epoch, range)
    }

    /// True if the current window was restarted after a timer fault and its
    /// measurement will not cover a full rotation.
    #[inline]
    pub fn partial_window(&self) -> bool {
        self.partial_window
    }

    /// Starts a fresh window: epoch and base ticks back to zero.
    pub(crate) fn reset_window(&mut self) {
        self.overflow_epoch = 0;
        self.base_ticks = 0;
    }

    /// Adds debounce time to the window and returns how many whole counter
    /// ranges it carried. The caller routes each carry through the timeout
    /// monitor as an overflow.
    pub(crate) fn accrue_base_ticks(&mut self, ticks: u32, range: u32) -> u32 {
        let range = range.max(1) as u64;
        let total = self.base_ticks as u64 + ticks as u64;
        self.base_ticks = (total % range) as u32;
        (total / range) as u32
    }
}
