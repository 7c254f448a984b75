//! Stopped-wheel detection.
//!
//! The measurement path only updates the display on a confirmed rotation, so
//! a wheel that stops would leave its last speed on screen forever. The
//! [`TimeoutMonitor`] counts counter overflows since the last rotation and,
//! once the threshold is reached, flips the motion state to
//! [`MotionState::Timeout`] so the caller can report zero.
//!
//! # Example
//!
//! ```rust
//! use rs_speedo::state::{MeasurementState, MotionState};
//! use rs_speedo::timeout::{OverflowOutcome, TimeoutMonitor};
//!
//! let monitor = TimeoutMonitor::new(3);
//! let mut state = MeasurementState::new();
//!
//! assert_eq!(monitor.on_overflow(&mut state), OverflowOutcome::Counted { epoch: 1 });
//! assert_eq!(monitor.on_overflow(&mut state), OverflowOutcome::Counted { epoch: 2 });
//! assert_eq!(monitor.on_overflow(&mut state), OverflowOutcome::Expired);
//! assert_eq!(state.motion(), MotionState::Timeout);
//! ```

use crate::state::{MeasurementState, MotionState};

/// Result of accounting one overflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowOutcome {
    /// The epoch was incremented; nothing else changed.
    Counted {
        /// Overflow epoch after the increment.
        epoch: u32,
    },
    /// The threshold was reached while moving. The window has been reset and
    /// a zero reading must be reported.
    Expired,
}

/// Counts overflows and declares the wheel stopped past a threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutMonitor {
    threshold: u32,
}

impl TimeoutMonitor {
    /// Creates a monitor that expires after `threshold` overflows
    /// (at least 1).
    pub const fn new(threshold: u32) -> Self {
        Self {
            threshold: if threshold == 0 { 1 } else { threshold },
        }
    }

    /// Overflows without a rotation before expiry.
    #[inline]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Accounts one overflow.
    ///
    /// Expires at most once per stop: while already in
    /// [`MotionState::Timeout`] overflows are only counted. Only a confirmed
    /// rotation brings the state back to [`MotionState::Active`].
    pub fn on_overflow(&self, state: &mut MeasurementState) -> OverflowOutcome {
        state.overflow_epoch = state.overflow_epoch.saturating_add(1);

        if state.overflow_epoch >= self.threshold && state.motion == MotionState::Active {
            state.motion = MotionState::Timeout;
            state.reset_window();
            log::info!(
                "no rotation for {} overflows, reporting standstill",
                self.threshold
            );
            return OverflowOutcome::Expired;
        }

        OverflowOutcome::Counted {
            epoch: state.overflow_epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_below_threshold() {
        let monitor = TimeoutMonitor::new(20);
        let mut state = MeasurementState::new();
        for expected in 1..20 {
            assert_eq!(
                monitor.on_overflow(&mut state),
                OverflowOutcome::Counted { epoch: expected }
            );
        }
        assert_eq!(state.motion(), MotionState::Active);
    }

    #[test]
    fn expires_on_twentieth_overflow() {
        let monitor = TimeoutMonitor::new(20);
        let mut state = MeasurementState::new();
        let outcomes: Vec<_> = (0..20).map(|_| monitor.on_overflow(&mut state)).collect();
        assert_eq!(outcomes[19], OverflowOutcome::Expired);
        assert_eq!(
            outcomes.iter().filter(|o| **o == OverflowOutcome::Expired).count(),
            1
        );
        assert_eq!(state.motion(), MotionState::Timeout);
        assert_eq!(state.overflow_epoch(), 0);
    }

    #[test]
    fn twenty_first_overflow_does_not_expire_again() {
        let monitor = TimeoutMonitor::new(20);
        let mut state = MeasurementState::new();
        for _ in 0..20 {
            monitor.on_overflow(&mut state);
        }
        assert_eq!(
            monitor.on_overflow(&mut state),
            OverflowOutcome::Counted { epoch: 1 }
        );
    }

    #[test]
    fn stays_timed_out_over_long_standstill() {
        let monitor = TimeoutMonitor::new(5);
        let mut state = MeasurementState::new();
        let expired = (0..100)
            .map(|_| monitor.on_overflow(&mut state))
            .filter(|o| *o == OverflowOutcome::Expired)
            .count();
        assert_eq!(expired, 1);
        assert_eq!(state.motion(), MotionState::Timeout);
    }

    #[test]
    fn expiry_resets_base_ticks() {
        let monitor = TimeoutMonitor::new(1);
        let mut state = MeasurementState::new();
        state.base_ticks = 4_000;
        assert_eq!(monitor.on_overflow(&mut state), OverflowOutcome::Expired);
        assert_eq!(state.base_ticks(), 0);
    }

    #[test]
    fn epoch_saturates() {
        let monitor = TimeoutMonitor::new(1);
        let mut state = MeasurementState::new();
        state.motion = MotionState::Timeout;
        state.overflow_epoch = u32::MAX;
        assert_eq!(
            monitor.on_overflow(&mut state),
            OverflowOutcome::Counted { epoch: u32::MAX }
        );
    }

    #[test]
    fn zero_threshold_clamped() {
        assert_eq!(TimeoutMonitor::new(0).threshold(), 1);
    }
}
