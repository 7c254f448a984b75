//! Rotation period measurement.
//!
//! [`PeriodMeasurer`] implements the two sensor protocols:
//!
//! - **Armed**: a falling edge is authoritative. The handler claims the phase
//!   (`Armed -> Debouncing`), masks further edges, halts the counter, reads
//!   the window length and starts a fresh window.
//! - **Debouncing**: a short periodic timer polls the sensor line. While the
//!   magnet is still over the sensor the timer is simply restarted; once the
//!   line is released the counter switches to free-running overflow mode and
//!   edges are unmasked again.
//!
//! Every handler masks the source that triggered it before mutating state
//! and only enables the next source as its last step. The counter is always
//! halted before it is reconfigured.
//!
//! Time spent debouncing belongs to the window too: each poll accrues one
//! poll interval, and whole counter ranges carry into the overflow epoch
//! through the [`TimeoutMonitor`], so a magnet parked on the sensor still
//! times out.

use crate::config::TimingConfig;
use crate::estimator::Measurement;
use crate::state::{MeasurementState, MotionState, SensorPhase};
use crate::timeout::{OverflowOutcome, TimeoutMonitor};
use crate::traits::{EdgeDetector, SensorLine, TimeBase, TimerMode};

/// What a debounce poll decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// Poll arrived outside the debounce phase and was dropped.
    Ignored,
    /// Magnet still present; the poll timer was restarted.
    StillActive,
    /// Magnet gone; edge notification re-armed.
    Released,
}

/// A debounce poll result plus whether carried time expired the timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollReport {
    /// Phase decision.
    pub outcome: PollOutcome,
    /// True if the timeout fired while accruing this poll's time.
    pub timed_out: bool,
}

/// The dual-mode period measurement state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodMeasurer {
    timing: TimingConfig,
}

impl PeriodMeasurer {
    /// Creates a measurer for the given timing.
    pub fn new(timing: TimingConfig) -> Self {
        Self { timing }
    }

    /// Timing this measurer was built with.
    #[inline]
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Handles a falling edge.
    ///
    /// Returns `Ok(None)` if the edge arrived while debouncing. Otherwise the
    /// window has been closed and reset, motion is [`MotionState::Active`],
    /// edges are masked and the counter is halted; the caller reports the
    /// measurement and then calls [`start_debounce`](Self::start_debounce).
    pub fn on_edge<T, S>(
        &self,
        state: &mut MeasurementState,
        timer: &mut T,
        sensor: &mut S,
    ) -> Result<Option<Measurement>, T::Error>
    where
        T: TimeBase,
        S: EdgeDetector,
    {
        if !state
            .phase
            .transition(SensorPhase::Armed, SensorPhase::Debouncing)
        {
            log::debug!("edge while debouncing, ignored");
            return Ok(None);
        }

        sensor.disable();
        timer.halt()?;

        let tick = timer.counter();
        let elapsed = state.elapsed_ticks(tick, self.timing.counter_range);
        state.reset_window();
        state.motion = MotionState::Active;
        state.rotations = state.rotations.wrapping_add(1);

        let measurement = Measurement::from_ticks(elapsed, &self.timing);
        log::debug!(
            "rotation {}: {} ticks ({} s)",
            state.rotations,
            elapsed,
            measurement.elapsed_seconds
        );
        Ok(Some(measurement))
    }

    /// Starts the debounce poll timer. Last step of a confirmed rotation.
    pub fn start_debounce<T: TimeBase>(&self, timer: &mut T) -> Result<(), T::Error> {
        timer.configure(TimerMode::PeriodicCompare(self.timing.poll_interval_ticks))
    }

    /// Handles a debounce poll.
    pub fn on_poll<T, S>(
        &self,
        monitor: &TimeoutMonitor,
        state: &mut MeasurementState,
        timer: &mut T,
        sensor: &mut S,
    ) -> Result<PollReport, T::Error>
    where
        T: TimeBase,
        S: EdgeDetector + SensorLine,
    {
        if state.phase() != SensorPhase::Debouncing {
            log::debug!("poll while armed, ignored");
            return Ok(PollReport {
                outcome: PollOutcome::Ignored,
                timed_out: false,
            });
        }

        timer.halt()?;

        let carries =
            state.accrue_base_ticks(self.timing.poll_interval_ticks, self.timing.counter_range);
        let mut timed_out = false;
        for _ in 0..carries {
            if monitor.on_overflow(state) == OverflowOutcome::Expired {
                timed_out = true;
            }
        }

        if sensor.is_active() {
            timer.configure(TimerMode::PeriodicCompare(self.timing.poll_interval_ticks))?;
            return Ok(PollReport {
                outcome: PollOutcome::StillActive,
                timed_out,
            });
        }

        if !state
            .phase
            .transition(SensorPhase::Debouncing, SensorPhase::Armed)
        {
            return Ok(PollReport {
                outcome: PollOutcome::Ignored,
                timed_out,
            });
        }

        timer.configure(TimerMode::FreeRunningOverflow)?;
        sensor.enable();
        log::debug!("sensor released, armed");

        Ok(PollReport {
            outcome: PollOutcome::Released,
            timed_out,
        })
    }
}
