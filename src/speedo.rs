//! The speedometer: measurement state, collaborators and event dispatch.
//!
//! [`Speedometer`] owns the [`MeasurementState`] and the three hardware
//! collaborators. Platform glue turns interrupts (or simulated events) into
//! [`Event`]s and feeds them to [`Speedometer::handle`] one at a time.
//!
//! # Example
//!
//! ```rust
//! use rs_speedo::hal::{MockDisplay, MockSensor, MockTimeBase};
//! use rs_speedo::{Config, Event, Speedometer, Transition};
//!
//! let mut speedo = Speedometer::new(
//!     MockTimeBase::new(),
//!     MockSensor::new(),
//!     MockDisplay::new(),
//!     Config::default(),
//! );
//! speedo.start().unwrap();
//!
//! // One revolution took 50 ms
//! speedo.timer_mut().set_counter(50_000);
//! let transition = speedo.handle(Event::SensorEdge).unwrap();
//! assert!(matches!(transition, Transition::Rotation { .. }));
//! assert_eq!(speedo.display().last_lines(), Some((" Speed", " 64 kmph")));
//! ```

use crate::config::Config;
use crate::estimator::{Measurement, PeriodRejected, SpeedEstimator, SpeedReading};
use crate::format::{speed_line, title_line};
use crate::measurer::{PeriodMeasurer, PollOutcome};
use crate::state::{MeasurementState, MotionState, SensorPhase};
use crate::timeout::{OverflowOutcome, TimeoutMonitor};
use crate::traits::{EdgeDetector, SensorLine, SpeedDisplay, TimeBase, TimerMode};

/// A hardware notification delivered to the speedometer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Event {
    /// Falling edge on the sensor line.
    SensorEdge,
    /// Periodic compare match (debounce poll).
    PollTick,
    /// Free-running counter wrapped.
    CounterOverflow,
}

/// What handling an event did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    /// The event did not belong to the current phase and was dropped.
    Ignored,
    /// A rotation was confirmed. `reading` is `None` when the period was
    /// rejected as implausible and the display was left alone.
    Rotation {
        /// The closed window.
        measurement: Measurement,
        /// The reported speed, if the period was plausible.
        reading: Option<SpeedReading>,
    },
    /// Debounce poll found the magnet still present.
    StillDebouncing,
    /// Debounce poll found the sensor released; edges are armed again.
    Rearmed,
    /// An overflow was counted.
    Overflow {
        /// Overflow epoch after counting.
        epoch: u32,
    },
    /// The stop timeout fired and zero was reported.
    TimedOut,
}

/// Snapshot of the speedometer for UI or diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedoState {
    /// Current sensor phase.
    pub phase: SensorPhase,
    /// Current motion state.
    pub motion: MotionState,
    /// Overflows in the current window.
    pub overflow_epoch: u32,
    /// Confirmed rotations since start.
    pub rotations: u32,
    /// Last reported speed.
    pub reading: Option<SpeedReading>,
}

/// Single-pulse wheel speedometer.
///
/// # Type Parameters
///
/// - `T`: the counter ([`TimeBase`])
/// - `S`: the pulse sensor ([`EdgeDetector`] + [`SensorLine`])
/// - `D`: the output ([`SpeedDisplay`])
///
/// # Thread Safety
///
/// Handlers take `&mut self`, so only one runs at a time. To feed events from
/// several threads use `SharedSpeedometer` (requires the `std` feature).
pub struct Speedometer<T, S, D>
where
    T: TimeBase,
    S: EdgeDetector + SensorLine,
    D: SpeedDisplay,
{
    timer: T,
    sensor: S,
    display: D,
    config: Config,
    state: MeasurementState,
    measurer: PeriodMeasurer,
    monitor: TimeoutMonitor,
    estimator: SpeedEstimator,
}

impl<T, S, D> Speedometer<T, S, D>
where
    T: TimeBase,
    S: EdgeDetector + SensorLine,
    D: SpeedDisplay,
{
    /// Creates a speedometer. Nothing touches the hardware until
    /// [`start`](Self::start).
    pub fn new(timer: T, sensor: S, display: D, config: Config) -> Self {
        Self {
            timer,
            sensor,
            display,
            measurer: PeriodMeasurer::new(config.timing.clone()),
            monitor: TimeoutMonitor::new(config.timing.timeout_overflows),
            estimator: SpeedEstimator::from_config(&config.wheel),
            state: MeasurementState::new(),
            config,
        }
    }

    /// Initializes the display, shows zero speed and arms the sensor with the
    /// counter free-running.
    pub fn start(&mut self) -> Result<(), T::Error> {
        if let Err(e) = self.display.init() {
            log::warn!("display init failed: {:?}", e);
        }
        self.report(SpeedReading::ZERO);

        self.timer.halt()?;
        self.timer.configure(TimerMode::FreeRunningOverflow)?;
        self.sensor.enable();
        log::info!(
            "speedometer started: circumference {} m, timeout after {} ms",
            self.estimator.circumference_m(),
            self.config.timing.timeout_ms()
        );
        Ok(())
    }

    /// Dispatches one event to its handler.
    pub fn handle(&mut self, event: Event) -> Result<Transition, T::Error> {
        match event {
            Event::SensorEdge => self.on_edge(),
            Event::PollTick => self.on_poll(),
            Event::CounterOverflow => self.on_overflow(),
        }
    }

    /// Falling edge: close the window, report, start debouncing.
    ///
    /// On a timer error the measurement restarts (see
    /// [`on_timer_fault`](Self::on_timer_fault)) and the error is returned.
    pub fn on_edge(&mut self) -> Result<Transition, T::Error> {
        let result = self.close_window();
        self.recover_on_err(result)
    }

    /// Debounce poll: wait for the magnet to pass, then re-arm.
    pub fn on_poll(&mut self) -> Result<Transition, T::Error> {
        let result = self.poll_sensor();
        self.recover_on_err(result)
    }

    /// Counter overflow: count it, report standstill past the threshold.
    pub fn on_overflow(&mut self) -> Result<Transition, T::Error> {
        let result = self.count_overflow();
        self.recover_on_err(result)
    }

    fn close_window(&mut self) -> Result<Transition, T::Error> {
        let partial = self.state.partial_window;
        let measurement =
            match self
                .measurer
                .on_edge(&mut self.state, &mut self.timer, &mut self.sensor)?
            {
                Some(m) => m,
                None => return Ok(Transition::Ignored),
            };
        self.state.partial_window = false;

        let reading = if partial {
            log::info!("window restarted mid-rotation, reading skipped");
            None
        } else {
            match self.estimator.estimate(&measurement) {
                Ok(reading) => {
                    log::info!("speed {} km/h", reading.kmh);
                    self.report(reading);
                    Some(reading)
                }
                Err(PeriodRejected::NonPositive) => {
                    log::warn!("zero-length period, reading skipped");
                    None
                }
                Err(PeriodRejected::TooFast { kmh }) => {
                    log::warn!("implausible speed {} km/h, reading skipped", kmh);
                    None
                }
            }
        };

        self.measurer.start_debounce(&mut self.timer)?;
        Ok(Transition::Rotation {
            measurement,
            reading,
        })
    }

    fn poll_sensor(&mut self) -> Result<Transition, T::Error> {
        let report = self.measurer.on_poll(
            &self.monitor,
            &mut self.state,
            &mut self.timer,
            &mut self.sensor,
        )?;

        if report.timed_out {
            self.report(SpeedReading::ZERO);
            return Ok(Transition::TimedOut);
        }

        Ok(match report.outcome {
            PollOutcome::Ignored => Transition::Ignored,
            PollOutcome::StillActive => Transition::StillDebouncing,
            PollOutcome::Released => Transition::Rearmed,
        })
    }

    fn count_overflow(&mut self) -> Result<Transition, T::Error> {
        if self.state.phase() != SensorPhase::Armed {
            log::debug!("overflow while debouncing, ignored");
            return Ok(Transition::Ignored);
        }

        self.timer.halt()?;
        let outcome = self.monitor.on_overflow(&mut self.state);
        if outcome == OverflowOutcome::Expired {
            self.report(SpeedReading::ZERO);
        }
        self.timer.configure(TimerMode::FreeRunningOverflow)?;

        Ok(match outcome {
            OverflowOutcome::Counted { epoch } => Transition::Overflow { epoch },
            OverflowOutcome::Expired => Transition::TimedOut,
        })
    }

    fn recover_on_err(
        &mut self,
        result: Result<Transition, T::Error>,
    ) -> Result<Transition, T::Error> {
        if let Err(e) = &result {
            log::warn!("timer fault: {:?}", e);
            self.on_timer_fault();
        }
        result
    }

    /// Puts the speedometer back into a measuring state after a handler
    /// failed part way: phase `Armed`, a fresh window on a free-running
    /// counter, sensor edges enabled.
    ///
    /// The restarted window does not begin at a pulse, so the rotation that
    /// closes it is counted but not reported. Motion state and the last
    /// reading are kept.
    pub fn on_timer_fault(&mut self) {
        self.state.phase.force(SensorPhase::Armed);
        self.state.reset_window();
        self.state.partial_window = true;

        let restarted = self
            .timer
            .halt()
            .and_then(|()| self.timer.configure(TimerMode::FreeRunningOverflow));
        if let Err(e) = restarted {
            log::warn!("counter restart failed: {:?}", e);
        }
        self.sensor.enable();
    }

    /// Renders a reading. Display failures are logged and otherwise ignored.
    fn report(&mut self, reading: SpeedReading) {
        let line1 = title_line(&self.config.display);
        let line2 = speed_line(reading, &self.config.display);
        if let Err(e) = self.display.show_lines(&line1, &line2) {
            log::warn!("display write failed: {:?}", e);
        }
        self.state.last_reading = Some(reading);
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SpeedoState {
        SpeedoState {
            phase: self.state.phase(),
            motion: self.state.motion(),
            overflow_epoch: self.state.overflow_epoch(),
            rotations: self.state.rotations(),
            reading: self.state.last_reading(),
        }
    }

    /// The underlying measurement state.
    pub fn measurement_state(&self) -> &MeasurementState {
        &self.state
    }

    /// Last reported speed.
    pub fn last_reading(&self) -> Option<SpeedReading> {
        self.state.last_reading()
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The time base.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Mutable access to the time base (platform glue and simulations).
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// The sensor.
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Mutable access to the sensor (platform glue and simulations).
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// The display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Consumes the speedometer and returns its collaborators.
    pub fn into_parts(self) -> (T, S, D) {
        (self.timer, self.sensor, self.display)
    }
}
