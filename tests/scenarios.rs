//! End-to-end ride scenarios on simulated hardware.
//!
//! A [`Bench`] moves simulated time forward on the mock counter and delivers
//! every event the hardware would raise, so windows, debounce polls and
//! overflows interleave the way they do on a real wheel.

use rs_speedo::{
    hal::{MockDisplay, MockSensor, MockTimeBase},
    Config, Event, MotionState, SensorPhase, SpeedReading, Speedometer, TimingConfig, Transition,
    WheelConfig,
};

const RANGE: u64 = 65_536;
const POLL: u64 = 32_000;

struct Bench {
    speedo: Speedometer<MockTimeBase, MockSensor, MockDisplay>,
    transitions: Vec<Transition>,
}

impl Bench {
    fn new(config: Config) -> Self {
        let mut speedo = Speedometer::new(
            MockTimeBase::new(),
            MockSensor::new(),
            MockDisplay::new(),
            config,
        );
        speedo.start().unwrap();
        Self {
            speedo,
            transitions: Vec::new(),
        }
    }

    fn deliver(&mut self, event: Event) {
        let t = self.speedo.handle(event).unwrap();
        self.transitions.push(t);
    }

    /// Lets `ticks` pass, delivering every timer event raised on the way.
    fn run(&mut self, mut ticks: u64) {
        while ticks > 0 {
            let (used, event) = self.speedo.timer_mut().advance(ticks);
            ticks -= used;
            if let Some(event) = event {
                self.deliver(event);
            }
        }
    }

    /// Moves the magnet over (`true`) or away from (`false`) the sensor.
    fn magnet(&mut self, active: bool) {
        if let Some(event) = self.speedo.sensor_mut().set_active(active) {
            self.deliver(event);
        }
    }

    /// One wheel revolution: the magnet passes in `dwell` ticks, the rest of
    /// `period` is spent away from the sensor.
    fn revolution(&mut self, period: u64, dwell: u64) {
        self.magnet(true);
        self.run(dwell);
        self.magnet(false);
        self.run(period - dwell);
    }

    fn count(&self, pred: impl Fn(&Transition) -> bool) -> usize {
        self.transitions.iter().filter(|t| pred(t)).count()
    }

    fn rotations(&self) -> Vec<(u64, Option<SpeedReading>)> {
        self.transitions
            .iter()
            .filter_map(|t| match t {
                Transition::Rotation {
                    measurement,
                    reading,
                } => Some((measurement.elapsed_ticks, *reading)),
                _ => None,
            })
            .collect()
    }

    fn shown(&self) -> Option<(&str, &str)> {
        self.speedo.display().last_lines()
    }
}

// ============================================================================
// Debounce
// ============================================================================

#[test]
fn three_active_polls_then_release_rearms_once() {
    let mut bench = Bench::new(Config::default());
    bench.run(500_000);

    bench.magnet(true);
    bench.run(3 * POLL);
    bench.magnet(false);
    bench.run(POLL);

    assert_eq!(bench.count(|t| matches!(t, Transition::Rotation { .. })), 1);
    assert_eq!(bench.count(|t| *t == Transition::StillDebouncing), 3);
    assert_eq!(bench.count(|t| *t == Transition::Rearmed), 1);
    assert_eq!(bench.speedo.state().phase, SensorPhase::Armed);
    assert!(bench.speedo.sensor().enable_calls >= 2);
}

#[test]
fn contact_bounce_is_one_rotation() {
    let mut bench = Bench::new(Config::default());
    bench.run(500_000);

    // Chatter well inside the first poll interval
    for _ in 0..5 {
        bench.magnet(true);
        bench.run(1_000);
        bench.magnet(false);
        bench.run(1_000);
    }
    bench.run(POLL);

    assert_eq!(bench.rotations().len(), 1);
    assert_eq!(bench.speedo.state().phase, SensorPhase::Armed);
}

#[test]
fn parked_magnet_is_one_rotation_and_times_out() {
    let mut bench = Bench::new(Config::default());
    bench.run(200_000);

    bench.magnet(true);
    bench.run(5_000_000);

    assert_eq!(bench.rotations().len(), 1);
    assert_eq!(bench.count(|t| *t == Transition::TimedOut), 1);
    assert_eq!(bench.shown(), Some((" Speed", " 0 kmph")));
    assert_eq!(bench.speedo.state().phase, SensorPhase::Debouncing);

    bench.magnet(false);
    bench.run(POLL);
    assert_eq!(bench.speedo.state().phase, SensorPhase::Armed);
    assert_eq!(bench.rotations().len(), 1);
}

// ============================================================================
// Speed
// ============================================================================

#[test]
fn steady_ride_gives_identical_readings() {
    let mut bench = Bench::new(Config::default());
    let period = 200_000;
    bench.run(period);

    for _ in 0..10 {
        bench.revolution(period, 10_000);
    }

    let rotations = bench.rotations();
    assert_eq!(rotations.len(), 10);
    // 0.895 m in 0.2 s = 16.1 km/h
    for (elapsed, reading) in rotations {
        assert_eq!(elapsed, period);
        assert_eq!(reading, Some(SpeedReading::new(16)));
    }
    assert_eq!(bench.shown(), Some((" Speed", " 16 kmph")));
}

#[test]
fn slow_and_fast_wheel() {
    let mut bench = Bench::new(Config::default());
    bench.run(1_000_000);
    bench.revolution(1_000_000, 50_000);
    bench.magnet(true);

    let rotations = bench.rotations();
    assert_eq!(rotations[0], (1_000_000, Some(SpeedReading::new(3))));
    assert_eq!(rotations[1], (1_000_000, Some(SpeedReading::new(3))));

    let mut bench = Bench::new(Config::default());
    bench.run(100_000);
    bench.revolution(100_000, 5_000);
    bench.magnet(true);

    let rotations = bench.rotations();
    assert_eq!(rotations[1], (100_000, Some(SpeedReading::new(32))));
    assert_eq!(bench.shown(), Some((" Speed", " 32 kmph")));
}

#[test]
fn acceleration_shows_latest_speed() {
    let mut bench = Bench::new(Config::default());
    bench.run(400_000);
    for period in [400_000, 300_000, 200_000, 100_000] {
        bench.revolution(period, 5_000);
    }
    bench.magnet(true);

    let speeds: Vec<u16> = bench
        .rotations()
        .into_iter()
        .filter_map(|(_, r)| r.map(|r| r.kmh))
        .collect();
    // 400 ms, 400 ms, 300 ms, 200 ms, 100 ms
    assert_eq!(speeds, vec![8, 8, 10, 16, 32]);
    assert_eq!(bench.shown(), Some((" Speed", " 32 kmph")));
}

#[test]
fn glitch_right_after_rearm_is_rejected() {
    let config = Config::default().with_wheel(WheelConfig::default().with_max_plausible_kmh(60));
    let mut bench = Bench::new(config);
    bench.run(500_000);
    bench.magnet(true);
    bench.run(5_000);
    bench.magnet(false);
    bench.run(POLL - 5_000);
    assert_eq!(bench.speedo.state().phase, SensorPhase::Armed);
    let shown = bench.speedo.display().show_count;

    // Spurious pulse 100 ticks after the sensor re-armed: 32.1 ms, ~100 km/h
    bench.run(100);
    bench.magnet(true);

    let last = *bench.rotations().last().unwrap();
    assert_eq!(last.1, None);
    assert_eq!(bench.speedo.display().show_count, shown);
    assert_eq!(bench.shown(), Some((" Speed", " 6 kmph")));
}

#[test]
fn timer_fault_does_not_stop_the_ride() {
    let mut bench = Bench::new(Config::default());
    let period = 200_000;
    bench.run(period);

    bench.speedo.timer_mut().fail_next();
    let edge = bench.speedo.sensor_mut().set_active(true).unwrap();
    assert!(bench.speedo.handle(edge).is_err());
    bench.magnet(false);
    bench.run(period);

    for _ in 0..10 {
        bench.revolution(period, 10_000);
    }

    let rotations = bench.rotations();
    assert_eq!(rotations.len(), 10);
    // The window restarted at the fault is not shown
    assert_eq!(rotations[0], (period, None));
    for rotation in &rotations[1..] {
        assert_eq!(*rotation, (period, Some(SpeedReading::new(16))));
    }
    assert_eq!(bench.shown(), Some((" Speed", " 16 kmph")));
}

// ============================================================================
// Timeout
// ============================================================================

#[test]
fn stop_reports_zero_once_at_threshold() {
    let mut bench = Bench::new(Config::default());
    bench.run(100_000);
    bench.revolution(100_000, 5_000);
    bench.magnet(true);
    bench.magnet(false);
    bench.run(POLL);
    assert_eq!(bench.shown(), Some((" Speed", " 32 kmph")));
    let shown = bench.speedo.display().show_count;

    // Counter restarted at the re-arm; 19 wraps are not enough
    bench.run(19 * RANGE);
    assert_eq!(bench.count(|t| *t == Transition::TimedOut), 0);
    assert_eq!(bench.speedo.state().motion, MotionState::Active);

    bench.run(RANGE);
    assert_eq!(bench.count(|t| *t == Transition::TimedOut), 1);
    assert_eq!(bench.shown(), Some((" Speed", " 0 kmph")));
    assert_eq!(bench.speedo.display().show_count, shown + 1);

    // 21st and later overflows add nothing
    bench.run(RANGE);
    bench.run(50 * RANGE);
    assert_eq!(bench.count(|t| *t == Transition::TimedOut), 1);
    assert_eq!(bench.speedo.display().show_count, shown + 1);
    assert_eq!(bench.speedo.state().motion, MotionState::Timeout);
}

#[test]
fn stopped_from_power_on() {
    let mut bench = Bench::new(Config::default());
    bench.run(20 * RANGE);
    assert_eq!(bench.count(|t| *t == Transition::TimedOut), 1);
    assert_eq!(bench.speedo.state().motion, MotionState::Timeout);
}

#[test]
fn riding_again_after_stop() {
    let config = Config::default().with_timing(TimingConfig::default().with_timeout_overflows(5));
    let mut bench = Bench::new(config);
    bench.run(5 * RANGE);
    assert_eq!(bench.speedo.state().motion, MotionState::Timeout);

    bench.run(100_000);
    bench.revolution(100_000, 5_000);
    bench.magnet(true);

    assert_eq!(bench.speedo.state().motion, MotionState::Active);
    assert_eq!(bench.rotations().last(), Some(&(100_000, Some(SpeedReading::new(32)))));
    assert_eq!(bench.shown(), Some((" Speed", " 32 kmph")));
}

#[test]
fn display_sees_only_real_updates() {
    let mut bench = Bench::new(Config::default());
    bench.run(250_000);
    for _ in 0..4 {
        bench.revolution(250_000, 5_000);
    }
    bench.run(30 * RANGE);

    let screens: Vec<&str> = bench
        .speedo
        .display()
        .screens
        .iter()
        .map(|(_, l2)| l2.as_str())
        .collect();
    // start, four readings at 12 km/h, one standstill
    assert_eq!(
        screens,
        vec![" 0 kmph", " 12 kmph", " 12 kmph", " 12 kmph", " 12 kmph", " 0 kmph"]
    );
}
