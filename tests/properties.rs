//! Property tests for window reconstruction, speed conversion, stop
//! detection and debouncing.

use proptest::prelude::*;
use rs_speedo::{
    hal::{MockDisplay, MockSensor, MockTimeBase},
    state::reconstruct_elapsed,
    Config, Event, Measurement, MeasurementState, MotionState, OverflowOutcome, SensorPhase,
    SpeedEstimator, Speedometer, TimeoutMonitor, TimingConfig, Transition,
};

type MockSpeedo = Speedometer<MockTimeBase, MockSensor, MockDisplay>;

fn started() -> MockSpeedo {
    let mut speedo = Speedometer::new(
        MockTimeBase::new(),
        MockSensor::new(),
        MockDisplay::new(),
        Config::default(),
    );
    speedo.start().unwrap();
    speedo
}

/// Lets `ticks` pass and returns every transition on the way.
fn run(speedo: &mut MockSpeedo, mut ticks: u64) -> Vec<Transition> {
    let mut out = Vec::new();
    while ticks > 0 {
        let (used, event) = speedo.timer_mut().advance(ticks);
        ticks -= used;
        if let Some(event) = event {
            out.push(speedo.handle(event).unwrap());
        }
    }
    out
}

fn is_rotation(t: &Transition) -> bool {
    matches!(t, Transition::Rotation { .. })
}

proptest! {
    #[test]
    fn reconstruction_is_exact(tick in 0u32..65_536, epoch in 0u32..100_000) {
        prop_assert_eq!(
            reconstruct_elapsed(tick, epoch, 65_536),
            tick as u64 + epoch as u64 * 65_536
        );
    }

    #[test]
    fn first_window_measured_exactly(epoch in 0u64..20, tick in 0u64..65_536) {
        let mut speedo = started();
        let elapsed = epoch * 65_536 + tick;
        run(&mut speedo, elapsed);

        let t = speedo.handle(Event::SensorEdge).unwrap();
        match t {
            Transition::Rotation { measurement, .. } => {
                prop_assert_eq!(measurement.elapsed_ticks, elapsed)
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
        prop_assert_eq!(speedo.state().overflow_epoch, 0);
    }

    #[test]
    fn window_after_debounce_measured_exactly(
        dwell_polls in 1u64..10,
        gap in 1u64..1_000_000,
    ) {
        let mut speedo = started();
        run(&mut speedo, 100_000);
        if let Some(e) = speedo.sensor_mut().set_active(true) {
            speedo.handle(e).unwrap();
        }
        // Release just before the last poll of the dwell
        run(&mut speedo, dwell_polls * 32_000 - 1);
        speedo.sensor_mut().set_active(false);
        run(&mut speedo, 1 + gap);

        prop_assert_eq!(speedo.state().phase, SensorPhase::Armed);
        let t = speedo.handle(Event::SensorEdge).unwrap();
        match t {
            Transition::Rotation { measurement, .. } => {
                prop_assert_eq!(measurement.elapsed_ticks, dwell_polls * 32_000 + gap)
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    #[test]
    fn estimator_is_monotonic(a in 1u64..10_000_000, b in 1u64..10_000_000) {
        let timing = TimingConfig::default();
        let estimator = SpeedEstimator::new(core::f32::consts::PI * 0.285, u16::MAX);
        let (short, long) = if a <= b { (a, b) } else { (b, a) };

        let fast = estimator.estimate(&Measurement::from_ticks(short, &timing));
        let slow = estimator.estimate(&Measurement::from_ticks(long, &timing));
        if let (Ok(fast), Ok(slow)) = (fast, slow) {
            prop_assert!(fast >= slow);
        }
    }

    #[test]
    fn estimator_is_pure(ticks in 0u64..10_000_000) {
        let timing = TimingConfig::default();
        let estimator = SpeedEstimator::new(core::f32::consts::PI * 0.285, 150);
        let m = Measurement::from_ticks(ticks, &timing);
        prop_assert_eq!(estimator.estimate(&m), estimator.estimate(&m));
    }

    #[test]
    fn timeout_fires_exactly_once(threshold in 1u32..50, extra in 0u32..100) {
        let monitor = TimeoutMonitor::new(threshold);
        let mut state = MeasurementState::new();

        let outcomes: Vec<_> = (0..threshold + extra)
            .map(|_| monitor.on_overflow(&mut state))
            .collect();

        let expiries: Vec<usize> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| **o == OverflowOutcome::Expired)
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(expiries, vec![threshold as usize - 1]);
        prop_assert_eq!(state.motion(), MotionState::Timeout);
    }

    #[test]
    fn one_rotation_per_active_interval(dwell in 0u64..3_000_000) {
        let mut speedo = started();
        run(&mut speedo, 200_000);

        let mut transitions = Vec::new();
        if let Some(e) = speedo.sensor_mut().set_active(true) {
            transitions.push(speedo.handle(e).unwrap());
        }
        transitions.extend(run(&mut speedo, dwell));
        speedo.sensor_mut().set_active(false);
        transitions.extend(run(&mut speedo, 32_000));

        prop_assert_eq!(transitions.iter().filter(|t| is_rotation(t)).count(), 1);
        prop_assert_eq!(speedo.state().phase, SensorPhase::Armed);
        prop_assert_eq!(speedo.state().rotations, 1);
    }

    #[test]
    fn chatter_inside_debounce_is_one_rotation(
        chatter in proptest::collection::vec(1u64..2_000, 1..15),
    ) {
        let mut speedo = started();
        run(&mut speedo, 200_000);

        let mut transitions = Vec::new();
        let mut active = false;
        let mut spent = 0;
        for step in chatter {
            if spent + step >= 32_000 {
                break;
            }
            active = !active;
            if let Some(e) = speedo.sensor_mut().set_active(active) {
                transitions.push(speedo.handle(e).unwrap());
            }
            transitions.extend(run(&mut speedo, step));
            spent += step;
        }
        speedo.sensor_mut().set_active(false);
        transitions.extend(run(&mut speedo, 32_000));

        prop_assert_eq!(transitions.iter().filter(|t| is_rotation(t)).count(), 1);
    }
}
