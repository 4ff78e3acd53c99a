use std::time::{Duration, Instant};

use proptest::prelude::*;

use drowsiness_monitor::engine::{
    escalation::should_escalate, AlertnessEngine, DetectionSample, StateTransition,
};

const THRESHOLD: Duration = Duration::from_millis(1500);
const HEARTBEAT: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy)]
enum Frame {
    Closed,
    Open,
    NoFace,
}

fn frame_strategy() -> impl Strategy<Value = Frame> {
    prop_oneof![
        Just(Frame::Closed),
        Just(Frame::Open),
        Just(Frame::NoFace),
    ]
}

proptest! {
    /// The event counter never decreases and never jumps by more than one,
    /// and it moves only on a `BecameDrowsy` edge.
    #[test]
    fn pt_event_count_increments_only_on_drowsy_edge(
        frames in proptest::collection::vec((frame_strategy(), 1_u64..500), 1..200)
    ) {
        let mut eng = AlertnessEngine::new(1, THRESHOLD, HEARTBEAT);
        let mut t = Instant::now();
        let mut prev_events = 0u64;

        for (frame, dt_ms) in frames {
            t += Duration::from_millis(dt_ms);
            let sample = match frame {
                Frame::Closed => DetectionSample::new(1, 0, t),
                Frame::Open => DetectionSample::new(1, 2, t),
                Frame::NoFace => DetectionSample::new(0, 0, t),
            };
            let transition = eng.update(&sample, t);
            let events = eng.drowsy_events();

            prop_assert!(events >= prev_events);
            prop_assert!(events - prev_events <= 1);
            prop_assert_eq!(
                events - prev_events == 1,
                transition == Some(StateTransition::BecameDrowsy)
            );
            if eng.is_drowsy() {
                prop_assert!(eng.closed_for(t).is_some());
            }
            prev_events = events;
        }
    }

    /// First escalation lands on `base + 1`; subsequent ones are exactly
    /// `period` events apart.
    #[test]
    fn pt_escalation_schedule_is_periodic(base in 0_u64..50, period in 1_u64..10) {
        let fired: Vec<u64> = (1..=500_u64)
            .filter(|&count| should_escalate(count, base, period))
            .collect();

        prop_assert_eq!(fired[0], base + 1);
        for pair in fired.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], period);
        }
    }

    /// Continuous closure flips the state at the first sample past the
    /// threshold, regardless of the sampling interval.
    #[test]
    fn pt_flip_happens_at_threshold(dt_ms in 10_u64..400) {
        let mut eng = AlertnessEngine::new(1, THRESHOLD, HEARTBEAT);
        let base = Instant::now();
        let mut flipped_at_elapsed = None;

        for i in 0..1000u64 {
            let t = base + Duration::from_millis(dt_ms * i);
            if eng.update(&DetectionSample::new(1, 0, t), t)
                == Some(StateTransition::BecameDrowsy)
            {
                flipped_at_elapsed = Some(Duration::from_millis(dt_ms * i));
                break;
            }
        }

        let elapsed = flipped_at_elapsed.expect("continuous closure must flip eventually");
        prop_assert!(elapsed >= THRESHOLD);
        prop_assert!(elapsed < THRESHOLD + Duration::from_millis(dt_ms));
    }
}
