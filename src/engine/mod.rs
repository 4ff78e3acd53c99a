//! Debounce/hysteresis engine.
//!
//! Converts the raw per-frame detection stream into a binary drowsy/awake
//! state. Eyes must stay closed for a sustained duration before the state
//! flips to drowsy; a single open-eyes frame flips it back immediately and
//! restarts the debounce window.

pub mod escalation;

use std::time::{Duration, Instant};

/// One detection result per processed video frame. Not retained beyond the
/// loop iteration that consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionSample {
    pub faces: u32,
    pub eyes: u32,
    pub timestamp: Instant,
}

impl DetectionSample {
    pub fn new(faces: u32, eyes: u32, timestamp: Instant) -> Self {
        Self {
            faces,
            eyes,
            timestamp,
        }
    }
}

/// Edge-triggered transition returned by [`AlertnessEngine::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTransition {
    BecameDrowsy,
    BecameAwake,
}

/// Mutable alertness state, owned exclusively by the monitor loop.
///
/// Invariants:
/// - `is_drowsy == true` implies `eyes_closed_since.is_some()`
/// - `drowsy_events` is non-decreasing and increments exactly once per
///   false→true edge of `is_drowsy`
///
/// Counters reset to zero on restart; there is no persistence.
#[derive(Debug, Clone)]
struct AlertnessState {
    eyes_closed_since: Option<Instant>,
    is_drowsy: bool,
    drowsy_events: u64,
    /// None until the first heartbeat is attempted, so the first processed
    /// frame always triggers a sync.
    last_heartbeat_at: Option<Instant>,
}

pub struct AlertnessEngine {
    min_eyes_open: u32,
    drowsy_threshold: Duration,
    heartbeat_interval: Duration,
    state: AlertnessState,
}

impl AlertnessEngine {
    pub fn new(min_eyes_open: u32, drowsy_threshold: Duration, heartbeat_interval: Duration) -> Self {
        Self {
            min_eyes_open,
            drowsy_threshold,
            heartbeat_interval,
            state: AlertnessState {
                eyes_closed_since: None,
                is_drowsy: false,
                drowsy_events: 0,
                last_heartbeat_at: None,
            },
        }
    }

    /// Feed one sample into the engine. Returns a transition only on the
    /// edge, never on a sustained state.
    ///
    /// A frame without a face counts as "eyes not closed": absence of signal
    /// is not evidence of drowsiness. This also means a face that disappears
    /// and reappears restarts the closed-eyes timer, identically to eyes
    /// reopening.
    pub fn update(&mut self, sample: &DetectionSample, now: Instant) -> Option<StateTransition> {
        let face_present = sample.faces > 0;
        let eyes_closed = face_present && sample.eyes < self.min_eyes_open;

        if eyes_closed {
            let since = *self.state.eyes_closed_since.get_or_insert(now);
            let closed_for = now.saturating_duration_since(since);
            if closed_for >= self.drowsy_threshold && !self.state.is_drowsy {
                self.state.is_drowsy = true;
                self.state.drowsy_events += 1;
                return Some(StateTransition::BecameDrowsy);
            }
            None
        } else {
            self.state.eyes_closed_since = None;
            if self.state.is_drowsy {
                self.state.is_drowsy = false;
                return Some(StateTransition::BecameAwake);
            }
            None
        }
    }

    /// True when a periodic sync is due. Stamps `last_heartbeat_at`
    /// unconditionally on every `true` return, whether or not the subsequent
    /// send attempt succeeds.
    pub fn heartbeat_due(&mut self, now: Instant) -> bool {
        let due = match self.state.last_heartbeat_at {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= self.heartbeat_interval,
        };
        if due {
            self.state.last_heartbeat_at = Some(now);
        }
        due
    }

    pub fn is_drowsy(&self) -> bool {
        self.state.is_drowsy
    }

    pub fn drowsy_events(&self) -> u64 {
        self.state.drowsy_events
    }

    /// How long eyes have been continuously closed as of `now`, for logging.
    pub fn closed_for(&self, now: Instant) -> Option<Duration> {
        self.state
            .eyes_closed_since
            .map(|since| now.saturating_duration_since(since))
    }
}
