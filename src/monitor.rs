//! The processing loop: one sample in, zero or more notifications out.
//!
//! Strictly sequential — each iteration pulls exactly one sample, updates the
//! engine, and issues notifications for that iteration in the order the
//! transitions occurred (state change, then escalation, then heartbeat).

use serde::Serialize;
use tokio::sync::{broadcast, watch};

use crate::config::DetectionConfig;
use crate::dispatcher::{AlertDispatcher, DispatchError};
use crate::engine::{escalation, AlertnessEngine, StateTransition};
use crate::source::SignalSource;

/// Point-in-time view of the alertness state, published after every
/// iteration for the HTTP status surface.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub is_drowsy: bool,
    pub drowsy_events: u64,
}

pub struct Monitor {
    engine: AlertnessEngine,
    escalation_base: u64,
    escalation_period: u64,
    dispatcher: AlertDispatcher,
    status_tx: watch::Sender<StatusSnapshot>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl Monitor {
    pub fn new(
        config: &DetectionConfig,
        dispatcher: AlertDispatcher,
        status_tx: watch::Sender<StatusSnapshot>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            engine: AlertnessEngine::new(
                config.min_eyes_open,
                config.drowsy_threshold(),
                config.heartbeat_interval(),
            ),
            escalation_base: config.escalation_base,
            escalation_period: config.escalation_period,
            dispatcher,
            status_tx,
            shutdown_rx,
        }
    }

    /// Run until the source disconnects or a shutdown signal arrives. No
    /// notification is guaranteed to have been flushed on shutdown.
    pub async fn run<S: SignalSource>(mut self, mut source: S) {
        loop {
            let sample = tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    tracing::info!("Monitor loop received shutdown signal");
                    return;
                }
                next = source.next_sample() => match next {
                    Ok(sample) => sample,
                    Err(e) => {
                        tracing::error!(error = %e, "Signal source unavailable, stopping monitor loop");
                        return;
                    }
                },
            };

            let now = sample.timestamp;
            let transition = self.engine.update(&sample, now);

            tracing::debug!(
                faces = sample.faces,
                eyes = sample.eyes,
                closed_secs = self
                    .engine
                    .closed_for(now)
                    .map(|d| d.as_secs_f64())
                    .unwrap_or(0.0),
                "Processed frame"
            );

            match transition {
                Some(StateTransition::BecameDrowsy) => {
                    let events = self.engine.drowsy_events();
                    tracing::warn!(events, "Driver became drowsy");
                    self.log_on_failure(self.dispatcher.notify_state_change(true, events).await);

                    if escalation::should_escalate(events, self.escalation_base, self.escalation_period)
                    {
                        tracing::warn!(events, "Escalating: repeated drowsiness, sending SOS");
                        self.log_on_failure(self.dispatcher.notify_escalation().await);
                    }
                }
                Some(StateTransition::BecameAwake) => {
                    tracing::info!(
                        events = self.engine.drowsy_events(),
                        "Eyes opened, driver active again"
                    );
                    self.log_on_failure(
                        self.dispatcher
                            .notify_state_change(false, self.engine.drowsy_events())
                            .await,
                    );
                }
                None => {}
            }

            if self.engine.heartbeat_due(now) {
                self.log_on_failure(
                    self.dispatcher
                        .notify_heartbeat(self.engine.is_drowsy(), self.engine.drowsy_events())
                        .await,
                );
            }

            // 通知失败不影响状态快照的发布
            let _ = self.status_tx.send(StatusSnapshot {
                is_drowsy: self.engine.is_drowsy(),
                drowsy_events: self.engine.drowsy_events(),
            });
        }
    }

    /// At-most-once delivery: a failed notification is logged and dropped,
    /// never retried and never surfaced to the engine.
    fn log_on_failure(&self, result: Result<(), DispatchError>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "Dropping failed notification");
        }
    }
}
