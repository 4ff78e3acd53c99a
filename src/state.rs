use std::time::Instant;

use tokio::sync::{broadcast, watch};

use crate::monitor::StatusSnapshot;

/// Shared handle for the HTTP status surface. The monitor loop remains the
/// exclusive owner of the alertness state; routes only see snapshots
/// published through the watch channel.
#[derive(Clone)]
pub struct AppState {
    status_rx: watch::Receiver<StatusSnapshot>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(status_rx: watch::Receiver<StatusSnapshot>, shutdown_tx: broadcast::Sender<()>) -> Self {
        Self {
            status_rx,
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status_rx.borrow().clone()
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
