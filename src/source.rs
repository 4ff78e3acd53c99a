//! Signal source seam.
//!
//! The camera/classifier pair is an external collaborator; the monitor loop
//! only consumes `DetectionSample`s through the [`SignalSource`] trait. A live
//! producer feeds a bounded SPSC channel; tests replay scripted sequences.

use std::time::Instant;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::engine::DetectionSample;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("signal source disconnected")]
    Disconnected,
}

#[allow(async_fn_in_trait)]
pub trait SignalSource {
    /// Blocks until the next frame's sample is available. Samples arrive in
    /// strict temporal order; the stream is not restartable once it ends.
    async fn next_sample(&mut self) -> Result<DetectionSample, SourceError>;
}

/// Live source: receiving half of a bounded single-producer channel fed by
/// whatever process or thread runs frame acquisition and classification.
pub struct ChannelSource {
    rx: mpsc::Receiver<DetectionSample>,
}

impl ChannelSource {
    pub fn new(capacity: usize) -> (mpsc::Sender<DetectionSample>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }
}

impl SignalSource for ChannelSource {
    async fn next_sample(&mut self) -> Result<DetectionSample, SourceError> {
        self.rx.recv().await.ok_or(SourceError::Disconnected)
    }
}

/// Deterministic source for tests: yields a scripted sequence, then reports
/// the source as disconnected.
pub struct ReplaySource {
    samples: std::vec::IntoIter<DetectionSample>,
}

impl ReplaySource {
    pub fn new(samples: Vec<DetectionSample>) -> Self {
        Self {
            samples: samples.into_iter(),
        }
    }
}

impl SignalSource for ReplaySource {
    async fn next_sample(&mut self) -> Result<DetectionSample, SourceError> {
        self.samples.next().ok_or(SourceError::Disconnected)
    }
}

/// Bridge a line-oriented classifier process on stdin into the sample
/// channel. Each line carries `<faces> <eyes>`; malformed lines are logged
/// and skipped. Returns when stdin closes or the loop side hangs up.
pub async fn run_stdin_producer(tx: mpsc::Sender<DetectionSample>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(sample) = parse_sample_line(&line) else {
                    tracing::warn!(line = %line.trim(), "Ignoring malformed detection line");
                    continue;
                };
                if tx.send(sample).await.is_err() {
                    return;
                }
            }
            Ok(None) => {
                tracing::info!("Detection input stream ended");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read detection input");
                return;
            }
        }
    }
}

fn parse_sample_line(line: &str) -> Option<DetectionSample> {
    let mut parts = line.split_whitespace();
    let faces = parts.next()?.parse::<u32>().ok()?;
    let eyes = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(DetectionSample::new(faces, eyes, Instant::now()))
}
