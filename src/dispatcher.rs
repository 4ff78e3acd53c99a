//! Alert dispatcher.
//!
//! Fire-and-forget notifications to the monitoring backend: state changes and
//! heartbeats go to the sync endpoint, escalations to the SOS endpoint. Every
//! send is a single short-timeout POST; failures are returned as explicit
//! errors for the caller to log, never retried and never allowed to stall the
//! processing loop.

use std::time::Duration;

use serde::Serialize;

use crate::config::AlertConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncPayload {
    is_drowsy: bool,
    events: u64,
}

#[derive(Debug, Serialize)]
struct SosPayload {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("notification timed out")]
    Timeout,
    #[error("notification transport error: {0}")]
    Transport(String),
    #[error("monitoring endpoint returned status {0}")]
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    client: reqwest::Client,
    sync_url: String,
    sos_url: String,
    sync_timeout: Duration,
    sos_timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(config: &AlertConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DispatchError::Client(e.to_string()))?;
        Ok(Self {
            client,
            sync_url: config.sync_url.clone(),
            sos_url: config.sos_url.clone(),
            sync_timeout: Duration::from_millis(config.sync_timeout_ms),
            sos_timeout: Duration::from_millis(config.sos_timeout_ms),
        })
    }

    /// Invoked on every `BecameDrowsy`/`BecameAwake` transition.
    pub async fn notify_state_change(
        &self,
        is_drowsy: bool,
        events: u64,
    ) -> Result<(), DispatchError> {
        self.post_sync(is_drowsy, events).await
    }

    /// Periodic sync, same endpoint and payload as a state change so the
    /// backend cannot tell a silent monitor from a quiet one.
    pub async fn notify_heartbeat(
        &self,
        is_drowsy: bool,
        events: u64,
    ) -> Result<(), DispatchError> {
        self.post_sync(is_drowsy, events).await
    }

    /// Emergency escalation; carries only the fixed category tag.
    pub async fn notify_escalation(&self) -> Result<(), DispatchError> {
        let resp = self
            .client
            .post(&self.sos_url)
            .timeout(self.sos_timeout)
            .json(&SosPayload { kind: "drowsiness" })
            .send()
            .await
            .map_err(map_send_error)?;
        check_status(resp)
    }

    async fn post_sync(&self, is_drowsy: bool, events: u64) -> Result<(), DispatchError> {
        let resp = self
            .client
            .post(&self.sync_url)
            .timeout(self.sync_timeout)
            .json(&SyncPayload { is_drowsy, events })
            .send()
            .await
            .map_err(map_send_error)?;
        check_status(resp)
    }
}

fn map_send_error(e: reqwest::Error) -> DispatchError {
    if e.is_timeout() {
        DispatchError::Timeout
    } else {
        DispatchError::Transport(e.to_string())
    }
}

fn check_status(resp: reqwest::Response) -> Result<(), DispatchError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(DispatchError::Status(status.as_u16()))
    }
}
