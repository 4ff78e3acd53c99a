//! Driver drowsiness monitor: turns a per-frame `(faces, eyes)` detection
//! stream into a debounced drowsy/awake state and pushes best-effort status
//! syncs and throttled SOS escalations to a monitoring backend.

pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod logging;
pub mod monitor;
pub mod routes;
pub mod source;
pub mod state;
