use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::Config;

pub fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let stdout_layer = fmt::layer().with_target(true).with_thread_ids(false);

    let registry = Registry::default().with(env_filter).with(stdout_layer);

    if config.enable_file_logs {
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("drowsiness-monitor")
            .filename_suffix("log")
            .max_log_files(30)
            .build(&config.log_dir)
            .expect("Failed to create rolling file appender");
        let file_layer = fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .json();
        try_init_or_panic(registry.with(file_layer).try_init());
    } else {
        try_init_or_panic(registry.try_init());
    }
}

// A subscriber may already be set by another test in the same process; only
// that failure mode is tolerated.
fn try_init_or_panic(result: Result<(), tracing_subscriber::util::TryInitError>) {
    if let Err(e) = result {
        let msg = e.to_string();
        if !msg.contains("already been set") {
            panic!("Failed to initialize tracing: {e}");
        }
    }
}
