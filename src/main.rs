use std::net::SocketAddr;

use drowsiness_monitor::config::Config;
use drowsiness_monitor::dispatcher::AlertDispatcher;
use drowsiness_monitor::logging::init_tracing;
use drowsiness_monitor::monitor::{Monitor, StatusSnapshot};
use drowsiness_monitor::routes::build_router;
use drowsiness_monitor::source::{run_stdin_producer, ChannelSource};
use drowsiness_monitor::state::AppState;
use tokio::sync::{broadcast, watch};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(&config);
    tracing::info!("Starting drowsiness-monitor");

    // Misconfiguration fails fast, before any sample is consumed.
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    }

    let dispatcher =
        AlertDispatcher::new(&config.alert).expect("Failed to build alert dispatcher");

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let (status_tx, status_rx) = watch::channel(StatusSnapshot::default());
    let (sample_tx, source) = ChannelSource::new(config.detection.sample_queue_depth);

    let monitor = Monitor::new(
        &config.detection,
        dispatcher,
        status_tx,
        shutdown_tx.subscribe(),
    );
    let monitor_handle = tokio::spawn(monitor.run(source));

    // The classifier collaborator writes one `<faces> <eyes>` line per frame.
    tokio::spawn(run_stdin_producer(sample_tx));

    let state = AppState::new(status_rx, shutdown_tx.clone());
    let app = build_router(state);

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");

    let server_future = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()));

    if let Err(e) = server_future.await {
        tracing::error!(error = %e, "HTTP server crashed");
    }

    // 关停时不保证已发出的通知全部送达（尽力而为语义）
    if let Err(e) = monitor_handle.await {
        tracing::error!(error = %e, "Monitor loop panicked");
    }
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
