mod action;
mod app;
mod app_state;
mod component;
mod components;
mod theme;
mod widgets;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use whatanime_proto::backend::HttpBackend;
use whatanime_proto::config::Config;
use whatanime_proto::sync::{SyncLoop, SyncMessage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = whatanime_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = whatanime_proto::platform::log_file();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("whatanime log: {}", log_path.display());

    tracing::info!("whatanime starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load().unwrap_or_default();
    let backend = Arc::new(HttpBackend::new(&config.backend)?);
    tracing::info!("backend {}", backend.base_url());

    // ── Sync loop (backend → TUI) ────────────────────────────────────────────
    let (sync_tx, sync_rx) = mpsc::channel::<SyncMessage>(64);
    let (sync_loop, sync_handle) = SyncLoop::new(
        Arc::clone(&backend),
        Duration::from_millis(config.backend.poll_interval_ms),
        sync_tx,
    );
    let sync_task = sync_loop.spawn();

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(
        backend,
        sync_handle.clone(),
        config.display.initial_settings(),
        config.backend.open_browser_on_login,
    );
    let result = app.run(sync_rx).await;

    sync_handle.stop();
    if let Err(e) = sync_task.await {
        tracing::warn!("sync task ended abnormally: {}", e);
    }
    result
}
