// NexCard - social card editor
//
// A local web service for designing a digital business card, previewing it
// across templates, exporting it as an image and sharing it by link.
//
// Architecture:
// - Server (axum): editor page, JSON API, public share pages
// - Form + workflow: the card being edited, validation, save/share
// - Render + export: pure card layout, HTML fragment, PNG/JPG raster
// - Store (rusqlite + r2d2): saved cards
// - Notifications: toast feed shared by every component

mod auth;
mod card;
mod cli;
mod config;
mod export;
mod form;
mod logging;
mod notify;
mod popup;
mod render;
mod server;
mod startup;
mod store;
mod workflow;

use std::sync::Arc;

use anyhow::{Context, Result};

use auth::{DemoAuthProvider, Session};
use config::Config;
use export::{Clipboard, DisabledClipboard, SystemClipboard};
use notify::Notifications;
use store::{CardStore, SqliteCardStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --path, --reset)
    if cli::handle_cli()? {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env();

    // The guard must live until shutdown so file logs flush
    let _file_guard = logging::init(&config.logging)?;

    startup::print_startup(&config);
    startup::log_startup(&config);

    let store: Arc<dyn CardStore> = Arc::new(
        SqliteCardStore::open(&config.store.db_path).with_context(|| {
            format!("Failed to open card store at {}", config.store.db_path.display())
        })?,
    );

    let notifications = Notifications::new();

    let provider = Arc::new(
        DemoAuthProvider::new(&config.auth.demo_email, &config.auth.demo_password)
            .context("Invalid demo credentials in [auth]")?,
    );
    let session = Arc::new(Session::new(
        provider,
        notifications.clone(),
        config.auth.session_file.clone(),
    ));
    if session.restore().await {
        tracing::info!("Signed in from session file");
    }

    let clipboard: Arc<dyn Clipboard> = if config.features.clipboard {
        Arc::new(SystemClipboard)
    } else {
        Arc::new(DisabledClipboard)
    };

    let popup = config
        .features
        .inspiration_popup
        .then(|| popup::spawn_inspiration(notifications.clone(), config.popup));

    let state = server::AppState::new(
        config.clone(),
        notifications,
        session,
        store,
        clipboard,
    );

    // Oneshot: the server stops accepting once this fires
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let server_config = config.clone();
    let mut server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(&server_config, state, shutdown_rx).await {
            tracing::error!("Server error: {:?}", e);
        }
    });

    // A bind failure ends the server task before any Ctrl+C
    let server_running = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl+C")?;
            true
        }
        _ = &mut server_handle => {
            tracing::error!("Server stopped unexpectedly");
            false
        }
    };

    tracing::info!("Shutting down...");

    if let Some(popup) = popup {
        popup.cancel().await;
    }

    if server_running {
        // If the send fails, the server has already shut down
        let _ = shutdown_tx.send(());
        let _ = server_handle.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
