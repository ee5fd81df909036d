//! HTTP surface
//!
//! One process hosts one editor: the form, the workflow and the session in
//! `AppState` are shared by every request. Handlers lock the form only for
//! synchronous work and never across an await.

mod cards;
mod editor;
mod error;
mod exports;
mod page;
mod session;

#[cfg(test)]
mod tests;

pub use error::ApiError;

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Query, State},
    response::{IntoResponse, Redirect},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::auth::Session;
use crate::card::{SocialCardData, TemplateId};
use crate::config::{Config, VERSION};
use crate::export::{Clipboard, Downloads};
use crate::form::{CardForm, Field};
use crate::notify::Notifications;
use crate::store::CardStore;
use crate::workflow::{CardWorkflow, ShareSettings};

const DEFAULT_NOTIFICATION_LIMIT: usize = 20;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub notifications: Notifications,
    pub session: Arc<Session>,
    pub workflow: Arc<CardWorkflow>,
    pub form: Arc<Mutex<CardForm>>,
    pub downloads: Downloads,
    pub clipboard: Arc<dyn Clipboard>,
}

impl AppState {
    pub fn new(
        config: Config,
        notifications: Notifications,
        session: Arc<Session>,
        store: Arc<dyn CardStore>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let share = ShareSettings {
            base_url: config.share.base_url.clone(),
            require_auth: config.share.require_auth,
        };
        let workflow = Arc::new(CardWorkflow::new(
            config.editor.default_template,
            Arc::clone(&session),
            store,
            notifications.clone(),
            Arc::clone(&clipboard),
            share,
        ));
        workflow.prefill_from_session();

        let form = CardForm::new(
            config.editor.form_variant,
            workflow.card(),
            notifications.clone(),
            workflow.update_sink(),
        );

        Self {
            downloads: Downloads::new(config.export.download_dir.clone()),
            config: Arc::new(config),
            notifications,
            session,
            workflow,
            form: Arc::new(Mutex::new(form)),
            clipboard,
        }
    }

    /// A poisoned lock still holds a usable form
    pub(crate) fn lock_form(&self) -> MutexGuard<'_, CardForm> {
        self.form.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a fresh card on `template`
    pub(crate) fn reset_editor(&self, template: TemplateId) {
        self.workflow.set_template(template);
        self.workflow.update(SocialCardData::default());
        self.workflow.prefill_from_session();

        let form = CardForm::new(
            self.config.editor.form_variant,
            self.workflow.card(),
            self.notifications.clone(),
            self.workflow.update_sink(),
        );
        *self.lock_form() = form;
    }

    /// After sign-in, fill an empty email field through the form so the
    /// form and the workflow stay in step
    pub(crate) fn prefill_email(&self) {
        let Some(user) = self.session.user() else {
            return;
        };
        let mut form = self.lock_form();
        if form.snapshot().email.is_empty() {
            form.change(Field::Email, user.email);
        }
    }
}

/// Build the router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/create") }))
        // Editor
        .route("/create", get(editor::create_page))
        .route("/api/editor", get(editor::get_editor))
        .route("/api/editor/field", post(editor::change_field))
        .route(
            "/api/editor/photo",
            // The handler enforces the photo limit itself so it can notify
            post(editor::upload_photo).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/editor/submit", post(editor::submit))
        .route("/api/preview", get(editor::preview))
        // Export
        .route("/api/export", get(exports::download))
        .route("/api/export/link", post(exports::quick_link))
        // Saved cards and sharing
        .route("/api/cards", post(cards::save).get(cards::list))
        .route("/api/cards/:id", delete(cards::remove))
        .route("/saved-cards", get(cards::saved_cards_page))
        .route("/api/share", post(cards::share))
        .route("/share/:id", get(cards::share_page))
        // Session
        .route("/api/auth/login", post(session::login))
        .route("/api/auth/logout", post(session::logout))
        .route("/api/auth/whoami", get(session::whoami))
        // Misc
        .route("/api/notifications", get(get_notifications))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    pub limit: Option<usize>,
}

/// GET /api/notifications - newest first
async fn get_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationsQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT).clamp(1, 100);
    Json(state.notifications.recent(limit))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "version": VERSION }))
}

/// Start the HTTP server
pub async fn start_server(
    config: &Config,
    state: AppState,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<()> {
    let bind_addr = config.bind_addr;
    let app = router(state);

    tracing::info!("Starting server on {}", bind_addr);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    tracing::info!("Server listening on {}", bind_addr);

    // Stop accepting on shutdown, finish in-flight requests
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
        })
        .await
        .context("Server error")?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}
