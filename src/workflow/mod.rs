//! Card persistence workflow
//!
//! Owns the in-memory card being edited and the two transient flags that
//! track in-flight work. Two independent state machines:
//!
//! ```text
//! save:  Idle ──→ Saving ──┬──→ Saved
//!                          └──→ Failed
//!
//! link:  Idle ──→ Generating ──┬──→ Ready
//!                              └──→ Failed
//! ```
//!
//! Preconditions are checked before any store call. Store I/O runs on the
//! blocking pool. Concurrent calls are not serialized: two overlapping saves
//! insert two records.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use thiserror::Error;

use crate::auth::Session;
use crate::card::{CardRecord, NewCard, SocialCardData, TemplateId};
use crate::export::{copy_link, Clipboard, SHARE_LINK_COPIED};
use crate::form::UpdateSink;
use crate::notify::Notifications;
use crate::store::{CardStore, StoreError};

/// Where a successful save sends the user
pub const SAVED_CARDS_ROUTE: &str = "/saved-cards";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveState {
    #[default]
    Idle,
    Saving,
    Saved,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    #[default]
    Idle,
    Generating,
    Ready,
    Failed,
}

/// What the user was trying to do when a precondition failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Save,
    Share,
    ListCards,
    DeleteCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    AuthenticationRequired,
    NameRequired,
    PhotoRequired,
}

impl Precondition {
    pub fn title(&self) -> &'static str {
        match self {
            Precondition::AuthenticationRequired => "Authentication required",
            Precondition::NameRequired => "Name is required",
            Precondition::PhotoRequired => "Photo required",
        }
    }

    pub fn description(&self, action: Action) -> &'static str {
        match (self, action) {
            (Precondition::AuthenticationRequired, Action::Share) => {
                "Please sign in to generate a share link"
            }
            (Precondition::AuthenticationRequired, Action::ListCards) => {
                "Please sign in to view your saved cards"
            }
            (Precondition::AuthenticationRequired, Action::DeleteCard) => {
                "Please sign in to manage your cards"
            }
            (Precondition::AuthenticationRequired, Action::Save) => {
                "Please sign in to save your card"
            }
            (Precondition::NameRequired, Action::Share) => {
                "Please enter your name to generate a share link"
            }
            (Precondition::NameRequired, _) => "Please enter your name to save the card",
            (Precondition::PhotoRequired, _) => "Please upload a profile photo to save the card",
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("precondition failed: {}", .0.title())]
    Precondition(Precondition),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("card {0} not found")]
    NotFound(String),
}

/// Share configuration
#[derive(Debug, Clone)]
pub struct ShareSettings {
    /// Origin used for `/share/<id>` links
    pub base_url: String,
    /// Refuse to issue links without a session
    pub require_auth: bool,
}

impl Default for ShareSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            require_auth: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLink {
    pub id: String,
    pub url: String,
    /// A record exists under `id`
    pub persisted: bool,
    /// The URL reached the clipboard
    pub copied: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub record: CardRecord,
    pub redirect: &'static str,
}

/// Clears a flag when dropped, so every exit path resets it
struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

pub struct CardWorkflow {
    card: Arc<Mutex<SocialCardData>>,
    template: Mutex<TemplateId>,
    session: Arc<Session>,
    store: Arc<dyn CardStore>,
    notifications: Notifications,
    clipboard: Arc<dyn Clipboard>,
    share: ShareSettings,
    is_saving: AtomicBool,
    is_generating_share_link: AtomicBool,
    share_link: Mutex<Option<ShareLink>>,
    save_state: Mutex<SaveState>,
    link_state: Mutex<LinkState>,
}

impl CardWorkflow {
    pub fn new(
        template: TemplateId,
        session: Arc<Session>,
        store: Arc<dyn CardStore>,
        notifications: Notifications,
        clipboard: Arc<dyn Clipboard>,
        share: ShareSettings,
    ) -> Self {
        Self {
            card: Arc::new(Mutex::new(SocialCardData::default())),
            template: Mutex::new(template),
            session,
            store,
            notifications,
            clipboard,
            share,
            is_saving: AtomicBool::new(false),
            is_generating_share_link: AtomicBool::new(false),
            share_link: Mutex::new(None),
            save_state: Mutex::new(SaveState::Idle),
            link_state: Mutex::new(LinkState::Idle),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Card state
    // ─────────────────────────────────────────────────────────────────────

    pub fn card(&self) -> SocialCardData {
        lock(&self.card).clone()
    }

    /// Replace the whole card
    pub fn update(&self, data: SocialCardData) {
        *lock(&self.card) = data;
    }

    /// Form callback that writes every change into this workflow's card
    pub fn update_sink(&self) -> UpdateSink {
        let card = Arc::clone(&self.card);
        Box::new(move |data: &SocialCardData| {
            *lock(&card) = data.clone();
        })
    }

    /// Copy the signed-in user's email into an empty email field
    pub fn prefill_from_session(&self) {
        if let Some(user) = self.session.user() {
            let mut card = lock(&self.card);
            *card = std::mem::take(&mut *card).with_email(&user.email);
        }
    }

    pub fn template(&self) -> TemplateId {
        *lock(&self.template)
    }

    pub fn set_template(&self, template: TemplateId) {
        *lock(&self.template) = template;
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving.load(Ordering::SeqCst)
    }

    pub fn is_generating_share_link(&self) -> bool {
        self.is_generating_share_link.load(Ordering::SeqCst)
    }

    pub fn share_link(&self) -> Option<ShareLink> {
        lock(&self.share_link).clone()
    }

    pub fn save_state(&self) -> SaveState {
        *lock(&self.save_state)
    }

    pub fn link_state(&self) -> LinkState {
        *lock(&self.link_state)
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    // ─────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────

    fn reject(&self, precondition: Precondition, action: Action) -> WorkflowError {
        tracing::debug!(?precondition, ?action, "Precondition failed");
        self.notifications
            .error(precondition.title(), precondition.description(action));
        WorkflowError::Precondition(precondition)
    }

    fn require_user(&self, action: Action) -> Result<String, WorkflowError> {
        self.session
            .user_id()
            .ok_or_else(|| self.reject(Precondition::AuthenticationRequired, action))
    }

    async fn with_store<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn CardStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store task failed: {}", e)))?
    }

    /// Persist the current card for the signed-in user
    pub async fn save(&self) -> Result<SaveOutcome, WorkflowError> {
        let _flag = FlagGuard::raise(&self.is_saving);

        let user_id = self.require_user(Action::Save)?;
        let card = self.card();
        if !card.has_name() {
            return Err(self.reject(Precondition::NameRequired, Action::Save));
        }
        if !card.has_photo() {
            return Err(self.reject(Precondition::PhotoRequired, Action::Save));
        }

        *lock(&self.save_state) = SaveState::Saving;
        let new = NewCard {
            id: None,
            user_id,
            template: self.template(),
            data: card,
        };

        match self.with_store(move |store| store.insert(new)).await {
            Ok(record) => {
                tracing::info!(card_id = %record.id, user_id = %record.user_id, "Card saved");
                *lock(&self.save_state) = SaveState::Saved;
                self.notifications
                    .success("Card saved!", "Your card has been saved successfully.");
                Ok(SaveOutcome {
                    record,
                    redirect: SAVED_CARDS_ROUTE,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "Error saving card");
                *lock(&self.save_state) = SaveState::Failed;
                self.notifications.error(
                    "Error saving card",
                    "There was a problem saving your card. Please try again.",
                );
                Err(e.into())
            }
        }
    }

    /// Issue a `/share/<id>` link, persisting the card first when signed in
    pub async fn generate_share_link(&self) -> Result<ShareLink, WorkflowError> {
        let _flag = FlagGuard::raise(&self.is_generating_share_link);

        let card = self.card();
        if !card.has_name() {
            return Err(self.reject(Precondition::NameRequired, Action::Share));
        }

        let user_id = self.session.user_id();
        if user_id.is_none() && self.share.require_auth {
            return Err(self.reject(Precondition::AuthenticationRequired, Action::Share));
        }

        *lock(&self.link_state) = LinkState::Generating;
        let id = uuid::Uuid::new_v4().to_string();
        let url = format!("{}/share/{}", self.share.base_url.trim_end_matches('/'), id);

        let persisted = match user_id {
            Some(user_id) => {
                let new = NewCard {
                    id: Some(id.clone()),
                    user_id,
                    template: self.template(),
                    data: card,
                };
                if let Err(e) = self.with_store(move |store| store.insert(new)).await {
                    tracing::error!(card_id = %id, error = %e, "Error generating share link");
                    *lock(&self.link_state) = LinkState::Failed;
                    self.notifications.error(
                        "Error generating link",
                        "There was a problem creating your share link. Please try again.",
                    );
                    return Err(e.into());
                }
                true
            }
            None => {
                tracing::warn!(card_id = %id, "Share link issued without a stored record");
                self.notifications.success(
                    "Not logged in",
                    "This link will not resolve until you sign in and save the card.",
                );
                false
            }
        };

        let copied = copy_link(
            Arc::clone(&self.clipboard),
            &url,
            &self.notifications,
            SHARE_LINK_COPIED,
        )
        .await;

        let link = ShareLink {
            id,
            url,
            persisted,
            copied,
        };
        *lock(&self.share_link) = Some(link.clone());
        *lock(&self.link_state) = LinkState::Ready;
        Ok(link)
    }

    /// The signed-in user's cards, newest first
    pub async fn saved_cards(&self) -> Result<Vec<CardRecord>, WorkflowError> {
        let user_id = self.require_user(Action::ListCards)?;

        self.with_store(move |store| store.list_for_user(&user_id))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to load cards");
                self.notifications.error(
                    "Failed to load cards",
                    "There was an error loading your saved cards.",
                );
                WorkflowError::from(e)
            })
    }

    /// Delete one of the signed-in user's cards
    pub async fn delete_card(&self, id: &str) -> Result<(), WorkflowError> {
        let user_id = self.require_user(Action::DeleteCard)?;
        let card_id = id.to_string();

        let result = {
            let card_id = card_id.clone();
            self.with_store(move |store| store.delete(&card_id, &user_id))
                .await
        };

        match result {
            Ok(true) => {
                tracing::info!(card_id = %card_id, "Card deleted");
                self.notifications
                    .success("Card deleted", "Your card has been deleted successfully.");
                Ok(())
            }
            Ok(false) => {
                self.notifications
                    .error("Failed to delete card", "There was an error deleting your card.");
                Err(WorkflowError::NotFound(card_id))
            }
            Err(e) => {
                tracing::error!(card_id = %card_id, error = %e, "Failed to delete card");
                self.notifications
                    .error("Failed to delete card", "There was an error deleting your card.");
                Err(e.into())
            }
        }
    }

    /// A stored card by id, for the public share view
    pub async fn find_card(&self, id: &str) -> Result<Option<CardRecord>, WorkflowError> {
        let id = id.to_string();
        Ok(self.with_store(move |store| store.get(&id)).await?)
    }
}
