//! Session service
//!
//! One `Session` per process, passed explicitly to whoever needs it. The
//! signed-in user is checked at the boundary (`User::validated`) so the rest
//! of the crate can trust a present user id.
//!
//! With `auth.session_file` set, the user survives restarts: login writes the
//! file, logout removes it, startup restores it.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

use crate::notify::Notifications;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid user: {0}")]
    InvalidUser(&'static str),

    #[error("session file error: {0}")]
    SessionFile(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl User {
    /// Build a user, rejecting an empty id or a malformed email
    pub fn validated(
        id: impl Into<String>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        image_url: Option<String>,
    ) -> Result<Self, AuthError> {
        let user = Self {
            id: id.into(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            image_url,
        };
        user.check()?;
        Ok(user)
    }

    fn check(&self) -> Result<(), AuthError> {
        if self.id.trim().is_empty() {
            return Err(AuthError::InvalidUser("empty id"));
        }
        if !self.email.validate_email() {
            return Err(AuthError::InvalidUser("malformed email"));
        }
        Ok(())
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────────────────────────────────────

pub trait AuthProvider: Send + Sync {
    fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Shown after a failed login
    fn hint(&self) -> String {
        "Check your email and password".to_string()
    }
}

/// Accepts a single configured credential pair and signs in the demo user
pub struct DemoAuthProvider {
    email: String,
    password: String,
    user: User,
}

impl DemoAuthProvider {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, AuthError> {
        Ok(Self {
            email: email.into(),
            password: password.into(),
            user: User::validated("1", "demo@example.com", "Demo", "User", None)?,
        })
    }
}

impl AuthProvider for DemoAuthProvider {
    fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email == self.email && password == self.password {
            Ok(self.user.clone())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    fn hint(&self) -> String {
        format!("Please use {} and {}", self.email, self.password)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

pub struct Session {
    user: RwLock<Option<User>>,
    provider: Arc<dyn AuthProvider>,
    notifications: Notifications,
    session_file: Option<PathBuf>,
}

impl Session {
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        notifications: Notifications,
        session_file: Option<PathBuf>,
    ) -> Self {
        Self {
            user: RwLock::new(None),
            provider,
            notifications,
            session_file,
        }
    }

    /// Session that starts signed in, without a session file
    #[allow(dead_code)] // Used by tests
    pub fn signed_in(provider: Arc<dyn AuthProvider>, notifications: Notifications, user: User) -> Self {
        let session = Self::new(provider, notifications, None);
        session.set_user(Some(user));
        session
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn user(&self) -> Option<User> {
        self.read().clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.read().as_ref().map(|u| u.id.clone())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = match self.provider.authenticate(email, password) {
            Ok(user) => user,
            Err(e) => {
                tracing::debug!(email = %email, "Login rejected");
                self.notifications.error("Login failed", self.provider.hint());
                return Err(e);
            }
        };

        self.set_user(Some(user.clone()));
        tracing::info!(user_id = %user.id, "Signed in");

        if let Some(path) = &self.session_file {
            if let Err(e) = write_session_file(path, &user).await {
                tracing::warn!(path = %path.display(), error = %e, "Failed to persist session");
            }
        }

        self.notifications
            .success("Login successful", "Welcome back to NexCard!");
        Ok(user)
    }

    pub async fn logout(&self) {
        let previous = self.read().as_ref().map(|u| u.id.clone());
        self.set_user(None);

        if let Some(path) = &self.session_file {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove session file")
                }
            }
        }

        if let Some(id) = previous {
            tracing::info!(user_id = %id, "Signed out");
        }
        self.notifications
            .success("Logged out", "You have been successfully logged out");
    }

    /// Load the user from the session file, if one is configured and valid.
    /// Returns whether a session was restored.
    pub async fn restore(&self) -> bool {
        let Some(path) = &self.session_file else {
            return false;
        };

        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return false,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot read session file");
                return false;
            }
        };

        let user = serde_json::from_str::<User>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|u| u.check().map(|_| u).map_err(|e| e.to_string()));

        match user {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Restored session");
                self.set_user(Some(user));
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid session file");
                false
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<User>> {
        self.user.read().unwrap_or_else(|e| e.into_inner())
    }

    fn set_user(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = user;
    }
}

async fn write_session_file(path: &std::path::Path, user: &User) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(user)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> Arc<dyn AuthProvider> {
        Arc::new(DemoAuthProvider::new("test@example.com", "password").unwrap())
    }

    #[test]
    fn test_user_validation() {
        assert!(User::validated("1", "demo@example.com", "Demo", "User", None).is_ok());
        assert!(matches!(
            User::validated("", "demo@example.com", "", "", None),
            Err(AuthError::InvalidUser(_))
        ));
        assert!(matches!(
            User::validated("1", "not-an-email", "", "", None),
            Err(AuthError::InvalidUser(_))
        ));
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = User::validated("1", "a@b.com", "", "", None).unwrap();
        assert_eq!(user.display_name(), "a@b.com");
        let user = User::validated("1", "a@b.com", "Demo", "User", None).unwrap();
        assert_eq!(user.display_name(), "Demo User");
    }

    #[tokio::test]
    async fn test_signed_in_session_starts_authenticated() {
        let user = provider().authenticate("test@example.com", "password").unwrap();
        let notes = Notifications::new();
        let session = Session::signed_in(provider(), notes.clone(), user.clone());

        assert!(session.is_authenticated());
        assert_eq!(session.user_id(), Some(user.id));
        assert!(notes.is_empty());
        assert!(!session.restore().await);

        session.logout().await;
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let notes = Notifications::new();
        let session = Session::new(provider(), notes.clone(), None);
        assert!(!session.is_authenticated());

        let user = session.login("test@example.com", "password").await.unwrap();
        assert_eq!(user.email, "demo@example.com");
        assert_eq!(session.user_id().as_deref(), Some("1"));

        session.logout().await;
        assert!(!session.is_authenticated());
        assert_eq!(notes.titles(), vec!["Login successful", "Logged out"]);
    }

    #[tokio::test]
    async fn test_bad_credentials_notify() {
        let notes = Notifications::new();
        let session = Session::new(provider(), notes.clone(), None);

        let err = session.login("test@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(!session.is_authenticated());

        let n = &notes.recent(1)[0];
        assert_eq!(n.title, "Login failed");
        assert_eq!(n.description, "Please use test@example.com and password");
        assert!(n.is_destructive());
    }

    #[tokio::test]
    async fn test_session_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let session = Session::new(provider(), Notifications::new(), Some(path.clone()));
        session.login("test@example.com", "password").await.unwrap();
        assert!(path.exists());

        let restored = Session::new(provider(), Notifications::new(), Some(path.clone()));
        assert!(restored.restore().await);
        assert_eq!(restored.user_id().as_deref(), Some("1"));

        restored.logout().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_session_file_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"id":"","email":"demo@example.com"}"#).unwrap();

        let session = Session::new(provider(), Notifications::new(), Some(path.clone()));
        assert!(!session.restore().await);
        assert!(!session.is_authenticated());

        std::fs::write(&path, "not json").unwrap();
        assert!(!session.restore().await);
    }
}
