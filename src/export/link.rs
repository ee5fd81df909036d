//! Quick share links and clipboard access
//!
//! The quick link is a local pseudo-random token, not a stored record and
//! not collision-resistant. Clipboard writes are best effort: a failure
//! leaves the link on screen for manual copying.

use std::sync::Arc;

use anyhow::{Context, Result};
use rand::Rng;

use crate::notify::Notifications;

/// Base for quick links
pub const DEFAULT_QUICK_LINK_BASE: &str = "https://socialcard.app/s";

const TOKEN_LEN: usize = 8;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `<base>/<8 chars of [0-9a-z]>`
pub fn generate_link(base: &str) -> String {
    let mut rng = rand::rng();
    let token: String = (0..TOKEN_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}/{}", base.trim_end_matches('/'), token)
}

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// System clipboard via `arboard`.
/// A fresh handle is opened per write so nothing is held between copies.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("Failed to access clipboard")?;
        clipboard
            .set_text(text)
            .context("Failed to set clipboard text")?;
        Ok(())
    }
}

/// Used when `features.clipboard` is off; every write fails
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledClipboard;

impl Clipboard for DisabledClipboard {
    fn write_text(&self, _text: &str) -> Result<()> {
        anyhow::bail!("clipboard disabled by configuration")
    }
}

/// Notification sent once a link is on the clipboard
#[derive(Debug, Clone, Copy)]
pub struct CopiedNotice {
    pub title: &'static str,
    pub description: &'static str,
}

pub const QUICK_LINK_COPIED: CopiedNotice = CopiedNotice {
    title: "Link copied to clipboard",
    description: "Share this link with others to show your social card",
};

pub const SHARE_LINK_COPIED: CopiedNotice = CopiedNotice {
    title: "Share link generated!",
    description: "Link has been copied to clipboard.",
};

/// Copy a link, falling back to showing it.
/// The clipboard write blocks, so it runs on the blocking pool.
/// Returns whether the write succeeded.
pub async fn copy_link(
    clipboard: Arc<dyn Clipboard>,
    link: &str,
    notifications: &Notifications,
    copied: CopiedNotice,
) -> bool {
    let text = link.to_string();
    let result = match tokio::task::spawn_blocking(move || clipboard.write_text(&text)).await {
        Ok(result) => result,
        Err(e) => Err(anyhow::anyhow!("clipboard task failed: {}", e)),
    };

    match result {
        Ok(()) => {
            notifications.success(copied.title, copied.description);
            true
        }
        Err(e) => {
            tracing::debug!(error = %e, "Clipboard write failed, showing link instead");
            notifications.success(
                "Share link generated!",
                "Link is displayed below. Copy it manually to share.",
            );
            false
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingClipboard;
    use super::*;
    use regex::Regex;

    #[test]
    fn test_link_shape_and_non_idempotent() {
        let pattern = Regex::new(r"^https://socialcard\.app/s/[0-9a-z]{8}$").unwrap();
        let a = generate_link(DEFAULT_QUICK_LINK_BASE);
        let b = generate_link(DEFAULT_QUICK_LINK_BASE);
        assert!(pattern.is_match(&a), "{a}");
        assert!(pattern.is_match(&b), "{b}");
        assert_ne!(a, b);
    }

    #[test]
    fn test_trailing_slash_on_base() {
        assert!(generate_link("http://localhost/s/").starts_with("http://localhost/s/"));
        assert!(!generate_link("http://localhost/s/").contains("//s//"));
    }

    #[tokio::test]
    async fn test_copy_success() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let notes = Notifications::new();
        assert!(
            copy_link(
                clipboard.clone(),
                "https://socialcard.app/s/abc",
                &notes,
                QUICK_LINK_COPIED
            )
            .await
        );
        assert_eq!(clipboard.writes(), vec!["https://socialcard.app/s/abc"]);
        assert_eq!(notes.titles(), vec!["Link copied to clipboard"]);
    }

    #[tokio::test]
    async fn test_copy_notice_follows_caller() {
        let notes = Notifications::new();
        let clipboard = Arc::new(RecordingClipboard::default());
        assert!(copy_link(clipboard, "x", &notes, SHARE_LINK_COPIED).await);
        assert_eq!(
            notes.recent(1)[0].description,
            "Link has been copied to clipboard."
        );
    }

    #[tokio::test]
    async fn test_copy_failure_falls_back() {
        let notes = Notifications::new();
        let failing = Arc::new(RecordingClipboard::failing());
        assert!(!copy_link(failing, "x", &notes, QUICK_LINK_COPIED).await);
        assert!(!copy_link(Arc::new(DisabledClipboard), "x", &notes, QUICK_LINK_COPIED).await);

        let n = &notes.recent(1)[0];
        assert_eq!(n.title, "Share link generated!");
        assert!(!n.is_destructive());
    }
}
