//! Card-facing configuration sections
//!
//! `[store]`, `[share]`, `[export]`, `[editor]`, `[auth]` and `[popup]`.
//! Each has a resolved struct plus an all-optional `File*` twin that mirrors
//! the TOML table.

use serde::Deserialize;
use std::path::PathBuf;

use crate::card::TemplateId;
use crate::export::{DEFAULT_QUICK_LINK_BASE, DEFAULT_SCALE, MAX_SCALE};
use crate::form::FormVariant;
use crate::popup::DelayRange;

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Path to SQLite database file
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/nexcard.db"),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileStoreConfig {
    pub db_path: Option<String>,
}

impl StoreConfig {
    /// `db_override` comes from `NEXCARD_DB` and wins over the file
    pub fn from_file(file: Option<FileStoreConfig>, db_override: Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            db_path: db_override
                .or(file.db_path)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Share
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ShareConfig {
    /// Origin for `/share/<id>` links
    pub base_url: String,
    /// Base for the quick links shown next to the export buttons
    pub quick_link_base: String,
    /// Refuse share links without a signed-in user
    pub require_auth: bool,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            quick_link_base: DEFAULT_QUICK_LINK_BASE.to_string(),
            require_auth: false,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileShareConfig {
    pub base_url: Option<String>,
    pub quick_link_base: Option<String>,
    pub require_auth: Option<bool>,
}

impl ShareConfig {
    pub fn from_file(file: Option<FileShareConfig>, base_url_override: Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            base_url: base_url_override
                .or(file.base_url)
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            quick_link_base: file.quick_link_base.unwrap_or(defaults.quick_link_base),
            require_auth: file.require_auth.unwrap_or(defaults.require_auth),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Where `social-card.<ext>` files are written
    pub download_dir: PathBuf,
    /// Pixel density, 1..=MAX_SCALE
    pub scale: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("./downloads"),
            scale: DEFAULT_SCALE,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileExportConfig {
    pub download_dir: Option<String>,
    pub scale: Option<u32>,
}

impl ExportConfig {
    pub fn from_file(file: Option<FileExportConfig>, dir_override: Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            download_dir: dir_override
                .or(file.download_dir)
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
            scale: file
                .scale
                .map(|s| s.clamp(1, MAX_SCALE))
                .unwrap_or(defaults.scale),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Template seeded when `/create` has no `template` query
    pub default_template: TemplateId,
    /// Validation schema for the form
    pub form_variant: FormVariant,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_template: TemplateId::Classic,
            form_variant: FormVariant::Basic,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileEditorConfig {
    pub default_template: Option<String>,
    pub form_variant: Option<String>,
}

impl EditorConfig {
    pub fn from_file(file: Option<FileEditorConfig>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            default_template: file
                .default_template
                .map(|s| TemplateId::parse(&s))
                .unwrap_or(defaults.default_template),
            form_variant: file
                .form_variant
                .map(|s| FormVariant::from_str(&s))
                .unwrap_or(defaults.form_variant),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AuthConfig {
    /// The one credential pair the demo provider accepts
    pub demo_email: String,
    pub demo_password: String,
    /// Persist the signed-in user across restarts
    pub session_file: Option<PathBuf>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            demo_email: "test@example.com".to_string(),
            demo_password: "password".to_string(),
            session_file: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileAuthConfig {
    pub demo_email: Option<String>,
    pub demo_password: Option<String>,
    pub session_file: Option<String>,
}

impl AuthConfig {
    pub fn from_file(file: Option<FileAuthConfig>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            demo_email: file.demo_email.unwrap_or(defaults.demo_email),
            demo_password: file.demo_password.unwrap_or(defaults.demo_password),
            session_file: file
                .session_file
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Popup
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct FilePopupConfig {
    pub min_minutes: Option<u64>,
    pub max_minutes: Option<u64>,
}

/// `[popup]` resolves straight to a `DelayRange`
pub fn popup_from_file(file: Option<FilePopupConfig>) -> DelayRange {
    let file = file.unwrap_or_default();
    let defaults = DelayRange::default();

    DelayRange::new(
        file.min_minutes.unwrap_or(defaults.min_minutes),
        file.max_minutes.unwrap_or(defaults.max_minutes),
    )
}
