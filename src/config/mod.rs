//! Configuration for the card service
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/nexcard/config.toml)
//! 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod features;
mod observability;
mod sections;
mod serialization;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use features::{Features, FileFeatures};
pub use observability::{FileLogging, LogFile, LogRotation, LoggingConfig};
pub use sections::{
    AuthConfig, EditorConfig, ExportConfig, FileAuthConfig, FileEditorConfig, FileExportConfig,
    FilePopupConfig, FileShareConfig, FileStoreConfig, ShareConfig, StoreConfig,
};

use crate::popup::DelayRange;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Used when no bind address is configured or the configured one is invalid
pub const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
    8080,
);

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub bind_addr: SocketAddr,

    /// Saved-card database
    pub store: StoreConfig,

    /// Share link settings
    pub share: ShareConfig,

    /// Image export settings
    pub export: ExportConfig,

    /// Editor defaults (template, validation schema)
    pub editor: EditorConfig,

    /// Demo credentials and session persistence
    pub auth: AuthConfig,

    /// Feature flags for optional modules
    pub features: Features,

    /// Delay between inspiration prompts
    pub popup: DelayRange,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            store: StoreConfig::default(),
            share: ShareConfig::default(),
            export: ExportConfig::default(),
            editor: EditorConfig::default(),
            auth: AuthConfig::default(),
            features: Features::default(),
            popup: DelayRange::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub bind_addr: Option<String>,

    /// Optional [store] section
    pub store: Option<FileStoreConfig>,

    /// Optional [share] section
    pub share: Option<FileShareConfig>,

    /// Optional [export] section
    pub export: Option<FileExportConfig>,

    /// Optional [editor] section
    pub editor: Option<FileEditorConfig>,

    /// Optional [auth] section
    pub auth: Option<FileAuthConfig>,

    /// Optional [features] section
    pub features: Option<FileFeatures>,

    /// Optional [popup] section
    pub popup: Option<FilePopupConfig>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/nexcard/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("nexcard").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        // Config::default().to_toml() is the single source of truth
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// A config file that exists but cannot be read or parsed ends the
    /// process with a clear message instead of falling back to defaults.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                    eprintln!("║  CONFIG ERROR - Failed to parse configuration file          ║");
                    eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Invalid boolean values (use true/false)");
                    eprintln!("    - Typos in section names\n");
                    eprintln!("  To reset, run `nexcard config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> Self {
        let file = Self::load_file_config();
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with environment lookups
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        // Bind address: env > file > default; a bad value is not fatal
        let bind_addr = match env("NEXCARD_BIND").or(file.bind_addr) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                eprintln!(
                    "Warning: invalid bind address {:?}, using {}",
                    raw, DEFAULT_BIND_ADDR
                );
                DEFAULT_BIND_ADDR
            }),
            None => DEFAULT_BIND_ADDR,
        };

        Self {
            bind_addr,
            store: StoreConfig::from_file(file.store, env("NEXCARD_DB")),
            share: ShareConfig::from_file(file.share, env("NEXCARD_SHARE_BASE_URL")),
            export: ExportConfig::from_file(file.export, env("NEXCARD_DOWNLOAD_DIR")),
            editor: EditorConfig::from_file(file.editor),
            auth: AuthConfig::from_file(file.auth),
            features: Features::from_file(file.features),
            popup: sections::popup_from_file(file.popup),
            logging: LoggingConfig::from_file(file.logging),
        }
    }
}
