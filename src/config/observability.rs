//! `[logging]` section
//!
//! Stdout logging is always on. File output is optional and, when present,
//! carries everything the rolling appender needs. `RUST_LOG` still
//! overrides the level at runtime (see `logging::init`).

use serde::Deserialize;
use std::path::PathBuf;

/// Levels accepted in `[logging] level`
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl LogRotation {
    /// Unknown names fall back to daily
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "hourly" => Self::Hourly,
            "never" => Self::Never,
            _ => Self::Daily,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }
}

/// Rolling JSON log file
#[derive(Debug, Clone, PartialEq)]
pub struct LogFile {
    pub dir: PathBuf,
    pub rotation: LogRotation,
    /// `nexcard` gives `nexcard.2026-10-14` with daily rotation
    pub prefix: String,
}

impl Default for LogFile {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./logs"),
            rotation: LogRotation::Daily,
            prefix: "nexcard".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
    /// `None` keeps logs on stdout only
    pub file: Option<LogFile>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            file: None,
        }
    }
}

/// `[logging]` as written in the TOML file
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
    pub file_prefix: Option<String>,
}

/// Lowercase a known level; anything else becomes the default
fn normalize_level(level: &str) -> String {
    let level = level.trim().to_lowercase();
    if LEVELS.contains(&level.as_str()) {
        level
    } else {
        DEFAULT_LEVEL.to_string()
    }
}

impl LoggingConfig {
    pub fn from_file(file: Option<FileLogging>) -> Self {
        let file = file.unwrap_or_default();
        let level = file
            .level
            .as_deref()
            .map(normalize_level)
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());

        let output = file.file_enabled.unwrap_or(false).then(|| {
            let defaults = LogFile::default();
            LogFile {
                dir: file.file_dir.map(PathBuf::from).unwrap_or(defaults.dir),
                rotation: file
                    .file_rotation
                    .as_deref()
                    .map(LogRotation::parse)
                    .unwrap_or(defaults.rotation),
                prefix: file
                    .file_prefix
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or(defaults.prefix),
            }
        });

        Self {
            level,
            file: output,
        }
    }
}
