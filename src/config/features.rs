//! Feature flags configuration
//!
//! Feature flags for optional modules (opt-out: default enabled).

use serde::Deserialize;

/// Feature flags for optional modules (opt-out: default enabled)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Features {
    /// System clipboard for share links (off = always show the link)
    pub clipboard: bool,

    /// Periodic inspiration prompts in the notification feed
    pub inspiration_popup: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            clipboard: true,
            inspiration_popup: true,
        }
    }
}

/// Feature flags as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileFeatures {
    pub clipboard: Option<bool>,
    pub inspiration_popup: Option<bool>,
}

impl Features {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileFeatures>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            clipboard: file.clipboard.unwrap_or(defaults.clipboard),
            inspiration_popup: file
                .inspiration_popup
                .unwrap_or(defaults.inspiration_popup),
        }
    }
}
