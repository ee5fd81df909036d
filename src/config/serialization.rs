//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use std::path::Path;

use super::Config;

/// TOML basic string, escaped
fn quote(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

fn quote_path(p: &Path) -> String {
    quote(&p.to_string_lossy())
}

impl Config {
    fn session_file_to_toml(&self) -> String {
        match &self.auth.session_file {
            Some(path) => format!("session_file = {}\n", quote_path(path)),
            None => "# session_file = \"./data/session.json\"\n".to_string(),
        }
    }

    /// Serialize config to TOML string (single source of truth for format)
    pub fn to_toml(&self) -> String {
        // Disabled file logging still writes the default file settings
        let log_file = self.logging.file.clone().unwrap_or_default();
        format!(
            r#"# nexcard configuration
#
# Environment overrides: NEXCARD_BIND, NEXCARD_DB, NEXCARD_SHARE_BASE_URL,
# NEXCARD_DOWNLOAD_DIR. RUST_LOG overrides [logging] level.

# HTTP bind address
bind_addr = {bind}

# Saved cards (SQLite)
[store]
db_path = {db_path}

# Share links
[share]
# Origin used for /share/<id> links
base_url = {share_base}
# Base for quick links next to the export buttons
quick_link_base = {quick_base}
# Refuse share links when nobody is signed in
require_auth = {require_auth}

# Image export
[export]
download_dir = {download_dir}
# Pixel density (1-4)
scale = {scale}

# Editor defaults
[editor]
# classic, modern, academic, default
default_template = {template}
# basic (profile form) or extended (adds title, website, twitter, about)
form_variant = {variant}

# Demo sign-in
[auth]
demo_email = {demo_email}
demo_password = {demo_password}
# Keep the signed-in user across restarts
{session_file}
# Feature flags
[features]
clipboard = {clipboard}
inspiration_popup = {popup_enabled}

# Minutes between inspiration prompts (picked at random in range)
[popup]
min_minutes = {popup_min}
max_minutes = {popup_max}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# File logging (in addition to stdout)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = {log_file_prefix}
"#,
            bind = quote(&self.bind_addr.to_string()),
            db_path = quote_path(&self.store.db_path),
            share_base = quote(&self.share.base_url),
            quick_base = quote(&self.share.quick_link_base),
            require_auth = self.share.require_auth,
            download_dir = quote_path(&self.export.download_dir),
            scale = self.export.scale,
            template = quote(self.editor.default_template.as_str()),
            variant = quote(self.editor.form_variant.as_str()),
            demo_email = quote(&self.auth.demo_email),
            demo_password = quote(&self.auth.demo_password),
            session_file = self.session_file_to_toml(),
            clipboard = self.features.clipboard,
            popup_enabled = self.features.inspiration_popup,
            popup_min = self.popup.min_minutes,
            popup_max = self.popup.max_minutes,
            log_level = quote(&self.logging.level),
            log_file_enabled = self.logging.file.is_some(),
            log_file_dir = quote_path(&log_file.dir),
            log_file_rotation = log_file.rotation.as_str(),
            log_file_prefix = quote(&log_file.prefix),
        )
    }
}
