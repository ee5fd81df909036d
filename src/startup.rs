// Startup module - displays banner and module loading status
//
// Printed to stdout before the server starts, then repeated through tracing
// so file logs carry the same boot record.

use crate::config::{Config, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Module loading result for display
pub struct ModuleStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub description: String,
}

/// Print the startup banner and module loading status
pub fn print_startup(config: &Config) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}NexCard{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Social card editor{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!();

    println!("  {DIM}Loading modules...{RESET}");
    for module in &module_status(config) {
        print_module_status(module);
    }
    println!();

    println!(
        "  {MAGENTA}▸{RESET} Editor at {BOLD}http://{}/create{RESET}",
        config.bind_addr
    );
    println!();
}

/// Status of all modules based on config
pub fn module_status(config: &Config) -> Vec<ModuleStatus> {
    vec![
        ModuleStatus {
            name: "store",
            enabled: true, // Core, always on
            description: config.store.db_path.display().to_string(),
        },
        ModuleStatus {
            name: "clipboard",
            enabled: config.features.clipboard,
            description: "Copy share links".to_string(),
        },
        ModuleStatus {
            name: "popup",
            enabled: config.features.inspiration_popup,
            description: format!(
                "Inspiration every {}-{} min",
                config.popup.min_minutes, config.popup.max_minutes
            ),
        },
        ModuleStatus {
            name: "file-log",
            enabled: config.logging.file.is_some(),
            description: config
                .logging
                .file
                .as_ref()
                .map(|f| f.dir.display().to_string())
                .unwrap_or_else(|| "stdout only".to_string()),
        },
        ModuleStatus {
            name: "session",
            enabled: config.auth.session_file.is_some(),
            description: "Persisted sign-in".to_string(),
        },
    ]
}

fn print_module_status(module: &ModuleStatus) {
    use colors::*;

    let (icon, style) = if module.enabled {
        (format!("{GREEN}✓{RESET}"), "")
    } else {
        (format!("{DIM}○{RESET}"), DIM)
    };

    println!(
        "    {icon} {style}{:<12}{RESET} {DIM}{}{RESET}",
        module.name, module.description
    );
}

/// Same record, through tracing
pub fn log_startup(config: &Config) {
    tracing::info!("NexCard v{} starting", VERSION);

    for module in &module_status(config) {
        tracing::info!(
            module = module.name,
            enabled = module.enabled,
            "{}",
            module.description
        );
    }

    tracing::info!(bind_addr = %config.bind_addr, "Listening");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_status_follows_flags() {
        let mut config = Config::default();
        config.features.clipboard = false;

        let modules = module_status(&config);
        let clipboard = modules.iter().find(|m| m.name == "clipboard").unwrap();
        assert!(!clipboard.enabled);
        let popup = modules.iter().find(|m| m.name == "popup").unwrap();
        assert_eq!(popup.description, "Inspiration every 5-8 min");
    }
}
