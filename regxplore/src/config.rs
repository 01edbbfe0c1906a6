//! Config file discovery and loading for the CLI.
//!
//! The on-disk schema is [`regxplore_core::Config`]; this module only adds
//! the CLI-specific concern of finding the file.

use regxplore_core::Config;
use std::path::PathBuf;

/// Resolves `$REGXPLORE_CONFIG`, then `$XDG_CONFIG_HOME/regxplore/config.yaml`,
/// then `~/.config/regxplore/config.yaml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("REGXPLORE_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("regxplore").join("config.yaml"))
}

/// Loads the config file if present, falling back to defaults otherwise.
pub fn load() -> Config {
    match config_path() {
        Some(path) if path.exists() => Config::load(Some(&path)).unwrap_or_default(),
        _ => Config::default(),
    }
}
