//! Configuration and working file paths

use std::path::{Path, PathBuf};

/// Name used for the configuration directory
const APP_NAME: &str = "pet-query-runner";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/pet-query-runner/` (or `$XDG_CONFIG_HOME/pet-query-runner/`)
/// - macOS: `~/Library/Application Support/pet-query-runner/`
/// - Windows: `%APPDATA%\pet-query-runner\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Resolve a configured file name against the working directory
///
/// Absolute paths are returned unchanged.
pub fn resolve_in(base: &Path, file: &Path) -> PathBuf {
    if file.is_relative() {
        base.join(file)
    } else {
        file.to_path_buf()
    }
}
