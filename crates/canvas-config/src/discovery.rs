//! Config file discovery and loading.
//!
//! Resolution order (later overrides earlier):
//! 1. Built-in defaults
//! 2. The per-user file (`--config` path, else `$CANVAS_CONFIG_DIR/shell.json`,
//!    else `~/.config/canvas/shell.json`)

use std::path::{Path, PathBuf};

use crate::{ConfigError, ConfigLayer, Result, ShellConfig};

/// Config filename within the config directory.
const CONFIG_FILE: &str = "shell.json";

/// Application name for platform directory resolution.
const APP_NAME: &str = "canvas";

/// Environment variable to override the config directory.
///
/// Takes precedence over the platform default. Useful for testing and for
/// keeping several server profiles side by side.
const CONFIG_DIR_ENV: &str = "CANVAS_CONFIG_DIR";

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The effective configuration.
    pub config: ShellConfig,
    /// File that was merged over the defaults, if one was found and valid.
    pub source: Option<PathBuf>,
    /// Warnings generated during loading (e.g., malformed JSON).
    pub warnings: Vec<String>,
}

/// Get the config directory for the shell.
///
/// Checks `CANVAS_CONFIG_DIR` first, then falls back to the platform default.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the default config file path.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

/// Load the effective configuration.
///
/// `explicit` overrides the discovered path. This never fails: a missing
/// file yields the defaults, and an unreadable or malformed file yields the
/// defaults plus a warning.
pub fn load_config(explicit: Option<&Path>) -> LoadedConfig {
    let mut config = ShellConfig::default();
    let mut warnings = Vec::new();
    let mut source = None;

    let path = explicit.map(Path::to_path_buf).or_else(config_path);

    if let Some(path) = path {
        match load_layer(&path) {
            Ok(Some(layer)) => {
                config.merge(layer);
                source = Some(path);
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "ignoring config file");
                warnings.push(format!(
                    "Failed to load {}: {}. Using default settings.",
                    path.display(),
                    e
                ));
            }
        }
    }

    LoadedConfig {
        config,
        source,
        warnings,
    }
}

/// Parse the contents of a config file.
pub fn parse_layer(contents: &str) -> Result<ConfigLayer> {
    Ok(serde_json::from_str(contents)?)
}

/// Read a config file, returning `None` when it does not exist.
fn load_layer(path: &Path) -> Result<Option<ConfigLayer>> {
    if !path.is_file() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_layer(&contents).map(Some)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
