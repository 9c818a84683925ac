//! Configuration for the Canvas shell.
//!
//! Provides the connection settings the shell uses to reach a Canvas server:
//! - Built-in defaults (`http://127.0.0.1:8001/rest/v1`, token auth, 2s timeout)
//! - A per-user JSON file merged over those defaults
//! - Non-fatal loading: a malformed file becomes a warning, never an error

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{config_dir, config_path, load_config, parse_layer, LoadedConfig};
pub use error::{ConfigError, Result};
pub use types::{AuthConfig, AuthLayer, ConfigLayer, ShellConfig};
