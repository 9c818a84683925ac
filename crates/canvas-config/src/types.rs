//! Configuration types.
//!
//! The on-disk format is a single JSON object whose keys are all optional:
//!
//! ```json
//! {
//!   "protocol": "http",
//!   "host": "127.0.0.1",
//!   "port": 8001,
//!   "baseUri": "/rest/v1",
//!   "auth": { "type": "token", "token": "canvas-server-token" },
//!   "timeout": 2000
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default scheme for the server URL.
pub const DEFAULT_PROTOCOL: &str = "http";

/// Default server host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8001;

/// Default REST prefix on the server.
pub const DEFAULT_BASE_URI: &str = "/rest/v1";

/// Default auth scheme name.
pub const DEFAULT_AUTH_TYPE: &str = "token";

/// Token presented when the user has not configured one.
pub const DEFAULT_TOKEN: &str = "canvas-server-token";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

// ─────────────────────────────────────────────────────────────────────────────
// Effective config
// ─────────────────────────────────────────────────────────────────────────────

/// Effective shell configuration after defaults and the user file are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellConfig {
    /// URL scheme (`http` or `https`).
    pub protocol: String,
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Path prefix every route is resolved against.
    pub base_uri: String,
    /// Credentials presented on every request.
    pub auth: AuthConfig,
    /// Request timeout in milliseconds.
    pub timeout: u64,
}

/// Static bearer credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthConfig {
    /// Auth scheme name. Only `token` is understood by the server today.
    #[serde(rename = "type")]
    pub kind: String,
    /// Bearer token.
    pub token: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            base_uri: DEFAULT_BASE_URI.to_string(),
            auth: AuthConfig::default(),
            timeout: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            kind: DEFAULT_AUTH_TYPE.to_string(),
            token: DEFAULT_TOKEN.to_string(),
        }
    }
}

impl ShellConfig {
    /// Apply a user layer over this config.
    ///
    /// Top-level keys replace wholesale. `auth` is merged per field so that a
    /// layer carrying only a token keeps the default auth type.
    pub fn merge(&mut self, layer: ConfigLayer) {
        if let Some(protocol) = layer.protocol {
            self.protocol = protocol;
        }
        if let Some(host) = layer.host {
            self.host = host;
        }
        if let Some(port) = layer.port {
            self.port = port;
        }
        if let Some(base_uri) = layer.base_uri {
            self.base_uri = base_uri;
        }
        if let Some(auth) = layer.auth {
            if let Some(kind) = auth.kind {
                self.auth.kind = kind;
            }
            if let Some(token) = auth.token {
                self.auth.token = token;
            }
        }
        if let Some(timeout) = layer.timeout {
            self.timeout = timeout;
        }
    }

    /// The server base URL: `protocol://host:port/baseUri`.
    pub fn base_url(&self) -> String {
        let base_uri = self.base_uri.trim_start_matches('/');
        format!("{}://{}:{}/{}", self.protocol, self.host, self.port, base_uri)
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File layer
// ─────────────────────────────────────────────────────────────────────────────

/// One parsed config file. Every key is optional; absent keys keep defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigLayer {
    pub protocol: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub base_uri: Option<String>,
    pub auth: Option<AuthLayer>,
    pub timeout: Option<u64>,
}

/// Partial auth section of a config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthLayer {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub token: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
