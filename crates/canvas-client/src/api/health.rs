//! Liveness API.

use crate::client::CanvasClient;
use crate::error::{ClientError, Result};

/// Payload the server sends back from `/ping`.
const PONG: &str = "pong";

/// Liveness API client.
pub struct HealthApi {
    client: CanvasClient,
}

impl HealthApi {
    pub(crate) fn new(client: CanvasClient) -> Self {
        Self { client }
    }

    /// Probe `/ping`.
    ///
    /// Succeeds only when the payload is exactly `"pong"`.
    pub async fn ping(&self) -> Result<()> {
        let payload: serde_json::Value = self.client.get("ping").await?;
        match payload.as_str() {
            Some(PONG) => Ok(()),
            _ => Err(ClientError::Protocol(format!(
                "unexpected ping payload: {}",
                payload
            ))),
        }
    }

    /// Simple connectivity check - returns true if the server answers the ping.
    pub async fn is_reachable(&self) -> bool {
        self.ping().await.is_ok()
    }
}
