//! Context API.

use crate::client::CanvasClient;
use crate::error::Result;

/// Context API client.
pub struct ContextApi {
    client: CanvasClient,
}

impl ContextApi {
    pub(crate) fn new(client: CanvasClient) -> Self {
        Self { client }
    }

    /// Get the server's current context path.
    ///
    /// A payload that is not a string is a protocol error.
    pub async fn path(&self) -> Result<String> {
        self.client.get("context/path").await
    }
}
