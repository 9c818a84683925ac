//! Wire types shared by every Canvas endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// The `{"payload": T}` wrapper every successful response carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub payload: T,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Validate a decoded response body and extract its payload.
    ///
    /// A body without a `payload` key, or whose payload does not fit `T`,
    /// is a [`ClientError::Protocol`]. An explicit `"payload": null` is kept.
    pub fn open(body: serde_json::Value) -> Result<T> {
        if body.get("payload").is_none() {
            return Err(ClientError::Protocol(
                "response is missing the payload envelope".to_string(),
            ));
        }
        let envelope: Envelope<T> = serde_json::from_value(body)
            .map_err(|e| ClientError::Protocol(format!("unexpected payload shape: {}", e)))?;
        Ok(envelope.payload)
    }
}
