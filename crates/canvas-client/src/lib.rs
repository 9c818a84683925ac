//! HTTP client for the Canvas context server.
//!
//! Every endpoint answers with a `{"payload": ...}` envelope. The client
//! unwraps it and turns every failure into a [`ClientError`] value.
//!
//! # Example
//!
//! ```no_run
//! use canvas_client::{CanvasClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = CanvasClient::builder()
//!     .base_url("http://127.0.0.1:8001/rest/v1")
//!     .auth_token("secret")
//!     .build()?;
//!
//! if client.health().is_reachable().await {
//!     let path = client.context().path().await?;
//!     println!("current context: {}", path);
//! }
//!
//! let documents: serde_json::Value = client.get("documents").await?;
//! println!("{}", documents);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{CanvasClient, ClientBuilder};
pub use error::{ClientError, Result};
pub use reqwest::Method;
pub use types::Envelope;
