//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use canvas_config::ShellConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::api::{ContextApi, HealthApi};
use crate::error::{ClientError, ErrorResponse, Result};
use crate::types::Envelope;

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Canvas server client.
///
/// One instance is built at startup and shared by everything that talks to
/// the server. Clones share the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use canvas_client::CanvasClient;
///
/// # async fn example() -> canvas_client::Result<()> {
/// let client = CanvasClient::builder()
///     .base_url("http://127.0.0.1:8001/rest/v1")
///     .auth_token("secret")
///     .build()?;
///
/// let contexts: serde_json::Value = client.get("contexts").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CanvasClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client carrying the default headers.
    pub(crate) http: reqwest::Client,
    /// Base URL, always ending in `/`.
    pub(crate) base_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
}

impl CanvasClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Build a client from the effective shell configuration.
    pub fn from_config(config: &ShellConfig) -> Result<Self> {
        ClientBuilder::from_config(config).build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the liveness API.
    pub fn health(&self) -> HealthApi {
        HealthApi::new(self.clone())
    }

    /// Access the context API.
    pub fn context(&self) -> ContextApi {
        ContextApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for a server-relative route.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(ClientError::from)
    }

    /// Make a GET request and unwrap the payload.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None).await
    }

    /// Make a POST request with a JSON body and unwrap the payload.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)
            .map_err(|e| ClientError::Protocol(format!("failed to encode request body: {}", e)))?;
        self.request(Method::POST, path, Some(&body)).await
    }

    /// Issue a request against the server and unwrap the payload.
    ///
    /// Every failure, including transport errors and malformed envelopes,
    /// comes back as a [`ClientError`].
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(%method, %url, "canvas request");

        let mut builder = self
            .inner
            .http
            .request(method, url)
            .timeout(self.inner.timeout);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        self.handle_response(response).await
    }

    /// Handle a response, extracting the payload or error.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if response.status().is_success() {
            let body: serde_json::Value = response.json().await?;
            Envelope::open(body)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> ClientError {
        let status = response.status();
        let reason = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        let message = match response.text().await {
            Ok(text) => serde_json::from_str::<ErrorResponse>(&text)
                .map(|err| err.message)
                .unwrap_or(reason),
            Err(_) => reason,
        };

        ClientError::Server {
            status: status.as_u16(),
            message,
        }
    }
}

/// Builder for creating a CanvasClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    auth_token: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Seed a builder from the shell configuration.
    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new()
            .base_url(config.base_url())
            .auth_token(config.auth.token.clone())
            .timeout(config.timeout())
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the bearer token.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CanvasClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL so relative joins keep the prefix
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::Config("invalid auth token".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let user_agent = format!("canvas-shell/{}", env!("CARGO_PKG_VERSION"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(CanvasClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
