//! HTTP requests layer for the Rosalution REST API
//!
//! The model modules speak to the backend through the [`Requests`] trait, so
//! they can be exercised against an in-memory transport in tests.
//! [`HttpRequests`] is the real implementation: it joins paths onto the
//! configured base URL, forwards the session token as the `rosalution_TOKEN`
//! cookie, and decodes every response as JSON. A non-2xx response fails with
//! the HTTP status line; there is no retry policy anywhere in this layer.

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Cookie carrying the bearer token for authenticated requests
pub const TOKEN_COOKIE: &str = "rosalution_TOKEN";

pub type RequestResult<T> = std::result::Result<T, RequestError>;

/// Errors surfaced by the requests layer
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The backend answered with a non-2xx status
    #[error("{status} for {url}")]
    Status { status: String, url: String },

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

/// JSON-returning REST verbs used by the model modules
#[async_trait]
pub trait Requests: Send + Sync {
    async fn get(&self, path: &str) -> RequestResult<Value>;

    async fn post(&self, path: &str, body: Value) -> RequestResult<Value>;

    async fn post_form(
        &self,
        path: &str,
        fields: HashMap<String, String>,
    ) -> RequestResult<Value>;

    async fn put_form(&self, path: &str, fields: HashMap<String, String>)
        -> RequestResult<Value>;

    async fn delete(&self, path: &str) -> RequestResult<Value>;
}

/// reqwest-backed transport
pub struct HttpRequests {
    client: Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl HttpRequests {
    /// Build a transport against the given deployment base URL
    pub fn new(base_url: &str, timeout_seconds: u64) -> RequestResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RequestError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("rosalution/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RequestError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: RwLock::new(None),
        })
    }

    /// Set or clear the session token sent with every request
    pub fn set_token(&self, token: Option<String>) {
        let mut guard = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = token;
    }

    fn url_for(&self, path: &str) -> RequestResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RequestError::Config(format!("Invalid request path '{}': {}", path, e)))
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        let guard = self
            .token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_deref() {
            Some(token) => request.header(COOKIE, format!("{}={}", TOKEN_COOKIE, token)),
            None => request,
        }
    }

    async fn handle(&self, response: Response) -> RequestResult<Value> {
        let url = response.url().to_string();
        let status = response.status();

        if !status.is_success() {
            return Err(RequestError::Status {
                status: status_line(status),
                url,
            });
        }

        let text = response.text().await?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| RequestError::Decode { url, source })
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[async_trait]
impl Requests for HttpRequests {
    async fn get(&self, path: &str) -> RequestResult<Value> {
        let url = self.url_for(path)?;
        debug!("GET {}", url);
        let response = self.with_session(self.client.get(url)).send().await?;
        self.handle(response).await
    }

    async fn post(&self, path: &str, body: Value) -> RequestResult<Value> {
        let url = self.url_for(path)?;
        debug!("POST {}", url);
        let response = self
            .with_session(self.client.post(url).json(&body))
            .send()
            .await?;
        self.handle(response).await
    }

    async fn post_form(
        &self,
        path: &str,
        fields: HashMap<String, String>,
    ) -> RequestResult<Value> {
        let url = self.url_for(path)?;
        debug!("POST (form) {}", url);
        let response = self
            .with_session(self.client.post(url).form(&fields))
            .send()
            .await?;
        self.handle(response).await
    }

    async fn put_form(
        &self,
        path: &str,
        fields: HashMap<String, String>,
    ) -> RequestResult<Value> {
        let url = self.url_for(path)?;
        debug!("PUT (form) {}", url);
        let response = self
            .with_session(self.client.put(url).form(&fields))
            .send()
            .await?;
        self.handle(response).await
    }

    async fn delete(&self, path: &str) -> RequestResult<Value> {
        let url = self.url_for(path)?;
        debug!("DELETE {}", url);
        let response = self.with_session(self.client.delete(url)).send().await?;
        self.handle(response).await
    }
}
