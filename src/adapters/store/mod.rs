pub mod message_repo;

use crate::config::StoreConfig;
use reqwest::{Method, header};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub use message_repo::MessageRepository;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("data store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("data store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("data store returned invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Thin client for the data store's REST interface (`/rest/v1`).
///
/// Every call is a single attempt bounded by the configured timeout.
#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
}

impl RestClient {
    /// Builds the client from configuration.
    ///
    /// # Errors
    /// Returns `StoreError::Transport` if the HTTP client cannot be constructed.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;

        Ok(Self { http, base_url: config.url.trim_end_matches('/').to_string(), key: config.key.clone() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends `method` to `{base}/rest/v1/{path}` and returns the parsed JSON reply.
    ///
    /// An empty success body comes back as `Value::Null`.
    ///
    /// # Errors
    /// Returns `StoreError::Status` carrying the upstream status and raw body for any status >= 400.
    /// Returns `StoreError::Transport` on connection failures or timeouts.
    /// Returns `StoreError::Decode` if a success body is not JSON.
    #[tracing::instrument(level = "debug", skip(self, body), fields(status = tracing::field::Empty))]
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, StoreError> {
        let mut req = self
            .http
            .request(method, self.url(path))
            .header("apikey", &self.key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.key))
            .header(header::CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation");

        if let Some(body) = body {
            req = req.body(serde_json::to_vec(body)?);
        }

        let resp = req.send().await?;
        let status = resp.status();
        tracing::Span::current().record("status", status.as_u16());

        let text = resp.text().await?;
        if status.as_u16() >= 400 {
            return Err(StoreError::Status { status: status.as_u16(), body: text });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}
