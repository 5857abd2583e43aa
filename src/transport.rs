//! HTTP transport for the remote worker API
//!
//! Every call is a single attempt. Non-2xx responses and undecodable bodies
//! surface as [`TransportError`] and are never retried here.

use bytes::Bytes;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Longest error body kept in [`TransportError::Status`]
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body from {url}: {reason}")]
    MalformedBody { url: String, reason: String },

    #[error("Invalid multipart part: {0}")]
    InvalidPart(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

pub type Headers = [(String, String)];

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            user_agent: format!("workerbridge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Thin wrapper over [`reqwest::Client`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }

    /// GET and decode the body as JSON
    pub async fn get_json(&self, url: &str, headers: &Headers) -> Result<Value> {
        let response = self.send(url, self.client.get(url), headers).await?;
        let text = read_text(url, response).await?;

        serde_json::from_str(&text).map_err(|e| TransportError::MalformedBody {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// GET the raw body, whatever the declared content type
    pub async fn get_bytes(&self, url: &str, headers: &Headers) -> Result<Bytes> {
        let response = self.send(url, self.client.get(url), headers).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::RequestFailed(format!("Failed to read body: {}", e)))?;

        debug!(url, size = bytes.len(), "Download completed");

        Ok(bytes)
    }

    /// POST a multipart form.
    ///
    /// Bodies that do not parse as JSON come back as a JSON string so callers
    /// can still read a bare identifier.
    pub async fn post_multipart(&self, url: &str, headers: &Headers, form: Form) -> Result<Value> {
        let response = self
            .send(url, self.client.post(url).multipart(form), headers)
            .await?;
        let text = read_text(url, response).await?;

        Ok(serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.trim().to_string())))
    }

    async fn send(&self, url: &str, request: RequestBuilder, headers: &Headers) -> Result<Response> {
        debug!(url, "Sending request");

        let mut request = request;
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            if body.is_empty() {
                body = status.canonical_reason().unwrap_or("Unknown").to_string();
            }
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

async fn read_text(url: &str, response: Response) -> Result<String> {
    if let Some(content_type) = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        if let Ok(media_type) = content_type.parse::<mime::Mime>() {
            debug!(url, content_type = %media_type.essence_str(), "Response received");
        }
    }

    response
        .text()
        .await
        .map_err(|e| TransportError::RequestFailed(format!("Failed to read body: {}", e)))
}
