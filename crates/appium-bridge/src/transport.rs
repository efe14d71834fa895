//! JSON-over-HTTP transport for the Appium REST surface
//!
//! Every WebDriver response wraps its payload in `{"value": ...}`; errors put
//! `{"error", "message"}` inside that envelope. [`ReqwestTransport`] unwraps
//! both so callers only ever see the payload or a [`TransportError`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not reach the Appium server: {0}")]
    Connect(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("HTTP {status} {error}: {message}")]
    Remote {
        status: u16,
        error: String,
        message: String,
    },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    pub fn is_connect(&self) -> bool {
        matches!(self, TransportError::Connect(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Connect(_) | TransportError::Timeout(_)
        )
    }

    /// W3C error code, e.g. `no such element`
    pub fn remote_error(&self) -> Option<&str> {
        match self {
            TransportError::Remote { error, .. } => Some(error.as_str()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    fn as_reqwest(&self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub body: Option<Value>,
}

impl RestRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            body: None,
        }
    }

    pub fn post(url: Url, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            body: Some(body),
        }
    }

    pub fn delete(url: Url) -> Self {
        Self {
            method: HttpMethod::Delete,
            url,
            body: None,
        }
    }
}

#[async_trait]
pub trait RestTransport: Send + Sync {
    /// Send a request and return the unwrapped `value` payload
    async fn send(&self, request: RestRequest) -> Result<Value, TransportError>;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct RemoteFailure {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    credentials: Option<(String, String)>,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            client: Client::new(),
            credentials: None,
        }
    }
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Request(err.to_string()))?;
        Ok(Self {
            client,
            credentials: None,
        })
    }

    /// Basic auth sent with every request (cloud device farms)
    pub fn with_credentials(mut self, user: Option<String>, key: Option<String>) -> Self {
        self.credentials = user.map(|user| (user, key.unwrap_or_default()));
        self
    }
}

#[async_trait]
impl RestTransport for ReqwestTransport {
    async fn send(&self, request: RestRequest) -> Result<Value, TransportError> {
        debug!(method = %request.method, url = %request.url, "appium request");
        let mut builder = self
            .client
            .request(request.method.as_reqwest(), request.url.clone());
        if let Some((user, key)) = &self.credentials {
            builder = builder.basic_auth(user, Some(key));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        trace!(status = status.as_u16(), body = %body, "appium response");

        let envelope: Envelope = if body.trim().is_empty() {
            Envelope { value: Value::Null }
        } else {
            serde_json::from_str(&body).map_err(|err| {
                TransportError::Decode(format!("{} (HTTP {}): {}", request.url, status, err))
            })?
        };

        if !status.is_success() {
            let failure: RemoteFailure = serde_json::from_value(envelope.value.clone())
                .unwrap_or(RemoteFailure {
                    error: "unknown error".to_string(),
                    message: body,
                });
            return Err(TransportError::Remote {
                status: status.as_u16(),
                error: failure.error,
                message: failure.message,
            });
        }
        Ok(envelope.value)
    }
}
