use action_locator::LocatorError;
use thiserror::Error;

use crate::ports::ClientError;
use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum AppiumError {
    #[error("Appium configuration error: {0}")]
    Configuration(String),
    #[error("{action} method can be used only with {requirement}")]
    UnsupportedPlatform {
        action: &'static str,
        requirement: String,
    },
    #[error(transparent)]
    Locator(#[from] LocatorError),
    #[error("No WEBVIEW could be guessed, please specify one in params (available: {available:?})")]
    NoWebViewFound { available: Vec<String> },
    #[error("Can't connect to Appium server at {address}, make sure it is running")]
    ConnectionRefused {
        address: String,
        #[source]
        source: ClientError,
    },
    #[error("expected {subject} {expectation}")]
    AssertionFailed { subject: String, expectation: String },
    #[error("{action} should be used only in web context, use click in native context instead")]
    WebContextOnly { action: &'static str },
    #[error("timed out after {seconds}s: {message}")]
    WaitTimeout { seconds: f64, message: String },
    #[error("appium session has not been started")]
    SessionNotStarted,
    #[error("web helper does not implement {0}")]
    WebActionUnavailable(&'static str),
    #[error("unexpected response from {resource}: {detail}")]
    UnexpectedResponse { resource: String, detail: String },
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type AppiumResult<T> = Result<T, AppiumError>;

impl AppiumError {
    pub fn code(&self) -> &'static str {
        match self {
            AppiumError::Configuration(_) => "configuration_error",
            AppiumError::UnsupportedPlatform { .. } => "unsupported_platform",
            AppiumError::Locator(err) => err.code(),
            AppiumError::NoWebViewFound { .. } => "no_webview_found",
            AppiumError::ConnectionRefused { .. } => "connection_refused",
            AppiumError::AssertionFailed { .. } => "assertion_failed",
            AppiumError::WebContextOnly { .. } => "web_context_only",
            AppiumError::WaitTimeout { .. } => "wait_timeout",
            AppiumError::SessionNotStarted => "session_not_started",
            AppiumError::WebActionUnavailable(_) => "web_action_unavailable",
            AppiumError::UnexpectedResponse { .. } => "unexpected_response",
            AppiumError::Endpoint(_) => "invalid_endpoint",
            AppiumError::Client(_) => "client_error",
            AppiumError::Transport(_) => "transport_error",
            AppiumError::Io(_) => "io_error",
        }
    }

    /// Only failures of the wire itself mid-session are worth retrying; a
    /// server refusing the session at start is fatal.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppiumError::ConnectionRefused { .. } => false,
            AppiumError::Transport(err) => err.is_retryable(),
            AppiumError::Client(err) => err.is_connection_refused(),
            _ => false,
        }
    }

    pub(crate) fn assertion(subject: impl Into<String>, expectation: impl Into<String>) -> Self {
        AppiumError::AssertionFailed {
            subject: subject.into(),
            expectation: expectation.into(),
        }
    }
}
