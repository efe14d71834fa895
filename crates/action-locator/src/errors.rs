//! Error types for locator translation

use thiserror::Error;

/// Locator error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// Strategy has no meaning in a native app context
    #[error("{hint} (locator: {locator})")]
    UnsupportedStrategy {
        strategy: String,
        locator: String,
        hint: String,
    },

    /// Structured locator has no alternative for the active context
    #[error("No locator alternative matches the current context: {0}")]
    NoMatchingAlternative(String),

    /// Locator is empty or malformed
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),
}

impl LocatorError {
    pub fn code(&self) -> &'static str {
        match self {
            LocatorError::UnsupportedStrategy { .. } => "unsupported_locator_strategy",
            LocatorError::NoMatchingAlternative(_) => "no_matching_alternative",
            LocatorError::InvalidLocator(_) => "invalid_locator",
        }
    }
}
