//! Generic locator parsing
//!
//! Classifies a locator string (or the strategy key of a structured
//! locator) and simplifies it into the shape the automation client expects.
//! Strings that look like neither CSS nor XPath keep the caller supplied
//! default strategy.

use crate::types::{LocatorStrategy, StructuredLocator};

/// A locator reduced to one strategy and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLocator {
    pub strategy: LocatorStrategy,
    pub value: String,
}

impl ParsedLocator {
    pub fn new(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Classify a raw locator string
    pub fn detect(raw: &str, default: LocatorStrategy) -> Self {
        let strategy = if is_xpath(raw) {
            LocatorStrategy::XPath
        } else if is_css(raw) {
            LocatorStrategy::Css
        } else {
            default
        };
        Self::new(strategy, raw)
    }

    /// Take the explicit strategy key of a structured locator
    pub fn from_structured(locator: &StructuredLocator) -> Option<Self> {
        locator
            .explicit_strategy()
            .map(|(strategy, value)| Self::new(strategy, value))
    }

    /// Selector string in the client's syntax
    pub fn simplify(&self) -> String {
        match self.strategy {
            LocatorStrategy::Css | LocatorStrategy::XPath | LocatorStrategy::ClassName => {
                self.value.clone()
            }
            LocatorStrategy::Id => format!("#{}", self.value),
            LocatorStrategy::Name => format!("[name=\"{}\"]", self.value),
            LocatorStrategy::AccessibilityId => format!("~{}", self.value),
        }
    }
}

/// `//a`, `./a`, `.//a` and parenthesised forms such as `(//a)[2]`
pub fn is_xpath(raw: &str) -> bool {
    let trimmed = raw.trim_start_matches('(');
    trimmed.starts_with("//") || trimmed.starts_with("./") || trimmed.starts_with(".//")
}

/// Id, class and attribute selectors
pub fn is_css(raw: &str) -> bool {
    matches!(raw.chars().next(), Some('#') | Some('.') | Some('['))
}
