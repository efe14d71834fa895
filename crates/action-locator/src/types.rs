//! Core types for locator translation

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use soulbrowser_core_types::Platform;

/// Locator strategy enumeration
///
/// The strategies a generic locator can be classified into. Only XPath, id,
/// accessibility id and class name have a native-app meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStrategy {
    Css,
    XPath,
    Id,
    Name,
    AccessibilityId,
    ClassName,
}

impl LocatorStrategy {
    /// Get strategy name as string
    pub fn name(&self) -> &'static str {
        match self {
            LocatorStrategy::Css => "css",
            LocatorStrategy::XPath => "xpath",
            LocatorStrategy::Id => "id",
            LocatorStrategy::Name => "name",
            LocatorStrategy::AccessibilityId => "accessibility id",
            LocatorStrategy::ClassName => "class name",
        }
    }

    /// Order in which strategy keys of a structured locator are consulted
    pub fn key_order() -> [LocatorStrategy; 6] {
        [
            LocatorStrategy::Id,
            LocatorStrategy::XPath,
            LocatorStrategy::Css,
            LocatorStrategy::Name,
            LocatorStrategy::AccessibilityId,
            LocatorStrategy::ClassName,
        ]
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The slice of mode state the translator depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorScope {
    /// Currently driving a web context
    pub web: bool,

    /// Platform fixed at session start, if any
    pub platform: Option<Platform>,
}

impl LocatorScope {
    pub fn web(platform: Option<Platform>) -> Self {
        Self {
            web: true,
            platform,
        }
    }

    pub fn native(platform: Platform) -> Self {
        Self {
            web: false,
            platform: Some(platform),
        }
    }

    pub fn is_platform(&self, platform: &Platform) -> bool {
        self.platform.as_ref() == Some(platform)
    }
}

/// A locator written once and resolved per context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortableLocator {
    /// CSS, XPath, `~accessibility id`, `#id` or bare text
    Raw(String),

    /// Platform alternatives and/or an explicit strategy
    Structured(StructuredLocator),

    /// Already in native automation syntax; passes through translation
    #[serde(skip)]
    Native(Value),
}

impl PortableLocator {
    pub fn raw(value: impl Into<String>) -> Self {
        PortableLocator::Raw(value.into())
    }

    pub fn structured(locator: StructuredLocator) -> Self {
        PortableLocator::Structured(locator)
    }

    /// Parse a locator given on a command line or in a fixture file: JSON
    /// objects become structured locators, anything else is a raw string.
    pub fn parse(input: &str) -> Result<Self, serde_json::Error> {
        let trimmed = input.trim_start();
        if trimmed.starts_with('{') {
            serde_json::from_str(trimmed)
        } else {
            Ok(PortableLocator::Raw(input.to_string()))
        }
    }
}

impl From<&str> for PortableLocator {
    fn from(value: &str) -> Self {
        PortableLocator::Raw(value.to_string())
    }
}

impl From<String> for PortableLocator {
    fn from(value: String) -> Self {
        PortableLocator::Raw(value)
    }
}

impl From<StructuredLocator> for PortableLocator {
    fn from(value: StructuredLocator) -> Self {
        PortableLocator::Structured(value)
    }
}

impl From<ResolvedSelector> for PortableLocator {
    fn from(value: ResolvedSelector) -> Self {
        match value {
            ResolvedSelector::Selector(selector) => PortableLocator::Raw(selector),
            ResolvedSelector::Matcher(matcher) => PortableLocator::Native(matcher),
        }
    }
}

impl fmt::Display for PortableLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortableLocator::Raw(raw) => f.write_str(raw),
            PortableLocator::Structured(structured) => match serde_json::to_string(structured) {
                Ok(json) => f.write_str(&json),
                Err(_) => write!(f, "{:?}", structured),
            },
            PortableLocator::Native(value) => write!(f, "{}", value),
        }
    }
}

/// Android alternative: either another locator string or an Espresso
/// data/view matcher object that is already in target syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AndroidAlternative {
    Selector(String),
    Matcher(Value),
}

/// Structured locator with per-context alternatives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredLocator {
    #[serde(default, alias = "webview", skip_serializing_if = "Option::is_none")]
    pub web: Option<Box<PortableLocator>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidAlternative>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios: Option<Box<PortableLocator>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        alias = "accessibilityId",
        skip_serializing_if = "Option::is_none"
    )]
    pub accessibility_id: Option<String>,

    #[serde(default, alias = "className", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl StructuredLocator {
    /// Locator with a single explicit strategy
    pub fn by(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        let mut locator = Self::default();
        match strategy {
            LocatorStrategy::Css => locator.css = value,
            LocatorStrategy::XPath => locator.xpath = value,
            LocatorStrategy::Id => locator.id = value,
            LocatorStrategy::Name => locator.name = value,
            LocatorStrategy::AccessibilityId => locator.accessibility_id = value,
            LocatorStrategy::ClassName => locator.class_name = value,
        }
        locator
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::by(LocatorStrategy::Id, value)
    }

    pub fn with_web(mut self, web: impl Into<PortableLocator>) -> Self {
        self.web = Some(Box::new(web.into()));
        self
    }

    pub fn with_android(mut self, android: impl Into<String>) -> Self {
        self.android = Some(AndroidAlternative::Selector(android.into()));
        self
    }

    pub fn with_android_matcher(mut self, matcher: Value) -> Self {
        self.android = Some(AndroidAlternative::Matcher(matcher));
        self
    }

    pub fn with_ios(mut self, ios: impl Into<PortableLocator>) -> Self {
        self.ios = Some(Box::new(ios.into()));
        self
    }

    /// Value stored for the given strategy key
    pub fn strategy_value(&self, strategy: LocatorStrategy) -> Option<&str> {
        let value = match strategy {
            LocatorStrategy::Css => &self.css,
            LocatorStrategy::XPath => &self.xpath,
            LocatorStrategy::Id => &self.id,
            LocatorStrategy::Name => &self.name,
            LocatorStrategy::AccessibilityId => &self.accessibility_id,
            LocatorStrategy::ClassName => &self.class_name,
        };
        value.as_deref()
    }

    /// First strategy key that is set, in [`LocatorStrategy::key_order`]
    pub fn explicit_strategy(&self) -> Option<(LocatorStrategy, &str)> {
        LocatorStrategy::key_order()
            .into_iter()
            .find_map(|strategy| self.strategy_value(strategy).map(|value| (strategy, value)))
    }
}

/// Output of translation, consumed immediately by the dispatch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolvedSelector {
    /// Selector string in the automation client's syntax
    Selector(String),

    /// Opaque native matcher object
    Matcher(Value),
}

impl fmt::Display for ResolvedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedSelector::Selector(selector) => f.write_str(selector),
            ResolvedSelector::Matcher(matcher) => write!(f, "{}", matcher),
        }
    }
}
