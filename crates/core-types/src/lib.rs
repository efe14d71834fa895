use std::fmt;

/// Session identifier handed out by the automation server.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Target mobile platform. Names are compared case-insensitively and
/// stored lowercase.
#[cfg_attr(
    feature = "serde-full",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Platform {
    Android,
    Ios,
    Other(String),
}

impl Platform {
    pub fn parse(name: &str) -> Self {
        let lowered = name.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "android" => Platform::Android,
            "ios" => Platform::Ios,
            _ => Platform::Other(lowered),
        }
    }

    /// Lowercase name used for matching locator alternatives.
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Other(name) => name.as_str(),
        }
    }

    /// Human facing name, as used in capability values and error messages.
    pub fn display_name(&self) -> &str {
        match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
            Platform::Other(name) => name.as_str(),
        }
    }
}

impl From<&str> for Platform {
    fn from(value: &str) -> Self {
        Platform::parse(value)
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        Platform::parse(&value)
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Automation context inside one device session (native app or a web view).
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ContextId(pub String);

impl ContextId {
    pub const NATIVE_APP: &'static str = "NATIVE_APP";
    pub const WEBVIEW_PREFIX: &'static str = "WEBVIEW";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn native() -> Self {
        Self(Self::NATIVE_APP.to_string())
    }

    pub fn is_native(&self) -> bool {
        self.0 == Self::NATIVE_APP
    }

    pub fn is_webview(&self) -> bool {
        self.0.starts_with(Self::WEBVIEW_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
