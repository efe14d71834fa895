//! Helper configuration and its normalization
//!
//! [`AppiumConfig`] is what users write (camelCase keys, every field
//! optional). [`SessionConfig::normalize`] validates it, fills defaults and
//! rewrites capabilities for the Appium 2 vendor-prefix convention.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use soulbrowser_core_types::Platform;
use tracing::warn;

use crate::errors::{AppiumError, AppiumResult};
use crate::mapping::ServerAddress;
use crate::model::SessionRequest;

pub const DEFAULT_PROTOCOL: &str = "http";
pub const DEFAULT_HOSTNAME: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 4723;
pub const DEFAULT_PATH: &str = "/wd/hub";
pub const DEFAULT_WAIT_FOR_TIMEOUT_MS: u64 = 1000;

/// Prefix Appium 2 requires on every non-standard capability.
pub const APPIUM_PREFIX: &str = "appium:";

const MISSING_TARGET: &str = "Appium requires either platform and app or a browser to be set. \
     Check your configuration and the Appium capabilities list.";

/// User supplied helper configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppiumConfig {
    #[serde(rename = "appiumV2")]
    pub appium_v2: Option<bool>,
    pub app: Option<String>,
    pub platform: Option<String>,
    pub browser: Option<String>,
    pub device: Option<String>,
    pub url: Option<String>,
    pub base_url: Option<String>,
    pub host: Option<String>,
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub protocol: Option<String>,
    pub user: Option<String>,
    pub key: Option<String>,
    pub desired_capabilities: Option<Map<String, Value>>,
    pub capabilities: Option<Map<String, Value>>,
    pub restart: Option<bool>,
    pub manual_start: Option<bool>,
    /// Milliseconds
    pub wait_for_timeout: Option<u64>,
    pub timeouts: Option<Timeouts>,
    pub window_size: Option<String>,
    pub multiremote: Option<BTreeMap<String, Value>>,
    pub tunnel_identifier: Option<String>,
    #[serde(rename = "appium:device")]
    pub appium_device: Option<String>,
    #[serde(rename = "appium:browser")]
    pub appium_browser: Option<String>,
    #[serde(rename = "appium:app")]
    pub appium_app: Option<String>,
    #[serde(rename = "appium:tunnelIdentifier")]
    pub appium_tunnel_identifier: Option<String>,
}

impl AppiumConfig {
    /// Server address with defaults filled in; `host` wins over `hostname`
    pub fn server_address(&self) -> ServerAddress {
        ServerAddress::new(
            self.protocol
                .clone()
                .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
            self.host
                .clone()
                .or_else(|| self.hostname.clone())
                .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string()),
            self.port.unwrap_or(DEFAULT_PORT),
            self.path.clone().unwrap_or_else(|| DEFAULT_PATH.to_string()),
        )
    }
}

/// Session timeouts in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeouts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_load: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implicit: Option<u64>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            script: Some(0),
            page_load: None,
            implicit: None,
        }
    }
}

/// Browser window sizing applied when no mobile platform is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSize {
    Maximize,
    Exact { width: u32, height: u32 },
}

impl FromStr for WindowSize {
    type Err = AppiumError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("maximize") {
            return Ok(WindowSize::Maximize);
        }
        let invalid = || {
            AppiumError::Configuration(format!(
                "windowSize must be `maximize` or `<width>x<height>`, got `{}`",
                raw
            ))
        };
        let (width, height) = raw.split_once('x').ok_or_else(invalid)?;
        let width = width.trim().parse().map_err(|_| invalid())?;
        let height = height.trim().parse().map_err(|_| invalid())?;
        Ok(WindowSize::Exact { width, height })
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowSize::Maximize => f.write_str("maximize"),
            WindowSize::Exact { width, height } => write!(f, "{}x{}", width, height),
        }
    }
}

/// Normalized configuration, fixed for the life of the helper.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub appium_v2: bool,
    pub app: Option<String>,
    pub browser: Option<String>,
    pub base_url: Option<String>,
    pub address: ServerAddress,
    pub user: Option<String>,
    pub key: Option<String>,
    /// Capabilities as the user wrote them; conditional blocks match against these
    pub desired_capabilities: Map<String, Value>,
    /// Capabilities sent when creating the session
    pub capabilities: Map<String, Value>,
    pub restart: bool,
    pub manual_start: bool,
    pub wait_for_timeout_ms: u64,
    pub timeouts: Timeouts,
    pub window_size: Option<WindowSize>,
    pub multiremote: Option<BTreeMap<String, Value>>,
    /// Lowercased platform, vendor-prefixed capability preferred
    pub platform: Option<Platform>,
    /// Session starts in a web context
    pub is_web: bool,
}

impl SessionConfig {
    pub fn normalize(raw: AppiumConfig) -> AppiumResult<Self> {
        if raw.app.is_none() && raw.platform.is_none() && raw.browser.is_none() {
            return Err(AppiumError::Configuration(MISSING_TARGET.to_string()));
        }

        let appium_v2 = raw.appium_v2.unwrap_or(true);
        if !appium_v2 {
            warn!("appiumV2 disabled: capabilities are sent without the `appium:` prefix; Appium 1.x is end of life");
        }

        let desired = raw.desired_capabilities.clone().unwrap_or_default();
        let mut capabilities = raw.capabilities.clone().unwrap_or_default();
        if !desired.is_empty() {
            let converted = if appium_v2 {
                convert_appium_v2_caps(&desired)
            } else {
                desired.clone()
            };
            capabilities.extend(converted);
        }

        let key = |name: &str| {
            if appium_v2 {
                format!("{}{}", APPIUM_PREFIX, name)
            } else {
                name.to_string()
            }
        };
        set_string(
            &mut capabilities,
            &key("deviceName"),
            raw.appium_device.clone().or_else(|| raw.device.clone()),
        );
        set_string(
            &mut capabilities,
            &key("app"),
            raw.appium_app.clone().or_else(|| raw.app.clone()),
        );
        set_string(
            &mut capabilities,
            &key("tunnelIdentifier"),
            raw.appium_tunnel_identifier
                .clone()
                .or_else(|| raw.tunnel_identifier.clone()),
        );
        set_string(
            &mut capabilities,
            "browserName",
            raw.appium_browser.clone().or_else(|| raw.browser.clone()),
        );
        set_string(&mut capabilities, "platformName", raw.platform.clone());

        let platform = capability_str(&capabilities, "appium:platformName")
            .or_else(|| capability_str(&capabilities, "platformName"))
            .map(Platform::parse);

        let has_app = raw.app.is_some()
            || raw.appium_app.is_some()
            || capabilities.contains_key("appium:app")
            || capabilities.contains_key("app");
        let has_browser = capability_str(&capabilities, "browserName").is_some()
            || capability_str(&capabilities, "appium:browserName").is_some();
        let is_web = !has_app && has_browser;

        let window_size = raw.window_size.as_deref().map(str::parse).transpose()?;

        let address = raw.server_address();

        Ok(Self {
            appium_v2,
            app: raw.app.or(raw.appium_app),
            browser: raw.browser.or(raw.appium_browser),
            base_url: raw.url.or(raw.base_url),
            address,
            user: raw.user,
            key: raw.key,
            desired_capabilities: desired,
            capabilities,
            restart: raw.restart.unwrap_or(true),
            manual_start: raw.manual_start.unwrap_or(false),
            wait_for_timeout_ms: raw.wait_for_timeout.unwrap_or(DEFAULT_WAIT_FOR_TIMEOUT_MS),
            timeouts: raw.timeouts.unwrap_or_default(),
            window_size,
            multiremote: raw.multiremote,
            platform,
            is_web,
        })
    }

    pub fn wait_for_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_for_timeout_ms)
    }

    pub fn wait_for_timeout_secs(&self) -> f64 {
        self.wait_for_timeout_ms as f64 / 1000.0
    }

    /// Payload handed to the session factory
    pub fn session_request(&self) -> SessionRequest {
        SessionRequest {
            address: self.address.clone(),
            capabilities: self.capabilities.clone(),
            user: self.user.clone(),
            key: self.key.clone(),
            multiremote: self.multiremote.clone(),
        }
    }
}

/// Prefix every capability with `appium:` except `platformName` and keys
/// already carrying a vendor prefix.
pub fn convert_appium_v2_caps(capabilities: &Map<String, Value>) -> Map<String, Value> {
    capabilities
        .iter()
        .map(|(name, value)| {
            let name = if name == "platformName" || name.contains(':') {
                name.clone()
            } else {
                format!("{}{}", APPIUM_PREFIX, name)
            };
            (name, value.clone())
        })
        .collect()
}

fn set_string(capabilities: &mut Map<String, Value>, name: &str, value: Option<String>) {
    if let Some(value) = value {
        capabilities.insert(name.to_string(), Value::String(value));
    }
}

fn capability_str<'a>(capabilities: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    capabilities
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn caps(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn v2_conversion_skips_platform_and_vendor_keys() {
        let converted = convert_appium_v2_caps(&caps(json!({
            "platformName": "Android",
            "deviceName": "emulator-5554",
            "bstack:options": { "local": true }
        })));
        assert_eq!(
            Value::Object(converted),
            json!({
                "platformName": "Android",
                "appium:deviceName": "emulator-5554",
                "bstack:options": { "local": true }
            })
        );
    }

    #[test]
    fn missing_target_is_rejected() {
        let err = SessionConfig::normalize(AppiumConfig {
            device: Some("Pixel".into()),
            ..AppiumConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.code(), "configuration_error");
    }

    #[test]
    fn defaults_are_filled() {
        let config = SessionConfig::normalize(AppiumConfig {
            browser: Some("chrome".into()),
            ..AppiumConfig::default()
        })
        .unwrap();
        assert_eq!(config.address.hostname, DEFAULT_HOSTNAME);
        assert_eq!(config.address.port, DEFAULT_PORT);
        assert_eq!(config.address.path, DEFAULT_PATH);
        assert_eq!(config.wait_for_timeout_secs(), 1.0);
        assert_eq!(config.timeouts.script, Some(0));
        assert!(config.restart);
        assert!(config.appium_v2);
    }

    #[test]
    fn vendor_platform_name_wins() {
        let config = SessionConfig::normalize(AppiumConfig {
            app: Some("/tmp/app.apk".into()),
            capabilities: Some(caps(json!({
                "platformName": "Android",
                "appium:platformName": "iOS"
            }))),
            ..AppiumConfig::default()
        })
        .unwrap();
        assert_eq!(config.platform, Some(Platform::Ios));
    }

    #[test]
    fn legacy_mode_keeps_plain_capability_names() {
        let config = SessionConfig::normalize(AppiumConfig {
            appium_v2: Some(false),
            platform: Some("Android".into()),
            device: Some("emulator-5554".into()),
            desired_capabilities: Some(caps(json!({ "appPackage": "com.example" }))),
            ..AppiumConfig::default()
        })
        .unwrap();
        assert_eq!(config.capabilities["deviceName"], json!("emulator-5554"));
        assert_eq!(config.capabilities["appPackage"], json!("com.example"));
        assert!(!config.capabilities.contains_key("appium:deviceName"));
    }

    #[test]
    fn window_size_parses_both_forms() {
        assert_eq!("maximize".parse::<WindowSize>().unwrap(), WindowSize::Maximize);
        assert_eq!(
            "1280x720".parse::<WindowSize>().unwrap(),
            WindowSize::Exact {
                width: 1280,
                height: 720
            }
        );
        assert!("wide".parse::<WindowSize>().is_err());
        assert!("1280xtall".parse::<WindowSize>().is_err());
    }

    #[test]
    fn host_aliases_hostname() {
        let config = SessionConfig::normalize(AppiumConfig {
            browser: Some("safari".into()),
            host: Some("grid.local".into()),
            hostname: Some("ignored".into()),
            ..AppiumConfig::default()
        })
        .unwrap();
        assert_eq!(config.address.hostname, "grid.local");
    }
}
