use serde::{Deserialize, Serialize};
use soulbrowser_core_types::SessionId;
use url::Url;

use crate::errors::{AppiumError, AppiumResult};

/// Where the Appium server listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAddress {
    pub protocol: String,
    pub hostname: String,
    pub port: u16,
    pub path: String,
}

impl ServerAddress {
    pub fn new(
        protocol: impl Into<String>,
        hostname: impl Into<String>,
        port: u16,
        path: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            hostname: hostname.into(),
            port,
            path: path.into(),
        }
    }

    /// `<protocol>://<hostname>:<port><path>` without a trailing slash
    pub fn base_url(&self) -> String {
        let path = self.path.trim_end_matches('/');
        let separator = if path.is_empty() || path.starts_with('/') {
            ""
        } else {
            "/"
        };
        format!(
            "{}://{}:{}{}{}",
            self.protocol, self.hostname, self.port, separator, path
        )
    }

    pub fn status_url(&self) -> AppiumResult<Url> {
        parse_url(&format!("{}/status", self.base_url()))
    }

    pub fn session_endpoint(&self, session: &SessionId) -> SessionEndpoint {
        SessionEndpoint {
            base: format!("{}/session/{}", self.base_url(), session),
        }
    }
}

/// Base URL for device commands of one live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEndpoint {
    base: String,
}

impl SessionEndpoint {
    pub fn as_str(&self) -> &str {
        &self.base
    }

    pub fn resource(&self, resource: &str) -> AppiumResult<Url> {
        parse_url(&format!(
            "{}/{}",
            self.base,
            resource.trim_start_matches('/')
        ))
    }
}

fn parse_url(raw: &str) -> AppiumResult<Url> {
    Url::parse(raw).map_err(|err| AppiumError::Endpoint(format!("{}: {}", raw, err)))
}

/// Resource paths relative to the session endpoint.
pub mod resources {
    pub const ORIENTATION: &str = "orientation";
    pub const NETWORK_CONNECTION: &str = "network_connection";
    pub const TOUCH_PERFORM: &str = "touch/perform";
    pub const APP_RESET: &str = "appium/app/reset";
    pub const APP_CLOSE: &str = "appium/app/close";
    pub const HIDE_KEYBOARD: &str = "appium/device/hide_keyboard";
    pub const REMOVE_APP: &str = "appium/device/remove_app";
    pub const APP_INSTALLED: &str = "appium/device/app_installed";
    pub const INSTALL_APP: &str = "appium/device/install_app";
    pub const CURRENT_ACTIVITY: &str = "appium/device/current_activity";
    pub const IS_LOCKED: &str = "appium/device/is_locked";
    pub const PRESS_KEYCODE: &str = "appium/device/press_keycode";
    pub const OPEN_NOTIFICATIONS: &str = "appium/device/open_notifications";
    pub const START_ACTIVITY: &str = "appium/device/start_activity";
    pub const PULL_FILE: &str = "appium/device/pull_file";
    pub const SHAKE: &str = "appium/device/shake";
    pub const ROTATE: &str = "appium/device/rotate";
    pub const TOUCH_ID: &str = "appium/simulator/touch_id";

    pub fn element_click(element_id: &str) -> String {
        format!("element/{}/click", element_id)
    }

    pub fn element_value(element_id: &str) -> String {
        format!("appium/element/{}/value", element_id)
    }
}
