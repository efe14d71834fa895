use std::collections::BTreeMap;
use std::fmt;

use action_locator::{PortableLocator, StructuredLocator};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use soulbrowser_core_types::ContextId;
use uuid::Uuid;

use crate::errors::{AppiumError, AppiumResult};
use crate::mapping::ServerAddress;

/// Default duration of the pointer move in a swipe, in milliseconds.
pub const DEFAULT_SWIPE_DURATION_MS: u64 = 600;
/// Hold between pointer down and the move.
pub const SWIPE_HOLD_MS: u64 = 200;
/// Settle time after a swipe before the next command.
pub const SWIPE_SETTLE_MS: u64 = 1000;

/// Everything a [`crate::ports::SessionFactory`] needs to open a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    pub address: ServerAddress,
    pub capabilities: Map<String, Value>,
    pub user: Option<String>,
    pub key: Option<String>,
    /// Named browser instances; when set a multi-remote session is created
    pub multiremote: Option<BTreeMap<String, Value>>,
}

impl SessionRequest {
    pub fn is_multiremote(&self) -> bool {
        self.multiremote.is_some()
    }

    /// W3C new-session body
    pub fn new_session_body(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": Value::Object(self.capabilities.clone()),
                "firstMatch": [{}]
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "LANDSCAPE",
            Orientation::Portrait => "PORTRAIT",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network state bitmask reported by the device.
///
/// | value | airplane | wifi | data |
/// |-------|----------|------|------|
/// | 0     |          |      |      |
/// | 1     | x        |      |      |
/// | 2     |          | x    |      |
/// | 4     |          |      | x    |
/// | 6     |          | x    | x    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkConnection(pub u8);

impl NetworkConnection {
    pub const NONE: NetworkConnection = NetworkConnection(0);
    pub const AIRPLANE_MODE: NetworkConnection = NetworkConnection(1);
    pub const WIFI_ONLY: NetworkConnection = NetworkConnection(2);
    pub const DATA_ONLY: NetworkConnection = NetworkConnection(4);
    pub const ALL_NETWORK_ON: NetworkConnection = NetworkConnection(6);

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn in_airplane_mode(&self) -> bool {
        self.0 & 1 != 0
    }

    pub fn has_wifi(&self) -> bool {
        self.0 & 2 != 0
    }

    pub fn has_data(&self) -> bool {
        self.0 & 4 != 0
    }
}

/// Expected field content; booleans compare against checkable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Flag(flag) => write!(f, "{}", flag),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Multi-finger rotation gesture (iOS only).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotateGesture {
    pub x: f64,
    pub y: f64,
    pub duration: f64,
    pub radius: f64,
    pub rotation: f64,
    pub touch_count: u32,
}

impl Default for RotateGesture {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            duration: 1.0,
            radius: 0.0,
            rotation: 0.0,
            touch_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Down,
    Up,
    Left,
    Right,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::Down => "down",
            SwipeDirection::Up => "up",
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of `within_begin` outside a web session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithinContext {
    /// `webview`, `{web: ..}` or `{webview: ..}`; the hint names the context
    Webview(Option<ContextId>),
    Context(ContextId),
}

impl WithinContext {
    pub fn classify(locator: &PortableLocator) -> AppiumResult<Self> {
        match locator {
            PortableLocator::Raw(raw) if raw == "webview" => Ok(WithinContext::Webview(None)),
            PortableLocator::Raw(raw) => Ok(WithinContext::Context(ContextId::new(raw.clone()))),
            PortableLocator::Structured(StructuredLocator { web: Some(web), .. }) => {
                match web.as_ref() {
                    PortableLocator::Raw(raw) => {
                        Ok(WithinContext::Webview(Some(ContextId::new(raw.clone()))))
                    }
                    other => Err(invalid_within(other)),
                }
            }
            other => Err(invalid_within(other)),
        }
    }
}

fn invalid_within(locator: &PortableLocator) -> AppiumError {
    AppiumError::Locator(action_locator::LocatorError::InvalidLocator(format!(
        "`{}` does not name a context",
        locator
    )))
}

/// Screen coordinates in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// W3C pointer action sequence for a single-finger swipe.
pub fn swipe_actions(from: Point, to: Point, duration_ms: u64) -> Value {
    json!([{
        "type": "pointer",
        "id": Uuid::new_v4().to_string(),
        "parameters": { "pointerType": "touch" },
        "actions": [
            { "type": "pointerMove", "duration": 0, "origin": "viewport", "x": from.x, "y": from.y },
            { "type": "pointerDown", "button": 1 },
            { "type": "pause", "duration": SWIPE_HOLD_MS },
            { "type": "pointerMove", "duration": duration_ms, "origin": "viewport", "x": to.x, "y": to.y },
            { "type": "pointerUp", "button": 1 }
        ]
    }])
}

/// Body of a legacy touch action against one element
pub fn touch_action(action: &str, element_id: &str) -> Value {
    json!({
        "actions": [{ "action": action, "options": { "element": element_id } }]
    })
}
