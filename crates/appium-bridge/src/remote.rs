//! W3C WebDriver client over [`RestTransport`]
//!
//! Implements [`AutomationClient`] and [`SessionFactory`] directly on the
//! wire protocol so the helper can drive a real Appium server.

use std::sync::Arc;

use action_locator::ResolvedSelector;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use soulbrowser_core_types::{ContextId, SessionId};
use tracing::{debug, info};

use crate::config::Timeouts;
use crate::mapping::{ServerAddress, SessionEndpoint};
use crate::model::{Point, SessionRequest};
use crate::ports::{AutomationClient, ClientError, ElementRef, SessionFactory};
use crate::transport::{RestRequest, RestTransport, TransportError};

/// W3C element reference key
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
/// Key used by JSONWP-era servers
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

static CLASS_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(XCUIElementType\w+|[A-Za-z_][\w$]*(\.[A-Za-z_][\w$]*)+)$").expect("static regex")
});

/// Split a resolved selector into a W3C `(using, value)` pair
pub fn w3c_locator(selector: &ResolvedSelector) -> (String, String) {
    let raw = match selector {
        ResolvedSelector::Matcher(matcher) => {
            return ("-android datamatcher".to_string(), matcher.to_string())
        }
        ResolvedSelector::Selector(raw) => raw.as_str(),
    };
    let pair = |using: &str, value: &str| (using.to_string(), value.to_string());

    if let Some(id) = raw.strip_prefix('~') {
        return pair("accessibility id", id);
    }
    if raw.starts_with('/') || raw.starts_with('(') || raw.starts_with("./") {
        return pair("xpath", raw);
    }
    if let Some(query) = raw.strip_prefix("android=") {
        return pair("-android uiautomator", query);
    }
    if let Some(query) = raw.strip_prefix("ios=") {
        return pair("-ios predicate string", query);
    }
    if raw.starts_with('-') {
        if let Some((using, value)) = raw.split_once(':') {
            return pair(using, value);
        }
    }
    if CLASS_NAME.is_match(raw) {
        return pair("class name", raw);
    }
    if raw.starts_with('#') || raw.starts_with('.') || raw.starts_with('[') || raw == "body" {
        return pair("css selector", raw);
    }
    pair("xpath", raw)
}

pub struct RemoteClient {
    session_id: SessionId,
    address: ServerAddress,
    endpoint: SessionEndpoint,
    transport: Arc<dyn RestTransport>,
    capabilities: Value,
}

impl RemoteClient {
    pub fn new(
        session_id: SessionId,
        address: ServerAddress,
        transport: Arc<dyn RestTransport>,
        capabilities: Value,
    ) -> Self {
        let endpoint = address.session_endpoint(&session_id);
        Self {
            session_id,
            address,
            endpoint,
            transport,
            capabilities,
        }
    }

    /// Capabilities the server granted
    pub fn capabilities(&self) -> &Value {
        &self.capabilities
    }

    async fn get(&self, command: &str, resource: &str) -> Result<Value, ClientError> {
        let url = self.url(command, resource)?;
        self.send(command, RestRequest::get(url)).await
    }

    async fn post(&self, command: &str, resource: &str, body: Value) -> Result<Value, ClientError> {
        let url = self.url(command, resource)?;
        self.send(command, RestRequest::post(url, body)).await
    }

    fn url(&self, command: &str, resource: &str) -> Result<url::Url, ClientError> {
        self.endpoint
            .resource(resource)
            .map_err(|err| ClientError::command(command, err.to_string()))
    }

    async fn send(&self, command: &str, request: RestRequest) -> Result<Value, ClientError> {
        self.transport
            .send(request)
            .await
            .map_err(|err| classify(command, err))
    }

    fn element_resource(element: &ElementRef, suffix: &str) -> String {
        format!("element/{}/{}", element.id, suffix)
    }
}

#[async_trait]
impl AutomationClient for RemoteClient {
    fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    fn address(&self) -> &ServerAddress {
        &self.address
    }

    async fn find_element(
        &self,
        selector: &ResolvedSelector,
        root: Option<&ElementRef>,
    ) -> Result<ElementRef, ClientError> {
        let (using, value) = w3c_locator(selector);
        let resource = match root {
            Some(root) => Self::element_resource(root, "element"),
            None => "element".to_string(),
        };
        let found = self
            .post("find_element", &resource, json!({ "using": using, "value": value }))
            .await?;
        element_ref("find_element", &found)
    }

    async fn find_elements(
        &self,
        selector: &ResolvedSelector,
        root: Option<&ElementRef>,
    ) -> Result<Vec<ElementRef>, ClientError> {
        let (using, value) = w3c_locator(selector);
        let resource = match root {
            Some(root) => Self::element_resource(root, "elements"),
            None => "elements".to_string(),
        };
        let found = self
            .post("find_elements", &resource, json!({ "using": using, "value": value }))
            .await?;
        match found {
            Value::Array(items) => items
                .iter()
                .map(|item| element_ref("find_elements", item))
                .collect(),
            other => Err(ClientError::Decode {
                command: "find_elements".into(),
                detail: format!("expected an array, got {}", other),
            }),
        }
    }

    async fn element_click(&self, element: &ElementRef) -> Result<(), ClientError> {
        self.post("element_click", &Self::element_resource(element, "click"), json!({}))
            .await
            .map(drop)
    }

    async fn element_clear(&self, element: &ElementRef) -> Result<(), ClientError> {
        self.post("element_clear", &Self::element_resource(element, "clear"), json!({}))
            .await
            .map(drop)
    }

    async fn element_send_keys(&self, element: &ElementRef, text: &str) -> Result<(), ClientError> {
        self.post(
            "element_send_keys",
            &Self::element_resource(element, "value"),
            json!({ "text": text, "value": text.chars().map(String::from).collect::<Vec<_>>() }),
        )
        .await
        .map(drop)
    }

    async fn element_text(&self, element: &ElementRef) -> Result<String, ClientError> {
        let value = self
            .get("element_text", &Self::element_resource(element, "text"))
            .await?;
        decode("element_text", value)
    }

    async fn element_attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, ClientError> {
        let resource = Self::element_resource(element, &format!("attribute/{}", name));
        let value = self.get("element_attribute", &resource).await?;
        Ok(match value {
            Value::Null => None,
            Value::String(text) => Some(text),
            other => Some(other.to_string()),
        })
    }

    async fn element_displayed(&self, element: &ElementRef) -> Result<bool, ClientError> {
        let value = self
            .get("element_displayed", &Self::element_resource(element, "displayed"))
            .await?;
        decode("element_displayed", value)
    }

    async fn element_selected(&self, element: &ElementRef) -> Result<bool, ClientError> {
        let value = self
            .get("element_selected", &Self::element_resource(element, "selected"))
            .await?;
        decode("element_selected", value)
    }

    async fn element_location(&self, element: &ElementRef) -> Result<Point, ClientError> {
        let value = self
            .get("element_location", &Self::element_resource(element, "rect"))
            .await?;
        decode("element_location", value)
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, ClientError> {
        self.post(
            "execute_script",
            "execute/sync",
            json!({ "script": script, "args": args }),
        )
        .await
    }

    async fn perform_actions(&self, actions: Value) -> Result<(), ClientError> {
        self.post("perform_actions", "actions", json!({ "actions": actions }))
            .await
            .map(drop)
    }

    async fn page_source(&self) -> Result<String, ClientError> {
        let value = self.get("page_source", "source").await?;
        decode("page_source", value)
    }

    async fn contexts(&self) -> Result<Vec<ContextId>, ClientError> {
        let value = self.get("contexts", "contexts").await?;
        let names: Vec<String> = decode("contexts", value)?;
        Ok(names.into_iter().map(ContextId::new).collect())
    }

    async fn current_context(&self) -> Result<ContextId, ClientError> {
        let value = self.get("current_context", "context").await?;
        decode::<String>("current_context", value).map(ContextId::new)
    }

    async fn switch_context(&self, context: &ContextId) -> Result<(), ClientError> {
        self.post(
            "switch_context",
            "context",
            json!({ "name": context.as_str() }),
        )
        .await
        .map(drop)
    }

    async fn settings(&self) -> Result<Value, ClientError> {
        self.get("settings", "appium/settings").await
    }

    async fn update_settings(&self, settings: Value) -> Result<(), ClientError> {
        self.post(
            "update_settings",
            "appium/settings",
            json!({ "settings": settings }),
        )
        .await
        .map(drop)
    }

    async fn set_timeouts(&self, timeouts: &Timeouts) -> Result<(), ClientError> {
        let body = serde_json::to_value(timeouts).map_err(|err| ClientError::Decode {
            command: "set_timeouts".into(),
            detail: err.to_string(),
        })?;
        self.post("set_timeouts", "timeouts", body).await.map(drop)
    }

    async fn set_window_size(&self, width: u32, height: u32) -> Result<(), ClientError> {
        self.post(
            "set_window_size",
            "window/rect",
            json!({ "width": width, "height": height }),
        )
        .await
        .map(drop)
    }

    async fn delete_session(&self) -> Result<(), ClientError> {
        let url = url::Url::parse(self.endpoint.as_str())
            .map_err(|err| ClientError::command("delete_session", err.to_string()))?;
        self.send("delete_session", RestRequest::delete(url))
            .await
            .map(drop)
    }
}

/// Opens single sessions with a W3C new-session request.
pub struct RemoteSessionFactory {
    transport: Arc<dyn RestTransport>,
}

impl RemoteSessionFactory {
    pub fn new(transport: Arc<dyn RestTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl SessionFactory for RemoteSessionFactory {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<Box<dyn AutomationClient>, ClientError> {
        if let Some(instances) = &request.multiremote {
            let names: Vec<&str> = instances.keys().map(String::as_str).collect();
            return Err(ClientError::SessionNotCreated(format!(
                "multi-remote sessions ({}) need a dedicated factory",
                names.join(", ")
            )));
        }
        let url = url::Url::parse(&format!("{}/session", request.address.base_url()))
            .map_err(|err| ClientError::SessionNotCreated(err.to_string()))?;
        debug!(url = %url, "creating appium session");
        let created = self
            .transport
            .send(RestRequest::post(url, request.new_session_body()))
            .await
            .map_err(|err| match err {
                TransportError::Connect(message) => ClientError::ConnectionRefused(message),
                other => ClientError::SessionNotCreated(other.to_string()),
            })?;
        let session_id = created
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ClientError::SessionNotCreated(format!("no sessionId in {}", created))
            })?;
        let capabilities = created.get("capabilities").cloned().unwrap_or(Value::Null);
        info!(session = session_id, "session created");
        Ok(Box::new(RemoteClient::new(
            SessionId::new(session_id),
            request.address.clone(),
            self.transport.clone(),
            capabilities,
        )))
    }
}

fn element_ref(command: &str, value: &Value) -> Result<ElementRef, ClientError> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(ElementRef::new)
        .ok_or_else(|| ClientError::Decode {
            command: command.to_string(),
            detail: format!("no element reference in {}", value),
        })
}

fn decode<T: DeserializeOwned>(command: &str, value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|err| ClientError::Decode {
        command: command.to_string(),
        detail: err.to_string(),
    })
}

fn classify(command: &str, err: TransportError) -> ClientError {
    match err.remote_error() {
        Some("no such element") => ClientError::NoSuchElement(err.to_string()),
        Some(_) => ClientError::command(command, err.to_string()),
        None => ClientError::Transport(err),
    }
}
