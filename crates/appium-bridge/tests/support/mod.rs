#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use action_locator::{PortableLocator, ResolvedSelector};
use appium_bridge::{
    AppiumConfig, AppiumHelper, AppiumResult, AutomationClient, ClientError, ElementRef,
    FieldValue, Point, RestRequest, RestTransport, ServerAddress, SessionFactory,
    SessionRequest, Timeouts, TransportError, WebActions,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use soulbrowser_core_types::{ContextId, SessionId};

pub const SESSION: &str = "sess-1";

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub id: String,
    pub text: String,
    pub value: Option<String>,
    pub displayed: bool,
    pub selected: bool,
    pub location: Point,
}

impl FakeElement {
    pub fn new(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            value: None,
            displayed: true,
            selected: false,
            location: Point::new(100.0, 400.0),
        }
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }
}

/// Scripted device state shared by the fake client and the test body.
#[derive(Default)]
pub struct FakeDevice {
    pub calls: Mutex<Vec<String>>,
    pub contexts: Mutex<Vec<ContextId>>,
    pub current_context: Mutex<Option<ContextId>>,
    pub elements: Mutex<HashMap<String, Vec<FakeElement>>>,
    pub sources: Mutex<VecDeque<String>>,
    pub actions: Mutex<Vec<Value>>,
    pub typed: Mutex<Vec<(String, String)>>,
    pub settings: Mutex<Value>,
}

impl FakeDevice {
    pub fn with_contexts(contexts: &[&str]) -> Arc<Self> {
        let device = FakeDevice::default();
        *device.contexts.lock().unwrap() = contexts.iter().map(|c| ContextId::new(*c)).collect();
        Arc::new(device)
    }

    pub fn put(&self, selector: &str, elements: Vec<FakeElement>) {
        self.elements
            .lock()
            .unwrap()
            .insert(selector.to_string(), elements);
    }

    pub fn push_source(&self, source: &str) {
        self.sources.lock().unwrap().push_back(source.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn current_context(&self) -> Option<ContextId> {
        self.current_context.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn lookup(&self, selector: &ResolvedSelector) -> Vec<FakeElement> {
        self.elements
            .lock()
            .unwrap()
            .get(&selector.to_string())
            .cloned()
            .unwrap_or_default()
    }

    fn element(&self, element: &ElementRef) -> Option<FakeElement> {
        self.elements
            .lock()
            .unwrap()
            .values()
            .flatten()
            .find(|candidate| candidate.id == element.id)
            .cloned()
    }
}

pub struct FakeClient {
    device: Arc<FakeDevice>,
    session: SessionId,
    address: ServerAddress,
}

impl FakeClient {
    pub fn new(device: Arc<FakeDevice>, address: ServerAddress) -> Self {
        Self {
            device,
            session: SessionId::new(SESSION),
            address,
        }
    }
}

#[async_trait]
impl AutomationClient for FakeClient {
    fn session_id(&self) -> &SessionId {
        &self.session
    }

    fn address(&self) -> &ServerAddress {
        &self.address
    }

    async fn find_element(
        &self,
        selector: &ResolvedSelector,
        root: Option<&ElementRef>,
    ) -> Result<ElementRef, ClientError> {
        self.device.record(format!(
            "find_element {}{}",
            selector,
            root.map(|r| format!(" in {}", r.id)).unwrap_or_default()
        ));
        self.device
            .lookup(selector)
            .first()
            .map(|element| ElementRef::new(element.id.clone()))
            .ok_or_else(|| ClientError::NoSuchElement(selector.to_string()))
    }

    async fn find_elements(
        &self,
        selector: &ResolvedSelector,
        _root: Option<&ElementRef>,
    ) -> Result<Vec<ElementRef>, ClientError> {
        self.device.record(format!("find_elements {}", selector));
        Ok(self
            .device
            .lookup(selector)
            .iter()
            .map(|element| ElementRef::new(element.id.clone()))
            .collect())
    }

    async fn element_click(&self, element: &ElementRef) -> Result<(), ClientError> {
        self.device.record(format!("click {}", element.id));
        Ok(())
    }

    async fn element_clear(&self, element: &ElementRef) -> Result<(), ClientError> {
        self.device.record(format!("clear {}", element.id));
        Ok(())
    }

    async fn element_send_keys(&self, element: &ElementRef, text: &str) -> Result<(), ClientError> {
        self.device.record(format!("send_keys {}", element.id));
        self.device
            .typed
            .lock()
            .unwrap()
            .push((element.id.clone(), text.to_string()));
        Ok(())
    }

    async fn element_text(&self, element: &ElementRef) -> Result<String, ClientError> {
        Ok(self
            .device
            .element(element)
            .map(|e| e.text)
            .unwrap_or_default())
    }

    async fn element_attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, ClientError> {
        Ok(match name {
            "value" => self.device.element(element).and_then(|e| e.value),
            _ => None,
        })
    }

    async fn element_displayed(&self, element: &ElementRef) -> Result<bool, ClientError> {
        Ok(self
            .device
            .element(element)
            .map(|e| e.displayed)
            .unwrap_or(false))
    }

    async fn element_selected(&self, element: &ElementRef) -> Result<bool, ClientError> {
        Ok(self
            .device
            .element(element)
            .map(|e| e.selected)
            .unwrap_or(false))
    }

    async fn element_location(&self, element: &ElementRef) -> Result<Point, ClientError> {
        self.device
            .element(element)
            .map(|e| e.location)
            .ok_or_else(|| ClientError::NoSuchElement(element.id.clone()))
    }

    async fn execute_script(&self, script: &str, _args: Vec<Value>) -> Result<Value, ClientError> {
        self.device.record(format!("execute {}", script));
        Ok(json!([1920, 1080]))
    }

    async fn perform_actions(&self, actions: Value) -> Result<(), ClientError> {
        self.device.record("perform_actions".to_string());
        self.device.actions.lock().unwrap().push(actions);
        Ok(())
    }

    async fn page_source(&self) -> Result<String, ClientError> {
        let mut sources = self.device.sources.lock().unwrap();
        let source = if sources.len() > 1 {
            sources.pop_front()
        } else {
            sources.front().cloned()
        };
        Ok(source.unwrap_or_default())
    }

    async fn contexts(&self) -> Result<Vec<ContextId>, ClientError> {
        Ok(self.device.contexts.lock().unwrap().clone())
    }

    async fn current_context(&self) -> Result<ContextId, ClientError> {
        Ok(self
            .device
            .current_context()
            .unwrap_or_else(ContextId::native))
    }

    async fn switch_context(&self, context: &ContextId) -> Result<(), ClientError> {
        self.device.record(format!("switch_context {}", context));
        *self.device.current_context.lock().unwrap() = Some(context.clone());
        Ok(())
    }

    async fn settings(&self) -> Result<Value, ClientError> {
        Ok(self.device.settings.lock().unwrap().clone())
    }

    async fn update_settings(&self, settings: Value) -> Result<(), ClientError> {
        *self.device.settings.lock().unwrap() = settings;
        Ok(())
    }

    async fn set_timeouts(&self, timeouts: &Timeouts) -> Result<(), ClientError> {
        self.device
            .record(format!("set_timeouts {:?}", timeouts.script));
        Ok(())
    }

    async fn set_window_size(&self, width: u32, height: u32) -> Result<(), ClientError> {
        self.device
            .record(format!("set_window_size {}x{}", width, height));
        Ok(())
    }

    async fn delete_session(&self) -> Result<(), ClientError> {
        self.device.record("delete_session".to_string());
        Ok(())
    }
}

pub enum FactoryMode {
    Ready,
    Refused,
    Rejected,
}

pub struct FakeFactory {
    pub device: Arc<FakeDevice>,
    pub mode: FactoryMode,
    pub requests: Mutex<Vec<SessionRequest>>,
}

impl FakeFactory {
    pub fn new(device: Arc<FakeDevice>) -> Arc<Self> {
        Self::with_mode(device, FactoryMode::Ready)
    }

    pub fn with_mode(device: Arc<FakeDevice>, mode: FactoryMode) -> Arc<Self> {
        Arc::new(Self {
            device,
            mode,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<Box<dyn AutomationClient>, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.mode {
            FactoryMode::Ready => Ok(Box::new(FakeClient::new(
                self.device.clone(),
                request.address.clone(),
            ))),
            FactoryMode::Refused => Err(ClientError::Transport(TransportError::Connect(
                "connect ECONNREFUSED 127.0.0.1:4723".into(),
            ))),
            FactoryMode::Rejected => Err(ClientError::SessionNotCreated(
                "A new session could not be created".into(),
            )),
        }
    }
}

/// Records REST calls and answers from a table keyed by resource suffix.
#[derive(Default)]
pub struct RecordingTransport {
    pub requests: Mutex<Vec<RestRequest>>,
    pub responses: Mutex<HashMap<String, Value>>,
}

impl RecordingTransport {
    pub fn respond(&self, resource: &str, value: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(resource.to_string(), value);
    }

    pub fn requests(&self) -> Vec<RestRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> RestRequest {
        self.requests()
            .last()
            .cloned()
            .expect("at least one request")
    }
}

#[async_trait]
impl RestTransport for RecordingTransport {
    async fn send(&self, request: RestRequest) -> Result<Value, TransportError> {
        let path = request.url.path().to_string();
        self.requests.lock().unwrap().push(request);
        let responses = self.responses.lock().unwrap();
        Ok(responses
            .iter()
            .find(|(resource, _)| path.ends_with(resource.as_str()))
            .map(|(_, value)| value.clone())
            .unwrap_or(Value::Null))
    }
}

/// Web helper that records which actions were delegated to it.
#[derive(Default)]
pub struct RecordingWeb {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingWeb {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl WebActions for RecordingWeb {
    async fn click(
        &self,
        locator: &PortableLocator,
        _context: Option<&PortableLocator>,
    ) -> AppiumResult<()> {
        self.record(format!("click {}", locator));
        Ok(())
    }

    async fn fill_field(&self, field: &PortableLocator, value: &str) -> AppiumResult<()> {
        self.record(format!("fill_field {} {}", field, value));
        Ok(())
    }

    async fn see(&self, text: &str, _context: Option<&PortableLocator>) -> AppiumResult<()> {
        self.record(format!("see {}", text));
        Ok(())
    }

    async fn see_in_field(&self, field: &PortableLocator, value: &FieldValue) -> AppiumResult<()> {
        self.record(format!("see_in_field {} {}", field, value));
        Ok(())
    }

    async fn grab_text_from(&self, locator: &PortableLocator) -> AppiumResult<String> {
        self.record(format!("grab_text_from {}", locator));
        Ok("from web".to_string())
    }

    async fn select_option(&self, select: &PortableLocator, option: &str) -> AppiumResult<()> {
        self.record(format!("select_option {} {}", select, option));
        Ok(())
    }

    async fn save_screenshot(&self, file_name: &str, full_page: bool) -> AppiumResult<()> {
        self.record(format!("save_screenshot {} {}", file_name, full_page));
        Ok(())
    }

    async fn within_begin(&self, locator: &PortableLocator) -> AppiumResult<()> {
        self.record(format!("within_begin {}", locator));
        Ok(())
    }

    async fn within_end(&self) -> AppiumResult<()> {
        self.record("within_end".to_string());
        Ok(())
    }

    async fn after(&self) -> AppiumResult<()> {
        self.record("after".to_string());
        Ok(())
    }
}

pub fn android_app() -> AppiumConfig {
    AppiumConfig {
        platform: Some("Android".into()),
        app: Some("/apps/demo.apk".into()),
        host: Some("127.0.0.1".into()),
        ..AppiumConfig::default()
    }
}

pub fn ios_app() -> AppiumConfig {
    AppiumConfig {
        platform: Some("iOS".into()),
        app: Some("/apps/Demo.app".into()),
        host: Some("127.0.0.1".into()),
        ..AppiumConfig::default()
    }
}

pub fn mobile_browser() -> AppiumConfig {
    AppiumConfig {
        browser: Some("chrome".into()),
        host: Some("127.0.0.1".into()),
        ..AppiumConfig::default()
    }
}

pub struct Harness {
    pub helper: AppiumHelper,
    pub device: Arc<FakeDevice>,
    pub transport: Arc<RecordingTransport>,
    pub web: Arc<RecordingWeb>,
}

/// Helper with a started session against fakes.
pub async fn started(config: AppiumConfig) -> Harness {
    started_with(config, FakeDevice::with_contexts(&["NATIVE_APP", "WEBVIEW_1"])).await
}

pub async fn started_with(config: AppiumConfig, device: Arc<FakeDevice>) -> Harness {
    let transport = Arc::new(RecordingTransport::default());
    let web = Arc::new(RecordingWeb::default());
    let mut helper = AppiumHelper::new(config, FakeFactory::new(device.clone()))
        .expect("valid config")
        .with_transport(transport.clone())
        .with_web_actions(web.clone());
    helper.start_session().await.expect("session started");
    Harness {
        helper,
        device,
        transport,
        web,
    }
}
