//! Seams to the outside world
//!
//! The helper never talks to a device directly. Native commands go through
//! an [`AutomationClient`] created by a [`SessionFactory`]; actions in a web
//! context are delegated to a [`WebActions`] implementation.

use action_locator::{PortableLocator, ResolvedSelector};
use async_trait::async_trait;
use serde_json::Value;
use soulbrowser_core_types::{ContextId, SessionId};
use thiserror::Error;

use crate::config::Timeouts;
use crate::errors::{AppiumError, AppiumResult};
use crate::mapping::ServerAddress;
use crate::model::{FieldValue, Point, SessionRequest};
use crate::transport::TransportError;

/// Opaque element handle issued by the automation server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub id: String,
}

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection refused: {0}")]
    ConnectionRefused(String),
    #[error("no such element: {0}")]
    NoSuchElement(String),
    #[error("session not created: {0}")]
    SessionNotCreated(String),
    #[error("{command} failed: {message}")]
    Command { command: String, message: String },
    #[error("{command} returned an unexpected payload: {detail}")]
    Decode { command: String, detail: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn is_connection_refused(&self) -> bool {
        match self {
            ClientError::ConnectionRefused(_) => true,
            ClientError::Transport(err) => err.is_connect(),
            _ => false,
        }
    }
}

/// Live automation session.
#[async_trait]
pub trait AutomationClient: Send + Sync {
    fn session_id(&self) -> &SessionId;

    /// Server the session lives on; device commands are addressed from it
    fn address(&self) -> &ServerAddress;

    async fn find_element(
        &self,
        selector: &ResolvedSelector,
        root: Option<&ElementRef>,
    ) -> Result<ElementRef, ClientError>;

    async fn find_elements(
        &self,
        selector: &ResolvedSelector,
        root: Option<&ElementRef>,
    ) -> Result<Vec<ElementRef>, ClientError>;

    async fn element_click(&self, element: &ElementRef) -> Result<(), ClientError>;
    async fn element_clear(&self, element: &ElementRef) -> Result<(), ClientError>;
    async fn element_send_keys(&self, element: &ElementRef, text: &str)
        -> Result<(), ClientError>;
    async fn element_text(&self, element: &ElementRef) -> Result<String, ClientError>;
    async fn element_attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, ClientError>;
    async fn element_displayed(&self, element: &ElementRef) -> Result<bool, ClientError>;
    async fn element_selected(&self, element: &ElementRef) -> Result<bool, ClientError>;
    async fn element_location(&self, element: &ElementRef) -> Result<Point, ClientError>;

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, ClientError>;
    async fn perform_actions(&self, actions: Value) -> Result<(), ClientError>;
    async fn page_source(&self) -> Result<String, ClientError>;

    async fn contexts(&self) -> Result<Vec<ContextId>, ClientError>;
    async fn current_context(&self) -> Result<ContextId, ClientError>;
    async fn switch_context(&self, context: &ContextId) -> Result<(), ClientError>;

    async fn settings(&self) -> Result<Value, ClientError>;
    async fn update_settings(&self, settings: Value) -> Result<(), ClientError>;

    async fn set_timeouts(&self, timeouts: &Timeouts) -> Result<(), ClientError>;
    async fn set_window_size(&self, width: u32, height: u32) -> Result<(), ClientError>;

    async fn delete_session(&self) -> Result<(), ClientError>;
}

/// Opens sessions; single or multi-remote depending on the request.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<Box<dyn AutomationClient>, ClientError>;
}

/// Web-context counterparts of the inherited actions.
///
/// Every method defaults to [`AppiumError::WebActionUnavailable`], so an
/// implementation only provides what its browser helper supports.
#[async_trait]
pub trait WebActions: Send + Sync {
    async fn click(
        &self,
        _locator: &PortableLocator,
        _context: Option<&PortableLocator>,
    ) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("click"))
    }

    async fn fill_field(&self, _field: &PortableLocator, _value: &str) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("fill_field"))
    }

    async fn append_field(&self, _field: &PortableLocator, _value: &str) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("append_field"))
    }

    async fn check_option(
        &self,
        _field: &PortableLocator,
        _context: Option<&PortableLocator>,
    ) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("check_option"))
    }

    async fn see(&self, _text: &str, _context: Option<&PortableLocator>) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("see"))
    }

    async fn dont_see(&self, _text: &str, _context: Option<&PortableLocator>) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("dont_see"))
    }

    async fn see_element(&self, _locator: &PortableLocator) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("see_element"))
    }

    async fn dont_see_element(&self, _locator: &PortableLocator) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("dont_see_element"))
    }

    async fn see_in_field(&self, _field: &PortableLocator, _value: &FieldValue) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("see_in_field"))
    }

    async fn dont_see_in_field(
        &self,
        _field: &PortableLocator,
        _value: &FieldValue,
    ) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("dont_see_in_field"))
    }

    async fn see_checkbox_is_checked(&self, _field: &PortableLocator) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("see_checkbox_is_checked"))
    }

    async fn dont_see_checkbox_is_checked(&self, _field: &PortableLocator) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("dont_see_checkbox_is_checked"))
    }

    async fn grab_text_from(&self, _locator: &PortableLocator) -> AppiumResult<String> {
        Err(AppiumError::WebActionUnavailable("grab_text_from"))
    }

    async fn grab_text_from_all(&self, _locator: &PortableLocator) -> AppiumResult<Vec<String>> {
        Err(AppiumError::WebActionUnavailable("grab_text_from_all"))
    }

    async fn grab_value_from(&self, _locator: &PortableLocator) -> AppiumResult<String> {
        Err(AppiumError::WebActionUnavailable("grab_value_from"))
    }

    async fn grab_value_from_all(&self, _locator: &PortableLocator) -> AppiumResult<Vec<String>> {
        Err(AppiumError::WebActionUnavailable("grab_value_from_all"))
    }

    async fn grab_attribute_from(
        &self,
        _locator: &PortableLocator,
        _attribute: &str,
    ) -> AppiumResult<Option<String>> {
        Err(AppiumError::WebActionUnavailable("grab_attribute_from"))
    }

    async fn grab_attribute_from_all(
        &self,
        _locator: &PortableLocator,
        _attribute: &str,
    ) -> AppiumResult<Vec<Option<String>>> {
        Err(AppiumError::WebActionUnavailable("grab_attribute_from_all"))
    }

    async fn grab_number_of_visible_elements(
        &self,
        _locator: &PortableLocator,
    ) -> AppiumResult<usize> {
        Err(AppiumError::WebActionUnavailable(
            "grab_number_of_visible_elements",
        ))
    }

    async fn wait_for_element(
        &self,
        _locator: &PortableLocator,
        _seconds: Option<f64>,
    ) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("wait_for_element"))
    }

    async fn wait_for_visible(
        &self,
        _locator: &PortableLocator,
        _seconds: Option<f64>,
    ) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("wait_for_visible"))
    }

    async fn wait_for_invisible(
        &self,
        _locator: &PortableLocator,
        _seconds: Option<f64>,
    ) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("wait_for_invisible"))
    }

    async fn wait_for_text(
        &self,
        _text: &str,
        _seconds: Option<f64>,
        _context: Option<&PortableLocator>,
    ) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("wait_for_text"))
    }

    async fn scroll_into_view(
        &self,
        _locator: &PortableLocator,
        _options: Option<&Value>,
    ) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("scroll_into_view"))
    }

    async fn select_option(&self, _select: &PortableLocator, _option: &str) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("select_option"))
    }

    async fn save_screenshot(&self, _file_name: &str, _full_page: bool) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("save_screenshot"))
    }

    async fn within_begin(&self, _locator: &PortableLocator) -> AppiumResult<()> {
        Err(AppiumError::WebActionUnavailable("within_begin"))
    }

    async fn within_end(&self) -> AppiumResult<()> {
        Ok(())
    }

    /// Per-test cleanup for browser-only sessions
    async fn after(&self) -> AppiumResult<()> {
        Ok(())
    }
}

/// Web helper stand-in for native-only runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWebActions;

#[async_trait]
impl WebActions for NoopWebActions {}
