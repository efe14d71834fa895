use std::fmt;
use std::sync::Arc;

use action_locator::{LocatorTranslator, PortableLocator, ResolvedSelector};
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use soulbrowser_core_types::{ContextId, Platform};
use tracing::{debug, info, warn, Instrument};

use crate::config::{AppiumConfig, SessionConfig, WindowSize};
use crate::errors::{AppiumError, AppiumResult};
use crate::mapping::SessionEndpoint;
use crate::model::WithinContext;
use crate::ports::{AutomationClient, NoopWebActions, SessionFactory, WebActions};
use crate::state::{ModeResolver, ModeState};
use crate::trace::ActionTracer;
use crate::transport::{ReqwestTransport, RestRequest, RestTransport};

/// Which sessions a conditional block applies to.
pub enum CapabilityFilter {
    Any,
    /// Every listed desired capability must be present with an equal value
    Matches(Map<String, Value>),
    Predicate(Box<dyn Fn(&Map<String, Value>) -> bool + Send + Sync>),
}

impl CapabilityFilter {
    pub fn matches(capabilities: Value) -> Self {
        match capabilities {
            Value::Object(map) => CapabilityFilter::Matches(map),
            _ => CapabilityFilter::Any,
        }
    }

    pub fn predicate(check: impl Fn(&Map<String, Value>) -> bool + Send + Sync + 'static) -> Self {
        CapabilityFilter::Predicate(Box::new(check))
    }

    pub fn accepts(&self, desired: &Map<String, Value>) -> bool {
        match self {
            CapabilityFilter::Any => true,
            CapabilityFilter::Matches(expected) => expected
                .iter()
                .all(|(key, value)| desired.get(key) == Some(value)),
            CapabilityFilter::Predicate(check) => check(desired),
        }
    }
}

impl fmt::Debug for CapabilityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityFilter::Any => f.write_str("Any"),
            CapabilityFilter::Matches(map) => f.debug_tuple("Matches").field(map).finish(),
            CapabilityFilter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Actions run by a conditional block
pub type HelperBlock<'h> = BoxFuture<'h, AppiumResult<()>>;

/// Dispatch layer over one Appium session.
///
/// Inherited actions run natively or are delegated to the web helper
/// depending on the current mode; app-only actions are guarded by platform.
pub struct AppiumHelper {
    config: SessionConfig,
    resolver: ModeResolver,
    factory: Arc<dyn SessionFactory>,
    web: Arc<dyn WebActions>,
    transport: Arc<dyn RestTransport>,
    client: Option<Box<dyn AutomationClient>>,
    tracer: ActionTracer,
    within_switched: bool,
}

impl AppiumHelper {
    pub fn new(config: AppiumConfig, factory: Arc<dyn SessionFactory>) -> AppiumResult<Self> {
        let (config, resolver) = ModeResolver::initialize(config)?;
        let transport =
            ReqwestTransport::default().with_credentials(config.user.clone(), config.key.clone());
        Ok(Self {
            config,
            resolver,
            factory,
            web: Arc::new(NoopWebActions),
            transport: Arc::new(transport),
            client: None,
            tracer: ActionTracer,
            within_switched: false,
        })
    }

    pub fn with_web_actions(mut self, web: Arc<dyn WebActions>) -> Self {
        self.web = web;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn RestTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> &ModeState {
        self.resolver.state()
    }

    pub fn is_web(&self) -> bool {
        self.resolver.is_web()
    }

    pub fn platform(&self) -> Option<&Platform> {
        self.resolver.platform()
    }

    pub fn is_running(&self) -> bool {
        self.client.is_some()
    }

    pub(crate) fn client(&self) -> AppiumResult<&dyn AutomationClient> {
        self.client.as_deref().ok_or(AppiumError::SessionNotStarted)
    }

    pub(crate) fn web(&self) -> &dyn WebActions {
        self.web.as_ref()
    }

    pub(crate) fn require_platform(
        &self,
        action: &'static str,
        expected: Option<Platform>,
    ) -> AppiumResult<()> {
        self.resolver.require_platform(action, expected)
    }

    /// Locator translated for the current mode
    pub fn translate(&self, locator: &PortableLocator) -> AppiumResult<ResolvedSelector> {
        let scope = self.resolver.scope();
        Ok(LocatorTranslator::new(&scope).resolve(locator)?)
    }

    /// Endpoint for raw device commands of the live session
    pub fn session_endpoint(&self) -> AppiumResult<SessionEndpoint> {
        let client = self.client()?;
        Ok(client.address().session_endpoint(client.session_id()))
    }

    pub(crate) async fn get_resource(&self, resource: &str) -> AppiumResult<Value> {
        let url = self.session_endpoint()?.resource(resource)?;
        Ok(self.transport.send(RestRequest::get(url)).await?)
    }

    pub(crate) async fn post_resource(&self, resource: &str, body: Value) -> AppiumResult<Value> {
        let url = self.session_endpoint()?.resource(resource)?;
        Ok(self.transport.send(RestRequest::post(url, body)).await?)
    }

    /// Open the automation session described by the configuration
    pub async fn start_session(&mut self) -> AppiumResult<()> {
        let span = self.tracer.lifecycle("start");
        let request = self.config.session_request();
        let address = request.address.base_url();
        let client = self
            .factory
            .create_session(&request)
            .instrument(span.clone())
            .await
            .map_err(|source| {
                if source.is_connection_refused() {
                    AppiumError::ConnectionRefused { address, source }
                } else {
                    AppiumError::Client(source)
                }
            })?;
        info!(
            parent: &span,
            session = %client.session_id(),
            web = self.resolver.is_web(),
            platform = ?self.resolver.platform(),
            multiremote = request.is_multiremote(),
            "appium session started"
        );

        if self.resolver.is_web() {
            client.set_timeouts(&self.config.timeouts).await?;
        }
        if self.resolver.platform().is_none() {
            match self.config.window_size {
                Some(WindowSize::Maximize) => {
                    let screen = client
                        .execute_script("return [screen.width, screen.height]", Vec::new())
                        .await?;
                    let (width, height) = screen_size(&screen)?;
                    client.set_window_size(width, height).await?;
                }
                Some(WindowSize::Exact { width, height }) => {
                    client.set_window_size(width, height).await?;
                }
                None => {}
            }
        }
        self.client = Some(client);
        Ok(())
    }

    /// Start the session unless it is started manually or already running
    pub async fn before(&mut self) -> AppiumResult<()> {
        if self.config.manual_start || self.is_running() {
            return Ok(());
        }
        self.start_session().await
    }

    /// Per-test cleanup: end the session when restarting between tests,
    /// otherwise let the web helper clean up browser-only sessions
    pub async fn after(&mut self) -> AppiumResult<()> {
        if !self.is_running() {
            return Ok(());
        }
        if self.config.restart {
            return self.stop_session().await;
        }
        if self.resolver.is_web() && self.resolver.platform().is_none() {
            return self.web.after().await;
        }
        Ok(())
    }

    /// Delete the session; a no-op when none is running
    pub async fn stop_session(&mut self) -> AppiumResult<()> {
        let Some(client) = self.client.take() else {
            return Ok(());
        };
        let span = self.tracer.lifecycle("stop");
        client.delete_session().instrument(span).await?;
        info!(session = %client.session_id(), "appium session deleted");
        self.resolver = ModeResolver::from_config(&self.config);
        self.within_switched = false;
        Ok(())
    }

    pub async fn switch_to_web(&mut self, context: Option<&ContextId>) -> AppiumResult<ContextId> {
        let span = self.tracer.span("switch_to_web");
        let client = self.client.as_deref().ok_or(AppiumError::SessionNotStarted)?;
        self.resolver
            .enter_web(client, context)
            .instrument(span)
            .await
    }

    pub async fn switch_to_native(
        &mut self,
        context: Option<&ContextId>,
    ) -> AppiumResult<ContextId> {
        let span = self.tracer.span("switch_to_native");
        let client = self.client.as_deref().ok_or(AppiumError::SessionNotStarted)?;
        self.resolver
            .enter_native(client, context)
            .instrument(span)
            .await
    }

    pub async fn switch_to_context(&mut self, context: &ContextId) -> AppiumResult<()> {
        let span = self.tracer.span("switch_to_context");
        let client = self.client.as_deref().ok_or(AppiumError::SessionNotStarted)?;
        self.resolver
            .switch_to_context(client, context)
            .instrument(span)
            .await
    }

    /// Scope following actions: an element in web mode, a context otherwise
    pub async fn within_begin(&mut self, context: &PortableLocator) -> AppiumResult<()> {
        if self.resolver.is_web() {
            return self.web.within_begin(context).await;
        }
        match WithinContext::classify(context)? {
            WithinContext::Webview(hint) => {
                self.switch_to_web(hint.as_ref()).await?;
            }
            WithinContext::Context(id) => {
                self.switch_to_context(&id).await?;
            }
        }
        self.within_switched = true;
        Ok(())
    }

    pub async fn within_end(&mut self) -> AppiumResult<()> {
        if self.within_switched {
            self.within_switched = false;
            self.switch_to_native(None).await?;
            return Ok(());
        }
        if self.resolver.is_web() {
            return self.web.within_end().await;
        }
        self.switch_to_native(None).await.map(|_| ())
    }

    /// Run `block` only on iOS sessions whose desired capabilities pass `filter`
    pub async fn run_on_ios<F>(&mut self, filter: CapabilityFilter, block: F) -> AppiumResult<bool>
    where
        F: for<'h> FnOnce(&'h mut AppiumHelper) -> HelperBlock<'h>,
    {
        if self.resolver.platform() != Some(&Platform::Ios) {
            return Ok(false);
        }
        self.run_with_caps("ios", filter, block).await
    }

    /// Run `block` only on Android sessions whose desired capabilities pass `filter`
    pub async fn run_on_android<F>(
        &mut self,
        filter: CapabilityFilter,
        block: F,
    ) -> AppiumResult<bool>
    where
        F: for<'h> FnOnce(&'h mut AppiumHelper) -> HelperBlock<'h>,
    {
        if self.resolver.platform() != Some(&Platform::Android) {
            return Ok(false);
        }
        self.run_with_caps("android", filter, block).await
    }

    /// Run `block` only while driving a web context
    pub async fn run_in_web<F>(&mut self, block: F) -> AppiumResult<bool>
    where
        F: for<'h> FnOnce(&'h mut AppiumHelper) -> HelperBlock<'h>,
    {
        if !self.resolver.is_web() {
            return Ok(false);
        }
        debug!("running web-only actions");
        block(self).await?;
        Ok(true)
    }

    async fn run_with_caps<F>(
        &mut self,
        platform: &str,
        filter: CapabilityFilter,
        block: F,
    ) -> AppiumResult<bool>
    where
        F: for<'h> FnOnce(&'h mut AppiumHelper) -> HelperBlock<'h>,
    {
        if !filter.accepts(&self.config.desired_capabilities) {
            debug!(platform, ?filter, "capabilities do not match, block skipped");
            return Ok(false);
        }
        debug!(platform, "running platform-only actions");
        block(self).await?;
        Ok(true)
    }
}

fn screen_size(value: &Value) -> AppiumResult<(u32, u32)> {
    let dimension = |index: usize| {
        value
            .get(index)
            .and_then(Value::as_f64)
            .map(|v| v as u32)
    };
    match (dimension(0), dimension(1)) {
        (Some(width), Some(height)) => Ok((width, height)),
        _ => {
            warn!(screen = %value, "could not read screen size");
            Err(AppiumError::UnexpectedResponse {
                resource: "execute/sync".to_string(),
                detail: format!("expected [width, height], got {}", value),
            })
        }
    }
}
