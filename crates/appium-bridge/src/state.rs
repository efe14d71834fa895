//! Session mode: web or native, which platform, which context
//!
//! `is_web` and the active context only ever change together, inside the
//! resolver, and only after the client accepted the context switch.

use action_locator::LocatorScope;
use soulbrowser_core_types::{ContextId, Platform};
use tracing::{debug, info};

use crate::config::{AppiumConfig, SessionConfig};
use crate::errors::{AppiumError, AppiumResult};
use crate::guard;
use crate::ports::AutomationClient;

/// Root element locator of a native page
pub const MOBILE_ROOT: &str = "//*";
/// Root element locator of a web page
pub const WEB_ROOT: &str = "body";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeState {
    is_web: bool,
    platform: Option<Platform>,
    active_context: Option<ContextId>,
}

impl ModeState {
    pub fn is_web(&self) -> bool {
        self.is_web
    }

    pub fn platform(&self) -> Option<&Platform> {
        self.platform.as_ref()
    }

    pub fn active_context(&self) -> Option<&ContextId> {
        self.active_context.as_ref()
    }

    pub fn root(&self) -> &'static str {
        if self.is_web {
            WEB_ROOT
        } else {
            MOBILE_ROOT
        }
    }

    pub fn scope(&self) -> LocatorScope {
        LocatorScope {
            web: self.is_web,
            platform: self.platform.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModeResolver {
    state: ModeState,
}

impl ModeResolver {
    /// Normalize raw configuration and derive the starting mode from it
    pub fn initialize(raw: AppiumConfig) -> AppiumResult<(SessionConfig, ModeResolver)> {
        let config = SessionConfig::normalize(raw)?;
        let resolver = ModeResolver::from_config(&config);
        Ok((config, resolver))
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        let state = ModeState {
            is_web: config.is_web,
            platform: config.platform.clone(),
            active_context: None,
        };
        debug!(web = state.is_web, platform = ?state.platform, "appium mode initialized");
        Self { state }
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    pub fn is_web(&self) -> bool {
        self.state.is_web
    }

    pub fn platform(&self) -> Option<&Platform> {
        self.state.platform.as_ref()
    }

    pub fn scope(&self) -> LocatorScope {
        self.state.scope()
    }

    pub fn require_platform(
        &self,
        action: &'static str,
        expected: Option<Platform>,
    ) -> AppiumResult<()> {
        guard::require_platform(&self.state, action, expected)
    }

    /// Switch into a web view: the named one, or the first `WEBVIEW*` context
    pub async fn enter_web(
        &mut self,
        client: &dyn AutomationClient,
        hint: Option<&ContextId>,
    ) -> AppiumResult<ContextId> {
        let context = match hint {
            Some(context) => context.clone(),
            None => {
                let available = client.contexts().await?;
                match available.iter().find(|context| context.is_webview()) {
                    Some(context) => context.clone(),
                    None => {
                        return Err(AppiumError::NoWebViewFound {
                            available: available.into_iter().map(|c| c.0).collect(),
                        })
                    }
                }
            }
        };
        client.switch_context(&context).await?;
        info!(context = %context, "switched to web context");
        self.state.is_web = true;
        self.state.active_context = Some(context.clone());
        Ok(context)
    }

    /// Switch back to the app, `NATIVE_APP` unless told otherwise
    pub async fn enter_native(
        &mut self,
        client: &dyn AutomationClient,
        hint: Option<&ContextId>,
    ) -> AppiumResult<ContextId> {
        let context = hint.cloned().unwrap_or_else(ContextId::native);
        client.switch_context(&context).await?;
        info!(context = %context, "switched to native context");
        self.state.is_web = false;
        self.state.active_context = Some(context.clone());
        Ok(context)
    }

    /// Switch to an arbitrary context; any context other than `NATIVE_APP`
    /// is driven as web
    pub async fn switch_to_context(
        &mut self,
        client: &dyn AutomationClient,
        context: &ContextId,
    ) -> AppiumResult<()> {
        client.switch_context(context).await?;
        self.state.is_web = !context.is_native();
        self.state.active_context = Some(context.clone());
        debug!(context = %context, web = self.state.is_web, "context switched");
        Ok(())
    }
}
