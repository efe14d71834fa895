//! App-only device commands
//!
//! Guarded by [`crate::guard::require_platform`]; most go straight to the
//! Appium REST surface of the live session.

use std::path::Path;

use action_locator::PortableLocator;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use soulbrowser_core_types::{ContextId, Platform};
use tracing::{debug, info, instrument};

use crate::assert::{self, Truth};
use crate::bootstrap::AppiumHelper;
use crate::errors::{AppiumError, AppiumResult};
use crate::mapping::resources;
use crate::model::{touch_action, NetworkConnection, Orientation, RotateGesture};

impl AppiumHelper {
    /// Tap an element through the plain element click endpoint
    #[instrument(name = "appium.action", skip(self), fields(action = "tap"))]
    pub async fn tap(&self, locator: &PortableLocator) -> AppiumResult<()> {
        let element = self.find_one(locator, None).await?;
        self.post_resource(&resources::element_click(&element.id), json!({}))
            .await?;
        Ok(())
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "check_if_app_is_installed"))]
    pub async fn check_if_app_is_installed(&self, bundle_id: &str) -> AppiumResult<bool> {
        self.require_platform("check_if_app_is_installed", Some(Platform::Android))?;
        let value = self
            .post_resource(resources::APP_INSTALLED, json!({ "bundleId": bundle_id }))
            .await?;
        decode(resources::APP_INSTALLED, value)
    }

    pub async fn see_app_is_installed(&self, bundle_id: &str) -> AppiumResult<()> {
        self.require_platform("see_app_is_installed", Some(Platform::Android))?;
        let installed = self.check_if_app_is_installed(bundle_id).await?;
        Truth::new(format!("app {}", bundle_id), "to be installed").assert(installed)
    }

    pub async fn see_app_is_not_installed(&self, bundle_id: &str) -> AppiumResult<()> {
        self.require_platform("see_app_is_not_installed", Some(Platform::Android))?;
        let installed = self.check_if_app_is_installed(bundle_id).await?;
        Truth::new(format!("app {}", bundle_id), "to be installed").negate(installed)
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "install_app"))]
    pub async fn install_app(&self, path: &str) -> AppiumResult<()> {
        self.require_platform("install_app", Some(Platform::Android))?;
        self.post_resource(resources::INSTALL_APP, json!({ "appPath": path }))
            .await?;
        info!(path, "app installed");
        Ok(())
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "remove_app"))]
    pub async fn remove_app(&self, app_id: &str, bundle_id: Option<&str>) -> AppiumResult<()> {
        self.require_platform("remove_app", Some(Platform::Android))?;
        self.post_resource(
            resources::REMOVE_APP,
            json!({ "appId": app_id, "bundleId": bundle_id }),
        )
        .await?;
        Ok(())
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "reset_app"))]
    pub async fn reset_app(&self) -> AppiumResult<()> {
        self.require_platform("reset_app", None)?;
        self.post_resource(resources::APP_RESET, json!({})).await?;
        Ok(())
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "close_app"))]
    pub async fn close_app(&self) -> AppiumResult<()> {
        self.require_platform("close_app", None)?;
        self.post_resource(resources::APP_CLOSE, json!({})).await?;
        Ok(())
    }

    pub async fn see_current_activity_is(&self, activity: &str) -> AppiumResult<()> {
        self.require_platform("see_current_activity_is", Some(Platform::Android))?;
        let current = self.grab_current_activity().await?;
        assert::equals("current activity", &activity.to_string(), &current)
    }

    pub async fn see_device_is_locked(&self) -> AppiumResult<()> {
        self.require_platform("see_device_is_locked", Some(Platform::Android))?;
        let locked = self.is_locked().await?;
        Truth::new("device", "to be locked").assert(locked)
    }

    pub async fn see_device_is_unlocked(&self) -> AppiumResult<()> {
        self.require_platform("see_device_is_unlocked", Some(Platform::Android))?;
        let locked = self.is_locked().await?;
        Truth::new("device", "to be locked").negate(locked)
    }

    pub async fn see_orientation_is(&self, orientation: Orientation) -> AppiumResult<()> {
        self.require_platform("see_orientation_is", None)?;
        let current = self.grab_orientation().await?;
        assert::equals("orientation", &orientation, &current)
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "set_orientation"))]
    pub async fn set_orientation(&self, orientation: Orientation) -> AppiumResult<()> {
        self.require_platform("set_orientation", None)?;
        self.post_resource(
            resources::ORIENTATION,
            json!({ "orientation": orientation }),
        )
        .await?;
        Ok(())
    }

    pub async fn grab_orientation(&self) -> AppiumResult<Orientation> {
        self.require_platform("grab_orientation", None)?;
        let value = self.get_resource(resources::ORIENTATION).await?;
        let orientation = decode(resources::ORIENTATION, value)?;
        debug!(%orientation, "orientation");
        Ok(orientation)
    }

    pub async fn grab_all_contexts(&self) -> AppiumResult<Vec<ContextId>> {
        self.require_platform("grab_all_contexts", None)?;
        Ok(self.client()?.contexts().await?)
    }

    pub async fn grab_context(&self) -> AppiumResult<ContextId> {
        self.require_platform("grab_context", None)?;
        Ok(self.client()?.current_context().await?)
    }

    pub async fn grab_current_activity(&self) -> AppiumResult<String> {
        self.require_platform("grab_current_activity", Some(Platform::Android))?;
        let value = self.get_resource(resources::CURRENT_ACTIVITY).await?;
        decode(resources::CURRENT_ACTIVITY, value)
    }

    pub async fn grab_network_connection(&self) -> AppiumResult<NetworkConnection> {
        self.require_platform("grab_network_connection", Some(Platform::Android))?;
        let value = self.get_resource(resources::NETWORK_CONNECTION).await?;
        decode(resources::NETWORK_CONNECTION, value)
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "set_network_connection"))]
    pub async fn set_network_connection(
        &self,
        connection: NetworkConnection,
    ) -> AppiumResult<NetworkConnection> {
        self.require_platform("set_network_connection", Some(Platform::Android))?;
        let value = self
            .post_resource(
                resources::NETWORK_CONNECTION,
                json!({ "parameters": { "type": connection.value() } }),
            )
            .await?;
        decode(resources::NETWORK_CONNECTION, value)
    }

    pub async fn grab_settings(&self) -> AppiumResult<Value> {
        self.require_platform("grab_settings", None)?;
        Ok(self.client()?.settings().await?)
    }

    pub async fn set_settings(&self, settings: Value) -> AppiumResult<()> {
        self.require_platform("set_settings", None)?;
        Ok(self.client()?.update_settings(settings).await?)
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "start_activity"))]
    pub async fn start_activity(&self, app_package: &str, app_activity: &str) -> AppiumResult<()> {
        self.require_platform("start_activity", Some(Platform::Android))?;
        self.post_resource(
            resources::START_ACTIVITY,
            json!({ "appPackage": app_package, "appActivity": app_activity }),
        )
        .await?;
        Ok(())
    }

    /// Hide the soft keyboard; `strategy` and `key` are passed through for
    /// iOS, where the keyboard is dismissed by pressing a key
    pub async fn hide_device_keyboard(
        &self,
        strategy: Option<&str>,
        key: Option<&str>,
    ) -> AppiumResult<()> {
        self.require_platform("hide_device_keyboard", None)?;
        let mut body = serde_json::Map::new();
        if let Some(strategy) = strategy {
            body.insert("strategy".into(), json!(strategy));
        }
        if let Some(key) = key {
            body.insert("key".into(), json!(key));
        }
        self.post_resource(resources::HIDE_KEYBOARD, Value::Object(body))
            .await?;
        Ok(())
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "send_device_key_event"))]
    pub async fn send_device_key_event(&self, keycode: u32) -> AppiumResult<()> {
        self.require_platform("send_device_key_event", Some(Platform::Android))?;
        self.post_resource(resources::PRESS_KEYCODE, json!({ "keycode": keycode }))
            .await?;
        Ok(())
    }

    pub async fn open_notifications(&self) -> AppiumResult<()> {
        self.require_platform("open_notifications", Some(Platform::Android))?;
        self.post_resource(resources::OPEN_NOTIFICATIONS, json!({}))
            .await?;
        Ok(())
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "make_touch_action"))]
    pub async fn make_touch_action(
        &self,
        locator: &PortableLocator,
        action: &str,
    ) -> AppiumResult<()> {
        self.require_platform("make_touch_action", None)?;
        let element = self.find_one(locator, None).await?;
        self.post_resource(resources::TOUCH_PERFORM, touch_action(action, &element.id))
            .await?;
        Ok(())
    }

    pub async fn touch_perform(&self, actions: Vec<Value>) -> AppiumResult<()> {
        self.require_platform("touch_perform", None)?;
        self.post_resource(resources::TOUCH_PERFORM, json!({ "actions": actions }))
            .await?;
        Ok(())
    }

    /// Copy a file off the device to `dest`
    #[instrument(name = "appium.action", skip(self), fields(action = "pull_file"))]
    pub async fn pull_file(&self, path: &str, dest: &Path) -> AppiumResult<()> {
        self.require_platform("pull_file", None)?;
        let value = self
            .post_resource(resources::PULL_FILE, json!({ "path": path }))
            .await?;
        let encoded: String = decode(resources::PULL_FILE, value)?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|err| AppiumError::UnexpectedResponse {
                resource: resources::PULL_FILE.to_string(),
                detail: err.to_string(),
            })?;
        tokio::fs::write(dest, &bytes).await?;
        info!(path, dest = %dest.display(), bytes = bytes.len(), "file pulled from device");
        Ok(())
    }

    pub async fn shake_device(&self) -> AppiumResult<()> {
        self.require_platform("shake_device", Some(Platform::Ios))?;
        self.post_resource(resources::SHAKE, json!({})).await?;
        Ok(())
    }

    pub async fn rotate(&self, gesture: RotateGesture) -> AppiumResult<()> {
        self.require_platform("rotate", Some(Platform::Ios))?;
        let body = serde_json::to_value(gesture).map_err(|err| {
            AppiumError::UnexpectedResponse {
                resource: resources::ROTATE.to_string(),
                detail: err.to_string(),
            }
        })?;
        self.post_resource(resources::ROTATE, body).await?;
        Ok(())
    }

    /// Set an element's value without typing it key by key
    pub async fn set_immediate_value(&self, element_id: &str, value: &str) -> AppiumResult<()> {
        self.require_platform("set_immediate_value", Some(Platform::Ios))?;
        self.post_resource(
            &resources::element_value(element_id),
            json!({ "value": value }),
        )
        .await?;
        Ok(())
    }

    pub async fn simulate_touch_id(&self, matched: bool) -> AppiumResult<()> {
        self.require_platform("simulate_touch_id", Some(Platform::Ios))?;
        self.post_resource(resources::TOUCH_ID, json!({ "match": matched }))
            .await?;
        Ok(())
    }

    async fn is_locked(&self) -> AppiumResult<bool> {
        let value = self.post_resource(resources::IS_LOCKED, json!({})).await?;
        decode(resources::IS_LOCKED, value)
    }
}

fn decode<T: DeserializeOwned>(resource: &str, value: Value) -> AppiumResult<T> {
    serde_json::from_value(value.clone()).map_err(|err| AppiumError::UnexpectedResponse {
        resource: resource.to_string(),
        detail: format!("{} in {}", err, value),
    })
}
