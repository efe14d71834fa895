//! Inherited actions
//!
//! In a web context each action is handed to the web helper untouched. In a
//! native context the locator is translated first and the action runs
//! against the automation client, or the session's element endpoint for
//! clicks.

use action_locator::{PortableLocator, ResolvedSelector};
use serde_json::{json, Value};
use tracing::instrument;

use crate::assert::Truth;
use crate::bootstrap::AppiumHelper;
use crate::errors::{AppiumError, AppiumResult};
use crate::mapping::resources;
use crate::model::FieldValue;
use crate::ports::{AutomationClient, ElementRef};
use crate::wait::{seconds, wait_until};

impl AppiumHelper {
    #[instrument(name = "appium.action", skip(self), fields(action = "click"))]
    pub async fn click(
        &self,
        locator: &PortableLocator,
        context: Option<&PortableLocator>,
    ) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().click(locator, context).await;
        }
        let element = self.find_one(locator, context).await?;
        self.post_resource(&resources::element_click(&element.id), json!({}))
            .await?;
        Ok(())
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "fill_field"))]
    pub async fn fill_field(&self, field: &PortableLocator, value: &str) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().fill_field(field, value).await;
        }
        let client = self.client()?;
        let element = self.find_one(field, None).await?;
        client.element_clear(&element).await?;
        client.element_send_keys(&element, value).await?;
        Ok(())
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "append_field"))]
    pub async fn append_field(&self, field: &PortableLocator, value: &str) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().append_field(field, value).await;
        }
        let element = self.find_one(field, None).await?;
        self.client()?.element_send_keys(&element, value).await?;
        Ok(())
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "check_option"))]
    pub async fn check_option(
        &self,
        field: &PortableLocator,
        context: Option<&PortableLocator>,
    ) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().check_option(field, context).await;
        }
        let client = self.client()?;
        let element = self.find_one(field, context).await?;
        if !client.element_selected(&element).await? {
            client.element_click(&element).await?;
        }
        Ok(())
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "see"))]
    pub async fn see(&self, text: &str, context: Option<&PortableLocator>) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().see(text, context).await;
        }
        let texts = self.texts_in(context).await?;
        Truth::new(text_subject(context), format!("to include \"{}\"", text))
            .assert(texts.iter().any(|candidate| candidate.contains(text)))
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "dont_see"))]
    pub async fn dont_see(
        &self,
        text: &str,
        context: Option<&PortableLocator>,
    ) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().dont_see(text, context).await;
        }
        let texts = self.texts_in(context).await?;
        Truth::new(text_subject(context), format!("to include \"{}\"", text))
            .negate(texts.iter().any(|candidate| candidate.contains(text)))
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "see_element"))]
    pub async fn see_element(&self, locator: &PortableLocator) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().see_element(locator).await;
        }
        let client = self.client()?;
        let elements = self.find_all(locator, None).await?;
        Truth::new(format!("element ({})", locator), "to be visible")
            .assert(any_displayed(client, &elements).await?)
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "dont_see_element"))]
    pub async fn dont_see_element(&self, locator: &PortableLocator) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().dont_see_element(locator).await;
        }
        let client = self.client()?;
        let elements = self.find_all(locator, None).await?;
        Truth::new(format!("element ({})", locator), "to be visible")
            .negate(any_displayed(client, &elements).await?)
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "see_in_field"))]
    pub async fn see_in_field(
        &self,
        field: &PortableLocator,
        value: impl Into<FieldValue> + std::fmt::Debug,
    ) -> AppiumResult<()> {
        let value = value.into();
        if self.is_web() {
            return self.web().see_in_field(field, &value).await;
        }
        let actual = self.field_values(field).await?;
        let expected = value.to_string();
        Truth::new(format!("field ({})", field), format!("to include \"{}\"", expected))
            .assert(actual.iter().any(|candidate| candidate.contains(&expected)))
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "dont_see_in_field"))]
    pub async fn dont_see_in_field(
        &self,
        field: &PortableLocator,
        value: impl Into<FieldValue> + std::fmt::Debug,
    ) -> AppiumResult<()> {
        let value = value.into();
        if self.is_web() {
            return self.web().dont_see_in_field(field, &value).await;
        }
        let actual = self.field_values(field).await?;
        let expected = value.to_string();
        Truth::new(format!("field ({})", field), format!("to include \"{}\"", expected))
            .negate(actual.iter().any(|candidate| candidate.contains(&expected)))
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "see_checkbox_is_checked"))]
    pub async fn see_checkbox_is_checked(&self, field: &PortableLocator) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().see_checkbox_is_checked(field).await;
        }
        let checked = self.any_selected(field).await?;
        Truth::new(format!("checkbox ({})", field), "to be checked").assert(checked)
    }

    #[instrument(
        name = "appium.action",
        skip(self),
        fields(action = "dont_see_checkbox_is_checked")
    )]
    pub async fn dont_see_checkbox_is_checked(&self, field: &PortableLocator) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().dont_see_checkbox_is_checked(field).await;
        }
        let checked = self.any_selected(field).await?;
        Truth::new(format!("checkbox ({})", field), "to be checked").negate(checked)
    }

    pub async fn grab_text_from(&self, locator: &PortableLocator) -> AppiumResult<String> {
        if self.is_web() {
            return self.web().grab_text_from(locator).await;
        }
        let element = self.find_one(locator, None).await?;
        Ok(self.client()?.element_text(&element).await?)
    }

    pub async fn grab_text_from_all(&self, locator: &PortableLocator) -> AppiumResult<Vec<String>> {
        if self.is_web() {
            return self.web().grab_text_from_all(locator).await;
        }
        let client = self.client()?;
        let mut texts = Vec::new();
        for element in self.find_all(locator, None).await? {
            texts.push(client.element_text(&element).await?);
        }
        Ok(texts)
    }

    pub async fn grab_value_from(&self, locator: &PortableLocator) -> AppiumResult<String> {
        if self.is_web() {
            return self.web().grab_value_from(locator).await;
        }
        let element = self.find_one(locator, None).await?;
        element_value(self.client()?, &element).await
    }

    pub async fn grab_value_from_all(&self, locator: &PortableLocator) -> AppiumResult<Vec<String>> {
        if self.is_web() {
            return self.web().grab_value_from_all(locator).await;
        }
        self.field_values(locator).await
    }

    pub async fn grab_attribute_from(
        &self,
        locator: &PortableLocator,
        attribute: &str,
    ) -> AppiumResult<Option<String>> {
        if self.is_web() {
            return self.web().grab_attribute_from(locator, attribute).await;
        }
        let element = self.find_one(locator, None).await?;
        Ok(self.client()?.element_attribute(&element, attribute).await?)
    }

    pub async fn grab_attribute_from_all(
        &self,
        locator: &PortableLocator,
        attribute: &str,
    ) -> AppiumResult<Vec<Option<String>>> {
        if self.is_web() {
            return self.web().grab_attribute_from_all(locator, attribute).await;
        }
        let client = self.client()?;
        let mut values = Vec::new();
        for element in self.find_all(locator, None).await? {
            values.push(client.element_attribute(&element, attribute).await?);
        }
        Ok(values)
    }

    pub async fn grab_number_of_visible_elements(
        &self,
        locator: &PortableLocator,
    ) -> AppiumResult<usize> {
        if self.is_web() {
            return self.web().grab_number_of_visible_elements(locator).await;
        }
        let client = self.client()?;
        let mut visible = 0;
        for element in self.find_all(locator, None).await? {
            if client.element_displayed(&element).await? {
                visible += 1;
            }
        }
        Ok(visible)
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "wait_for_element"))]
    pub async fn wait_for_element(
        &self,
        locator: &PortableLocator,
        sec: Option<f64>,
    ) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().wait_for_element(locator, sec).await;
        }
        let client = self.client()?;
        let selector = &self.translate(locator)?;
        let timeout = self.wait_seconds(sec);
        let present = wait_until(seconds(timeout), move || async move {
            Ok::<_, AppiumError>(!client.find_elements(selector, None).await?.is_empty())
        })
        .await?;
        ensure_waited(
            present,
            timeout,
            format!("element ({}) still not present on page", locator),
        )
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "wait_for_visible"))]
    pub async fn wait_for_visible(
        &self,
        locator: &PortableLocator,
        sec: Option<f64>,
    ) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().wait_for_visible(locator, sec).await;
        }
        let client = self.client()?;
        let selector = &self.translate(locator)?;
        let timeout = self.wait_seconds(sec);
        let visible = wait_until(seconds(timeout), move || async move {
            let elements = client.find_elements(selector, None).await?;
            any_displayed(client, &elements).await
        })
        .await?;
        ensure_waited(
            visible,
            timeout,
            format!("element ({}) still not visible", locator),
        )
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "wait_for_invisible"))]
    pub async fn wait_for_invisible(
        &self,
        locator: &PortableLocator,
        sec: Option<f64>,
    ) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().wait_for_invisible(locator, sec).await;
        }
        let client = self.client()?;
        let selector = &self.translate(locator)?;
        let timeout = self.wait_seconds(sec);
        let hidden = wait_until(seconds(timeout), move || async move {
            let elements = client.find_elements(selector, None).await?;
            Ok::<_, AppiumError>(!any_displayed(client, &elements).await?)
        })
        .await?;
        ensure_waited(
            hidden,
            timeout,
            format!("element ({}) still visible", locator),
        )
    }

    #[instrument(name = "appium.action", skip(self), fields(action = "wait_for_text"))]
    pub async fn wait_for_text(
        &self,
        text: &str,
        sec: Option<f64>,
        context: Option<&PortableLocator>,
    ) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().wait_for_text(text, sec, context).await;
        }
        let helper = self;
        let timeout = self.wait_seconds(sec);
        let found = wait_until(seconds(timeout), move || async move {
            let texts = helper.texts_in(context).await?;
            Ok::<_, AppiumError>(texts.iter().any(|candidate| candidate.contains(text)))
        })
        .await?;
        ensure_waited(
            found,
            timeout,
            format!("text \"{}\" was not found in {}", text, text_subject(context)),
        )
    }

    /// Native contexts scroll on demand, so this only acts in web mode
    pub async fn scroll_into_view(
        &self,
        locator: &PortableLocator,
        options: Option<&Value>,
    ) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().scroll_into_view(locator, options).await;
        }
        Ok(())
    }

    pub async fn select_option(&self, select: &PortableLocator, option: &str) -> AppiumResult<()> {
        if self.is_web() {
            return self.web().select_option(select, option).await;
        }
        Err(AppiumError::WebContextOnly {
            action: "select_option",
        })
    }

    /// Screenshots are taken by the web helper in both contexts, viewport only
    pub async fn save_screenshot(&self, file_name: &str) -> AppiumResult<()> {
        self.web().save_screenshot(file_name, false).await
    }

    pub(crate) async fn find_one(
        &self,
        locator: &PortableLocator,
        context: Option<&PortableLocator>,
    ) -> AppiumResult<ElementRef> {
        let client = self.client()?;
        let selector = self.translate(locator)?;
        let root = self.context_root(context).await?;
        Ok(client.find_element(&selector, root.as_ref()).await?)
    }

    pub(crate) async fn find_all(
        &self,
        locator: &PortableLocator,
        context: Option<&PortableLocator>,
    ) -> AppiumResult<Vec<ElementRef>> {
        let client = self.client()?;
        let selector = self.translate(locator)?;
        let root = self.context_root(context).await?;
        Ok(client.find_elements(&selector, root.as_ref()).await?)
    }

    async fn context_root(
        &self,
        context: Option<&PortableLocator>,
    ) -> AppiumResult<Option<ElementRef>> {
        match context {
            Some(context) => {
                let selector = self.translate(context)?;
                Ok(Some(self.client()?.find_element(&selector, None).await?))
            }
            None => Ok(None),
        }
    }

    /// Text of every element in `context`, or of every element on screen
    async fn texts_in(&self, context: Option<&PortableLocator>) -> AppiumResult<Vec<String>> {
        let client = self.client()?;
        let selector = match context {
            Some(context) => self.translate(context)?,
            None => ResolvedSelector::Selector(self.mode().root().to_string()),
        };
        let mut texts = Vec::new();
        for element in client.find_elements(&selector, None).await? {
            texts.push(client.element_text(&element).await?);
        }
        Ok(texts)
    }

    async fn field_values(&self, field: &PortableLocator) -> AppiumResult<Vec<String>> {
        let client = self.client()?;
        let mut values = Vec::new();
        for element in self.find_all(field, None).await? {
            values.push(element_value(client, &element).await?);
        }
        Ok(values)
    }

    async fn any_selected(&self, field: &PortableLocator) -> AppiumResult<bool> {
        let client = self.client()?;
        for element in self.find_all(field, None).await? {
            if client.element_selected(&element).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub(crate) fn wait_seconds(&self, sec: Option<f64>) -> f64 {
        sec.unwrap_or_else(|| self.config().wait_for_timeout_secs())
    }
}

pub(crate) async fn any_displayed(
    client: &dyn AutomationClient,
    elements: &[ElementRef],
) -> AppiumResult<bool> {
    for element in elements {
        if client.element_displayed(element).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `value` attribute, falling back to the element text for native widgets
/// that expose none
async fn element_value(client: &dyn AutomationClient, element: &ElementRef) -> AppiumResult<String> {
    match client.element_attribute(element, "value").await? {
        Some(value) => Ok(value),
        None => Ok(client.element_text(element).await?),
    }
}

fn text_subject(context: Option<&PortableLocator>) -> String {
    match context {
        Some(context) => format!("element ({})", context),
        None => "screen".to_string(),
    }
}

fn ensure_waited(met: bool, timeout: f64, message: String) -> AppiumResult<()> {
    if met {
        Ok(())
    } else {
        Err(AppiumError::WaitTimeout {
            seconds: timeout,
            message,
        })
    }
}
