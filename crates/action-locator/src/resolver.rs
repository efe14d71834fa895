//! Locator translation rules
//!
//! Rules are tried in order and the first match wins. Accessibility id and
//! XPath pass-through run before generic parsing, whose heuristics would
//! otherwise misclassify them.

use once_cell::sync::Lazy;
use regex::Regex;
use soulbrowser_core_types::Platform;
use tracing::debug;

use crate::errors::LocatorError;
use crate::strategies::ParsedLocator;
use crate::types::{
    AndroidAlternative, LocatorScope, LocatorStrategy, PortableLocator, ResolvedSelector,
    StructuredLocator,
};

static ANDROID_NATIVE_SELECTOR: Lazy<Regex> = Lazy::new(|| {
    // `android=...`, `-android uiautomator:...` and bare `android.widget.*` class names
    Regex::new(r"^-?android=?").expect("static regex")
});

const CSS_IN_APP_HINT: &str = "Unable to use css locators in apps. Locator strategies for this request: xpath, id, class name or accessibility id";
const NAME_IN_APP_HINT: &str =
    "Can't locate element by name in Native context. Use either ID, class name or accessibility id";

/// Translate an optional locator; absent stays absent.
pub fn translate(
    locator: Option<&PortableLocator>,
    scope: &LocatorScope,
) -> Result<Option<ResolvedSelector>, LocatorError> {
    match locator {
        Some(locator) => LocatorTranslator::new(scope).resolve(locator).map(Some),
        None => Ok(None),
    }
}

/// Pure mapping from a portable locator to a resolved selector.
#[derive(Debug, Clone, Copy)]
pub struct LocatorTranslator<'a> {
    scope: &'a LocatorScope,
}

impl<'a> LocatorTranslator<'a> {
    pub fn new(scope: &'a LocatorScope) -> Self {
        Self { scope }
    }

    /// Resolve a locator for the scope this translator was built with
    pub fn resolve(&self, locator: &PortableLocator) -> Result<ResolvedSelector, LocatorError> {
        let resolved = match locator {
            PortableLocator::Native(matcher) => Ok(ResolvedSelector::Matcher(matcher.clone())),
            PortableLocator::Structured(structured) => self.resolve_structured(structured),
            PortableLocator::Raw(raw) => self.resolve_raw(raw),
        }?;
        debug!(
            locator = %locator,
            resolved = %resolved,
            web = self.scope.web,
            platform = ?self.scope.platform,
            "locator translated"
        );
        Ok(resolved)
    }

    fn resolve_structured(
        &self,
        locator: &StructuredLocator,
    ) -> Result<ResolvedSelector, LocatorError> {
        if self.scope.web {
            if let Some(web) = &locator.web {
                return self.resolve(web);
            }
        }

        match &self.scope.platform {
            Some(Platform::Android) => match &locator.android {
                Some(AndroidAlternative::Selector(selector)) => return self.resolve_raw(selector),
                Some(AndroidAlternative::Matcher(matcher)) => {
                    return Ok(ResolvedSelector::Matcher(matcher.clone()))
                }
                None => {}
            },
            Some(Platform::Ios) => {
                if let Some(ios) = &locator.ios {
                    return self.resolve(ios);
                }
            }
            _ => {}
        }

        let parsed = ParsedLocator::from_structured(locator).ok_or_else(|| {
            LocatorError::NoMatchingAlternative(PortableLocator::from(locator.clone()).to_string())
        })?;
        self.finish(parsed)
    }

    fn resolve_raw(&self, raw: &str) -> Result<ResolvedSelector, LocatorError> {
        if raw.is_empty() {
            return Err(LocatorError::InvalidLocator("empty locator".into()));
        }
        if raw.starts_with('~') || raw.starts_with("//") {
            return Ok(ResolvedSelector::Selector(raw.to_string()));
        }
        if !self.scope.web {
            if let Some(id) = raw.strip_prefix('#') {
                return self.resolve_structured(&StructuredLocator::id(id));
            }
            if self.scope.is_platform(&Platform::Android) {
                if ANDROID_NATIVE_SELECTOR.is_match(raw) {
                    return Ok(ResolvedSelector::Selector(raw.to_string()));
                }
                return Ok(ResolvedSelector::Selector(ui_selector_text(raw)));
            }
        }
        self.finish(ParsedLocator::detect(raw, LocatorStrategy::XPath))
    }

    fn finish(&self, parsed: ParsedLocator) -> Result<ResolvedSelector, LocatorError> {
        if !self.scope.web {
            match parsed.strategy {
                LocatorStrategy::Css => return Err(unsupported(&parsed, CSS_IN_APP_HINT)),
                LocatorStrategy::Name => return Err(unsupported(&parsed, NAME_IN_APP_HINT)),
                LocatorStrategy::Id if self.scope.is_platform(&Platform::Android) => {
                    return Ok(ResolvedSelector::Selector(format!(
                        "//*[@resource-id='{}']",
                        parsed.value
                    )));
                }
                _ => {}
            }
        }
        Ok(ResolvedSelector::Selector(parsed.simplify()))
    }
}

fn unsupported(parsed: &ParsedLocator, hint: &str) -> LocatorError {
    LocatorError::UnsupportedStrategy {
        strategy: parsed.strategy.name().to_string(),
        locator: parsed.value.clone(),
        hint: hint.to_string(),
    }
}

/// UiAutomator query for an element with exactly this visible text
fn ui_selector_text(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("android=new UiSelector().text(\"{}\")", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn android_native() -> LocatorScope {
        LocatorScope::native(Platform::Android)
    }

    fn resolve(locator: impl Into<PortableLocator>, scope: &LocatorScope) -> ResolvedSelector {
        LocatorTranslator::new(scope)
            .resolve(&locator.into())
            .unwrap()
    }

    #[test]
    fn hash_id_becomes_resource_id_xpath_on_android() {
        assert_eq!(
            resolve("#submit", &android_native()),
            ResolvedSelector::Selector("//*[@resource-id='submit']".into())
        );
    }

    #[test]
    fn hash_id_stays_css_in_web_mode() {
        let scope = LocatorScope::web(Some(Platform::Android));
        assert_eq!(
            resolve("#submit", &scope),
            ResolvedSelector::Selector("#submit".into())
        );
    }

    #[test]
    fn bare_text_on_android_becomes_ui_selector() {
        assert_eq!(
            resolve("Log in", &android_native()),
            ResolvedSelector::Selector(r#"android=new UiSelector().text("Log in")"#.into())
        );
        assert_eq!(
            resolve(r#"Say "hi""#, &android_native()),
            ResolvedSelector::Selector(r#"android=new UiSelector().text("Say \"hi\"")"#.into())
        );
    }

    #[test]
    fn android_native_selectors_pass_through() {
        for raw in [
            "android=new UiSelector().className(\"Button\")",
            "-android uiautomator:new UiSelector().text(\"Ok\")",
            "android.widget.Button",
        ] {
            assert_eq!(
                resolve(raw, &android_native()),
                ResolvedSelector::Selector(raw.into())
            );
        }
    }

    #[test]
    fn android_matcher_passes_through_unchanged() {
        let matcher = json!({ "name": "withText", "args": ["Login"] });
        let locator = StructuredLocator::default().with_android_matcher(matcher.clone());
        assert_eq!(
            resolve(locator, &android_native()),
            ResolvedSelector::Matcher(matcher)
        );
    }

    #[test]
    fn css_is_rejected_on_ios_native() {
        let scope = LocatorScope::native(Platform::Ios);
        let err = LocatorTranslator::new(&scope)
            .resolve(&PortableLocator::raw(".button"))
            .unwrap_err();
        assert_eq!(err.code(), "unsupported_locator_strategy");
        assert!(err.to_string().contains("Unable to use css locators in apps"));
    }

    #[test]
    fn name_strategy_is_rejected_in_native_context() {
        let scope = LocatorScope::native(Platform::Android);
        let locator = StructuredLocator::by(LocatorStrategy::Name, "email");
        let err = LocatorTranslator::new(&scope)
            .resolve(&locator.into())
            .unwrap_err();
        assert!(matches!(
            err,
            LocatorError::UnsupportedStrategy { ref strategy, .. } if strategy == "name"
        ));
    }

    #[test]
    fn ios_id_falls_through_to_generic_simplification() {
        let scope = LocatorScope::native(Platform::Ios);
        assert_eq!(
            resolve("#submit", &scope),
            ResolvedSelector::Selector("#submit".into())
        );
    }

    #[test]
    fn structured_without_match_or_fallback_fails() {
        let scope = LocatorScope::native(Platform::Ios);
        let locator = StructuredLocator::default().with_web("#submit");
        let err = LocatorTranslator::new(&scope)
            .resolve(&locator.into())
            .unwrap_err();
        assert!(matches!(err, LocatorError::NoMatchingAlternative(_)));
    }

    #[test]
    fn absent_locator_stays_absent() {
        assert_eq!(translate(None, &android_native()).unwrap(), None);
    }

    #[test]
    fn empty_locator_is_invalid() {
        let err = LocatorTranslator::new(&android_native())
            .resolve(&PortableLocator::raw(""))
            .unwrap_err();
        assert!(matches!(err, LocatorError::InvalidLocator(_)));
    }
}
