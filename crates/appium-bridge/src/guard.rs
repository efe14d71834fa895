use soulbrowser_core_types::Platform;

use crate::errors::{AppiumError, AppiumResult};
use crate::state::ModeState;

/// Precondition for app-only actions.
///
/// Fails when the session has no platform at all, or when `expected` is
/// given and the session platform differs from it. The active context does
/// not matter: a hybrid app inside a web view is still an app.
pub fn require_platform(
    state: &ModeState,
    action: &'static str,
    expected: Option<Platform>,
) -> AppiumResult<()> {
    if expected.is_none() && state.platform().is_none() {
        return Err(AppiumError::UnsupportedPlatform {
            action,
            requirement: "apps".to_string(),
        });
    }
    match expected {
        Some(expected) if state.platform() != Some(&expected) => {
            Err(AppiumError::UnsupportedPlatform {
                action,
                requirement: format!("{} apps", expected.display_name()),
            })
        }
        _ => Ok(()),
    }
}
