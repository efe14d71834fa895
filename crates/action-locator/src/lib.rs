//! Portable locator translation
//!
//! Turns a locator written once for a test suite into the selector the
//! automation client understands for the active context:
//! - accessibility id (`~name`) and XPath (`//...`) pass through untouched
//! - `#id` shorthand is rewritten for native contexts
//! - bare text on Android becomes a `UiSelector` text query
//! - structured locators pick the `web` / `android` / `ios` alternative
//! - CSS and name strategies are rejected outside of web contexts

pub mod errors;
pub mod resolver;
pub mod strategies;
pub mod types;

pub use errors::*;
pub use resolver::*;
pub use strategies::*;
pub use types::*;
