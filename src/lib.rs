//! SoulBrowser Appium tooling
//!
//! Command line front end over the `appium-bridge` crate: configuration
//! loading, capability inspection, locator translation and server checks.

pub mod cli;
pub mod config;
pub mod telemetry;

pub use config::{load_config, ConnectionOverrides};
