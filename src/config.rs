//! Helper configuration loading
//!
//! Reads an [`AppiumConfig`] from YAML or JSON and applies command line
//! overrides before it is normalized by the bridge.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use appium_bridge::AppiumConfig;
use tokio::fs;
use tracing::{info, warn};

pub const CONFIG_DIR: &str = "soulbrowser";
pub const CONFIG_FILE: &str = "appium.yaml";

/// Connection settings given on the command line; they win over the file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ConnectionOverrides {
    pub fn apply(&self, config: &mut AppiumConfig) {
        if let Some(host) = &self.host {
            config.host = Some(host.clone());
            config.hostname = None;
        }
        if let Some(port) = self.port {
            config.port = Some(port);
        }
    }
}

/// `<config_dir>/soulbrowser/appium.yaml`
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    Ok(path)
}

/// Parse by extension: `.json` as JSON, anything else as YAML
pub fn parse_config(path: &Path, content: &str) -> Result<AppiumConfig> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        serde_json::from_str(content)
            .with_context(|| format!("Failed to parse JSON config {}", path.display()))
    } else {
        serde_yaml::from_str(content)
            .with_context(|| format!("Failed to parse YAML config {}", path.display()))
    }
}

/// Load the helper configuration; a missing default file yields an empty
/// configuration, a missing explicit file is an error.
pub async fn load_config(
    config_path: Option<&Path>,
    overrides: &ConnectionOverrides,
) -> Result<(AppiumConfig, PathBuf)> {
    let (path, explicit) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (default_config_path()?, false),
    };

    let mut config = if path.exists() {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = parse_config(&path, &content)?;
        info!("Loaded configuration from: {}", path.display());
        config
    } else if explicit {
        anyhow::bail!("Config file not found: {}", path.display());
    } else {
        warn!("Config file not found, using defaults: {}", path.display());
        AppiumConfig::default()
    };

    overrides.apply(&mut config);
    Ok((config, path))
}
