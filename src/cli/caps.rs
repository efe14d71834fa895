use anyhow::{Context, Result};
use appium_bridge::SessionConfig;
use serde::Serialize;
use serde_json::{Map, Value};

use super::context::CliContext;

/// What a session started from the loaded configuration would look like.
#[derive(Debug, Serialize)]
pub struct CapsReport {
    pub mode: &'static str,
    pub platform: Option<String>,
    pub endpoint: String,
    pub appium_v2: bool,
    pub restart: bool,
    pub wait_for_timeout_ms: u64,
    pub capabilities: Map<String, Value>,
}

impl CapsReport {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            mode: if config.is_web { "web" } else { "native" },
            platform: config
                .platform
                .as_ref()
                .map(|platform| platform.display_name().to_string()),
            endpoint: config.address.base_url(),
            appium_v2: config.appium_v2,
            restart: config.restart,
            wait_for_timeout_ms: config.wait_for_timeout_ms,
            capabilities: config.capabilities.clone(),
        }
    }

    fn human(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Mode: {}\n", self.mode));
        out.push_str(&format!(
            "Platform: {}\n",
            self.platform.as_deref().unwrap_or("(none)")
        ));
        out.push_str(&format!("Endpoint: {}\n", self.endpoint));
        out.push_str(&format!("Appium 2: {}\n", self.appium_v2));
        out.push_str(&format!("Restart between tests: {}\n", self.restart));
        out.push_str(&format!("Wait timeout: {} ms\n", self.wait_for_timeout_ms));
        out.push_str("Capabilities:\n");
        for (name, value) in &self.capabilities {
            out.push_str(&format!("  {}: {}\n", name, value));
        }
        out
    }
}

pub fn cmd_caps(ctx: &CliContext) -> Result<()> {
    let config = SessionConfig::normalize(ctx.config().clone()).with_context(|| {
        format!(
            "Invalid Appium configuration in {}",
            ctx.config_path().display()
        )
    })?;
    let report = CapsReport::from_config(&config);
    print!("{}", ctx.output().render(&report, CapsReport::human)?);
    Ok(())
}
