use std::time::Duration;

use anyhow::{Context, Result};
use appium_bridge::{ReqwestTransport, RestRequest, RestTransport};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct StatusArgs {
    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub endpoint: String,
    pub ready: bool,
    pub build: Option<String>,
    pub status: Value,
}

impl StatusReport {
    pub fn from_value(endpoint: String, status: Value) -> Self {
        let ready = status.get("ready").and_then(Value::as_bool).unwrap_or(true);
        let build = status
            .pointer("/build/version")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            endpoint,
            ready,
            build,
            status,
        }
    }

    fn human(&self) -> String {
        format!(
            "Appium server at {}\n- Ready: {}\n- Version: {}\n",
            self.endpoint,
            self.ready,
            self.build.as_deref().unwrap_or("unknown")
        )
    }
}

pub async fn cmd_status(args: StatusArgs, ctx: &CliContext) -> Result<()> {
    let config = ctx.config();
    let address = config.server_address();
    let url = address.status_url()?;
    let transport = ReqwestTransport::new(Duration::from_secs(args.timeout))?
        .with_credentials(config.user.clone(), config.key.clone());

    info!(url = %url, "querying appium status");
    let status = transport
        .send(RestRequest::get(url))
        .await
        .with_context(|| format!("Appium server at {} did not answer", address.base_url()))?;

    let report = StatusReport::from_value(address.base_url(), status);
    print!("{}", ctx.output().render(&report, StatusReport::human)?);
    Ok(())
}
