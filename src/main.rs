use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use soulbrowser_appium::cli::{
    cmd_caps, cmd_locate, cmd_status, CliContext, LocateArgs, OutputFormat, StatusArgs,
};
use soulbrowser_appium::config::{load_config, ConnectionOverrides};
use soulbrowser_appium::telemetry::init_logging;

#[derive(Parser)]
#[command(name = "soulappium")]
#[command(about = "Inspect and exercise Appium helper configurations")]
#[command(version)]
struct Cli {
    /// Configuration file path (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable debug mode
    #[arg(short, long)]
    debug: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    output: OutputFormat,

    /// Appium server host, overrides the configuration file
    #[arg(long)]
    host: Option<String>,

    /// Appium server port, overrides the configuration file
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the mode, platform and capabilities a session would start with
    Caps,
    /// Translate a locator for a platform and context
    Locate(LocateArgs),
    /// Query the Appium server status endpoint
    Status(StatusArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.debug)?;
    info!("Starting soulappium v{}", env!("CARGO_PKG_VERSION"));

    let overrides = ConnectionOverrides {
        host: cli.host.clone(),
        port: cli.port,
    };
    let (config, config_path) = load_config(cli.config.as_deref(), &overrides).await?;
    let ctx = CliContext::new(config, config_path, cli.output);

    match cli.command {
        Commands::Caps => cmd_caps(&ctx),
        Commands::Locate(args) => cmd_locate(args, &ctx),
        Commands::Status(args) => cmd_status(args, &ctx).await,
    }
}
