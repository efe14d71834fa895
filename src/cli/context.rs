use std::path::{Path, PathBuf};

use appium_bridge::AppiumConfig;

use super::output::OutputFormat;

/// Everything a subcommand needs from the global flags.
pub struct CliContext {
    config: AppiumConfig,
    config_path: PathBuf,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(config: AppiumConfig, config_path: PathBuf, output: OutputFormat) -> Self {
        Self {
            config,
            config_path,
            output,
        }
    }

    pub fn config(&self) -> &AppiumConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }
}
