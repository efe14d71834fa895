use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Render `value` in the selected format; `human` renders the plain text form
    pub fn render<T: Serialize>(&self, value: &T, human: impl FnOnce(&T) -> String) -> Result<String> {
        Ok(match self {
            OutputFormat::Human => human(value),
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
        })
    }
}
