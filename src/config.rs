use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(clap::ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned human readable listing
    #[default]
    Text,
    /// Rust debug representation of the record
    Debug,
    Json,
    Yaml,
}

#[derive(clap::ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputEncoding {
    /// Hex dump if the input only holds hex digits and separators, raw bytes otherwise
    #[default]
    Auto,
    Binary,
    Hex,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub encoding: InputEncoding,
    #[serde(default = "OutputConfig::default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            encoding: InputEncoding::default(),
            pretty: Self::default_pretty(),
        }
    }
}

impl OutputConfig {
    fn default_pretty() -> bool {
        true
    }

    pub const DEFAULT_CONFIG_FILE: &str = "gwbms.yaml";

    /// Reads the output settings from a YAML file. An empty file yields the defaults.
    pub fn load(config_file_path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(config_file_path)
            .with_context(|| format!("Cannot read output config '{config_file_path}'"))?;
        if text.trim().is_empty() {
            log::debug!("Output config '{config_file_path}' is empty, using defaults");
            return Ok(Self::default());
        }
        let config = serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid output config '{config_file_path}'"))?;
        log::debug!("Output config loaded from '{config_file_path}'");
        Ok(config)
    }

    /// Like [`OutputConfig::load`], but a missing default config file yields the defaults.
    pub fn load_or_default(config_file_path: &str) -> Result<Self> {
        if config_file_path == Self::DEFAULT_CONFIG_FILE && !Path::new(config_file_path).exists()
        {
            log::debug!("No config file {config_file_path:?}, using defaults");
            return Ok(Self::default());
        }
        Self::load(config_file_path)
    }

    /// Applies command line overrides.
    pub fn with_overrides(
        mut self,
        format: Option<OutputFormat>,
        encoding: Option<InputEncoding>,
        compact: bool,
    ) -> Self {
        if let Some(format) = format {
            self.format = format;
        }
        if let Some(encoding) = encoding {
            self.encoding = encoding;
        }
        if compact {
            self.pretty = false;
        }
        self
    }
}
