use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "trellis.config.json";

/// Trellis configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Spaces per nesting level in generated markup
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// File extension of layout files, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_indent_width() -> usize {
    2
}

fn default_extension() -> String {
    "tui".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), ?config, "loaded config");
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Indent string for the serializer
    pub fn indent(&self) -> String {
        " ".repeat(self.indent_width)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
            extension: default_extension(),
        }
    }
}
