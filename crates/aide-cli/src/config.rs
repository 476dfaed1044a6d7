//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for aide
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the completion collaborator
    pub api_url: Option<String>,
    /// Base URL of the task persistence collaborator (defaults to api_url)
    pub tasks_url: Option<String>,
    /// Organization created records belong to
    pub organization_id: Option<String>,
    /// Optional project for created subtasks
    pub project_id: Option<String>,
    /// API key (alternative to the AIDE_API_KEY environment variable)
    pub api_key: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aide")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for AIDE_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("AIDE_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }
}

/// Example config shown after `--init-config`
pub fn example_config() -> &'static str {
    r#"api_url = "https://aide.example.com"
organization_id = "org-123"
# tasks_url = "https://aide.example.com"
# project_id = "proj-456"
# api_key = "..."
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://aide.example.com"));
        assert_eq!(config.organization_id.as_deref(), Some("org-123"));
        assert!(config.tasks_url.is_none());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.api_url.is_none());
        assert!(config.api_key.is_none());
    }
}
