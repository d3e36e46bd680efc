//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for gloss
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL
    pub backend: Option<String>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
    /// Retry behavior for backend requests
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Retry settings for backend requests.
///
/// Loaded and validated but not currently consulted by the coordinator, which
/// surfaces the first failure as a terminal error instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Config {
    /// Default backend when neither config nor CLI provide one.
    pub const DEFAULT_BACKEND: &'static str = "http://localhost:8000";

    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gloss")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("GLOSS_CONFIG_PATH") {
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

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            backend: Some(Self::DEFAULT_BACKEND.to_string()),
            tui: Some(true),
            retry: RetrySettings::default(),
        };

        default_config.save()?;
        Ok(path)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# gloss configuration file
# Place at ~/.config/gloss/config.toml (Linux/Mac) or %APPDATA%\gloss\config.toml (Windows)

# Backend base URL
backend = "http://localhost:8000"

# Whether to use TUI mode by default (true by default)
# Set to false for plain stdout streaming
tui = true

# Retry behavior for backend requests
[retry]
max_retries = 3
retry_delay_ms = 1000
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.backend.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.tui, Some(true));
        assert_eq!(config.retry.max_retries, 3);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.backend.is_none());
        assert_eq!(config.retry.retry_delay_ms, 1000);
    }
}
