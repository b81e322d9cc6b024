//! Application configuration.
//!
//! Values come from an optional TOML file and are then overridden by
//! `CLOUDWORD_*` environment variables. Reddit credentials are not part of this
//! file; the Reddit client reads them from the environment on its own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_FETCH_LIMIT: u32 = 50;

pub const ENV_CONFIG_PATH: &str = "CLOUDWORD_CONFIG";
pub const ENV_DATA_DIR: &str = "CLOUDWORD_DATA_DIR";
pub const ENV_FONT_PATH: &str = "CLOUDWORD_FONT";
pub const ENV_PORT: &str = "CLOUDWORD_PORT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Holds `data_raw_*.json`, `data_terms_*.json` and `outputs/`.
    pub data_dir: PathBuf,
    /// Outline font for rendering. The built-in bitmap font is used when unset.
    pub font_path: Option<PathBuf>,
    /// Posts fetched per category by the batch job.
    pub fetch_limit: u32,
    /// Category name to the subreddits it aggregates.
    pub categories: BTreeMap<String, Vec<String>>,
    /// Words dropped on top of the built-in stopword lists.
    pub extra_stopwords: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let categories = ["politics", "cars", "gaming"]
            .into_iter()
            .map(|name| (name.to_string(), vec![name.to_string()]))
            .collect();

        Self {
            server: ServerConfig::default(),
            data_dir: PathBuf::from("."),
            font_path: None,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            categories,
            extra_stopwords: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load from `path` (if any), apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `CLOUDWORD_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(font) = lookup(ENV_FONT_PATH) {
            self.font_path = Some(PathBuf::from(font));
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: "0".to_string(),
            });
        }
        if self.fetch_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch_limit".to_string(),
                value: "0".to_string(),
            });
        }
        if self.categories.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "at least one category is required".to_string(),
            });
        }
        for (name, subs) in &self.categories {
            if subs.is_empty() {
                return Err(ConfigError::ValidationFailed {
                    reason: format!("category '{}' has no subreddits", name),
                });
            }
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidValue {
                    field: "categories".to_string(),
                    value: name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn subreddits_for(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.categories.keys().map(String::as_str)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_categories() {
        let config = AppConfig::default();
        let names: Vec<&str> = config.category_names().collect();
        assert_eq!(names, vec!["cars", "gaming", "politics"]);
        assert_eq!(
            config.subreddits_for("cars"),
            Some(&["cars".to_string()][..])
        );
        assert!(config.subreddits_for("cooking").is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = AppConfig::from_toml(
            r#"
            data_dir = "/var/lib/cloudword"
            fetch_limit = 80
            extra_stopwords = ["upvote", "mods"]

            [server]
            port = 8080

            [categories]
            tech = ["rust", "programming"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/cloudword"));
        assert_eq!(config.fetch_limit, 80);
        assert_eq!(config.extra_stopwords, vec!["upvote", "mods"]);
        assert_eq!(config.subreddits_for("tech").unwrap().len(), 2);
        assert!(config.subreddits_for("politics").is_none());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DATA_DIR, "/tmp/cloud"),
            (ENV_FONT_PATH, "/fonts/DejaVuSans.ttf"),
            (ENV_PORT, "9000"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cloud"));
        assert_eq!(
            config.font_path,
            Some(PathBuf::from("/fonts/DejaVuSans.ttf"))
        );
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_port_override() {
        let result = AppConfig::default().with_overrides(|key| {
            (key == ENV_PORT).then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validation_rejects_empty_category() {
        let mut config = AppConfig::default();
        config.categories.insert("empty".to_string(), Vec::new());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }
}
