use super::limits::{MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS, VALID_LOG_LEVELS};
use super::validation::ConfigValidationError;
use client::ClientConfig;
use client::http::config::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    api: ApiConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    credentials: CredentialsConfig,
}

impl AppConfig {
    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    pub fn credentials(&self) -> &CredentialsConfig {
        &self.credentials
    }

    /// Overrides the backend URL, e.g. from a command-line flag.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = Some(base_url.into());
        self
    }

    /// Copy with every defaulted setting filled in, as the client will use it.
    /// Only `logging.file` stays unset when not configured.
    pub fn resolved(&self) -> Self {
        Self {
            api: ApiConfig {
                base_url: Some(self.api.base_url()),
                timeout_secs: Some(self.api.timeout_secs()),
            },
            logging: LoggingConfig {
                level: Some(self.logging.level().to_string()),
                file: self.logging.file.clone(),
            },
            credentials: CredentialsConfig {
                path: Some(self.credentials.path()),
            },
        }
    }

    /// Builds the HTTP client configuration for the backend.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api.base_url()).with_timeout(self.api.timeout())
    }

    /// Validate the configuration against defined limits
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        let base_url = self.api.base_url();
        match reqwest::Url::parse(&base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ConfigValidationError::BaseUrl {
                configured: base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => errors.push(ConfigValidationError::BaseUrl {
                configured: base_url.clone(),
                reason: e.to_string(),
            }),
        }

        let timeout_secs = self.api.timeout_secs();
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
            errors.push(ConfigValidationError::Timeout {
                configured: timeout_secs,
                min_limit: MIN_TIMEOUT_SECS,
                max_limit: MAX_TIMEOUT_SECS,
            });
        }

        let level = self.logging.level().to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::LogLevel {
                configured: self.logging.level().to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl ApiConfig {
    /// Configured backend URL, then `GSTONGO_API_URL`, then the local default.
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| ClientConfig::from_env().base_url)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT.as_secs())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    level: Option<String>,
    file: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("warn")
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialsConfig {
    path: Option<PathBuf>,
}

impl CredentialsConfig {
    /// Where the credential pair is persisted between runs.
    pub fn path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_credentials_path)
    }
}

fn default_credentials_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gstongo")
        .join("credentials.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(toml_text: &str) -> AppConfig {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = config_from("[api]\nbase_url = \"http://localhost:8000/api/v1\"\n");
        assert!(config.validate().is_ok());
        assert_eq!(config.api().timeout(), Duration::from_secs(30));
        assert_eq!(config.logging().level(), "warn");
        assert!(config.credentials().path().ends_with("gstongo/credentials.json"));
    }

    #[test]
    fn test_collects_every_violation() {
        let config = config_from(
            r#"
            [api]
            base_url = "ftp://files.example.com"
            timeout_secs = 0

            [logging]
            level = "loud"
            "#,
        );

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ConfigValidationError::BaseUrl { .. }));
        assert!(matches!(
            errors[1],
            ConfigValidationError::Timeout { configured: 0, .. }
        ));
        assert!(matches!(errors[2], ConfigValidationError::LogLevel { .. }));
    }

    #[test]
    fn test_unparseable_base_url() {
        let config = AppConfig::default().with_base_url("not a url");
        let errors = config.validate().unwrap_err();
        assert!(matches!(errors[0], ConfigValidationError::BaseUrl { .. }));
    }

    #[test]
    fn test_client_config_carries_url_and_timeout() {
        let config = config_from(
            "[api]\nbase_url = \"https://api.gstongo.com/api/v1\"\ntimeout_secs = 5\n",
        );
        let client_config = config.client_config();
        assert_eq!(client_config.base_url, "https://api.gstongo.com/api/v1");
        assert_eq!(client_config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_resolved_config_prints_defaults() {
        let config = config_from("[credentials]\npath = \"/tmp/gstongo/credentials.json\"\n");

        let printed = toml::to_string_pretty(&config.resolved()).unwrap();
        let reparsed: toml::Value = toml::from_str(&printed).unwrap();

        assert!(reparsed["api"]["base_url"].as_str().is_some());
        assert_eq!(reparsed["api"]["timeout_secs"].as_integer(), Some(30));
        assert_eq!(reparsed["logging"]["level"].as_str(), Some("warn"));
        assert!(reparsed["logging"].get("file").is_none());
        assert_eq!(
            reparsed["credentials"]["path"].as_str(),
            Some("/tmp/gstongo/credentials.json")
        );
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let config = config_from(
            "[api]\nbase_url = \"http://localhost:8000\"\n[logging]\nlevel = \"DEBUG\"\n",
        );
        assert!(config.validate().is_ok());
    }
}
