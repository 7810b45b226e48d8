use super::app::AppConfig;

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid api.base_url: {configured} ({reason})")]
    BaseUrl { configured: String, reason: String },
    #[error("Invalid api.timeout_secs: {configured} (min: {min_limit}, max: {max_limit})")]
    Timeout {
        configured: u64,
        min_limit: u64,
        max_limit: u64,
    },
    #[error("Invalid logging.level: {configured}")]
    LogLevel { configured: String },
}

impl ConfigValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigValidationError::BaseUrl { configured, reason } => {
                format!(
                    "Backend URL is not usable!\n\
                    Your configured value: {configured}\n\
                    Problem: {reason}\n\
                    Please set api.base_url in config.toml (or GSTONGO_API__BASE_URL) to an http(s) URL."
                )
            }
            ConfigValidationError::Timeout {
                configured,
                min_limit,
                max_limit,
            } => {
                format!(
                    "Request timeout out of range!\n\
                    Your configured value: {configured} seconds\n\
                    Valid range: {min_limit} - {max_limit} seconds\n\
                    Please update api.timeout_secs in config.toml."
                )
            }
            ConfigValidationError::LogLevel { configured } => {
                format!(
                    "Unknown log level '{configured}'!\n\
                    Use one of: off, error, warn, info, debug, trace.\n\
                    Please update logging.level in config.toml."
                )
            }
        }
    }
}

/// Configuration loading result
#[derive(Debug, Clone)]
pub enum ConfigLoadResult {
    Success(Box<AppConfig>),
    LoadError(String),
    DeserializeError(String),
}
