use crate::error::{AppError, AppResult};
use config::{Config, Environment, File};
use std::path::Path;

pub mod app;
pub mod limits;
pub mod validation;

pub use app::{ApiConfig, AppConfig, CredentialsConfig, LoggingConfig};
pub use validation::{ConfigLoadResult, ConfigValidationError};

/// Prefix for environment overrides, e.g. `GSTONGO_API__BASE_URL`.
pub const ENV_PREFIX: &str = "GSTONGO";

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Loads configuration from `.env`, the configuration file and the
/// environment, in increasing order of precedence.
///
/// An explicitly given file must exist; the default `config.toml` is
/// optional.
pub fn load_config(path: Option<&Path>) -> ConfigLoadResult {
    dotenv::dotenv().ok();

    let file_source = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };
    let env_source = Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__");

    let config = match Config::builder()
        .add_source(file_source)
        .add_source(env_source)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            return ConfigLoadResult::LoadError(format!(
                "Configuration loading failed: {e}. Please check your config.toml file and environment variables."
            ));
        }
    };

    match config.try_deserialize::<AppConfig>() {
        Ok(app_config) => ConfigLoadResult::Success(Box::new(app_config)),
        Err(e) => ConfigLoadResult::DeserializeError(format!("Failed to deserialize config: {e}")),
    }
}

/// Loads and validates configuration, folding every failure into
/// [`AppError::Config`] with a message fit for the terminal.
pub fn load_validated(path: Option<&Path>, base_url: Option<&str>) -> AppResult<AppConfig> {
    let mut config = match load_config(path) {
        ConfigLoadResult::Success(config) => *config,
        ConfigLoadResult::LoadError(e) | ConfigLoadResult::DeserializeError(e) => {
            return Err(AppError::Config(e));
        }
    };

    if let Some(url) = base_url {
        config = config.with_base_url(url);
    }

    if let Err(errors) = config.validate() {
        let message = errors
            .iter()
            .map(ConfigValidationError::user_message)
            .collect::<Vec<_>>()
            .join("\n\n");
        return Err(AppError::Config(message));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_explicit_file() {
        let file = write_config(
            r#"
            [api]
            base_url = "https://api.gstongo.com/api/v1"
            timeout_secs = 12

            [logging]
            level = "debug"
            file = "gstongo.log"

            [credentials]
            path = "/tmp/gstongo-test/credentials.json"
            "#,
        );

        let config = assert_ok!(load_validated(Some(file.path()), None));
        assert_eq!(config.api().base_url(), "https://api.gstongo.com/api/v1");
        assert_eq!(config.api().timeout_secs(), 12);
        assert_eq!(config.logging().level(), "debug");
        assert_eq!(config.logging().file(), Some("gstongo.log"));
        assert_eq!(
            config.credentials().path(),
            Path::new("/tmp/gstongo-test/credentials.json")
        );
    }

    #[test]
    fn test_missing_explicit_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        assert!(matches!(
            load_config(Some(&missing)),
            ConfigLoadResult::LoadError(_)
        ));
    }

    #[test]
    fn test_flag_overrides_file_base_url() {
        let file = write_config("[api]\nbase_url = \"https://api.gstongo.com/api/v1\"\n");

        let config = assert_ok!(load_validated(
            Some(file.path()),
            Some("http://127.0.0.1:9000/api/v1")
        ));
        assert_eq!(config.api().base_url(), "http://127.0.0.1:9000/api/v1");
    }

    #[test]
    fn test_invalid_values_are_reported_together() {
        let file = write_config(
            "[api]\nbase_url = \"https://api.gstongo.com\"\ntimeout_secs = 1000\n[logging]\nlevel = \"chatty\"\n",
        );

        let err = assert_err!(load_validated(Some(file.path()), None));
        let AppError::Config(message) = err else {
            panic!("expected a configuration error, got {err:?}");
        };
        assert!(message.contains("api.timeout_secs"));
        assert!(message.contains("logging.level"));
    }

    #[test]
    fn test_wrong_types_are_a_deserialize_error() {
        let file = write_config("[api]\ntimeout_secs = \"soon\"\n");

        assert!(matches!(
            load_config(Some(file.path())),
            ConfigLoadResult::DeserializeError(_)
        ));
    }
}
