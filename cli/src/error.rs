use client::ApiError;
use crate::services::password::PasswordError;
use client::common::CredentialStoreError;
use thiserror::Error;

/// Errors surfaced by the `gstongo` command-line front end.
#[derive(Debug, Error)]
pub enum AppError {
    /// A backend request failed, including session expiry.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted credentials could not be read or written.
    #[error(transparent)]
    Credentials(#[from] CredentialStoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger setup failed: {0}")]
    Logger(#[from] log::SetLoggerError),

    /// The response could not be rendered for the terminal.
    #[error("Output error: {0}")]
    Output(String),
}

pub type AppResult<T> = Result<T, AppError>;
