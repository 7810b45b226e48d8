use serde_json::Value;
use thiserror::Error;

/// Message shown when nothing more specific is known about a failure.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Message shown when the session could not be recovered by a token refresh.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

/// Convenience alias used throughout the client.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors produced by the API client.
///
/// The variants follow the failure taxonomy of the backend conversation:
///
/// ## Transport Errors
/// - [`Transport`] - connection, DNS or TLS failure before a response arrived
/// - [`Timeout`] - the request exceeded the configured timeout
///
/// ## Authorization Errors
/// - [`SessionExpired`] - a 401 that a token refresh could not recover
///
/// ## Application Errors
/// - [`Api`] - a non-2xx response, usually with a structured error body
/// - [`Decode`] - a successful response whose body had an unexpected shape
///
/// ## Local Errors
/// - [`Credentials`] - the credential store could not be read or written
/// - [`Configuration`] - invalid client configuration
///
/// Use [`ApiError::user_message`] to obtain the text that should be shown
/// to a person.
///
/// [`Transport`]: ApiError::Transport
/// [`Timeout`]: ApiError::Timeout
/// [`SessionExpired`]: ApiError::SessionExpired
/// [`Api`]: ApiError::Api
/// [`Decode`]: ApiError::Decode
/// [`Credentials`]: ApiError::Credentials
/// [`Configuration`]: ApiError::Configuration
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("API request failed with status {status}: {}", .message.as_deref().unwrap_or(GENERIC_ERROR_MESSAGE))]
    Api {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    #[error("Session expired. Please login again.")]
    SessionExpired,

    #[error("Failed to decode response: {reason}")]
    Decode { reason: String },

    #[error(transparent)]
    Credentials(#[from] CredentialStoreError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Text suitable for a user-facing notice.
    ///
    /// Application errors surface the server's message verbatim. Without one,
    /// the transport-level description is used: `Request failed with status
    /// code N` for a response with no usable message, the connection failure
    /// reason or the timeout for transport errors. Anything else gets
    /// [`GENERIC_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Api { status, .. } => format!("Request failed with status code {status}"),
            ApiError::Transport { reason, .. } => reason.clone(),
            ApiError::Timeout { seconds, .. } => format!("timeout of {seconds}s exceeded"),
            ApiError::SessionExpired => SESSION_EXPIRED_MESSAGE.to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::SessionExpired => Some(401),
            _ => None,
        }
    }

    /// Whether this error ended the session.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    pub(crate) fn from_reqwest(url: &str, err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ApiError::Timeout {
                url: url.to_string(),
                seconds: timeout_secs,
            }
        } else {
            ApiError::Transport {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

/// Errors raised while exchanging a refresh credential for a new access
/// credential.
#[derive(Debug, Clone, Error)]
pub enum TokenRefreshError {
    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Refresh token rejected with status {status}: {}", .message.as_deref().unwrap_or(GENERIC_ERROR_MESSAGE))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("Network error during token refresh: {reason}")]
    Network { reason: String },

    #[error("Invalid token refresh response: {reason}")]
    InvalidResponse { reason: String },

    #[error(transparent)]
    Credentials(#[from] CredentialStoreError),
}

impl From<TokenRefreshError> for ApiError {
    fn from(_: TokenRefreshError) -> Self {
        ApiError::SessionExpired
    }
}

/// Errors raised by credential stores.
#[derive(Debug, Clone, Error)]
pub enum CredentialStoreError {
    #[error("Credential store at '{path}' is not accessible: {reason}")]
    Io { path: String, reason: String },

    #[error("Credential store at '{path}' is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Structured error envelope returned by the backend.
///
/// ```json
/// { "success": false, "error": { "code": "validation_error", "message": "..." } }
/// ```
///
/// `code` is either a string or the numeric HTTP status depending on which
/// backend handler produced the response, so it is normalised to a string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    /// Parses an error envelope leniently.
    ///
    /// Returns `None` when the body is not JSON or carries no `error` object.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).ok()?;
        let error = value.get("error")?.as_object()?;

        let code = error.get("code").and_then(|code| match code {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string);

        Some(Self { code, message })
    }

    /// Builds the [`ApiError`] for a failed response.
    ///
    /// A body without a usable message leaves `message` empty, so
    /// [`ApiError::user_message`] reports the status code instead.
    pub fn api_error(body: &[u8], status: u16) -> ApiError {
        let parsed = Self::parse(body).unwrap_or_default();
        ApiError::Api {
            status,
            code: parsed.code,
            message: parsed.message,
        }
    }
}
