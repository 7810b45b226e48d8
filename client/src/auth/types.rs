use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Access and refresh credentials issued together at login or registration.
///
/// Both values are opaque bearer strings. They are wiped from memory when
/// the pair is dropped.
#[derive(Clone, PartialEq, Eq, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct TokenPair {
    /// Short-lived credential attached to every request
    pub access: String,
    /// Longer-lived credential exchanged for a new access credential
    pub refresh: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Body of the token refresh request.
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Body of a successful token refresh response.
///
/// The backend rotates refresh credentials, so a new `refresh` value may be
/// returned alongside the access credential.
#[derive(Deserialize)]
pub struct RefreshResponse {
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Body of a successful login response.
///
/// Only the credentials are interpreted; everything else the server sends
/// (user profile, flags) is kept as-is in `extra`.
#[derive(Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of a successful registration response.
///
/// The new account is signed in straight away with the issued `tokens`;
/// the rest (confirmation message, user) is kept in `extra`.
#[derive(Deserialize)]
pub struct RegisterResponse {
    pub tokens: TokenPair,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
