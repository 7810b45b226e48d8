use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims read from an access credential's JWT payload.
///
/// The signature is not verified; these values are only used to show the
/// user what the server issued. Credential handling never depends on them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    pub exp: Option<i64>,
    pub user_id: Option<serde_json::Value>,
    pub token_type: Option<String>,
}

impl TokenClaims {
    /// Decodes the payload segment of a JWT. Returns `None` for anything
    /// that is not a three-part base64url token with a JSON payload.
    pub fn peek(token: &str) -> Option<Self> {
        let mut parts = token.split('.');
        let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&decoded).ok()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires| expires <= now)
    }
}
