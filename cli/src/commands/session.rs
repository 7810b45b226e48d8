use super::{Context, Output};
use crate::error::{AppError, AppResult};
use crate::services::password::{self, SecurePassword};
use crate::services::terminal_listener::LOGIN_HINT;
use chrono::{DateTime, Utc};
use client::SessionState;
use client::auth::TokenClaims;
use serde_json::json;
use std::fmt::Write;

pub async fn login(ctx: &Context, email: &str, password: &SecurePassword) -> AppResult<Output> {
    let payload = ctx.api().auth().login(email, password.as_str()).await?;
    Ok(Output::Json(json!({
        "message": format!("Signed in as {email}"),
        "account": payload,
    })))
}

pub async fn logout(ctx: &Context) -> AppResult<Output> {
    ctx.api().auth().logout().await?;
    Ok(Output::Text("Signed out.".to_string()))
}

/// Describes the stored session as of `now`.
pub async fn status(ctx: &Context, now: DateTime<Utc>) -> AppResult<Output> {
    let session = ctx.api().client().session();
    let credentials = ctx.config().credentials().path();

    let access = match session.state().await {
        SessionState::SignedIn => session.access_token().await?,
        _ => None,
    };
    let Some(access) = access else {
        return Ok(Output::Text(format!(
            "Not signed in. Run `{LOGIN_HINT}` to sign in."
        )));
    };

    let mut text = format!(
        "Signed in\n  backend: {}\n  credentials: {}",
        ctx.config().api().base_url(),
        credentials.display()
    );

    // Formatting into a String cannot fail
    match TokenClaims::peek(&access) {
        Some(claims) => {
            if let Some(user_id) = &claims.user_id {
                let _ = write!(text, "\n  user: {user_id}");
            }
            if let Some(expires) = claims.expires_at() {
                let note = if claims.is_expired_at(now) {
                    " (expired, refreshed on next request)"
                } else {
                    ""
                };
                let _ = write!(
                    text,
                    "\n  access token expires: {}{note}",
                    expires.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
        }
        None => text.push_str("\n  access token: not a JWT"),
    }

    Ok(Output::Text(text))
}

/// Asks for the password on the terminal without echoing it.
pub async fn prompt_password() -> AppResult<SecurePassword> {
    let password = tokio::task::spawn_blocking(password::prompt_password)
        .await
        .map_err(|e| AppError::Io(std::io::Error::other(e)))??;
    Ok(password)
}
