use super::credentials::{CredentialKey, CredentialStore};
use super::types::TokenPair;
use crate::common::CredentialStoreError;
use crate::common::errors::SESSION_EXPIRED_MESSAGE;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Path of the login view the host should navigate to when a session ends.
pub const LOGIN_PATH: &str = "/login";

/// Lifecycle state of the signed-in session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No credentials are held
    #[default]
    SignedOut,
    /// Credentials are held and attached to requests
    SignedIn,
    /// Credentials were discarded because a refresh could not recover them
    Expired {
        /// Why the session ended
        reason: String,
    },
}

/// Notice delivered to the host when the session expires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionNotice {
    /// Text to show the user
    pub message: String,
    /// Where the host should send the user to sign in again
    pub login_path: String,
}

impl SessionNotice {
    pub fn expired(login_path: impl Into<String>) -> Self {
        Self {
            message: SESSION_EXPIRED_MESSAGE.to_string(),
            login_path: login_path.into(),
        }
    }
}

/// Host hooks for user-visible session events.
///
/// A browser shell would navigate to the login view and show a toast; a
/// terminal host prints a hint instead.
pub trait SessionListener: Send + Sync {
    /// The session ended irrecoverably. The host should return the user to
    /// the login view and show `notice.message`.
    fn on_session_expired(&self, notice: &SessionNotice);

    /// A request failed with a user-visible message.
    fn on_error(&self, message: &str);
}

/// Listener that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl SessionListener for LoggingListener {
    fn on_session_expired(&self, notice: &SessionNotice) {
        log::warn!("{} (login at {})", notice.message, notice.login_path);
    }

    fn on_error(&self, message: &str) {
        log::error!("{message}");
    }
}

/// Owns the credential lifecycle.
///
/// Credentials are created on login, updated on refresh, and deleted on
/// logout or on an irrecoverable refresh failure. The manager is shared by
/// every request issued through the client.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    listener: Arc<dyn SessionListener>,
    state: RwLock<SessionState>,
    login_path: String,
}

impl SessionManager {
    pub fn new(store: Arc<dyn CredentialStore>, listener: Arc<dyn SessionListener>) -> Self {
        Self {
            store,
            listener,
            state: RwLock::new(SessionState::SignedOut),
            login_path: LOGIN_PATH.to_string(),
        }
    }

    /// Overrides the login path carried by session-expired notices.
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Derives the state from credentials already present in the store,
    /// e.g. ones persisted by a previous run.
    pub async fn restore(&self) -> Result<SessionState, CredentialStoreError> {
        let state = if self.access_token().await?.is_some() {
            SessionState::SignedIn
        } else {
            SessionState::SignedOut
        };
        *self.state.write().await = state.clone();
        Ok(state)
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub fn listener(&self) -> &Arc<dyn SessionListener> {
        &self.listener
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub async fn access_token(&self) -> Result<Option<String>, CredentialStoreError> {
        self.store.get(CredentialKey::AccessToken).await
    }

    pub async fn refresh_token(&self) -> Result<Option<String>, CredentialStoreError> {
        self.store.get(CredentialKey::RefreshToken).await
    }

    /// Stores a freshly issued credential pair.
    pub async fn begin(&self, pair: &TokenPair) -> Result<(), CredentialStoreError> {
        self.store
            .set(CredentialKey::AccessToken, pair.access.clone())
            .await?;
        self.store
            .set(CredentialKey::RefreshToken, pair.refresh.clone())
            .await?;
        *self.state.write().await = SessionState::SignedIn;
        log::info!("Session started");
        Ok(())
    }

    /// Stores the result of a successful refresh.
    ///
    /// `rotated_refresh` replaces the refresh credential when the server
    /// issued a new one.
    pub async fn update_access(
        &self,
        access: String,
        rotated_refresh: Option<String>,
    ) -> Result<(), CredentialStoreError> {
        self.store.set(CredentialKey::AccessToken, access).await?;
        if let Some(refresh) = rotated_refresh {
            self.store.set(CredentialKey::RefreshToken, refresh).await?;
        }
        *self.state.write().await = SessionState::SignedIn;
        log::debug!("Access token updated");
        Ok(())
    }

    /// Ends the session at the user's request.
    pub async fn end(&self) -> Result<(), CredentialStoreError> {
        self.store.clear().await?;
        *self.state.write().await = SessionState::SignedOut;
        log::info!("Session ended");
        Ok(())
    }

    /// Ends the session after an irrecoverable refresh failure and notifies
    /// the host.
    ///
    /// Credentials are cleared even if the listener is never reached; a
    /// failure to clear them is logged, not returned, so the host still
    /// hears about the expiry.
    ///
    /// Requests that fail together expire the session once; later calls
    /// only make sure the credentials are gone.
    pub async fn expire(&self, reason: impl Into<String>) {
        let reason = reason.into();

        if let Err(e) = self.store.clear().await {
            log::error!("Failed to clear credentials after session expiry: {e}");
        }

        {
            let mut state = self.state.write().await;
            if matches!(*state, SessionState::Expired { .. }) {
                log::debug!("Session already expired, ignoring: {reason}");
                return;
            }
            log::info!("Session expired: {reason}");
            *state = SessionState::Expired { reason };
        }

        self.listener
            .on_session_expired(&SessionNotice::expired(self.login_path.clone()));
    }
}
