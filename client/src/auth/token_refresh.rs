use super::session::SessionManager;
use super::types::{RefreshRequest, RefreshResponse};
use crate::common::{ErrorBody, TokenRefreshError};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Outcome of a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshedToken {
    /// This call exchanged the refresh credential for a new access credential
    Exchanged(String),
    /// Another request refreshed while this one waited; its credential is reused
    Reused(String),
}

impl RefreshedToken {
    pub fn access_token(&self) -> &str {
        match self {
            RefreshedToken::Exchanged(token) | RefreshedToken::Reused(token) => token,
        }
    }
}

/// Exchanges the refresh credential for a new access credential.
///
/// Refreshes are single-flight: concurrent callers queue on an internal
/// lock, and a caller that finds the stored access credential already
/// replaced by someone else reuses it instead of posting again.
pub struct TokenRefresher {
    http_client: reqwest::Client,
    refresh_url: String,
    session: Arc<SessionManager>,
    in_flight: Mutex<()>,
}

impl TokenRefresher {
    pub fn new(
        http_client: reqwest::Client,
        refresh_url: impl Into<String>,
        session: Arc<SessionManager>,
    ) -> Self {
        Self {
            http_client,
            refresh_url: refresh_url.into(),
            session,
            in_flight: Mutex::new(()),
        }
    }

    pub fn refresh_url(&self) -> &str {
        &self.refresh_url
    }

    /// Obtains a new access credential for a request that failed with 401.
    ///
    /// `stale_access` is the credential the failing request carried, or
    /// `None` if it was sent unauthenticated. The new credential is stored
    /// before returning.
    pub async fn refresh(
        &self,
        stale_access: Option<&str>,
    ) -> Result<RefreshedToken, TokenRefreshError> {
        let _guard = self.in_flight.lock().await;

        if let Some(current) = self.session.access_token().await? {
            if !current.is_empty() && Some(current.as_str()) != stale_access {
                log::debug!("Access token was refreshed by a concurrent request, reusing it");
                return Ok(RefreshedToken::Reused(current));
            }
        }

        let refresh = self
            .session
            .refresh_token()
            .await?
            .filter(|token| !token.is_empty())
            .ok_or(TokenRefreshError::MissingRefreshToken)?;

        let response = self.exchange(&refresh).await?;
        let access = response
            .access
            .filter(|token| !token.is_empty())
            .ok_or_else(|| TokenRefreshError::InvalidResponse {
                reason: "response did not contain an access token".to_string(),
            })?;

        self.session
            .update_access(access.clone(), response.refresh)
            .await?;
        log::info!("Access token refreshed");

        Ok(RefreshedToken::Exchanged(access))
    }

    async fn exchange(&self, refresh: &str) -> Result<RefreshResponse, TokenRefreshError> {
        log::debug!("Requesting new access token from {}", self.refresh_url);

        let response = self
            .http_client
            .post(&self.refresh_url)
            .json(&RefreshRequest { refresh })
            .send()
            .await
            .map_err(|e| TokenRefreshError::Network {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TokenRefreshError::Network {
                reason: e.to_string(),
            })?;

        if !status.is_success() {
            let message = ErrorBody::parse(&body).and_then(|b| b.message);
            log::info!("Token refresh rejected with status {status}");
            return Err(TokenRefreshError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| TokenRefreshError::InvalidResponse {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::{CredentialStore, MemoryCredentialStore};
    use crate::auth::session::LoggingListener;
    use crate::auth::types::TokenPair;
    use crate::auth::CredentialKey;
    use claims::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup(server: &MockServer) -> (TokenRefresher, MemoryCredentialStore) {
        let store = MemoryCredentialStore::new();
        let session = Arc::new(SessionManager::new(
            Arc::new(store.clone()),
            Arc::new(LoggingListener),
        ));
        let refresher = TokenRefresher::new(
            reqwest::Client::new(),
            format!("{}/auth/token/refresh/", server.uri()),
            session,
        );
        (refresher, store)
    }

    #[tokio::test]
    async fn test_refresh_exchanges_and_stores() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .and(body_json(serde_json::json!({ "refresh": "r1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access": "a2",
                "refresh": "r2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (refresher, store) = setup(&server).await;
        assert_ok!(store.set(CredentialKey::AccessToken, "a1".to_string()).await);
        assert_ok!(store.set(CredentialKey::RefreshToken, "r1".to_string()).await);

        let refreshed = assert_ok!(refresher.refresh(Some("a1")).await);
        assert_eq!(refreshed, RefreshedToken::Exchanged("a2".to_string()));
        assert_eq!(
            assert_ok!(store.get(CredentialKey::AccessToken).await).as_deref(),
            Some("a2")
        );
        assert_eq!(
            assert_ok!(store.get(CredentialKey::RefreshToken).await).as_deref(),
            Some("r2")
        );
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (refresher, store) = setup(&server).await;
        assert_ok!(store.set(CredentialKey::AccessToken, "a1".to_string()).await);

        let err = assert_err!(refresher.refresh(Some("a1")).await);
        assert!(matches!(err, TokenRefreshError::MissingRefreshToken));
    }

    #[tokio::test]
    async fn test_refresh_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "success": false,
                "error": { "code": 401, "message": "Token is invalid or expired" }
            })))
            .mount(&server)
            .await;

        let (refresher, store) = setup(&server).await;
        let pair = TokenPair::new("a1", "r1");
        assert_ok!(store.set(CredentialKey::AccessToken, pair.access.clone()).await);
        assert_ok!(store.set(CredentialKey::RefreshToken, pair.refresh.clone()).await);

        match assert_err!(refresher.refresh(Some("a1")).await) {
            TokenRefreshError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message.as_deref(), Some("Token is invalid or expired"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_response_without_access() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let (refresher, store) = setup(&server).await;
        assert_ok!(store.set(CredentialKey::RefreshToken, "r1".to_string()).await);

        let err = assert_err!(refresher.refresh(None).await);
        assert!(matches!(err, TokenRefreshError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_refresh_reuses_token_replaced_meanwhile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (refresher, store) = setup(&server).await;
        assert_ok!(store.set(CredentialKey::AccessToken, "a2".to_string()).await);
        assert_ok!(store.set(CredentialKey::RefreshToken, "r1".to_string()).await);

        let refreshed = assert_ok!(refresher.refresh(Some("a1")).await);
        assert_eq!(refreshed, RefreshedToken::Reused("a2".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_post_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access": "a2" }))
                    .set_delay(std::time::Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (refresher, store) = setup(&server).await;
        assert_ok!(store.set(CredentialKey::AccessToken, "a1".to_string()).await);
        assert_ok!(store.set(CredentialKey::RefreshToken, "r1".to_string()).await);

        let (first, second, third) = futures::join!(
            refresher.refresh(Some("a1")),
            refresher.refresh(Some("a1")),
            refresher.refresh(Some("a1")),
        );

        for result in [first, second, third] {
            assert_eq!(assert_ok!(result).access_token(), "a2");
        }
    }
}
