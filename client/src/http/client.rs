use super::config::ClientConfig;
use super::request::{ApiRequest, ApiResponse, RequestBody};
use crate::auth::session::SessionManager;
use crate::auth::token_refresh::TokenRefresher;
use crate::common::{ApiError, ApiResult, ErrorBody};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// HTTP client for the GSTONGO REST backend.
///
/// Every request carries the current access credential as a bearer token.
/// A `401 Unauthorized` triggers one token refresh and one replay of the
/// request; if the refresh cannot be performed the session is expired and
/// the caller receives [`ApiError::SessionExpired`]. Other failures are
/// reported to the session listener with a user-facing message.
///
/// # Examples
///
/// ```no_run
/// use client::{ApiClient, ClientConfig, MemoryCredentialStore, SessionManager};
/// use client::auth::LoggingListener;
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), client::ApiError> {
/// let session = Arc::new(SessionManager::new(
///     Arc::new(MemoryCredentialStore::new()),
///     Arc::new(LoggingListener),
/// ));
/// let client = ApiClient::new(ClientConfig::from_env(), session)?;
/// let profile: serde_json::Value = client.get_json("/auth/profile/").await?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    http_client: reqwest::Client,
    config: ClientConfig,
    session: Arc<SessionManager>,
    refresher: TokenRefresher,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Arc<SessionManager>) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Configuration(format!("HTTP client creation failed: {e}")))?;

        reqwest::Url::parse(&config.base_url).map_err(|e| {
            ApiError::Configuration(format!("Invalid base URL '{}': {e}", config.base_url))
        })?;

        let refresher = TokenRefresher::new(http_client.clone(), config.refresh_url(), session.clone());

        Ok(Self {
            http_client,
            config,
            session,
            refresher,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Sends `request`, refreshing the access credential and replaying once
    /// on `401`.
    pub async fn execute(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let result = self.execute_with_refresh(request).await;

        if let Err(e) = &result {
            if !e.is_session_expired() {
                self.session.listener().on_error(&e.user_message());
            }
        }

        result
    }

    async fn execute_with_refresh(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        let access = self.session.access_token().await?;
        let response = self.send_once(&request, access.as_deref()).await?;

        let unauthorized = response.status == StatusCode::UNAUTHORIZED.as_u16();
        if !unauthorized || request.retried || !request.refresh_on_unauthorized {
            return Self::check_status(response);
        }

        log::info!(
            "{} {} returned 401, attempting token refresh",
            request.method,
            request.path
        );
        request.retried = true;

        let refreshed = match self.refresher.refresh(access.as_deref()).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                self.session.expire(e.to_string()).await;
                return Err(e.into());
            }
        };

        let replayed = self
            .send_once(&request, Some(refreshed.access_token()))
            .await?;
        Self::check_status(replayed)
    }

    async fn send_once(&self, request: &ApiRequest, access: Option<&str>) -> ApiResult<ApiResponse> {
        let url = self.config.url(&request.path);
        log::debug!("{} {url}", request.method);

        let mut builder = self.http_client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = access.filter(|t| !t.is_empty()) {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(ApiRequest::multipart_form(parts)),
        };

        let timeout_secs = self.config.timeout.as_secs();
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&url, &e, timeout_secs))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(&url, &e, timeout_secs))?;

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }

    fn check_status(response: ApiResponse) -> ApiResult<ApiResponse> {
        if (200..300).contains(&response.status) {
            Ok(response)
        } else {
            log::debug!("Request failed with status {}", response.status);
            Err(ErrorBody::api_error(&response.body, response.status))
        }
    }

    /// Sends `request` and decodes the JSON response.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let response = self.execute(request).await?;
        response.json().inspect_err(|e| {
            self.session.listener().on_error(&e.user_message());
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::post(path).with_json(body)?).await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::patch(path).with_json(body)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::{CredentialKey, CredentialStore, MemoryCredentialStore};
    use crate::auth::session::{SessionListener, SessionNotice, SessionState};
    use claims::*;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingListener {
        expired: Mutex<u32>,
        errors: Mutex<Vec<String>>,
    }

    impl SessionListener for RecordingListener {
        fn on_session_expired(&self, _notice: &SessionNotice) {
            *self.expired.lock().unwrap() += 1;
        }

        fn on_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    struct Harness {
        client: ApiClient,
        store: MemoryCredentialStore,
        listener: Arc<RecordingListener>,
    }

    fn harness(server: &MockServer) -> Harness {
        let store = MemoryCredentialStore::new();
        let listener = Arc::new(RecordingListener::default());
        let session = Arc::new(SessionManager::new(
            Arc::new(store.clone()),
            listener.clone(),
        ));
        let client = ApiClient::new(ClientConfig::new(server.uri()), session).unwrap();
        Harness {
            client,
            store,
            listener,
        }
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/profile/"))
            .and(header("Authorization", "Bearer a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "u@x.in" })))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server);
        assert_ok!(h.store.set(CredentialKey::AccessToken, "a1".to_string()).await);

        let profile: Value = assert_ok!(h.client.get_json("/auth/profile/").await);
        assert_eq!(profile["email"], "u@x.in");
    }

    #[tokio::test]
    async fn test_sends_unauthenticated_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let h = harness(&server);
        assert_ok!(h.client.execute(ApiRequest::get("/public/")).await);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_refreshes_and_replays_on_401() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gst/filings/"))
            .and(header("Authorization", "Bearer old"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gst/filings/"))
            .and(header("Authorization", "Bearer new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server);
        assert_ok!(h.store.set(CredentialKey::AccessToken, "old".to_string()).await);
        assert_ok!(h.store.set(CredentialKey::RefreshToken, "r1".to_string()).await);

        let body: Value = assert_ok!(h.client.get_json("/gst/filings/").await);
        assert_eq!(body["results"], json!([]));
        assert_eq!(
            assert_ok!(h.store.get(CredentialKey::AccessToken).await).as_deref(),
            Some("new")
        );
        assert!(h.listener.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_401_is_not_retried_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/dashboard/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "error": { "code": 401, "message": "Authentication credentials were not provided." }
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new" })))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server);
        assert_ok!(h.store.set(CredentialKey::AccessToken, "old".to_string()).await);
        assert_ok!(h.store.set(CredentialKey::RefreshToken, "r1".to_string()).await);

        let err = assert_err!(h.client.execute(ApiRequest::get("/admin/dashboard/")).await);
        assert_eq!(err.status(), Some(401));
        assert!(!err.is_session_expired());
        assert_eq!(
            h.listener.errors.lock().unwrap().as_slice(),
            ["Authentication credentials were not provided."]
        );
        assert_eq!(h.client.session().state().await, SessionState::SignedIn);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_expires_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let h = harness(&server);
        assert_ok!(h.store.set(CredentialKey::AccessToken, "old".to_string()).await);

        let err = assert_err!(h.client.execute(ApiRequest::get("/auth/profile/")).await);
        assert!(err.is_session_expired());
        assert_eq!(*h.listener.expired.lock().unwrap(), 1);
        assert!(h.listener.errors.lock().unwrap().is_empty());
        assert_none!(assert_ok!(h.store.get(CredentialKey::AccessToken).await));
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server);
        assert_ok!(h.store.set(CredentialKey::AccessToken, "old".to_string()).await);
        assert_ok!(h.store.set(CredentialKey::RefreshToken, "r1".to_string()).await);

        let err = assert_err!(h.client.execute(ApiRequest::get("/invoices/invoices/")).await);
        assert!(err.is_session_expired());
        assert_none!(assert_ok!(h.store.get(CredentialKey::AccessToken).await));
        assert_none!(assert_ok!(h.store.get(CredentialKey::RefreshToken).await));
        assert!(matches!(
            h.client.session().state().await,
            SessionState::Expired { .. }
        ));
    }

    #[tokio::test]
    async fn test_application_error_surfaces_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gst/filings/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "error": { "code": "validation_error", "message": "Filing already exists." }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server);
        let err = assert_err!(
            h.client
                .post_json::<_, Value>("/gst/filings/", &json!({ "month": 4 }))
                .await
        );

        match &err {
            ApiError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(*status, 400);
                assert_eq!(code.as_deref(), Some("validation_error"));
                assert_eq!(message.as_deref(), Some("Filing already exists."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            h.listener.errors.lock().unwrap().as_slice(),
            ["Filing already exists."]
        );
    }

    #[tokio::test]
    async fn test_without_refresh_surfaces_401_directly() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "error": { "code": 401, "message": "No active account found with the given credentials" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server);
        assert_ok!(h.store.set(CredentialKey::RefreshToken, "r1".to_string()).await);

        let request = ApiRequest::post("/auth/login/")
            .with_json(&json!({ "email": "u@x.in", "password": "wrong" }))
            .unwrap()
            .without_refresh();
        let err = assert_err!(h.client.execute(request).await);

        assert_eq!(
            err.user_message(),
            "No active account found with the given credentials"
        );
        assert_eq!(*h.listener.expired.lock().unwrap(), 0);
        assert_some!(assert_ok!(h.store.get(CredentialKey::RefreshToken).await));
    }

    #[tokio::test]
    async fn test_transport_error_uses_generic_reason() {
        let h = {
            let store = MemoryCredentialStore::new();
            let listener = Arc::new(RecordingListener::default());
            let session = Arc::new(SessionManager::new(Arc::new(store.clone()), listener.clone()));
            // Port 9 (discard) is not expected to accept HTTP connections
            let client = ApiClient::new(ClientConfig::new("http://127.0.0.1:9"), session).unwrap();
            Harness {
                client,
                store,
                listener,
            }
        };

        let err = assert_err!(h.client.execute(ApiRequest::get("/auth/profile/")).await);
        assert!(matches!(err, ApiError::Transport { .. }));
        assert_eq!(h.listener.errors.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let session = Arc::new(SessionManager::new(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(RecordingListener::default()),
        ));
        let Err(err) = ApiClient::new(ClientConfig::new("not a url"), session) else {
            panic!("assertion failed, expected Err(..), got Ok(..)");
        };
        assert!(matches!(err, ApiError::Configuration(_)));
    }
}
