use crate::auth::types::{LoginResponse, RegisterResponse, TokenPair};
use crate::common::ApiResult;
use crate::http::{ApiClient, ApiRequest};
use serde::Serialize;
use serde_json::{Value, json};

/// Channel used to deliver a one-time password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpMethod {
    Email,
    Phone,
}

/// New account details.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Serialize)]
struct OtpRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    otp: Option<&'a str>,
    method: OtpMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

/// Registration, login and credential management.
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Creates an account and starts a session with the issued credentials.
    ///
    /// Returns the rest of the registration payload (message and user).
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<Value> {
        let response: RegisterResponse = self
            .client
            .send_json(
                ApiRequest::post("/auth/register/")
                    .with_json(request)?
                    .without_refresh(),
            )
            .await?;

        self.client.session().begin(&response.tokens).await?;
        log::info!("Registered and signed in as {}", request.email);

        Ok(Value::Object(response.extra))
    }

    /// Signs in and starts a session with the issued credentials.
    ///
    /// Returns the rest of the login payload (profile details and flags).
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Value> {
        let response: LoginResponse = self
            .client
            .send_json(
                ApiRequest::post("/auth/login/")
                    .with_json(&json!({ "email": email, "password": password }))?
                    .without_refresh(),
            )
            .await?;

        let pair = TokenPair::new(response.access, response.refresh);
        self.client.session().begin(&pair).await?;
        log::info!("Logged in as {email}");

        Ok(Value::Object(response.extra))
    }

    /// Ends the session locally. The backend keeps no server-side session
    /// for bearer credentials, so nothing is sent.
    pub async fn logout(&self) -> ApiResult<()> {
        self.client.session().end().await?;
        Ok(())
    }

    pub async fn send_otp(
        &self,
        method: OtpMethod,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> ApiResult<Value> {
        let body = OtpRequest {
            otp: None,
            method,
            email,
            phone,
        };
        self.client
            .send_json(
                ApiRequest::post("/auth/otp/send/")
                    .with_json(&body)?
                    .without_refresh(),
            )
            .await
    }

    pub async fn verify_otp(
        &self,
        otp: &str,
        method: OtpMethod,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> ApiResult<Value> {
        let body = OtpRequest {
            otp: Some(otp),
            method,
            email,
            phone,
        };
        self.client
            .send_json(
                ApiRequest::post("/auth/otp/verify/")
                    .with_json(&body)?
                    .without_refresh(),
            )
            .await
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> ApiResult<Value> {
        self.client
            .post_json(
                "/auth/password/change/",
                &json!({ "old_password": old_password, "new_password": new_password }),
            )
            .await
    }

    /// Calls the refresh endpoint directly with an explicit credential.
    ///
    /// Requests issued through [`ApiClient`] refresh on their own; this is
    /// for hosts that want to refresh ahead of time.
    pub async fn refresh_token(&self, refresh: &str) -> ApiResult<Value> {
        self.client
            .send_json(
                ApiRequest::post(self.client.config().refresh_path.clone())
                    .with_json(&json!({ "refresh": refresh }))?
                    .without_refresh(),
            )
            .await
    }
}
