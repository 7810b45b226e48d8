//! Endpoint groups for the backend's REST surface.
//!
//! Each group borrows the shared [`ApiClient`] and exposes one method per
//! endpoint. Responses are returned as the server sent them.

pub mod admin;
pub mod auth;
pub mod gst;
pub mod invoices;
pub mod user;

pub use admin::{ActivityFilter, AdminApi};
pub use auth::{AuthApi, OtpMethod, RegisterRequest};
pub use gst::{FilingFilter, GstFilingApi, NewFiling};
pub use invoices::{InvoiceApi, PaymentGateway};
pub use user::UserApi;

use crate::http::ApiClient;
use std::sync::Arc;

/// Entry point bundling every endpoint group around one client.
#[derive(Clone)]
pub struct Api {
    client: Arc<ApiClient>,
}

impl Api {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.client)
    }

    pub fn users(&self) -> UserApi<'_> {
        UserApi::new(&self.client)
    }

    pub fn gst(&self) -> GstFilingApi<'_> {
        GstFilingApi::new(&self.client)
    }

    pub fn invoices(&self) -> InvoiceApi<'_> {
        InvoiceApi::new(&self.client)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(&self.client)
    }
}

/// Percent-encodes an identifier used as a path segment.
pub(crate) fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}
