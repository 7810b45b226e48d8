//! # GSTONGO Client Library
//!
//! Core library for talking to the GSTONGO REST backend.
//! This library provides credential storage, the session lifecycle, an
//! authenticated HTTP client with transparent token refresh, and typed
//! endpoint groups for filings, invoices, users and administration.
//!
//! ## Modules
//!
//! - [`auth`] - Credential stores, session lifecycle and token refresh
//! - [`http`] - Authenticated HTTP client and replayable requests
//! - [`api`] - Endpoint groups mirroring the backend's REST surface
//! - [`common`] - Common error types

pub mod api;
pub mod auth;
pub mod common;
pub mod http;

pub use api::Api;
pub use auth::{
    CredentialKey, CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionListener,
    SessionManager, SessionState, TokenPair,
};
pub use common::{ApiError, ApiResult};
pub use http::{ApiClient, ApiRequest, ApiResponse, ClientConfig};
