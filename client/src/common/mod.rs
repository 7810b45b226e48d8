pub mod errors;

pub use errors::{ApiError, ApiResult, CredentialStoreError, ErrorBody, TokenRefreshError};
