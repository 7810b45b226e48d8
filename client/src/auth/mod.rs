pub mod claims;
pub mod credentials;
pub mod session;
pub mod token_refresh;
pub mod types;

pub use claims::TokenClaims;
pub use credentials::{CredentialKey, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use session::{LoggingListener, SessionListener, SessionManager, SessionNotice, SessionState};
pub use token_refresh::{RefreshedToken, TokenRefresher};
pub use types::{LoginResponse, RefreshRequest, RefreshResponse, RegisterResponse, TokenPair};
