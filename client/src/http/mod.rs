pub mod client;
pub mod config;
pub mod request;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use request::{ApiRequest, ApiResponse, FilePart, RequestBody};
