//! # GSTONGO Command-Line Client
//!
//! Terminal front end for the GSTONGO tax filing backend, built on the
//! `client` library.
//!
//! ## Modules
//!
//! - [`commands`] - Argument parsing and command execution
//! - [`config`] - Layered configuration loading and validation
//! - [`error`] - Error types for the front end
//! - [`logger`] - Logging setup
//! - [`services`] - Host integrations such as the terminal session listener
//!
//! This library interface enables integration testing by providing access to internal modules.

pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod services;

pub use error::{AppError, AppResult};
