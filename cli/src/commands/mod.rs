//! Command-line surface and dispatch.
//!
//! Every command runs against one [`Context`]: the validated configuration
//! and an [`Api`] whose session is backed by the credential file, so a
//! login in one invocation is picked up by the next.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::services::SecurePassword;
use clap::{Parser, Subcommand};
use client::{Api, ApiClient, FileCredentialStore, SessionListener, SessionManager};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

pub mod resources;
pub mod session;

#[derive(Debug, Parser)]
#[command(
    name = "gstongo",
    version,
    about = "Command-line client for the GSTONGO tax filing backend"
)]
pub struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding configuration
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the issued credentials
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for without echo when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Discard the stored credentials
    Logout,
    /// Show whether a session is active and when its access token expires
    Status,
    /// Show the signed-in user's profile
    Profile,
    /// List notifications
    Notifications,
    /// GST return filings
    #[command(subcommand)]
    Filings(FilingsCommand),
    /// Invoices
    #[command(subcommand)]
    Invoices(InvoicesCommand),
    /// Payments
    #[command(subcommand)]
    Payments(PaymentsCommand),
    /// Back-office views for staff accounts
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Subcommand)]
pub enum FilingsCommand {
    /// List filings, optionally filtered
    List {
        #[arg(long)]
        filing_type: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        financial_year: Option<String>,
    },
    /// Show one filing
    Show { id: String },
    /// Show the invoice summary of a filing
    Summary { id: String },
}

#[derive(Debug, Subcommand)]
pub enum InvoicesCommand {
    /// List invoices
    List {
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum PaymentsCommand {
    /// List past payments
    History,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Show the admin dashboard
    Dashboard,
}

/// What a command produced for the terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Json(Value),
    Text(String),
}

impl Output {
    /// Renders the output for stdout; JSON is pretty-printed.
    pub fn render(&self) -> AppResult<String> {
        match self {
            Output::Json(value) => {
                serde_json::to_string_pretty(value).map_err(|e| AppError::Output(e.to_string()))
            }
            Output::Text(text) => Ok(text.clone()),
        }
    }
}

/// Configuration and backend access shared by all commands.
pub struct Context {
    config: AppConfig,
    api: Api,
}

impl Context {
    /// Opens the persisted session and builds the API client.
    pub async fn connect(config: AppConfig, listener: Arc<dyn SessionListener>) -> AppResult<Self> {
        let credentials_path = config.credentials().path();
        log::debug!("Using credentials at {}", credentials_path.display());

        let store = Arc::new(FileCredentialStore::new(credentials_path));
        let session = Arc::new(SessionManager::new(store, listener));
        let state = session.restore().await?;
        log::debug!("Restored session state: {state:?}");

        let client = ApiClient::new(config.client_config(), session)?;
        Ok(Self {
            config,
            api: Api::new(Arc::new(client)),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn api(&self) -> &Api {
        &self.api
    }
}

/// Runs one command.
pub async fn execute(command: Command, ctx: &Context) -> AppResult<Output> {
    log::debug!("Executing {command:?}");

    match command {
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => SecurePassword::new(password),
                None => session::prompt_password().await?,
            };
            session::login(ctx, &email, &password).await
        }
        Command::Logout => session::logout(ctx).await,
        Command::Status => session::status(ctx, chrono::Utc::now()).await,
        Command::Profile => resources::profile(ctx).await,
        Command::Notifications => resources::notifications(ctx).await,
        Command::Filings(command) => resources::filings(ctx, command).await,
        Command::Invoices(command) => resources::invoices(ctx, command).await,
        Command::Payments(command) => resources::payments(ctx, command).await,
        Command::Admin(command) => resources::admin(ctx, command).await,
        Command::Config => toml::to_string_pretty(&ctx.config().resolved())
            .map(Output::Text)
            .map_err(|e| AppError::Output(e.to_string())),
    }
}
