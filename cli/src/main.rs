use anyhow::Context as _;
use clap::Parser;
use gstongo::commands::{self, Cli, Context};
use gstongo::services::TerminalListener;
use gstongo::{config, logger};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let listener = Arc::new(TerminalListener::stderr());

    match run(cli, listener.clone()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("Command failed: {e:?}");
            listener.report_failure(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, listener: Arc<TerminalListener>) -> anyhow::Result<()> {
    let app_config = config::load_validated(cli.config.as_deref(), cli.api_url.as_deref())?;
    logger::setup_logger(app_config.logging())?;

    let ctx = Context::connect(app_config, listener)
        .await
        .context("Failed to open the session")?;
    let output = commands::execute(cli.command, &ctx).await?;

    println!("{}", output.render()?);
    Ok(())
}
