use super::{AdminCommand, Context, FilingsCommand, InvoicesCommand, Output, PaymentsCommand};
use crate::error::AppResult;
use client::api::FilingFilter;

pub async fn profile(ctx: &Context) -> AppResult<Output> {
    Ok(Output::Json(ctx.api().users().profile().await?))
}

pub async fn notifications(ctx: &Context) -> AppResult<Output> {
    Ok(Output::Json(ctx.api().users().notifications().await?))
}

pub async fn filings(ctx: &Context, command: FilingsCommand) -> AppResult<Output> {
    let gst = ctx.api().gst();
    let value = match command {
        FilingsCommand::List {
            filing_type,
            status,
            financial_year,
        } => {
            let filter = FilingFilter {
                filing_type,
                status,
                financial_year,
            };
            gst.filings(&filter).await?
        }
        FilingsCommand::Show { id } => gst.filing(&id).await?,
        FilingsCommand::Summary { id } => gst.filing_summary(&id).await?,
    };
    Ok(Output::Json(value))
}

pub async fn invoices(ctx: &Context, command: InvoicesCommand) -> AppResult<Output> {
    let value = match command {
        InvoicesCommand::List { status } => {
            ctx.api().invoices().invoices(status.as_deref()).await?
        }
    };
    Ok(Output::Json(value))
}

pub async fn payments(ctx: &Context, command: PaymentsCommand) -> AppResult<Output> {
    let value = match command {
        PaymentsCommand::History => ctx.api().invoices().payment_history().await?,
    };
    Ok(Output::Json(value))
}

pub async fn admin(ctx: &Context, command: AdminCommand) -> AppResult<Output> {
    let value = match command {
        AdminCommand::Dashboard => ctx.api().admin().dashboard().await?,
    };
    Ok(Output::Json(value))
}
