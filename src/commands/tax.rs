//! Quarterly tax summary over billed amounts.
//!
//! Groups invoices by creation date, not by payment date, so the figures
//! reflect what was billed in each quarter regardless of when (or whether)
//! the client paid.

use crate::{
    db::invoices::Invoices,
    libs::{billing, messages::Message, view::View},
    msg_print,
};
use anyhow::Result;
use chrono::{Datelike, Local};
use clap::Args;

#[derive(Debug, Args)]
pub struct TaxArgs {
    /// Year to summarize; defaults to the current year
    #[arg(short, long)]
    year: Option<i32>,
}

pub async fn cmd(args: TaxArgs) -> Result<()> {
    let year = args.year.unwrap_or_else(|| Local::now().year());
    let invoices_db = Invoices::new()?;
    let summary = billing::quarterly_tax_summary(&invoices_db, year)?;

    msg_print!(Message::TaxSummaryHeader(year), true);
    View::tax_summary(&summary)?;
    Ok(())
}
