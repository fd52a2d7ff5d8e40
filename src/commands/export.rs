//! Exports entries, invoices, or a tax summary to CSV, JSON, or Excel.

use crate::{
    db::{clients::Clients, entries::EntryFilter},
    libs::{
        export::{ExportData, ExportFormat, Exporter},
        messages::Message,
    },
    msg_error, msg_info,
};
use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// What to export
    #[arg(value_enum, default_value = "entries")]
    data: ExportData,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: ExportFormat,

    /// Output file path; generated from a timestamp when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only export entries for this client
    #[arg(short, long)]
    client: Option<String>,

    /// Restrict entries to a month in YYYY-MM format
    #[arg(short, long)]
    month: Option<String>,

    /// Year for the tax summary; defaults to the current year
    #[arg(short, long)]
    year: Option<i32>,
}

pub async fn cmd(args: ExportArgs) -> Result<()> {
    let mut filter = EntryFilter::default();
    if let Some(name) = &args.client {
        match Clients::new()?.fetch_by_name(name)? {
            Some(client) => filter.client_id = Some(client.id),
            None => {
                msg_error!(Message::ClientNotFound(name.clone()));
                return Ok(());
            }
        }
    }
    if let Some(month) = &args.month {
        filter.range = Some(parse_month_range(month)?);
    }
    let year = args.year.unwrap_or_else(|| Local::now().year());

    msg_info!(Message::ExportingData(format!("{:?}", args.data), format!("{:?}", args.format)));

    let exporter = Exporter::new(args.format, args.output);
    exporter.export(args.data, &filter, year)?;
    Ok(())
}

/// Converts `YYYY-MM` into the half-open range covering that month.
fn parse_month_range(month: &str) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .with_context(|| format!("invalid month '{}', expected YYYY-MM", month))?;
    let next = first.checked_add_months(Months::new(1)).ok_or_else(|| anyhow!("month out of range"))?;
    Ok((first.and_time(NaiveTime::MIN), next.and_time(NaiveTime::MIN)))
}
