//! Lists recorded time entries.

use crate::{
    db::{
        clients::Clients,
        entries::{Entries, EntryFilter},
    },
    libs::{
        formatter::{format_currency, format_duration, format_entries},
        messages::Message,
        money::Money,
        view::View,
    },
    msg_error, msg_info,
};
use anyhow::{anyhow, Context, Result};
use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;

#[derive(Debug, Args)]
pub struct EntriesArgs {
    /// Only show entries for this client
    #[arg(short, long)]
    client: Option<String>,

    /// Only show finalized entries not yet on an invoice
    #[arg(short, long)]
    uninvoiced: bool,

    /// Restrict to a month in YYYY-MM format
    #[arg(short, long)]
    month: Option<String>,
}

pub async fn cmd(args: EntriesArgs) -> Result<()> {
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
    filter.uninvoiced_only = args.uninvoiced;
    if let Some(month) = &args.month {
        filter.range = Some(parse_month_range(month)?);
    }

    let details = Entries::new()?.fetch_detailed(&filter)?;
    if details.is_empty() {
        msg_info!(Message::EntriesNotFound);
        return Ok(());
    }

    let total_seconds: i64 = details.iter().map(|d| d.entry.duration).sum();
    let total_amount: Money = details.iter().map(|d| d.amount()).sum();
    View::entries(&format_entries(&details), &format_duration(total_seconds), &format_currency(total_amount))?;
    Ok(())
}

/// Converts `YYYY-MM` into the half-open range covering that month.
fn parse_month_range(month: &str) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .with_context(|| format!("invalid month '{}', expected YYYY-MM", month))?;
    let next = first.checked_add_months(Months::new(1)).ok_or_else(|| anyhow!("month out of range"))?;
    Ok((first.and_time(NaiveTime::MIN), next.and_time(NaiveTime::MIN)))
}
