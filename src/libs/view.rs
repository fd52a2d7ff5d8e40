//! Terminal table rendering for listings and status output.

use crate::db::clients::Client;
use crate::db::invoices::InvoiceDetails;
use crate::libs::billing::TaxSummary;
use crate::libs::engine::SessionSnapshot;
use crate::libs::formatter::{format_currency, format_duration, FormattedEntry};
use anyhow::Result;
use prettytable::{row, Table};

include!(concat!(env!("OUT_DIR"), "/app_metadata.rs"));

pub struct View {}

impl View {
    pub fn clients(clients: &[Client]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "NAME", "RATE", "ACTIVITY TRACKING", "STATUS"]);
        for client in clients {
            let name = if client.favorite {
                format!("* {}", client.name)
            } else {
                client.name.clone()
            };
            table.add_row(row![
                client.id,
                name,
                format!("{}/hr", format_currency(client.rate)),
                if client.track_activity { "on" } else { "off" },
                if client.archived { "archived" } else { "active" }
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn entries(entries: &[FormattedEntry], total_duration: &str, total_amount: &str) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "CLIENT", "START", "END", "DURATION", "AMOUNT", "INVOICE"]);
        for entry in entries {
            table.add_row(row![
                entry.id,
                entry.client,
                entry.start,
                entry.end,
                entry.duration,
                entry.amount,
                entry.invoice
            ]);
        }
        table.add_row(row!["", "TOTAL", "", "", total_duration, total_amount, ""]);
        table.printstd();

        Ok(())
    }

    pub fn invoices(invoices: &[InvoiceDetails]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["NUMBER", "CLIENT", "CREATED", "DUE", "TOTAL", "PAID", "STATUS"]);
        for details in invoices {
            let invoice = &details.invoice;
            table.add_row(row![
                invoice.number,
                details.client_name,
                invoice.created_at.format("%Y-%m-%d"),
                invoice
                    .due_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                format_currency(invoice.total),
                format_currency(invoice.paid),
                invoice.status
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn tax_summary(summary: &TaxSummary) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["QUARTER", "INVOICES", "BILLED"]);
        for (index, quarter) in summary.quarters.iter().enumerate() {
            table.add_row(row![
                format!("Q{}", index + 1),
                quarter.invoices,
                format_currency(quarter.billed)
            ]);
        }
        table.add_row(row!["TOTAL", "", format_currency(summary.total)]);
        table.printstd();

        Ok(())
    }

    /// Prints the live session status from the latest snapshot.
    pub fn status(client_name: &str, snapshot: &SessionSnapshot) -> Result<()> {
        println!("{} v{}", APP_METADATA_NAME, APP_METADATA_VERSION);

        let mut table = Table::new();
        table.add_row(row!["CLIENT", "PHASE", "STARTED", "ACTIVE", "IDLE", "LAST SNAPSHOT"]);
        table.add_row(row![
            client_name,
            snapshot.phase.as_str(),
            snapshot.start.format("%Y-%m-%d %H:%M:%S"),
            format_duration(snapshot.duration),
            format_duration(snapshot.idle),
            snapshot.saved_at.format("%H:%M:%S")
        ]);
        table.printstd();

        Ok(())
    }
}
