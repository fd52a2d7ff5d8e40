//! Data export for external analysis and backup.
//!
//! Entries, invoices, and tax summaries can be written out as CSV, JSON,
//! or Excel. CSV targets spreadsheet imports and simple parsers, JSON
//! preserves structure for programmatic processing, and Excel adds header
//! formatting and auto-sized columns for direct reading.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use billable::db::entries::EntryFilter;
//! use billable::libs::export::{ExportData, ExportFormat, Exporter};
//!
//! # fn run() -> anyhow::Result<()> {
//! let exporter = Exporter::new(ExportFormat::Csv, None);
//! exporter.export(ExportData::Entries, &EntryFilter::default(), 2025)?;
//! # Ok(())
//! # }
//! ```

use crate::db::entries::Entries;
use crate::db::entries::EntryFilter;
use crate::db::invoices::Invoices;
use crate::libs::billing::{self, TaxSummary};
use crate::libs::formatter::{format_currency, format_entries, FormattedEntry};
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;
use chrono::Local;
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Supported export output formats.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated values for universal compatibility.
    Csv,
    /// Pretty-printed JSON preserving data structure.
    Json,
    /// Excel workbook with formatted headers and auto-sized columns.
    Excel,
}

/// Data sets available for export.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ExportData {
    /// Committed time entries with client, duration, and amount.
    Entries,
    /// Invoices with totals and payment status.
    Invoices,
    /// Quarterly tax summary for one year.
    Tax,
}

/// Serializable invoice row for export.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportInvoice {
    pub number: String,
    pub client: String,
    pub created: String,
    pub due: String,
    pub total: String,
    pub paid: String,
    pub status: String,
}

/// Serializable quarter row for tax export.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportQuarter {
    pub quarter: String,
    pub invoices: usize,
    pub billed: String,
}

/// Serializable tax summary for export.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportTax {
    pub year: i32,
    pub quarters: Vec<ExportQuarter>,
    pub total: String,
}

/// Export handler holding the chosen format and destination.
pub struct Exporter {
    format: ExportFormat,
    output_path: PathBuf,
}

impl Exporter {
    /// Creates an exporter for `format`, writing to `output_path` or a
    /// timestamped default like `billable_export_20250115_143022.csv`.
    pub fn new(format: ExportFormat, output_path: Option<PathBuf>) -> Self {
        let default_name = format!("billable_export_{}", Local::now().format("%Y%m%d_%H%M%S"));
        let extension = match format {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
        };
        let output_path = output_path.unwrap_or_else(|| PathBuf::from(format!("{}.{}", default_name, extension)));

        Self { format, output_path }
    }

    /// Exports the selected data set.
    ///
    /// `filter` narrows the entries export; `year` selects the tax summary
    /// year. Each is ignored by the exports it does not apply to.
    pub fn export(&self, data_type: ExportData, filter: &EntryFilter, year: i32) -> Result<()> {
        match data_type {
            ExportData::Entries => self.export_entries(filter)?,
            ExportData::Invoices => self.export_invoices()?,
            ExportData::Tax => self.export_tax(year)?,
        }

        msg_success!(Message::ExportCompleted(self.output_path.display().to_string()));
        Ok(())
    }

    fn export_entries(&self, filter: &EntryFilter) -> Result<()> {
        let details = Entries::new()?.fetch_detailed(filter)?;
        let entries = format_entries(&details);

        match self.format {
            ExportFormat::Csv => self.export_entries_csv(&entries),
            ExportFormat::Json => self.write_json(&entries),
            ExportFormat::Excel => self.export_entries_excel(&entries),
        }
    }

    fn export_invoices(&self) -> Result<()> {
        let invoices: Vec<ExportInvoice> = Invoices::new()?
            .fetch_all()?
            .into_iter()
            .map(|details| {
                let invoice = details.invoice;
                ExportInvoice {
                    number: invoice.number,
                    client: details.client_name,
                    created: invoice.created_at.format("%Y-%m-%d").to_string(),
                    due: invoice.due_date.map(|d| d.to_string()).unwrap_or_default(),
                    total: format_currency(invoice.total),
                    paid: format_currency(invoice.paid),
                    status: invoice.status.to_string(),
                }
            })
            .collect();

        match self.format {
            ExportFormat::Csv => self.export_invoices_csv(&invoices),
            ExportFormat::Json => self.write_json(&invoices),
            ExportFormat::Excel => self.export_invoices_excel(&invoices),
        }
    }

    fn export_tax(&self, year: i32) -> Result<()> {
        let summary = billing::quarterly_tax_summary(&Invoices::new()?, year)?;
        let tax = Self::tax_rows(&summary);

        match self.format {
            ExportFormat::Csv => self.export_tax_csv(&tax),
            ExportFormat::Json => self.write_json(&tax),
            ExportFormat::Excel => self.export_tax_excel(&tax),
        }
    }

    fn tax_rows(summary: &TaxSummary) -> ExportTax {
        ExportTax {
            year: summary.year,
            quarters: summary
                .quarters
                .iter()
                .enumerate()
                .map(|(index, quarter)| ExportQuarter {
                    quarter: format!("Q{}", index + 1),
                    invoices: quarter.invoices,
                    billed: format_currency(quarter.billed),
                })
                .collect(),
            total: format_currency(summary.total),
        }
    }

    fn write_json<T: Serialize>(&self, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        File::create(&self.output_path)?.write_all(json.as_bytes())?;
        Ok(())
    }

    fn export_entries_csv(&self, entries: &[FormattedEntry]) -> Result<()> {
        let mut wtr = csv::Writer::from_path(&self.output_path)?;
        wtr.write_record(["ID", "Client", "Start", "End", "Duration", "Amount", "Invoice"])?;

        for entry in entries {
            wtr.write_record([
                entry.id.to_string(),
                entry.client.clone(),
                entry.start.clone(),
                entry.end.clone(),
                entry.duration.clone(),
                entry.amount.clone(),
                entry.invoice.clone(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn export_invoices_csv(&self, invoices: &[ExportInvoice]) -> Result<()> {
        let mut wtr = csv::Writer::from_path(&self.output_path)?;
        wtr.write_record(["Number", "Client", "Created", "Due", "Total", "Paid", "Status"])?;

        for invoice in invoices {
            wtr.write_record([
                invoice.number.clone(),
                invoice.client.clone(),
                invoice.created.clone(),
                invoice.due.clone(),
                invoice.total.clone(),
                invoice.paid.clone(),
                invoice.status.clone(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn export_tax_csv(&self, tax: &ExportTax) -> Result<()> {
        let mut wtr = csv::Writer::from_path(&self.output_path)?;

        wtr.write_record([format!("Quarterly Tax Summary - {}", tax.year), "".to_owned(), "".to_owned()])?;
        wtr.write_record(["Quarter", "Invoices", "Billed"])?;

        for quarter in &tax.quarters {
            wtr.write_record([quarter.quarter.clone(), quarter.invoices.to_string(), quarter.billed.clone()])?;
        }

        wtr.write_record(["", "", ""])?;
        wtr.write_record(["Total", "", &tax.total])?;

        wtr.flush()?;
        Ok(())
    }

    fn export_entries_excel(&self, entries: &[FormattedEntry]) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let header_format = Format::new().set_bold().set_background_color(rust_xlsxwriter::Color::Gray);

        worksheet.write_string_with_format(0, 0, "ID", &header_format)?;
        worksheet.write_string_with_format(0, 1, "Client", &header_format)?;
        worksheet.write_string_with_format(0, 2, "Start", &header_format)?;
        worksheet.write_string_with_format(0, 3, "End", &header_format)?;
        worksheet.write_string_with_format(0, 4, "Duration", &header_format)?;
        worksheet.write_string_with_format(0, 5, "Amount", &header_format)?;
        worksheet.write_string_with_format(0, 6, "Invoice", &header_format)?;

        for (i, entry) in entries.iter().enumerate() {
            let row = i as u32 + 1;
            worksheet.write_number(row, 0, entry.id as f64)?;
            worksheet.write_string(row, 1, &entry.client)?;
            worksheet.write_string(row, 2, &entry.start)?;
            worksheet.write_string(row, 3, &entry.end)?;
            worksheet.write_string(row, 4, &entry.duration)?;
            worksheet.write_string(row, 5, &entry.amount)?;
            worksheet.write_string(row, 6, &entry.invoice)?;
        }

        worksheet.autofit();
        workbook.save(&self.output_path)?;
        Ok(())
    }

    fn export_invoices_excel(&self, invoices: &[ExportInvoice]) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let header_format = Format::new().set_bold().set_background_color(rust_xlsxwriter::Color::Gray);

        worksheet.write_string_with_format(0, 0, "Number", &header_format)?;
        worksheet.write_string_with_format(0, 1, "Client", &header_format)?;
        worksheet.write_string_with_format(0, 2, "Created", &header_format)?;
        worksheet.write_string_with_format(0, 3, "Due", &header_format)?;
        worksheet.write_string_with_format(0, 4, "Total", &header_format)?;
        worksheet.write_string_with_format(0, 5, "Paid", &header_format)?;
        worksheet.write_string_with_format(0, 6, "Status", &header_format)?;

        for (i, invoice) in invoices.iter().enumerate() {
            let row = i as u32 + 1;
            worksheet.write_string(row, 0, &invoice.number)?;
            worksheet.write_string(row, 1, &invoice.client)?;
            worksheet.write_string(row, 2, &invoice.created)?;
            worksheet.write_string(row, 3, &invoice.due)?;
            worksheet.write_string(row, 4, &invoice.total)?;
            worksheet.write_string(row, 5, &invoice.paid)?;
            worksheet.write_string(row, 6, &invoice.status)?;
        }

        worksheet.autofit();
        workbook.save(&self.output_path)?;
        Ok(())
    }

    fn export_tax_excel(&self, tax: &ExportTax) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let header_format = Format::new().set_bold().set_background_color(rust_xlsxwriter::Color::Gray);
        let title_format = Format::new().set_bold().set_font_size(14.0);

        worksheet.write_string_with_format(0, 0, &format!("Quarterly Tax Summary - {}", tax.year), &title_format)?;
        worksheet.write_string_with_format(2, 0, "Quarter", &header_format)?;
        worksheet.write_string_with_format(2, 1, "Invoices", &header_format)?;
        worksheet.write_string_with_format(2, 2, "Billed", &header_format)?;

        let mut row = 3;
        for quarter in &tax.quarters {
            worksheet.write_string(row, 0, &quarter.quarter)?;
            worksheet.write_number(row, 1, quarter.invoices as f64)?;
            worksheet.write_string(row, 2, &quarter.billed)?;
            row += 1;
        }

        row += 1;
        worksheet.write_string(row, 0, "Total")?;
        worksheet.write_string(row, 2, &tax.total)?;

        worksheet.autofit();
        workbook.save(&self.output_path)?;
        Ok(())
    }
}
