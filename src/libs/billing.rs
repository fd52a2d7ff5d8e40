//! Billing operations over committed time entries.
//!
//! This module owns the billing rules: what may be invoiced, how payments
//! advance an invoice's status, and how totals roll up for tax reporting.
//! The storage layer in [`crate::db::invoices`] executes the writes; the
//! functions here validate inputs and shape the results.

use crate::db::entries::{Entries, TimeEntry};
use crate::db::invoices::{Invoice, InvoiceStatus, Invoices};
use crate::libs::config::BillingConfig;
use crate::libs::formatter::format_currency;
use crate::libs::money::Money;
use anyhow::anyhow;
use chrono::{Datelike, Duration, NaiveDateTime};
use thiserror::Error;

/// Errors surfaced by billing operations.
#[derive(Debug, Error)]
pub enum BillingError {
    /// An invoice build was requested over no entries.
    #[error("nothing to invoice")]
    EmptySelection,

    /// A selected entry is not billable for this client.
    #[error("entry {entry_id} cannot be billed: {reason}")]
    ForeignEntry { entry_id: i64, reason: String },

    /// A payment amount the invoice cannot accept.
    #[error("invalid payment amount: {reason}")]
    InvalidAmount { reason: String },

    /// A required read or write to the database failed.
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for BillingError {
    fn from(err: rusqlite::Error) -> Self {
        BillingError::Persistence(err.into())
    }
}

/// Billed totals for one quarter of a year.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuarterTotal {
    pub invoices: usize,
    pub billed: Money,
}

/// A full year of quarterly billed totals.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxSummary {
    pub year: i32,
    /// Indexed Q1 through Q4; quarters without invoices stay zeroed.
    pub quarters: [QuarterTotal; 4],
    pub total: Money,
}

/// Returns the billable backlog for a client: finalized, unclaimed
/// entries ordered oldest first.
pub fn select_uninvoiced(entries: &Entries, client_id: i64) -> Result<Vec<TimeEntry>, BillingError> {
    Ok(entries.fetch_uninvoiced(client_id)?)
}

/// Builds an invoice over the selected entries as one atomic unit.
///
/// Lines are priced at the client's current rate at build time; later rate
/// changes never reprice an existing invoice. The due date follows the
/// configured payment terms.
pub fn build_invoice(
    invoices: &mut Invoices,
    client_id: i64,
    entry_ids: &[i64],
    created_at: NaiveDateTime,
    config: &BillingConfig,
) -> Result<Invoice, BillingError> {
    if entry_ids.is_empty() {
        return Err(BillingError::EmptySelection);
    }
    let due_date = created_at.date() + Duration::days(config.payment_terms_days as i64);
    invoices.create(client_id, entry_ids, created_at, Some(due_date))
}

/// Applies a payment against an invoice and advances its status.
///
/// Status only moves forward: Unpaid to PartiallyPaid to Paid. A payment
/// must be positive and must not exceed the outstanding balance, which
/// also rejects any payment against an invoice already paid in full.
pub fn record_payment(
    invoices: &Invoices,
    invoice: &Invoice,
    amount: Money,
) -> Result<Invoice, BillingError> {
    if !amount.is_positive() {
        return Err(BillingError::InvalidAmount {
            reason: "payment must be positive".to_string(),
        });
    }
    if invoice.status == InvoiceStatus::Paid {
        return Err(BillingError::InvalidAmount {
            reason: "invoice is already paid in full".to_string(),
        });
    }
    let outstanding = invoice.outstanding();
    if amount > outstanding {
        return Err(BillingError::InvalidAmount {
            reason: format!(
                "{} exceeds the outstanding balance of {}",
                format_currency(amount),
                format_currency(outstanding)
            ),
        });
    }

    let new_paid = invoice.paid + amount;
    let new_status = if new_paid == invoice.total {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::PartiallyPaid
    };

    let applied = invoices.apply_payment(invoice.id, new_paid, new_status, invoice.paid)?;
    if !applied {
        return Err(BillingError::Persistence(anyhow!(
            "invoice {} changed concurrently, payment not applied",
            invoice.number
        )));
    }

    Ok(Invoice {
        paid: new_paid,
        status: new_status,
        ..invoice.clone()
    })
}

/// Rolls up billed totals by calendar quarter of the invoice creation
/// date. Reports what was billed, not what was collected, and always
/// returns all four quarters.
pub fn quarterly_tax_summary(invoices: &Invoices, year: i32) -> Result<TaxSummary, BillingError> {
    let mut summary = TaxSummary {
        year,
        quarters: [QuarterTotal::default(); 4],
        total: Money::ZERO,
    };
    for invoice in invoices.fetch_for_year(year)? {
        let quarter = (invoice.created_at.month0() / 3) as usize;
        summary.quarters[quarter].invoices += 1;
        summary.quarters[quarter].billed += invoice.total;
        summary.total += invoice.total;
    }
    Ok(summary)
}
