//! Formatting utilities for durations and monetary amounts.
//!
//! This module converts raw durations and cent amounts into the string
//! representations used throughout the application. Table views, status
//! output, and data export all format through these functions so the same
//! value always renders the same way.
//!
//! ## Format Specifications
//!
//! ### Duration Format
//! Durations follow the "HH:MM:SS" pattern:
//! - Each component is zero-padded to 2 digits
//! - Negative durations are treated as "00:00:00"
//!
//! ### Hours Format
//! Billable durations render as decimal hours with two digits, e.g.
//! "2.50 hrs". This matches how the amounts on invoice lines are computed.
//!
//! ### Currency Format
//! Amounts render with a dollar sign and thousands separators, e.g.
//! "$1,234.56".
//!
//! ## Examples
//!
//! ```rust
//! use billable::libs::formatter::{format_currency, format_duration, format_hours};
//! use billable::libs::money::Money;
//!
//! let formatted = format_duration(9000);
//! assert_eq!(formatted, "02:30:00");
//!
//! assert_eq!(format_hours(9000), "2.50 hrs");
//! assert_eq!(format_currency(Money::from_cents(123_456)), "$1,234.56");
//! ```

use crate::db::entries::EntryDetails;
use crate::libs::money::Money;
use serde::{Deserialize, Serialize};

/// A time entry pre-formatted for display and export.
///
/// Holds string representations of entry fields, suitable for direct use
/// with table rendering and data export. Formatting once up front keeps the
/// console view, CSV rows, and JSON output identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattedEntry {
    /// Database identifier of the entry.
    pub id: i64,

    /// Name of the client the entry belongs to.
    pub client: String,

    /// Formatted start timestamp (e.g., "2025-08-12 09:00").
    pub start: String,

    /// Formatted end timestamp, or "-" for an entry still in progress.
    pub end: String,

    /// Formatted billable duration (e.g., "02:30:00").
    pub duration: String,

    /// Formatted line amount at the client's current rate.
    pub amount: String,

    /// Invoice number the entry was billed on, or "-" if uninvoiced.
    pub invoice: String,
}

/// Formats a duration in seconds as a "HH:MM:SS" string.
///
/// Negative inputs render as "00:00:00". Hours grow beyond two digits for
/// durations past 100 hours rather than wrapping.
///
/// # Examples
///
/// ```rust
/// use billable::libs::formatter::format_duration;
///
/// assert_eq!(format_duration(8 * 3600), "08:00:00");
/// assert_eq!(format_duration(90 * 60), "01:30:00");
/// assert_eq!(format_duration(45), "00:00:45");
/// assert_eq!(format_duration(0), "00:00:00");
/// assert_eq!(format_duration(-30), "00:00:00");
/// ```
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Formats a duration in seconds as decimal hours, e.g. "2.50 hrs".
///
/// # Examples
///
/// ```rust
/// use billable::libs::formatter::format_hours;
///
/// assert_eq!(format_hours(3600), "1.00 hrs");
/// assert_eq!(format_hours(5400), "1.50 hrs");
/// assert_eq!(format_hours(0), "0.00 hrs");
/// ```
pub fn format_hours(seconds: i64) -> String {
    let hours = seconds.max(0) as f64 / 3600.0;
    format!("{:.2} hrs", hours)
}

/// Formats a monetary amount with a dollar sign and thousands separators.
///
/// # Examples
///
/// ```rust
/// use billable::libs::formatter::format_currency;
/// use billable::libs::money::Money;
///
/// assert_eq!(format_currency(Money::from_cents(5000)), "$50.00");
/// assert_eq!(format_currency(Money::from_cents(123_456_789)), "$1,234,567.89");
/// assert_eq!(format_currency(Money::ZERO), "$0.00");
/// ```
pub fn format_currency(amount: Money) -> String {
    let sign = if amount.cents() < 0 { "-" } else { "" };
    let cents = amount.cents().abs();
    let frac = cents % 100;
    let mut whole = (cents / 100).to_string();
    let mut idx = whole.len();
    while idx > 3 {
        idx -= 3;
        whole.insert(idx, ',');
    }
    format!("{}${}.{:02}", sign, whole, frac)
}

/// Converts entry rows into their display representation.
pub fn format_entries(details: &[EntryDetails]) -> Vec<FormattedEntry> {
    details
        .iter()
        .map(|d| FormattedEntry {
            id: d.entry.id,
            client: d.client_name.clone(),
            start: d.entry.start.format("%Y-%m-%d %H:%M").to_string(),
            end: d
                .entry
                .end
                .map(|e| e.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            duration: format_duration(d.entry.duration),
            amount: format_currency(d.amount()),
            invoice: d.invoice_number.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}
