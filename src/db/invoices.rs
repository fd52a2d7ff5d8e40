//! Invoice storage and the atomic invoice build.
//!
//! Invoice creation runs as a single immediate transaction: the number is
//! allocated from the invoice_seq counter, every entry is claimed with a
//! guarded update, and the lines and total are written before commit. Any
//! failure rolls the whole build back, leaving no number consumed and no
//! entry claimed.
//!
//! Payments use an optimistic guard on the previously observed paid
//! amount, so two concurrent payments can never both apply against the
//! same balance.

use crate::db::db::Db;
use crate::libs::billing::BillingError;
use crate::libs::money::Money;
use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::fmt;

/// SQL query to advance the invoice number counter
const BUMP_SEQUENCE: &str = "UPDATE invoice_seq SET next = next + 1 WHERE id = 1";

/// SQL query to read the number just allocated
const ALLOCATED_SEQUENCE: &str = "SELECT next - 1 FROM invoice_seq WHERE id = 1";

/// SQL query to read a client's current hourly rate
const SELECT_CLIENT_RATE: &str = "SELECT rate FROM clients WHERE id = ?1";

/// SQL query to insert the invoice header; the total is filled in after
/// the lines are written
const INSERT_INVOICE: &str = "
    INSERT INTO invoices (number, client_id, created_at, due_date, total, paid, status)
    VALUES (?1, ?2, ?3, ?4, 0, 0, 'unpaid')";

/// SQL query to claim an entry for an invoice; the guards reject entries
/// of other clients, already-invoiced entries, and open sessions
const CLAIM_ENTRY: &str = "
    UPDATE time_entries SET invoice_id = ?1
    WHERE id = ?2 AND client_id = ?3 AND invoice_id IS NULL AND end IS NOT NULL";

/// SQL query to inspect an entry whose claim failed
const EXPLAIN_ENTRY: &str = "
    SELECT client_id, invoice_id, end FROM time_entries WHERE id = ?1";

/// SQL query to read an entry's billable seconds
const SELECT_ENTRY_DURATION: &str = "SELECT duration FROM time_entries WHERE id = ?1";

/// SQL query to insert one invoice line
const INSERT_LINE: &str = "
    INSERT INTO invoice_lines (invoice_id, entry_id, duration, rate, amount)
    VALUES (?1, ?2, ?3, ?4, ?5)";

/// SQL query to write the computed total onto the header
const UPDATE_TOTAL: &str = "UPDATE invoices SET total = ?1 WHERE id = ?2";

/// SQL query to apply a payment, guarded on the observed paid amount
const APPLY_PAYMENT: &str = "
    UPDATE invoices SET paid = ?1, status = ?2 WHERE id = ?3 AND paid = ?4";

/// SQL projection shared by the invoice queries
const SELECT_INVOICES: &str = "
    SELECT i.id, i.number, i.client_id, i.created_at, i.due_date, i.total, i.paid, i.status
    FROM invoices i";

/// SQL query to list invoices with client names, in creation order
const SELECT_INVOICES_DETAILED: &str = "
    SELECT i.id, i.number, i.client_id, i.created_at, i.due_date, i.total, i.paid, i.status,
           c.name
    FROM invoices i
    JOIN clients c ON c.id = i.client_id
    ORDER BY i.id ASC";

/// SQL query to list the lines of one invoice
const SELECT_LINES: &str = "
    SELECT id, invoice_id, entry_id, duration, rate, amount
    FROM invoice_lines WHERE invoice_id = ?1 ORDER BY id ASC";

/// Payment status, advancing in one direction only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Paid => "paid",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "paid" => InvoiceStatus::Paid,
            "partially_paid" => InvoiceStatus::PartiallyPaid,
            _ => InvoiceStatus::Unpaid,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::Unpaid => f.write_str("unpaid"),
            InvoiceStatus::PartiallyPaid => f.write_str("partially paid"),
            InvoiceStatus::Paid => f.write_str("paid"),
        }
    }
}

/// An invoice header.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: i64,
    /// Sequential number, e.g. `INV-0042`.
    pub number: String,
    pub client_id: i64,
    pub created_at: NaiveDateTime,
    pub due_date: Option<NaiveDate>,
    pub total: Money,
    pub paid: Money,
    pub status: InvoiceStatus,
}

impl Invoice {
    /// The amount still owed.
    pub fn outstanding(&self) -> Money {
        self.total - self.paid
    }
}

/// One line of an invoice, frozen at the rate it was billed at.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub id: i64,
    pub invoice_id: i64,
    pub entry_id: i64,
    /// Billable seconds.
    pub duration: i64,
    pub rate: Money,
    pub amount: Money,
}

/// An invoice with its display context resolved.
#[derive(Debug, Clone)]
pub struct InvoiceDetails {
    pub invoice: Invoice,
    pub client_name: String,
}

/// Data access for the invoices, invoice_lines and invoice_seq tables.
pub struct Invoices {
    /// Active database connection
    pub conn: Connection,
}

impl Invoices {
    /// Opens the application database.
    pub fn new() -> Result<Self> {
        let db = Db::new()?;
        Ok(Self { conn: db.conn })
    }

    /// Builds an invoice over `entry_ids` as one atomic unit.
    ///
    /// Allocates the next sequential number, claims every entry, prices
    /// each line at the client's current rate, and writes the total. Any
    /// rejected entry rolls back the whole build, the counter included,
    /// so numbers stay consecutive across failures.
    pub fn create(
        &mut self,
        client_id: i64,
        entry_ids: &[i64],
        created_at: NaiveDateTime,
        due_date: Option<NaiveDate>,
    ) -> Result<Invoice, BillingError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let rate: Money = tx
            .query_row(SELECT_CLIENT_RATE, [client_id], |row| row.get(0))
            .optional()?
            .ok_or_else(|| anyhow!("client {} not found", client_id))?;

        tx.execute(BUMP_SEQUENCE, [])?;
        let sequence: i64 = tx.query_row(ALLOCATED_SEQUENCE, [], |row| row.get(0))?;
        let number = format!("INV-{:04}", sequence);

        tx.execute(
            INSERT_INVOICE,
            params![number, client_id, created_at, due_date],
        )?;
        let invoice_id = tx.last_insert_rowid();

        let mut total = Money::ZERO;
        for &entry_id in entry_ids {
            let claimed = tx.execute(CLAIM_ENTRY, params![invoice_id, entry_id, client_id])?;
            if claimed != 1 {
                let reason = Self::claim_failure_reason(&tx, entry_id, client_id)?;
                return Err(BillingError::ForeignEntry { entry_id, reason });
            }
            let duration: i64 =
                tx.query_row(SELECT_ENTRY_DURATION, [entry_id], |row| row.get(0))?;
            let amount = rate.for_seconds(duration);
            tx.execute(
                INSERT_LINE,
                params![invoice_id, entry_id, duration, rate, amount],
            )?;
            total += amount;
        }

        tx.execute(UPDATE_TOTAL, params![total, invoice_id])?;
        tx.commit()?;

        Ok(Invoice {
            id: invoice_id,
            number,
            client_id,
            created_at,
            due_date,
            total,
            paid: Money::ZERO,
            status: InvoiceStatus::Unpaid,
        })
    }

    /// Applies a payment if the invoice's paid amount is still
    /// `expected_paid`. Returns false when a concurrent payment got there
    /// first; the caller should re-read and retry.
    pub fn apply_payment(
        &self,
        invoice_id: i64,
        new_paid: Money,
        new_status: InvoiceStatus,
        expected_paid: Money,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            APPLY_PAYMENT,
            params![new_paid, new_status.as_str(), invoice_id, expected_paid],
        )?;
        Ok(changed == 1)
    }

    /// Fetches an invoice by its number.
    pub fn fetch_by_number(&self, number: &str) -> Result<Option<Invoice>> {
        let query = format!("{} WHERE i.number = ?1", SELECT_INVOICES);
        let invoice = self
            .conn
            .query_row(&query, [number], Self::map_row)
            .optional()?;
        Ok(invoice)
    }

    /// Lists all invoices with client names, oldest first.
    pub fn fetch_all(&self) -> Result<Vec<InvoiceDetails>> {
        let mut stmt = self.conn.prepare(SELECT_INVOICES_DETAILED)?;
        let invoices = stmt
            .query_map([], |row| {
                Ok(InvoiceDetails {
                    invoice: Self::map_row(row)?,
                    client_name: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(invoices)
    }

    /// Lists the lines of one invoice.
    pub fn fetch_lines(&self, invoice_id: i64) -> Result<Vec<InvoiceLine>> {
        let mut stmt = self.conn.prepare(SELECT_LINES)?;
        let lines = stmt
            .query_map([invoice_id], |row| {
                Ok(InvoiceLine {
                    id: row.get(0)?,
                    invoice_id: row.get(1)?,
                    entry_id: row.get(2)?,
                    duration: row.get(3)?,
                    rate: row.get(4)?,
                    amount: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    /// Lists invoices created within the given calendar year.
    pub fn fetch_for_year(&self, year: i32) -> Result<Vec<Invoice>> {
        let from = year_start(year)?;
        let to = year_start(year + 1)?;
        let query = format!(
            "{} WHERE i.created_at >= ?1 AND i.created_at < ?2 ORDER BY i.id ASC",
            SELECT_INVOICES
        );
        let mut stmt = self.conn.prepare(&query)?;
        let invoices = stmt
            .query_map(params![from, to], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(invoices)
    }

    /// Explains why [`CLAIM_ENTRY`] matched nothing for `entry_id`.
    fn claim_failure_reason(
        tx: &Transaction,
        entry_id: i64,
        client_id: i64,
    ) -> Result<String, rusqlite::Error> {
        let row = tx
            .query_row(EXPLAIN_ENTRY, [entry_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<NaiveDateTime>>(2)?,
                ))
            })
            .optional()?;
        let reason = match row {
            None => "not found".to_string(),
            Some((owner, _, _)) if owner != client_id => "belongs to another client".to_string(),
            Some((_, Some(_), _)) => "already invoiced".to_string(),
            Some((_, _, None)) => "not finalized".to_string(),
            Some(_) => "not billable".to_string(),
        };
        Ok(reason)
    }

    fn map_row(row: &Row) -> rusqlite::Result<Invoice> {
        let status: String = row.get(7)?;
        Ok(Invoice {
            id: row.get(0)?,
            number: row.get(1)?,
            client_id: row.get(2)?,
            created_at: row.get(3)?,
            due_date: row.get(4)?,
            total: row.get(5)?,
            paid: row.get(6)?,
            status: InvoiceStatus::parse(&status),
        })
    }
}

fn year_start(year: i32) -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow!("invalid year {}", year))
}
