//! Committed time entries.
//!
//! Rows are written by the session store on stop or recovery and are
//! otherwise immutable except for invoice claiming, which happens inside
//! the invoice transaction. Every listing is ordered by start time
//! ascending so billing consumes entries oldest-first.

use crate::db::db::Db;
use crate::libs::money::Money;
use anyhow::Result;
use chrono::NaiveDateTime;
use rusqlite::{params_from_iter, Connection, Row, ToSql};

/// SQL projection shared by the plain entry queries
const SELECT_ENTRIES: &str = "
    SELECT e.id, e.client_id, e.start, e.end, e.duration, e.idle, e.invoice_id
    FROM time_entries e";

/// SQL projection joining client names, invoice numbers, and amounts for
/// display; invoiced entries carry their frozen line amount
const SELECT_ENTRIES_DETAILED: &str = "
    SELECT e.id, e.client_id, e.start, e.end, e.duration, e.idle, e.invoice_id,
           c.name, i.number, c.rate, l.amount
    FROM time_entries e
    JOIN clients c ON c.id = e.client_id
    LEFT JOIN invoices i ON i.id = e.invoice_id
    LEFT JOIN invoice_lines l ON l.entry_id = e.id";

/// A committed work session.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub id: i64,
    pub client_id: i64,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    /// Billable seconds.
    pub duration: i64,
    /// Idle seconds, kept for reporting but never billed.
    pub idle: i64,
    pub invoice_id: Option<i64>,
}

/// A time entry with its display context resolved.
#[derive(Debug, Clone)]
pub struct EntryDetails {
    pub entry: TimeEntry,
    pub client_name: String,
    pub invoice_number: Option<String>,
    /// The client's current hourly rate.
    pub client_rate: Money,
    /// The frozen invoice line amount, when the entry has been billed.
    pub line_amount: Option<Money>,
}

impl EntryDetails {
    /// The billed amount for invoiced entries, or a preview at the
    /// client's current rate for everything else.
    pub fn amount(&self) -> Money {
        self.line_amount
            .unwrap_or_else(|| self.client_rate.for_seconds(self.entry.duration))
    }
}

/// Filter for entry listings; empty filter selects everything.
#[derive(Debug, Default, Clone)]
pub struct EntryFilter {
    pub client_id: Option<i64>,
    /// Restrict to finalized entries that no invoice has claimed.
    pub uninvoiced_only: bool,
    /// Half-open start-time range `[from, to)`.
    pub range: Option<(NaiveDateTime, NaiveDateTime)>,
}

/// Data access for the time_entries table.
pub struct Entries {
    /// Active database connection
    pub conn: Connection,
}

impl Entries {
    /// Opens the application database.
    pub fn new() -> Result<Self> {
        let db = Db::new()?;
        Ok(Self { conn: db.conn })
    }

    /// Fetches entries matching `filter`, ordered by start ascending.
    pub fn fetch(&self, filter: &EntryFilter) -> Result<Vec<TimeEntry>> {
        let (query, params) = Self::build_query(SELECT_ENTRIES, filter);
        let mut stmt = self.conn.prepare(&query)?;
        let entries = stmt
            .query_map(params_from_iter(params.iter()), Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Fetches entries with client names and invoice numbers resolved.
    pub fn fetch_detailed(&self, filter: &EntryFilter) -> Result<Vec<EntryDetails>> {
        let (query, params) = Self::build_query(SELECT_ENTRIES_DETAILED, filter);
        let mut stmt = self.conn.prepare(&query)?;
        let entries = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok(EntryDetails {
                    entry: Self::map_row(row)?,
                    client_name: row.get(7)?,
                    invoice_number: row.get(8)?,
                    client_rate: row.get(9)?,
                    line_amount: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Fetches the billable backlog for one client: finalized entries with
    /// no invoice reference, oldest first.
    pub fn fetch_uninvoiced(&self, client_id: i64) -> Result<Vec<TimeEntry>> {
        let filter = EntryFilter {
            client_id: Some(client_id),
            uninvoiced_only: true,
            range: None,
        };
        self.fetch(&filter)
    }

    /// Fetches the given entries by id; missing ids are simply absent from
    /// the result.
    pub fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<TimeEntry>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let query = format!(
            "{} WHERE e.id IN ({}) ORDER BY e.start ASC",
            SELECT_ENTRIES, placeholders
        );
        let mut stmt = self.conn.prepare(&query)?;
        let entries = stmt
            .query_map(params_from_iter(ids.iter()), Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn build_query(base: &str, filter: &EntryFilter) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(client_id) = filter.client_id {
            conditions.push("e.client_id = ?");
            params.push(Box::new(client_id));
        }
        if filter.uninvoiced_only {
            conditions.push("e.invoice_id IS NULL AND e.end IS NOT NULL");
        }
        if let Some((from, to)) = filter.range {
            conditions.push("e.start >= ? AND e.start < ?");
            params.push(Box::new(from));
            params.push(Box::new(to));
        }

        let mut query = String::from(base);
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY e.start ASC");
        (query, params)
    }

    fn map_row(row: &Row) -> rusqlite::Result<TimeEntry> {
        Ok(TimeEntry {
            id: row.get(0)?,
            client_id: row.get(1)?,
            start: row.get(2)?,
            end: row.get(3)?,
            duration: row.get(4)?,
            idle: row.get(5)?,
            invoice_id: row.get(6)?,
        })
    }
}
