//! Database layer for the billable application.
//!
//! Provides a complete data persistence layer built on SQLite, offering type-safe
//! database operations for all application entities. Implements a migration system
//! for schema evolution and provides specialized modules for different data types.
//!
//! ## Features
//!
//! - **Core Infrastructure**: Connection management and migrations
//! - **Client Registry**: Billable clients with hourly rates
//! - **Time Tracking**: Finalized time entries and the crash-recovery snapshot
//! - **Invoicing**: Invoices, invoice lines, and the invoice number sequence
//!
//! ## Usage
//!
//! ```rust,no_run
//! use billable::db::clients::Clients;
//! use billable::libs::money::Money;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut clients = Clients::new()?;
//! let id = clients.create("Acme", Money::from_cents(5000), true)?;
//! # Ok(())
//! # }
//! ```
//!
//! All write paths that must be atomic (invoice creation, payment
//! application) run inside explicit transactions. Connections get a busy
//! timeout so the tracker daemon and one-off CLI commands can share the
//! database file without immediate `SQLITE_BUSY` failures.

/// Core database connection and initialization module.
///
/// Provides the fundamental `Db` struct that manages SQLite connections,
/// applies migrations, and ensures proper database configuration.
pub mod db;

/// Database schema migration system.
///
/// Handles versioned schema changes, tracks migration history, and provides
/// development-time migration management commands.
pub mod migrations;

/// Client registry operations.
///
/// Handles CRUD operations for billable clients, including hourly rates,
/// activity-tracking capability, and archival.
pub mod clients;

/// Finalized time entry storage.
///
/// Records completed work sessions with their billable and idle durations,
/// and tracks which invoice each entry was billed on.
pub mod entries;

/// Crash-recovery snapshot persistence.
///
/// Maintains the single-row snapshot of the in-progress session that the
/// timer engine overwrites on every autosave.
pub mod snapshot;

/// Invoice and payment operations.
///
/// Creates invoices atomically, allocates strictly increasing invoice
/// numbers, applies payments, and aggregates quarterly totals.
pub mod invoices;
