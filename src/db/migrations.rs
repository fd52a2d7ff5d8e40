//! Database schema migration management and versioning system.
//!
//! Provides a migration framework for evolving the database schema over time
//! while maintaining data integrity and consistency.
//!
//! ## Features
//!
//! - **Version Tracking**: Maintains precise records of applied migrations
//! - **Automatic Application**: Runs pending migrations during database initialization
//! - **Transaction Safety**: All migrations run within database transactions
//! - **Rollback Support**: Development-time rollback capabilities (debug builds only)
//! - **History Tracking**: Complete audit trail of schema changes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use billable::db::migrations::{init_with_migrations, get_db_version};
//! use rusqlite::Connection;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut conn = Connection::open("billable.db")?;
//! init_with_migrations(&mut conn)?;
//! let version = get_db_version(&conn)?;
//! # Ok(())
//! # }
//! ```

use crate::libs::messages::Message;
use crate::{msg_debug, msg_error, msg_info, msg_success};
use anyhow::Result;
use rusqlite::{params, Connection, Transaction};

/// SQL schema for the migrations tracking table.
///
/// This table maintains a complete record of all applied migrations,
/// enabling version tracking and providing an audit trail of schema changes.
/// Each migration is recorded with its version, name, and application timestamp.
const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

/// Represents a single database migration with execution logic.
///
/// Each migration contains the information needed to apply a specific
/// schema change, including version tracking and the transformation function.
/// Migrations are designed to be immutable and deterministic.
#[derive(Debug, Clone)]
struct Migration {
    /// Unique version number for ordering and tracking
    version: u32,
    /// Human-readable name describing the migration's purpose
    name: &'static str,
    /// Function that applies the schema changes within a transaction
    up: fn(&Transaction) -> Result<()>,
}

/// Central migration system manager that orchestrates schema evolution.
///
/// The `MigrationManager` maintains the complete registry of available migrations
/// and provides the logic for applying them in the correct order. It ensures
/// that migrations are applied atomically and tracks their completion status.
///
/// The manager is intended for single-threaded use during application startup.
pub struct MigrationManager {
    /// Ordered list of all available migrations
    migrations: Vec<Migration>,
}

impl MigrationManager {
    /// Creates a new migration manager with all registered migrations.
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };

        // Register all migrations in chronological order
        manager.register_migrations();
        manager
    }

    /// Registers all database migrations in chronological order.
    ///
    /// This method defines the complete schema evolution history by registering
    /// each migration version with its transformation logic. Migrations must
    /// be registered in sequential version order to ensure correct application.
    fn register_migrations(&mut self) {
        // Version 1: Core time tracking tables
        // Clients, finalized time entries, and the single-row session snapshot
        self.add_migration(1, "create_core_tables", |tx| {
            // Client registry with hourly rates in cents
            tx.execute(
                "CREATE TABLE IF NOT EXISTS clients (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        rate INTEGER NOT NULL,
        track_activity BOOLEAN NOT NULL ON CONFLICT REPLACE DEFAULT TRUE,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
                [],
            )?;

            // Finalized work sessions; duration and idle are in seconds.
            // invoice_id stays a plain column because the invoices table
            // arrives in a later migration.
            tx.execute(
                "CREATE TABLE IF NOT EXISTS time_entries (
        id INTEGER PRIMARY KEY,
        client_id INTEGER NOT NULL,
        start TIMESTAMP NOT NULL,
        end TIMESTAMP,
        duration INTEGER NOT NULL ON CONFLICT REPLACE DEFAULT 0,
        idle INTEGER NOT NULL ON CONFLICT REPLACE DEFAULT 0,
        invoice_id INTEGER,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (client_id, start),
        FOREIGN KEY (client_id) REFERENCES clients(id)
    )",
                [],
            )?;

            // Crash-recovery snapshot; the CHECK keeps it a single row
            tx.execute(
                "CREATE TABLE IF NOT EXISTS session_snapshot (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        client_id INTEGER NOT NULL,
        start TIMESTAMP NOT NULL,
        duration INTEGER NOT NULL,
        idle INTEGER NOT NULL,
        phase TEXT NOT NULL,
        saved_at TIMESTAMP NOT NULL
    )",
                [],
            )?;

            // Index entries by client for per-client listings
            tx.execute("CREATE INDEX IF NOT EXISTS idx_entries_client ON time_entries(client_id)", [])?;
            // Index entries by start time for chronological queries
            tx.execute("CREATE INDEX IF NOT EXISTS idx_entries_start ON time_entries(start)", [])?;
            // Index entries by invoice for uninvoiced lookups
            tx.execute("CREATE INDEX IF NOT EXISTS idx_entries_invoice ON time_entries(invoice_id)", [])?;

            Ok(())
        });

        // Version 2: Invoicing tables
        // Invoices with payment state plus per-entry invoice lines
        self.add_migration(2, "add_invoicing_tables", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS invoices (
                    id INTEGER PRIMARY KEY,
                    number TEXT NOT NULL UNIQUE,
                    client_id INTEGER NOT NULL,
                    created_at TIMESTAMP NOT NULL,
                    due_date DATE,
                    total INTEGER NOT NULL,
                    paid INTEGER NOT NULL DEFAULT 0,
                    status TEXT NOT NULL DEFAULT 'unpaid',
                    FOREIGN KEY (client_id) REFERENCES clients(id)
                )",
                [],
            )?;

            // Lines freeze the rate in effect when the invoice was created.
            // The UNIQUE on entry_id blocks double billing at the schema level.
            tx.execute(
                "CREATE TABLE IF NOT EXISTS invoice_lines (
                    id INTEGER PRIMARY KEY,
                    invoice_id INTEGER NOT NULL,
                    entry_id INTEGER NOT NULL UNIQUE,
                    duration INTEGER NOT NULL,
                    rate INTEGER NOT NULL,
                    amount INTEGER NOT NULL,
                    FOREIGN KEY (invoice_id) REFERENCES invoices(id) ON DELETE CASCADE
                )",
                [],
            )?;

            tx.execute("CREATE INDEX IF NOT EXISTS idx_invoices_client ON invoices(client_id)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_invoices_created ON invoices(created_at)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_lines_invoice ON invoice_lines(invoice_id)", [])?;
            Ok(())
        });

        // Version 3: Invoice number sequence
        // A dedicated counter row so numbers stay strictly increasing even
        // after invoice deletion; seeded from the highest existing number
        self.add_migration(3, "add_invoice_sequence", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS invoice_seq (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    next INTEGER NOT NULL
                )",
                [],
            )?;

            tx.execute(
                "INSERT OR IGNORE INTO invoice_seq (id, next)
                 VALUES (1, COALESCE((SELECT MAX(CAST(SUBSTR(number, 5) AS INTEGER)) FROM invoices), 0) + 1)",
                [],
            )?;
            Ok(())
        });

        // Version 4: Client flags for favorites and archival
        // Archived clients keep their history but reject new sessions
        self.add_migration(4, "add_client_flags", |tx| {
            tx.execute("ALTER TABLE clients ADD COLUMN favorite BOOLEAN NOT NULL DEFAULT FALSE", [])?;
            tx.execute("ALTER TABLE clients ADD COLUMN archived BOOLEAN NOT NULL DEFAULT FALSE", [])?;
            Ok(())
        });
    }

    /// Registers a single migration in the migration system.
    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    /// Executes all pending migrations in the correct order.
    ///
    /// This method performs the complete migration process:
    /// 1. Creates the migrations tracking table if needed
    /// 2. Determines current database version
    /// 3. Identifies pending migrations
    /// 4. Applies each migration within a transaction
    /// 5. Records successful migrations in the tracking table
    ///
    /// All pending migrations run inside one transaction, so a failure
    /// rolls the schema back to its previous state.
    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        // Initialize the migrations tracking table
        conn.execute(MIGRATIONS_TABLE, [])?;

        // Determine the current schema version
        let current_version = self.get_current_version(conn)?;

        // Find all migrations that haven't been applied yet
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        // Exit early if no migrations are needed
        if pending.is_empty() {
            msg_debug!("Database is up to date");
            return Ok(());
        }

        // Notify user about pending migrations
        msg_info!(Message::MigrationsFound(pending.len()));

        // Execute all pending migrations within a single transaction
        let tx = conn.transaction()?;

        for migration in pending {
            msg_info!(Message::RunningMigration(migration.version, migration.name.to_string()));

            match (migration.up)(&tx) {
                Ok(()) => {
                    // Record successful migration in tracking table
                    tx.execute(
                        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                        params![migration.version, migration.name],
                    )?;
                    msg_success!(Message::MigrationCompleted(migration.version));
                }
                Err(e) => {
                    // Log migration failure and propagate error
                    msg_error!(Message::MigrationFailed(migration.version, e.to_string()));
                    return Err(e);
                }
            }
        }

        // Commit all successful migrations
        tx.commit()?;
        msg_success!(Message::AllMigrationsCompleted);

        Ok(())
    }

    /// Retrieves the current database schema version.
    ///
    /// Queries the migrations table for the highest applied version number,
    /// treating a database with no applied migrations as version 0.
    fn get_current_version(&self, conn: &Connection) -> Result<u32> {
        let version: Option<u32> = conn.query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0)).unwrap_or(Some(0));

        Ok(version.unwrap_or(0))
    }

    /// Checks if a specific migration version has been applied.
    pub fn is_migration_applied(&self, conn: &Connection, version: u32) -> Result<bool> {
        let count: i32 = conn.query_row("SELECT COUNT(*) FROM migrations WHERE version = ?1", params![version], |row| row.get(0))?;

        Ok(count > 0)
    }

    /// Retrieves the complete migration history with timestamps.
    ///
    /// Returns (version, name, applied_at) tuples for each applied migration,
    /// ordered by version number. Useful for auditing schema evolution.
    pub fn get_migration_history(&self, conn: &Connection) -> Result<Vec<(u32, String, String)>> {
        let mut stmt = conn.prepare("SELECT version, name, applied_at FROM migrations ORDER BY version")?;

        let history = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(history)
    }

    /// Rolls back migrations to a specific target version (debug builds only).
    ///
    /// This is a simplified rollback that removes migration records without
    /// reversing schema changes (there are no down() functions). Primarily
    /// useful for development and testing scenarios.
    #[cfg(debug_assertions)]
    pub fn rollback_to(&self, conn: &mut Connection, target_version: u32) -> Result<()> {
        let current_version = self.get_current_version(conn)?;

        if target_version >= current_version {
            msg_info!(Message::NothingToRollback);
            return Ok(());
        }

        msg_info!(Message::RollingBack(current_version, target_version));

        // Remove migration records beyond the target version
        conn.execute("DELETE FROM migrations WHERE version > ?1", params![target_version])?;

        msg_success!(Message::RollbackCompleted(target_version));
        Ok(())
    }
}

/// Initializes a database connection with all pending migrations applied.
///
/// This convenience function creates a migration manager and applies all
/// pending migrations to the provided connection. It's the recommended
/// way to ensure a database is up to date with the latest schema.
pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    let manager = MigrationManager::new();
    manager.run_migrations(conn)?;
    Ok(())
}

/// Retrieves the current database schema version.
pub fn get_db_version(conn: &Connection) -> Result<u32> {
    let manager = MigrationManager::new();
    manager.get_current_version(conn)
}

/// Checks if the database requires migration to the latest schema version.
pub fn needs_migration(conn: &Connection) -> Result<bool> {
    let manager = MigrationManager::new();
    let current = manager.get_current_version(conn)?;
    let latest = manager.migrations.last().map(|m| m.version).unwrap_or(0);
    Ok(current < latest)
}
