use crate::db::migrations;
use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use rusqlite::Connection;
use std::time::Duration;

pub const DB_FILE_NAME: &str = "billable.db";

/// The tracker daemon and one-off CLI commands share the database file, so
/// writers wait out short lock contention instead of failing immediately.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the application database and applies any pending migrations.
    pub fn new() -> Result<Db> {
        let db_file_path = DataStorage::new().get_path(DB_FILE_NAME)?;
        let mut conn = Connection::open(db_file_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrations::init_with_migrations(&mut conn)?;

        Ok(Db { conn })
    }

    /// Opens the database without running migrations.
    ///
    /// Used by the migrations command to inspect version state as-is.
    pub fn new_without_migrations() -> Result<Connection> {
        let db_file_path = DataStorage::new().get_path(DB_FILE_NAME)?;
        let conn = Connection::open(db_file_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Ok(conn)
    }
}
