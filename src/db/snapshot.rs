//! Crash-recovery snapshot persistence.
//!
//! The session_snapshot table holds at most one row, rewritten in place on
//! every autosave. Finalization inserts the committed time entry and clears
//! the snapshot in a single transaction; the `UNIQUE(client_id, start)`
//! constraint on time_entries makes a retried finalization harmless.

use crate::db::db::Db;
use crate::libs::engine::{SessionRecord, SessionSnapshot, SessionStore, TimerPhase};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

/// SQL query to rewrite the single snapshot row in place
const SAVE_SNAPSHOT: &str = "
    INSERT OR REPLACE INTO session_snapshot
    (id, client_id, start, duration, idle, phase, saved_at)
    VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)";

/// SQL query to read the snapshot row
const SELECT_SNAPSHOT: &str = "
    SELECT client_id, start, duration, idle, phase, saved_at
    FROM session_snapshot WHERE id = 1";

/// SQL query to remove the snapshot row
const CLEAR_SNAPSHOT: &str = "DELETE FROM session_snapshot WHERE id = 1";

/// SQL query to commit a finalized session as a time entry; the unique
/// (client_id, start) pair makes replays no-ops
const INSERT_ENTRY: &str = "
    INSERT OR IGNORE INTO time_entries (client_id, start, end, duration, idle)
    VALUES (?1, ?2, ?3, ?4, ?5)";

/// SQLite-backed store for the timer engine.
pub struct Snapshots {
    /// Active database connection
    pub conn: Connection,
}

impl Snapshots {
    /// Opens the application database.
    pub fn new() -> Result<Self> {
        let db = Db::new()?;
        Ok(Self { conn: db.conn })
    }

    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        self.conn.execute(
            SAVE_SNAPSHOT,
            params![
                snapshot.client_id,
                snapshot.start,
                snapshot.duration,
                snapshot.idle,
                snapshot.phase.as_str(),
                snapshot.saved_at
            ],
        )?;
        Ok(())
    }

    pub fn fetch(&self) -> Result<Option<SessionSnapshot>> {
        let snapshot = self
            .conn
            .query_row(SELECT_SNAPSHOT, [], |row| {
                let phase: String = row.get(4)?;
                Ok(SessionSnapshot {
                    client_id: row.get(0)?,
                    start: row.get(1)?,
                    duration: row.get(2)?,
                    idle: row.get(3)?,
                    phase: match phase.as_str() {
                        "paused" => TimerPhase::Paused,
                        _ => TimerPhase::Running,
                    },
                    saved_at: row.get(5)?,
                })
            })
            .optional()?;
        Ok(snapshot)
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute(CLEAR_SNAPSHOT, [])?;
        Ok(())
    }

    /// Commits `record` as a time entry and clears the snapshot in one
    /// transaction, so the snapshot can never survive a committed entry.
    pub fn finalize(&mut self, record: &SessionRecord) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            INSERT_ENTRY,
            params![
                record.client_id,
                record.start,
                record.end,
                record.duration,
                record.idle
            ],
        )?;
        tx.execute(CLEAR_SNAPSHOT, [])?;
        tx.commit()?;
        Ok(())
    }
}

impl SessionStore for Snapshots {
    fn save_snapshot(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        self.save(snapshot)
    }

    fn load_snapshot(&mut self) -> Result<Option<SessionSnapshot>> {
        self.fetch()
    }

    fn discard_snapshot(&mut self) -> Result<()> {
        self.clear()
    }

    fn finalize_session(&mut self, record: &SessionRecord) -> Result<()> {
        self.finalize(record)
    }
}
