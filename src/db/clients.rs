//! Client records and billing rates.
//!
//! Clients are never deleted; archiving hides them from pickers while
//! keeping their entries and invoices intact. The hourly rate is stored in
//! cents and applies to future invoices only, existing invoice lines keep
//! the rate they were billed at.

use crate::db::db::Db;
use crate::libs::money::Money;
use anyhow::Result;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// SQL query to insert a new client
const INSERT_CLIENT: &str = "
    INSERT INTO clients (name, rate, track_activity) VALUES (?1, ?2, ?3)";

/// SQL query to fetch a client by primary key
const SELECT_CLIENT_BY_ID: &str = "
    SELECT id, name, rate, track_activity, favorite, archived, created_at
    FROM clients WHERE id = ?1";

/// SQL query to fetch a client by its unique name
const SELECT_CLIENT_BY_NAME: &str = "
    SELECT id, name, rate, track_activity, favorite, archived, created_at
    FROM clients WHERE name = ?1";

/// SQL query to list clients, favorites first
const SELECT_CLIENTS: &str = "
    SELECT id, name, rate, track_activity, favorite, archived, created_at
    FROM clients ORDER BY favorite DESC, name ASC";

/// SQL query to list active clients only, favorites first
const SELECT_ACTIVE_CLIENTS: &str = "
    SELECT id, name, rate, track_activity, favorite, archived, created_at
    FROM clients WHERE archived = FALSE ORDER BY favorite DESC, name ASC";

/// SQL query to update an editable client field set
const UPDATE_CLIENT: &str = "
    UPDATE clients SET name = ?1, rate = ?2, track_activity = ?3, favorite = ?4
    WHERE id = ?5";

/// SQL query to archive a client
const ARCHIVE_CLIENT: &str = "UPDATE clients SET archived = TRUE WHERE id = ?1";

/// A billable client.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: i64,
    pub name: String,
    /// Hourly rate in cents.
    pub rate: Money,
    /// When false, sessions for this client never auto-pause and all
    /// elapsed time counts as active.
    pub track_activity: bool,
    pub favorite: bool,
    pub archived: bool,
    pub created_at: NaiveDateTime,
}

/// Data access for the clients table.
pub struct Clients {
    /// Active database connection
    pub conn: Connection,
}

impl Clients {
    /// Opens the application database.
    pub fn new() -> Result<Self> {
        let db = Db::new()?;
        Ok(Self { conn: db.conn })
    }

    /// Inserts a new client and returns its id.
    pub fn create(&self, name: &str, rate: Money, track_activity: bool) -> Result<i64> {
        self.conn
            .execute(INSERT_CLIENT, params![name, rate, track_activity])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetches a client by id.
    pub fn fetch_by_id(&self, id: i64) -> Result<Option<Client>> {
        let client = self
            .conn
            .query_row(SELECT_CLIENT_BY_ID, [id], Self::map_row)
            .optional()?;
        Ok(client)
    }

    /// Fetches a client by its unique name.
    pub fn fetch_by_name(&self, name: &str) -> Result<Option<Client>> {
        let client = self
            .conn
            .query_row(SELECT_CLIENT_BY_NAME, [name], Self::map_row)
            .optional()?;
        Ok(client)
    }

    /// Lists clients, favorites first then alphabetical.
    ///
    /// Archived clients are included only when `include_archived` is set.
    pub fn fetch_all(&self, include_archived: bool) -> Result<Vec<Client>> {
        let query = if include_archived {
            SELECT_CLIENTS
        } else {
            SELECT_ACTIVE_CLIENTS
        };
        let mut stmt = self.conn.prepare(query)?;
        let clients = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(clients)
    }

    /// Writes back the editable fields of `client`.
    pub fn update(&self, client: &Client) -> Result<()> {
        self.conn.execute(
            UPDATE_CLIENT,
            params![
                client.name,
                client.rate,
                client.track_activity,
                client.favorite,
                client.id
            ],
        )?;
        Ok(())
    }

    /// Archives a client, hiding it from pickers without deleting history.
    pub fn archive(&self, id: i64) -> Result<()> {
        self.conn.execute(ARCHIVE_CLIENT, [id])?;
        Ok(())
    }

    fn map_row(row: &Row) -> rusqlite::Result<Client> {
        Ok(Client {
            id: row.get(0)?,
            name: row.get(1)?,
            rate: row.get(2)?,
            track_activity: row.get(3)?,
            favorite: row.get(4)?,
            archived: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
