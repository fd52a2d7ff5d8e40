//! Shows the current session, if any.
//!
//! The tracker writes a snapshot at least once per autosave interval, so the
//! snapshot table is an accurate, slightly delayed view of the live session.
//! No IPC with the tracker process is needed.

use crate::{
    db::{clients::Clients, snapshot::Snapshots},
    libs::{daemon, messages::Message, view::View},
    msg_info,
};
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    match Snapshots::new()?.fetch()? {
        Some(snapshot) if daemon::is_running() => {
            let name = Clients::new()?
                .fetch_by_id(snapshot.client_id)?
                .map(|client| client.name)
                .unwrap_or_else(|| format!("client #{}", snapshot.client_id));
            View::status(&name, &snapshot)?;
        }
        Some(snapshot) => {
            msg_info!(Message::InterruptedSessionFound(snapshot.saved_at.format("%Y-%m-%d %H:%M").to_string()));
        }
        None => msg_info!(Message::NoActiveSession),
    }
    Ok(())
}
