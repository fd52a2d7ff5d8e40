//! Stops the active session and commits it as a billable entry.
//!
//! The command asks the tracker process to finalize the session and waits for
//! it to exit. The tracker owns the session, so the entry write and snapshot
//! cleanup happen there; this side only reports the outcome.

use crate::{
    db::{
        entries::{Entries, EntryFilter},
        snapshot::Snapshots,
    },
    libs::{
        daemon::{self, ControlCommand},
        formatter::format_duration,
        messages::Message,
    },
    msg_error, msg_info, msg_success, msg_warning,
};
use anyhow::Result;
use std::time::Duration;

const SHUTDOWN_WAIT: Duration = Duration::from_secs(5);

pub async fn cmd() -> Result<()> {
    let snapshots = Snapshots::new()?;

    if !daemon::is_running() {
        match snapshots.fetch()? {
            Some(snapshot) => {
                msg_info!(Message::InterruptedSessionFound(snapshot.saved_at.format("%Y-%m-%d %H:%M").to_string()));
            }
            None => msg_error!(Message::NoActiveSession),
        }
        return Ok(());
    }

    daemon::send_control(ControlCommand::Stop)?;
    msg_info!(Message::StopRequestSent);

    if !daemon::wait_for_exit(SHUTDOWN_WAIT) {
        if let Some(pid) = daemon::read_pid()? {
            msg_warning!(Message::TrackerFailedToStop(pid));
        }
        daemon::stop_tracker()?;
        return Ok(());
    }

    // A leftover snapshot means the tracker exited without committing.
    if snapshots.fetch()?.is_some() {
        msg_warning!(Message::InterruptedSessionFound("just now".to_string()));
        return Ok(());
    }

    let entries = Entries::new()?.fetch(&EntryFilter::default())?;
    if let Some(entry) = entries.last() {
        msg_success!(Message::SessionStopped(format_duration(entry.duration), format_duration(entry.idle)));
    }
    Ok(())
}
