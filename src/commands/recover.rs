//! Finalizes or discards an interrupted session.
//!
//! Recovery also runs automatically before `start`; this command exists so an
//! interrupted session can be dealt with without opening a new one.

use crate::{
    db::{clients::Clients, snapshot::Snapshots},
    libs::{config::Config, daemon, engine::TimerEngine, messages::Message},
    msg_error, msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct RecoverArgs {
    /// Drop the interrupted session instead of committing it
    #[arg(long)]
    discard: bool,
}

pub async fn cmd(args: RecoverArgs) -> Result<()> {
    if daemon::is_running() {
        // A live tracker owns the snapshot, so there is nothing stale to fix.
        msg_error!(Message::TrackerAlreadyRunning(daemon::read_pid()?.unwrap_or_default()));
        return Ok(());
    }

    let config = Config::read()?;
    let mut engine = TimerEngine::new(Snapshots::new()?, config.timer.unwrap_or_default());

    if args.discard {
        if engine.discard_recovery()? {
            msg_success!(Message::RecoveryDiscarded);
        } else {
            msg_info!(Message::RecoveryNothingToDo);
        }
        return Ok(());
    }

    match engine.recover()? {
        Some(record) => {
            let name = Clients::new()?
                .fetch_by_id(record.client_id)?
                .map(|client| client.name)
                .unwrap_or_else(|| format!("client #{}", record.client_id));
            msg_success!(Message::RecoveredSession(name, record.end.format("%Y-%m-%d %H:%M").to_string()));
        }
        None => msg_info!(Message::RecoveryNothingToDo),
    }
    Ok(())
}
