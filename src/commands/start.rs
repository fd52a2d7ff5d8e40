//! Starts a tracked session for a client.
//!
//! The command runs a preflight in the calling process (client resolution,
//! duplicate-session guard, crash recovery) and then hands the session to a
//! detached tracker process. `--foreground` keeps the tracker attached to the
//! current terminal instead.

use crate::{
    db::{
        clients::{Client, Clients},
        snapshot::Snapshots,
    },
    libs::{config::Config, daemon, engine::TimerEngine, messages::Message},
    msg_error, msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Select};

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Client to bill the session to
    client: Option<String>,

    /// Keep the tracker attached to this terminal
    #[arg(short, long)]
    foreground: bool,

    /// Internal flag used by the respawned tracker process
    #[arg(long, hide = true)]
    daemon_run: bool,
}

pub async fn cmd(args: StartArgs) -> Result<()> {
    // The respawned process skips the preflight; its parent already ran it.
    if args.daemon_run {
        let name = args.client.unwrap_or_default();
        let clients_db = Clients::new()?;
        return match clients_db.fetch_by_name(&name)? {
            Some(client) => daemon::run_with_signal_handling(&client).await,
            None => {
                msg_error!(Message::ClientNotFound(name));
                Ok(())
            }
        };
    }

    let clients_db = Clients::new()?;

    if daemon::is_running() {
        let name = match Snapshots::new()?.fetch()? {
            Some(snapshot) => clients_db
                .fetch_by_id(snapshot.client_id)?
                .map(|client| client.name)
                .unwrap_or_else(|| format!("client #{}", snapshot.client_id)),
            None => "another client".to_string(),
        };
        msg_error!(Message::SessionAlreadyRunning(name));
        return Ok(());
    }

    let client = match resolve_client(&clients_db, args.client)? {
        Some(client) => client,
        None => return Ok(()),
    };
    if client.archived {
        msg_error!(Message::ClientIsArchived(client.name));
        return Ok(());
    }

    let config = Config::read()?;
    let timer_config = config.timer.unwrap_or_default();

    // Finalize any interrupted session before opening a new one.
    {
        let mut engine = TimerEngine::new(Snapshots::new()?, timer_config.clone());
        if let Some(record) = engine.recover()? {
            let name = clients_db
                .fetch_by_id(record.client_id)?
                .map(|client| client.name)
                .unwrap_or_else(|| format!("client #{}", record.client_id));
            msg_info!(Message::RecoveredSession(name, record.end.format("%Y-%m-%d %H:%M").to_string()));
        }
    }

    if args.foreground {
        msg_info!(Message::TrackerStartingForeground);
        daemon::write_own_pid()?;
        return daemon::run_with_signal_handling(&client).await;
    }

    daemon::spawn(&client.name)?;
    msg_success!(Message::SessionStarted(client.name));
    Ok(())
}

/// Resolves the target client from the argument or an interactive picker.
fn resolve_client(clients_db: &Clients, name: Option<String>) -> Result<Option<Client>> {
    if let Some(name) = name {
        return match clients_db.fetch_by_name(&name)? {
            Some(client) => Ok(Some(client)),
            None => {
                msg_error!(Message::ClientNotFound(name));
                Ok(None)
            }
        };
    }

    let clients = clients_db.fetch_all(false)?;
    if clients.is_empty() {
        msg_error!(Message::NoClientsFound);
        return Ok(None);
    }

    let names: Vec<&str> = clients.iter().map(|client| client.name.as_str()).collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptSelectClient.to_string())
        .items(&names)
        .default(0)
        .interact()?;
    Ok(Some(clients[index].clone()))
}
