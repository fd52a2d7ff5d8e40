//! Client management commands.
//!
//! Clients carry the hourly rate and the per-client activity tracking
//! capability. They are archived rather than deleted so historical entries
//! and invoices stay resolvable.

use crate::{
    db::clients::{Client, Clients},
    libs::{messages::Message, money::Money, view::View},
    msg_error, msg_info, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

#[derive(Debug, Args)]
pub struct ClientArgs {
    #[command(subcommand)]
    command: Option<ClientCommand>,
}

#[derive(Debug, Subcommand)]
enum ClientCommand {
    /// Add a new client
    Add {
        /// Client name (unique identifier)
        #[arg(short, long)]
        name: Option<String>,
        /// Hourly rate, e.g. 95.00
        #[arg(short, long)]
        rate: Option<String>,
        /// Count all session time as active for this client
        #[arg(long)]
        no_activity_tracking: bool,
    },
    /// List clients
    List {
        /// Include archived clients
        #[arg(short, long)]
        all: bool,
    },
    /// Edit an existing client
    Edit {
        /// Client name to edit
        name: Option<String>,
    },
    /// Archive a client, keeping its entries and invoices
    Archive {
        /// Client name to archive
        name: Option<String>,
    },
}

pub fn cmd(args: ClientArgs) -> Result<()> {
    match args.command {
        Some(ClientCommand::Add {
            name,
            rate,
            no_activity_tracking,
        }) => handle_add(name, rate, no_activity_tracking),
        Some(ClientCommand::List { all }) => handle_list(all),
        Some(ClientCommand::Edit { name }) => handle_edit(name),
        Some(ClientCommand::Archive { name }) => handle_archive(name),
        None => handle_interactive(),
    }
}

fn handle_add(name: Option<String>, rate: Option<String>, no_activity_tracking: bool) -> Result<()> {
    let clients_db = Clients::new()?;

    let name: String = match name {
        Some(n) => n,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptClientName.to_string())
            .interact_text()?,
    };

    if clients_db.fetch_by_name(&name)?.is_some() {
        msg_error!(Message::ClientAlreadyExists(name));
        return Ok(());
    }

    let rate_raw: String = match rate {
        Some(r) => r,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptHourlyRate.to_string())
            .validate_with(|input: &String| -> Result<(), String> {
                input.parse::<Money>().map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()?,
    };
    let rate = rate_raw.parse::<Money>()?;

    clients_db.create(&name, rate, !no_activity_tracking)?;

    msg_success!(Message::ClientCreated(name));
    Ok(())
}

fn handle_list(all: bool) -> Result<()> {
    let clients = Clients::new()?.fetch_all(all)?;

    if clients.is_empty() {
        msg_info!(Message::NoClientsFound);
        return Ok(());
    }

    View::clients(&clients)?;
    Ok(())
}

fn handle_edit(name: Option<String>) -> Result<()> {
    let clients_db = Clients::new()?;

    let client = match resolve_client(&clients_db, name, true)? {
        Some(client) => client,
        None => return Ok(()),
    };

    let new_name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptClientName.to_string())
        .default(client.name.clone())
        .interact_text()?;

    let rate_raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptHourlyRate.to_string())
        .default(client.rate.to_string())
        .validate_with(|input: &String| -> Result<(), String> {
            input.parse::<Money>().map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    let track_activity = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptTrackActivity.to_string())
        .default(client.track_activity)
        .interact()?;

    let favorite = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptMarkFavorite.to_string())
        .default(client.favorite)
        .interact()?;

    let updated = Client {
        name: new_name.clone(),
        rate: rate_raw.parse::<Money>()?,
        track_activity,
        favorite,
        ..client
    };
    clients_db.update(&updated)?;

    msg_success!(Message::ClientUpdated(new_name));
    Ok(())
}

fn handle_archive(name: Option<String>) -> Result<()> {
    let clients_db = Clients::new()?;

    let client = match resolve_client(&clients_db, name, false)? {
        Some(client) => client,
        None => return Ok(()),
    };

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::ConfirmArchiveClient(client.name.clone()).to_string())
        .default(false)
        .interact()?;

    if confirmed {
        clients_db.archive(client.id)?;
        msg_success!(Message::ClientArchived(client.name));
    } else {
        msg_info!(Message::OperationCancelled);
    }

    Ok(())
}

fn handle_interactive() -> Result<()> {
    let options = vec!["Add new client", "List clients", "Edit client", "Archive client"];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptClientAction.to_string())
        .items(&options)
        .interact()?;

    match selection {
        0 => handle_add(None, None, false),
        1 => handle_list(false),
        2 => handle_edit(None),
        3 => handle_archive(None),
        _ => Ok(()),
    }
}

/// Resolves a client by name, or lets the user pick one interactively.
fn resolve_client(clients_db: &Clients, name: Option<String>, include_archived: bool) -> Result<Option<Client>> {
    match name {
        Some(name) => match clients_db.fetch_by_name(&name)? {
            Some(client) => Ok(Some(client)),
            None => {
                msg_error!(Message::ClientNotFound(name));
                Ok(None)
            }
        },
        None => {
            let clients = clients_db.fetch_all(include_archived)?;
            if clients.is_empty() {
                msg_info!(Message::NoClientsFound);
                return Ok(None);
            }

            let names: Vec<String> = clients.iter().map(|c| c.name.clone()).collect();
            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptSelectClient.to_string())
                .items(&names)
                .interact()?;

            Ok(Some(clients[selection].clone()))
        }
    }
}
