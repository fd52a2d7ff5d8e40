//! Invoice management command.
//!
//! `invoice create` turns uninvoiced entries into a numbered invoice,
//! `invoice list` shows all invoices, and `invoice pay` records payments
//! against one. Running `billable invoice` with no subcommand opens an
//! interactive menu.

use crate::{
    db::{
        clients::{Client, Clients},
        entries::{Entries, TimeEntry},
        invoices::{InvoiceStatus, Invoices},
    },
    libs::{
        billing::{self, BillingError},
        config::Config,
        formatter::{format_currency, format_duration},
        messages::Message,
        money::Money,
        view::View,
    },
    msg_error, msg_info, msg_success,
};
use anyhow::Result;
use chrono::Local;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};

#[derive(Debug, Args)]
pub struct InvoiceArgs {
    #[command(subcommand)]
    command: Option<InvoiceCommand>,
}

#[derive(Debug, Subcommand)]
enum InvoiceCommand {
    /// Create an invoice from uninvoiced entries
    Create {
        /// Client to invoice
        client: Option<String>,
        /// Bill every uninvoiced entry without prompting for a selection
        #[arg(short, long)]
        all: bool,
        /// Payment terms in days, overriding the configured default
        #[arg(short, long)]
        terms: Option<u64>,
    },
    /// List invoices
    List {
        /// Only show invoices for this client
        #[arg(short, long)]
        client: Option<String>,
        /// Only show invoices with an outstanding balance
        #[arg(short, long)]
        unpaid: bool,
    },
    /// Record a payment against an invoice
    Pay {
        /// Invoice number, e.g. INV-0042
        number: Option<String>,
        /// Payment amount, e.g. 150.00
        #[arg(short, long)]
        amount: Option<String>,
        /// Pay the outstanding balance in full
        #[arg(short, long)]
        full: bool,
    },
}

pub async fn cmd(args: InvoiceArgs) -> Result<()> {
    match args.command {
        Some(InvoiceCommand::Create { client, all, terms }) => handle_create(client, all, terms),
        Some(InvoiceCommand::List { client, unpaid }) => handle_list(client, unpaid),
        Some(InvoiceCommand::Pay { number, amount, full }) => handle_pay(number, amount, full),
        None => handle_interactive(),
    }
}

fn handle_create(name: Option<String>, all: bool, terms: Option<u64>) -> Result<()> {
    let clients_db = Clients::new()?;
    let client = match resolve_client(&clients_db, name)? {
        Some(client) => client,
        None => return Ok(()),
    };

    let entries_db = Entries::new()?;
    let backlog = billing::select_uninvoiced(&entries_db, client.id)?;
    if backlog.is_empty() {
        msg_info!(Message::NoUninvoicedEntries(client.name));
        return Ok(());
    }

    let selected = if all {
        backlog.iter().map(|entry| entry.id).collect::<Vec<_>>()
    } else {
        pick_entries(&backlog, &client)?
    };
    if selected.is_empty() {
        msg_info!(Message::InvoiceSelectionEmpty);
        return Ok(());
    }

    let total: Money = backlog
        .iter()
        .filter(|entry| selected.contains(&entry.id))
        .map(|entry| client.rate.for_seconds(entry.duration))
        .sum();
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::ConfirmInvoiceCreate(selected.len(), format_currency(total)).to_string())
        .default(true)
        .interact()?;
    if !confirmed {
        msg_info!(Message::OperationCancelled);
        return Ok(());
    }

    let mut billing_config = Config::read()?.billing.unwrap_or_default();
    if let Some(days) = terms {
        billing_config.payment_terms_days = days;
    }
    let mut invoices_db = Invoices::new()?;
    match billing::build_invoice(&mut invoices_db, client.id, &selected, Local::now().naive_local(), &billing_config) {
        Ok(invoice) => {
            msg_success!(Message::InvoiceCreated(invoice.number, format_currency(invoice.total)));
        }
        Err(BillingError::EmptySelection) => msg_error!(Message::InvoiceSelectionEmpty),
        Err(BillingError::ForeignEntry { entry_id, reason }) => {
            msg_error!(Message::EntryNotBillable(format!("entry {} {}", entry_id, reason)));
        }
        Err(error) => return Err(error.into()),
    }
    Ok(())
}

fn handle_list(client: Option<String>, unpaid: bool) -> Result<()> {
    let mut invoices = Invoices::new()?.fetch_all()?;
    if let Some(name) = client {
        invoices.retain(|details| details.client_name == name);
    }
    if unpaid {
        invoices.retain(|details| details.invoice.status != InvoiceStatus::Paid);
    }
    if invoices.is_empty() {
        msg_info!(Message::InvoicesNotFound);
        return Ok(());
    }
    View::invoices(&invoices)?;
    Ok(())
}

fn handle_pay(number: Option<String>, amount: Option<String>, full: bool) -> Result<()> {
    if full && amount.is_some() {
        msg_error!(Message::PayAmountRequired);
        return Ok(());
    }

    let number = match number {
        Some(number) => number,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptInvoiceNumber.to_string())
            .interact_text()?,
    };

    let invoices_db = Invoices::new()?;
    let invoice = match invoices_db.fetch_by_number(&number)? {
        Some(invoice) => invoice,
        None => {
            msg_error!(Message::InvoiceNotFound(number));
            return Ok(());
        }
    };
    if invoice.status == InvoiceStatus::Paid {
        msg_info!(Message::InvoicePaidInFull(invoice.number));
        return Ok(());
    }

    let amount = match (full, amount) {
        (true, _) => invoice.outstanding(),
        (false, Some(raw)) => raw.parse()?,
        (false, None) => prompt_amount(invoice.outstanding())?,
    };

    match billing::record_payment(&invoices_db, &invoice, amount) {
        Ok(updated) => {
            msg_success!(Message::PaymentRecorded(updated.number.clone(), format_currency(amount)));
            if updated.status == InvoiceStatus::Paid {
                msg_info!(Message::InvoicePaidInFull(updated.number));
            }
        }
        Err(BillingError::InvalidAmount { reason }) => msg_error!(Message::InvalidPaymentAmount(reason)),
        Err(error) => return Err(error.into()),
    }
    Ok(())
}

fn handle_interactive() -> Result<()> {
    let actions = ["Create invoice", "List invoices", "Record payment"];
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptClientAction.to_string())
        .items(&actions)
        .default(0)
        .interact()?;
    match choice {
        0 => handle_create(None, false, None),
        1 => handle_list(None, false),
        _ => handle_pay(None, None, false),
    }
}

/// Prompts for a payment amount, defaulting to the outstanding balance.
fn prompt_amount(outstanding: Money) -> Result<Money> {
    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptPaymentAmount.to_string())
        .default(outstanding.to_string())
        .validate_with(|input: &String| -> Result<(), String> {
            input.parse::<Money>().map(|_| ()).map_err(|error| error.to_string())
        })
        .interact_text()?;
    Ok(raw.parse()?)
}

/// Offers the uninvoiced backlog for selection, everything checked by default.
fn pick_entries(backlog: &[TimeEntry], client: &Client) -> Result<Vec<i64>> {
    let labels: Vec<String> = backlog
        .iter()
        .map(|entry| {
            format!(
                "{}  {}  {}",
                entry.start.format("%Y-%m-%d %H:%M"),
                format_duration(entry.duration),
                format_currency(client.rate.for_seconds(entry.duration))
            )
        })
        .collect();
    let defaults = vec![true; labels.len()];
    let chosen = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptSelectEntries.to_string())
        .items(&labels)
        .defaults(&defaults)
        .interact()?;
    Ok(chosen.into_iter().map(|index| backlog[index].id).collect())
}

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
