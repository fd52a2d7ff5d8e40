pub mod client;
pub mod entries;
pub mod export;
pub mod init;
pub mod invoice;
#[cfg(debug_assertions)]
pub mod migrations;
pub mod pause;
pub mod recover;
pub mod resume;
pub mod start;
pub mod status;
pub mod stop;
pub mod tax;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Initialize configuration")]
    Init(init::InitArgs),
    #[command(about = "Manage clients and their rates")]
    Client(client::ClientArgs),
    #[command(about = "Start tracking time for a client")]
    Start(start::StartArgs),
    #[command(about = "Stop the session and record a billable entry")]
    Stop,
    #[command(about = "Pause the running session")]
    Pause,
    #[command(about = "Resume a paused session")]
    Resume,
    #[command(about = "Show the current session")]
    Status,
    #[command(about = "Finalize or discard an interrupted session")]
    Recover(recover::RecoverArgs),
    #[command(about = "List recorded time entries")]
    Entries(entries::EntriesArgs),
    #[command(about = "Create, list, and pay invoices")]
    Invoice(invoice::InvoiceArgs),
    #[command(about = "Quarterly tax summary of billed amounts")]
    Tax(tax::TaxArgs),
    #[command(about = "Export entries, invoices, or tax data")]
    Export(export::ExportArgs),
    #[cfg(debug_assertions)]
    #[command(about = "Database migration management (debug builds only)")]
    Migrations(migrations::MigrationsArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Client(args) => client::cmd(args),
            Commands::Start(args) => start::cmd(args).await,
            Commands::Stop => stop::cmd().await,
            Commands::Pause => pause::cmd().await,
            Commands::Resume => resume::cmd().await,
            Commands::Status => status::cmd().await,
            Commands::Recover(args) => recover::cmd(args).await,
            Commands::Entries(args) => entries::cmd(args).await,
            Commands::Invoice(args) => invoice::cmd(args).await,
            Commands::Tax(args) => tax::cmd(args).await,
            Commands::Export(args) => export::cmd(args).await,
            #[cfg(debug_assertions)]
            Commands::Migrations(args) => migrations::cmd(args),
        }
    }
}
