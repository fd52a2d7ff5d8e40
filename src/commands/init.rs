//! Application configuration initialization command.
//!
//! Provides an interactive setup wizard that guides users through
//! configuring billable for first-time use: timer behavior and billing
//! defaults.

use crate::{
    libs::{config::Config, messages::Message},
    msg_success,
};
use anyhow::Result;
use clap::Args;

/// Command-line arguments for the initialization command.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Remove existing configuration instead of creating new one
    #[arg(short, long)]
    delete: bool,
}

/// Executes the initialization command.
///
/// Runs the interactive configuration wizard, or removes the existing
/// configuration when `--delete` is used.
pub fn cmd(init_args: InitArgs) -> Result<()> {
    if init_args.delete {
        let path = Config::file_path()?;
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        msg_success!(Message::ConfigDeleted);
        return Ok(());
    }

    // Prompt the user to select and configure the available modules
    Config::init()?.save()?;

    msg_success!(Message::ConfigSaved);
    Ok(())
}
