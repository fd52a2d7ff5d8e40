//! Configuration management for the billable application.
//!
//! Handles application settings for the timer engine and the billing engine.
//! Supports both programmatic access and an interactive setup wizard.
//!
//! ## Configuration Structure
//!
//! The configuration is modular. Each section is optional so users only
//! configure what they need:
//!
//! - **Timer Config**: Inactivity timeout, autosave interval, and activity polling
//! - **Billing Config**: Invoice payment terms
//!
//! Missing sections fall back to built-in defaults at the point of use, so a
//! fresh installation works without any configuration file at all.
//!
//! ## Storage
//!
//! Configuration is stored as pretty-printed JSON in the platform-specific
//! application data directory:
//! - **Windows**: `%LOCALAPPDATA%\halcyonred\billable\config.json`
//! - **macOS**: `~/Library/Application Support/halcyonred/billable/config.json`
//! - **Linux**: `~/.local/share/halcyonred/billable/config.json`
//!
//! The tracker process watches the file's modification time and picks up
//! edits without a restart.
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use billable::libs::config::Config;
//!
//! # fn main() -> anyhow::Result<()> {
//! // Load existing configuration or create default
//! let config = Config::read()?;
//!
//! // Effective timer settings, with defaults filled in
//! let timer = config.timer.clone().unwrap_or_default();
//! println!("Autosave every {} seconds", timer.autosave_interval_seconds);
//! # Ok(())
//! # }
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::PathBuf;

/// Configuration file name used for storing application settings.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Represents a configurable module in the application.
///
/// Used during interactive configuration setup to display available modules
/// and route the user's selection to the matching setup block.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    /// Unique identifier for the module used in configuration routing
    pub key: String,
    /// Display name shown to users during interactive setup
    pub name: String,
}

/// Timer engine configuration settings.
///
/// Controls how the session timer detects inactivity and how often it
/// persists crash-recovery snapshots. All values have conservative defaults
/// that suit typical desk work.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimerConfig {
    /// Minutes without keyboard or mouse input before a running session is
    /// paused automatically.
    ///
    /// Only applies to clients with activity tracking enabled. Time spent
    /// inside this window still counts as active; the pause takes effect
    /// once the threshold is crossed.
    pub inactivity_timeout_minutes: u64,

    /// Seconds between snapshot writes while a session is in progress.
    ///
    /// A lower value narrows the window of time lost to a crash at the cost
    /// of more frequent disk writes.
    pub autosave_interval_seconds: u64,

    /// Poll interval in milliseconds for the tracker's main loop.
    ///
    /// Determines how often activity is sampled and timers are advanced.
    /// Values between 500-2000ms balance responsiveness against CPU usage.
    pub poll_interval_ms: u64,
}

/// Billing configuration settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BillingConfig {
    /// Days between invoice creation and its due date.
    pub payment_terms_days: u64,
}

/// Main configuration container for the entire application.
///
/// Each field is an optional module. The `skip_serializing_if` attribute
/// keeps unconfigured sections out of the JSON file entirely.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    /// Session timer and idle detection settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerConfig>,

    /// Invoicing and payment settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<BillingConfig>,
}

impl Default for TimerConfig {
    /// Provides sensible defaults for timer configuration.
    ///
    /// Default values:
    /// - 10 minutes inactivity timeout
    /// - 30 seconds autosave interval
    /// - 1000ms polling interval
    fn default() -> Self {
        TimerConfig {
            inactivity_timeout_minutes: 10,
            autosave_interval_seconds: 30,
            poll_interval_ms: 1000,
        }
    }
}

impl Default for BillingConfig {
    /// Net-30 payment terms by default.
    fn default() -> Self {
        BillingConfig { payment_terms_days: 30 }
    }
}

impl Default for Config {
    /// Creates a default configuration with all modules unset.
    ///
    /// Effective values still come from the module defaults at the point of
    /// use, so an empty configuration behaves the same as one that spells
    /// out every default explicitly.
    fn default() -> Self {
        Config { timer: None, billing: None }
    }
}

impl Config {
    /// Resolves the full path of the configuration file.
    ///
    /// Used by `read` and `save`, and by the tracker to watch the file's
    /// modification time for live reloads.
    pub fn file_path() -> Result<PathBuf> {
        DataStorage::new().get_path(CONFIG_FILE_NAME)
    }

    /// Reads configuration from the filesystem.
    ///
    /// Returns a default configuration if no file exists, so the application
    /// can run with zero setup. A file that exists but cannot be parsed is
    /// an error.
    pub fn read() -> Result<Config> {
        let config_file_path = Self::file_path()?;

        // Missing file means defaults, not an error
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Saves the current configuration to the filesystem.
    ///
    /// Serializes to pretty-printed JSON so the file stays readable and
    /// hand-editable. The application data directory is created on demand.
    pub fn save(&self) -> Result<()> {
        let config_file_path = Self::file_path()?;

        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Runs an interactive configuration setup wizard.
    ///
    /// Presents available modules in a multi-select list, then prompts for
    /// each selected module's settings with the current values pre-filled as
    /// defaults. Returns the updated configuration for the caller to save.
    pub fn init() -> Result<Self> {
        // Existing configuration provides the wizard's defaults
        let mut config = match Self::read() {
            Ok(config) => config,
            Err(_) => Config::default(),
        };

        let node_descriptions = vec![
            ConfigModule {
                key: "timer".to_string(),
                name: "Timer".to_string(),
            },
            ConfigModule {
                key: "billing".to_string(),
                name: "Billing".to_string(),
            },
        ];

        let selected_nodes = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&node_descriptions.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected_nodes {
            match node_descriptions[selection].key.as_str() {
                "timer" => {
                    let default = config.timer.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleTimer);
                    config.timer = Some(TimerConfig {
                        // Idle threshold before automatic pause
                        inactivity_timeout_minutes: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptInactivityTimeout.to_string())
                            .default(default.inactivity_timeout_minutes)
                            .interact_text()?,

                        // Snapshot write cadence
                        autosave_interval_seconds: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptAutosaveInterval.to_string())
                            .default(default.autosave_interval_seconds)
                            .interact_text()?,

                        // Main loop tick frequency
                        poll_interval_ms: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptPollInterval.to_string())
                            .default(default.poll_interval_ms)
                            .interact_text()?,
                    });
                }
                "billing" => {
                    let default = config.billing.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleBilling);
                    config.billing = Some(BillingConfig {
                        payment_terms_days: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptPaymentTerms.to_string())
                            .default(default.payment_terms_days)
                            .interact_text()?,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}
