//! Core library modules for the billable application.
//!
//! Serves as the main entry point for all billable library components,
//! providing a centralized access point to the application's core
//! functionality.
//!
//! ## Features
//!
//! - **Core Infrastructure**: Configuration, data storage, messaging
//! - **Session Tracking**: Timer state machine, activity monitoring, daemon management
//! - **Billing**: Invoice building, payments, quarterly tax summaries
//! - **User Interface**: Console rendering, data export, formatting
//!
//! ## Usage
//!
//! ```rust,no_run
//! use billable::db::clients::Clients;
//! use billable::libs::money::Money;
//!
//! # fn run() -> anyhow::Result<()> {
//! let clients = Clients::new()?;
//! clients.create("Acme", Money::from_cents(9500), true)?;
//! # Ok(())
//! # }
//! ```

pub mod billing;
pub mod config;
pub mod daemon;
pub mod data_storage;
pub mod engine;
pub mod export;
pub mod formatter;
pub mod messages;
pub mod money;
pub mod monitor;
pub mod view;
