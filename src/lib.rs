//! # Billable - Session Time Tracking and Invoicing
//!
//! A command-line utility for recording billable work sessions per client,
//! detecting idle time, and aggregating recorded time into invoices and
//! quarterly tax summaries.
//!
//! ## Features
//!
//! - **Session Tracking**: Start, pause, resume, and stop work sessions per client
//! - **Idle Detection**: Automatic pause when keyboard/mouse input stops
//! - **Crash Recovery**: Periodic snapshots bound the loss window to one autosave interval
//! - **Invoicing**: Atomic invoice creation with monotonic, never-reused numbers
//! - **Payment Tracking**: Unpaid, partially paid, and paid invoice states
//! - **Tax Summaries**: Quarterly rollups of billed income
//! - **Data Export**: Export entries, invoices, and summaries to CSV, JSON, and Excel
//!
//! ## Usage
//!
//! ```rust,no_run
//! use billable::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
