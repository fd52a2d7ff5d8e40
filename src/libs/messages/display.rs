//! Display implementation for billable application messages.
//!
//! Provides the `Display` trait implementation for the `Message` enum, converting
//! structured message data into human-readable text for terminal output. All
//! user-facing text lives here, in one place, so wording stays consistent and
//! parameter interpolation stays type-safe.
//!
//! ## Message Categories
//!
//! - **Client Messages**: Client creation, edits, and archival
//! - **Session Messages**: Timer lifecycle and state transitions
//! - **Recovery Messages**: Crash-recovery results and snapshot handling
//! - **Invoice Messages**: Invoice creation, payments, and validation failures
//! - **Tracker Messages**: Daemon process lifecycle and signal handling
//! - **Database Messages**: Schema migration progress and status
//!
//! ## Usage
//!
//! ```rust
//! use billable::libs::messages::Message;
//!
//! let message = Message::ClientCreated("Acme".to_string());
//! println!("{}", message); // "Client 'Acme' created successfully."
//! ```

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CLIENT MESSAGES ===
            Message::ClientCreated(name) => format!("Client '{}' created successfully.", name),
            Message::ClientUpdated(name) => format!("Client '{}' updated successfully.", name),
            Message::ClientArchived(name) => format!("Client '{}' archived. Existing entries and invoices are kept.", name),
            Message::ClientNotFound(name) => format!("Client '{}' not found.", name),
            Message::ClientAlreadyExists(name) => format!("Client '{}' already exists.", name),
            Message::ClientIsArchived(name) => format!("Client '{}' is archived. Unarchive it before starting a session.", name),
            Message::NoClientsFound => "No clients found. Add one with 'billable client add'.".to_string(),
            Message::ConfirmArchiveClient(name) => format!("Archive client '{}'?", name),

            // === SESSION MESSAGES ===
            Message::SessionStarted(client) => format!("Session started for '{}'.", client),
            Message::SessionAlreadyRunning(client) => {
                format!("A session is already running for '{}'. Stop it before starting a new one.", client)
            }
            Message::SessionStopped(active, idle) => format!("Session stopped. Active time: {}, idle time: {}.", active, idle),
            Message::SessionPaused => "Session paused.".to_string(),
            Message::SessionResumed => "Session resumed.".to_string(),
            Message::SessionAutoPaused(minutes) => format!("No input for {} minutes, session paused automatically.", minutes),
            Message::SessionNotPaused => "Session is not paused.".to_string(),
            Message::SessionAlreadyPaused => "Session is already paused.".to_string(),
            Message::NoActiveSession => "No session is running.".to_string(),

            // === RECOVERY MESSAGES ===
            Message::RecoveredSession(client, end) => {
                format!("Recovered an interrupted session for '{}', closed at the last snapshot ({}).", client, end)
            }
            Message::RecoveryNothingToDo => "No interrupted session to recover.".to_string(),
            Message::RecoveryDiscarded => "Interrupted session discarded.".to_string(),
            Message::InterruptedSessionFound(saved_at) => {
                format!("An interrupted session was found (last snapshot {}). Run 'billable recover' or start a new session.", saved_at)
            }
            Message::SnapshotWriteFailed(error) => format!("Snapshot write failed, will retry on the next tick: {}", error),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration removed.".to_string(),
            Message::ConfigParseError => "Failed to parse configuration".to_string(),
            Message::ConfigReloadFailed(error) => format!("Failed to reload configuration, keeping current settings: {}", error),
            Message::ConfigModuleTimer => "Timer settings".to_string(),
            Message::ConfigModuleBilling => "Billing settings".to_string(),

            // === INVOICE MESSAGES ===
            Message::InvoiceCreated(number, total) => format!("Invoice {} created, total {}.", number, total),
            Message::InvoiceNotFound(number) => format!("Invoice {} not found.", number),
            Message::InvoicesNotFound => "No invoices found.".to_string(),
            Message::NoUninvoicedEntries(client) => format!("No uninvoiced entries for '{}'.", client),
            Message::InvoiceSelectionEmpty => "Nothing selected to invoice.".to_string(),
            Message::EntryNotBillable(reason) => format!("Selection rejected: {}", reason),
            Message::InvalidPaymentAmount(reason) => format!("Invalid payment amount: {}", reason),
            Message::PaymentRecorded(number, amount) => format!("Recorded payment of {} against invoice {}.", amount, number),
            Message::InvoicePaidInFull(number) => format!("Invoice {} is now paid in full.", number),
            Message::PayAmountRequired => "Provide either --amount or --full.".to_string(),

            // === ENTRY MESSAGES ===
            Message::EntriesNotFound => "No entries found.".to_string(),

            // === TAX MESSAGES ===
            Message::TaxSummaryHeader(year) => format!("Quarterly tax summary for {} (billed basis)", year),

            // === EXPORT MESSAGES ===
            Message::ExportingData(data, format) => format!("Exporting {} in {} format...", data, format),
            Message::ExportCompleted(path) => format!("Export completed successfully: {}", path),

            // === TRACKER/DAEMON MESSAGES ===
            Message::TrackerStarted(pid) => format!("Tracker started with PID: {}", pid),
            Message::TrackerStopped(pid) => format!("Tracker with PID {} stopped.", pid),
            Message::TrackerAlreadyRunning(pid) => format!("Tracker is already running with PID {}.", pid),
            Message::TrackerNotRunning => "Tracker is not running.".to_string(),
            Message::TrackerNotRunningPidNotFound => "Tracker is not running (PID file not found).".to_string(),
            Message::TrackerStartingForeground => "Starting tracker in foreground mode...".to_string(),
            Message::TrackerStoppingExisting(pid) => format!("Stopping existing tracker (PID: {})...", pid),
            Message::TrackerFailedToStopExisting(error) => format!("Failed to stop existing tracker: {}", error),
            Message::TrackerFailedToStop(pid) => format!("Failed to stop tracker with PID {}.", pid),
            Message::TrackerReceivedSigterm => "Received SIGTERM, shutting down...".to_string(),
            Message::TrackerReceivedSigint => "Received SIGINT, shutting down...".to_string(),
            Message::TrackerReceivedCtrlC => "Received Ctrl+C, shutting down...".to_string(),
            Message::TrackerCtrlCListenFailed(error) => format!("Failed to listen for Ctrl+C: {}", error),
            Message::TrackerSignalHandlingNotSupported => "Signal handling not supported on this platform".to_string(),
            Message::TrackerError(error) => format!("Tracker error: {}", error),
            Message::TrackerTaskPanicked(error) => format!("Tracker task panicked: {}", error),
            Message::TrackerExitedNormally => "Tracker exited normally.".to_string(),
            Message::TrackerShuttingDown => "Shutting down tracker...".to_string(),
            Message::DaemonModeNotSupported => "Daemon mode is not supported on this platform".to_string(),
            Message::FailedToGetCurrentExecutable => "Failed to get current executable path".to_string(),
            Message::FailedToCreateSigtermHandler => "Failed to create SIGTERM handler".to_string(),
            Message::FailedToCreateSigintHandler => "Failed to create SIGINT handler".to_string(),
            Message::StopRequestSent => "Stop request sent to the tracker.".to_string(),
            Message::PauseRequestSent => "Pause request sent to the tracker.".to_string(),
            Message::ResumeRequestSent => "Resume request sent to the tracker.".to_string(),
            Message::ControlCommandInvalid(command) => format!("Ignored unrecognized control command '{}'.", command),

            // === DATABASE MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending migration(s)", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("Migration v{} completed", version),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All migrations completed successfully".to_string(),
            Message::DatabaseVersion(version) => format!("Database schema version: {}", version),
            Message::DatabaseUpToDate => "Database schema is up to date.".to_string(),
            Message::DatabaseNeedsUpdate => "Database schema needs migration.".to_string(),
            Message::MigrationHistory => "Applied migrations:".to_string(),
            Message::NothingToRollback => "Nothing to roll back.".to_string(),
            Message::RollingBack(from, to) => format!("Rolling back from v{} to v{}...", from, to),
            Message::RollbackCompleted(version) => format!("Rolled back to v{}", version),

            // === FILE SYSTEM MESSAGES ===
            Message::InvalidPidFileContent => "PID file contains invalid content".to_string(),

            // === PROCESS MESSAGES ===
            Message::FailedToOpenProcess(code) => format!("Failed to open process (error code: {})", code),
            Message::FailedToTerminateProcess(code) => format!("Failed to terminate process (error code: {})", code),
            Message::ProcessTerminationNotSupported => "Process termination not supported on this platform".to_string(),

            // === PROMPTS ===
            Message::PromptClientName => "Client name".to_string(),
            Message::PromptHourlyRate => "Hourly rate".to_string(),
            Message::PromptTrackActivity => "Track keyboard/mouse activity for this client?".to_string(),
            Message::PromptMarkFavorite => "Mark as favorite?".to_string(),
            Message::PromptInactivityTimeout => "Inactivity timeout in minutes".to_string(),
            Message::PromptAutosaveInterval => "Autosave interval in seconds".to_string(),
            Message::PromptPollInterval => "Activity poll interval in milliseconds".to_string(),
            Message::PromptPaymentTerms => "Default payment terms in days".to_string(),
            Message::PromptSelectModules => "Select modules to configure".to_string(),
            Message::PromptSelectClient => "Select a client".to_string(),
            Message::PromptSelectEntries => "Select entries to invoice".to_string(),
            Message::PromptClientAction => "What would you like to do?".to_string(),
            Message::PromptInvoiceNumber => "Invoice number".to_string(),
            Message::PromptPaymentAmount => "Payment amount".to_string(),
            Message::ConfirmInvoiceCreate(count, total) => format!("Create invoice for {} entries, total {}?", count, total),

            // === GENERAL MESSAGES ===
            Message::OperationCancelled => "Operation cancelled.".to_string(),
        };
        write!(f, "{}", text)
    }
}
