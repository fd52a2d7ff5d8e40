//! Convenient macros for application messaging and logging.
//!
//! This module provides a set of macros that unify message display throughout
//! the application. The macros automatically handle the distinction between
//! debug mode (structured logging via `tracing`) and normal mode (plain
//! console output), so callers never pick an output channel by hand.
//!
//! ## Debug Mode Detection
//!
//! Debug mode is enabled when either environment variable is set:
//! - **`BILLABLE_DEBUG`**: Explicit debug mode enablement
//! - **`RUST_LOG`**: Standard Rust logging configuration
//!
//! The check is performed once and cached in a `OnceLock` for the lifetime
//! of the process.
//!
//! ## Macro Categories
//!
//! ### Display Macros
//! - **`msg_print!`**: General message display
//! - **`msg_success!`**: Success notifications with ✅ prefix
//! - **`msg_info!`**: Informational messages with ℹ️ prefix
//! - **`msg_warning!`**: Warning messages with ⚠️ prefix
//!
//! ### Error Handling Macros
//! - **`msg_error!`**: Error messages with ❌ prefix, routed to stderr
//! - **`msg_error_anyhow!`**: Create an `anyhow::Error` from a message
//! - **`msg_bail_anyhow!`**: Early return with an error
//!
//! ### Debug Macros
//! - **`msg_debug!`**: Debug-only messages with 🔍 prefix
//!
//! ## Usage Examples
//!
//! ```rust
//! use billable::{msg_info, msg_success, msg_error};
//! use billable::libs::messages::Message;
//!
//! msg_success!(Message::ConfigSaved);
//! msg_info!(Message::TrackerStarted(1234));
//! msg_error!(Message::NoActiveSession);
//! ```
//!
//! ```rust
//! use billable::msg_bail_anyhow;
//! use billable::libs::messages::Message;
//!
//! fn require_session(running: bool) -> anyhow::Result<()> {
//!     if !running {
//!         msg_bail_anyhow!(Message::NoActiveSession);
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::OnceLock;

/// Cached result of debug mode detection.
static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

/// Checks if debug mode is enabled, with caching for performance.
///
/// Debug mode is considered enabled if either `BILLABLE_DEBUG` or `RUST_LOG`
/// is present in the environment. The result is computed on first call and
/// cached for all subsequent calls.
///
/// All message macros consult this function to decide between the tracing
/// system (debug mode) and plain console output (normal mode).
#[doc(hidden)]
pub fn is_debug_mode() -> bool {
    *DEBUG_MODE.get_or_init(|| {
        // Check for application-specific debug flag
        std::env::var("BILLABLE_DEBUG").is_ok() ||
        // Check for standard Rust logging configuration
        std::env::var("RUST_LOG").is_ok()
    })
}

/// Prints a general message with automatic debug mode routing.
///
/// - **Debug Mode**: Uses `tracing::info!` for structured logging
/// - **Normal Mode**: Uses `println!` for simple console output
///
/// An optional second argument of `true` surrounds the message with blank
/// lines for visual separation in reports and summaries.
#[macro_export]
macro_rules! msg_print {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("{}", $msg);
        } else {
            println!("{}", $msg);
        }
    };
    ($msg:expr, true) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("\n{}\n", $msg);
        } else {
            println!("\n{}\n", $msg);
        }
    };
}

/// Prints a success message with ✅ prefix and automatic routing.
///
/// Intended for positive confirmations: client creation, invoice creation,
/// configuration saves, completed exports.
#[macro_export]
macro_rules! msg_success {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("✅ {}", $msg);
        } else {
            println!("✅ {}", $msg);
        }
    };
    ($msg:expr, true) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("\n✅ {}\n", $msg);
        } else {
            println!("\n✅ {}\n", $msg);
        }
    };
}

/// Prints an error message with ❌ prefix and automatic routing.
///
/// - **Debug Mode**: Uses `tracing::error!` for structured error logging
/// - **Normal Mode**: Uses `eprintln!` to write to stderr
///
/// Writing to stderr keeps error text out of normal output so scripts can
/// redirect the two streams independently.
#[macro_export]
macro_rules! msg_error {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::error!("❌ {}", $msg);
        } else {
            eprintln!("❌ {}", $msg);
        }
    };
    ($msg:expr, true) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::error!("\n❌ {}\n", $msg);
        } else {
            eprintln!("\n❌ {}\n", $msg);
        }
    };
}

/// Prints a warning message with ⚠️ prefix and automatic routing.
///
/// Warnings indicate situations that need attention but do not stop the
/// operation, such as a failed autosave that will be retried or a fallback
/// to default behavior.
#[macro_export]
macro_rules! msg_warning {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::warn!("⚠️ {}", $msg);
        } else {
            println!("⚠️ {}", $msg);
        }
    };
    ($msg:expr, true) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::warn!("\n⚠️ {}\n", $msg);
        } else {
            println!("\n⚠️ {}\n", $msg);
        }
    };
}

/// Prints an informational message with ℹ️ prefix and automatic routing.
///
/// Info messages provide status updates and context: what the tracker is
/// doing, which file an export went to, how a recovery was resolved.
#[macro_export]
macro_rules! msg_info {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("ℹ️ {}", $msg);
        } else {
            println!("ℹ️ {}", $msg);
        }
    };
    ($msg:expr, true) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("\nℹ️ {}\n", $msg);
        } else {
            println!("\nℹ️ {}\n", $msg);
        }
    };
}

/// Debug-only message display with 🔍 prefix.
///
/// Messages are shown through `tracing::debug!` when debug mode is enabled
/// and suppressed entirely otherwise. Useful for state transitions, tick
/// timing, and other details that would clutter normal output.
///
/// ```rust
/// use billable::msg_debug;
///
/// let elapsed = 42;
/// msg_debug!(format!("Autosave took {} ms", elapsed));
/// ```
#[macro_export]
macro_rules! msg_debug {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::debug!("🔍 {}", $msg);
        }
    };
}

/// Creates an `anyhow::Error` from a message with ❌ prefix.
///
/// Useful in functions returning `Result<T, anyhow::Error>` that need to
/// convert an application message into a propagatable error:
///
/// ```rust
/// use billable::msg_error_anyhow;
/// use billable::libs::messages::Message;
///
/// fn lookup(found: bool) -> anyhow::Result<()> {
///     if !found {
///         return Err(msg_error_anyhow!(Message::ClientNotFound("Acme".to_string())));
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! msg_error_anyhow {
    ($msg:expr) => {
        anyhow::anyhow!("❌ {}", $msg)
    };
}

/// Early return with an error created from a message.
///
/// Equivalent to `return Err(msg_error_anyhow!(message))` but more concise.
#[macro_export]
macro_rules! msg_bail_anyhow {
    ($msg:expr) => {
        anyhow::bail!("❌ {}", $msg)
    };
}
