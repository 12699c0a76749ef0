//! Convenient macros for application messaging and logging.
//!
//! The macros route every user-facing message through one switch: in debug
//! mode the text goes to `tracing` as structured log output, otherwise it is
//! printed to the console.
//!
//! ## Debug Mode Detection
//!
//! Debug mode is on when either variable is set:
//! - **`KEYTALLY_DEBUG`**: application-specific switch
//! - **`RUST_LOG`**: standard Rust logging configuration
//!
//! The check runs once and is cached.
//!
//! ## Output Routing
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Macro Call    │    │   Debug Mode    │    │   Output        │
//! │   msg_info!()   │───▶│   Detection     │───▶│   Routing       │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!                                 │
//!                                 ▼
//!                  tracing::info!  OR  println!
//! ```
//!
//! ## Macro Categories
//!
//! - **`msg_print!`**, **`msg_success!`**, **`msg_info!`**: display
//! - **`msg_error!`**: errors to stderr
//! - **`msg_error_anyhow!`**, **`msg_bail_anyhow!`**: `anyhow` error creation
//!
//! ## Usage Examples
//!
//! ```rust
//! use keytally::{msg_info, msg_error_anyhow};
//! use keytally::libs::messages::Message;
//!
//! msg_info!(Message::WatcherStartingForeground);
//! let error = msg_error_anyhow!(Message::StoreLocked("keytally.txt".to_string()));
//! ```

use std::sync::OnceLock;

static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

/// Returns `true` when `KEYTALLY_DEBUG` or `RUST_LOG` is set. Cached.
#[doc(hidden)]
pub fn is_debug_mode() -> bool {
    *DEBUG_MODE.get_or_init(|| std::env::var("KEYTALLY_DEBUG").is_ok() || std::env::var("RUST_LOG").is_ok())
}

/// Prints a general message.
///
/// `msg_print!(msg, true)` surrounds the message with blank lines.
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

/// Prints a success message with ✅ prefix.
#[macro_export]
macro_rules! msg_success {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("✅ {}", $msg);
        } else {
            println!("✅ {}", $msg);
        }
    };
}

/// Prints an error message with ❌ prefix to stderr.
///
/// ```rust
/// use keytally::msg_error;
/// use keytally::libs::messages::Message;
///
/// msg_error!(Message::FinalFlushFailed("disk full".to_string()));
/// // Output to stderr: "❌ Final save failed, recent counts are lost: disk full"
/// ```
#[macro_export]
macro_rules! msg_error {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::error!("❌ {}", $msg);
        } else {
            eprintln!("❌ {}", $msg);
        }
    };
}

/// Prints an informational message with ℹ️ prefix.
#[macro_export]
macro_rules! msg_info {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("ℹ️ {}", $msg);
        } else {
            println!("ℹ️ {}", $msg);
        }
    };
}

/// Creates an `anyhow::Error` from a message with ❌ prefix.
#[macro_export]
macro_rules! msg_error_anyhow {
    ($msg:expr) => {
        anyhow::anyhow!("❌ {}", $msg)
    };
}

/// Early return with an `anyhow::Error` built from a message.
///
/// ```rust
/// use anyhow::Result;
/// use keytally::msg_bail_anyhow;
/// use keytally::libs::messages::Message;
///
/// fn refuse() -> Result<()> {
///     msg_bail_anyhow!(Message::HistoryDaysMustBePositive);
/// }
/// assert!(refuse().is_err());
/// ```
#[macro_export]
macro_rules! msg_bail_anyhow {
    ($msg:expr) => {
        anyhow::bail!("❌ {}", $msg)
    };
}
