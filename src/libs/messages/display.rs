//! Display implementation for keytally application messages.
//!
//! All user-facing text is defined here, in one match over [`Message`], so
//! wording stays consistent across commands and parameters are interpolated
//! type-safely.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration removed".to_string(),
            Message::ConfigNotFound => "No configuration file to remove".to_string(),
            Message::ConfigModuleTracker => "Tracker settings".to_string(),
            Message::FlushIntervalMustBePositive => "Flush interval must be at least 1 second".to_string(),

            // === STORE MESSAGES ===
            Message::StoreLocked(path) => format!(
                "Data file {} is currently in use by another process. Is another tracker already running?",
                path
            ),
            Message::StoreOpened(path) => format!("Recording to {}", path),
            Message::StoreReconciled { loaded, date } => format!("Loaded {} day(s) of history, today is {}", loaded, date),
            Message::StoreFlushed(records) => format!("Saved {} day(s) of history", records),
            Message::FinalFlushFailed(error) => format!("Final save failed, recent counts are lost: {}", error),

            // === MONITOR MESSAGES ===
            Message::MonitorStarted {
                flush_interval,
                flush_event_threshold,
            } => {
                if *flush_event_threshold > 0 {
                    format!(
                        "Monitor is running, saving every {}s or every {} events",
                        flush_interval, flush_event_threshold
                    )
                } else {
                    format!("Monitor is running, saving every {}s", flush_interval)
                }
            }
            Message::MonitorShuttingDown => "Shutting down monitor...".to_string(),
            Message::ErrorInRdevListener(error) => format!("Error in rdev listener: {}. Retrying in 1 second...", error),

            // === WATCHER MESSAGES ===
            Message::WatcherStartingForeground => "Starting watcher in foreground... Press Ctrl+C to exit.".to_string(),
            Message::WatcherReceivedSigterm => "Received SIGTERM, shutting down...".to_string(),
            Message::WatcherReceivedSigint => "Received SIGINT, shutting down...".to_string(),
            Message::WatcherReceivedCtrlC => "Received Ctrl+C, shutting down...".to_string(),
            Message::WatcherCtrlCListenFailed(error) => format!("Failed to listen for Ctrl+C: {}", error),
            Message::FailedToCreateSigtermHandler => "Failed to create SIGTERM handler".to_string(),
            Message::FailedToCreateSigintHandler => "Failed to create SIGINT handler".to_string(),

            // === HISTORY MESSAGES ===
            Message::HistoryHeader(days) => format!("Activity for the last {} day(s)", days),
            Message::HistoryEmpty => "No activity recorded yet".to_string(),
            Message::HistoryDaysMustBePositive => "Number of days must be greater than zero".to_string(),
            Message::TotalsHeader => "Totals across all recorded days".to_string(),

            // === PROMPTS ===
            Message::PromptDataFile => "Data file name or absolute path".to_string(),
            Message::PromptFlushInterval => "Save interval in seconds".to_string(),
            Message::PromptFlushEventThreshold => "Save early after this many events (0 to disable)".to_string(),
            Message::PromptHistoryDays => "Days shown by the history command".to_string(),
            Message::PromptFillGaps => "Show days without activity as zero?".to_string(),
        };

        write!(f, "{}", text)
    }
}
