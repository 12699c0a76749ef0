use crate::libs::daemon;
use crate::libs::messages::Message;
use crate::msg_info;
use anyhow::Result;

// Runs the tracker in the foreground until Ctrl+C or SIGTERM.
pub async fn cmd() -> Result<()> {
    msg_info!(Message::WatcherStartingForeground);
    daemon::run_with_signal_handling().await
}
