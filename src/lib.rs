//! # Keytally - Keyboard and mouse activity tallies
//!
//! Counts keyboard presses and left/right mouse clicks in the background,
//! buckets them by calendar day and keeps the daily tallies in a plain text
//! file that survives restarts.
//!
//! ## Features
//!
//! - **Background Capture**: System-wide key and button presses via rdev
//! - **Daily Buckets**: Correct day rollover under concurrent access
//! - **Durable History**: Periodic, threshold and shutdown flushes to a
//!   `date,keyboard,left,right` text file guarded against a second instance
//! - **History Views**: Recent-day series and all-time totals
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keytally::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
