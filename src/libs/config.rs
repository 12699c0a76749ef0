//! Configuration management for the keytally application.
//!
//! Settings live in a JSON file in the platform-specific application data
//! directory and are optional: a missing file, or a missing section inside
//! it, falls back to defaults so the tracker runs with zero setup.
//!
//! ## Configuration Structure
//!
//! - **Tracker Config**: data file location, flush cadence and the default
//!   history window
//!
//! ## Storage
//!
//! - **Windows**: `%LOCALAPPDATA%\keytally\keytally\config.json`
//! - **macOS**: `~/Library/Application Support/keytally/keytally/config.json`
//! - **Linux**: `~/.local/share/keytally/keytally/config.json`
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use keytally::libs::config::Config;
//!
//! let config = Config::read()?;
//! let tracker = config.tracker.unwrap_or_default();
//! println!("Flushing every {}s", tracker.flush_interval);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use super::engine::FlushSettings;
use super::history::GapFill;
use crate::db::days::DAYS_FILE_NAME;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration file name used for storing application settings.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Background tracker settings.
///
/// Every field has a serde default, so older or hand-written configuration
/// files that omit a field still load.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Day-record file name.
    ///
    /// Relative names are resolved inside the application data directory;
    /// absolute paths are used as-is.
    pub data_file: String,

    /// Seconds between periodic flushes of the in-memory counters.
    pub flush_interval: u64,

    /// Number of counted events after which a flush is requested before the
    /// next timer tick. `0` disables event-triggered flushes.
    pub flush_event_threshold: u64,

    /// Number of days shown by `keytally history` when `--days` is omitted.
    pub history_days: usize,

    /// Zero-fill days without activity in the history view.
    pub fill_gaps: bool,
}

impl Default for TrackerConfig {
    /// Defaults:
    /// - `keytally.txt` data file
    /// - 60 second flush interval
    /// - early flush after 100 events
    /// - 7 day history window, sparse
    fn default() -> Self {
        TrackerConfig {
            data_file: DAYS_FILE_NAME.to_string(),
            flush_interval: 60,
            flush_event_threshold: 100,
            history_days: 7,
            fill_gaps: false,
        }
    }
}

impl TrackerConfig {
    pub fn flush_settings(&self) -> FlushSettings {
        FlushSettings {
            interval: Duration::from_secs(self.flush_interval),
            event_threshold: self.flush_event_threshold,
        }
    }

    pub fn gap_fill(&self) -> GapFill {
        if self.fill_gaps {
            GapFill::Dense
        } else {
            GapFill::Sparse
        }
    }

    /// Full path of the data file within `storage`.
    pub fn data_path(&self, storage: &DataStorage) -> Result<PathBuf> {
        Ok(storage.resolve(&self.data_file)?)
    }
}

/// Root configuration object.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// Background tracker configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<TrackerConfig>,
}

impl Config {
    /// Reads configuration from the platform data directory, falling back to
    /// defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read() -> Result<Config> {
        Self::read_from(&DataStorage::new())
    }

    pub fn read_from(storage: &DataStorage) -> Result<Config> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Saves the configuration as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        self.save_to(&DataStorage::new())
    }

    pub fn save_to(&self, storage: &DataStorage) -> Result<()> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Removes the configuration file. Returns `false` if there was none.
    pub fn delete_from(storage: &DataStorage) -> Result<bool> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(false);
        }
        fs::remove_file(config_file_path)?;
        Ok(true)
    }

    /// Tracker settings, defaulted when the section is absent.
    pub fn tracker(&self) -> TrackerConfig {
        self.tracker.clone().unwrap_or_default()
    }

    /// Runs the interactive setup wizard, pre-filled with the current values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();
        let default = config.tracker();

        msg_print!(Message::ConfigModuleTracker);
        config.tracker = Some(TrackerConfig {
            data_file: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptDataFile.to_string())
                .default(default.data_file)
                .interact_text()?,

            flush_interval: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptFlushInterval.to_string())
                .default(default.flush_interval)
                .validate_with(|value: &u64| if *value > 0 { Ok(()) } else { Err(Message::FlushIntervalMustBePositive.to_string()) })
                .interact_text()?,

            flush_event_threshold: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptFlushEventThreshold.to_string())
                .default(default.flush_event_threshold)
                .interact_text()?,

            history_days: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptHistoryDays.to_string())
                .default(default.history_days)
                .interact_text()?,

            fill_gaps: Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptFillGaps.to_string())
                .default(default.fill_gaps)
                .interact()?,
        });

        Ok(config)
    }
}
