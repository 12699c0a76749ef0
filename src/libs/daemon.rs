//! Foreground lifecycle of the tracker.
//!
//! This is the composition root: it reads the configuration, takes the store
//! lock, starts the engine and the capture adapter, then waits for a shutdown
//! signal and runs the final forced flush before returning.

use crate::db::days::DayStore;
use crate::db::StoreError;
use crate::libs::clock::LocalClock;
use crate::libs::config::{Config, TrackerConfig};
use crate::libs::data_storage::DataStorage;
use crate::libs::engine::Engine;
use crate::libs::messages::Message;
use crate::libs::monitor::Monitor;
use crate::{msg_error, msg_error_anyhow, msg_info};
use anyhow::Result;
use std::sync::Arc;

/// Opens the configured store and builds a not-yet-started engine.
///
/// A store held by another instance is fatal: the error tells the operator
/// that a tracker is already running.
pub fn open_engine(tracker: &TrackerConfig, storage: &DataStorage) -> Result<Arc<Engine>> {
    let path = tracker.data_path(storage)?;
    let store = match DayStore::open(&path) {
        Ok(store) => store,
        Err(StoreError::ResourceLocked { path }) => {
            return Err(msg_error_anyhow!(Message::StoreLocked(path.display().to_string())));
        }
        Err(e) => return Err(e.into()),
    };
    msg_info!(Message::StoreOpened(path.display().to_string()));

    Ok(Arc::new(Engine::new(store, LocalClock)))
}

/// Runs the tracker until SIGINT, SIGTERM or Ctrl+C.
pub async fn run_with_signal_handling() -> Result<()> {
    let config = Config::read()?;
    let tracker = config.tracker();
    let engine = open_engine(&tracker, &DataStorage::new())?;

    let settings = tracker.flush_settings();
    let task = engine.start(settings)?;
    msg_info!(Message::StoreReconciled {
        loaded: engine.snapshot().len(),
        date: engine.current_date().to_string(),
    });

    Monitor::new(Arc::clone(&engine)).spawn();
    msg_info!(Message::MonitorStarted {
        flush_interval: settings.interval.as_secs(),
        flush_event_threshold: settings.event_threshold,
    });

    wait_for_shutdown().await;
    msg_info!(Message::MonitorShuttingDown);

    match engine.shutdown(task).await {
        Ok(records) => {
            msg_info!(Message::StoreFlushed(records));
            Ok(())
        }
        Err(e) => {
            // The process still exits; only the unsaved delta is lost.
            msg_error!(Message::FinalFlushFailed(e.to_string()));
            Err(e.into())
        }
    }
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(_) => {
                msg_error!(Message::FailedToCreateSigtermHandler);
                return ctrl_c().await;
            }
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(sigint) => sigint,
            Err(_) => {
                msg_error!(Message::FailedToCreateSigintHandler);
                return ctrl_c().await;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                msg_info!(Message::WatcherReceivedSigterm);
            }
            _ = sigint.recv() => {
                msg_info!(Message::WatcherReceivedSigint);
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await;
    }
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            msg_info!(Message::WatcherReceivedCtrlC);
        }
        Err(e) => {
            msg_error!(Message::WatcherCtrlCListenFailed(e.to_string()));
        }
    }
}
