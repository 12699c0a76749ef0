//! Core library modules for the keytally application.
//!
//! ## Features
//!
//! - **Core Model**: Day records and the rollover state machine
//! - **Aggregation**: The thread-safe engine fed by the capture source
//! - **Capture & Lifecycle**: rdev input monitor and signal-driven daemon
//! - **Presentation**: History windows, totals and terminal tables
//! - **Infrastructure**: Configuration, data storage, messaging
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keytally::db::days::DayStore;
//! use keytally::libs::clock::LocalClock;
//! use keytally::libs::day::EventKind;
//! use keytally::libs::engine::{Engine, FlushSettings};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let engine = Arc::new(Engine::new(DayStore::open("keytally.txt")?, LocalClock));
//! let task = engine.start(FlushSettings::default())?;
//! engine.on_input_event(EventKind::KeyboardPress);
//! engine.shutdown(task).await?;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod counter;
pub mod daemon;
pub mod data_storage;
pub mod day;
pub mod engine;
pub mod history;
pub mod messages;
pub mod monitor;
pub mod view;
