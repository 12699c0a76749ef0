//! Day-level tally model.
//!
//! A [`DayRecord`] holds the three counters for one calendar day. It is the
//! unit of everything else in the crate: the in-memory counter state, the
//! on-disk store and the history views all exchange `DayRecord`s.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used on disk and in every user-facing view.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Kind of input event reported by the capture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    KeyboardPress,
    LeftClick,
    RightClick,
}

/// Tallies for a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub keyboard_presses: u64,
    pub left_clicks: u64,
    pub right_clicks: u64,
}

impl DayRecord {
    /// A zeroed record for `date`.
    pub fn new(date: NaiveDate) -> Self {
        DayRecord {
            date,
            keyboard_presses: 0,
            left_clicks: 0,
            right_clicks: 0,
        }
    }

    pub fn with_counts(date: NaiveDate, keyboard_presses: u64, left_clicks: u64, right_clicks: u64) -> Self {
        DayRecord {
            date,
            keyboard_presses,
            left_clicks,
            right_clicks,
        }
    }

    /// Adds exactly one event of `kind`.
    pub fn increment(&mut self, kind: EventKind) {
        let counter = match kind {
            EventKind::KeyboardPress => &mut self.keyboard_presses,
            EventKind::LeftClick => &mut self.left_clicks,
            EventKind::RightClick => &mut self.right_clicks,
        };
        *counter = counter.saturating_add(1);
    }

    pub fn count(&self, kind: EventKind) -> u64 {
        match kind {
            EventKind::KeyboardPress => self.keyboard_presses,
            EventKind::LeftClick => self.left_clicks,
            EventKind::RightClick => self.right_clicks,
        }
    }

    /// Copies the counters of `other`, keeping this record's date.
    pub fn adopt_counts(&mut self, other: &DayRecord) {
        self.keyboard_presses = other.keyboard_presses;
        self.left_clicks = other.left_clicks;
        self.right_clicks = other.right_clicks;
    }

    pub fn total(&self) -> u64 {
        self.keyboard_presses.saturating_add(self.left_clicks).saturating_add(self.right_clicks)
    }

    pub fn formatted_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}
