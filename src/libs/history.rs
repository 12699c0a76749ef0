//! Display-ready projections of the day history.
//!
//! Nothing here holds state. [`HistoryWindow`] reshapes a list of
//! [`DayRecord`]s into parallel date and value series, one per metric, the
//! way a chart or table wants them. [`Totals`] sums every retained day.

use super::day::DayRecord;
use super::engine::Engine;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Longest window a dense series is built for, about a century of days.
pub const MAX_WINDOW_DAYS: usize = 36_525;

/// How days without a record are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GapFill {
    /// Only days that have a record appear.
    #[default]
    Sparse,
    /// Exactly `days` consecutive calendar days ending at the current date,
    /// missing days shown as zero.
    Dense,
}

/// Parallel series for the three metrics, oldest day first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryWindow {
    pub dates: Vec<NaiveDate>,
    pub keyboard_presses: Vec<u64>,
    pub left_clicks: Vec<u64>,
    pub right_clicks: Vec<u64>,
}

impl HistoryWindow {
    /// Builds the window straight from the engine's current state.
    pub fn from_engine(engine: &Engine, days: usize, fill: GapFill) -> Self {
        match fill {
            GapFill::Sparse => Self::sparse(&engine.recent_history(days)),
            GapFill::Dense => Self::from_snapshot(&engine.snapshot(), days, fill),
        }
    }

    /// Builds the window from a newest-first snapshot whose first record is
    /// the current day.
    pub fn from_snapshot(snapshot: &[DayRecord], days: usize, fill: GapFill) -> Self {
        match (fill, snapshot.first()) {
            (_, None) => HistoryWindow::default(),
            (GapFill::Sparse, Some(_)) => Self::sparse(&snapshot[..days.min(snapshot.len())]),
            (GapFill::Dense, Some(current)) => Self::dense(snapshot, current.date, days),
        }
    }

    /// Series for `records` in date order.
    pub fn sparse(records: &[DayRecord]) -> Self {
        let mut sorted = records.to_vec();
        sorted.sort_by_key(|r| r.date);

        let mut window = HistoryWindow::default();
        for record in &sorted {
            window.push(record);
        }
        window
    }

    /// `days` consecutive days ending at `last_day`, zero where `records`
    /// has no entry.
    ///
    /// `days` is capped at [`MAX_WINDOW_DAYS`], and the window never reaches
    /// back past the earliest representable date.
    pub fn dense(records: &[DayRecord], last_day: NaiveDate, days: usize) -> Self {
        let by_date: BTreeMap<NaiveDate, &DayRecord> = records.iter().map(|r| (r.date, r)).collect();
        let days = days.min(MAX_WINDOW_DAYS) as u64;

        let Some(first_day) = (0..days)
            .rev()
            .find_map(|offset| last_day.checked_sub_days(Days::new(offset)))
        else {
            return HistoryWindow::default();
        };

        let mut window = HistoryWindow::default();
        for date in first_day.iter_days().take_while(|date| *date <= last_day) {
            match by_date.get(&date) {
                Some(record) => window.push(record),
                None => window.push(&DayRecord::new(date)),
            }
        }
        window
    }

    fn push(&mut self, record: &DayRecord) {
        self.dates.push(record.date);
        self.keyboard_presses.push(record.keyboard_presses);
        self.left_clicks.push(record.left_clicks);
        self.right_clicks.push(record.right_clicks);
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The window back as records, oldest first.
    pub fn records(&self) -> Vec<DayRecord> {
        (0..self.len())
            .map(|i| DayRecord::with_counts(self.dates[i], self.keyboard_presses[i], self.left_clicks[i], self.right_clicks[i]))
            .collect()
    }
}

/// Sum of all counters over a set of days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub days: usize,
    pub keyboard_presses: u64,
    pub left_clicks: u64,
    pub right_clicks: u64,
}

impl Totals {
    /// Sums `records` as given, one day per record.
    pub fn from_records(records: &[DayRecord]) -> Self {
        records.iter().fold(Totals::default(), |acc, r| Totals {
            days: acc.days + 1,
            keyboard_presses: acc.keyboard_presses.saturating_add(r.keyboard_presses),
            left_clicks: acc.left_clicks.saturating_add(r.left_clicks),
            right_clicks: acc.right_clicks.saturating_add(r.right_clicks),
        })
    }

    /// Sums records as loaded from the store: every recorded day counts once,
    /// whatever its date, and a date listed twice keeps its last line.
    pub fn from_store_records(records: &[DayRecord]) -> Self {
        let by_date: BTreeMap<NaiveDate, DayRecord> = records.iter().map(|r| (r.date, *r)).collect();
        let unique: Vec<DayRecord> = by_date.into_values().collect();
        Self::from_records(&unique)
    }
}
