//! In-memory day counters and the day rollover state machine.
//!
//! [`DailyCounter`] always has exactly one *current* record, the one for
//! "today". Every other record it exposes is older than today. The current
//! date only moves when a caller reports an observed date through
//! [`DailyCounter::rollover_check`] or [`DailyCounter::record_event`]; wall
//! clock time alone never changes it.
//!
//! ```text
//!   Active(D) --observe D-----> Active(D)      (unchanged)
//!   Active(D) --observe D+n---> Active(D+n)    (D sealed into history)
//!   Active(D) --observe D-n---> Active(D)      (clock skew, ignored)
//! ```
//!
//! This type does no locking of its own. The engine wraps it in a mutex.

use super::day::{DayRecord, EventKind};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Outcome of a rollover check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    /// Observed date equals the current date.
    Unchanged,
    /// The current date advanced. `sealed` is the frozen record of the
    /// previous day as it went into history.
    Advanced { sealed: DayRecord },
    /// Observed date is before the current date. Nothing changed.
    ClockSkew { observed: NaiveDate },
}

#[derive(Debug, Clone)]
pub struct DailyCounter {
    current: DayRecord,
    history: BTreeMap<NaiveDate, DayRecord>,
    // Loaded records dated after the current date. Kept for persistence and
    // adopted if a rollover reaches their date.
    deferred: BTreeMap<NaiveDate, DayRecord>,
}

impl DailyCounter {
    /// Starts in `Active(today)` with zero counters and no history.
    pub fn new(today: NaiveDate) -> Self {
        DailyCounter {
            current: DayRecord::new(today),
            history: BTreeMap::new(),
            deferred: BTreeMap::new(),
        }
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current.date
    }

    pub fn current(&self) -> &DayRecord {
        &self.current
    }

    /// Moves the current date to `observed` if it is later.
    ///
    /// On advance the current record is sealed into history, overwriting any
    /// history entry already present for that date, and a fresh record starts
    /// for `observed`.
    pub fn rollover_check(&mut self, observed: NaiveDate) -> Rollover {
        if observed == self.current.date {
            return Rollover::Unchanged;
        }
        if observed < self.current.date {
            return Rollover::ClockSkew { observed };
        }

        let next = self.deferred.remove(&observed).unwrap_or_else(|| DayRecord::new(observed));
        // Deferred days skipped over by this jump are now in the past.
        let passed: Vec<NaiveDate> = self.deferred.range(..observed).map(|(date, _)| *date).collect();
        for date in passed {
            if let Some(record) = self.deferred.remove(&date) {
                self.history.insert(date, record);
            }
        }

        let sealed = std::mem::replace(&mut self.current, next);
        self.history.insert(sealed.date, sealed);
        Rollover::Advanced { sealed }
    }

    /// Rollover check for `observed`, then adds one `kind` event to the
    /// current record.
    pub fn record_event(&mut self, kind: EventKind, observed: NaiveDate) -> Rollover {
        let rollover = self.rollover_check(observed);
        self.current.increment(kind);
        rollover
    }

    /// All visible records, newest first. The first element is always the
    /// current record.
    pub fn snapshot(&self) -> Vec<DayRecord> {
        let mut records = Vec::with_capacity(self.history.len() + 1);
        records.push(self.current);
        records.extend(self.history.values().rev().copied());
        records
    }

    /// Everything that must be written to the store: the snapshot plus any
    /// deferred future-dated records, newest first.
    pub fn persisted_records(&self) -> Vec<DayRecord> {
        let mut records: Vec<DayRecord> = self.deferred.values().rev().copied().collect();
        records.extend(self.snapshot());
        records
    }

    /// Merges records loaded from the store.
    ///
    /// A record for the current date replaces the current counters, which
    /// resumes today's counts after a restart. Earlier records go to history
    /// as-is. Later records are deferred. Returns the number of records
    /// accepted into the visible state.
    pub fn reconcile<I>(&mut self, loaded: I) -> usize
    where
        I: IntoIterator<Item = DayRecord>,
    {
        let mut accepted = 0;
        for record in loaded {
            if record.date == self.current.date {
                self.current.adopt_counts(&record);
                accepted += 1;
            } else if record.date < self.current.date {
                self.history.insert(record.date, record);
                accepted += 1;
            } else {
                self.deferred.insert(record.date, record);
            }
        }
        accepted
    }

    /// Number of deferred future-dated records.
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
