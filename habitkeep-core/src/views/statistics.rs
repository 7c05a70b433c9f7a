//! Statistics engine
//!
//! Global aggregates over the full completion history plus tracker
//! schedules. All values are recomputed from scratch on each call; the
//! history is small enough that a single pass is cheap.

use crate::types::{CompletionRecord, Tracker, WeekDay};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use uuid::Uuid;

/// Aggregate statistics over the whole completion history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Longest run of consecutive active days
    pub best_period: u32,
    /// Active days on which every scheduled tracker was completed
    pub perfect_days: u32,
    /// Completion records across all time
    pub completed_total: u32,
    /// Completions per active day, rounded half up
    pub average_per_active_day: u32,
}

impl Statistics {
    /// The defined result for an empty completion history.
    pub const ZERO: Statistics = Statistics {
        best_period: 0,
        perfect_days: 0,
        completed_total: 0,
        average_per_active_day: 0,
    };
}

/// Compute statistics from full tracker and record snapshots.
pub fn compute(trackers: &[Tracker], records: &[CompletionRecord]) -> Statistics {
    if records.is_empty() {
        return Statistics::ZERO;
    }

    // Group by day: the set of active dates and, per date, which trackers
    // were completed.
    let mut by_date: BTreeMap<NaiveDate, HashSet<Uuid>> = BTreeMap::new();
    for record in records {
        by_date.entry(record.date).or_default().insert(record.tracker_id);
    }
    let active_dates: BTreeSet<NaiveDate> = by_date.keys().copied().collect();

    let completed_total = records.len() as u32;
    let average_per_active_day = round_half_up(completed_total, active_dates.len() as u32);
    let best_period = max_consecutive_days(&active_dates);
    let perfect_days = count_perfect_days(trackers, &by_date);

    Statistics {
        best_period,
        perfect_days,
        completed_total,
        average_per_active_day,
    }
}

/// Integer division rounding halves upward.
fn round_half_up(total: u32, days: u32) -> u32 {
    if days == 0 {
        return 0;
    }
    (2 * total + days) / (2 * days)
}

/// Longest run of consecutive calendar days in the set. A gap of even one
/// day breaks the run; a single isolated day is a run of length 1.
fn max_consecutive_days(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut best: u32 = 0;
    let mut current: u32 = 0;
    let mut prev: Option<NaiveDate> = None;

    for &date in dates {
        current = match prev {
            Some(prev) if (date - prev).num_days() == 1 => current + 1,
            _ => 1,
        };
        best = best.max(current);
        prev = Some(date);
    }
    best
}

/// Count the active dates on which every tracker scheduled for that date's
/// weekday was completed. Dates with no scheduled tracker at all are skipped
/// rather than counted as vacuously perfect.
fn count_perfect_days(
    trackers: &[Tracker],
    by_date: &BTreeMap<NaiveDate, HashSet<Uuid>>,
) -> u32 {
    if trackers.is_empty() {
        return 0;
    }

    let mut count = 0;
    for (&date, completed) in by_date {
        let weekday = WeekDay::from_date(date);
        let mut scheduled = trackers
            .iter()
            .filter(|t| t.schedule.contains(&weekday))
            .peekable();
        if scheduled.peek().is_none() {
            continue;
        }
        if scheduled.all(|t| completed.contains(&t.id)) {
            count += 1;
        }
    }
    count
}
