//! Formatting helpers shared across UIs.

use crate::types::{Schedule, WeekDay};

/// Format a schedule as a compact summary string.
///
/// Well-known day groups collapse to a single word; anything else becomes a
/// comma-joined list of short day names in Monday-first order.
pub fn format_schedule(schedule: &Schedule) -> String {
    if schedule.len() == WeekDay::ALL.len() {
        return "Every day".to_string();
    }
    if schedule.len() == WeekDay::WORKDAYS.len()
        && WeekDay::WORKDAYS.iter().all(|d| schedule.contains(d))
    {
        return "Weekdays".to_string();
    }
    if schedule.len() == WeekDay::WEEKEND.len()
        && WeekDay::WEEKEND.iter().all(|d| schedule.contains(d))
    {
        return "Weekends".to_string();
    }

    WeekDay::ALL
        .iter()
        .filter(|d| schedule.contains(*d))
        .map(|d| d.short_name())
        .collect::<Vec<_>>()
        .join(", ")
}
