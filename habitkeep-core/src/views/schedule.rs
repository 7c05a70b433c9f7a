//! Tracker query engine
//!
//! Computes the grouped-by-category list of trackers visible for a given
//! date: trackers scheduled on that date's weekday, optionally narrowed by a
//! search string and a completion filter, annotated with per-tracker
//! completion state. Empty category groups are dropped.

use crate::types::{Category, CompletionRecord, Tracker, WeekDay};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Narrow the day view by completion state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionFilter {
    /// Every scheduled tracker
    #[default]
    All,
    /// Only trackers already completed on the query date
    Completed,
    /// Only trackers not yet completed on the query date
    Uncompleted,
}

/// Query parameters for one day view.
#[derive(Debug, Clone, Copy)]
pub struct DayQuery<'a> {
    /// The calendar day being viewed
    pub date: NaiveDate,
    /// Case-insensitive substring match against tracker titles; surrounding
    /// whitespace is ignored and an empty search matches everything
    pub search: &'a str,
    /// Completion-state narrowing
    pub filter: CompletionFilter,
}

impl<'a> DayQuery<'a> {
    /// Query showing everything scheduled on `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            search: "",
            filter: CompletionFilter::All,
        }
    }
}

/// One tracker in the day view, with its completion annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerDayView {
    pub tracker: Tracker,
    /// Whether a completion record exists for the query date
    pub completed_today: bool,
    /// Completion records for this tracker across all time
    pub completed_count: usize,
}

/// One non-empty category group in the day view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDayView {
    pub title: String,
    pub trackers: Vec<TrackerDayView>,
}

/// Compute the day view.
///
/// Categories are ordered by title ascending and trackers by title ascending
/// within each category; both sorts are stable, so equal titles keep their
/// snapshot order.
pub fn day_view(
    categories: &[Category],
    records: &[CompletionRecord],
    query: &DayQuery<'_>,
) -> Vec<CategoryDayView> {
    let weekday = WeekDay::from_date(query.date);
    let search = query.search.trim().to_lowercase();

    let mut completed_counts: HashMap<Uuid, usize> = HashMap::new();
    let mut done_on_date: HashSet<Uuid> = HashSet::new();
    for record in records {
        *completed_counts.entry(record.tracker_id).or_insert(0) += 1;
        if record.date == query.date {
            done_on_date.insert(record.tracker_id);
        }
    }

    let mut groups: Vec<CategoryDayView> = categories
        .iter()
        .filter_map(|category| {
            let mut trackers: Vec<TrackerDayView> = category
                .trackers
                .iter()
                .filter(|t| t.schedule.contains(&weekday))
                .filter(|t| search.is_empty() || t.title.to_lowercase().contains(&search))
                .map(|t| TrackerDayView {
                    completed_today: done_on_date.contains(&t.id),
                    completed_count: completed_counts.get(&t.id).copied().unwrap_or(0),
                    tracker: t.clone(),
                })
                .filter(|view| match query.filter {
                    CompletionFilter::All => true,
                    CompletionFilter::Completed => view.completed_today,
                    CompletionFilter::Uncompleted => !view.completed_today,
                })
                .collect();
            if trackers.is_empty() {
                return None;
            }
            trackers.sort_by(|a, b| a.tracker.title.cmp(&b.tracker.title));
            Some(CategoryDayView {
                title: category.title.clone(),
                trackers,
            })
        })
        .collect();

    groups.sort_by(|a, b| a.title.cmp(&b.title));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgba;

    fn tracker(title: &str, days: &[WeekDay]) -> Tracker {
        Tracker::new(title, Rgba::opaque(0, 0, 0), "🙂", days.iter().copied())
    }

    fn category(title: &str, trackers: Vec<Tracker>) -> Category {
        Category {
            title: title.to_string(),
            trackers,
        }
    }

    // 2025-10-06 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 6).unwrap()
    }

    #[test]
    fn test_scheduled_trackers_appear_on_matching_weekday() {
        let categories = vec![category(
            "Health",
            vec![
                tracker("Water", &[WeekDay::Monday, WeekDay::Friday]),
                tracker("Run", &[WeekDay::Tuesday]),
            ],
        )];

        let view = day_view(&categories, &[], &DayQuery::for_date(monday()));

        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "Health");
        assert_eq!(view[0].trackers.len(), 1);
        assert_eq!(view[0].trackers[0].tracker.title, "Water");
    }

    #[test]
    fn test_empty_groups_are_dropped() {
        let categories = vec![
            category("Health", vec![tracker("Run", &[WeekDay::Tuesday])]),
            category("Chores", vec![tracker("Dishes", &[WeekDay::Monday])]),
        ];

        let view = day_view(&categories, &[], &DayQuery::for_date(monday()));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "Chores");
    }

    #[test]
    fn test_search_is_case_insensitive_and_trimmed() {
        let categories = vec![category(
            "Health",
            vec![
                tracker("Drink Water", &[WeekDay::Monday]),
                tracker("Meditate", &[WeekDay::Monday]),
            ],
        )];

        let query = DayQuery {
            date: monday(),
            search: "  WATER ",
            filter: CompletionFilter::All,
        };
        let view = day_view(&categories, &[], &query);

        assert_eq!(view.len(), 1);
        assert_eq!(view[0].trackers.len(), 1);
        assert_eq!(view[0].trackers[0].tracker.title, "Drink Water");
    }

    #[test]
    fn test_ordering_by_title() {
        let categories = vec![
            category(
                "Zen",
                vec![
                    tracker("Yoga", &[WeekDay::Monday]),
                    tracker("Breathe", &[WeekDay::Monday]),
                ],
            ),
            category("Art", vec![tracker("Sketch", &[WeekDay::Monday])]),
        ];

        let view = day_view(&categories, &[], &DayQuery::for_date(monday()));

        assert_eq!(view[0].title, "Art");
        assert_eq!(view[1].title, "Zen");
        let titles: Vec<_> = view[1]
            .trackers
            .iter()
            .map(|t| t.tracker.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Breathe", "Yoga"]);
    }

    #[test]
    fn test_completion_annotations() {
        let water = tracker("Water", &[WeekDay::Monday]);
        let water_id = water.id;
        let categories = vec![category("Health", vec![water])];
        let records = vec![
            CompletionRecord::new(water_id, monday()),
            CompletionRecord::new(water_id, NaiveDate::from_ymd_opt(2025, 9, 29).unwrap()),
        ];

        let view = day_view(&categories, &records, &DayQuery::for_date(monday()));

        let day = &view[0].trackers[0];
        assert!(day.completed_today);
        assert_eq!(day.completed_count, 2);
    }

    #[test]
    fn test_completion_filter() {
        let water = tracker("Water", &[WeekDay::Monday]);
        let run = tracker("Run", &[WeekDay::Monday]);
        let water_id = water.id;
        let categories = vec![category("Health", vec![water, run])];
        let records = vec![CompletionRecord::new(water_id, monday())];

        let completed = day_view(
            &categories,
            &records,
            &DayQuery {
                date: monday(),
                search: "",
                filter: CompletionFilter::Completed,
            },
        );
        assert_eq!(completed[0].trackers.len(), 1);
        assert_eq!(completed[0].trackers[0].tracker.title, "Water");

        let uncompleted = day_view(
            &categories,
            &records,
            &DayQuery {
                date: monday(),
                search: "",
                filter: CompletionFilter::Uncompleted,
            },
        );
        assert_eq!(uncompleted[0].trackers.len(), 1);
        assert_eq!(uncompleted[0].trackers[0].tracker.title, "Run");
    }
}
