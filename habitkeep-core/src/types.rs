//! Core domain types for habitkeep
//!
//! These types are the canonical entity model owned by the persistent store.
//! Callers always receive value snapshots; mutating a snapshot has no effect
//! on stored state until it is passed back through a write operation.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Tracker** | A user-defined recurring habit with a weekly schedule, emoji and color |
//! | **Category** | A named grouping of trackers, identified by its title |
//! | **CompletionRecord** | The fact "tracker X was completed on day Y" |
//! | **WeekDay** | One of the seven days of the week, Monday first |

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

// ============================================
// WeekDay
// ============================================

/// Day of the week, Monday first.
///
/// The ordering (Monday = 0 .. Sunday = 6) is fixed and locale-independent;
/// it is the ordering used for schedule storage and display.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WeekDay {
    /// All seven days, Monday first.
    pub const ALL: [WeekDay; 7] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
        WeekDay::Sunday,
    ];

    /// Monday through Friday.
    pub const WORKDAYS: [WeekDay; 5] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
    ];

    /// Saturday and Sunday.
    pub const WEEKEND: [WeekDay; 2] = [WeekDay::Saturday, WeekDay::Sunday];

    /// Derive the weekday for a calendar date (Gregorian).
    pub fn from_date(date: NaiveDate) -> Self {
        Self::ALL[date.weekday().num_days_from_monday() as usize]
    }

    /// Returns the identifier used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekDay::Monday => "monday",
            WeekDay::Tuesday => "tuesday",
            WeekDay::Wednesday => "wednesday",
            WeekDay::Thursday => "thursday",
            WeekDay::Friday => "friday",
            WeekDay::Saturday => "saturday",
            WeekDay::Sunday => "sunday",
        }
    }

    /// Full display name
    pub fn long_name(&self) -> &'static str {
        match self {
            WeekDay::Monday => "Monday",
            WeekDay::Tuesday => "Tuesday",
            WeekDay::Wednesday => "Wednesday",
            WeekDay::Thursday => "Thursday",
            WeekDay::Friday => "Friday",
            WeekDay::Saturday => "Saturday",
            WeekDay::Sunday => "Sunday",
        }
    }

    /// Abbreviated display name
    pub fn short_name(&self) -> &'static str {
        match self {
            WeekDay::Monday => "Mon",
            WeekDay::Tuesday => "Tue",
            WeekDay::Wednesday => "Wed",
            WeekDay::Thursday => "Thu",
            WeekDay::Friday => "Fri",
            WeekDay::Saturday => "Sat",
            WeekDay::Sunday => "Sun",
        }
    }
}

impl std::fmt::Display for WeekDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WeekDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monday" => Ok(WeekDay::Monday),
            "tuesday" => Ok(WeekDay::Tuesday),
            "wednesday" => Ok(WeekDay::Wednesday),
            "thursday" => Ok(WeekDay::Thursday),
            "friday" => Ok(WeekDay::Friday),
            "saturday" => Ok(WeekDay::Saturday),
            "sunday" => Ok(WeekDay::Sunday),
            _ => Err(format!("unknown weekday: {}", s)),
        }
    }
}

/// A tracker's weekly schedule: the set of days it is active on.
pub type Schedule = BTreeSet<WeekDay>;

// ============================================
// Color
// ============================================

/// An RGBA color, stored as `#RRGGBBAA` hex text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color from RGB components.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Hex representation used for storage, e.g. `#3772ffff`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for Rgba {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.is_ascii() {
            return Err(format!("bad color '{}': non-hex characters", s));
        }
        let parse = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("bad color '{}': {}", s, e))
        };
        match hex.len() {
            6 => Ok(Rgba::opaque(parse(0..2)?, parse(2..4)?, parse(4..6)?)),
            8 => Ok(Rgba::new(parse(0..2)?, parse(2..4)?, parse(4..6)?, parse(6..8)?)),
            _ => Err(format!("bad color '{}': expected #RRGGBB or #RRGGBBAA", s)),
        }
    }
}

// ============================================
// Tracker
// ============================================

/// A user-defined recurring habit.
///
/// The category relationship is not part of the value type: it lives on the
/// tracker/category join in the store, and is surfaced through [`Category`]
/// snapshots. A tracker belongs to exactly one category at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    /// Unique identifier, immutable for the lifetime of the tracker
    pub id: Uuid,
    /// Display title, non-empty
    pub title: String,
    /// Card color
    pub color: Rgba,
    /// Emoji shown on the card
    pub emoji: String,
    /// Days of the week the tracker is scheduled on
    pub schedule: Schedule,
}

impl Tracker {
    /// Create a new tracker with a freshly generated id.
    pub fn new(
        title: impl Into<String>,
        color: Rgba,
        emoji: impl Into<String>,
        schedule: impl IntoIterator<Item = WeekDay>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            color,
            emoji: emoji.into(),
            schedule: schedule.into_iter().collect(),
        }
    }

    /// Whether the tracker is scheduled on the weekday of `date`.
    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        self.schedule.contains(&WeekDay::from_date(date))
    }
}

// ============================================
// Category
// ============================================

/// A named grouping of trackers.
///
/// Identity is the title; no surrogate id exists. Snapshots returned by the
/// store carry the category's resolved member trackers, sorted by title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique title, case-sensitive
    pub title: String,
    /// Member trackers, title ascending
    pub trackers: Vec<Tracker>,
}

impl Category {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            trackers: Vec::new(),
        }
    }
}

// ============================================
// CompletionRecord
// ============================================

/// The fact "this tracker was completed on this day".
///
/// Dates carry no time-of-day component; at most one record exists per
/// (tracker, date) pair. Records are created and deleted by toggling, never
/// updated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Id of the completed tracker
    pub tracker_id: Uuid,
    /// The calendar day of completion
    pub date: NaiveDate,
}

impl CompletionRecord {
    pub fn new(tracker_id: Uuid, date: NaiveDate) -> Self {
        Self { tracker_id, date }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_from_date() {
        // 2025-10-04 is a Saturday
        let date = NaiveDate::from_ymd_opt(2025, 10, 4).unwrap();
        assert_eq!(WeekDay::from_date(date), WeekDay::Saturday);

        // 2025-10-06 is a Monday
        let date = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        assert_eq!(WeekDay::from_date(date), WeekDay::Monday);
    }

    #[test]
    fn test_weekday_ordering_monday_first() {
        assert!(WeekDay::Monday < WeekDay::Sunday);
        let sorted: Vec<_> = [WeekDay::Sunday, WeekDay::Wednesday, WeekDay::Monday]
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        assert_eq!(
            sorted,
            vec![WeekDay::Monday, WeekDay::Wednesday, WeekDay::Sunday]
        );
    }

    #[test]
    fn test_weekday_round_trip() {
        for day in WeekDay::ALL {
            assert_eq!(day.as_str().parse::<WeekDay>().unwrap(), day);
        }
        assert!("someday".parse::<WeekDay>().is_err());
    }

    #[test]
    fn test_rgba_hex_round_trip() {
        let color = Rgba::new(0x37, 0x72, 0xff, 0xcc);
        assert_eq!(color.to_hex(), "#3772ffcc");
        assert_eq!(color.to_hex().parse::<Rgba>().unwrap(), color);
    }

    #[test]
    fn test_rgba_parses_rgb_as_opaque() {
        let color: Rgba = "#3772ff".parse().unwrap();
        assert_eq!(color, Rgba::opaque(0x37, 0x72, 0xff));
        assert!("#123".parse::<Rgba>().is_err());
        assert!("#zzzzzz".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_tracker_new_generates_unique_ids() {
        let a = Tracker::new("Water", Rgba::opaque(0, 0, 255), "💧", [WeekDay::Monday]);
        let b = Tracker::new("Water", Rgba::opaque(0, 0, 255), "💧", [WeekDay::Monday]);
        assert_ne!(a.id, b.id);
        assert!(a.is_scheduled_on(NaiveDate::from_ymd_opt(2025, 10, 6).unwrap()));
        assert!(!a.is_scheduled_on(NaiveDate::from_ymd_opt(2025, 10, 7).unwrap()));
    }

    #[test]
    fn test_schedule_serde_uses_snake_case() {
        let schedule: Schedule = [WeekDay::Monday, WeekDay::Sunday].into_iter().collect();
        let json = serde_json::to_string(&schedule).unwrap();
        assert_eq!(json, r#"["monday","sunday"]"#);
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schedule);
    }
}
