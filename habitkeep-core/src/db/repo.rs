//! Database repository layer
//!
//! Provides the store operations for all three entity types. Every mutating
//! call commits durably before returning and then notifies observers of each
//! affected entity type with a fresh, full snapshot; a failed call leaves the
//! store in its pre-call state and fires no notification.

use crate::error::{Error, Result};
use crate::observer::{Observer, ObserverBus, SubscriptionId};
use crate::types::{Category, CompletionRecord, Tracker};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::{Mutex, Weak};
use uuid::Uuid;

/// Date column format; dates carry no time-of-day component.
const DATE_FORMAT: &str = "%Y-%m-%d";

const UPSERT_TRACKER_SQL: &str = r#"
    INSERT INTO trackers (id, title, color, emoji, schedule, category_title)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(id) DO UPDATE SET
        title = excluded.title,
        color = excluded.color,
        emoji = excluded.emoji,
        schedule = excluded.schedule,
        category_title = excluded.category_title
"#;

/// Outcome of a completion toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A completion record was created for the date
    Completed,
    /// The existing completion record was removed
    Uncompleted,
    /// The date lies in the future; the store was left untouched
    Rejected,
}

/// Database handle owning the durable copies of all entities.
///
/// Wraps a single SQLite connection; all mutations are serialized through it,
/// so there is exactly one logical writer per store.
pub struct Database {
    conn: Mutex<Connection>,
    trackers_bus: ObserverBus<Tracker>,
    categories_bus: ObserverBus<Category>,
    records_bus: ObserverBus<CompletionRecord>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for better concurrency
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self::with_connection(conn))
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            trackers_bus: ObserverBus::new(),
            categories_bus: ObserverBus::new(),
            records_bus: ObserverBus::new(),
        }
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ============================================
    // Observation
    // ============================================

    /// Observe tracker changes. The store keeps only a weak handle.
    pub fn observe_trackers(&self, observer: Weak<dyn Observer<Tracker>>) -> SubscriptionId {
        self.trackers_bus.subscribe(observer)
    }

    pub fn unobserve_trackers(&self, id: SubscriptionId) {
        self.trackers_bus.unsubscribe(id)
    }

    /// Observe category changes; snapshots carry resolved member trackers.
    pub fn observe_categories(&self, observer: Weak<dyn Observer<Category>>) -> SubscriptionId {
        self.categories_bus.subscribe(observer)
    }

    pub fn unobserve_categories(&self, id: SubscriptionId) {
        self.categories_bus.unsubscribe(id)
    }

    /// Observe completion record changes.
    pub fn observe_records(
        &self,
        observer: Weak<dyn Observer<CompletionRecord>>,
    ) -> SubscriptionId {
        self.records_bus.subscribe(observer)
    }

    pub fn unobserve_records(&self, id: SubscriptionId) {
        self.records_bus.unsubscribe(id)
    }

    fn notify_trackers(&self) -> Result<()> {
        let snapshot = self.list_trackers()?;
        self.trackers_bus.notify(&snapshot);
        Ok(())
    }

    fn notify_categories(&self) -> Result<()> {
        let snapshot = self.list_categories()?;
        self.categories_bus.notify(&snapshot);
        Ok(())
    }

    fn notify_records(&self) -> Result<()> {
        let snapshot = self.list_records()?;
        self.records_bus.notify(&snapshot);
        Ok(())
    }

    // ============================================
    // Tracker operations
    // ============================================

    /// All trackers, title ascending. Includes trackers orphaned by a
    /// category delete.
    pub fn list_trackers(&self) -> Result<Vec<Tracker>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, title, color, emoji, schedule FROM trackers ORDER BY title ASC",
        )?;
        let trackers = stmt
            .query_map([], Self::row_to_tracker)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(trackers)
    }

    /// Create a tracker, or replace the stored fields of an existing one
    /// (same id). The category must already exist; unknown categories are
    /// not silently created.
    pub fn upsert_tracker(&self, tracker: &Tracker, category_title: &str) -> Result<()> {
        validate_title(&tracker.title)?;
        let schedule_json = serde_json::to_string(&tracker.schedule)?;
        {
            let conn = self.conn.lock().unwrap();
            if !Self::category_exists(&conn, category_title)? {
                return Err(Error::CategoryNotFound(category_title.to_string()));
            }
            conn.execute(
                UPSERT_TRACKER_SQL,
                params![
                    tracker.id.to_string(),
                    tracker.title,
                    tracker.color.to_hex(),
                    tracker.emoji,
                    schedule_json,
                    category_title,
                ],
            )?;
        }
        self.notify_trackers()?;
        self.notify_categories()?;
        Ok(())
    }

    /// Delete a tracker and every completion record referencing it.
    pub fn delete_tracker(&self, id: Uuid) -> Result<()> {
        {
            let conn = self.conn.lock().unwrap();
            // Completion records follow via ON DELETE CASCADE
            let affected =
                conn.execute("DELETE FROM trackers WHERE id = ?1", [id.to_string()])?;
            if affected == 0 {
                return Err(Error::TrackerNotFound(id));
            }
        }
        tracing::debug!(%id, "Deleted tracker");
        self.notify_trackers()?;
        self.notify_categories()?;
        self.notify_records()?;
        Ok(())
    }

    // ============================================
    // Category operations
    // ============================================

    /// All categories with their resolved member trackers, category title
    /// ascending, trackers title ascending.
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn.lock().unwrap();
        let mut cat_stmt = conn.prepare("SELECT title FROM categories ORDER BY title ASC")?;
        let titles = cat_stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut tracker_stmt = conn.prepare(
            "SELECT id, title, color, emoji, schedule FROM trackers
             WHERE category_title = ?1 ORDER BY title ASC",
        )?;
        let mut categories = Vec::with_capacity(titles.len());
        for title in titles {
            let trackers = tracker_stmt
                .query_map([&title], Self::row_to_tracker)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            categories.push(Category { title, trackers });
        }
        Ok(categories)
    }

    /// Create a category, or merge the supplied trackers into an existing one
    /// of the same title. The merge is idempotent: re-adding a tracker that
    /// is already a member replaces its fields, never duplicates it.
    pub fn upsert_category(&self, title: &str, initial_trackers: &[Tracker]) -> Result<()> {
        validate_title(title)?;
        for tracker in initial_trackers {
            validate_title(&tracker.title)?;
        }

        let changed = {
            let mut conn = self.conn.lock().unwrap();
            let tx = conn.transaction()?;
            let mut changed = tx.execute(
                "INSERT INTO categories (title) VALUES (?1) ON CONFLICT(title) DO NOTHING",
                [title],
            )?;
            for tracker in initial_trackers {
                let schedule_json = serde_json::to_string(&tracker.schedule)?;
                changed += tx.execute(
                    UPSERT_TRACKER_SQL,
                    params![
                        tracker.id.to_string(),
                        tracker.title,
                        tracker.color.to_hex(),
                        tracker.emoji,
                        schedule_json,
                        title,
                    ],
                )?;
            }
            tx.commit()?;
            changed
        };

        if changed > 0 {
            self.notify_categories()?;
            if !initial_trackers.is_empty() {
                self.notify_trackers()?;
            }
        }
        Ok(())
    }

    /// Re-key a category; all member trackers move with it in the same
    /// commit. Renaming a category to its own title is a no-op.
    pub fn rename_category(&self, old_title: &str, new_title: &str) -> Result<()> {
        validate_title(new_title)?;
        {
            let conn = self.conn.lock().unwrap();
            if !Self::category_exists(&conn, old_title)? {
                return Err(Error::CategoryNotFound(old_title.to_string()));
            }
            if old_title == new_title {
                return Ok(());
            }
            if Self::category_exists(&conn, new_title)? {
                return Err(Error::DuplicateCategory(new_title.to_string()));
            }
            // Tracker join columns follow via ON UPDATE CASCADE
            conn.execute(
                "UPDATE categories SET title = ?2 WHERE title = ?1",
                params![old_title, new_title],
            )?;
        }
        tracing::debug!(old_title, new_title, "Renamed category");
        self.notify_categories()?;
        Ok(())
    }

    /// Delete a category. Its trackers are orphaned, not deleted: they stay
    /// in `list_trackers` (with their completion records) but belong to no
    /// category until reassigned.
    pub fn delete_category(&self, title: &str) -> Result<()> {
        {
            let conn = self.conn.lock().unwrap();
            let affected = conn.execute("DELETE FROM categories WHERE title = ?1", [title])?;
            if affected == 0 {
                return Err(Error::CategoryNotFound(title.to_string()));
            }
        }
        tracing::debug!(title, "Deleted category");
        self.notify_categories()?;
        Ok(())
    }

    fn category_exists(conn: &Connection, title: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE title = ?1",
            [title],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }

    // ============================================
    // Completion record operations
    // ============================================

    /// All completion records, date ascending.
    pub fn list_records(&self) -> Result<Vec<CompletionRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT tracker_id, date FROM completion_records ORDER BY date ASC, tracker_id ASC",
        )?;
        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Record a completion. Adding the same (tracker, date) pair twice is a
    /// silent no-op, keeping the toggle flow idempotent; no notification is
    /// fired for the no-op.
    pub fn add_record(&self, record: &CompletionRecord) -> Result<()> {
        let inserted = {
            let conn = self.conn.lock().unwrap();
            let tracker_count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM trackers WHERE id = ?1",
                [record.tracker_id.to_string()],
                |r| r.get(0),
            )?;
            if tracker_count == 0 {
                return Err(Error::TrackerNotFound(record.tracker_id));
            }
            conn.execute(
                "INSERT INTO completion_records (tracker_id, date) VALUES (?1, ?2)
                 ON CONFLICT(tracker_id, date) DO NOTHING",
                params![
                    record.tracker_id.to_string(),
                    record.date.format(DATE_FORMAT).to_string(),
                ],
            )?
        };
        if inserted > 0 {
            self.notify_records()?;
        }
        Ok(())
    }

    /// Delete a completion record if present; absence is not an error.
    pub fn delete_record(&self, tracker_id: Uuid, date: NaiveDate) -> Result<()> {
        let deleted = {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "DELETE FROM completion_records WHERE tracker_id = ?1 AND date = ?2",
                params![tracker_id.to_string(), date.format(DATE_FORMAT).to_string()],
            )?
        };
        if deleted > 0 {
            self.notify_records()?;
        }
        Ok(())
    }

    /// Point lookup for a single (tracker, date) completion.
    pub fn record(&self, tracker_id: Uuid, date: NaiveDate) -> Result<Option<CompletionRecord>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT tracker_id, date FROM completion_records
             WHERE tracker_id = ?1 AND date = ?2",
            params![tracker_id.to_string(), date.format(DATE_FORMAT).to_string()],
            Self::row_to_record,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Toggle the completion of a tracker on a date: delete the record if it
    /// exists, create it otherwise. Dates strictly after `today` are
    /// rejected without touching the store; completions cannot be logged for
    /// days that have not happened yet.
    pub fn toggle_record(
        &self,
        tracker_id: Uuid,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<ToggleOutcome> {
        if date > today {
            tracing::debug!(%tracker_id, %date, "Rejected completion toggle for future date");
            return Ok(ToggleOutcome::Rejected);
        }
        if self.record(tracker_id, date)?.is_some() {
            self.delete_record(tracker_id, date)?;
            Ok(ToggleOutcome::Uncompleted)
        } else {
            self.add_record(&CompletionRecord::new(tracker_id, date))?;
            Ok(ToggleOutcome::Completed)
        }
    }

    // ============================================
    // Row mapping
    // ============================================

    fn row_to_tracker(row: &Row) -> rusqlite::Result<Tracker> {
        let id_str: String = row.get("id")?;
        let color_str: String = row.get("color")?;
        let schedule_str: String = row.get("schedule")?;

        Ok(Tracker {
            id: Uuid::parse_str(&id_str).map_err(|e| text_error(0, e))?,
            title: row.get("title")?,
            color: color_str.parse().map_err(|e: String| text_error(2, e))?,
            emoji: row.get("emoji")?,
            schedule: serde_json::from_str(&schedule_str).map_err(|e| text_error(4, e))?,
        })
    }

    fn row_to_record(row: &Row) -> rusqlite::Result<CompletionRecord> {
        let id_str: String = row.get("tracker_id")?;
        let date_str: String = row.get("date")?;

        Ok(CompletionRecord {
            tracker_id: Uuid::parse_str(&id_str).map_err(|e| text_error(0, e))?,
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .map_err(|e| text_error(1, e))?,
        })
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidTitle(title.to_string()));
    }
    Ok(())
}

fn text_error(
    index: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, err.into())
}
