//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema
    r#"
    -- Categories are keyed by title; there is no surrogate id. Renaming a
    -- category re-keys this row and the tracker join column follows via
    -- ON UPDATE CASCADE.
    CREATE TABLE IF NOT EXISTS categories (
        title            TEXT PRIMARY KEY CHECK (length(title) > 0)
    );

    CREATE TABLE IF NOT EXISTS trackers (
        id               TEXT PRIMARY KEY,
        title            TEXT NOT NULL CHECK (length(title) > 0),
        color            TEXT NOT NULL,
        emoji            TEXT NOT NULL,
        schedule         JSON NOT NULL,

        -- Deleting a category orphans its trackers rather than deleting them
        category_title   TEXT REFERENCES categories(title)
                             ON UPDATE CASCADE
                             ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS completion_records (
        tracker_id       TEXT NOT NULL REFERENCES trackers(id) ON DELETE CASCADE,
        date             TEXT NOT NULL,

        PRIMARY KEY (tracker_id, date)
    );

    CREATE INDEX IF NOT EXISTS idx_trackers_category ON trackers(category_title);
    CREATE INDEX IF NOT EXISTS idx_records_date ON completion_records(date);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Run migrations twice - should be idempotent
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        // Check version
        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_tables_created() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let tables = ["categories", "trackers", "completion_records"];

        for table in tables {
            let exists: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        run_migrations(&conn).unwrap();

        let fk_of = |table: &str| -> Vec<String> {
            conn.prepare(&format!("PRAGMA foreign_key_list({})", table))
                .unwrap()
                .query_map([], |row| row.get::<_, String>(2))
                .unwrap()
                .filter_map(|r| r.ok())
                .collect()
        };

        assert!(
            fk_of("trackers").iter().any(|t| t == "categories"),
            "trackers should reference categories"
        );
        assert!(
            fk_of("completion_records").iter().any(|t| t == "trackers"),
            "completion_records should reference trackers"
        );
    }

    #[test]
    fn test_empty_titles_rejected_by_schema() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute("INSERT INTO categories (title) VALUES ('')", []);
        assert!(result.is_err());
    }
}
