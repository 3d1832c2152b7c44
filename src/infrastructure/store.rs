//! # Record Store
//!
//! SQLite persistence for users and submitted applications.
//! Two tables, created on open; no migrations.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::domain::types::{Application, User};

pub const DEFAULT_STATUS: &str = "new";

/// Lexically sortable, so `ORDER BY` on the text column follows time.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub struct RecordStore {
    conn: Mutex<Connection>,
}

impl RecordStore {
    /// Open (or create) the database at `path`. `":memory:"` gives an
    /// ephemeral store for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                user_id    INTEGER PRIMARY KEY,
                username   TEXT,
                first_name TEXT,
                last_name  TEXT,
                join_date  TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS applications (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id    INTEGER REFERENCES users(user_id),
                full_name  TEXT NOT NULL,
                city       TEXT NOT NULL,
                phone      TEXT NOT NULL,
                status     TEXT DEFAULT 'new',
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_applications_user ON applications(user_id);
            ",
        )
        .context("failed to create database schema")?;

        tracing::info!("Record store ready at {}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Panics only if another thread panicked while holding the lock.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Insert or refresh the user row. The join date is written once and
    /// never touched by later calls.
    pub fn upsert_user(
        &self,
        user_id: i64,
        username: Option<&str>,
        first_name: &str,
        last_name: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO users (user_id, username, first_name, last_name, join_date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                 username = excluded.username,
                 first_name = excluded.first_name,
                 last_name = excluded.last_name",
            params![user_id, username, first_name, last_name, now()],
        )
        .with_context(|| format!("failed to upsert user {user_id}"))?;
        Ok(())
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT user_id, username, first_name, last_name, join_date
             FROM users WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    first_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    last_name: row.get(3)?,
                    join_date: timestamp(row, 4)?,
                })
            },
        )
        .optional()
        .with_context(|| format!("failed to load user {user_id}"))
    }

    /// Insert a new application with the default status and return its id.
    pub fn insert_application(
        &self,
        user_id: i64,
        full_name: &str,
        city: &str,
        phone: &str,
    ) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO applications (user_id, full_name, city, phone, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![user_id, full_name, city, phone, DEFAULT_STATUS, now()],
        )
        .with_context(|| format!("failed to insert application for user {user_id}"))?;
        Ok(conn.last_insert_rowid())
    }

    /// All applications of one user, newest first.
    pub fn list_applications_for_user(&self, user_id: i64) -> Result<Vec<Application>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, full_name, city, phone, status, created_at
                 FROM applications WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )
            .context("failed to prepare applications query")?;

        let apps = stmt
            .query_map(params![user_id], |row| {
                Ok(Application {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    full_name: row.get(2)?,
                    city: row.get(3)?,
                    phone: row.get(4)?,
                    status: row
                        .get::<_, Option<String>>(5)?
                        .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
                    created_at: timestamp(row, 6)?,
                })
            })
            .context("failed to query applications")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read application row")?;

        Ok(apps)
    }

    pub fn count_applications(&self) -> Result<i64> {
        let conn = self.conn();
        conn.query_row("SELECT COUNT(*) FROM applications", [], |row| row.get(0))
            .context("failed to count applications")
    }
}

fn now() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Reads our own format as well as SQLite's `CURRENT_TIMESTAMP` output.
fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> RecordStore {
        RecordStore::open(":memory:").expect("in-memory database should open")
    }

    #[test]
    fn test_open_creates_tables() {
        let store = test_store();
        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"applications".to_string()));
    }

    #[test]
    fn test_upsert_preserves_join_date() {
        let store = test_store();
        store
            .upsert_user(1, Some("ivan"), "Ivan", Some("Ivanov"))
            .unwrap();
        let first = store.get_user(1).unwrap().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        store.upsert_user(1, Some("ivan2"), "Vanya", None).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.upsert_user(1, None, "Ivan", Some("Petrov")).unwrap();

        let last = store.get_user(1).unwrap().unwrap();
        assert_eq!(last.join_date, first.join_date);
        assert_eq!(last.first_name, "Ivan");
        assert_eq!(last.last_name.as_deref(), Some("Petrov"));
        assert_eq!(last.username, None);
    }

    #[test]
    fn test_get_unknown_user() {
        let store = test_store();
        assert!(store.get_user(404).unwrap().is_none());
    }

    #[test]
    fn test_insert_application_defaults_and_ids() {
        let store = test_store();
        store.upsert_user(1, None, "Ivan", None).unwrap();

        let first = store
            .insert_application(1, "Ivan Ivanov", "Moscow", "+79991234567")
            .unwrap();
        let second = store
            .insert_application(1, "Ivan Ivanov", "Kazan", "89991234567")
            .unwrap();
        assert!(second > first);
        assert_eq!(store.count_applications().unwrap(), 2);

        let apps = store.list_applications_for_user(1).unwrap();
        let row = apps.iter().find(|a| a.id == first).unwrap();
        assert_eq!(row.full_name, "Ivan Ivanov");
        assert_eq!(row.city, "Moscow");
        assert_eq!(row.phone, "+79991234567");
        assert_eq!(row.status, "new");
    }

    #[test]
    fn test_application_requires_user() {
        let store = test_store();
        assert!(store
            .insert_application(99, "Ghost User", "Nowhere", "9991234567")
            .is_err());
        assert_eq!(store.count_applications().unwrap(), 0);
    }

    #[test]
    fn test_list_is_newest_first_and_user_scoped() {
        let store = test_store();
        store.upsert_user(1, None, "A", None).unwrap();
        store.upsert_user(2, None, "B", None).unwrap();

        let a1 = store.insert_application(1, "A One", "Omsk", "9991234567").unwrap();
        let b1 = store.insert_application(2, "B One", "Tver", "9991234567").unwrap();
        let a2 = store.insert_application(1, "A Two", "Perm", "9991234567").unwrap();

        let apps = store.list_applications_for_user(1).unwrap();
        let ids: Vec<i64> = apps.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![a2, a1]);
        assert!(apps.iter().all(|a| a.user_id == 1));
        assert!(apps[0].created_at >= apps[1].created_at);

        let other = store.list_applications_for_user(2).unwrap();
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].id, b1);
    }

    #[test]
    fn test_reads_sqlite_default_timestamp() {
        let store = test_store();
        store
            .conn()
            .execute("INSERT INTO users (user_id, first_name) VALUES (7, 'Legacy')", [])
            .unwrap();
        let user = store.get_user(7).unwrap().unwrap();
        assert_eq!(user.first_name, "Legacy");
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bot.db");
        let path = path.to_str().unwrap();

        let id = {
            let store = RecordStore::open(path).unwrap();
            store.upsert_user(1, None, "Ivan", None).unwrap();
            store
                .insert_application(1, "Ivan Ivanov", "Moscow", "+79991234567")
                .unwrap()
        };

        let store = RecordStore::open(path).unwrap();
        assert_eq!(store.count_applications().unwrap(), 1);
        let next = store
            .insert_application(1, "Ivan Ivanov", "Moscow", "+79991234567")
            .unwrap();
        assert!(next > id);
    }
}
