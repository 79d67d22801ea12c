//! SQLite-backed key-value storage for application state.
//!
//! The engine snapshot lives here as one JSON document per key.

use std::path::Path;

use rusqlite::{params, Connection};

use super::data_dir;
use crate::error::{CoreError, DatabaseError};

/// SQLite database holding the `kv` table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/breakbuddy/breakbuddy.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("breakbuddy.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bb.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.kv_set("k", "v").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn open_at_reports_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("nested").join("bb.db");
        assert!(matches!(
            Database::open_at(&path),
            Err(DatabaseError::OpenFailed { .. })
        ));
    }
}
