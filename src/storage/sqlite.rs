//! SQLite-backed key-value store
//!
//! Keeps all slots in a single `kv` table of `shop.db`, for setups that
//! prefer one database file over loose JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::kv::{KeyValueStore, KvError};

/// Key-value store on top of a SQLite database
pub struct SqliteKv {
    /// Path to the database, `None` for in-memory databases
    db_path: Option<PathBuf>,

    conn: Connection,
}

impl SqliteKv {
    /// Opens (or creates) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, KvError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| KvError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;

        // WAL lets a reader and a writer from separate invocations overlap
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::init(Some(path.to_path_buf()), conn)
    }

    /// Opens a private in-memory database
    pub fn in_memory() -> Result<Self, KvError> {
        Self::init(None, Connection::open_in_memory()?)
    }

    fn init(db_path: Option<PathBuf>, conn: Connection) -> Result<Self, KvError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        Ok(Self { db_path, conn })
    }

    /// Returns the database path, if file-backed
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn in_memory_get_set() {
        let kv = SqliteKv::in_memory().unwrap();
        assert_eq!(kv.get("shoppingItems").unwrap(), None);

        kv.set("shoppingItems", "[]").unwrap();
        kv.set("shoppingItems", "[1]").unwrap();
        assert_eq!(kv.get("shoppingItems").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db").join("shop.db");

        {
            let kv = SqliteKv::open(&path).unwrap();
            kv.set("shoppingItems", r#"[{"id":"1"}]"#).unwrap();
            assert_eq!(kv.path(), Some(path.as_path()));
        }

        let kv = SqliteKv::open(&path).unwrap();
        assert_eq!(
            kv.get("shoppingItems").unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
    }
}
