//! Key-value persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the byte-level `load`/`save` collaborator the core persists into.
//! - Provide a SQLite-backed store for devices and an in-memory store for
//!   tests and the CLI.
//!
//! # Invariants
//! - `save` replaces the whole value stored under `key`.
//! - `load` of a never-written key returns `Ok(None)`, not an error.

use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::rc::Rc;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for key-value and typed state operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Encode {
        key: String,
        source: serde_json::Error,
    },
    Decode {
        key: String,
        source: serde_json::Error,
    },
    /// Store refused the write (used by test doubles).
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
            Self::Decode { key, source } => write!(f, "failed to decode `{key}`: {source}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode { source, .. } | Self::Decode { source, .. } => Some(source),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Byte-level durable store keyed by string.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> RepoResult<Option<Vec<u8>>>;
    fn save(&self, key: &str, bytes: &[u8]) -> RepoResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn load(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, bytes: &[u8]) -> RepoResult<()> {
        (**self).save(key, bytes)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn load(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, bytes: &[u8]) -> RepoResult<()> {
        (**self).save(key, bytes)
    }
}

/// SQLite-backed key-value store over the `kv_entries` table.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Opens (or creates) a store file with migrations applied.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a throwaway in-memory store with migrations applied.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an already-migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Returns stored keys in ascending order.
    pub fn keys(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl std::fmt::Debug for SqliteKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteKeyValueStore")
            .field("path", &self.conn.path())
            .finish_non_exhaustive()
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn load(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, bytes: &[u8]) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, bytes],
        )?;
        Ok(())
    }
}

/// In-memory key-value store that records every write.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RefCell<BTreeMap<String, Vec<u8>>>,
    write_log: RefCell<Vec<String>>,
    reject_writes: Cell<bool>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value without recording it as a write.
    pub fn insert_raw(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), bytes.into());
    }

    /// Returns a copy of the raw value stored under `key`.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.borrow().get(key).cloned()
    }

    /// Keys of every accepted write, in call order.
    pub fn write_log(&self) -> Vec<String> {
        self.write_log.borrow().clone()
    }

    /// Number of accepted writes for `key`.
    pub fn write_count(&self, key: &str) -> usize {
        self.write_log
            .borrow()
            .iter()
            .filter(|logged| logged.as_str() == key)
            .count()
    }

    pub fn clear_write_log(&self) {
        self.write_log.borrow_mut().clear();
    }

    /// Makes subsequent `save` calls fail with `RepoError::Unavailable`.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn load(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        Ok(self.raw(key))
    }

    fn save(&self, key: &str, bytes: &[u8]) -> RepoResult<()> {
        if self.reject_writes.get() {
            return Err(RepoError::Unavailable(format!("write to `{key}` rejected")));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), bytes.to_vec());
        self.write_log.borrow_mut().push(key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKeyValueStore, RepoError, SqliteKeyValueStore};

    #[test]
    fn sqlite_store_returns_none_for_missing_key() {
        let store = SqliteKeyValueStore::open_in_memory().expect("open store");
        assert!(store.load("missing").expect("load").is_none());
    }

    #[test]
    fn sqlite_store_overwrites_existing_value() {
        let store = SqliteKeyValueStore::open_in_memory().expect("open store");
        store.save("k", b"first").expect("first save");
        store.save("k", b"second").expect("second save");

        assert_eq!(store.load("k").expect("load"), Some(b"second".to_vec()));
        assert_eq!(store.keys().expect("keys"), vec!["k".to_string()]);
    }

    #[test]
    fn memory_store_records_writes_and_can_reject_them() {
        let store = MemoryKeyValueStore::new();
        store.insert_raw("seeded", "x");
        store.save("a", b"1").expect("save a");
        store.save("a", b"2").expect("save a again");

        assert_eq!(store.write_count("a"), 2);
        assert_eq!(store.write_count("seeded"), 0);

        store.set_reject_writes(true);
        let err = store.save("a", b"3").expect_err("write should be rejected");
        assert!(matches!(err, RepoError::Unavailable(_)));
        assert_eq!(store.raw("a"), Some(b"2".to_vec()));
    }
}
