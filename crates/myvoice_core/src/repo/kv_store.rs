//! Asynchronous durable key-value capability.
//!
//! # Responsibility
//! - Store structured JSON values by string key behind an async boundary.
//! - Provide a SQLite implementation and an in-memory implementation with
//!   fault and latency injection.
//!
//! # Invariants
//! - `set` replaces the previous value for the key.
//! - `get` on a never-written key returns `Ok(None)`, never an error.

use crate::db::DbError;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type KvResult<T> = Result<T, KvError>;

/// Key-value storage fault.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    Serialization(serde_json::Error),
    Unavailable(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "value serialization failed: {err}"),
            Self::Unavailable(message) => write!(f, "key-value store unavailable: {message}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Engine(value))
    }
}

impl From<serde_json::Error> for KvError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Durable, asynchronous, process-external key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> KvResult<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> KvResult<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    async fn get(&self, key: &str) -> KvResult<Option<Value>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> KvResult<()> {
        (**self).set(key, value).await
    }
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> KvResult<Option<Value>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> KvResult<()> {
        (**self).set(key, value).await
    }
}

/// SQLite-backed store over the `kv_entries` table.
///
/// Queries are short and run inline on the calling task.
pub struct SqliteKeyValueStore {
    conn: Mutex<Connection>,
}

impl SqliteKeyValueStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> KvResult<T>) -> KvResult<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| KvError::Unavailable("connection lock poisoned".to_string()))?;
        f(&conn)
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> KvResult<Option<Value>> {
        let text = self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT value_json FROM kv_entries WHERE entry_key = ?1;",
                    [key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?)
        })?;

        match text {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> KvResult<()> {
        let text = serde_json::to_string(&value)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_entries (entry_key, value_json)
                 VALUES (?1, ?2)
                 ON CONFLICT(entry_key) DO UPDATE SET
                    value_json = excluded.value_json,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![key, text],
            )?;
            Ok(())
        })
    }
}

/// In-memory store with injectable faults and read latency.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, Value>>,
    read_delay: Option<Duration>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every `get` by `delay` (tokio time, so pausable in tests).
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns the raw stored value, bypassing latency and faults.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.lock_entries().ok()?.get(key).cloned()
    }

    /// Seeds a raw value without counting it as a write.
    pub fn seed(&self, key: &str, value: Value) {
        if let Ok(mut entries) = self.lock_entries() {
            entries.insert(key.to_string(), value);
        }
    }

    fn lock_entries(&self) -> KvResult<std::sync::MutexGuard<'_, HashMap<String, Value>>> {
        self.entries
            .lock()
            .map_err(|_| KvError::Unavailable("entries lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> KvResult<Option<Value>> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.lock_entries()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> KvResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable("writes disabled".to_string()));
        }
        self.lock_entries()?.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
    use crate::db::open_db_in_memory;
    use serde_json::json;

    #[tokio::test]
    async fn sqlite_store_roundtrips_structured_values() {
        let store = SqliteKeyValueStore::new(open_db_in_memory().expect("db should open"));

        assert_eq!(store.get("k").await.expect("get"), None);
        store.set("k", json!([{"a": 1}])).await.expect("set");
        store.set("k", json!([])).await.expect("overwrite");
        assert_eq!(store.get("k").await.expect("get"), Some(json!([])));
    }

    #[tokio::test]
    async fn memory_store_reports_injected_faults() {
        let store = MemoryKeyValueStore::new();
        store.set_fail_writes(true);
        assert!(store.set("k", json!(1)).await.is_err());
        assert_eq!(store.write_count(), 0);

        store.seed("k", json!(2));
        store.set_fail_reads(true);
        assert!(store.get("k").await.is_err());
        assert_eq!(store.peek("k"), Some(json!(2)));
    }
}
