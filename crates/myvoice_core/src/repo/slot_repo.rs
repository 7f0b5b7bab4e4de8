//! Synchronous durable slot storage.
//!
//! # Responsibility
//! - Hold one serialized document per fixed slot key.
//! - Survive process restarts when backed by a SQLite file.
//!
//! # Invariants
//! - `write_slot` replaces the whole payload; there is no partial update.
//! - `read_slot` returns `None` for a key that was never written.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SlotResult<T> = Result<T, SlotError>;

/// Slot storage fault.
#[derive(Debug)]
pub enum SlotError {
    Db(DbError),
    Unavailable(String),
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "slot storage unavailable: {message}"),
        }
    }
}

impl Error for SlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for SlotError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SlotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Engine(value))
    }
}

/// Synchronous key -> document storage.
pub trait SlotStore {
    fn read_slot(&self, key: &str) -> SlotResult<Option<String>>;
    fn write_slot(&self, key: &str, payload: &str) -> SlotResult<()>;
}

impl<S: SlotStore + ?Sized> SlotStore for &S {
    fn read_slot(&self, key: &str) -> SlotResult<Option<String>> {
        (**self).read_slot(key)
    }

    fn write_slot(&self, key: &str, payload: &str) -> SlotResult<()> {
        (**self).write_slot(key, payload)
    }
}

/// SQLite-backed slot store over the `local_slots` table.
pub struct SqliteSlotStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotStore for SqliteSlotStore<'_> {
    fn read_slot(&self, key: &str) -> SlotResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM local_slots WHERE slot_key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn write_slot(&self, key: &str, payload: &str) -> SlotResult<()> {
        self.conn.execute(
            "INSERT INTO local_slots (slot_key, payload)
             VALUES (?1, ?2)
             ON CONFLICT(slot_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, payload],
        )?;
        Ok(())
    }
}

/// In-memory slot store for tests and ephemeral sessions.
///
/// Writes can be made to fail to exercise storage-fault paths.
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Seeds a raw payload without counting it as a write.
    pub fn seed(&self, key: &str, payload: &str) {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), payload.to_string());
    }
}

impl SlotStore for MemorySlotStore {
    fn read_slot(&self, key: &str) -> SlotResult<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write_slot(&self, key: &str, payload: &str) -> SlotResult<()> {
        if self.fail_writes.get() {
            return Err(SlotError::Unavailable("writes disabled".to_string()));
        }
        self.slots
            .borrow_mut()
            .insert(key.to_string(), payload.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
