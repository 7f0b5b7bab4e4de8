//! Durable storage backing the card deck slot and the drawing entry.
//!
//! Both slots live in one SQLite file; `local_slots` holds synchronous
//! string payloads and `kv_entries` holds JSON values for the async store.
//! A connection is only handed out once its schema is current.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The storage engine rejected an open, pragma, or schema statement.
    Engine(rusqlite::Error),
    /// The file was written by a newer build; refusing to touch it keeps
    /// saved decks and drawings intact for that build.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine(err) => write!(f, "storage engine error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "slot storage was written by a newer build (schema {found}, this build knows {supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Engine(value)
    }
}
