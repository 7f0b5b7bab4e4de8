//! Ordered schema steps for the slot database.
//!
//! Each step creates the table for one kind of durable slot. The highest
//! applied step is mirrored to `PRAGMA user_version`, so reopening a file
//! only runs the steps it has not seen.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// (version, label, sql). Versions start at 1 and grow by one.
const SCHEMA_STEPS: &[(u32, &str, &str)] = &[
    (1, "local_slots", include_str!("0001_local_slots.sql")),
    (2, "kv_entries", include_str!("0002_kv_entries.sql")),
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |&(version, _, _)| version)
}

fn pending_steps(stored: u32) -> impl Iterator<Item = &'static (u32, &'static str, &'static str)> {
    SCHEMA_STEPS
        .iter()
        .skip_while(move |&&(version, _, _)| version <= stored)
}

/// Brings the connection's schema up to [`latest_version`].
///
/// All pending steps share one transaction, so a failing step leaves the
/// stored version untouched.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stored: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_version();
    if stored > supported {
        return Err(DbError::SchemaTooNew {
            found: stored,
            supported,
        });
    }

    let mut steps = pending_steps(stored).peekable();
    if steps.peek().is_none() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for &(version, label, sql) in steps {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        info!("event=schema_step module=db status=ok version={version} table={label}");
    }
    tx.commit()?;
    Ok(())
}
