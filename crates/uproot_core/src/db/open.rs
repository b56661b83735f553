//! Connection bootstrap for the in-memory store.
//!
//! # Invariants
//! - Returned connections enforce foreign keys.
//! - Returned connections are migrated to the latest schema version.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::time::Instant;

/// Opens a fresh in-memory SQLite store and migrates it.
///
/// Emits one `store_open` event carrying the outcome and duration.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(|mut conn| {
            let applied = bootstrap(&mut conn)?;
            Ok((conn, applied))
        });
    let elapsed_ms = started_at.elapsed().as_millis();

    match result {
        Ok((conn, applied)) => {
            info!(
                "event=store_open module=db status=ok mode=memory migrations={} duration_ms={}",
                applied, elapsed_ms
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode=memory duration_ms={} error={}",
                elapsed_ms, err
            );
            Err(err)
        }
    }
}

fn bootstrap(conn: &mut Connection) -> DbResult<usize> {
    conn.pragma_update(None, "foreign_keys", true)?;
    apply_migrations(conn)
}
