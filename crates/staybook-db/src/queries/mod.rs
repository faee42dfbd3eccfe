//! Database query modules, one per entity.
//!
//! Every function takes a plain `&Connection` so callers decide whether it
//! runs inside a transaction. Multi-row deletes open their own transaction.

pub mod availability;
pub mod booking_extras;
pub mod booking_items;
pub mod booking_rooms;
pub mod bookings;
pub mod email_logs;
pub mod experiences;
pub mod extras;
pub mod packages;
pub mod rooms;
pub mod users;

use rusqlite::{Connection, OptionalExtension, Params, Row};
use staybook_core::{Error, Result};

pub(crate) fn db_err(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

/// Map a failed write; UNIQUE and FOREIGN KEY violations become
/// [`Error::Conflict`] with the message built by `conflict`.
pub(crate) fn constraint_err(e: rusqlite::Error, conflict: impl FnOnce() -> String) -> Error {
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint failed") || msg.contains("FOREIGN KEY constraint failed") {
        Error::Conflict(conflict())
    } else {
        Error::database(msg)
    }
}

/// Run a single-row query, mapping "no rows" to `None`.
pub(crate) fn query_opt<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    f: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Option<T>> {
    conn.query_row(sql, params, f).optional().map_err(db_err)
}

/// Run a multi-row query and collect every mapped row.
pub(crate) fn query_all<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    f: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql).map_err(db_err)?;
    let rows = stmt
        .query_map(params, f)
        .map_err(db_err)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(db_err)?;
    Ok(rows)
}

/// Execute a statement and report whether any row changed.
pub(crate) fn execute_changed<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<bool> {
    let n = conn.execute(sql, params).map_err(db_err)?;
    Ok(n > 0)
}
