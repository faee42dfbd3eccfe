//! Add-on extras (breakfast, transfers, ...).

use chrono::Utc;
use rusqlite::Connection;
use staybook_core::{format, Error, ExtraId, ExtraType, Result};

use super::{constraint_err, db_err, execute_changed, query_all, query_opt};
use crate::models::Extra;

const COLS: &str = "id, name, description, price, extra_type, image_url, is_active, created_at";

fn validate(name: &str, price: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("extra name is required"));
    }
    if price < 0.0 {
        return Err(Error::validation("extra price must not be negative"));
    }
    Ok(())
}

/// Create a new, active extra.
pub fn create_extra(
    conn: &Connection,
    name: &str,
    description: Option<&str>,
    price: f64,
    extra_type: ExtraType,
    image_url: Option<&str>,
) -> Result<Extra> {
    validate(name, price)?;
    let id = ExtraId::new();
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO extras (id, name, description, price, extra_type, image_url, is_active,
            created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
        rusqlite::params![
            id.to_string(),
            name,
            description,
            price,
            extra_type.as_str(),
            image_url,
            format::timestamp(created_at),
        ],
    )
    .map_err(db_err)?;

    Ok(Extra {
        id,
        name: name.to_string(),
        description: description.map(String::from),
        price,
        extra_type,
        image_url: image_url.map(String::from),
        is_active: true,
        created_at,
    })
}

pub fn get_extra(conn: &Connection, id: ExtraId) -> Result<Option<Extra>> {
    let q = format!("SELECT {COLS} FROM extras WHERE id = ?1");
    query_opt(conn, &q, [id.to_string()], Extra::from_row)
}

/// List extras by name, optionally only active ones.
pub fn list_extras(conn: &Connection, active_only: bool) -> Result<Vec<Extra>> {
    let q = format!("SELECT {COLS} FROM extras WHERE (?1 = 0 OR is_active = 1) ORDER BY name ASC");
    query_all(conn, &q, [active_only as i32], Extra::from_row)
}

/// Overwrite the mutable fields of an extra.
pub fn update_extra(
    conn: &Connection,
    id: ExtraId,
    name: &str,
    description: Option<&str>,
    price: f64,
    extra_type: ExtraType,
    image_url: Option<&str>,
) -> Result<bool> {
    validate(name, price)?;
    execute_changed(
        conn,
        "UPDATE extras SET name = ?1, description = ?2, price = ?3, extra_type = ?4,
            image_url = ?5
         WHERE id = ?6",
        rusqlite::params![
            name,
            description,
            price,
            extra_type.as_str(),
            image_url,
            id.to_string(),
        ],
    )
}

pub fn set_active(conn: &Connection, id: ExtraId, active: bool) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE extras SET is_active = ?1 WHERE id = ?2",
        rusqlite::params![active as i32, id.to_string()],
    )
}

/// Delete an extra. Fails with a conflict while bookings or packages
/// still reference it.
pub fn delete_extra(conn: &Connection, id: ExtraId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM extras WHERE id = ?1", [id.to_string()])
        .map_err(|e| constraint_err(e, || format!("Extra {id} is still referenced")))?;
    Ok(n > 0)
}
