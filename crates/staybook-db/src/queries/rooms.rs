//! Room CRUD.

use chrono::{NaiveTime, Utc};
use rusqlite::Connection;
use serde_json::Value;
use staybook_core::{format, Error, Result, RoomId};

use super::{constraint_err, db_err, execute_changed, query_all, query_opt};
use crate::models::Room;

const COLS: &str = "id, name, description, capacity, price_per_night, image_url, amenities,
    is_active, check_in_time, check_out_time, created_at";

/// Mutable room fields, used by create and update. Missing check-in and
/// check-out times fall back to 15:00 and 11:00.
#[derive(Debug, Clone, Default)]
pub struct NewRoom<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub capacity: i32,
    pub price_per_night: f64,
    pub image_url: Option<&'a str>,
    pub amenities: Option<&'a Value>,
    pub check_in_time: Option<NaiveTime>,
    pub check_out_time: Option<NaiveTime>,
}

fn default_check_in() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_check_out() -> NaiveTime {
    NaiveTime::from_hms_opt(11, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl NewRoom<'_> {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("room name is required"));
        }
        if self.capacity <= 0 {
            return Err(Error::validation("room capacity must be positive"));
        }
        if self.price_per_night < 0.0 {
            return Err(Error::validation("price_per_night must not be negative"));
        }
        Ok(())
    }

    fn times(&self) -> (NaiveTime, NaiveTime) {
        (
            self.check_in_time.unwrap_or_else(default_check_in),
            self.check_out_time.unwrap_or_else(default_check_out),
        )
    }

    fn amenities_json(&self) -> Option<String> {
        self.amenities.map(Value::to_string)
    }
}

/// Create a new, active room.
pub fn create_room(conn: &Connection, new: &NewRoom<'_>) -> Result<Room> {
    new.validate()?;
    let id = RoomId::new();
    let created_at = Utc::now();
    let (check_in_time, check_out_time) = new.times();

    conn.execute(
        "INSERT INTO rooms (id, name, description, capacity, price_per_night, image_url,
            amenities, is_active, check_in_time, check_out_time, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9, ?10)",
        rusqlite::params![
            id.to_string(),
            new.name,
            new.description,
            new.capacity,
            new.price_per_night,
            new.image_url,
            new.amenities_json(),
            format::stored_time(check_in_time),
            format::stored_time(check_out_time),
            format::timestamp(created_at),
        ],
    )
    .map_err(db_err)?;

    Ok(Room {
        id,
        name: new.name.to_string(),
        description: new.description.map(String::from),
        capacity: new.capacity,
        price_per_night: new.price_per_night,
        image_url: new.image_url.map(String::from),
        amenities: new.amenities.cloned(),
        is_active: true,
        check_in_time,
        check_out_time,
        created_at,
    })
}

pub fn get_room(conn: &Connection, id: RoomId) -> Result<Option<Room>> {
    let q = format!("SELECT {COLS} FROM rooms WHERE id = ?1");
    query_opt(conn, &q, [id.to_string()], Room::from_row)
}

/// List rooms by name, optionally only active ones.
pub fn list_rooms(conn: &Connection, active_only: bool) -> Result<Vec<Room>> {
    let q = format!("SELECT {COLS} FROM rooms WHERE (?1 = 0 OR is_active = 1) ORDER BY name ASC");
    query_all(conn, &q, [active_only as i32], Room::from_row)
}

/// Overwrite the mutable fields of a room.
pub fn update_room(conn: &Connection, id: RoomId, new: &NewRoom<'_>) -> Result<bool> {
    new.validate()?;
    let (check_in_time, check_out_time) = new.times();
    execute_changed(
        conn,
        "UPDATE rooms SET name = ?1, description = ?2, capacity = ?3, price_per_night = ?4,
            image_url = ?5, amenities = ?6, check_in_time = ?7, check_out_time = ?8
         WHERE id = ?9",
        rusqlite::params![
            new.name,
            new.description,
            new.capacity,
            new.price_per_night,
            new.image_url,
            new.amenities_json(),
            format::stored_time(check_in_time),
            format::stored_time(check_out_time),
            id.to_string(),
        ],
    )
}

pub fn set_active(conn: &Connection, id: RoomId, active: bool) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE rooms SET is_active = ?1 WHERE id = ?2",
        rusqlite::params![active as i32, id.to_string()],
    )
}

/// Delete a room. Fails with a conflict while bookings, packages or
/// availability rows still reference it.
pub fn delete_room(conn: &Connection, id: RoomId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM rooms WHERE id = ?1", [id.to_string()])
        .map_err(|e| constraint_err(e, || format!("Room {id} is still referenced")))?;
    Ok(n > 0)
}
