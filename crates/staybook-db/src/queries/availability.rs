//! Per-date availability overrides for rooms and experiences.
//!
//! At most one row exists per (room, date) and per (experience, date);
//! setting an override again replaces the previous values in place.

use chrono::NaiveDate;
use rusqlite::Connection;
use staybook_core::{
    format, Error, ExperienceAvailabilityId, ExperienceId, Result, RoomAvailabilityId, RoomId,
};

use super::{db_err, execute_changed, experiences, query_all, query_opt, rooms};
use crate::models::{ExperienceAvailability, RoomAvailability};

const ROOM_COLS: &str = "id, room_id, date, is_available, reason";

const EXPERIENCE_COLS: &str = "id, experience_id, date, available_spots";

fn check_range(from: NaiveDate, to: NaiveDate) -> Result<()> {
    if to < from {
        return Err(Error::validation("date range end is before its start"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

/// Insert or replace the override for a room on `date`.
pub fn set_room_availability(
    conn: &Connection,
    room_id: RoomId,
    date: NaiveDate,
    is_available: bool,
    reason: Option<&str>,
) -> Result<RoomAvailability> {
    if rooms::get_room(conn, room_id)?.is_none() {
        return Err(Error::not_found("room", room_id));
    }

    conn.execute(
        "INSERT INTO room_availability (id, room_id, date, is_available, reason)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(room_id, date)
         DO UPDATE SET is_available = excluded.is_available, reason = excluded.reason",
        rusqlite::params![
            RoomAvailabilityId::new().to_string(),
            room_id.to_string(),
            format::date(date),
            is_available as i32,
            reason,
        ],
    )
    .map_err(db_err)?;

    get_room_availability(conn, room_id, date)?
        .ok_or_else(|| Error::Internal(format!("availability for room {room_id} vanished")))
}

pub fn get_room_availability(
    conn: &Connection,
    room_id: RoomId,
    date: NaiveDate,
) -> Result<Option<RoomAvailability>> {
    let q = format!("SELECT {ROOM_COLS} FROM room_availability WHERE room_id = ?1 AND date = ?2");
    query_opt(
        conn,
        &q,
        [room_id.to_string(), format::date(date)],
        RoomAvailability::from_row,
    )
}

/// Overrides for a room between `from` and `to`, inclusive, by date.
pub fn list_room_availability(
    conn: &Connection,
    room_id: RoomId,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<RoomAvailability>> {
    check_range(from, to)?;
    let q = format!(
        "SELECT {ROOM_COLS} FROM room_availability
         WHERE room_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date ASC"
    );
    query_all(
        conn,
        &q,
        [room_id.to_string(), format::date(from), format::date(to)],
        RoomAvailability::from_row,
    )
}

pub fn delete_room_availability(conn: &Connection, room_id: RoomId, date: NaiveDate) -> Result<bool> {
    execute_changed(
        conn,
        "DELETE FROM room_availability WHERE room_id = ?1 AND date = ?2",
        [room_id.to_string(), format::date(date)],
    )
}

// ---------------------------------------------------------------------------
// Experiences
// ---------------------------------------------------------------------------

/// Insert or replace the number of open spots for an experience on `date`.
pub fn set_experience_availability(
    conn: &Connection,
    experience_id: ExperienceId,
    date: NaiveDate,
    available_spots: i32,
) -> Result<ExperienceAvailability> {
    if available_spots < 0 {
        return Err(Error::validation("available_spots must not be negative"));
    }
    if experiences::get_experience(conn, experience_id)?.is_none() {
        return Err(Error::not_found("experience", experience_id));
    }

    conn.execute(
        "INSERT INTO experience_availability (id, experience_id, date, available_spots)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(experience_id, date)
         DO UPDATE SET available_spots = excluded.available_spots",
        rusqlite::params![
            ExperienceAvailabilityId::new().to_string(),
            experience_id.to_string(),
            format::date(date),
            available_spots,
        ],
    )
    .map_err(db_err)?;

    get_experience_availability(conn, experience_id, date)?.ok_or_else(|| {
        Error::Internal(format!("availability for experience {experience_id} vanished"))
    })
}

pub fn get_experience_availability(
    conn: &Connection,
    experience_id: ExperienceId,
    date: NaiveDate,
) -> Result<Option<ExperienceAvailability>> {
    let q = format!(
        "SELECT {EXPERIENCE_COLS} FROM experience_availability
         WHERE experience_id = ?1 AND date = ?2"
    );
    query_opt(
        conn,
        &q,
        [experience_id.to_string(), format::date(date)],
        ExperienceAvailability::from_row,
    )
}

/// Open spots for an experience between `from` and `to`, inclusive.
pub fn list_experience_availability(
    conn: &Connection,
    experience_id: ExperienceId,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<ExperienceAvailability>> {
    check_range(from, to)?;
    let q = format!(
        "SELECT {EXPERIENCE_COLS} FROM experience_availability
         WHERE experience_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date ASC"
    );
    query_all(
        conn,
        &q,
        [experience_id.to_string(), format::date(from), format::date(to)],
        ExperienceAvailability::from_row,
    )
}

pub fn delete_experience_availability(
    conn: &Connection,
    experience_id: ExperienceId,
    date: NaiveDate,
) -> Result<bool> {
    execute_changed(
        conn,
        "DELETE FROM experience_availability WHERE experience_id = ?1 AND date = ?2",
        [experience_id.to_string(), format::date(date)],
    )
}
