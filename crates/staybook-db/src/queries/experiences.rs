//! Experience CRUD and weekly schedules.

use chrono::{NaiveTime, Utc};
use rusqlite::Connection;
use staybook_core::{format, DayOfWeek, Error, ExperienceId, ExperienceScheduleId, Result};

use super::{constraint_err, db_err, execute_changed, query_all, query_opt};
use crate::detail::ExperienceDetail;
use crate::models::{Experience, ExperienceSchedule};

const COLS: &str = "id, name, description, price, max_capacity, duration_hours, image_url,
    is_active, created_at";

const SCHEDULE_COLS: &str = "id, experience_id, day_of_week, start_time";

/// Mutable experience fields, used by create and update.
#[derive(Debug, Clone)]
pub struct NewExperience<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: f64,
    pub max_capacity: i32,
    pub duration_hours: Option<i32>,
    pub image_url: Option<&'a str>,
}

impl NewExperience<'_> {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("experience name is required"));
        }
        if self.price < 0.0 {
            return Err(Error::validation("experience price must not be negative"));
        }
        if self.max_capacity <= 0 {
            return Err(Error::validation("max_capacity must be positive"));
        }
        Ok(())
    }
}

/// Create a new, active experience.
pub fn create_experience(conn: &Connection, new: &NewExperience<'_>) -> Result<Experience> {
    new.validate()?;
    let id = ExperienceId::new();
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO experiences (id, name, description, price, max_capacity, duration_hours,
            image_url, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)",
        rusqlite::params![
            id.to_string(),
            new.name,
            new.description,
            new.price,
            new.max_capacity,
            new.duration_hours,
            new.image_url,
            format::timestamp(created_at),
        ],
    )
    .map_err(db_err)?;

    Ok(Experience {
        id,
        name: new.name.to_string(),
        description: new.description.map(String::from),
        price: new.price,
        max_capacity: new.max_capacity,
        duration_hours: new.duration_hours,
        image_url: new.image_url.map(String::from),
        is_active: true,
        created_at,
    })
}

pub fn get_experience(conn: &Connection, id: ExperienceId) -> Result<Option<Experience>> {
    let q = format!("SELECT {COLS} FROM experiences WHERE id = ?1");
    query_opt(conn, &q, [id.to_string()], Experience::from_row)
}

/// List experiences by name, optionally only active ones.
pub fn list_experiences(conn: &Connection, active_only: bool) -> Result<Vec<Experience>> {
    let q = format!(
        "SELECT {COLS} FROM experiences WHERE (?1 = 0 OR is_active = 1) ORDER BY name ASC"
    );
    query_all(conn, &q, [active_only as i32], Experience::from_row)
}

/// Overwrite the mutable fields of an experience.
pub fn update_experience(
    conn: &Connection,
    id: ExperienceId,
    new: &NewExperience<'_>,
) -> Result<bool> {
    new.validate()?;
    execute_changed(
        conn,
        "UPDATE experiences SET name = ?1, description = ?2, price = ?3, max_capacity = ?4,
            duration_hours = ?5, image_url = ?6
         WHERE id = ?7",
        rusqlite::params![
            new.name,
            new.description,
            new.price,
            new.max_capacity,
            new.duration_hours,
            new.image_url,
            id.to_string(),
        ],
    )
}

pub fn set_active(conn: &Connection, id: ExperienceId, active: bool) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE experiences SET is_active = ?1 WHERE id = ?2",
        rusqlite::params![active as i32, id.to_string()],
    )
}

/// Delete an experience and its schedules.
///
/// Fails with a conflict while bookings, packages, availability rows or
/// cart items still reference it; nothing is removed in that case.
pub fn delete_experience(conn: &Connection, id: ExperienceId) -> Result<bool> {
    let tx = conn.unchecked_transaction().map_err(db_err)?;

    let schedules = tx
        .execute(
            "DELETE FROM experience_schedules WHERE experience_id = ?1",
            [id.to_string()],
        )
        .map_err(db_err)?;
    let n = tx
        .execute("DELETE FROM experiences WHERE id = ?1", [id.to_string()])
        .map_err(|e| constraint_err(e, || format!("Experience {id} is still referenced")))?;

    tx.commit().map_err(db_err)?;

    if n > 0 {
        tracing::info!("Deleted experience {id} with {schedules} schedule(s)");
    }
    Ok(n > 0)
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

/// Add a weekly start time to an experience.
pub fn add_schedule(
    conn: &Connection,
    experience_id: ExperienceId,
    day_of_week: DayOfWeek,
    start_time: NaiveTime,
) -> Result<ExperienceSchedule> {
    if get_experience(conn, experience_id)?.is_none() {
        return Err(Error::not_found("experience", experience_id));
    }

    let id = ExperienceScheduleId::new();
    conn.execute(
        "INSERT INTO experience_schedules (id, experience_id, day_of_week, start_time)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            id.to_string(),
            experience_id.to_string(),
            day_of_week.as_str(),
            format::stored_time(start_time),
        ],
    )
    .map_err(db_err)?;

    Ok(ExperienceSchedule {
        id,
        experience_id,
        day_of_week,
        start_time,
    })
}

/// Schedules for an experience, Monday first, then by start time.
pub fn list_schedules(
    conn: &Connection,
    experience_id: ExperienceId,
) -> Result<Vec<ExperienceSchedule>> {
    let q = format!("SELECT {SCHEDULE_COLS} FROM experience_schedules WHERE experience_id = ?1");
    let mut rows = query_all(
        conn,
        &q,
        [experience_id.to_string()],
        ExperienceSchedule::from_row,
    )?;
    rows.sort_by_key(|s| (s.day_of_week.index(), s.start_time));
    Ok(rows)
}

pub fn delete_schedule(conn: &Connection, id: ExperienceScheduleId) -> Result<bool> {
    execute_changed(
        conn,
        "DELETE FROM experience_schedules WHERE id = ?1",
        [id.to_string()],
    )
}

/// Load an experience together with its schedules.
pub fn load_detail(conn: &Connection, id: ExperienceId) -> Result<Option<ExperienceDetail>> {
    let Some(experience) = get_experience(conn, id)? else {
        return Ok(None);
    };
    let schedules = list_schedules(conn, id)?;
    Ok(Some(ExperienceDetail {
        experience,
        schedules,
    }))
}
