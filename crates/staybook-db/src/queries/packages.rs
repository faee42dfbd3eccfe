//! Packages bundling a room, an experience and included extras.

use chrono::Utc;
use rusqlite::Connection;
use staybook_core::{
    format, Error, ExperienceId, ExtraId, PackageExtraId, PackageId, Result, RoomId,
};

use super::{
    constraint_err, db_err, execute_changed, experiences, extras, query_all, query_opt, rooms,
};
use crate::detail::PackageDetail;
use crate::models::{Package, PackageExtra};

const COLS: &str = "id, name, description, price, image_url, is_active, room_id, experience_id,
    created_at";

const EXTRA_COLS: &str = "id, package_id, extra_id, quantity";

/// Mutable package fields, used by create and update.
#[derive(Debug, Clone, Default)]
pub struct NewPackage<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: f64,
    pub image_url: Option<&'a str>,
    pub room_id: Option<RoomId>,
    pub experience_id: Option<ExperienceId>,
}

impl NewPackage<'_> {
    /// Field checks plus existence of the referenced room and experience.
    fn validate(&self, conn: &Connection) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("package name is required"));
        }
        if self.price < 0.0 {
            return Err(Error::validation("package price must not be negative"));
        }
        if let Some(room_id) = self.room_id {
            if rooms::get_room(conn, room_id)?.is_none() {
                return Err(Error::not_found("room", room_id));
            }
        }
        if let Some(experience_id) = self.experience_id {
            if experiences::get_experience(conn, experience_id)?.is_none() {
                return Err(Error::not_found("experience", experience_id));
            }
        }
        Ok(())
    }
}

/// Create a new, active package. The referenced room and experience must
/// exist.
pub fn create_package(conn: &Connection, new: &NewPackage<'_>) -> Result<Package> {
    new.validate(conn)?;

    let id = PackageId::new();
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO packages (id, name, description, price, image_url, is_active, room_id,
            experience_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7, ?8)",
        rusqlite::params![
            id.to_string(),
            new.name,
            new.description,
            new.price,
            new.image_url,
            new.room_id.map(|r| r.to_string()),
            new.experience_id.map(|e| e.to_string()),
            format::timestamp(created_at),
        ],
    )
    .map_err(db_err)?;

    Ok(Package {
        id,
        name: new.name.to_string(),
        description: new.description.map(String::from),
        price: new.price,
        image_url: new.image_url.map(String::from),
        is_active: true,
        room_id: new.room_id,
        experience_id: new.experience_id,
        created_at,
    })
}

pub fn get_package(conn: &Connection, id: PackageId) -> Result<Option<Package>> {
    let q = format!("SELECT {COLS} FROM packages WHERE id = ?1");
    query_opt(conn, &q, [id.to_string()], Package::from_row)
}

/// List packages by name, optionally only active ones.
pub fn list_packages(conn: &Connection, active_only: bool) -> Result<Vec<Package>> {
    let q =
        format!("SELECT {COLS} FROM packages WHERE (?1 = 0 OR is_active = 1) ORDER BY name ASC");
    query_all(conn, &q, [active_only as i32], Package::from_row)
}

/// Overwrite the mutable fields of a package. Included extras are left
/// alone.
pub fn update_package(conn: &Connection, id: PackageId, new: &NewPackage<'_>) -> Result<bool> {
    new.validate(conn)?;
    execute_changed(
        conn,
        "UPDATE packages SET name = ?1, description = ?2, price = ?3, image_url = ?4,
            room_id = ?5, experience_id = ?6
         WHERE id = ?7",
        rusqlite::params![
            new.name,
            new.description,
            new.price,
            new.image_url,
            new.room_id.map(|r| r.to_string()),
            new.experience_id.map(|e| e.to_string()),
            id.to_string(),
        ],
    )
}

pub fn set_active(conn: &Connection, id: PackageId, active: bool) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE packages SET is_active = ?1 WHERE id = ?2",
        rusqlite::params![active as i32, id.to_string()],
    )
}

// ---------------------------------------------------------------------------
// Included extras
// ---------------------------------------------------------------------------

/// Include `quantity` of an extra in a package.
pub fn add_package_extra(
    conn: &Connection,
    package_id: PackageId,
    extra_id: ExtraId,
    quantity: i32,
) -> Result<PackageExtra> {
    if quantity <= 0 {
        return Err(Error::validation("quantity must be positive"));
    }
    if get_package(conn, package_id)?.is_none() {
        return Err(Error::not_found("package", package_id));
    }
    if extras::get_extra(conn, extra_id)?.is_none() {
        return Err(Error::not_found("extra", extra_id));
    }

    let id = PackageExtraId::new();
    conn.execute(
        "INSERT INTO package_extras (id, package_id, extra_id, quantity)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            id.to_string(),
            package_id.to_string(),
            extra_id.to_string(),
            quantity
        ],
    )
    .map_err(db_err)?;

    Ok(PackageExtra {
        id,
        package_id,
        extra_id,
        quantity,
    })
}

pub fn list_package_extras(conn: &Connection, package_id: PackageId) -> Result<Vec<PackageExtra>> {
    let q = format!("SELECT {EXTRA_COLS} FROM package_extras WHERE package_id = ?1 ORDER BY rowid");
    query_all(conn, &q, [package_id.to_string()], PackageExtra::from_row)
}

pub fn remove_package_extra(conn: &Connection, id: PackageExtraId) -> Result<bool> {
    execute_changed(conn, "DELETE FROM package_extras WHERE id = ?1", [id.to_string()])
}

/// Delete a package and its included extras. Fails with a conflict while
/// bookings still reference the package.
pub fn delete_package(conn: &Connection, id: PackageId) -> Result<bool> {
    let tx = conn.unchecked_transaction().map_err(db_err)?;

    let included = tx
        .execute("DELETE FROM package_extras WHERE package_id = ?1", [id.to_string()])
        .map_err(db_err)?;
    let n = tx
        .execute("DELETE FROM packages WHERE id = ?1", [id.to_string()])
        .map_err(|e| constraint_err(e, || format!("Package {id} is still referenced")))?;

    tx.commit().map_err(db_err)?;

    if n > 0 {
        tracing::info!("Deleted package {id} with {included} included extra(s)");
    }
    Ok(n > 0)
}

/// Load a package with its room, experience (and schedules) and included
/// extras.
pub fn load_detail(conn: &Connection, id: PackageId) -> Result<Option<PackageDetail>> {
    let Some(package) = get_package(conn, id)? else {
        return Ok(None);
    };

    let room = match package.room_id {
        Some(room_id) => rooms::get_room(conn, room_id)?,
        None => None,
    };
    let experience = match package.experience_id {
        Some(exp_id) => experiences::load_detail(conn, exp_id)?,
        None => None,
    };

    let mut included_extras = Vec::new();
    for pe in list_package_extras(conn, id)? {
        let extra = extras::get_extra(conn, pe.extra_id)?
            .ok_or_else(|| Error::not_found("extra", pe.extra_id))?;
        included_extras.push((pe, extra));
    }

    Ok(Some(PackageDetail {
        package,
        room,
        experience,
        included_extras,
    }))
}
