//! Cart line items.
//!
//! A line snapshots the name, price and chosen extras of an experience or
//! room at the moment it was added, so later catalog edits do not change
//! what the guest saw in their cart.

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use staybook_core::{
    format, BookingId, BookingItemId, BookingItemType, Error, ExperienceId, Result, RoomId,
};

use super::{bookings, db_err, execute_changed, experiences, query_all, query_opt, rooms};
use crate::models::{BookingItem, Experience, ItemExtraSnapshot, Room};

const COLS: &str = "id, booking_id, item_type, experience_id, room_id, name, image_url, date,
    guests, check_in, check_out, nights, unit_price, subtotal, extras, created_at";

/// A cart line to insert. Build one with [`NewBookingItem::experience`] or
/// [`NewBookingItem::room`].
#[derive(Debug, Clone)]
pub struct NewBookingItem {
    pub booking_id: BookingId,
    pub item_type: BookingItemType,
    pub experience_id: Option<ExperienceId>,
    pub room_id: Option<RoomId>,
    pub name: String,
    pub image_url: Option<String>,
    pub date: Option<NaiveDate>,
    pub guests: Option<i32>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub nights: Option<i32>,
    pub unit_price: f64,
    pub subtotal: f64,
    pub extras: Vec<ItemExtraSnapshot>,
}

fn extras_total(extras: &[ItemExtraSnapshot]) -> f64 {
    extras.iter().map(|e| e.price).sum()
}

impl NewBookingItem {
    /// `guests` places on `experience` for `date`; subtotal is
    /// `price * guests` plus the extras.
    pub fn experience(
        booking_id: BookingId,
        experience: &Experience,
        date: NaiveDate,
        guests: i32,
        extras: Vec<ItemExtraSnapshot>,
    ) -> Self {
        let subtotal = experience.price * f64::from(guests) + extras_total(&extras);
        Self {
            booking_id,
            item_type: BookingItemType::Experience,
            experience_id: Some(experience.id),
            room_id: None,
            name: experience.name.clone(),
            image_url: experience.image_url.clone(),
            date: Some(date),
            guests: Some(guests),
            check_in: None,
            check_out: None,
            nights: None,
            unit_price: experience.price,
            subtotal,
            extras,
        }
    }

    /// A stay in `room`; subtotal is `price_per_night * nights` plus the
    /// extras.
    pub fn room(
        booking_id: BookingId,
        room: &Room,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: i32,
        extras: Vec<ItemExtraSnapshot>,
    ) -> Self {
        let nights = i32::try_from((check_out - check_in).num_days()).unwrap_or(0);
        let subtotal = room.price_per_night * f64::from(nights) + extras_total(&extras);
        Self {
            booking_id,
            item_type: BookingItemType::Room,
            experience_id: None,
            room_id: Some(room.id),
            name: room.name.clone(),
            image_url: room.image_url.clone(),
            date: None,
            guests: Some(guests),
            check_in: Some(check_in),
            check_out: Some(check_out),
            nights: Some(nights),
            unit_price: room.price_per_night,
            subtotal,
            extras,
        }
    }

    fn validate(&self) -> Result<()> {
        match self.item_type {
            BookingItemType::Experience => {
                if self.experience_id.is_none() || self.date.is_none() {
                    return Err(Error::validation(
                        "experience items need an experience and a date",
                    ));
                }
            }
            BookingItemType::Room => {
                if self.room_id.is_none() || self.check_in.is_none() || self.check_out.is_none() {
                    return Err(Error::validation(
                        "room items need a room, check_in and check_out",
                    ));
                }
                if self.nights.unwrap_or(0) <= 0 {
                    return Err(Error::validation("check_out must be after check_in"));
                }
            }
        }
        if self.guests.is_some_and(|g| g <= 0) {
            return Err(Error::validation("guests must be positive"));
        }
        if self.unit_price < 0.0 || self.subtotal < 0.0 {
            return Err(Error::validation("prices must not be negative"));
        }
        Ok(())
    }
}

/// Add a line to a booking. The booking and the referenced experience or
/// room must exist.
pub fn create_item(conn: &Connection, new: &NewBookingItem) -> Result<BookingItem> {
    new.validate()?;
    if bookings::get_booking(conn, new.booking_id)?.is_none() {
        return Err(Error::not_found("booking", new.booking_id));
    }
    if let Some(exp_id) = new.experience_id {
        if experiences::get_experience(conn, exp_id)?.is_none() {
            return Err(Error::not_found("experience", exp_id));
        }
    }
    if let Some(room_id) = new.room_id {
        if rooms::get_room(conn, room_id)?.is_none() {
            return Err(Error::not_found("room", room_id));
        }
    }

    let extras_json = serde_json::to_string(&new.extras)
        .map_err(|e| Error::Internal(format!("failed to encode item extras: {e}")))?;
    let id = BookingItemId::new();
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO booking_items (id, booking_id, item_type, experience_id, room_id, name,
            image_url, date, guests, check_in, check_out, nights, unit_price, subtotal, extras,
            created_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
        rusqlite::params![
            id.to_string(),
            new.booking_id.to_string(),
            new.item_type.as_str(),
            new.experience_id.map(|e| e.to_string()),
            new.room_id.map(|r| r.to_string()),
            &new.name,
            &new.image_url,
            new.date.map(format::date),
            new.guests,
            new.check_in.map(format::date),
            new.check_out.map(format::date),
            new.nights,
            new.unit_price,
            new.subtotal,
            extras_json,
            format::timestamp(created_at),
        ],
    )
    .map_err(db_err)?;

    Ok(BookingItem {
        id,
        booking_id: new.booking_id,
        item_type: new.item_type,
        experience_id: new.experience_id,
        room_id: new.room_id,
        name: new.name.clone(),
        image_url: new.image_url.clone(),
        date: new.date,
        guests: new.guests,
        check_in: new.check_in,
        check_out: new.check_out,
        nights: new.nights,
        unit_price: new.unit_price,
        subtotal: new.subtotal,
        extras: new.extras.clone(),
        created_at,
    })
}

pub fn get_item(conn: &Connection, id: BookingItemId) -> Result<Option<BookingItem>> {
    let q = format!("SELECT {COLS} FROM booking_items WHERE id = ?1");
    query_opt(conn, &q, [id.to_string()], BookingItem::from_row)
}

/// Lines of a booking in the order they were added.
pub fn list_for_booking(conn: &Connection, booking_id: BookingId) -> Result<Vec<BookingItem>> {
    let q = format!("SELECT {COLS} FROM booking_items WHERE booking_id = ?1 ORDER BY rowid ASC");
    query_all(conn, &q, [booking_id.to_string()], BookingItem::from_row)
}

pub fn delete_item(conn: &Connection, id: BookingItemId) -> Result<bool> {
    execute_changed(conn, "DELETE FROM booking_items WHERE id = ?1", [id.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use staybook_core::config::CartConfig;
    use crate::queries::experiences::{self, NewExperience};
    use crate::queries::rooms::{self, NewRoom};
    use crate::queries::users;
    use staybook_core::ExtraId;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, day).unwrap()
    }

    fn cart(conn: &Connection) -> BookingId {
        let user = users::create_guest_user(conn, "items@example.com", None, None).unwrap();
        bookings::create_cart(conn, &CartConfig::default(), user.id, 2)
            .unwrap()
            .id
    }

    #[test]
    fn room_line_snapshots_extras() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let booking_id = cart(&conn);
        let room = rooms::create_room(
            &conn,
            &NewRoom {
                name: "Bungalow",
                capacity: 2,
                price_per_night: 100.0,
                ..Default::default()
            },
        )
        .unwrap();
        let snapshot = ItemExtraSnapshot {
            id: ExtraId::new(),
            name: "Late checkout".into(),
            price: 25.0,
        };

        let new = NewBookingItem::room(booking_id, &room, d(1), d(4), 2, vec![snapshot.clone()]);
        assert_eq!(new.nights, Some(3));
        assert_eq!(new.subtotal, 325.0);

        let item = create_item(&conn, &new).unwrap();
        let found = get_item(&conn, item.id).unwrap().unwrap();
        assert_eq!(found, item);
        assert_eq!(found.extras, vec![snapshot]);
        assert_eq!(found.serialize()["extras"][0]["price"], 25.0);
    }

    #[test]
    fn experience_line_and_delete() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let booking_id = cart(&conn);
        let exp = experiences::create_experience(
            &conn,
            &NewExperience {
                name: "Horse ride",
                description: None,
                price: 55.0,
                max_capacity: 6,
                duration_hours: Some(1),
                image_url: None,
            },
        )
        .unwrap();

        let item = create_item(
            &conn,
            &NewBookingItem::experience(booking_id, &exp, d(9), 2, vec![]),
        )
        .unwrap();
        assert_eq!(item.subtotal, 110.0);
        assert_eq!(item.serialize()["type"], "experience");
        assert_eq!(list_for_booking(&conn, booking_id).unwrap().len(), 1);

        assert!(delete_item(&conn, item.id).unwrap());
        assert!(list_for_booking(&conn, booking_id).unwrap().is_empty());
    }

    #[test]
    fn inconsistent_line_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let booking_id = cart(&conn);
        let room = rooms::create_room(
            &conn,
            &NewRoom {
                name: "Bunk",
                capacity: 1,
                price_per_night: 30.0,
                ..Default::default()
            },
        )
        .unwrap();

        let mut new = NewBookingItem::room(booking_id, &room, d(5), d(5), 1, vec![]);
        assert!(matches!(create_item(&conn, &new).unwrap_err(), Error::Validation(_)));

        new = NewBookingItem::room(booking_id, &room, d(5), d(6), 1, vec![]);
        new.room_id = None;
        assert!(matches!(create_item(&conn, &new).unwrap_err(), Error::Validation(_)));
    }

    #[test]
    fn unknown_room_or_experience_is_not_found() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let booking_id = cart(&conn);
        let room = rooms::create_room(
            &conn,
            &NewRoom {
                name: "Loft",
                capacity: 2,
                price_per_night: 90.0,
                ..Default::default()
            },
        )
        .unwrap();

        let mut new = NewBookingItem::room(booking_id, &room, d(5), d(7), 2, vec![]);
        new.room_id = Some(RoomId::new());
        let err = create_item(&conn, &new).unwrap_err();
        assert!(matches!(err, Error::NotFound { ref entity, .. } if entity == "room"), "{err:?}");
        assert_eq!(err.http_status(), 404);

        new.item_type = BookingItemType::Experience;
        new.room_id = None;
        new.experience_id = Some(ExperienceId::new());
        new.date = Some(d(6));
        let err = create_item(&conn, &new).unwrap_err();
        assert!(
            matches!(err, Error::NotFound { ref entity, .. } if entity == "experience"),
            "{err:?}"
        );

        assert!(list_for_booking(&conn, booking_id).unwrap().is_empty());
    }
}
