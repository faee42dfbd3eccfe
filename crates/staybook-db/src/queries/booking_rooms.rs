//! Rooms reserved under a booking.

use chrono::NaiveDate;
use rusqlite::Connection;
use staybook_core::{format, BookingId, BookingRoomId, Error, Result, RoomId};

use super::{bookings, db_err, execute_changed, query_all, rooms};
use crate::models::BookingRoom;

const COLS: &str = "id, booking_id, room_id, check_in, check_out, nights, price";

/// Reserve a room on a booking for `[check_in, check_out)`.
///
/// `nights` is derived from the dates. Without an explicit `price` the line
/// is charged at `nights * price_per_night`.
pub fn add_room(
    conn: &Connection,
    booking_id: BookingId,
    room_id: RoomId,
    check_in: NaiveDate,
    check_out: NaiveDate,
    price: Option<f64>,
) -> Result<BookingRoom> {
    if check_out <= check_in {
        return Err(Error::validation("check_out must be after check_in"));
    }
    if bookings::get_booking(conn, booking_id)?.is_none() {
        return Err(Error::not_found("booking", booking_id));
    }
    let room = rooms::get_room(conn, room_id)?.ok_or_else(|| Error::not_found("room", room_id))?;

    let nights = i32::try_from((check_out - check_in).num_days())
        .map_err(|_| Error::validation("stay is too long"))?;
    let price = price.unwrap_or(room.price_per_night * f64::from(nights));
    if price < 0.0 {
        return Err(Error::validation("price must not be negative"));
    }

    let id = BookingRoomId::new();
    conn.execute(
        "INSERT INTO booking_rooms (id, booking_id, room_id, check_in, check_out, nights, price)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            id.to_string(),
            booking_id.to_string(),
            room_id.to_string(),
            format::date(check_in),
            format::date(check_out),
            nights,
            price,
        ],
    )
    .map_err(db_err)?;

    Ok(BookingRoom {
        id,
        booking_id,
        room_id,
        check_in,
        check_out,
        nights,
        price,
    })
}

pub fn list_for_booking(conn: &Connection, booking_id: BookingId) -> Result<Vec<BookingRoom>> {
    let q = format!(
        "SELECT {COLS} FROM booking_rooms WHERE booking_id = ?1 ORDER BY check_in ASC, rowid ASC"
    );
    query_all(conn, &q, [booking_id.to_string()], BookingRoom::from_row)
}

pub fn remove_room(conn: &Connection, id: BookingRoomId) -> Result<bool> {
    execute_changed(conn, "DELETE FROM booking_rooms WHERE id = ?1", [id.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use staybook_core::config::CartConfig;
    use crate::queries::rooms::NewRoom;
    use crate::queries::users;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn setup(conn: &Connection) -> (BookingId, RoomId) {
        let user = users::create_guest_user(conn, "rooms@example.com", None, None).unwrap();
        let booking = bookings::create_cart(conn, &CartConfig::default(), user.id, 2).unwrap();
        let room = rooms::create_room(
            conn,
            &NewRoom {
                name: "Twin",
                capacity: 2,
                price_per_night: 110.0,
                ..Default::default()
            },
        )
        .unwrap();
        (booking.id, room.id)
    }

    #[test]
    fn nights_and_default_price() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (booking_id, room_id) = setup(&conn);

        let br = add_room(&conn, booking_id, room_id, d(10), d(13), None).unwrap();
        assert_eq!(br.nights, 3);
        assert_eq!(br.price, 330.0);

        let discounted = add_room(&conn, booking_id, room_id, d(20), d(21), Some(90.0)).unwrap();
        assert_eq!(discounted.price, 90.0);

        let listed = list_for_booking(&conn, booking_id).unwrap();
        assert_eq!(listed, vec![br, discounted]);
    }

    #[test]
    fn rejects_empty_stay() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (booking_id, room_id) = setup(&conn);
        let err = add_room(&conn, booking_id, room_id, d(10), d(10), None).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn missing_room() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (booking_id, _) = setup(&conn);
        let err = add_room(&conn, booking_id, RoomId::new(), d(1), d(2), None).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn remove() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (booking_id, room_id) = setup(&conn);
        let br = add_room(&conn, booking_id, room_id, d(1), d(2), None).unwrap();
        assert!(remove_room(&conn, br.id).unwrap());
        assert!(list_for_booking(&conn, booking_id).unwrap().is_empty());
    }
}
