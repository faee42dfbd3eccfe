//! Extras added to a booking.

use rusqlite::Connection;
use staybook_core::{BookingExtraId, BookingId, Error, ExtraId, Result};

use super::{bookings, db_err, execute_changed, extras, query_all};
use crate::models::BookingExtra;

const COLS: &str = "id, booking_id, extra_id, quantity, price";

/// Add `quantity` of an extra to a booking.
///
/// Without an explicit `price` the line is charged through
/// [`staybook_core::ExtraType::charge`]: per-guest extras multiply by the
/// booking's guest count.
pub fn add_extra(
    conn: &Connection,
    booking_id: BookingId,
    extra_id: ExtraId,
    quantity: i32,
    price: Option<f64>,
) -> Result<BookingExtra> {
    if quantity <= 0 {
        return Err(Error::validation("quantity must be positive"));
    }
    let booking = bookings::get_booking(conn, booking_id)?
        .ok_or_else(|| Error::not_found("booking", booking_id))?;
    let extra =
        extras::get_extra(conn, extra_id)?.ok_or_else(|| Error::not_found("extra", extra_id))?;

    let price = price.unwrap_or_else(|| {
        extra
            .extra_type
            .charge(extra.price, quantity, booking.number_of_guests)
    });
    if price < 0.0 {
        return Err(Error::validation("price must not be negative"));
    }

    let id = BookingExtraId::new();
    conn.execute(
        "INSERT INTO booking_extras (id, booking_id, extra_id, quantity, price)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            id.to_string(),
            booking_id.to_string(),
            extra_id.to_string(),
            quantity,
            price,
        ],
    )
    .map_err(db_err)?;

    Ok(BookingExtra {
        id,
        booking_id,
        extra_id,
        quantity,
        price,
    })
}

pub fn list_for_booking(conn: &Connection, booking_id: BookingId) -> Result<Vec<BookingExtra>> {
    let q = format!("SELECT {COLS} FROM booking_extras WHERE booking_id = ?1 ORDER BY rowid ASC");
    query_all(conn, &q, [booking_id.to_string()], BookingExtra::from_row)
}

pub fn remove_extra(conn: &Connection, id: BookingExtraId) -> Result<bool> {
    execute_changed(conn, "DELETE FROM booking_extras WHERE id = ?1", [id.to_string()])
}
