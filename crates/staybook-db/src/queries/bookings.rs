//! Booking CRUD, status / payment lifecycles, cart expiry and the
//! booking cascade delete.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;
use staybook_core::config::CartConfig;
use staybook_core::tokens::generate_confirmation_number;
use staybook_core::{
    format, BookingId, BookingStatus, Error, ExperienceId, PackageId, PaymentStatus, Result,
    UserId,
};

use super::{
    booking_extras, booking_rooms, constraint_err, db_err, execute_changed, experiences, extras,
    packages, query_all, query_opt, rooms, users,
};
use crate::detail::BookingDetail;
use crate::models::Booking;

const COLS: &str = "id, user_id, confirmation_number, experience_id, package_id,
    experience_date, experience_time, check_in, check_out, check_in_time, check_out_time,
    number_of_guests, status, total_price, stripe_payment_intent_id, stripe_payment_status,
    payment_status, special_requests, admin_notes, created_at, updated_at, cart_expires_at";

/// Attempts at drawing an unused confirmation number before giving up.
const CONFIRMATION_ATTEMPTS: usize = 5;

/// Fields supplied when a booking is created. Start from
/// [`NewBooking::new`] and override with struct update syntax.
#[derive(Debug, Clone)]
pub struct NewBooking<'a> {
    pub user_id: UserId,
    pub experience_id: Option<ExperienceId>,
    pub package_id: Option<PackageId>,
    pub experience_date: Option<NaiveDate>,
    pub experience_time: Option<NaiveTime>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub check_in_time: Option<NaiveTime>,
    pub check_out_time: Option<NaiveTime>,
    pub number_of_guests: i32,
    pub status: BookingStatus,
    pub total_price: f64,
    pub special_requests: Option<&'a str>,
    pub cart_expires_at: Option<DateTime<Utc>>,
}

impl NewBooking<'_> {
    /// An empty cart for `user_id`. Set `cart_expires_at` before inserting,
    /// or go through [`create_cart`].
    pub fn new(user_id: UserId, number_of_guests: i32) -> Self {
        Self {
            user_id,
            experience_id: None,
            package_id: None,
            experience_date: None,
            experience_time: None,
            check_in: None,
            check_out: None,
            check_in_time: None,
            check_out_time: None,
            number_of_guests,
            status: BookingStatus::Cart,
            total_price: 0.0,
            special_requests: None,
            cart_expires_at: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.number_of_guests <= 0 {
            return Err(Error::validation("number_of_guests must be positive"));
        }
        if self.total_price < 0.0 {
            return Err(Error::validation("total_price must not be negative"));
        }
        if let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) {
            if check_out <= check_in {
                return Err(Error::validation("check_out must be after check_in"));
            }
        }
        if self.status == BookingStatus::Cart && self.cart_expires_at.is_none() {
            return Err(Error::validation("a cart needs cart_expires_at"));
        }
        Ok(())
    }
}

fn is_confirmation_collision(e: &rusqlite::Error) -> bool {
    e.to_string()
        .contains("UNIQUE constraint failed: bookings.confirmation_number")
}

/// Create a booking with a fresh confirmation number.
///
/// The user, experience and package must exist. A confirmation number
/// collision is retried with a new number.
pub fn create_booking(conn: &Connection, new: &NewBooking<'_>) -> Result<Booking> {
    new.validate()?;
    if users::get_user_by_id(conn, new.user_id)?.is_none() {
        return Err(Error::not_found("user", new.user_id));
    }
    if let Some(exp_id) = new.experience_id {
        if experiences::get_experience(conn, exp_id)?.is_none() {
            return Err(Error::not_found("experience", exp_id));
        }
    }
    if let Some(pkg_id) = new.package_id {
        if packages::get_package(conn, pkg_id)?.is_none() {
            return Err(Error::not_found("package", pkg_id));
        }
    }

    let id = BookingId::new();
    let now = Utc::now();
    let ts = format::timestamp(now);

    for attempt in 1..=CONFIRMATION_ATTEMPTS {
        let confirmation_number = generate_confirmation_number(now);
        let res = conn.execute(
            "INSERT INTO bookings (id, user_id, confirmation_number, experience_id, package_id,
                experience_date, experience_time, check_in, check_out, check_in_time,
                check_out_time, number_of_guests, status, total_price, payment_status,
                special_requests, created_at, updated_at, cart_expires_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19)",
            rusqlite::params![
                id.to_string(),
                new.user_id.to_string(),
                &confirmation_number,
                new.experience_id.map(|e| e.to_string()),
                new.package_id.map(|p| p.to_string()),
                new.experience_date.map(format::date),
                new.experience_time.map(format::stored_time),
                new.check_in.map(format::date),
                new.check_out.map(format::date),
                new.check_in_time.map(format::stored_time),
                new.check_out_time.map(format::stored_time),
                new.number_of_guests,
                new.status.as_str(),
                new.total_price,
                PaymentStatus::Pending.as_str(),
                new.special_requests,
                &ts,
                &ts,
                new.cart_expires_at.map(format::timestamp),
            ],
        );

        match res {
            Ok(_) => {
                tracing::debug!("Created booking {confirmation_number} ({})", new.status);
                return Ok(Booking {
                    id,
                    user_id: new.user_id,
                    confirmation_number,
                    experience_id: new.experience_id,
                    package_id: new.package_id,
                    experience_date: new.experience_date,
                    experience_time: new.experience_time,
                    check_in: new.check_in,
                    check_out: new.check_out,
                    check_in_time: new.check_in_time,
                    check_out_time: new.check_out_time,
                    number_of_guests: new.number_of_guests,
                    status: new.status,
                    total_price: new.total_price,
                    stripe_payment_intent_id: None,
                    stripe_payment_status: None,
                    payment_status: PaymentStatus::Pending,
                    special_requests: new.special_requests.map(String::from),
                    admin_notes: None,
                    created_at: now,
                    updated_at: now,
                    cart_expires_at: new.cart_expires_at,
                });
            }
            Err(e) if is_confirmation_collision(&e) => {
                tracing::warn!("Confirmation number collision (attempt {attempt})");
            }
            Err(e) => return Err(constraint_err(e, || "Booking references a missing row".into())),
        }
    }

    Err(Error::Conflict(
        "Could not allocate a unique confirmation number".into(),
    ))
}

/// Create an empty cart that expires after the configured cart TTL.
pub fn create_cart(
    conn: &Connection,
    carts: &CartConfig,
    user_id: UserId,
    number_of_guests: i32,
) -> Result<Booking> {
    let expires_at = carts.expires_at(Utc::now())?;
    create_booking(
        conn,
        &NewBooking {
            cart_expires_at: Some(expires_at),
            ..NewBooking::new(user_id, number_of_guests)
        },
    )
}

pub fn get_booking(conn: &Connection, id: BookingId) -> Result<Option<Booking>> {
    let q = format!("SELECT {COLS} FROM bookings WHERE id = ?1");
    query_opt(conn, &q, [id.to_string()], Booking::from_row)
}

pub fn get_booking_by_confirmation(
    conn: &Connection,
    confirmation_number: &str,
) -> Result<Option<Booking>> {
    let q = format!("SELECT {COLS} FROM bookings WHERE confirmation_number = ?1");
    query_opt(conn, &q, [confirmation_number], Booking::from_row)
}

/// All bookings of a user, newest first.
pub fn bookings_for_user(conn: &Connection, user_id: UserId) -> Result<Vec<Booking>> {
    let q = format!("SELECT {COLS} FROM bookings WHERE user_id = ?1 ORDER BY created_at DESC");
    query_all(conn, &q, [user_id.to_string()], Booking::from_row)
}

/// Bookings in `status`, oldest first.
pub fn list_by_status(conn: &Connection, status: BookingStatus) -> Result<Vec<Booking>> {
    let q = format!("SELECT {COLS} FROM bookings WHERE status = ?1 ORDER BY created_at ASC");
    query_all(conn, &q, [status.as_str()], Booking::from_row)
}

// ---------------------------------------------------------------------------
// Lifecycle updates
// ---------------------------------------------------------------------------

/// Move a booking to `next`. Leaving `cart` clears the cart expiry.
///
/// Returns `false` if the booking does not exist and a validation error if
/// the lifecycle forbids the transition. If another writer changes the
/// status between the check and the write, returns a conflict.
pub fn update_status(conn: &Connection, id: BookingId, next: BookingStatus) -> Result<bool> {
    let Some(booking) = get_booking(conn, id)? else {
        return Ok(false);
    };
    if booking.status == next {
        return Ok(true);
    }
    if booking.status.is_terminal() {
        return Err(Error::validation(format!(
            "Booking {} is {} and can no longer change",
            booking.confirmation_number, booking.status
        )));
    }
    if !booking.status.can_transition_to(next) {
        return Err(Error::validation(format!(
            "Cannot move booking {} from {} to {next}",
            booking.confirmation_number, booking.status
        )));
    }

    write_status(conn, id, booking.status, next)?;
    tracing::debug!(
        "Booking {} status {} -> {next}",
        booking.confirmation_number,
        booking.status
    );
    Ok(true)
}

/// Write `next` only while the stored status is still `expected`.
fn write_status(
    conn: &Connection,
    id: BookingId,
    expected: BookingStatus,
    next: BookingStatus,
) -> Result<()> {
    // Nothing transitions into `cart`, so any real change leaves it.
    let changed = execute_changed(
        conn,
        "UPDATE bookings SET status = ?1, updated_at = ?2, cart_expires_at = NULL
         WHERE id = ?3 AND status = ?4",
        rusqlite::params![
            next.as_str(),
            format::timestamp(Utc::now()),
            id.to_string(),
            expected.as_str()
        ],
    )?;
    if !changed {
        return Err(Error::Conflict(format!(
            "Booking {id} is no longer {expected}; status changed concurrently"
        )));
    }
    Ok(())
}

/// Record a payment status change reported by the gateway, mirroring its
/// raw status string.
pub fn update_payment(
    conn: &Connection,
    id: BookingId,
    next: PaymentStatus,
    gateway_status: Option<&str>,
) -> Result<bool> {
    let Some(booking) = get_booking(conn, id)? else {
        return Ok(false);
    };
    if !booking.payment_status.can_transition_to(next) {
        return Err(Error::validation(format!(
            "Cannot move payment of booking {} from {} to {next}",
            booking.confirmation_number, booking.payment_status
        )));
    }

    write_payment(conn, id, booking.payment_status, next, gateway_status)?;
    tracing::debug!(
        "Booking {} payment {} -> {next}",
        booking.confirmation_number,
        booking.payment_status
    );
    Ok(true)
}

/// Write `next` only while the stored payment status is still `expected`.
fn write_payment(
    conn: &Connection,
    id: BookingId,
    expected: PaymentStatus,
    next: PaymentStatus,
    gateway_status: Option<&str>,
) -> Result<()> {
    let changed = execute_changed(
        conn,
        "UPDATE bookings SET payment_status = ?1, stripe_payment_status = ?2, updated_at = ?3
         WHERE id = ?4 AND payment_status = ?5",
        rusqlite::params![
            next.as_str(),
            gateway_status,
            format::timestamp(Utc::now()),
            id.to_string(),
            expected.as_str()
        ],
    )?;
    if !changed {
        return Err(Error::Conflict(format!(
            "Payment of booking {id} is no longer {expected}; status changed concurrently"
        )));
    }
    Ok(())
}

pub fn set_payment_intent(conn: &Connection, id: BookingId, intent_id: &str) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE bookings SET stripe_payment_intent_id = ?1, updated_at = ?2 WHERE id = ?3",
        rusqlite::params![intent_id, format::timestamp(Utc::now()), id.to_string()],
    )
}

pub fn update_total_price(conn: &Connection, id: BookingId, total_price: f64) -> Result<bool> {
    if total_price < 0.0 {
        return Err(Error::validation("total_price must not be negative"));
    }
    execute_changed(
        conn,
        "UPDATE bookings SET total_price = ?1, updated_at = ?2 WHERE id = ?3",
        rusqlite::params![total_price, format::timestamp(Utc::now()), id.to_string()],
    )
}

pub fn set_special_requests(
    conn: &Connection,
    id: BookingId,
    special_requests: Option<&str>,
) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE bookings SET special_requests = ?1, updated_at = ?2 WHERE id = ?3",
        rusqlite::params![special_requests, format::timestamp(Utc::now()), id.to_string()],
    )
}

pub fn set_admin_notes(conn: &Connection, id: BookingId, admin_notes: Option<&str>) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE bookings SET admin_notes = ?1, updated_at = ?2 WHERE id = ?3",
        rusqlite::params![admin_notes, format::timestamp(Utc::now()), id.to_string()],
    )
}

pub fn set_cart_expiry(
    conn: &Connection,
    id: BookingId,
    expires_at: Option<DateTime<Utc>>,
) -> Result<bool> {
    execute_changed(
        conn,
        "UPDATE bookings SET cart_expires_at = ?1, updated_at = ?2 WHERE id = ?3",
        rusqlite::params![
            expires_at.map(format::timestamp),
            format::timestamp(Utc::now()),
            id.to_string()
        ],
    )
}

// ---------------------------------------------------------------------------
// Cart expiry
// ---------------------------------------------------------------------------

/// Carts whose expiry is before `now`.
pub fn list_expired_carts(conn: &Connection, now: DateTime<Utc>) -> Result<Vec<Booking>> {
    let q = format!(
        "SELECT {COLS} FROM bookings
         WHERE status = 'cart' AND cart_expires_at IS NOT NULL
         ORDER BY created_at ASC"
    );
    let carts = query_all(conn, &q, [], Booking::from_row)?;
    Ok(carts.into_iter().filter(|b| b.is_expired_cart(now)).collect())
}

/// Delete every cart that expired before `now`, with its dependent rows,
/// in one transaction. Returns the number of carts removed.
pub fn purge_expired_carts(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
    let tx = conn.unchecked_transaction().map_err(db_err)?;

    let expired = list_expired_carts(&tx, now)?;
    let mut purged = 0;
    for cart in &expired {
        if delete_cascade(&tx, cart.id)? {
            purged += 1;
        }
    }

    tx.commit().map_err(db_err)?;

    if purged > 0 {
        tracing::info!("Purged {purged} expired cart(s)");
    }
    Ok(purged)
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Child tables of `bookings`, in deletion order.
const DEPENDENT_TABLES: &[&str] = &["booking_items", "email_logs", "booking_extras", "booking_rooms"];

fn delete_cascade(conn: &Connection, id: BookingId) -> Result<bool> {
    let mut children = 0;
    for table in DEPENDENT_TABLES {
        children += conn
            .execute(
                &format!("DELETE FROM {table} WHERE booking_id = ?1"),
                [id.to_string()],
            )
            .map_err(db_err)?;
    }
    let n = conn
        .execute("DELETE FROM bookings WHERE id = ?1", [id.to_string()])
        .map_err(db_err)?;
    if n > 0 {
        tracing::debug!("Deleted booking {id} and {children} dependent row(s)");
    }
    Ok(n > 0)
}

/// Delete a booking together with its cart items, email logs, extras and
/// rooms. All-or-nothing.
pub fn delete_booking(conn: &Connection, id: BookingId) -> Result<bool> {
    let tx = conn.unchecked_transaction().map_err(db_err)?;
    let deleted = delete_cascade(&tx, id)?;
    tx.commit().map_err(db_err)?;

    if deleted {
        tracing::info!("Deleted booking {id}");
    }
    Ok(deleted)
}

// ---------------------------------------------------------------------------
// Detail
// ---------------------------------------------------------------------------

/// Load a booking with its user, experience, package, rooms and extras.
pub fn load_detail(conn: &Connection, id: BookingId) -> Result<Option<BookingDetail>> {
    let Some(booking) = get_booking(conn, id)? else {
        return Ok(None);
    };

    let user = users::get_user_by_id(conn, booking.user_id)?
        .ok_or_else(|| Error::not_found("user", booking.user_id))?;
    let experience = match booking.experience_id {
        Some(exp_id) => experiences::load_detail(conn, exp_id)?,
        None => None,
    };
    let package = match booking.package_id {
        Some(pkg_id) => packages::load_detail(conn, pkg_id)?,
        None => None,
    };

    let mut booked_rooms = Vec::new();
    for br in booking_rooms::list_for_booking(conn, id)? {
        let room = rooms::get_room(conn, br.room_id)?
            .ok_or_else(|| Error::not_found("room", br.room_id))?;
        booked_rooms.push((br, room));
    }

    let mut booked_extras = Vec::new();
    for be in booking_extras::list_for_booking(conn, id)? {
        let extra = extras::get_extra(conn, be.extra_id)?
            .ok_or_else(|| Error::not_found("extra", be.extra_id))?;
        booked_extras.push((be, extra));
    }

    Ok(Some(BookingDetail {
        booking,
        user,
        experience,
        package,
        rooms: booked_rooms,
        extras: booked_extras,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use chrono::Duration;

    fn guest(conn: &Connection) -> UserId {
        users::create_guest_user(conn, "cart@example.com", None, None)
            .unwrap()
            .id
    }

    fn cart(conn: &Connection, guests: i32) -> Booking {
        create_cart(conn, &CartConfig::default(), guest(conn), guests).unwrap()
    }

    #[test]
    fn create_cart_and_lookup() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let user_id = guest(&conn);
        let expires = Utc::now() + Duration::minutes(30);

        let b = create_booking(
            &conn,
            &NewBooking {
                cart_expires_at: Some(expires),
                ..NewBooking::new(user_id, 2)
            },
        )
        .unwrap();
        assert_eq!(b.status, BookingStatus::Cart);
        assert_eq!(b.payment_status, PaymentStatus::Pending);
        assert!(b.confirmation_number.starts_with("BK"));

        assert_eq!(get_booking(&conn, b.id).unwrap().unwrap(), b);
        let by_conf = get_booking_by_confirmation(&conn, &b.confirmation_number)
            .unwrap()
            .unwrap();
        assert_eq!(by_conf.id, b.id);
        assert_eq!(bookings_for_user(&conn, user_id).unwrap().len(), 1);
        assert_eq!(list_by_status(&conn, BookingStatus::Cart).unwrap().len(), 1);
    }

    #[test]
    fn rejects_bad_input() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let user_id = guest(&conn);

        let zero_guests = NewBooking::new(user_id, 0);
        assert!(matches!(
            create_booking(&conn, &zero_guests).unwrap_err(),
            Error::Validation(_)
        ));

        let backwards = NewBooking {
            check_in: NaiveDate::from_ymd_opt(2024, 5, 3),
            check_out: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..NewBooking::new(user_id, 1)
        };
        assert!(matches!(
            create_booking(&conn, &backwards).unwrap_err(),
            Error::Validation(_)
        ));

        let orphan = NewBooking {
            status: BookingStatus::Pending,
            ..NewBooking::new(UserId::new(), 1)
        };
        assert!(matches!(
            create_booking(&conn, &orphan).unwrap_err(),
            Error::NotFound { .. }
        ));
    }

    #[test]
    fn cart_requires_expiry() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let user_id = guest(&conn);

        let err = create_booking(&conn, &NewBooking::new(user_id, 2)).unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("cart_expires_at")));

        let pending = NewBooking {
            status: BookingStatus::Pending,
            ..NewBooking::new(user_id, 2)
        };
        assert!(create_booking(&conn, &pending).unwrap().cart_expires_at.is_none());
    }

    #[test]
    fn create_cart_applies_configured_ttl() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let user_id = guest(&conn);
        let before = Utc::now();

        let b = create_cart(&conn, &CartConfig { ttl_minutes: 45 }, user_id, 2).unwrap();
        assert_eq!(b.status, BookingStatus::Cart);
        let expires = b.cart_expires_at.unwrap();
        assert!(expires >= before + Duration::minutes(45));
        assert!(expires <= Utc::now() + Duration::minutes(45));

        // The cart is purged once its TTL has passed.
        assert_eq!(purge_expired_carts(&conn, Utc::now()).unwrap(), 0);
        assert_eq!(
            purge_expired_carts(&conn, Utc::now() + Duration::minutes(46)).unwrap(),
            1
        );

        assert!(matches!(
            create_cart(&conn, &CartConfig { ttl_minutes: i64::MAX }, user_id, 2).unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[test]
    fn status_lifecycle() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let b = cart(&conn, 1);

        // cart -> confirmed skips pending
        assert!(matches!(
            update_status(&conn, b.id, BookingStatus::Confirmed).unwrap_err(),
            Error::Validation(_)
        ));

        assert!(update_status(&conn, b.id, BookingStatus::Pending).unwrap());
        let pending = get_booking(&conn, b.id).unwrap().unwrap();
        assert!(pending.cart_expires_at.is_none());
        assert!(pending.updated_at >= b.updated_at);

        assert!(update_status(&conn, b.id, BookingStatus::Pending).unwrap());
        assert!(update_status(&conn, b.id, BookingStatus::Confirmed).unwrap());
        assert!(update_status(&conn, b.id, BookingStatus::Completed).unwrap());
        assert!(update_status(&conn, b.id, BookingStatus::Cancelled).is_err());

        assert!(!update_status(&conn, BookingId::new(), BookingStatus::Pending).unwrap());
    }

    #[test]
    fn status_write_refuses_stale_snapshot() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let b = cart(&conn, 1);

        // Another writer cancels the cart after this one read it as `cart`.
        assert!(update_status(&conn, b.id, BookingStatus::Cancelled).unwrap());
        assert!(matches!(
            write_status(&conn, b.id, BookingStatus::Cart, BookingStatus::Pending).unwrap_err(),
            Error::Conflict(_)
        ));
        let found = get_booking(&conn, b.id).unwrap().unwrap();
        assert_eq!(found.status, BookingStatus::Cancelled);

        // Terminal bookings stay put.
        let err = update_status(&conn, b.id, BookingStatus::Pending).unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("no longer change")));
    }

    #[test]
    fn payment_write_refuses_stale_snapshot() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let b = cart(&conn, 1);

        assert!(update_payment(&conn, b.id, PaymentStatus::Failed, Some("failed")).unwrap());
        assert!(matches!(
            write_payment(
                &conn,
                b.id,
                PaymentStatus::Pending,
                PaymentStatus::Succeeded,
                Some("succeeded")
            )
            .unwrap_err(),
            Error::Conflict(_)
        ));
        let found = get_booking(&conn, b.id).unwrap().unwrap();
        assert_eq!(found.payment_status, PaymentStatus::Failed);
        assert_eq!(found.stripe_payment_status.as_deref(), Some("failed"));
    }

    #[test]
    fn payment_lifecycle_mirrors_gateway() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let b = cart(&conn, 1);

        assert!(set_payment_intent(&conn, b.id, "pi_abc").unwrap());
        assert!(update_payment(&conn, b.id, PaymentStatus::Processing, Some("processing")).unwrap());
        assert!(update_payment(&conn, b.id, PaymentStatus::Succeeded, Some("succeeded")).unwrap());
        assert!(matches!(
            update_payment(&conn, b.id, PaymentStatus::Pending, None).unwrap_err(),
            Error::Validation(_)
        ));

        let found = get_booking(&conn, b.id).unwrap().unwrap();
        assert_eq!(found.payment_status, PaymentStatus::Succeeded);
        assert_eq!(found.stripe_payment_status.as_deref(), Some("succeeded"));

        let admin = found.serialize_admin();
        assert_eq!(admin["stripe_details"]["payment_intent_id"], "pi_abc");
        assert_eq!(admin["stripe_details"]["payment_status_enum"], "succeeded");
    }

    #[test]
    fn field_setters() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let b = cart(&conn, 3);

        assert!(update_total_price(&conn, b.id, 512.5).unwrap());
        assert!(update_total_price(&conn, b.id, -1.0).is_err());
        assert!(set_special_requests(&conn, b.id, Some("Late arrival")).unwrap());
        assert!(set_admin_notes(&conn, b.id, Some("VIP")).unwrap());

        let found = get_booking(&conn, b.id).unwrap().unwrap();
        assert_eq!(found.total_price, 512.5);
        assert_eq!(found.special_requests.as_deref(), Some("Late arrival"));
        assert_eq!(found.admin_notes.as_deref(), Some("VIP"));
    }

    #[test]
    fn purge_only_expired_carts() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let user_id = guest(&conn);
        let now = Utc::now();

        let stale = create_booking(
            &conn,
            &NewBooking {
                cart_expires_at: Some(now - Duration::minutes(5)),
                ..NewBooking::new(user_id, 1)
            },
        )
        .unwrap();
        let fresh = create_booking(
            &conn,
            &NewBooking {
                cart_expires_at: Some(now + Duration::minutes(25)),
                ..NewBooking::new(user_id, 1)
            },
        )
        .unwrap();
        let no_expiry = create_booking(
            &conn,
            &NewBooking {
                status: BookingStatus::Pending,
                ..NewBooking::new(user_id, 1)
            },
        )
        .unwrap();

        let expired = list_expired_carts(&conn, now).unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, stale.id);

        assert_eq!(purge_expired_carts(&conn, now).unwrap(), 1);
        assert!(get_booking(&conn, stale.id).unwrap().is_none());
        assert!(get_booking(&conn, fresh.id).unwrap().is_some());
        assert!(get_booking(&conn, no_expiry.id).unwrap().is_some());
        assert_eq!(purge_expired_carts(&conn, now).unwrap(), 0);
    }

    #[test]
    fn set_cart_expiry_roundtrip() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let b = cart(&conn, 1);
        let expires = Utc::now() + Duration::minutes(10);

        assert!(set_cart_expiry(&conn, b.id, Some(expires)).unwrap());
        let found = get_booking(&conn, b.id).unwrap().unwrap();
        assert_eq!(found.cart_expires_at, Some(expires));
    }

    #[test]
    fn delete_missing_booking() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        assert!(!delete_booking(&conn, BookingId::new()).unwrap());
    }
}
