//! Integration tests for data-level guarantees: uniqueness, identifier
//! formats, serialized date/time shapes and token lifetimes.

mod common;

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, Utc};
use common::TestHarness;
use regex::Regex;
use staybook_core::{BookingStatus, Error, UserRole};
use staybook_db::queries::availability;
use staybook_db::queries::bookings::{self, NewBooking};
use staybook_db::queries::users;

#[test]
fn emails_are_unique_across_users() {
    let h = TestHarness::new();
    let conn = h.conn();
    users::create_user(&conn, "dup@example.com", "$2b$12$x", UserRole::User, None, None).unwrap();

    let err = users::create_guest_user(&conn, "dup@example.com", None, None).unwrap_err();
    assert!(matches!(err, Error::Conflict(ref msg) if msg.contains("dup@example.com")));
    assert_eq!(h.count("users"), 1);
}

#[test]
fn confirmation_numbers_are_unique_and_well_formed() {
    let h = TestHarness::new();
    let guest = h.guest("many@example.com");
    let pattern = Regex::new(r"^BK\d{8}[A-Z0-9]{4}$").unwrap();
    let today = Utc::now().format("%Y%m%d").to_string();

    let mut seen = HashSet::new();
    for _ in 0..50 {
        let b = h.cart(guest.id, 1);
        assert!(pattern.is_match(&b.confirmation_number), "{}", b.confirmation_number);
        assert_eq!(&b.confirmation_number[2..10], today);
        assert!(seen.insert(b.confirmation_number));
    }
}

#[test]
fn one_availability_row_per_room_and_date() {
    let h = TestHarness::new();
    let cat = h.seed_catalog();
    let conn = h.conn();
    let day = NaiveDate::from_ymd_opt(2024, 12, 24).unwrap();

    availability::set_room_availability(&conn, cat.suite.id, day, false, Some("private event"))
        .unwrap();
    availability::set_room_availability(&conn, cat.suite.id, day, false, Some("renovation"))
        .unwrap();

    assert_eq!(h.count("room_availability"), 1);
    let row = availability::get_room_availability(&conn, cat.suite.id, day)
        .unwrap()
        .unwrap();
    assert_eq!(row.reason.as_deref(), Some("renovation"));

    // A raw duplicate insert is refused by the schema itself.
    let raw = conn.execute(
        "INSERT INTO room_availability (id, room_id, date, is_available) VALUES ('x', ?1, ?2, 1)",
        [cat.suite.id.to_string(), "2024-12-24".to_string()],
    );
    assert!(raw.is_err());
}

#[test]
fn serialized_dates_and_times_use_fixed_formats() {
    let h = TestHarness::new();
    let cat = h.seed_catalog();
    let guest = h.guest("formats@example.com");
    let conn = h.conn();
    let date_re = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    let time_re = Regex::new(r"^\d{2}:\d{2}$").unwrap();

    let booking = bookings::create_booking(
        &conn,
        &NewBooking {
            experience_id: Some(cat.kayak.id),
            experience_date: NaiveDate::from_ymd_opt(2024, 11, 2),
            experience_time: chrono::NaiveTime::from_hms_opt(18, 30, 45),
            check_in: NaiveDate::from_ymd_opt(2024, 11, 1),
            check_out: NaiveDate::from_ymd_opt(2024, 11, 3),
            status: BookingStatus::Pending,
            ..NewBooking::new(guest.id, 2)
        },
    )
    .unwrap();

    let map = bookings::load_detail(&conn, booking.id)
        .unwrap()
        .unwrap()
        .serialize();
    for key in ["experience_date", "check_in", "check_out"] {
        assert!(date_re.is_match(map[key].as_str().unwrap()), "{key}");
    }
    assert!(time_re.is_match(map["experience_time"].as_str().unwrap()));
    assert_eq!(map["experience_time"], "18:30");
    assert!(time_re.is_match(map["experience"]["schedules"][0]["start_time"].as_str().unwrap()));

    let room = cat.suite.serialize();
    assert!(time_re.is_match(room["check_in_time"].as_str().unwrap()));
    assert!(time_re.is_match(room["check_out_time"].as_str().unwrap()));
}

#[test]
fn tokens_expire_after_fixed_lifetimes() {
    let h = TestHarness::new();
    let user = h.guest("tokens@example.com");
    let conn = h.conn();
    let now = Utc::now();

    let verification = users::issue_verification_token(&conn, user.id, now).unwrap();
    assert_eq!(verification.expires_at, now + Duration::hours(24));
    assert_eq!(verification.token.len(), 43);

    let reset = users::issue_password_reset_token(&conn, user.id, now).unwrap();
    assert_eq!(reset.expires_at, now + Duration::hours(2));
    assert_ne!(reset.token, verification.token);

    let stored = users::get_user_by_id(&conn, user.id).unwrap().unwrap();
    assert!(!stored.verification_token_expired(now + Duration::hours(24)));
    assert!(stored.verification_token_expired(now + Duration::hours(24) + Duration::seconds(1)));
    assert!(!stored.password_reset_expired(now + Duration::hours(2)));
    assert!(stored.password_reset_expired(now + Duration::hours(3)));

    // Secrets never reach the serialized user.
    let map = stored.serialize();
    for secret in [
        "password_hash",
        "verification_token",
        "verification_token_expires",
        "password_reset_token",
        "password_reset_expires",
    ] {
        assert!(!map.contains_key(secret), "{secret} leaked");
    }
}

#[test]
fn empty_cart_serializes_with_expiry() {
    let h = TestHarness::new();
    let guest = h.guest("cart@example.com");
    let before = Utc::now();
    let cart = h.cart(guest.id, 2);
    let conn = h.conn();

    let expires = cart.cart_expires_at.unwrap();
    assert!(expires >= before + Duration::minutes(30));
    assert!(expires <= Utc::now() + Duration::minutes(30));

    let map = bookings::get_booking(&conn, cart.id)
        .unwrap()
        .unwrap()
        .serialize();
    assert_eq!(map["status"], "cart");
    assert_eq!(map["payment_status"], "pending");
    assert!(map["experience_id"].is_null());
    assert!(map["package_id"].is_null());
    assert!(map["cart_expires_at"].is_string());
    assert_eq!(
        staybook_core::format::parse_timestamp(map["cart_expires_at"].as_str().unwrap()).unwrap(),
        expires
    );

    let detail = bookings::load_detail(&conn, cart.id).unwrap().unwrap().serialize();
    assert!(detail["experience"].is_null());
    assert!(detail["package"].is_null());
    assert_eq!(detail["rooms"], serde_json::json!([]));
}
