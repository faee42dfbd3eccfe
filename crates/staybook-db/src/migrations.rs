//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order.  A
//! `schema_migrations` table tracks which versions have been applied.
//!
//! Foreign keys deliberately carry no `ON DELETE CASCADE`: dependent rows
//! are removed by the explicit delete routines in [`crate::queries`].

use rusqlite::Connection;
use staybook_core::{Error, Result};

/// V1: accounts and catalog (experiences, rooms, extras, packages).
const V1_CATALOG: &str = r#"
CREATE TABLE users (
    id                         TEXT PRIMARY KEY,
    email                      TEXT UNIQUE NOT NULL,
    password_hash              TEXT,
    is_active                  INTEGER NOT NULL DEFAULT 1,
    role                       TEXT NOT NULL DEFAULT 'user',
    name                       TEXT,
    phone                      TEXT,
    email_verified             INTEGER NOT NULL DEFAULT 0,
    verification_token         TEXT UNIQUE,
    verification_token_expires TEXT,
    password_reset_token       TEXT UNIQUE,
    password_reset_expires     TEXT,
    is_guest                   INTEGER NOT NULL DEFAULT 0,
    created_at                 TEXT NOT NULL,
    last_login                 TEXT
);

CREATE TABLE experiences (
    id             TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    description    TEXT,
    price          REAL NOT NULL,
    max_capacity   INTEGER NOT NULL DEFAULT 20,
    duration_hours INTEGER,
    image_url      TEXT,
    is_active      INTEGER NOT NULL DEFAULT 1,
    created_at     TEXT NOT NULL
);

CREATE TABLE experience_schedules (
    id            TEXT PRIMARY KEY,
    experience_id TEXT NOT NULL REFERENCES experiences(id),
    day_of_week   TEXT NOT NULL,
    start_time    TEXT NOT NULL
);

CREATE TABLE rooms (
    id              TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    description     TEXT,
    capacity        INTEGER NOT NULL,
    price_per_night REAL NOT NULL,
    image_url       TEXT,
    amenities       TEXT,
    is_active       INTEGER NOT NULL DEFAULT 1,
    check_in_time   TEXT NOT NULL DEFAULT '15:00:00',
    check_out_time  TEXT NOT NULL DEFAULT '11:00:00',
    created_at      TEXT NOT NULL
);

CREATE TABLE extras (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    price       REAL NOT NULL,
    extra_type  TEXT NOT NULL,
    image_url   TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL
);

CREATE TABLE packages (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    description   TEXT,
    price         REAL NOT NULL,
    image_url     TEXT,
    is_active     INTEGER NOT NULL DEFAULT 1,
    room_id       TEXT REFERENCES rooms(id),
    experience_id TEXT REFERENCES experiences(id),
    created_at    TEXT NOT NULL
);

CREATE TABLE package_extras (
    id         TEXT PRIMARY KEY,
    package_id TEXT NOT NULL REFERENCES packages(id),
    extra_id   TEXT NOT NULL REFERENCES extras(id),
    quantity   INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX idx_users_email               ON users(email);
CREATE INDEX idx_experience_schedules_exp  ON experience_schedules(experience_id);
CREATE INDEX idx_package_extras_package    ON package_extras(package_id);
"#;

/// V2: bookings and their dependent rows.
const V2_BOOKINGS: &str = r#"
CREATE TABLE bookings (
    id                       TEXT PRIMARY KEY,
    user_id                  TEXT NOT NULL REFERENCES users(id),
    confirmation_number      TEXT UNIQUE NOT NULL,
    experience_id            TEXT REFERENCES experiences(id),
    package_id               TEXT REFERENCES packages(id),
    experience_date          TEXT,
    experience_time          TEXT,
    check_in                 TEXT,
    check_out                TEXT,
    check_in_time            TEXT,
    check_out_time           TEXT,
    number_of_guests         INTEGER NOT NULL,
    status                   TEXT NOT NULL DEFAULT 'cart',
    total_price              REAL NOT NULL,
    stripe_payment_intent_id TEXT,
    stripe_payment_status    TEXT,
    payment_status           TEXT NOT NULL DEFAULT 'pending',
    special_requests         TEXT,
    admin_notes              TEXT,
    created_at               TEXT NOT NULL,
    updated_at               TEXT NOT NULL,
    cart_expires_at          TEXT
);

CREATE TABLE booking_rooms (
    id         TEXT PRIMARY KEY,
    booking_id TEXT NOT NULL REFERENCES bookings(id),
    room_id    TEXT NOT NULL REFERENCES rooms(id),
    check_in   TEXT NOT NULL,
    check_out  TEXT NOT NULL,
    nights     INTEGER NOT NULL,
    price      REAL NOT NULL
);

CREATE TABLE booking_extras (
    id         TEXT PRIMARY KEY,
    booking_id TEXT NOT NULL REFERENCES bookings(id),
    extra_id   TEXT NOT NULL REFERENCES extras(id),
    quantity   INTEGER NOT NULL DEFAULT 1,
    price      REAL NOT NULL
);

CREATE TABLE email_logs (
    id              TEXT PRIMARY KEY,
    booking_id      TEXT NOT NULL REFERENCES bookings(id),
    email_type      TEXT NOT NULL,
    recipient_email TEXT NOT NULL,
    subject         TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'pending',
    error_message   TEXT,
    sent_at         TEXT,
    created_at      TEXT NOT NULL
);

CREATE INDEX idx_bookings_confirmation   ON bookings(confirmation_number);
CREATE INDEX idx_bookings_user           ON bookings(user_id);
CREATE INDEX idx_bookings_status         ON bookings(status);
CREATE INDEX idx_booking_rooms_booking   ON booking_rooms(booking_id);
CREATE INDEX idx_booking_extras_booking  ON booking_extras(booking_id);
CREATE INDEX idx_email_logs_booking      ON email_logs(booking_id);
CREATE INDEX idx_email_logs_status       ON email_logs(status);
"#;

/// V3: per-date availability overrides and cart line snapshots.
const V3_AVAILABILITY: &str = r#"
CREATE TABLE room_availability (
    id           TEXT PRIMARY KEY,
    room_id      TEXT NOT NULL REFERENCES rooms(id),
    date         TEXT NOT NULL,
    is_available INTEGER NOT NULL DEFAULT 1,
    reason       TEXT,
    UNIQUE (room_id, date)
);

CREATE TABLE experience_availability (
    id              TEXT PRIMARY KEY,
    experience_id   TEXT NOT NULL REFERENCES experiences(id),
    date            TEXT NOT NULL,
    available_spots INTEGER NOT NULL,
    UNIQUE (experience_id, date)
);

CREATE TABLE booking_items (
    id            TEXT PRIMARY KEY,
    booking_id    TEXT NOT NULL REFERENCES bookings(id),
    item_type     TEXT NOT NULL,
    experience_id TEXT REFERENCES experiences(id),
    room_id       TEXT REFERENCES rooms(id),
    name          TEXT NOT NULL,
    image_url     TEXT,
    date          TEXT,
    guests        INTEGER,
    check_in      TEXT,
    check_out     TEXT,
    nights        INTEGER,
    unit_price    REAL NOT NULL,
    subtotal      REAL NOT NULL,
    extras        TEXT NOT NULL DEFAULT '[]',
    created_at    TEXT NOT NULL
);

CREATE INDEX idx_room_availability_date       ON room_availability(date);
CREATE INDEX idx_experience_availability_date ON experience_availability(date);
CREATE INDEX idx_booking_items_booking        ON booking_items(booking_id);
"#;

/// V4: abandoned-cart sweeps filter on status and expiry together.
const V4_CART_EXPIRY_INDEX: &str = r#"
CREATE INDEX idx_bookings_cart_expiry ON bookings(status, cart_expires_at);
"#;

/// Ordered list of (version, sql) pairs.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, V1_CATALOG),
    (2, V2_BOOKINGS),
    (3, V3_AVAILABILITY),
    (4, V4_CART_EXPIRY_INDEX),
];

/// Run all pending migrations on `conn`.
///
/// Creates the `schema_migrations` tracking table if it does not exist,
/// then applies each outstanding migration inside a transaction. Returns
/// the number of migrations applied.
pub fn run_migrations(conn: &Connection) -> Result<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    let mut applied = 0;
    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;

        tracing::info!("Applied migration V{version}");
        applied += 1;
    }

    Ok(applied)
}

/// Highest migration version recorded in `schema_migrations`.
pub fn current_version(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}
