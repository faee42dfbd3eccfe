//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which owns an in-memory database pool and the
//! default config, plus helpers that seed a small catalog and guest carts.

#![allow(dead_code)]

use chrono::NaiveTime;
use serde_json::json;

use staybook_core::config::Config;
use staybook_core::{DayOfWeek, ExtraType, UserId};
use staybook_db::models::{Booking, Experience, Extra, Package, Room, User};
use staybook_db::pool::{get_conn, init_memory_pool, DbPool, PooledConnection};
use staybook_db::queries::bookings;
use staybook_db::queries::experiences::{self, NewExperience};
use staybook_db::queries::packages::{self, NewPackage};
use staybook_db::queries::rooms::{self, NewRoom};
use staybook_db::queries::{extras, users};

/// Test harness backed by a fresh in-memory database.
pub struct TestHarness {
    pub db: DbPool,
    pub config: Config,
}

/// Catalog rows created by [`TestHarness::seed_catalog`].
pub struct Catalog {
    pub suite: Room,
    pub kayak: Experience,
    pub breakfast: Extra,
    pub transfer: Extra,
    pub getaway: Package,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        Self { db, config }
    }

    pub fn conn(&self) -> PooledConnection {
        get_conn(&self.db).expect("failed to get connection")
    }

    /// One room, one scheduled experience, two extras and a package that
    /// bundles all of them.
    pub fn seed_catalog(&self) -> Catalog {
        let conn = self.conn();
        let amenities = json!({"wifi": true, "sea_view": true});

        let suite = rooms::create_room(
            &conn,
            &NewRoom {
                name: "Ocean suite",
                description: Some("Corner suite with balcony"),
                capacity: 3,
                price_per_night: 200.0,
                amenities: Some(&amenities),
                ..Default::default()
            },
        )
        .expect("create room");

        let kayak = experiences::create_experience(
            &conn,
            &NewExperience {
                name: "Sunset kayak",
                description: Some("Guided paddle at dusk"),
                price: 45.0,
                max_capacity: 12,
                duration_hours: Some(2),
                image_url: None,
            },
        )
        .expect("create experience");
        experiences::add_schedule(
            &conn,
            kayak.id,
            DayOfWeek::Saturday,
            NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        )
        .expect("add schedule");

        let breakfast =
            extras::create_extra(&conn, "Breakfast", None, 15.0, ExtraType::PerGuest, None)
                .expect("create breakfast");
        let transfer = extras::create_extra(
            &conn,
            "Airport transfer",
            None,
            60.0,
            ExtraType::PerBooking,
            None,
        )
        .expect("create transfer");

        let getaway = packages::create_package(
            &conn,
            &NewPackage {
                name: "Coastal getaway",
                description: Some("Two nights, kayak tour and breakfast"),
                price: 520.0,
                image_url: None,
                room_id: Some(suite.id),
                experience_id: Some(kayak.id),
            },
        )
        .expect("create package");
        packages::add_package_extra(&conn, getaway.id, breakfast.id, 2).expect("add package extra");

        Catalog {
            suite,
            kayak,
            breakfast,
            transfer,
            getaway,
        }
    }

    pub fn guest(&self, email: &str) -> User {
        users::create_guest_user(&self.conn(), email, Some("Guest"), None).expect("create guest")
    }

    /// A cart expiring after the configured TTL.
    pub fn cart(&self, user_id: UserId, guests: i32) -> Booking {
        bookings::create_cart(&self.conn(), &self.config.carts, user_id, guests)
            .expect("create cart")
    }

    pub fn count(&self, table: &str) -> i64 {
        self.conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .expect("count rows")
    }
}
