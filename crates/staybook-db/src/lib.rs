//! staybook-db: database schema, records, and repository queries.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded migrations, typed records with JSON serialization, nested
//! detail views, and one query module per booking-domain entity.
//!
//! # Example
//!
//! ```no_run
//! use staybook_core::config::DatabaseConfig;
//! use staybook_db::pool::{get_conn, init_pool};
//! use staybook_db::queries::users;
//!
//! let pool = init_pool(&DatabaseConfig::default()).unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let guest = users::create_guest_user(&conn, "guest@example.com", None, None).unwrap();
//! println!("{}", serde_json::Value::Object(guest.serialize()));
//! ```

pub mod detail;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
