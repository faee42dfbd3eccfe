//! staybook-core: shared types, IDs, errors, configuration, and token generation.
//!
//! This crate is the foundational dependency for the other staybook crates,
//! providing type-safe identifiers, a unified error type, booking-domain
//! enums, date/time formatting, application configuration, and the
//! confirmation number / URL token generators.

pub mod config;
pub mod error;
pub mod format;
pub mod ids;
pub mod tokens;
pub mod types;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
