//! Typed ID wrappers providing compile-time safety for entity identifiers.
//!
//! Each ID type is a newtype over `Uuid`, so a `RoomId` can never be passed
//! where a `BookingId` is expected. Relationships between records are stored
//! as these IDs only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generate a newtype ID wrapper over `Uuid`.
///
/// The macro produces a struct with:
/// - `new()` to create a random v4 UUID
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Serialize`, `Deserialize`
/// - `Display` and `FromStr` delegating to the inner UUID
/// - `From<Uuid>` and `Into<Uuid>` conversions
/// - `Default` that generates a new random ID
macro_rules! typed_id {
    ($($(#[doc = $doc:expr])* $name:ident),+ $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(Uuid);

            impl $name {
                /// Create a new random ID.
                #[must_use]
                pub fn new() -> Self {
                    Self(Uuid::new_v4())
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = uuid::Error;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    Uuid::parse_str(s).map(Self)
                }
            }

            impl From<Uuid> for $name {
                fn from(uuid: Uuid) -> Self {
                    Self(uuid)
                }
            }

            impl From<$name> for Uuid {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

typed_id! {
    /// Unique identifier for a user (registered or guest).
    UserId,
    /// Unique identifier for a bookable experience.
    ExperienceId,
    /// Unique identifier for a weekly experience schedule slot.
    ExperienceScheduleId,
    /// Unique identifier for a room.
    RoomId,
    /// Unique identifier for an add-on extra.
    ExtraId,
    /// Unique identifier for a package.
    PackageId,
    /// Unique identifier for an extra included in a package.
    PackageExtraId,
    /// Unique identifier for a booking.
    BookingId,
    /// Unique identifier for a room stay attached to a booking.
    BookingRoomId,
    /// Unique identifier for an extra attached to a booking.
    BookingExtraId,
    /// Unique identifier for an email log entry.
    EmailLogId,
    /// Unique identifier for a per-date room availability override.
    RoomAvailabilityId,
    /// Unique identifier for a per-date experience availability override.
    ExperienceAvailabilityId,
    /// Unique identifier for a cart line snapshot.
    BookingItemId,
}
