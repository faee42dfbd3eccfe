//! Booking-domain enums: roles, lifecycle states, weekdays, extra pricing.
//!
//! All enums serialize as their snake_case string value, which is also the
//! representation stored in the database and rendered by `serialize`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Implement `as_str`, `Display`, and `FromStr` for a fieldless enum from a
/// variant-to-string table.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored/serialized string value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(Error::Validation(format!(
                        "invalid {}: '{other}'",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

string_enum!(UserRole {
    User => "user",
    Admin => "admin",
});

// ---------------------------------------------------------------------------
// BookingStatus
// ---------------------------------------------------------------------------

/// Booking lifecycle state.
///
/// `cart -> pending -> confirmed -> completed`, with `cancelled` reachable
/// from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Cart,
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

string_enum!(BookingStatus {
    Cart => "cart",
    Pending => "pending",
    Confirmed => "confirmed",
    Cancelled => "cancelled",
    Completed => "completed",
});

impl BookingStatus {
    /// Whether the lifecycle allows moving from `self` to `next`.
    /// Staying in the same state is always allowed.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        self == next
            || matches!(
                (self, next),
                (Cart, Pending)
                    | (Cart, Cancelled)
                    | (Pending, Confirmed)
                    | (Pending, Cancelled)
                    | (Confirmed, Cancelled)
                    | (Confirmed, Completed)
            )
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

// ---------------------------------------------------------------------------
// PaymentStatus
// ---------------------------------------------------------------------------

/// Payment state mirrored from the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Succeeded,
    Failed,
    Refunded,
}

string_enum!(PaymentStatus {
    Pending => "pending",
    Processing => "processing",
    Succeeded => "succeeded",
    Failed => "failed",
    Refunded => "refunded",
});

impl PaymentStatus {
    /// Whether the payment lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        self == next
            || matches!(
                (self, next),
                (Pending, Processing)
                    | (Pending, Succeeded)
                    | (Pending, Failed)
                    | (Processing, Succeeded)
                    | (Processing, Failed)
                    | (Failed, Processing)
                    | (Succeeded, Refunded)
            )
    }
}

// ---------------------------------------------------------------------------
// DayOfWeek
// ---------------------------------------------------------------------------

/// Day of the week for recurring experience schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

string_enum!(DayOfWeek {
    Monday => "monday",
    Tuesday => "tuesday",
    Wednesday => "wednesday",
    Thursday => "thursday",
    Friday => "friday",
    Saturday => "saturday",
    Sunday => "sunday",
});

impl DayOfWeek {
    /// Zero-based position in the week, Monday first.
    pub fn index(self) -> u8 {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }
}

// ---------------------------------------------------------------------------
// ExtraType
// ---------------------------------------------------------------------------

/// How an extra is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraType {
    /// Charged once per booking.
    PerBooking,
    /// Charged once per guest.
    PerGuest,
}

string_enum!(ExtraType {
    PerBooking => "per_booking",
    PerGuest => "per_guest",
});

impl ExtraType {
    /// Total charge for `quantity` units at `unit_price` on a booking with
    /// `guests` guests.
    pub fn charge(self, unit_price: f64, quantity: i32, guests: i32) -> f64 {
        match self {
            Self::PerBooking => unit_price * f64::from(quantity),
            Self::PerGuest => unit_price * f64::from(quantity) * f64::from(guests),
        }
    }
}

// ---------------------------------------------------------------------------
// EmailStatus
// ---------------------------------------------------------------------------

/// Delivery state of a logged notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    #[default]
    Pending,
    Sent,
    Failed,
}

string_enum!(EmailStatus {
    Pending => "pending",
    Sent => "sent",
    Failed => "failed",
});

// ---------------------------------------------------------------------------
// BookingItemType
// ---------------------------------------------------------------------------

/// Kind of cart line captured in a booking item snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingItemType {
    Experience,
    Room,
}

string_enum!(BookingItemType {
    Experience => "experience",
    Room => "room",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde() {
        for status in BookingStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
        assert_eq!(
            serde_json::to_string(&ExtraType::PerGuest).unwrap(),
            r#""per_guest""#
        );
    }

    #[test]
    fn from_str_roundtrip() {
        for day in DayOfWeek::ALL {
            assert_eq!(day.as_str().parse::<DayOfWeek>().unwrap(), *day);
        }
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
    }

    #[test]
    fn from_str_rejects_unknown() {
        let err = "shipped".parse::<BookingStatus>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("shipped"));
    }

    #[test]
    fn defaults() {
        assert_eq!(UserRole::default(), UserRole::User);
        assert_eq!(BookingStatus::default(), BookingStatus::Cart);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(EmailStatus::default(), EmailStatus::Pending);
    }

    #[test]
    fn booking_lifecycle() {
        use BookingStatus::*;
        assert!(Cart.can_transition_to(Pending));
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Cart.can_transition_to(Cart));

        assert!(!Cart.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(Completed.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn payment_lifecycle() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Succeeded));
        assert!(Failed.can_transition_to(Processing));
        assert!(Succeeded.can_transition_to(Refunded));

        assert!(!Refunded.can_transition_to(Succeeded));
        assert!(!Pending.can_transition_to(Refunded));
    }

    #[test]
    fn weekday_order() {
        assert!(DayOfWeek::Monday.index() < DayOfWeek::Sunday.index());
    }

    #[test]
    fn extra_charge() {
        assert_eq!(ExtraType::PerBooking.charge(25.0, 2, 4), 50.0);
        assert_eq!(ExtraType::PerGuest.charge(10.0, 1, 3), 30.0);
    }

    #[test]
    fn extra_charge_large_quantities() {
        // 50_000 * 50_000 does not fit in an i32.
        assert_eq!(
            ExtraType::PerGuest.charge(2.0, 50_000, 50_000),
            5_000_000_000.0
        );
        assert_eq!(
            ExtraType::PerBooking.charge(1.5, i32::MAX, 1),
            1.5 * f64::from(i32::MAX)
        );
    }
}
