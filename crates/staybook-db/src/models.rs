//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row` selected in table column order, and `serialize` for
//! rendering a flat JSON map safe to hand to API clients.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use staybook_core::{
    format, BookingExtraId, BookingId, BookingItemId, BookingItemType, BookingRoomId,
    BookingStatus, DayOfWeek, EmailLogId, EmailStatus, ExperienceAvailabilityId, ExperienceId,
    ExperienceScheduleId, ExtraId, ExtraType, PackageExtraId, PackageId, PaymentStatus,
    RoomAvailabilityId, RoomId, UserId, UserRole,
};
use uuid::Uuid;

/// Serialized form of a record.
pub type JsonMap = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn conversion_err(idx: usize, e: impl Into<BoxError>) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
}

/// Parse a required text column with `f`.
fn parse_with<T, E: Into<BoxError>>(
    row: &rusqlite::Row,
    idx: usize,
    f: impl FnOnce(&str) -> Result<T, E>,
) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    f(&s).map_err(|e| conversion_err(idx, e))
}

/// Parse a nullable text column with `f`.
fn parse_opt_with<T, E: Into<BoxError>>(
    row: &rusqlite::Row,
    idx: usize,
    f: impl FnOnce(&str) -> Result<T, E>,
) -> rusqlite::Result<Option<T>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|v| f(&v).map_err(|e| conversion_err(idx, e)))
        .transpose()
}

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    parse_with(row, idx, |s| Uuid::parse_str(s).map(T::from))
}

fn parse_opt_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<T>> {
    parse_opt_with(row, idx, |s| Uuid::parse_str(s).map(T::from))
}

fn flag(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<bool> {
    Ok(row.get::<_, i32>(idx)? != 0)
}

/// Unwrap the object produced by `json!({...})`.
pub(crate) fn into_map(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        _ => JsonMap::new(),
    }
}

fn opt_date(d: Option<NaiveDate>) -> Option<String> {
    d.map(format::date)
}

fn opt_time(t: Option<NaiveTime>) -> Option<String> {
    t.map(format::time)
}

fn opt_timestamp(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(format::timestamp)
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// `None` for guest checkout accounts.
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub role: UserRole,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email_verified: bool,
    pub verification_token: Option<String>,
    pub verification_token_expires: Option<DateTime<Utc>>,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub is_guest: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Build from a row selected as:
    /// id, email, password_hash, is_active, role, name, phone, email_verified,
    /// verification_token, verification_token_expires, password_reset_token,
    /// password_reset_expires, is_guest, created_at, last_login
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            is_active: flag(row, 3)?,
            role: parse_with(row, 4, str::parse)?,
            name: row.get(5)?,
            phone: row.get(6)?,
            email_verified: flag(row, 7)?,
            verification_token: row.get(8)?,
            verification_token_expires: parse_opt_with(row, 9, format::parse_timestamp)?,
            password_reset_token: row.get(10)?,
            password_reset_expires: parse_opt_with(row, 11, format::parse_timestamp)?,
            is_guest: flag(row, 12)?,
            created_at: parse_with(row, 13, format::parse_timestamp)?,
            last_login: parse_opt_with(row, 14, format::parse_timestamp)?,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// True when no verification token is outstanding or it has lapsed.
    pub fn verification_token_expired(&self, now: DateTime<Utc>) -> bool {
        self.verification_token_expires
            .map_or(true, |expires| now > expires)
    }

    /// True when no reset token is outstanding or it has lapsed.
    pub fn password_reset_expired(&self, now: DateTime<Utc>) -> bool {
        self.password_reset_expires.map_or(true, |expires| now > expires)
    }

    /// Public fields only: no password hash, no tokens.
    pub fn serialize(&self) -> JsonMap {
        into_map(json!({
            "id": self.id,
            "email": self.email,
            "is_active": self.is_active,
            "role": self.role.as_str(),
            "name": self.name,
            "phone": self.phone,
            "email_verified": self.email_verified,
            "is_guest": self.is_guest,
            "created_at": format::timestamp(self.created_at),
            "last_login": opt_timestamp(self.last_login),
        }))
    }
}

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Experience {
    pub id: ExperienceId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub max_capacity: i32,
    pub duration_hours: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Experience {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            max_capacity: row.get(4)?,
            duration_hours: row.get(5)?,
            image_url: row.get(6)?,
            is_active: flag(row, 7)?,
            created_at: parse_with(row, 8, format::parse_timestamp)?,
        })
    }

    pub fn serialize(&self, schedules: &[ExperienceSchedule]) -> JsonMap {
        let schedules: Vec<Value> = schedules
            .iter()
            .map(|s| Value::Object(s.serialize()))
            .collect();
        into_map(json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "price": self.price,
            "max_capacity": self.max_capacity,
            "duration_hours": self.duration_hours,
            "image_url": self.image_url,
            "is_active": self.is_active,
            "schedules": schedules,
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceSchedule {
    pub id: ExperienceScheduleId,
    pub experience_id: ExperienceId,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
}

impl ExperienceSchedule {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            experience_id: parse_id(row, 1)?,
            day_of_week: parse_with(row, 2, str::parse)?,
            start_time: parse_with(row, 3, format::parse_time)?,
        })
    }

    pub fn serialize(&self) -> JsonMap {
        into_map(json!({
            "id": self.id,
            "day_of_week": self.day_of_week.as_str(),
            "start_time": format::time(self.start_time),
        }))
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub description: Option<String>,
    pub capacity: i32,
    pub price_per_night: f64,
    pub image_url: Option<String>,
    /// Free-form amenity map, e.g. `{"wifi": true, "beds": 2}`.
    pub amenities: Option<Value>,
    pub is_active: bool,
    pub check_in_time: NaiveTime,
    pub check_out_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            capacity: row.get(3)?,
            price_per_night: row.get(4)?,
            image_url: row.get(5)?,
            amenities: parse_opt_with(row, 6, |s| serde_json::from_str(s))?,
            is_active: flag(row, 7)?,
            check_in_time: parse_with(row, 8, format::parse_time)?,
            check_out_time: parse_with(row, 9, format::parse_time)?,
            created_at: parse_with(row, 10, format::parse_timestamp)?,
        })
    }

    pub fn serialize(&self) -> JsonMap {
        into_map(json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "capacity": self.capacity,
            "price_per_night": self.price_per_night,
            "image_url": self.image_url,
            "amenities": self.amenities,
            "is_active": self.is_active,
            "check_in_time": format::time(self.check_in_time),
            "check_out_time": format::time(self.check_out_time),
        }))
    }
}

// ---------------------------------------------------------------------------
// Extra
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Extra {
    pub id: ExtraId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub extra_type: ExtraType,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Extra {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            extra_type: parse_with(row, 4, str::parse)?,
            image_url: row.get(5)?,
            is_active: flag(row, 6)?,
            created_at: parse_with(row, 7, format::parse_timestamp)?,
        })
    }

    pub fn serialize(&self) -> JsonMap {
        into_map(json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "price": self.price,
            "type": self.extra_type.as_str(),
            "image_url": self.image_url,
            "is_active": self.is_active,
        }))
    }
}

// ---------------------------------------------------------------------------
// Package
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub id: PackageId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub room_id: Option<RoomId>,
    pub experience_id: Option<ExperienceId>,
    pub created_at: DateTime<Utc>,
}

impl Package {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            image_url: row.get(4)?,
            is_active: flag(row, 5)?,
            room_id: parse_opt_id(row, 6)?,
            experience_id: parse_opt_id(row, 7)?,
            created_at: parse_with(row, 8, format::parse_timestamp)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageExtra {
    pub id: PackageExtraId,
    pub package_id: PackageId,
    pub extra_id: ExtraId,
    pub quantity: i32,
}

impl PackageExtra {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            package_id: parse_id(row, 1)?,
            extra_id: parse_id(row, 2)?,
            quantity: row.get(3)?,
        })
    }

    /// `extra` must be the row referenced by `extra_id`.
    pub fn serialize(&self, extra: &Extra) -> JsonMap {
        into_map(json!({
            "id": self.id,
            "extra": extra.serialize(),
            "quantity": self.quantity,
        }))
    }
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub confirmation_number: String,
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
    pub stripe_payment_intent_id: Option<String>,
    /// Raw status string reported by the payment gateway.
    pub stripe_payment_status: Option<String>,
    pub payment_status: PaymentStatus,
    pub special_requests: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cart_expires_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Build from a row selected as all columns in table order.
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            user_id: parse_id(row, 1)?,
            confirmation_number: row.get(2)?,
            experience_id: parse_opt_id(row, 3)?,
            package_id: parse_opt_id(row, 4)?,
            experience_date: parse_opt_with(row, 5, format::parse_date)?,
            experience_time: parse_opt_with(row, 6, format::parse_time)?,
            check_in: parse_opt_with(row, 7, format::parse_date)?,
            check_out: parse_opt_with(row, 8, format::parse_date)?,
            check_in_time: parse_opt_with(row, 9, format::parse_time)?,
            check_out_time: parse_opt_with(row, 10, format::parse_time)?,
            number_of_guests: row.get(11)?,
            status: parse_with(row, 12, str::parse)?,
            total_price: row.get(13)?,
            stripe_payment_intent_id: row.get(14)?,
            stripe_payment_status: row.get(15)?,
            payment_status: parse_with(row, 16, str::parse)?,
            special_requests: row.get(17)?,
            admin_notes: row.get(18)?,
            created_at: parse_with(row, 19, format::parse_timestamp)?,
            updated_at: parse_with(row, 20, format::parse_timestamp)?,
            cart_expires_at: parse_opt_with(row, 21, format::parse_timestamp)?,
        })
    }

    /// A cart whose expiry has passed.
    pub fn is_expired_cart(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Cart
            && self.cart_expires_at.is_some_and(|expires| expires < now)
    }

    /// Scalar fields with relationships as bare IDs.
    ///
    /// [`crate::detail::BookingDetail::serialize`] embeds the related
    /// records instead.
    pub fn serialize(&self) -> JsonMap {
        let mut map = self.scalar_fields();
        map.insert("user_id".into(), json!(self.user_id));
        map.insert("experience_id".into(), json!(self.experience_id));
        map.insert("package_id".into(), json!(self.package_id));
        map
    }

    pub(crate) fn scalar_fields(&self) -> JsonMap {
        into_map(json!({
            "id": self.id,
            "confirmation_number": self.confirmation_number,
            "experience_date": opt_date(self.experience_date),
            "experience_time": opt_time(self.experience_time),
            "check_in": opt_date(self.check_in),
            "check_out": opt_date(self.check_out),
            "check_in_time": opt_time(self.check_in_time),
            "check_out_time": opt_time(self.check_out_time),
            "number_of_guests": self.number_of_guests,
            "status": self.status.as_str(),
            "payment_status": self.payment_status.as_str(),
            "total_price": self.total_price,
            "special_requests": self.special_requests,
            "admin_notes": self.admin_notes,
            "stripe_payment_intent_id": self.stripe_payment_intent_id,
            "created_at": format::timestamp(self.created_at),
            "updated_at": format::timestamp(self.updated_at),
            "cart_expires_at": opt_timestamp(self.cart_expires_at),
        }))
    }

    /// Payment gateway diagnostics appended by `serialize_admin`.
    pub(crate) fn stripe_details(&self) -> Value {
        json!({
            "payment_intent_id": self.stripe_payment_intent_id,
            "payment_status": self.stripe_payment_status,
            "payment_status_enum": self.payment_status.as_str(),
        })
    }

    /// [`Booking::serialize`] plus a `stripe_details` object. Only for
    /// privileged callers.
    pub fn serialize_admin(&self) -> JsonMap {
        let mut map = self.serialize();
        map.insert("stripe_details".into(), self.stripe_details());
        map
    }
}

// ---------------------------------------------------------------------------
// BookingRoom
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BookingRoom {
    pub id: BookingRoomId,
    pub booking_id: BookingId,
    pub room_id: RoomId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i32,
    pub price: f64,
}

impl BookingRoom {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            booking_id: parse_id(row, 1)?,
            room_id: parse_id(row, 2)?,
            check_in: parse_with(row, 3, format::parse_date)?,
            check_out: parse_with(row, 4, format::parse_date)?,
            nights: row.get(5)?,
            price: row.get(6)?,
        })
    }

    /// `room` must be the row referenced by `room_id`.
    pub fn serialize(&self, room: &Room) -> JsonMap {
        into_map(json!({
            "id": self.id,
            "room": room.serialize(),
            "check_in": format::date(self.check_in),
            "check_out": format::date(self.check_out),
            "nights": self.nights,
            "price": self.price,
        }))
    }
}

// ---------------------------------------------------------------------------
// BookingExtra
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BookingExtra {
    pub id: BookingExtraId,
    pub booking_id: BookingId,
    pub extra_id: ExtraId,
    pub quantity: i32,
    pub price: f64,
}

impl BookingExtra {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            booking_id: parse_id(row, 1)?,
            extra_id: parse_id(row, 2)?,
            quantity: row.get(3)?,
            price: row.get(4)?,
        })
    }

    /// `extra` must be the row referenced by `extra_id`.
    pub fn serialize(&self, extra: &Extra) -> JsonMap {
        into_map(json!({
            "id": self.id,
            "extra": extra.serialize(),
            "quantity": self.quantity,
            "price": self.price,
        }))
    }
}

// ---------------------------------------------------------------------------
// EmailLog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EmailLog {
    pub id: EmailLogId,
    pub booking_id: BookingId,
    /// e.g. `booking_confirmation`, `payment_receipt`.
    pub email_type: String,
    pub recipient_email: String,
    pub subject: String,
    pub status: EmailStatus,
    pub error_message: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl EmailLog {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            booking_id: parse_id(row, 1)?,
            email_type: row.get(2)?,
            recipient_email: row.get(3)?,
            subject: row.get(4)?,
            status: parse_with(row, 5, str::parse)?,
            error_message: row.get(6)?,
            sent_at: parse_opt_with(row, 7, format::parse_timestamp)?,
            created_at: parse_with(row, 8, format::parse_timestamp)?,
        })
    }

    pub fn serialize(&self) -> JsonMap {
        into_map(json!({
            "id": self.id,
            "booking_id": self.booking_id,
            "email_type": self.email_type,
            "recipient_email": self.recipient_email,
            "subject": self.subject,
            "status": self.status.as_str(),
            "error_message": self.error_message,
            "sent_at": opt_timestamp(self.sent_at),
            "created_at": format::timestamp(self.created_at),
        }))
    }
}

// ---------------------------------------------------------------------------
// Availability overrides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RoomAvailability {
    pub id: RoomAvailabilityId,
    pub room_id: RoomId,
    pub date: NaiveDate,
    pub is_available: bool,
    pub reason: Option<String>,
}

impl RoomAvailability {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            room_id: parse_id(row, 1)?,
            date: parse_with(row, 2, format::parse_date)?,
            is_available: flag(row, 3)?,
            reason: row.get(4)?,
        })
    }

    pub fn serialize(&self) -> JsonMap {
        into_map(json!({
            "id": self.id,
            "room_id": self.room_id,
            "date": format::date(self.date),
            "is_available": self.is_available,
            "reason": self.reason,
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceAvailability {
    pub id: ExperienceAvailabilityId,
    pub experience_id: ExperienceId,
    pub date: NaiveDate,
    pub available_spots: i32,
}

impl ExperienceAvailability {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            experience_id: parse_id(row, 1)?,
            date: parse_with(row, 2, format::parse_date)?,
            available_spots: row.get(3)?,
        })
    }

    pub fn serialize(&self) -> JsonMap {
        into_map(json!({
            "id": self.id,
            "experience_id": self.experience_id,
            "date": format::date(self.date),
            "available_spots": self.available_spots,
        }))
    }
}

// ---------------------------------------------------------------------------
// BookingItem
// ---------------------------------------------------------------------------

/// Extra captured inside a cart line at the time it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemExtraSnapshot {
    pub id: ExtraId,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingItem {
    pub id: BookingItemId,
    pub booking_id: BookingId,
    pub item_type: BookingItemType,
    pub experience_id: Option<ExperienceId>,
    pub room_id: Option<RoomId>,
    pub name: String,
    pub image_url: Option<String>,
    pub date: Option<NaiveDate>,
    pub guests: Option<i32>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub nights: Option<i32>,
    pub unit_price: f64,
    pub subtotal: f64,
    pub extras: Vec<ItemExtraSnapshot>,
    pub created_at: DateTime<Utc>,
}

impl BookingItem {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            booking_id: parse_id(row, 1)?,
            item_type: parse_with(row, 2, str::parse)?,
            experience_id: parse_opt_id(row, 3)?,
            room_id: parse_opt_id(row, 4)?,
            name: row.get(5)?,
            image_url: row.get(6)?,
            date: parse_opt_with(row, 7, format::parse_date)?,
            guests: row.get(8)?,
            check_in: parse_opt_with(row, 9, format::parse_date)?,
            check_out: parse_opt_with(row, 10, format::parse_date)?,
            nights: row.get(11)?,
            unit_price: row.get(12)?,
            subtotal: row.get(13)?,
            extras: parse_with(row, 14, |s| serde_json::from_str(s))?,
            created_at: parse_with(row, 15, format::parse_timestamp)?,
        })
    }

    pub fn serialize(&self) -> JsonMap {
        into_map(json!({
            "id": self.id,
            "type": self.item_type.as_str(),
            "name": self.name,
            "image_url": self.image_url,
            "date": opt_date(self.date),
            "check_in": opt_date(self.check_in),
            "check_out": opt_date(self.check_out),
            "guests": self.guests,
            "nights": self.nights,
            "unit_price": self.unit_price,
            "subtotal": self.subtotal,
            "extras": self.extras,
            "experience_id": self.experience_id,
            "room_id": self.room_id,
        }))
    }
}
