//! Resolved record graphs for nested serialization.
//!
//! Records only hold foreign-key IDs. A detail view carries the related rows
//! alongside the record so it can render the nested JSON shape clients see.
//! Views are built by the `load_detail` functions in [`crate::queries`].

use serde_json::{json, Value};

use crate::models::{
    into_map, Booking, BookingExtra, BookingRoom, Experience, ExperienceSchedule, Extra, JsonMap,
    Package, PackageExtra, Room, User,
};

/// An experience with its weekly schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceDetail {
    pub experience: Experience,
    pub schedules: Vec<ExperienceSchedule>,
}

impl ExperienceDetail {
    pub fn serialize(&self) -> JsonMap {
        self.experience.serialize(&self.schedules)
    }
}

/// A package with the room, experience and extras it bundles.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDetail {
    pub package: Package,
    pub room: Option<Room>,
    pub experience: Option<ExperienceDetail>,
    pub included_extras: Vec<(PackageExtra, Extra)>,
}

impl PackageDetail {
    pub fn serialize(&self) -> JsonMap {
        let p = &self.package;
        let included: Vec<Value> = self
            .included_extras
            .iter()
            .map(|(pe, extra)| Value::Object(pe.serialize(extra)))
            .collect();
        into_map(json!({
            "id": p.id,
            "name": p.name,
            "description": p.description,
            "price": p.price,
            "image_url": p.image_url,
            "room": self.room.as_ref().map(Room::serialize),
            "experience": self.experience.as_ref().map(ExperienceDetail::serialize),
            "included_extras": included,
            "is_active": p.is_active,
        }))
    }
}

/// A booking with everything it references.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDetail {
    pub booking: Booking,
    pub user: User,
    pub experience: Option<ExperienceDetail>,
    pub package: Option<PackageDetail>,
    pub rooms: Vec<(BookingRoom, Room)>,
    pub extras: Vec<(BookingExtra, Extra)>,
}

impl BookingDetail {
    /// Booking fields with user, experience, package, rooms and extras
    /// embedded as nested objects.
    pub fn serialize(&self) -> JsonMap {
        let mut map = self.booking.scalar_fields();
        let rooms: Vec<Value> = self
            .rooms
            .iter()
            .map(|(br, room)| Value::Object(br.serialize(room)))
            .collect();
        let extras: Vec<Value> = self
            .extras
            .iter()
            .map(|(be, extra)| Value::Object(be.serialize(extra)))
            .collect();

        map.insert("user".into(), Value::Object(self.user.serialize()));
        map.insert(
            "experience".into(),
            json!(self.experience.as_ref().map(ExperienceDetail::serialize)),
        );
        map.insert(
            "package".into(),
            json!(self.package.as_ref().map(PackageDetail::serialize)),
        );
        map.insert("rooms".into(), Value::Array(rooms));
        map.insert("extras".into(), Value::Array(extras));
        map
    }

    /// [`BookingDetail::serialize`] plus payment gateway details.
    pub fn serialize_admin(&self) -> JsonMap {
        let mut map = self.serialize();
        map.insert("stripe_details".into(), self.booking.stripe_details());
        map
    }

    /// Sum of the stored room and extra line prices. Independent of
    /// `total_price`, which callers set explicitly.
    pub fn line_items_total(&self) -> f64 {
        let rooms: f64 = self.rooms.iter().map(|(br, _)| br.price).sum();
        let extras: f64 = self.extras.iter().map(|(be, _)| be.price).sum();
        rooms + extras
    }
}
