// Domain model: hotels, rooms, bookings and users.
// Field names mirror the JSON documents the surrounding HTTP layer exchanges.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Fallback occupancy for rooms whose type label matches no known pattern.
pub const DEFAULT_ROOM_CAPACITY: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub contact: String,
    /// Weak reference to the owning user, used for lookup only.
    pub owner: String,
    pub description: String,
    pub main_image: String,
    pub rating: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The hotel fields returned alongside each room in search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSummary {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub contact: String,
}

impl From<&Hotel> for HotelSummary {
    fn from(hotel: &Hotel) -> Self {
        Self {
            id: hotel.id.clone(),
            name: hotel.name.clone(),
            address: hotel.address.clone(),
            city: hotel.city.clone(),
            contact: hotel.contact.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    /// Owning hotel; a room belongs to exactly one hotel.
    pub hotel: String,
    pub room_type: String,
    /// Display-formatted price string, e.g. "11,800". See the price module.
    pub price_per_night: String,
    /// Explicit occupancy where recorded; legacy rooms rely on the
    /// room-type label instead.
    pub capacity: Option<u32>,
    pub bed_type: Option<String>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub description: Option<String>,
    /// Static on/off flag, not per-date availability.
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Maximum occupancy. The explicit `capacity` field wins; otherwise a
    /// lexical rule on the room-type label applies.
    pub fn effective_capacity(&self) -> u32 {
        if let Some(capacity) = self.capacity {
            return capacity;
        }
        if self.room_type.contains("Single") {
            1
        } else if self.room_type.contains("Double") {
            2
        } else if self.room_type.contains("Family") {
            4
        } else {
            DEFAULT_ROOM_CAPACITY
        }
    }

    pub fn fits(&self, guests: u32) -> bool {
        guests <= self.effective_capacity()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub user: String,
    pub room: String,
    pub hotel: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: u64,
    pub guests: u32,
    pub status: BookingStatus,
    pub payment_method: String,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Whether this booking's stay intersects the half-open interval
    /// `[check_in, check_out)`.
    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        intervals_overlap(self.check_in_date, self.check_out_date, check_in, check_out)
    }

    /// A booking holds its room unless it has been cancelled.
    pub fn blocks_room(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }
}

/// Half-open interval overlap: `[a1, a2)` and `[b1, b2)` intersect iff each
/// starts before the other ends. Back-to-back stays do not overlap.
pub fn intervals_overlap(a1: NaiveDate, a2: NaiveDate, b1: NaiveDate, b2: NaiveDate) -> bool {
    a1 < b2 && b1 < a2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    User,
    HotelOwner,
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Unique external-identity key.
    pub clerk_id: String,
    pub username: String,
    pub email: String,
    pub image: Vec<String>,
    pub role: UserRole,
    /// Most recent first, capped by the store.
    pub recent_searched_cities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
