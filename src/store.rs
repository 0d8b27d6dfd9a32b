// Storage collaborator: the read interface the search and listing
// components consume, plus an in-memory reference implementation backing
// tests, the benchmark and embedding layers that do not bring their own
// database.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::{Booking, BookingStatus, Hotel, Room, User, UserRole};

/// Upper bound on a user's recent-searched-cities list, most recent first.
pub const MAX_RECENT_CITIES: usize = 3;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid booking dates: check-in {check_in} is not before check-out {check_out}")]
    InvalidDates {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("room {room_id} already has a booking overlapping {check_in}..{check_out}")]
    RoomUnavailable {
        room_id: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("booking {id} is already cancelled")]
    AlreadyCancelled { id: String },

    #[error("booking {id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        id: String,
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Read operations over the three collections the availability search and
/// the room listing depend on. Implementations must be side-effect free;
/// "no matches" is an empty vector, never an error.
#[async_trait]
pub trait InventoryStore: Send + Sync + 'static {
    /// Hotels whose city matches `pattern`, case-insensitive substring.
    async fn hotels_by_city(&self, pattern: &str) -> Result<Vec<Hotel>, StoreError>;

    /// Rooms belonging to any of the given hotels.
    async fn rooms_by_hotel_ids(&self, hotel_ids: &[String]) -> Result<Vec<Room>, StoreError>;

    /// Bookings on any of the given rooms whose stay intersects the
    /// half-open interval `[check_in, check_out)`. Returned regardless of
    /// status; callers decide how cancelled bookings are treated.
    async fn bookings_overlapping(
        &self,
        room_ids: &[String],
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Booking>, StoreError>;

    async fn all_rooms(&self) -> Result<Vec<Room>, StoreError>;

    async fn hotel_by_id(&self, id: &str) -> Result<Option<Hotel>, StoreError>;

    async fn room_by_id(&self, id: &str) -> Result<Option<Room>, StoreError>;
}

/// Case-insensitive substring match on a hotel's city.
pub(crate) fn city_matches(city: &str, pattern: &str) -> bool {
    city.to_lowercase().contains(pattern.trim().to_lowercase().as_str())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHotel {
    pub name: String,
    pub address: String,
    pub city: String,
    pub contact: String,
    pub owner: String,
    pub description: String,
    pub main_image: String,
    pub rating: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub hotel: String,
    pub room_type: String,
    pub price_per_night: String,
    pub capacity: Option<u32>,
    pub bed_type: Option<String>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub user: String,
    pub room: String,
    pub hotel: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: u64,
    pub guests: u32,
    pub payment_method: String,
    pub is_paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub clerk_id: String,
    pub username: String,
    pub email: String,
    pub image: Option<String>,
    pub role: Option<UserRole>,
}

/// In-memory store over concurrent maps. Each collection is keyed by id;
/// writes are inherent methods, reads go through [`InventoryStore`].
#[derive(Default)]
pub struct MemoryStore {
    hotels: DashMap<String, Hotel>,
    rooms: DashMap<String, Room>,
    bookings: DashMap<String, Booking>,
    users: DashMap<String, User>,
    newsletter: RwLock<HashSet<String>>,
    // Serializes booking creation so the overlap check and the insert
    // happen atomically with respect to other writers.
    booking_write: Mutex<()>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn add_hotel(&self, new: NewHotel) -> Hotel {
        let now = Utc::now();
        let hotel = Hotel {
            id: self.next_id("hotel"),
            name: new.name,
            address: new.address,
            city: new.city,
            contact: new.contact,
            owner: new.owner,
            description: new.description,
            main_image: new.main_image,
            rating: new.rating,
            created_at: now,
            updated_at: now,
        };
        self.hotels.insert(hotel.id.clone(), hotel.clone());
        hotel
    }

    pub fn add_room(&self, new: NewRoom) -> Result<Room, StoreError> {
        if !self.hotels.contains_key(&new.hotel) {
            return Err(StoreError::NotFound {
                entity: "hotel",
                id: new.hotel,
            });
        }
        let now = Utc::now();
        let room = Room {
            id: self.next_id("room"),
            hotel: new.hotel,
            room_type: new.room_type,
            price_per_night: new.price_per_night,
            capacity: new.capacity,
            bed_type: new.bed_type,
            amenities: new.amenities,
            images: new.images,
            description: new.description,
            is_available: true,
            created_at: now,
            updated_at: now,
        };
        self.rooms.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    /// Create a booking. Performs the write-time overlap check: the room
    /// must have no non-cancelled booking intersecting the requested stay.
    /// Concurrent writers for the same interval see at most one succeed.
    pub fn create_booking(&self, new: NewBooking) -> Result<Booking, StoreError> {
        if new.check_in_date >= new.check_out_date {
            return Err(StoreError::InvalidDates {
                check_in: new.check_in_date,
                check_out: new.check_out_date,
            });
        }
        if !self.rooms.contains_key(&new.room) {
            return Err(StoreError::NotFound {
                entity: "room",
                id: new.room,
            });
        }
        if !self.hotels.contains_key(&new.hotel) {
            return Err(StoreError::NotFound {
                entity: "hotel",
                id: new.hotel,
            });
        }

        let _write = self.booking_write.lock();
        let conflict = self.bookings.iter().any(|existing| {
            existing.room == new.room
                && existing.blocks_room()
                && existing.overlaps(new.check_in_date, new.check_out_date)
        });
        if conflict {
            return Err(StoreError::RoomUnavailable {
                room_id: new.room,
                check_in: new.check_in_date,
                check_out: new.check_out_date,
            });
        }

        let now = Utc::now();
        let booking = Booking {
            id: self.next_id("booking"),
            user: new.user,
            room: new.room,
            hotel: new.hotel,
            check_in_date: new.check_in_date,
            check_out_date: new.check_out_date,
            total_price: new.total_price,
            guests: new.guests,
            status: BookingStatus::Pending,
            payment_method: new.payment_method,
            is_paid: new.is_paid,
            created_at: now,
            updated_at: now,
        };
        debug!(booking = %booking.id, room = %booking.room, "booking created");
        self.bookings.insert(booking.id.clone(), booking.clone());
        Ok(booking)
    }

    pub fn confirm_booking(&self, id: &str) -> Result<Booking, StoreError> {
        let mut entry = self.bookings.get_mut(id).ok_or_else(|| StoreError::NotFound {
            entity: "booking",
            id: id.to_string(),
        })?;
        if entry.status != BookingStatus::Pending {
            return Err(StoreError::InvalidTransition {
                id: id.to_string(),
                from: entry.status,
                to: BookingStatus::Confirmed,
            });
        }
        entry.status = BookingStatus::Confirmed;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    /// Cancel a pending or confirmed booking, freeing its room for the
    /// stay interval.
    pub fn cancel_booking(&self, id: &str) -> Result<Booking, StoreError> {
        let mut entry = self.bookings.get_mut(id).ok_or_else(|| StoreError::NotFound {
            entity: "booking",
            id: id.to_string(),
        })?;
        if entry.status == BookingStatus::Cancelled {
            return Err(StoreError::AlreadyCancelled { id: id.to_string() });
        }
        entry.status = BookingStatus::Cancelled;
        entry.updated_at = Utc::now();
        debug!(booking = %entry.id, room = %entry.room, "booking cancelled");
        Ok(entry.clone())
    }

    pub fn booking_by_id(&self, id: &str) -> Option<Booking> {
        self.bookings.get(id).map(|b| b.clone())
    }

    /// A user's bookings, newest first.
    pub fn bookings_for_user(&self, user_id: &str) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.user == user_id)
            .map(|b| b.clone())
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        bookings
    }

    /// Create-if-absent keyed by external identity; an existing user is
    /// returned unchanged.
    pub fn upsert_user(&self, new: NewUser) -> User {
        if let Some(existing) = self
            .users
            .iter()
            .find(|u| u.clerk_id == new.clerk_id)
            .map(|u| u.clone())
        {
            return existing;
        }
        let now = Utc::now();
        let user = User {
            id: self.next_id("user"),
            clerk_id: new.clerk_id,
            username: new.username,
            email: new.email,
            image: new.image.into_iter().collect(),
            role: new.role.unwrap_or_default(),
            recent_searched_cities: vec![],
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id.clone(), user.clone());
        user
    }

    pub fn user_by_clerk_id(&self, clerk_id: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.clerk_id == clerk_id)
            .map(|u| u.clone())
    }

    /// Push a city to the front of the user's recent-searches list,
    /// de-duplicated case-insensitively and capped at [`MAX_RECENT_CITIES`].
    pub fn record_searched_city(&self, user_id: &str, city: &str) -> Result<User, StoreError> {
        let mut entry = self.users.get_mut(user_id).ok_or_else(|| StoreError::NotFound {
            entity: "user",
            id: user_id.to_string(),
        })?;
        let city = city.trim();
        entry
            .recent_searched_cities
            .retain(|c| !c.eq_ignore_ascii_case(city));
        entry.recent_searched_cities.insert(0, city.to_string());
        entry.recent_searched_cities.truncate(MAX_RECENT_CITIES);
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    /// Subscribe an address to the newsletter. Returns false when it was
    /// already subscribed. Delivery is someone else's problem.
    pub fn subscribe_newsletter(&self, email: &str) -> Result<bool, StoreError> {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() || !normalized.contains('@') {
            return Err(StoreError::InvalidEmail(email.to_string()));
        }
        Ok(self.newsletter.write().insert(normalized))
    }

    pub fn newsletter_count(&self) -> usize {
        self.newsletter.read().len()
    }

    /// Distinct cities across all hotels, sorted.
    pub fn cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = self
            .hotels
            .iter()
            .map(|h| h.city.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        cities.sort();
        cities
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn hotels_by_city(&self, pattern: &str) -> Result<Vec<Hotel>, StoreError> {
        let mut hotels: Vec<Hotel> = self
            .hotels
            .iter()
            .filter(|h| city_matches(&h.city, pattern))
            .map(|h| h.clone())
            .collect();
        hotels.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(hotels)
    }

    async fn rooms_by_hotel_ids(&self, hotel_ids: &[String]) -> Result<Vec<Room>, StoreError> {
        let wanted: HashSet<&String> = hotel_ids.iter().collect();
        let mut rooms: Vec<Room> = self
            .rooms
            .iter()
            .filter(|r| wanted.contains(&r.hotel))
            .map(|r| r.clone())
            .collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rooms)
    }

    async fn bookings_overlapping(
        &self,
        room_ids: &[String],
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Booking>, StoreError> {
        let wanted: HashSet<&String> = room_ids.iter().collect();
        Ok(self
            .bookings
            .iter()
            .filter(|b| wanted.contains(&b.room) && b.overlaps(check_in, check_out))
            .map(|b| b.clone())
            .collect())
    }

    async fn all_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let mut rooms: Vec<Room> = self.rooms.iter().map(|r| r.clone()).collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rooms)
    }

    async fn hotel_by_id(&self, id: &str) -> Result<Option<Hotel>, StoreError> {
        Ok(self.hotels.get(id).map(|h| h.clone()))
    }

    async fn room_by_id(&self, id: &str) -> Result<Option<Room>, StoreError> {
        Ok(self.rooms.get(id).map(|r| r.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn seeded_room(store: &MemoryStore) -> (Hotel, Room) {
        let hotel = store.add_hotel(NewHotel {
            name: "Sea Breeze Villa".to_string(),
            address: "ECR Road, Kovalam".to_string(),
            city: "Chennai".to_string(),
            contact: "+91-44-27452345".to_string(),
            owner: "user-0".to_string(),
            description: "Beachfront villa".to_string(),
            main_image: "roomImg11.png".to_string(),
            rating: 4.8,
        });
        let room = store
            .add_room(NewRoom {
                hotel: hotel.id.clone(),
                room_type: "Double Bed".to_string(),
                price_per_night: "8,500".to_string(),
                capacity: None,
                bed_type: Some("King".to_string()),
                amenities: vec!["Free WiFi".to_string()],
                images: vec!["roomImg11.png".to_string()],
                description: None,
            })
            .unwrap();
        (hotel, room)
    }

    fn booking_request(hotel: &Hotel, room: &Room, check_in: &str, check_out: &str) -> NewBooking {
        NewBooking {
            user: "user-0".to_string(),
            room: room.id.clone(),
            hotel: hotel.id.clone(),
            check_in_date: date(check_in),
            check_out_date: date(check_out),
            total_price: 17_000,
            guests: 2,
            payment_method: "Pay At Hotel".to_string(),
            is_paid: false,
        }
    }

    #[test]
    fn room_requires_existing_hotel() {
        let store = MemoryStore::new();
        let err = store
            .add_room(NewRoom {
                hotel: "hotel-404".to_string(),
                room_type: "Double Bed".to_string(),
                price_per_night: "8,500".to_string(),
                capacity: None,
                bed_type: None,
                amenities: vec![],
                images: vec![],
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "hotel", .. }));
    }

    #[test]
    fn booking_rejects_inverted_and_zero_length_ranges() {
        let store = MemoryStore::new();
        let (hotel, room) = seeded_room(&store);

        let err = store
            .create_booking(booking_request(&hotel, &room, "2025-05-02", "2025-05-01"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDates { .. }));

        let err = store
            .create_booking(booking_request(&hotel, &room, "2025-05-01", "2025-05-01"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDates { .. }));
    }

    #[test]
    fn overlapping_booking_is_rejected_at_write_time() {
        let store = MemoryStore::new();
        let (hotel, room) = seeded_room(&store);

        store
            .create_booking(booking_request(&hotel, &room, "2025-04-30", "2025-05-02"))
            .unwrap();

        let err = store
            .create_booking(booking_request(&hotel, &room, "2025-05-01", "2025-05-03"))
            .unwrap_err();
        assert!(matches!(err, StoreError::RoomUnavailable { .. }));
    }

    #[test]
    fn concurrent_bookings_for_the_same_stay_admit_only_one_writer() {
        use std::sync::{Arc, Barrier};

        let store = Arc::new(MemoryStore::new());
        let (hotel, room) = seeded_room(&store);
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                let request = booking_request(&hotel, &room, "2025-04-30", "2025-05-02");
                std::thread::spawn(move || {
                    barrier.wait();
                    store.create_booking(request).is_ok()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();
        assert_eq!(successes, 1);
    }

    #[test]
    fn back_to_back_bookings_are_allowed() {
        let store = MemoryStore::new();
        let (hotel, room) = seeded_room(&store);

        store
            .create_booking(booking_request(&hotel, &room, "2025-04-27", "2025-04-30"))
            .unwrap();
        store
            .create_booking(booking_request(&hotel, &room, "2025-04-30", "2025-05-02"))
            .unwrap();
    }

    #[test]
    fn cancelling_frees_the_room_for_rebooking() {
        let store = MemoryStore::new();
        let (hotel, room) = seeded_room(&store);

        let booking = store
            .create_booking(booking_request(&hotel, &room, "2025-04-30", "2025-05-02"))
            .unwrap();
        store.cancel_booking(&booking.id).unwrap();

        store
            .create_booking(booking_request(&hotel, &room, "2025-04-30", "2025-05-02"))
            .unwrap();
    }

    #[test]
    fn status_transitions() {
        let store = MemoryStore::new();
        let (hotel, room) = seeded_room(&store);

        let booking = store
            .create_booking(booking_request(&hotel, &room, "2025-04-30", "2025-05-02"))
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);

        let confirmed = store.confirm_booking(&booking.id).unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        // Confirming twice is not a valid transition.
        let err = store.confirm_booking(&booking.id).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));

        // Confirmed bookings can still be cancelled, but only once.
        store.cancel_booking(&booking.id).unwrap();
        let err = store.cancel_booking(&booking.id).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyCancelled { .. }));
    }

    #[test]
    fn upsert_user_returns_existing_by_clerk_id() {
        let store = MemoryStore::new();
        let first = store.upsert_user(NewUser {
            clerk_id: "clerk-1".to_string(),
            username: "Hotel Owner".to_string(),
            email: "owner@example.com".to_string(),
            image: None,
            role: Some(UserRole::HotelOwner),
        });
        let second = store.upsert_user(NewUser {
            clerk_id: "clerk-1".to_string(),
            username: "Someone Else".to_string(),
            email: "other@example.com".to_string(),
            image: None,
            role: None,
        });
        assert_eq!(first.id, second.id);
        assert_eq!(second.username, "Hotel Owner");
        assert_eq!(store.user_by_clerk_id("clerk-1").unwrap().id, first.id);
    }

    #[test]
    fn recent_cities_are_deduplicated_and_bounded() {
        let store = MemoryStore::new();
        let user = store.upsert_user(NewUser {
            clerk_id: "clerk-1".to_string(),
            username: "Guest".to_string(),
            email: "guest@example.com".to_string(),
            image: None,
            role: None,
        });

        for city in ["Chennai", "Pondicherry", "chennai", "Madurai", "Coimbatore"] {
            store.record_searched_city(&user.id, city).unwrap();
        }
        let user = store.user_by_clerk_id("clerk-1").unwrap();
        assert_eq!(
            user.recent_searched_cities,
            vec!["Coimbatore", "Madurai", "chennai"]
        );
    }

    #[test]
    fn newsletter_deduplicates_and_validates() {
        let store = MemoryStore::new();
        assert!(store.subscribe_newsletter("Guest@Example.com").unwrap());
        assert!(!store.subscribe_newsletter("guest@example.com ").unwrap());
        assert_eq!(store.newsletter_count(), 1);

        let err = store.subscribe_newsletter("not-an-email").unwrap_err();
        assert!(matches!(err, StoreError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn hotels_by_city_matches_case_insensitive_substrings() {
        let store = MemoryStore::new();
        seeded_room(&store);
        store.add_hotel(NewHotel {
            name: "Heritage Mansion".to_string(),
            address: "White Town".to_string(),
            city: "Pondicherry".to_string(),
            contact: "+91-413-2226789".to_string(),
            owner: "user-0".to_string(),
            description: "Colonial mansion".to_string(),
            main_image: "roomImg11.png".to_string(),
            rating: 4.4,
        });

        assert_eq!(store.hotels_by_city("chennai").await.unwrap().len(), 1);
        assert_eq!(store.hotels_by_city("CHEN").await.unwrap().len(), 1);
        assert_eq!(store.hotels_by_city("pondi").await.unwrap().len(), 1);
        assert!(store.hotels_by_city("Atlantis").await.unwrap().is_empty());
        assert_eq!(store.cities(), vec!["Chennai", "Pondicherry"]);
    }

    #[tokio::test]
    async fn bookings_overlapping_returns_cancelled_too() {
        let store = MemoryStore::new();
        let (hotel, room) = seeded_room(&store);
        let booking = store
            .create_booking(booking_request(&hotel, &room, "2025-04-30", "2025-05-02"))
            .unwrap();
        store.cancel_booking(&booking.id).unwrap();

        // The read interface reports every overlapping booking; filtering
        // cancelled ones is the search core's decision.
        let overlapping = store
            .bookings_overlapping(
                &[room.id.clone()],
                date("2025-04-30"),
                date("2025-05-01"),
            )
            .await
            .unwrap();
        assert_eq!(overlapping.len(), 1);
        assert_eq!(overlapping[0].status, BookingStatus::Cancelled);
    }
}
