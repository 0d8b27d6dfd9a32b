// Demo inventory for tests, benchmarks and local development: Tamil Nadu
// hotels with rooms across the capacity range.

use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::UserRole;
use crate::store::{MemoryStore, NewHotel, NewRoom, NewUser, StoreError};

pub const SEED_CITIES: [&str; 2] = ["Chennai", "Pondicherry"];

const COMMON_AMENITIES: [&str; 18] = [
    "Air Conditioning",
    "Free WiFi",
    "Room Service",
    "Free Breakfast",
    "Swimming Pool",
    "Flat-screen TV",
    "Private Bathroom",
    "Bathtub",
    "Mountain View",
    "Ocean View",
    "City View",
    "Mini Bar",
    "Coffee Maker",
    "Work Desk",
    "In-room Safe",
    "Balcony",
    "King Size Bed",
    "Queen Size Bed",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub hotels: usize,
    pub rooms: usize,
}

fn random_amenities(count: usize) -> Vec<String> {
    let mut rng = thread_rng();
    COMMON_AMENITIES
        .choose_multiple(&mut rng, count)
        .map(|a| a.to_string())
        .collect()
}

/// Populate the store with the demo inventory: an owner user, hotels in
/// Chennai and Pondicherry, and rooms covering single, double and family
/// capacities.
pub fn seed_demo_inventory(store: &MemoryStore) -> Result<SeedSummary, StoreError> {
    let owner = store.upsert_user(NewUser {
        clerk_id: "test_user_for_hotels".to_string(),
        username: "Hotel Owner".to_string(),
        email: "hotelowner@example.com".to_string(),
        image: None,
        role: Some(UserRole::HotelOwner),
    });

    let hotels = [
        (
            "Sea Breeze Villa",
            "ECR Road, Kovalam, Chennai, Tamil Nadu 603112",
            "Chennai",
            "+91-44-27452345",
            4.8,
        ),
        (
            "Marina Bay Resort",
            "Marina Beach Road, Chennai, Tamil Nadu 600001",
            "Chennai",
            "+91-44-28561234",
            4.6,
        ),
        (
            "Ascott Palace",
            "Nungambakkam, Chennai, Tamil Nadu 600034",
            "Chennai",
            "+91-44-26159876",
            4.7,
        ),
        (
            "The Grand Banyan",
            "OMR Road, Chennai, Tamil Nadu 600097",
            "Chennai",
            "+91-44-24567890",
            4.5,
        ),
        (
            "Heritage Mansion",
            "White Town, Pondicherry 605001",
            "Pondicherry",
            "+91-413-2226789",
            4.4,
        ),
        (
            "Promenade Pearl",
            "Beach Road, Pondicherry 605001",
            "Pondicherry",
            "+91-413-2334455",
            4.3,
        ),
    ];

    let room_plans: [(&str, &str, Option<u32>, Option<&str>); 3] = [
        ("Single Room", "5,500", Some(1), Some("Single")),
        ("Deluxe Double", "8,500", Some(2), Some("King")),
        ("Family Suite", "15,000", Some(4), Some("King + 2 Twin Beds")),
    ];

    let mut hotel_count = 0;
    let mut room_count = 0;
    for (name, address, city, contact, rating) in hotels {
        let hotel = store.add_hotel(NewHotel {
            name: name.to_string(),
            address: address.to_string(),
            city: city.to_string(),
            contact: contact.to_string(),
            owner: owner.id.clone(),
            description: format!("{} in {}", name, city),
            main_image: "roomImg11.png".to_string(),
            rating,
        });
        hotel_count += 1;

        for (room_type, price, capacity, bed_type) in room_plans {
            store.add_room(NewRoom {
                hotel: hotel.id.clone(),
                room_type: room_type.to_string(),
                price_per_night: price.to_string(),
                capacity,
                bed_type: bed_type.map(str::to_string),
                amenities: random_amenities(5),
                images: vec!["roomImg11.png".to_string()],
                description: Some(format!("{} at {}", room_type, name)),
            })?;
            room_count += 1;
        }
    }

    info!(hotels = hotel_count, rooms = room_count, "demo inventory seeded");
    Ok(SeedSummary {
        hotels: hotel_count,
        rooms: room_count,
    })
}

/// Synthetic inventory at a chosen scale, used by the search benchmark.
pub fn seed_synthetic_inventory(
    store: &MemoryStore,
    hotels_per_city: usize,
    rooms_per_hotel: usize,
) -> Result<SeedSummary, StoreError> {
    let owner = store.upsert_user(NewUser {
        clerk_id: "synthetic_owner".to_string(),
        username: "Synthetic Owner".to_string(),
        email: "synthetic@example.com".to_string(),
        image: None,
        role: Some(UserRole::HotelOwner),
    });

    let mut hotel_count = 0;
    let mut room_count = 0;
    for city in SEED_CITIES {
        for h in 0..hotels_per_city {
            let hotel = store.add_hotel(NewHotel {
                name: format!("{} Hotel {}", city, h),
                address: format!("{} Street {}", city, h),
                city: city.to_string(),
                contact: "+91-00-00000000".to_string(),
                owner: owner.id.clone(),
                description: String::new(),
                main_image: "roomImg11.png".to_string(),
                rating: 3.5 + (h % 3) as f32 * 0.5,
            });
            hotel_count += 1;

            for r in 0..rooms_per_hotel {
                let room_type = match r % 3 {
                    0 => "Single Room",
                    1 => "Double Bed",
                    _ => "Family Suite",
                };
                store.add_room(NewRoom {
                    hotel: hotel.id.clone(),
                    room_type: room_type.to_string(),
                    price_per_night: crate::price::format(4_000 + (r as u64) * 500),
                    capacity: None,
                    bed_type: None,
                    amenities: random_amenities(3),
                    images: vec![],
                    description: None,
                })?;
                room_count += 1;
            }
        }
    }

    Ok(SeedSummary {
        hotels: hotel_count,
        rooms: room_count,
    })
}
