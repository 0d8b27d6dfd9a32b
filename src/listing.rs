// Parameterized room listing: the one query component behind every
// list/filter endpoint. Recognized filter and sort options are enumerated
// here; there are deliberately no per-route variants.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Hotel, HotelSummary, Room};
use crate::price;
use crate::search::{rank, paginate, RoomWithHotel, SortBy};
use crate::store::{InventoryStore, StoreError};

pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomQuery {
    /// Case-insensitive substring match on the hotel's city.
    pub city: Option<String>,
    /// Exact match on the room-type label.
    pub room_type: Option<String>,
    /// Whole-unit bounds compared against the parsed nightly rate.
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    /// Every listed amenity must be present on the room.
    pub amenities: Vec<String>,
    pub sort: Option<SortBy>,
    pub page: usize,
    pub limit: usize,
}

impl Default for RoomQuery {
    fn default() -> Self {
        Self {
            city: None,
            room_type: None,
            min_price: None,
            max_price: None,
            amenities: vec![],
            sort: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPage {
    pub results: Vec<RoomWithHotel>,
    pub total: usize,
    pub page: usize,
    pub pages: usize,
}

pub struct RoomListing {
    store: Arc<dyn InventoryStore>,
}

impl RoomListing {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, query: &RoomQuery) -> Result<RoomPage, StoreError> {
        // A blank city is no filter, not a match-everything pattern.
        let city = query
            .city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty());
        let (rooms, hotels) = self.candidates(city).await?;
        let by_id: HashMap<&String, &Hotel> = hotels.iter().map(|h| (&h.id, h)).collect();

        let mut matching: Vec<(Room, Hotel)> = rooms
            .into_iter()
            .filter(|room| matches_filters(room, query))
            .filter_map(|room| by_id.get(&room.hotel).map(|hotel| (room, (*hotel).clone())))
            .collect();
        debug!(total = matching.len(), "room listing filtered");

        if let Some(sort) = query.sort {
            rank(&mut matching, sort);
        }

        let total = matching.len();
        let limit = query.limit.max(1);
        let page = query.page.max(1);
        let pages = total.div_ceil(limit);
        let results = paginate(matching, Some(page), Some(limit))
            .into_iter()
            .map(|(room, hotel)| RoomWithHotel {
                room,
                hotel: HotelSummary::from(&hotel),
            })
            .collect();

        Ok(RoomPage {
            results,
            total,
            page,
            pages,
        })
    }

    /// Candidate rooms plus the hotels needed to shape the results. With a
    /// city filter the hotels drive the room lookup; without one, every
    /// room's hotel is fetched for the summary.
    async fn candidates(
        &self,
        city: Option<&str>,
    ) -> Result<(Vec<Room>, Vec<Hotel>), StoreError> {
        match city {
            Some(city) => {
                let hotels = self.store.hotels_by_city(city).await?;
                let hotel_ids: Vec<String> = hotels.iter().map(|h| h.id.clone()).collect();
                let rooms = self.store.rooms_by_hotel_ids(&hotel_ids).await?;
                Ok((rooms, hotels))
            }
            None => {
                let rooms = self.store.all_rooms().await?;
                let mut hotels = Vec::new();
                let mut seen = std::collections::HashSet::new();
                for room in &rooms {
                    if seen.insert(room.hotel.clone()) {
                        if let Some(hotel) = self.store.hotel_by_id(&room.hotel).await? {
                            hotels.push(hotel);
                        }
                    }
                }
                Ok((rooms, hotels))
            }
        }
    }
}

fn matches_filters(room: &Room, query: &RoomQuery) -> bool {
    if let Some(room_type) = &query.room_type {
        if &room.room_type != room_type {
            return false;
        }
    }
    if !price::within(&room.price_per_night, query.min_price, query.max_price) {
        return false;
    }
    query
        .amenities
        .iter()
        .all(|wanted| room.amenities.iter().any(|a| a == wanted))
}
