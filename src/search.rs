// Availability search: destination + stay interval + party size in, free
// rooms with their hotel summaries out. Read-only and side-effect free;
// the write-time overlap check lives with booking creation in the store.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{Hotel, HotelSummary, Room};
use crate::price;
use crate::store::{InventoryStore, StoreError};

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    PriceLowToHigh,
    PriceHighToLow,
    Rating,
    NewestFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub destination: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub sort: Option<SortBy>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl SearchCriteria {
    pub fn new(destination: &str, check_in: NaiveDate, check_out: NaiveDate, guests: u32) -> Self {
        Self {
            destination: destination.to_string(),
            check_in,
            check_out,
            guests,
            sort: None,
            page: None,
            limit: None,
        }
    }

    pub fn sorted_by(mut self, sort: SortBy) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn paged(mut self, page: usize, limit: usize) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomWithHotel {
    pub room: Room,
    pub hotel: HotelSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub results: Vec<RoomWithHotel>,
    /// Qualifying rooms before pagination.
    pub total_results: usize,
    /// Set when the destination itself had no hotels and the configured
    /// nearby-city fallback produced these results instead.
    pub fallback_message: Option<String>,
    pub search_parameters: SearchCriteria,
}

impl SearchOutcome {
    fn empty(criteria: &SearchCriteria) -> Self {
        Self {
            results: vec![],
            total_results: 0,
            fallback_message: None,
            search_parameters: criteria.clone(),
        }
    }
}

pub struct AvailabilitySearch {
    store: Arc<dyn InventoryStore>,
    fallback_cities: Vec<String>,
}

impl AvailabilitySearch {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            store,
            fallback_cities: vec![],
        }
    }

    /// Enable the "did you mean" fallback: when the destination matches no
    /// hotels, broaden the search to this fixed allowlist of nearby cities.
    pub fn with_fallback_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_cities = cities.into_iter().map(Into::into).collect();
        self
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> Result<SearchOutcome, SearchError> {
        validate(criteria)?;
        debug!(
            destination = %criteria.destination,
            check_in = %criteria.check_in,
            check_out = %criteria.check_out,
            guests = criteria.guests,
            "search request received"
        );

        let mut fallback_message = None;
        let mut hotels = self.store.hotels_by_city(&criteria.destination).await?;
        if hotels.is_empty() && !self.fallback_cities.is_empty() {
            hotels = self.fallback_hotels().await?;
            if !hotels.is_empty() {
                info!(
                    destination = %criteria.destination,
                    hotels = hotels.len(),
                    "no hotels in destination, using nearby-city fallback"
                );
                fallback_message = Some(format!(
                    "No properties found for \"{}\". Showing nearby destinations instead.",
                    criteria.destination
                ));
            }
        }
        if hotels.is_empty() {
            // A valid no-inventory outcome, distinct from a failed query.
            debug!(destination = %criteria.destination, "no hotels in destination");
            return Ok(SearchOutcome::empty(criteria));
        }

        let hotel_ids: Vec<String> = hotels.iter().map(|h| h.id.clone()).collect();
        let rooms = self.store.rooms_by_hotel_ids(&hotel_ids).await?;
        debug!(hotels = hotels.len(), rooms = rooms.len(), "candidate inventory resolved");
        if rooms.is_empty() {
            return Ok(SearchOutcome {
                fallback_message,
                ..SearchOutcome::empty(criteria)
            });
        }

        let room_ids: Vec<String> = rooms.iter().map(|r| r.id.clone()).collect();
        let overlapping = self
            .store
            .bookings_overlapping(&room_ids, criteria.check_in, criteria.check_out)
            .await?;
        // Cancelled bookings never hold a room; filter them here rather
        // than trusting the collaborator to.
        let booked_room_ids: HashSet<&String> = overlapping
            .iter()
            .filter(|b| b.blocks_room())
            .map(|b| &b.room)
            .collect();

        let by_id: HashMap<&String, &Hotel> = hotels.iter().map(|h| (&h.id, h)).collect();
        let mut qualifying: Vec<(Room, Hotel)> = rooms
            .into_iter()
            .filter(|room| !booked_room_ids.contains(&room.id) && room.fits(criteria.guests))
            .filter_map(|room| by_id.get(&room.hotel).map(|hotel| (room, (*hotel).clone())))
            .collect();
        debug!(qualifying = qualifying.len(), "rooms free and capacity-sufficient");

        if let Some(sort) = criteria.sort {
            rank(&mut qualifying, sort);
        }
        let total_results = qualifying.len();
        let results = paginate(qualifying, criteria.page, criteria.limit)
            .into_iter()
            .map(|(room, hotel)| RoomWithHotel {
                room,
                hotel: HotelSummary::from(&hotel),
            })
            .collect();

        Ok(SearchOutcome {
            results,
            total_results,
            fallback_message,
            search_parameters: criteria.clone(),
        })
    }

    async fn fallback_hotels(&self) -> Result<Vec<Hotel>, SearchError> {
        let mut seen = HashSet::new();
        let mut hotels = Vec::new();
        for city in &self.fallback_cities {
            for hotel in self.store.hotels_by_city(city).await? {
                if seen.insert(hotel.id.clone()) {
                    hotels.push(hotel);
                }
            }
        }
        Ok(hotels)
    }
}

fn validate(criteria: &SearchCriteria) -> Result<(), SearchError> {
    if criteria.destination.trim().is_empty() {
        return Err(SearchError::Validation {
            field: "destination",
            reason: "destination is required".to_string(),
        });
    }
    if criteria.check_in >= criteria.check_out {
        return Err(SearchError::Validation {
            field: "checkIn",
            reason: format!(
                "check-in {} must be before check-out {}",
                criteria.check_in, criteria.check_out
            ),
        });
    }
    if criteria.guests == 0 {
        return Err(SearchError::Validation {
            field: "guests",
            reason: "guests must be a positive integer".to_string(),
        });
    }
    Ok(())
}

/// Stable sort of (room, hotel) pairs; ties always break by room id so
/// repeated searches rank identically.
pub(crate) fn rank(pairs: &mut [(Room, Hotel)], sort: SortBy) {
    let price_key = |room: &Room| price::parse(&room.price_per_night).unwrap_or(0);
    match sort {
        SortBy::PriceLowToHigh => pairs.sort_by(|a, b| {
            price_key(&a.0)
                .cmp(&price_key(&b.0))
                .then_with(|| a.0.id.cmp(&b.0.id))
        }),
        SortBy::PriceHighToLow => pairs.sort_by(|a, b| {
            price_key(&b.0)
                .cmp(&price_key(&a.0))
                .then_with(|| a.0.id.cmp(&b.0.id))
        }),
        SortBy::Rating => pairs.sort_by(|a, b| {
            b.1.rating
                .partial_cmp(&a.1.rating)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        }),
        SortBy::NewestFirst => pairs.sort_by(|a, b| {
            b.0.created_at
                .cmp(&a.0.created_at)
                .then_with(|| a.0.id.cmp(&b.0.id))
        }),
    }
}

/// Bound result size. Pages are 1-based; without a limit everything is
/// returned.
pub(crate) fn paginate<T>(items: Vec<T>, page: Option<usize>, limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(limit) => {
            let page = page.unwrap_or(1).max(1);
            items
                .into_iter()
                .skip((page - 1).saturating_mul(limit))
                .take(limit)
                .collect()
        }
        None => items,
    }
}
