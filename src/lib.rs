// Hotel-booking backend core: availability search, room listing, price
// normalization, and the storage collaborator they run against.

pub mod listing;
pub mod model;
pub mod price;
pub mod search;
pub mod seed;
pub mod store;

// Re-export key types for convenience
pub use listing::{RoomListing, RoomPage, RoomQuery, DEFAULT_PAGE_SIZE};
pub use model::{Booking, BookingStatus, Hotel, HotelSummary, Room, User, UserRole};
pub use search::{
    AvailabilitySearch, RoomWithHotel, SearchCriteria, SearchError, SearchOutcome, SortBy,
};
pub use store::{
    InventoryStore, MemoryStore, NewBooking, NewHotel, NewRoom, NewUser, StoreError,
};
