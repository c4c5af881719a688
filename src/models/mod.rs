pub mod availability;
pub mod booking;
pub mod catalog;
pub mod error;
pub mod service;
pub mod store_config;
pub mod user;

pub use availability::{
    any_blocks, AvailabilityOverride, AvailabilityRangeQuery, Recurrence, SlotReservation,
    ToggleDateRequest, ToggleSlotRequest,
};
pub use booking::{
    AddonSnapshot, Booking, BookingListQuery, BookingStatus, CreateBookingRequest, DateQuery,
    DaySlot, DaySlotsResponse, ServiceLocation, ServiceSnapshot, SlotCheckResponse, SlotQuery,
    StatusHistoryEntry, UpdateStatusRequest,
};
pub use catalog::{CatalogItem, CatalogKind, CreateCatalogItemRequest, UpdateCatalogItemRequest};
pub use error::{ApiError, ErrorResponse};
pub use service::{CreateServiceRequest, Service, ServiceCategory, UpdateServiceRequest};
pub use store_config::{StoreConfig, UpdateStoreConfigRequest};
pub use user::{AdminUser, Claims, LoginRequest, LoginResponse};
