mod auth;
mod booking_service;
mod geocoding;
mod mongodb;
mod notifications;

pub use auth::{AdminClaims, AuthService};
pub use booking_service::{BookingService, DashboardResponse, WeeklyBookingsResponse};
pub use geocoding::{AddressValidation, GeocodingService};
pub use mongodb::MongoDBService;
pub use notifications::{NotificationService, RateLimiter};
