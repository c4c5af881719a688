use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A customer reservation. `slot_start` is the authoritative appointment
/// time (unix seconds, UTC); `slot_date`/`slot_time`/`slot_display` are
/// derived views kept for querying and receipts. Serialized camelCase,
/// both in MongoDB and on the wire.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub confirmation_number: String,
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_type_id: i32,
    pub slot_start: i64,
    pub slot_date: String,
    pub slot_time: String,
    pub slot_display: String,
    pub service: ServiceSnapshot,
    pub scent: Option<String>,
    pub optional_services: Vec<AddonSnapshot>,
    pub service_location: ServiceLocation,
    pub mobile_address: Option<String>,
    pub total_price: f64,
    /// Portion of the total collected up front; non-zero for mobile jobs.
    pub deposit_due: f64,
    pub status: BookingStatus,
    pub status_history: Vec<StatusHistoryEntry>,
    pub created_at: i64,
}

/// Snapshot of the chosen package at booking time, so later edits to the
/// service catalog never rewrite history.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSnapshot {
    pub service_id: String,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddonSnapshot {
    pub addon_id: i32,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceLocation {
    Shop,
    Mobile,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Transition graph: pending -> confirmed -> in_progress -> completed,
    /// cancel allowed from any non-terminal state.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match (self, next) {
            (Pending, Confirmed) => true,
            (Confirmed, InProgress) => true,
            (InProgress, Completed) => true,
            (Pending | Confirmed | InProgress, Cancelled) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::InProgress => write!(f, "in_progress"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub status: BookingStatus,
    pub timestamp: i64,
    pub note: Option<String>,
}

// ---- wire DTOs -------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_type_id: i32,
    /// "YYYY-MM-DD"
    pub date: String,
    /// "HH:MM", must be one of the business hours
    pub time: String,
    pub service_id: String,
    pub scent: Option<String>,
    #[serde(default)]
    pub optional_service_ids: Vec<i32>,
    pub service_location: ServiceLocation,
    pub mobile_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    pub status: Option<BookingStatus>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCheckResponse {
    pub success: bool,
    pub available: bool,
    pub current_bookings: u64,
    pub max_bookings_per_slot: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlot {
    pub time: String,
    pub available: bool,
    pub current_bookings: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlotsResponse {
    pub success: bool,
    pub date: String,
    pub slots: Vec<DaySlot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::InProgress));
        assert!(BookingStatus::InProgress.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn test_cancel_from_any_active_state() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::InProgress.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_frozen() {
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::InProgress));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let s = serde_json::to_string(&BookingStatus::InProgress).unwrap();
        assert_eq!(s, "\"in_progress\"");
        assert_eq!(BookingStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_booking_serializes_camel_case() {
        let booking = Booking {
            id: None,
            confirmation_number: "BK-20260823-7Q2F".to_string(),
            customer_name: "Dana".to_string(),
            phone: "555-0142".to_string(),
            email: None,
            vehicle_make: "Honda".to_string(),
            vehicle_model: "Civic".to_string(),
            vehicle_type_id: 1,
            slot_start: 1_787_475_600,
            slot_date: "2026-08-23".to_string(),
            slot_time: "09:00".to_string(),
            slot_display: "Sunday, August 23, 2026, 9:00 AM".to_string(),
            service: ServiceSnapshot {
                service_id: "abc".to_string(),
                name: "Full Detail".to_string(),
                price: 80.0,
                description: None,
            },
            scent: None,
            optional_services: vec![AddonSnapshot {
                addon_id: 2,
                name: "Pet hair removal".to_string(),
                price: 20.0,
            }],
            service_location: ServiceLocation::Mobile,
            mobile_address: Some("12 Elm St".to_string()),
            total_price: 190.0,
            deposit_due: 25.0,
            status: BookingStatus::Pending,
            status_history: vec![StatusHistoryEntry {
                status: BookingStatus::Pending,
                timestamp: 0,
                note: None,
            }],
            created_at: 0,
        };
        let json = serde_json::to_value(&booking).unwrap();
        for key in [
            "confirmationNumber",
            "customerName",
            "vehicleTypeId",
            "slotStart",
            "slotDisplay",
            "optionalServices",
            "serviceLocation",
            "mobileAddress",
            "totalPrice",
            "depositDue",
            "statusHistory",
            "createdAt",
        ] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(json["service"]["serviceId"], "abc");
        assert_eq!(json["optionalServices"][0]["addonId"], 2);
    }
}
