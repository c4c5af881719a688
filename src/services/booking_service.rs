use chrono::Utc;
use log::{error, info};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{
    any_blocks, AddonSnapshot, ApiError, AvailabilityOverride, Booking, BookingStatus,
    CatalogKind, CreateBookingRequest, DaySlot, DaySlotsResponse, ServiceLocation,
    ServiceSnapshot, SlotCheckResponse, StatusHistoryEntry, StoreConfig, UpdateStatusRequest,
};
use crate::services::{GeocodingService, MongoDBService, NotificationService};
use crate::utils::confirmation::generate_confirmation_number;
use crate::utils::pricing::{booking_total, deposit_due};
use crate::utils::slots;

const CONFIRMATION_ATTEMPTS: u32 = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub success: bool,
    pub total_bookings: u64,
    pub pending: u64,
    pub confirmed: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub today_bookings: u64,
    pub completed_revenue: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBookingsResponse {
    pub success: bool,
    pub days: Vec<DayBookings>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBookings {
    pub date: String,
    pub bookings: Vec<Booking>,
}

pub struct BookingService {
    mongodb: Arc<MongoDBService>,
    geocoding: Arc<GeocodingService>,
    notifications: Arc<NotificationService>,
}

impl BookingService {
    pub fn new(
        mongodb: Arc<MongoDBService>,
        geocoding: Arc<GeocodingService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            mongodb,
            geocoding,
            notifications,
        }
    }

    pub async fn active_store(&self) -> Result<StoreConfig, ApiError> {
        self.mongodb
            .get_active_store_config()
            .await?
            .ok_or_else(|| ApiError::Internal("No active store configuration".to_string()))
    }

    async fn slot_capacity(&self, date: &str) -> Result<u32, ApiError> {
        Ok(self
            .mongodb
            .get_availability(date)
            .await?
            .and_then(|a| a.max_bookings_per_slot)
            .unwrap_or(slots::DEFAULT_MAX_BOOKINGS_PER_SLOT))
    }

    /// Every availability record governing a date: the exact-date record
    /// plus any weekly-recurring record anchored on the same weekday.
    async fn availability_records(
        &self,
        date: &str,
    ) -> Result<Vec<AvailabilityOverride>, ApiError> {
        let day = slots::parse_date(date).map_err(ApiError::Validation)?;
        let mut records = Vec::new();
        if let Some(exact) = self.mongodb.get_availability(date).await? {
            records.push(exact);
        }
        for record in self.mongodb.list_recurring_availability().await? {
            if record.date != date && record.applies_on(day) {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Full booking pipeline: validate catalog references, recompute the
    /// total server-side, take the slot atomically, persist, then hand the
    /// confirmations to a background task.
    pub async fn create_booking(&self, req: CreateBookingRequest) -> Result<Booking, ApiError> {
        if req.customer_name.trim().is_empty() {
            return Err(ApiError::Validation("Customer name cannot be empty".to_string()));
        }
        if req.phone.trim().is_empty() {
            return Err(ApiError::Validation("Phone number cannot be empty".to_string()));
        }
        if !slots::is_business_hour(&req.time) {
            return Err(ApiError::Validation(format!(
                "{} is not an available appointment time",
                req.time
            )));
        }

        let store = self.active_store().await?;
        let slot_start = slots::slot_start_epoch(&req.date, &req.time, store.utc_offset_hours)
            .map_err(ApiError::Validation)?;
        let now = Utc::now().timestamp();
        if slot_start <= now {
            return Err(ApiError::Validation(
                "Appointment time must be in the future".to_string(),
            ));
        }

        let availability = self.availability_records(&req.date).await?;
        if any_blocks(&availability, &req.time) {
            return Err(ApiError::Validation(
                "Selected time is not available on that date".to_string(),
            ));
        }

        let service_oid = ObjectId::parse_str(&req.service_id)
            .map_err(|_| ApiError::Validation("Invalid service id".to_string()))?;
        let service = self
            .mongodb
            .get_service(&service_oid)
            .await?
            .filter(|s| s.active)
            .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))?;

        let vehicle_type = self
            .mongodb
            .get_catalog_item(CatalogKind::VehicleTypes, req.vehicle_type_id)
            .await?
            .filter(|v| v.active)
            .ok_or_else(|| ApiError::Validation("Unknown vehicle type".to_string()))?;

        let service_price = service.price_for_vehicle(vehicle_type.id).ok_or_else(|| {
            ApiError::Validation(format!(
                "Service '{}' has no price for vehicle type '{}'",
                service.name, vehicle_type.label
            ))
        })?;

        if let Some(scent) = &req.scent {
            let scents = self.mongodb.list_catalog(CatalogKind::Scents, true).await?;
            if !scents.iter().any(|s| &s.label == scent) {
                return Err(ApiError::Validation(format!("Unknown scent '{}'", scent)));
            }
        }

        let addons = if req.optional_service_ids.is_empty() {
            Vec::new()
        } else {
            let items = self
                .mongodb
                .get_catalog_items(CatalogKind::OptionalServices, &req.optional_service_ids)
                .await?;
            if items.len() != req.optional_service_ids.len() || items.iter().any(|i| !i.active) {
                return Err(ApiError::Validation(
                    "One or more optional services are unavailable".to_string(),
                ));
            }
            items
                .into_iter()
                .map(|i| AddonSnapshot {
                    addon_id: i.id,
                    name: i.label,
                    price: i.price.unwrap_or(0.0),
                })
                .collect()
        };

        let mobile_address = match req.service_location {
            ServiceLocation::Shop => None,
            ServiceLocation::Mobile => {
                let address = req
                    .mobile_address
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .ok_or_else(|| {
                        ApiError::Validation(
                            "Mobile service requires an address".to_string(),
                        )
                    })?;
                let validation = self.geocoding.validate_address(address, &store).await;
                if !validation.valid {
                    return Err(ApiError::Validation(
                        "Address is outside our service area or could not be verified"
                            .to_string(),
                    ));
                }
                Some(address.to_string())
            }
        };

        let total_price = booking_total(
            service_price,
            &addons,
            req.service_location,
            store.mobile_upcharge,
        );

        let capacity = self.slot_capacity(&req.date).await?;
        if !self.mongodb.reserve_slot(slot_start, capacity).await? {
            return Err(ApiError::SlotUnavailable);
        }

        // The slot is held from here on; give it back on any failure path.
        match self
            .persist_booking(req, &store, slot_start, service, service_price, addons,
                mobile_address, total_price, now)
            .await
        {
            Ok(booking) => {
                let notifications = Arc::clone(&self.notifications);
                let spawned = booking.clone();
                tokio::spawn(async move {
                    notifications.send_booking_confirmation(&spawned).await;
                });
                Ok(booking)
            }
            Err(e) => {
                if let Err(release_err) = self.mongodb.release_slot(slot_start).await {
                    error!("Failed to release slot after insert error: {}", release_err);
                }
                Err(e)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn persist_booking(
        &self,
        req: CreateBookingRequest,
        store: &StoreConfig,
        slot_start: i64,
        service: crate::models::Service,
        service_price: f64,
        addons: Vec<AddonSnapshot>,
        mobile_address: Option<String>,
        total_price: f64,
        now: i64,
    ) -> Result<Booking, ApiError> {
        let (slot_date, slot_time) = slots::slot_date_time(slot_start, store.utc_offset_hours)
            .map_err(ApiError::Internal)?;
        let slot_display = slots::slot_display(slot_start, store.utc_offset_hours)
            .map_err(ApiError::Internal)?;
        let date = slots::parse_date(&slot_date).map_err(ApiError::Internal)?;

        let mut last_err = ApiError::Internal("Confirmation number generation failed".to_string());
        for _ in 0..CONFIRMATION_ATTEMPTS {
            let booking = Booking {
                id: None,
                confirmation_number: generate_confirmation_number(date),
                customer_name: req.customer_name.trim().to_string(),
                phone: req.phone.trim().to_string(),
                email: req.email.clone().filter(|e| !e.trim().is_empty()),
                vehicle_make: req.vehicle_make.clone(),
                vehicle_model: req.vehicle_model.clone(),
                vehicle_type_id: req.vehicle_type_id,
                slot_start,
                slot_date: slot_date.clone(),
                slot_time: slot_time.clone(),
                slot_display: slot_display.clone(),
                service: ServiceSnapshot {
                    service_id: service.id.map(|o| o.to_hex()).unwrap_or_default(),
                    name: service.name.clone(),
                    price: service_price,
                    description: service.description.clone(),
                },
                scent: req.scent.clone(),
                optional_services: addons.clone(),
                service_location: req.service_location,
                mobile_address: mobile_address.clone(),
                total_price,
                deposit_due: deposit_due(req.service_location, store.mobile_deposit),
                status: BookingStatus::Pending,
                status_history: vec![StatusHistoryEntry {
                    status: BookingStatus::Pending,
                    timestamp: now,
                    note: None,
                }],
                created_at: now,
            };
            match self.mongodb.insert_booking(booking).await {
                Ok(created) => {
                    info!(
                        "Created booking {} for {} at {}",
                        created.confirmation_number, created.customer_name, created.slot_display
                    );
                    return Ok(created);
                }
                // Collision on the unique index: regenerate and retry
                Err(ApiError::Duplicate(msg)) => last_err = ApiError::Duplicate(msg),
                Err(e) => return Err(e),
            }
        }
        Err(last_err)
    }

    /// Guarded status transition. The storage update only matches while
    /// the booking still holds the status read here, so concurrent
    /// requests append exactly one history entry between them and the
    /// slot counter is released at most once per cancellation.
    pub async fn update_status(
        &self,
        id: &ObjectId,
        req: UpdateStatusRequest,
    ) -> Result<Booking, ApiError> {
        let booking = self
            .mongodb
            .get_booking(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

        if !booking.status.can_transition_to(req.status) {
            return Err(ApiError::Validation(format!(
                "Cannot change status from {} to {}",
                booking.status, req.status
            )));
        }

        let updated = self
            .mongodb
            .update_booking_status(id, booking.status, req.status, req.note, Utc::now().timestamp())
            .await?
            .ok_or_else(|| {
                ApiError::Duplicate("Booking status changed, reload and retry".to_string())
            })?;

        // Only the request whose guarded update matched gives the slot back
        if req.status == BookingStatus::Cancelled {
            self.mongodb.release_slot(booking.slot_start).await?;
        }

        info!(
            "Booking {} moved from {} to {}",
            updated.confirmation_number, booking.status, updated.status
        );
        Ok(updated)
    }

    pub async fn check_slot(&self, date: &str, time: &str) -> Result<SlotCheckResponse, ApiError> {
        if !slots::is_business_hour(time) {
            return Err(ApiError::Validation(format!(
                "{} is not a business hour",
                time
            )));
        }
        let store = self.active_store().await?;
        let slot_start = slots::slot_start_epoch(date, time, store.utc_offset_hours)
            .map_err(ApiError::Validation)?;

        let capacity = self.slot_capacity(date).await?;
        let blocked = any_blocks(&self.availability_records(date).await?, time);
        let current = self.mongodb.count_active_bookings_at(slot_start).await?;

        Ok(SlotCheckResponse {
            success: true,
            available: !blocked && current < capacity as u64,
            current_bookings: current,
            max_bookings_per_slot: capacity,
        })
    }

    /// Occupancy for every business hour of one date. Rejects unparseable
    /// dates outright rather than returning an empty slot map.
    pub async fn day_slots(&self, date: &str) -> Result<DaySlotsResponse, ApiError> {
        slots::parse_date(date).map_err(ApiError::Validation)?;
        let store = self.active_store().await?;
        let capacity = self.slot_capacity(date).await?;
        let availability = self.availability_records(date).await?;

        let mut day_slots = Vec::with_capacity(slots::BUSINESS_HOURS.len());
        for time in slots::BUSINESS_HOURS {
            let slot_start = slots::slot_start_epoch(date, time, store.utc_offset_hours)
                .map_err(ApiError::Internal)?;
            let blocked = any_blocks(&availability, time);
            let current = self.mongodb.count_active_bookings_at(slot_start).await?;
            day_slots.push(DaySlot {
                time: time.to_string(),
                available: !blocked && current < capacity as u64,
                current_bookings: current,
            });
        }

        Ok(DaySlotsResponse {
            success: true,
            date: date.to_string(),
            slots: day_slots,
        })
    }

    pub async fn resend_confirmation_email(&self, id: &ObjectId) -> Result<(), ApiError> {
        let booking = self
            .mongodb
            .get_booking(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;
        let email = booking
            .email
            .clone()
            .ok_or_else(|| ApiError::Validation("Booking has no email address".to_string()))?;
        self.notifications
            .send_email(&email, &booking)
            .await
            .map_err(ApiError::Internal)
    }

    pub async fn dashboard(&self) -> Result<DashboardResponse, ApiError> {
        let pending = self
            .mongodb
            .count_bookings_with_status(BookingStatus::Pending)
            .await?;
        let confirmed = self
            .mongodb
            .count_bookings_with_status(BookingStatus::Confirmed)
            .await?;
        let in_progress = self
            .mongodb
            .count_bookings_with_status(BookingStatus::InProgress)
            .await?;
        let completed = self
            .mongodb
            .count_bookings_with_status(BookingStatus::Completed)
            .await?;
        let cancelled = self
            .mongodb
            .count_bookings_with_status(BookingStatus::Cancelled)
            .await?;

        let store = self.active_store().await?;
        let today = slots::slot_date_time(Utc::now().timestamp(), store.utc_offset_hours)
            .map_err(ApiError::Internal)?
            .0;
        let today_bookings = self
            .mongodb
            .list_bookings(None, Some(&today))
            .await?
            .iter()
            .filter(|b| b.status != BookingStatus::Cancelled)
            .count() as u64;

        let completed_revenue: f64 = self
            .mongodb
            .list_bookings(Some(BookingStatus::Completed), None)
            .await?
            .iter()
            .map(|b| b.total_price)
            .sum();

        Ok(DashboardResponse {
            success: true,
            total_bookings: pending + confirmed + in_progress + completed + cancelled,
            pending,
            confirmed,
            in_progress,
            completed,
            cancelled,
            today_bookings,
            completed_revenue,
        })
    }

    /// The coming seven days of appointments, grouped by store-local date.
    pub async fn weekly(&self) -> Result<WeeklyBookingsResponse, ApiError> {
        let store = self.active_store().await?;
        let now = Utc::now().timestamp();
        let today = slots::slot_date_time(now, store.utc_offset_hours)
            .map_err(ApiError::Internal)?
            .0;
        let window_start = slots::slot_start_epoch(&today, "09:00", store.utc_offset_hours)
            .map_err(ApiError::Internal)?
            - 9 * 3600;
        let window_end = window_start + 7 * 24 * 3600;

        let bookings = self.mongodb.bookings_between(window_start, window_end).await?;
        let mut grouped: BTreeMap<String, Vec<Booking>> = BTreeMap::new();
        for booking in bookings {
            grouped
                .entry(booking.slot_date.clone())
                .or_default()
                .push(booking);
        }

        Ok(WeeklyBookingsResponse {
            success: true,
            days: grouped
                .into_iter()
                .map(|(date, bookings)| DayBookings { date, bookings })
                .collect(),
        })
    }
}
