use actix_web::{web, HttpResponse};
use log::{info, warn};
use serde_json::json;

use crate::models::{
    ApiError, AvailabilityOverride, AvailabilityRangeQuery, ToggleDateRequest, ToggleSlotRequest,
};
use crate::services::{AdminClaims, BookingService, MongoDBService};
use crate::utils::slots;

pub async fn dashboard(
    _admin: AdminClaims,
    booking_service: web::Data<BookingService>,
) -> Result<HttpResponse, ApiError> {
    let stats = booking_service.dashboard().await?;
    Ok(HttpResponse::Ok().json(stats))
}

pub async fn weekly_bookings(
    _admin: AdminClaims,
    booking_service: web::Data<BookingService>,
) -> Result<HttpResponse, ApiError> {
    let week = booking_service.weekly().await?;
    Ok(HttpResponse::Ok().json(week))
}

pub async fn delete_all_bookings(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let deleted = mongodb.delete_all_bookings().await?;
    warn!("Admin deleted all bookings ({} removed)", deleted);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "deleted": deleted,
    })))
}

pub async fn list_availability(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    query: web::Query<AvailabilityRangeQuery>,
) -> Result<HttpResponse, ApiError> {
    let records = mongodb
        .list_availability(query.from.as_deref(), query.to.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "availability": records,
    })))
}

/// Flips the whole-day block for a date. Toggling twice restores the
/// original state; a record that no longer constrains anything is removed.
/// A block can carry weekly recurrence, which repeats it on the same
/// weekday from that date on; unblocking clears the recurrence.
pub async fn toggle_date(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    payload: web::Json<ToggleDateRequest>,
) -> Result<HttpResponse, ApiError> {
    slots::parse_date(&payload.date).map_err(ApiError::Validation)?;

    let mut record = mongodb
        .get_availability(&payload.date)
        .await?
        .unwrap_or_else(|| AvailabilityOverride::blank(&payload.date));
    record.all_day_blocked = !record.all_day_blocked;
    if record.all_day_blocked {
        if payload.recurrence.is_some() {
            record.recurrence = payload.recurrence;
        }
    } else {
        record.recurrence = None;
    }

    if record.is_blank() {
        mongodb.delete_availability(&payload.date).await?;
    } else {
        mongodb.upsert_availability(&record).await?;
    }
    info!(
        "Date {} is now {}",
        payload.date,
        if record.all_day_blocked { "blocked" } else { "open" }
    );
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "date": payload.date,
        "allDayBlocked": record.all_day_blocked,
        "recurrence": record.recurrence,
    })))
}

/// Flips a single time slot block for a date, same toggle semantics.
pub async fn toggle_slot(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    payload: web::Json<ToggleSlotRequest>,
) -> Result<HttpResponse, ApiError> {
    slots::parse_date(&payload.date).map_err(ApiError::Validation)?;
    if !slots::is_business_hour(&payload.time) {
        return Err(ApiError::Validation(format!(
            "{} is not a business hour",
            payload.time
        )));
    }

    let mut record = mongodb
        .get_availability(&payload.date)
        .await?
        .unwrap_or_else(|| AvailabilityOverride::blank(&payload.date));

    let blocked = if let Some(pos) = record.blocked_times.iter().position(|t| t == &payload.time) {
        record.blocked_times.remove(pos);
        false
    } else {
        record.blocked_times.push(payload.time.clone());
        true
    };

    if record.is_blank() {
        mongodb.delete_availability(&payload.date).await?;
    } else {
        mongodb.upsert_availability(&record).await?;
    }
    info!(
        "Slot {} {} is now {}",
        payload.date,
        payload.time,
        if blocked { "blocked" } else { "open" }
    );
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "date": payload.date,
        "time": payload.time,
        "blocked": blocked,
    })))
}
