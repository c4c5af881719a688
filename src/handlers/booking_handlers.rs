use actix_web::{web, HttpResponse};
use log::info;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::models::{
    ApiError, BookingListQuery, CreateBookingRequest, DateQuery, SlotQuery, UpdateStatusRequest,
};
use crate::services::{AdminClaims, BookingService, GeocodingService, MongoDBService};
use crate::utils::receipt::booking_receipt_pdf;

#[derive(Debug, Deserialize)]
pub struct ValidateAddressRequest {
    pub address: String,
}

fn parse_booking_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::Validation("Invalid booking id".to_string()))
}

pub async fn create_booking(
    booking_service: web::Data<BookingService>,
    payload: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Creating booking for {}", payload.customer_name);
    let booking = booking_service.create_booking(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "booking": booking,
    })))
}

pub async fn list_bookings(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    query: web::Query<BookingListQuery>,
) -> Result<HttpResponse, ApiError> {
    let bookings = mongodb
        .list_bookings(query.status, query.date.as_deref())
        .await?;
    info!("Retrieved {} bookings", bookings.len());
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "bookings": bookings,
    })))
}

pub async fn get_booking(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let oid = parse_booking_id(&id)?;
    let booking = mongodb
        .get_booking(&oid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "booking": booking,
    })))
}

pub async fn update_booking_status(
    _admin: AdminClaims,
    booking_service: web::Data<BookingService>,
    id: web::Path<String>,
    payload: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    let oid = parse_booking_id(&id)?;
    let booking = booking_service
        .update_status(&oid, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "booking": booking,
    })))
}

pub async fn booking_pdf(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let oid = parse_booking_id(&id)?;
    let booking = mongodb
        .get_booking(&oid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;
    let bytes = booking_receipt_pdf(&booking).map_err(ApiError::Internal)?;
    info!("Rendered receipt PDF for {}", booking.confirmation_number);
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!(
                "attachment; filename=\"{}.pdf\"",
                booking.confirmation_number
            ),
        ))
        .body(bytes))
}

pub async fn resend_email(
    _admin: AdminClaims,
    booking_service: web::Data<BookingService>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let oid = parse_booking_id(&id)?;
    booking_service.resend_confirmation_email(&oid).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub async fn check_slot(
    booking_service: web::Data<BookingService>,
    query: web::Query<SlotQuery>,
) -> Result<HttpResponse, ApiError> {
    let response = booking_service.check_slot(&query.date, &query.time).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn check_date_slots(
    booking_service: web::Data<BookingService>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, ApiError> {
    let response = booking_service.day_slots(&query.date).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn validate_address(
    booking_service: web::Data<BookingService>,
    geocoding: web::Data<GeocodingService>,
    payload: web::Json<ValidateAddressRequest>,
) -> Result<HttpResponse, ApiError> {
    if payload.address.trim().is_empty() {
        return Err(ApiError::Validation("Address cannot be empty".to_string()));
    }
    let store = booking_service.active_store().await?;
    let validation = geocoding.validate_address(&payload.address, &store).await;
    Ok(HttpResponse::Ok().json(validation))
}
