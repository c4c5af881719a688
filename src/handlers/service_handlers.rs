use actix_web::{web, HttpResponse};
use log::info;
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::models::{ApiError, CreateServiceRequest, Service, UpdateServiceRequest};
use crate::services::{AdminClaims, MongoDBService};

fn parse_service_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::Validation("Invalid service id".to_string()))
}

/// Customer-facing list: active packages only, in display order.
pub async fn list_services(
    mongodb: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let services = mongodb.list_services(true).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "services": services,
    })))
}

pub async fn list_all_services(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let services = mongodb.list_services(false).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "services": services,
    })))
}

pub async fn create_service(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    payload: web::Json<CreateServiceRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = payload.into_inner();
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Service name cannot be empty".to_string()));
    }
    if req.prices.is_empty() {
        return Err(ApiError::Validation(
            "Service needs at least one vehicle type price".to_string(),
        ));
    }
    let service = Service {
        id: None,
        name: req.name,
        category: req.category,
        description: req.description,
        features: req.features,
        prices: req.prices,
        active: true,
        sort_order: req.sort_order,
    };
    let id = mongodb.create_service(service).await?;
    info!("Created service {}", id);
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "id": id,
    })))
}

pub async fn update_service(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    id: web::Path<String>,
    payload: web::Json<UpdateServiceRequest>,
) -> Result<HttpResponse, ApiError> {
    let oid = parse_service_id(&id)?;
    if !mongodb.update_service(&oid, payload.into_inner()).await? {
        return Err(ApiError::NotFound("Service not found".to_string()));
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// Soft delete so historical bookings keep a resolvable reference.
pub async fn delete_service(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let oid = parse_service_id(&id)?;
    if !mongodb.deactivate_service(&oid).await? {
        return Err(ApiError::NotFound("Service not found".to_string()));
    }
    info!("Deactivated service {}", id);
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
