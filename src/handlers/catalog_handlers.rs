use actix_web::{web, HttpResponse};
use log::info;
use serde_json::json;

use crate::models::{
    ApiError, CatalogKind, CreateCatalogItemRequest, StoreConfig, UpdateCatalogItemRequest,
    UpdateStoreConfigRequest,
};
use crate::services::{AdminClaims, MongoDBService};

fn parse_kind(segment: &str) -> Result<CatalogKind, ApiError> {
    CatalogKind::from_path(segment)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown config collection '{}'", segment)))
}

pub async fn list_items(
    mongodb: web::Data<MongoDBService>,
    kind: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let items = mongodb.list_catalog(kind, true).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "items": items,
    })))
}

pub async fn list_all_items(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    kind: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let items = mongodb.list_catalog(kind, false).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "items": items,
    })))
}

pub async fn create_item(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    kind: web::Path<String>,
    payload: web::Json<CreateCatalogItemRequest>,
) -> Result<HttpResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let req = payload.into_inner();
    if req.label.trim().is_empty() {
        return Err(ApiError::Validation("Label cannot be empty".to_string()));
    }
    let item = mongodb
        .create_catalog_item(kind, req.label, req.price, req.sort_order)
        .await?;
    info!("Created {} item {}", kind.collection_name(), item.id);
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "item": item,
    })))
}

pub async fn update_item(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    path: web::Path<(String, i32)>,
    payload: web::Json<UpdateCatalogItemRequest>,
) -> Result<HttpResponse, ApiError> {
    let (kind, id) = path.into_inner();
    let kind = parse_kind(&kind)?;
    if !mongodb
        .update_catalog_item(kind, id, payload.into_inner())
        .await?
    {
        return Err(ApiError::NotFound("Item not found".to_string()));
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub async fn delete_item(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    path: web::Path<(String, i32)>,
) -> Result<HttpResponse, ApiError> {
    let (kind, id) = path.into_inner();
    let kind = parse_kind(&kind)?;
    if !mongodb.deactivate_catalog_item(kind, id).await? {
        return Err(ApiError::NotFound("Item not found".to_string()));
    }
    info!("Deactivated {} item {}", kind.collection_name(), id);
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub async fn get_store_config(
    mongodb: web::Data<MongoDBService>,
) -> Result<HttpResponse, ApiError> {
    let config = mongodb
        .get_active_store_config()
        .await?
        .ok_or_else(|| ApiError::NotFound("Store is not configured".to_string()))?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "config": config,
    })))
}

pub async fn update_store_config(
    _admin: AdminClaims,
    mongodb: web::Data<MongoDBService>,
    payload: web::Json<UpdateStoreConfigRequest>,
) -> Result<HttpResponse, ApiError> {
    let config: StoreConfig = payload.into_inner().into();
    if config.service_radius_miles <= 0.0 {
        return Err(ApiError::Validation(
            "Service radius must be positive".to_string(),
        ));
    }
    let saved = mongodb.save_store_config(config).await?;
    info!("Store configuration replaced");
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "config": saved,
    })))
}
