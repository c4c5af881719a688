use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use chrono::Utc;
use dotenv::dotenv;
use log::{error, info};
use std::env;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod handlers;
mod models;
mod routes;
mod services;
mod utils;

use config::AppConfig;
use models::AdminUser;
use services::{
    AuthService, BookingService, GeocodingService, MongoDBService, NotificationService,
    RateLimiter,
};

const SMS_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Makes sure exactly one active store configuration exists, so pricing
/// and service-area checks have something to work with on first boot.
async fn initialize_store_config(
    mongodb: &MongoDBService,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match mongodb.get_active_store_config().await {
        Ok(Some(existing)) => {
            info!("Active store config found at {}", existing.address);
            Ok(())
        }
        Ok(None) => {
            info!("No store config found, seeding from environment defaults");
            mongodb
                .save_store_config(config.store_defaults.clone())
                .await
                .map_err(|e| format!("Failed to seed store config: {}", e))?;
            Ok(())
        }
        Err(e) => {
            error!("Failed to check for store config: {}", e);
            Err(format!("Failed to check for store config: {}", e).into())
        }
    }
}

/// Creates the bootstrap admin account when ADMIN_EMAIL/ADMIN_PASSWORD are
/// set and the account does not exist yet.
async fn initialize_admin_user(
    mongodb: &MongoDBService,
    auth: &AuthService,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let (email, password) = match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            info!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin bootstrap");
            return Ok(());
        }
    };

    if mongodb.get_user_by_email(email).await?.is_some() {
        info!("Admin user {} already exists", email);
        return Ok(());
    }

    let user = AdminUser {
        id: None,
        email: email.clone(),
        password_hash: auth.hash_password(password)?,
        role: "admin".to_string(),
        created_at: Utc::now().timestamp(),
    };
    mongodb.create_user(user).await?;
    info!("Created bootstrap admin user {}", email);
    Ok(())
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("SERVER_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .expect("SERVER_PORT must be a number");
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(log_level));

    let app_config = AppConfig::load().expect("Failed to load configuration");

    let mongodb = MongoDBService::init()
        .await
        .expect("Failed to initialize MongoDB");
    let mongodb_data = web::Data::new(mongodb);

    let auth_service = web::Data::new(AuthService::new(app_config.jwt_secret.clone()));

    initialize_store_config(mongodb_data.get_ref(), &app_config).await?;
    initialize_admin_user(mongodb_data.get_ref(), auth_service.get_ref(), &app_config).await?;

    let geocoding = GeocodingService::new(&app_config);
    let geocoding_data = web::Data::new(geocoding.clone());

    let notifications = Arc::new(NotificationService::new(
        &app_config,
        RateLimiter::new(SMS_RATE_LIMIT_WINDOW),
    ));

    let booking_service = web::Data::new(BookingService::new(
        Arc::new(mongodb_data.get_ref().clone()),
        Arc::new(geocoding),
        notifications,
    ));

    let cors_origins = app_config.cors_origins.clone();

    info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = if cors_origins.is_empty() {
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600)
        } else {
            let mut cors = Cors::default()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);
            for origin in &cors_origins {
                cors = cors.allowed_origin(origin);
            }
            cors
        };

        App::new()
            .wrap(cors)
            .app_data(mongodb_data.clone())
            .app_data(auth_service.clone())
            .app_data(geocoding_data.clone())
            .app_data(booking_service.clone())
            .configure(routes::configure)
            .route(
                "/health",
                web::get().to(|| async {
                    info!("Health check");
                    HttpResponse::Ok().body("OK")
                }),
            )
    })
    .bind(format!("{host}:{port}"))?
    .run()
    .await?;

    info!("Server shutting down");
    Ok(())
}
