use log::{error, info};
use std::env;

use crate::models::StoreConfig;

/// Environment-driven application configuration, loaded once at boot.
#[derive(Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    pub geocoding_base_url: String,
    pub geocoding_api_key: String,
    pub mail_base_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    pub sms_base_url: String,
    pub sms_api_key: String,
    pub sms_from: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub store_defaults: StoreConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set")?;

        let mail_api_key = env::var("MAIL_API_KEY").unwrap_or_else(|e| {
            error!("MAIL_API_KEY not found in environment: {}", e);
            String::new()
        });
        let sms_api_key = env::var("SMS_API_KEY").unwrap_or_else(|e| {
            error!("SMS_API_KEY not found in environment: {}", e);
            String::new()
        });

        let store_defaults = StoreConfig {
            id: None,
            address: env::var("STORE_ADDRESS")
                .unwrap_or_else(|_| "1 Detail Way, Springfield".to_string()),
            latitude: env_f64("STORE_LATITUDE", 39.7817),
            longitude: env_f64("STORE_LONGITUDE", -89.6501),
            service_radius_miles: env_f64("SERVICE_RADIUS_MILES", 40.0),
            mobile_upcharge: env_f64("MOBILE_UPCHARGE", 50.0),
            mobile_deposit: env_f64("MOBILE_DEPOSIT", 25.0),
            utc_offset_hours: env_i32("STORE_UTC_OFFSET_HOURS", -6),
            active: true,
        };

        let config = AppConfig {
            jwt_secret,
            cors_origins: parse_origins(&env::var("CORS_ORIGINS").unwrap_or_default()),
            geocoding_base_url: env::var("GEOCODING_API_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            geocoding_api_key: env::var("GEOCODING_API_KEY").unwrap_or_default(),
            mail_base_url: env::var("MAIL_API_URL")
                .unwrap_or_else(|_| "https://api.resend.com".to_string()),
            mail_api_key,
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "bookings@example.com".to_string()),
            sms_base_url: env::var("SMS_API_URL").unwrap_or_default(),
            sms_api_key,
            sms_from: env::var("SMS_FROM").unwrap_or_default(),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            store_defaults,
        };

        info!(
            "Store configured at ({}, {}) with {} mile service radius",
            config.store_defaults.latitude,
            config.store_defaults.longitude,
            config.store_defaults.service_radius_miles
        );

        Ok(config)
    }
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}

fn env_i32(name: &str, default: i32) -> i32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<i32>().ok())
        .unwrap_or(default)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:3000, https://example.com"),
            vec!["http://localhost:3000", "https://example.com"]
        );
        assert!(parse_origins("").is_empty());
        assert!(parse_origins(" , ").is_empty());
    }

    #[test]
    fn test_env_f64_default() {
        assert_eq!(env_f64("DEFINITELY_NOT_SET_XYZ", 40.0), 40.0);
    }
}
