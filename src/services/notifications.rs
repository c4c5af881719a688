use log::{error, info, warn};
use reqwest::Client;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::models::Booking;

const SMS_MAX_ATTEMPTS: u32 = 3;
const SMS_BACKOFF_BASE_MS: u64 = 500;

/// Per-recipient send throttle with TTL eviction. One message per
/// recipient per window; stale entries are dropped on each check.
pub struct RateLimiter {
    window: Duration,
    entries: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, sent_at| now.duration_since(*sent_at) < self.window);
        if entries.contains_key(key) {
            return false;
        }
        entries.insert(key.to_string(), now);
        true
    }
}

/// Outbound email and SMS. Both providers are opaque JSON-over-HTTP APIs.
/// Sends are best-effort: callers spawn them after the booking is
/// persisted, and failures end up in the log, never on the wire.
pub struct NotificationService {
    client: Client,
    mail_base_url: String,
    mail_api_key: String,
    mail_from: String,
    sms_base_url: String,
    sms_api_key: String,
    sms_from: String,
    sms_limiter: RateLimiter,
}

impl NotificationService {
    pub fn new(config: &AppConfig, sms_limiter: RateLimiter) -> Self {
        Self {
            client: Client::new(),
            mail_base_url: config.mail_base_url.clone(),
            mail_api_key: config.mail_api_key.clone(),
            mail_from: config.mail_from.clone(),
            sms_base_url: config.sms_base_url.clone(),
            sms_api_key: config.sms_api_key.clone(),
            sms_from: config.sms_from.clone(),
            sms_limiter,
        }
    }

    pub async fn send_booking_confirmation(&self, booking: &Booking) {
        if let Some(email) = &booking.email {
            if let Err(e) = self.send_email(email, booking).await {
                error!(
                    "Failed to send confirmation email for {}: {}",
                    booking.confirmation_number, e
                );
            }
        }
        if let Err(e) = self.send_sms(&booking.phone, booking).await {
            error!(
                "Failed to send confirmation SMS for {}: {}",
                booking.confirmation_number, e
            );
        }
    }

    pub async fn send_email(&self, to: &str, booking: &Booking) -> Result<(), String> {
        if self.mail_api_key.is_empty() {
            return Err("Mail API key not configured".to_string());
        }
        let url = format!("{}/emails", self.mail_base_url);
        let body = json!({
            "from": self.mail_from,
            "to": to,
            "subject": format!("Booking confirmed: {}", booking.confirmation_number),
            "text": confirmation_text(booking),
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.mail_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Email request failed: {}", e))?;

        if response.status().is_success() {
            info!(
                "Confirmation email sent to {} for {}",
                to, booking.confirmation_number
            );
            Ok(())
        } else {
            Err(format!("Email API returned HTTP {}", response.status()))
        }
    }

    /// SMS delivery with exponential backoff. Rate-limited per recipient
    /// so a retry storm cannot spam one phone number.
    pub async fn send_sms(&self, to: &str, booking: &Booking) -> Result<(), String> {
        if self.sms_base_url.is_empty() {
            return Err("SMS API not configured".to_string());
        }
        if !self.sms_limiter.allow(to) {
            warn!("SMS to {} suppressed by rate limiter", to);
            return Ok(());
        }

        let url = format!("{}/messages", self.sms_base_url);
        let body = json!({
            "from": self.sms_from,
            "to": to,
            "body": format!(
                "Your detailing appointment is booked for {}. Confirmation: {}",
                booking.slot_display, booking.confirmation_number
            ),
        });

        let mut last_error = String::new();
        for attempt in 0..SMS_MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = Duration::from_millis(SMS_BACKOFF_BASE_MS * (1 << attempt));
                tokio::time::sleep(delay).await;
            }
            match self
                .client
                .post(&url)
                .bearer_auth(&self.sms_api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    info!(
                        "Confirmation SMS sent to {} for {}",
                        to, booking.confirmation_number
                    );
                    return Ok(());
                }
                Ok(response) => {
                    last_error = format!("SMS API returned HTTP {}", response.status());
                    warn!("SMS attempt {} failed: {}", attempt + 1, last_error);
                }
                Err(e) => {
                    last_error = format!("SMS request failed: {}", e);
                    warn!("SMS attempt {} failed: {}", attempt + 1, last_error);
                }
            }
        }
        Err(last_error)
    }
}

fn confirmation_text(booking: &Booking) -> String {
    let mut text = format!(
        "Hi {},\n\nYour appointment is confirmed.\n\nConfirmation: {}\nWhen: {}\nService: {} (${:.2})\n",
        booking.customer_name,
        booking.confirmation_number,
        booking.slot_display,
        booking.service.name,
        booking.service.price,
    );
    for addon in &booking.optional_services {
        text.push_str(&format!("Add-on: {} (${:.2})\n", addon.name, addon.price));
    }
    if let Some(address) = &booking.mobile_address {
        text.push_str(&format!("We come to you at: {}\n", address));
    }
    text.push_str(&format!("\nTotal: ${:.2}\n", booking.total_price));
    if booking.deposit_due > 0.0 {
        text.push_str(&format!("Deposit due now: ${:.2}\n", booking.deposit_due));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_blocks_within_window() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.allow_at("555-0100", now));
        assert!(!limiter.allow_at("555-0100", now + Duration::from_secs(30)));
        // Different recipient is unaffected
        assert!(limiter.allow_at("555-0199", now));
    }

    #[test]
    fn test_rate_limiter_evicts_after_ttl() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.allow_at("555-0100", now));
        assert!(limiter.allow_at("555-0100", now + Duration::from_secs(61)));
    }

    use crate::models::{BookingStatus, ServiceLocation, ServiceSnapshot};

    fn sample_booking() -> Booking {
        Booking {
            id: None,
            confirmation_number: "BK-20260823-7Q2F".to_string(),
            customer_name: "Dana".to_string(),
            phone: "555-0142".to_string(),
            email: None,
            vehicle_make: "Honda".to_string(),
            vehicle_model: "Civic".to_string(),
            vehicle_type_id: 1,
            slot_start: 0,
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
            optional_services: vec![],
            service_location: ServiceLocation::Shop,
            mobile_address: None,
            total_price: 80.0,
            deposit_due: 0.0,
            status: BookingStatus::Pending,
            status_history: vec![],
            created_at: 0,
        }
    }

    #[test]
    fn test_confirmation_text_includes_total() {
        let text = confirmation_text(&sample_booking());
        assert!(text.contains("BK-20260823-7Q2F"));
        assert!(text.contains("Total: $80.00"));
        assert!(!text.contains("Deposit"));
    }

    #[test]
    fn test_confirmation_text_shows_mobile_deposit() {
        let mut booking = sample_booking();
        booking.service_location = ServiceLocation::Mobile;
        booking.mobile_address = Some("12 Elm St".to_string());
        booking.total_price = 130.0;
        booking.deposit_due = 25.0;
        let text = confirmation_text(&booking);
        assert!(text.contains("We come to you at: 12 Elm St"));
        assert!(text.contains("Deposit due now: $25.00"));
    }
}
