use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::warn;
use std::future::{ready, Ready};

use crate::models::{ApiError, Claims};

const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                warn!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }

    pub fn issue_token(&self, email: &str, role: &str) -> Result<String, ApiError> {
        let claims = Claims {
            sub: email.to_string(),
            role: role.to_string(),
            exp: (Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Token encoding failed: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
    }
}

/// Extractor guarding admin routes: requires a valid bearer token with the
/// admin role. Handlers take it as a parameter and never see raw headers.
#[derive(Debug, Clone)]
pub struct AdminClaims(pub Claims);

fn extract_admin(req: &HttpRequest) -> Result<AdminClaims, ApiError> {
    let auth = req
        .app_data::<web::Data<AuthService>>()
        .ok_or_else(|| ApiError::Internal("AuthService not configured".to_string()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = auth.verify_token(token)?;
    if claims.role != "admin" {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }
    Ok(AdminClaims(claims))
}

impl FromRequest for AdminClaims {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_admin(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let auth = AuthService::new("test-secret".to_string());
        let hash = auth.hash_password("hunter2").unwrap();
        assert!(auth.verify_password("hunter2", &hash));
        assert!(!auth.verify_password("hunter3", &hash));
    }

    #[test]
    fn test_token_round_trip() {
        let auth = AuthService::new("test-secret".to_string());
        let token = auth.issue_token("admin@example.com", "admin").unwrap();
        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "admin@example.com");
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let auth = AuthService::new("secret-a".to_string());
        let other = AuthService::new("secret-b".to_string());
        let token = auth.issue_token("admin@example.com", "admin").unwrap();
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        let auth = AuthService::new("test-secret".to_string());
        assert!(!auth.verify_password("hunter2", "not-a-phc-string"));
    }
}
