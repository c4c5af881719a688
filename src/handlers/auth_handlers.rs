use actix_web::{web, HttpResponse};
use log::{info, warn};

use crate::models::{ApiError, LoginRequest, LoginResponse};
use crate::services::{AuthService, MongoDBService};

pub async fn login(
    mongodb: web::Data<MongoDBService>,
    auth: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = mongodb.get_user_by_email(&payload.email).await?;

    // Same error for unknown email and wrong password
    let user = match user {
        Some(user) if auth.verify_password(&payload.password, &user.password_hash) => user,
        _ => {
            warn!("Failed login attempt for {}", payload.email);
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }
    };

    let token = auth.issue_token(&user.email, &user.role)?;
    info!("Admin {} logged in", user.email);
    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        token,
        email: user.email,
        role: user.role,
    }))
}
