use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

fn default_role() -> String {
    "admin".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminUser {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password_hash: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub email: String,
    pub role: String,
}

/// JWT payload. `exp` is unix seconds.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
}
