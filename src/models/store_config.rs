use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Singleton business configuration. Exactly one record has `active: true`;
/// saving a new one deactivates the rest (enforced in the storage layer).
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub service_radius_miles: f64,
    pub mobile_upcharge: f64,
    pub mobile_deposit: f64,
    /// Offset of the store's local business hours from UTC, in hours.
    pub utc_offset_hours: i32,
    pub active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreConfigRequest {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub service_radius_miles: f64,
    pub mobile_upcharge: f64,
    pub mobile_deposit: f64,
    pub utc_offset_hours: i32,
}

impl From<UpdateStoreConfigRequest> for StoreConfig {
    fn from(req: UpdateStoreConfigRequest) -> Self {
        StoreConfig {
            id: None,
            address: req.address,
            latitude: req.latitude,
            longitude: req.longitude,
            service_radius_miles: req.service_radius_miles,
            mobile_upcharge: req.mobile_upcharge,
            mobile_deposit: req.mobile_deposit,
            utc_offset_hours: req.utc_offset_hours,
            active: true,
        }
    }
}
