use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A detailing package. Prices vary by vehicle type, keyed by the numeric
/// vehicle type id rendered as a string (bson maps require string keys).
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub category: ServiceCategory,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub prices: HashMap<String, f64>,
    pub active: bool,
    pub sort_order: i32,
}

impl Service {
    pub fn price_for_vehicle(&self, vehicle_type_id: i32) -> Option<f64> {
        self.prices.get(&vehicle_type_id.to_string()).copied()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    DriveIn,
    Appointment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub name: String,
    pub category: ServiceCategory,
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub prices: HashMap<String, f64>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub category: Option<ServiceCategory>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub prices: Option<HashMap<String, f64>>,
    pub active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_lookup_by_vehicle_type() {
        let mut prices = HashMap::new();
        prices.insert("1".to_string(), 80.0);
        prices.insert("2".to_string(), 100.0);
        let svc = Service {
            id: None,
            name: "Full Detail".to_string(),
            category: ServiceCategory::Appointment,
            description: None,
            features: vec![],
            prices,
            active: true,
            sort_order: 0,
        };
        assert_eq!(svc.price_for_vehicle(1), Some(80.0));
        assert_eq!(svc.price_for_vehicle(2), Some(100.0));
        assert_eq!(svc.price_for_vehicle(9), None);
    }
}
