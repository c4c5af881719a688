use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One row of an admin-editable lookup table (vehicle types, scents,
/// optional add-on services). All three collections share this shape;
/// only optional services carry a price.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub oid: Option<ObjectId>,
    pub id: i32,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub active: bool,
    pub sort_order: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogItemRequest {
    pub label: String,
    pub price: Option<f64>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCatalogItemRequest {
    pub label: Option<String>,
    pub price: Option<f64>,
    pub active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Which lookup table a request addresses. Used to pick the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    VehicleTypes,
    Scents,
    OptionalServices,
}

impl CatalogKind {
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "vehicle-types" => Some(CatalogKind::VehicleTypes),
            "scents" => Some(CatalogKind::Scents),
            "optional-services" => Some(CatalogKind::OptionalServices),
            _ => None,
        }
    }

    pub fn collection_name(self) -> &'static str {
        match self {
            CatalogKind::VehicleTypes => "vehicle_types",
            CatalogKind::Scents => "scents",
            CatalogKind::OptionalServices => "optional_services",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            CatalogKind::from_path("vehicle-types"),
            Some(CatalogKind::VehicleTypes)
        );
        assert_eq!(CatalogKind::from_path("scents"), Some(CatalogKind::Scents));
        assert_eq!(
            CatalogKind::from_path("optional-services"),
            Some(CatalogKind::OptionalServices)
        );
        assert_eq!(CatalogKind::from_path("bogus"), None);
    }
}
