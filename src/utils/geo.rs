use serde::Serialize;

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Great-circle distance in miles between two WGS84 coordinates.
pub fn haversine_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AddressClassification {
    Valid,
    OutsideServiceArea,
    Invalid,
}

/// An address is serviceable when it geocodes and lies within the radius.
pub fn classify_distance(distance_miles: f64, radius_miles: f64) -> AddressClassification {
    if distance_miles <= radius_miles {
        AddressClassification::Valid
    } else {
        AddressClassification::OutsideServiceArea
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let d = haversine_miles(40.7128, -74.0060, 40.7128, -74.0060);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_known_city_pair() {
        // NYC to Philadelphia, roughly 80.5 miles
        let d = haversine_miles(40.7128, -74.0060, 39.9526, -75.1652);
        assert!((d - 80.5).abs() < 2.0, "got {}", d);
    }

    #[test]
    fn test_one_degree_latitude() {
        // One degree of latitude is about 69 miles everywhere
        let d = haversine_miles(30.0, -90.0, 31.0, -90.0);
        assert!((d - 69.0).abs() < 0.5, "got {}", d);
    }

    #[test]
    fn test_classification_boundary() {
        assert_eq!(classify_distance(39.9, 40.0), AddressClassification::Valid);
        assert_eq!(classify_distance(40.0, 40.0), AddressClassification::Valid);
        assert_eq!(
            classify_distance(40.1, 40.0),
            AddressClassification::OutsideServiceArea
        );
    }
}
