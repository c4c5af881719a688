use crate::models::{AddonSnapshot, ServiceLocation};

/// Authoritative booking total: base service price for the vehicle type,
/// plus chosen add-ons, plus the mobile upcharge when staff travel out.
/// Client-sent totals are never trusted.
pub fn booking_total(
    service_price: f64,
    addons: &[AddonSnapshot],
    location: ServiceLocation,
    mobile_upcharge: f64,
) -> f64 {
    let addon_sum: f64 = addons.iter().map(|a| a.price).sum();
    let upcharge = match location {
        ServiceLocation::Mobile => mobile_upcharge,
        ServiceLocation::Shop => 0.0,
    };
    service_price + addon_sum + upcharge
}

/// Up-front deposit owed at booking time. Only mobile jobs carry one;
/// shop visits pay in full on site.
pub fn deposit_due(location: ServiceLocation, mobile_deposit: f64) -> f64 {
    match location {
        ServiceLocation::Mobile => mobile_deposit,
        ServiceLocation::Shop => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addon(id: i32, price: f64) -> AddonSnapshot {
        AddonSnapshot {
            addon_id: id,
            name: format!("Addon {}", id),
            price,
        }
    }

    #[test]
    fn test_base_plus_addons() {
        let total = booking_total(
            80.0,
            &[addon(1, 20.0), addon(2, 40.0)],
            ServiceLocation::Shop,
            50.0,
        );
        assert!((total - 140.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mobile_adds_upcharge() {
        let total = booking_total(
            80.0,
            &[addon(1, 20.0), addon(2, 40.0)],
            ServiceLocation::Mobile,
            50.0,
        );
        assert!((total - 190.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_addons() {
        let total = booking_total(120.0, &[], ServiceLocation::Shop, 50.0);
        assert!((total - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deposit_only_for_mobile() {
        assert!((deposit_due(ServiceLocation::Mobile, 25.0) - 25.0).abs() < f64::EPSILON);
        assert_eq!(deposit_due(ServiceLocation::Shop, 25.0), 0.0);
    }
}
