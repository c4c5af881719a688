use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::models::Booking;

/// Renders a one-page booking receipt. Built-in Helvetica only, so no
/// font assets ship with the binary.
pub fn booking_receipt_pdf(booking: &Booking) -> Result<Vec<u8>, String> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Booking {}", booking.confirmation_number),
        Mm(210.0),
        Mm(297.0),
        "receipt",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| format!("Font error: {}", e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| format!("Font error: {}", e))?;

    let mut lines = vec![
        format!("Confirmation: {}", booking.confirmation_number),
        format!("Customer: {}", booking.customer_name),
        format!("Phone: {}", booking.phone),
    ];
    if let Some(email) = &booking.email {
        lines.push(format!("Email: {}", email));
    }
    lines.push(format!(
        "Vehicle: {} {}",
        booking.vehicle_make, booking.vehicle_model
    ));
    lines.push(format!("Appointment: {}", booking.slot_display));
    lines.push(format!("Service: {}", booking.service.name));
    if let Some(scent) = &booking.scent {
        lines.push(format!("Scent: {}", scent));
    }
    for addon in &booking.optional_services {
        lines.push(format!("Add-on: {} (${:.2})", addon.name, addon.price));
    }
    if let Some(address) = &booking.mobile_address {
        lines.push(format!("Mobile service at: {}", address));
    }
    if booking.deposit_due > 0.0 {
        lines.push(format!("Deposit due: ${:.2}", booking.deposit_due));
    }
    lines.push(format!("Status: {}", booking.status));

    let layer = doc.get_page(page).get_layer(layer);
    let mut y = 277.0;

    layer.use_text("Booking Confirmation", 18.0, Mm(20.0), Mm(y), &bold);
    y -= 16.0;

    for text in lines {
        layer.use_text(text, 11.0, Mm(20.0), Mm(y), &font);
        y -= 8.0;
    }

    y -= 8.0;
    layer.use_text(
        format!("Total: ${:.2}", booking.total_price),
        14.0,
        Mm(20.0),
        Mm(y),
        &bold,
    );

    doc.save_to_bytes().map_err(|e| format!("PDF error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, ServiceLocation, ServiceSnapshot};

    fn sample_booking() -> Booking {
        Booking {
            id: None,
            confirmation_number: "BK-20260823-7Q2F".to_string(),
            customer_name: "Dana Reyes".to_string(),
            phone: "555-0142".to_string(),
            email: Some("dana@example.com".to_string()),
            vehicle_make: "Honda".to_string(),
            vehicle_model: "Civic".to_string(),
            vehicle_type_id: 1,
            slot_start: 1_787_475_600,
            slot_date: "2026-08-23".to_string(),
            slot_time: "09:00".to_string(),
            slot_display: "Sunday, August 23, 2026, 9:00 AM".to_string(),
            service: ServiceSnapshot {
                service_id: "abc".to_string(),
                name: "Full Detail".to_string(),
                price: 80.0,
                description: None,
            },
            scent: Some("Cedar".to_string()),
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
    fn test_produces_pdf_bytes() {
        let bytes = booking_receipt_pdf(&sample_booking()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }
}
