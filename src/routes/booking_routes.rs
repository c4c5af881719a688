use actix_web::web;

use crate::handlers::booking_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::post().to(booking_handlers::create_booking))
            .route("", web::get().to(booking_handlers::list_bookings))
            .route("/check-slot", web::get().to(booking_handlers::check_slot))
            .route(
                "/check-date-slots",
                web::get().to(booking_handlers::check_date_slots),
            )
            .route(
                "/validate-address",
                web::post().to(booking_handlers::validate_address),
            )
            .route("/{id}", web::get().to(booking_handlers::get_booking))
            .route(
                "/{id}/status",
                web::put().to(booking_handlers::update_booking_status),
            )
            .route("/{id}/pdf", web::get().to(booking_handlers::booking_pdf))
            .route(
                "/{id}/resend-email",
                web::post().to(booking_handlers::resend_email),
            ),
    );
}
