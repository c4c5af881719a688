use actix_web::web;

use crate::handlers::admin_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/dashboard", web::get().to(admin_handlers::dashboard))
            .route(
                "/bookings/weekly",
                web::get().to(admin_handlers::weekly_bookings),
            )
            .route(
                "/bookings/delete-all",
                web::delete().to(admin_handlers::delete_all_bookings),
            )
            .route(
                "/availability",
                web::get().to(admin_handlers::list_availability),
            )
            .route(
                "/availability/toggle-date",
                web::post().to(admin_handlers::toggle_date),
            )
            .route(
                "/availability/toggle-slot",
                web::post().to(admin_handlers::toggle_slot),
            ),
    );
}
