use actix_web::web;

use crate::handlers::service_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .route("", web::get().to(service_handlers::list_services))
            .route("", web::post().to(service_handlers::create_service))
            .route("/admin/all", web::get().to(service_handlers::list_all_services))
            .route("/{id}", web::put().to(service_handlers::update_service))
            .route("/{id}", web::delete().to(service_handlers::delete_service)),
    );
}
