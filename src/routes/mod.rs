mod admin_routes;
mod auth_routes;
mod booking_routes;
mod config_routes;
mod service_routes;

pub use admin_routes::configure as configure_admin_routes;
pub use auth_routes::configure as configure_auth_routes;
pub use booking_routes::configure as configure_booking_routes;
pub use config_routes::configure as configure_config_routes;
pub use service_routes::configure as configure_service_routes;

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(
        actix_web::web::scope("/api")
            .configure(configure_booking_routes)
            .configure(configure_service_routes)
            .configure(configure_config_routes)
            .configure(configure_admin_routes)
            .configure(configure_auth_routes),
    );
}
