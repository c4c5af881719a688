use actix_web::web;

use crate::handlers::catalog_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/config")
            .route("/store", web::get().to(catalog_handlers::get_store_config))
            .route("/store", web::put().to(catalog_handlers::update_store_config))
            .route("/{kind}", web::get().to(catalog_handlers::list_items))
            .route("/{kind}", web::post().to(catalog_handlers::create_item))
            .route(
                "/{kind}/admin/all",
                web::get().to(catalog_handlers::list_all_items),
            )
            .route("/{kind}/{id}", web::put().to(catalog_handlers::update_item))
            .route(
                "/{kind}/{id}",
                web::delete().to(catalog_handlers::delete_item),
            ),
    );
}
