use actix_web::web;

use crate::handlers::{images, thumbnails};
use crate::middlewares::auth::AccessGate;

/// Every route here runs behind the access gate.
pub fn config_routes(gate: AccessGate) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope("/images")
                .wrap(gate.clone())
                .service(
                    web::resource("")
                        .route(web::post().to(images::upload_image))
                        .route(web::put().to(images::rename_image))
                        .route(web::delete().to(images::delete_image))
                )
                .service(
                    web::resource("/all")
                        .route(web::delete().to(images::delete_all_images))
                )
                .service(
                    web::resource("/{image_id}")
                        .route(web::get().to(images::get_image))
                )
        );

        cfg.service(
            web::scope("/thumbnails")
                .wrap(gate)
                .service(
                    web::resource("")
                        .route(web::get().to(thumbnails::list_thumbnails))
                )
        );
    }
}
