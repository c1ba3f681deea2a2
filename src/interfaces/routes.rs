use actix_web::web;

use crate::handlers::{home::home, json_error::not_found, system::health_check};
use crate::middlewares::auth::AccessGate;

mod auth;
mod images;
mod json_error;

pub fn configure_routes(gate: AccessGate) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(home);
        cfg.service(health_check);

        cfg.service(
            web::scope("/api/v1")
                .configure(auth::config_routes)
                .configure(images::config_routes(gate))
        );

        cfg.configure(json_error::config_routes);
        cfg.default_service(web::to(not_found));
    }
}
