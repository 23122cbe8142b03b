//! API endpoint modules.

pub mod accounts;
pub mod analysis;
pub mod defects;
pub mod export;
pub mod health;
pub mod images;
pub mod openapi;
pub mod websocket;
pub mod zone_responses;
pub mod zones;

use actix_web::web;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use websocket::configure_routes as configure_websocket_routes;

/// Register every `/api/v1` route except health and websocket.
///
/// `/defects/export` is registered ahead of `/defects/{id}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(accounts::configure_routes)
        .configure(zones::configure_routes)
        .configure(images::configure_routes)
        .configure(export::configure_routes)
        .configure(zone_responses::configure_routes)
        .configure(analysis::configure_routes)
        .configure(defects::configure_routes);
}
