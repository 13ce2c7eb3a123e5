//! HTTP surface of the relay.
//!
//! - `/` and `/status`        landing page and health
//! - `/oauth/...`             HighLevel and Podium OAuth flows
//! - `/test-contact`          manual contact upsert
//! - `/webhook/{podium,ghl}`  the two relay directions

pub mod routes;

use crate::SharedState;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::relay_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
