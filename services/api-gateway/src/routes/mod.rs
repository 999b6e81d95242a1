use axum::{routing::get, Router};

use crate::{handlers::*, AppState};

pub fn create_part_routes() -> Router<AppState> {
    Router::new()
        .route("/parts/:ipn/bom", get(get_bom))
        .route("/parts/:ipn/cost", get(get_cost))
}

pub fn create_health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
}

pub fn create_operational_routes() -> Router<AppState> {
    create_health_routes().route("/metrics", get(metrics_handler))
}
