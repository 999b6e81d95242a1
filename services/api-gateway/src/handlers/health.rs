use axum::{extract::State, response::Json};
use partforge_database::postgres_health_check;
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "partforge-api-gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn detailed_health_check(State(state): State<AppState>) -> Json<Value> {
    let mut health_status = json!({
        "status": "healthy",
        "service": "partforge-api-gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    // Check PostgreSQL
    let postgres_status = match &state.postgres_pool {
        Some(pool) => match postgres_health_check(pool).await {
            Ok(_) => json!({"status": "healthy", "message": "Connected"}),
            Err(e) => json!({"status": "unhealthy", "message": e.to_string()}),
        },
        None => json!({"status": "unhealthy", "message": "Not configured"}),
    };
    health_status["checks"]["postgres"] = postgres_status;

    // Check composition and catalog roots
    let bom = &state.config.bom;
    let files_status = if bom.composition_root.is_dir() && bom.parts_root.is_dir() {
        json!({"status": "healthy", "message": "Readable"})
    } else {
        json!({"status": "unhealthy", "message": "Composition or parts directory missing"})
    };
    health_status["checks"]["bom_files"] = files_status;
    health_status["checks"]["price_history"] =
        json!({"status": "healthy", "message": state.price_history.name()});

    // Determine overall status
    let all_healthy = health_status["checks"]
        .as_object()
        .map(|checks| checks.values().all(|check| check["status"] == "healthy"))
        .unwrap_or(false);

    if !all_healthy {
        health_status["status"] = json!("degraded");
    }

    Json(health_status)
}

pub async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.render()
}
