use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    Router,
};
use partforge_database::{PostgresPool, PriceHistory};
use partforge_utils::{AppConfig, BomEngine, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod pricing;
pub mod routes;

use metrics::Metrics;
use middleware::*;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BomEngine>,
    pub price_history: Arc<dyn PriceHistory>,
    pub postgres_pool: Option<PostgresPool>,
    pub metrics: Arc<Metrics>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        price_history: Arc<dyn PriceHistory>,
        postgres_pool: Option<PostgresPool>,
    ) -> Result<Self> {
        let engine = BomEngine::from_config(&config.bom)?;
        let metrics = Metrics::new(&config.monitoring.prometheus_namespace)?;

        Ok(Self {
            engine: Arc::new(engine),
            price_history,
            postgres_pool,
            metrics: Arc::new(metrics),
            config,
        })
    }
}

/// Upper bound on handling a single request; slower requests get 408.
pub fn request_timeout(server: &ServerConfig) -> Duration {
    Duration::from_secs(server.timeout_seconds)
}

pub fn create_app(state: AppState) -> Router {
    let mut app = Router::new().merge(routes::create_part_routes());

    app = if state.config.monitoring.metrics_enabled {
        app.merge(routes::create_operational_routes())
    } else {
        app.merge(routes::create_health_routes())
    };

    app
        // Middleware stack
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .layer(DefaultBodyLimit::max(state.config.server.max_request_size))
                .layer(TimeoutLayer::new(request_timeout(&state.config.server)))
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(axum::middleware::from_fn(error_handling_middleware)),
        )
        // Application state
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_timeout_follows_server_config() {
        let mut config = AppConfig::default();
        assert_eq!(request_timeout(&config.server), Duration::from_secs(30));

        config.server.timeout_seconds = 5;
        assert_eq!(request_timeout(&config.server), Duration::from_secs(5));
    }
}
