//! Part BOM and cost handlers
//!
//! Tree resolution and cost rollup are synchronous walks over the
//! composition files, so both run on the blocking pool.

use axum::{
    extract::{Path, State},
    response::Json,
};
use partforge_models::{BomNode, CostReport};
use partforge_utils::{validate_ipn, PartforgeError, PartforgeResult};
use std::time::Instant;
use tokio::runtime::Handle;

use crate::middleware::ApiError;
use crate::pricing::HistoryPrices;
use crate::AppState;

/// Resolve the BOM tree of an assembly
///
/// GET /parts/{ipn}/bom
pub async fn get_bom(
    State(state): State<AppState>,
    Path(ipn): Path<String>,
) -> Result<Json<BomNode>, ApiError> {
    let result = resolve(&state, ipn).await;
    state.metrics.record_resolution(&result);
    Ok(Json(result?))
}

async fn resolve(state: &AppState, ipn: String) -> PartforgeResult<BomNode> {
    state.engine.convention().validate_assembly(&ipn)?;

    let engine = state.engine.clone();
    tokio::task::spawn_blocking(move || engine.resolve_bom(&ipn))
        .await
        .map_err(|e| PartforgeError::internal(format!("BOM resolution task failed: {}", e)))?
}

/// Last purchase price of a part, plus the rolled-up cost for assemblies
///
/// GET /parts/{ipn}/cost
pub async fn get_cost(
    State(state): State<AppState>,
    Path(ipn): Path<String>,
) -> Result<Json<CostReport>, ApiError> {
    validate_ipn(&ipn)?;

    let purchase = state
        .price_history
        .latest_purchase(&ipn)
        .await
        .map_err(|e| PartforgeError::database(e.to_string()))?;
    let report = CostReport::new(ipn.clone()).with_purchase(purchase);

    if !state.engine.convention().is_assembly(&ipn) {
        return Ok(Json(report));
    }

    let engine = state.engine.clone();
    let history = state.price_history.clone();
    let handle = Handle::current();
    let started = Instant::now();

    let rolled = tokio::task::spawn_blocking(move || {
        let prices = HistoryPrices::new(handle, history);
        let rolled = engine.rollup_cost_detailed(&ipn, &prices);
        tracing::debug!(ipn = %ipn, lookups = prices.lookups(), "Prices fetched for rollup");
        rolled
    })
    .await
    .map_err(|e| PartforgeError::internal(format!("cost rollup task failed: {}", e)))??;

    state.metrics.observe_rollup(started.elapsed());
    state.metrics.record_truncations(&rolled.truncations);
    Ok(Json(report.with_bom_cost(rolled.cost)))
}
