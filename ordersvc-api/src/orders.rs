use axum::{
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use ordersvc_shared::TraceContext;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PlaceOrderParams {
    pub error: Option<String>,
}

impl PlaceOrderParams {
    /// Only the literal `true` enters the fault-injection path.
    pub fn inject_fault(&self) -> bool {
        self.error.as_deref() == Some("true")
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/order", get(place_order))
}

/// GET /order
/// Place a new order; `?error=true` injects a voided order first.
pub async fn place_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<TraceContext>,
    Query(params): Query<PlaceOrderParams>,
) -> Result<Response, AppError> {
    let raw = state
        .orchestrator
        .place_order(&ctx, params.inject_fault())
        .await?;

    Ok(([(CONTENT_TYPE, "application/json")], raw).into_response())
}
