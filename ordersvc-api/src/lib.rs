use axum::Router;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod middleware;
pub mod orders;
pub mod state;
pub mod telemetry;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(orders::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::trace_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
