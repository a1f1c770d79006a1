use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use ordersvc_shared::{request_span, TraceContext};
use tracing::Instrument;

use crate::state::AppState;

pub const TRACEPARENT_HEADER: &str = "traceparent";
pub const TRACE_ID_HEADER: &str = "x-trace-id";
pub const USER_ID_HEADER: &str = "x-user-id";

/// Builds the request's trace context, makes it available to handlers as an
/// extension and runs the rest of the stack inside the request span.
pub async fn trace_context_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let mut ctx = req
        .headers()
        .get(TRACEPARENT_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(TraceContext::from_traceparent)
        .unwrap_or_else(TraceContext::new_root);

    if let Some(user_id) = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        ctx = ctx.with_user(user_id);
    }

    req.extensions_mut().insert(ctx.clone());

    let span = state.service_span.in_scope(|| request_span(&ctx));
    let mut response = next.run(req).instrument(span).await;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(ctx.trace_id()) {
        headers.insert(TRACE_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&ctx.traceparent()) {
        headers.insert(TRACEPARENT_HEADER, value);
    }

    response
}
