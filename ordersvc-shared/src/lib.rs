pub mod models;
pub mod trace;

pub use models::order::Order;
pub use trace::{request_span, ContextKey, TraceContext, LOG_FIELDS};
