pub mod trace_context;

pub use trace_context::{trace_context_middleware, TRACEPARENT_HEADER, TRACE_ID_HEADER, USER_ID_HEADER};
