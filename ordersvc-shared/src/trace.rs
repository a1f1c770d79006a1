//! Request trace identity.
//!
//! A [`TraceContext`] is built once per inbound request, either continuing
//! the caller's W3C `traceparent` or starting a new root trace. Stages derive
//! child contexts from it and outbound calls carry it as `traceparent`.

use std::fmt;

use tracing::{field, Span};
use uuid::Uuid;

/// Keys a trace context can be queried by when deriving log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    TraceId,
    SpanId,
    UserId,
}

/// Context keys and the log field each one is rendered under.
///
/// [`request_span`] declares exactly these field names.
pub const LOG_FIELDS: &[(ContextKey, &str)] = &[
    (ContextKey::TraceId, "traceID"),
    (ContextKey::SpanId, "spanID"),
    (ContextKey::UserId, "userID"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: String,
    span_id: String,
    parent_span_id: Option<String>,
    user_id: Option<String>,
    sampled: bool,
}

impl TraceContext {
    /// Start a new trace with a fresh root span.
    pub fn new_root() -> Self {
        Self {
            trace_id: Uuid::new_v4().simple().to_string(),
            span_id: new_span_id(),
            parent_span_id: None,
            user_id: None,
            sampled: true,
        }
    }

    /// Continue the trace described by a W3C `traceparent` header value.
    ///
    /// Returns `None` for malformed headers and for all-zero identifiers.
    pub fn from_traceparent(header: &str) -> Option<Self> {
        let parts: Vec<&str> = header.trim().split('-').collect();
        if parts.len() != 4 {
            return None;
        }
        let (version, trace_id, parent_id, flags) = (parts[0], parts[1], parts[2], parts[3]);

        if !is_hex(version, 2) || version == "ff" {
            return None;
        }
        if !is_hex(trace_id, 32) || is_zero(trace_id) {
            return None;
        }
        if !is_hex(parent_id, 16) || is_zero(parent_id) {
            return None;
        }
        if !is_hex(flags, 2) {
            return None;
        }
        let flags = u8::from_str_radix(flags, 16).ok()?;

        Some(Self {
            trace_id: trace_id.to_string(),
            span_id: new_span_id(),
            parent_span_id: Some(parent_id.to_string()),
            user_id: None,
            sampled: flags & 0x01 == 0x01,
        })
    }

    /// Context for a unit of work nested under this one.
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: new_span_id(),
            parent_span_id: Some(self.span_id.clone()),
            user_id: self.user_id.clone(),
            sampled: self.sampled,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    pub fn parent_span_id(&self) -> Option<&str> {
        self.parent_span_id.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_sampled(&self) -> bool {
        self.sampled
    }

    /// The W3C `traceparent` value identifying this context's span.
    pub fn traceparent(&self) -> String {
        let flags: u8 = if self.sampled { 0x01 } else { 0x00 };
        format!("00-{}-{}-{:02x}", self.trace_id, self.span_id, flags)
    }

    pub fn value(&self, key: ContextKey) -> Option<&str> {
        match key {
            ContextKey::TraceId => Some(&self.trace_id),
            ContextKey::SpanId => Some(&self.span_id),
            ContextKey::UserId => self.user_id.as_deref(),
        }
    }

    /// Log field name and value for every key present in this context.
    pub fn log_fields(&self) -> Vec<(&'static str, &str)> {
        LOG_FIELDS
            .iter()
            .filter_map(|(key, name)| self.value(*key).map(|value| (*name, value)))
            .collect()
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.traceparent())
    }
}

/// Span carrying the request's log fields; everything logged inside it is
/// tagged with the trace identity.
pub fn request_span(ctx: &TraceContext) -> Span {
    let span = tracing::info_span!(
        "request",
        traceID = field::Empty,
        spanID = field::Empty,
        userID = field::Empty,
    );
    for (name, value) in ctx.log_fields() {
        span.record(name, value);
    }
    span
}

fn new_span_id() -> String {
    loop {
        let id: u64 = rand::random();
        if id != 0 {
            return format!("{:016x}", id);
        }
    }
}

fn is_hex(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn is_zero(value: &str) -> bool {
    value.bytes().all(|b| b == b'0')
}
