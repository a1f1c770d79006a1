use async_trait::async_trait;
use ordersvc_shared::TraceContext;
use serde::Serialize;

/// A failure worth surfacing in the error-tracking backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub message: String,
    pub kind: &'static str,
    pub status: Option<u16>,
    pub culprit: String,
}

#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn capture(&self, ctx: &TraceContext, report: ErrorReport);
}

/// Reporter that only writes the report to the log.
#[derive(Debug, Default, Clone)]
pub struct LogErrorReporter;

#[async_trait]
impl ErrorReporter for LogErrorReporter {
    async fn capture(&self, ctx: &TraceContext, report: ErrorReport) {
        tracing::error!(
            trace_id = %ctx.trace_id(),
            span_id = %ctx.span_id(),
            kind = report.kind,
            status = ?report.status,
            culprit = %report.culprit,
            "{}",
            report.message
        );
    }
}
