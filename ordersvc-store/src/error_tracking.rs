//! Error reports for the APM backend.
//!
//! Every report is logged before `capture` returns. When an APM server is
//! configured the report is also sent to `<apm_url>/intake/v2/events` as an
//! NDJSON batch (metadata line, then the error line). Delivery runs on its
//! own task so the request that failed never waits on the APM server;
//! delivery problems are logged and otherwise ignored.

use async_trait::async_trait;
use chrono::Utc;
use ordersvc_core::{ErrorReport, ErrorReporter, LogErrorReporter};
use ordersvc_shared::TraceContext;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::time::Duration;
use tracing::{warn, Instrument};
use uuid::Uuid;

const INTAKE_PATH: &str = "intake/v2/events";
const NDJSON: &str = "application/x-ndjson";

#[derive(Debug, Serialize)]
struct MetadataLine<'a> {
    metadata: Metadata<'a>,
}

#[derive(Debug, Serialize)]
struct Metadata<'a> {
    service: Service<'a>,
}

#[derive(Debug, Serialize)]
struct Service<'a> {
    name: &'a str,
    environment: &'a str,
    agent: Agent,
}

#[derive(Debug, Serialize)]
struct Agent {
    name: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorLine<'a> {
    error: ApmError<'a>,
}

#[derive(Debug, Serialize)]
struct ApmError<'a> {
    id: String,
    /// Microseconds since the Unix epoch.
    timestamp: i64,
    trace_id: &'a str,
    transaction_id: &'a str,
    parent_id: &'a str,
    culprit: &'a str,
    exception: Exception<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<ErrorContext>,
}

#[derive(Debug, Serialize)]
struct Exception<'a> {
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorContext {
    response: ResponseContext,
}

#[derive(Debug, Serialize)]
struct ResponseContext {
    status_code: u16,
}

#[derive(Clone)]
pub struct ApmErrorReporter {
    http: reqwest::Client,
    endpoint: Option<String>,
    service_name: String,
    environment: String,
}

impl ApmErrorReporter {
    pub fn new(
        apm_url: Option<&str>,
        service_name: &str,
        environment: &str,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            http,
            endpoint: apm_url.map(|url| format!("{}/{}", url.trim_end_matches('/'), INTAKE_PATH)),
            service_name: service_name.to_string(),
            environment: environment.to_string(),
        })
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Metadata line followed by the error line, newline terminated.
    fn intake_body(&self, ctx: &TraceContext, report: &ErrorReport) -> Result<String, serde_json::Error> {
        let metadata = MetadataLine {
            metadata: Metadata {
                service: Service {
                    name: &self.service_name,
                    environment: &self.environment,
                    agent: Agent {
                        name: env!("CARGO_PKG_NAME"),
                        version: env!("CARGO_PKG_VERSION"),
                    },
                },
            },
        };
        let error = ErrorLine {
            error: ApmError {
                id: Uuid::new_v4().simple().to_string(),
                timestamp: Utc::now().timestamp_micros(),
                trace_id: ctx.trace_id(),
                transaction_id: ctx.span_id(),
                parent_id: ctx.span_id(),
                culprit: &report.culprit,
                exception: Exception {
                    message: &report.message,
                    kind: report.kind,
                },
                context: report.status.map(|status_code| ErrorContext {
                    response: ResponseContext { status_code },
                }),
            },
        };

        Ok(format!(
            "{}\n{}\n",
            serde_json::to_string(&metadata)?,
            serde_json::to_string(&error)?
        ))
    }
}

#[async_trait]
impl ErrorReporter for ApmErrorReporter {
    async fn capture(&self, ctx: &TraceContext, report: ErrorReport) {
        LogErrorReporter.capture(ctx, report.clone()).await;

        let Some(endpoint) = self.endpoint.clone() else {
            return;
        };

        let body = match self.intake_body(ctx, &report) {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to encode error report: {}", e);
                return;
            }
        };

        let request = self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, NDJSON)
            .header("traceparent", ctx.traceparent())
            .body(body);

        tokio::spawn(
            async move {
                match request.send().await {
                    Ok(res) if res.status().is_success() => {}
                    Ok(res) => warn!("APM server rejected error report: {}", res.status()),
                    Err(e) => warn!("Failed to deliver error report to APM server: {}", e),
                }
            }
            .in_current_span(),
        );
    }
}
