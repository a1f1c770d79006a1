use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ordersvc_core::{ErrorReport, ErrorReporter, PaymentGateway, StageError, StageOutcome};
use ordersvc_shared::{Order, TraceContext};
use reqwest::header::CONTENT_TYPE;
use tracing::info;

/// Payment service reached over HTTP at `<base url>/payment`.
///
/// The call is a `GET` carrying the canonical order encoding as its body and
/// the caller's `traceparent`. Dropping the returned future aborts the
/// in-flight request.
pub struct HttpPaymentGateway {
    http: reqwest::Client,
    endpoint: String,
    reporter: Arc<dyn ErrorReporter>,
}

impl HttpPaymentGateway {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/payment", base_url.trim_end_matches('/')),
            reporter,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn report(&self, ctx: &TraceContext, err: &StageError, status: Option<u16>) {
        let report = ErrorReport {
            message: err.to_string(),
            kind: err.kind(),
            status,
            culprit: self.endpoint.clone(),
        };
        self.reporter.capture(ctx, report).await;
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn charge(&self, ctx: &TraceContext, order: &Order) -> StageOutcome {
        info!("Processing payment...");
        let body = order.encode()?;

        let res = match self
            .http
            .get(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header("traceparent", ctx.traceparent())
            .body(body)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                let err = StageError::Transport(e.to_string());
                self.report(ctx, &err, None).await;
                return Err(err);
            }
        };

        let status = res.status();
        if !status.is_success() {
            let err = StageError::PaymentRejected {
                status: status.to_string(),
            };
            self.report(ctx, &err, Some(status.as_u16())).await;
            return Err(err);
        }

        let body = res
            .text()
            .await
            .map_err(|e| StageError::ResponseRead(e.to_string()))?;
        info!(response = %body, "Payment service response");

        Ok(())
    }
}
