//! Stage execution.
//!
//! Each fulfillment step runs inside its own `stage` span, opened as a child
//! of the caller's trace context. The span is owned by the instrumented
//! future, so it is closed exactly once however the stage ends: success,
//! error, cancellation (the future is dropped) or panic (unwinding drops it).

use std::future::Future;

use ordersvc_core::StageOutcome;
use ordersvc_shared::{Order, TraceContext};
use tracing::{error, field, info, Instrument};

pub async fn run_stage<T, F, Fut>(
    ctx: &TraceContext,
    name: &str,
    order: Option<&Order>,
    stage: F,
) -> StageOutcome<T>
where
    F: FnOnce(TraceContext) -> Fut,
    Fut: Future<Output = StageOutcome<T>>,
{
    let child = ctx.child();
    let span = tracing::info_span!(
        "stage",
        stage = name,
        trace_id = %child.trace_id(),
        span_id = %child.span_id(),
        parent_span_id = %ctx.span_id(),
        order.id = field::Empty,
        order.quantity = field::Empty,
        order.name = field::Empty,
    );
    if let Some(order) = order {
        span.record("order.id", order.id.as_str());
        span.record("order.quantity", order.quantity);
        span.record("order.name", order.name.as_str());
    }

    async move {
        info!("Entering stage {}", name);
        match stage(child).await {
            Ok(value) => {
                info!("Stage {} completed", name);
                Ok(value)
            }
            Err(e) => {
                error!(kind = e.kind(), "Stage {} failed: {}", name, e);
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}
