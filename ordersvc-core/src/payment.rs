use async_trait::async_trait;
use ordersvc_shared::{Order, TraceContext};

use crate::StageOutcome;

/// Downstream payment service.
///
/// Implementations charge exactly the order they are given; an order whose
/// identity was cleared is still sent.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, ctx: &TraceContext, order: &Order) -> StageOutcome;
}
