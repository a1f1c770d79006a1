use std::sync::Arc;

use ordersvc_core::{MessageBroker, OutboundMessage, StageError, NEW_ORDER_EVENT};
use ordersvc_shared::{Order, TraceContext};
use tracing::info;

/// Hands completed orders to the broker under the `NEW_ORDER` key.
#[derive(Clone)]
pub struct EventPublisher {
    broker: Arc<dyn MessageBroker>,
}

impl EventPublisher {
    pub fn new(broker: Arc<dyn MessageBroker>) -> Self {
        Self { broker }
    }

    pub async fn publish(&self, ctx: &TraceContext, order: &Order) -> Result<(), StageError> {
        let payload = order.encode()?;
        self.publish_encoded(ctx, payload).await
    }

    /// Publish an order that is already in its canonical encoding.
    pub async fn publish_encoded(&self, ctx: &TraceContext, payload: Vec<u8>) -> Result<(), StageError> {
        info!("Publishing {} event", NEW_ORDER_EVENT);
        let message = OutboundMessage::new(NEW_ORDER_EVENT, payload)
            .with_header("traceparent", ctx.traceparent());
        self.broker.send(message).await
    }
}
