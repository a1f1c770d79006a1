use std::sync::Arc;

use ordersvc_catalog::{Catalog, OrderSelector};
use ordersvc_core::{PaymentGateway, StageError, StageOutcome};
use ordersvc_shared::{Order, TraceContext};
use tracing::{debug, error, info, warn, Instrument};

use crate::publisher::EventPublisher;
use crate::stage::run_stage;

/// Runs one order request through selection, processing, payment and
/// publication.
///
/// Stages run strictly in sequence. The fault-injection path charges a copy
/// of the order with its identity cleared and, when that charge fails, ends
/// the request without entering the normal processing or payment stages.
pub struct OrderOrchestrator {
    catalog: Catalog,
    selector: Arc<dyn OrderSelector>,
    gateway: Arc<dyn PaymentGateway>,
    publisher: EventPublisher,
}

impl OrderOrchestrator {
    pub fn new(
        catalog: Catalog,
        selector: Arc<dyn OrderSelector>,
        gateway: Arc<dyn PaymentGateway>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            catalog,
            selector,
            gateway,
            publisher,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the canonical encoding of the published order.
    ///
    /// A failed publish is logged and does not change the result.
    pub async fn place_order(
        &self,
        ctx: &TraceContext,
        inject_fault: bool,
    ) -> Result<Vec<u8>, OrchestratorError> {
        info!("Placing new order...");
        let order = self.catalog.select(self.selector.as_ref());
        debug!(order.id = %order.id, order.name = %order.name, "Order selected");

        if inject_fault {
            self.process_order_with_error(ctx, &order).await.map_err(|e| {
                error!("Error processing order: {}", e);
                OrchestratorError::FaultInjected(e)
            })?;
        }

        self.process_order(ctx, &order).await.map_err(|e| {
            error!("Error processing order: {}", e);
            OrchestratorError::Stage(e)
        })?;

        self.process_payment(ctx, &order).await.map_err(|e| {
            error!("Error processing payment: {}", e);
            OrchestratorError::Stage(e)
        })?;

        let raw = order.encode().map_err(|e| {
            error!("Error marshalling order: {}", e);
            OrchestratorError::Stage(e.into())
        })?;

        self.publish(ctx, &order, raw.clone()).await;

        info!("Order placed");
        Ok(raw)
    }

    async fn process_order_with_error(&self, ctx: &TraceContext, order: &Order) -> StageOutcome {
        run_stage(ctx, "process_order_with_error", Some(order), |stage_ctx| async move {
            let voided = order.voided();
            warn!("Order identity cleared, charging voided order");
            self.process_payment(&stage_ctx, &voided).await
        })
        .await
    }

    async fn process_order(&self, ctx: &TraceContext, order: &Order) -> StageOutcome {
        run_stage(ctx, "process_order", Some(order), |_| async {
            debug!("Order processed");
            Ok(())
        })
        .await
    }

    async fn process_payment(&self, ctx: &TraceContext, order: &Order) -> StageOutcome {
        let gateway = self.gateway.as_ref();
        run_stage(ctx, "process_payment", Some(order), |stage_ctx| async move {
            gateway.charge(&stage_ctx, order).await
        })
        .await
    }

    /// The publish runs on its own task so a dropped request cannot abort
    /// it; the caller still waits for the attempt to finish.
    async fn publish(&self, ctx: &TraceContext, order: &Order, raw: Vec<u8>) {
        let publisher = self.publisher.clone();
        let ctx = ctx.clone();
        let order = order.clone();

        let task = tokio::spawn(
            async move {
                run_stage(&ctx, "publish_order", Some(&order), |stage_ctx| async move {
                    publisher.publish_encoded(&stage_ctx, raw).await
                })
                .await
            }
            .instrument(tracing::Span::current()),
        );

        match task.await {
            Ok(Ok(())) => info!("Order published"),
            Ok(Err(e)) => error!(kind = e.kind(), "Error publishing order: {}", e),
            Err(e) => error!("Publish task failed: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestratorError {
    /// The fault-injection charge failed; its text is returned to the caller.
    #[error("{0}")]
    FaultInjected(StageError),

    #[error("{0}")]
    Stage(StageError),
}

impl OrchestratorError {
    pub fn stage_error(&self) -> &StageError {
        match self {
            OrchestratorError::FaultInjected(e) | OrchestratorError::Stage(e) => e,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.stage_error().kind()
    }
}
