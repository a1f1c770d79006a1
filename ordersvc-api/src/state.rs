use std::sync::Arc;

use ordersvc_order::OrderOrchestrator;
use tracing::Span;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<OrderOrchestrator>,
    /// Parent of every request span; carries the service name and environment.
    pub service_span: Span,
}

impl AppState {
    pub fn new(orchestrator: Arc<OrderOrchestrator>) -> Self {
        Self {
            orchestrator,
            service_span: Span::none(),
        }
    }

    pub fn with_service_span(mut self, span: Span) -> Self {
        self.service_span = span;
        self
    }
}
