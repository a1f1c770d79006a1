pub mod orchestrator;
pub mod payment;
pub mod publisher;
pub mod stage;

pub use orchestrator::{OrchestratorError, OrderOrchestrator};
pub use payment::HttpPaymentGateway;
pub use publisher::EventPublisher;
pub use stage::run_stage;
