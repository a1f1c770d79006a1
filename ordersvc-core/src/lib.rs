pub mod events;
pub mod payment;
pub mod reporting;

pub use events::{MessageBroker, OutboundMessage, NEW_ORDER_EVENT};
pub use payment::PaymentGateway;
pub use reporting::{ErrorReport, ErrorReporter, LogErrorReporter};

/// Failure of a single fulfillment stage.
///
/// The display text is what the fault-injection path hands back to callers,
/// so it stays human readable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error("error processing payment. transport failure: {0}")]
    Transport(String),
    #[error("error processing payment. response: {status}")]
    PaymentRejected { status: String },
    #[error("error reading payment response: {0}")]
    ResponseRead(String),
    #[error("error serializing order: {0}")]
    Serialization(String),
    #[error("error publishing order: {0}")]
    Publish(String),
}

impl StageError {
    /// Taxonomy label, stable across message wording changes.
    pub fn kind(&self) -> &'static str {
        match self {
            StageError::Transport(_) => "transport_error",
            StageError::PaymentRejected { .. } => "payment_rejected",
            StageError::ResponseRead(_) => "response_read_error",
            StageError::Serialization(_) => "serialization_error",
            StageError::Publish(_) => "publish_error",
        }
    }
}

impl From<serde_json::Error> for StageError {
    fn from(err: serde_json::Error) -> Self {
        StageError::Serialization(err.to_string())
    }
}

pub type StageOutcome<T = ()> = Result<T, StageError>;
