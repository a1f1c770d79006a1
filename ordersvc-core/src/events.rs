use async_trait::async_trait;

use crate::StageError;

/// Routing key for every completed order put on the event stream.
pub const NEW_ORDER_EVENT: &str = "NEW_ORDER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub key: String,
    pub payload: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl OutboundMessage {
    pub fn new(key: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            payload,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Broker client owning the connection and the target topic.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<(), StageError>;
}
