use serde::{Deserialize, Serialize};

/// A customer order as it travels through the fulfillment stages.
///
/// The wire form is the canonical encoding: `order_id`, `quantity` and
/// `name`, with any empty or zero field left out entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "order_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl Order {
    pub fn new(id: impl Into<String>, quantity: u32, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            quantity,
            name: name.into(),
        }
    }

    /// An order is valid when it has an identity, a positive quantity and a name.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && self.quantity > 0 && !self.name.is_empty()
    }

    /// Copy of this order with its identity cleared.
    pub fn voided(&self) -> Self {
        Self {
            id: String::new(),
            ..self.clone()
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }
}
