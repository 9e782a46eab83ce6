//! # Wire-shaped event record.
//!
//! [`Envelope`] is the unit a transport hands to the dispatch façade: the
//! event key plus the serialized payload, tagged with a unique id and a
//! publication timestamp. The name in the envelope selects the registry key;
//! the payload is decoded per typed subscription (or passed through raw for
//! dynamic ones).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::DispatchError;
use crate::events::event::IntegrationEvent;

/// Serialized integration event as carried between processes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique id of this publication.
    pub id: Uuid,
    /// Event key (wire name of the event kind).
    pub name: String,
    /// Wall-clock timestamp of publication.
    pub occurred_at: DateTime<Utc>,
    /// Serialized event payload.
    pub payload: Value,
}

impl Envelope {
    /// Creates an envelope with a fresh id and the current timestamp.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            occurred_at: Utc::now(),
            payload,
        }
    }

    /// Wraps a typed event, serializing its payload.
    ///
    /// Fails with [`DispatchError::Encode`] when the event cannot be
    /// serialized.
    pub fn for_event<E: IntegrationEvent>(event: &E) -> Result<Self, DispatchError> {
        let payload = serde_json::to_value(event).map_err(|source| DispatchError::Encode {
            event: E::NAME,
            source,
        })?;
        Ok(Self::new(E::NAME, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct OrderPaid {
        order_id: u64,
    }

    impl IntegrationEvent for OrderPaid {
        const NAME: &'static str = "OrderPaid";
    }

    #[test]
    fn wraps_typed_event_under_its_key() {
        let env = Envelope::for_event(&OrderPaid { order_id: 42 }).unwrap();
        assert_eq!(env.name, "OrderPaid");
        assert_eq!(env.payload["order_id"], 42);
    }
}
