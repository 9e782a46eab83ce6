//! Integration event data model.
//!
//! This module groups event **identity** and the **wire record**:
//!
//! - [`IntegrationEvent`], [`EventKind`], [`event_key`] — declared event keys
//!   and kind descriptors
//! - [`Envelope`] — the serialized record a transport delivers to the bus
//!
//! The subscription registry (`registry`) indexes by the key; the dispatch
//! façade (`dispatch`) decodes envelope payloads per typed subscription.

mod envelope;
mod event;

pub use envelope::Envelope;
pub use event::{event_key, EventKind, IntegrationEvent};
