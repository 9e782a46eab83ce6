//! # Event handler contracts.
//!
//! Two handler shapes exist, mirroring the two subscription variants:
//!
//! - [`IntegrationEventHandler<E>`] processes one concrete, strongly-typed
//!   event kind. The bus decodes the envelope payload into `E` before
//!   calling it.
//! - [`DynamicIntegrationEventHandler`] processes events by raw key and
//!   payload only, without a concrete type. Useful for audit trails,
//!   forwarding, and wildcard-style consumers.
//!
//! [`HandlerName`] supplies the stable identity a handler type registers
//! under; the registry enforces per-key uniqueness on it and the resolution
//! collaborator looks instances up by it.
//!
//! ## Rules
//! - Handlers run on the publisher's task; use async I/O and return promptly.
//! - Errors are isolated per handler: return [`HandlerError`], do not panic
//!   (panics are caught and logged, but leave no room for context).
//! - A handler may be registered for several event keys, but only once per
//!   key.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::HandlerError;
use crate::events::IntegrationEvent;

/// Stable identity of a handler type.
///
/// Declared once per handler, next to the type. This is the uniqueness key
/// within an event's subscription list and the lookup key handed to the
/// resolution collaborator.
///
/// Kept separate from the handler traits, which must stay object-safe.
pub trait HandlerName {
    /// Registry identity of this handler type.
    ///
    /// Prefer short, descriptive names (e.g., "send-receipt", "audit").
    const NAME: &'static str;
}

/// Handler for one concrete integration event kind.
#[async_trait]
pub trait IntegrationEventHandler<E: IntegrationEvent>: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called once per matching publication, in registration order relative
    /// to the other handlers of the same key.
    async fn handle(&self, event: E) -> Result<(), HandlerError>;
}

/// Handler bound to a raw event name rather than a concrete kind.
#[async_trait]
pub trait DynamicIntegrationEventHandler: Send + Sync + 'static {
    /// Processes a single event given its key and un-decoded payload.
    async fn handle(&self, event_name: &str, payload: &Value) -> Result<(), HandlerError>;
}
