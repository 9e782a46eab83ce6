//! # eventvisor
//!
//! **Eventvisor** is an in-memory integration-event subscription registry
//! and dispatch façade for service runtimes.
//!
//! Services register handler types against named events at startup; a
//! transport (message broker consumer, test harness, in-process caller)
//! hands deserialized envelopes to the bus; the bus resolves the envelope's
//! key to the registered subscriptions and invokes each handler with
//! per-handler failure isolation. The crate owns the registration table and
//! its invariants; carrying events between processes stays with the
//! transport.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ app startup  │   │ app runtime  │   │  transport   │
//!     │ subscribe<E,H>│  │ publish(evt) │   │ dispatch(env)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventBus (façade)                                                │
//! │  - SubscriptionRegistry (key → [SubscriptionInfo], kind set)      │
//! │  - ResolveHandlers (live instances from the app's container)      │
//! └──────┬──────────────────────┬──────────────────────────┬──────────┘
//!        ▼                      ▼                          ▼
//!   handler "receipt"     handler "restock"          handler "audit"
//!   (typed: OrderPaid)    (typed: OrderPaid)         (dynamic: raw)
//!        │                      │                          │
//!        └── failures logged and counted, siblings unaffected
//!
//! Eviction path:
//!   unsubscribe ──► list empties ──► key evicted ──► kind dropped
//!                                         └──► on_event_removed(key)
//!                                              (transport unbinds queue)
//! ```
//!
//! ## Features
//! | Area             | Description                                               | Key types / traits                                    |
//! |------------------|-----------------------------------------------------------|-------------------------------------------------------|
//! | **Registry**     | Key → subscription table with eviction notifications.     | [`SubscriptionRegistry`], [`SubscriptionInfo`]        |
//! | **Dispatch**     | Publish with per-handler isolation and cancellation.      | [`EventBus`], [`DispatchOutcome`]                     |
//! | **Events**       | Declared event keys and wire envelopes.                   | [`IntegrationEvent`], [`EventKind`], [`Envelope`]     |
//! | **Handlers**     | Typed and dynamic handler contracts, identity, resolution.| [`IntegrationEventHandler`], [`HandlerName`], [`HandlerMap`] |
//! | **Errors**       | Registry contract errors and per-invocation failures.     | [`SubscriptionError`], [`DispatchError`]              |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use serde::{Deserialize, Serialize};
//! use eventvisor::{
//!     EventBus, HandlerError, HandlerMap, HandlerName, IntegrationEvent,
//!     IntegrationEventHandler,
//! };
//!
//! #[derive(Serialize, Deserialize)]
//! struct OrderPaid {
//!     order_id: u64,
//! }
//!
//! impl IntegrationEvent for OrderPaid {
//!     const NAME: &'static str = "OrderPaid";
//! }
//!
//! struct SendReceipt;
//!
//! impl HandlerName for SendReceipt {
//!     const NAME: &'static str = "send-receipt";
//! }
//!
//! #[async_trait]
//! impl IntegrationEventHandler<OrderPaid> for SendReceipt {
//!     async fn handle(&self, event: OrderPaid) -> Result<(), HandlerError> {
//!         println!("sending receipt for order {}", event.order_id);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Handler instances live in the locator; the registry only records
//!     // identities.
//!     let handlers = Arc::new(HandlerMap::new());
//!     handlers.insert(SendReceipt);
//!
//!     let bus = EventBus::new(handlers);
//!     bus.subscribe::<OrderPaid, SendReceipt>()?;
//!
//!     let outcome = bus.publish(OrderPaid { order_id: 42 }).await?;
//!     assert_eq!(outcome.delivered, 1);
//!
//!     bus.unsubscribe::<OrderPaid, SendReceipt>();
//!     assert!(bus.registry().is_empty());
//!     Ok(())
//! }
//! ```

mod dispatch;
mod error;
mod events;
mod handlers;
mod registry;

// ---- Public re-exports ----

pub use dispatch::{DispatchOutcome, EventBus};
pub use error::{DispatchError, HandlerError, SubscriptionError};
pub use events::{event_key, Envelope, EventKind, IntegrationEvent};
pub use handlers::{
    DynamicIntegrationEventHandler, HandlerMap, HandlerName, IntegrationEventHandler,
    ResolveHandlers,
};
pub use registry::{SubscriptionInfo, SubscriptionKind, SubscriptionRegistry};
