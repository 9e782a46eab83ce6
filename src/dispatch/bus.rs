//! # Event bus façade: subscribe, unsubscribe, publish.
//!
//! [`EventBus`] is the application-facing surface of the crate. It owns the
//! [`SubscriptionRegistry`] and composes it with handler resolution and
//! invocation: subscribing records a handler identity plus an erased invoker;
//! publishing resolves the envelope's key to the registered subscriptions and
//! runs each one against a live handler instance obtained from the
//! [`ResolveHandlers`] collaborator.
//!
//! ## Dispatch flow
//! ```text
//! publish(event) ──► Envelope::for_event ──┐
//! transport ──► dispatch(envelope, ctx) ◄──┘
//!     │
//!     ├─► registry.handlers_for(name)        (snapshot; UnknownEvent → no-op)
//!     │
//!     └─► for each subscription, in registration order:
//!             ├─► resolver.resolve(handler)  → missing? log, count failed
//!             ├─► invoke (decode payload for typed, raw for dynamic)
//!             │       ├─ Ok        → count delivered
//!             │       ├─ Err       → log, count failed, continue
//!             │       └─ panic     → caught, log, count failed, continue
//!             └─► ctx cancelled?   → abort in-flight, count rest cancelled
//! ```
//!
//! ## Rules
//! - Publishing with zero subscribers is a silent no-op delivery.
//! - One handler's failure never blocks delivery to its siblings; failures
//!   are logged and counted in the [`DispatchOutcome`].
//! - Dispatch iterates a snapshot: subscribing or unsubscribing during an
//!   in-flight publication affects the next one, never the current loop.
//! - Cancellation aborts handler invocations only; registry state is never
//!   touched by dispatch, so an aborted publication leaves it consistent.
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
//!         println!("receipt for order {}", event.order_id);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handlers = Arc::new(HandlerMap::new());
//!     handlers.insert(SendReceipt);
//!
//!     let bus = EventBus::new(handlers);
//!     bus.subscribe::<OrderPaid, SendReceipt>()?;
//!
//!     let outcome = bus.publish(OrderPaid { order_id: 42 }).await?;
//!     assert_eq!(outcome.delivered, 1);
//!     Ok(())
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::dispatch::outcome::DispatchOutcome;
use crate::error::{DispatchError, SubscriptionError};
use crate::events::{Envelope, EventKind, IntegrationEvent};
use crate::handlers::{
    DynamicIntegrationEventHandler, HandlerName, IntegrationEventHandler, ResolveHandlers,
};
use crate::registry::{InvokeFn, SubscriptionInfo, SubscriptionRegistry};

/// Publish/subscribe façade over the subscription registry.
///
/// Cheap to clone; clones share the registry and the resolution
/// collaborator, so services typically create one bus at startup and hand
/// clones to whatever needs to publish or subscribe.
#[derive(Clone)]
pub struct EventBus {
    registry: Arc<SubscriptionRegistry>,
    resolver: Arc<dyn ResolveHandlers>,
}

impl EventBus {
    /// Creates a bus with an empty registry and the given resolution
    /// collaborator.
    pub fn new(resolver: Arc<dyn ResolveHandlers>) -> Self {
        Self {
            registry: Arc::new(SubscriptionRegistry::new()),
            resolver,
        }
    }

    /// Shared view of the subscription registry, for queries.
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Registers an observer fired when an event key is fully evicted.
    ///
    /// Convenience delegate to
    /// [`SubscriptionRegistry::on_event_removed`].
    pub fn on_event_removed(&self, observer: impl Fn(&str) + Send + Sync + 'static) {
        self.registry.on_event_removed(observer);
    }

    /// Registers handler type `H` for the concrete event kind `E`.
    ///
    /// Fails with [`SubscriptionError::DuplicateHandler`] when `H` is already
    /// registered for `E`'s key.
    pub fn subscribe<E, H>(&self) -> Result<(), SubscriptionError>
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E> + HandlerName,
    {
        let invoke: InvokeFn = Arc::new(|instance, envelope: Arc<Envelope>| {
            Box::pin(async move {
                let handler = instance
                    .downcast::<H>()
                    .map_err(|_| DispatchError::Mismatch { handler: H::NAME })?;
                let event: E = serde_json::from_value(envelope.payload.clone()).map_err(
                    |source| DispatchError::Decode {
                        event: envelope.name.clone(),
                        source,
                    },
                )?;
                handler
                    .handle(event)
                    .await
                    .map_err(|source| DispatchError::Handler {
                        handler: H::NAME,
                        source,
                    })
            })
        });

        log::debug!("subscribe handler='{}' event='{}'", H::NAME, E::NAME);
        self.registry
            .add_typed(EventKind::of::<E>(), SubscriptionInfo::typed(H::NAME, invoke))
    }

    /// Registers handler type `H` for a raw event name.
    pub fn subscribe_dynamic<H>(&self, event_name: &str) -> Result<(), SubscriptionError>
    where
        H: DynamicIntegrationEventHandler + HandlerName,
    {
        let invoke: InvokeFn = Arc::new(|instance, envelope: Arc<Envelope>| {
            Box::pin(async move {
                let handler = instance
                    .downcast::<H>()
                    .map_err(|_| DispatchError::Mismatch { handler: H::NAME })?;
                handler
                    .handle(&envelope.name, &envelope.payload)
                    .await
                    .map_err(|source| DispatchError::Handler {
                        handler: H::NAME,
                        source,
                    })
            })
        });

        log::debug!("subscribe dynamic handler='{}' event='{event_name}'", H::NAME);
        self.registry
            .add_dynamic(event_name, SubscriptionInfo::dynamic(H::NAME, invoke))
    }

    /// Removes `H`'s registration for `E`'s key; no-op when absent.
    pub fn unsubscribe<E, H>(&self)
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E> + HandlerName,
    {
        log::debug!("unsubscribe handler='{}' event='{}'", H::NAME, E::NAME);
        self.registry.remove_typed(EventKind::of::<E>(), H::NAME);
    }

    /// Removes `H`'s dynamic registration for the raw name; no-op when absent.
    pub fn unsubscribe_dynamic<H>(&self, event_name: &str)
    where
        H: DynamicIntegrationEventHandler + HandlerName,
    {
        log::debug!(
            "unsubscribe dynamic handler='{}' event='{event_name}'",
            H::NAME
        );
        self.registry.remove_dynamic(event_name, H::NAME);
    }

    /// Delivers a typed event to every handler registered for its kind.
    ///
    /// Fails only when the event cannot be serialized; handler failures are
    /// isolated and reported through the returned [`DispatchOutcome`].
    pub async fn publish<E: IntegrationEvent>(
        &self,
        event: E,
    ) -> Result<DispatchOutcome, DispatchError> {
        self.publish_scoped(event, CancellationToken::new()).await
    }

    /// Like [`publish`](Self::publish), under a caller-supplied cancellation
    /// scope.
    pub async fn publish_scoped<E: IntegrationEvent>(
        &self,
        event: E,
        ctx: CancellationToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        let envelope = Envelope::for_event(&event)?;
        Ok(self.dispatch(envelope, ctx).await)
    }

    /// Delivers an envelope to every handler registered for its key.
    ///
    /// This is the transport entry point: the wire message's event name
    /// selects the registry key. An unregistered key is a silent no-op
    /// delivery to zero handlers. Cancelling `ctx` aborts the in-flight
    /// invocation and skips the remaining ones.
    pub async fn dispatch(&self, envelope: Envelope, ctx: CancellationToken) -> DispatchOutcome {
        let subs = match self.registry.handlers_for(&envelope.name) {
            Ok(subs) => subs,
            Err(_) => {
                log::trace!("no subscriptions for '{}'; dropping", envelope.name);
                return DispatchOutcome::default();
            }
        };

        log::debug!(
            "dispatching '{}' ({}) to {} handler(s)",
            envelope.name,
            envelope.id,
            subs.len()
        );

        let envelope = Arc::new(envelope);
        let mut outcome = DispatchOutcome::default();

        for (idx, sub) in subs.iter().enumerate() {
            if ctx.is_cancelled() {
                outcome.cancelled += subs.len() - idx;
                break;
            }

            let Some(instance) = self.resolver.resolve(sub.handler()) else {
                let err = DispatchError::Unresolved {
                    handler: sub.handler(),
                };
                log::warn!("'{}' [{}]: {}", envelope.name, err.as_label(), err);
                outcome.failed += 1;
                continue;
            };

            let invocation =
                std::panic::AssertUnwindSafe(sub.dispatch(instance, Arc::clone(&envelope)))
                    .catch_unwind();

            tokio::select! {
                () = ctx.cancelled() => {
                    outcome.cancelled += subs.len() - idx;
                    break;
                }
                res = invocation => match res {
                    Ok(Ok(())) => outcome.delivered += 1,
                    Ok(Err(err)) => {
                        log::error!("'{}' [{}]: {}", envelope.name, err.as_label(), err);
                        outcome.failed += 1;
                    }
                    Err(panic) => {
                        log::error!(
                            "handler '{}' panicked for '{}': {}",
                            sub.handler(),
                            envelope.name,
                            panic_message(&*panic)
                        );
                        outcome.failed += 1;
                    }
                }
            }
        }

        outcome
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
