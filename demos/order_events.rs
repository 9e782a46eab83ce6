//! # Example: order_events
//!
//! Demonstrates the full subscription lifecycle for a small ordering flow.
//!
//! Shows how to:
//! - Declare [`IntegrationEvent`] kinds with stable wire names.
//! - Implement typed and dynamic handlers and register instances in a
//!   [`HandlerMap`].
//! - Subscribe at startup, publish, and watch the eviction notification
//!   fire when the last handler of a key unsubscribes.
//!
//! ## Flow
//! ```text
//! subscribe<OrderPaid, SendReceipt>   subscribe_dynamic::<AuditTrail>("OrderPaid")
//!          │                                   │
//!          └──────────────► EventBus ◄─────────┘
//!                              │
//! publish(OrderPaid) ──► [send-receipt, audit] in registration order
//! publish(OrderShipped) ─► no subscribers → silent no-op
//! unsubscribe ×2 ───────► "OrderPaid" evicted → on_event_removed fires
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example order_events
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use eventvisor::{
    DynamicIntegrationEventHandler, EventBus, HandlerError, HandlerMap, HandlerName,
    IntegrationEvent, IntegrationEventHandler,
};

#[derive(Debug, Serialize, Deserialize)]
struct OrderPaid {
    order_id: u64,
    amount_cents: u64,
}

impl IntegrationEvent for OrderPaid {
    const NAME: &'static str = "OrderPaid";
}

#[derive(Debug, Serialize, Deserialize)]
struct OrderShipped {
    order_id: u64,
}

impl IntegrationEvent for OrderShipped {
    const NAME: &'static str = "OrderShipped";
}

/// Typed consumer: only sees `OrderPaid` values.
struct SendReceipt;

impl HandlerName for SendReceipt {
    const NAME: &'static str = "send-receipt";
}

#[async_trait]
impl IntegrationEventHandler<OrderPaid> for SendReceipt {
    async fn handle(&self, event: OrderPaid) -> Result<(), HandlerError> {
        println!(
            "[send-receipt] order={} amount={}c",
            event.order_id, event.amount_cents
        );
        Ok(())
    }
}

/// Dynamic consumer: sees every payload raw, whatever the key.
struct AuditTrail;

impl HandlerName for AuditTrail {
    const NAME: &'static str = "audit";
}

#[async_trait]
impl DynamicIntegrationEventHandler for AuditTrail {
    async fn handle(&self, event_name: &str, payload: &Value) -> Result<(), HandlerError> {
        println!("[audit] {event_name}: {payload}");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let handlers = Arc::new(HandlerMap::new());
    handlers.insert(SendReceipt);
    handlers.insert(AuditTrail);

    let bus = EventBus::new(handlers);
    bus.on_event_removed(|key| println!("[transport] '{key}' evicted, unbinding queue"));

    // Startup registration, the way a service wires itself before serving.
    bus.subscribe::<OrderPaid, SendReceipt>()?;
    bus.subscribe_dynamic::<AuditTrail>("OrderPaid")?;

    let outcome = bus
        .publish(OrderPaid {
            order_id: 1042,
            amount_cents: 2999,
        })
        .await?;
    println!(
        "delivered={} failed={} cancelled={}",
        outcome.delivered, outcome.failed, outcome.cancelled
    );

    // Nobody listens for OrderShipped: delivery to zero handlers.
    let outcome = bus.publish(OrderShipped { order_id: 1042 }).await?;
    println!("no subscribers, delivered={}", outcome.delivered);

    // Tearing the last handler off a key evicts it and notifies the
    // transport observer above.
    bus.unsubscribe::<OrderPaid, SendReceipt>();
    bus.unsubscribe_dynamic::<AuditTrail>("OrderPaid");
    println!("registry empty: {}", bus.registry().is_empty());

    Ok(())
}
