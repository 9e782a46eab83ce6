//! # Integration event identity.
//!
//! An integration event is a fact that happened in one service and is
//! relevant to others. Each event kind carries a stable wire name declared
//! at definition time via [`IntegrationEvent::NAME`]; that name is the
//! **event key** used to index the subscription registry and to tag
//! envelopes on the wire.
//!
//! ## Rules
//! - Keys are case-sensitive and unique per kind.
//! - The key is a declared constant, never derived from the Rust type name,
//!   so renaming a type cannot silently change its wire contract.
//! - [`EventKind`] pairs the key with the type's identity; the registry uses
//!   it for reverse lookup (`name -> kind`) and to keep its auxiliary kind
//!   set consistent.

use std::any::TypeId;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A strongly-typed integration event.
///
/// Implementations are plain serde-derived data types with a declared wire
/// name:
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use eventvisor::IntegrationEvent;
///
/// #[derive(Serialize, Deserialize)]
/// struct OrderPaid {
///     order_id: u64,
/// }
///
/// impl IntegrationEvent for OrderPaid {
///     const NAME: &'static str = "OrderPaid";
/// }
/// ```
pub trait IntegrationEvent: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable wire name of this event kind.
    ///
    /// Declared once at event-definition time; two distinct kinds must not
    /// share a name.
    const NAME: &'static str;
}

/// Returns the event key for a concrete event kind.
///
/// # Example
/// ```
/// use serde::{Deserialize, Serialize};
/// use eventvisor::{event_key, IntegrationEvent};
///
/// #[derive(Serialize, Deserialize)]
/// struct StockDepleted {
///     sku: String,
/// }
///
/// impl IntegrationEvent for StockDepleted {
///     const NAME: &'static str = "StockDepleted";
/// }
///
/// assert_eq!(event_key::<StockDepleted>(), "StockDepleted");
/// ```
#[inline]
pub fn event_key<E: IntegrationEvent>() -> &'static str {
    E::NAME
}

/// Descriptor of a concrete event kind: its wire name plus type identity.
///
/// The registry tracks one `EventKind` per concrete key so a transport can
/// ask "which kind does this wire name belong to" via
/// [`resolve_kind_by_name`](crate::SubscriptionRegistry::resolve_kind_by_name).
/// The type identity only distinguishes kinds; the wire name alone is the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventKind {
    name: &'static str,
    type_id: TypeId,
}

impl EventKind {
    /// Returns the descriptor for a concrete event kind.
    pub fn of<E: IntegrationEvent>() -> Self {
        Self {
            name: E::NAME,
            type_id: TypeId::of::<E>(),
        }
    }

    /// Returns the event key (wire name) of this kind.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}
