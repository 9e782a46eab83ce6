//! # Handler resolution.
//!
//! The registry stores handler **identities**, not instances. At dispatch
//! time the bus asks a [`ResolveHandlers`] collaborator for a live instance
//! per subscription, so handler lifetime stays with the application's own
//! container.
//!
//! [`HandlerMap`] is the in-crate implementation: a keyed map of shared
//! instances, registered by [`HandlerName::NAME`]. Applications with a real
//! dependency-injection container implement [`ResolveHandlers`] over it
//! instead.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::handlers::handler::HandlerName;

/// Resolves a live handler instance by its registered identity.
///
/// Returns the instance type-erased; the subscription that requested it
/// downcasts back to the concrete handler type it was created for.
pub trait ResolveHandlers: Send + Sync + 'static {
    /// Returns the instance registered under `handler`, if any.
    fn resolve(&self, handler: &str) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// In-memory handler locator keyed by [`HandlerName::NAME`].
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use eventvisor::{HandlerMap, HandlerName, ResolveHandlers};
///
/// struct SendReceipt;
///
/// impl HandlerName for SendReceipt {
///     const NAME: &'static str = "send-receipt";
/// }
///
/// let map = HandlerMap::new();
/// map.insert(SendReceipt);
///
/// assert!(map.contains("send-receipt"));
/// assert!(map.resolve("send-receipt").is_some());
/// ```
#[derive(Default)]
pub struct HandlerMap {
    entries: RwLock<HashMap<&'static str, Arc<dyn Any + Send + Sync>>>,
}

impl HandlerMap {
    /// Creates an empty locator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler instance under its declared name.
    ///
    /// Re-registering the same name replaces the previous instance.
    pub fn insert<H>(&self, handler: H)
    where
        H: HandlerName + Send + Sync + 'static,
    {
        self.insert_arc(Arc::new(handler));
    }

    /// Registers an already-shared handler instance under its declared name.
    pub fn insert_arc<H>(&self, handler: Arc<H>)
    where
        H: HandlerName + Send + Sync + 'static,
    {
        self.entries.write().insert(H::NAME, handler);
    }

    /// Returns true if an instance is registered under `handler`.
    pub fn contains(&self, handler: &str) -> bool {
        self.entries.read().contains_key(handler)
    }

    /// Returns the number of registered instances.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no instances are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ResolveHandlers for HandlerMap {
    fn resolve(&self, handler: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.read().get(handler).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Audit;

    impl HandlerName for Audit {
        const NAME: &'static str = "audit";
    }

    #[test]
    fn resolves_registered_instance() {
        let map = HandlerMap::new();
        assert!(map.is_empty());

        map.insert(Audit);
        assert_eq!(map.len(), 1);
        assert!(map.contains("audit"));

        let instance = map.resolve("audit").expect("registered");
        assert!(instance.downcast::<Audit>().is_ok());
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        let map = HandlerMap::new();
        assert!(map.resolve("missing").is_none());
    }
}
