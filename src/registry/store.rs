//! # Subscription registry - the event key to handler-list table.
//!
//! [`SubscriptionRegistry`] owns the mapping from event keys to registered
//! subscriptions, the auxiliary set of known concrete event kinds, and the
//! observers notified when a key is fully evicted.
//!
//! ## Architecture
//! ```text
//! EventBus (façade)
//!     ├─► add_typed / add_dynamic ──────► handlers: key → [SubscriptionInfo, ...]
//!     ├─► remove_typed / remove_dynamic ─► list empties → evict key
//!     │                                       ├─► drop kind from aux set
//!     │                                       └─► fire removal observers(key)
//!     └─► handlers_for(key) ─────────────► cloned snapshot for dispatch
//!
//! Transport
//!     ├─► resolve_kind_by_name(name) ────► aux set reverse lookup
//!     └─► on_event_removed(f) ───────────► stop listening for evicted keys
//! ```
//!
//! ## Rules
//! - A present key always has a non-empty subscription list; the moment a
//!   list empties the key is evicted (no tombstones).
//! - Handler identities are unique per key; duplicates are rejected and
//!   leave the state untouched.
//! - The aux kind set tracks exactly one kind per concrete key and stays
//!   consistent with the key set.
//! - Subscription lists keep insertion order; dispatch follows it.
//! - Every check-then-act sequence runs under one mutex, so concurrent
//!   subscribe/unsubscribe calls cannot double-append or double-evict.
//! - Removal observers fire synchronously on the unsubscribing thread,
//!   once per evicted key, **after** the state lock is released. Callbacks
//!   may query the registry but must treat results as snapshots.
//! - `clear` is a bulk reset: no per-key notifications.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::SubscriptionError;
use crate::events::{EventKind, IntegrationEvent};
use crate::registry::subscription::SubscriptionInfo;

type RemovalObserver = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct State {
    handlers: HashMap<String, Vec<SubscriptionInfo>>,
    kinds: Vec<EventKind>,
}

/// In-memory table of event subscriptions.
///
/// Process-wide state owned by the [`EventBus`](crate::EventBus); rebuilt at
/// each process start by replaying `subscribe` calls during service
/// initialization. All operations are in-memory and O(list length).
#[derive(Default)]
pub struct SubscriptionRegistry {
    state: Mutex<State>,
    removal_observers: Mutex<Vec<RemovalObserver>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a typed subscription and tracks its event kind.
    ///
    /// Rejects a handler identity already present for the key; the kind set
    /// is only touched on success.
    pub(crate) fn add_typed(
        &self,
        kind: EventKind,
        info: SubscriptionInfo,
    ) -> Result<(), SubscriptionError> {
        let mut state = self.state.lock();
        Self::append(&mut state.handlers, kind.name(), info)?;
        debug_assert!(
            state.kinds.iter().all(|k| k.name() != kind.name() || *k == kind),
            "distinct event kinds must not share a wire name"
        );
        if !state.kinds.contains(&kind) {
            state.kinds.push(kind);
        }
        Ok(())
    }

    /// Appends a dynamic subscription keyed by the raw event name.
    ///
    /// Dynamic subscriptions have no concrete kind; the aux set is untouched.
    pub(crate) fn add_dynamic(
        &self,
        event_name: &str,
        info: SubscriptionInfo,
    ) -> Result<(), SubscriptionError> {
        let mut state = self.state.lock();
        Self::append(&mut state.handlers, event_name, info)
    }

    fn append(
        handlers: &mut HashMap<String, Vec<SubscriptionInfo>>,
        key: &str,
        info: SubscriptionInfo,
    ) -> Result<(), SubscriptionError> {
        let list = handlers.entry(key.to_string()).or_default();
        if list.iter().any(|s| s.handler() == info.handler()) {
            return Err(SubscriptionError::DuplicateHandler {
                event: key.to_string(),
                handler: info.handler(),
            });
        }
        list.push(info);
        Ok(())
    }

    /// Removes a typed subscription by exact handler identity.
    pub(crate) fn remove_typed(&self, kind: EventKind, handler: &str) {
        self.remove(kind.name(), handler);
    }

    /// Removes a dynamic subscription by exact handler identity.
    pub(crate) fn remove_dynamic(&self, event_name: &str, handler: &str) {
        self.remove(event_name, handler);
    }

    /// Shared removal path: no-op when the pair is absent; evicts the key
    /// (and its kind) when the list empties, then notifies observers.
    fn remove(&self, key: &str, handler: &str) {
        let evicted = {
            let mut state = self.state.lock();
            let Some(list) = state.handlers.get_mut(key) else {
                return;
            };
            let Some(pos) = list.iter().position(|s| s.handler() == handler) else {
                return;
            };
            list.remove(pos);
            if list.is_empty() {
                state.handlers.remove(key);
                state.kinds.retain(|k| k.name() != key);
                true
            } else {
                false
            }
        };

        if evicted {
            log::debug!("event '{key}' has no handlers left; evicted");
            self.notify_removed(key);
        }
    }

    /// Registers an observer fired when an event key is fully evicted.
    ///
    /// Observers run synchronously on the thread performing the removal,
    /// after registry state is already consistent. A transport typically
    /// uses this to stop listening for the event name on the wire.
    pub fn on_event_removed(&self, observer: impl Fn(&str) + Send + Sync + 'static) {
        self.removal_observers.lock().push(Arc::new(observer));
    }

    fn notify_removed(&self, key: &str) {
        // Snapshot so observers never run under a registry lock.
        let observers: Vec<RemovalObserver> = self.removal_observers.lock().clone();
        for observer in &observers {
            observer(key);
        }
    }

    /// Returns true if any subscription exists for the event key.
    pub fn has_subscriptions(&self, event_name: &str) -> bool {
        self.state.lock().handlers.contains_key(event_name)
    }

    /// Returns true if any subscription exists for the concrete event kind.
    pub fn has_subscriptions_for<E: IntegrationEvent>(&self) -> bool {
        self.has_subscriptions(E::NAME)
    }

    /// Returns a snapshot of the subscriptions for the event key, in
    /// registration order.
    ///
    /// Fails with [`SubscriptionError::UnknownEvent`] when the key is not
    /// registered; guard with [`has_subscriptions`](Self::has_subscriptions)
    /// or treat the error as "zero handlers". Dispatch iterates the snapshot,
    /// so concurrent mutation never affects an in-flight delivery.
    pub fn handlers_for(
        &self,
        event_name: &str,
    ) -> Result<Vec<SubscriptionInfo>, SubscriptionError> {
        self.state
            .lock()
            .handlers
            .get(event_name)
            .cloned()
            .ok_or_else(|| SubscriptionError::UnknownEvent {
                event: event_name.to_string(),
            })
    }

    /// Returns a snapshot of the subscriptions for the concrete event kind.
    pub fn handlers_for_event<E: IntegrationEvent>(
        &self,
    ) -> Result<Vec<SubscriptionInfo>, SubscriptionError> {
        self.handlers_for(E::NAME)
    }

    /// Reverse lookup: the concrete event kind registered under a wire name.
    ///
    /// Returns `None` (not an error) when no concrete kind matches, e.g. for
    /// dynamic-only keys.
    pub fn resolve_kind_by_name(&self, event_name: &str) -> Option<EventKind> {
        self.state
            .lock()
            .kinds
            .iter()
            .copied()
            .find(|k| k.name() == event_name)
    }

    /// Returns true exactly when zero keys are registered.
    pub fn is_empty(&self) -> bool {
        self.state.lock().handlers.is_empty()
    }

    /// Returns the number of registered event keys.
    pub fn len(&self) -> usize {
        self.state.lock().handlers.len()
    }

    /// Removes all entries and tracked kinds without firing observers.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.handlers.clear();
        state.kinds.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::registry::subscription::InvokeFn;

    #[derive(Serialize, Deserialize)]
    struct OrderPaid {
        order_id: u64,
    }

    impl IntegrationEvent for OrderPaid {
        const NAME: &'static str = "OrderPaid";
    }

    fn noop_invoke() -> InvokeFn {
        Arc::new(|_, _| Box::pin(async { Ok(()) }))
    }

    fn typed(handler: &'static str) -> SubscriptionInfo {
        SubscriptionInfo::typed(handler, noop_invoke())
    }

    fn dynamic(handler: &'static str) -> SubscriptionInfo {
        SubscriptionInfo::dynamic(handler, noop_invoke())
    }

    #[test]
    fn add_registers_key_and_kind() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.is_empty());

        registry
            .add_typed(EventKind::of::<OrderPaid>(), typed("receipt"))
            .unwrap();

        assert!(!registry.is_empty());
        assert!(registry.has_subscriptions("OrderPaid"));
        assert!(registry.has_subscriptions_for::<OrderPaid>());

        let subs = registry.handlers_for("OrderPaid").unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].handler(), "receipt");
        assert!(!subs[0].is_dynamic());

        let kind = registry.resolve_kind_by_name("OrderPaid").unwrap();
        assert_eq!(kind, EventKind::of::<OrderPaid>());
    }

    #[test]
    fn duplicate_handler_is_rejected_and_state_unchanged() {
        let registry = SubscriptionRegistry::new();
        registry
            .add_typed(EventKind::of::<OrderPaid>(), typed("receipt"))
            .unwrap();

        let err = registry
            .add_typed(EventKind::of::<OrderPaid>(), typed("receipt"))
            .unwrap_err();
        assert_eq!(err.as_label(), "duplicate_handler");
        assert_eq!(registry.handlers_for("OrderPaid").unwrap().len(), 1);
    }

    #[test]
    fn unknown_event_lookup_fails() {
        let registry = SubscriptionRegistry::new();
        let err = registry.handlers_for("Nope").unwrap_err();
        assert_eq!(err.as_label(), "unknown_event");
    }

    #[test]
    fn removing_last_handler_evicts_key_and_notifies_once() {
        let registry = SubscriptionRegistry::new();
        let fired = Arc::new(Mutex::new(Vec::<String>::new()));
        {
            let fired = Arc::clone(&fired);
            registry.on_event_removed(move |key| fired.lock().push(key.to_string()));
        }

        registry
            .add_typed(EventKind::of::<OrderPaid>(), typed("receipt"))
            .unwrap();
        registry.remove_typed(EventKind::of::<OrderPaid>(), "receipt");

        assert!(!registry.has_subscriptions("OrderPaid"));
        assert!(registry.resolve_kind_by_name("OrderPaid").is_none());
        assert!(registry.is_empty());
        assert_eq!(&*fired.lock(), &["OrderPaid".to_string()]);
    }

    #[test]
    fn removing_missing_pair_is_a_noop() {
        let registry = SubscriptionRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let fired = Arc::clone(&fired);
            registry.on_event_removed(move |_| {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        registry
            .add_typed(EventKind::of::<OrderPaid>(), typed("receipt"))
            .unwrap();

        // Unknown handler on a known key, and any handler on an unknown key.
        registry.remove_typed(EventKind::of::<OrderPaid>(), "other");
        registry.remove_dynamic("Nope", "receipt");

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(registry.handlers_for("OrderPaid").unwrap().len(), 1);
    }

    #[test]
    fn typed_and_dynamic_coexist_under_one_key() {
        let registry = SubscriptionRegistry::new();
        registry
            .add_typed(EventKind::of::<OrderPaid>(), typed("receipt"))
            .unwrap();
        registry.add_dynamic("OrderPaid", dynamic("audit")).unwrap();

        let subs = registry.handlers_for("OrderPaid").unwrap();
        assert_eq!(subs.len(), 2);
        assert!(!subs[0].is_dynamic());
        assert!(subs[1].is_dynamic());

        // The typed handler leaving keeps the key alive through the dynamic
        // one, and the kind stays tracked until full eviction.
        registry.remove_typed(EventKind::of::<OrderPaid>(), "receipt");
        assert!(registry.has_subscriptions("OrderPaid"));
        assert!(registry.resolve_kind_by_name("OrderPaid").is_some());

        registry.remove_dynamic("OrderPaid", "audit");
        assert!(!registry.has_subscriptions("OrderPaid"));
        assert!(registry.resolve_kind_by_name("OrderPaid").is_none());
    }

    #[test]
    fn dynamic_only_key_tracks_no_kind() {
        let registry = SubscriptionRegistry::new();
        registry
            .add_dynamic("PriceChanged", dynamic("audit"))
            .unwrap();

        assert!(registry.has_subscriptions("PriceChanged"));
        assert!(registry.resolve_kind_by_name("PriceChanged").is_none());
    }

    #[test]
    fn subscription_order_is_insertion_order() {
        let registry = SubscriptionRegistry::new();
        registry
            .add_typed(EventKind::of::<OrderPaid>(), typed("first"))
            .unwrap();
        registry
            .add_typed(EventKind::of::<OrderPaid>(), typed("second"))
            .unwrap();
        registry.add_dynamic("OrderPaid", dynamic("third")).unwrap();

        let names: Vec<_> = registry
            .handlers_for("OrderPaid")
            .unwrap()
            .iter()
            .map(|s| s.handler())
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn clear_resets_without_notifications() {
        let registry = SubscriptionRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let fired = Arc::clone(&fired);
            registry.on_event_removed(move |_| {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        registry
            .add_typed(EventKind::of::<OrderPaid>(), typed("receipt"))
            .unwrap();
        registry.add_dynamic("PriceChanged", dynamic("audit")).unwrap();
        assert_eq!(registry.len(), 2);

        registry.clear();

        assert!(registry.is_empty());
        assert!(registry.resolve_kind_by_name("OrderPaid").is_none());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn concurrent_adds_on_one_key_lose_nothing() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let threads = 16;

        let joins: Vec<_> = (0..threads)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let name: &'static str =
                        Box::leak(format!("handler-{i}").into_boxed_str());
                    registry.add_dynamic("OrderPaid", dynamic(name)).unwrap();
                })
            })
            .collect();
        for join in joins {
            join.join().unwrap();
        }

        assert_eq!(registry.handlers_for("OrderPaid").unwrap().len(), threads);
    }

    #[test]
    fn concurrent_removals_evict_exactly_once() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let fired = Arc::clone(&fired);
            registry.on_event_removed(move |_| {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        registry.add_dynamic("OrderPaid", dynamic("audit")).unwrap();

        let joins: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.remove_dynamic("OrderPaid", "audit"))
            })
            .collect();
        for join in joins {
            join.join().unwrap();
        }

        assert!(registry.is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn observer_may_query_the_registry() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let observed_gone = Arc::new(AtomicUsize::new(0));
        {
            let registry = Arc::clone(&registry);
            let observed_gone = Arc::clone(&observed_gone);
            registry.clone().on_event_removed(move |key| {
                // State lock is released before observers run, so reads are
                // safe here.
                if !registry.has_subscriptions(key) {
                    observed_gone.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        registry.add_dynamic("OrderPaid", dynamic("audit")).unwrap();
        registry.remove_dynamic("OrderPaid", "audit");

        assert_eq!(observed_gone.load(Ordering::SeqCst), 1);
    }
}
