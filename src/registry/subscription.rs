//! One registered interest in an event key.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::DispatchError;
use crate::events::Envelope;

/// Erased invoker built at subscribe time.
///
/// Downcasts the resolved handler instance to the concrete type the
/// subscription was created for and runs it against the envelope (decoding
/// the payload first for typed subscriptions).
pub(crate) type InvokeFn = Arc<
    dyn Fn(Arc<dyn Any + Send + Sync>, Arc<Envelope>) -> BoxFuture<'static, Result<(), DispatchError>>
        + Send
        + Sync,
>;

/// Variant tag of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionKind {
    /// Bound to a concrete event kind; payload is decoded before handling.
    Typed,
    /// Bound to a raw event name; payload is passed through un-decoded.
    Dynamic,
}

/// One registered interest: a handler identity, its variant tag, and the
/// erased invoker the bus runs at dispatch time.
///
/// Handler identities are unique within one event key's subscription list.
/// Cloning is cheap (the invoker is shared).
#[derive(Clone)]
pub struct SubscriptionInfo {
    handler: &'static str,
    kind: SubscriptionKind,
    invoke: InvokeFn,
}

impl SubscriptionInfo {
    pub(crate) fn typed(handler: &'static str, invoke: InvokeFn) -> Self {
        Self {
            handler,
            kind: SubscriptionKind::Typed,
            invoke,
        }
    }

    pub(crate) fn dynamic(handler: &'static str, invoke: InvokeFn) -> Self {
        Self {
            handler,
            kind: SubscriptionKind::Dynamic,
            invoke,
        }
    }

    /// Identity of the subscribed handler type.
    #[inline]
    pub fn handler(&self) -> &'static str {
        self.handler
    }

    /// Variant tag of this subscription.
    #[inline]
    pub fn kind(&self) -> SubscriptionKind {
        self.kind
    }

    /// Returns true for dynamic (raw-name) subscriptions.
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, SubscriptionKind::Dynamic)
    }

    /// Runs the subscription against a resolved handler instance.
    pub(crate) fn dispatch(
        &self,
        instance: Arc<dyn Any + Send + Sync>,
        envelope: Arc<Envelope>,
    ) -> BoxFuture<'static, Result<(), DispatchError>> {
        (self.invoke)(instance, envelope)
    }
}

impl fmt::Debug for SubscriptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionInfo")
            .field("handler", &self.handler)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
