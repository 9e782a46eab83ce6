//! Error types used by the subscription registry and the dispatch façade.
//!
//! This module defines three error types:
//!
//! - [`SubscriptionError`] — registry contract violations (duplicate handler,
//!   lookup of an unregistered event key).
//! - [`DispatchError`] — failures local to one handler invocation during
//!   dispatch (resolution, payload decoding, handler execution).
//! - [`HandlerError`] — the opaque error returned by handler implementations.
//!
//! Registry violations are programmer errors and surface at the call site.
//! Dispatch failures are operational: the bus logs them per handler and keeps
//! delivering to the remaining subscriptions. The enums provide `as_label`
//! (stable snake_case tag) and `as_message` helpers for logs and metrics.

use thiserror::Error;

/// # Errors produced by the subscription registry.
///
/// Both variants represent misuse of the registration contract rather than
/// runtime faults; neither is retried automatically.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SubscriptionError {
    /// The exact (event key, handler) pair is already registered.
    #[error("handler '{handler}' already registered for '{event}'")]
    DuplicateHandler {
        /// Event key the registration targeted.
        event: String,
        /// Identity of the handler type that was already present.
        handler: &'static str,
    },

    /// The event key has no registry entry.
    ///
    /// Callers either guard with
    /// [`has_subscriptions`](crate::SubscriptionRegistry::has_subscriptions)
    /// first or treat this as "zero handlers" (the dispatch façade does the
    /// latter).
    #[error("no subscriptions registered for '{event}'")]
    UnknownEvent {
        /// Event key that was looked up.
        event: String,
    },
}

impl SubscriptionError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::SubscriptionError;
    ///
    /// let err = SubscriptionError::UnknownEvent { event: "OrderPaid".into() };
    /// assert_eq!(err.as_label(), "unknown_event");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SubscriptionError::DuplicateHandler { .. } => "duplicate_handler",
            SubscriptionError::UnknownEvent { .. } => "unknown_event",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SubscriptionError::DuplicateHandler { event, handler } => {
                format!("duplicate handler {handler} for event {event}")
            }
            SubscriptionError::UnknownEvent { event } => {
                format!("unknown event {event}")
            }
        }
    }
}

/// # Errors produced by a single handler invocation during dispatch.
///
/// Each variant is scoped to one subscription. The bus never propagates these
/// to the publisher's caller; they are logged and counted in the
/// [`DispatchOutcome`](crate::DispatchOutcome). The one exception is
/// [`DispatchError::Encode`], which is raised before dispatch starts and is
/// returned from `publish` directly.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The event value could not be serialized into an envelope payload.
    #[error("failed to encode '{event}': {source}")]
    Encode {
        /// Event key of the kind being published.
        event: &'static str,
        /// Underlying serialization error.
        source: serde_json::Error,
    },

    /// The envelope payload could not be decoded into the concrete event kind.
    #[error("failed to decode payload for '{event}': {source}")]
    Decode {
        /// Event key from the envelope.
        event: String,
        /// Underlying deserialization error.
        source: serde_json::Error,
    },

    /// The resolution collaborator returned no instance for the handler.
    #[error("handler '{handler}' could not be resolved")]
    Unresolved {
        /// Identity of the missing handler type.
        handler: &'static str,
    },

    /// The resolution collaborator returned an instance of a different type.
    #[error("handler '{handler}' resolved to an unexpected type")]
    Mismatch {
        /// Identity of the handler type the subscription expected.
        handler: &'static str,
    },

    /// The handler ran and returned an error.
    #[error("handler '{handler}' failed: {source}")]
    Handler {
        /// Identity of the failing handler type.
        handler: &'static str,
        /// Error returned by the handler implementation.
        source: HandlerError,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::DispatchError;
    ///
    /// let err = DispatchError::Unresolved { handler: "send-receipt" };
    /// assert_eq!(err.as_label(), "handler_unresolved");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Encode { .. } => "event_encode",
            DispatchError::Decode { .. } => "payload_decode",
            DispatchError::Unresolved { .. } => "handler_unresolved",
            DispatchError::Mismatch { .. } => "handler_mismatch",
            DispatchError::Handler { .. } => "handler_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::Encode { event, source } => format!("encode {event}: {source}"),
            DispatchError::Decode { event, source } => format!("decode {event}: {source}"),
            DispatchError::Unresolved { handler } => format!("unresolved handler {handler}"),
            DispatchError::Mismatch { handler } => format!("mismatched handler {handler}"),
            DispatchError::Handler { handler, source } => format!("handler {handler}: {source}"),
        }
    }
}

/// Error returned by event handler implementations.
///
/// Carries only a message. The bus logs it and counts the invocation as
/// failed; handlers flatten whatever error they hit into the message.
///
/// # Example
/// ```
/// use eventvisor::HandlerError;
///
/// let err = HandlerError::new("smtp connection refused");
/// assert_eq!(err.message(), "smtp connection refused");
/// ```
#[derive(Error, Debug)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Creates a new handler error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
