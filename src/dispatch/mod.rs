//! Dispatch façade: the publish/subscribe surface of the crate.
//!
//! ## Contents
//! - [`EventBus`] — subscribe/unsubscribe (typed and dynamic), publish, and
//!   the transport-facing `dispatch` entry point
//! - [`DispatchOutcome`] — per-publication delivery accounting

mod bus;
mod outcome;

pub use bus::EventBus;
pub use outcome::DispatchOutcome;
