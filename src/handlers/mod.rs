//! Handler contracts and resolution.
//!
//! ## Contents
//! - [`IntegrationEventHandler`], [`DynamicIntegrationEventHandler`] — the
//!   two handler shapes (typed and raw-payload)
//! - [`HandlerName`] — stable handler identity used as the registry key
//! - [`ResolveHandlers`], [`HandlerMap`] — the service-locator seam the bus
//!   uses to obtain live instances at dispatch time

mod handler;
mod locator;

pub use handler::{DynamicIntegrationEventHandler, HandlerName, IntegrationEventHandler};
pub use locator::{HandlerMap, ResolveHandlers};
