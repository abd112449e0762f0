//! Tessera event bus.
//!
//! Building blocks for in-process change notification:
//!
//! - [`EventBus`] -- publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, with a monotonic change version counter
//!   that dashboard clients poll to detect updates.
//! - [`DashboardEvent`] -- the canonical event envelope.

pub mod bus;

pub use bus::{DashboardEvent, EventBus};
