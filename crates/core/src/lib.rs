//! Shared domain types, errors, and validation for the tessera dashboard.
//!
//! This crate has no internal dependencies; everything else in the
//! workspace builds on top of it.

pub mod error;
pub mod naming;
pub mod types;

pub use error::CoreError;
pub use types::{IconStatus, ItemKind, TrackableItem};
