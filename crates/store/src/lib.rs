//! JSON-file state store for the tessera dashboard.
//!
//! Tracks supervisor-managed processes and manually registered websites
//! in a single `state.json` under the data directory, alongside the
//! artifact directories the icon pipeline writes into:
//!
//! ```text
//! {data_dir}/
//!   state.json            item records + last scan timestamp
//!   {name}_summary.txt    text artifacts (written by the pipeline)
//!   {name}_icon_prompt.txt
//!   icons/                raster + final icons, served statically
//! ```
//!
//! The store keeps the authoritative copy in memory behind a `RwLock`
//! and writes through to disk on every mutation with a temp-file +
//! rename so a crash never leaves a truncated state file.

pub mod model;
pub mod store;

pub use model::{
    ItemSnapshot, ProcessPatch, ProcessRecord, StateFile, WebsitePatch, WebsiteRecord,
};
pub use store::{StateStore, StoreError};
