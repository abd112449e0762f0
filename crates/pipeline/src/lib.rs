//! The icon generation pipeline.
//!
//! Every dashboard item derives a chain of four artifacts:
//!
//! ```text
//! summary (.txt) → icon prompt (.txt) → raster (.jpg) → final icon (.png)
//! ```
//!
//! The [`Cascade`] engine probes the chain on every entry (existence +
//! mtime, never cached) and regenerates missing or stale stages in
//! order. Once any stage runs, everything downstream of it is
//! regenerated unconditionally, so the chain never ends up half-new.
//! Each artifact
//! is published atomically (unique temp file, then rename), so a reader
//! of a canonical path always sees a complete old or new file.
//!
//! To regenerate an icon by hand: delete the prompt file. The next
//! cascade rebuilds the prompt, raster, and final icon but keeps the
//! summary.

pub mod cascade;
pub mod chain;
pub mod context;
pub mod error;
pub mod publish;

pub use cascade::{Cascade, CascadeOutcome};
pub use chain::{ChainStatus, IconPaths};
pub use error::{PipelineError, Stage};
