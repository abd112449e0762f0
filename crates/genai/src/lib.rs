//! Content generator clients.
//!
//! The icon pipeline needs two external capabilities: text completion
//! (summaries, icon descriptions) and image work (synthesis, background
//! removal). Both are blocking, possibly slow, possibly failing external
//! CLI calls; this crate wraps them behind the [`TextGenerator`] and
//! [`ImageSynthesizer`] traits so the pipeline can be driven by fakes in
//! tests.

pub mod generator;
pub mod image;
pub mod prompts;
pub mod subprocess;
pub mod text;

pub use generator::{GenError, ImageSynthesizer, TextGenerator};
pub use image::CliImageTool;
pub use text::CliTextGenerator;
