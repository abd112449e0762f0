//! Discovery of dashboard candidates.
//!
//! Two concerns live here:
//!
//! - [`ps`] -- shelling out to the external process supervisor CLI and
//!   parsing its tabular `ps` output into [`ScannedProcess`] rows.
//! - [`probe`] -- classifying a local port as serving an HTML GUI, and
//!   fetching a homepage excerpt for prompt context.

pub mod probe;
pub mod ps;

pub use probe::{fetch_homepage, looks_like_html, probe_is_html, probe_ports};
pub use ps::{ScanError, ScannedProcess, SupervisorCli};
