//! Core dashboard entity types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What kind of tile an item renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A supervisor-managed process serving an HTML GUI on a local port.
    Process,
    /// A manually registered external website.
    Website,
}

/// Informational icon generation status stored per item.
///
/// This is a progress indicator only. Whether an icon can actually be
/// served is decided by probing the artifact store for the final image
/// (`Cascade::has_icon`), never by this flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconStatus {
    /// No generation attempted yet.
    #[default]
    Pending,
    /// An image-producing stage is currently running.
    Generating,
    /// The last attempt failed; a future enqueue will retry.
    Failed,
    /// The final icon has been published.
    Ready,
}

/// A process or website shown on the dashboard.
///
/// Identity is the (case-sensitive) name. The optional fields supply the
/// context the cascade engine needs to build a text prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackableItem {
    pub name: String,
    pub kind: ItemKind,
    /// Local port the process serves on (processes only).
    pub port: Option<u16>,
    /// External URL (websites only).
    pub url: Option<String>,
    /// Working directory of the process, used to locate a README.
    pub workdir: Option<PathBuf>,
    /// Human-readable description, mirrored from the generated summary.
    pub description: Option<String>,
}

impl TrackableItem {
    /// A process item with just a name and port.
    pub fn process(name: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Process,
            port,
            url: None,
            workdir: None,
            description: None,
        }
    }

    /// A website item with a name and URL.
    pub fn website(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Website,
            port: None,
            url: Some(url.into()),
            workdir: None,
            description: None,
        }
    }
}
