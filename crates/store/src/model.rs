//! Serde models for the state file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::{IconStatus, ItemKind, TrackableItem};

/// A supervisor-managed process entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub name: String,
    pub port: Option<u16>,
    /// Whether the port probe classified this process as serving an HTML GUI.
    pub is_html: bool,
    /// Cleared when the process vanishes from a supervisor scan.
    pub visible: bool,
    pub icon_path: Option<PathBuf>,
    pub icon_status: IconStatus,
    pub last_seen: Option<DateTime<Utc>>,
    pub workdir: Option<PathBuf>,
    pub description: Option<String>,
    /// Registered with the supervisor but not currently running.
    pub is_dead: bool,
}

impl ProcessRecord {
    /// A fresh record with defaults matching a never-seen process.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            port: None,
            is_html: false,
            visible: true,
            icon_path: None,
            icon_status: IconStatus::Pending,
            last_seen: None,
            workdir: None,
            description: None,
            is_dead: false,
        }
    }
}

/// A manually registered website entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteRecord {
    pub name: String,
    pub url: String,
    pub visible: bool,
    pub icon_path: Option<PathBuf>,
    pub icon_status: IconStatus,
    pub description: Option<String>,
}

impl WebsiteRecord {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            visible: true,
            icon_path: None,
            icon_status: IconStatus::Pending,
            description: None,
        }
    }
}

/// Partial update for a process entry. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProcessPatch {
    pub port: Option<u16>,
    pub is_html: Option<bool>,
    pub visible: Option<bool>,
    pub icon_path: Option<PathBuf>,
    pub icon_status: Option<IconStatus>,
    pub workdir: Option<PathBuf>,
    pub description: Option<String>,
    pub is_dead: Option<bool>,
}

/// Partial update for a website entry. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct WebsitePatch {
    pub url: Option<String>,
    pub visible: Option<bool>,
    pub icon_path: Option<PathBuf>,
    pub icon_status: Option<IconStatus>,
    pub description: Option<String>,
}

/// On-disk shape of `state.json`.
///
/// Unknown top-level keys are dropped on rewrite; missing maps default
/// to empty so hand-edited or older files still load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub processes: BTreeMap<String, ProcessRecord>,
    #[serde(default)]
    pub websites: BTreeMap<String, WebsiteRecord>,
    #[serde(default)]
    pub last_scan: Option<DateTime<Utc>>,
}

/// Read-only view of one dashboard item, process or website.
#[derive(Debug, Clone, Serialize)]
pub struct ItemSnapshot {
    pub name: String,
    pub kind: ItemKind,
    pub port: Option<u16>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub icon_status: IconStatus,
    pub icon_path: Option<PathBuf>,
    pub is_dead: bool,
}

impl From<&ProcessRecord> for ItemSnapshot {
    fn from(p: &ProcessRecord) -> Self {
        Self {
            name: p.name.clone(),
            kind: ItemKind::Process,
            port: p.port,
            url: None,
            description: p.description.clone(),
            icon_status: p.icon_status,
            icon_path: p.icon_path.clone(),
            is_dead: p.is_dead,
        }
    }
}

impl From<&WebsiteRecord> for ItemSnapshot {
    fn from(w: &WebsiteRecord) -> Self {
        Self {
            name: w.name.clone(),
            kind: ItemKind::Website,
            port: None,
            url: Some(w.url.clone()),
            description: w.description.clone(),
            icon_status: w.icon_status,
            icon_path: w.icon_path.clone(),
            is_dead: false,
        }
    }
}

impl From<&ProcessRecord> for TrackableItem {
    fn from(p: &ProcessRecord) -> Self {
        Self {
            name: p.name.clone(),
            kind: ItemKind::Process,
            port: p.port,
            url: None,
            workdir: p.workdir.clone(),
            description: p.description.clone(),
        }
    }
}

impl From<&WebsiteRecord> for TrackableItem {
    fn from(w: &WebsiteRecord) -> Self {
        Self {
            name: w.name.clone(),
            kind: ItemKind::Website,
            port: None,
            url: Some(w.url.clone()),
            workdir: None,
            description: w.description.clone(),
        }
    }
}
