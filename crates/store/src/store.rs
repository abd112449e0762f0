//! The [`StateStore`]: async, write-through JSON state.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tessera_core::TrackableItem;
use tokio::sync::RwLock;

use crate::model::{
    ItemSnapshot, ProcessPatch, ProcessRecord, StateFile, WebsitePatch, WebsiteRecord,
};

/// Errors from loading or persisting the state file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Owned state store with lifecycle tied to service start.
///
/// Injected into handlers and background tasks as `Arc<StateStore>`;
/// never accessed as ambient global state. All reads come from the
/// in-memory copy; every mutation is written through to `state.json`
/// atomically (temp file + rename).
pub struct StateStore {
    data_dir: PathBuf,
    icons_dir: PathBuf,
    state_path: PathBuf,
    inner: RwLock<StateFile>,
}

impl StateStore {
    /// Open (or initialize) the store under `data_dir`.
    ///
    /// Creates `data_dir` and `data_dir/icons` if missing and loads
    /// `state.json` when present.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        let icons_dir = data_dir.join("icons");
        tokio::fs::create_dir_all(&icons_dir).await?;

        let state_path = data_dir.join("state.json");
        let state = match tokio::fs::read(&state_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StateFile::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            data_dir,
            icons_dir,
            state_path,
            inner: RwLock::new(state),
        })
    }

    /// Directory holding `state.json` and the text artifacts.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding raster and final icons (served statically).
    pub fn icons_dir(&self) -> &Path {
        &self.icons_dir
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    pub async fn get_process(&self, name: &str) -> Option<ProcessRecord> {
        self.inner.read().await.processes.get(name).cloned()
    }

    pub async fn get_website(&self, name: &str) -> Option<WebsiteRecord> {
        self.inner.read().await.websites.get(name).cloned()
    }

    pub async fn list_websites(&self) -> Vec<WebsiteRecord> {
        self.inner.read().await.websites.values().cloned().collect()
    }

    /// Visible processes that were classified as serving an HTML GUI.
    pub async fn visible_html_processes(&self) -> Vec<ProcessRecord> {
        self.inner
            .read()
            .await
            .processes
            .values()
            .filter(|p| p.visible && p.is_html)
            .cloned()
            .collect()
    }

    /// All items the dashboard renders: visible HTML processes plus
    /// visible websites, sorted case-insensitively by name.
    pub async fn all_visible_items(&self) -> Vec<ItemSnapshot> {
        let state = self.inner.read().await;
        let mut items: Vec<ItemSnapshot> = state
            .processes
            .values()
            .filter(|p| p.visible && p.is_html)
            .map(ItemSnapshot::from)
            .chain(
                state
                    .websites
                    .values()
                    .filter(|w| w.visible)
                    .map(ItemSnapshot::from),
            )
            .collect();
        items.sort_by_key(|i| i.name.to_lowercase());
        items
    }

    /// Resolve a name to a [`TrackableItem`], processes first.
    ///
    /// This is what the worker uses to rebuild prompt context when a
    /// queue entry is dequeued.
    pub async fn resolve_item(&self, name: &str) -> Option<TrackableItem> {
        let state = self.inner.read().await;
        if let Some(p) = state.processes.get(name) {
            return Some(p.into());
        }
        state.websites.get(name).map(|w| w.into())
    }

    pub async fn last_scan(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_scan
    }

    // -----------------------------------------------------------------
    // Mutations (write-through)
    // -----------------------------------------------------------------

    /// Update or create a process entry, bumping `last_seen`.
    pub async fn upsert_process(
        &self,
        name: &str,
        patch: ProcessPatch,
    ) -> Result<ProcessRecord, StoreError> {
        let mut state = self.inner.write().await;
        let record = state
            .processes
            .entry(name.to_string())
            .or_insert_with(|| ProcessRecord::new(name));

        if let Some(port) = patch.port {
            record.port = Some(port);
        }
        if let Some(is_html) = patch.is_html {
            record.is_html = is_html;
        }
        if let Some(visible) = patch.visible {
            record.visible = visible;
        }
        if let Some(icon_path) = patch.icon_path {
            record.icon_path = Some(icon_path);
        }
        if let Some(icon_status) = patch.icon_status {
            record.icon_status = icon_status;
        }
        if let Some(workdir) = patch.workdir {
            record.workdir = Some(workdir);
        }
        if let Some(description) = patch.description {
            record.description = Some(description);
        }
        if let Some(is_dead) = patch.is_dead {
            record.is_dead = is_dead;
        }
        record.last_seen = Some(Utc::now());

        let updated = record.clone();
        self.persist(&state).await?;
        Ok(updated)
    }

    /// Mark a process invisible (vanished from the supervisor scan).
    pub async fn mark_invisible(&self, name: &str) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        if let Some(record) = state.processes.get_mut(name) {
            record.visible = false;
            self.persist(&state).await?;
        }
        Ok(())
    }

    /// Mark a process dead (registered but not running).
    pub async fn mark_dead(&self, name: &str) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        if let Some(record) = state.processes.get_mut(name) {
            record.is_dead = true;
            self.persist(&state).await?;
        }
        Ok(())
    }

    /// Add (or replace) a manual website entry.
    pub async fn add_website(
        &self,
        name: &str,
        url: &str,
    ) -> Result<WebsiteRecord, StoreError> {
        let mut state = self.inner.write().await;
        let record = WebsiteRecord::new(name, url);
        state.websites.insert(name.to_string(), record.clone());
        self.persist(&state).await?;
        Ok(record)
    }

    /// Remove a manual website entry. Returns whether it existed.
    pub async fn remove_website(&self, name: &str) -> Result<bool, StoreError> {
        let mut state = self.inner.write().await;
        let existed = state.websites.remove(name).is_some();
        if existed {
            self.persist(&state).await?;
        }
        Ok(existed)
    }

    /// Apply a partial update to a website entry. No-op when the name is
    /// unknown; returns whether an entry was updated.
    pub async fn update_website(
        &self,
        name: &str,
        patch: WebsitePatch,
    ) -> Result<bool, StoreError> {
        let mut state = self.inner.write().await;
        let Some(record) = state.websites.get_mut(name) else {
            return Ok(false);
        };

        if let Some(url) = patch.url {
            record.url = url;
        }
        if let Some(visible) = patch.visible {
            record.visible = visible;
        }
        if let Some(icon_path) = patch.icon_path {
            record.icon_path = Some(icon_path);
        }
        if let Some(icon_status) = patch.icon_status {
            record.icon_status = icon_status;
        }
        if let Some(description) = patch.description {
            record.description = Some(description);
        }

        self.persist(&state).await?;
        Ok(true)
    }

    /// Stamp `last_scan` with the current time.
    pub async fn set_last_scan(&self) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        state.last_scan = Some(Utc::now());
        self.persist(&state).await
    }

    // -----------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------

    /// Write the state file atomically: serialize to a uniquely named
    /// temp file in the same directory, then rename over `state.json`.
    async fn persist(&self, state: &StateFile) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self
            .data_dir
            .join(format!(".state.{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.state_path).await?;
        tracing::debug!(
            processes = state.processes.len(),
            websites = state.websites.len(),
            bytes = json.len(),
            "state file written"
        );
        Ok(())
    }
}
