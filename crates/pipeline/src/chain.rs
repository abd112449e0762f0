//! Artifact chain paths and staleness probing.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Canonical artifact paths for one (sanitized) item name.
///
/// Text artifacts live next to the state file; images live in the icons
/// directory so the serving layer can expose them statically.
#[derive(Debug, Clone)]
pub struct IconPaths {
    summary: PathBuf,
    icon_prompt: PathBuf,
    raster: PathBuf,
    final_png: PathBuf,
}

impl IconPaths {
    /// Build the path family for `key`, which must already be a
    /// sanitized filesystem-safe token.
    pub fn new(data_dir: &Path, icons_dir: &Path, key: &str) -> Self {
        Self {
            summary: data_dir.join(format!("{key}_summary.txt")),
            icon_prompt: data_dir.join(format!("{key}_icon_prompt.txt")),
            raster: icons_dir.join(format!("{key}.jpg")),
            final_png: icons_dir.join(format!("{key}.png")),
        }
    }

    /// Stage 1: generated app summary text.
    pub fn summary(&self) -> &Path {
        &self.summary
    }

    /// Stage 2: full image prompt text.
    pub fn icon_prompt(&self) -> &Path {
        &self.icon_prompt
    }

    /// Stage 3: intermediate raster with flat background.
    pub fn raster(&self) -> &Path {
        &self.raster
    }

    /// Stage 4: final background-removed icon.
    pub fn final_png(&self) -> &Path {
        &self.final_png
    }
}

/// Modification time of a path, `None` when it does not exist.
fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Timestamp staleness check: `target` must be regenerated when it is
/// missing, or when `upstream` has a strictly newer modification time.
/// A missing upstream never marks an existing target stale.
pub fn is_stale(target: &Path, upstream: &Path) -> bool {
    let Some(target_mtime) = mtime(target) else {
        return true;
    };
    let Some(upstream_mtime) = mtime(upstream) else {
        return false;
    };
    upstream_mtime > target_mtime
}

/// Probed state of the whole chain, recomputed from the filesystem on
/// every cascade entry.
#[derive(Debug, Clone, Copy)]
pub struct ChainStatus {
    pub summary_present: bool,
    pub prompt_stale: bool,
    pub raster_stale: bool,
    pub final_stale: bool,
}

impl ChainStatus {
    pub fn probe(paths: &IconPaths) -> Self {
        Self {
            summary_present: paths.summary().exists(),
            prompt_stale: is_stale(paths.icon_prompt(), paths.summary()),
            raster_stale: is_stale(paths.raster(), paths.icon_prompt()),
            final_stale: is_stale(paths.final_png(), paths.raster()),
        }
    }

    /// Whether a cascade run would generate anything.
    pub fn needs_generation(&self) -> bool {
        !self.summary_present || self.prompt_stale || self.raster_stale || self.final_stale
    }
}
