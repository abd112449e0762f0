//! Atomic artifact publishing.
//!
//! Every artifact write follows the same pattern: write to a uniquely
//! named temp file in the destination directory, then a single rename
//! over the canonical path. Same-directory temp files keep the rename on
//! one filesystem, which is what makes it atomic; the unique name also
//! satisfies tools that refuse to overwrite their output path.

use std::path::{Path, PathBuf};

/// Build a unique sibling temp path for `canonical` with the extension
/// the producing tool requires, e.g. `app.jpg` → `app.{uuid}.tmp.jpg`.
pub fn unique_tmp_path(canonical: &Path, ext: &str) -> PathBuf {
    let stem = canonical
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    canonical.with_file_name(format!("{stem}.{}.tmp.{ext}", uuid::Uuid::new_v4()))
}

/// Atomically publish text to `canonical`.
pub async fn write_text(canonical: &Path, contents: &str) -> std::io::Result<()> {
    let tmp = unique_tmp_path(canonical, "txt");
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, canonical).await
}

/// Publish a fully written temp file over its canonical path.
pub async fn publish_file(tmp: &Path, canonical: &Path) -> std::io::Result<()> {
    tokio::fs::rename(tmp, canonical).await
}

/// Best-effort removal of a temp file after a failed stage.
pub async fn discard(tmp: &Path) {
    if let Err(err) = tokio::fs::remove_file(tmp).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!(path = %tmp.display(), error = %err, "failed to remove temp file");
        }
    }
}
