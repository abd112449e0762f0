//! Generator trait seams and the shared error type.

use std::path::Path;

use async_trait::async_trait;

/// Errors from an external generator call.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// The tool binary could not be spawned (missing, not executable).
    #[error("failed to spawn generator: {0}")]
    Spawn(std::io::Error),

    /// The tool ran past its timeout and was killed.
    #[error("generator timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// The tool exited non-zero.
    #[error("generator exited with status {status}: {stderr}")]
    Failed { status: i32, stderr: String },

    /// The tool exited successfully but produced unusable output
    /// (empty text, missing or undecodable image file).
    #[error("generator produced unusable output: {0}")]
    UnusableOutput(String),
}

/// Text completion: prompt in, plain text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenError>;
}

/// Image synthesis and background removal.
///
/// Both methods write to a caller-chosen `output` path. Callers must
/// respect the tool's file-extension conventions and always pass a
/// uniquely named path; the synthesis tool refuses to overwrite
/// existing files.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Render a raster image from a textual prompt.
    async fn generate(&self, prompt: &str, output: &Path) -> Result<(), GenError>;

    /// Strip the background from `input`, writing the result to `output`.
    async fn remove_background(&self, input: &Path, output: &Path) -> Result<(), GenError>;
}
