//! Stage-tagged pipeline errors.

use std::fmt;

use tessera_core::CoreError;
use tessera_genai::GenError;
use tessera_store::StoreError;

/// One stage of the artifact chain, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summary,
    Prompt,
    Raster,
    Final,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Summary => "summary",
            Stage::Prompt => "prompt",
            Stage::Raster => "raster",
            Stage::Final => "final",
        };
        f.write_str(s)
    }
}

/// Error from one cascade invocation.
///
/// The first failing stage aborts the remaining stages; previously
/// published artifacts are left untouched and the item stays eligible
/// for a future attempt.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The item cannot be resolved to enough context to build a prompt.
    #[error("no context to build a prompt: {0}")]
    NotFound(String),

    /// The item name failed sanitization.
    #[error(transparent)]
    InvalidName(#[from] CoreError),

    /// An external generator call failed or produced unusable output.
    #[error("{stage} generation failed: {source}")]
    Generator {
        stage: Stage,
        #[source]
        source: GenError,
    },

    /// Reading an upstream artifact failed.
    #[error("failed to read {stage} stage input: {source}")]
    Read {
        stage: Stage,
        #[source]
        source: std::io::Error,
    },

    /// Writing or renaming an artifact failed (disk full, permissions).
    #[error("failed to publish {stage} artifact: {source}")]
    Publish {
        stage: Stage,
        #[source]
        source: std::io::Error,
    },

    /// Persisting item state failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// The stage the error is tagged with, when there is one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Generator { stage, .. }
            | PipelineError::Read { stage, .. }
            | PipelineError::Publish { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
