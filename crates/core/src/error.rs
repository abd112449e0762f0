//! Domain-level error type shared across the workspace.

/// Domain errors produced by core validation and entity lookups.
///
/// HTTP mapping lives in the api crate's `AppError`; this type stays
/// transport-agnostic.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A named entity does not exist.
    #[error("{entity} '{name}' not found")]
    NotFound {
        /// Entity kind, e.g. `"process"` or `"website"`.
        entity: &'static str,
        /// The name that failed to resolve.
        name: String,
    },

    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// An unexpected internal failure.
    #[error("{0}")]
    Internal(String),
}
