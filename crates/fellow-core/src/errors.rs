//! Error types for fellow-core.

use std::path::PathBuf;

use thiserror::Error;

/// Domain-specific errors for Fellow operations.
#[derive(Error, Debug)]
pub enum FellowError {
    /// No extraction metadata exists for the store.
    ///
    /// This is a missing-prerequisite condition, not corruption: it means
    /// no prior synchronization point exists and a full extraction is
    /// required.
    #[error("No extraction metadata found. A full extraction is required before incremental sync.")]
    MetadataMissing,

    /// A path or file was not found.
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// An invalid path was provided (e.g., disk root, system directory).
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A git query failed or git is unavailable.
    ///
    /// Always recoverable: callers degrade to fingerprint comparison.
    #[error("Git unavailable: {reason}")]
    GitUnavailable {
        /// Description of the failure.
        reason: String,
    },

    /// A required knowledge document is missing.
    #[error("Knowledge document missing at `{path}`.")]
    KnowledgeMissing {
        /// Path to the missing document.
        path: PathBuf,
    },

    /// An existing knowledge document is present but unparseable.
    ///
    /// Fatal to a merge pass: merging over corrupt data is never attempted.
    #[error("Knowledge document corrupt at `{path}`: {message}")]
    KnowledgeParse {
        /// Path to the corrupt document.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// A mandatory delta document is missing.
    #[error("Delta document missing at `{path}`. Run the extractor for the changed files first.")]
    DeltaMissing {
        /// Path to the missing delta.
        path: PathBuf,
    },

    /// A delta document is present but unparseable.
    #[error("Delta document unparseable at `{path}`: {message}")]
    DeltaParse {
        /// Path to the delta document.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Store I/O error while reading or writing a persisted document.
    #[error("Store I/O error at `{path}`: {message}")]
    StoreIo {
        /// Path to the document.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A wrapped generic error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
