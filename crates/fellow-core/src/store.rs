//! Knowledge-store document I/O.
//!
//! The merge contract distinguishes three failure shapes when reading
//! persisted documents:
//!
//! - a **missing existing document** is a missing prerequisite
//!   ([`FellowError::KnowledgeMissing`]);
//! - an **unparseable existing document** is corruption
//!   ([`FellowError::KnowledgeParse`]) and is fatal to the pass; a
//!   best-effort merge over corrupt data is never attempted;
//! - a **missing mandatory delta** means the extractor has not run
//!   ([`FellowError::DeltaMissing`]), which is distinct from "no changes".
//!
//! Writes are whole-document and atomic: the document is serialized in
//! full, written to a sibling temp file, and renamed into place. A crash
//! can therefore never leave a partially-written document.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::constants::{
    CONCEPTUAL_DELTA_FILENAME, FACTUAL_DELTA_FILENAME, PROCEDURAL_DELTA_FILENAME,
};
use crate::errors::FellowError;

// ============================================================================
// Loading
// ============================================================================

/// Load an existing knowledge document.
///
/// # Errors
///
/// [`FellowError::KnowledgeMissing`] if the document does not exist,
/// [`FellowError::KnowledgeParse`] if it exists but cannot be parsed.
pub fn load_knowledge<T: DeserializeOwned>(path: &Path) -> Result<T, FellowError> {
    if !path.exists() {
        return Err(FellowError::KnowledgeMissing {
            path: path.to_path_buf(),
        });
    }

    let data = fs::read_to_string(path).map_err(|e| FellowError::StoreIo {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&data).map_err(|e| FellowError::KnowledgeParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a mandatory delta document.
///
/// # Errors
///
/// [`FellowError::DeltaMissing`] if the document does not exist,
/// [`FellowError::DeltaParse`] if it exists but cannot be parsed.
pub fn load_required_delta<T: DeserializeOwned>(path: &Path) -> Result<T, FellowError> {
    if !path.exists() {
        return Err(FellowError::DeltaMissing {
            path: path.to_path_buf(),
        });
    }

    read_delta(path)
}

/// Load an optional delta document.
///
/// Absence is a meaningful signal (e.g. "no architectural change") and
/// returns `Ok(None)`. A present but unparseable document is still an
/// error: the extractor flagged a change and produced garbage, and
/// silently dropping that signal would lose the update.
pub fn load_optional_delta<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, FellowError> {
    if !path.exists() {
        return Ok(None);
    }

    read_delta(path).map(Some)
}

fn read_delta<T: DeserializeOwned>(path: &Path) -> Result<T, FellowError> {
    let data = fs::read_to_string(path).map_err(|e| FellowError::StoreIo {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&data).map_err(|e| FellowError::DeltaParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

// ============================================================================
// Writing
// ============================================================================

/// Write a document as a single atomic whole-document replacement.
///
/// Serializes the full document, writes it to a sibling `<name>.tmp` file,
/// and renames it over the target. Parent directories are created as
/// needed.
pub fn save_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), FellowError> {
    let data = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| FellowError::StoreIo {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FellowError::StoreIo {
            path: path.to_path_buf(),
            message: "path has no file name".to_string(),
        })?;
    let tmp_path = path.with_file_name(format!("{}.tmp", file_name));

    fs::write(&tmp_path, data).map_err(|e| FellowError::StoreIo {
        path: tmp_path.clone(),
        message: e.to_string(),
    })?;

    fs::rename(&tmp_path, path).map_err(|e| FellowError::StoreIo {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Remove the delta documents after a successful merge.
///
/// Absent files are ignored: a crash between writing the merged documents
/// and this cleanup leaves stale deltas behind, and the next pass treats
/// them as reusable input rather than an error.
pub fn remove_delta_documents(semantic_dir: &Path) -> Result<(), FellowError> {
    for filename in [
        FACTUAL_DELTA_FILENAME,
        PROCEDURAL_DELTA_FILENAME,
        CONCEPTUAL_DELTA_FILENAME,
    ] {
        let path = semantic_dir.join(filename);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(FellowError::StoreIo {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Check whether any delta document is present.
pub fn has_pending_deltas(semantic_dir: &Path) -> bool {
    [
        FACTUAL_DELTA_FILENAME,
        PROCEDURAL_DELTA_FILENAME,
        CONCEPTUAL_DELTA_FILENAME,
    ]
    .iter()
    .any(|filename| semantic_dir.join(filename).exists())
}

// ============================================================================
// Tests
// ============================================================================
