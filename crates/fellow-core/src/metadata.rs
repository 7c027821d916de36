//! Persisted extraction metadata.
//!
//! Exactly one metadata document exists per knowledge store. It is the
//! sole source of truth for "what has already been seen": the per-file
//! registry of content fingerprints, the last known commit, and the
//! extraction timestamps. It is read at the start of a detection pass and
//! rewritten as a whole only after a merge commits successfully, never
//! field by field.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::changes::ChangeSet;
use crate::constants::EXTRACTION_METADATA_FILENAME;
use crate::errors::FellowError;
use crate::fingerprint::{fingerprint_file, Fingerprint};
use crate::store::save_json_atomic;

// ============================================================================
// FileRecord
// ============================================================================

/// One entry in the per-file registry.
///
/// Created when a path is first analyzed, updated whenever the path is
/// re-analyzed, and removed when the path is detected deleted and merged
/// out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Content fingerprint at the time of analysis. Absent when the file
    /// was unreadable at that time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Fingerprint>,

    /// When the path was last analyzed.
    pub last_analyzed: DateTime<Utc>,
}

// ============================================================================
// GitState
// ============================================================================

/// Repository state captured at the last synchronization point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitState {
    /// HEAD commit hash at the last synchronization point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,

    /// Branch name at the last synchronization point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Whether uncommitted changes were present.
    #[serde(default)]
    pub has_uncommitted_changes: bool,
}

// ============================================================================
// ExtractionMetadata
// ============================================================================

/// Process-wide persisted extraction state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Identifier of the extraction pass that last wrote this document.
    pub extraction_id: Uuid,

    /// Repository state at the last synchronization point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_info: Option<GitState>,

    /// Per-file registry of analyzed paths.
    #[serde(default)]
    pub file_registry: BTreeMap<String, FileRecord>,

    /// When the last full extraction completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_full_extraction: Option<DateTime<Utc>>,

    /// When the last incremental extraction completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_incremental_extraction: Option<DateTime<Utc>>,
}

impl ExtractionMetadata {
    /// Create empty metadata for a fresh store.
    pub fn new() -> Self {
        Self {
            extraction_id: Uuid::new_v4(),
            git_info: None,
            file_registry: BTreeMap::new(),
            last_full_extraction: None,
            last_incremental_extraction: None,
        }
    }

    /// The last known commit hash, if any.
    pub fn last_commit(&self) -> Option<&str> {
        self.git_info
            .as_ref()
            .and_then(|g| g.commit_hash.as_deref())
    }

    /// Apply a merged change set to the registry.
    ///
    /// Every modified or added path gets a fresh fingerprint and timestamp;
    /// deleted paths are removed entirely. Without this, the next detection
    /// pass would re-report already-merged changes. The extraction id is
    /// regenerated to mark the new synchronization point.
    pub fn apply_change_set(
        &mut self,
        project_root: &Path,
        changes: &ChangeSet,
        now: DateTime<Utc>,
    ) {
        for path in changes.modified.iter().chain(changes.added.iter()) {
            let hash = fingerprint_file(&project_root.join(path));
            self.file_registry.insert(
                path.clone(),
                FileRecord {
                    hash,
                    last_analyzed: now,
                },
            );
        }

        for path in &changes.deleted {
            self.file_registry.remove(path);
        }

        self.extraction_id = Uuid::new_v4();
    }
}

impl Default for ExtractionMetadata {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Load / Save
// ============================================================================

/// Load extraction metadata from the knowledge-store directory.
///
/// An absent document means "no prior synchronization point" and returns
/// `Ok(None)`; the caller must report that a full extraction is required,
/// not an empty change set. An unreadable or unparseable document degrades
/// the same way, with a warning: metadata is recoverable state, unlike the
/// knowledge documents themselves.
pub fn load_metadata(semantic_dir: &Path) -> Result<Option<ExtractionMetadata>, FellowError> {
    let path = semantic_dir.join(EXTRACTION_METADATA_FILENAME);

    if !path.exists() {
        return Ok(None);
    }

    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Could not read metadata at {}: {}", path.display(), e);
            return Ok(None);
        }
    };

    match serde_json::from_str(&data) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) => {
            tracing::warn!("Could not parse metadata at {}: {}", path.display(), e);
            Ok(None)
        }
    }
}

/// Save extraction metadata as a single whole-document atomic write.
pub fn save_metadata(
    semantic_dir: &Path,
    metadata: &ExtractionMetadata,
) -> Result<(), FellowError> {
    save_json_atomic(&semantic_dir.join(EXTRACTION_METADATA_FILENAME), metadata)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn changes(modified: &[&str], added: &[&str], deleted: &[&str]) -> ChangeSet {
        ChangeSet::from_parts(
            modified.iter().map(|p| p.to_string()).collect::<BTreeSet<_>>(),
            added.iter().map(|p| p.to_string()).collect(),
            deleted.iter().map(|p| p.to_string()).collect(),
        )
    }

    #[test]
    fn test_load_metadata_absent() {
        let temp = TempDir::new().unwrap();
        assert!(load_metadata(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_metadata_corrupt_degrades_to_none() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(EXTRACTION_METADATA_FILENAME),
            "{not valid json",
        )
        .unwrap();
        assert!(load_metadata(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();

        let mut metadata = ExtractionMetadata::new();
        metadata.git_info = Some(GitState {
            commit_hash: Some("abc123".to_string()),
            branch: Some("main".to_string()),
            has_uncommitted_changes: false,
        });
        metadata.file_registry.insert(
            "src/a.py".to_string(),
            FileRecord {
                hash: Some(Fingerprint::from_bytes(b"content")),
                last_analyzed: Utc::now(),
            },
        );

        save_metadata(temp.path(), &metadata).unwrap();
        let loaded = load_metadata(temp.path()).unwrap().unwrap();

        assert_eq!(loaded.extraction_id, metadata.extraction_id);
        assert_eq!(loaded.last_commit(), Some("abc123"));
        assert!(loaded.file_registry.contains_key("src/a.py"));
    }

    #[test]
    fn test_apply_change_set_updates_registry() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.py"), "new content").unwrap();
        fs::write(temp.path().join("c.py"), "fresh file").unwrap();

        let mut metadata = ExtractionMetadata::new();
        let old_id = metadata.extraction_id;
        metadata.file_registry.insert(
            "a.py".to_string(),
            FileRecord {
                hash: Some(Fingerprint::from_bytes(b"old content")),
                last_analyzed: Utc::now(),
            },
        );
        metadata.file_registry.insert(
            "b.py".to_string(),
            FileRecord {
                hash: Some(Fingerprint::from_bytes(b"gone")),
                last_analyzed: Utc::now(),
            },
        );

        let now = Utc::now();
        metadata.apply_change_set(temp.path(), &changes(&["a.py"], &["c.py"], &["b.py"]), now);

        // Modified path re-fingerprinted
        assert_eq!(
            metadata.file_registry["a.py"].hash,
            Some(Fingerprint::from_bytes(b"new content"))
        );
        assert_eq!(metadata.file_registry["a.py"].last_analyzed, now);

        // Added path registered
        assert!(metadata.file_registry.contains_key("c.py"));

        // Deleted path removed
        assert!(!metadata.file_registry.contains_key("b.py"));

        // New synchronization point
        assert_ne!(metadata.extraction_id, old_id);
    }

    #[test]
    fn test_apply_change_set_unreadable_file_records_no_hash() {
        let temp = TempDir::new().unwrap();
        let mut metadata = ExtractionMetadata::new();

        // Path in the change set but absent on disk: record kept, hash None
        metadata.apply_change_set(temp.path(), &changes(&["ghost.py"], &[], &[]), Utc::now());
        assert!(metadata.file_registry["ghost.py"].hash.is_none());
    }
}
