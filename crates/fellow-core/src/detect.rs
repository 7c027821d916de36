//! Change detection since the last synchronization point.
//!
//! The detector produces the authoritative `{modified, added, deleted}`
//! source paths since the last extraction, preferring version-control
//! history and falling back to a full-tree fingerprint comparison when git
//! is unavailable or fails.
//!
//! Absent metadata is not an error: it signals "no prior synchronization
//! point" and the report says a full extraction is required; an empty
//! change set would incorrectly mean "nothing to do".

use std::collections::BTreeSet;
use std::path::Path;

use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::changes::ChangeSet;
use crate::constants::is_excluded_dir;
use crate::errors::FellowError;
use crate::filters::FilterSet;
use crate::fingerprint::fingerprint_file;
use crate::git::{self, DiffKind};
use crate::metadata::ExtractionMetadata;
use crate::workspace::Workspace;

// ============================================================================
// Report Types
// ============================================================================

/// Outcome status of a detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStatus {
    /// No prior synchronization point exists.
    NoMetadata,
    /// Detection completed against a prior synchronization point.
    Success,
}

/// Extraction mode implied by the detection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Everything must be analyzed (no prior synchronization point).
    Full,
    /// Only the reported paths need re-analysis.
    Incremental,
    /// Nothing changed.
    UpToDate,
}

/// How the change set was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Version-control history.
    Vcs,
    /// Full-tree fingerprint comparison.
    FileComparison,
}

/// The detector's output contract, consumed by the external extraction
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Outcome status.
    pub status: DetectionStatus,

    /// Implied extraction mode.
    pub mode: DetectionMode,

    /// Modified analyzable paths, sorted.
    pub modified: Vec<String>,

    /// Added analyzable paths, sorted.
    pub new: Vec<String>,

    /// Deleted analyzable paths, sorted.
    pub deleted: Vec<String>,

    /// Total number of classified paths.
    pub total: usize,

    /// How the change set was computed. Absent when no metadata exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_method: Option<DetectionMethod>,
}

impl DetectionReport {
    /// The report for a store with no prior synchronization point.
    pub fn no_metadata() -> Self {
        Self {
            status: DetectionStatus::NoMetadata,
            mode: DetectionMode::Full,
            modified: Vec::new(),
            new: Vec::new(),
            deleted: Vec::new(),
            total: 0,
            detection_method: None,
        }
    }

    fn from_change_set(changes: &ChangeSet, method: DetectionMethod) -> Self {
        let total = changes.total();
        Self {
            status: DetectionStatus::Success,
            mode: if total > 0 {
                DetectionMode::Incremental
            } else {
                DetectionMode::UpToDate
            },
            modified: changes.modified.iter().cloned().collect(),
            new: changes.added.iter().cloned().collect(),
            deleted: changes.deleted.iter().cloned().collect(),
            total,
            detection_method: Some(method),
        }
    }

    /// Reconstruct the change set this report was built from.
    pub fn change_set(&self) -> ChangeSet {
        ChangeSet::from_parts(
            self.modified.iter().cloned().collect(),
            self.new.iter().cloned().collect(),
            self.deleted.iter().cloned().collect(),
        )
    }

    /// Whether a full extraction is required.
    pub fn requires_full_extraction(&self) -> bool {
        self.status == DetectionStatus::NoMetadata
    }

    /// Whether the store is already up to date.
    pub fn is_up_to_date(&self) -> bool {
        self.mode == DetectionMode::UpToDate
    }
}

// ============================================================================
// Detection
// ============================================================================

/// Detect all changes since the last synchronization point.
///
/// Prefers version-control history; degrades to fingerprint comparison
/// when the project is not a repository or a git query fails. The
/// resulting sets contain only analyzable paths and are pairwise disjoint.
pub fn detect_changes(
    workspace: &Workspace,
    metadata: Option<&ExtractionMetadata>,
    filters: &FilterSet,
) -> DetectionReport {
    let Some(metadata) = metadata else {
        tracing::debug!("No extraction metadata found; full extraction required");
        return DetectionReport::no_metadata();
    };

    let root = workspace.root();

    let (mut changes, method) = if git::is_git_repo(root) {
        match detect_via_git(root, metadata.last_commit()) {
            Ok(changes) => (changes, DetectionMethod::Vcs),
            Err(e) => {
                tracing::warn!("Git detection failed ({}); falling back to file comparison", e);
                (
                    detect_via_fingerprints(root, metadata, filters),
                    DetectionMethod::FileComparison,
                )
            }
        }
    } else {
        tracing::debug!("Not a git repository; using file comparison");
        (
            detect_via_fingerprints(root, metadata, filters),
            DetectionMethod::FileComparison,
        )
    };

    changes.retain(|path| filters.should_analyze(path));

    DetectionReport::from_change_set(&changes, method)
}

// ----------------------------------------------------------------------------
// Git path
// ----------------------------------------------------------------------------

/// Detect changes from version-control history.
///
/// Unions three signals: committed changes between the last known commit
/// and HEAD, uncommitted modifications/deletions in the working tree, and
/// staged changes plus untracked files. Renames arrive from the diff layer
/// already decomposed into delete(old) + add(new).
fn detect_via_git(root: &Path, last_commit: Option<&str>) -> Result<ChangeSet, FellowError> {
    let mut modified = BTreeSet::new();
    let mut added = BTreeSet::new();
    let mut deleted = BTreeSet::new();

    let mut classify = |entries: Vec<git::DiffEntry>| {
        for entry in entries {
            match entry.kind {
                DiffKind::Modified => modified.insert(entry.path),
                DiffKind::Added => added.insert(entry.path),
                DiffKind::Deleted => deleted.insert(entry.path),
            };
        }
    };

    if let Some(commit) = last_commit {
        classify(git::diff_commits(root, commit, "HEAD")?);
    }

    classify(git::diff_worktree(root)?);
    classify(git::diff_staged(root)?);

    for path in git::untracked_files(root)? {
        added.insert(path);
    }

    Ok(ChangeSet::from_parts(modified, added, deleted))
}

// ----------------------------------------------------------------------------
// Fallback path
// ----------------------------------------------------------------------------

/// Registry-side classification for one tracked path.
enum RegistryChange {
    Modified,
    Deleted,
    Unchanged,
}

/// Detect changes by fingerprint comparison.
///
/// Every registry entry is re-fingerprinted (in parallel; hashing is pure
/// and order-independent): a missing file is deleted, a differing digest is
/// modified, and a missing digest on either side is no signal and never
/// flags a change. A full tree walk then collects analyzable paths absent
/// from the registry as added.
fn detect_via_fingerprints(
    root: &Path,
    metadata: &ExtractionMetadata,
    filters: &FilterSet,
) -> ChangeSet {
    let entries: Vec<_> = metadata.file_registry.iter().collect();

    let classified: Vec<(&String, RegistryChange)> = entries
        .par_iter()
        .map(|(path, record)| {
            let full_path = root.join(path);
            if !full_path.exists() {
                return (*path, RegistryChange::Deleted);
            }

            let change = match (fingerprint_file(&full_path), &record.hash) {
                (Some(current), Some(stored)) if current != *stored => RegistryChange::Modified,
                // Equal digests, or no signal on either side
                _ => RegistryChange::Unchanged,
            };
            (*path, change)
        })
        .collect();

    let mut modified = BTreeSet::new();
    let mut deleted = BTreeSet::new();
    for (path, change) in classified {
        match change {
            RegistryChange::Modified => {
                modified.insert(path.clone());
            }
            RegistryChange::Deleted => {
                deleted.insert(path.clone());
            }
            RegistryChange::Unchanged => {}
        }
    }

    let added = scan_for_new_files(root, metadata, filters);

    ChangeSet::from_parts(modified, added, deleted)
}

/// Walk the project tree and collect analyzable paths not present in the
/// registry.
fn scan_for_new_files(
    root: &Path,
    metadata: &ExtractionMetadata,
    filters: &FilterSet,
) -> BTreeSet<String> {
    let mut added = BTreeSet::new();

    // No git here by definition, so gitignore handling is disabled; excluded
    // directories are pruned during the walk instead.
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !is_excluded_dir(&name)
        })
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry during scan: {}", e);
                continue;
            }
        };

        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let Some(rel_str) = rel.to_str() else {
            continue;
        };

        if !filters.should_analyze(rel_str) {
            continue;
        }

        if !metadata.file_registry.contains_key(rel_str) {
            added.insert(rel_str.to_string());
        }
    }

    added
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Fingerprint;
    use crate::metadata::FileRecord;
    use chrono::Utc;
    use std::fs;
    use tempfile::TempDir;

    fn workspace_in(temp: &TempDir) -> Workspace {
        fs::create_dir_all(temp.path().join(".fellow-data/semantic")).unwrap();
        Workspace::from_root(temp.path()).unwrap()
    }

    fn registry_record(content: &[u8]) -> FileRecord {
        FileRecord {
            hash: Some(Fingerprint::from_bytes(content)),
            last_analyzed: Utc::now(),
        }
    }

    #[test]
    fn test_no_metadata_reports_full_extraction() {
        let temp = TempDir::new().unwrap();
        let workspace = workspace_in(&temp);

        let report = detect_changes(&workspace, None, &FilterSet::default());

        assert_eq!(report.status, DetectionStatus::NoMetadata);
        assert_eq!(report.mode, DetectionMode::Full);
        assert!(report.requires_full_extraction());
        assert_eq!(report.total, 0);
        assert!(report.detection_method.is_none());
    }

    #[test]
    fn test_fallback_scenario_modified_added_deleted() {
        let temp = TempDir::new().unwrap();
        let workspace = workspace_in(&temp);

        // Registry knows a.py and b.py
        let mut metadata = ExtractionMetadata::new();
        metadata
            .file_registry
            .insert("a.py".to_string(), registry_record(b"original a"));
        metadata
            .file_registry
            .insert("b.py".to_string(), registry_record(b"original b"));

        // a.py edited, b.py deleted, c.py added
        fs::write(temp.path().join("a.py"), "edited a").unwrap();
        fs::write(temp.path().join("c.py"), "fresh c").unwrap();

        let report = detect_changes(&workspace, Some(&metadata), &FilterSet::default());

        assert_eq!(report.status, DetectionStatus::Success);
        assert_eq!(report.mode, DetectionMode::Incremental);
        assert_eq!(report.detection_method, Some(DetectionMethod::FileComparison));
        assert_eq!(report.modified, vec!["a.py".to_string()]);
        assert_eq!(report.new, vec!["c.py".to_string()]);
        assert_eq!(report.deleted, vec!["b.py".to_string()]);
        assert_eq!(report.total, 3);
    }

    #[test]
    fn test_fallback_is_idempotent_on_untouched_files() {
        let temp = TempDir::new().unwrap();
        let workspace = workspace_in(&temp);

        fs::write(temp.path().join("a.py"), "stable content").unwrap();
        let mut metadata = ExtractionMetadata::new();
        metadata
            .file_registry
            .insert("a.py".to_string(), registry_record(b"stable content"));

        for _ in 0..2 {
            let report = detect_changes(&workspace, Some(&metadata), &FilterSet::default());
            assert_eq!(report.mode, DetectionMode::UpToDate);
            assert_eq!(report.total, 0);
        }
    }

    #[test]
    fn test_fallback_missing_registry_hash_is_no_signal() {
        let temp = TempDir::new().unwrap();
        let workspace = workspace_in(&temp);

        fs::write(temp.path().join("a.py"), "whatever").unwrap();
        let mut metadata = ExtractionMetadata::new();
        metadata.file_registry.insert(
            "a.py".to_string(),
            FileRecord {
                hash: None,
                last_analyzed: Utc::now(),
            },
        );

        let report = detect_changes(&workspace, Some(&metadata), &FilterSet::default());
        assert!(report.modified.is_empty());
        assert_eq!(report.mode, DetectionMode::UpToDate);
    }

    #[test]
    fn test_fallback_scan_skips_excluded_and_test_paths() {
        let temp = TempDir::new().unwrap();
        let workspace = workspace_in(&temp);

        fs::create_dir_all(temp.path().join("node_modules/pkg")).unwrap();
        fs::write(temp.path().join("node_modules/pkg/index.js"), "x").unwrap();
        fs::create_dir_all(temp.path().join("tests")).unwrap();
        fs::write(temp.path().join("tests/api.py"), "x").unwrap();
        fs::write(temp.path().join("notes.md"), "x").unwrap();
        fs::write(temp.path().join("main.py"), "x").unwrap();

        let report = detect_changes(
            &workspace,
            Some(&ExtractionMetadata::new()),
            &FilterSet::default(),
        );

        assert_eq!(report.new, vec!["main.py".to_string()]);
    }

    #[test]
    fn test_report_sets_are_disjoint() {
        let temp = TempDir::new().unwrap();
        let workspace = workspace_in(&temp);

        let mut metadata = ExtractionMetadata::new();
        metadata
            .file_registry
            .insert("a.py".to_string(), registry_record(b"old"));
        fs::write(temp.path().join("a.py"), "new").unwrap();

        let report = detect_changes(&workspace, Some(&metadata), &FilterSet::default());
        let changes = report.change_set();
        assert!(changes.modified.is_disjoint(&changes.added));
        assert!(changes.modified.is_disjoint(&changes.deleted));
        assert!(changes.added.is_disjoint(&changes.deleted));
    }

    fn git(root: &std::path::Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(root)
            .env("GIT_AUTHOR_NAME", "test")
            .env("GIT_AUTHOR_EMAIL", "test@example.com")
            .env("GIT_COMMITTER_NAME", "test")
            .env("GIT_COMMITTER_EMAIL", "test@example.com")
            .status()
            .expect("git should be available");
        assert!(status.success(), "git {:?} failed", args);
    }

    #[test]
    fn test_git_detection_unions_all_signals() {
        let temp = TempDir::new().unwrap();
        let workspace = workspace_in(&temp);

        fs::write(temp.path().join("a.py"), "committed a").unwrap();
        fs::write(temp.path().join("b.py"), "committed b").unwrap();
        git(temp.path(), &["init", "-q"]);
        git(temp.path(), &["add", "a.py", "b.py"]);
        git(temp.path(), &["commit", "-q", "-m", "baseline"]);

        let commit = crate::git::current_commit(temp.path()).unwrap();
        let mut metadata = ExtractionMetadata::new();
        metadata.git_info = Some(crate::metadata::GitState {
            commit_hash: Some(commit),
            branch: None,
            has_uncommitted_changes: false,
        });

        // Worktree edit, worktree deletion, untracked addition
        fs::write(temp.path().join("a.py"), "edited a").unwrap();
        fs::remove_file(temp.path().join("b.py")).unwrap();
        fs::write(temp.path().join("c.py"), "untracked c").unwrap();

        let report = detect_changes(&workspace, Some(&metadata), &FilterSet::default());

        assert_eq!(report.detection_method, Some(DetectionMethod::Vcs));
        assert_eq!(report.modified, vec!["a.py".to_string()]);
        assert_eq!(report.new, vec!["c.py".to_string()]);
        assert_eq!(report.deleted, vec!["b.py".to_string()]);
    }

    #[test]
    fn test_git_detection_decomposes_renames() {
        let temp = TempDir::new().unwrap();
        let workspace = workspace_in(&temp);

        fs::write(temp.path().join("old_name.py"), "stable content here").unwrap();
        git(temp.path(), &["init", "-q"]);
        git(temp.path(), &["add", "old_name.py"]);
        git(temp.path(), &["commit", "-q", "-m", "baseline"]);

        let commit = crate::git::current_commit(temp.path()).unwrap();
        let mut metadata = ExtractionMetadata::new();
        metadata.git_info = Some(crate::metadata::GitState {
            commit_hash: Some(commit),
            branch: None,
            has_uncommitted_changes: false,
        });

        git(temp.path(), &["mv", "old_name.py", "new_name.py"]);
        git(temp.path(), &["commit", "-q", "-m", "rename"]);

        let report = detect_changes(&workspace, Some(&metadata), &FilterSet::default());

        // A rename is never left ambiguous: delete(old) + add(new)
        assert_eq!(report.deleted, vec!["old_name.py".to_string()]);
        assert_eq!(report.new, vec!["new_name.py".to_string()]);
        assert!(report.modified.is_empty());
    }

    #[test]
    fn test_report_json_contract() {
        let report = DetectionReport::no_metadata();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "no_metadata");
        assert_eq!(value["mode"], "full");
        assert!(value.get("detection_method").is_none());

        let changes = ChangeSet::from_parts(
            ["a.py".to_string()].into_iter().collect(),
            BTreeSet::new(),
            BTreeSet::new(),
        );
        let report = DetectionReport::from_change_set(&changes, DetectionMethod::Vcs);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["mode"], "incremental");
        assert_eq!(value["detection_method"], "vcs");
        assert_eq!(value["new"], serde_json::json!([]));
        assert_eq!(value["total"], 1);
    }
}
