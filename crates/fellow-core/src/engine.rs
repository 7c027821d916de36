//! The engine facade tying detection and merge together.
//!
//! [`FellowEngine`] owns the orchestration of a synchronization pass:
//! resolve the workspace, detect changes, and, once the external extractor
//! has produced delta documents, merge them into the store.
//!
//! ## Write ordering
//!
//! A sync pass commits in a fixed order so every crash window leaves a
//! consistent store:
//!
//! 1. the three merged documents are written (each an atomic
//!    whole-document replacement); until the last write, the prior
//!    documents remain untouched and valid;
//! 2. the extraction metadata is rewritten (registry refresh, commit hash,
//!    timestamps);
//! 3. the delta documents are removed.
//!
//! A crash before (1) completes leaves the pre-merge store. A crash
//! between (1) and (3) leaves the new store plus leftover deltas, which
//! the next pass treats as reusable input, not as an error.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ProjectConfig;
use crate::detect::{detect_changes, DetectionMethod, DetectionReport};
use crate::errors::FellowError;
use crate::filters::FilterSet;
use crate::git;
use crate::knowledge::KnowledgeCategory;
use crate::merge::{merge, DeltaDocuments, KnowledgeDocuments, MergeStats};
use crate::metadata::{load_metadata, save_metadata, GitState};
use crate::store::{
    has_pending_deltas, load_knowledge, load_optional_delta, load_required_delta,
    remove_delta_documents, save_json_atomic,
};
use crate::workspace::Workspace;

// ============================================================================
// SyncOutcome
// ============================================================================

/// Result of a sync pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Deltas were merged into the store.
    Merged(MergeStats),
    /// Nothing changed and no deltas were pending.
    UpToDate,
}

// ============================================================================
// StoreStatus
// ============================================================================

/// Summary of a store for status reporting.
///
/// Fields are `None` when the corresponding document is missing or
/// unreadable; status is a read-only view and never fails on a partial
/// store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    /// Absolute path to the project root.
    pub project_root: std::path::PathBuf,

    /// Whether a knowledge store exists.
    pub initialized: bool,

    /// Which detection method a pass would use.
    pub detection_method: DetectionMethod,

    /// Number of tracked files in the registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracked_files: Option<usize>,

    /// Last known commit hash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_commit: Option<String>,

    /// When the last full extraction completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_full_extraction: Option<DateTime<Utc>>,

    /// When the last incremental extraction completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_incremental_extraction: Option<DateTime<Utc>>,

    /// Total entities in the factual document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_entities: Option<usize>,

    /// Total relationships in the factual document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_relationships: Option<usize>,

    /// Total workflows in the procedural document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_workflows: Option<usize>,

    /// Whether delta documents are waiting to be merged.
    pub pending_deltas: bool,
}

// ============================================================================
// FellowEngine
// ============================================================================

/// The main entry point for synchronization operations.
#[derive(Debug, Clone, Default)]
pub struct FellowEngine;

impl FellowEngine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self
    }

    /// Resolve a workspace by walking up from the given directory.
    pub fn resolve_workspace(&self, start_dir: &Path) -> Result<Workspace, FellowError> {
        Workspace::resolve(start_dir)
    }

    /// Build the classification filter set for a workspace.
    ///
    /// Reads the optional `fellow.yaml` at the project root.
    pub fn filters_for(&self, workspace: &Workspace) -> FilterSet {
        let config = ProjectConfig::load(&workspace.config_path());
        FilterSet::from_config(&config)
    }

    /// Detect changes since the last synchronization point.
    pub fn detect(&self, workspace: &Workspace) -> Result<DetectionReport, FellowError> {
        let metadata = load_metadata(workspace.semantic_dir())?;
        let filters = self.filters_for(workspace);
        Ok(detect_changes(workspace, metadata.as_ref(), &filters))
    }

    /// Merge pending delta documents into the store.
    ///
    /// Takes the detection report of the current pass; the change set it
    /// carries drives invalidation. Fails without touching the store when
    /// a prerequisite is missing (no metadata, missing existing document,
    /// missing mandatory delta) or an existing document is corrupt.
    pub fn sync(
        &self,
        workspace: &Workspace,
        report: &DetectionReport,
    ) -> Result<SyncOutcome, FellowError> {
        if report.requires_full_extraction() {
            return Err(FellowError::MetadataMissing);
        }

        let semantic_dir = workspace.semantic_dir();

        // Up to date with no leftover deltas: nothing to merge. Leftover
        // deltas from a crashed pass are still consumed.
        if report.is_up_to_date() && !has_pending_deltas(semantic_dir) {
            return Ok(SyncOutcome::UpToDate);
        }

        let changes = report.change_set();
        tracing::debug!("Merging knowledge for {} changed files", changes.total());

        // Load everything up front; any failure leaves the store untouched.
        let existing = KnowledgeDocuments {
            factual: load_knowledge(&workspace.knowledge_path(KnowledgeCategory::Factual))?,
            procedural: load_knowledge(&workspace.knowledge_path(KnowledgeCategory::Procedural))?,
            conceptual: load_knowledge(&workspace.knowledge_path(KnowledgeCategory::Conceptual))?,
        };
        let deltas = DeltaDocuments {
            factual: load_required_delta(&workspace.delta_path(KnowledgeCategory::Factual))?,
            procedural: load_required_delta(&workspace.delta_path(KnowledgeCategory::Procedural))?,
            conceptual: load_optional_delta(&workspace.delta_path(KnowledgeCategory::Conceptual))?,
        };

        let now = Utc::now();
        let (merged, stats) = merge(existing, deltas, &changes, now);

        // 1. Merged documents
        save_json_atomic(
            &workspace.knowledge_path(KnowledgeCategory::Factual),
            &merged.factual,
        )?;
        save_json_atomic(
            &workspace.knowledge_path(KnowledgeCategory::Procedural),
            &merged.procedural,
        )?;
        save_json_atomic(
            &workspace.knowledge_path(KnowledgeCategory::Conceptual),
            &merged.conceptual,
        )?;

        // 2. Metadata: fresh registry state for every touched path
        let mut metadata = load_metadata(semantic_dir)?.ok_or(FellowError::MetadataMissing)?;
        metadata.apply_change_set(workspace.root(), &changes, now);
        if git::is_git_repo(workspace.root()) {
            let info = git::collect_git_info(workspace.root(), false);
            metadata.git_info = Some(GitState {
                commit_hash: info.commit_hash,
                branch: info.branch,
                has_uncommitted_changes: info.has_uncommitted_changes.unwrap_or(false),
            });
        }
        metadata.last_incremental_extraction = Some(now);
        save_metadata(semantic_dir, &metadata)?;

        // 3. Deltas are consumed last
        remove_delta_documents(semantic_dir)?;

        Ok(SyncOutcome::Merged(stats))
    }

    /// Summarize the store for status reporting.
    pub fn status(&self, workspace: &Workspace) -> Result<StoreStatus, FellowError> {
        let semantic_dir = workspace.semantic_dir();
        let metadata = load_metadata(semantic_dir)?;

        let factual: Option<crate::knowledge::FactualKnowledge> =
            load_knowledge(&workspace.knowledge_path(KnowledgeCategory::Factual)).ok();
        let procedural: Option<crate::knowledge::ProceduralKnowledge> =
            load_knowledge(&workspace.knowledge_path(KnowledgeCategory::Procedural)).ok();

        Ok(StoreStatus {
            project_root: workspace.root().to_path_buf(),
            initialized: workspace.is_initialized(),
            detection_method: if git::is_git_repo(workspace.root()) {
                DetectionMethod::Vcs
            } else {
                DetectionMethod::FileComparison
            },
            tracked_files: metadata.as_ref().map(|m| m.file_registry.len()),
            last_commit: metadata
                .as_ref()
                .and_then(|m| m.last_commit().map(|c| c.to_string())),
            last_full_extraction: metadata.as_ref().and_then(|m| m.last_full_extraction),
            last_incremental_extraction: metadata
                .as_ref()
                .and_then(|m| m.last_incremental_extraction),
            total_entities: factual.as_ref().map(|f| f.entities.len()),
            total_relationships: factual.as_ref().map(|f| f.entity_relationships.len()),
            total_workflows: procedural.as_ref().map(|p| p.workflows.len()),
            pending_deltas: has_pending_deltas(semantic_dir),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
