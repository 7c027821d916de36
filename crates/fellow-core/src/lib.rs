//! # fellow-core
//!
//! **Fellow** – incremental knowledge-store synchronization engine.
//!
//! Given a previously extracted semantic knowledge base (entities,
//! relationships, workflows, architectural facts) and the set of source
//! files that changed since the last extraction, fellow-core determines
//! precisely what changed, invalidates exactly the stale knowledge, and
//! merges freshly extracted delta documents back in without corrupting or
//! duplicating unaffected data.
//!
//! ## Main Types
//!
//! - [`FellowEngine`] – the main entry point for detection and sync
//! - [`Workspace`] – a resolved project and its knowledge store on disk
//! - [`FellowError`] – domain-specific error type
//!
//! ## Modules
//!
//! - [`filters`] – source path classification (pure predicates)
//! - [`fingerprint`] – content digests for the fallback detector
//! - [`git`] – version-control queries with explicit working directories
//! - [`detect`] – the change detector
//! - [`knowledge`] – the knowledge document model
//! - [`merge`] – the pure merge engine
//! - [`metadata`] – the persisted extraction metadata
//! - [`store`] – atomic document I/O
//!
//! ## Example
//!
//! ```ignore
//! use fellow_core::FellowEngine;
//! use std::path::Path;
//!
//! let engine = FellowEngine::new();
//! let workspace = engine.resolve_workspace(Path::new("."))?;
//!
//! let report = engine.detect(&workspace)?;
//! if report.requires_full_extraction() {
//!     println!("no prior synchronization point; run a full extraction");
//! } else if !report.is_up_to_date() {
//!     // ... external extractor produces delta documents here ...
//!     let outcome = engine.sync(&workspace, &report)?;
//!     println!("merged: {:?}", outcome);
//! }
//! ```

// Modules
pub mod changes;
pub mod config;
pub mod constants;
pub mod detect;
pub mod engine;
pub mod errors;
pub mod filters;
pub mod fingerprint;
pub mod git;
pub mod knowledge;
pub mod merge;
pub mod metadata;
pub mod store;
pub mod workspace;

// Re-exports for convenience
pub use changes::ChangeSet;
pub use config::ProjectConfig;
pub use constants::{
    is_excluded_dir, is_source_extension, is_test_segment, CONCEPTUAL_DELTA_FILENAME,
    CONCEPTUAL_FILENAME, EXCLUDED_DIRS, EXTRACTION_METADATA_FILENAME, FACTUAL_DELTA_FILENAME,
    FACTUAL_FILENAME, FELLOW_DATA_DIR, PROCEDURAL_DELTA_FILENAME, PROCEDURAL_FILENAME,
    PROJECT_CONFIG_FILENAME, SEMANTIC_DIR, SOURCE_EXTENSIONS, TEST_FILENAME_MARKERS, TEST_SEGMENTS,
};
pub use detect::{
    detect_changes, DetectionMethod, DetectionMode, DetectionReport, DetectionStatus,
};
pub use engine::{FellowEngine, StoreStatus, SyncOutcome};
pub use errors::FellowError;
pub use filters::{is_excluded_path, is_source_file, is_test_path, should_analyze, FilterSet};
pub use fingerprint::{fingerprint_file, Fingerprint, FINGERPRINT_ALGORITHM};
pub use git::{collect_git_info, is_git_repo, DiffEntry, DiffKind, GitInfo};
pub use knowledge::{
    ConceptualKnowledge, Entity, ExtractionMethod, FactualKnowledge, FactualSummary, Grounding,
    KnowledgeCategory, KnowledgeMetadata, ProceduralKnowledge, ProceduralSummary, Relationship,
    RelationshipEnd, UpdateType, Workflow, WorkflowStep,
};
pub use merge::{
    merge, merge_conceptual, merge_factual, merge_procedural, ConceptualMergeStats,
    DeltaDocuments, FactualMergeStats, KnowledgeDocuments, MergeStats, ProceduralMergeStats,
};
pub use metadata::{
    load_metadata, save_metadata, ExtractionMetadata, FileRecord, GitState,
};
pub use store::{
    has_pending_deltas, load_knowledge, load_optional_delta, load_required_delta,
    remove_delta_documents, save_json_atomic,
};
pub use workspace::Workspace;
