//! The knowledge merge engine.
//!
//! Given the prior knowledge store, delta documents for the changed files,
//! and the change set, produce a new consistent store plus a statistics
//! report. All functions here are pure with respect to their inputs, with no
//! hidden state, callable any number of times. That is what keeps the
//! invariants testable:
//!
//! - an entity never survives once its grounding file changed;
//! - a relationship never survives once EITHER endpoint's grounding file
//!   changed;
//! - a workflow never survives once its entry point or any step changed;
//! - the conceptual document is replaced wholesale or kept verbatim;
//! - summary counts are recomputed from the merged sets, never adjusted
//!   incrementally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::changes::ChangeSet;
use crate::knowledge::{
    histogram, ConceptualKnowledge, ExtractionMethod, FactualKnowledge, FactualSummary,
    ProceduralKnowledge, ProceduralSummary, UpdateType,
};

// ============================================================================
// Statistics
// ============================================================================

/// Statistics from the factual merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactualMergeStats {
    /// Entities dropped because their grounding file changed.
    pub entities_removed: usize,
    /// Entities taken from the delta.
    pub entities_added: usize,
    /// Relationships dropped plus relationships taken from the delta.
    pub relationships_updated: usize,
}

/// Statistics from the procedural merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProceduralMergeStats {
    /// Workflows dropped because an entry point or step changed.
    pub workflows_removed: usize,
    /// Workflows taken from the delta.
    pub workflows_added: usize,
    /// Workflows replaced (the dropped ones were superseded).
    pub workflows_updated: usize,
}

/// Statistics from the conceptual merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptualMergeStats {
    /// Whether an architectural change was applied.
    pub status: UpdateType,
}

/// Combined statistics for one merge pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    /// Factual merge statistics.
    pub factual: FactualMergeStats,
    /// Procedural merge statistics.
    pub procedural: ProceduralMergeStats,
    /// Conceptual merge statistics.
    pub conceptual: ConceptualMergeStats,
}

// ============================================================================
// Document bundles
// ============================================================================

/// The three existing knowledge documents of a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeDocuments {
    /// Factual knowledge.
    pub factual: FactualKnowledge,
    /// Procedural knowledge.
    pub procedural: ProceduralKnowledge,
    /// Conceptual knowledge.
    pub conceptual: ConceptualKnowledge,
}

/// The delta documents produced by the external extractor.
///
/// Factual and procedural deltas are mandatory for a merge; the conceptual
/// delta is optional; its absence means "no architectural change", which
/// is distinct from an empty document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaDocuments {
    /// Factual delta (mandatory).
    pub factual: FactualKnowledge,
    /// Procedural delta (mandatory).
    pub procedural: ProceduralKnowledge,
    /// Conceptual delta (optional).
    pub conceptual: Option<ConceptualKnowledge>,
}

// ============================================================================
// Factual merge
// ============================================================================

/// Merge factual knowledge.
///
/// Existing entities are partitioned into retained (grounding file not in
/// the change set) and stale; the new entity set is retained ∪ delta;
/// delta entities are trusted unconditionally as the authoritative
/// replacement for their files. Relationships follow the same partition
/// rule on BOTH endpoints.
pub fn merge_factual(
    existing: FactualKnowledge,
    delta: FactualKnowledge,
    changes: &ChangeSet,
    now: DateTime<Utc>,
) -> (FactualKnowledge, FactualMergeStats) {
    let entities_before = existing.entities.len();
    let mut entities: Vec<_> = existing
        .entities
        .into_iter()
        .filter(|entity| !changes.contains(&entity.grounding.file))
        .collect();
    let entities_removed = entities_before - entities.len();

    let entities_added = delta.entities.len();
    entities.extend(delta.entities);

    let relationships_before = existing.entity_relationships.len();
    let mut relationships: Vec<_> = existing
        .entity_relationships
        .into_iter()
        .filter(|rel| !rel.touches(changes))
        .collect();
    let relationships_dropped = relationships_before - relationships.len();

    let delta_relationships = delta.entity_relationships.len();
    relationships.extend(delta.entity_relationships);

    let mut metadata = existing.metadata;
    metadata.last_update = Some(now);
    metadata.extraction_method = Some(ExtractionMethod::Incremental);

    let summary = FactualSummary {
        total_entities: entities.len(),
        total_relationships: relationships.len(),
        entity_types: histogram(&entities, |e| e.kind_or_unknown()),
        last_updated: Some(now),
    };

    let merged = FactualKnowledge {
        metadata,
        entities,
        entity_relationships: relationships,
        summary,
    };

    let stats = FactualMergeStats {
        entities_removed,
        entities_added,
        relationships_updated: relationships_dropped + delta_relationships,
    };

    (merged, stats)
}

// ============================================================================
// Procedural merge
// ============================================================================

/// Merge procedural knowledge.
///
/// A workflow survives only if neither its entry point file nor any step's
/// grounding file is in the change set; survivors plus the delta's
/// workflows form the new set.
pub fn merge_procedural(
    existing: ProceduralKnowledge,
    delta: ProceduralKnowledge,
    changes: &ChangeSet,
    now: DateTime<Utc>,
) -> (ProceduralKnowledge, ProceduralMergeStats) {
    let workflows_before = existing.workflows.len();
    let mut workflows: Vec<_> = existing
        .workflows
        .into_iter()
        .filter(|wf| !wf.is_affected_by(changes))
        .collect();
    let workflows_removed = workflows_before - workflows.len();

    let workflows_added = delta.workflows.len();
    workflows.extend(delta.workflows);

    let mut metadata = existing.metadata;
    metadata.last_update = Some(now);
    metadata.extraction_method = Some(ExtractionMethod::Incremental);

    let summary = ProceduralSummary {
        total_workflows: workflows.len(),
        workflow_types: histogram(&workflows, |wf| wf.kind_or_unknown()),
        last_updated: Some(now),
    };

    let merged = ProceduralKnowledge {
        metadata,
        workflows,
        summary,
    };

    let stats = ProceduralMergeStats {
        workflows_removed,
        workflows_added,
        workflows_updated: workflows_removed,
    };

    (merged, stats)
}

// ============================================================================
// Conceptual merge
// ============================================================================

/// Merge conceptual knowledge.
///
/// Binary policy: a supplied delta replaces the existing document wholesale
/// and is tagged as an architectural change; with no delta, the existing
/// document is retained with only its `update_type` tag rewritten;
/// architecture-level facts are not file-granular, so they are only
/// recomputed when the extractor explicitly flags a change.
pub fn merge_conceptual(
    existing: ConceptualKnowledge,
    delta: Option<ConceptualKnowledge>,
    now: DateTime<Utc>,
) -> (ConceptualKnowledge, ConceptualMergeStats) {
    match delta {
        Some(mut replacement) => {
            replacement.metadata.update_type = Some(UpdateType::ArchitecturalChange);
            replacement.metadata.last_update = Some(now);
            (
                replacement,
                ConceptualMergeStats {
                    status: UpdateType::ArchitecturalChange,
                },
            )
        }
        None => {
            let mut retained = existing;
            retained.metadata.update_type = Some(UpdateType::NoChange);
            (
                retained,
                ConceptualMergeStats {
                    status: UpdateType::NoChange,
                },
            )
        }
    }
}

// ============================================================================
// Combined merge
// ============================================================================

/// Merge all three knowledge categories for one change set.
pub fn merge(
    existing: KnowledgeDocuments,
    deltas: DeltaDocuments,
    changes: &ChangeSet,
    now: DateTime<Utc>,
) -> (KnowledgeDocuments, MergeStats) {
    let (factual, factual_stats) = merge_factual(existing.factual, deltas.factual, changes, now);
    let (procedural, procedural_stats) =
        merge_procedural(existing.procedural, deltas.procedural, changes, now);
    let (conceptual, conceptual_stats) =
        merge_conceptual(existing.conceptual, deltas.conceptual, now);

    (
        KnowledgeDocuments {
            factual,
            procedural,
            conceptual,
        },
        MergeStats {
            factual: factual_stats,
            procedural: procedural_stats,
            conceptual: conceptual_stats,
        },
    )
}

// ============================================================================
// Tests
// ============================================================================
