//! Knowledge document model.
//!
//! The store persists three knowledge categories as JSON documents:
//!
//! - **Factual**: entities and the relationships between them, each
//!   grounded in exactly one source file.
//! - **Procedural**: workflows spanning possibly many files, with an entry
//!   point and per-step groundings.
//! - **Conceptual**: whole-of-project facts (architecture style, design
//!   patterns, constraints) with no per-entity grounding; treated as one
//!   atomic unit.
//!
//! The documents are produced by an external extractor, so every record
//! carries a flattened `extra` map: fields this engine does not interpret
//! round-trip losslessly through a merge. The wire format is snake_case;
//! it is a persisted contract shared with the extractor.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::changes::ChangeSet;

// ============================================================================
// KnowledgeCategory
// ============================================================================

/// The three persisted knowledge categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnowledgeCategory {
    /// Entities and relationships.
    Factual,
    /// Workflows.
    Procedural,
    /// Architecture-level facts.
    Conceptual,
}

// ============================================================================
// Document Metadata
// ============================================================================

/// How a knowledge document was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Produced by analyzing the whole tree.
    Full,
    /// Produced by merging deltas for a change set.
    Incremental,
}

/// How the conceptual document was last updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    /// A conceptual delta replaced the document wholesale.
    ArchitecturalChange,
    /// No conceptual delta was supplied; the document was retained.
    NoChange,
}

/// The `metadata` block carried by every knowledge document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeMetadata {
    /// When the document was last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,

    /// How the document was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<ExtractionMethod>,

    /// How the conceptual document was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_type: Option<UpdateType>,

    /// Extractor-supplied fields this engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Factual Knowledge
// ============================================================================

/// The source-file attribution of a fact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grounding {
    /// Project-relative path of the grounding file.
    #[serde(default)]
    pub file: String,

    /// Extractor-supplied detail (line ranges, symbols, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A fact extracted from one source file.
///
/// Exactly one file grounds an entity; once that file is re-analyzed or
/// deleted, the entity must be replaced by the delta's version or dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier assigned by the extractor.
    #[serde(default)]
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Entity type (e.g., "class", "function", "module").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// What the entity is for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    /// The single file this entity is attributed to.
    #[serde(default)]
    pub grounding: Grounding,

    /// Extractor-supplied fields this engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity {
    /// The entity type, with the extractor's convention for absent types.
    pub fn kind_or_unknown(&self) -> &str {
        self.kind.as_deref().unwrap_or("unknown")
    }
}

/// One endpoint of a relationship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEnd {
    /// Name of the referenced entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Grounding of the referenced entity.
    #[serde(default)]
    pub grounding: Grounding,

    /// Extractor-supplied fields this engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A directed edge between two entities.
///
/// A relationship is stale as soon as EITHER endpoint's grounding file is
/// in the change set, even if its own grounding did not change: an endpoint
/// it names no longer exists in its previous form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// The source endpoint.
    #[serde(default)]
    pub source_entity: RelationshipEnd,

    /// The target endpoint.
    #[serde(default)]
    pub target_entity: RelationshipEnd,

    /// Relationship type (e.g., "calls", "imports").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Extractor-supplied fields this engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Relationship {
    /// Check whether either endpoint's grounding file is in the change set.
    pub fn touches(&self, changes: &ChangeSet) -> bool {
        changes.contains(&self.source_entity.grounding.file)
            || changes.contains(&self.target_entity.grounding.file)
    }
}

/// Recomputed summary counts for the factual document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactualSummary {
    /// Total number of entities.
    #[serde(default)]
    pub total_entities: usize,

    /// Total number of relationships.
    #[serde(default)]
    pub total_relationships: usize,

    /// Per-type entity counts.
    #[serde(default)]
    pub entity_types: BTreeMap<String, usize>,

    /// When the summary was computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// The factual knowledge document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactualKnowledge {
    /// Document metadata.
    #[serde(default)]
    pub metadata: KnowledgeMetadata,

    /// All entities.
    #[serde(default)]
    pub entities: Vec<Entity>,

    /// All relationships.
    #[serde(default)]
    pub entity_relationships: Vec<Relationship>,

    /// Summary counts, recomputed on every merge.
    #[serde(default)]
    pub summary: FactualSummary,
}

// ============================================================================
// Procedural Knowledge
// ============================================================================

/// One step of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// The file this step is grounded in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding: Option<Grounding>,

    /// Extractor-supplied fields this engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A higher-level procedure spanning possibly many files.
///
/// Unlike entities, staleness is not determined by a single owning file: a
/// workflow is affected when its entry point OR any step's grounding file
/// is in the change set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Workflow name.
    #[serde(default)]
    pub name: String,

    /// Workflow type (e.g., "request_handling", "startup").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// What the workflow accomplishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    /// Where the workflow starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<Grounding>,

    /// The workflow's steps.
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,

    /// Extractor-supplied fields this engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workflow {
    /// The workflow type, with the extractor's convention for absent types.
    pub fn kind_or_unknown(&self) -> &str {
        self.kind.as_deref().unwrap_or("unknown")
    }

    /// Check whether this workflow is affected by the change set.
    ///
    /// True when the entry point file or any step's grounding file is in
    /// the change set.
    pub fn is_affected_by(&self, changes: &ChangeSet) -> bool {
        if let Some(entry) = &self.entry_point {
            if changes.contains(&entry.file) {
                return true;
            }
        }

        self.steps.iter().any(|step| {
            step.grounding
                .as_ref()
                .map(|g| changes.contains(&g.file))
                .unwrap_or(false)
        })
    }
}

/// Recomputed summary counts for the procedural document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProceduralSummary {
    /// Total number of workflows.
    #[serde(default)]
    pub total_workflows: usize,

    /// Per-type workflow counts.
    #[serde(default)]
    pub workflow_types: BTreeMap<String, usize>,

    /// When the summary was computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// The procedural knowledge document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProceduralKnowledge {
    /// Document metadata.
    #[serde(default)]
    pub metadata: KnowledgeMetadata,

    /// All workflows.
    #[serde(default)]
    pub workflows: Vec<Workflow>,

    /// Summary counts, recomputed on every merge.
    #[serde(default)]
    pub summary: ProceduralSummary,
}

// ============================================================================
// Conceptual Knowledge
// ============================================================================

/// The conceptual knowledge document.
///
/// Architecture-level facts are not file-granular, so the body is kept
/// opaque and the document is replaced wholesale when a conceptual delta is
/// supplied, or retained verbatim otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptualKnowledge {
    /// Document metadata.
    #[serde(default)]
    pub metadata: KnowledgeMetadata,

    /// The opaque document body (architecture style, patterns, constraints).
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

// ============================================================================
// Histogram helper
// ============================================================================

/// Count occurrences of keys produced by `key_fn`, from scratch.
///
/// Summary histograms are always recomputed from the merged set rather
/// than adjusted incrementally, so counters cannot drift.
pub(crate) fn histogram<T, F>(items: &[T], key_fn: F) -> BTreeMap<String, usize>
where
    F: Fn(&T) -> &str,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key_fn(item).to_string()).or_insert(0) += 1;
    }
    counts
}

// ============================================================================
// Tests
// ============================================================================
