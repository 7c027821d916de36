//! The classified change set driving knowledge invalidation.
//!
//! A [`ChangeSet`] holds the `{modified, added, deleted}` path sets produced
//! by change detection. The three sets are kept pairwise disjoint: every
//! constructor normalizes conflicting raw signals before the set is handed
//! to the merge engine.

use std::collections::BTreeSet;

// ============================================================================
// ChangeSet
// ============================================================================

/// The `{modified, added, deleted}` source paths since the last
/// synchronization point.
///
/// Invariant: the three sets are pairwise disjoint. Raw detection signals
/// may conflict (the same path reported modified by one git query and
/// deleted by another); [`ChangeSet::from_parts`] resolves those conflicts:
///
/// - `deleted` takes precedence over `modified`;
/// - a path both `added` and `deleted` (deleted and recreated between
///   passes) is reclassified as `modified`;
/// - `added` takes precedence over `modified` (a new file that was edited
///   before the pass is still just new).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Paths whose content changed.
    pub modified: BTreeSet<String>,
    /// Paths that did not exist at the last synchronization point.
    pub added: BTreeSet<String>,
    /// Paths that no longer exist.
    pub deleted: BTreeSet<String>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a change set from raw detection signals, resolving overlaps
    /// so the result is pairwise disjoint.
    pub fn from_parts(
        modified: BTreeSet<String>,
        added: BTreeSet<String>,
        deleted: BTreeSet<String>,
    ) -> Self {
        let mut set = Self {
            modified,
            added,
            deleted,
        };
        set.normalize();
        set
    }

    fn normalize(&mut self) {
        // Deleted-then-recreated paths exist now: reclassify as modified.
        let recreated: Vec<String> = self
            .added
            .intersection(&self.deleted)
            .cloned()
            .collect();
        for path in recreated {
            self.added.remove(&path);
            self.deleted.remove(&path);
            self.modified.insert(path);
        }

        // Deleted wins over modified.
        for path in &self.deleted {
            self.modified.remove(path);
        }

        // Added wins over modified.
        for path in &self.added {
            self.modified.remove(path);
        }

        debug_assert!(self.modified.is_disjoint(&self.added));
        debug_assert!(self.modified.is_disjoint(&self.deleted));
        debug_assert!(self.added.is_disjoint(&self.deleted));
    }

    /// Check whether a path appears in any of the three sets.
    pub fn contains(&self, path: &str) -> bool {
        self.modified.contains(path) || self.added.contains(path) || self.deleted.contains(path)
    }

    /// Total number of classified paths.
    pub fn total(&self) -> usize {
        self.modified.len() + self.added.len() + self.deleted.len()
    }

    /// Check whether no paths are classified.
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.added.is_empty() && self.deleted.is_empty()
    }

    /// Iterate over all classified paths.
    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.modified
            .iter()
            .chain(self.added.iter())
            .chain(self.deleted.iter())
    }

    /// Retain only paths accepted by the predicate, across all three sets.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.modified.retain(|p| keep(p));
        self.added.retain(|p| keep(p));
        self.deleted.retain(|p| keep(p));
    }
}

// ============================================================================
// Tests
// ============================================================================
