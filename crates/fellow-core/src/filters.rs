//! Source path classification.
//!
//! Pure predicate functions deciding whether a project-relative path is a
//! source file, a test file, or inside an excluded directory. Classification
//! is a total function of the path string: it never touches file contents
//! and never fails.
//!
//! Directory-segment matching is on whole segments: a directory literally
//! named `test` excludes, but `testing_utils` does not. Filename matching is
//! a substring scan and intentionally looser, so `user_test.py` and
//! `api.spec.ts` are both classified as test files.

use std::path::{Component, Path};

use crate::config::ProjectConfig;
use crate::constants::{
    is_excluded_dir, is_source_extension, is_test_segment, TEST_FILENAME_MARKERS,
};

// ============================================================================
// FilterSet
// ============================================================================

/// Classification vocabulary for a project.
///
/// The default value uses the fixed built-in vocabularies. Projects can
/// extend (never shrink) them via [`ProjectConfig`]; the predicates stay
/// pure functions of the path string either way.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    extra_exclude_dirs: Vec<String>,
    extra_source_extensions: Vec<String>,
    extra_test_segments: Vec<String>,
}

impl FilterSet {
    /// Build a filter set from a project configuration.
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            extra_exclude_dirs: config.extra_exclude_dirs.clone(),
            extra_source_extensions: config
                .extra_source_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            extra_test_segments: config.extra_test_segments.clone(),
        }
    }

    /// Check if a path has a recognized source-code extension.
    pub fn is_source_file(&self, path: &str) -> bool {
        let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) else {
            return false;
        };
        is_source_extension(ext)
            || self
                .extra_source_extensions
                .iter()
                .any(|extra| ext.eq_ignore_ascii_case(extra))
    }

    /// Check if a path is test-related.
    ///
    /// True when any whole path segment equals a test marker
    /// (case-insensitively), or the filename contains a test marker as a
    /// substring.
    pub fn is_test_path(&self, path: &str) -> bool {
        let path = Path::new(path);

        for segment in normal_segments(path) {
            if is_test_segment(segment)
                || self
                    .extra_test_segments
                    .iter()
                    .any(|extra| segment.eq_ignore_ascii_case(extra))
            {
                return true;
            }
        }

        if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
            let filename = filename.to_lowercase();
            if TEST_FILENAME_MARKERS
                .iter()
                .any(|marker| filename.contains(marker))
            {
                return true;
            }
        }

        false
    }

    /// Check if any path segment names an excluded directory.
    pub fn is_excluded_path(&self, path: &str) -> bool {
        normal_segments(Path::new(path)).any(|segment| {
            is_excluded_dir(segment) || self.extra_exclude_dirs.iter().any(|d| d == segment)
        })
    }

    /// Check if a path is eligible for knowledge extraction.
    ///
    /// A path is analyzable iff it has a recognized source extension AND no
    /// path segment names an excluded directory AND it is not test-related.
    pub fn should_analyze(&self, path: &str) -> bool {
        self.is_source_file(path) && !self.is_excluded_path(path) && !self.is_test_path(path)
    }
}

/// Iterate over the normal (named) segments of a path, skipping roots,
/// prefixes, and `.`/`..` components.
fn normal_segments(path: &Path) -> impl Iterator<Item = &str> {
    path.components().filter_map(|c| match c {
        Component::Normal(s) => s.to_str(),
        _ => None,
    })
}

// ============================================================================
// Free Functions (default vocabulary)
// ============================================================================

/// Check if a path has a recognized source-code extension.
pub fn is_source_file(path: &str) -> bool {
    FilterSet::default().is_source_file(path)
}

/// Check if a path is test-related.
pub fn is_test_path(path: &str) -> bool {
    FilterSet::default().is_test_path(path)
}

/// Check if any path segment names an excluded directory.
pub fn is_excluded_path(path: &str) -> bool {
    FilterSet::default().is_excluded_path(path)
}

/// Check if a path is eligible for knowledge extraction.
pub fn should_analyze(path: &str) -> bool {
    FilterSet::default().should_analyze(path)
}

// ============================================================================
// Tests
// ============================================================================
