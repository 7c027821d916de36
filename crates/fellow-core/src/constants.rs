//! Common constants used throughout fellow-core.
//!
//! This module centralizes the fixed classification vocabularies (excluded
//! directories, test markers, source extensions) and the on-disk names of
//! the knowledge store, to avoid duplication and ensure consistency across
//! the codebase.

// ============================================================================
// Directory Names
// ============================================================================

/// The name of the Fellow data directory within a project.
///
/// All Fellow-managed data lives under `.fellow-data/` at the project root.
pub const FELLOW_DATA_DIR: &str = ".fellow-data";

/// The subdirectory within `.fellow-data` that stores the semantic
/// knowledge store.
///
/// Layout: `.fellow-data/semantic/*.json`
pub const SEMANTIC_DIR: &str = "semantic";

/// The name of the optional per-project configuration file.
pub const PROJECT_CONFIG_FILENAME: &str = "fellow.yaml";

// ============================================================================
// Store Filenames
// ============================================================================

/// Persisted extraction metadata (file registry, last commit, timestamps).
pub const EXTRACTION_METADATA_FILENAME: &str = "extraction_metadata.json";

/// Merged factual knowledge (entities and relationships).
pub const FACTUAL_FILENAME: &str = "factual_knowledge.json";

/// Merged procedural knowledge (workflows).
pub const PROCEDURAL_FILENAME: &str = "procedural_knowledge.json";

/// Merged conceptual knowledge (architecture-level facts).
pub const CONCEPTUAL_FILENAME: &str = "conceptual_knowledge.json";

/// Transient factual delta produced by the external extractor.
pub const FACTUAL_DELTA_FILENAME: &str = "factual_knowledge_delta.json";

/// Transient procedural delta produced by the external extractor.
pub const PROCEDURAL_DELTA_FILENAME: &str = "procedural_knowledge_delta.json";

/// Transient conceptual delta produced by the external extractor (optional).
pub const CONCEPTUAL_DELTA_FILENAME: &str = "conceptual_knowledge_delta.json";

// ============================================================================
// Excluded Directories
// ============================================================================

/// Directory names that exclude a path from analysis when they appear as
/// any whole segment of the path.
///
/// Covers version control, build output, dependencies, IDE/cache
/// directories, and Fellow's own data directory.
pub const EXCLUDED_DIRS: &[&str] = &[
    // Version control
    ".git",
    ".svn",
    ".hg",
    // Build outputs and generated code
    "dist",
    "build",
    "out",
    "target",
    "bin",
    "obj",
    ".next",
    ".nuxt",
    ".output",
    ".vitepress",
    "coverage",
    ".nyc_output",
    // Dependencies
    "node_modules",
    "bower_components",
    "vendor",
    "packages",
    "venv",
    ".venv",
    "env",
    ".env",
    "__pycache__",
    ".pytest_cache",
    // IDE and editor files
    ".idea",
    ".vscode",
    ".vs",
    // Fellow data
    FELLOW_DATA_DIR,
    // Other common generated/cache directories
    ".cache",
    "tmp",
    "temp",
    ".parcel-cache",
    ".webpack",
];

/// Check if a directory name should exclude a path from analysis.
///
/// Matching is on the whole segment name, never on substrings.
#[inline]
pub fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}

// ============================================================================
// Test Path Markers
// ============================================================================

/// Path segments that mark a path as test-related.
///
/// Matched against whole path segments, case-insensitively. A directory
/// literally named `test` excludes; a directory named `testing_utils`
/// does not.
pub const TEST_SEGMENTS: &[&str] = &[
    "test",
    "tests",
    "__tests__",
    "spec",
    "specs",
    "e2e",
    "integration",
    "fixtures",
    "mocks",
];

/// Filename markers for test files.
///
/// Matched as substrings of the filename only, case-insensitively. This is
/// intentionally looser than the whole-segment directory match and also
/// covers suffix conventions such as `*.test.ts`, `*.spec.js`, and
/// `*_test.py`.
pub const TEST_FILENAME_MARKERS: &[&str] = &["test", "spec", "mock", "fixture"];

/// Check if a path segment marks a test directory.
#[inline]
pub fn is_test_segment(segment: &str) -> bool {
    TEST_SEGMENTS
        .iter()
        .any(|marker| segment.eq_ignore_ascii_case(marker))
}

// ============================================================================
// Source File Extensions
// ============================================================================

/// File extensions (without the leading dot) recognized as source code.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "tsx", "jsx", "java", "go", "rs", "c", "cpp", "h", "hpp", "cs", "rb", "php",
    "swift", "kt", "scala", "sh", "bash",
];

/// Check if a file extension indicates source code.
///
/// # Arguments
///
/// * `ext` - The file extension to check (without the leading dot).
#[inline]
pub fn is_source_extension(ext: &str) -> bool {
    SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

// ============================================================================
// Tests
// ============================================================================
