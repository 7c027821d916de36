//! Project workspace resolution.
//!
//! A [`Workspace`] ties a project root to its knowledge store on disk:
//! where the store's documents live, whether a store exists yet, and
//! whether git history is available for change detection.

use std::path::{Path, PathBuf};

use crate::constants::{
    CONCEPTUAL_DELTA_FILENAME, CONCEPTUAL_FILENAME, EXTRACTION_METADATA_FILENAME,
    FACTUAL_DELTA_FILENAME, FACTUAL_FILENAME, FELLOW_DATA_DIR, PROCEDURAL_DELTA_FILENAME,
    PROCEDURAL_FILENAME, PROJECT_CONFIG_FILENAME, SEMANTIC_DIR,
};
use crate::errors::FellowError;
use crate::knowledge::KnowledgeCategory;

/// Check if an already-canonicalized path is the root of a filesystem
/// (`/`, or a drive root like `C:\` on Windows).
///
/// A disk root is never an acceptable project: the fallback tree walk
/// would scan the whole disk.
fn is_disk_root(path: &Path) -> bool {
    path.parent().is_none()
}

// ============================================================================
// Workspace
// ============================================================================

/// A resolved project and its knowledge store on disk.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Canonical path to the project root.
    root: PathBuf,

    /// The knowledge-store directory (`.fellow-data/semantic`).
    semantic_dir: PathBuf,

    /// Whether the root has a `.git` directory.
    has_git: bool,

    /// Whether the knowledge-store directory exists.
    initialized: bool,
}

impl Workspace {
    /// Create a workspace for an explicit project root.
    ///
    /// # Errors
    ///
    /// [`FellowError::PathNotFound`] when the path does not exist or is
    /// not a directory; [`FellowError::InvalidPath`] for disk roots.
    pub fn from_root(root: &Path) -> Result<Self, FellowError> {
        let root = root
            .canonicalize()
            .map_err(|_| FellowError::PathNotFound(root.display().to_string()))?;

        if !root.is_dir() {
            return Err(FellowError::PathNotFound(root.display().to_string()));
        }

        if is_disk_root(&root) {
            return Err(FellowError::InvalidPath(format!(
                "Cannot use a disk root as a project: {}. \
                 Point Fellow at a project directory instead.",
                root.display()
            )));
        }

        let semantic_dir = root.join(FELLOW_DATA_DIR).join(SEMANTIC_DIR);
        let has_git = root.join(".git").is_dir();
        let initialized = semantic_dir.is_dir();

        Ok(Self {
            root,
            semantic_dir,
            has_git,
            initialized,
        })
    }

    /// Resolve a workspace by walking up from the given directory.
    ///
    /// The nearest ancestor carrying a `.fellow-data` or `.git` marker
    /// wins. With no marker anywhere up the chain, the starting directory
    /// itself becomes the candidate root, so a first full extraction can
    /// target any directory.
    pub fn resolve(start_dir: &Path) -> Result<Self, FellowError> {
        let start = start_dir
            .canonicalize()
            .map_err(|_| FellowError::PathNotFound(start_dir.display().to_string()))?;

        let mut current = start.as_path();
        while !is_disk_root(current) {
            if current.join(FELLOW_DATA_DIR).is_dir() || current.join(".git").is_dir() {
                return Self::from_root(current);
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Self::from_root(&start)
    }

    /// Get the absolute path to the project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path to the `.fellow-data` directory.
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(FELLOW_DATA_DIR)
    }

    /// Get the path to the knowledge-store directory
    /// (`.fellow-data/semantic`).
    pub fn semantic_dir(&self) -> &Path {
        &self.semantic_dir
    }

    /// Check if this workspace has a `.git` directory.
    pub fn has_git(&self) -> bool {
        self.has_git
    }

    /// Check if a knowledge store exists for this workspace.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Get the path to the extraction metadata document.
    pub fn metadata_path(&self) -> PathBuf {
        self.semantic_dir.join(EXTRACTION_METADATA_FILENAME)
    }

    /// Get the path to a merged knowledge document.
    pub fn knowledge_path(&self, category: KnowledgeCategory) -> PathBuf {
        let filename = match category {
            KnowledgeCategory::Factual => FACTUAL_FILENAME,
            KnowledgeCategory::Procedural => PROCEDURAL_FILENAME,
            KnowledgeCategory::Conceptual => CONCEPTUAL_FILENAME,
        };
        self.semantic_dir.join(filename)
    }

    /// Get the path to a transient delta document.
    pub fn delta_path(&self, category: KnowledgeCategory) -> PathBuf {
        let filename = match category {
            KnowledgeCategory::Factual => FACTUAL_DELTA_FILENAME,
            KnowledgeCategory::Procedural => PROCEDURAL_DELTA_FILENAME,
            KnowledgeCategory::Conceptual => CONCEPTUAL_DELTA_FILENAME,
        };
        self.semantic_dir.join(filename)
    }

    /// Get the path to the optional per-project configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(PROJECT_CONFIG_FILENAME)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_workspace_from_root_with_git() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        let workspace = Workspace::from_root(temp.path()).unwrap();
        assert!(workspace.has_git());
        assert!(!workspace.is_initialized());
    }

    #[test]
    fn test_workspace_from_root_with_store() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".fellow-data/semantic")).unwrap();

        let workspace = Workspace::from_root(temp.path()).unwrap();
        assert!(!workspace.has_git());
        assert!(workspace.is_initialized());
    }

    #[test]
    fn test_workspace_from_root_missing_path() {
        let temp = TempDir::new().unwrap();
        let result = Workspace::from_root(&temp.path().join("does-not-exist"));
        assert!(matches!(result, Err(FellowError::PathNotFound(_))));
    }

    #[test]
    fn test_workspace_resolve_from_subdir() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".fellow-data/semantic")).unwrap();
        let subdir = temp.path().join("src/deep/nested");
        fs::create_dir_all(&subdir).unwrap();

        let workspace = Workspace::resolve(&subdir).unwrap();
        assert_eq!(
            workspace.root().canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_workspace_resolve_prefers_nearest_marker() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        // A nested project with its own data directory wins over the
        // enclosing git repository.
        let subdir = temp.path().join("project");
        fs::create_dir_all(subdir.join(".fellow-data/semantic")).unwrap();
        let deep = subdir.join("src");
        fs::create_dir_all(&deep).unwrap();

        let workspace = Workspace::resolve(&deep).unwrap();
        assert_eq!(
            workspace.root().canonicalize().unwrap(),
            subdir.canonicalize().unwrap()
        );
    }

    #[test]
    fn test_workspace_paths() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".fellow-data/semantic")).unwrap();

        let workspace = Workspace::from_root(temp.path()).unwrap();

        // Compare suffixes; tempdirs sit behind a symlink on macOS
        assert!(workspace.semantic_dir().ends_with(".fellow-data/semantic"));
        assert!(workspace
            .metadata_path()
            .ends_with(".fellow-data/semantic/extraction_metadata.json"));
        assert!(workspace
            .knowledge_path(KnowledgeCategory::Factual)
            .ends_with(".fellow-data/semantic/factual_knowledge.json"));
        assert!(workspace
            .delta_path(KnowledgeCategory::Conceptual)
            .ends_with(".fellow-data/semantic/conceptual_knowledge_delta.json"));
        assert!(workspace.config_path().ends_with("fellow.yaml"));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_workspace_from_root_rejects_unix_root() {
        match Workspace::from_root(Path::new("/")) {
            Err(FellowError::InvalidPath(msg)) => assert!(msg.contains("disk root")),
            other => panic!("disk root should be rejected, got {:?}", other.map(|_| ())),
        }
    }
}
