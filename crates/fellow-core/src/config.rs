//! Per-project configuration.
//!
//! Projects can extend the built-in classification vocabularies with an
//! optional `fellow.yaml` at the project root:
//!
//! ```yaml
//! extra_exclude_dirs:
//!   - generated
//! extra_source_extensions:
//!   - .sql
//! extra_test_segments:
//!   - scenarios
//! ```
//!
//! Extensions only ever widen the exclusion rules or the source-extension
//! set; the fixed vocabularies always apply. An absent file yields the
//! defaults; an unparseable file is reported as a warning and ignored, so
//! a broken config never blocks a synchronization pass.

use std::path::Path;

use serde::{Deserialize, Serialize};

// ============================================================================
// ProjectConfig
// ============================================================================

/// Optional per-project configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Additional directory names to exclude from analysis.
    pub extra_exclude_dirs: Vec<String>,

    /// Additional file extensions to treat as source code.
    pub extra_source_extensions: Vec<String>,

    /// Additional path segments marking test directories.
    pub extra_test_segments: Vec<String>,
}

impl ProjectConfig {
    /// Load the configuration file at the given path.
    ///
    /// Returns the defaults when the file is absent or unparseable; a
    /// parse failure is logged as a warning.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Could not read config at {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_yaml::from_str(&data) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Config invalid at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
