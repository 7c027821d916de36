//! Content fingerprinting for change detection.
//!
//! When version-control history is unavailable, Fellow detects modified
//! files by comparing a content digest against the one recorded in the
//! file registry. Digests are prefixed with an algorithm tag
//! (`sha256:<hex>`) so a future algorithm change remains self-describing.
//!
//! An unreadable file yields no fingerprint rather than an error. Callers
//! treat the absence of a digest as "no signal": a transient I/O failure
//! must never flag a file as modified, since a missed change is corrected
//! on the next pass while a false positive triggers needless re-extraction.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The digest algorithm used for content fingerprints.
pub const FINGERPRINT_ALGORITHM: &str = "sha256";

const READ_CHUNK_SIZE: usize = 8192;

// ============================================================================
// Fingerprint
// ============================================================================

/// An algorithm-tagged content digest, e.g. `sha256:9f86d08...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(format!(
            "{}:{}",
            FINGERPRINT_ALGORITHM,
            hex::encode(hasher.finalize())
        ))
    }

    /// Get the full tagged digest string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the algorithm tag portion of the digest.
    pub fn algorithm(&self) -> Option<&str> {
        self.0.split_once(':').map(|(tag, _)| tag)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// File Fingerprinting
// ============================================================================

/// Compute the content fingerprint of a file.
///
/// Streams the file through SHA-256 in fixed-size chunks, so large files
/// are hashed without loading them into memory.
///
/// Returns `None` if the file cannot be opened or read. Callers must treat
/// `None` as "no signal" rather than "changed".
pub fn fingerprint_file(path: &Path) -> Option<Fingerprint> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!("Could not open {} for fingerprinting: {}", path.display(), e);
            return None;
        }
    };

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; READ_CHUNK_SIZE];

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) => {
                tracing::debug!("Read error while fingerprinting {}: {}", path.display(), e);
                return None;
            }
        }
    }

    Some(Fingerprint(format!(
        "{}:{}",
        FINGERPRINT_ALGORITHM,
        hex::encode(hasher.finalize())
    )))
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
    fn test_fingerprint_is_tagged() {
        let fp = Fingerprint::from_bytes(b"hello");
        assert!(fp.as_str().starts_with("sha256:"));
        assert_eq!(fp.algorithm(), Some("sha256"));
    }

    #[test]
    fn test_fingerprint_known_value() {
        // SHA-256 of the empty string
        let fp = Fingerprint::from_bytes(b"");
        assert_eq!(
            fp.as_str(),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fingerprint_file_matches_bytes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.py");
        fs::write(&path, "def main(): pass\n").unwrap();

        let from_file = fingerprint_file(&path).unwrap();
        let from_bytes = Fingerprint::from_bytes(b"def main(): pass\n");
        assert_eq!(from_file, from_bytes);
    }

    #[test]
    fn test_fingerprint_file_is_stable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.py");
        fs::write(&path, "x = 1\n").unwrap();

        // Re-reading an untouched file yields the same digest
        assert_eq!(fingerprint_file(&path), fingerprint_file(&path));
    }

    #[test]
    fn test_fingerprint_file_changes_with_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.py");
        fs::write(&path, "x = 1\n").unwrap();
        let before = fingerprint_file(&path).unwrap();

        fs::write(&path, "x = 2\n").unwrap();
        let after = fingerprint_file(&path).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_fingerprint_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(fingerprint_file(&temp.path().join("missing.py")), None);
    }
}
