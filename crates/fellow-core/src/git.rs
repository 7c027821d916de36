//! Git queries for change detection and store metadata.
//!
//! All subprocess invocations take an explicit repository root passed via
//! `Command::current_dir`; the process-wide working directory is never
//! mutated to target a repository. Every invocation is a bounded one-shot
//! query; failures are surfaced as [`FellowError::GitUnavailable`] and
//! callers degrade to fingerprint comparison rather than aborting.

use std::path::Path;
use std::process::{Command, Output};

use serde::{Deserialize, Serialize};

use crate::errors::FellowError;

// ============================================================================
// Runner
// ============================================================================

/// Run a git command against an explicit repository root.
fn run_git(args: &[&str], repo_root: &Path) -> Result<Output, FellowError> {
    Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .output()
        .map_err(|e| FellowError::GitUnavailable {
            reason: format!("failed to execute `git {}`: {}", args.join(" "), e),
        })
}

/// Run a git command, check for success, and return stdout as a trimmed
/// string.
fn run_git_checked(args: &[&str], repo_root: &Path) -> Result<String, FellowError> {
    let output = run_git(args, repo_root)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FellowError::GitUnavailable {
            reason: format!(
                "`git {}` failed: {}",
                args.first().unwrap_or(&""),
                stderr.trim()
            ),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

// ============================================================================
// Repository Queries
// ============================================================================

/// Check if the given directory is a git repository root.
pub fn is_git_repo(repo_root: &Path) -> bool {
    repo_root.join(".git").is_dir()
}

/// Get the current HEAD commit hash.
pub fn current_commit(repo_root: &Path) -> Result<String, FellowError> {
    run_git_checked(&["rev-parse", "HEAD"], repo_root)
}

/// Get the current branch name (`HEAD` when detached).
pub fn current_branch(repo_root: &Path) -> Result<String, FellowError> {
    run_git_checked(&["rev-parse", "--abbrev-ref", "HEAD"], repo_root)
}

/// Check if the working tree has uncommitted, staged, or untracked changes.
///
/// Query failures are reported as "clean"; this feeds informational
/// metadata only, never invalidation decisions.
pub fn has_uncommitted_changes(repo_root: &Path) -> bool {
    let dirty_worktree = run_git(&["diff", "--quiet"], repo_root)
        .map(|o| !o.status.success())
        .unwrap_or(false);
    if dirty_worktree {
        return true;
    }

    let dirty_index = run_git(&["diff", "--cached", "--quiet"], repo_root)
        .map(|o| !o.status.success())
        .unwrap_or(false);
    if dirty_index {
        return true;
    }

    untracked_files(repo_root)
        .map(|files| !files.is_empty())
        .unwrap_or(false)
}

/// Get the URL of the `origin` remote, if configured.
pub fn remote_url(repo_root: &Path) -> Option<String> {
    run_git_checked(&["remote", "get-url", "origin"], repo_root).ok()
}

/// Get the latest commit message.
pub fn last_commit_message(repo_root: &Path) -> Option<String> {
    run_git_checked(&["log", "-1", "--pretty=%B"], repo_root).ok()
}

/// Get the latest commit author as `Name <email>`.
pub fn last_commit_author(repo_root: &Path) -> Option<String> {
    run_git_checked(&["log", "-1", "--pretty=%an <%ae>"], repo_root).ok()
}

/// Get the latest commit date in ISO format.
pub fn last_commit_date(repo_root: &Path) -> Option<String> {
    run_git_checked(&["log", "-1", "--pretty=%aI"], repo_root).ok()
}

// ============================================================================
// GitInfo
// ============================================================================

/// Repository metadata recorded alongside the extraction state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitInfo {
    /// Whether the project root is a git repository.
    pub is_git_repo: bool,

    /// Current HEAD commit hash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,

    /// Current branch name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Whether uncommitted changes are present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_uncommitted_changes: Option<bool>,

    /// Remote URL of `origin` (detailed mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,

    /// Latest commit message (detailed mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,

    /// Latest commit author (detailed mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_author: Option<String>,

    /// Latest commit date (detailed mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_date: Option<String>,
}

impl GitInfo {
    /// Build the record for a directory that is not a git repository.
    pub fn not_a_repo() -> Self {
        Self {
            is_git_repo: false,
            commit_hash: None,
            branch: None,
            has_uncommitted_changes: None,
            remote_url: None,
            commit_message: None,
            commit_author: None,
            commit_date: None,
        }
    }
}

/// Collect repository metadata for a project root.
///
/// When `detailed` is set, also gathers the remote URL and latest commit
/// message/author/date. Individual query failures leave the corresponding
/// field unset.
pub fn collect_git_info(repo_root: &Path, detailed: bool) -> GitInfo {
    if !is_git_repo(repo_root) {
        return GitInfo::not_a_repo();
    }

    let mut info = GitInfo {
        is_git_repo: true,
        commit_hash: current_commit(repo_root).ok(),
        branch: current_branch(repo_root).ok(),
        has_uncommitted_changes: Some(has_uncommitted_changes(repo_root)),
        remote_url: None,
        commit_message: None,
        commit_author: None,
        commit_date: None,
    };

    if detailed {
        info.remote_url = remote_url(repo_root);
        info.commit_message = last_commit_message(repo_root);
        info.commit_author = last_commit_author(repo_root);
        info.commit_date = last_commit_date(repo_root);
    }

    info
}

// ============================================================================
// Diff Parsing
// ============================================================================

/// Classification of a single path in a name-status diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    /// The path was modified.
    Modified,
    /// The path was added.
    Added,
    /// The path was deleted.
    Deleted,
}

/// One classified path from a name-status diff.
///
/// Rename records are decomposed into a `Deleted` entry for the old path
/// and an `Added` entry for the new path before they reach this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    /// The change classification.
    pub kind: DiffKind,
    /// Repository-relative path.
    pub path: String,
}

/// Diff committed changes between two revisions.
pub fn diff_commits(repo_root: &Path, from: &str, to: &str) -> Result<Vec<DiffEntry>, FellowError> {
    let output = run_git_checked(&["diff", "--name-status", from, to], repo_root)?;
    Ok(parse_name_status(&output))
}

/// Diff uncommitted changes in the working tree.
pub fn diff_worktree(repo_root: &Path) -> Result<Vec<DiffEntry>, FellowError> {
    let output = run_git_checked(&["diff", "--name-status"], repo_root)?;
    Ok(parse_name_status(&output))
}

/// Diff staged changes.
pub fn diff_staged(repo_root: &Path) -> Result<Vec<DiffEntry>, FellowError> {
    let output = run_git_checked(&["diff", "--cached", "--name-status"], repo_root)?;
    Ok(parse_name_status(&output))
}

/// List untracked files (respecting ignore rules).
pub fn untracked_files(repo_root: &Path) -> Result<Vec<String>, FellowError> {
    let output = run_git_checked(&["ls-files", "--others", "--exclude-standard"], repo_root)?;
    Ok(output
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect())
}

/// Parse `git diff --name-status` output into classified entries.
///
/// Rename records (`R<score>\told\tnew`) become delete(old) + add(new):
/// downstream consumers only understand add/modify/delete. A rename record
/// that does not split into exactly old and new paths is skipped with a
/// warning, since a path containing a tab would make the record ambiguous.
fn parse_name_status(output: &str) -> Vec<DiffEntry> {
    let mut entries = Vec::new();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }

        let Some((status, rest)) = line.split_once('\t') else {
            continue;
        };

        match status.chars().next() {
            Some('M') => entries.push(DiffEntry {
                kind: DiffKind::Modified,
                path: rest.to_string(),
            }),
            Some('A') => entries.push(DiffEntry {
                kind: DiffKind::Added,
                path: rest.to_string(),
            }),
            Some('D') => entries.push(DiffEntry {
                kind: DiffKind::Deleted,
                path: rest.to_string(),
            }),
            Some('R') => {
                let mut paths = rest.split('\t');
                match (paths.next(), paths.next(), paths.next()) {
                    (Some(old), Some(new), None) => {
                        entries.push(DiffEntry {
                            kind: DiffKind::Deleted,
                            path: old.to_string(),
                        });
                        entries.push(DiffEntry {
                            kind: DiffKind::Added,
                            path: new.to_string(),
                        });
                    }
                    _ => {
                        tracing::warn!("Skipping ambiguous rename record: {}", line);
                    }
                }
            }
            _ => {
                tracing::debug!("Ignoring diff record with status `{}`", status);
            }
        }
    }

    entries
}

// ============================================================================
// Tests
// ============================================================================
