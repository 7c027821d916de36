//! CLI definition and command dispatch for Fellow.
//!
//! This module defines the command-line interface using `clap` and provides
//! the `run()` function that dispatches commands to the engine.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::ui::{format, table, ColorMode, MessageType, Style};

use fellow_core::{collect_git_info, FellowEngine, FellowError, SyncOutcome};

// ============================================================================
// CLI Definition
// ============================================================================

/// Fellow – incremental knowledge-store synchronization
#[derive(Parser, Debug)]
#[command(name = "fellow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "FELLOW_VERBOSE")]
    pub verbose: bool,

    /// Suppress hints and informational trailers
    #[arg(short, long, global = true, env = "FELLOW_QUIET")]
    pub quiet: bool,

    /// Color output mode
    #[arg(
        long,
        global = true,
        env = "FELLOW_COLOR",
        value_enum,
        default_value = "auto"
    )]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect source files changed since the last extraction
    #[command(after_help = r#"EXAMPLES:
    # Detect changes in the current project
    fellow detect

    # Detect changes in another project
    fellow detect ../other-project

    # Machine-readable output for the extraction pipeline
    fellow detect --json
"#)]
    Detect {
        /// Project path. Defaults to the current directory.
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Merge pending delta documents into the knowledge store
    #[command(after_help = r#"EXAMPLES:
    # Merge extractor output for the current project
    fellow sync

    # Merge statistics as JSON for scripting
    fellow sync --json
"#)]
    Sync {
        /// Project path. Defaults to the current directory.
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show the current knowledge-store status
    #[command(after_help = r#"EXAMPLES:
    # Show store summary
    fellow status

    # Get status as JSON for scripting
    fellow status --json
"#)]
    Status {
        /// Project path. Defaults to the current directory.
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Check whether paths are eligible for knowledge extraction
    #[command(after_help = r#"EXAMPLES:
    # Check a single file
    fellow check src/main.py

    # Check several files; exits non-zero if any is skipped
    fellow check src/main.py tests/api.py
"#)]
    Check {
        /// Paths to classify (project-relative).
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Show repository information recorded with the store metadata
    #[command(name = "git-info", after_help = r#"EXAMPLES:
    # Basic repository information
    fellow git-info

    # Include remote URL and latest commit details
    fellow git-info --detailed
"#)]
    GitInfo {
        /// Project path. Defaults to the current directory.
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Include remote URL and latest commit message/author/date
        #[arg(long)]
        detailed: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Entry Point
// ============================================================================

/// Parse command-line arguments and dispatch to the engine.
///
/// # Returns
///
/// Returns `ExitCode::SUCCESS` on success, or `ExitCode::FAILURE` on error.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    // - Always show warnings (degraded git queries, config issues, etc.)
    // - Show debug info only when --verbose is set
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = format!("fellow_core={},fellow_cli={}", log_level, log_level);

    tracing_subscriber::fmt()
        .with_env_filter(&filter)
        .with_target(false)
        .init();

    let style = Style::new(cli.color);

    let engine = FellowEngine::new();
    tracing::debug!("Dispatching command: {:?}", cli.command);

    let result = match cli.command {
        Command::Detect { path, json } => handle_detect(&style, &engine, &path, json, cli.quiet),
        Command::Sync { path, json } => handle_sync(&style, &engine, &path, json),
        Command::Status { path, json } => handle_status(&style, &engine, &path, json),
        Command::Check { paths } => return handle_check(&engine, paths),
        Command::GitInfo {
            path,
            detailed,
            json,
        } => handle_git_info(&style, &engine, &path, detailed, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let hint = match &e {
                FellowError::MetadataMissing => {
                    Some("Run a full extraction to create the store first")
                }
                FellowError::DeltaMissing { .. } => {
                    Some("Run the extractor for the changed files, then retry")
                }
                _ => None,
            };
            eprintln!("{}", style.error_with_context(&e.to_string(), None, hint));
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Command handlers
// ============================================================================

fn handle_detect(
    style: &Style,
    engine: &FellowEngine,
    path: &Path,
    json: bool,
    quiet: bool,
) -> Result<(), FellowError> {
    let workspace = engine.resolve_workspace(path)?;
    let report = engine.detect(&workspace)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.requires_full_extraction() {
        println!(
            "{}",
            style.message(MessageType::Info, "No extraction metadata found")
        );
        println!(
            "{}",
            style.message_detail("Mode", "full extraction (no previous synchronization point)")
        );
        if !quiet {
            println!(
                "{}",
                style.message(
                    MessageType::Hint,
                    "All source files will be analyzed; build dirs and test files are excluded"
                )
            );
        }
        return Ok(());
    }

    if report.is_up_to_date() {
        println!(
            "{}",
            style.message(MessageType::Ok, "Knowledge store is up to date")
        );
        println!(
            "{}",
            style.message_detail("Detection method", &detection_method_label(&report))
        );
        return Ok(());
    }

    println!(
        "{}",
        style.section("FILES CHANGED SINCE LAST EXTRACTION")
    );
    print_path_bucket(style, "~", "Modified", &report.modified);
    print_path_bucket(style, "+", "New", &report.new);
    print_path_bucket(style, "-", "Deleted", &report.deleted);

    println!();
    println!(
        "{}",
        style.message_detail("Total", &format!("{} files to re-analyze", report.total))
    );
    println!(
        "{}",
        style.message_detail("Detection method", &detection_method_label(&report))
    );
    if !quiet {
        println!(
            "{}",
            style.message(
                MessageType::Hint,
                "Run the extractor for these files, then `fellow sync` to merge"
            )
        );
    }

    Ok(())
}

/// Print up to ten paths of one change bucket, with an overflow trailer.
fn print_path_bucket(style: &Style, marker: &str, label: &str, paths: &[String]) {
    if paths.is_empty() {
        return;
    }

    println!();
    println!("  {} ({} files):", label, paths.len());
    for path in paths.iter().take(10) {
        println!("{}", style.list_item(marker, &style.file_path(path)));
    }
    if paths.len() > 10 {
        println!("    ... and {} more", paths.len() - 10);
    }
}

fn detection_method_label(report: &fellow_core::DetectionReport) -> String {
    match report.detection_method {
        Some(fellow_core::DetectionMethod::Vcs) => "vcs".to_string(),
        Some(fellow_core::DetectionMethod::FileComparison) => "file_comparison".to_string(),
        None => "-".to_string(),
    }
}

fn handle_sync(
    style: &Style,
    engine: &FellowEngine,
    path: &Path,
    json: bool,
) -> Result<(), FellowError> {
    let workspace = engine.resolve_workspace(path)?;
    let report = engine.detect(&workspace)?;

    let outcome = engine.sync(&workspace, &report)?;

    match outcome {
        SyncOutcome::UpToDate => {
            if json {
                println!("{}", serde_json::json!({ "status": "up_to_date" }));
            } else {
                println!(
                    "{}",
                    style.message(
                        MessageType::Skip,
                        "Nothing to merge; knowledge store is up to date"
                    )
                );
            }
        }
        SyncOutcome::Merged(stats) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }

            println!(
                "{}",
                style.message(MessageType::Ok, "Knowledge store updated (incremental)")
            );
            println!();
            println!("{}", style.section("MERGE STATISTICS"));
            println!();
            println!("  Factual knowledge:");
            println!(
                "{}",
                style.message_detail(
                    "Entities removed",
                    &format!("{} (from changed files)", stats.factual.entities_removed)
                )
            );
            println!(
                "{}",
                style.message_detail(
                    "Entities added",
                    &format!("{} (new extraction)", stats.factual.entities_added)
                )
            );
            println!(
                "{}",
                style.message_detail(
                    "Relationships updated",
                    &stats.factual.relationships_updated.to_string()
                )
            );
            println!();
            println!("  Procedural knowledge:");
            println!(
                "{}",
                style.message_detail(
                    "Workflows updated",
                    &stats.procedural.workflows_updated.to_string()
                )
            );
            println!(
                "{}",
                style.message_detail(
                    "Workflows added",
                    &stats.procedural.workflows_added.to_string()
                )
            );
            println!();
            println!("  Conceptual knowledge:");
            let conceptual_label = match stats.conceptual.status {
                fellow_core::UpdateType::ArchitecturalChange => "architectural change applied",
                fellow_core::UpdateType::NoChange => "no change",
            };
            println!("{}", style.message_detail("Status", conceptual_label));
        }
    }

    Ok(())
}

fn handle_status(
    style: &Style,
    engine: &FellowEngine,
    path: &Path,
    json: bool,
) -> Result<(), FellowError> {
    let workspace = engine.resolve_workspace(path)?;
    let status = engine.status(&workspace)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", style.section("STATUS"));
    println!(
        "{}",
        style.key_value("Project", &status.project_root.display().to_string())
    );
    println!(
        "{}",
        style.key_value("Initialized", if status.initialized { "yes" } else { "no" })
    );
    println!(
        "{}",
        style.key_value(
            "Detection method",
            match status.detection_method {
                fellow_core::DetectionMethod::Vcs => "vcs",
                fellow_core::DetectionMethod::FileComparison => "file_comparison",
            }
        )
    );

    if let Some(commit) = &status.last_commit {
        println!("{}", style.key_value("Last commit", &style.commit(commit)));
    }
    if let Some(tracked) = status.tracked_files {
        println!(
            "{}",
            style.key_value("Tracked files", &format::format_thousands(tracked as u64))
        );
    }
    if let Some(ts) = status.last_incremental_extraction {
        println!(
            "{}",
            style.key_value("Last incremental", &format::format_relative_time(ts))
        );
    }
    if let Some(ts) = status.last_full_extraction {
        println!(
            "{}",
            style.key_value("Last full", &format::format_relative_time(ts))
        );
    }
    println!(
        "{}",
        style.key_value(
            "Pending deltas",
            if status.pending_deltas { "yes" } else { "no" }
        )
    );

    let rows = vec![
        table::CountRow::new("entities", status.total_entities),
        table::CountRow::new("relationships", status.total_relationships),
        table::CountRow::new("workflows", status.total_workflows),
    ];
    println!();
    println!("{}", table::render_counts_table(&rows));

    Ok(())
}

fn handle_check(engine: &FellowEngine, paths: Vec<String>) -> ExitCode {
    // Classification extensions come from the enclosing project's config,
    // when one can be resolved; plain defaults otherwise.
    let filters = engine
        .resolve_workspace(std::path::Path::new("."))
        .map(|ws| engine.filters_for(&ws))
        .unwrap_or_default();

    let mut any_skipped = false;
    for path in &paths {
        if filters.should_analyze(path) {
            println!("ANALYZE: {}", path);
        } else {
            println!("SKIP: {}", path);
            any_skipped = true;
        }
    }

    if any_skipped {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn handle_git_info(
    style: &Style,
    engine: &FellowEngine,
    path: &Path,
    detailed: bool,
    json: bool,
) -> Result<(), FellowError> {
    let workspace = engine.resolve_workspace(path)?;
    let info = collect_git_info(workspace.root(), detailed);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", style.section("REPOSITORY"));

    if !info.is_git_repo {
        println!(
            "{}",
            style.message(MessageType::Warn, "Not a git repository")
        );
        return Ok(());
    }

    if let Some(commit) = &info.commit_hash {
        println!("{}", style.key_value("Commit", &style.commit(commit)));
    }
    if let Some(branch) = &info.branch {
        println!("{}", style.key_value("Branch", branch));
    }
    if let Some(dirty) = info.has_uncommitted_changes {
        println!(
            "{}",
            style.key_value("Uncommitted changes", if dirty { "yes" } else { "no" })
        );
    }
    if let Some(url) = &info.remote_url {
        println!("{}", style.key_value("Remote", url));
    }
    if let Some(message) = &info.commit_message {
        let first_line = message.lines().next().unwrap_or("");
        println!(
            "{}",
            style.key_value("Latest commit", &format::truncate_str(first_line, 60))
        );
    }
    if let Some(author) = &info.commit_author {
        println!("{}", style.key_value("Author", author));
    }
    if let Some(date) = &info.commit_date {
        println!("{}", style.key_value("Date", date));
    }

    Ok(())
}
