//! End-to-end flows through the fellow binary: detect, sync, status.

mod common;

use common::{fellow_cmd, seed_deltas, seed_store};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn detect_without_metadata_reports_full_extraction() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join(".fellow-data/semantic")).unwrap();

    fellow_cmd()
        .args(["detect", "--json"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"no_metadata\""))
        .stdout(predicate::str::contains("\"mode\": \"full\""));
}

#[test]
fn detect_reports_modified_file() {
    let temp = TempDir::new().unwrap();
    seed_store(temp.path());

    // Edit a.py; the store still remembers the original fingerprint
    std::fs::write(temp.path().join("a.py"), "version TWO of a").unwrap();

    fellow_cmd()
        .args(["detect", "--json"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"incremental\""))
        .stdout(predicate::str::contains("a.py"))
        .stdout(predicate::str::contains("\"detection_method\": \"file_comparison\""));
}

#[test]
fn detect_human_output_lists_changes() {
    let temp = TempDir::new().unwrap();
    seed_store(temp.path());
    std::fs::write(temp.path().join("a.py"), "edited").unwrap();
    std::fs::write(temp.path().join("c.py"), "brand new").unwrap();
    std::fs::remove_file(temp.path().join("b.py")).unwrap();

    fellow_cmd()
        .arg("detect")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Modified (1 files)"))
        .stdout(predicate::str::contains("New (1 files)"))
        .stdout(predicate::str::contains("Deleted (1 files)"))
        .stdout(predicate::str::contains("3 files to re-analyze"));
}

#[test]
fn sync_merges_deltas_and_updates_store() {
    let temp = TempDir::new().unwrap();
    seed_store(temp.path());
    std::fs::write(temp.path().join("a.py"), "version TWO of a").unwrap();
    seed_deltas(temp.path());

    fellow_cmd()
        .args(["sync", "--json"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"entities_removed\": 1"))
        .stdout(predicate::str::contains("\"entities_added\": 1"))
        .stdout(predicate::str::contains("\"status\": \"no_change\""));

    // Deltas were consumed
    let semantic = temp.path().join(".fellow-data/semantic");
    assert!(!semantic.join("factual_knowledge_delta.json").exists());
    assert!(!semantic.join("procedural_knowledge_delta.json").exists());

    // The merged factual document holds ent_b and the replacement entity
    let factual = std::fs::read_to_string(semantic.join("factual_knowledge.json")).unwrap();
    assert!(factual.contains("ent_a_v2"));
    assert!(factual.contains("ent_b"));
    assert!(!factual.contains("\"ent_a\""));

    // A second pass is a no-op
    fellow_cmd()
        .args(["sync", "--json"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("up_to_date"));
}

#[test]
fn sync_without_deltas_fails_with_distinct_error() {
    let temp = TempDir::new().unwrap();
    seed_store(temp.path());
    std::fs::write(temp.path().join("a.py"), "changed but not extracted").unwrap();

    fellow_cmd()
        .arg("sync")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Delta document missing"));
}

#[test]
fn sync_without_metadata_fails() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join(".fellow-data/semantic")).unwrap();

    fellow_cmd()
        .arg("sync")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("full extraction"));
}

#[test]
fn status_shows_counts() {
    let temp = TempDir::new().unwrap();
    seed_store(temp.path());

    fellow_cmd()
        .args(["status", "--json"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_entities\": 2"))
        .stdout(predicate::str::contains("\"tracked_files\": 2"))
        .stdout(predicate::str::contains("\"pending_deltas\": false"));
}

#[test]
fn sync_consumes_leftover_deltas_when_up_to_date() {
    // Crash aftermath: merged store already written, deltas left behind
    let temp = TempDir::new().unwrap();
    seed_store(temp.path());
    seed_deltas(temp.path());

    fellow_cmd()
        .args(["sync", "--json"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"entities_added\": 1"));

    let semantic = temp.path().join(".fellow-data/semantic");
    assert!(!semantic.join("factual_knowledge_delta.json").exists());
}
