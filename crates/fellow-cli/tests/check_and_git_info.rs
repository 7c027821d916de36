//! Path classification (`fellow check`) and repository metadata
//! (`fellow git-info`) through the binary.

mod common;

use common::fellow_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn check_classifies_paths_and_sets_exit_code() {
    // All analyzable: exit 0
    fellow_cmd()
        .args(["check", "src/main.py"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ANALYZE: src/main.py"));

    // Any skipped path: exit 1
    fellow_cmd()
        .args(["check", "src/main.py", "tests/api.py", "node_modules/x.js"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("ANALYZE: src/main.py"))
        .stdout(predicate::str::contains("SKIP: tests/api.py"))
        .stdout(predicate::str::contains("SKIP: node_modules/x.js"));
}

#[test]
fn check_skips_non_source_and_excluded_dirs() {
    fellow_cmd()
        .args(["check", "README.md", "dist/app.js", "src/user_test.py"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("SKIP: README.md"))
        .stdout(predicate::str::contains("SKIP: dist/app.js"))
        .stdout(predicate::str::contains("SKIP: src/user_test.py"));
}

#[test]
fn check_honors_project_config_extensions() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join(".fellow-data/semantic")).unwrap();
    std::fs::write(
        temp.path().join("fellow.yaml"),
        "extra_exclude_dirs:\n  - generated\nextra_source_extensions:\n  - .sql\n",
    )
    .unwrap();

    // The config widens both the source-extension set and the exclusions
    fellow_cmd()
        .current_dir(temp.path())
        .args(["check", "db/schema.sql", "generated/api.py"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("ANALYZE: db/schema.sql"))
        .stdout(predicate::str::contains("SKIP: generated/api.py"));
}

#[test]
fn git_info_outside_repository() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join(".fellow-data/semantic")).unwrap();

    fellow_cmd()
        .args(["git-info", "--json"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"is_git_repo\": false"));
}

#[test]
fn git_info_human_output_outside_repository() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join(".fellow-data/semantic")).unwrap();

    fellow_cmd()
        .arg("git-info")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Not a git repository"));
}
