//! Shared test utilities for fellow-cli integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;

/// A Command targeting the compiled `fellow` binary.
#[allow(deprecated)]
pub fn fellow_cmd() -> Command {
    Command::cargo_bin("fellow").expect("fellow binary should exist")
}

/// Seed a project with a knowledge store tracking `a.py` and `b.py`.
///
/// The factual document holds one entity per file; the procedural and
/// conceptual documents are empty shells.
pub fn seed_store(root: &Path) {
    let semantic = root.join(".fellow-data/semantic");
    fs::create_dir_all(&semantic).unwrap();

    fs::write(root.join("a.py"), "version one of a").unwrap();
    fs::write(root.join("b.py"), "version one of b").unwrap();

    let metadata = serde_json::json!({
        "extraction_id": "5f0c54a6-34a0-4b39-913f-d980e9b4c7a7",
        "file_registry": {
            "a.py": {
                "hash": fingerprint("version one of a"),
                "last_analyzed": "2025-06-01T00:00:00Z"
            },
            "b.py": {
                "hash": fingerprint("version one of b"),
                "last_analyzed": "2025-06-01T00:00:00Z"
            }
        },
        "last_full_extraction": "2025-06-01T00:00:00Z"
    });
    write_json(&semantic.join("extraction_metadata.json"), &metadata);

    let factual = serde_json::json!({
        "metadata": {},
        "entities": [
            {"id": "ent_a", "name": "A", "type": "class",
             "grounding": {"file": "a.py"}},
            {"id": "ent_b", "name": "B", "type": "class",
             "grounding": {"file": "b.py"}}
        ],
        "entity_relationships": [],
        "summary": {"total_entities": 2, "total_relationships": 0}
    });
    write_json(&semantic.join("factual_knowledge.json"), &factual);

    write_json(
        &semantic.join("procedural_knowledge.json"),
        &serde_json::json!({"metadata": {}, "workflows": [], "summary": {}}),
    );
    write_json(
        &semantic.join("conceptual_knowledge.json"),
        &serde_json::json!({"metadata": {}, "architecture_style": "layered"}),
    );
}

/// Write delta documents replacing the knowledge grounded in `a.py`.
pub fn seed_deltas(root: &Path) {
    let semantic = root.join(".fellow-data/semantic");

    write_json(
        &semantic.join("factual_knowledge_delta.json"),
        &serde_json::json!({
            "metadata": {},
            "entities": [
                {"id": "ent_a_v2", "name": "A2", "type": "class",
                 "grounding": {"file": "a.py"}}
            ],
            "entity_relationships": []
        }),
    );
    write_json(
        &semantic.join("procedural_knowledge_delta.json"),
        &serde_json::json!({"metadata": {}, "workflows": []}),
    );
}

fn write_json(path: &Path, value: &serde_json::Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn fingerprint(content: &str) -> String {
    fellow_core::Fingerprint::from_bytes(content.as_bytes())
        .as_str()
        .to_string()
}
