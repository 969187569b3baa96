//! Integration test: the shipped schema corpus under `spec/` loads,
//! compiles, and enforces its cross-schema references.

use std::path::PathBuf;

use serde_json::json;

use sdt_core::DocumentKind;
use sdt_schema::{validate_document, SchemaRegistry};

/// Find the repository root (where spec/ lives).
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn spec_dir() -> PathBuf {
    repo_root().join("spec")
}

#[test]
fn corpus_contains_every_kind_plus_shared_defs() {
    let registry = SchemaRegistry::load(spec_dir()).expect("failed to load schema corpus");
    // Seven document kinds plus defs.schema.json.
    assert_eq!(registry.schema_count(), 8, "ids: {:?}", registry.schema_ids());

    for kind in DocumentKind::all() {
        assert!(
            registry.get_by_filename(&kind.schema_filename()).is_some(),
            "missing schema for {kind}"
        );
    }
    assert!(registry.get_by_filename("defs.schema.json").is_some());
}

#[test]
fn every_schema_in_the_corpus_compiles() {
    let registry = SchemaRegistry::load(spec_dir()).expect("failed to load schema corpus");
    let mut failures = Vec::new();
    for id in registry.schema_ids() {
        let schema = registry.get(id).unwrap();
        if let Err(e) = registry.compile(schema) {
            failures.push(format!("{id}: {e}"));
        }
    }
    assert!(
        failures.is_empty(),
        "failed to compile {} schema(s):\n{}",
        failures.len(),
        failures.join("\n")
    );
}

#[test]
fn template_schema_enforces_shared_identifier_definition() {
    // `id` flows through defs.schema.json#/$defs/identifier, so the empty
    // string must be rejected via the cross-schema reference.
    let registry = SchemaRegistry::load(spec_dir()).unwrap();
    let schema = registry.primary_schema(DocumentKind::Template).unwrap();

    let doc = json!({
        "id": "",
        "name": "T",
        "domain": "testing",
        "fields": [{"key": "streak", "type": "number"}]
    });
    let err = validate_document(&doc, schema, &registry, "Template").unwrap_err();
    assert!(err.to_string().contains("at 'id'"));
}

#[test]
fn template_schema_rejects_undeclared_properties() {
    let registry = SchemaRegistry::load(spec_dir()).unwrap();
    let schema = registry.primary_schema(DocumentKind::Template).unwrap();

    let doc = json!({
        "id": "t1",
        "name": "T",
        "domain": "testing",
        "fields": [{"key": "streak", "type": "number"}],
        "extra_field_not_in_schema": true
    });
    assert!(validate_document(&doc, schema, &registry, "Template").is_err());
}

#[test]
fn schema_version_pattern_is_enforced_across_kinds() {
    let registry = SchemaRegistry::load(spec_dir()).unwrap();
    let schema = registry.primary_schema(DocumentKind::Execution).unwrap();

    let doc = json!({
        "schema_version": "not-a-semver",
        "execution_id": "exec_1",
        "project_id": "proj_1",
        "workflow_id": "wf_1",
        "status": "queued"
    });
    let err = validate_document(&doc, schema, &registry, "Execution").unwrap_err();
    assert!(err.to_string().contains("at 'schema_version'"));
}
