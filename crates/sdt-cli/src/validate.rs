//! # Validate Subcommand
//!
//! Loads one JSON document and dispatches to the matching `validate_*`
//! entry point. Exit codes preserve the original tool's contract: 0 on
//! success, 1 on validation failure, 2 when the input file is missing;
//! everything else propagates to the caller's exit-3 path.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use sdt_core::DocumentKind;
use sdt_validator::{
    load_document, validate_agent, validate_billing, validate_event, validate_execution,
    validate_project, validate_rule, validate_template, SdtError,
};

/// Arguments for the `sdt validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Type of JSON document to validate.
    #[arg(value_parser = parse_kind)]
    pub kind: DocumentKind,

    /// Path to the JSON file to validate.
    pub json_path: PathBuf,

    /// Path to the spec directory containing the *.schema.json files.
    /// Overrides SDT_SPEC_DIR if provided.
    #[arg(long)]
    pub spec_dir: Option<PathBuf>,

    /// Template JSON file to cross-reference against (rule and agent only).
    #[arg(long)]
    pub template: Option<PathBuf>,
}

fn parse_kind(s: &str) -> Result<DocumentKind, String> {
    s.parse()
}

/// Execute the validate subcommand.
///
/// Returns the process exit code: 0 on success, 1 on validation failure,
/// 2 when the input file does not exist. Fatal errors (missing schema,
/// malformed schema or document) propagate as `Err`.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    if !args.json_path.exists() {
        eprintln!("File not found: {}", args.json_path.display());
        return Ok(2);
    }

    let doc = load_document(&args.json_path)?;
    let template = match &args.template {
        Some(path) => Some(load_document(path)?),
        None => None,
    };

    if template.is_some() && !matches!(args.kind, DocumentKind::Rule | DocumentKind::Agent) {
        tracing::warn!(
            kind = %args.kind,
            "--template is only used for rule and agent validation"
        );
    }

    let spec_dir = args.spec_dir.as_deref();
    let result = match args.kind {
        DocumentKind::Template => validate_template(&doc, spec_dir),
        DocumentKind::Rule => validate_rule(&doc, template.as_ref(), spec_dir),
        DocumentKind::Agent => validate_agent(&doc, template.as_ref(), spec_dir),
        DocumentKind::Project => validate_project(&doc, spec_dir),
        DocumentKind::Execution => validate_execution(&doc, spec_dir),
        DocumentKind::Event => validate_event(&doc, spec_dir),
        DocumentKind::Billing => validate_billing(&doc, spec_dir),
    };

    match result {
        Ok(()) => {
            println!("OK");
            Ok(0)
        }
        Err(SdtError::Validation(err)) => {
            eprintln!("{err}");
            Ok(1)
        }
        Err(other) => Err(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn repo_root() -> PathBuf {
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop(); // crates/
        dir.pop(); // repo root
        dir
    }

    fn spec_dir() -> PathBuf {
        repo_root().join("spec")
    }

    fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    fn args(kind: DocumentKind, json_path: PathBuf) -> ValidateArgs {
        ValidateArgs {
            kind,
            json_path,
            spec_dir: Some(spec_dir()),
            template: None,
        }
    }

    #[test]
    fn missing_input_file_returns_2() {
        let result = run_validate(&args(
            DocumentKind::Template,
            PathBuf::from("/tmp/sdt-no-such-input.json"),
        ))
        .unwrap();
        assert_eq!(result, 2);
    }

    #[test]
    fn valid_template_returns_0() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "template.json",
            &json!({
                "id": "t1",
                "name": "T",
                "domain": "testing",
                "fields": [{"key": "streak", "type": "number"}]
            }),
        );
        assert_eq!(run_validate(&args(DocumentKind::Template, path)).unwrap(), 0);
    }

    #[test]
    fn invalid_template_returns_1() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(dir.path(), "template.json", &json!({"id": "t1"}));
        assert_eq!(run_validate(&args(DocumentKind::Template, path)).unwrap(), 1);
    }

    #[test]
    fn cross_reference_failure_returns_1() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = write_json(
            dir.path(),
            "template.json",
            &json!({
                "id": "t1",
                "name": "T",
                "domain": "testing",
                "fields": [{"key": "streak", "type": "number"}]
            }),
        );
        let rule_path = write_json(
            dir.path(),
            "rule.json",
            &json!({
                "id": "r1",
                "template_id": "t1",
                "enabled": true,
                "conditions": [{"type": "count", "field": "bogus", "value": 1}]
            }),
        );

        let mut rule_args = args(DocumentKind::Rule, rule_path);
        rule_args.template = Some(template_path);
        assert_eq!(run_validate(&rule_args).unwrap(), 1);
    }

    #[test]
    fn missing_schema_dir_is_a_fatal_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(dir.path(), "template.json", &json!({"id": "t1"}));

        let fatal = ValidateArgs {
            kind: DocumentKind::Template,
            json_path: path,
            spec_dir: Some(dir.path().join("no-such-spec")),
            template: None,
        };
        // Propagates as Err; main maps it to exit code 3.
        assert!(run_validate(&fatal).is_err());
    }

    #[test]
    fn malformed_document_is_a_fatal_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(run_validate(&args(DocumentKind::Template, path)).is_err());
    }

    #[test]
    fn kind_parser_accepts_all_kinds() {
        for kind in DocumentKind::all() {
            assert_eq!(parse_kind(kind.as_str()).as_ref(), Ok(kind));
        }
        assert!(parse_kind("workflow").is_err());
    }
}
