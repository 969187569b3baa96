//! # Documents — Kinds, Loading, and Typed Views
//!
//! Documents are untyped `serde_json::Value` trees; nothing here assumes a
//! particular schema. The accessor functions build the narrow typed views
//! the cross-reference and formula checks need (field-key sets, condition
//! and capability lists) without committing the rest of the codebase to
//! per-kind structs.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SdtError;

/// The seven document kinds the validator knows about.
///
/// Each kind validates against the schema file named
/// `<kind>.schema.json` in the spec directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A habit/growth template declaring fields and metrics.
    Template,
    /// An automation rule with conditions and effects.
    Rule,
    /// An agent with capabilities bound to template fields.
    Agent,
    /// A project grouping agents and workflows.
    Project,
    /// A single workflow execution record.
    Execution,
    /// A user-facing event record.
    Event,
    /// A billing transaction record.
    Billing,
}

impl DocumentKind {
    /// All document kinds in canonical order.
    pub fn all() -> &'static [DocumentKind] {
        &[
            Self::Template,
            Self::Rule,
            Self::Agent,
            Self::Project,
            Self::Execution,
            Self::Event,
            Self::Billing,
        ]
    }

    /// Lowercase kind name as used in schema filenames and on the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Rule => "rule",
            Self::Agent => "agent",
            Self::Project => "project",
            Self::Execution => "execution",
            Self::Event => "event",
            Self::Billing => "billing",
        }
    }

    /// Capitalized label used in error summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Template => "Template",
            Self::Rule => "Rule",
            Self::Agent => "Agent",
            Self::Project => "Project",
            Self::Execution => "Execution",
            Self::Event => "Event",
            Self::Billing => "Billing",
        }
    }

    /// Filename of the schema this kind validates against.
    pub fn schema_filename(&self) -> String {
        format!("{}.schema.json", self.as_str())
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "template" => Ok(Self::Template),
            "rule" => Ok(Self::Rule),
            "agent" => Ok(Self::Agent),
            "project" => Ok(Self::Project),
            "execution" => Ok(Self::Execution),
            "event" => Ok(Self::Event),
            "billing" => Ok(Self::Billing),
            other => Err(format!(
                "unknown document kind '{other}' (expected one of: template, rule, agent, \
                 project, execution, event, billing)"
            )),
        }
    }
}

/// Read and parse one structured document from disk.
///
/// JSON by default; `.yaml`/`.yml` files are parsed as YAML and converted
/// into the JSON value model. Not schema-aware — callers pass the result
/// to one of the `validate_*` entry points.
///
/// # Errors
///
/// Returns [`SdtError::DocumentParse`] if the file cannot be read or its
/// contents cannot be parsed.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value, SdtError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| SdtError::DocumentParse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|e| SdtError::DocumentParse {
                    path: path.display().to_string(),
                    reason: format!("invalid YAML: {e}"),
                })?;
            yaml_to_json_value(&yaml).map_err(|reason| SdtError::DocumentParse {
                path: path.display().to_string(),
                reason,
            })
        }
        _ => serde_json::from_str(&content).map_err(|e| SdtError::DocumentParse {
            path: path.display().to_string(),
            reason: format!("invalid JSON: {e}"),
        }),
    }
}

/// The set of non-empty field keys a template declares.
///
/// Duplicate keys collapse silently; the set is ordered so rendered key
/// lists are deterministic. A template without a `fields` array yields the
/// empty set.
pub fn field_keys(template: &Value) -> BTreeSet<String> {
    template
        .get("fields")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .filter_map(|field| field.get("key"))
                .filter_map(Value::as_str)
                .filter(|key| !key.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// A document's `template_id`, when present as a string.
pub fn template_id(doc: &Value) -> Option<&str> {
    doc.get("template_id").and_then(Value::as_str)
}

/// A document's own `id`, when present as a string.
pub fn document_id(doc: &Value) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

/// A template's metric list, when declared.
pub fn metrics(template: &Value) -> Option<&[Value]> {
    template
        .get("metrics")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

/// A rule's condition list, when declared.
pub fn conditions(rule: &Value) -> Option<&[Value]> {
    rule.get("conditions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

/// An agent's capability list, when declared.
pub fn capabilities(agent: &Value) -> Option<&[Value]> {
    agent
        .get("capabilities")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

/// A document's `sdt_support` object, when declared.
pub fn sdt_support(doc: &Value) -> Option<&serde_json::Map<String, Value>> {
    doc.get("sdt_support").and_then(Value::as_object)
}

/// Convert a `serde_yaml::Value` into a `serde_json::Value`.
///
/// Documents use only the JSON-compatible subset of YAML; tags are ignored
/// and non-scalar map keys are rejected.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in DocumentKind::all() {
            assert_eq!(kind.as_str().parse::<DocumentKind>().as_ref(), Ok(kind));
        }
    }

    #[test]
    fn kind_rejects_unknown_names() {
        let err = "workflow".parse::<DocumentKind>().unwrap_err();
        assert!(err.contains("unknown document kind 'workflow'"));
    }

    #[test]
    fn schema_filename_follows_convention() {
        assert_eq!(
            DocumentKind::Template.schema_filename(),
            "template.schema.json"
        );
        assert_eq!(
            DocumentKind::Billing.schema_filename(),
            "billing.schema.json"
        );
    }

    #[test]
    fn field_keys_collects_non_empty_keys() {
        let template = json!({
            "fields": [
                {"key": "session_length", "type": "number"},
                {"key": "difficulty", "type": "choice"},
                {"key": "", "type": "text"},
                {"type": "text"}
            ]
        });
        let keys = field_keys(&template);
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("session_length"));
        assert!(keys.contains("difficulty"));
    }

    #[test]
    fn field_keys_collapses_duplicates() {
        let template = json!({
            "fields": [
                {"key": "streak", "type": "number"},
                {"key": "streak", "type": "text"}
            ]
        });
        assert_eq!(field_keys(&template).len(), 1);
    }

    #[test]
    fn field_keys_empty_without_fields_array() {
        assert!(field_keys(&json!({})).is_empty());
        assert!(field_keys(&json!({"fields": "oops"})).is_empty());
    }

    #[test]
    fn accessors_return_none_on_wrong_shapes() {
        let doc = json!({"template_id": 42, "id": ["x"], "conditions": {}});
        assert_eq!(template_id(&doc), None);
        assert_eq!(document_id(&doc), None);
        assert!(conditions(&doc).is_none());
        assert!(capabilities(&doc).is_none());
        assert!(metrics(&doc).is_none());
        assert!(sdt_support(&doc).is_none());
    }

    #[test]
    fn load_document_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"{"id": "t1", "name": "Test"}"#).unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc["id"], "t1");
    }

    #[test]
    fn load_document_reads_yaml_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.yaml");
        std::fs::write(&path, "id: t1\nenabled: true\ncount: 3\n").unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc["id"], "t1");
        assert_eq!(doc["enabled"], true);
        assert_eq!(doc["count"], 3);
    }

    #[test]
    fn load_document_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_document(&path).unwrap_err();
        match err {
            SdtError::DocumentParse { path: p, reason } => {
                assert!(p.ends_with("bad.json"));
                assert!(reason.contains("invalid JSON"));
            }
            other => panic!("expected DocumentParse, got: {other}"),
        }
    }

    #[test]
    fn load_document_rejects_missing_file() {
        let err = load_document("/tmp/sdt-no-such-document.json").unwrap_err();
        assert!(matches!(err, SdtError::DocumentParse { .. }));
    }

    #[test]
    fn yaml_conversion_handles_nesting() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("items:\n  - one\n  - two\nnested:\n  flag: false\n").unwrap();
        let json = yaml_to_json_value(&yaml).unwrap();
        assert_eq!(json["items"][1], "two");
        assert_eq!(json["nested"]["flag"], false);
    }
}
