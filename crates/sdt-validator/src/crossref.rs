//! # Cross-Reference Validation
//!
//! Checks referential integrity between a primary document (rule or agent)
//! and the template it declares — consistency a single schema cannot
//! express. Runs only when the caller supplies both documents; the related
//! template is never implied or auto-loaded.
//!
//! All diagnostics from one pass merge into a single failure; the pass
//! never stops at the first problem.

use std::collections::BTreeSet;

use serde_json::Value;

use sdt_core::{
    capabilities, conditions, document_id, field_keys, sdt_support, template_id, SdtError,
    ValidationError,
};

/// The SDT axes templates and agents may declare support for.
const SDT_AXES: [&str; 3] = ["autonomy", "competence", "relatedness"];

/// Which reference-bearing list a cross-reference pass walks.
#[derive(Debug, Clone, Copy)]
enum CrossRefKind {
    /// Rules reference template fields from `conditions[]`.
    Rule,
    /// Agents reference template fields from `capabilities[]`.
    Agent,
}

impl CrossRefKind {
    fn doc_label(self) -> &'static str {
        match self {
            Self::Rule => "Rule",
            Self::Agent => "Agent",
        }
    }

    fn item_label(self) -> &'static str {
        match self {
            Self::Rule => "Condition",
            Self::Agent => "Capability",
        }
    }

    fn items(self, doc: &Value) -> Option<&[Value]> {
        match self {
            Self::Rule => conditions(doc),
            Self::Agent => capabilities(doc),
        }
    }
}

/// Check a rule against the template it declares.
pub(crate) fn validate_rule_references(rule: &Value, template: &Value) -> Result<(), SdtError> {
    validate_references(rule, template, CrossRefKind::Rule)
}

/// Check an agent against the template it declares.
pub(crate) fn validate_agent_references(agent: &Value, template: &Value) -> Result<(), SdtError> {
    validate_references(agent, template, CrossRefKind::Agent)
}

fn validate_references(
    doc: &Value,
    template: &Value,
    kind: CrossRefKind,
) -> Result<(), SdtError> {
    let mut errors = Vec::new();

    // Identity: the primary document must point at this exact template.
    let declared = template_id(doc);
    let actual = document_id(template);
    if declared != actual {
        errors.push(format!(
            "{} references template_id '{}', but provided template has id '{}'",
            kind.doc_label(),
            declared.unwrap_or("<missing>"),
            actual.unwrap_or("<missing>"),
        ));
    }

    // Field containment: every non-null `field` must name a template field.
    let keys = field_keys(template);
    for (idx, item) in kind.items(doc).unwrap_or_default().iter().enumerate() {
        let Some(field) = item.get("field") else {
            continue;
        };
        if field.is_null() {
            continue;
        }
        let known = field.as_str().is_some_and(|name| keys.contains(name));
        if !known {
            errors.push(format!(
                "{}[{idx}].field '{}' does not exist in template. Available fields: {}",
                kind.item_label(),
                render_field(field),
                render_available(&keys),
            ));
        }
    }

    check_sdt_support(doc, template);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(
            format!("{} failed cross-reference validation.", kind.doc_label()),
            errors,
        )
        .into())
    }
}

/// SDT-support consistency hook.
///
/// A document may declare support for an axis the template does not;
/// extension is allowed, so this never produces a diagnostic. It exists as
/// the seam where a stricter policy would plug in.
fn check_sdt_support(doc: &Value, template: &Value) {
    let (Some(doc_sdt), Some(template_sdt)) = (sdt_support(doc), sdt_support(template)) else {
        return;
    };
    for axis in SDT_AXES {
        if doc_sdt.contains_key(axis) && !template_sdt.contains_key(axis) {
            tracing::debug!(axis, "document extends the template's sdt_support");
        }
    }
}

/// A field value for display: the string itself, or its JSON rendering.
fn render_field(field: &Value) -> String {
    match field.as_str() {
        Some(s) => s.to_owned(),
        None => field.to_string(),
    }
}

/// Sorted valid-key set, or the literal `none` when empty.
fn render_available(keys: &BTreeSet<String>) -> String {
    if keys.is_empty() {
        "none".to_string()
    } else {
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        format!("{keys:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template() -> Value {
        json!({
            "id": "game-growth-basic",
            "name": "Game Growth Basic",
            "domain": "gaming",
            "fields": [
                {"key": "session_length", "type": "number"},
                {"key": "difficulty", "type": "choice"}
            ],
            "sdt_support": {"autonomy": "Choose your own pace"}
        })
    }

    #[test]
    fn matching_references_pass_silently() {
        let rule = json!({
            "id": "r1",
            "template_id": "game-growth-basic",
            "conditions": [{"type": "count", "field": "session_length", "value": 1}]
        });
        validate_rule_references(&rule, &template()).unwrap();
    }

    #[test]
    fn template_id_mismatch_names_both_values() {
        let agent = json!({
            "id": "a1",
            "template_id": "wrong-template-id",
            "capabilities": []
        });
        let err = validate_agent_references(&agent, &template()).unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.to_lowercase().contains("template_id"));
        assert!(rendered.contains("wrong-template-id"));
        assert!(rendered.contains("game-growth-basic"));
    }

    #[test]
    fn unknown_condition_field_is_indexed() {
        let rule = json!({
            "id": "r2",
            "template_id": "game-growth-basic",
            "conditions": [
                {"type": "count", "field": "session_length", "value": 1},
                {"type": "count", "field": "unknown_field", "value": 1}
            ]
        });
        let err = validate_rule_references(&rule, &template()).unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.to_lowercase().contains("condition[1].field"));
        assert!(rendered.contains("'unknown_field'"));
        assert!(rendered.contains("session_length"));
    }

    #[test]
    fn unknown_capability_field_lists_available_keys() {
        let agent = json!({
            "id": "a1",
            "template_id": "game-growth-basic",
            "capabilities": [{"type": "capture", "field": "nonexistent_field"}]
        });
        let err = validate_agent_references(&agent, &template()).unwrap_err();
        let SdtError::Validation(err) = err else {
            panic!("expected Validation");
        };
        assert_eq!(err.message(), "Agent failed cross-reference validation.");
        assert_eq!(err.errors().len(), 1);
        assert!(err.errors()[0].contains("Capability[0].field 'nonexistent_field'"));
        assert!(err.errors()[0].contains(r#"["difficulty", "session_length"]"#));
    }

    #[test]
    fn empty_field_set_renders_as_none() {
        let bare = json!({"id": "bare-template", "fields": []});
        let agent = json!({
            "id": "a1",
            "template_id": "bare-template",
            "capabilities": [{"type": "capture", "field": "anything"}]
        });
        let err = validate_agent_references(&agent, &bare).unwrap_err();
        assert!(err.to_string().contains("Available fields: none"));
    }

    #[test]
    fn null_fields_are_skipped() {
        let rule = json!({
            "id": "r1",
            "template_id": "game-growth-basic",
            "conditions": [{"type": "count", "field": null, "value": 1}, {"type": "streak"}]
        });
        validate_rule_references(&rule, &template()).unwrap();
    }

    #[test]
    fn non_string_field_is_reported_with_json_rendering() {
        let rule = json!({
            "id": "r1",
            "template_id": "game-growth-basic",
            "conditions": [{"type": "count", "field": 7}]
        });
        let err = validate_rule_references(&rule, &template()).unwrap_err();
        assert!(err.to_string().contains("Condition[0].field '7'"));
    }

    #[test]
    fn all_diagnostics_merge_into_one_failure() {
        let agent = json!({
            "id": "a1",
            "template_id": "wrong-template-id",
            "capabilities": [
                {"type": "capture", "field": "bogus_a"},
                {"type": "suggest", "field": "bogus_b"}
            ]
        });
        let err = validate_agent_references(&agent, &template()).unwrap_err();
        let SdtError::Validation(err) = err else {
            panic!("expected Validation");
        };
        assert_eq!(err.errors().len(), 3);
    }

    #[test]
    fn sdt_extension_is_not_an_error() {
        // The template declares only autonomy; the agent extends to
        // competence and relatedness. Extension is allowed.
        let agent = json!({
            "id": "a1",
            "template_id": "game-growth-basic",
            "sdt_support": {
                "autonomy": "Extended autonomy support",
                "competence": "Extended competence support",
                "relatedness": "Optional sharing features"
            }
        });
        validate_agent_references(&agent, &template()).unwrap();
    }

    #[test]
    fn sdt_extension_without_template_axes_is_not_an_error() {
        let bare = json!({"id": "bare-template", "fields": [{"key": "x", "type": "number"}]});
        let agent = json!({
            "id": "a1",
            "template_id": "bare-template",
            "sdt_support": {"autonomy": "a", "competence": "b"}
        });
        validate_agent_references(&agent, &bare).unwrap();
    }

    #[test]
    fn missing_reference_list_checks_identity_only() {
        let agent = json!({"id": "a1", "template_id": "game-growth-basic"});
        validate_agent_references(&agent, &template()).unwrap();
    }
}
