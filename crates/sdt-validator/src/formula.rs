//! # Metric Formula Analysis
//!
//! Scans template metric formulas for identifiers that name neither a
//! declared field nor a reserved function/keyword.
//!
//! This is a lexical scan, not an expression parse: operators, literals,
//! and punctuation are ignored, and an identifier embedded in a larger
//! token (a string literal, say) is still extracted. The check catches
//! typos in field references; it does not interpret formulas.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use sdt_core::{field_keys, metrics, SdtError, ValidationError};

/// Maximal identifier runs within a formula.
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());

/// Reserved aggregate function names, matched case-insensitively.
const FORMULA_FUNCTIONS: [&str; 6] = ["sum", "average", "avg", "count", "min", "max"];

/// Reserved keywords, matched case-insensitively.
const FORMULA_KEYWORDS: [&str; 5] = ["true", "false", "and", "or", "not"];

/// Check every metric formula on a template against its field-key set.
///
/// Skips entirely when the template declares no metrics, or when the
/// field-key set is empty — formula checking is only meaningful when there
/// is something to check against, so a template with zero fields accepts
/// any formula.
///
/// # Errors
///
/// Returns [`SdtError::Validation`] with one detail per offending metric
/// (its index, its sorted unknown identifiers, and the available field set)
/// when any formula references unknown identifiers. The rendered message
/// contains the phrase "unknown field".
pub(crate) fn validate_metric_formulas(template: &Value) -> Result<(), SdtError> {
    let Some(metric_list) = metrics(template) else {
        return Ok(());
    };
    let keys = field_keys(template);
    if keys.is_empty() {
        return Ok(());
    }

    let available: Vec<&str> = keys.iter().map(String::as_str).collect();
    let mut errors = Vec::new();
    for (idx, metric) in metric_list.iter().enumerate() {
        let Some(formula) = metric.get("formula").and_then(Value::as_str) else {
            continue;
        };
        let unknowns = unknown_identifiers(formula, &keys);
        if !unknowns.is_empty() {
            errors.push(format!(
                "Metric[{idx}].formula references unknown field(s): {unknowns:?}. \
                 Available fields: {available:?}"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new("Template metric formulas reference unknown fields.", errors)
            .into())
    }
}

/// Sorted, de-duplicated identifiers in `formula` that are neither declared
/// field keys nor reserved names.
fn unknown_identifiers(formula: &str, keys: &BTreeSet<String>) -> Vec<String> {
    let mut unknowns = BTreeSet::new();
    for found in IDENTIFIER_RE.find_iter(formula) {
        let ident = found.as_str();
        if keys.contains(ident) {
            continue;
        }
        let lowered = ident.to_ascii_lowercase();
        if FORMULA_FUNCTIONS.contains(&lowered.as_str())
            || FORMULA_KEYWORDS.contains(&lowered.as_str())
        {
            continue;
        }
        unknowns.insert(ident.to_owned());
    }
    unknowns.into_iter().collect()
}
