//! # sdt-validator — Document Validation API
//!
//! The public entry points for validating SDT documents. Every call is a
//! pure function of (document, optional related template, resolved spec
//! directory): the schema registry is rebuilt from disk per call, nothing
//! is cached, and concurrent calls on different documents need no
//! coordination.
//!
//! ## Phases
//!
//! 1. **Structural** — the document is validated against its kind's schema
//!    with all violations collected, sorted, and rendered
//!    (see [`sdt_schema::validate_document`]). A structural failure aborts
//!    the call; later phases never run.
//! 2. **Formula** (templates) — metric formulas are scanned for identifiers
//!    that name neither a declared field nor a reserved function/keyword.
//! 3. **Cross-reference** (rules and agents, only when the caller supplies
//!    the template) — template identity and field containment.
//!
//! Each phase collects all of its own diagnostics and raises once; an error
//! never mixes diagnostics from two phases.
//!
//! ## Example
//!
//! ```no_run
//! use sdt_validator::{load_document, validate_rule};
//!
//! # fn main() -> Result<(), sdt_validator::SdtError> {
//! let template = load_document("presets/game_growth.json")?;
//! let rule = load_document("my_rule.json")?;
//! validate_rule(&rule, Some(&template), None)?;
//! # Ok(())
//! # }
//! ```

mod crossref;
mod formula;

use std::path::Path;

use serde_json::Value;

use sdt_core::DocumentKind;
use sdt_schema::{resolve_spec_dir, validate_document, SchemaRegistry};

pub use sdt_core::{load_document, SdtError, ValidationError, SPEC_DIR_ENV};

/// Validate a template document.
///
/// Runs structural validation against `template.schema.json`, then the
/// metric formula analysis.
///
/// # Errors
///
/// Returns [`SdtError::Validation`] when either phase rejects the document,
/// or a fatal variant when the schema corpus itself is unusable.
pub fn validate_template(doc: &Value, spec_dir: Option<&Path>) -> Result<(), SdtError> {
    validate_structural(doc, DocumentKind::Template, spec_dir)?;
    formula::validate_metric_formulas(doc)
}

/// Validate a rule document.
///
/// Runs structural validation against `rule.schema.json`; when `template`
/// is given, additionally checks that the rule's `template_id` matches and
/// that every condition's `field` names a template field.
pub fn validate_rule(
    doc: &Value,
    template: Option<&Value>,
    spec_dir: Option<&Path>,
) -> Result<(), SdtError> {
    validate_structural(doc, DocumentKind::Rule, spec_dir)?;
    if let Some(template) = template {
        crossref::validate_rule_references(doc, template)?;
    }
    Ok(())
}

/// Validate an agent document.
///
/// Runs structural validation against `agent.schema.json`; when `template`
/// is given, additionally checks that the agent's `template_id` matches and
/// that every capability's `field` names a template field.
pub fn validate_agent(
    doc: &Value,
    template: Option<&Value>,
    spec_dir: Option<&Path>,
) -> Result<(), SdtError> {
    validate_structural(doc, DocumentKind::Agent, spec_dir)?;
    if let Some(template) = template {
        crossref::validate_agent_references(doc, template)?;
    }
    Ok(())
}

/// Validate a project document against `project.schema.json`.
pub fn validate_project(doc: &Value, spec_dir: Option<&Path>) -> Result<(), SdtError> {
    validate_structural(doc, DocumentKind::Project, spec_dir)
}

/// Validate an execution record against `execution.schema.json`.
pub fn validate_execution(doc: &Value, spec_dir: Option<&Path>) -> Result<(), SdtError> {
    validate_structural(doc, DocumentKind::Execution, spec_dir)
}

/// Validate an event record against `event.schema.json`.
pub fn validate_event(doc: &Value, spec_dir: Option<&Path>) -> Result<(), SdtError> {
    validate_structural(doc, DocumentKind::Event, spec_dir)
}

/// Validate a billing record against `billing.schema.json`.
pub fn validate_billing(doc: &Value, spec_dir: Option<&Path>) -> Result<(), SdtError> {
    validate_structural(doc, DocumentKind::Billing, spec_dir)
}

/// Structural phase shared by every entry point.
///
/// Resolves the spec directory, rebuilds the registry from disk, looks up
/// the kind's primary schema, and validates. Fails before any
/// cross-reference or formula phase runs.
fn validate_structural(
    doc: &Value,
    kind: DocumentKind,
    spec_dir: Option<&Path>,
) -> Result<(), SdtError> {
    let spec_dir = resolve_spec_dir(spec_dir);
    let registry = SchemaRegistry::load(spec_dir)?;
    let schema = registry.primary_schema(kind)?;
    validate_document(doc, schema, &registry, kind.label())
}
