//! # Structural Validation
//!
//! Runs one document against one schema (with registry-resolved `$ref`s)
//! and collects every violation, not just the first.
//!
//! ## Determinism
//!
//! Violations are sorted by their structural path: segments compare
//! positionally, indices numerically, keys lexicographically, and an index
//! orders before a key when the kinds differ. The sort is stable, so
//! violations at the same path keep the engine's order. Repeated validation
//! of the same (document, schema) pair yields identical output.
//!
//! ## Path rendering
//!
//! Integer segments render as `[i]`; string segments render as `.key` with
//! the leading dot omitted while nothing has been rendered yet. The path
//! `["fields", 0, "key"]` renders as `fields[0].key`.

use serde_json::Value;

use sdt_core::{SdtError, ValidationError};

use crate::registry::SchemaRegistry;

/// One segment of a structural path within a document.
///
/// Indices order before keys so mixed-kind comparisons stay total.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// Array index.
    Index(u64),
    /// Object key.
    Key(String),
}

/// A single schema violation at a structural path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Path from the document root to the violating value.
    pub path: Vec<PathSegment>,
    /// Engine-produced description of the violation.
    pub message: String,
}

impl Violation {
    /// Render as `"{message} at '{path}'"`, or the bare message for a
    /// root-level violation.
    pub fn rendered(&self) -> String {
        let path = render_path(&self.path);
        if path.is_empty() {
            self.message.clone()
        } else {
            format!("{} at '{}'", self.message, path)
        }
    }
}

/// Render a structural path in the `fields[0].key` form.
pub fn render_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            PathSegment::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
        }
    }
    out
}

/// Parse a JSON Pointer (`/fields/0/key`) into structural path segments.
///
/// A segment is an index only when it is all digits without a leading zero
/// (`0` itself allowed); everything else is a key. `~0`/`~1` escapes are
/// decoded.
pub fn parse_pointer(pointer: &str) -> Vec<PathSegment> {
    pointer
        .split('/')
        .skip(1)
        .map(|raw| {
            let unescaped = raw.replace("~1", "/").replace("~0", "~");
            if is_array_index(&unescaped) {
                match unescaped.parse::<u64>() {
                    Ok(i) => PathSegment::Index(i),
                    Err(_) => PathSegment::Key(unescaped),
                }
            } else {
                PathSegment::Key(unescaped)
            }
        })
        .collect()
}

fn is_array_index(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && (s == "0" || !s.starts_with('0'))
}

/// Validate one document against one schema, collecting every violation.
///
/// # Errors
///
/// Returns [`SdtError::Validation`] with the summary
/// `"{label} failed schema validation."` and one rendered detail per
/// violation when the document does not conform, or
/// [`SdtError::SchemaCompile`] when the schema itself cannot be compiled.
pub fn validate_document(
    doc: &Value,
    schema: &Value,
    registry: &SchemaRegistry,
    label: &str,
) -> Result<(), SdtError> {
    let validator = registry.compile(schema)?;

    let mut violations: Vec<Violation> = validator
        .iter_errors(doc)
        .map(|err| Violation {
            path: parse_pointer(&err.instance_path.to_string()),
            message: err.to_string(),
        })
        .collect();

    if violations.is_empty() {
        return Ok(());
    }

    violations.sort_by(|a, b| a.path.cmp(&b.path));

    let details = violations.iter().map(Violation::rendered).collect();
    Err(ValidationError::new(format!("{label} failed schema validation."), details).into())
}
