//! # sdt-core — Foundational Types for the SDT Validator
//!
//! Defines the types every other crate in the workspace builds on: the
//! uniform [`ValidationError`] shape, the top-level [`SdtError`] hierarchy,
//! the [`DocumentKind`] taxonomy, and the schema-agnostic document
//! accessors used by the cross-reference and formula checks.
//!
//! ## Key Design Principles
//!
//! 1. **Documents are untyped JSON values.** Validation drives entirely off
//!    whatever schema is supplied at the call site, so documents stay
//!    `serde_json::Value` trees. Typed views exist only as accessor
//!    functions ([`field_keys`], [`conditions`], [`capabilities`]) at the
//!    point where cross-document logic needs named fields.
//!
//! 2. **One failure currency.** Structural, formula, and cross-reference
//!    failures all carry the same summary-plus-details shape. Callers tell
//!    the phases apart by which call raised, never by the error's internals.
//!
//! 3. **Expected failures are values.** Schema violations, unknown formula
//!    fields, and broken cross-references are routine outcomes returned as
//!    `Err`, designed to be caught and displayed. Panics are reserved for
//!    programming errors.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sdt-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;

// Re-export primary types for ergonomic imports.
pub use document::{
    capabilities, conditions, document_id, field_keys, load_document, metrics, sdt_support,
    template_id, DocumentKind,
};
pub use error::{SdtError, ValidationError, SPEC_DIR_ENV};
