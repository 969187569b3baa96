//! # sdt-schema — Schema Registry & Structural Validation
//!
//! Validates JSON documents against the Draft 2020-12 schema corpus in the
//! spec directory, with all `$ref` resolution performed locally.
//!
//! ## Registry (`registry`)
//!
//! [`SchemaRegistry`] scans the spec directory once per validation call,
//! indexes every schema by its declared `$id` (falling back to filename),
//! and compiles validators whose cross-schema references resolve against
//! that snapshot — never the network. The spec directory itself is located
//! through [`resolve_spec_dir`]: explicit argument, then the `SDT_SPEC_DIR`
//! environment variable, then `./spec` under the working directory.
//!
//! ## Structural validation (`validate`)
//!
//! [`validate_document`] collects every violation (not just the first),
//! sorts them by structural path for determinism, and renders each path in
//! the `fields[0].key` form before folding the lot into one
//! [`sdt_core::ValidationError`].
//!
//! ## Crate Policy
//!
//! - Depends only on `sdt-core` internally.
//! - The constraint vocabulary (required, types, enums, nesting, `$ref`,
//!   conditionals) is delegated to the `jsonschema` crate; this crate owns
//!   registry resolution, ordering, and rendering around it.

pub mod registry;
pub mod validate;

pub use registry::{resolve_spec_dir, SchemaRegistry, DEFAULT_SPEC_SUBDIR};
pub use validate::{parse_pointer, render_path, validate_document, PathSegment, Violation};
