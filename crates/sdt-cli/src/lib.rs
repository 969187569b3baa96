//! # sdt-cli — Command-Line Interface for the SDT Validator
//!
//! Provides the `sdt` binary, a thin shim over the `sdt-validator` API.
//!
//! ## Subcommands
//!
//! - `sdt validate <kind> <file>` — validate one JSON document against its
//!   kind's schema, optionally cross-referencing a template.
//! - `sdt prepare-agent` — interactive helper for the agent
//!   pre-preparation checklist.
//!
//! ## Exit Codes
//!
//! The validate subcommand preserves the original tool's contract:
//! 0 success ("OK" on stdout), 1 validation failure (rendered error on
//! stderr), 2 missing input file, 3 unexpected error (missing or malformed
//! schema, malformed document).

pub mod prepare;
pub mod validate;
