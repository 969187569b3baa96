//! # Error Types — Uniform Validation Failures
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations, except [`ValidationError`], whose rendering is part of
//! the public contract and therefore written by hand.
//!
//! ## Design
//!
//! - Fatal kinds (missing schema file, malformed schema, malformed
//!   document) are distinct [`SdtError`] variants with full context.
//! - Expected kinds (schema violations, unknown formula fields, broken
//!   cross-references) all flow through [`SdtError::Validation`] carrying
//!   the same [`ValidationError`] shape. Downstream consumers pattern-match
//!   on message substrings and ordered detail lists, so the shape is flat
//!   and stable.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Name of the environment variable that overrides the schema directory.
pub const SPEC_DIR_ENV: &str = "SDT_SPEC_DIR";

/// Uniform failure value for the validation phases.
///
/// Carries a one-line summary plus an ordered list of already-rendered
/// diagnostics. Rendering: the summary line, then each diagnostic on its
/// own line prefixed with `- `.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
    errors: Vec<String>,
}

impl ValidationError {
    /// Create a failure from a summary and its rendered diagnostics.
    pub fn new(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            message: message.into(),
            errors,
        }
    }

    /// The one-line summary.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The rendered diagnostics, in deterministic order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for detail in &self.errors {
            write!(f, "\n- {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Top-level error type for the SDT validator.
#[derive(Error, Debug)]
pub enum SdtError {
    /// A validation phase rejected the document.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The schema file for the requested document kind is missing.
    #[error("schema file not found: {}. Set {} or run from the repo root so ./spec exists.", .path.display(), SPEC_DIR_ENV)]
    SchemaNotFound {
        /// Full path where the schema file was expected.
        path: PathBuf,
    },

    /// A schema file exists but could not be parsed.
    #[error("failed to parse schema file '{path}': {reason}")]
    SchemaParse {
        /// Path to the offending schema file.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// A schema could not be compiled into a validator.
    #[error("failed to compile schema '{schema_id}': {reason}")]
    SchemaCompile {
        /// The schema `$id` or filename.
        schema_id: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The input document could not be read or parsed.
    #[error("failed to load document '{path}': {reason}")]
    DocumentParse {
        /// Path to the document that failed to load.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// I/O error during file operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
