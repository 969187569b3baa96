//! # Schema Registry
//!
//! Loads the schema corpus from the spec directory and resolves
//! cross-schema `$ref` URIs against it.
//!
//! ## Resolution
//!
//! Every `*.json` file in the spec directory is parsed and registered under
//! its declared `$id`, falling back to its bare filename. During
//! compilation a [`jsonschema::Retrieve`] implementation serves `$ref`
//! lookups from that snapshot: first by exact URI, then by the URI's
//! trailing filename. Unknown URIs (draft metaschemas and the like) resolve
//! to the permissive empty schema so validation never performs network I/O.
//!
//! ## Lifecycle
//!
//! A registry is built fresh per validation call and is immutable after
//! construction. A missing spec directory degrades to an empty registry;
//! only the primary schema being validated against is required to exist.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;

use sdt_core::{DocumentKind, SdtError, SPEC_DIR_ENV};

/// Subdirectory of the working directory searched when neither an explicit
/// spec directory nor the environment override is given.
pub const DEFAULT_SPEC_SUBDIR: &str = "spec";

/// Resolve the schema directory.
///
/// Priority:
///   1) the explicit argument, when given;
///   2) the `SDT_SPEC_DIR` environment variable, when non-empty;
///   3) `./spec` relative to the current working directory.
pub fn resolve_spec_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Ok(dir) = std::env::var(SPEC_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(DEFAULT_SPEC_SUBDIR))
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SPEC_SUBDIR))
}

/// Resolves `$ref` URIs against the loaded registry, never the network.
struct LocalSchemaRetriever {
    /// Schemas indexed by registered identifier.
    schemas: HashMap<String, Value>,
    /// Map from bare filename to registered identifier.
    filename_to_id: HashMap<String, String>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        // Exact identifier match.
        if let Some(schema) = self.schemas.get(uri_str) {
            return Ok(schema.clone());
        }

        // Fall back to the URI's trailing filename.
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(schema) = self
            .filename_to_id
            .get(filename)
            .and_then(|id| self.schemas.get(id))
        {
            return Ok(schema.clone());
        }

        // Draft metaschemas and any other unresolved URIs get the
        // permissive empty schema, keeping validation offline.
        Ok(serde_json::json!({}))
    }
}

/// Identifier-indexed collection of schemas backing one validation call.
#[derive(Debug)]
pub struct SchemaRegistry {
    /// Directory the registry was loaded from.
    spec_dir: PathBuf,
    /// Schemas indexed by declared `$id`, falling back to filename.
    schemas: HashMap<String, Value>,
    /// Map from filename to the identifier it was registered under.
    filename_to_id: HashMap<String, String>,
}

impl SchemaRegistry {
    /// Load every `*.json` schema file from the given directory.
    ///
    /// The scan is non-recursive and sorted by filename, so a duplicate
    /// `$id` resolves to the lexicographically last file that declared it.
    /// A directory that does not exist yields an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`SdtError::SchemaParse`] if any schema file is not valid
    /// JSON, or [`SdtError::Io`] if the directory or a file cannot be read.
    pub fn load(spec_dir: impl Into<PathBuf>) -> Result<Self, SdtError> {
        let spec_dir = spec_dir.into();
        let mut schemas = HashMap::new();
        let mut filename_to_id = HashMap::new();

        if !spec_dir.is_dir() {
            return Ok(Self {
                spec_dir,
                schemas,
                filename_to_id,
            });
        }

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(&spec_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let Some(filename) = path.file_name().and_then(|f| f.to_str()).map(str::to_owned)
            else {
                continue;
            };

            let content = std::fs::read_to_string(&path)?;
            let schema: Value =
                serde_json::from_str(&content).map_err(|e| SdtError::SchemaParse {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;

            let schema_id = schema
                .get("$id")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| filename.clone());

            filename_to_id.insert(filename, schema_id.clone());
            schemas.insert(schema_id, schema);
        }

        tracing::debug!(
            spec_dir = %spec_dir.display(),
            schema_count = schemas.len(),
            "loaded schema registry"
        );

        Ok(Self {
            spec_dir,
            schemas,
            filename_to_id,
        })
    }

    /// The directory this registry was loaded from.
    pub fn spec_dir(&self) -> &Path {
        &self.spec_dir
    }

    /// Number of schemas loaded.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Identifiers of all loaded schemas, sorted.
    pub fn schema_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        ids.sort();
        ids
    }

    /// Look up a schema by registered identifier.
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.schemas.get(id)
    }

    /// Look up a schema by filename (e.g. `template.schema.json`).
    pub fn get_by_filename(&self, filename: &str) -> Option<&Value> {
        self.filename_to_id
            .get(filename)
            .and_then(|id| self.schemas.get(id))
    }

    /// The schema a document kind validates against.
    ///
    /// # Errors
    ///
    /// Returns [`SdtError::SchemaNotFound`] naming the expected file path
    /// when the kind's schema file was not present in the spec directory.
    pub fn primary_schema(&self, kind: DocumentKind) -> Result<&Value, SdtError> {
        let filename = kind.schema_filename();
        self.get_by_filename(&filename)
            .ok_or_else(|| SdtError::SchemaNotFound {
                path: self.spec_dir.join(&filename),
            })
    }

    /// Compile a schema into a validator with registry-backed `$ref`
    /// resolution.
    ///
    /// # Errors
    ///
    /// Returns [`SdtError::SchemaCompile`] when the schema is not a valid
    /// Draft 2020-12 schema.
    pub fn compile(&self, schema: &Value) -> Result<Validator, SdtError> {
        let retriever = LocalSchemaRetriever {
            schemas: self.schemas.clone(),
            filename_to_id: self.filename_to_id.clone(),
        };

        jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .with_retriever(retriever)
            .build(schema)
            .map_err(|e| SdtError::SchemaCompile {
                schema_id: schema_identity(schema),
                reason: e.to_string(),
            })
    }
}

/// Best-effort identity of a schema for error messages.
fn schema_identity(schema: &Value) -> String {
    schema
        .get("$id")
        .and_then(Value::as_str)
        .unwrap_or("<inline schema>")
        .to_string()
}
