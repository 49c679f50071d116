//! Wrapper around the JSON Schema engine.

use std::collections::BTreeSet;

use serde_json::Value;

use super::normalize::RawError;
use crate::errors::ValidatorError;

// JSON Schema draft-07 (stable and well-tested)
use jsonschema::draft7 as schema_draft;

/// A compiled schema plus the source document, kept together so raw errors
/// can carry the expected schema fragment alongside the violation.
pub struct SchemaValidator {
    schema: Value,
    compiled: jsonschema::Validator,
}

impl SchemaValidator {
    pub fn new(schema: &Value) -> Result<Self, ValidatorError> {
        let compiled = schema_draft::options()
            .build(schema)
            .map_err(|err| ValidatorError::Schema(err.to_string()))?;
        Ok(Self {
            schema: schema.clone(),
            compiled,
        })
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Column names the schema declares as properties.
    pub fn declared_columns(&self) -> BTreeSet<String> {
        self.schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_valid(&self, document: &Value) -> bool {
        self.compiled.is_valid(document)
    }

    /// Lazily yields one raw error per violation; an empty sequence means
    /// the document conforms. Recreate the iterator to restart.
    pub fn iter_errors<'a>(&'a self, document: &'a Value) -> impl Iterator<Item = RawError> + 'a {
        self.compiled
            .iter_errors(document)
            .map(|err| raw_from_engine(&err, &self.schema))
    }
}

/// Converts one engine error into the raw record the normalizer consumes.
fn raw_from_engine(error: &jsonschema::ValidationError<'_>, schema: &Value) -> RawError {
    let pointer = error.schema_path.to_string();
    let raw_segments: Vec<&str> = pointer.trim_start_matches('/').split('/').collect();
    // Segments stay pointer-escaped for fragment lookup; the reported path
    // carries the literal property names.
    let schema_path: Vec<String> = raw_segments
        .iter()
        .map(|segment| decode_pointer_segment(segment))
        .collect();
    // The last segment is the violated keyword; the segments before it
    // locate the subschema the instance was checked against.
    let code = schema_path.last().cloned().unwrap_or_default();
    let expected = expected_fragment(schema, &raw_segments);

    RawError {
        code,
        schema_path,
        value: display_value(error.instance.as_ref()),
        expected,
        message: error.to_string(),
    }
}

fn expected_fragment(schema: &Value, raw_segments: &[&str]) -> String {
    let parent = match raw_segments.len() {
        0 | 1 => String::new(),
        n => format!("/{}", raw_segments[..n - 1].join("/")),
    };
    schema
        .pointer(&parent)
        .map(display_value)
        .unwrap_or_default()
}

/// Undoes RFC 6901 escaping (`~1` then `~0`, in that order).
fn decode_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
