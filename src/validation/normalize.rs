//! Canonical error records and the raw→normalized conversion.

use chrono::Local;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Timestamp format shared by every error of a run.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Schema-path sentinel for structural errors with no JSON pointer.
const FILE_LEVEL_SENTINEL: &str = "";

/// A violation as reported by the schema engine (or synthesized for a
/// structural CSV failure before the engine ever runs).
#[derive(Debug, Clone, PartialEq)]
pub struct RawError {
    /// The violated keyword, e.g. `required`, `type`, `enum`.
    pub code: String,
    /// Ordered schema-path segments. The single empty-string sentinel marks
    /// a file-level error.
    pub schema_path: Vec<String>,
    /// The offending instance value.
    pub value: String,
    /// The schema fragment the instance was checked against.
    pub expected: String,
    pub message: String,
}

impl RawError {
    fn structural(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            schema_path: vec![FILE_LEVEL_SENTINEL.to_string()],
            value: String::new(),
            expected: String::new(),
            message,
        }
    }

    pub fn empty_file() -> Self {
        Self::structural("empty-file", "The file is empty.".to_string())
    }

    pub fn missing_header() -> Self {
        Self::structural(
            "missing-header",
            "The file is missing a header, or the header is not recognized.".to_string(),
        )
    }

    pub fn duplicate_header() -> Self {
        Self::structural(
            "duplicate-header",
            "The file has duplicate columns in the header.".to_string(),
        )
    }

    pub fn unknown_field(column: &str) -> Self {
        Self::structural(
            "unknown-field",
            format!("The file has an unspecified column: {column}"),
        )
    }

    pub fn malformed_file() -> Self {
        Self::structural(
            "malformed-file",
            "The file has improper formatting and cannot be parsed.".to_string(),
        )
    }

    pub fn bad_file() -> Self {
        Self::structural(
            "bad-file",
            "The file cannot be properly opened or read.".to_string(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Alert,
    Error,
}

/// Where in the validated document an error points.
///
/// Serializes as `""` for file-level errors and as `{"key_path": ...}`
/// otherwise; the raw path sequence is never exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLocation {
    FileLevel,
    KeyPath(String),
}

impl ErrorLocation {
    pub fn key_path(&self) -> Option<&str> {
        match self {
            ErrorLocation::FileLevel => None,
            ErrorLocation::KeyPath(path) => Some(path),
        }
    }
}

impl Serialize for ErrorLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ErrorLocation::FileLevel => serializer.serialize_str(""),
            ErrorLocation::KeyPath(path) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("key_path", path)?;
                map.end()
            }
        }
    }
}

/// The canonical, machine-consumable error record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileError {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub code: String,
    pub location: ErrorLocation,
    pub value: String,
    pub expected: String,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flywheel_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
}

/// Converts raw errors into [`FileError`]s, stamping each one with the same
/// run timestamp so a report's errors group by run.
pub struct ErrorNormalizer {
    timestamp: String,
}

impl ErrorNormalizer {
    pub fn new() -> Self {
        Self::with_timestamp(Local::now().format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn with_timestamp(timestamp: String) -> Self {
        Self { timestamp }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn normalize(&self, raw: &RawError) -> FileError {
        let prefix = join_all_but_last(&raw.schema_path);
        let mut location = if raw.schema_path == [FILE_LEVEL_SENTINEL] {
            ErrorLocation::FileLevel
        } else {
            ErrorLocation::KeyPath(prefix.clone())
        };
        let mut value = raw.value.clone();
        let mut expected = raw.expected.clone();

        // A missing-property violation has no actual value, and its message
        // carries the only mention of the missing field. Splice the field
        // name onto the schema-path prefix so the location stays precise.
        if raw.code == "required" {
            if let Some(field) = required_field(&raw.message) {
                let key_path = if prefix.is_empty() {
                    field.to_string()
                } else {
                    format!("{prefix}.{field}")
                };
                location = ErrorLocation::KeyPath(key_path);
                value = String::new();
                expected = String::new();
            }
        }

        FileError {
            severity: Severity::Error,
            code: raw.code.clone(),
            location,
            value,
            expected,
            message: raw.message.clone(),
            timestamp: self.timestamp.clone(),
            flywheel_path: None,
            container_id: None,
        }
    }

    pub fn normalize_all(&self, raw: impl IntoIterator<Item = RawError>) -> Vec<FileError> {
        raw.into_iter().map(|err| self.normalize(&err)).collect()
    }
}

impl Default for ErrorNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn join_all_but_last(segments: &[String]) -> String {
    match segments.len() {
        0 | 1 => String::new(),
        n => segments[..n - 1].join("."),
    }
}

/// Extracts `<field>` from the fixed message shape
/// `'<field>' is a required property` (single or double quoted).
fn required_field(message: &str) -> Option<&str> {
    let quoted = message.strip_suffix(" is a required property")?;
    quoted
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .or_else(|| {
            quoted
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
        })
}
