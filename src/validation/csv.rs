//! CSV structural checks and per-row schema validation.

use std::collections::HashSet;
use std::path::Path;

use csv::ReaderBuilder;
use serde_json::{Map, Value};
use tracing::debug;

use super::coerce::{cast_cell, declared_types};
use super::normalize::RawError;
use super::schema::SchemaValidator;
use crate::errors::ValidatorError;

/// Validates a CSV file against a schema, one row at a time.
///
/// The structural checks run in a fixed order and each is terminal for the
/// file: empty file, unrecognized header, duplicate columns, undeclared
/// columns, then row tokenization. Only after all of them pass are cells
/// coerced and rows validated as documents.
pub struct CsvValidator<'a> {
    schema: &'a SchemaValidator,
}

impl<'a> CsvValidator<'a> {
    pub fn new(schema: &'a SchemaValidator) -> Self {
        Self { schema }
    }

    pub fn validate_file(&self, path: &Path) -> Result<Vec<RawError>, ValidatorError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                debug!(path = %path.display(), %err, "file could not be read");
                return Ok(vec![RawError::bad_file()]);
            }
        };
        self.validate_content(&content)
    }

    pub fn validate_content(&self, content: &str) -> Result<Vec<RawError>, ValidatorError> {
        if content.trim().is_empty() {
            return Ok(vec![RawError::empty_file()]);
        }

        let mut reader = ReaderBuilder::new()
            .flexible(false)
            .from_reader(content.as_bytes());

        let header: Vec<String> = match reader.headers() {
            Ok(header) => header.iter().map(str::to_string).collect(),
            Err(_) => return Ok(vec![RawError::missing_header()]),
        };

        let declared = self.schema.declared_columns();
        // A header where no column is schema-declared is indistinguishable
        // from a data row, so treat it as absent.
        if !header.iter().any(|column| declared.contains(column)) {
            return Ok(vec![RawError::missing_header()]);
        }

        let mut seen = HashSet::new();
        if header.iter().any(|column| !seen.insert(column.clone())) {
            return Ok(vec![RawError::duplicate_header()]);
        }

        for column in &header {
            if !declared.contains(column) {
                return Ok(vec![RawError::unknown_field(column)]);
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            match record {
                Ok(row) => rows.push(row),
                // Any tokenization failure is terminal for the whole file.
                Err(_) => return Ok(vec![RawError::malformed_file()]),
            }
        }
        if rows.is_empty() {
            return Ok(vec![RawError::empty_file()]);
        }

        debug!(rows = rows.len(), columns = header.len(), "validating rows");
        let mut errors = Vec::new();
        for row in &rows {
            let document = self.coerce_row(&header, row)?;
            errors.extend(self.schema.iter_errors(&document));
        }
        Ok(errors)
    }

    fn coerce_row(
        &self,
        header: &[String],
        row: &csv::StringRecord,
    ) -> Result<Value, ValidatorError> {
        let mut document = Map::new();
        for (column, cell) in header.iter().zip(row.iter()) {
            let types = declared_types(self.schema.schema(), column);
            document.insert(column.clone(), cast_cell(cell, &types)?);
        }
        Ok(Value::Object(document))
    }
}
