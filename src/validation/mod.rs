//! The validation pipeline: schema engine, CSV handling, coercion,
//! normalization, and the run orchestrator.

mod coerce;
mod csv;
mod normalize;
mod schema;


pub use coerce::{CsvType, cast_cell, declared_types};
pub use csv::CsvValidator;
pub use normalize::{
    ErrorLocation, ErrorNormalizer, FileError, RawError, Severity, TIMESTAMP_FORMAT,
};
pub use schema::SchemaValidator;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::ValidatorError;
use crate::filetype::FileEncoding;
use crate::hierarchy::{ContainerClient, HierarchyResolver, RetryPolicy};
use crate::reference::{ContentMode, Reference};
use crate::report::{QcSink, Report, annotate_errors};

/// Drives one validation run: content → raw errors → normalized errors →
/// location annotation → report → sink.
pub struct ValidationEngine<'a, C: ContainerClient> {
    client: &'a C,
    retry: RetryPolicy,
}

impl<'a, C: ContainerClient> ValidationEngine<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self::with_retry(client, RetryPolicy::default())
    }

    pub fn with_retry(client: &'a C, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Validates the reference against the schema, persists the report
    /// through the sink, and returns it.
    ///
    /// Configuration, ambiguous-cast, and hierarchy-resolution failures are
    /// fatal: no partial report is ever written.
    pub fn run(
        &self,
        reference: &Reference,
        schema: &Value,
        sink: &mut dyn QcSink,
    ) -> Result<Report> {
        let validator = SchemaValidator::new(schema).context("schema does not compile")?;
        let normalizer = ErrorNormalizer::new();
        let resolver = HierarchyResolver::new(self.client, self.retry.clone());

        let raw_errors = match reference.mode() {
            ContentMode::FileContent => {
                let encoding = reference.encoding()?;
                let path = reference.file_path().ok_or_else(|| {
                    ValidatorError::InvalidReference(
                        "file-content mode requires a file path".to_string(),
                    )
                })?;
                debug!(path = %path.display(), encoding = encoding.as_str(), "validating file contents");
                match encoding {
                    FileEncoding::Json => validate_json_file(&validator, path)?,
                    FileEncoding::Csv => CsvValidator::new(&validator).validate_file(path)?,
                }
            }
            ContentMode::HierarchyMetadata => {
                debug!(id = reference.id(), level = %reference.level(), "validating hierarchy metadata");
                let chain = reference.hierarchy(&resolver)?;
                let document = chain.to_document();
                validator.iter_errors(&document).collect()
            }
        };

        let mut errors = normalizer.normalize_all(raw_errors);
        let chain = reference.hierarchy(&resolver)?;
        annotate_errors(reference, chain, &mut errors)?;

        let report = Report::from_errors(errors);
        info!(
            state = %report.state(),
            errors = report.errors().len(),
            "validation complete"
        );
        sink.write_qc(reference, &report)
            .context("failed to persist validation report")?;
        Ok(report)
    }
}

/// JSON file content → raw errors. Unreadable files and unparseable
/// documents become single structural errors rather than aborting the run.
fn validate_json_file(
    validator: &SchemaValidator,
    path: &Path,
) -> Result<Vec<RawError>, ValidatorError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Ok(vec![RawError::bad_file()]),
    };
    if content.trim().is_empty() {
        return Ok(vec![RawError::empty_file()]);
    }
    match serde_json::from_str::<Value>(&content) {
        Ok(document) => Ok(validator.iter_errors(&document).collect()),
        Err(_) => Ok(vec![RawError::malformed_file()]),
    }
}
