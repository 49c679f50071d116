//! Location annotation and the PASS/FAIL report.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::Serialize;

use crate::errors::ValidatorError;
use crate::hierarchy::{HierarchyChain, HierarchyLevel};
use crate::reference::{ContentMode, Reference};
use crate::validation::FileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationState {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationState::Pass => f.write_str("PASS"),
            ValidationState::Fail => f.write_str("FAIL"),
        }
    }
}

/// The assembled outcome of one run. Immutable once built; serializes to
/// `{"state": "PASS"}` or `{"state": "FAIL", "data": [...]}` — the error
/// list is omitted entirely on PASS.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    state: ValidationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Vec<FileError>>,
}

impl Report {
    pub fn from_errors(errors: Vec<FileError>) -> Self {
        if errors.is_empty() {
            Self {
                state: ValidationState::Pass,
                data: None,
            }
        } else {
            Self {
                state: ValidationState::Fail,
                data: Some(errors),
            }
        }
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    pub fn passed(&self) -> bool {
        self.state == ValidationState::Pass
    }

    pub fn errors(&self) -> &[FileError] {
        self.data.as_deref().unwrap_or_default()
    }

    /// The tag value a persistence collaborator attaches to the validated
    /// object, e.g. `file-validator-PASS`.
    pub fn tag_value(&self, tag: &str) -> String {
        format!("{tag}-{}", self.state)
    }
}

/// Attaches container id and display path to each normalized error.
///
/// File-content errors have no hierarchy dimension to disambiguate, so they
/// all get the file's own id and the full path. Hierarchy-metadata errors
/// name their level in the first key-path segment.
pub fn annotate_errors(
    reference: &Reference,
    chain: &HierarchyChain,
    errors: &mut [FileError],
) -> Result<(), ValidatorError> {
    match reference.mode() {
        ContentMode::FileContent => {
            let flywheel_path = chain.lookup_path(None);
            let container_id = chain
                .get(HierarchyLevel::File)
                .and_then(|file| file.container_id(HierarchyLevel::File))
                .unwrap_or(reference.id())
                .to_string();
            for error in errors {
                error.flywheel_path = Some(flywheel_path.clone());
                error.container_id = Some(container_id.clone());
            }
        }
        ContentMode::HierarchyMetadata => {
            for error in errors {
                let key_path = error.location.key_path().unwrap_or_default();
                let segment = key_path.split('.').next().unwrap_or_default();
                let level = HierarchyLevel::from_str(segment)?;
                // A violation can name a level with no resolved container
                // (e.g. a required-property error about a missing ancestor);
                // the path still truncates there, but there is no id to pin.
                error.flywheel_path = Some(chain.lookup_path(Some(level)));
                error.container_id = chain
                    .get(level)
                    .and_then(|container| container.container_id(level))
                    .map(str::to_string);
            }
        }
    }
    Ok(())
}

/// Where the finished report goes: one idempotent overwrite per run, keyed
/// by the originating reference's identity.
pub trait QcSink {
    fn write_qc(&mut self, reference: &Reference, report: &Report) -> Result<()>;
}
