//! Shared error types for the validation pipeline.

use thiserror::Error;

use crate::hierarchy::HierarchyLevel;

/// Errors that terminate a validation run.
///
/// Everything here is fatal: structural problems with the *content* being
/// validated never surface as this type, they become entries in the error
/// report instead.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Neither the extension nor the declared content type maps to a
    /// supported encoding.
    #[error("file type {extension:?}/{content_type:?} is not supported")]
    UnsupportedFileType {
        extension: String,
        content_type: String,
    },

    /// The reference failed its construction invariants.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// A CSV cell can be cast to more than one schema-declared type. The
    /// schema under-specifies the column, so this is surfaced rather than
    /// resolved with a silent tie-break.
    #[error("value {value:?} can be cast to multiple types {matching:?}, please specify")]
    AmbiguousCast {
        value: String,
        matching: Vec<String>,
    },

    /// A container stayed invisible for the whole retry budget.
    #[error("could not resolve {level} container {id:?} after {attempts} attempts")]
    Resolution {
        level: HierarchyLevel,
        id: String,
        attempts: u32,
    },

    /// An error location's first key-path segment is not a hierarchy level.
    #[error("value {0:?} is not a valid hierarchy location")]
    InvalidHierarchyLocation(String),

    /// The schema document does not compile.
    #[error("failed to compile schema: {0}")]
    Schema(String),

    /// The container client reported an explicit failure. These are never
    /// retried; only empty results are.
    #[error("container fetch failed for {level} {id:?}: {cause}")]
    Client {
        level: HierarchyLevel,
        id: String,
        cause: anyhow::Error,
    },
}
