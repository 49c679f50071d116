pub mod errors;
pub mod filetype;
pub mod hierarchy;
pub mod reference;
pub mod report;
pub mod validation;

pub use errors::ValidatorError;
pub use reference::{ContentMode, Reference};
pub use report::{QcSink, Report, ValidationState};
pub use validation::ValidationEngine;
