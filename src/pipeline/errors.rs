//! # Wrangling Error Types
//!
//! - **Configuration / MissingSource**: raised eagerly, before any primary row is read
//! - **Instantiation / Assignment**: raised lazily, by the row that triggers them
//!
//! Absence of a value at a path is never an error.

use thiserror::Error;

use crate::descriptor::DescriptorError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum WrangleError {
    #[error("Cannot wrangle `{target}`: {reason}")]
    Configuration { target: String, reason: String },
    #[error("`{target}` requires a secondary source named `{source_name}` but it has not been provided")]
    MissingSource { target: String, source_name: String },
    #[error("Failed setting value {value} on field `{field}` of `{target}`: {reason}")]
    Assignment {
        target: String,
        field: String,
        value: String,
        reason: String,
    },
    #[error("Failed during instantiation of `{target}`: {reason}")]
    Instantiation { target: String, reason: String },
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

impl WrangleError {
    pub(crate) fn configuration(target: &str, reason: impl Into<String>) -> Self {
        WrangleError::Configuration {
            target: target.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised before any row was processed.
    pub fn is_eager(&self) -> bool {
        !matches!(
            self,
            WrangleError::Assignment { .. } | WrangleError::Instantiation { .. }
        )
    }
}
