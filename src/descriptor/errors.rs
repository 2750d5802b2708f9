//! # Descriptor Error Types
//!
//! Errors raised while loading and validating mapping descriptors.
//!
//! ## Error Categories
//!
//! - **Configuration Errors**: file I/O and parsing issues while loading a catalog
//! - **Descriptor Errors**: structurally invalid descriptors (empty names, duplicate sources)
//! - **Catalog Errors**: duplicate or unknown target names

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DescriptorError {
    #[error("Failed to read configuration file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse configuration: {error}")]
    ConfigParseError { error: String },
    #[error("Invalid descriptor for `{target}`: {message}")]
    InvalidDescriptor { target: String, message: String },
    #[error("Descriptor for `{target}` is declared more than once")]
    DuplicateTarget { target: String },
    #[error("No descriptor found for `{target}`")]
    UnknownTarget { target: String },
}

impl DescriptorError {
    /// Create a read error carrying the offending path
    ///
    /// # Example
    /// ```ignore
    /// DescriptorError::read_error_with_context("mappings.yaml", err)
    /// ```
    pub fn read_error_with_context(
        config_path: impl Into<String>,
        error: impl std::fmt::Display,
    ) -> Self {
        DescriptorError::ConfigReadError {
            error: format!("{}\n  Context: {}", error, config_path.into()),
        }
    }

    pub(crate) fn invalid(target: &str, message: impl Into<String>) -> Self {
        DescriptorError::InvalidDescriptor {
            target: target.to_string(),
            message: message.into(),
        }
    }
}
