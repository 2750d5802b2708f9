//! Mapping descriptor configuration.
//!
//! This module handles loading and validation of mapping descriptors from YAML
//! or JSON documents.
//!
//! Descriptors are defined in YAML (or JSON) with the following structure:
//!
//! ```yaml
//! name: school                     # Optional catalog name
//! descriptors:
//!   - target: Student              # Target type name
//!     sources:
//!       primary: student           # Name the primary rows are bound to
//!       secondary:                 # Joined in declaration order
//!         - name: class
//!           join_left: student.classId   # Resolved against the joined row so far
//!           join_right: class.id         # Leading segment stripped before indexing
//!           join_kind: inner             # inner | outer
//!     fields:
//!       - target_field: firstName
//!         mode: direct
//!         path: student.firstName
//!       - target_field: className
//!         path: class.className      # mode defaults to direct
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use wrangle::descriptor::DescriptorCatalog;
//!
//! let catalog = DescriptorCatalog::from_yaml_file("mappings.yaml")?;
//! let descriptor = catalog.get("Student")?;
//! ```

use super::errors::DescriptorError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use validator::Validate;

/// How unmatched rows are treated when joining a secondary source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    /// Drop the left row when nothing matches.
    #[default]
    #[serde(alias = "INNER", alias = "Inner")]
    Inner,
    /// Keep the left row, leaving the secondary source absent.
    #[serde(alias = "OUTER", alias = "Outer")]
    Outer,
}

/// One secondary source and how it joins onto the rows accumulated so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SecondarySourceSpec {
    /// Source name, also the key its rows are bound to in a joined row
    #[validate(length(min = 1, message = "secondary source name cannot be empty"))]
    pub name: String,
    /// Dotted path evaluated against the accumulated joined row
    #[validate(length(min = 1, message = "join_left cannot be empty"))]
    pub join_left: String,
    /// Dotted path evaluated against a raw row of this source, after its
    /// leading segment is stripped
    #[validate(length(min = 1, message = "join_right cannot be empty"))]
    pub join_right: String,
    #[serde(default)]
    pub join_kind: JoinKind,
}

impl SecondarySourceSpec {
    pub fn new(
        name: impl Into<String>,
        join_left: impl Into<String>,
        join_right: impl Into<String>,
        join_kind: JoinKind,
    ) -> Self {
        SecondarySourceSpec {
            name: name.into(),
            join_left: join_left.into(),
            join_right: join_right.into(),
            join_kind,
        }
    }

    pub fn inner(
        name: impl Into<String>,
        join_left: impl Into<String>,
        join_right: impl Into<String>,
    ) -> Self {
        Self::new(name, join_left, join_right, JoinKind::Inner)
    }

    pub fn outer(
        name: impl Into<String>,
        join_left: impl Into<String>,
        join_right: impl Into<String>,
    ) -> Self {
        Self::new(name, join_left, join_right, JoinKind::Outer)
    }
}

/// The primary source and the ordered list of secondary sources joined onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SourceDescriptor {
    #[serde(rename = "primary")]
    #[validate(length(min = 1, message = "primary source name cannot be empty"))]
    pub primary_name: String,
    /// Order matters: later joins may reference sources joined earlier
    #[serde(default, rename = "secondary")]
    #[validate(nested)]
    pub secondary_sources: Vec<SecondarySourceSpec>,
}

impl SourceDescriptor {
    pub fn new(primary_name: impl Into<String>) -> Self {
        SourceDescriptor {
            primary_name: primary_name.into(),
            secondary_sources: Vec::new(),
        }
    }

    /// Names of every secondary source, in join order.
    pub fn secondary_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.secondary_sources.iter().map(|s| s.name.as_str())
    }
}

/// How a target field gets its value.
///
/// A mapping without a `mode` key is read as `direct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case", try_from = "RawFieldMode")]
pub enum FieldMode {
    /// Copy the value found at a dotted path of the joined row.
    Direct { path: String },
    /// Declared but not supported; the field is left untouched.
    Concat { fields: Vec<String> },
    /// Declared but not supported; the field is left untouched.
    Arithmetic { expression: String },
}

impl FieldMode {
    pub fn name(&self) -> &'static str {
        match self {
            FieldMode::Direct { .. } => "direct",
            FieldMode::Concat { .. } => "concat",
            FieldMode::Arithmetic { .. } => "arithmetic",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModeKind {
    #[default]
    #[serde(alias = "DIRECT")]
    Direct,
    #[serde(alias = "CONCAT")]
    Concat,
    #[serde(alias = "ARITHMETIC")]
    Arithmetic,
}

/// Catalog form of a field mode, before the payload of the chosen mode is checked.
#[derive(Deserialize)]
struct RawFieldMode {
    #[serde(default)]
    mode: ModeKind,
    path: Option<String>,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    expression: String,
}

impl TryFrom<RawFieldMode> for FieldMode {
    type Error = String;

    fn try_from(raw: RawFieldMode) -> Result<Self, Self::Error> {
        match raw.mode {
            ModeKind::Direct => raw
                .path
                .map(|path| FieldMode::Direct { path })
                .ok_or_else(|| "direct mapping requires a `path`".to_string()),
            ModeKind::Concat => Ok(FieldMode::Concat { fields: raw.fields }),
            ModeKind::Arithmetic => Ok(FieldMode::Arithmetic {
                expression: raw.expression,
            }),
        }
    }
}

/// A rule deriving one target field from a joined row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FieldMapping {
    #[validate(length(min = 1, message = "target_field cannot be empty"))]
    pub target_field: String,
    #[serde(flatten)]
    pub mode: FieldMode,
}

impl FieldMapping {
    pub fn direct(target_field: impl Into<String>, path: impl Into<String>) -> Self {
        FieldMapping {
            target_field: target_field.into(),
            mode: FieldMode::Direct { path: path.into() },
        }
    }

    pub fn concat<S: Into<String>>(
        target_field: impl Into<String>,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        FieldMapping {
            target_field: target_field.into(),
            mode: FieldMode::Concat {
                fields: fields.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn arithmetic(target_field: impl Into<String>, expression: impl Into<String>) -> Self {
        FieldMapping {
            target_field: target_field.into(),
            mode: FieldMode::Arithmetic {
                expression: expression.into(),
            },
        }
    }

    /// Whether the populator produces a value for this mapping.
    pub fn is_supported(&self) -> bool {
        matches!(self.mode, FieldMode::Direct { .. })
    }
}

/// Everything needed to wrangle rows into one target type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TargetDescriptor {
    /// Target type name, used for catalog lookups and error messages
    #[validate(length(min = 1, message = "target name cannot be empty"))]
    pub target: String,
    /// Missing when the target declares no primary source
    #[serde(default)]
    #[validate(nested)]
    pub sources: Option<SourceDescriptor>,
    #[serde(default)]
    #[validate(nested)]
    pub fields: Vec<FieldMapping>,
}

impl TargetDescriptor {
    pub fn new(target: impl Into<String>) -> Self {
        TargetDescriptor {
            target: target.into(),
            sources: None,
            fields: Vec::new(),
        }
    }

    /// Declares the primary source, keeping any secondary sources already declared.
    pub fn primary(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        match self.sources.as_mut() {
            Some(sources) => sources.primary_name = name,
            None => self.sources = Some(SourceDescriptor::new(name)),
        }
        self
    }

    /// Appends a secondary source. Declares an unnamed primary if none exists yet,
    /// which [`check`](Self::check) will reject until [`primary`](Self::primary) is called.
    pub fn secondary(mut self, spec: SecondarySourceSpec) -> Self {
        self.sources
            .get_or_insert_with(|| SourceDescriptor::new(""))
            .secondary_sources
            .push(spec);
        self
    }

    pub fn field(mut self, mapping: FieldMapping) -> Self {
        self.fields.push(mapping);
        self
    }

    pub fn direct(self, target_field: impl Into<String>, path: impl Into<String>) -> Self {
        self.field(FieldMapping::direct(target_field, path))
    }

    /// Structural validation followed by the cross-field rules the derive cannot express:
    /// - secondary source names are unique and differ from the primary name
    /// - target fields are mapped at most once
    /// - direct paths are non-empty
    pub fn check(&self) -> Result<(), DescriptorError> {
        self.validate()
            .map_err(|e| DescriptorError::invalid(&self.target, e.to_string()))?;

        if let Some(sources) = &self.sources {
            let mut seen = HashSet::new();
            for name in sources.secondary_names() {
                if name == sources.primary_name {
                    return Err(DescriptorError::invalid(
                        &self.target,
                        format!("secondary source `{}` shares the primary source name", name),
                    ));
                }
                if !seen.insert(name) {
                    return Err(DescriptorError::invalid(
                        &self.target,
                        format!("secondary source `{}` is declared more than once", name),
                    ));
                }
            }
        }

        let mut mapped = HashSet::new();
        for mapping in &self.fields {
            if !mapped.insert(mapping.target_field.as_str()) {
                return Err(DescriptorError::invalid(
                    &self.target,
                    format!("field `{}` is mapped more than once", mapping.target_field),
                ));
            }
            if let FieldMode::Direct { path } = &mapping.mode {
                if path.is_empty() {
                    return Err(DescriptorError::invalid(
                        &self.target,
                        format!("field `{}` has an empty direct path", mapping.target_field),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// A set of target descriptors loaded from one YAML/JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorCatalog {
    /// Optional catalog name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub descriptors: Vec<TargetDescriptor>,
}

impl DescriptorCatalog {
    /// Load and validate a catalog from YAML text
    pub fn from_yaml_str(yaml_content: &str) -> Result<Self, DescriptorError> {
        let catalog: DescriptorCatalog = serde_yaml::from_str(yaml_content).map_err(|e| {
            DescriptorError::ConfigParseError {
                error: e.to_string(),
            }
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a catalog from JSON text
    pub fn from_json_str(json_content: &str) -> Result<Self, DescriptorError> {
        let catalog: DescriptorCatalog = serde_json::from_str(json_content).map_err(|e| {
            DescriptorError::ConfigParseError {
                error: e.to_string(),
            }
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a catalog from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, DescriptorError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| DescriptorError::read_error_with_context(path.display().to_string(), e))?;
        Self::from_yaml_str(&contents)
    }

    /// Load a catalog, choosing JSON for `.json` files and YAML otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DescriptorError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if !is_json {
            return Self::from_yaml_file(path);
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| DescriptorError::read_error_with_context(path.display().to_string(), e))?;
        Self::from_json_str(&contents)
    }

    /// Validate every descriptor and the uniqueness of target names
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let mut targets = HashSet::new();
        for descriptor in &self.descriptors {
            descriptor.check()?;
            if !targets.insert(descriptor.target.as_str()) {
                return Err(DescriptorError::DuplicateTarget {
                    target: descriptor.target.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, target: &str) -> Result<&TargetDescriptor, DescriptorError> {
        self.descriptors
            .iter()
            .find(|d| d.target == target)
            .ok_or_else(|| DescriptorError::UnknownTarget {
                target: target.to_string(),
            })
    }

    /// Removes and returns the descriptor for `target`.
    pub fn take(&mut self, target: &str) -> Result<TargetDescriptor, DescriptorError> {
        let position = self
            .descriptors
            .iter()
            .position(|d| d.target == target)
            .ok_or_else(|| DescriptorError::UnknownTarget {
                target: target.to_string(),
            })?;
        Ok(self.descriptors.remove(position))
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> + '_ {
        self.descriptors.iter().map(|d| d.target.as_str())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
