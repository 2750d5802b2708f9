//! Wrangle - map joined, loosely-typed rows onto typed records
//!
//! This crate turns raw rows (API responses, query results) from one primary source and
//! any number of secondary sources into typed application records through:
//! - Mapping descriptors declared in code or loaded from YAML/JSON catalogs
//! - Secondary source indexes built once per run
//! - Sequential inner/outer joins evaluated in declaration order
//! - Dotted path projection onto target fields
//! - A lazy record stream that pulls primary rows on demand

pub mod binder;
pub mod descriptor;
pub mod engine;
pub mod pipeline;
pub mod row;

// Re-export commonly used types
pub use binder::{Binder, FieldAccessor, RowBinder, TypeConstructor};
pub use descriptor::{
    DescriptorCatalog, DescriptorError, FieldMapping, FieldMode, JoinKind, SecondarySourceSpec,
    SourceDescriptor, TargetDescriptor,
};
pub use pipeline::{wrangle, wrangle_with, RowWrangler, Wrangle, WrangleError, Wrangled, Wrangler};
pub use row::{JoinedRow, Row};
