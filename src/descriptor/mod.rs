pub mod config;
pub mod errors;


// Re-export commonly used types
pub use config::{
    DescriptorCatalog, FieldMapping, FieldMode, JoinKind, SecondarySourceSpec, SourceDescriptor,
    TargetDescriptor,
};
pub use errors::DescriptorError;
