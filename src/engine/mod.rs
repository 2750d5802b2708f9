//! The join-and-project core: index secondary sources, join each primary row, and
//! compute target field values from every joined row.

pub mod index;
pub mod join;
pub mod populate;

pub use index::{strip_source_segment, SourceIndex, SourceIndexes};
pub use join::join;
pub use populate::populate;
