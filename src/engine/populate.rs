//! Projection of a joined row onto target field values.

use serde_json::Value;

use crate::descriptor::{FieldMapping, FieldMode};
use crate::row::{resolve, JoinedRow, Row};

/// Computes the value of every supported field mapping for `joined`.
///
/// Direct paths that do not resolve yield `null`. Concat and arithmetic mappings
/// produce no entry, leaving the target field untouched.
pub fn populate(joined: &JoinedRow, fields: &[FieldMapping]) -> Row {
    let mut values = Row::new();

    for mapping in fields {
        match &mapping.mode {
            FieldMode::Direct { path } => {
                let value = resolve(path, joined).cloned().unwrap_or(Value::Null);
                values.insert(mapping.target_field.clone(), value);
            }
            FieldMode::Concat { .. } | FieldMode::Arithmetic { .. } => {}
        }
    }

    values
}
