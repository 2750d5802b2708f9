//! Canonical text form of join keys.
//!
//! Both sides of every join go through [`canonical_key`] before comparison, so the
//! number `12` and the string `"12"` land in the same bucket. Numbers use their
//! `Display` form, which means `12` and `12.0` stay distinct.

use std::borrow::Cow;

use serde_json::Value;

/// Converts a resolved value into the string used for index lookups.
///
/// Returns `None` for `null`, which can never be joined on.
pub fn canonical_key(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        // Compound keys compare by their compact JSON text.
        Value::Array(_) | Value::Object(_) => Some(Cow::Owned(value.to_string())),
    }
}
