//! Dotted path resolution over nested rows.
//!
//! A path such as `student.address.city` is split on `.` and walked one segment at a
//! time. Each step requires the current value to be an object holding the segment's
//! key. Anything else (a missing key, a scalar or array in the middle of the path, or
//! a final `null`) resolves to `None`. Absence is never an error here; callers decide
//! what it means.

use serde_json::Value;

use super::Row;

/// Anything a dotted path can start from.
pub trait PathRoot {
    /// Looks up the first segment of a path.
    fn child(&self, key: &str) -> Option<&Value>;
}

impl PathRoot for Row {
    fn child(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl PathRoot for Value {
    fn child(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }
}

/// Resolves `path` against `root`.
///
/// ```
/// use serde_json::json;
/// use wrangle::row::resolve;
///
/// let row = json!({"student": {"firstName": "James"}});
/// assert_eq!(resolve("student.firstName", &row), Some(&json!("James")));
/// assert_eq!(resolve("student.lastName", &row), None);
/// ```
pub fn resolve<'a, R>(path: &str, root: &'a R) -> Option<&'a Value>
where
    R: PathRoot + ?Sized,
{
    let mut segments = path.split('.');
    let mut current = root.child(segments.next()?)?;

    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }

    if current.is_null() {
        None
    } else {
        Some(current)
    }
}
