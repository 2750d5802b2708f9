//! Row model shared by every stage of the pipeline.
//!
//! Rows are `serde_json` objects. A [`JoinedRow`] bundles the rows contributed by each
//! source for one join combination, keyed by source name. Rows are held behind `Arc`
//! so that fanning a joined row out over several matches never copies row data.

pub mod join_key;
pub mod path;

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

pub use join_key::canonical_key;
pub use path::{resolve, PathRoot};

/// One record from a data source: string keys to arbitrary JSON-like values.
pub type Row = Map<String, Value>;

/// Wraps a row so it can be shared between joined rows and indexes.
pub(crate) fn share(row: Row) -> Arc<Value> {
    Arc::new(Value::Object(row))
}

/// The rows contributed by each source for one join combination.
///
/// Entries keep the order in which sources were joined. A source that was outer
/// joined without a match has no entry at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedRow {
    entries: Vec<(Arc<str>, Arc<Value>)>,
}

impl JoinedRow {
    /// Starts a joined row holding only the primary source.
    pub fn new(primary_name: impl Into<Arc<str>>, primary_row: Row) -> Self {
        Self::from_shared(primary_name.into(), share(primary_row))
    }

    pub(crate) fn from_shared(name: Arc<str>, row: Arc<Value>) -> Self {
        JoinedRow {
            entries: vec![(name, row)],
        }
    }

    /// Returns a copy of this joined row with `name` bound to `row`.
    ///
    /// An existing entry with the same name is replaced in place.
    pub(crate) fn with_source(&self, name: &Arc<str>, row: &Arc<Value>) -> Self {
        let mut entries = self.entries.clone();
        match entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = Arc::clone(row),
            None => entries.push((Arc::clone(name), Arc::clone(row))),
        }
        JoinedRow { entries }
    }

    /// The row contributed by `source`, if that source is part of this combination.
    pub fn get(&self, source: &str) -> Option<&Row> {
        self.entry(source).and_then(Value::as_object)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entry(source).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Source names in join order.
    pub fn source_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_ref())
    }

    /// Renders the joined row as a JSON object of source name to row.
    pub fn to_value(&self) -> Value {
        let map = self
            .entries
            .iter()
            .map(|(name, row)| (name.to_string(), row.as_ref().clone()))
            .collect();
        Value::Object(map)
    }

    fn entry(&self, source: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name.as_ref() == source)
            .map(|(_, row)| row.as_ref())
    }
}

impl PathRoot for JoinedRow {
    fn child(&self, key: &str) -> Option<&Value> {
        self.entry(key)
    }
}

impl Serialize for JoinedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, row) in &self.entries {
            map.serialize_entry(name.as_ref(), row.as_ref())?;
        }
        map.end()
    }
}
