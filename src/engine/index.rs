//! Secondary source indexes.
//!
//! Each secondary source is materialised once and bucketed by the canonical form of
//! its right join key, so probing it for a primary row is a single hash lookup.
//! Rows whose key does not resolve are left out: nothing can ever match them.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::descriptor::SourceDescriptor;
use crate::row::{canonical_key, resolve, share, Row};

/// Drops the leading segment (conventionally the source name) of a right join path.
///
/// A path without a `.` is returned unchanged.
pub fn strip_source_segment(join_right: &str) -> &str {
    join_right
        .split_once('.')
        .map(|(_, rest)| rest)
        .unwrap_or(join_right)
}

/// Rows of one secondary source keyed by join value.
#[derive(Debug, Clone)]
pub struct SourceIndex {
    name: Arc<str>,
    key_path: String,
    buckets: HashMap<String, Vec<Arc<Value>>>,
    indexed: usize,
    skipped: usize,
}

impl SourceIndex {
    /// Builds the index for source `name` from all of its rows.
    pub fn build<I>(name: &str, rows: I, join_right: &str) -> Self
    where
        I: IntoIterator<Item = Row>,
    {
        let key_path = strip_source_segment(join_right).to_string();
        let mut buckets: HashMap<String, Vec<Arc<Value>>> = HashMap::new();
        let mut indexed = 0;
        let mut skipped = 0;

        for row in rows {
            let key = resolve(&key_path, &row)
                .and_then(canonical_key)
                .map(|key| key.into_owned());

            match key {
                Some(key) => {
                    buckets.entry(key).or_default().push(share(row));
                    indexed += 1;
                }
                None => skipped += 1,
            }
        }

        log::debug!(
            "Indexed secondary source `{}` on `{}`: {} rows under {} keys, {} rows without a key",
            name,
            key_path,
            indexed,
            buckets.len(),
            skipped
        );

        SourceIndex {
            name: Arc::from(name),
            key_path,
            buckets,
            indexed,
            skipped,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> &Arc<str> {
        &self.name
    }

    /// The path resolved against each raw row, with the source segment stripped.
    pub fn key_path(&self) -> &str {
        &self.key_path
    }

    /// Rows whose canonical join key equals `key`, in input order.
    pub fn lookup(&self, key: &str) -> Option<&[Arc<Value>]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Number of distinct join keys.
    pub fn key_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of rows that made it into the index.
    pub fn row_count(&self) -> usize {
        self.indexed
    }

    /// Number of rows dropped because their join key was absent.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Indexes for every secondary source of one descriptor, keyed by source name.
#[derive(Debug, Clone, Default)]
pub struct SourceIndexes {
    indexes: HashMap<String, SourceIndex>,
}

impl SourceIndexes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index for each secondary source of `sources`, taking its rows out
    /// of `supplied`. Sources without supplied rows get an empty index.
    pub fn build<S>(sources: &SourceDescriptor, supplied: &mut HashMap<String, S>) -> Self
    where
        S: IntoIterator<Item = Row>,
    {
        let mut indexes = SourceIndexes::new();
        for spec in &sources.secondary_sources {
            let rows = supplied.remove(&spec.name);
            let index = SourceIndex::build(&spec.name, rows.into_iter().flatten(), &spec.join_right);
            indexes.insert(index);
        }
        indexes
    }

    pub fn insert(&mut self, index: SourceIndex) -> Option<SourceIndex> {
        self.indexes.insert(index.name().to_string(), index)
    }

    pub fn get(&self, name: &str) -> Option<&SourceIndex> {
        self.indexes.get(name)
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceIndex> + '_ {
        self.indexes.values()
    }
}
