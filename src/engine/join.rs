//! Sequential multi-way index join.
//!
//! A primary row starts as a single joined row. Each secondary source, in declaration
//! order, then maps every joined row so far to zero or more successors:
//!
//! ```text
//! left key absent            -> dropped (any join kind)
//! no rows under the key      -> inner: dropped, outer: kept unchanged
//! N rows under the key       -> N copies, each with the source bound to one match
//! ```
//!
//! The left key is resolved against the accumulated joined row, so a join may use a
//! field contributed by an earlier secondary source.

use std::sync::Arc;

use crate::descriptor::{JoinKind, SecondarySourceSpec, SourceDescriptor};
use crate::row::{canonical_key, resolve, share, JoinedRow, Row};

use super::index::SourceIndexes;

/// Joins one primary row against every secondary source of `sources`.
///
/// Never fails; absent keys only shrink the result. A source missing from `indexes`
/// behaves like a source with no rows.
pub fn join(primary_row: Row, sources: &SourceDescriptor, indexes: &SourceIndexes) -> Vec<JoinedRow> {
    let primary_name: Arc<str> = Arc::from(sources.primary_name.as_str());
    let mut result = vec![JoinedRow::from_shared(primary_name, share(primary_row))];

    for spec in &sources.secondary_sources {
        if result.is_empty() {
            break;
        }
        result = join_source(result, spec, indexes);
    }

    result
}

fn join_source(
    left_rows: Vec<JoinedRow>,
    spec: &SecondarySourceSpec,
    indexes: &SourceIndexes,
) -> Vec<JoinedRow> {
    let index = indexes.get(&spec.name);
    let mut joined = Vec::with_capacity(left_rows.len());

    for left in left_rows {
        let matches = {
            let Some(key) = resolve(&spec.join_left, &left).and_then(canonical_key) else {
                continue;
            };
            index.and_then(|index| index.lookup(&key).map(|rows| (index.shared_name(), rows)))
        };

        match matches {
            Some((name, rows)) => {
                joined.extend(rows.iter().map(|right| left.with_source(name, right)));
            }
            None if spec.join_kind == JoinKind::Outer => joined.push(left),
            None => {}
        }
    }

    log::trace!(
        "Joined `{}` ({:?}) on `{}`: {} rows",
        spec.name,
        spec.join_kind,
        spec.join_left,
        joined.len()
    );

    joined
}
