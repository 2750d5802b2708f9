//! Pipeline orchestration.
//!
//! [`Wrangler::new`] validates a descriptor against the supplied sources and binder,
//! then indexes every secondary source once. [`Wrangler::wrangle`] turns a primary
//! row iterator into a lazy iterator of target records:
//!
//! ```text
//! primary row -> join (probing the indexes) -> joined rows -> populate -> construct + assign
//! ```
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use serde_json::json;
//! use wrangle::binder::Binder;
//! use wrangle::descriptor::{SecondarySourceSpec, TargetDescriptor};
//! use wrangle::pipeline::wrangle_with;
//! use wrangle::row::Row;
//!
//! #[derive(Default)]
//! struct Enrolment {
//!     first_name: Option<String>,
//!     class_name: Option<String>,
//! }
//!
//! let descriptor = TargetDescriptor::new("Enrolment")
//!     .primary("student")
//!     .secondary(SecondarySourceSpec::inner("class", "student.classId", "class.id"))
//!     .direct("firstName", "student.firstName")
//!     .direct("className", "class.className");
//!
//! let binder = Binder::<Enrolment>::with_default()
//!     .json_field("firstName", |e: &mut Enrolment, v| e.first_name = v)
//!     .json_field("className", |e: &mut Enrolment, v| e.class_name = v);
//!
//! let as_row = |v: serde_json::Value| v.as_object().cloned().unwrap_or_default();
//! let students: Vec<Row> = vec![as_row(json!({"classId": 12, "firstName": "James"}))];
//! let classes: Vec<Row> = vec![as_row(json!({"id": 12, "className": "CS"}))];
//!
//! let records: Vec<Enrolment> = wrangle_with::<Enrolment, _, _, _>(
//!     descriptor,
//!     students,
//!     HashMap::from([("class".to_string(), classes)]),
//!     binder,
//! )
//! .unwrap()
//! .collect::<Result<Vec<_>, _>>()
//! .unwrap();
//!
//! assert_eq!(records[0].class_name.as_deref(), Some("CS"));
//! ```

pub mod errors;

use std::collections::HashMap;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::binder::{Binder, FieldAccessor, RowBinder, TypeConstructor};
use crate::descriptor::{
    DescriptorError, FieldMapping, FieldMode, SourceDescriptor, TargetDescriptor,
};
use crate::engine::{self, SourceIndexes};
use crate::row::{JoinedRow, Row};

pub use errors::WrangleError;

/// A wrangler producing plain rows.
pub type RowWrangler = Wrangler<Row, RowBinder>;

/// Validated descriptor, built indexes and binder, shared by every iterator.
struct Plan<B> {
    target: String,
    sources: SourceDescriptor,
    fields: Vec<FieldMapping>,
    indexes: SourceIndexes,
    binder: B,
}

/// A validated, indexed pipeline for one target type.
///
/// Cloning is cheap: clones share the same indexes.
pub struct Wrangler<T, B> {
    plan: Arc<Plan<B>>,
    _target: PhantomData<fn() -> T>,
}

impl<T, B> Clone for Wrangler<T, B> {
    fn clone(&self) -> Self {
        Wrangler {
            plan: Arc::clone(&self.plan),
            _target: PhantomData,
        }
    }
}

impl<T, B> fmt::Debug for Wrangler<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrangler")
            .field("target", &self.plan.target)
            .field("sources", &self.plan.sources)
            .field("fields", &self.plan.fields.len())
            .finish()
    }
}

impl<T, B> Wrangler<T, B>
where
    B: TypeConstructor<T> + FieldAccessor<T>,
{
    /// Validates everything that can be checked without reading a primary row, then
    /// indexes the secondary sources.
    ///
    /// Checks, in order: a primary source is declared, the descriptor is well formed,
    /// every declared secondary source was supplied, the binder can construct, and every
    /// direct field can be assigned.
    pub fn new<S>(
        descriptor: TargetDescriptor,
        mut secondary_sources: HashMap<String, S>,
        binder: B,
    ) -> Result<Self, WrangleError>
    where
        S: IntoIterator<Item = Row>,
    {
        let Some(sources) = descriptor
            .sources
            .as_ref()
            .filter(|s| !s.primary_name.is_empty())
        else {
            return Err(WrangleError::configuration(
                &descriptor.target,
                "no primary source is declared",
            ));
        };

        descriptor
            .check()
            .map_err(|e| WrangleError::configuration(&descriptor.target, e.to_string()))?;

        if let Some(missing) = sources
            .secondary_names()
            .find(|name| !secondary_sources.contains_key(*name))
        {
            return Err(WrangleError::MissingSource {
                target: descriptor.target.clone(),
                source_name: missing.to_string(),
            });
        }

        if !binder.can_construct() {
            return Err(WrangleError::configuration(
                &descriptor.target,
                "no zero-argument constructor is available",
            ));
        }

        for mapping in &descriptor.fields {
            match &mapping.mode {
                FieldMode::Direct { .. } if !binder.has_field(&mapping.target_field) => {
                    return Err(WrangleError::configuration(
                        &descriptor.target,
                        format!("field `{}` cannot be assigned", mapping.target_field),
                    ));
                }
                FieldMode::Direct { .. } => {}
                unsupported => log::warn!(
                    "Field `{}` of `{}` uses unsupported mode `{}` and will be left untouched",
                    mapping.target_field,
                    descriptor.target,
                    unsupported.name()
                ),
            }
        }

        for name in secondary_sources.keys() {
            if !sources.secondary_names().any(|declared| declared == name) {
                log::debug!(
                    "Secondary source `{}` is not used by `{}` and will be ignored",
                    name,
                    descriptor.target
                );
            }
        }

        let sources = sources.clone();
        let indexes = SourceIndexes::build(&sources, &mut secondary_sources);
        let TargetDescriptor { target, fields, .. } = descriptor;

        log::debug!(
            "Prepared `{}` from primary `{}` with {} secondary sources and {} fields",
            target,
            sources.primary_name,
            indexes.len(),
            fields.len()
        );

        Ok(Wrangler {
            plan: Arc::new(Plan {
                target,
                sources,
                fields,
                indexes,
                binder,
            }),
            _target: PhantomData,
        })
    }

    pub fn target(&self) -> &str {
        &self.plan.target
    }

    pub fn sources(&self) -> &SourceDescriptor {
        &self.plan.sources
    }

    pub fn fields(&self) -> &[FieldMapping] {
        &self.plan.fields
    }

    pub fn indexes(&self) -> &SourceIndexes {
        &self.plan.indexes
    }

    /// All joined rows produced by one primary row.
    pub fn join(&self, primary_row: Row) -> Vec<JoinedRow> {
        engine::join(primary_row, &self.plan.sources, &self.plan.indexes)
    }

    /// Field values computed for one joined row.
    pub fn populate(&self, joined: &JoinedRow) -> Row {
        engine::populate(joined, &self.plan.fields)
    }

    /// Constructs a target record and assigns every populated field.
    pub fn materialize(&self, joined: &JoinedRow) -> Result<T, WrangleError> {
        let plan = &*self.plan;
        let mut record = plan
            .binder
            .construct()
            .map_err(|reason| WrangleError::Instantiation {
                target: plan.target.clone(),
                reason,
            })?;

        for (field, value) in self.populate(joined) {
            plan.binder
                .set_field(&mut record, &field, &value)
                .map_err(|reason| WrangleError::Assignment {
                    target: plan.target.clone(),
                    field: field.clone(),
                    value: value.to_string(),
                    reason,
                })?;
        }

        Ok(record)
    }

    /// Lazily maps primary rows to target records.
    pub fn wrangle<P>(&self, primary: P) -> Wrangled<T, B, P::IntoIter>
    where
        P: IntoIterator<Item = Row>,
    {
        Wrangled {
            wrangler: self.clone(),
            primary: primary.into_iter(),
            pending: Vec::new().into_iter(),
            finished: false,
        }
    }
}

/// Lazy stream of target records.
///
/// Pulls a primary row only when the records of the previous one are used up. The
/// first error ends the stream.
pub struct Wrangled<T, B, I> {
    wrangler: Wrangler<T, B>,
    primary: I,
    pending: std::vec::IntoIter<JoinedRow>,
    finished: bool,
}

impl<T, B, I> fmt::Debug for Wrangled<T, B, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrangled")
            .field("wrangler", &self.wrangler)
            .field("pending", &self.pending.len())
            .field("finished", &self.finished)
            .finish()
    }
}

impl<T, B, I> Wrangled<T, B, I> {
    pub fn wrangler(&self) -> &Wrangler<T, B> {
        &self.wrangler
    }
}

impl<T, B, I> Iterator for Wrangled<T, B, I>
where
    B: TypeConstructor<T> + FieldAccessor<T>,
    I: Iterator<Item = Row>,
{
    type Item = Result<T, WrangleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if let Some(joined) = self.pending.next() {
                let record = self.wrangler.materialize(&joined);
                if record.is_err() {
                    self.finished = true;
                    self.pending = Vec::new().into_iter();
                }
                return Some(record);
            }

            let Some(primary_row) = self.primary.next() else {
                self.finished = true;
                return None;
            };

            let joined = self.wrangler.join(primary_row);
            log::trace!(
                "Primary row produced {} joined rows for `{}`",
                joined.len(),
                self.wrangler.target()
            );
            self.pending = joined.into_iter();
        }
    }
}

impl<T, B, I> FusedIterator for Wrangled<T, B, I>
where
    B: TypeConstructor<T> + FieldAccessor<T>,
    I: Iterator<Item = Row>,
{
}

/// Validates, indexes and starts wrangling in one call.
pub fn wrangle_with<T, B, P, S>(
    descriptor: TargetDescriptor,
    primary: P,
    secondary_sources: HashMap<String, S>,
    binder: B,
) -> Result<Wrangled<T, B, P::IntoIter>, WrangleError>
where
    B: TypeConstructor<T> + FieldAccessor<T>,
    P: IntoIterator<Item = Row>,
    S: IntoIterator<Item = Row>,
{
    Ok(Wrangler::new(descriptor, secondary_sources, binder)?.wrangle(primary))
}

/// Target types that carry their own descriptor and binder.
pub trait Wrangle: Sized {
    fn descriptor() -> Result<TargetDescriptor, DescriptorError>;

    fn binder() -> Binder<Self>;
}

/// Wrangles rows into `T` using the descriptor and binder `T` declares.
pub fn wrangle<T, P, S>(
    primary: P,
    secondary_sources: HashMap<String, S>,
) -> Result<Wrangled<T, Binder<T>, P::IntoIter>, WrangleError>
where
    T: Wrangle,
    P: IntoIterator<Item = Row>,
    S: IntoIterator<Item = Row>,
{
    wrangle_with(T::descriptor()?, primary, secondary_sources, T::binder())
}
