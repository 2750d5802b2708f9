//! Construction and field assignment of target records.
//!
//! The pipeline never inspects target types. It asks a [`TypeConstructor`] for a fresh
//! instance and hands each computed field value to a [`FieldAccessor`]. [`Binder`]
//! implements both from registered closures; [`RowBinder`] targets plain rows.
//!
//! # Example
//!
//! ```
//! use wrangle::binder::Binder;
//!
//! #[derive(Default)]
//! struct Student {
//!     first_name: Option<String>,
//!     class_id: Option<u32>,
//! }
//!
//! let binder = Binder::<Student>::with_default()
//!     .json_field("firstName", |s: &mut Student, v| s.first_name = v)
//!     .json_field("classId", |s: &mut Student, v| s.class_id = v);
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::row::Row;

/// Produces empty target instances.
pub trait TypeConstructor<T> {
    /// Whether [`construct`](Self::construct) is usable at all.
    fn can_construct(&self) -> bool {
        true
    }

    fn construct(&self) -> Result<T, String>;
}

/// Assigns named fields on target instances.
pub trait FieldAccessor<T> {
    /// Whether `field` can be assigned.
    fn has_field(&self, _field: &str) -> bool {
        true
    }

    fn set_field(&self, target: &mut T, field: &str, value: &Value) -> Result<(), String>;
}

type Constructor<T> = Box<dyn Fn() -> Result<T, String> + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, &Value) -> Result<(), String> + Send + Sync>;

/// Closure-backed constructor and field setters for one target type.
pub struct Binder<T> {
    constructor: Option<Constructor<T>>,
    setters: HashMap<String, Setter<T>>,
}

impl<T> Binder<T> {
    /// A binder with no constructor and no fields.
    pub fn new() -> Self {
        Binder {
            constructor: None,
            setters: HashMap::new(),
        }
    }

    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> Result<T, String> + Send + Sync + 'static,
    {
        self.constructor = Some(Box::new(constructor));
        self
    }

    /// Registers a raw setter receiving the value exactly as resolved.
    pub fn field<F>(mut self, name: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut T, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.setters.insert(name.into(), Box::new(setter));
        self
    }

    /// Registers a setter that deserialises the value into `V` first.
    ///
    /// A value that does not fit `V` (including `null` for a non-`Option` type) is
    /// reported as an assignment failure.
    pub fn json_field<V, F>(self, name: impl Into<String>, assign: F) -> Self
    where
        V: DeserializeOwned,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.field(name, move |target, value| {
            let converted = V::deserialize(value).map_err(|e| e.to_string())?;
            assign(target, converted);
            Ok(())
        })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.setters.keys().map(String::as_str)
    }
}

impl<T: Default> Binder<T> {
    /// A binder constructing instances with `T::default()`.
    pub fn with_default() -> Self {
        Self::new().constructor(|| Ok(T::default()))
    }
}

impl<T> Default for Binder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Binder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<_> = self.field_names().collect();
        fields.sort_unstable();
        f.debug_struct("Binder")
            .field("constructor", &self.constructor.is_some())
            .field("fields", &fields)
            .finish()
    }
}

impl<T> TypeConstructor<T> for Binder<T> {
    fn can_construct(&self) -> bool {
        self.constructor.is_some()
    }

    fn construct(&self) -> Result<T, String> {
        match &self.constructor {
            Some(constructor) => constructor(),
            None => Err("no constructor registered".to_string()),
        }
    }
}

impl<T> FieldAccessor<T> for Binder<T> {
    fn has_field(&self, field: &str) -> bool {
        self.setters.contains_key(field)
    }

    fn set_field(&self, target: &mut T, field: &str, value: &Value) -> Result<(), String> {
        let setter = self
            .setters
            .get(field)
            .ok_or_else(|| format!("no setter registered for field `{}`", field))?;
        setter(target, value)
    }
}

/// Builds plain rows: every field is inserted as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowBinder;

impl TypeConstructor<Row> for RowBinder {
    fn construct(&self) -> Result<Row, String> {
        Ok(Row::new())
    }
}

impl FieldAccessor<Row> for RowBinder {
    fn set_field(&self, target: &mut Row, field: &str, value: &Value) -> Result<(), String> {
        target.insert(field.to_string(), value.clone());
        Ok(())
    }
}
