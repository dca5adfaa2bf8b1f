//! Mappings keyed by hashable base values.

use super::{Heap, Value};
use crate::errors::{non_mutable_map, unhashable, EvalError};
use crate::Decimal;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Key of a [`MapValue`]. Only nil, bool, int, number, string and html
/// values hash.
///
/// Keys built with [`MapKey::from_value`] hash the same when their values
/// are `==`: an integral decimal in `i64` range becomes an `Int` key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapKey {
    Nil,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Str(Heap<str>),
    Html(Heap<str>),
}

impl MapKey {
    pub fn from_value(value: &Value) -> Result<MapKey, EvalError> {
        match value {
            Value::Nil => Ok(MapKey::Nil),
            Value::Bool(b) => Ok(MapKey::Bool(*b)),
            Value::Int(n) => Ok(MapKey::Int(*n)),
            Value::Decimal(d) => Ok(d
                .to_i64()
                .map_or_else(|| MapKey::Decimal((**d).clone()), MapKey::Int)),
            Value::Str(s) => Ok(MapKey::Str(s.clone())),
            Value::Html(s) => Ok(MapKey::Html(s.clone())),
            other => Err(unhashable(other.type_name())),
        }
    }

    pub fn string(s: &str) -> MapKey {
        MapKey::Str(Heap::from_text(s))
    }

    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Nil => Value::Nil,
            MapKey::Bool(b) => Value::Bool(*b),
            MapKey::Int(n) => Value::Int(*n),
            MapKey::Decimal(d) => Value::decimal(d.clone()),
            MapKey::Str(s) => Value::Str(s.clone()),
            MapKey::Html(s) => Value::Html(s.clone()),
        }
    }
}

type Entries = FxHashMap<MapKey, Value>;

/// Shared mapping. `None` entries is the nil map.
///
/// Maps built by templates are mutable; maps handed in by the host are
/// read-only views and reject `delete`.
#[derive(Clone)]
pub struct MapValue {
    entries: Option<Arc<RwLock<Entries>>>,
    mutable: bool,
}

impl MapValue {
    pub fn nil() -> Self {
        MapValue {
            entries: None,
            mutable: true,
        }
    }

    /// Empty mutable map.
    pub fn new() -> Self {
        MapValue::from_entries(Entries::default(), true)
    }

    /// Read-only view over host-provided entries.
    pub fn host<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (MapKey, Value)>,
    {
        MapValue::from_entries(entries.into_iter().collect(), false)
    }

    fn from_entries(entries: Entries, mutable: bool) -> Self {
        MapValue {
            entries: Some(Arc::new(RwLock::new(entries))),
            mutable,
        }
    }

    pub fn is_nil(&self) -> bool {
        self.entries.is_none()
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |e| e.read().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &MapKey) -> Option<Value> {
        self.entries.as_ref()?.read().get(key).cloned()
    }

    /// Insert during construction of a literal; ignored on a nil map.
    pub fn insert(&self, key: MapKey, value: Value) {
        if let Some(entries) = &self.entries {
            entries.write().insert(key, value);
        }
    }

    /// Remove `key`. Fails on read-only host maps; a nil map or a missing
    /// key is a no-op.
    pub fn remove(&self, key: &MapKey) -> Result<(), EvalError> {
        if !self.mutable {
            return Err(non_mutable_map());
        }
        if let Some(entries) = &self.entries {
            entries.write().remove(key);
        }
        Ok(())
    }

    /// Snapshot of the entries, in no particular order.
    pub fn entries(&self) -> Vec<(MapKey, Value)> {
        self.entries.as_ref().map_or_else(Vec::new, |e| {
            e.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        })
    }
}

impl Default for MapValue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Value::Map(self.clone()), f)
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        match (&self.entries, &other.entries) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            _ => false,
        }
    }
}
