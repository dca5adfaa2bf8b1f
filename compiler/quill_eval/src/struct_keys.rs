//! Field and method name resolution for host structs.
//!
//! Resolving a name against a [`StructType`] parses field tags and merges
//! methods, so the result is cached per descriptor. The cache is owned by
//! whoever binds host values and handed to evaluators explicitly; lookups
//! take a read lock and only the first lookup of a descriptor takes the
//! write lock.

use parking_lot::RwLock;
use quill_value::errors::{invalid_tag, nil_dereference};
use quill_value::{normalize, EvalError, HostStruct, StructType, StructTypeId, Value};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Where a template-visible name points inside a struct descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StructKey {
    Field(usize),
    Method(usize),
}

pub type StructKeys = Arc<FxHashMap<String, StructKey>>;

/// Per-descriptor name tables, filtered by an active version.
#[derive(Default)]
pub struct StructKeyCache {
    version: Option<String>,
    keys: RwLock<FxHashMap<StructTypeId, StructKeys>>,
}

impl StructKeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that shows fields tagged `name,<version>` only for `version`.
    pub fn with_version(version: impl Into<String>) -> Self {
        StructKeyCache {
            version: Some(version.into()),
            keys: RwLock::default(),
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Number of descriptors resolved so far.
    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name table for `ty`, building it on first use.
    pub fn keys(&self, ty: &StructType) -> Result<StructKeys, EvalError> {
        if let Some(keys) = self.keys.read().get(&ty.id()) {
            return Ok(Arc::clone(keys));
        }
        let mut guard = self.keys.write();
        if let Some(keys) = guard.get(&ty.id()) {
            return Ok(Arc::clone(keys));
        }
        let keys = Arc::new(self.build(ty)?);
        tracing::debug!(struct_type = ty.name(), names = keys.len(), "cached struct keys");
        guard.insert(ty.id(), Arc::clone(&keys));
        Ok(keys)
    }

    fn build(&self, ty: &StructType) -> Result<FxHashMap<String, StructKey>, EvalError> {
        let mut keys = FxHashMap::default();
        for (index, field) in ty.fields().iter().enumerate() {
            let name = match &field.tag {
                None => field.name.as_str(),
                Some(tag) => {
                    let (name, version) = parse_tag(tag).ok_or_else(|| invalid_tag(&field.name))?;
                    if version.is_some() && version != self.version.as_deref() {
                        continue;
                    }
                    name
                }
            };
            keys.insert(name.to_owned(), StructKey::Field(index));
        }
        for (index, method) in ty.methods().iter().enumerate() {
            keys.entry(method.name.clone()).or_insert(StructKey::Method(index));
        }
        Ok(keys)
    }

    /// Value of `name` on `value`: `Ok(None)` when the type has no such
    /// name. A nil struct pointer is an error.
    pub fn lookup(&self, value: &HostStruct, name: &str) -> Result<Option<Value>, EvalError> {
        let keys = self.keys(value.struct_type())?;
        let Some(&key) = keys.get(name) else {
            return Ok(None);
        };
        let found = match key {
            StructKey::Field(index) => value.field(index).map(normalize).transpose()?,
            StructKey::Method(index) => value.bound_method(index).map(Value::Func),
        };
        found.ok_or_else(nil_dereference).map(Some)
    }
}

/// Split `name[,version]`; `None` when the name is empty or has
/// characters other than letters, digits and `_`.
fn parse_tag(tag: &str) -> Option<(&str, Option<&str>)> {
    let (name, version) = match tag.split_once(',') {
        Some((name, version)) => (name, Some(version)),
        None => (tag, None),
    };
    let valid = !name.is_empty() && name.chars().all(|c| c == '_' || c.is_alphanumeric());
    valid.then_some((name, version))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::*;
    use quill_value::Native;

    struct Product {
        name: String,
        price: i64,
    }

    fn product_type() -> Arc<StructType> {
        StructType::of::<Product>("Product")
            .tagged_field("Name", "name", |p| Native::from(p.name.clone()))
            .tagged_field("Price", "price,v2", |p| Native::from(p.price))
            .field("Legacy", |p| Native::from(p.price * 100))
            .build()
    }

    #[test]
    fn parses_tags() {
        assert_eq!(parse_tag("title"), Some(("title", None)));
        assert_eq!(parse_tag("title,v1"), Some(("title", Some("v1"))));
        assert_eq!(parse_tag("två_2"), Some(("två_2", None)));
        assert_eq!(parse_tag(""), None);
        assert_eq!(parse_tag("a-b"), None);
        assert_eq!(parse_tag(",v1"), None);
    }

    #[test]
    fn tagged_names_replace_field_names() {
        let cache = StructKeyCache::new();
        let keys = cache.keys(&product_type()).unwrap();
        assert_eq!(keys.get("name"), Some(&StructKey::Field(0)));
        assert_eq!(keys.get("Name"), None);
        assert_eq!(keys.get("Legacy"), Some(&StructKey::Field(2)));
    }

    #[test]
    fn version_filters_fields() {
        let ty = product_type();
        assert!(StructKeyCache::new().keys(&ty).unwrap().get("price").is_none());
        let v2 = StructKeyCache::with_version("v2");
        assert_eq!(v2.keys(&ty).unwrap().get("price"), Some(&StructKey::Field(1)));
        assert!(StructKeyCache::with_version("v3").keys(&ty).unwrap().get("price").is_none());
    }

    #[test]
    fn caches_per_descriptor() {
        let cache = StructKeyCache::new();
        let ty = product_type();
        let first = cache.keys(&ty).unwrap();
        let second = cache.keys(&ty).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn descriptors_of_one_type_keep_their_own_tables() {
        let cache = StructKeyCache::new();
        let price_only = StructType::of::<Product>("PriceOnly")
            .field("Price", |p| Native::from(p.price))
            .build();
        let both = StructType::of::<Product>("Both")
            .field("Name", |p| Native::from(p.name.clone()))
            .field("Price", |p| Native::from(p.price))
            .build();
        let pen = || Product {
            name: "Pen".to_owned(),
            price: 3,
        };
        let first = HostStruct::new(&price_only, pen()).unwrap();
        let second = HostStruct::new(&both, pen()).unwrap();

        assert_eq!(cache.lookup(&first, "Price").unwrap(), Some(Value::int(3)));
        assert_eq!(cache.lookup(&second, "Price").unwrap(), Some(Value::int(3)));
        assert_eq!(cache.lookup(&second, "Name").unwrap(), Some(Value::string("Pen")));
        assert_eq!(cache.lookup(&first, "Name").unwrap(), None);
        assert_eq!(cache.len(), 2);
        assert_ne!(price_only.id(), both.id());
    }

    #[test]
    fn invalid_tag_is_reported() {
        let ty = StructType::of::<Product>("Product")
            .tagged_field("Name", "na-me", |p| Native::from(p.name.clone()))
            .build();
        let err = StructKeyCache::new().keys(&ty).unwrap_err();
        assert_eq!(err.message, "invalid tag of field \"Name\"");
    }

    #[test]
    fn lookup_values() {
        let ty = product_type();
        let cache = StructKeyCache::with_version("v2");
        let p = HostStruct::new(
            &ty,
            Product {
                name: "Pen".to_owned(),
                price: 3,
            },
        )
        .unwrap();
        assert_eq!(cache.lookup(&p, "name").unwrap(), Some(Value::string("Pen")));
        assert_eq!(cache.lookup(&p, "price").unwrap(), Some(Value::int(3)));
        assert_eq!(cache.lookup(&p, "missing").unwrap(), None);
        let nil = HostStruct::nil(&ty);
        assert!(cache.lookup(&nil, "name").is_err());
    }
}
