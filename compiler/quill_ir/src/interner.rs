//! Thread-safe string interner.
//!
//! Parsed templates are shared across concurrent renders, so interning has
//! to work through `&self`. Lookups of already-interned strings only take
//! the read lock.

use crate::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Default)]
struct InternTable {
    map: FxHashMap<Arc<str>, Name>,
    strings: Vec<Arc<str>>,
}

/// Maps strings to [`Name`]s and back.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// New interner with the empty string pre-interned as [`Name::EMPTY`].
    pub fn new() -> Self {
        let interner = StringInterner {
            table: RwLock::new(InternTable::default()),
        };
        interner.intern("");
        interner
    }

    pub fn intern(&self, s: &str) -> Name {
        if let Some(&name) = self.table.read().map.get(s) {
            return name;
        }

        let mut table = self.table.write();
        // Another thread may have won the race between the two locks.
        if let Some(&name) = table.map.get(s) {
            return name;
        }
        let raw = u32::try_from(table.strings.len())
            .unwrap_or_else(|_| panic!("interner exceeded {} strings", u32::MAX));
        let name = Name::from_raw(raw);
        let text: Arc<str> = Arc::from(s);
        table.strings.push(Arc::clone(&text));
        table.map.insert(text, name);
        name
    }

    /// Text of `name`. Names from a different interner resolve to `""`.
    pub fn lookup(&self, name: Name) -> Arc<str> {
        self.table
            .read()
            .strings
            .get(name.index())
            .cloned()
            .unwrap_or_else(|| Arc::from(""))
    }

    /// Name of `s` if it has been interned.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.read().map.get(s).copied()
    }

    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Interner shared between the parser, the evaluator and host bindings.
#[derive(Clone, Default)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &StringInterner {
        &self.0
    }
}
