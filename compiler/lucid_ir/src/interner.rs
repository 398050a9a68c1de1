//! String interner for identifier storage.
//!
//! O(1) interning and lookup. A lowering session is single-threaded, but the
//! interner may outlive a session and be shared by a driver, so access goes
//! through an `RwLock`.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

struct InternerInner {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents.
    strings: Vec<&'static str>,
}

/// String interner.
///
/// Interned strings live for the lifetime of the process: the backing
/// allocation is leaked so lookups can hand out `&'static str` without
/// holding the lock.
pub struct StringInterner {
    inner: RwLock<InternerInner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        StringInterner {
            inner: RwLock::new(InternerInner {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern a string, returning its handle.
    pub fn intern(&self, text: &str) -> Name {
        if let Some(&idx) = self.inner.read().map.get(text) {
            return Name::from_index(idx);
        }

        let mut inner = self.inner.write();
        // Re-check under the write lock; another caller may have won the race.
        if let Some(&idx) = inner.map.get(text) {
            return Name::from_index(idx);
        }

        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let idx = inner.strings.len() as u32;
        inner.strings.push(leaked);
        inner.map.insert(leaked, idx);
        Name::from_index(idx)
    }

    /// Resolve a handle back to its text.
    pub fn lookup(&self, name: Name) -> &'static str {
        let inner = self.inner.read();
        inner
            .strings
            .get(name.index() as usize)
            .copied()
            .unwrap_or("")
    }

    /// Number of interned strings, including the pre-interned empty string.
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        // The empty string is always present.
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn intern_is_idempotent() {
        let interner = StringInterner::new();
        let a = interner.intern("value");
        let b = interner.intern("value");
        assert_eq!(a, b);
        assert_eq!(interner.lookup(a), "value");
    }

    #[test]
    fn empty_string_is_preinterned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }

    #[test]
    fn distinct_strings_get_distinct_names() {
        let interner = StringInterner::new();
        let a = interner.intern("x");
        let b = interner.intern("y");
        assert_ne!(a, b);
        assert_eq!(interner.lookup(a), "x");
        assert_eq!(interner.lookup(b), "y");
    }

    #[test]
    fn unknown_name_resolves_to_empty() {
        let interner = StringInterner::new();
        assert_eq!(interner.lookup(Name::from_index(999)), "");
    }
}

#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Interning any set of strings round-trips, and equal strings
        /// always share a handle.
        #[test]
        fn round_trip(strings in proptest::collection::vec(".{0,16}", 0..16)) {
            let interner = StringInterner::new();
            let names: Vec<Name> = strings.iter().map(|s| interner.intern(s)).collect();
            for (s, n) in strings.iter().zip(&names) {
                prop_assert_eq!(interner.lookup(*n), s.as_str());
                prop_assert_eq!(interner.intern(s), *n);
            }
        }
    }
}
