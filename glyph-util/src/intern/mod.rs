//! Global string interner.
//!
//! Backed by a `DashMap` for lock-free concurrent access, the same design
//! `faxc-util::symbol::interner` uses for compiler symbols. An `Interned`
//! handle is a 4-byte index into the table; strings are leaked to `'static`
//! once and never freed, which is acceptable because the reader's lifetime
//! is bounded by the process that embeds it.

use ahash::AHasher;
use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

struct StringTable {
    map: DashMap<u64, Vec<(&'static str, u32)>>,
    next_index: AtomicU32,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity(256),
            next_index: AtomicU32::new(0),
        }
    }

    fn hash_of(s: &str) -> u64 {
        let mut hasher = AHasher::default();
        s.hash(&mut hasher);
        hasher.finish()
    }

    fn intern(&self, s: &str) -> Interned {
        let hash = Self::hash_of(s);
        if let Some(bucket) = self.map.get(&hash) {
            if let Some((_, idx)) = bucket.iter().find(|(stored, _)| *stored == s) {
                return Interned(*idx);
            }
        }

        let mut bucket = self.map.entry(hash).or_default();
        if let Some((_, idx)) = bucket.iter().find(|(stored, _)| *stored == s) {
            return Interned(*idx);
        }
        let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
        let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
        bucket.push((leaked, idx));
        Interned(idx)
    }

    fn resolve(&self, interned: Interned) -> &'static str {
        for bucket in self.map.iter() {
            if let Some((s, _)) = bucket.value().iter().find(|(_, idx)| *idx == interned.0) {
                return s;
            }
        }
        ""
    }
}

/// A handle to an interned string: a 4-byte index into the global table.
///
/// Two `Interned` values compare equal iff the underlying strings are
/// equal, and that comparison is a single integer comparison.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interned(u32);

impl Interned {
    /// Intern `s`, returning the existing handle if `s` was seen before.
    #[inline]
    pub fn intern(s: &str) -> Self {
        STRING_TABLE.intern(s)
    }

    /// Look up the original string for this handle.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        STRING_TABLE.resolve(*self)
    }
}

impl std::fmt::Debug for Interned {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interned({:?})", self.as_str())
    }
}

impl std::fmt::Display for Interned {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static_assertions::assert_impl_all!(Interned: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_same_handle() {
        assert_eq!(Interned::intern("foo"), Interned::intern("foo"));
    }

    #[test]
    fn different_strings_different_handles() {
        assert_ne!(Interned::intern("foo-a"), Interned::intern("foo-b"));
    }

    #[test]
    fn round_trips_through_as_str() {
        let i = Interned::intern("round-trip-me");
        assert_eq!(i.as_str(), "round-trip-me");
    }

    #[test]
    fn empty_string_interns() {
        let i = Interned::intern("");
        assert_eq!(i.as_str(), "");
    }

    #[test]
    fn concurrent_interning_is_consistent() {
        use std::thread;
        let handles: Vec<_> = (0..16)
            .map(|_| thread::spawn(|| Interned::intern("shared-across-threads")))
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for r in &results[1..] {
            assert_eq!(*r, results[0]);
        }
    }
}
