//! Unique-id source for auto-gensym symbols (`foo#`) and `garg` names.
//!
//! The reader needs a process-wide monotonic counter to manufacture names
//! like `p1__123#` and `rest__124#` that can never collide with a form the
//! user typed. `faxc-util` has no direct analogue (its `Symbol` indices are
//! for a different purpose), so this is grounded on the corpus's general
//! pattern of wrapping a plain `Atomic*` in a small named type rather than
//! reaching for a global `static mut`.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing source of unique integers.
///
/// Each [`GensymCounter`] is independent; the reader keeps one process-wide
/// instance via [`GensymCounter::global`] so that gensym names stay unique
/// across every read call, matching the original reader's single shared
/// counter.
#[derive(Debug)]
pub struct GensymCounter {
    next: AtomicU64,
}

impl GensymCounter {
    /// A counter starting at zero.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Return the next unique id, advancing the counter.
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// The process-wide counter shared by every reader instance.
    pub fn global() -> &'static GensymCounter {
        static GLOBAL: GensymCounter = GensymCounter::new();
        &GLOBAL
    }
}

impl Default for GensymCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonically_increasing() {
        let c = GensymCounter::new();
        let a = c.next_id();
        let b = c.next_id();
        assert!(b > a);
    }

    #[test]
    fn independent_counters_both_start_at_zero() {
        let c1 = GensymCounter::new();
        let c2 = GensymCounter::new();
        assert_eq!(c1.next_id(), 0);
        assert_eq!(c2.next_id(), 0);
    }

    #[test]
    fn global_counter_is_shared_across_calls() {
        let a = GensymCounter::global().next_id();
        let b = GensymCounter::global().next_id();
        assert!(b > a);
    }
}
