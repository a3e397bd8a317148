// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole-cache invalidated result store.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use hashbrown::HashMap;

/// A per-instance store of derived-computation results.
///
/// Entries are keyed by computation identity (usually the method name) and
/// hold type-erased, reference-counted results. Hits hand out clones of the
/// same [`Rc`], so two consecutive lookups with no intervening
/// [`invalidate`](Self::invalidate) return the identical object.
///
/// Invalidation is coarse: one call drops every entry, whatever changed.
/// Entries are then re-populated one by one as computations are requested
/// again.
///
/// # Example
///
/// ```rust
/// use arbor_memo::MemoCache;
/// use std::rc::Rc;
///
/// let mut cache = MemoCache::new();
/// let mut calls = 0;
///
/// let a = cache.get_or_insert_with("as_array", || { calls += 1; vec![0.0_f64, 0.5, 1.0] });
/// let b = cache.get_or_insert_with("as_array", || { calls += 1; vec![] });
/// assert!(Rc::ptr_eq(&a, &b));
/// assert_eq!(calls, 1);
///
/// assert!(cache.invalidate());
/// let c = cache.get_or_insert_with("as_array", || { calls += 1; vec![0.0_f64] });
/// assert!(!Rc::ptr_eq(&a, &c));
/// assert_eq!(calls, 2);
/// ```
#[derive(Default)]
pub struct MemoCache {
    entries: HashMap<&'static str, Rc<dyn Any>>,
    generation: u64,
}

impl MemoCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached results.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if a result is cached under `key`, whatever its type.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of invalidations that actually dropped entries.
    ///
    /// Useful to detect that a result obtained earlier may be stale.
    #[must_use]
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Looks up a cached result.
    ///
    /// Returns `None` on a miss or if the entry holds a different type.
    #[must_use]
    pub fn get<T: 'static>(&self, key: &str) -> Option<Rc<T>> {
        let entry = self.entries.get(key)?;
        Rc::clone(entry).downcast::<T>().ok()
    }

    /// Stores a result, replacing any previous entry under `key`.
    pub fn insert<T: 'static>(&mut self, key: &'static str, value: T) -> Rc<T> {
        let value = Rc::new(value);
        self.entries.insert(key, Rc::clone(&value) as Rc<dyn Any>);
        value
    }

    /// Returns the cached result for `key`, computing and storing it on a miss.
    ///
    /// An entry of a different type counts as a miss and is overwritten.
    pub fn get_or_insert_with<T, F>(&mut self, key: &'static str, compute: F) -> Rc<T>
    where
        T: 'static,
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.get(key) {
            return hit;
        }
        self.insert(key, compute())
    }

    /// Drops every cached result.
    ///
    /// Returns `true` if anything was cached. The generation only advances
    /// when entries were actually dropped.
    pub fn invalidate(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        self.entries.clear();
        self.generation += 1;
        true
    }
}

impl fmt::Debug for MemoCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        f.debug_struct("MemoCache")
            .field("keys", &keys)
            .field("generation", &self.generation)
            .finish()
    }
}
