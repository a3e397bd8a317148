// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Memo: per-instance memoization with coarse invalidation.
//!
//! Derived computations on a scene node (sampled curves, slopes, centroids)
//! are pure functions of the node's properties. [`MemoCache`] stores their
//! results keyed by computation identity so repeated requests are free, and
//! throws the whole store away whenever the node reports any change.
//!
//! Invalidation is not per-key: any change clears everything, so a cache
//! never has to know which property a computation read.
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_memo::MemoCache;
//!
//! let mut cache = MemoCache::new();
//!
//! let slope = cache.get_or_insert_with("slope", || 0.5_f64);
//! assert_eq!(*slope, 0.5);
//!
//! // Any observed change on the owner:
//! cache.invalidate();
//! assert!(cache.get::<f64>("slope").is_none());
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod cache;

pub use cache::MemoCache;
