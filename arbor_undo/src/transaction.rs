// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single named, reversible step.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

/// One half of a [`Transaction`]: a procedure that mutates the context.
pub type Action<C, E> = Box<dyn Fn(&mut C) -> Result<(), E>>;

/// A named pair of forward ("redo") and reverse ("undo") procedures.
///
/// Running [`redo`](Self::redo) followed by [`undo`](Self::undo) must leave the
/// context observably unchanged. The transaction owns whatever state the two
/// halves need (typically the target handle plus the old and new values), so it
/// can be stored in history without borrowing the context.
///
/// # Example
///
/// ```rust
/// use arbor_undo::Transaction;
///
/// let tx: Transaction<i32, ()> = Transaction::new(
///     "add five",
///     |n: &mut i32| { *n += 5; Ok(()) },
///     |n: &mut i32| { *n -= 5; Ok(()) },
/// );
///
/// let mut n = 1;
/// tx.redo(&mut n).unwrap();
/// assert_eq!(n, 6);
/// tx.undo(&mut n).unwrap();
/// assert_eq!(n, 1);
/// ```
pub struct Transaction<C, E> {
    name: String,
    redo: Action<C, E>,
    undo: Action<C, E>,
}

impl<C, E> Transaction<C, E> {
    /// Creates a transaction from its two halves.
    pub fn new<R, U>(name: impl Into<String>, redo: R, undo: U) -> Self
    where
        R: Fn(&mut C) -> Result<(), E> + 'static,
        U: Fn(&mut C) -> Result<(), E> + 'static,
    {
        Self {
            name: name.into(),
            redo: Box::new(redo),
            undo: Box::new(undo),
        }
    }

    /// Returns the human-readable name of this step, e.g. `"angle change"`.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the forward half.
    pub fn redo(&self, ctx: &mut C) -> Result<(), E> {
        (self.redo)(ctx)
    }

    /// Runs the reverse half.
    pub fn undo(&self, ctx: &mut C) -> Result<(), E> {
        (self.undo)(ctx)
    }
}

impl<C, E> fmt::Debug for Transaction<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
