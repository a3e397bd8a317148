// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The undo/redo stack.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;

use crate::transaction::Transaction;

/// A stack of committed [`Transaction`]s plus the branch of undone ones.
///
/// Every [`commit`](Self::commit) is one discrete, separately undoable step;
/// nothing is coalesced. Committing discards the redo branch.
///
/// There are two ways to drive the stack:
///
/// - When the context lives outside the stack, call [`undo`](Self::undo) and
///   [`redo`](Self::redo) directly.
/// - When the context owns its stack (so it cannot lend `&mut self` twice), use
///   the split form: [`take_undo`](Self::take_undo), run the half, then
///   [`finish_undo`](Self::finish_undo) on success or
///   [`abort_undo`](Self::abort_undo) on failure. Same for redo.
///
/// # Example
///
/// ```rust
/// use arbor_undo::{Transaction, UndoStack};
///
/// let mut text = String::from("hi");
/// let mut stack = UndoStack::<String, ()>::new();
///
/// let tx = Transaction::new(
///     "append",
///     |s: &mut String| { s.push('!'); Ok(()) },
///     |s: &mut String| { s.pop(); Ok(()) },
/// );
/// tx.redo(&mut text).unwrap();
/// stack.commit(tx);
/// assert_eq!(text, "hi!");
///
/// assert_eq!(stack.undo(&mut text), Ok(Some("append")));
/// assert_eq!(text, "hi");
/// assert_eq!(stack.redo(&mut text), Ok(Some("append")));
/// assert_eq!(text, "hi!");
/// ```
pub struct UndoStack<C, E> {
    done: VecDeque<Transaction<C, E>>,
    undone: Vec<Transaction<C, E>>,
    limit: Option<usize>,
}

impl<C, E> Default for UndoStack<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E> UndoStack<C, E> {
    /// Creates an empty, unbounded stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            done: VecDeque::new(),
            undone: Vec::new(),
            limit: None,
        }
    }

    /// Creates an empty stack that keeps at most `limit` undo steps.
    ///
    /// The oldest step is evicted when a commit would exceed the limit.
    /// A limit of zero records nothing.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Returns the depth limit, if any.
    #[must_use]
    #[inline]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Records an already-applied transaction.
    ///
    /// Clears the redo branch.
    pub fn commit(&mut self, tx: Transaction<C, E>) {
        self.undone.clear();
        self.push_done(tx);
    }

    fn push_done(&mut self, tx: Transaction<C, E>) {
        self.done.push_back(tx);
        if let Some(limit) = self.limit {
            while self.done.len() > limit {
                self.done.pop_front();
            }
        }
    }

    /// Drops all history, both undo and redo.
    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
    }

    /// Returns `true` if there is a step to undo.
    #[must_use]
    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    /// Returns `true` if there is a step to redo.
    #[must_use]
    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Number of undoable steps.
    #[must_use]
    #[inline]
    pub fn undo_len(&self) -> usize {
        self.done.len()
    }

    /// Number of redoable steps.
    #[must_use]
    #[inline]
    pub fn redo_len(&self) -> usize {
        self.undone.len()
    }

    /// Name of the step [`undo`](Self::undo) would revert.
    #[must_use]
    pub fn undo_name(&self) -> Option<&str> {
        self.done.back().map(Transaction::name)
    }

    /// Name of the step [`redo`](Self::redo) would re-apply.
    #[must_use]
    pub fn redo_name(&self) -> Option<&str> {
        self.undone.last().map(Transaction::name)
    }

    /// Iterates undoable step names, most recent first.
    pub fn undo_names(&self) -> impl Iterator<Item = &str> {
        self.done.iter().rev().map(Transaction::name)
    }

    /// Reverts the most recent step against `ctx`.
    ///
    /// Returns the step name, or `None` when there is nothing to undo. If the
    /// reverse half fails the step stays on the undo side.
    pub fn undo(&mut self, ctx: &mut C) -> Result<Option<&str>, E> {
        let Some(tx) = self.take_undo() else {
            return Ok(None);
        };
        if let Err(err) = tx.undo(ctx) {
            self.abort_undo(tx);
            return Err(err);
        }
        self.finish_undo(tx);
        Ok(self.redo_name())
    }

    /// Re-applies the most recently undone step against `ctx`.
    ///
    /// Returns the step name, or `None` when there is nothing to redo. If the
    /// forward half fails the step stays on the redo side.
    pub fn redo(&mut self, ctx: &mut C) -> Result<Option<&str>, E> {
        let Some(tx) = self.take_redo() else {
            return Ok(None);
        };
        if let Err(err) = tx.redo(ctx) {
            self.abort_redo(tx);
            return Err(err);
        }
        self.finish_redo(tx);
        Ok(self.undo_name())
    }

    /// Pops the most recent step so the caller can run its reverse half.
    pub fn take_undo(&mut self) -> Option<Transaction<C, E>> {
        self.done.pop_back()
    }

    /// Moves a successfully undone step onto the redo branch.
    pub fn finish_undo(&mut self, tx: Transaction<C, E>) {
        self.undone.push(tx);
    }

    /// Returns a step whose reverse half failed to the undo side.
    pub fn abort_undo(&mut self, tx: Transaction<C, E>) {
        self.done.push_back(tx);
    }

    /// Pops the most recently undone step so the caller can run its forward half.
    pub fn take_redo(&mut self) -> Option<Transaction<C, E>> {
        self.undone.pop()
    }

    /// Moves a successfully redone step back onto the undo side.
    ///
    /// Unlike [`commit`](Self::commit) this keeps the rest of the redo branch.
    pub fn finish_redo(&mut self, tx: Transaction<C, E>) {
        self.push_done(tx);
    }

    /// Returns a step whose forward half failed to the redo branch.
    pub fn abort_redo(&mut self, tx: Transaction<C, E>) {
        self.undone.push(tx);
    }
}

impl<C, E> fmt::Debug for UndoStack<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoStack")
            .field("undo", &self.done.iter().map(Transaction::name).collect::<Vec<_>>())
            .field("redo", &self.undone.iter().map(Transaction::name).collect::<Vec<_>>())
            .field("limit", &self.limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;

    fn add(name: &'static str, amount: i32) -> Transaction<i32, &'static str> {
        Transaction::new(
            name,
            move |n: &mut i32| {
                *n += amount;
                Ok(())
            },
            move |n: &mut i32| {
                *n -= amount;
                Ok(())
            },
        )
    }

    fn apply(stack: &mut UndoStack<i32, &'static str>, n: &mut i32, tx: Transaction<i32, &'static str>) {
        tx.redo(n).unwrap();
        stack.commit(tx);
    }

    #[test]
    fn empty_stack() {
        let mut stack = UndoStack::<i32, &'static str>::new();
        let mut n = 0;
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.undo(&mut n), Ok(None));
        assert_eq!(stack.redo(&mut n), Ok(None));
        assert_eq!(stack.limit(), None);
    }

    #[test]
    fn undo_in_reverse_order() {
        let mut stack = UndoStack::new();
        let mut n = 0;
        apply(&mut stack, &mut n, add("a", 1));
        apply(&mut stack, &mut n, add("b", 10));
        apply(&mut stack, &mut n, add("c", 100));
        assert_eq!(n, 111);
        assert_eq!(stack.undo_names().collect::<Vec<_>>(), vec!["c", "b", "a"]);

        assert_eq!(stack.undo(&mut n), Ok(Some("c")));
        assert_eq!(n, 11);
        assert_eq!(stack.undo(&mut n), Ok(Some("b")));
        assert_eq!(stack.undo(&mut n), Ok(Some("a")));
        assert_eq!(n, 0);
        assert_eq!(stack.redo_len(), 3);

        assert_eq!(stack.redo(&mut n), Ok(Some("a")));
        assert_eq!(n, 1);
        assert_eq!(stack.redo_name(), Some("b"));
    }

    #[test]
    fn commit_clears_redo_branch() {
        let mut stack = UndoStack::new();
        let mut n = 0;
        apply(&mut stack, &mut n, add("a", 1));
        apply(&mut stack, &mut n, add("b", 2));
        stack.undo(&mut n).unwrap();
        assert!(stack.can_redo());

        apply(&mut stack, &mut n, add("c", 4));
        assert!(!stack.can_redo());
        assert_eq!(n, 5);
    }

    #[test]
    fn redo_keeps_remaining_branch() {
        let mut stack = UndoStack::new();
        let mut n = 0;
        apply(&mut stack, &mut n, add("a", 1));
        apply(&mut stack, &mut n, add("b", 2));
        stack.undo(&mut n).unwrap();
        stack.undo(&mut n).unwrap();

        stack.redo(&mut n).unwrap();
        assert_eq!(stack.redo_len(), 1);
        assert_eq!(stack.undo_name(), Some("a"));
    }

    #[test]
    fn failed_undo_stays_put() {
        let mut stack = UndoStack::new();
        let mut n = 0;
        stack.commit(Transaction::new(
            "stuck",
            |_: &mut i32| Ok(()),
            |_: &mut i32| Err("cannot revert"),
        ));
        assert_eq!(stack.undo(&mut n), Err("cannot revert"));
        assert_eq!(stack.undo_len(), 1);
        assert_eq!(stack.redo_len(), 0);
    }

    #[test]
    fn failed_redo_stays_put() {
        let mut stack = UndoStack::new();
        let mut n = 0;
        stack.commit(Transaction::new(
            "once",
            |n: &mut i32| if *n == 0 { Err("refused") } else { Ok(()) },
            |_: &mut i32| Ok(()),
        ));
        stack.undo(&mut n).unwrap();
        assert_eq!(stack.redo(&mut n), Err("refused"));
        assert_eq!(stack.redo_len(), 1);
        assert_eq!(stack.undo_len(), 0);
    }

    #[test]
    fn limit_evicts_oldest() {
        let mut stack = UndoStack::with_limit(2);
        let mut n = 0;
        apply(&mut stack, &mut n, add("a", 1));
        apply(&mut stack, &mut n, add("b", 2));
        apply(&mut stack, &mut n, add("c", 4));
        assert_eq!(stack.undo_len(), 2);
        assert_eq!(stack.undo_names().collect::<Vec<_>>(), vec!["c", "b"]);

        stack.undo(&mut n).unwrap();
        stack.undo(&mut n).unwrap();
        assert_eq!(stack.undo(&mut n), Ok(None));
        // "a" was evicted, so its effect stays.
        assert_eq!(n, 1);
    }

    #[test]
    fn clear_drops_everything() {
        let mut stack = UndoStack::new();
        let mut n = 0;
        apply(&mut stack, &mut n, add("a", 1));
        apply(&mut stack, &mut n, add("b", 2));
        stack.undo(&mut n).unwrap();
        stack.clear();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn debug_lists_names() {
        let mut stack = UndoStack::new();
        let mut n = 0;
        apply(&mut stack, &mut n, add("a", 1));
        let debug = format!("{:?}", stack);
        assert!(debug.contains("UndoStack"));
        assert!(debug.contains("\"a\""));
    }
}
