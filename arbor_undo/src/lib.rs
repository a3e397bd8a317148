// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Undo: a transactional undo/redo log.
//!
//! Every change that should be undoable is captured as a [`Transaction`]: a
//! named pair of closures, one that applies the change ("redo") and one that
//! reverts it ("undo"). Applied transactions are committed to an
//! [`UndoStack`], which can then walk history backwards and forwards.
//!
//! ## Core Concepts
//!
//! - **Transactions own their state.** The closures capture the target handle
//!   and the old and new values, so history never borrows the context it acts
//!   on.
//! - **No coalescing.** Each commit is one discrete step.
//! - **Linear history.** Committing after an undo discards the redo branch.
//! - **Failure keeps position.** If a half fails, the transaction stays where
//!   it was and the error is returned to the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_undo::{Transaction, UndoStack};
//!
//! let mut value = 0_i32;
//! let mut history = UndoStack::<i32, ()>::new();
//!
//! let (old, new) = (value, 100);
//! let tx = Transaction::new(
//!     "value change",
//!     move |v: &mut i32| { *v = new; Ok(()) },
//!     move |v: &mut i32| { *v = old; Ok(()) },
//! );
//! tx.redo(&mut value).unwrap();
//! history.commit(tx);
//!
//! assert_eq!(value, 100);
//! history.undo(&mut value).unwrap();
//! assert_eq!(value, 0);
//! history.redo(&mut value).unwrap();
//! assert_eq!(value, 100);
//! ```
//!
//! ## Contexts That Own Their History
//!
//! A document usually stores its own [`UndoStack`]. Use the split methods
//! ([`UndoStack::take_undo`], [`UndoStack::finish_undo`],
//! [`UndoStack::abort_undo`] and the redo counterparts) to pop a transaction,
//! run it against the document, and put it back.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod stack;
mod transaction;

pub use stack::UndoStack;
pub use transaction::{Action, Transaction};
