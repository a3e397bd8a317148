// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Node: an observable tree of typed nodes with validated, undoable properties.
//!
//! Arbor Node is the state layer under design tools and editors: a document
//! owns a tree of nodes, every node carries named properties declared by its
//! type, and every edit is validated, recorded for undo, and propagated to
//! whoever depends on it.
//!
//! - Properties are declared once per type with a [`NodeTypeBuilder`] and
//!   validated on every write ([`Rule`]).
//! - Every write that changes a value becomes one undo step
//!   ([`Document::undo`], [`Document::redo`]). Only replacing
//!   [`Value::None`], such as filling an empty child slot, is unrecorded.
//! - A change runs the node's `update` hook, which drops its memo cache and
//!   bubbles the change up to the observers (normally the parent).
//! - Shared properties push their value down into every current child.
//! - Child-slot properties name fixed positions in the children sequence.
//!
//! ## Property kinds
//!
//! | Kind | Validation | On write |
//! |---|---|---|
//! | [`PropertyKind::Plain`] | its [`Rule`] | store, run `update` |
//! | [`PropertyKind::Shared`] | its [`Rule`] | push into children (no broadcast), store, run `update` |
//! | [`PropertyKind::ChildSlot`] | node handles only | copy shared values onto the child, place it, run `update` |
//! | [`PropertyKind::Appearance`] | its [`Rule`] | store, redraw if `auto_draw` |
//!
//! Every type carries two root properties: `name` (text) and `visible`
//! (appearance flag, default `true`). Swapping the occupant of a child slot
//! hands `visible` from the old occupant to the new one and hides the old one,
//! on redo and on undo alike.
//!
//! ## Tree invariants
//!
//! - A node has a parent iff it appears exactly once in that parent's children.
//! - [`Document::idx`] is `None` iff the node is parentless.
//! - Attaching an already-parented node, or an ancestor of the new parent, is
//!   rejected; detach first.
//! - The parent observes each child; attaching and detaching maintain this.
//!
//! ## Errors
//!
//! Every fallible operation returns [`Error`] before touching any state.
//! Validation failures are [`PropertyError`]s, structural ones [`TreeError`]s.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use arbor_node::{Document, NodeTypeBuilder, TypeRegistry, UpdatePolicy, Value};
//!
//! let mut types = TypeRegistry::new();
//! let camber_line = types.register(
//!     NodeTypeBuilder::new("CamberLine")
//!         .update_policy(UpdatePolicy::Derived)
//!         .shared_bounded("sample_rate", 0.0, 9999.0, 200),
//! );
//! let profile = types.register(
//!     NodeTypeBuilder::new("Profile")
//!         .update_policy(UpdatePolicy::Derived)
//!         .shared_bounded("sample_rate", 0.0, 9999.0, 200)
//!         .child_slot("camber_line"),
//! );
//!
//! let mut doc = Document::new(types);
//! let p = doc.create(profile);
//! let first = doc.create(camber_line);
//! let second = doc.create(camber_line);
//!
//! // Attach, then swap: the new occupant is shown and the old one hidden.
//! doc.set(p, "camber_line", first).unwrap();
//! doc.set(p, "camber_line", second).unwrap();
//! assert_eq!(doc.get(first, "visible").unwrap(), Value::from(false));
//! assert_eq!(doc.get(second, "visible").unwrap(), Value::from(true));
//!
//! // Shared values flow down to the current child.
//! doc.set(p, "sample_rate", 100).unwrap();
//! assert_eq!(doc.get(second, "sample_rate").unwrap(), Value::from(100));
//!
//! // Derived results are cached until the next change.
//! let a = doc.memoized(second, "points", |_| vec![0.0_f64, 0.5, 1.0]).unwrap();
//! let b = doc.memoized(second, "points", |_| Vec::new()).unwrap();
//! assert!(Rc::ptr_eq(&a, &b));
//!
//! // Filling the empty slot was not recorded; the swap and the sample rate were.
//! assert_eq!(doc.undo().unwrap().as_deref(), Some("sample_rate change"));
//! assert_eq!(doc.get(second, "sample_rate").unwrap(), Value::from(200));
//! assert_eq!(doc.undo().unwrap().as_deref(), Some("camber_line change"));
//! assert!(!doc.can_undo());
//! assert_eq!(doc.get(p, "camber_line").unwrap(), Value::from(first));
//! assert_eq!(doc.get(first, "visible").unwrap(), Value::from(true));
//! ```
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`Record`] and [`RecordValue`].
//! - `tracing`: debug events for recorded changes, undo, redo and loads;
//!   trace events for rejected writes and cache invalidation.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod display;
mod document;
mod error;
mod id;
mod persist;
mod property;
mod tree;
mod types;
mod value;

pub use arbor_memo::MemoCache;
pub use arbor_undo::{Transaction, UndoStack};

pub use display::display_name;
pub use document::{Document, History, Observer, PropertyChanged, Renderer, Update};
pub use error::{Error, PropertyError, TreeError};
pub use id::{ListenerId, NodeId, ObserverId};
pub use persist::{Record, RecordValue};
pub use property::{PropertyDescriptor, PropertyKind, Rule};
pub use types::{NodeType, NodeTypeBuilder, NodeTypeId, TypeRegistry, UpdatePolicy};
pub use value::Value;
