// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parent/child structure and observer wiring.
//!
//! A node appears in its parent's children exactly once, and only the parent
//! link points back. Attaching a child registers the parent as one of its
//! observers; detaching removes it.

use alloc::boxed::Box;

use crate::document::{Document, Observer, Update};
use crate::error::{Error, TreeError};
use crate::id::{NodeId, ObserverId};

impl Document {
    /// The parent of `node`, if attached.
    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>, Error> {
        Ok(self.node(node)?.parent)
    }

    /// The ordered children of `node`.
    pub fn children(&self, node: NodeId) -> Result<&[NodeId], Error> {
        Ok(&self.node(node)?.children)
    }

    /// Position of `node` in its parent's children; `None` iff parentless.
    pub fn idx(&self, node: NodeId) -> Result<Option<usize>, Error> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(None);
        };
        Ok(self.node(parent)?.children.iter().position(|&c| c == node))
    }

    /// Inserts `child` at `index` in the children of `parent`.
    ///
    /// `child` must be parentless and must not be `parent` or one of its
    /// ancestors; `index` may be at most the number of children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<(), Error> {
        self.check_attachable(parent, child)?;
        let children = &mut self.node_mut(parent)?.children;
        if index > children.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: children.len(),
            }
            .into());
        }
        children.insert(index, child);
        self.attach(parent, child)
    }

    /// Appends `child` to the children of `parent`.
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        let len = self.node(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    /// Puts `child` at `index`, returning the detached previous occupant.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<NodeId, Error> {
        self.check_attachable(parent, child)?;
        let children = &mut self.node_mut(parent)?.children;
        let len = children.len();
        let Some(occupant) = children.get_mut(index) else {
            return Err(TreeError::IndexOutOfRange { index, len }.into());
        };
        let old = core::mem::replace(occupant, child);
        self.release(parent, old)?;
        self.attach(parent, child)?;
        Ok(old)
    }

    /// Removes and returns the child at `index`, now parentless.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId, Error> {
        let children = &mut self.node_mut(parent)?.children;
        if index >= children.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: children.len(),
            }
            .into());
        }
        let old = children.remove(index);
        self.release(parent, old)?;
        Ok(old)
    }

    /// Detaches `node` from its parent, returning the former parent.
    pub fn detach(&mut self, node: NodeId) -> Result<Option<NodeId>, Error> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(None);
        };
        if let Some(index) = self.idx(node)? {
            self.remove_child(parent, index)?;
        }
        Ok(Some(parent))
    }

    /// Checks that `child` may be placed under `parent`.
    pub(crate) fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.node(parent)?;
        if let Some(current) = self.node(child)?.parent {
            return Err(TreeError::AlreadyParented {
                node: child,
                parent: current,
            });
        }
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(TreeError::WouldCycle {
                    node: child,
                    parent,
                });
            }
            cursor = self.node(id)?.parent;
        }
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        let data = self.node_mut(child)?;
        data.parent = Some(parent);
        let observer = Observer::Node(parent);
        if !data.observers.contains(&observer) {
            data.observers.push(observer);
        }
        Ok(())
    }

    fn release(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        let data = self.node_mut(child)?;
        data.parent = None;
        data.observers.retain(|o| *o != Observer::Node(parent));
        Ok(())
    }

    /// Adds `observer` to the observers of `node`.
    ///
    /// Fails with [`TreeError::NotUpdateCapable`] if the observer is a dead node
    /// or an unregistered external id. Adding an existing observer is a no-op.
    pub fn add_observer(&mut self, node: NodeId, observer: Observer) -> Result<(), Error> {
        self.node(node)?;
        let capable = match observer {
            Observer::Node(id) => self.is_alive(id),
            Observer::External(id) => self
                .externals()
                .get(id.0 as usize)
                .is_some_and(Option::is_some),
        };
        if !capable {
            return Err(TreeError::NotUpdateCapable(observer).into());
        }
        let observers = &mut self.node_mut(node)?.observers;
        if !observers.contains(&observer) {
            observers.push(observer);
        }
        Ok(())
    }

    /// Removes `observer` from `node`. Returns `false` if it was not observing.
    pub fn remove_observer(&mut self, node: NodeId, observer: Observer) -> Result<bool, Error> {
        let observers = &mut self.node_mut(node)?.observers;
        let before = observers.len();
        observers.retain(|o| *o != observer);
        Ok(observers.len() != before)
    }

    /// The observers of `node`.
    pub fn observers(&self, node: NodeId) -> Result<&[Observer], Error> {
        Ok(&self.node(node)?.observers)
    }

    /// Registers an outside observer, usable with [`add_observer`](Self::add_observer).
    pub fn register_observer(&mut self, observer: impl Update + 'static) -> ObserverId {
        let externals = self.externals_mut();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "more than u32::MAX observers is not supported"
        )]
        let id = ObserverId(externals.len() as u32);
        externals.push(Some(Box::new(observer)));
        id
    }

    /// Unregisters an outside observer and hands it back.
    ///
    /// Nodes still listing it skip it when notifying.
    pub fn unregister_observer(&mut self, id: ObserverId) -> Option<Box<dyn Update>> {
        self.externals_mut().get_mut(id.0 as usize)?.take()
    }
}
