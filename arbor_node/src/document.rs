// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document: node arena, property access, history and notification.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use arbor_memo::MemoCache;
use arbor_undo::{Transaction, UndoStack};

use crate::error::{Error, PropertyError, TreeError};
use crate::id::{ListenerId, NodeId, ObserverId};
use crate::property::{PropertyDescriptor, PropertyKind};
use crate::types::{NodeType, NodeTypeId, TypeRegistry, UpdatePolicy};
use crate::value::Value;

/// The undo log of a [`Document`].
pub type History = UndoStack<Document, Error>;

/// Something that is told when a node changes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Observer {
    /// Another node of the same document; its `update` hook runs.
    Node(NodeId),
    /// An outside collaborator registered with
    /// [`Document::register_observer`].
    External(ObserverId),
}

/// The update-capable contract for outside observers.
pub trait Update {
    /// Called when an observed node changes.
    fn update(&mut self);
}

/// Rendering collaborator.
///
/// The document only decides when to draw: on appearance changes of an
/// `auto_draw` node, when a visible `auto_draw` node is attached to a child
/// slot, and when a derived node is updated while visible and `auto_draw`.
pub trait Renderer {
    /// Recompute whatever is needed to draw `node`.
    fn prepare_to_draw(&mut self, doc: &Document, node: NodeId);
    /// Draw `node`.
    fn draw_on_canvas(&mut self, doc: &Document, node: NodeId);
}

/// Event fired when an undoable property change is applied or reverted.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyChanged {
    /// The node whose property changed.
    pub node: NodeId,
    /// Name of the property.
    pub property: &'static str,
    /// The value now in effect.
    pub value: Value,
}

type Listener = Box<dyn FnMut(&PropertyChanged)>;

pub(crate) struct NodeData {
    pub(crate) ty: NodeTypeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) observers: SmallVec<[Observer; 1]>,
    auto_draw: bool,
    storage: HashMap<&'static str, Value>,
    cache: MemoCache,
}

impl NodeData {
    fn new(ty: NodeTypeId) -> Self {
        Self {
            ty,
            parent: None,
            children: Vec::new(),
            observers: SmallVec::new(),
            auto_draw: false,
            storage: HashMap::new(),
            cache: MemoCache::new(),
        }
    }
}

struct Slot {
    generation: u32,
    node: Option<NodeData>,
}

/// A tree of typed nodes with validated, undoable properties.
///
/// The document owns every node. Nodes are addressed by [`NodeId`] handles;
/// the parent link is a handle, so the tree holds no reference cycles.
///
/// Every fallible operation either succeeds completely or returns an
/// [`Error`] before touching any state.
///
/// # Example
///
/// ```rust
/// use arbor_node::{Document, NodeTypeBuilder, TypeRegistry, Value};
///
/// let mut types = TypeRegistry::new();
/// let arc = types.register(
///     NodeTypeBuilder::new("CircularArc").bounded("angle_of_inflow", 0.0, 180.0, 0),
/// );
/// let mut doc = Document::new(types);
/// let a = doc.create(arc);
///
/// // Out-of-range values are rejected and change nothing.
/// assert!(doc.set(a, "angle_of_inflow", 200).is_err());
/// assert_eq!(doc.get(a, "angle_of_inflow").unwrap(), Value::from(0));
///
/// doc.set(a, "angle_of_inflow", 100).unwrap();
/// assert_eq!(doc.get(a, "angle_of_inflow").unwrap(), Value::from(100));
///
/// assert_eq!(doc.undo().unwrap().as_deref(), Some("angle_of_inflow change"));
/// assert_eq!(doc.get(a, "angle_of_inflow").unwrap(), Value::from(0));
/// ```
pub struct Document {
    types: TypeRegistry,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    externals: Vec<Option<Box<dyn Update>>>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u32,
    history: History,
    renderer: Option<Box<dyn Renderer>>,
    updating: HashSet<NodeId>,
}

impl Document {
    /// Creates an empty document for the given node types, with unbounded history.
    #[must_use]
    pub fn new(types: TypeRegistry) -> Self {
        Self::with_history(types, History::new())
    }

    /// Creates an empty document that keeps at most `limit` undo steps.
    #[must_use]
    pub fn with_history_limit(types: TypeRegistry, limit: usize) -> Self {
        Self::with_history(types, History::with_limit(limit))
    }

    fn with_history(types: TypeRegistry, history: History) -> Self {
        Self {
            types,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            externals: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
            history,
            renderer: None,
            updating: HashSet::new(),
        }
    }

    /// The node types this document knows.
    #[must_use]
    #[inline]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Number of live nodes.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the document holds no nodes.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Creates a parentless node of type `ty` with every property at its default.
    ///
    /// # Panics
    ///
    /// Panics if `ty` was not issued by this document's registry.
    pub fn create(&mut self, ty: NodeTypeId) -> NodeId {
        assert!(
            self.types.get(ty).is_some(),
            "Node type {ty:?} is not registered with this document"
        );
        self.live += 1;
        let data = NodeData::new(ty);
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.node = Some(data);
            return NodeId::new(idx, slot.generation);
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "more than u32::MAX nodes is not supported"
        )]
        let idx = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            node: Some(data),
        });
        NodeId::new(idx, 1)
    }

    /// Creates a node by type name.
    pub fn create_named(&mut self, type_name: &str) -> Result<NodeId, Error> {
        let ty = self
            .types
            .by_name(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.into()))?;
        Ok(self.create(ty))
    }

    /// Returns `true` if `node` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.node(node).is_ok()
    }

    /// Returns the type of `node`.
    pub fn type_of(&self, node: NodeId) -> Result<&NodeType, Error> {
        let ty = self.node(node)?.ty;
        Ok(&self.types[ty])
    }

    /// Human-readable label of `node`, derived from its type name.
    pub fn display_name(&self, node: NodeId) -> Result<String, Error> {
        Ok(self.type_of(node)?.display_name())
    }

    /// Destroys a parentless node and its whole subtree.
    ///
    /// Every handle into the subtree becomes stale. History entries that refer
    /// to removed nodes fail with [`TreeError::StaleNode`] when replayed.
    pub fn remove_node(&mut self, node: NodeId) -> Result<(), Error> {
        if let Some(parent) = self.node(node)?.parent {
            return Err(TreeError::StillAttached { node, parent }.into());
        }
        self.free_subtree(node);
        Ok(())
    }

    pub(crate) fn free_subtree(&mut self, root: NodeId) {
        let mut stack = alloc::vec![root];
        while let Some(id) = stack.pop() {
            let Some(slot) = self.slots.get_mut(id.idx()) else {
                continue;
            };
            if slot.generation != id.generation() {
                continue;
            }
            if let Some(data) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.live -= 1;
                self.free.push(id.raw_idx());
                stack.extend(data.children);
            }
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&NodeData, TreeError> {
        self.slots
            .get(id.idx())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
            .ok_or(TreeError::StaleNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, TreeError> {
        self.slots
            .get_mut(id.idx())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
            .ok_or(TreeError::StaleNode(id))
    }

    fn descriptor(
        &self,
        node: NodeId,
        name: &str,
    ) -> Result<(&'static str, PropertyDescriptor), Error> {
        let ty = self.type_of(node)?;
        let prop = ty.property(name).ok_or_else(|| PropertyError::UnknownProperty {
            class: ty.name(),
            attribute: name.into(),
        })?;
        Ok((ty.name(), prop.clone()))
    }

    fn read(&self, node: NodeId, prop: &PropertyDescriptor) -> Result<Value, Error> {
        let data = self.node(node)?;
        let stored = match prop.kind() {
            PropertyKind::ChildSlot(index) => data.children.get(index).copied().map(Value::Node),
            _ => data.storage.get(prop.name()).cloned(),
        };
        Ok(stored.unwrap_or_else(|| prop.default().clone()))
    }

    /// Reads a property: the stored value, or the declared default.
    ///
    /// For a child slot this is the occupying node, or [`Value::None`] when the
    /// slot is unoccupied.
    pub fn get(&self, node: NodeId, name: &str) -> Result<Value, Error> {
        let (_, prop) = self.descriptor(node, name)?;
        self.read(node, &prop)
    }

    /// Writes a property.
    ///
    /// 1. The value is validated; on failure nothing changes.
    /// 2. Writing the current value is a no-op: no history entry, no event.
    /// 3. Replacing [`Value::None`] only initializes the property: no history
    ///    entry, no event, no broadcast. An unoccupied child slot reads as
    ///    `None`, so the first occupant is placed this way.
    /// 4. Any other write is recorded as one undoable step named
    ///    `"<property> change"` and fires a [`PropertyChanged`] event.
    ///
    /// Appearance properties skip step 3: every change to them is undoable.
    ///
    /// For a child slot, the new occupant must be parentless and must not be
    /// the owner or one of its ancestors, and the slot index may be at most
    /// the current number of children. For a shared property, every child
    /// that declares the same name must accept the value; otherwise nothing
    /// changes.
    pub fn set(&mut self, node: NodeId, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let value = value.into();
        let (class, prop) = self.descriptor(node, name)?;
        if let Err(err) = prop.check(class, &value) {
            #[cfg(feature = "tracing")]
            tracing::trace!(node = %node, property = prop.name(), error = %err, "rejected write");
            return Err(err.into());
        }
        let old = self.read(node, &prop)?;
        if value == old {
            return Ok(());
        }
        self.check_effects(node, &prop, &value)?;

        let first_write = match prop.kind() {
            PropertyKind::Appearance(_) => false,
            _ => old.is_none(),
        };
        if first_write {
            return self.apply(node, &prop, value, false);
        }
        self.record_change(node, prop, old, value)
    }

    /// Validates and applies like [`set`](Self::set), but never records
    /// history or fires events. Used when restoring saved nodes.
    pub(crate) fn initialize(&mut self, node: NodeId, name: &str, value: Value) -> Result<(), Error> {
        let (class, prop) = self.descriptor(node, name)?;
        prop.check(class, &value)?;
        if value == self.read(node, &prop)? {
            return Ok(());
        }
        self.check_effects(node, &prop, &value)?;
        self.apply(node, &prop, value, false)
    }

    /// Checks everything writing `value` to `prop` would touch beyond the
    /// owner itself: the slot and the new occupant, or the shared fan-out.
    fn check_effects(
        &self,
        node: NodeId,
        prop: &PropertyDescriptor,
        value: &Value,
    ) -> Result<(), Error> {
        match prop.kind() {
            PropertyKind::ChildSlot(index) => self.check_slot(node, prop, index, value),
            PropertyKind::Shared(_) => self.check_fan_out(node, prop.name(), value),
            PropertyKind::Plain(_) | PropertyKind::Appearance(_) => Ok(()),
        }
    }

    /// Checks that every node the shared value `name` would be pushed into
    /// below `node` accepts `value`.
    fn check_fan_out(&self, node: NodeId, name: &str, value: &Value) -> Result<(), Error> {
        for &child in &self.node(node)?.children {
            let ty = self.type_of(child)?;
            let Some(prop) = ty.property(name).filter(|p| receives_shared(p)) else {
                continue;
            };
            prop.check(ty.name(), value)?;
            if let PropertyKind::Shared(_) = prop.kind() {
                self.check_fan_out(child, name, value)?;
            }
        }
        Ok(())
    }

    /// Properties cannot be removed; this always fails.
    pub fn delete(&mut self, node: NodeId, name: &str) -> Result<(), Error> {
        let (class, prop) = self.descriptor(node, name)?;
        Err(PropertyError::NotDeletable {
            class,
            attribute: prop.name(),
        }
        .into())
    }

    fn check_slot(
        &self,
        owner: NodeId,
        prop: &PropertyDescriptor,
        index: usize,
        value: &Value,
    ) -> Result<(), Error> {
        if let Some(child) = value.as_node() {
            self.check_attachable(owner, child)?;
        }
        let len = self.node(owner)?.children.len();
        if index > len {
            return Err(TreeError::SlotUnreachable {
                slot: prop.name(),
                index,
                len,
            }
            .into());
        }
        if let Some(child) = value.as_node() {
            let ty = self.type_of(child)?;
            for shared in ty.shared_properties() {
                let Some(inherited) = self.inherited(owner, shared.name())? else {
                    continue;
                };
                shared.check(ty.name(), &inherited)?;
                self.check_fan_out(child, shared.name(), &inherited)?;
            }
        }
        Ok(())
    }

    /// The owner's value of `name` as handed to a newly slotted child, if the
    /// owner has a property that can be shared under that name.
    fn inherited(&self, owner: NodeId, name: &str) -> Result<Option<Value>, Error> {
        match self.type_of(owner)?.property(name) {
            Some(source) if receives_shared(source) => Ok(Some(self.read(owner, source)?)),
            _ => Ok(None),
        }
    }

    fn record_change(
        &mut self,
        node: NodeId,
        prop: PropertyDescriptor,
        old: Value,
        new: Value,
    ) -> Result<(), Error> {
        let name = format!("{} change", prop.name());
        let redo_prop = prop.clone();
        let (redo_old, redo_new) = (old.clone(), new.clone());
        let tx = Transaction::new(
            name,
            move |doc: &mut Self| doc.change(node, &redo_prop, &redo_old, &redo_new),
            move |doc: &mut Self| doc.change(node, &prop, &new, &old),
        );
        tx.redo(self)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(node = %node, step = tx.name(), "recorded change");
        self.history.commit(tx);
        Ok(())
    }

    /// One half of a recorded change: moves `prop` from `from` to `to`.
    fn change(
        &mut self,
        node: NodeId,
        prop: &PropertyDescriptor,
        from: &Value,
        to: &Value,
    ) -> Result<(), Error> {
        self.check_effects(node, prop, to)?;
        if let PropertyKind::ChildSlot(_) = prop.kind() {
            if let (Some(shown), Some(hidden)) = (to.as_node(), from.as_node()) {
                let visible = self.is_visible(hidden)?;
                self.set_visible(shown, visible)?;
                self.set_visible(hidden, false)?;
            }
        }
        self.apply(node, prop, to.clone(), true)?;
        self.emit(&PropertyChanged {
            node,
            property: prop.name(),
            value: to.clone(),
        });
        Ok(())
    }

    /// Applies an already validated value. Never records history.
    fn apply(
        &mut self,
        node: NodeId,
        prop: &PropertyDescriptor,
        value: Value,
        broadcast: bool,
    ) -> Result<(), Error> {
        match prop.kind() {
            PropertyKind::Plain(_) => {
                self.store(node, prop.name(), value)?;
                self.update(node, broadcast)
            }
            PropertyKind::Appearance(_) => {
                self.store(node, prop.name(), value)?;
                if self.node(node)?.auto_draw {
                    self.redraw(node);
                }
                Ok(())
            }
            PropertyKind::Shared(_) => {
                let children = self.node(node)?.children.clone();
                for child in children {
                    let Some(child_prop) = self
                        .type_of(child)?
                        .property(prop.name())
                        .filter(|p| receives_shared(p))
                        .cloned()
                    else {
                        continue;
                    };
                    self.apply(child, &child_prop, value.clone(), false)?;
                }
                self.store(node, prop.name(), value)?;
                self.update(node, broadcast)
            }
            PropertyKind::ChildSlot(index) => {
                let Some(child) = value.as_node() else {
                    let class = self.type_of(node)?.name();
                    return prop.check(class, &value).map_err(Error::from);
                };
                self.inherit_shared(node, child)?;
                if self.is_visible(child)? && self.node(child)?.auto_draw {
                    self.redraw(child);
                }
                let len = self.node(node)?.children.len();
                if index < len {
                    self.replace_child(node, index, child)?;
                } else {
                    self.push_child(node, child)?;
                }
                self.update(node, broadcast)
            }
        }
    }

    /// Copies the owner's values of every shared property of `child`'s type.
    fn inherit_shared(&mut self, owner: NodeId, child: NodeId) -> Result<(), Error> {
        let shared: Vec<PropertyDescriptor> =
            self.type_of(child)?.shared_properties().cloned().collect();
        for prop in shared {
            if let Some(value) = self.inherited(owner, prop.name())? {
                self.apply(child, &prop, value, false)?;
            }
        }
        Ok(())
    }

    fn store(&mut self, node: NodeId, name: &'static str, value: Value) -> Result<(), Error> {
        self.node_mut(node)?.storage.insert(name, value);
        Ok(())
    }

    fn is_visible(&self, node: NodeId) -> Result<bool, Error> {
        let Some(prop) = self.type_of(node)?.property("visible") else {
            return Ok(false);
        };
        Ok(self.read(node, prop)?.as_bool().unwrap_or(false))
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) -> Result<(), Error> {
        let Some(prop) = self.type_of(node)?.property("visible").cloned() else {
            return Ok(());
        };
        self.apply(node, &prop, Value::Bool(visible), false)
    }

    fn emit(&mut self, event: &PropertyChanged) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    fn redraw(&mut self, node: NodeId) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.prepare_to_draw(self, node);
            renderer.draw_on_canvas(self, node);
            self.renderer = Some(renderer);
        }
    }

    /// Reverts the most recent change.
    ///
    /// Returns the step name, or `None` when there is nothing to undo. On
    /// failure the step stays undoable.
    pub fn undo(&mut self) -> Result<Option<String>, Error> {
        let Some(tx) = self.history.take_undo() else {
            return Ok(None);
        };
        if let Err(err) = tx.undo(self) {
            self.history.abort_undo(tx);
            return Err(err);
        }
        let name = String::from(tx.name());
        #[cfg(feature = "tracing")]
        tracing::debug!(step = %name, "undo");
        self.history.finish_undo(tx);
        Ok(Some(name))
    }

    /// Re-applies the most recently undone change.
    ///
    /// Returns the step name, or `None` when there is nothing to redo. On
    /// failure the step stays redoable.
    pub fn redo(&mut self) -> Result<Option<String>, Error> {
        let Some(tx) = self.history.take_redo() else {
            return Ok(None);
        };
        if let Err(err) = tx.redo(self) {
            self.history.abort_redo(tx);
            return Err(err);
        }
        let name = String::from(tx.name());
        #[cfg(feature = "tracing")]
        tracing::debug!(step = %name, "redo");
        self.history.finish_redo(tx);
        Ok(Some(name))
    }

    /// Returns `true` if there is a change to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns `true` if there is a change to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drops all undo and redo history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Read-only view of the undo log.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns the cached result of `compute` for `node` under `key`,
    /// computing it on a miss.
    ///
    /// Results live until the node's next update drops the whole cache.
    pub fn memoized<T, F>(&mut self, node: NodeId, key: &'static str, compute: F) -> Result<Rc<T>, Error>
    where
        T: 'static,
        F: FnOnce(&Self) -> T,
    {
        if let Some(hit) = self.node(node)?.cache.get::<T>(key) {
            return Ok(hit);
        }
        let value = compute(self);
        Ok(self.node_mut(node)?.cache.insert(key, value))
    }

    /// The memo cache of `node`.
    pub fn cache(&self, node: NodeId) -> Result<&MemoCache, Error> {
        Ok(&self.node(node)?.cache)
    }

    /// Runs the `update` hook of `node`.
    ///
    /// For [`UpdatePolicy::Derived`] types this drops the memo cache, redraws
    /// the node if it is visible and `auto_draw`, and, when `broadcast` is set,
    /// notifies its observers. [`UpdatePolicy::Inert`] types do nothing.
    pub fn update(&mut self, node: NodeId, broadcast: bool) -> Result<(), Error> {
        let ty = self.node(node)?.ty;
        if self.types[ty].update_policy() == UpdatePolicy::Inert {
            return Ok(());
        }
        let data = self.node_mut(node)?;
        if data.cache.invalidate() {
            #[cfg(feature = "tracing")]
            tracing::trace!(node = %node, "cache invalidated");
        }
        let auto_draw = data.auto_draw;
        if auto_draw && self.is_visible(node)? {
            self.redraw(node);
        }
        if broadcast {
            self.notify(node)?;
        }
        Ok(())
    }

    /// Tells every observer of `node` that it changed.
    ///
    /// Observing nodes run their `update` hook with `broadcast` set, so the
    /// change travels up the tree. Observer order is unspecified. A node whose
    /// notification is already in progress is not notified again, so cyclic
    /// observer wiring terminates.
    pub fn notify(&mut self, node: NodeId) -> Result<(), Error> {
        let observers = self.node(node)?.observers.clone();
        if !self.updating.insert(node) {
            return Ok(());
        }
        let mut result = Ok(());
        for observer in observers {
            match observer {
                Observer::Node(id) => {
                    if self.is_alive(id) && !self.updating.contains(&id) {
                        result = self.update(id, true);
                    }
                }
                Observer::External(id) => {
                    if let Some(Some(external)) = self.externals.get_mut(id.0 as usize) {
                        external.update();
                    }
                }
            }
            if result.is_err() {
                break;
            }
        }
        self.updating.remove(&node);
        result
    }

    /// Registers a listener for [`PropertyChanged`] events.
    ///
    /// Events fire when an undoable change is applied, undone or redone; never
    /// for writes that replace [`Value::None`] or values pushed down to children.
    pub fn subscribe(&mut self, listener: impl FnMut(&PropertyChanged) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Installs the rendering collaborator, returning the previous one.
    pub fn set_renderer(&mut self, renderer: impl Renderer + 'static) -> Option<Box<dyn Renderer>> {
        self.renderer.replace(Box::new(renderer))
    }

    /// Removes the rendering collaborator.
    pub fn take_renderer(&mut self) -> Option<Box<dyn Renderer>> {
        self.renderer.take()
    }

    /// Sets whether `node` is redrawn automatically. Off for new nodes.
    pub fn set_auto_draw(&mut self, node: NodeId, auto_draw: bool) -> Result<(), Error> {
        self.node_mut(node)?.auto_draw = auto_draw;
        Ok(())
    }

    /// Returns whether `node` is redrawn automatically.
    pub fn auto_draw(&self, node: NodeId) -> Result<bool, Error> {
        Ok(self.node(node)?.auto_draw)
    }

    pub(crate) fn externals_mut(&mut self) -> &mut Vec<Option<Box<dyn Update>>> {
        &mut self.externals
    }

    pub(crate) fn externals(&self) -> &[Option<Box<dyn Update>>] {
        &self.externals
    }
}

/// Child slots hold positions, not values, so they never take a shared value.
fn receives_shared(prop: &PropertyDescriptor) -> bool {
    !matches!(prop.kind(), PropertyKind::ChildSlot(_))
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("types", &self.types)
            .field("nodes", &self.live)
            .field("history", &self.history)
            .field("listeners", &self.listeners.len())
            .field("externals", &self.externals.iter().filter(|e| e.is_some()).count())
            .field("renderer", &self.renderer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Rule;
    use crate::types::NodeTypeBuilder;
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    struct Blade {
        doc: Document,
        profile: NodeTypeId,
        arc: NodeTypeId,
    }

    fn blade() -> Blade {
        let mut types = TypeRegistry::new();
        let camber_line = types.register(
            NodeTypeBuilder::new("CamberLine")
                .update_policy(UpdatePolicy::Derived)
                .shared_bounded("sample_rate", 0.0, 9999.0, 200)
                .shared("distribution", "chebyshev", Rule::Any),
        );
        let arc = types.register(
            NodeTypeBuilder::extends("CircularArc", &types[camber_line])
                .bounded("angle_of_inflow", 0.0, 180.0, 0),
        );
        let profile = types.register(
            NodeTypeBuilder::new("Profile")
                .update_policy(UpdatePolicy::Derived)
                .shared_bounded("sample_rate", 0.0, 9999.0, 200)
                .shared("distribution", "chebyshev", Rule::Any)
                .child_slot("camber_line"),
        );
        Blade {
            doc: Document::new(types),
            profile,
            arc,
        }
    }

    #[test]
    fn handles_go_stale_on_removal() {
        let Blade { mut doc, arc, .. } = blade();
        let a = doc.create(arc);
        assert!(doc.is_alive(a));
        assert_eq!(doc.len(), 1);
        doc.remove_node(a).unwrap();
        assert!(!doc.is_alive(a));
        assert!(doc.is_empty());
        assert_eq!(doc.get(a, "name"), Err(TreeError::StaleNode(a).into()));

        let b = doc.create(arc);
        assert_ne!(a, b);
        assert_eq!(b.generation(), a.generation() + 1);
    }

    #[test]
    fn changes_from_a_default_are_recorded() {
        let Blade { mut doc, arc, .. } = blade();
        let a = doc.create(arc);
        assert_eq!(doc.get(a, "angle_of_inflow").unwrap(), Value::from(0));
        doc.set(a, "angle_of_inflow", 45).unwrap();
        assert_eq!(doc.history().undo_name(), Some("angle_of_inflow change"));
        doc.set(a, "name", "hub").unwrap();
        assert_eq!(doc.history().undo_len(), 2);

        doc.undo().unwrap();
        doc.undo().unwrap();
        assert_eq!(doc.get(a, "angle_of_inflow").unwrap(), Value::from(0));
        assert_eq!(doc.get(a, "name").unwrap(), Value::from(""));
    }

    #[test]
    fn replacing_none_is_not_recorded() {
        let mut types = TypeRegistry::new();
        let ty = types.register(NodeTypeBuilder::new("Tagged").any("tag", Value::None));
        let mut doc = Document::new(types);
        let n = doc.create(ty);
        doc.set(n, "tag", 7).unwrap();
        assert!(!doc.can_undo());
        doc.set(n, "tag", 8).unwrap();
        assert_eq!(doc.history().undo_name(), Some("tag change"));
    }

    #[test]
    fn unknown_and_undeletable_properties() {
        let Blade { mut doc, arc, .. } = blade();
        let a = doc.create(arc);
        assert!(matches!(
            doc.get(a, "chord"),
            Err(Error::Property(PropertyError::UnknownProperty { class: "CircularArc", .. }))
        ));
        assert_eq!(
            doc.delete(a, "angle_of_inflow"),
            Err(PropertyError::NotDeletable {
                class: "CircularArc",
                attribute: "angle_of_inflow",
            }
            .into())
        );
    }

    #[test]
    fn appearance_changes_are_always_undoable() {
        let Blade { mut doc, arc, .. } = blade();
        let a = doc.create(arc);
        doc.set(a, "visible", false).unwrap();
        assert!(doc.can_undo());
        doc.undo().unwrap();
        assert_eq!(doc.get(a, "visible").unwrap(), Value::from(true));
    }

    #[test]
    fn update_on_inert_node_keeps_cache() {
        let mut types = TypeRegistry::new();
        let plain = types.register(NodeTypeBuilder::new("Plain").numeric("x", 0));
        let mut doc = Document::new(types);
        let n = doc.create(plain);
        doc.memoized(n, "x2", |_| 2_i32).unwrap();
        doc.update(n, true).unwrap();
        assert!(doc.cache(n).unwrap().contains("x2"));
    }

    #[test]
    fn memoized_is_dropped_by_update() {
        let Blade { mut doc, arc, .. } = blade();
        let a = doc.create(arc);
        let first = doc.memoized(a, "points", |_| vec![0.0_f64, 1.0]).unwrap();
        let again = doc.memoized(a, "points", |_| vec![]).unwrap();
        assert!(Rc::ptr_eq(&first, &again));

        doc.update(a, false).unwrap();
        let fresh = doc.memoized(a, "points", |_| vec![0.5_f64]).unwrap();
        assert!(!Rc::ptr_eq(&first, &fresh));
        assert_eq!(*fresh, vec![0.5]);
    }

    #[test]
    fn memoized_sees_current_values() {
        let Blade { mut doc, arc, .. } = blade();
        let a = doc.create(arc);
        doc.set(a, "angle_of_inflow", 30).unwrap();
        let angle = doc
            .memoized(a, "angle", |doc| doc.get(a, "angle_of_inflow").unwrap())
            .unwrap();
        assert_eq!(*angle, Value::from(30));
    }

    #[test]
    fn events_fire_for_recorded_changes_only() {
        let Blade {
            mut doc,
            profile,
            arc,
        } = blade();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let id = doc.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        let a = doc.create(arc);
        doc.set(a, "angle_of_inflow", 10).unwrap();
        doc.set(a, "angle_of_inflow", 20).unwrap();
        doc.undo().unwrap();
        let values: Vec<_> = events.borrow().iter().map(|e| e.value.clone()).collect();
        assert_eq!(values, vec![Value::from(10), Value::from(20), Value::from(10)]);
        assert!(events.borrow().iter().all(|e| e.node == a && e.property == "angle_of_inflow"));

        let p = doc.create(profile);
        let c = doc.create(arc);
        doc.set(p, "camber_line", c).unwrap();
        assert_eq!(events.borrow().len(), 3, "filling an empty slot fires nothing");

        assert!(doc.unsubscribe(id));
        assert!(!doc.unsubscribe(id));
        doc.redo().unwrap();
        assert_eq!(events.borrow().len(), 3);
    }

    struct Recorder(Rc<RefCell<Vec<NodeId>>>);

    impl Renderer for Recorder {
        fn prepare_to_draw(&mut self, doc: &Document, node: NodeId) {
            assert!(doc.is_alive(node), "drawing a dead node");
        }

        fn draw_on_canvas(&mut self, _doc: &Document, node: NodeId) {
            self.0.borrow_mut().push(node);
        }
    }

    #[test]
    fn renderer_runs_only_with_auto_draw() {
        let Blade { mut doc, arc, .. } = blade();
        let drawn = Rc::new(RefCell::new(Vec::new()));
        assert!(doc.set_renderer(Recorder(Rc::clone(&drawn))).is_none());

        let a = doc.create(arc);
        doc.set(a, "angle_of_inflow", 10).unwrap();
        doc.set(a, "angle_of_inflow", 20).unwrap();
        assert!(drawn.borrow().is_empty());

        doc.set_auto_draw(a, true).unwrap();
        assert!(doc.auto_draw(a).unwrap());
        doc.set(a, "angle_of_inflow", 30).unwrap();
        assert_eq!(*drawn.borrow(), vec![a]);

        doc.set(a, "visible", false).unwrap();
        assert_eq!(drawn.borrow().len(), 2);
        doc.set(a, "angle_of_inflow", 40).unwrap();
        assert_eq!(drawn.borrow().len(), 2, "hidden derived nodes are not redrawn");
    }

    struct Counter(Rc<Cell<u32>>);

    impl Update for Counter {
        fn update(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn changes_bubble_to_parent_observers() {
        let Blade {
            mut doc,
            profile,
            arc,
        } = blade();
        let p = doc.create(profile);
        let a = doc.create(arc);

        let hits = Rc::new(Cell::new(0));
        let ext = doc.register_observer(Counter(Rc::clone(&hits)));
        doc.add_observer(p, Observer::External(ext)).unwrap();

        doc.set(p, "camber_line", a).unwrap();
        assert_eq!(hits.get(), 0, "filling an empty slot does not broadcast");
        doc.memoized(p, "outline", |_| 1_u8).unwrap();
        doc.set(a, "angle_of_inflow", 15).unwrap();
        assert_eq!(hits.get(), 1);
        assert!(doc.cache(p).unwrap().is_empty());
    }

    #[test]
    fn cyclic_observers_terminate() {
        let Blade { mut doc, arc, .. } = blade();
        let a = doc.create(arc);
        let b = doc.create(arc);
        doc.add_observer(a, Observer::Node(b)).unwrap();
        doc.add_observer(b, Observer::Node(a)).unwrap();
        doc.notify(a).unwrap();
        doc.update(b, true).unwrap();
    }

    #[test]
    fn history_limit_evicts_oldest() {
        let mut types = TypeRegistry::new();
        let ty = types.register(NodeTypeBuilder::new("Counter").numeric("n", 0));
        let mut doc = Document::with_history_limit(types, 2);
        let n = doc.create(ty);
        for v in 1..=5 {
            doc.set(n, "n", v).unwrap();
        }
        assert_eq!(doc.history().undo_len(), 2);
        doc.undo().unwrap();
        doc.undo().unwrap();
        assert_eq!(doc.undo().unwrap(), None);
        assert_eq!(doc.get(n, "n").unwrap(), Value::from(3));
    }

    #[test]
    fn rejected_fan_out_changes_no_child() {
        let mut types = TypeRegistry::new();
        let wide = types.register(NodeTypeBuilder::new("Wide").shared_numeric("rate", 1));
        let narrow = types.register(
            NodeTypeBuilder::new("Narrow").shared_bounded("rate", 0.0, 10.0, 1),
        );
        let slotted = types.register(NodeTypeBuilder::new("Slotted").child_slot("rate"));
        let holder = types.register(
            NodeTypeBuilder::new("Holder")
                .shared_numeric("rate", 1)
                .child_slot("first")
                .child_slot("second")
                .child_slot("third"),
        );
        let mut doc = Document::new(types);
        let h = doc.create(holder);
        let w = doc.create(wide);
        let s = doc.create(slotted);
        let n = doc.create(narrow);
        doc.set(h, "first", w).unwrap();
        doc.set(h, "second", s).unwrap();
        doc.set(h, "third", n).unwrap();

        doc.set(h, "rate", 5).unwrap();
        assert_eq!(doc.get(w, "rate").unwrap(), Value::from(5));
        assert_eq!(doc.get(n, "rate").unwrap(), Value::from(5));
        assert_eq!(doc.get(s, "rate").unwrap(), Value::None);
        let depth = doc.history().undo_len();

        assert!(matches!(
            doc.set(h, "rate", 50),
            Err(Error::Property(PropertyError::AboveUpperBound { class: "Narrow", .. }))
        ));
        assert_eq!(doc.get(h, "rate").unwrap(), Value::from(5));
        assert_eq!(doc.get(w, "rate").unwrap(), Value::from(5));
        assert_eq!(doc.get(n, "rate").unwrap(), Value::from(5));
        assert_eq!(doc.history().undo_len(), depth);
    }

    #[test]
    fn slotting_a_child_that_rejects_shared_values_changes_nothing() {
        let mut types = TypeRegistry::new();
        let narrow = types.register(
            NodeTypeBuilder::new("Narrow").shared_bounded("rate", 0.0, 10.0, 1),
        );
        let holder = types.register(
            NodeTypeBuilder::new("Holder")
                .shared_numeric("rate", 1)
                .child_slot("item"),
        );
        let mut doc = Document::new(types);
        let h = doc.create(holder);
        let n = doc.create(narrow);
        doc.set(h, "rate", 50).unwrap();

        assert!(doc.set(h, "item", n).is_err());
        assert_eq!(doc.get(h, "item").unwrap(), Value::None);
        assert_eq!(doc.parent(n).unwrap(), None);
        assert_eq!(doc.get(n, "rate").unwrap(), Value::from(1));
    }

    #[test]
    fn visibility_of_a_removed_node_is_an_error() {
        let Blade { mut doc, arc, .. } = blade();
        let a = doc.create(arc);
        assert_eq!(doc.is_visible(a), Ok(true));
        doc.remove_node(a).unwrap();
        assert_eq!(doc.is_visible(a), Err(TreeError::StaleNode(a).into()));
    }

    #[test]
    fn create_named_and_display_name() {
        let Blade { mut doc, .. } = blade();
        let a = doc.create_named("CircularArc").unwrap();
        assert_eq!(doc.display_name(a).unwrap(), "Circular Arc");
        assert_eq!(
            doc.create_named("Ellipse"),
            Err(Error::UnknownType("Ellipse".into()))
        );
    }
}
