// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node type declaration and registration.
//!
//! Node types are declared once at startup with a [`NodeTypeBuilder`] and
//! registered in a [`TypeRegistry`]. Registration produces a static table of
//! property descriptors that generic get/set code consumes; nothing is
//! discovered by reflection at run time.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Index;
use hashbrown::{HashMap, HashSet};

use crate::display::display_name;
use crate::property::{PropertyDescriptor, PropertyKind, Rule};
use crate::value::Value;

/// Identifier of a registered node type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeTypeId(u16);

impl NodeTypeId {
    /// Returns the registration index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

/// What a node's `update` hook does.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdatePolicy {
    /// Nothing. Changes stop here.
    #[default]
    Inert,
    /// Drop the memo cache, redraw if visible and `auto_draw`, and notify
    /// observers when broadcasting.
    Derived,
}

/// A registered node type: its name, property table and child slot table.
pub struct NodeType {
    name: &'static str,
    properties: Vec<PropertyDescriptor>,
    by_name: HashMap<&'static str, usize>,
    slot_count: usize,
    update_policy: UpdatePolicy,
}

impl NodeType {
    /// The type name, e.g. `"CircularArc"`.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Human-readable label derived from the type name, e.g. `"Circular Arc"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(self.name)
    }

    /// All properties, inherited ones first, in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.by_name.get(name).map(|&i| &self.properties[i])
    }

    /// Child index bound to a slot property, if `name` is one.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.property(name).and_then(|p| p.kind().slot())
    }

    /// Number of child slots declared on this type and its bases.
    #[must_use]
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Properties whose writes fan out to children.
    pub fn shared_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.kind().is_shared())
    }

    /// What the `update` hook does for nodes of this type.
    #[must_use]
    #[inline]
    pub fn update_policy(&self) -> UpdatePolicy {
        self.update_policy
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeType")
            .field("name", &self.name)
            .field(
                "properties",
                &self.properties.iter().map(PropertyDescriptor::name).collect::<Vec<_>>(),
            )
            .field("slot_count", &self.slot_count)
            .field("update_policy", &self.update_policy)
            .finish()
    }
}

/// Builder for [`NodeType`].
///
/// Every type starts with the root properties every node carries:
///
/// - `name`: text, default `""`.
/// - `visible`: appearance flag, default `true`.
///
/// [`extends`](Self::extends) copies a base type's table (properties, slot
/// indices, update policy). Re-declaring an inherited name overrides it;
/// declaring the same name twice in one builder panics.
///
/// # Example
///
/// ```rust
/// use arbor_node::{NodeTypeBuilder, Rule, TypeRegistry, UpdatePolicy};
///
/// let mut types = TypeRegistry::new();
/// let camber_line = types.register(
///     NodeTypeBuilder::new("CamberLine")
///         .update_policy(UpdatePolicy::Derived)
///         .shared("sample_rate", 200, Rule::Bounded { lb: 0.0, ub: 9999.0 }),
/// );
/// let arc = types.register(
///     NodeTypeBuilder::extends("CircularArc", &types[camber_line])
///         .bounded("angle_of_inflow", 0.0, 180.0, 0),
/// );
///
/// let arc = &types[arc];
/// assert!(arc.property("sample_rate").is_some());
/// assert!(arc.property("angle_of_inflow").is_some());
/// assert_eq!(arc.display_name(), "Circular Arc");
/// ```
pub struct NodeTypeBuilder {
    name: &'static str,
    properties: Vec<PropertyDescriptor>,
    declared: HashSet<&'static str>,
    slot_count: usize,
    update_policy: UpdatePolicy,
}

impl NodeTypeBuilder {
    /// Starts a type with only the root properties.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            properties: alloc::vec![
                PropertyDescriptor::new("name", "", PropertyKind::Plain(Rule::Text)),
                PropertyDescriptor::new("visible", true, PropertyKind::Appearance(Rule::Flag)),
            ],
            declared: HashSet::new(),
            slot_count: 0,
            update_policy: UpdatePolicy::Inert,
        }
    }

    /// Starts a type that inherits everything declared on `base`.
    #[must_use]
    pub fn extends(name: &'static str, base: &NodeType) -> Self {
        Self {
            name,
            properties: base.properties.clone(),
            declared: HashSet::new(),
            slot_count: base.slot_count,
            update_policy: base.update_policy,
        }
    }

    /// Declares a property.
    ///
    /// # Panics
    ///
    /// Panics if `name` was already declared on this builder.
    #[must_use]
    pub fn property(
        mut self,
        name: &'static str,
        default: impl Into<Value>,
        kind: PropertyKind,
    ) -> Self {
        assert!(
            self.declared.insert(name),
            "Property '{name}' is already declared on '{}'",
            self.name
        );
        let descriptor = PropertyDescriptor::new(name, default, kind);
        match self.properties.iter_mut().find(|p| p.name() == name) {
            Some(inherited) => *inherited = descriptor,
            None => self.properties.push(descriptor),
        }
        self
    }

    /// Declares a property that accepts anything.
    #[must_use]
    pub fn any(self, name: &'static str, default: impl Into<Value>) -> Self {
        self.property(name, default, PropertyKind::Plain(Rule::Any))
    }

    /// Declares an int/float property.
    #[must_use]
    pub fn numeric(self, name: &'static str, default: impl Into<Value>) -> Self {
        self.property(name, default, PropertyKind::Plain(Rule::Numeric))
    }

    /// Declares a number constrained to `lb..=ub`.
    #[must_use]
    pub fn bounded(self, name: &'static str, lb: f64, ub: f64, default: impl Into<Value>) -> Self {
        self.property(name, default, PropertyKind::Plain(Rule::Bounded { lb, ub }))
    }

    /// Declares a text property.
    #[must_use]
    pub fn text(self, name: &'static str, default: impl Into<String>) -> Self {
        self.property(name, default.into(), PropertyKind::Plain(Rule::Text))
    }

    /// Declares a boolean property.
    #[must_use]
    pub fn flag(self, name: &'static str, default: bool) -> Self {
        self.property(name, default, PropertyKind::Plain(Rule::Flag))
    }

    /// Declares a property whose writes fan out to children.
    #[must_use]
    pub fn shared(self, name: &'static str, default: impl Into<Value>, rule: Rule) -> Self {
        self.property(name, default, PropertyKind::Shared(rule))
    }

    /// Shorthand for a shared number constrained to `lb..=ub`.
    #[must_use]
    pub fn shared_bounded(
        self,
        name: &'static str,
        lb: f64,
        ub: f64,
        default: impl Into<Value>,
    ) -> Self {
        self.shared(name, default, Rule::Bounded { lb, ub })
    }

    /// Shorthand for a shared int/float.
    #[must_use]
    pub fn shared_numeric(self, name: &'static str, default: impl Into<Value>) -> Self {
        self.shared(name, default, Rule::Numeric)
    }

    /// Declares a drawing attribute.
    #[must_use]
    pub fn appearance(self, name: &'static str, default: impl Into<Value>, rule: Rule) -> Self {
        self.property(name, default, PropertyKind::Appearance(rule))
    }

    /// Binds `name` to the next free position in the children sequence.
    ///
    /// Overriding an inherited slot keeps its index.
    #[must_use]
    pub fn child_slot(mut self, name: &'static str) -> Self {
        let index = match self.properties.iter().find(|p| p.name() == name) {
            Some(inherited) => inherited.kind().slot(),
            None => None,
        };
        let index = index.unwrap_or_else(|| {
            self.slot_count += 1;
            self.slot_count - 1
        });
        self.property(name, Value::None, PropertyKind::ChildSlot(index))
    }

    /// Sets what the `update` hook does.
    #[must_use]
    pub fn update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    /// Finishes the type.
    #[must_use]
    pub fn build(self) -> NodeType {
        let by_name = self
            .properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name(), i))
            .collect();
        NodeType {
            name: self.name,
            properties: self.properties,
            by_name,
            slot_count: self.slot_count,
            update_policy: self.update_policy,
        }
    }
}

impl fmt::Debug for NodeTypeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTypeBuilder")
            .field("name", &self.name)
            .field("property_count", &self.properties.len())
            .field("slot_count", &self.slot_count)
            .finish_non_exhaustive()
    }
}

/// All node types known to a [`Document`](crate::Document).
///
/// Indexing with a [`NodeTypeId`] from another registry panics, like slice
/// indexing; use [`get`](Self::get) for a checked lookup.
#[derive(Default)]
pub struct TypeRegistry {
    types: Vec<NodeType>,
    by_name: HashMap<&'static str, NodeTypeId>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and registers a type.
    ///
    /// # Panics
    ///
    /// Panics if a type with the same name is already registered,
    /// or if more than 65,535 types are registered.
    pub fn register(&mut self, builder: NodeTypeBuilder) -> NodeTypeId {
        let ty = builder.build();
        assert!(
            !self.by_name.contains_key(ty.name),
            "Node type '{}' is already registered",
            ty.name
        );
        assert!(
            self.types.len() < u16::MAX as usize,
            "Too many node types registered (max {})",
            u16::MAX
        );

        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = NodeTypeId(self.types.len() as u16);
        self.by_name.insert(ty.name, id);
        self.types.push(ty);
        id
    }

    /// Number of registered types.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Checked lookup by id.
    #[must_use]
    pub fn get(&self, id: NodeTypeId) -> Option<&NodeType> {
        self.types.get(usize::from(id.0))
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<NodeTypeId> {
        self.by_name.get(name).copied()
    }

    /// Iterates all types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeTypeId, &NodeType)> {
        self.types.iter().enumerate().map(|(i, ty)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len < u16::MAX")]
            let id = NodeTypeId(i as u16);
            (id, ty)
        })
    }
}

impl Index<NodeTypeId> for TypeRegistry {
    type Output = NodeType;

    fn index(&self, id: NodeTypeId) -> &NodeType {
        &self.types[usize::from(id.0)]
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("count", &self.types.len())
            .field("types", &self.types.iter().map(NodeType::name).collect::<Vec<_>>())
            .finish()
    }
}
