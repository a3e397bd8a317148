// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Every error is raised before any state is touched: a caller that receives
//! one may treat the document as unchanged.

use alloc::string::String;
use core::fmt;

use crate::document::Observer;
use crate::id::NodeId;

/// A rejected property access.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyError {
    /// The value has the wrong kind for the property.
    WrongType {
        /// Name of the node type.
        class: &'static str,
        /// Name of the property.
        attribute: &'static str,
        /// What the property accepts, e.g. `"int/float"`.
        expected: &'static str,
        /// Kind of the rejected value, e.g. `"str"`.
        got: &'static str,
    },
    /// A bounded number fell below its lower bound.
    BelowLowerBound {
        /// Name of the node type.
        class: &'static str,
        /// Name of the property.
        attribute: &'static str,
        /// The violated bound.
        bound: f64,
    },
    /// A bounded number rose above its upper bound.
    AboveUpperBound {
        /// Name of the node type.
        class: &'static str,
        /// Name of the property.
        attribute: &'static str,
        /// The violated bound.
        bound: f64,
    },
    /// The node type declares no property with this name.
    UnknownProperty {
        /// Name of the node type.
        class: &'static str,
        /// The requested name.
        attribute: String,
    },
    /// Properties can be overwritten but never removed.
    NotDeletable {
        /// Name of the node type.
        class: &'static str,
        /// Name of the property.
        attribute: &'static str,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongType {
                class,
                attribute,
                expected,
                got,
            } => write!(f, "{class}.{attribute} accepts only {expected} (got {got})"),
            Self::BelowLowerBound {
                class,
                attribute,
                bound,
            } => write!(f, "{class}.{attribute} is below the lower bound ({bound})"),
            Self::AboveUpperBound {
                class,
                attribute,
                bound,
            } => write!(f, "{class}.{attribute} is above the upper bound ({bound})"),
            Self::UnknownProperty { class, attribute } => {
                write!(f, "'{class}' has no property '{attribute}'")
            }
            Self::NotDeletable { class, attribute } => {
                write!(f, "can't delete {class}.{attribute}")
            }
        }
    }
}

impl core::error::Error for PropertyError {}

/// A rejected tree or observer operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The node already has a parent; detach it first.
    AlreadyParented {
        /// The node being attached.
        node: NodeId,
        /// Its current parent.
        parent: NodeId,
    },
    /// Attaching would make a node its own ancestor.
    WouldCycle {
        /// The node being attached.
        node: NodeId,
        /// The would-be parent, which is the node itself or one of its descendants.
        parent: NodeId,
    },
    /// The handle does not refer to a live node.
    StaleNode(NodeId),
    /// The observer cannot receive updates (dead node or unregistered id).
    NotUpdateCapable(Observer),
    /// A child index past the end of the children sequence.
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of children.
        len: usize,
    },
    /// A child slot whose index is beyond the next free position.
    SlotUnreachable {
        /// Name of the slot property.
        slot: &'static str,
        /// Index assigned to the slot.
        index: usize,
        /// Number of children.
        len: usize,
    },
    /// Only parentless nodes can be removed from the document.
    StillAttached {
        /// The node to remove.
        node: NodeId,
        /// Its parent.
        parent: NodeId,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyParented { node, parent } => {
                write!(f, "node {node} already has parent {parent}")
            }
            Self::WouldCycle { node, parent } => {
                write!(f, "attaching node {node} under {parent} would create a cycle")
            }
            Self::StaleNode(node) => write!(f, "node {node} is not alive"),
            Self::NotUpdateCapable(observer) => {
                write!(f, "{observer:?} has no callable 'update'")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "child index {index} out of range for {len} children")
            }
            Self::SlotUnreachable { slot, index, len } => write!(
                f,
                "slot '{slot}' sits at index {index} but only {len} children exist"
            ),
            Self::StillAttached { node, parent } => {
                write!(f, "node {node} is still attached to {parent}")
            }
        }
    }
}

impl core::error::Error for TreeError {}

/// Any error raised by a [`Document`](crate::Document).
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Validation or property lookup failure.
    Property(PropertyError),
    /// Structural failure.
    Tree(TreeError),
    /// No node type with this name is registered.
    UnknownType(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(err) => fmt::Display::fmt(err, f),
            Self::Tree(err) => fmt::Display::fmt(err, f),
            Self::UnknownType(name) => write!(f, "unknown node type '{name}'"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Property(err) => Some(err),
            Self::Tree(err) => Some(err),
            Self::UnknownType(_) => None,
        }
    }
}

impl From<PropertyError> for Error {
    fn from(err: PropertyError) -> Self {
        Self::Property(err)
    }
}

impl From<TreeError> for Error {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}
