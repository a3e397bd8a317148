// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamically typed property values.

use alloc::string::String;
use core::fmt;

use crate::id::NodeId;

/// A property value.
///
/// Properties are declared at run time (see [`NodeTypeBuilder`](crate::NodeTypeBuilder))
/// and may be written from loaded documents, so values carry their own type and
/// are checked against each property's [`Rule`](crate::Rule) on every write.
///
/// Numbers compare across representations: `Int(1) == Float(1.0)`.
///
/// ```rust
/// use arbor_node::Value;
///
/// assert_eq!(Value::from(100), Value::from(100.0));
/// assert_ne!(Value::from(1), Value::from(true));
/// assert_eq!(Value::from("Camber Line").as_str(), Some("Camber Line"));
/// ```
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// No value. The default of child slots and untyped properties.
    #[default]
    None,
    /// A boolean flag.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// Text.
    Text(String),
    /// A node handle, used by child slots.
    Node(NodeId),
}

impl Value {
    /// Short name of the value's kind, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "str",
            Self::Node(_) => "node",
        }
    }

    /// Returns `true` for [`Value::None`].
    #[must_use]
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns `true` for integers and floats.
    #[must_use]
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Returns the value as `f64` if it is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the integer, if this is an [`Int`](Self::Int).
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the flag, if this is a [`Bool`](Self::Bool).
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the text, if this is a [`Text`](Self::Text).
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the node handle, if this is a [`Node`](Self::Node).
    #[must_use]
    pub fn as_node(&self) -> Option<NodeId> {
        match *self {
            Self::Node(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a == b,
            (a, b) if a.is_number() && b.is_number() => a.as_f64() == b.as_f64(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Node(v) => write!(f, "node {v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NodeId> for Value {
    fn from(v: NodeId) -> Self {
        Self::Node(v)
    }
}
