// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property descriptors and their validation rules.
//!
//! A [`PropertyDescriptor`] is declared once per node type and shared by all
//! nodes of that type. It never holds per-node state: values live in each
//! node's storage, keyed by the descriptor's name.

use crate::error::PropertyError;
use crate::value::Value;

/// Validation rule applied to every top-level write.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Rule {
    /// Accepts any value.
    Any,
    /// Accepts integers and floats.
    Numeric,
    /// Accepts numbers with `lb <= value <= ub`.
    Bounded {
        /// Inclusive lower bound.
        lb: f64,
        /// Inclusive upper bound.
        ub: f64,
    },
    /// Accepts text.
    Text,
    /// Accepts booleans.
    Flag,
}

impl Rule {
    /// Checks `value` against this rule.
    ///
    /// `class` and `attribute` name the node type and property in the error.
    pub fn check(
        self,
        class: &'static str,
        attribute: &'static str,
        value: &Value,
    ) -> Result<(), PropertyError> {
        let wrong_type = |expected| PropertyError::WrongType {
            class,
            attribute,
            expected,
            got: value.kind_name(),
        };
        match self {
            Self::Any => Ok(()),
            Self::Numeric => {
                if value.is_number() {
                    Ok(())
                } else {
                    Err(wrong_type("int/float"))
                }
            }
            Self::Bounded { lb, ub } => {
                let v = value.as_f64().ok_or_else(|| wrong_type("int/float"))?;
                if v < lb {
                    return Err(PropertyError::BelowLowerBound {
                        class,
                        attribute,
                        bound: lb,
                    });
                }
                if v > ub {
                    return Err(PropertyError::AboveUpperBound {
                        class,
                        attribute,
                        bound: ub,
                    });
                }
                Ok(())
            }
            Self::Text => match value {
                Value::Text(_) => Ok(()),
                _ => Err(wrong_type("str")),
            },
            Self::Flag => match value {
                Value::Bool(_) => Ok(()),
                _ => Err(wrong_type("bool")),
            },
        }
    }
}

/// How a property validates and applies values.
///
/// All kinds share the same top-level write path (validate, compare, record an
/// undo step, notify); they differ in validation and in how a value is applied
/// to a node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PropertyKind {
    /// Writes the node's storage, then runs the node's `update` hook.
    Plain(Rule),
    /// Like [`Plain`](Self::Plain), but first pushes the value, without
    /// broadcasting, into the same-named property of every current child.
    Shared(Rule),
    /// A fixed position in the owner's children sequence.
    ///
    /// Accepts only node handles. Attaching a node copies the owner's shared
    /// values onto it; swapping occupants toggles their `visible` flags.
    ChildSlot(usize),
    /// A drawing attribute (colour, line style, visibility, ...).
    ///
    /// Writes storage and asks the renderer to redraw when the node has
    /// `auto_draw` set. Does not run `update`, so derived caches survive.
    Appearance(Rule),
}

impl PropertyKind {
    /// The validation rule, if the kind has one.
    #[must_use]
    pub fn rule(self) -> Option<Rule> {
        match self {
            Self::Plain(rule) | Self::Shared(rule) | Self::Appearance(rule) => Some(rule),
            Self::ChildSlot(_) => None,
        }
    }

    /// Returns `true` for [`Shared`](Self::Shared).
    #[must_use]
    #[inline]
    pub fn is_shared(self) -> bool {
        matches!(self, Self::Shared(_))
    }

    /// The child index, for [`ChildSlot`](Self::ChildSlot).
    #[must_use]
    #[inline]
    pub fn slot(self) -> Option<usize> {
        match self {
            Self::ChildSlot(index) => Some(index),
            _ => None,
        }
    }
}

/// A named, typed attribute declared on a node type.
///
/// # Example
///
/// ```rust
/// use arbor_node::{PropertyDescriptor, PropertyKind, Rule, Value};
///
/// let angle = PropertyDescriptor::new(
///     "angle_of_inflow",
///     0,
///     PropertyKind::Plain(Rule::Bounded { lb: 0.0, ub: 180.0 }),
/// );
///
/// assert!(angle.check("CircularArc", &Value::from(100)).is_ok());
/// assert!(angle.check("CircularArc", &Value::from(200)).is_err());
/// assert_eq!(angle.default(), &Value::from(0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDescriptor {
    name: &'static str,
    default: Value,
    kind: PropertyKind,
}

impl PropertyDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(name: &'static str, default: impl Into<Value>, kind: PropertyKind) -> Self {
        Self {
            name,
            default: default.into(),
            kind,
        }
    }

    /// The property name, unique within its node type.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Value reported when a node has nothing stored.
    #[must_use]
    #[inline]
    pub fn default(&self) -> &Value {
        &self.default
    }

    /// The property kind.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Validates `value` for a node of type `class`.
    pub fn check(&self, class: &'static str, value: &Value) -> Result<(), PropertyError> {
        match self.kind {
            PropertyKind::ChildSlot(_) => match value {
                Value::Node(_) => Ok(()),
                _ => Err(PropertyError::WrongType {
                    class,
                    attribute: self.name,
                    expected: "node",
                    got: value.kind_name(),
                }),
            },
            kind => kind
                .rule()
                .map_or(Ok(()), |rule| rule.check(class, self.name, value)),
        }
    }
}
