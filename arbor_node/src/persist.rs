// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat records of node properties, for saving and loading documents.
//!
//! A [`Record`] lists every declared property of a node under its type name.
//! Occupied child slots nest the child's record. Restoring validates every
//! value like [`Document::set`], and shared values flow down to attached
//! children exactly as they do for interactive edits. Nothing is recorded in
//! the undo log.
//!
//! With the `serde` feature, both types implement `Serialize` and
//! `Deserialize`. Values are untagged, so a record reads naturally as JSON.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::document::Document;
use crate::error::{Error, PropertyError};
use crate::id::NodeId;
use crate::value::Value;

/// The saved state of one node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    /// Registered name of the node type.
    pub type_name: String,
    /// Property values, in declaration order.
    pub values: Vec<(String, RecordValue)>,
}

impl Record {
    /// Looks up a recorded value by property name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&RecordValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// A saved property value. Node handles become nested records.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RecordValue {
    /// No value.
    None,
    /// A boolean flag.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// Text.
    Text(String),
    /// The record of a child node.
    Node(Box<Record>),
}

impl Document {
    /// Records every declared property of `node`, nesting occupied child slots.
    pub fn record(&self, node: NodeId) -> Result<Record, Error> {
        let ty = self.type_of(node)?;
        let mut values = Vec::with_capacity(ty.properties().len());
        for prop in ty.properties() {
            let value = match self.get(node, prop.name())? {
                Value::None => RecordValue::None,
                Value::Bool(v) => RecordValue::Bool(v),
                Value::Int(v) => RecordValue::Int(v),
                Value::Float(v) => RecordValue::Float(v),
                Value::Text(v) => RecordValue::Text(v),
                Value::Node(child) => RecordValue::Node(Box::new(self.record(child)?)),
            };
            values.push((String::from(prop.name()), value));
        }
        Ok(Record {
            type_name: String::from(ty.name()),
            values,
        })
    }

    /// Creates a parentless node from `record`.
    ///
    /// Plain values are written first, then child slots in slot order, each
    /// validated as by [`set`](Self::set). On error every node created so far
    /// is removed again.
    ///
    /// No history is recorded and no events fire.
    pub fn restore(&mut self, record: &Record) -> Result<NodeId, Error> {
        let node = self.create_named(&record.type_name)?;
        match self.restore_into(node, record) {
            Ok(()) => Ok(node),
            Err(err) => {
                self.free_subtree(node);
                Err(err)
            }
        }
    }

    fn restore_into(&mut self, node: NodeId, record: &Record) -> Result<(), Error> {
        let mut slots = Vec::new();
        for (name, value) in &record.values {
            let ty = self.type_of(node)?;
            let prop = ty.property(name).ok_or_else(|| PropertyError::UnknownProperty {
                class: ty.name(),
                attribute: name.clone(),
            })?;
            match prop.kind().slot() {
                Some(index) => slots.push((index, name, value)),
                None => {
                    let value = self.restore_value(value)?;
                    self.initialize(node, name, value)?;
                }
            }
        }

        slots.sort_by_key(|(index, ..)| *index);
        for (_, name, value) in slots {
            if matches!(value, RecordValue::None) {
                continue;
            }
            let value = self.restore_value(value)?;
            if let Err(err) = self.initialize(node, name, value.clone()) {
                if let Some(orphan) = value.as_node() {
                    self.free_subtree(orphan);
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn restore_value(&mut self, value: &RecordValue) -> Result<Value, Error> {
        Ok(match value {
            RecordValue::None => Value::None,
            RecordValue::Bool(v) => Value::Bool(*v),
            RecordValue::Int(v) => Value::Int(*v),
            RecordValue::Float(v) => Value::Float(*v),
            RecordValue::Text(v) => Value::Text(v.clone()),
            RecordValue::Node(record) => Value::Node(self.restore(record)?),
        })
    }

    /// Adds the nodes of `records` to the document and starts a fresh history.
    ///
    /// Either every record is restored or none is, and a failed load leaves
    /// the history untouched. On success the undo stack is cleared, so there
    /// is no undo across a load.
    pub fn load(&mut self, records: &[Record]) -> Result<Vec<NodeId>, Error> {
        let mut roots = Vec::with_capacity(records.len());
        for record in records {
            match self.restore(record) {
                Ok(root) => roots.push(root),
                Err(err) => {
                    for root in roots {
                        self.free_subtree(root);
                    }
                    return Err(err);
                }
            }
        }
        self.clear_history();
        #[cfg(feature = "tracing")]
        tracing::debug!(roots = roots.len(), "loaded document");
        Ok(roots)
    }
}
