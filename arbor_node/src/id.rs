// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handles into a [`Document`](crate::Document).

use core::fmt;

/// Identifier for a node in a [`Document`](crate::Document).
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// - On creation, a fresh slot is allocated with generation `1`.
/// - On removal, the slot's generation is bumped; any existing `NodeId` that
///   pointed to it is now stale.
/// - Stale ids never alias a different live node because the generation must match.
///
/// Use [`Document::is_alive`](crate::Document::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32, u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn raw_idx(self) -> u32 {
        self.0
    }

    /// Returns the generation of the slot this id was issued for.
    #[must_use]
    #[inline]
    pub const fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.0, self.1)
    }
}

/// Identifier of an external observer registered with
/// [`Document::register_observer`](crate::Document::register_observer).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObserverId(pub(crate) u32);

/// Identifier of a property-changed listener registered with
/// [`Document::subscribe`](crate::Document::subscribe).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(pub(crate) u32);

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn node_id_parts() {
        let id = NodeId::new(3, 7);
        assert_eq!(id.idx(), 3);
        assert_eq!(id.generation(), 7);
        assert_ne!(id, NodeId::new(3, 8));
    }

    #[test]
    fn node_id_display() {
        assert_eq!(format!("{}", NodeId::new(4, 1)), "4v1");
    }
}
