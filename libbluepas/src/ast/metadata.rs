// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `metadata` module defines [AstNodeId] and [AstMetadata], which caches the resolved type of
//! every expression node.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::ICE;
use crate::symbols::TypeId;

/// A unique numerical identifier for a node in the AST. Identifiers start from 1.
#[derive(Debug, Default, Copy, Clone, Hash, Eq, PartialEq)]
pub struct AstNodeId(u32);

impl fmt::Display for AstNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AstNodeId {
    /// Creates a new, unique `AstNodeId`.
    pub fn new() -> Self {
        static NEXT_ID: AtomicU32 = AtomicU32::new(1);

        let next_id = NEXT_ID.fetch_add(1, Ordering::SeqCst); // Increments and returns previous value, so `1` is first.

        if next_id == u32::MAX {
            ICE!("Exhausted node ids"); // Technically we have 1 more available but we'll limit ourselves to MAX-1.
        }

        Self(next_id)
    }
}

/// Per-node annotations recorded outside the tree itself.
///
/// Every expression node has a cached resolved type: literals, identifiers, calls and unary
/// operators are seeded at construction, and the type checker sets the rest exactly once.
#[derive(Debug, Default)]
pub struct AstMetadata {
    node_types: HashMap<AstNodeId, TypeId>,
}

impl AstMetadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a node's cached resolved type.
    pub fn node_type(&self, node_id: AstNodeId) -> TypeId {
        let Some(ty) = self.node_types.get(&node_id) else {
            ICE!("Node {node_id} has no cached type");
        };
        *ty
    }

    /// Sets a node's resolved type.
    pub fn set_node_type(&mut self, node_id: AstNodeId, ty: TypeId) {
        self.node_types.insert(node_id, ty);
    }
}
