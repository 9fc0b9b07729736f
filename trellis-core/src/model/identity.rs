//! Identity Map
//!
//! Associates each live node with the model bound to it. The model side of
//! the pair is intrinsic (a model always knows its node), so only the
//! node-to-model direction is stored here.
//!
//! Entries hold weak references: a registered node never keeps its model
//! alive. Entries are also removed explicitly whenever the engine detaches a
//! node from management, so a stale entry can never bring a removed model
//! back through reverse sync.

use std::sync::{Arc, Weak};

use dashmap::DashMap;

use super::{Model, ModelInner};
use crate::dom::NodeId;

#[derive(Default)]
pub(crate) struct IdentityMap {
    by_node: DashMap<NodeId, Weak<ModelInner>>,
}

impl IdentityMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bind `model` to its node, replacing any previous binding.
    pub(crate) fn register(&self, model: &Model) {
        self.by_node
            .insert(model.node(), Arc::downgrade(&model.inner));
        tracing::trace!(node = %model.node(), "identity registered");
    }

    /// Forget the binding for `node`. Returns whether one existed.
    pub(crate) fn deregister(&self, node: NodeId) -> bool {
        let removed = self.by_node.remove(&node).is_some();
        if removed {
            tracing::trace!(%node, "identity deregistered");
        }
        removed
    }

    /// The model bound to `node`, if it is registered and still alive.
    pub(crate) fn lookup(&self, node: NodeId) -> Option<Model> {
        let found = self.by_node.get(&node).and_then(|weak| weak.upgrade());
        match found {
            Some(inner) => Some(Model { inner }),
            None => {
                // Clean up entries whose model has been dropped.
                self.forget_dead(node);
                None
            }
        }
    }

    pub(crate) fn is_registered(&self, node: NodeId) -> bool {
        self.lookup(node).is_some()
    }

    /// Whether a live model is registered for `node`. Never upgrades, so it
    /// is safe to call while the document is locked.
    pub(crate) fn has_live_model(&self, node: NodeId) -> bool {
        self.by_node
            .get(&node)
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Remove the entry for `node` only if its model is gone.
    pub(crate) fn forget_dead(&self, node: NodeId) {
        self.by_node
            .remove_if(&node, |_, weak| weak.strong_count() == 0);
    }

    pub(crate) fn len(&self) -> usize {
        self.by_node.len()
    }
}
