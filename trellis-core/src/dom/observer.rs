//! Mutation Observers
//!
//! An observer watches the direct child list of one target node. Every
//! insertion or removal under a connected target queues a [`MutationRecord`];
//! queued records are handed to the observer's callback in one batch when the
//! document is flushed.
//!
//! Disconnecting an observer stops new records from being queued but keeps
//! the ones already waiting, so a batch of outside edits is never lost just
//! because the engine briefly silenced the observer around its own edit.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use smallvec::SmallVec;

use super::node::NodeId;

/// Unique identifier for an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// One child-list change on an observed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// The node whose child list changed.
    pub target: NodeId,
    /// Nodes inserted into the child list.
    pub added: SmallVec<[NodeId; 2]>,
    /// Nodes removed from the child list.
    pub removed: SmallVec<[NodeId; 2]>,
    /// Sibling before the change point, at the time of the change.
    pub previous_sibling: Option<NodeId>,
    /// Sibling after the change point, at the time of the change.
    pub next_sibling: Option<NodeId>,
}

/// Callback receiving a batch of records.
pub type MutationCallback = Arc<dyn Fn(&[MutationRecord]) + Send + Sync>;

/// Registry entry for one observer.
pub(crate) struct ObserverEntry {
    pub(crate) target: NodeId,
    pub(crate) connected: bool,
    pub(crate) pending: Vec<MutationRecord>,
    pub(crate) callback: MutationCallback,
}

impl ObserverEntry {
    pub(crate) fn new(target: NodeId, callback: MutationCallback) -> Self {
        Self {
            target,
            connected: true,
            pending: Vec::new(),
            callback,
        }
    }
}

impl fmt::Debug for ObserverEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverEntry")
            .field("target", &self.target)
            .field("connected", &self.connected)
            .field("pending", &self.pending.len())
            .finish()
    }
}
