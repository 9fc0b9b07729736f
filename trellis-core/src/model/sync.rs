//! Reverse Sync
//!
//! Every element model watches its own child list. When outside code edits
//! the list, the queued records are delivered at the next checkpoint and the
//! model's content is reconciled against them.
//!
//! # How Reconciliation Works
//!
//! 1. Removed nodes that the model's content still holds are dropped from it,
//!    their references revoked. Removed nodes the content does not know are
//!    ignored.
//!
//! 2. Added nodes that are still children of the model's node get a model:
//!    the registered one, or a freshly wrapped one for foreign nodes.
//!
//! 3. The content is rebuilt in live child order, so each new model lands
//!    right after the model of its previous sibling.
//!
//! 4. The content collapses to a single model, or to absent, when removals
//!    leave one entry or none.
//!
//! 5. References of the inserted models are resolved against the model's
//!    owner.
//!
//! The engine's own structural edits happen inside a [`Silence`] guard, so
//! they never come back through this path.

use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use smallvec::SmallVec;

use super::refs::{release, resolve_all};
use super::{wrap, Model, Slot};
use crate::dom::{Document, MutationCallback, MutationRecord, NodeId, ObserverId};

/// Guard that keeps observers disconnected while the engine edits the tree.
///
/// Only observers that were connected when the guard was created are
/// reconnected on drop, so guards nest.
pub(crate) struct Silence {
    doc: Document,
    observers: SmallVec<[ObserverId; 2]>,
}

impl Silence {
    pub(crate) fn new<'a>(doc: &Document, models: impl IntoIterator<Item = &'a Model>) -> Self {
        let mut observers = SmallVec::new();
        for model in models {
            if let Some(observer) = model.observer() {
                if doc.is_connected(observer) {
                    doc.disconnect(observer);
                    observers.push(observer);
                }
            }
        }
        Self {
            doc: doc.clone(),
            observers,
        }
    }
}

impl Drop for Silence {
    fn drop(&mut self) {
        for observer in &self.observers {
            self.doc.reconnect(*observer);
        }
    }
}

/// Start watching `model`'s child list.
pub(crate) fn connect(model: &Model) {
    let weak = Arc::downgrade(&model.inner);
    let callback: MutationCallback = Arc::new(move |records: &[MutationRecord]| {
        if let Some(inner) = weak.upgrade() {
            reconcile(&Model { inner }, records);
        }
    });
    let observer = model.doc().observe(model.node(), callback);
    model.state().write().observer = Some(observer);
}

/// Fold a batch of outside child-list edits into `model`'s content.
#[tracing::instrument(skip_all, fields(node = %model.node(), records = records.len()))]
pub(crate) fn reconcile(model: &Model, records: &[MutationRecord]) {
    let shared = Arc::clone(model.shared());
    shared.sync_runs.fetch_add(1, Ordering::Relaxed);
    let doc = &shared.doc;
    let node = model.node();
    let live = doc.children(node);

    let current = model.children();
    let known: HashSet<NodeId> = current.iter().map(Model::node).collect();

    for record in records {
        if record.target != node {
            tracing::warn!(observed = %record.target, "record for another node skipped");
            continue;
        }
        for removed in &record.removed {
            if !known.contains(removed) {
                tracing::debug!(%removed, "removed node was not in content");
            }
        }
    }

    let removed: Vec<Model> = current
        .iter()
        .filter(|child| doc.parent(child.node()) != Some(node))
        .cloned()
        .collect();

    let mut inserted = Vec::new();
    let mut next = Vec::with_capacity(live.len());
    for child in live {
        if let Some(existing) = current.iter().find(|m| m.node() == child) {
            next.push(existing.clone());
            continue;
        }
        match wrap(&shared, child) {
            Ok(fresh) => {
                shared.identity.register(&fresh);
                inserted.push(fresh.clone());
                next.push(fresh);
            }
            Err(err) => {
                tracing::warn!(%child, %err, "added node could not be wrapped");
            }
        }
    }

    for child in &removed {
        // A node moved under another managed parent keeps its binding; the
        // destination takes it over.
        let adopted = doc
            .parent(child.node())
            .is_some_and(|parent| shared.identity.is_registered(parent));
        if !adopted {
            release(child);
        }
        if doc.parent(child.node()).is_none() {
            shared.identity.deregister(child.node());
        }
    }

    {
        let mut state = model.state().write();
        let was_list = matches!(state.content, Slot::List(_));
        state.content = match next.len() {
            0 => Slot::Empty,
            1 if was_list && removed.is_empty() && !current.is_empty() => Slot::List(next),
            1 => Slot::from_models(next),
            _ => Slot::List(next),
        };
    }

    tracing::debug!(
        removed = removed.len(),
        inserted = inserted.len(),
        "reverse sync reconciled"
    );

    if inserted.is_empty() {
        return;
    }
    if let Some(owner) = model.owner() {
        if let Err(err) = resolve_all(&owner, &inserted, false) {
            tracing::warn!(%err, "references of inserted nodes not installed");
        }
    }
}
