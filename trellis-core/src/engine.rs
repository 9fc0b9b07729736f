//! Binding Engine
//!
//! The engine is the entry point collaborators use: it turns plain data into
//! models, answers identity lookups in both directions, owns the fixed root
//! owner, and drives the observer checkpoint.
//!
//! # How It Works
//!
//! 1. All engine state lives in one shared block (`Shared`): the document,
//!    the identity map, the configuration and a reconciliation counter.
//!    Every model holds an `Arc` to it, so a model can reach the tree and the
//!    identity map without going back through the `Engine` handle.
//!
//! 2. Outside code edits the document directly. Those edits only queue
//!    mutation records; they reach models when [`Engine::tick`] delivers
//!    them, which is the equivalent of a microtask checkpoint.
//!
//! 3. Binding a root wraps an existing native subtree and resolves every
//!    named descendant onto [`Engine::root_owner`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::EngineConfig;
use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::model::{self, Component, Data, IdentityMap, Model, Owner};

/// State shared by the engine handle and every model it creates.
pub(crate) struct Shared {
    pub(crate) doc: Document,
    pub(crate) identity: IdentityMap,
    pub(crate) config: EngineConfig,
    pub(crate) sync_runs: AtomicU64,
}

/// Handle to a binding engine.
///
/// Cloning the handle is cheap; clones share the same document, identity
/// map, root and root owner.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
    root: Arc<RwLock<Option<Model>>>,
    root_owner: Owner,
}

impl Engine {
    /// Create an engine over a fresh document with default settings.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_document(Document::new(), config)
    }

    /// Create an engine driving an existing document.
    pub fn with_document(doc: Document, config: EngineConfig) -> Self {
        tracing::debug!(?config, "engine created");
        Self {
            shared: Arc::new(Shared {
                doc,
                identity: IdentityMap::new(),
                config,
                sync_runs: AtomicU64::new(0),
            }),
            root: Arc::new(RwLock::new(None)),
            root_owner: Owner::new(),
        }
    }

    /// The document this engine drives. Edits made through it count as
    /// outside edits and are folded back by reverse sync.
    pub fn document(&self) -> &Document {
        &self.shared.doc
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Materialize plain data into a model.
    ///
    /// Materializing an existing model returns it unchanged. No references
    /// are installed anywhere; use [`resolve_refs`](Self::resolve_refs) for
    /// that.
    pub fn create_model(&self, data: impl Into<Data>) -> Result<Model> {
        model::materialize(&self.shared, data.into())
    }

    /// The live node bound to a model.
    pub fn model_to_node(&self, model: &Model) -> NodeId {
        model.node()
    }

    /// The model bound to a live node, wrapping the node on demand when it
    /// was created outside the engine.
    pub fn node_to_model(&self, node: NodeId) -> Result<Model> {
        match self.shared.identity.lookup(node) {
            Some(model) => Ok(model),
            None => model::wrap(&self.shared, node),
        }
    }

    /// Whether a live node currently has a model.
    pub fn is_managed(&self, node: NodeId) -> bool {
        self.shared.identity.is_registered(node)
    }

    /// Number of live nodes with a model.
    pub fn managed_count(&self) -> usize {
        self.shared.identity.len()
    }

    /// Bind a native subtree as the root.
    ///
    /// The previous root's references are revoked and nodes that are not
    /// part of the new root leave engine management. The new subtree is
    /// wrapped and every named descendant is installed on
    /// [`root_owner`](Self::root_owner).
    #[tracing::instrument(skip_all, fields(node = %node))]
    pub fn set_root(&self, node: NodeId) -> Result<Model> {
        let previous = self.root.write().take();
        if let Some(previous) = previous {
            model::release(&previous);
            if !self.shared.doc.contains(node, previous.node()) {
                self.forget_subtree(&previous, node);
            }
        }

        let root = self.node_to_model(node)?;
        model::resolve(&self.root_owner, &root, false)?;
        *self.root.write() = Some(root.clone());
        tracing::debug!(refs = self.root_owner.len(), "root bound");
        Ok(root)
    }

    /// Drop engine management for `model`'s subtree, except for anything
    /// living under `keep`.
    fn forget_subtree(&self, model: &Model, keep: NodeId) {
        if self.shared.doc.contains(keep, model.node()) {
            return;
        }
        for child in model.children() {
            self.forget_subtree(&child, keep);
        }
        if let Some(observer) = model.state().write().observer.take() {
            self.shared.doc.unobserve(observer);
        }
        self.shared.identity.deregister(model.node());
    }

    /// The current root model.
    pub fn root(&self) -> Option<Model> {
        self.root.read().clone()
    }

    /// The fixed owner root references are installed on.
    pub fn root_owner(&self) -> &Owner {
        &self.root_owner
    }

    /// Install every named model in `model`'s subtree on `owner`.
    ///
    /// Either every name is installed or, on a collision, none is.
    pub fn resolve_refs(&self, owner: &Owner, model: &Model) -> Result<()> {
        model::resolve(owner, model, false)
    }

    /// Revoke every reference installed for `model`'s subtree.
    pub fn release_refs(&self, model: &Model) {
        model::release(model)
    }

    /// Build a component: a model with a dedicated owner for its named
    /// descendants.
    pub fn component(&self, data: impl Into<Data>) -> Result<Component> {
        Component::build(&self.shared, data.into())
    }

    /// Deliver pending observer records. Returns the number of batches.
    pub fn tick(&self) -> usize {
        let batches = self.shared.doc.flush(self.shared.config.max_flush_rounds);
        if batches > 0 {
            tracing::debug!(batches, "observer checkpoint");
        }
        batches
    }

    /// How many times reverse sync has reconciled a batch.
    pub fn reverse_sync_count(&self) -> u64 {
        self.shared.sync_runs.load(Ordering::Relaxed)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("document", &self.shared.doc)
            .field("managed", &self.shared.identity.len())
            .field("root", &self.root.read().as_ref().map(Model::node))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementData;

    #[test]
    fn node_to_model_wraps_foreign_nodes_once() {
        let engine = Engine::new();
        let doc = engine.document();
        let node = doc.create_element("section");

        assert!(!engine.is_managed(node));
        let first = engine.node_to_model(node).unwrap();
        let second = engine.node_to_model(node).unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(engine.model_to_node(&first), node);
        assert!(engine.is_managed(node));
    }

    #[test]
    fn create_model_is_idempotent() {
        let engine = Engine::new();
        let model = engine.create_model(ElementData::new("div")).unwrap();
        let again = engine.create_model(model.clone()).unwrap();
        assert!(model.ptr_eq(&again));
    }

    #[test]
    fn set_root_exposes_named_descendants() {
        let engine = Engine::new();
        let doc = engine.document();
        let root = doc.create_element("main");
        let title = doc.create_element("h1");
        doc.set_attribute(title, "data-ref", "title").unwrap();
        doc.append_child(root, title).unwrap();

        engine.set_root(root).unwrap();

        let found = engine.root_owner().get("title").unwrap();
        assert_eq!(found.node(), title);
        assert_eq!(engine.root().unwrap().node(), root);
    }

    #[test]
    fn replacing_the_root_forgets_the_old_tree() {
        let engine = Engine::new();
        let doc = engine.document();
        let old_root = doc.create_element("div");
        let named = doc.create_element("p");
        doc.set_attribute(named, "data-ref", "para").unwrap();
        doc.append_child(old_root, named).unwrap();
        engine.set_root(old_root).unwrap();
        assert!(engine.root_owner().contains("para"));

        let new_root = doc.create_element("div");
        engine.set_root(new_root).unwrap();

        assert!(!engine.root_owner().contains("para"));
        assert!(!engine.is_managed(old_root));
        assert!(!engine.is_managed(named));
    }
}
