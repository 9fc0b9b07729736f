//! Content List
//!
//! A model's content is absent, one child model, or an ordered sequence of
//! child models. Whatever the shape, the models always appear in the same
//! order as the live node's children.
//!
//! # How Index Assignment Works
//!
//! Assigning value `v` at index `i`:
//!
//! 1. `v` is materialized into a model `m`. If `m` already sits at `i`,
//!    nothing happens.
//!
//! 2. If `m`'s node is attached anywhere, it is moved out: a placeholder
//!    text node takes its old position (and, when that parent is managed, a
//!    placeholder model takes its old slot). Nodes are moved, never cloned.
//!
//! 3. If a child exists at `i`, its references are revoked, `m` is inserted
//!    before it and it is removed. Otherwise `m` is appended. Until the next
//!    checkpoint, content may still hold models whose nodes outside code
//!    already removed; those are skipped when picking the live position.
//!
//! 4. `m`'s references are installed against the content's owner.
//!
//! Every structural edit runs with the affected observers silenced.

use std::fmt;

use super::refs::{release, resolve_all};
use super::sync::Silence;
use super::{materialize, ContentData, Data, Model, ModelKind};
use crate::dom::{DomError, NodeId};
use crate::error::{Error, Result};

/// Storage for a model's content.
#[derive(Clone, Default)]
pub(crate) enum Slot {
    #[default]
    Empty,
    Single(Model),
    List(Vec<Model>),
}

impl Slot {
    /// Pick the natural shape for `models`: absent, single, or a sequence.
    pub(crate) fn from_models(mut models: Vec<Model>) -> Self {
        match models.len() {
            0 => Slot::Empty,
            1 => Slot::Single(models.remove(0)),
            _ => Slot::List(models),
        }
    }

    pub(crate) fn to_vec(&self) -> Vec<Model> {
        match self {
            Slot::Empty => Vec::new(),
            Slot::Single(model) => vec![model.clone()],
            Slot::List(models) => models.clone(),
        }
    }

    /// Promote to a sequence and edit it.
    fn edit_list<R>(&mut self, edit: impl FnOnce(&mut Vec<Model>) -> R) -> R {
        let mut models = match std::mem::take(self) {
            Slot::Empty => Vec::new(),
            Slot::Single(model) => vec![model],
            Slot::List(models) => models,
        };
        let out = edit(&mut models);
        *self = Slot::List(models);
        out
    }

    /// Replace the entry for `old` with `new`, keeping the shape.
    fn replace(&mut self, old: &Model, new: Model) -> bool {
        match self {
            Slot::Single(current) if current.ptr_eq(old) => {
                *current = new;
                true
            }
            Slot::List(models) => match models.iter().position(|m| m.ptr_eq(old)) {
                Some(index) => {
                    models[index] = new;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

/// A model's content, as read through [`Model::content`].
#[derive(Clone)]
pub enum Content {
    Single(Model),
    List(ContentList),
}

impl Content {
    /// The child models in order.
    pub fn to_vec(&self) -> Vec<Model> {
        match self {
            Content::Single(model) => vec![model.clone()],
            Content::List(list) => list.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Content::Single(_) => 1,
            Content::List(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Single(model) => f.debug_tuple("Single").field(model).finish(),
            Content::List(list) => f.debug_tuple("List").field(list).finish(),
        }
    }
}

/// Live sequence view over a model's content.
///
/// Mutating operations turn the content into a sequence, even when it was
/// absent or a single model.
#[derive(Clone)]
pub struct ContentList {
    model: Model,
}

impl ContentList {
    pub(crate) fn new(model: Model) -> Self {
        Self { model }
    }

    pub fn len(&self) -> usize {
        match &self.model.state().read().content {
            Slot::Empty => 0,
            Slot::Single(_) => 1,
            Slot::List(models) => models.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Model> {
        self.to_vec().into_iter().nth(index)
    }

    pub fn to_vec(&self) -> Vec<Model> {
        self.model.children()
    }

    pub fn iter(&self) -> std::vec::IntoIter<Model> {
        self.to_vec().into_iter()
    }

    pub fn position(&self, child: &Model) -> Option<usize> {
        self.to_vec().iter().position(|m| m.ptr_eq(child))
    }

    /// The live node a new child goes before to land at `index`: the node
    /// of the first model from `index` on that is still a live child.
    /// Models whose nodes outside code removed since the last checkpoint
    /// are skipped. `None` means append.
    fn live_anchor(&self, index: usize) -> Option<NodeId> {
        let parent = self.model.node();
        let doc = self.model.doc();
        self.to_vec()
            .into_iter()
            .skip(index)
            .map(|m| m.node())
            .find(|node| doc.parent(*node) == Some(parent))
    }

    /// Assign `data` at `index`. `index == len()` appends.
    #[tracing::instrument(skip_all, fields(node = %self.model.node(), index = index))]
    pub fn set(&self, index: usize, data: impl Into<Data>) -> Result<Model> {
        let parent = &self.model;
        let len = self.len();
        if index > len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        let child = materialize(parent.shared(), data.into())?;
        if self.get(index).is_some_and(|m| m.ptr_eq(&child)) {
            return Ok(child);
        }
        check_hierarchy(parent, &child)?;

        let doc = parent.doc();
        let _silence = Silence::new(doc, [parent]);
        take_from_elsewhere(&child)?;

        match self.get(index) {
            Some(old) => {
                release(&old);
                let anchor = self.live_anchor(index);
                doc.insert_before(parent.node(), child.node(), anchor)?;
                detach_if_child(parent, &old)?;
                parent.shared().identity.deregister(old.node());
                let replacement = child.clone();
                parent
                    .state()
                    .write()
                    .content
                    .edit_list(|models| models[index] = replacement);
            }
            None => {
                doc.append_child(parent.node(), child.node())?;
                let appended = child.clone();
                parent
                    .state()
                    .write()
                    .content
                    .edit_list(|models| models.push(appended));
            }
        }
        parent.shared().identity.register(&child);
        tracing::debug!(child = %child.node(), "content assigned");

        attach_refs(parent, &child)?;
        Ok(child)
    }

    /// Insert `data` before the model at `index`. `index == len()` appends.
    pub fn insert(&self, index: usize, data: impl Into<Data>) -> Result<Model> {
        let parent = &self.model;
        let len = self.len();
        if index > len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        let child = materialize(parent.shared(), data.into())?;
        check_hierarchy(parent, &child)?;

        let doc = parent.doc();
        let _silence = Silence::new(doc, [parent]);
        take_from_elsewhere(&child)?;

        let anchor = self.live_anchor(index);
        doc.insert_before(parent.node(), child.node(), anchor)?;
        let inserted = child.clone();
        parent
            .state()
            .write()
            .content
            .edit_list(|models| models.insert(index, inserted));
        parent.shared().identity.register(&child);
        tracing::debug!(child = %child.node(), index, "content inserted");

        attach_refs(parent, &child)?;
        Ok(child)
    }

    pub fn push(&self, data: impl Into<Data>) -> Result<Model> {
        self.insert(self.len(), data)
    }

    /// Remove the model at `index`, revoking its references first.
    ///
    /// Returns `Ok(None)` when there is nothing at `index`.
    pub fn delete(&self, index: usize) -> Result<Option<Model>> {
        let parent = &self.model;
        let Some(old) = self.get(index) else {
            return Ok(None);
        };
        release(&old);
        {
            let _silence = Silence::new(parent.doc(), [parent]);
            detach_if_child(parent, &old)?;
        }
        parent
            .state()
            .write()
            .content
            .edit_list(|models| {
                if index < models.len() {
                    models.remove(index);
                }
            });
        parent.shared().identity.deregister(old.node());
        tracing::debug!(child = %old.node(), index, "content deleted");
        Ok(Some(old))
    }

    /// Remove `delete_count` models starting at `start`, then insert `items`
    /// there. Returns the removed models.
    pub fn splice<I>(&self, start: usize, delete_count: usize, items: I) -> Result<Vec<Model>>
    where
        I: IntoIterator,
        I::Item: Into<Data>,
    {
        let len = self.len();
        if start > len {
            return Err(Error::IndexOutOfRange { index: start, len });
        }
        let mut removed = Vec::new();
        for _ in 0..delete_count.min(len - start) {
            removed.extend(self.delete(start)?);
        }
        for (offset, item) in items.into_iter().enumerate() {
            self.insert(start + offset, item)?;
        }
        Ok(removed)
    }

    /// Remove models from the end until at most `len` remain.
    pub fn truncate(&self, len: usize) -> Result<()> {
        while self.len() > len {
            self.delete(self.len() - 1)?;
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.truncate(0)
    }
}

impl fmt::Debug for ContentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}

fn check_hierarchy(parent: &Model, child: &Model) -> Result<()> {
    if parent.doc().contains(child.node(), parent.node()) {
        return Err(DomError::HierarchyRequest {
            parent: parent.node(),
            child: child.node(),
        }
        .into());
    }
    Ok(())
}

fn attach_refs(parent: &Model, child: &Model) -> Result<()> {
    match parent.owner() {
        Some(owner) => resolve_all(&owner, std::slice::from_ref(child), false),
        None => Ok(()),
    }
}

/// Discard `child`'s node, but only from `parent`: a node that outside code
/// already moved elsewhere is left where it is. A discarded node is freed
/// when its model goes away, unless it is inserted somewhere first.
fn detach_if_child(parent: &Model, child: &Model) -> Result<()> {
    if parent.doc().parent(child.node()) == Some(parent.node()) {
        parent.doc().discard(child.node())?;
    }
    Ok(())
}

/// Move `model`'s node out of its current parent, leaving a placeholder.
///
/// When the old parent is managed, the placeholder gets a text model in
/// that parent's content so its order still matches the live children.
pub(crate) fn take_from_elsewhere(model: &Model) -> Result<()> {
    let shared = model.shared();
    let doc = &shared.doc;
    let Some(old_parent) = doc.parent(model.node()) else {
        return Ok(());
    };
    let parent_model = shared.identity.lookup(old_parent);
    release(model);

    let _silence = Silence::new(doc, parent_model.iter());
    let placeholder = doc.create_text(&shared.config.placeholder_text);
    doc.insert_before(old_parent, placeholder, Some(model.node()))?;
    doc.remove(model.node())?;

    if let Some(parent_model) = parent_model {
        let stand_in = Model::allocate(shared, placeholder, ModelKind::Text, None);
        shared.identity.register(&stand_in);
        parent_model.state().write().content.replace(model, stand_in);
    }
    tracing::debug!(node = %model.node(), from = %old_parent, "node moved out");
    Ok(())
}

impl Model {
    /// The current content, or `None` when absent (always for text models).
    pub fn content(&self) -> Option<Content> {
        match &self.state().read().content {
            Slot::Empty => None,
            Slot::Single(model) => Some(Content::Single(model.clone())),
            Slot::List(_) => Some(Content::List(ContentList::new(self.clone()))),
        }
    }

    /// A sequence view over the content, whatever its current shape.
    ///
    /// `None` for text models.
    pub fn content_list(&self) -> Option<ContentList> {
        self.is_element().then(|| ContentList::new(self.clone()))
    }

    /// The child models in order.
    pub fn children(&self) -> Vec<Model> {
        self.state().read().content.to_vec()
    }

    /// Replace the content.
    ///
    /// The old content's references and nodes go first. The new content is
    /// then materialized, its references resolved against this model's
    /// owner, and only then attached. If resolution fails, the content is
    /// left absent.
    #[tracing::instrument(skip_all, fields(node = %self.node()))]
    pub fn set_content(&self, content: impl Into<ContentData>) -> Result<bool> {
        if !self.is_element() {
            return Ok(false);
        }
        let content = content.into();
        self.delete_content()?;

        let (single, items) = match content {
            ContentData::Single(data) => (true, vec![*data]),
            ContentData::List(items) => (false, items),
        };
        let mut models: Vec<Model> = Vec::with_capacity(items.len());
        for item in items {
            let model = materialize(self.shared(), item)?;
            if models.iter().any(|m| m.ptr_eq(&model)) {
                return Err(Error::InvalidData(format!(
                    "node {} appears twice in the same content",
                    model.node()
                )));
            }
            check_hierarchy(self, &model)?;
            models.push(model);
        }

        let doc = self.doc();
        let _silence = Silence::new(doc, [self]);
        for model in &models {
            take_from_elsewhere(model)?;
        }
        if let Some(owner) = self.owner() {
            resolve_all(&owner, &models, false)?;
        }
        for model in &models {
            doc.append_child(self.node(), model.node())?;
            self.shared().identity.register(model);
        }

        tracing::debug!(children = models.len(), "content replaced");
        self.state().write().content = if single {
            models.pop().map(Slot::Single).unwrap_or_default()
        } else {
            Slot::List(models)
        };
        Ok(true)
    }

    /// Remove every child: references are revoked, then the nodes removed.
    pub fn delete_content(&self) -> Result<bool> {
        if !self.is_element() {
            return Ok(false);
        }
        let old = std::mem::take(&mut self.state().write().content).to_vec();
        if old.is_empty() {
            return Ok(true);
        }
        for model in &old {
            release(model);
        }
        {
            let _silence = Silence::new(self.doc(), [self]);
            for model in &old {
                detach_if_child(self, model)?;
            }
        }
        for model in &old {
            self.shared().identity.deregister(model.node());
        }
        tracing::debug!(node = %self.node(), removed = old.len(), "content cleared");
        Ok(true)
    }
}
