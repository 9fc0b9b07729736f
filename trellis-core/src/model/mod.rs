//! Reactive Models
//!
//! A [`Model`] is the data-shaped face of one live node. Reading or writing
//! it is translated, synchronously, into the matching operation on the node:
//! attribute edits, listener swaps, class and style edits, and child-list
//! reconciliation. Changes made to the live tree by outside code flow back
//! into the model through a per-element mutation observer.
//!
//! # Concepts
//!
//! ## Dispatch
//!
//! Property names are classified by [`Property::parse`]. Structural names
//! (`tag`, `on`, `class`, `style`, `content`, `computedStyle`, `text`,
//! `parent`, `owner`, `ref`, `dump`) route to specialised logic; anything
//! else goes through the attribute bridge, which coalesces the node's typed
//! properties and its string attributes into one read/write/delete contract.
//!
//! ## Materialization
//!
//! Plain [`Data`] becomes a model exactly once. The live node is allocated
//! first and acts as the model's stable handle; sub-structures are
//! initialised against it, the pair is registered in the identity map, and
//! only then is the reverse-sync observer connected.
//!
//! ## Content
//!
//! A model's content is absent, a single child, or an ordered sequence. The
//! sequence always equals the node's child list. Nodes are moved, never
//! cloned: assigning a model that is attached elsewhere leaves a placeholder
//! text node where it used to be.
//!
//! ## References
//!
//! Descendants carrying a reference name are exposed on an [`Owner`].
//! Installing a name that is already present fails with
//! [`Error::NameCollision`](crate::Error::NameCollision).
//!
//! ## Reverse sync
//!
//! Every element model observes its own child list. Mutations the engine
//! performs itself are made with the observer disconnected, so only outside
//! edits are folded back into the model, at the next
//! [`Engine::tick`](crate::Engine::tick).

mod attr;
mod classes;
mod component;
mod content;
mod data;
mod dump;
mod handlers;
mod identity;
mod materialize;
mod refs;
mod style;
mod sync;
mod value;

pub use classes::{ClassInput, ClassSet};
pub use component::Component;
pub use content::{Content, ContentList};
pub use data::{ContentData, Data, ElementData};
pub use dump::{ContentDump, ModelDump};
pub use handlers::Handlers;
pub use refs::Owner;
pub use style::{StyleInput, StyleView};
pub use value::{Assign, Property, Value};

pub(crate) use content::Slot;
pub(crate) use identity::IdentityMap;
pub(crate) use materialize::{materialize, wrap};
pub(crate) use refs::{release, resolve};

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::dom::{Document, Handler, HostProperty, NodeId, ObserverId};
use crate::engine::Shared;
use crate::error::Result;

/// What kind of node a model stands for. Fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ModelKind {
    Element(String),
    Text,
}

/// Mutable per-model state.
pub(crate) struct ModelState {
    pub(crate) handlers: IndexMap<String, Handler>,
    pub(crate) content: Slot,
    /// Name to install on the owner, if any.
    pub(crate) ref_name: Option<String>,
    /// Owner that descendants resolve their names against.
    pub(crate) owner: Option<Owner>,
    /// Where this model's own name is currently installed.
    pub(crate) binding: Option<(Owner, String)>,
    pub(crate) observer: Option<ObserverId>,
    /// Root of a component: outer trees do not walk into it.
    pub(crate) component: bool,
}

impl ModelState {
    fn new(ref_name: Option<String>) -> Self {
        Self {
            handlers: IndexMap::new(),
            content: Slot::Empty,
            ref_name,
            owner: None,
            binding: None,
            observer: None,
            component: false,
        }
    }
}

pub(crate) struct ModelInner {
    shared: Arc<Shared>,
    node: NodeId,
    kind: ModelKind,
    state: RwLock<ModelState>,
}

impl Drop for ModelInner {
    fn drop(&mut self) {
        self.shared.identity.forget_dead(self.node);
        if let Some(observer) = self.state.get_mut().observer.take() {
            self.shared.doc.unobserve(observer);
        }
        let identity = &self.shared.identity;
        self.shared
            .doc
            .reclaim(self.node, |node| identity.has_live_model(node));
    }
}

/// A reactive model bound to one live node for its whole life.
///
/// Cloning a model yields another handle to the same model.
#[derive(Clone)]
pub struct Model {
    pub(crate) inner: Arc<ModelInner>,
}

impl Model {
    pub(crate) fn allocate(
        shared: &Arc<Shared>,
        node: NodeId,
        kind: ModelKind,
        ref_name: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(ModelInner {
                shared: Arc::clone(shared),
                node,
                kind,
                state: RwLock::new(ModelState::new(ref_name)),
            }),
        }
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.inner.shared
    }

    pub(crate) fn doc(&self) -> &Document {
        &self.inner.shared.doc
    }

    pub(crate) fn state(&self) -> &RwLock<ModelState> {
        &self.inner.state
    }

    /// The live node this model is bound to.
    pub fn node(&self) -> NodeId {
        self.inner.node
    }

    /// The document holding the live node.
    pub fn document(&self) -> Document {
        self.doc().clone()
    }

    /// The tag name, or `None` for text models.
    pub fn tag(&self) -> Option<&str> {
        match &self.inner.kind {
            ModelKind::Element(tag) => Some(tag),
            ModelKind::Text => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.inner.kind, ModelKind::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.inner.kind, ModelKind::Text)
    }

    /// Whether two handles refer to the same model.
    pub fn ptr_eq(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The reference name this model carries.
    pub fn ref_name(&self) -> Option<String> {
        self.state().read().ref_name.clone()
    }

    /// The owner this model's descendants install their names on.
    pub fn owner(&self) -> Option<Owner> {
        self.state().read().owner.clone()
    }

    pub(crate) fn is_component(&self) -> bool {
        self.state().read().component
    }

    pub(crate) fn observer(&self) -> Option<ObserverId> {
        self.state().read().observer
    }

    /// The model of the parent node, if the parent is managed.
    pub fn parent(&self) -> Option<Model> {
        let parent = self.doc().parent(self.node())?;
        self.shared().identity.lookup(parent)
    }

    /// The node's text content (for elements, all descendant text).
    pub fn text(&self) -> String {
        self.doc().text_content(self.node())
    }

    /// A read-only snapshot of the node's effective style.
    pub fn computed_style(&self) -> IndexMap<String, String> {
        self.doc().computed_style(self.node())
    }

    // ------------------------------------------------------------------
    // Dynamic surface
    // ------------------------------------------------------------------

    /// Read a property.
    pub fn get(&self, name: &str) -> Value {
        tracing::trace!(node = %self.node(), property = name, "get");
        match Property::parse(name) {
            Property::Tag => self
                .tag()
                .map(|tag| Value::Scalar(tag.into()))
                .unwrap_or(Value::Absent),
            Property::On => self.on().map(Value::Handlers).unwrap_or(Value::Absent),
            Property::Class => self.class().map(Value::Classes).unwrap_or(Value::Absent),
            Property::Style => self.style().map(Value::Style).unwrap_or(Value::Absent),
            Property::Content => self.content().map(Value::Content).unwrap_or(Value::Absent),
            Property::ComputedStyle => Value::ComputedStyle(self.computed_style()),
            Property::Text => Value::Scalar(self.text().into()),
            Property::Parent => self.parent().map(Value::Model).unwrap_or(Value::Absent),
            Property::Owner => self.owner().map(Value::Owner).unwrap_or(Value::Absent),
            Property::Ref => self
                .ref_name()
                .map(|name| Value::Scalar(name.into()))
                .unwrap_or(Value::Absent),
            Property::Dump => Value::Dump(self.dump_json()),
            Property::Attr(name) => self.attr(name).map(Value::Scalar).unwrap_or(Value::Absent),
        }
    }

    /// Write a property.
    ///
    /// Returns `Ok(false)` when the write is unsupported (read-only names,
    /// structural names on text models, or a value of the wrong shape); the
    /// model is left unchanged in that case.
    pub fn set(&self, name: &str, value: impl Into<Assign>) -> Result<bool> {
        let value = value.into();
        tracing::trace!(node = %self.node(), property = name, "set");
        match (Property::parse(name), value) {
            (Property::On, Assign::Handlers(map)) => self.set_on(map),
            (Property::Class, Assign::Class(input)) => self.set_class(input),
            (Property::Class, Assign::Scalar(s)) => self.set_class(ClassInput::Text(s.to_text())),
            (Property::Style, Assign::Style(input)) => self.set_style(input),
            (Property::Style, Assign::Scalar(s)) => self.set_style(StyleInput::Text(s.to_text())),
            (Property::Content, Assign::Content(content)) => self.set_content(content),
            (Property::Content, Assign::Scalar(s)) => self.set_content(Data::Text(s.to_text())),
            (Property::Attr(name), Assign::Scalar(s)) => self.set_attr(name, s),
            _ => Ok(false),
        }
    }

    /// Delete a property.
    ///
    /// Structural deletes clear rather than remove: `on` resets to an empty
    /// map, `class` and `style` clear the live attribute, `content` removes
    /// every child.
    pub fn delete(&self, name: &str) -> Result<bool> {
        tracing::trace!(node = %self.node(), property = name, "delete");
        match Property::parse(name) {
            Property::On => self.clear_on(),
            Property::Class => self.clear_class(),
            Property::Style => self.clear_style(),
            Property::Content => self.delete_content(),
            Property::Attr(name) => self.remove_attr(name),
            _ => Ok(false),
        }
    }

    /// Whether a property exists.
    ///
    /// Structural names always exist. Other names exist when the live node
    /// has a non-callable property or an attribute of that name.
    pub fn has(&self, name: &str) -> bool {
        match Property::parse(name) {
            Property::Attr(name) => match self.doc().property(self.node(), name) {
                Some(HostProperty::Value(_)) => true,
                Some(HostProperty::Method) => false,
                None => self.doc().has_attribute(self.node(), name),
            },
            _ => true,
        }
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Model {}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("node", &self.node())
            .field("tag", &self.tag())
            .field("ref", &self.ref_name())
            .finish()
    }
}
