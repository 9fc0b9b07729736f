//! Document Arena
//!
//! The document owns every live node and every mutation observer. It is a
//! cheap, clonable handle: clones share the same tree, so the engine and any
//! outside code holding a `Document` see and edit the same nodes.
//!
//! # Locking
//!
//! All state sits behind one `RwLock`. Callbacks (event listeners and
//! observer callbacks) are always invoked after the lock is released, so a
//! callback may freely read or edit the tree.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use smallvec::{smallvec, SmallVec};

use super::event::{Event, Handler};
use super::node::{
    normalize_style_name, parse_css_text, HostProperty, NodeData, NodeId, NodeKind, Scalar,
    BUILTIN_PROPERTIES, NATIVE_METHODS,
};
use super::observer::{MutationCallback, MutationRecord, ObserverEntry, ObserverId};
use super::DomError;

type DomResult<T> = Result<T, DomError>;

/// Tags laid out as blocks by default.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "ul",
];

/// Tags that are never displayed.
const HIDDEN_TAGS: &[&str] = &["head", "link", "meta", "script", "style", "template", "title"];

/// Style properties that cascade from ancestors.
const INHERITED_STYLE: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "line-height",
    "text-align",
    "visibility",
    "white-space",
];

#[derive(Default)]
struct Tree {
    nodes: HashMap<NodeId, NodeData>,
    observers: IndexMap<ObserverId, ObserverEntry>,
    by_target: HashMap<NodeId, SmallVec<[ObserverId; 1]>>,
    /// Detached nodes whose storage may be freed by [`Document::reclaim`].
    discarded: HashSet<NodeId>,
}

impl Tree {
    fn node(&self, id: NodeId) -> DomResult<&NodeData> {
        self.nodes.get(&id).ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut NodeData> {
        self.nodes.get_mut(&id).ok_or(DomError::NodeNotFound(id))
    }

    /// Queue a record for every connected observer watching its target.
    fn queue(&mut self, record: MutationRecord) {
        let Some(ids) = self.by_target.get(&record.target) else {
            return;
        };
        for id in ids {
            if let Some(entry) = self.observers.get_mut(id) {
                if entry.connected {
                    entry.pending.push(record.clone());
                }
            }
        }
    }

    /// Remove `child` from its parent, if any, queueing a removal record.
    fn detach(&mut self, child: NodeId) -> DomResult<()> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(());
        };
        let siblings = &mut self.node_mut(parent)?.children;
        let Some(index) = siblings.iter().position(|c| *c == child) else {
            return Err(DomError::NotAChild { parent, child });
        };
        siblings.remove(index);
        let previous_sibling = index.checked_sub(1).map(|i| siblings[i]);
        let next_sibling = siblings.get(index).copied();
        self.node_mut(child)?.parent = None;

        tracing::trace!(%parent, %child, "detached node");
        self.queue(MutationRecord {
            target: parent,
            added: SmallVec::new(),
            removed: smallvec![child],
            previous_sibling,
            next_sibling,
        });
        Ok(())
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|n| n.parent);
        }
        false
    }

    fn insert(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<()> {
        if !self.node(parent)?.is_element() {
            return Err(DomError::NotAnElement(parent));
        }
        self.node(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.node(reference)?.parent != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
            if reference == child {
                // Inserting a node before itself leaves it where it is.
                return Ok(());
            }
        }

        self.detach(child)?;

        let siblings = &mut self.node_mut(parent)?.children;
        let index = match reference {
            Some(reference) => siblings
                .iter()
                .position(|c| *c == reference)
                .unwrap_or(siblings.len()),
            None => siblings.len(),
        };
        siblings.insert(index, child);
        let previous_sibling = index.checked_sub(1).map(|i| siblings[i]);
        let next_sibling = siblings.get(index + 1).copied();
        self.node_mut(child)?.parent = Some(parent);
        self.discarded.remove(&child);

        tracing::trace!(%parent, %child, index, "inserted node");
        self.queue(MutationRecord {
            target: parent,
            added: smallvec![child],
            removed: SmallVec::new(),
            previous_sibling,
            next_sibling,
        });
        Ok(())
    }

    /// Take `root` and every descendant out of the arena, except descendants
    /// for which `keep` holds: those are cut loose and marked discarded.
    fn free_subtree(&mut self, root: NodeId, keep: &dyn Fn(NodeId) -> bool) -> Vec<NodeData> {
        let mut freed = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            self.discarded.remove(&current);
            let Some(data) = self.nodes.remove(&current) else {
                continue;
            };
            for child in &data.children {
                if keep(*child) {
                    if let Some(node) = self.nodes.get_mut(child) {
                        node.parent = None;
                    }
                    self.discarded.insert(*child);
                } else {
                    stack.push(*child);
                }
            }
            freed.push(data);
        }
        freed
    }

    fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.nodes.get(&id) else {
            return String::new();
        };
        match node.kind {
            NodeKind::Text => node.text.clone(),
            NodeKind::Element(_) => node
                .children
                .iter()
                .map(|child| self.text_content(*child))
                .collect(),
        }
    }

    fn builtin(&self, node: &NodeData, id: NodeId, name: &str) -> Option<Scalar> {
        match (name, &node.kind) {
            ("textContent", _) => Some(Scalar::Str(self.text_content(id))),
            ("tagName", NodeKind::Element(tag)) => Some(Scalar::Str(tag.to_ascii_uppercase())),
            ("nodeName", NodeKind::Element(tag)) => Some(Scalar::Str(tag.to_ascii_uppercase())),
            ("nodeName", NodeKind::Text) => Some(Scalar::Str("#text".into())),
            ("nodeType", kind) => Some(Scalar::Num(f64::from(kind.node_type()))),
            ("className", NodeKind::Element(_)) => Some(Scalar::Str(join_classes(node))),
            ("childElementCount", NodeKind::Element(_)) => {
                let count = node
                    .children
                    .iter()
                    .filter(|c| self.nodes.get(*c).is_some_and(NodeData::is_element))
                    .count();
                Some(Scalar::Num(count as f64))
            }
            _ => None,
        }
    }
}

fn join_classes(node: &NodeData) -> String {
    node.classes.iter().cloned().collect::<Vec<_>>().join(" ")
}

/// A shared tree of live nodes.
#[derive(Clone, Default)]
pub struct Document {
    tree: Arc<RwLock<Tree>>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Node creation and inspection
    // ------------------------------------------------------------------

    /// Create a detached element. The tag is lower-cased.
    pub fn create_element(&self, tag: &str) -> NodeId {
        let id = NodeId::next();
        let data = NodeData::new(NodeKind::Element(tag.to_ascii_lowercase()));
        self.tree.write().nodes.insert(id, data);
        tracing::trace!(node = %id, tag, "created element");
        id
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        let id = NodeId::next();
        let mut data = NodeData::new(NodeKind::Text);
        data.text = text.to_string();
        self.tree.write().nodes.insert(id, data);
        tracing::trace!(node = %id, "created text node");
        id
    }

    /// Whether the node exists in this document.
    pub fn exists(&self, id: NodeId) -> bool {
        self.tree.read().nodes.contains_key(&id)
    }

    /// Number of nodes the document holds.
    pub fn node_count(&self) -> usize {
        self.tree.read().nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> DomResult<NodeKind> {
        Ok(self.tree.read().node(id)?.kind.clone())
    }

    /// The lower-cased tag name, or `None` for text nodes.
    pub fn tag(&self, id: NodeId) -> Option<String> {
        let tree = self.tree.read();
        tree.nodes.get(&id).and_then(|n| n.tag().map(str::to_string))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.tree.read().nodes.get(&id).is_some_and(NodeData::is_element)
    }

    /// The data of a text node.
    pub fn text(&self, id: NodeId) -> DomResult<String> {
        let tree = self.tree.read();
        let node = tree.node(id)?;
        match node.kind {
            NodeKind::Text => Ok(node.text.clone()),
            NodeKind::Element(_) => Err(DomError::NotAText(id)),
        }
    }

    /// Replace the data of a text node.
    pub fn set_text(&self, id: NodeId, text: &str) -> DomResult<()> {
        let mut tree = self.tree.write();
        let node = tree.node_mut(id)?;
        match node.kind {
            NodeKind::Text => {
                node.text = text.to_string();
                Ok(())
            }
            NodeKind::Element(_) => Err(DomError::NotAText(id)),
        }
    }

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        self.tree.read().text_content(id)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.read().nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let tree = self.tree.read();
        tree.nodes
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        let tree = self.tree.read();
        tree.nodes.get(&id).and_then(|n| n.children.get(index).copied())
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.tree.read().nodes.get(&id).map_or(0, |n| n.children.len())
    }

    /// Position of `child` within `parent`'s child list.
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        let tree = self.tree.read();
        tree.nodes
            .get(&parent)
            .and_then(|n| n.children.iter().position(|c| *c == child))
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let tree = self.tree.read();
        let parent = tree.nodes.get(&id)?.parent?;
        let siblings = &tree.nodes.get(&parent)?.children;
        let index = siblings.iter().position(|c| *c == id)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let tree = self.tree.read();
        let parent = tree.nodes.get(&id)?.parent?;
        let siblings = &tree.nodes.get(&parent)?.children;
        let index = siblings.iter().position(|c| *c == id)?;
        siblings.get(index + 1).copied()
    }

    /// Whether `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.read().is_inclusive_ancestor(ancestor, node)
    }

    /// Append `child` to `parent`, moving it if it is attached elsewhere.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.tree.write().insert(parent, child, None)
    }

    /// Insert `child` before `reference`, or append when `reference` is `None`.
    pub fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.tree.write().insert(parent, child, reference)
    }

    /// Detach a node from its parent. Detached nodes are left untouched.
    pub fn remove(&self, id: NodeId) -> DomResult<()> {
        self.tree.write().detach(id)
    }

    /// Detach a node and give up on it: once it is still detached when
    /// [`reclaim`](Self::reclaim) runs, its storage is freed. Inserting the
    /// node anywhere cancels the discard.
    pub fn discard(&self, id: NodeId) -> DomResult<()> {
        let mut tree = self.tree.write();
        tree.detach(id)?;
        tree.discarded.insert(id);
        Ok(())
    }

    /// Whether `id` is discarded and waiting to be reclaimed.
    pub fn is_discarded(&self, id: NodeId) -> bool {
        self.tree.read().discarded.contains(&id)
    }

    /// Free a discarded, still detached node and its subtree. Descendants
    /// for which `keep` returns true are detached and discarded instead of
    /// freed, so they can be reclaimed on their own later.
    ///
    /// `keep` runs with the tree locked and must not touch the document.
    /// Returns the number of nodes freed.
    pub fn reclaim(&self, id: NodeId, keep: impl Fn(NodeId) -> bool) -> usize {
        let freed = {
            let mut tree = self.tree.write();
            let detached = tree.nodes.get(&id).is_some_and(|n| n.parent.is_none());
            if !detached || !tree.discarded.contains(&id) {
                return 0;
            }
            tree.free_subtree(id, &keep)
        };
        // Listeners are dropped here, with the lock released.
        let count = freed.len();
        drop(freed);
        tracing::trace!(node = %id, count, "reclaimed nodes");
        count
    }

    // ------------------------------------------------------------------
    // Properties and attributes
    // ------------------------------------------------------------------

    /// Look up a property: built-ins, native methods, then typed values.
    pub fn property(&self, id: NodeId, name: &str) -> Option<HostProperty> {
        let tree = self.tree.read();
        let node = tree.nodes.get(&id)?;
        if NATIVE_METHODS.contains(&name) {
            return Some(HostProperty::Method);
        }
        if let Some(value) = tree.builtin(node, id, name) {
            return Some(HostProperty::Value(value));
        }
        node.properties.get(name).cloned().map(HostProperty::Value)
    }

    /// Set (`Some`) or null out (`None`) a typed property.
    ///
    /// Returns `false` when the name is read-only or a native method.
    pub fn set_property(&self, id: NodeId, name: &str, value: Option<Scalar>) -> DomResult<bool> {
        if NATIVE_METHODS.contains(&name) || BUILTIN_PROPERTIES.contains(&name) {
            return Ok(false);
        }
        let mut tree = self.tree.write();
        let node = tree.node_mut(id)?;
        match value {
            Some(value) => {
                node.properties.insert(name.to_string(), value);
            }
            None => {
                node.properties.shift_remove(name);
            }
        }
        Ok(true)
    }

    /// Typed properties that were set on the node.
    pub fn properties(&self, id: NodeId) -> IndexMap<String, Scalar> {
        let tree = self.tree.read();
        tree.nodes
            .get(&id)
            .map(|n| n.properties.clone())
            .unwrap_or_default()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.read();
        let node = tree.nodes.get(&id)?;
        match name {
            "class" if !node.classes.is_empty() => Some(join_classes(node)),
            "class" => None,
            "style" if !node.style.is_empty() => Some(node.css_text()),
            "style" => None,
            _ => node.attributes.get(name).cloned(),
        }
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let mut tree = self.tree.write();
        let node = tree.node_mut(id)?;
        if !node.is_element() {
            return Err(DomError::NotAnElement(id));
        }
        match name {
            "class" => {
                node.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "style" => {
                node.style = parse_css_text(value).into_iter().collect();
            }
            _ => {
                node.attributes.insert(name.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    pub fn remove_attribute(&self, id: NodeId, name: &str) -> DomResult<()> {
        let mut tree = self.tree.write();
        let node = tree.node_mut(id)?;
        match name {
            "class" => node.classes.clear(),
            "style" => node.style.clear(),
            _ => {
                node.attributes.shift_remove(name);
            }
        }
        Ok(())
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// All attributes, with `class` and `style` rendered from their views.
    pub fn attributes(&self, id: NodeId) -> IndexMap<String, String> {
        let tree = self.tree.read();
        let Some(node) = tree.nodes.get(&id) else {
            return IndexMap::new();
        };
        let mut out = node.attributes.clone();
        if !node.classes.is_empty() {
            out.insert("class".into(), join_classes(node));
        }
        if !node.style.is_empty() {
            out.insert("style".into(), node.css_text());
        }
        out
    }

    // ------------------------------------------------------------------
    // Class list
    // ------------------------------------------------------------------

    pub fn class_list(&self, id: NodeId) -> Vec<String> {
        let tree = self.tree.read();
        tree.nodes
            .get(&id)
            .map(|n| n.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        let tree = self.tree.read();
        tree.nodes.get(&id).is_some_and(|n| n.classes.contains(class))
    }

    /// Add a class token. Whitespace-only tokens are ignored.
    pub fn add_class(&self, id: NodeId, class: &str) -> DomResult<()> {
        let class = class.trim();
        let mut tree = self.tree.write();
        let node = tree.node_mut(id)?;
        if !node.is_element() {
            return Err(DomError::NotAnElement(id));
        }
        if !class.is_empty() {
            node.classes.insert(class.to_string());
        }
        Ok(())
    }

    /// Remove a class token. Returns whether it was present.
    pub fn remove_class(&self, id: NodeId, class: &str) -> DomResult<bool> {
        let mut tree = self.tree.write();
        Ok(tree.node_mut(id)?.classes.shift_remove(class))
    }

    // ------------------------------------------------------------------
    // Inline style
    // ------------------------------------------------------------------

    pub fn style_property(&self, id: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.read();
        tree.nodes
            .get(&id)
            .and_then(|n| n.style.get(&normalize_style_name(name)).cloned())
    }

    /// Set an inline declaration. An empty value removes it.
    pub fn set_style_property(&self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let mut tree = self.tree.write();
        let node = tree.node_mut(id)?;
        if !node.is_element() {
            return Err(DomError::NotAnElement(id));
        }
        let name = normalize_style_name(name);
        let value = value.trim();
        if value.is_empty() {
            node.style.shift_remove(&name);
        } else {
            node.style.insert(name, value.to_string());
        }
        Ok(())
    }

    /// Remove an inline declaration, returning its old value.
    pub fn remove_style_property(&self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        let mut tree = self.tree.write();
        Ok(tree.node_mut(id)?.style.shift_remove(&normalize_style_name(name)))
    }

    pub fn style(&self, id: NodeId) -> IndexMap<String, String> {
        let tree = self.tree.read();
        tree.nodes
            .get(&id)
            .map(|n| n.style.clone())
            .unwrap_or_default()
    }

    /// A read-only snapshot of the node's effective style.
    ///
    /// Text nodes have no computed style and yield an empty map.
    pub fn computed_style(&self, id: NodeId) -> IndexMap<String, String> {
        let tree = self.tree.read();
        let Some(node) = tree.nodes.get(&id) else {
            return IndexMap::new();
        };
        let Some(tag) = node.tag() else {
            return IndexMap::new();
        };

        let display = if HIDDEN_TAGS.contains(&tag) {
            "none"
        } else if BLOCK_TAGS.contains(&tag) {
            "block"
        } else {
            "inline"
        };
        let mut computed = IndexMap::new();
        computed.insert("display".to_string(), display.to_string());

        // Collect ancestors, then cascade from the outermost inwards.
        let mut ancestors = Vec::new();
        let mut cursor = node.parent;
        while let Some(parent) = cursor {
            let Some(data) = tree.nodes.get(&parent) else {
                break;
            };
            ancestors.push(data);
            cursor = data.parent;
        }
        for ancestor in ancestors.iter().rev() {
            for (name, value) in &ancestor.style {
                if INHERITED_STYLE.contains(&name.as_str()) {
                    computed.insert(name.clone(), value.clone());
                }
            }
        }
        for (name, value) in &node.style {
            computed.insert(name.clone(), value.clone());
        }
        computed
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn add_listener(&self, id: NodeId, event: &str, handler: Handler) -> DomResult<()> {
        let mut tree = self.tree.write();
        let node = tree.node_mut(id)?;
        // Adding the same listener twice is a no-op.
        if !node
            .listeners
            .iter()
            .any(|(name, h)| name == event && h.same(&handler))
        {
            node.listeners.push((event.to_string(), handler));
        }
        Ok(())
    }

    /// Remove a listener by identity. Returns whether it was installed.
    pub fn remove_listener(&self, id: NodeId, event: &str, handler: &Handler) -> DomResult<bool> {
        let mut tree = self.tree.write();
        let node = tree.node_mut(id)?;
        let before = node.listeners.len();
        node.listeners
            .retain(|entry| !(entry.0 == event && entry.1.same(handler)));
        Ok(node.listeners.len() != before)
    }

    /// Number of listeners installed for an event name.
    pub fn listener_count(&self, id: NodeId, event: &str) -> usize {
        let tree = self.tree.read();
        tree.nodes.get(&id).map_or(0, |n| {
            n.listeners.iter().filter(|(name, _)| name == event).count()
        })
    }

    /// Invoke the target's listeners for `event`. Returns how many ran.
    pub fn dispatch_event(&self, id: NodeId, event: &str) -> DomResult<usize> {
        let handlers: Vec<Handler> = {
            let tree = self.tree.read();
            tree.node(id)?
                .listeners
                .iter()
                .filter(|(name, _)| name == event)
                .map(|(_, h)| h.clone())
                .collect()
        };

        let event = Event {
            name: event.to_string(),
            target: id,
        };
        for handler in &handlers {
            handler.call(&event);
        }
        Ok(handlers.len())
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Start watching `target`'s child list.
    pub fn observe(&self, target: NodeId, callback: MutationCallback) -> ObserverId {
        let id = ObserverId::next();
        let mut tree = self.tree.write();
        tree.observers.insert(id, ObserverEntry::new(target, callback));
        tree.by_target.entry(target).or_default().push(id);
        tracing::debug!(observer = ?id, %target, "observer connected");
        id
    }

    /// Stop queueing records. Already queued records are kept.
    pub fn disconnect(&self, id: ObserverId) {
        if let Some(entry) = self.tree.write().observers.get_mut(&id) {
            entry.connected = false;
        }
    }

    /// Resume queueing records after a [`disconnect`](Self::disconnect).
    pub fn reconnect(&self, id: ObserverId) {
        if let Some(entry) = self.tree.write().observers.get_mut(&id) {
            entry.connected = true;
        }
    }

    /// Drop an observer and any records it has not yet received.
    pub fn unobserve(&self, id: ObserverId) {
        let mut tree = self.tree.write();
        if let Some(entry) = tree.observers.shift_remove(&id) {
            if let Some(ids) = tree.by_target.get_mut(&entry.target) {
                ids.retain(|other| *other != id);
                if ids.is_empty() {
                    tree.by_target.remove(&entry.target);
                }
            }
            tracing::debug!(observer = ?id, target = %entry.target, "observer removed");
        }
    }

    pub fn is_connected(&self, id: ObserverId) -> bool {
        self.tree
            .read()
            .observers
            .get(&id)
            .is_some_and(|entry| entry.connected)
    }

    /// Number of records waiting for delivery to an observer.
    pub fn pending_records(&self, id: ObserverId) -> usize {
        self.tree
            .read()
            .observers
            .get(&id)
            .map_or(0, |entry| entry.pending.len())
    }

    /// Deliver queued records, one batch per observer.
    ///
    /// Callbacks may themselves cause new records; delivery repeats until no
    /// records are left or `max_rounds` rounds have run. Returns the number of
    /// batches delivered.
    pub fn flush(&self, max_rounds: usize) -> usize {
        let mut delivered = 0;
        for _ in 0..max_rounds {
            let batches: Vec<(MutationCallback, Vec<MutationRecord>)> = {
                let mut tree = self.tree.write();
                tree.observers
                    .values_mut()
                    .filter(|entry| !entry.pending.is_empty())
                    .map(|entry| (entry.callback.clone(), std::mem::take(&mut entry.pending)))
                    .collect()
            };

            if batches.is_empty() {
                break;
            }

            // Lock released; callbacks may touch the tree.
            for (callback, records) in batches {
                callback(&records);
                delivered += 1;
            }
        }
        delivered
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.tree.read();
        f.debug_struct("Document")
            .field("nodes", &tree.nodes.len())
            .field("observers", &tree.observers.len())
            .finish()
    }
}
