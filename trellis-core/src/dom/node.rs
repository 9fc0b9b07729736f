//! Live Nodes
//!
//! This module defines the node types that live in the document arena.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::event::Handler;

/// Unique identifier for a node in the document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of a live node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with a lower-cased tag name.
    Element(String),

    /// A text node. Its value lives in the node's text slot.
    Text,
}

impl NodeKind {
    /// The numeric node type, as reported through the `nodeType` property.
    pub fn node_type(&self) -> u8 {
        match self {
            NodeKind::Element(_) => 1,
            NodeKind::Text => 3,
        }
    }
}

/// A scalar value stored in a typed property or used as an attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Num(f64),
    Str(String),
}

impl Scalar {
    /// Whether the value is "falsy": `false`, `0`, `NaN` or the empty string.
    pub fn is_falsy(&self) -> bool {
        match self {
            Scalar::Bool(b) => !b,
            Scalar::Num(n) => *n == 0.0 || n.is_nan(),
            Scalar::Str(s) => s.is_empty(),
        }
    }

    /// Render the value as text.
    ///
    /// Integral numbers print without a fractional part, so `3.0` becomes `"3"`.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Num(n) if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            Scalar::Num(n) => n.to_string(),
            Scalar::Str(s) => s.clone(),
        }
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Num(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Num(f64::from(value))
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Num(value as f64)
    }
}

/// What a property lookup on a live node found.
#[derive(Debug, Clone, PartialEq)]
pub enum HostProperty {
    /// A plain value.
    Value(Scalar),

    /// A native method. Never exposed through a model.
    Method,
}

/// Names the host reports as callable properties.
pub(crate) const NATIVE_METHODS: &[&str] = &[
    "appendChild",
    "insertBefore",
    "remove",
    "addEventListener",
    "removeEventListener",
    "getAttribute",
    "setAttribute",
    "removeAttribute",
    "dispatchEvent",
    "click",
    "focus",
    "blur",
    "cloneNode",
    "contains",
];

/// Read-only properties computed from node state.
pub(crate) const BUILTIN_PROPERTIES: &[&str] = &[
    "textContent",
    "tagName",
    "nodeName",
    "nodeType",
    "className",
    "childElementCount",
];

/// Storage for a single live node.
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) text: String,
    pub(crate) properties: IndexMap<String, Scalar>,
    pub(crate) attributes: IndexMap<String, String>,
    pub(crate) classes: IndexSet<String>,
    pub(crate) style: IndexMap<String, String>,
    pub(crate) listeners: SmallVec<[(String, Handler); 2]>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            text: String::new(),
            properties: IndexMap::new(),
            attributes: IndexMap::new(),
            classes: IndexSet::new(),
            style: IndexMap::new(),
            listeners: SmallVec::new(),
        }
    }

    pub(crate) fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    pub(crate) fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text => None,
        }
    }

    /// Serialize the inline style as a declaration block.
    pub(crate) fn css_text(&self) -> String {
        self.style
            .iter()
            .map(|(name, value)| format!("{}: {};", name, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Parse a `name: value; ...` declaration block into ordered pairs.
///
/// Empty declarations and declarations without a colon are skipped.
pub fn parse_css_text(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((normalize_style_name(name), value.to_string()))
        })
        .collect()
}

/// Convert a camel-cased style name (`fontSize`) into its dashed form (`font-size`).
///
/// Names that are already dashed pass through unchanged.
pub fn normalize_style_name(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 2);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
