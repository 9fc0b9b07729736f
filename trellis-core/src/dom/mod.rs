//! Live Node Tree
//!
//! This module is the host surface the binding engine drives: an arena of
//! element and text nodes with attributes, typed properties, class lists,
//! inline style, event listeners and child-list mutation observers.
//!
//! # Concepts
//!
//! ## Nodes
//!
//! Nodes are addressed by [`NodeId`]. A node has at most one parent, and
//! inserting an attached node somewhere else moves it. Nodes are never
//! cloned implicitly.
//!
//! ## Properties and attributes
//!
//! A node stores values in two places: typed properties (any [`Scalar`]) and
//! generic string attributes. Some property names are read-only built-ins
//! computed from node state (`textContent`, `tagName`, ...) and some are
//! native methods, reported as [`HostProperty::Method`].
//!
//! ## Observers
//!
//! Structural edits on an observed node queue [`MutationRecord`]s. Nothing is
//! delivered until [`Document::flush`] runs, mirroring the microtask
//! checkpoint of a browser: outside edits are only visible to observers after
//! the current run of synchronous edits completes.

mod document;
mod event;
mod node;
mod observer;

pub use document::Document;
pub use event::{Event, Handler};
pub use node::{normalize_style_name, parse_css_text, HostProperty, NodeId, NodeKind, Scalar};
pub use observer::{MutationCallback, MutationRecord, ObserverId};

use thiserror::Error;

/// Errors reported by the host tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("node {child} cannot be inserted into {parent}: it would become its own ancestor")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0} is not a text node")]
    NotAText(NodeId),

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}
