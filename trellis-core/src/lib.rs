//! Trellis Core
//!
//! This crate provides a bidirectional binding engine between mutable,
//! data-shaped models and a live node tree. It implements:
//!
//! - A live node tree with attributes, class lists, inline style, event
//!   listeners and child-list mutation observers
//! - Materialization of plain data into models bound 1:1 to live nodes
//! - Content reconciliation with move-not-copy semantics
//! - Named references from an owner to descendant models
//! - Reverse sync of outside tree edits back into models
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `dom`: The live node tree the engine drives
//! - `model`: Models and their sub-structures (handlers, classes, style,
//!   content, references, reverse sync)
//! - `engine`: The entry point tying a document to an identity map
//! - `config`: Engine settings
//! - `error`: Error types
//!
//! # Example
//!
//! ```rust
//! use trellis_core::{ElementData, Engine, Owner};
//!
//! let engine = Engine::new();
//! let list = engine
//!     .create_model(ElementData::new("ul").child("first").child("second"))
//!     .unwrap();
//!
//! // Writes go straight to the live node.
//! list.set("class", "menu").unwrap();
//! assert_eq!(
//!     engine.document().attribute(list.node(), "class").as_deref(),
//!     Some("menu")
//! );
//!
//! // Named descendants show up on an owner.
//! let owner = Owner::new();
//! engine.resolve_refs(&owner, &list).unwrap();
//! list.content_list()
//!     .unwrap()
//!     .push(ElementData::new("li").ref_name("last"))
//!     .unwrap();
//! assert!(owner.get("last").is_some());
//!
//! // Outside edits are folded back at the next tick.
//! let doc = engine.document();
//! doc.remove(list.children()[0].node()).unwrap();
//! engine.tick();
//! assert_eq!(list.children().len(), 2);
//! ```

pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod model;

pub use config::EngineConfig;
pub use dom::{Document, Handler, NodeId, Scalar};
pub use engine::Engine;
pub use error::{Error, Result};
pub use model::{
    Assign, ClassInput, ClassSet, Component, Content, ContentData, ContentList, Data,
    ElementData, Handlers, Model, ModelDump, Owner, Property, StyleInput, StyleView, Value,
};
