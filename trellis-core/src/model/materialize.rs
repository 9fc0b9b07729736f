//! Materialization
//!
//! Turns plain [`Data`] into a model, exactly once.
//!
//! # How It Works
//!
//! 1. Values that are already live pass through: a model is returned as is,
//!    and a native node is looked up in the identity map (or wrapped when the
//!    engine has never seen it).
//!
//! 2. Scalars become text models.
//!
//! 3. For element data the live node is created first. Its id is the
//!    model's handle, so handlers, classes, style and content are all
//!    initialised against a model that already exists.
//!
//! 4. The pair is registered in the identity map, and only then is the
//!    reverse-sync observer connected.

use std::sync::Arc;

use super::refs::validate_name;
use super::sync::connect;
use super::{Data, ElementData, Model, ModelKind, Slot};
use crate::dom::{NodeId, NodeKind};
use crate::engine::Shared;
use crate::error::Result;

pub(crate) fn materialize(shared: &Arc<Shared>, data: Data) -> Result<Model> {
    match data {
        Data::Model(model) => Ok(model),
        Data::Node(node) => wrap(shared, node),
        Data::Text(text) => {
            let node = shared.doc.create_text(&text);
            let model = Model::allocate(shared, node, ModelKind::Text, None);
            shared.identity.register(&model);
            Ok(model)
        }
        Data::Component {
            component,
            ref_name,
        } => {
            let model = component.model().clone();
            if let Some(name) = ref_name {
                validate_name(&shared.config, &name)?;
                model.state().write().ref_name = Some(name);
            }
            Ok(model)
        }
        Data::Element(element) => build_element(shared, element),
    }
}

fn build_element(shared: &Arc<Shared>, element: ElementData) -> Result<Model> {
    if let Some(name) = &element.ref_name {
        validate_name(&shared.config, name)?;
    }
    let tag = element.tag.to_ascii_lowercase();
    let node = shared.doc.create_element(&tag);
    let model = Model::allocate(shared, node, ModelKind::Element(tag), element.ref_name);

    for (name, value) in element.attrs {
        model.set_attr(&name, value)?;
    }
    if let Some(class) = element.class {
        model.set_class(class)?;
    }
    if let Some(style) = element.style {
        model.set_style(style)?;
    }
    if !element.on.is_empty() {
        model.set_on(element.on)?;
    }
    shared.identity.register(&model);
    if let Some(content) = element.content {
        model.set_content(content)?;
    }
    connect(&model);

    tracing::debug!(%node, tag = ?model.tag(), "element materialized");
    Ok(model)
}

/// The model for a native node, wrapping it (and its subtree) when the
/// engine has not seen it before.
///
/// The configured reference attribute supplies the model's reference name;
/// a name that fails validation is ignored.
pub(crate) fn wrap(shared: &Arc<Shared>, node: NodeId) -> Result<Model> {
    if let Some(model) = shared.identity.lookup(node) {
        return Ok(model);
    }
    let model = match shared.doc.kind(node)? {
        NodeKind::Text => Model::allocate(shared, node, ModelKind::Text, None),
        NodeKind::Element(tag) => {
            let ref_name = ref_attribute(shared, node);
            let model = Model::allocate(shared, node, ModelKind::Element(tag), ref_name);
            let children = shared
                .doc
                .children(node)
                .into_iter()
                .map(|child| wrap(shared, child))
                .collect::<Result<Vec<_>>>()?;
            model.state().write().content = Slot::from_models(children);
            model
        }
    };
    shared.identity.register(&model);
    if model.is_element() {
        connect(&model);
    }
    tracing::debug!(%node, "native node wrapped");
    Ok(model)
}

fn ref_attribute(shared: &Shared, node: NodeId) -> Option<String> {
    let attribute = shared.config.ref_attribute.as_deref()?;
    let name = shared.doc.attribute(node, attribute)?;
    match validate_name(&shared.config, &name) {
        Ok(()) => Some(name),
        Err(err) => {
            tracing::warn!(%node, %err, "reference attribute ignored");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Handler;
    use crate::{Engine, EngineConfig, Error};

    #[test]
    fn scalars_become_text_models() {
        let engine = Engine::new();
        let text = engine.create_model(42).unwrap();
        assert!(text.is_text());
        assert_eq!(text.text(), "42");
        assert!(engine.is_managed(text.node()));
    }

    #[test]
    fn element_data_is_applied_to_the_node() {
        let engine = Engine::new();
        let model = engine
            .create_model(
                ElementData::new("BUTTON")
                    .attr("title", "Save")
                    .class("primary wide")
                    .style("color", "red")
                    .on("click", Handler::new(|_| {}))
                    .text("Go"),
            )
            .unwrap();
        let doc = engine.document();
        let node = model.node();

        assert_eq!(model.tag(), Some("button"));
        assert_eq!(model.attr("title").unwrap().to_text(), "Save");
        assert_eq!(doc.class_list(node), vec!["primary", "wide"]);
        assert_eq!(doc.style_property(node, "color").as_deref(), Some("red"));
        assert_eq!(doc.listener_count(node, "click"), 1);
        assert_eq!(doc.text_content(node), "Go");
        assert!(model.observer().is_some());
    }

    #[test]
    fn building_makes_no_observable_mutation() {
        let engine = Engine::new();
        engine
            .create_model(ElementData::new("ul").child("a").child(ElementData::new("li").child("b")))
            .unwrap();
        assert_eq!(engine.tick(), 0);
        assert_eq!(engine.reverse_sync_count(), 0);
    }

    #[test]
    fn invalid_reference_names_fail_early() {
        let engine = Engine::new();
        let err = engine
            .create_model(ElementData::new("div").ref_name("not valid"))
            .unwrap_err();
        assert_eq!(err, Error::InvalidName { name: "not valid".into() });

        let lax = Engine::with_config(EngineConfig {
            validate_ref_names: false,
            ..EngineConfig::default()
        });
        assert!(lax
            .create_model(ElementData::new("div").ref_name("not valid"))
            .is_ok());
    }

    #[test]
    fn wrapping_builds_the_whole_subtree() {
        let engine = Engine::new();
        let doc = engine.document();
        let list = doc.create_element("ul");
        let first = doc.create_element("li");
        let second = doc.create_text("two");
        doc.append_child(list, first).unwrap();
        doc.append_child(list, second).unwrap();
        doc.set_attribute(first, "data-ref", "first").unwrap();
        doc.set_attribute(list, "data-ref", "bad name").unwrap();

        let model = engine.node_to_model(list).unwrap();

        assert_eq!(model.children().len(), 2);
        assert_eq!(model.children()[0].ref_name().as_deref(), Some("first"));
        assert!(model.ref_name().is_none());
        assert!(engine.is_managed(second));
    }
}
