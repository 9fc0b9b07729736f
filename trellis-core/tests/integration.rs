//! Integration Tests for the Binding Engine
//!
//! These tests verify that models, the live tree, references and reverse
//! sync work together correctly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::EnvFilter;
use trellis_core::{
    Content, Data, ElementData, Engine, Error, Handler, Model, NodeId, Owner, Scalar, Value,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn live_children(model: &Model) -> Vec<NodeId> {
    model.document().children(model.node())
}

fn model_children(model: &Model) -> Vec<NodeId> {
    model.children().iter().map(Model::node).collect()
}

/// Test that materializing an existing model hands back the same model.
#[test]
fn materialization_is_idempotent() {
    let engine = Engine::new();
    let model = engine
        .create_model(ElementData::new("div").child("a"))
        .unwrap();

    let again = engine.create_model(model.clone()).unwrap();
    let by_node = engine.create_model(Data::Node(model.node())).unwrap();

    assert!(again.ptr_eq(&model));
    assert!(by_node.ptr_eq(&model));
    assert_eq!(engine.document().node_count(), 2);
}

/// Test that content order equals live child order after every mutation.
#[test]
fn content_order_matches_live_order() {
    init_tracing();
    let engine = Engine::new();
    let list = engine
        .create_model(ElementData::new("ul").child("a").child("b").child("c"))
        .unwrap();
    let content = list.content_list().unwrap();

    let check = |list: &Model| assert_eq!(model_children(list), live_children(list));

    content.set(1, "x").unwrap();
    check(&list);
    content.insert(0, "y").unwrap();
    check(&list);
    content.splice(1, 2, ["p", "q", "r"]).unwrap();
    check(&list);
    content.delete(0).unwrap();
    check(&list);
    let last = content.get(content.len() - 1).unwrap();
    content.set(0, last).unwrap();
    check(&list);
    list.set_content(vec![Data::from("solo")]).unwrap();
    check(&list);
    content.push(ElementData::new("li")).unwrap();
    check(&list);

    assert_eq!(content.len(), 2);
}

/// Test that moving a model between parents never duplicates its node.
#[test]
fn moving_does_not_copy() {
    let engine = Engine::new();
    let left = engine
        .create_model(ElementData::new("div").child("a").child(ElementData::new("b")))
        .unwrap();
    let right = engine
        .create_model(ElementData::new("div").child("c"))
        .unwrap();
    let moved = left.children()[1].clone();
    let replaced = right.children()[0].clone();
    let before = engine.document().node_count();

    right.content_list().unwrap().set(0, moved.clone()).unwrap();

    let doc = engine.document();
    assert_eq!(doc.parent(moved.node()), Some(right.node()));
    assert_eq!(live_children(&right), vec![moved.node()]);
    // The only new node is the placeholder left behind.
    assert_eq!(doc.node_count(), before + 1);
    assert_eq!(left.text(), "aMOVED ELSEWHERE");
    assert_eq!(model_children(&left), live_children(&left));

    // The replaced child is freed once nothing refers to it.
    let replaced_node = replaced.node();
    drop(replaced);
    assert!(!doc.exists(replaced_node));
    assert_eq!(doc.node_count(), before);
}

/// Test that a duplicate reference name fails and leaves the first intact.
#[test]
fn reference_names_are_unique_per_owner() {
    let engine = Engine::new();
    let form = engine.create_model(ElementData::new("form")).unwrap();
    let owner = Owner::new();
    engine.resolve_refs(&owner, &form).unwrap();

    let content = form.content_list().unwrap();
    let first = content
        .push(ElementData::new("input").ref_name("email"))
        .unwrap();
    let err = content
        .push(ElementData::new("input").ref_name("email"))
        .unwrap_err();

    assert_eq!(
        err,
        Error::NameCollision {
            name: "email".into()
        }
    );
    assert!(owner.get("email").unwrap().ptr_eq(&first));
    assert_eq!(err.to_string(), "'email' already present on owner");
}

/// Test that a failed content assignment leaves the content absent.
#[test]
fn failed_content_assignment_leaves_content_absent() {
    let engine = Engine::new();
    let form = engine
        .create_model(ElementData::new("form").child("old"))
        .unwrap();
    let owner = Owner::new();
    engine.resolve_refs(&owner, &form).unwrap();
    let taken = engine
        .create_model(ElementData::new("input").ref_name("taken"))
        .unwrap();
    engine.resolve_refs(&owner, &taken).unwrap();

    let err = form
        .set_content(ElementData::new("input").ref_name("taken"))
        .unwrap_err();

    assert!(matches!(err, Error::NameCollision { .. }));
    assert!(form.content().is_none());
    assert!(live_children(&form).is_empty());
    assert!(owner.get("taken").unwrap().ptr_eq(&taken));
}

/// Test that outside removals and appends are folded back at the next tick.
#[test]
fn reverse_sync_reconciles_outside_edits() {
    init_tracing();
    let engine = Engine::new();
    let list = engine
        .create_model(
            ElementData::new("ul")
                .child(ElementData::new("li").ref_name("a"))
                .child(ElementData::new("li").ref_name("b")),
        )
        .unwrap();
    let owner = Owner::new();
    engine.resolve_refs(&owner, &list).unwrap();
    let a = owner.get("a").unwrap();
    let b = owner.get("b").unwrap();

    let doc = engine.document();
    let c = doc.create_element("li");
    doc.set_attribute(c, "data-ref", "c").unwrap();
    doc.remove(a.node()).unwrap();
    doc.append_child(list.node(), c).unwrap();

    // Nothing changes before the checkpoint.
    assert_eq!(list.children().len(), 2);
    assert!(owner.get("a").is_some());

    engine.tick();

    let children = list.children();
    assert_eq!(children.len(), 2);
    assert!(children[0].ptr_eq(&b));
    assert_eq!(children[1].node(), c);
    assert!(owner.get("a").is_none());
    assert!(a.owner().is_none());
    assert!(owner.get("c").unwrap().ptr_eq(&children[1]));
    assert!(!engine.is_managed(a.node()));
}

/// Test that outside inserts land next to their previous sibling's model.
#[test]
fn reverse_sync_places_inserts_by_previous_sibling() {
    let engine = Engine::new();
    let list = engine
        .create_model(ElementData::new("ol").child("1").child("3"))
        .unwrap();
    let doc = engine.document();
    let three = list.children()[1].node();

    let two = doc.create_text("2");
    doc.insert_before(list.node(), two, Some(three)).unwrap();
    let four = doc.create_text("4");
    doc.append_child(list.node(), four).unwrap();
    engine.tick();

    assert_eq!(model_children(&list), live_children(&list));
    assert_eq!(list.text(), "1234");
    assert!(matches!(list.content(), Some(Content::List(ref l)) if l.len() == 4));
}

/// Test that a named node moved by outside code between two managed parents
/// keeps its model and binding, whichever parent reconciles first.
#[test]
fn outside_moves_between_managed_parents_keep_bindings() {
    init_tracing();
    let engine = Engine::new();
    let page = engine
        .create_model(
            ElementData::new("main")
                .child(
                    ElementData::new("ul")
                        .ref_name("left")
                        .child(ElementData::new("li").ref_name("item").text("i"))
                        .child("a"),
                )
                .child(ElementData::new("ul").ref_name("right").child("b")),
        )
        .unwrap();
    let owner = Owner::new();
    engine.resolve_refs(&owner, &page).unwrap();
    let left = owner.get("left").unwrap();
    let right = owner.get("right").unwrap();
    let item = owner.get("item").unwrap();
    let doc = engine.document();

    // The losing parent's observer runs first.
    doc.append_child(right.node(), item.node()).unwrap();
    engine.tick();

    assert!(owner.get("item").unwrap().ptr_eq(&item));
    assert!(engine.is_managed(item.node()));
    assert!(right.children()[1].ptr_eq(&item));
    assert_eq!(left.text(), "a");
    assert_eq!(model_children(&left), live_children(&left));
    assert_eq!(model_children(&right), live_children(&right));

    // Moving back, the gaining parent's observer runs first.
    let first = left.children()[0].node();
    doc.insert_before(left.node(), item.node(), Some(first)).unwrap();
    engine.tick();

    assert!(owner.get("item").unwrap().ptr_eq(&item));
    assert!(item.owner().is_some_and(|o| o.ptr_eq(&owner)));
    assert!(left.children()[0].ptr_eq(&item));
    assert_eq!(right.text(), "b");
    assert_eq!(model_children(&left), live_children(&left));
    assert_eq!(model_children(&right), live_children(&right));
}

/// Test that replacing content over and over does not grow the document.
#[test]
fn repeated_content_replacement_keeps_the_document_bounded() {
    let engine = Engine::new();
    let list = engine.create_model(ElementData::new("ul")).unwrap();
    let doc = engine.document();

    let mut counts = Vec::new();
    for _ in 0..3 {
        for _ in 0..1000 {
            list.set_content(vec![Data::from("x"), Data::from("y")]).unwrap();
        }
        counts.push(doc.node_count());
    }

    assert_eq!(counts, vec![3, 3, 3]);
    assert_eq!(engine.managed_count(), 3);
}

/// Test that the engine's own mutations are never reconciled a second time.
#[test]
fn self_mutations_are_silent() {
    let engine = Engine::new();
    let list = engine
        .create_model(ElementData::new("ul").child("a").child("b"))
        .unwrap();
    let other = engine
        .create_model(ElementData::new("ul").child(ElementData::new("li")))
        .unwrap();

    list.set_content(vec![Data::from("x"), Data::from("y")]).unwrap();
    let content = list.content_list().unwrap();
    content.set(0, "z").unwrap();
    content.push(other.children()[0].clone()).unwrap();
    content.delete(1).unwrap();
    list.delete("content").unwrap();

    assert_eq!(engine.tick(), 0);
    assert_eq!(engine.reverse_sync_count(), 0);

    engine.document().append_child(list.node(), engine.document().create_text("outside")).unwrap();
    assert_eq!(engine.tick(), 1);
    assert_eq!(engine.reverse_sync_count(), 1);
}

/// Test that plain attributes round-trip through the bridge.
#[test]
fn attribute_round_trip() {
    let engine = Engine::new();
    let input = engine.create_model(ElementData::new("input")).unwrap();
    let doc = engine.document();

    input.set("placeholder", "Name").unwrap();
    assert_eq!(input.get("placeholder").as_str(), Some("Name"));

    input.set("required", true).unwrap();
    assert_eq!(input.get("required").as_str(), Some("true"));
    assert!(input.has("required"));

    input.set("tabindex", 3).unwrap();
    assert_eq!(input.get("tabindex").as_scalar(), Some(&Scalar::Num(3.0)));

    input.delete("placeholder").unwrap();
    input.delete("required").unwrap();
    assert!(input.get("placeholder").is_absent());
    assert!(!doc.has_attribute(input.node(), "required"));
    assert!(!input.has("required"));
}

/// Test that native methods never leak through a model.
#[test]
fn methods_are_not_exposed() {
    let engine = Engine::new();
    let model = engine.create_model(ElementData::new("div")).unwrap();

    for name in ["appendChild", "remove", "addEventListener", "click"] {
        assert!(model.get(name).is_absent(), "{name}");
        assert!(!model.has(name), "{name}");
    }
    assert!(model.has("on"));
    assert!(model.has("computedStyle"));
}

/// Test that binding a root gives dotted access to named descendants.
#[test]
fn root_binding_exposes_refs() {
    let engine = Engine::new();
    let doc = engine.document();
    let body = doc.create_element("body");
    let header = doc.create_element("header");
    let title = doc.create_element("h1");
    doc.set_attribute(title, "data-ref", "title").unwrap();
    doc.set_attribute(header, "data-ref", "header").unwrap();
    doc.append_child(header, title).unwrap();
    doc.append_child(body, header).unwrap();

    let root = engine.set_root(body).unwrap();
    let owner = engine.root_owner();

    assert_eq!(owner.names(), vec!["header", "title"]);
    let title_model = owner.get("title").unwrap();
    title_model.set_content("Welcome").unwrap();
    assert_eq!(root.text(), "Welcome");

    // Names added later through the model show up on the same owner.
    let header_model = owner.get("header").unwrap();
    header_model
        .content_list()
        .unwrap()
        .push(ElementData::new("nav").ref_name("nav"))
        .unwrap();
    assert!(owner.contains("nav"));
}

/// Test that handlers fire through the live node and can be swapped.
#[test]
fn handlers_drive_live_listeners() {
    let engine = Engine::new();
    let clicks = Arc::new(AtomicUsize::new(0));
    let seen = clicks.clone();
    let button = engine
        .create_model(ElementData::new("button").on(
            "click",
            Handler::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        ))
        .unwrap();
    let doc = engine.document();

    doc.dispatch_event(button.node(), "click").unwrap();
    assert_eq!(clicks.load(Ordering::SeqCst), 1);

    button.delete("on").unwrap();
    doc.dispatch_event(button.node(), "click").unwrap();
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
    assert!(matches!(button.get("on"), Value::Handlers(h) if h.is_empty()));
}

/// Test that components keep their inner names to themselves.
#[test]
fn components_are_opaque() {
    let engine = Engine::new();
    let card = engine
        .component(
            ElementData::new("article")
                .child(ElementData::new("h2").ref_name("heading"))
                .child(ElementData::new("p").ref_name("body")),
        )
        .unwrap();
    let page = engine.create_model(ElementData::new("main")).unwrap();
    let owner = Owner::new();
    engine.resolve_refs(&owner, &page).unwrap();

    page.set_content(vec![
        Data::component(&card, "card"),
        ElementData::new("footer").ref_name("footer").into(),
    ])
    .unwrap();

    assert_eq!(owner.names(), vec!["card", "footer"]);
    assert!(card.get("heading").is_some());

    // Outside edits inside the component resolve against its own owner.
    let doc = engine.document();
    let extra = doc.create_element("aside");
    doc.set_attribute(extra, "data-ref", "aside").unwrap();
    doc.append_child(card.model().node(), extra).unwrap();
    engine.tick();

    assert!(card.get("aside").is_some());
    assert!(owner.get("aside").is_none());
}

/// Test that declarative JSON descriptions materialize like builder data.
#[test]
fn json_descriptions_materialize() {
    let engine = Engine::new();
    let data = Data::from_json(&json!({
        "tag": "nav",
        "class": "top",
        "style": { "textAlign": "center" },
        "content": [
            { "tag": "a", "href": "/", "ref": "home", "content": "Home" },
            { "tag": "a", "href": "/about", "content": "About" }
        ]
    }))
    .unwrap();

    let nav = engine.create_model(data).unwrap();
    let owner = Owner::new();
    engine.resolve_refs(&owner, &nav).unwrap();

    assert_eq!(nav.text(), "HomeAbout");
    assert_eq!(nav.style().unwrap().get("text-align").as_deref(), Some("center"));
    assert_eq!(owner.get("home").unwrap().attr("href"), Some(Scalar::from("/")));

    let dump = nav.dump_json();
    assert_eq!(dump["content"][1]["attributes"]["href"], json!("/about"));
    assert_eq!(dump["style"]["text-align"], json!("center"));
}

/// Test that computed style cascades from ancestors.
#[test]
fn computed_style_inherits() {
    let engine = Engine::new();
    let section = engine
        .create_model(
            ElementData::new("section")
                .style("color", "navy")
                .style("margin", "4px")
                .child(ElementData::new("span")),
        )
        .unwrap();
    let span = section.children()[0].clone();

    let Value::ComputedStyle(style) = span.get("computedStyle") else {
        panic!("expected a computed style");
    };
    assert_eq!(style.get("display").map(String::as_str), Some("inline"));
    assert_eq!(style.get("color").map(String::as_str), Some("navy"));
    assert!(style.get("margin").is_none());
}
