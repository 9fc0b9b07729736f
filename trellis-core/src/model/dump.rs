//! Debug dump of model state.
//!
//! A dump is a plain, serializable snapshot for inspection: attributes,
//! handler names, classes, computed style and recursively dumped content.
//! It is not a persistence format and cannot be loaded back.

use indexmap::IndexMap;
use serde::Serialize;

use super::{Content, Model};
use crate::dom::Scalar;

/// Snapshot of one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModelDump {
    Text {
        text: String,
    },
    Element {
        tag: String,
        #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
        ref_name: Option<String>,
        attributes: IndexMap<String, Scalar>,
        on: Vec<String>,
        class: Vec<String>,
        style: IndexMap<String, String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<ContentDump>,
    },
}

/// Snapshot of a model's content, keeping its shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContentDump {
    Single(Box<ModelDump>),
    List(Vec<ModelDump>),
}

impl Model {
    /// Snapshot this model and its content.
    pub fn dump(&self) -> ModelDump {
        let Some(tag) = self.tag() else {
            return ModelDump::Text { text: self.text() };
        };
        let doc = self.doc();
        let node = self.node();

        let mut attributes: IndexMap<String, Scalar> = doc
            .attributes(node)
            .into_iter()
            .filter(|(name, _)| name != "class" && name != "style")
            .map(|(name, value)| (name, Scalar::Str(value)))
            .collect();
        attributes.extend(doc.properties(node));

        let content = self.content().map(|content| match content {
            Content::Single(child) => ContentDump::Single(Box::new(child.dump())),
            Content::List(list) => ContentDump::List(list.iter().map(|m| m.dump()).collect()),
        });

        ModelDump::Element {
            tag: tag.to_string(),
            ref_name: self.ref_name(),
            attributes,
            on: self.on().map(|on| on.names()).unwrap_or_default(),
            class: doc.class_list(node),
            style: self.computed_style(),
            content,
        }
    }

    /// The dump as a JSON value.
    pub fn dump_json(&self) -> serde_json::Value {
        serde_json::to_value(self.dump()).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::Handler;
    use crate::model::ElementData;
    use crate::Engine;
    use serde_json::json;

    #[test]
    fn dump_shows_live_state() {
        let engine = Engine::new();
        let model = engine
            .create_model(
                ElementData::new("p")
                    .ref_name("para")
                    .attr("title", "hi")
                    .class("lead")
                    .style("color", "red")
                    .on("click", Handler::new(|_| {}))
                    .child("one")
                    .child(ElementData::new("b").text("two")),
            )
            .unwrap();

        let dump = model.dump_json();
        assert_eq!(dump["tag"], json!("p"));
        assert_eq!(dump["ref"], json!("para"));
        assert_eq!(dump["attributes"], json!({ "title": "hi" }));
        assert_eq!(dump["on"], json!(["click"]));
        assert_eq!(dump["class"], json!(["lead"]));
        assert_eq!(dump["style"]["display"], json!("block"));
        assert_eq!(dump["style"]["color"], json!("red"));
        assert_eq!(dump["content"][0], json!({ "text": "one" }));
        assert_eq!(dump["content"][1]["content"], json!({ "text": "two" }));
    }

    #[test]
    fn dump_is_reachable_through_get() {
        let engine = Engine::new();
        let model = engine.create_model(ElementData::new("span")).unwrap();
        let crate::Value::Dump(dump) = model.get("dump") else {
            panic!("expected a dump");
        };
        assert_eq!(dump["tag"], json!("span"));
        assert!(dump.get("content").is_none());
        assert!(dump.get("ref").is_none());
    }
}
