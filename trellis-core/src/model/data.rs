//! Plain data describing a node before it is materialized.
//!
//! Callers describe nodes with [`Data`]: a scalar becomes a text model, an
//! [`ElementData`] becomes an element model, and values that are already
//! live (a [`Model`], a raw [`NodeId`], a [`Component`]) pass through
//! materialization without being wrapped twice.

use indexmap::IndexMap;
use serde_json::Value as Json;

use super::classes::ClassInput;
use super::component::Component;
use super::style::StyleInput;
use super::Model;
use crate::dom::{Handler, NodeId, Scalar};
use crate::error::{Error, Result};

/// Input to materialization.
#[derive(Debug, Clone)]
pub enum Data {
    /// Text content. Numbers and booleans arrive here already rendered.
    Text(String),
    Element(ElementData),
    /// An existing model; materializing it is a no-op.
    Model(Model),
    /// A native node; materializing it wraps (or looks up) its model.
    Node(NodeId),
    /// A component embedded as an opaque child, optionally named.
    Component {
        component: Component,
        ref_name: Option<String>,
    },
}

impl Data {
    /// Embed a component under a reference name.
    pub fn component(component: &Component, ref_name: impl Into<String>) -> Self {
        Data::Component {
            component: component.clone(),
            ref_name: Some(ref_name.into()),
        }
    }

    /// Build data from a declarative JSON description.
    ///
    /// Strings, numbers and booleans become text. Objects either carry a
    /// `text` key or a `tag` key; `ref`, `class`, `style` and `content` are
    /// structural, every other key is an attribute. Handlers cannot be
    /// described in JSON, so an `on` key is rejected.
    pub fn from_json(json: &Json) -> Result<Self> {
        match json {
            Json::String(s) => Ok(Data::Text(s.clone())),
            Json::Bool(b) => Ok(Data::Text(b.to_string())),
            Json::Number(n) => Ok(Data::Text(n.to_string())),
            Json::Object(map) => {
                if let Some(text) = map.get("text") {
                    return match scalar_from_json(text) {
                        Some(s) => Ok(Data::Text(s.to_text())),
                        None => Err(Error::InvalidData("`text` must be a scalar".into())),
                    };
                }
                let tag = map
                    .get("tag")
                    .and_then(Json::as_str)
                    .ok_or_else(|| Error::InvalidData("element description needs a `tag`".into()))?;
                let mut element = ElementData::new(tag);
                for (key, value) in map {
                    match key.as_str() {
                        "tag" => {}
                        "ref" => {
                            let name = value.as_str().ok_or_else(|| {
                                Error::InvalidData("`ref` must be a string".into())
                            })?;
                            element = element.ref_name(name);
                        }
                        "on" => {
                            return Err(Error::InvalidData(
                                "handlers cannot be described in JSON".into(),
                            ))
                        }
                        "class" => element = element.class(class_from_json(value)?),
                        "style" => element = element.styles(style_from_json(value)?),
                        "content" => element = element.content(ContentData::from_json(value)?),
                        _ if value.is_null() => {}
                        _ => {
                            let scalar = scalar_from_json(value).ok_or_else(|| {
                                Error::InvalidData(format!("attribute `{}` must be a scalar", key))
                            })?;
                            element = element.attr(key, scalar);
                        }
                    }
                }
                Ok(Data::Element(element))
            }
            Json::Null | Json::Array(_) => Err(Error::InvalidData(
                "a node must be a scalar or an object".into(),
            )),
        }
    }
}

fn scalar_from_json(json: &Json) -> Option<Scalar> {
    match json {
        Json::String(s) => Some(Scalar::Str(s.clone())),
        Json::Bool(b) => Some(Scalar::Bool(*b)),
        Json::Number(n) => n.as_f64().map(Scalar::Num),
        _ => None,
    }
}

fn class_from_json(json: &Json) -> Result<ClassInput> {
    match json {
        Json::String(s) => Ok(ClassInput::Text(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Error::InvalidData("class names must be strings".into()))
            })
            .collect::<Result<Vec<_>>>()
            .map(ClassInput::List),
        _ => Err(Error::InvalidData("`class` must be a string or a list".into())),
    }
}

fn style_from_json(json: &Json) -> Result<StyleInput> {
    match json {
        Json::String(s) => Ok(StyleInput::Text(s.clone())),
        Json::Object(map) => {
            let mut decls = IndexMap::new();
            for (name, value) in map {
                let value = scalar_from_json(value).ok_or_else(|| {
                    Error::InvalidData(format!("style `{}` must be a scalar", name))
                })?;
                decls.insert(name.clone(), value.to_text());
            }
            Ok(StyleInput::Map(decls))
        }
        _ => Err(Error::InvalidData("`style` must be a string or an object".into())),
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Data::Text(value.to_string())
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Data::Text(value)
    }
}

impl From<Scalar> for Data {
    fn from(value: Scalar) -> Self {
        Data::Text(value.to_text())
    }
}

impl From<bool> for Data {
    fn from(value: bool) -> Self {
        Data::Text(value.to_string())
    }
}

impl From<i32> for Data {
    fn from(value: i32) -> Self {
        Data::Text(value.to_string())
    }
}

impl From<f64> for Data {
    fn from(value: f64) -> Self {
        Data::Text(Scalar::Num(value).to_text())
    }
}

impl From<ElementData> for Data {
    fn from(value: ElementData) -> Self {
        Data::Element(value)
    }
}

impl From<Model> for Data {
    fn from(value: Model) -> Self {
        Data::Model(value)
    }
}

impl From<&Model> for Data {
    fn from(value: &Model) -> Self {
        Data::Model(value.clone())
    }
}

impl From<NodeId> for Data {
    fn from(value: NodeId) -> Self {
        Data::Node(value)
    }
}

impl From<Component> for Data {
    fn from(component: Component) -> Self {
        Data::Component {
            component,
            ref_name: None,
        }
    }
}

/// Description of an element model.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub(crate) tag: String,
    pub(crate) ref_name: Option<String>,
    pub(crate) attrs: IndexMap<String, Scalar>,
    pub(crate) on: IndexMap<String, Handler>,
    pub(crate) class: Option<ClassInput>,
    pub(crate) style: Option<StyleInput>,
    pub(crate) content: Option<ContentData>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ref_name: None,
            attrs: IndexMap::new(),
            on: IndexMap::new(),
            class: None,
            style: None,
            content: None,
        }
    }

    /// Name this node; the name becomes an accessor on the tree's owner.
    pub fn ref_name(mut self, name: impl Into<String>) -> Self {
        self.ref_name = Some(name.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn on(mut self, event: impl Into<String>, handler: Handler) -> Self {
        self.on.insert(event.into(), handler);
        self
    }

    pub fn class(mut self, class: impl Into<ClassInput>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Add one inline declaration.
    pub fn style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut decls = match self.style.take() {
            Some(StyleInput::Map(map)) => map,
            Some(other) => other.declarations(),
            None => IndexMap::new(),
        };
        decls.insert(name.into(), value.into());
        self.style = Some(StyleInput::Map(decls));
        self
    }

    /// Replace all inline declarations.
    pub fn styles(mut self, style: impl Into<StyleInput>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Append a child, turning the content into a sequence.
    pub fn child(mut self, child: impl Into<Data>) -> Self {
        let child = child.into();
        self.content = Some(match self.content.take() {
            None => ContentData::List(vec![child]),
            Some(ContentData::Single(first)) => ContentData::List(vec![*first, child]),
            Some(ContentData::List(mut items)) => {
                items.push(child);
                ContentData::List(items)
            }
        });
        self
    }

    /// Set the content as a whole.
    pub fn content(mut self, content: impl Into<ContentData>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set a single text child.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.content(ContentData::Single(Box::new(Data::Text(text.into()))))
    }
}

/// Description of a model's content: one child, or an ordered sequence.
#[derive(Debug, Clone)]
pub enum ContentData {
    Single(Box<Data>),
    List(Vec<Data>),
}

impl ContentData {
    pub fn from_json(json: &Json) -> Result<Self> {
        match json {
            Json::Array(items) => items
                .iter()
                .map(Data::from_json)
                .collect::<Result<Vec<_>>>()
                .map(ContentData::List),
            other => Data::from_json(other).map(|d| ContentData::Single(Box::new(d))),
        }
    }
}

impl From<Data> for ContentData {
    fn from(value: Data) -> Self {
        ContentData::Single(Box::new(value))
    }
}

impl From<Vec<Data>> for ContentData {
    fn from(value: Vec<Data>) -> Self {
        ContentData::List(value)
    }
}

impl From<&str> for ContentData {
    fn from(value: &str) -> Self {
        Data::from(value).into()
    }
}

impl From<String> for ContentData {
    fn from(value: String) -> Self {
        Data::from(value).into()
    }
}

impl From<ElementData> for ContentData {
    fn from(value: ElementData) -> Self {
        Data::from(value).into()
    }
}

impl From<Model> for ContentData {
    fn from(value: Model) -> Self {
        Data::from(value).into()
    }
}

impl From<&Model> for ContentData {
    fn from(value: &Model) -> Self {
        Data::from(value).into()
    }
}

impl From<Vec<Model>> for ContentData {
    fn from(value: Vec<Model>) -> Self {
        ContentData::List(value.into_iter().map(Data::Model).collect())
    }
}
