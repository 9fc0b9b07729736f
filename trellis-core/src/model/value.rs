//! Property names and the values flowing through a model's dynamic surface.

use indexmap::IndexMap;

use super::classes::{ClassInput, ClassSet};
use super::content::Content;
use super::data::ContentData;
use super::handlers::Handlers;
use super::refs::Owner;
use super::style::{StyleInput, StyleView};
use super::Model;
use crate::dom::{Handler, Scalar};

/// A property name, classified for dispatch.
///
/// Structural names route to specialised logic; everything else is a plain
/// attribute handled by the attribute bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property<'a> {
    Tag,
    On,
    Class,
    Style,
    Content,
    ComputedStyle,
    Text,
    Parent,
    Owner,
    Ref,
    Dump,
    Attr(&'a str),
}

impl<'a> Property<'a> {
    pub fn parse(name: &'a str) -> Self {
        match name {
            "tag" => Property::Tag,
            "on" => Property::On,
            "class" => Property::Class,
            "style" => Property::Style,
            "content" => Property::Content,
            "computedStyle" => Property::ComputedStyle,
            "text" => Property::Text,
            "parent" => Property::Parent,
            "owner" => Property::Owner,
            "ref" => Property::Ref,
            "dump" => Property::Dump,
            other => Property::Attr(other),
        }
    }

    pub fn is_structural(&self) -> bool {
        !matches!(self, Property::Attr(_))
    }
}

/// The result of reading a property through [`Model::get`](super::Model::get).
#[derive(Debug, Clone)]
pub enum Value {
    /// Nothing there, or a native method that is never exposed.
    Absent,
    Scalar(Scalar),
    Handlers(Handlers),
    Classes(ClassSet),
    Style(StyleView),
    Content(Content),
    ComputedStyle(IndexMap<String, String>),
    Model(Model),
    Owner(Owner),
    Dump(serde_json::Value),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The string payload of a scalar string value.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }
}

/// A value written through [`Model::set`](super::Model::set).
#[derive(Debug, Clone)]
pub enum Assign {
    Scalar(Scalar),
    Handlers(IndexMap<String, Handler>),
    Class(ClassInput),
    Style(StyleInput),
    Content(ContentData),
}

impl Assign {
    /// Wrap anything convertible to content data.
    pub fn content(data: impl Into<ContentData>) -> Self {
        Assign::Content(data.into())
    }
}

impl From<Scalar> for Assign {
    fn from(value: Scalar) -> Self {
        Assign::Scalar(value)
    }
}

impl From<&str> for Assign {
    fn from(value: &str) -> Self {
        Assign::Scalar(value.into())
    }
}

impl From<String> for Assign {
    fn from(value: String) -> Self {
        Assign::Scalar(value.into())
    }
}

impl From<bool> for Assign {
    fn from(value: bool) -> Self {
        Assign::Scalar(value.into())
    }
}

impl From<f64> for Assign {
    fn from(value: f64) -> Self {
        Assign::Scalar(value.into())
    }
}

impl From<i32> for Assign {
    fn from(value: i32) -> Self {
        Assign::Scalar(value.into())
    }
}

impl From<IndexMap<String, Handler>> for Assign {
    fn from(value: IndexMap<String, Handler>) -> Self {
        Assign::Handlers(value)
    }
}

impl From<Handlers> for Assign {
    fn from(value: Handlers) -> Self {
        Assign::Handlers(value.to_map())
    }
}

impl From<ClassInput> for Assign {
    fn from(value: ClassInput) -> Self {
        Assign::Class(value)
    }
}

impl From<ClassSet> for Assign {
    fn from(value: ClassSet) -> Self {
        Assign::Class(ClassInput::Live(value))
    }
}

impl From<Vec<&str>> for Assign {
    fn from(value: Vec<&str>) -> Self {
        Assign::Class(value.into())
    }
}

impl From<StyleInput> for Assign {
    fn from(value: StyleInput) -> Self {
        Assign::Style(value)
    }
}

impl From<StyleView> for Assign {
    fn from(value: StyleView) -> Self {
        Assign::Style(StyleInput::Live(value))
    }
}

impl From<ContentData> for Assign {
    fn from(value: ContentData) -> Self {
        Assign::Content(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_names_are_recognised() {
        for name in [
            "tag",
            "on",
            "class",
            "style",
            "content",
            "computedStyle",
            "text",
            "parent",
            "owner",
            "ref",
            "dump",
        ] {
            assert!(Property::parse(name).is_structural(), "{name}");
        }
        assert_eq!(Property::parse("title"), Property::Attr("title"));
        assert_eq!(Property::parse("Tag"), Property::Attr("Tag"));
    }
}
