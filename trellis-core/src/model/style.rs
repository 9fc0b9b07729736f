//! Style View
//!
//! A map-like view over the live node's inline style. Names may be given in
//! camel case (`fontSize`) or dashed form (`font-size`); the node always
//! stores the dashed form.

use std::fmt;

use indexmap::IndexMap;

use super::Model;
use crate::dom::parse_css_text;
use crate::error::Result;

/// Live view over a model's inline style.
#[derive(Clone)]
pub struct StyleView {
    model: Model,
}

impl StyleView {
    pub(crate) fn new(model: Model) -> Self {
        Self { model }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.model.doc().style_property(self.model.node(), name)
    }

    /// Set a declaration. An empty value removes it.
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        Ok(self
            .model
            .doc()
            .set_style_property(self.model.node(), name, value)?)
    }

    /// Remove a declaration, returning its previous value.
    pub fn remove(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .model
            .doc()
            .remove_style_property(self.model.node(), name)?)
    }

    pub fn clear(&self) -> Result<()> {
        Ok(self.model.doc().remove_attribute(self.model.node(), "style")?)
    }

    /// Declarations in source order.
    pub fn entries(&self) -> IndexMap<String, String> {
        self.model.doc().style(self.model.node())
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The inline style serialized as a declaration block.
    pub fn css_text(&self) -> String {
        self.model
            .doc()
            .attribute(self.model.node(), "style")
            .unwrap_or_default()
    }
}

impl fmt::Display for StyleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css_text())
    }
}

impl fmt::Debug for StyleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

/// A new value for a model's inline style.
#[derive(Debug, Clone)]
pub enum StyleInput {
    /// A `name: value; ...` declaration block.
    Text(String),
    Map(IndexMap<String, String>),
    /// Another model's live style; its current declarations are copied.
    Live(StyleView),
}

impl StyleInput {
    pub(crate) fn declarations(&self) -> IndexMap<String, String> {
        match self {
            StyleInput::Text(text) => parse_css_text(text).into_iter().collect(),
            StyleInput::Map(map) => map.clone(),
            StyleInput::Live(view) => view.entries(),
        }
    }
}

impl From<&str> for StyleInput {
    fn from(value: &str) -> Self {
        StyleInput::Text(value.to_string())
    }
}

impl From<String> for StyleInput {
    fn from(value: String) -> Self {
        StyleInput::Text(value)
    }
}

impl From<IndexMap<String, String>> for StyleInput {
    fn from(value: IndexMap<String, String>) -> Self {
        StyleInput::Map(value)
    }
}

impl From<Vec<(&str, &str)>> for StyleInput {
    fn from(value: Vec<(&str, &str)>) -> Self {
        StyleInput::Map(
            value
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        )
    }
}

impl From<StyleView> for StyleInput {
    fn from(value: StyleView) -> Self {
        StyleInput::Live(value)
    }
}

impl Model {
    /// The live inline style, or `None` for text models.
    pub fn style(&self) -> Option<StyleView> {
        self.is_element().then(|| StyleView::new(self.clone()))
    }

    /// Clear the inline style and rebuild it from `input`.
    pub fn set_style(&self, input: impl Into<StyleInput>) -> Result<bool> {
        if !self.is_element() {
            return Ok(false);
        }
        let declarations = input.into().declarations();
        let view = StyleView::new(self.clone());
        view.clear()?;
        for (name, value) in &declarations {
            view.set(name, value)?;
        }
        tracing::trace!(node = %self.node(), declarations = declarations.len(), "style replaced");
        Ok(true)
    }

    pub fn clear_style(&self) -> Result<bool> {
        if !self.is_element() {
            return Ok(false);
        }
        StyleView::new(self.clone()).clear()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementData;
    use crate::Engine;

    #[test]
    fn names_are_normalized() {
        let engine = Engine::new();
        let model = engine
            .create_model(ElementData::new("div").style("fontSize", "12px"))
            .unwrap();
        let style = model.style().unwrap();

        assert_eq!(style.get("font-size").as_deref(), Some("12px"));
        assert_eq!(style.get("fontSize").as_deref(), Some("12px"));
        assert_eq!(style.css_text(), "font-size: 12px;");
    }

    #[test]
    fn set_style_replaces_every_declaration() {
        let engine = Engine::new();
        let model = engine
            .create_model(ElementData::new("div").style("color", "red"))
            .unwrap();

        model
            .set_style(vec![("margin", "0"), ("paddingTop", "4px")])
            .unwrap();

        let entries = model.style().unwrap().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.get("padding-top").map(String::as_str), Some("4px"));
        assert!(entries.get("color").is_none());
    }

    #[test]
    fn copying_from_another_view() {
        let engine = Engine::new();
        let source = engine
            .create_model(ElementData::new("p").styles("color: green; margin: 1px"))
            .unwrap();
        let target = engine.create_model(ElementData::new("p")).unwrap();

        target.set("style", source.style().unwrap()).unwrap();
        assert_eq!(target.style().unwrap().entries(), source.style().unwrap().entries());
    }

    #[test]
    fn delete_clears_the_live_attribute() {
        let engine = Engine::new();
        let model = engine
            .create_model(ElementData::new("p").style("color", "red"))
            .unwrap();

        model.delete("style").unwrap();
        assert!(model.style().unwrap().is_empty());
        assert!(!model.document().has_attribute(model.node(), "style"));
    }
}
