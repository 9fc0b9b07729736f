//! Class Set
//!
//! A set-like view over the live node's class list. The view holds no state
//! of its own, so two views of the same model always agree with each other
//! and with the node.

use std::fmt;

use super::Model;
use crate::error::Result;

/// Live view over a model's class membership.
#[derive(Clone)]
pub struct ClassSet {
    model: Model,
}

impl ClassSet {
    pub(crate) fn new(model: Model) -> Self {
        Self { model }
    }

    pub fn has(&self, class: &str) -> bool {
        self.model.doc().has_class(self.model.node(), class)
    }

    /// Add one or more whitespace-separated class names.
    pub fn add(&self, classes: &str) -> Result<()> {
        for class in classes.split_whitespace() {
            self.model.doc().add_class(self.model.node(), class)?;
        }
        Ok(())
    }

    /// Remove a class. Returns whether it was present.
    pub fn delete(&self, class: &str) -> Result<bool> {
        Ok(self.model.doc().remove_class(self.model.node(), class)?)
    }

    /// Add the class when absent, remove it when present. Returns whether it
    /// is present afterwards.
    pub fn toggle(&self, class: &str) -> Result<bool> {
        if self.delete(class)? {
            Ok(false)
        } else {
            self.add(class)?;
            Ok(true)
        }
    }

    pub fn clear(&self) -> Result<()> {
        Ok(self.model.doc().remove_attribute(self.model.node(), "class")?)
    }

    pub fn len(&self) -> usize {
        self.to_vec().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.model.doc().class_list(self.model.node())
    }
}

impl fmt::Display for ClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_vec().join(" "))
    }
}

impl fmt::Debug for ClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.to_vec()).finish()
    }
}

/// A new value for a model's class list.
#[derive(Debug, Clone)]
pub enum ClassInput {
    /// Whitespace-separated class names.
    Text(String),
    List(Vec<String>),
    /// Another model's live class set; its current members are copied.
    Live(ClassSet),
}

impl ClassInput {
    pub(crate) fn items(&self) -> Vec<String> {
        match self {
            ClassInput::Text(text) => text.split_whitespace().map(str::to_string).collect(),
            ClassInput::List(list) => list.clone(),
            ClassInput::Live(set) => set.to_vec(),
        }
    }
}

impl From<&str> for ClassInput {
    fn from(value: &str) -> Self {
        ClassInput::Text(value.to_string())
    }
}

impl From<String> for ClassInput {
    fn from(value: String) -> Self {
        ClassInput::Text(value)
    }
}

impl From<Vec<String>> for ClassInput {
    fn from(value: Vec<String>) -> Self {
        ClassInput::List(value)
    }
}

impl From<Vec<&str>> for ClassInput {
    fn from(value: Vec<&str>) -> Self {
        ClassInput::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<ClassSet> for ClassInput {
    fn from(value: ClassSet) -> Self {
        ClassInput::Live(value)
    }
}

impl Model {
    /// The live class set, or `None` for text models.
    pub fn class(&self) -> Option<ClassSet> {
        self.is_element().then(|| ClassSet::new(self.clone()))
    }

    /// Clear the live class list and rebuild it from `input`.
    pub fn set_class(&self, input: impl Into<ClassInput>) -> Result<bool> {
        if !self.is_element() {
            return Ok(false);
        }
        // Read first: the input may be a view over this very model.
        let items = input.into().items();
        let set = ClassSet::new(self.clone());
        set.clear()?;
        for item in &items {
            set.add(item)?;
        }
        tracing::trace!(node = %self.node(), classes = items.len(), "class list replaced");
        Ok(true)
    }

    pub fn clear_class(&self) -> Result<bool> {
        if !self.is_element() {
            return Ok(false);
        }
        ClassSet::new(self.clone()).clear()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::ElementData;
    use crate::Engine;

    #[test]
    fn set_class_accepts_text_lists_and_live_sets() {
        let engine = Engine::new();
        let a = engine.create_model(ElementData::new("div").class("one two")).unwrap();
        let b = engine.create_model(ElementData::new("div")).unwrap();

        b.set("class", vec!["x", "y"]).unwrap();
        assert_eq!(b.class().unwrap().to_vec(), vec!["x", "y"]);

        b.set("class", a.class().unwrap()).unwrap();
        assert_eq!(b.class().unwrap().to_string(), "one two");
        assert_eq!(
            b.document().attribute(b.node(), "class").as_deref(),
            Some("one two")
        );
    }

    #[test]
    fn assigning_a_set_to_itself_keeps_its_members() {
        let engine = Engine::new();
        let model = engine.create_model(ElementData::new("div").class("a b")).unwrap();

        model.set_class(model.class().unwrap()).unwrap();
        assert_eq!(model.class().unwrap().to_vec(), vec!["a", "b"]);
    }

    #[test]
    fn delete_clears_the_live_attribute() {
        let engine = Engine::new();
        let model = engine.create_model(ElementData::new("div").class("a")).unwrap();
        let view = model.class().unwrap();

        assert!(model.delete("class").unwrap());
        assert!(view.is_empty());
        assert!(!model.document().has_attribute(model.node(), "class"));
    }

    #[test]
    fn toggle_flips_membership() {
        let engine = Engine::new();
        let model = engine.create_model(ElementData::new("div")).unwrap();
        let classes = model.class().unwrap();

        assert!(classes.toggle("open").unwrap());
        assert!(classes.has("open"));
        assert!(!classes.toggle("open").unwrap());
        assert!(!classes.has("open"));
    }
}
