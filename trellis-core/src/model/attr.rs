//! Attribute Bridge
//!
//! A live node can hold a plain value in two places: as a typed property or
//! as a string attribute. The bridge presents both as one slot.
//!
//! - Read: the typed property wins; a native method reads as absent; failing
//!   both, the string attribute is returned.
//! - Write: a falsy value deletes; `true` becomes the attribute `"true"`;
//!   anything else is stored as a typed property.
//! - Delete: the typed property is nulled out and the attribute removed.

use super::Model;
use crate::dom::{HostProperty, Scalar};
use crate::error::Result;

impl Model {
    /// Read a plain attribute through the bridge.
    pub fn attr(&self, name: &str) -> Option<Scalar> {
        let node = self.node();
        match self.doc().property(node, name) {
            Some(HostProperty::Value(value)) => Some(value),
            Some(HostProperty::Method) => None,
            None => self.doc().attribute(node, name).map(Scalar::Str),
        }
    }

    /// Write a plain attribute through the bridge.
    ///
    /// Returns `Ok(false)` when the host refuses the name (read-only
    /// built-ins and native methods).
    pub fn set_attr(&self, name: &str, value: impl Into<Scalar>) -> Result<bool> {
        let value = value.into();
        if value.is_falsy() {
            return self.remove_attr(name);
        }
        let node = self.node();
        tracing::trace!(%node, name, value = %value, "attribute set");
        match value {
            Scalar::Bool(true) => {
                if !self.is_element() || !self.doc().set_property(node, name, None)? {
                    return Ok(false);
                }
                self.doc().set_attribute(node, name, "true")?;
                Ok(true)
            }
            value => Ok(self.doc().set_property(node, name, Some(value))?),
        }
    }

    /// Remove a plain attribute from both storage locations.
    pub fn remove_attr(&self, name: &str) -> Result<bool> {
        let node = self.node();
        let nulled = self.doc().set_property(node, name, None)?;
        if !nulled {
            return Ok(false);
        }
        if self.is_element() {
            self.doc().remove_attribute(node, name)?;
        }
        tracing::trace!(%node, name, "attribute removed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::Scalar;
    use crate::model::ElementData;
    use crate::Engine;

    #[test]
    fn string_values_round_trip_as_properties() {
        let engine = Engine::new();
        let model = engine.create_model(ElementData::new("a")).unwrap();

        assert!(model.set_attr("href", "/docs").unwrap());
        assert_eq!(model.attr("href"), Some(Scalar::from("/docs")));
        assert_eq!(model.document().attribute(model.node(), "href"), None);
    }

    #[test]
    fn true_is_stored_as_an_attribute() {
        let engine = Engine::new();
        let model = engine.create_model(ElementData::new("input")).unwrap();

        assert!(model.set_attr("disabled", true).unwrap());
        assert_eq!(
            model.document().attribute(model.node(), "disabled").as_deref(),
            Some("true")
        );
        assert_eq!(model.attr("disabled"), Some(Scalar::from("true")));
    }

    #[test]
    fn falsy_values_delete_both_locations() {
        let engine = Engine::new();
        let model = engine.create_model(ElementData::new("input")).unwrap();
        let doc = model.document();
        doc.set_attribute(model.node(), "title", "raw").unwrap();
        model.set_attr("value", "typed").unwrap();

        model.set_attr("title", false).unwrap();
        model.set_attr("value", "").unwrap();

        assert_eq!(model.attr("title"), None);
        assert_eq!(model.attr("value"), None);
        assert!(!doc.has_attribute(model.node(), "title"));
    }

    #[test]
    fn builtins_are_readable_but_not_writable() {
        let engine = Engine::new();
        let model = engine
            .create_model(ElementData::new("p").text("hello"))
            .unwrap();

        assert_eq!(model.attr("textContent"), Some(Scalar::from("hello")));
        assert_eq!(model.attr("tagName"), Some(Scalar::from("P")));
        assert!(!model.set_attr("textContent", "nope").unwrap());
        assert!(!model.remove_attr("tagName").unwrap());
        assert_eq!(model.text(), "hello");
    }
}
