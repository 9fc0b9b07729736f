//! Handler Set
//!
//! One handler per event name. Every change is applied to the live node
//! immediately: replacing a handler removes the old listener before the new
//! one is added, so a node never runs two handlers for the same name.

use std::fmt;

use indexmap::IndexMap;

use super::Model;
use crate::dom::Handler;
use crate::error::Result;

/// Live view over a model's event handlers.
#[derive(Clone)]
pub struct Handlers {
    model: Model,
}

impl Handlers {
    pub(crate) fn new(model: Model) -> Self {
        Self { model }
    }

    pub fn get(&self, event: &str) -> Option<Handler> {
        self.model.state().read().handlers.get(event).cloned()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.model.state().read().handlers.contains_key(event)
    }

    /// Install `handler` for `event`, detaching the one it replaces.
    pub fn set(&self, event: &str, handler: Handler) -> Result<()> {
        let previous = self
            .model
            .state()
            .write()
            .handlers
            .insert(event.to_string(), handler.clone());

        let doc = self.model.doc();
        let node = self.model.node();
        if let Some(previous) = previous {
            doc.remove_listener(node, event, &previous)?;
        }
        doc.add_listener(node, event, handler)?;
        tracing::trace!(%node, event, "handler installed");
        Ok(())
    }

    /// Detach the handler for `event`. Returns whether one was installed.
    pub fn delete(&self, event: &str) -> Result<bool> {
        let previous = self.model.state().write().handlers.shift_remove(event);
        match previous {
            Some(previous) => {
                self.model
                    .doc()
                    .remove_listener(self.model.node(), event, &previous)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Detach every handler.
    pub fn clear(&self) -> Result<()> {
        let previous = std::mem::take(&mut self.model.state().write().handlers);
        detach_all(&self.model, &previous)
    }

    /// Event names with a handler, in installation order.
    pub fn names(&self) -> Vec<String> {
        self.model.state().read().handlers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.model.state().read().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A plain copy of the current handler map.
    pub fn to_map(&self) -> IndexMap<String, Handler> {
        self.model.state().read().handlers.clone()
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

fn detach_all(model: &Model, handlers: &IndexMap<String, Handler>) -> Result<()> {
    for (event, handler) in handlers {
        model.doc().remove_listener(model.node(), event, handler)?;
    }
    Ok(())
}

impl Model {
    /// The live handler set, or `None` for text models.
    pub fn on(&self) -> Option<Handlers> {
        self.is_element().then(|| Handlers::new(self.clone()))
    }

    /// Replace every handler: old listeners are detached, then the new map
    /// is installed and retained.
    pub fn set_on(&self, handlers: IndexMap<String, Handler>) -> Result<bool> {
        if !self.is_element() {
            return Ok(false);
        }
        let previous = std::mem::replace(&mut self.state().write().handlers, handlers.clone());
        detach_all(self, &previous)?;
        for (event, handler) in handlers {
            self.doc().add_listener(self.node(), &event, handler)?;
        }
        tracing::trace!(node = %self.node(), "handlers replaced");
        Ok(true)
    }

    /// Detach every handler and reset to an empty map.
    pub fn clear_on(&self) -> Result<bool> {
        if !self.is_element() {
            return Ok(false);
        }
        Handlers::new(self.clone()).clear()?;
        Ok(true)
    }
}
