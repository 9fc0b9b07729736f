//! Components
//!
//! A component pairs a model with a dedicated [`Owner`] for the named models
//! inside it. Embedded into another tree, the component is opaque: the outer
//! tree can name the component itself, but never sees its inner names.
//!
//! Components are only built through [`Engine::component`](crate::Engine::component)
//! or [`Component::adopt`]. The owner reserves the component's own member
//! names (`model`, `remove`), so an inner reference can never shadow them.

use std::fmt;
use std::sync::Arc;

use super::content::take_from_elsewhere;
use super::refs::{resolve, Owner};
use super::{materialize, Content, Data, Model};
use crate::engine::Shared;
use crate::error::{Error, Result};

const MEMBERS: &[&str] = &["model", "remove"];

#[derive(Clone)]
pub struct Component {
    model: Model,
    owner: Owner,
}

impl Component {
    pub(crate) fn build(shared: &Arc<Shared>, data: Data) -> Result<Self> {
        let model = materialize(shared, data)?;
        Self::adopt(model)
    }

    /// Wrap an existing element model.
    ///
    /// Fails with [`Error::IllegalConstruction`] when the model is already a
    /// component or is already bound into another owner's tree; nothing is
    /// linked in that case.
    pub fn adopt(model: Model) -> Result<Self> {
        if !model.is_element() {
            return Err(Error::IllegalConstruction(
                "components wrap element models".into(),
            ));
        }
        {
            let state = model.state().read();
            if state.component {
                return Err(Error::IllegalConstruction(
                    "model is already wrapped by a component".into(),
                ));
            }
            if state.binding.is_some() || state.owner.is_some() {
                return Err(Error::IllegalConstruction(
                    "model is already bound to an owner".into(),
                ));
            }
        }

        let owner = Owner::with_reserved(MEMBERS);
        model.state().write().component = true;
        if let Err(err) = resolve(&owner, &model, true) {
            model.state().write().component = false;
            return Err(err);
        }
        tracing::debug!(node = %model.node(), refs = owner.len(), "component built");
        Ok(Self { model, owner })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The owner holding the component's inner names.
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// An inner model by reference name.
    pub fn get(&self, name: &str) -> Option<Model> {
        self.owner.get(name)
    }

    /// Take the component out of wherever it is mounted.
    ///
    /// When the parent is a managed model, the parent's content is updated
    /// in the same call; otherwise the node is simply detached.
    pub fn remove(&self) -> Result<()> {
        let Some(parent) = self.model.parent() else {
            if self.model.doc().parent(self.model.node()).is_some() {
                self.model.doc().remove(self.model.node())?;
            }
            return Ok(());
        };
        match parent.content() {
            Some(Content::Single(child)) if child.ptr_eq(&self.model) => {
                parent.delete_content()?;
            }
            Some(Content::List(list)) => {
                if let Some(index) = list.position(&self.model) {
                    list.delete(index)?;
                }
            }
            _ => take_from_elsewhere(&self.model)?,
        }
        Ok(())
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("model", &self.model)
            .field("owner", &self.owner)
            .finish()
    }
}
