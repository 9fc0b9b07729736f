//! Reference Resolver
//!
//! Named descendants are exposed on an [`Owner`]: looking a name up returns
//! the model currently carrying it, never a snapshot.
//!
//! # How Resolution Works
//!
//! 1. The content tree is walked in tree order, collecting every model that
//!    carries a reference name. The walk does not descend into component
//!    roots: a component's descendants belong to the component's own owner.
//!
//! 2. Every collected name is checked against the owner, the owner's
//!    reserved member names, and the other names in the batch. Any clash
//!    fails the whole batch with [`Error::NameCollision`] before anything is
//!    installed.
//!
//! 3. Models that are still bound somewhere else are unbound first, then
//!    every name is installed.
//!
//! Release is the inverse: a model's binding is revoked, then its content
//! is released recursively. The engine always releases before it removes a
//! live node, so an owner never exposes a node that has left the tree.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::{Model, ModelInner};
use crate::config::EngineConfig;
use crate::error::{Error, Result};

struct OwnerInner {
    /// Member names of the owner itself; never available to references.
    reserved: Vec<String>,
    refs: RwLock<IndexMap<String, Weak<ModelInner>>>,
}

/// An object exposing named descendant models.
///
/// Clones share the same set of names.
#[derive(Clone)]
pub struct Owner(Arc<OwnerInner>);

impl Owner {
    pub fn new() -> Self {
        Self::with_reserved(&[])
    }

    pub(crate) fn with_reserved(names: &[&str]) -> Self {
        Self(Arc::new(OwnerInner {
            reserved: names.iter().map(|name| name.to_string()).collect(),
            refs: RwLock::new(IndexMap::new()),
        }))
    }

    /// The model currently installed under `name`.
    pub fn get(&self, name: &str) -> Option<Model> {
        let inner = self.0.refs.read().get(name)?.upgrade()?;
        Some(Model { inner })
    }

    /// Whether `name` is taken, either by a reference or by a member.
    pub fn contains(&self, name: &str) -> bool {
        self.0.reserved.iter().any(|r| r == name) || self.get(name).is_some()
    }

    /// Installed reference names, in installation order.
    pub fn names(&self) -> Vec<String> {
        self.0
            .refs
            .read()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ptr_eq(&self, other: &Owner) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn is_taken(&self, refs: &IndexMap<String, Weak<ModelInner>>, name: &str) -> bool {
        self.0.reserved.iter().any(|r| r == name)
            || refs.get(name).is_some_and(|weak| weak.strong_count() > 0)
    }
}

impl Default for Owner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owner").field("refs", &self.names()).finish()
    }
}

/// Check a reference name against the identifier pattern
/// `[A-Za-z_$][A-Za-z0-9_$]*`, when validation is enabled.
pub(crate) fn validate_name(config: &EngineConfig, name: &str) -> Result<()> {
    if !config.validate_ref_names {
        return Ok(());
    }
    let mut chars = name.chars();
    let head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    if head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        Ok(())
    } else {
        Err(Error::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Models found while walking a subtree.
#[derive(Default)]
struct Walk {
    named: Vec<(Model, String)>,
    entered: Vec<Model>,
}

impl Walk {
    fn visit(&mut self, model: &Model, is_start: bool, enter_component: bool) {
        let entering_component = is_start && enter_component && model.is_component();
        if !entering_component {
            if let Some(name) = model.ref_name() {
                self.named.push((model.clone(), name));
            }
        }
        if model.is_component() && !entering_component {
            return;
        }
        self.entered.push(model.clone());
        for child in model.children() {
            self.visit(&child, false, false);
        }
    }
}

fn is_bound_to(model: &Model, owner: &Owner, name: &str) -> bool {
    matches!(
        &model.state().read().binding,
        Some((bound, bound_name)) if bound.ptr_eq(owner) && bound_name == name
    )
}

/// Install the names under `model` on `owner`.
///
/// With `enter_component`, a component root passed as `model` is walked
/// into (its own name is left alone); otherwise component roots contribute
/// their name and are not walked.
pub(crate) fn resolve(owner: &Owner, model: &Model, enter_component: bool) -> Result<()> {
    resolve_all(owner, std::slice::from_ref(model), enter_component)
}

/// Install the names under every model in `models`, all or nothing.
pub(crate) fn resolve_all(owner: &Owner, models: &[Model], enter_component: bool) -> Result<()> {
    let mut walk = Walk::default();
    for model in models {
        walk.visit(model, true, enter_component);
    }

    let pending: Vec<(Model, String)> = walk
        .named
        .into_iter()
        .filter(|(model, name)| !is_bound_to(model, owner, name))
        .collect();

    {
        let refs = owner.0.refs.read();
        let mut batch = HashSet::new();
        for (_, name) in &pending {
            if owner.is_taken(&refs, name) || !batch.insert(name.as_str()) {
                tracing::debug!(name = name.as_str(), "reference collision");
                return Err(Error::NameCollision { name: name.clone() });
            }
        }
    }

    for (model, _) in &pending {
        unbind(model);
    }
    {
        let mut refs = owner.0.refs.write();
        // Entries of models dropped without a release.
        refs.retain(|_, weak| weak.strong_count() > 0);
        for (model, name) in &pending {
            refs.insert(name.clone(), Arc::downgrade(&model.inner));
        }
    }
    for (model, name) in &pending {
        model.state().write().binding = Some((owner.clone(), name.clone()));
        tracing::debug!(name = name.as_str(), node = %model.node(), "reference installed");
    }
    for model in &walk.entered {
        model.state().write().owner = Some(owner.clone());
    }
    Ok(())
}

/// Revoke the binding of `model` and of everything in its content.
pub(crate) fn release(model: &Model) {
    unbind(model);
    if model.is_component() {
        return;
    }
    model.state().write().owner = None;
    for child in model.children() {
        release(&child);
    }
}

/// Revoke `model`'s own binding, if any.
fn unbind(model: &Model) {
    let binding = model.state().write().binding.take();
    let Some((owner, name)) = binding else {
        return;
    };
    let mut refs = owner.0.refs.write();
    let current = refs
        .get(&name)
        .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), Arc::as_ptr(&model.inner)));
    if current {
        refs.shift_remove(&name);
        tracing::debug!(name = name.as_str(), node = %model.node(), "reference removed");
    }
}
