//! Entity implementation

use super::component::{Component, ComponentId, ComponentType};
use crate::foundation::collections::EntityHandle;

/// A live entity: a handle, a tag and at most one component per type
#[derive(Debug, Clone)]
pub struct Entity {
    handle: EntityHandle,
    tag: String,
    components: Vec<Box<dyn Component>>,
}

impl Entity {
    /// Create an empty entity with the given handle
    pub(super) fn new(handle: EntityHandle) -> Self {
        Self {
            handle,
            tag: String::new(),
            components: Vec::new(),
        }
    }

    /// Get the entity handle
    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    /// Get the entity tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Set the entity tag
    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    /// Attach a component, replacing any existing component of the same type
    ///
    /// Returns the replaced component, if any.
    pub fn add_component(&mut self, component: Box<dyn Component>) -> Option<Box<dyn Component>> {
        let id = component.id();
        match self.components.iter_mut().find(|c| c.id() == id) {
            Some(slot) => Some(std::mem::replace(slot, component)),
            None => {
                self.components.push(component);
                None
            }
        }
    }

    /// Attach a concrete component
    pub fn insert<T: ComponentType>(&mut self, component: T) -> Option<Box<dyn Component>> {
        self.add_component(Box::new(component))
    }

    /// Detach a component by type id
    pub fn remove_component(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        let index = self.components.iter().position(|c| c.id() == id)?;
        Some(self.components.remove(index))
    }

    /// Check whether a component type is attached
    pub fn has_component(&self, id: ComponentId) -> bool {
        self.components.iter().any(|c| c.id() == id)
    }

    /// Check whether a concrete component type is attached
    pub fn has<T: ComponentType>(&self) -> bool {
        self.has_component(T::component_id())
    }

    /// Get a component by type id
    pub fn get_by_id(&self, id: ComponentId) -> Option<&(dyn Component + 'static)> {
        self.components
            .iter()
            .find(|c| c.id() == id)
            .map(|c| &**c)
    }

    /// Get a component by type id, mutably
    pub fn get_by_id_mut(&mut self, id: ComponentId) -> Option<&mut (dyn Component + 'static)> {
        self.components
            .iter_mut()
            .find(|c| c.id() == id)
            .map(|c| &mut **c)
    }

    /// Get a concrete component
    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.get_by_id(T::component_id())?.downcast_ref::<T>()
    }

    /// Get a concrete component, mutably
    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.get_by_id_mut(T::component_id())?.downcast_mut::<T>()
    }

    /// All attached components in attachment order
    pub fn components(&self) -> &[Box<dyn Component>] {
        &self.components
    }

    /// Ids of all attached components
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.components.iter().map(|c| c.id()).collect()
    }

    /// Drop every component whose id fails the predicate
    pub fn retain_components(&mut self, mut keep: impl FnMut(ComponentId) -> bool) {
        self.components.retain(|c| keep(c.id()));
    }
}
