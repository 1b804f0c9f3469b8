//! Entity manager
//!
//! Owns every live [`Entity`] in a slot map. Systems register the component
//! types they depend on; once an entity is announced with
//! [`EntityManager::notify_entity_created`] it joins the entity list of every
//! system whose dependencies it satisfies.

use std::collections::HashMap;

use slotmap::{SecondaryMap, SlotMap};

use super::component::{ComponentId, ComponentType};
use super::entity::Entity;
use crate::foundation::collections::EntityHandle;

#[derive(Debug, Default)]
struct SystemEntities {
    dependencies: Vec<ComponentId>,
    entities: Vec<EntityHandle>,
}

/// Live entity storage plus system membership tracking
#[derive(Debug, Default)]
pub struct EntityManager {
    entities: SlotMap<EntityHandle, Entity>,
    announced: SecondaryMap<EntityHandle, ()>,
    systems: HashMap<String, SystemEntities>,
}

impl EntityManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new empty entity
    pub fn create_entity(&mut self) -> EntityHandle {
        self.entities.insert_with_key(Entity::new)
    }

    /// Get an entity
    pub fn get_entity(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entities.get(handle)
    }

    /// Get an entity mutably
    pub fn get_entity_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.entities.get_mut(handle)
    }

    /// First entity carrying the given tag
    pub fn entity_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.entities.values().find(|e| e.tag() == tag)
    }

    /// Destroy an entity, freeing its components and releasing its handle
    pub fn destroy_entity(&mut self, handle: EntityHandle) -> bool {
        if self.entities.remove(handle).is_none() {
            return false;
        }
        self.announced.remove(handle);
        for system in self.systems.values_mut() {
            system.entities.retain(|&e| e != handle);
        }
        true
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether there are no live entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over live entities
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Iterate over live entities mutably
    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Handles of all live entities
    pub fn handles(&self) -> Vec<EntityHandle> {
        self.entities.keys().collect()
    }

    /// Handles of live entities carrying component `T`
    pub fn handles_with<T: ComponentType>(&self) -> Vec<EntityHandle> {
        self.entities
            .iter()
            .filter(|(_, e)| e.has::<T>())
            .map(|(h, _)| h)
            .collect()
    }

    /// Register a system and the component types it requires
    ///
    /// Already announced entities matching the dependencies are added at once.
    pub fn register_system(&mut self, name: impl Into<String>, dependencies: Vec<ComponentId>) {
        let entities = self
            .entities
            .iter()
            .filter(|(h, _)| self.announced.contains_key(*h))
            .filter(|(_, e)| dependencies.iter().all(|&id| e.has_component(id)))
            .map(|(h, _)| h)
            .collect();
        self.systems
            .insert(name.into(), SystemEntities { dependencies, entities });
    }

    /// Whether the entity was announced to systems
    pub fn is_announced(&self, handle: EntityHandle) -> bool {
        self.announced.contains_key(handle)
    }

    /// Announce a fully built entity to the registered systems
    ///
    /// Calling it again after the entity's components changed refreshes its
    /// system memberships.
    pub fn notify_entity_created(&mut self, handle: EntityHandle) {
        let Some(entity) = self.entities.get(handle) else {
            log::warn!("notify_entity_created called for a dead entity {handle:?}");
            return;
        };
        self.announced.insert(handle, ());
        for (name, system) in &mut self.systems {
            let matches = system.dependencies.iter().all(|&id| entity.has_component(id));
            let present = system.entities.contains(&handle);
            if matches && !present {
                log::debug!("Entity {handle:?} joins system {name}");
                system.entities.push(handle);
            } else if !matches && present {
                system.entities.retain(|&e| e != handle);
            }
        }
    }

    /// Entities currently tracked by a system
    pub fn entities_for_system(&self, name: &str) -> &[EntityHandle] {
        self.systems
            .get(name)
            .map_or(&[][..], |system| system.entities.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Body;

    impl ComponentType for Body {
        const NAME: &'static str = "sBodyComponent";
    }

    #[derive(Debug, Clone)]
    struct Sprite;

    impl ComponentType for Sprite {
        const NAME: &'static str = "sSpriteComponent";
    }

    #[test]
    fn test_create_and_destroy() {
        let mut em = EntityManager::new();
        let a = em.create_entity();
        let b = em.create_entity();
        assert_eq!(em.len(), 2);
        assert_eq!(em.get_entity(a).unwrap().handle(), a);

        assert!(em.destroy_entity(a));
        assert!(!em.destroy_entity(a));
        assert!(em.get_entity(a).is_none());
        assert!(em.get_entity(b).is_some());
    }

    #[test]
    fn test_system_membership_on_notify() {
        let mut em = EntityManager::new();
        em.register_system("render", vec![Body::component_id(), Sprite::component_id()]);

        let full = em.create_entity();
        em.get_entity_mut(full).unwrap().insert(Body);
        em.get_entity_mut(full).unwrap().insert(Sprite);
        let partial = em.create_entity();
        em.get_entity_mut(partial).unwrap().insert(Body);

        assert!(em.entities_for_system("render").is_empty());
        em.notify_entity_created(full);
        em.notify_entity_created(partial);
        assert_eq!(em.entities_for_system("render"), &[full]);

        em.destroy_entity(full);
        assert!(em.entities_for_system("render").is_empty());
    }

    #[test]
    fn test_late_registration_picks_up_existing() {
        let mut em = EntityManager::new();
        let e = em.create_entity();
        em.get_entity_mut(e).unwrap().insert(Body);
        let silent = em.create_entity();
        em.get_entity_mut(silent).unwrap().insert(Body);
        em.notify_entity_created(e);
        em.register_system("physics", vec![Body::component_id()]);
        assert_eq!(em.entities_for_system("physics"), &[e]);
        assert!(em.entities_for_system("unknown").is_empty());
    }

    #[test]
    fn test_entity_by_tag() {
        let mut em = EntityManager::new();
        let e = em.create_entity();
        em.get_entity_mut(e).unwrap().set_tag("plane");
        assert_eq!(em.entity_by_tag("plane").map(Entity::handle), Some(e));
        assert!(em.entity_by_tag("missing").is_none());
    }
}
