//! # Component Type Registry
//!
//! Maps component type names, as written in archetype files, to the factory
//! that loads, clones and serializes that type. The registry is built once at
//! startup and injected into the archetype catalog.

pub mod factory;

use std::collections::HashMap;

use serde_json::Value;

use crate::components;
use crate::ecs::{Component, ComponentId};
use crate::error::{EngineError, EngineResult};

pub use factory::{BaseComponentFactory, ComponentFactory, JsonComponent};

/// Name to factory table with a reverse id index
#[derive(Default)]
pub struct ComponentTypeRegistry {
    factories: HashMap<&'static str, Box<dyn ComponentFactory>>,
    names: HashMap<ComponentId, &'static str>,
    order: Vec<&'static str>,
}

impl std::fmt::Debug for ComponentTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentTypeRegistry")
            .field("types", &self.order)
            .finish()
    }
}

impl ComponentTypeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every engine component type
    pub fn with_engine_components() -> EngineResult<Self> {
        let mut registry = Self::new();
        components::register_engine_components(&mut registry)?;
        Ok(registry)
    }

    /// Register a factory under its component name
    ///
    /// Registering the same name twice is a programming error and fails.
    pub fn register_type(&mut self, factory: Box<dyn ComponentFactory>) -> EngineResult<()> {
        let name = factory.component_name();
        if self.factories.contains_key(name) {
            return Err(EngineError::invalid(format!(
                "Component type {name} is already registered"
            )));
        }
        self.names.insert(factory.component_id(), name);
        self.factories.insert(name, factory);
        self.order.push(name);
        log::debug!("Registered component type {name}");
        Ok(())
    }

    /// Register the generic factory of `T`
    pub fn register<T: JsonComponent>(&mut self) -> EngineResult<()> {
        self.register_type(Box::new(BaseComponentFactory::<T>::new()))
    }

    /// Whether a type name is known
    pub fn type_exists(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Factory of a type name
    pub fn get_factory(&self, name: &str) -> EngineResult<&dyn ComponentFactory> {
        self.factories
            .get(name)
            .map(|factory| &**factory)
            .ok_or_else(|| EngineError::invalid(format!("Unknown component type {name}")))
    }

    /// Factory of a type name, mutably
    pub fn get_factory_mut(&mut self, name: &str) -> EngineResult<&mut dyn ComponentFactory> {
        match self.factories.get_mut(name) {
            Some(factory) => Ok(&mut **factory),
            None => Err(EngineError::invalid(format!("Unknown component type {name}"))),
        }
    }

    /// Type name of a component id
    pub fn hash_to_name(&self, id: ComponentId) -> Option<&'static str> {
        self.names.get(&id).copied()
    }

    /// Component id of a registered type name
    pub fn name_to_hash(&self, name: &str) -> Option<ComponentId> {
        self.factories.get(name).map(|factory| factory.component_id())
    }

    /// Registered type names in registration order
    pub fn type_names(&self) -> &[&'static str] {
        &self.order
    }

    /// Load a component of `name` for `archetype`, store it as the prototype
    /// and cache the JSON it came from
    pub fn init_component(&mut self, archetype: &str, name: &str, json: &Value) -> EngineResult<()> {
        let factory = self.get_factory_mut(name)?;
        let component = factory
            .load_from_json(archetype, json)
            .map_err(|e| EngineError::internal(format!("Failed to load {name} for {archetype}: {e}")))?;
        factory.add_component(archetype, component)?;
        factory.cache_json(archetype, json.clone());
        Ok(())
    }

    /// Clone the prototype of `name` stored for `archetype`
    pub fn create_component(&self, archetype: &str, name: &str) -> EngineResult<Box<dyn Component>> {
        self.get_factory(name)?.clone_prototype(archetype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{NameComponent, TransformComponent};
    use crate::ecs::ComponentType;
    use serde_json::json;

    #[derive(Debug, Clone)]
    struct Unloadable;

    impl ComponentType for Unloadable {
        const NAME: &'static str = "sUnloadableComponent";
    }

    impl JsonComponent for Unloadable {}

    #[test]
    fn test_engine_types_registered() {
        let registry = ComponentTypeRegistry::with_engine_components().unwrap();
        for name in ["sNameComponent", "sTransformComponent", "sRenderComponent", "sDynamicComponent"] {
            assert!(registry.type_exists(name), "{name}");
        }
        assert!(!registry.type_exists("sPositionComponent"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ComponentTypeRegistry::new();
        registry.register::<NameComponent>().unwrap();
        assert!(registry.register::<NameComponent>().is_err());
    }

    #[test]
    fn test_unknown_factory_is_invalid_parameters() {
        let registry = ComponentTypeRegistry::new();
        assert!(matches!(
            registry.get_factory("sGhostComponent"),
            Err(EngineError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_hash_name_lookup_both_ways() {
        let mut registry = ComponentTypeRegistry::new();
        registry.register::<TransformComponent>().unwrap();
        let id = TransformComponent::component_id();
        assert_eq!(registry.name_to_hash("sTransformComponent"), Some(id));
        assert_eq!(registry.hash_to_name(id), Some("sTransformComponent"));
        assert_eq!(registry.hash_to_name(ComponentId::of_name("nope")), None);
    }

    #[test]
    fn test_init_then_create_clones_prototype() {
        let mut registry = ComponentTypeRegistry::new();
        registry.register::<NameComponent>().unwrap();
        registry
            .init_component("Tower", "sNameComponent", &json!({"name": "Tower"}))
            .unwrap();
        let a = registry.create_component("Tower", "sNameComponent").unwrap();
        let b = registry.create_component("Tower", "sNameComponent").unwrap();
        assert_eq!(a.downcast_ref::<NameComponent>().unwrap().value, "Tower");
        assert_eq!(b.downcast_ref::<NameComponent>().unwrap().value, "Tower");
    }

    #[test]
    fn test_init_failure_names_type_and_archetype() {
        let mut registry = ComponentTypeRegistry::new();
        registry.register::<Unloadable>().unwrap();
        let err = registry
            .init_component("Enemy", "sUnloadableComponent", &json!({}))
            .unwrap_err();
        assert!(matches!(err, EngineError::InternalError(_)));
        let message = err.to_string();
        assert!(message.contains("sUnloadableComponent"));
        assert!(message.contains("Enemy"));
    }
}
