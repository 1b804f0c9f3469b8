//! Component factories
//!
//! A factory owns, for one component type, the prototype instance of every
//! archetype that uses it, plus the raw JSON each prototype was loaded from.
//! Live components are always clones of a prototype.

use std::collections::HashMap;
use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::ecs::{Component, ComponentId, ComponentType, EditorInput};
use crate::error::{EngineError, EngineResult};

/// JSON and editor capabilities of a concrete component type
///
/// Every method has a default. A type without a loader cannot appear in
/// archetype files; a type without a serializer round-trips through the JSON
/// it was last loaded from.
pub trait JsonComponent: ComponentType {
    /// Parse the component, applying a default for every missing field
    fn load_from_json(archetype: &str, json: &Value) -> EngineResult<Self> {
        let _ = json;
        Err(EngineError::NotImplemented(format!(
            "{} has no JSON loader (archetype {archetype})",
            Self::NAME
        )))
    }

    /// Serialize the component, or `None` when the type has no serializer
    fn save_to_json(&self) -> Option<Value> {
        None
    }

    /// Apply editor input to the fields; returns whether anything changed
    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let _ = input;
        false
    }
}

/// Type-erased factory for one component type
pub trait ComponentFactory {
    /// Registry name of the produced type
    fn component_name(&self) -> &'static str;

    /// Identifier of the produced type
    fn component_id(&self) -> ComponentId {
        ComponentId::of_name(self.component_name())
    }

    /// Parse a new component; nothing is stored
    fn load_from_json(&self, archetype: &str, json: &Value) -> EngineResult<Box<dyn Component>>;

    /// Store a first-time prototype for `archetype`
    fn add_component(&mut self, archetype: &str, component: Box<dyn Component>) -> EngineResult<()>;

    /// Replace the prototype of `archetype` with a clone of `component`
    fn save(&mut self, archetype: &str, component: &dyn Component) -> EngineResult<()>;

    /// Serialize `component`, or the stored prototype when `None`
    ///
    /// The result is written into `target`, or into the cached JSON of the
    /// archetype when no target is given. Types without a serializer log a
    /// warning and return the cached JSON unchanged.
    fn save_to_json(
        &mut self,
        archetype: &str,
        component: Option<&dyn Component>,
        target: Option<&mut Value>,
    ) -> EngineResult<Value>;

    /// Drop the prototype of `archetype`
    fn remove(&mut self, archetype: &str) -> Option<Box<dyn Component>>;

    /// Clone the prototype of `archetype`
    fn clone_prototype(&self, archetype: &str) -> EngineResult<Box<dyn Component>>;

    /// Route a live component's fields through the editor
    fn update_editor(&self, component: &mut dyn Component, input: &mut dyn EditorInput) -> EngineResult<bool>;

    /// Remember the JSON a prototype was loaded from
    fn cache_json(&mut self, archetype: &str, json: Value);

    /// Whether `archetype` has a prototype of this type
    fn has_prototype(&self, archetype: &str) -> bool;

    /// Borrow the prototype of `archetype`
    fn prototype(&self, archetype: &str) -> Option<&dyn Component>;
}

/// Generic factory for any [`JsonComponent`]
pub struct BaseComponentFactory<T> {
    prototypes: HashMap<String, Box<dyn Component>>,
    last_loaded_json: HashMap<String, Value>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for BaseComponentFactory<T> {
    fn default() -> Self {
        Self {
            prototypes: HashMap::new(),
            last_loaded_json: HashMap::new(),
            _marker: PhantomData,
        }
    }
}

impl<T: JsonComponent> BaseComponentFactory<T> {
    /// Empty factory
    pub fn new() -> Self {
        Self::default()
    }

    fn check_type(component: &dyn Component) -> EngineResult<&T> {
        component.downcast_ref::<T>().ok_or_else(|| {
            EngineError::internal(format!(
                "Factory {} received a {}",
                T::NAME,
                component.name()
            ))
        })
    }
}

impl<T: JsonComponent> ComponentFactory for BaseComponentFactory<T> {
    fn component_name(&self) -> &'static str {
        T::NAME
    }

    fn load_from_json(&self, archetype: &str, json: &Value) -> EngineResult<Box<dyn Component>> {
        Ok(Box::new(T::load_from_json(archetype, json)?))
    }

    fn add_component(&mut self, archetype: &str, component: Box<dyn Component>) -> EngineResult<()> {
        Self::check_type(component.as_ref())?;
        self.prototypes.insert(archetype.to_string(), component);
        Ok(())
    }

    fn save(&mut self, archetype: &str, component: &dyn Component) -> EngineResult<()> {
        let typed = Self::check_type(component)?;
        self.prototypes
            .insert(archetype.to_string(), Box::new(typed.clone()));
        Ok(())
    }

    fn save_to_json(
        &mut self,
        archetype: &str,
        component: Option<&dyn Component>,
        target: Option<&mut Value>,
    ) -> EngineResult<Value> {
        let json = {
            let component = match component {
                Some(component) => component,
                None => self.prototypes.get(archetype).map(|prototype| &**prototype).ok_or_else(|| {
                    EngineError::invalid(format!("No {} prototype for {archetype}", T::NAME))
                })?,
            };
            Self::check_type(component)?.save_to_json()
        };

        match json {
            Some(json) => {
                match target {
                    Some(target) => *target = json.clone(),
                    None => {
                        self.last_loaded_json
                            .insert(archetype.to_string(), json.clone());
                    }
                }
                Ok(json)
            }
            None => {
                log::warn!(
                    "{} has no JSON serializer, saving the last loaded JSON for {archetype}",
                    T::NAME
                );
                Ok(self
                    .last_loaded_json
                    .get(archetype)
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new())))
            }
        }
    }

    fn remove(&mut self, archetype: &str) -> Option<Box<dyn Component>> {
        self.last_loaded_json.remove(archetype);
        self.prototypes.remove(archetype)
    }

    fn clone_prototype(&self, archetype: &str) -> EngineResult<Box<dyn Component>> {
        self.prototypes
            .get(archetype)
            .map(|prototype| prototype.clone_component())
            .ok_or_else(|| EngineError::invalid(format!("No {} prototype for {archetype}", T::NAME)))
    }

    fn update_editor(&self, component: &mut dyn Component, input: &mut dyn EditorInput) -> EngineResult<bool> {
        let name = component.name();
        let typed = component.downcast_mut::<T>().ok_or_else(|| {
            EngineError::internal(format!("Factory {} received a {name}", T::NAME))
        })?;
        Ok(typed.update_editor(input))
    }

    fn cache_json(&mut self, archetype: &str, json: Value) {
        self.last_loaded_json.insert(archetype.to_string(), json);
    }

    fn has_prototype(&self, archetype: &str) -> bool {
        self.prototypes.contains_key(archetype)
    }

    fn prototype(&self, archetype: &str) -> Option<&dyn Component> {
        self.prototypes.get(archetype).map(|prototype| &**prototype)
    }
}
