//! # Archetype Catalog
//!
//! Archetype files describe one entity kind each:
//!
//! ```json
//! { "name": "Tower", "tag": "tower", "components": { "sNameComponent": {}, ... } }
//! ```
//!
//! Loading a directory stores one prototype per (archetype, component type)
//! in the injected [`ComponentTypeRegistry`]. Instantiating an archetype
//! clones those prototypes into a new entity. Editor changes on a live entity
//! flow back through [`ArchetypeCatalog::save_entity_template`], which
//! updates the prototypes and every sibling entity of the same archetype.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use super::bindings::{init_animations, reverse_animations};
use crate::components::{NameComponent, RenderComponent, TransformComponent};
use crate::ecs::{Component, ComponentId, ComponentType, Entity, EntityManager};
use crate::error::{EngineError, EngineResult};
use crate::foundation::collections::EntityHandle;
use crate::foundation::json::JsonExt;
use crate::foundation::math::Vec3;
use crate::registry::ComponentTypeRegistry;

/// Component list and tag of one archetype
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchetypeInfo {
    /// Component type names in declaration order
    pub components: Vec<String>,
    /// Tag applied to every instance
    pub tag: String,
}

/// Archetype name to component list, plus the file each came from
#[derive(Debug)]
pub struct ArchetypeCatalog {
    registry: ComponentTypeRegistry,
    archetypes: HashMap<String, ArchetypeInfo>,
    order: Vec<String>,
    files: HashMap<String, PathBuf>,
    per_instance: Vec<ComponentId>,
}

impl ArchetypeCatalog {
    /// Empty catalog over a registry of component types
    pub fn new(registry: ComponentTypeRegistry) -> Self {
        Self {
            registry,
            archetypes: HashMap::new(),
            order: Vec::new(),
            files: HashMap::new(),
            per_instance: Vec::new(),
        }
    }

    /// Component type registry
    pub fn registry(&self) -> &ComponentTypeRegistry {
        &self.registry
    }

    /// Component type registry, mutably
    pub fn registry_mut(&mut self) -> &mut ComponentTypeRegistry {
        &mut self.registry
    }

    /// Never propagate components of type `T` between siblings
    pub fn mark_per_instance<T: ComponentType>(&mut self) {
        let id = T::component_id();
        if !self.per_instance.contains(&id) {
            self.per_instance.push(id);
        }
    }

    /// Load every `.json` archetype under `dir`, recursively
    ///
    /// Any malformed file aborts the whole load. Returns the number of
    /// archetypes loaded.
    pub fn load_directory(&mut self, dir: impl AsRef<Path>) -> EngineResult<usize> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(EngineError::FileNotFound(dir.to_path_buf()));
        }

        let mut entries = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();

        let mut loaded = 0;
        for path in entries {
            if path.is_dir() {
                loaded += self.load_directory(&path)?;
            } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
                self.load_file(&path)?;
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    fn load_file(&mut self, path: &Path) -> EngineResult<()> {
        let contents = fs::read_to_string(path)?;
        let parsed: Value = serde_json::from_str(&contents)
            .map_err(|e| EngineError::internal(format!("Cannot parse archetype {}: {e}", path.display())))?;

        let name = parsed.get_string("name", "");
        if name.is_empty() {
            return Err(EngineError::invalid(format!("Archetype {} has no name", path.display())));
        }
        if self.archetypes.contains_key(&name) {
            return Err(EngineError::invalid(format!(
                "Archetype {name} in {} is already defined",
                path.display()
            )));
        }
        log::info!("Load entity {name}");

        let mut info = ArchetypeInfo {
            components: Vec::new(),
            tag: parsed.get_string("tag", ""),
        };
        if let Some(components) = parsed.get_object("components").as_object() {
            for (type_name, fields) in components {
                if !self.registry.type_exists(type_name) {
                    log::warn!("{name}: unknown component type {type_name}, skipped");
                    continue;
                }
                log::debug!("Add {name} component {type_name}");
                self.registry.init_component(&name, type_name, fields)?;
                info.components.push(type_name.clone());
            }
        }

        if !info.components.iter().any(|c| c == NameComponent::NAME) {
            return Err(EngineError::invalid(format!(
                "Archetype {name} in {} does not declare {}",
                path.display(),
                NameComponent::NAME
            )));
        }
        if !info.components.iter().any(|c| c == TransformComponent::NAME) {
            self.registry.init_component(&name, TransformComponent::NAME, &json!({}))?;
            info.components.push(TransformComponent::NAME.to_string());
        }

        self.files.insert(name.clone(), path.to_path_buf());
        self.order.push(name.clone());
        self.archetypes.insert(name, info);
        Ok(())
    }

    /// Whether an archetype is loaded
    pub fn type_exists(&self, archetype: &str) -> bool {
        self.archetypes.contains_key(archetype)
    }

    /// Loaded archetype names in load order
    pub fn archetype_names(&self) -> &[String] {
        &self.order
    }

    fn info(&self, archetype: &str) -> EngineResult<&ArchetypeInfo> {
        self.archetypes
            .get(archetype)
            .ok_or_else(|| EngineError::invalid(format!("The entity type {archetype} does not exist")))
    }

    fn info_mut(&mut self, archetype: &str) -> EngineResult<&mut ArchetypeInfo> {
        self.archetypes
            .get_mut(archetype)
            .ok_or_else(|| EngineError::invalid(format!("The entity type {archetype} does not exist")))
    }

    /// Component type names of an archetype
    pub fn components(&self, archetype: &str) -> EngineResult<&[String]> {
        Ok(&self.info(archetype)?.components)
    }

    /// Tag of an archetype
    pub fn tag(&self, archetype: &str) -> EngineResult<&str> {
        Ok(&self.info(archetype)?.tag)
    }

    /// Change the tag applied to new instances
    pub fn set_tag(&mut self, archetype: &str, tag: impl Into<String>) -> EngineResult<()> {
        self.info_mut(archetype)?.tag = tag.into();
        Ok(())
    }

    /// File an archetype was loaded from or will be saved to
    pub fn file(&self, archetype: &str) -> Option<&Path> {
        self.files.get(archetype).map(PathBuf::as_path)
    }

    /// Append a component type to an archetype
    ///
    /// A prototype with default fields is created when none exists yet.
    pub fn add_component(&mut self, archetype: &str, type_name: &str) -> EngineResult<()> {
        if !self.registry.type_exists(type_name) {
            return Err(EngineError::invalid(format!("Unknown component type {type_name}")));
        }
        if self.info(archetype)?.components.iter().any(|c| c == type_name) {
            return Ok(());
        }
        if !self.registry.get_factory(type_name)?.has_prototype(archetype) {
            self.registry.init_component(archetype, type_name, &json!({}))?;
        }
        self.info_mut(archetype)?.components.push(type_name.to_string());
        Ok(())
    }

    /// Drop a component type from an archetype and its prototype store
    pub fn remove_component(&mut self, archetype: &str, type_name: &str) -> EngineResult<()> {
        let info = self.info_mut(archetype)?;
        let Some(index) = info.components.iter().position(|c| c == type_name) else {
            return Ok(());
        };
        info.components.remove(index);
        self.registry.get_factory_mut(type_name)?.remove(archetype);
        Ok(())
    }

    /// Instantiate an archetype
    ///
    /// Every prototype is cloned onto a fresh entity, the tag is applied and
    /// the transform moved to `position` when given. With `store` the entity
    /// is announced to the registered systems.
    pub fn create_entity(
        &self,
        em: &mut EntityManager,
        archetype: &str,
        position: Option<Vec3>,
        store: bool,
    ) -> EngineResult<EntityHandle> {
        let info = self.info(archetype)?;
        let components = info
            .components
            .iter()
            .map(|type_name| self.registry.create_component(archetype, type_name))
            .collect::<EngineResult<Vec<_>>>()?;

        let handle = em.create_entity();
        let entity = em
            .get_entity_mut(handle)
            .ok_or_else(|| EngineError::internal("Freshly created entity is missing"))?;
        for component in components {
            entity.add_component(component);
        }
        entity.insert(NameComponent::new(archetype));
        entity.set_tag(info.tag.clone());
        if let (Some(position), Some(transform)) = (position, entity.get_mut::<TransformComponent>()) {
            transform.pos = position;
        }
        init_animations(entity);

        if store {
            em.notify_entity_created(handle);
        }
        Ok(handle)
    }

    /// First live entity of an archetype, created when there is none
    pub fn create_or_get_entity(&self, em: &mut EntityManager, archetype: &str) -> EngineResult<EntityHandle> {
        let existing = em
            .entities()
            .find(|e| e.get::<NameComponent>().is_some_and(|n| n.value == archetype))
            .map(Entity::handle);
        match existing {
            Some(handle) => Ok(handle),
            None => self.create_entity(em, archetype, None, true),
        }
    }

    /// Register a new archetype with a name and a default transform
    ///
    /// Its file is `<dir>/<lowercased name>.json`; the file is written and
    /// one instance is created for editing.
    pub fn create_entity_type(
        &mut self,
        em: &mut EntityManager,
        archetype: &str,
        dir: impl AsRef<Path>,
    ) -> EngineResult<EntityHandle> {
        if self.type_exists(archetype) {
            return Err(EngineError::invalid(format!("The entity type {archetype} already exists")));
        }
        let path = dir.as_ref().join(format!("{}.json", archetype.to_lowercase()));

        self.registry
            .init_component(archetype, NameComponent::NAME, &json!({ "name": archetype }))?;
        self.registry
            .init_component(archetype, TransformComponent::NAME, &json!({}))?;
        self.archetypes.insert(
            archetype.to_string(),
            ArchetypeInfo {
                components: vec![NameComponent::NAME.to_string(), TransformComponent::NAME.to_string()],
                tag: String::new(),
            },
        );
        self.files.insert(archetype.to_string(), path);
        self.order.push(archetype.to_string());

        self.save_entity_template_to_json(archetype)?;
        self.create_entity(em, archetype, None, true)
    }

    /// Commit a live entity's components back to its archetype
    ///
    /// Component types the entity no longer carries are dropped from the
    /// archetype. Every carried component replaces its prototype and is
    /// pushed to the other live entities of the archetype: missing components
    /// are cloned onto them, existing ones are overwritten, except transforms
    /// which only take the scale.
    pub fn save_entity_template(
        &mut self,
        em: &mut EntityManager,
        archetype: &str,
        handle: EntityHandle,
    ) -> EngineResult<()> {
        let edited: Vec<Box<dyn Component>> = em
            .get_entity(handle)
            .ok_or_else(|| EngineError::invalid(format!("No live entity {handle:?} to save into {archetype}")))?
            .components()
            .to_vec();
        let live_ids: Vec<ComponentId> = edited.iter().map(|c| c.id()).collect();

        let info = self
            .archetypes
            .get_mut(archetype)
            .ok_or_else(|| EngineError::invalid(format!("The entity type {archetype} does not exist")))?;
        let registry = &mut self.registry;

        let mut removed = Vec::new();
        info.components.retain(|type_name| {
            let keep = registry
                .name_to_hash(type_name)
                .is_some_and(|id| live_ids.contains(&id));
            if !keep {
                removed.push(type_name.clone());
            }
            keep
        });
        for type_name in removed {
            log::info!("{archetype}: component {type_name} removed from template");
            registry.get_factory_mut(&type_name)?.remove(archetype);
        }

        for component in &edited {
            let Some(type_name) = registry.hash_to_name(component.id()) else {
                log::warn!("{archetype}: {} is not registered, not saved", component.name());
                continue;
            };
            registry.get_factory_mut(type_name)?.save(archetype, component.as_ref())?;
            if !info.components.iter().any(|c| c == type_name) {
                info.components.push(type_name.to_string());
            }
        }

        let siblings: Vec<EntityHandle> = em
            .entities()
            .filter(|e| e.handle() != handle)
            .filter(|e| e.get::<NameComponent>().is_some_and(|n| n.value == archetype))
            .map(Entity::handle)
            .collect();
        for sibling in siblings {
            let Some(target) = em.get_entity_mut(sibling) else {
                continue;
            };
            for component in &edited {
                self.propagate(target, component.as_ref())?;
            }
            if em.is_announced(sibling) {
                em.notify_entity_created(sibling);
            }
        }
        Ok(())
    }

    fn propagate(&self, target: &mut Entity, component: &dyn Component) -> EngineResult<()> {
        let id = component.id();
        if id == NameComponent::component_id() || self.per_instance.contains(&id) {
            return Ok(());
        }

        let is_render = id == RenderComponent::component_id();
        if is_render {
            reverse_animations(target);
        }
        match target.get_by_id_mut(id) {
            None => {
                target.add_component(component.clone_component());
            }
            Some(existing) => {
                if let Some(source) = component.downcast_ref::<TransformComponent>() {
                    if let Some(existing) = existing.downcast_mut::<TransformComponent>() {
                        existing.scale = source.scale;
                    }
                } else {
                    existing.update_from(component)?;
                }
            }
        }
        if is_render {
            init_animations(target);
        }
        Ok(())
    }

    /// Write an archetype's prototypes back to its file
    pub fn save_entity_template_to_json(&mut self, archetype: &str) -> EngineResult<()> {
        let info = self.info(archetype)?.clone();
        let path = self
            .files
            .get(archetype)
            .cloned()
            .ok_or_else(|| EngineError::invalid(format!("No file known for entity type {archetype}")))?;

        let mut components = Map::new();
        for type_name in &info.components {
            let json = self
                .registry
                .get_factory_mut(type_name)?
                .save_to_json(archetype, None, None)?;
            components.insert(type_name.clone(), json);
        }

        let mut out = json!({ "name": archetype });
        if !info.tag.is_empty() {
            out.set("tag", info.tag);
        }
        out.set("components", Value::Object(components));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(&out)?)?;
        log::info!("Saved entity type {archetype} to {}", path.display());
        Ok(())
    }
}

/// Clone every entity of `src` into `dst`
///
/// Entities announced in `src` are announced in `dst`. Returns the new
/// handles in `src` iteration order.
pub fn copy_entity_manager(dst: &mut EntityManager, src: &EntityManager) -> Vec<EntityHandle> {
    let mut created = Vec::with_capacity(src.len());
    for entity in src.entities() {
        let handle = dst.create_entity();
        if let Some(copy) = dst.get_entity_mut(handle) {
            copy.set_tag(entity.tag());
            for component in entity.components() {
                copy.add_component(component.clone());
            }
        }
        if src.is_announced(entity.handle()) {
            dst.notify_entity_created(handle);
        }
        created.push(handle);
    }
    created
}
