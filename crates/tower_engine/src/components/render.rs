//! # Render Component
//!
//! What an entity looks like: a model (loaded from a file, a built-in
//! primitive or a textured sprite quad), a tint, per-mesh material overrides
//! and the animations that move it.
//!
//! Loading from JSON stays pure: the model is resolved against the
//! [`ResourceManager`] lazily, the first time a system needs it. Clones share
//! the resolved model and materials through their handles.

use serde_json::{json, Value};

use crate::animation::Animator;
use crate::ecs::{ComponentType, EditorInput};
use crate::error::EngineResult;
use crate::foundation::json::JsonExt;
use crate::foundation::math::Vec4;
use crate::registry::JsonComponent;
use crate::render::Material;
use crate::resources::{GeometryType, ModelInstance, ResourceManager};

/// Default model file
pub const DEFAULT_MODEL: &str = "resources/models/default.DAE";

/// Source of an entity's model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderKind {
    /// Model file
    #[default]
    Mesh,
    /// Textured unit quad
    Sprite,
    /// Built-in primitive
    Geometry(GeometryType),
}

impl RenderKind {
    /// Every JSON name, in editor order
    pub const NAMES: [&'static str; 9] = [
        "MESH", "SPRITE", "PLANE", "BOX", "SPHERE", "CIRCLE", "CONE", "TRAPEZE", "CYLINDER",
    ];

    /// Parse a JSON name; unknown names are meshes
    pub fn from_name(name: &str) -> Self {
        match name {
            "SPRITE" => Self::Sprite,
            other => GeometryType::from_name(other).map_or(Self::Mesh, Self::Geometry),
        }
    }

    /// JSON name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mesh => "MESH",
            Self::Sprite => "SPRITE",
            Self::Geometry(geometry) => geometry.name(),
        }
    }
}

/// Resolve a model description into an instance owning per-mesh materials
///
/// Sprites and primitives with a texture get a transparent material named
/// after the texture. Named materials override the mesh defaults in order;
/// unknown names are logged and ignored.
pub(crate) fn load_model_instance(
    resources: &mut ResourceManager,
    kind: RenderKind,
    model_path: &str,
    texture: &str,
    materials: &[String],
) -> EngineResult<ModelInstance> {
    let model = match kind {
        RenderKind::Mesh => resources.get_or_load_model(model_path)?,
        RenderKind::Sprite => resources.geometry_model(GeometryType::Plane),
        RenderKind::Geometry(geometry) => resources.geometry_model(geometry),
    };
    let mut instance = match resources.model(model) {
        Some(source) => ModelInstance::new(model, source),
        None => ModelInstance {
            model,
            materials: Vec::new(),
        },
    };

    if kind != RenderKind::Mesh && !texture.is_empty() {
        let name = format!("texture:{texture}");
        let material = match resources.get_material(&name) {
            Some(material) => material,
            None => {
                let mut material = Material::new(name);
                material.diffuse_texture = Some(resources.get_or_load_texture(texture)?);
                material.transparent = true;
                resources.add_material(material)
            }
        };
        instance.materials.iter_mut().for_each(|slot| *slot = material);
    }

    for (slot, name) in instance.materials.iter_mut().zip(materials) {
        match resources.get_material(name) {
            Some(material) => *slot = material,
            None => log::warn!("Unknown material {name} for model {model_path}"),
        }
    }
    Ok(instance)
}

/// Visual representation of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct RenderComponent {
    /// Model is animated
    pub animated: bool,
    /// Model file, used when `kind` is [`RenderKind::Mesh`]
    pub model_path: String,
    /// Model source
    pub kind: RenderKind,
    /// Tint
    pub color: Vec4,
    /// Texture applied to sprites and primitives
    pub texture: String,
    /// Skipped by picking
    pub ignore_raycast: bool,
    /// Drawn by the dynamic path
    pub dynamic: bool,
    /// Hidden while dynamic objects are hidden
    pub hide_dynamic: bool,
    /// Drawn at all
    pub display: bool,
    /// Material names overriding the mesh defaults, in mesh order
    pub materials: Vec<String>,
    /// Animations
    pub animator: Animator,
    /// Resolved model, filled on first use
    pub model: Option<ModelInstance>,
}

impl Default for RenderComponent {
    fn default() -> Self {
        Self {
            animated: false,
            model_path: DEFAULT_MODEL.to_string(),
            kind: RenderKind::Mesh,
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            texture: String::new(),
            ignore_raycast: false,
            dynamic: false,
            hide_dynamic: false,
            display: true,
            materials: Vec::new(),
            animator: Animator::new(),
            model: None,
        }
    }
}

impl RenderComponent {
    /// Render component drawing a primitive
    pub fn geometry(geometry: GeometryType) -> Self {
        Self {
            kind: RenderKind::Geometry(geometry),
            ..Self::default()
        }
    }

    /// Model instance, loading it on first use
    pub fn resolve(&mut self, resources: &mut ResourceManager) -> EngineResult<&ModelInstance> {
        let instance = match self.model.take() {
            Some(instance) => instance,
            None => load_model_instance(resources, self.kind, &self.model_path, &self.texture, &self.materials)?,
        };
        Ok(self.model.insert(instance))
    }

    /// Drop the resolved model so the next use reloads it
    pub fn invalidate(&mut self) {
        self.model = None;
    }
}

impl ComponentType for RenderComponent {
    const NAME: &'static str = "sRenderComponent";
}

impl JsonComponent for RenderComponent {
    fn load_from_json(archetype: &str, json: &Value) -> EngineResult<Self> {
        let animations = json.get_object("animations");
        if !animations.is_null() && !animations.is_array() {
            log::error!("{archetype}::sRenderComponent: animations is not an array");
        }
        Ok(Self {
            animated: json.get_bool("animated", false),
            model_path: json.get_string("model", DEFAULT_MODEL),
            kind: RenderKind::from_name(&json.get_string("type", "MESH")),
            color: json.get_vec4("color", Vec4::new(1.0, 1.0, 1.0, 1.0)),
            texture: json.get_string("texture", ""),
            ignore_raycast: json.get_bool("ignore_raycast", false),
            dynamic: json.get_bool("dynamic", false),
            hide_dynamic: json.get_bool("hide_dynamic", false),
            display: json.get_bool("display", true),
            materials: json.get_string_vec("materials"),
            animator: Animator::from_json(animations),
            model: None,
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        let mut out = json!({
            "animated": self.animated,
            "model": self.model_path,
            "type": self.kind.name(),
            "texture": self.texture,
            "ignore_raycast": self.ignore_raycast,
            "dynamic": self.dynamic,
            "hide_dynamic": self.hide_dynamic,
            "display": self.display,
            "materials": self.materials,
        });
        out.set_vec4("color", &self.color);
        out.set("animations", self.animator.to_json());
        Some(out)
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut changed = input.edit_color("color", &mut self.color);
        changed |= input.edit_bool("display", &mut self.display);
        changed |= input.edit_bool("ignore raycast", &mut self.ignore_raycast);
        changed |= input.edit_bool("dynamic", &mut self.dynamic);
        changed |= input.edit_bool("hide dynamic", &mut self.hide_dynamic);
        changed |= input.edit_bool("animated", &mut self.animated);

        let mut model_changed = false;
        let mut selected = RenderKind::NAMES
            .iter()
            .position(|name| *name == self.kind.name())
            .unwrap_or(0);
        if input.edit_choice("type", &RenderKind::NAMES, &mut selected) {
            if let Some(&name) = RenderKind::NAMES.get(selected) {
                self.kind = RenderKind::from_name(name);
                model_changed = true;
            }
        }
        model_changed |= input.edit_string("model", &mut self.model_path);
        model_changed |= input.edit_string("texture", &mut self.texture);
        for (i, material) in self.materials.iter_mut().enumerate() {
            model_changed |= input.edit_string(&format!("material {i}"), material);
        }
        if model_changed {
            self.invalidate();
        }
        changed || model_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::ScriptedInput;
    use crate::resources::PlaceholderLoader;

    #[test]
    fn test_defaults() {
        let render = RenderComponent::load_from_json("Tile", &json!({})).unwrap();
        assert_eq!(render.model_path, DEFAULT_MODEL);
        assert_eq!(render.kind, RenderKind::Mesh);
        assert!(render.display);
        assert!(render.animator.is_empty());
        assert!(render.model.is_none());
    }

    #[test]
    fn test_kind_names() {
        for name in RenderKind::NAMES {
            assert_eq!(RenderKind::from_name(name).name(), name);
        }
        assert_eq!(RenderKind::from_name("???"), RenderKind::Mesh);
    }

    #[test]
    fn test_resolve_is_cached_and_shared_by_clones() {
        let mut resources = ResourceManager::new(PlaceholderLoader);
        let mut render = RenderComponent::load_from_json("Tower", &json!({"model": "tower.obj"})).unwrap();
        let model = render.resolve(&mut resources).unwrap().model;
        assert_eq!(render.resolve(&mut resources).unwrap().model, model);

        let mut copy = render.clone();
        assert_eq!(copy.resolve(&mut resources).unwrap().model, model);
        assert_eq!(resources.model_by_name("tower.obj"), Some(model));
    }

    #[test]
    fn test_sprite_texture_material() {
        let mut resources = ResourceManager::new(PlaceholderLoader);
        let mut render = RenderComponent::load_from_json(
            "Icon",
            &json!({"type": "SPRITE", "texture": "resources/textures/icon.png"}),
        )
        .unwrap();
        let material = render.resolve(&mut resources).unwrap().materials[0];
        let material = resources.material(material).unwrap();
        assert!(material.transparent);
        assert!(material.diffuse_texture.is_some());
    }

    #[test]
    fn test_named_material_override() {
        let mut resources = ResourceManager::new(PlaceholderLoader);
        let gold = resources.add_material(Material::new("gold"));
        let mut render =
            RenderComponent::load_from_json("Coin", &json!({"type": "SPHERE", "materials": ["gold", "extra"]}))
                .unwrap();
        assert_eq!(render.resolve(&mut resources).unwrap().materials, vec![gold]);
    }

    #[test]
    fn test_editor_type_change_invalidates_model() {
        let mut resources = ResourceManager::new(PlaceholderLoader);
        let mut render = RenderComponent::geometry(GeometryType::Box);
        let boxed = render.resolve(&mut resources).unwrap().model;

        let mut input = ScriptedInput::new().with_choice("type", "SPHERE");
        assert!(render.update_editor(&mut input));
        assert!(render.model.is_none());
        assert_ne!(render.resolve(&mut resources).unwrap().model, boxed);
    }
}
