//! Box and sphere colliders

use serde_json::{json, Value};

use super::transform::TransformComponent;
use crate::ecs::{ComponentType, EditorInput};
use crate::error::EngineResult;
use crate::foundation::json::JsonExt;
use crate::foundation::math::Vec3;
use crate::physics::{Aabb, Sphere};
use crate::registry::JsonComponent;

/// Axis-aligned box collider, relative to the entity
#[derive(Debug, Clone, PartialEq)]
pub struct BoxColliderComponent {
    /// Center offset from the entity position
    pub pos: Vec3,
    /// Full extent
    pub size: Vec3,
    /// Reports overlaps without blocking
    pub is_trigger: bool,
}

impl Default for BoxColliderComponent {
    fn default() -> Self {
        Self {
            pos: Vec3::zeros(),
            size: Vec3::new(2.0, 2.0, 2.0),
            is_trigger: false,
        }
    }
}

impl BoxColliderComponent {
    /// World-space box; scale applies to the size
    pub fn world_box(&self, transform: &TransformComponent) -> Aabb {
        let half = self.size.component_mul(&transform.scale) / 2.0;
        let center = transform.pos + self.pos;
        Aabb::new(center - half, center + half)
    }
}

impl ComponentType for BoxColliderComponent {
    const NAME: &'static str = "sBoxColliderComponent";
}

impl JsonComponent for BoxColliderComponent {
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            pos: json.get_vec3("pos", defaults.pos),
            size: json.get_vec3("size", defaults.size),
            is_trigger: json.get_bool("isTrigger", false),
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        let mut out = json!({ "isTrigger": self.is_trigger });
        out.set_vec3("pos", &self.pos);
        out.set_vec3("size", &self.size);
        Some(out)
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut changed = input.edit_vec3("position", &mut self.pos);
        changed |= input.edit_vec3("size", &mut self.size);
        changed |= input.edit_bool("trigger", &mut self.is_trigger);
        changed
    }
}

/// Sphere collider, relative to the entity
#[derive(Debug, Clone, PartialEq)]
pub struct SphereColliderComponent {
    /// Center offset from the entity position
    pub pos: Vec3,
    /// Radius
    pub radius: f32,
    /// Reports overlaps without blocking
    pub is_trigger: bool,
}

impl Default for SphereColliderComponent {
    fn default() -> Self {
        Self {
            pos: Vec3::zeros(),
            radius: 2.0,
            is_trigger: false,
        }
    }
}

impl SphereColliderComponent {
    /// World-space sphere; the largest scale axis applies to the radius
    pub fn world_sphere(&self, transform: &TransformComponent) -> Sphere {
        Sphere::new(transform.pos + self.pos, self.radius * transform.scale.max())
    }
}

impl ComponentType for SphereColliderComponent {
    const NAME: &'static str = "sSphereColliderComponent";
}

impl JsonComponent for SphereColliderComponent {
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        Ok(Self {
            pos: json.get_vec3("pos", Vec3::zeros()),
            radius: json.get_f32("radius", 2.0),
            is_trigger: json.get_bool("isTrigger", false),
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        let mut out = json!({ "radius": self.radius, "isTrigger": self.is_trigger });
        out.set_vec3("pos", &self.pos);
        Some(out)
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut changed = input.edit_vec3("position", &mut self.pos);
        changed |= input.edit_f32("radius", &mut self.radius);
        changed |= input.edit_bool("trigger", &mut self.is_trigger);
        changed
    }
}
