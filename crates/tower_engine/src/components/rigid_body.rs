//! Simple kinematic body

use serde_json::{json, Value};

use crate::ecs::{ComponentType, EditorInput};
use crate::error::EngineResult;
use crate::foundation::json::JsonExt;
use crate::foundation::math::Vec3;
use crate::registry::JsonComponent;

/// Velocity integrated by the physics system
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyComponent {
    /// Acceleration applied every update
    pub gravity: Vec3,
    /// Units per second
    pub velocity: Vec3,
    /// Take part in overlap reports
    pub collisions_enabled: bool,
    /// Tags of entities this body never collides with
    pub ignored_tags: Vec<String>,
}

impl Default for RigidBodyComponent {
    fn default() -> Self {
        Self {
            gravity: Vec3::zeros(),
            velocity: Vec3::zeros(),
            collisions_enabled: true,
            ignored_tags: Vec::new(),
        }
    }
}

impl RigidBodyComponent {
    /// Whether collisions with an entity tagged `tag` are ignored
    pub fn ignores(&self, tag: &str) -> bool {
        self.ignored_tags.iter().any(|t| t == tag)
    }
}

impl ComponentType for RigidBodyComponent {
    const NAME: &'static str = "sRigidBodyComponent";
}

impl JsonComponent for RigidBodyComponent {
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        Ok(Self {
            gravity: json.get_vec3("gravity", Vec3::zeros()),
            velocity: json.get_vec3("velocity", Vec3::zeros()),
            collisions_enabled: json.get_bool("collisions_enabled", true),
            ignored_tags: json.get_string_vec("ignored_tags"),
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        let mut out = json!({
            "collisions_enabled": self.collisions_enabled,
            "ignored_tags": self.ignored_tags,
        });
        out.set_vec3("gravity", &self.gravity);
        out.set_vec3("velocity", &self.velocity);
        Some(out)
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut changed = input.edit_vec3("gravity", &mut self.gravity);
        changed |= input.edit_vec3("velocity", &mut self.velocity);
        changed |= input.edit_bool("collisions", &mut self.collisions_enabled);
        changed
    }
}
