//! Placement in the world

use serde_json::{json, Value};

use crate::ecs::{ComponentType, EditorInput};
use crate::error::EngineResult;
use crate::foundation::json::JsonExt;
use crate::foundation::math::{compose_trs, Mat4, Vec3};
use crate::registry::JsonComponent;

/// Position, Euler rotation in degrees and scale
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// World position
    pub pos: Vec3,
    /// Scale per axis
    pub scale: Vec3,
    /// Euler angles in degrees, applied X then Y then Z
    pub rotation: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            pos: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            rotation: Vec3::zeros(),
        }
    }
}

impl TransformComponent {
    /// Transform at a position
    pub fn at(pos: Vec3) -> Self {
        Self {
            pos,
            ..Self::default()
        }
    }

    /// World matrix
    pub fn matrix(&self) -> Mat4 {
        compose_trs(&self.pos, &self.rotation, &self.scale)
    }
}

impl ComponentType for TransformComponent {
    const NAME: &'static str = "sTransformComponent";
}

impl JsonComponent for TransformComponent {
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            pos: json.get_vec3("pos", defaults.pos),
            scale: json.get_vec3("scale", defaults.scale),
            rotation: json.get_vec3("rotation", defaults.rotation),
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        let mut out = json!({});
        out.set_vec3("pos", &self.pos);
        out.set_vec3("scale", &self.scale);
        out.set_vec3("rotation", &self.rotation);
        Some(out)
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut changed = input.edit_vec3("position", &mut self.pos);
        changed |= input.edit_vec3("scale", &mut self.scale);
        changed |= input.edit_vec3("rotation", &mut self.rotation);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::ScriptedInput;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_defaults_when_empty() {
        let transform = TransformComponent::load_from_json("Tile", &json!({})).unwrap();
        assert_eq!(transform, TransformComponent::default());
        assert_eq!(transform.scale, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_partial_json() {
        let transform = TransformComponent::load_from_json("Tile", &json!({"pos": [1, 2, 3]})).unwrap();
        assert_eq!(transform.pos, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.rotation, Vec3::zeros());
    }

    #[test]
    fn test_matrix_applies_scale_then_translation() {
        let transform = TransformComponent {
            pos: Vec3::new(10.0, 0.0, 0.0),
            scale: Vec3::new(2.0, 2.0, 2.0),
            rotation: Vec3::zeros(),
        };
        let p = transform.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 12.0);
    }

    #[test]
    fn test_editor() {
        let mut transform = TransformComponent::default();
        let mut input = ScriptedInput::new().with_vec3("scale", Vec3::new(3.0, 3.0, 3.0));
        assert!(transform.update_editor(&mut input));
        assert_eq!(transform.scale, Vec3::new(3.0, 3.0, 3.0));
        assert!(!transform.update_editor(&mut input));
    }
}
