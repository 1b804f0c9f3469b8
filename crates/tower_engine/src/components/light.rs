//! Directional light attached to an entity

use serde_json::{json, Value};

use super::transform::TransformComponent;
use crate::ecs::{ComponentType, EditorInput};
use crate::error::EngineResult;
use crate::foundation::json::JsonExt;
use crate::foundation::math::{quat_from_euler_degrees, Vec3, Vec4};
use crate::registry::JsonComponent;
use crate::render::Light;

/// Light colors and base direction
#[derive(Debug, Clone, PartialEq)]
pub struct LightComponent {
    /// Ambient color
    pub ambient: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Direction before the transform rotation is applied
    pub direction: Vec3,
}

impl Default for LightComponent {
    fn default() -> Self {
        let light = Light::default();
        Self {
            ambient: light.ambient,
            diffuse: light.diffuse,
            direction: light.direction,
        }
    }
}

impl LightComponent {
    /// Light handed to the render queue, oriented by the entity rotation
    pub fn to_light(&self, transform: Option<&TransformComponent>) -> Light {
        let direction = transform.map_or(self.direction, |t| {
            quat_from_euler_degrees(&t.rotation) * self.direction
        });
        Light {
            ambient: self.ambient,
            diffuse: self.diffuse,
            direction,
        }
    }
}

fn rgb(value: &Vec3) -> Vec4 {
    Vec4::new(value.x, value.y, value.z, 1.0)
}

impl ComponentType for LightComponent {
    const NAME: &'static str = "sLightComponent";
}

impl JsonComponent for LightComponent {
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            ambient: json.get_vec3("ambient", defaults.ambient),
            diffuse: json.get_vec3("diffuse", defaults.diffuse),
            direction: json.get_vec3("direction", defaults.direction),
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        let mut out = json!({});
        out.set_vec3("ambient", &self.ambient);
        out.set_vec3("diffuse", &self.diffuse);
        out.set_vec3("direction", &self.direction);
        Some(out)
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut changed = false;
        for (label, field) in [("ambient", &mut self.ambient), ("diffuse", &mut self.diffuse)] {
            let mut color = rgb(field);
            if input.edit_color(label, &mut color) {
                *field = color.xyz();
                changed = true;
            }
        }
        changed |= input.edit_vec3("direction", &mut self.direction);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let light = LightComponent::load_from_json("Sun", &json!({})).unwrap();
        assert_eq!(light.ambient, Vec3::new(0.3, 0.3, 0.3));
        assert_eq!(light.direction, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_direction_follows_rotation() {
        let light = LightComponent::default();
        let transform = TransformComponent {
            rotation: Vec3::new(0.0, 0.0, 90.0),
            ..TransformComponent::default()
        };
        let oriented = light.to_light(Some(&transform));
        assert_relative_eq!(oriented.direction, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_eq!(light.to_light(None).direction, light.direction);
    }
}
