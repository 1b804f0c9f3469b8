//! Camera attached to an entity

use serde_json::{json, Value};

use super::transform::TransformComponent;
use crate::ecs::{ComponentType, EditorInput};
use crate::error::EngineResult;
use crate::foundation::json::JsonExt;
use crate::foundation::math::Vec3;
use crate::registry::JsonComponent;
use crate::render::{Camera, Projection, ViewportRect};

const PROJECTIONS: [&str; 3] = ["PERSPECTIVE", "ORTHOGRAPHIC_3D", "ORTHOGRAPHIC_2D"];

/// Projection parameters; position and orientation come from the transform
#[derive(Debug, Clone, PartialEq)]
pub struct CameraComponent {
    /// Projection model
    pub projection: Projection,
    /// Orthographic volume height
    pub projection_size: f32,
    /// Near plane
    pub near: f32,
    /// Far plane
    pub far: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Viewport as fractions of the target
    pub viewport: ViewportRect,
}

impl Default for CameraComponent {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            projection: camera.projection,
            projection_size: camera.projection_size,
            near: camera.near,
            far: camera.far,
            fov: camera.fov,
            viewport: camera.viewport,
        }
    }
}

impl CameraComponent {
    /// Render camera placed by `transform`
    pub fn camera(&self, transform: &TransformComponent) -> Camera {
        Camera {
            projection: self.projection,
            projection_size: self.projection_size,
            near: self.near,
            far: self.far,
            fov: self.fov,
            viewport: self.viewport,
            position: transform.pos,
            rotation: transform.rotation,
        }
    }
}

impl ComponentType for CameraComponent {
    const NAME: &'static str = "sCameraComponent";
}

impl JsonComponent for CameraComponent {
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        let defaults = Self::default();
        let viewport = json.get_object("viewport");
        Ok(Self {
            projection: Projection::from_name(&json.get_string("projection", "PERSPECTIVE")),
            projection_size: json.get_f32("projection_size", defaults.projection_size),
            near: json.get_f32("near", defaults.near),
            far: json.get_f32("far", defaults.far),
            fov: json.get_f32("fov", defaults.fov),
            viewport: ViewportRect {
                offset: viewport.get_vec2("offset", defaults.viewport.offset),
                extent: viewport.get_vec2("extent", defaults.viewport.extent),
            },
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        let mut viewport = json!({});
        viewport.set_vec2("offset", &self.viewport.offset);
        viewport.set_vec2("extent", &self.viewport.extent);
        Some(json!({
            "projection": self.projection.name(),
            "projection_size": self.projection_size,
            "near": self.near,
            "far": self.far,
            "fov": self.fov,
            "viewport": viewport,
        }))
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut selected = PROJECTIONS
            .iter()
            .position(|name| *name == self.projection.name())
            .unwrap_or(0);
        let mut changed = false;
        if input.edit_choice("projection", &PROJECTIONS, &mut selected) {
            if let Some(&name) = PROJECTIONS.get(selected) {
                self.projection = Projection::from_name(name);
                changed = true;
            }
        }
        changed |= input.edit_f32("projection size", &mut self.projection_size);
        changed |= input.edit_f32("near", &mut self.near);
        changed |= input.edit_f32("far", &mut self.far);
        changed |= input.edit_f32("fov", &mut self.fov);
        let mut offset = Vec3::new(self.viewport.offset.x, self.viewport.offset.y, 0.0);
        if input.edit_vec3("viewport offset", &mut offset) {
            self.viewport.offset = offset.xy();
            changed = true;
        }
        changed
    }
}
