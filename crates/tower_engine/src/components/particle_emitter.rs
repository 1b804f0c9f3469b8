//! Particle emitter parameters and live particles
//!
//! Particle life is counted in frames. The live particle list is runtime
//! state: it is never serialized and clones start without particles.

use serde_json::{json, Value};

use super::render::{load_model_instance, RenderKind};
use crate::ecs::{ComponentType, EditorInput};
use crate::error::EngineResult;
use crate::foundation::json::JsonExt;
use crate::foundation::math::{Vec3, Vec4};
use crate::registry::JsonComponent;
use crate::resources::{GeometryType, ModelInstance, ResourceManager};

/// Start and finish values, each with a random variance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient<V> {
    /// Value at spawn
    pub start: V,
    /// Maximum random offset added to `start`
    pub start_variance: V,
    /// Value at death
    pub finish: V,
    /// Maximum random offset added to `finish`
    pub finish_variance: V,
}

impl Gradient<Vec4> {
    fn color_from_json(json: &Value) -> Self {
        let one = Vec4::new(1.0, 1.0, 1.0, 1.0);
        Self {
            start: json.get_vec4("start", one),
            start_variance: json.get_vec4("start_variance", Vec4::zeros()),
            finish: json.get_vec4("finish", one),
            finish_variance: json.get_vec4("finish_variance", Vec4::zeros()),
        }
    }

    fn color_to_json(&self) -> Value {
        let mut out = json!({});
        out.set_vec4("start", &self.start);
        out.set_vec4("start_variance", &self.start_variance);
        out.set_vec4("finish", &self.finish);
        out.set_vec4("finish_variance", &self.finish_variance);
        out
    }
}

impl Gradient<Vec3> {
    fn size_from_json(json: &Value) -> Self {
        let one = Vec3::new(1.0, 1.0, 1.0);
        Self {
            start: json.get_vec3("start", one),
            start_variance: json.get_vec3("start_variance", Vec3::zeros()),
            finish: json.get_vec3("finish", one),
            finish_variance: json.get_vec3("finish_variance", Vec3::zeros()),
        }
    }

    fn size_to_json(&self) -> Value {
        let mut out = json!({});
        out.set_vec3("start", &self.start);
        out.set_vec3("start_variance", &self.start_variance);
        out.set_vec3("finish", &self.finish);
        out.set_vec3("finish_variance", &self.finish_variance);
        out
    }
}

/// One live particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// World position
    pub position: Vec3,
    /// Unit direction
    pub direction: Vec3,
    /// Units per second
    pub speed: f32,
    /// Frames left
    pub life: u32,
    /// Current color
    pub color: Vec4,
    /// Color change per frame
    pub color_step: Vec4,
    /// Current size
    pub size: Vec3,
    /// Size change per frame
    pub size_step: Vec3,
}

/// Runtime state of an emitter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitterState {
    /// Live particles
    pub particles: Vec<Particle>,
    /// Seconds since the last spawn
    pub since_spawn: f32,
    /// Seconds the emitter has been alive
    pub age: f32,
}

/// Emits particles from the entity's position
#[derive(Debug, PartialEq)]
pub struct ParticleEmitterComponent {
    /// Seconds between spawns
    pub rate: f32,
    /// Particles created per spawn
    pub spawn_nb: u32,
    /// Live particle limit
    pub max_particles: u32,
    /// Emitter lifetime in seconds, 0 for infinite
    pub emitter_life: f32,
    /// Particle life in frames
    pub life: u32,
    /// Maximum random frames added to `life`
    pub life_variance: u32,
    /// Cone half angle in degrees
    pub angle: f32,
    /// Maximum random degrees added to `angle`
    pub angle_variance: f32,
    /// Particle speed
    pub speed: f32,
    /// Maximum random speed added to `speed`
    pub speed_variance: f32,
    /// Color over life
    pub color: Gradient<Vec4>,
    /// Size over life
    pub size: Gradient<Vec3>,
    /// Hide the entity's own render component
    pub display_only_particles: bool,
    /// Particle model file, used when `kind` is [`RenderKind::Mesh`]
    pub model_path: String,
    /// Particle model source
    pub kind: RenderKind,
    /// Texture applied to sprite and primitive particles
    pub texture: String,
    /// Resolved particle model
    pub model: Option<ModelInstance>,
    /// Live particles
    pub state: EmitterState,
}

impl Clone for ParticleEmitterComponent {
    fn clone(&self) -> Self {
        Self {
            rate: self.rate,
            spawn_nb: self.spawn_nb,
            max_particles: self.max_particles,
            emitter_life: self.emitter_life,
            life: self.life,
            life_variance: self.life_variance,
            angle: self.angle,
            angle_variance: self.angle_variance,
            speed: self.speed,
            speed_variance: self.speed_variance,
            color: self.color,
            size: self.size,
            display_only_particles: self.display_only_particles,
            model_path: self.model_path.clone(),
            kind: self.kind,
            texture: self.texture.clone(),
            model: self.model.clone(),
            state: EmitterState::default(),
        }
    }
}

impl Default for ParticleEmitterComponent {
    fn default() -> Self {
        Self::from_json(&Value::Null)
    }
}

impl ParticleEmitterComponent {
    fn from_json(json: &Value) -> Self {
        Self {
            rate: json.get_f32("rate", 0.0),
            spawn_nb: json.get_u32("spawn_nb", 1),
            max_particles: json.get_u32("max_particles", 50),
            emitter_life: json.get_f32("emitter_life", 0.0),
            life: json.get_u32("life", 80),
            life_variance: json.get_u32("life_variance", 0),
            angle: json.get_f32("angle", 50.0),
            angle_variance: json.get_f32("angle_variance", 0.0),
            speed: json.get_f32("speed", 30.0),
            speed_variance: json.get_f32("speed_variance", 0.0),
            color: Gradient::color_from_json(json.get_object("color")),
            size: Gradient::size_from_json(json.get_object("size")),
            display_only_particles: json.get_bool("display_only_particles", true),
            model_path: json.get_string("model", ""),
            kind: RenderKind::from_name(&json.get_string("type", GeometryType::Plane.name())),
            texture: json.get_string("texture", ""),
            model: None,
            state: EmitterState::default(),
        }
    }

    /// Particle model instance, loading it on first use
    pub fn resolve(&mut self, resources: &mut ResourceManager) -> EngineResult<&ModelInstance> {
        let instance = match self.model.take() {
            Some(instance) => instance,
            None => load_model_instance(resources, self.kind, &self.model_path, &self.texture, &[])?,
        };
        Ok(self.model.insert(instance))
    }

    /// Whether the emitter outlived `emitter_life`
    pub fn is_expired(&self) -> bool {
        self.emitter_life > 0.0 && self.state.age >= self.emitter_life
    }
}

impl ComponentType for ParticleEmitterComponent {
    const NAME: &'static str = "sParticleEmitterComponent";
}

impl JsonComponent for ParticleEmitterComponent {
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        Ok(Self::from_json(json))
    }

    fn save_to_json(&self) -> Option<Value> {
        Some(json!({
            "rate": self.rate,
            "spawn_nb": self.spawn_nb,
            "max_particles": self.max_particles,
            "emitter_life": self.emitter_life,
            "life": self.life,
            "life_variance": self.life_variance,
            "angle": self.angle,
            "angle_variance": self.angle_variance,
            "speed": self.speed,
            "speed_variance": self.speed_variance,
            "color": self.color.color_to_json(),
            "size": self.size.size_to_json(),
            "display_only_particles": self.display_only_particles,
            "model": self.model_path,
            "type": self.kind.name(),
            "texture": self.texture,
        }))
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut changed = input.edit_bool("display only particles", &mut self.display_only_particles);
        changed |= input.edit_f32("emitter life", &mut self.emitter_life);
        changed |= input.edit_f32("rate", &mut self.rate);
        changed |= input.edit_f32("angle", &mut self.angle);
        changed |= input.edit_f32("angle variance", &mut self.angle_variance);
        changed |= input.edit_f32("speed", &mut self.speed);
        changed |= input.edit_f32("speed variance", &mut self.speed_variance);
        changed |= input.edit_color("start color", &mut self.color.start);
        changed |= input.edit_color("finish color", &mut self.color.finish);
        changed |= input.edit_vec3("start size", &mut self.size.start);
        changed |= input.edit_vec3("finish size", &mut self.size.finish);

        let mut selected = RenderKind::NAMES
            .iter()
            .position(|name| *name == self.kind.name())
            .unwrap_or(0);
        if input.edit_choice("model type", &RenderKind::NAMES, &mut selected) {
            if let Some(&name) = RenderKind::NAMES.get(selected) {
                self.kind = RenderKind::from_name(name);
                self.model = None;
                changed = true;
            }
        }
        changed
    }
}
