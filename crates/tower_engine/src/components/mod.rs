//! # Engine Components
//!
//! Every component type the engine itself understands. Each type reads its
//! fields from archetype JSON with a default for any missing key and, except
//! for [`DynamicComponent`], writes them back.
//!
//! [`register_engine_components`] installs all of them into a registry; games
//! add their own types to the same registry afterwards.

mod button;
mod camera;
mod collider;
mod dynamic;
mod light;
mod name;
mod particle_emitter;
mod render;
mod rigid_body;
mod text;
mod transform;
mod ui;

pub use button::{ButtonAction, ButtonComponent};
pub use camera::CameraComponent;
pub use collider::{BoxColliderComponent, SphereColliderComponent};
pub use dynamic::DynamicComponent;
pub use light::LightComponent;
pub use name::NameComponent;
pub use particle_emitter::{EmitterState, Gradient, Particle, ParticleEmitterComponent};
pub use render::{RenderComponent, RenderKind, DEFAULT_MODEL};
pub use rigid_body::RigidBodyComponent;
pub use text::TextComponent;
pub use transform::TransformComponent;
pub use ui::{HorizontalAlignment, UiComponent, VerticalAlignment};

use crate::error::EngineResult;
use crate::registry::ComponentTypeRegistry;

/// Register every engine component type
pub fn register_engine_components(registry: &mut ComponentTypeRegistry) -> EngineResult<()> {
    registry.register::<TransformComponent>()?;
    registry.register::<NameComponent>()?;
    registry.register::<RenderComponent>()?;
    registry.register::<ParticleEmitterComponent>()?;
    registry.register::<LightComponent>()?;
    registry.register::<CameraComponent>()?;
    registry.register::<UiComponent>()?;
    registry.register::<TextComponent>()?;
    registry.register::<BoxColliderComponent>()?;
    registry.register::<SphereColliderComponent>()?;
    registry.register::<RigidBodyComponent>()?;
    registry.register::<ButtonComponent>()?;
    registry.register::<DynamicComponent>()?;
    Ok(())
}
