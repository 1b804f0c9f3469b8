//! # Tower Engine
//!
//! A data-driven game engine: component types are registered by name,
//! entities are stamped out of JSON archetypes, and a multi-pass renderer
//! draws the scene, the UI and text with a bloom post-process.
//!
//! ## Features
//!
//! - **Component Registry**: name-keyed factories that load, clone and save component types
//! - **Archetypes**: JSON entity templates with edit propagation back to live instances
//! - **Rendering**: opaque, transparent and UI passes, instanced batches, bloom tiers
//! - **Physics**: collision primitives, rigid bodies and ray picking
//! - **Animation and Particles**: keyframed parameters and cone emitters
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tower_engine::prelude::*;
//!
//! fn main() -> EngineResult<()> {
//!     let registry = ComponentTypeRegistry::with_engine_components()?;
//!     let mut catalog = ArchetypeCatalog::new(registry);
//!     catalog.load_directory("resources/archetypes")?;
//!
//!     let mut em = EntityManager::new();
//!     let config = RendererConfig::default();
//!     let renderer = Renderer::new(HeadlessDevice::new(1280, 720), &config)?;
//!     let mut rendering = RenderingSystem::new(renderer, ResourceManager::new(PlaceholderLoader));
//!     rendering.register(&mut em);
//!
//!     catalog.create_entity(&mut em, "Tower", None, true)?;
//!     rendering.update(&mut em, 1.0 / 60.0)?;
//!     Ok(())
//! }
//! ```

pub mod animation;
pub mod archetype;
pub mod components;
pub mod config;
pub mod ecs;
pub mod error;
pub mod foundation;
pub mod physics;
pub mod registry;
pub mod render;
pub mod resources;
pub mod systems;

pub use error::{EngineError, EngineResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        archetype::ArchetypeCatalog,
        components::*,
        config::{Config, EngineConfig, RendererConfig},
        ecs::{Component, ComponentType, Entity, EntityManager, System},
        error::{EngineError, EngineResult},
        foundation::{
            collections::EntityHandle,
            math::{Vec2, Vec3, Vec4},
        },
        registry::{ComponentTypeRegistry, JsonComponent},
        render::{HeadlessDevice, Renderer},
        resources::{PlaceholderLoader, ResourceManager},
        systems::{AnimationSystem, ParticleSystem, PhysicsSystem, RenderingSystem},
    };
}
