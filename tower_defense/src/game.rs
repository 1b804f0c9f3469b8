//! Startup glue and the headless frame loop

use std::path::Path;

use tower_engine::config::ConfigError;
use tower_engine::prelude::*;

use crate::components::{register_game_components, PositionComponent};

/// Fixed simulation step of the headless loop
pub const FRAME_DT: f32 = 1.0 / 60.0;

/// Startup and frame errors
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// Configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Engine failure
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Registry holding the engine and game component types
pub fn game_registry() -> EngineResult<ComponentTypeRegistry> {
    let mut registry = ComponentTypeRegistry::with_engine_components()?;
    register_game_components(&mut registry)?;
    Ok(registry)
}

/// Load every archetype under `dir`
///
/// Map positions belong to the placed entity: saving a template never
/// moves the other live entities of the archetype.
pub fn load_catalog(dir: impl AsRef<Path>) -> EngineResult<ArchetypeCatalog> {
    let mut catalog = ArchetypeCatalog::new(game_registry()?);
    catalog.mark_per_instance::<PositionComponent>();
    let count = catalog.load_directory(dir)?;
    log::info!("Loaded {count} archetypes");
    Ok(catalog)
}

/// A running game world
pub struct Game {
    config: EngineConfig,
    catalog: ArchetypeCatalog,
    em: EntityManager,
    physics: PhysicsSystem,
    particles: ParticleSystem,
    rendering: RenderingSystem<HeadlessDevice>,
    frame: u64,
}

impl Game {
    /// Build the world described by `config`
    pub fn new(config: EngineConfig) -> Result<Self, GameError> {
        config.validate()?;
        let catalog = load_catalog(&config.archetypes_dir)?;

        let mut resources = ResourceManager::new(PlaceholderLoader);
        if config.materials_dir.is_dir() {
            let count = resources.load_materials_directory(&config.materials_dir)?;
            log::info!("Loaded {count} materials");
        } else {
            log::warn!("Material directory {} not found", config.materials_dir.display());
        }

        let device = HeadlessDevice::new(config.window.width, config.window.height);
        let renderer = Renderer::new(device, &config.renderer)?;
        let rendering = RenderingSystem::new(renderer, resources);
        let physics = PhysicsSystem::default();
        let particles = ParticleSystem::default();

        let mut em = EntityManager::new();
        physics.register(&mut em);
        particles.register(&mut em);
        rendering.register(&mut em);

        Ok(Self {
            config,
            catalog,
            em,
            physics,
            particles,
            rendering,
            frame: 0,
        })
    }

    /// Instantiate every loaded archetype once
    pub fn spawn_archetypes(&mut self) -> EngineResult<Vec<EntityHandle>> {
        let names = self.catalog.archetype_names().to_vec();
        let mut handles = Vec::with_capacity(names.len());
        for name in &names {
            handles.push(self.catalog.create_entity(&mut self.em, name, None, true)?);
        }
        log::debug!("Spawned {} entities", handles.len());
        Ok(handles)
    }

    /// Advance one frame
    pub fn step(&mut self, dt: f32) -> EngineResult<()> {
        self.physics.update(&mut self.em, dt)?;
        self.particles.update(&mut self.em, dt)?;
        self.rendering.update(&mut self.em, dt)?;
        self.frame += 1;
        Ok(())
    }

    /// Run the configured number of frames
    pub fn run(&mut self) -> EngineResult<()> {
        for _ in 0..self.config.frames {
            self.step(FRAME_DT)?;
        }
        log::info!(
            "Ran {} frames, {} draw calls in the last one",
            self.frame,
            self.rendering.renderer().stats().draw_calls
        );
        Ok(())
    }

    /// Frames simulated so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Loaded archetypes
    pub fn catalog(&self) -> &ArchetypeCatalog {
        &self.catalog
    }

    /// Live entities
    pub fn entities(&self) -> &EntityManager {
        &self.em
    }

    /// Live entities, mutably
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.em
    }

    /// Rendering system, for inspecting the last frame
    pub fn rendering(&self) -> &RenderingSystem<HeadlessDevice> {
        &self.rendering
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_both_sides() {
        let registry = game_registry().unwrap();
        assert!(registry.type_exists("sRenderComponent"));
        assert!(registry.type_exists("sHitBoxComponent"));
    }

    #[test]
    fn test_missing_archetype_dir_is_fatal() {
        let config = EngineConfig::new().with_archetypes_dir("does/not/exist");
        assert!(matches!(Game::new(config), Err(GameError::Engine(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::new()
            .with_archetypes_dir(dir.path())
            .with_window_size(0, 0);
        assert!(matches!(Game::new(config), Err(GameError::Config(_))));
    }
}
