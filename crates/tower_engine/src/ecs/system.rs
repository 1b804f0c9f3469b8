//! System trait
//!
//! Systems contain logic, components contain data. A system names the
//! component types it depends on; the [`EntityManager`] keeps the list of
//! announced entities that carry all of them.

use super::component::ComponentId;
use super::entity_manager::EntityManager;
use crate::error::EngineResult;

/// A per-frame system
pub trait System {
    /// Unique system name, used as the membership key in the entity manager
    fn name(&self) -> &str;

    /// Component types an entity must carry to be processed
    fn dependencies(&self) -> Vec<ComponentId>;

    /// Register this system's dependencies with the entity manager
    fn register(&self, em: &mut EntityManager) {
        em.register_system(self.name().to_string(), self.dependencies());
    }

    /// Advance one frame
    fn update(&mut self, em: &mut EntityManager, dt: f32) -> EngineResult<()>;
}
