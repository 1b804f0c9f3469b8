//! Animation playback
//!
//! Advances the current animation of every render component and writes the
//! sampled values back to the transform and render color.

use crate::archetype::apply_animation_values;
use crate::components::RenderComponent;
use crate::ecs::{ComponentId, ComponentType, EntityManager, System};
use crate::error::EngineResult;

/// Plays render component animations
#[derive(Debug, Default)]
pub struct AnimationSystem {
    paused: bool,
}

impl AnimationSystem {
    /// Create a running animation system
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze every animation at its current time
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Whether playback is frozen
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl System for AnimationSystem {
    fn name(&self) -> &str {
        "animation"
    }

    fn dependencies(&self) -> Vec<ComponentId> {
        vec![RenderComponent::component_id()]
    }

    fn update(&mut self, em: &mut EntityManager, dt: f32) -> EngineResult<()> {
        if self.paused {
            return Ok(());
        }
        let members = em.entities_for_system(self.name()).to_vec();
        for handle in members {
            let Some(entity) = em.get_entity_mut(handle) else {
                continue;
            };
            let Some(render) = entity.get_mut::<RenderComponent>() else {
                continue;
            };
            if !render.animator.is_playing() {
                continue;
            }
            render.animator.update(dt);
            let values: Vec<_> = render.animator.samples().collect();
            apply_animation_values(entity, &values);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Animator;
    use crate::archetype::init_animations;
    use crate::components::TransformComponent;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn animated_entity(em: &mut EntityManager) -> crate::foundation::collections::EntityHandle {
        let mut render = RenderComponent::default();
        render.animator = Animator::from_json(&json!([{
            "name": "slide",
            "params": [{"name": "position", "frames": [{"time": 1.0, "value": [10, 0, 0]}]}]
        }]));
        let handle = em.create_entity();
        let entity = em.get_entity_mut(handle).unwrap();
        entity.insert(TransformComponent::at(Vec3::new(1.0, 2.0, 3.0)));
        entity.insert(render);
        init_animations(entity);
        em.notify_entity_created(handle);
        handle
    }

    fn system(em: &mut EntityManager) -> AnimationSystem {
        let system = AnimationSystem::new();
        system.register(em);
        system
    }

    #[test]
    fn test_moves_transform() {
        let mut em = EntityManager::new();
        let handle = animated_entity(&mut em);
        let mut system = system(&mut em);
        system.update(&mut em, 0.5).unwrap();

        let transform = em.get_entity(handle).unwrap().get::<TransformComponent>().unwrap();
        assert!(transform.pos.x > 1.0);
        assert_relative_eq!(transform.pos.y, 2.0);
    }

    #[test]
    fn test_paused_leaves_transform() {
        let mut em = EntityManager::new();
        let handle = animated_entity(&mut em);
        let mut system = system(&mut em);
        system.set_paused(true);
        system.update(&mut em, 0.5).unwrap();

        let transform = em.get_entity(handle).unwrap().get::<TransformComponent>().unwrap();
        assert_relative_eq!(transform.pos.x, 1.0);
    }

    #[test]
    fn test_unannounced_entity_is_not_animated() {
        let mut em = EntityManager::new();
        let mut system = system(&mut em);
        let mut render = RenderComponent::default();
        render.animator = Animator::from_json(&json!([{
            "name": "slide",
            "params": [{"name": "position", "frames": [{"time": 1.0, "value": [10, 0, 0]}]}]
        }]));
        let handle = em.create_entity();
        let entity = em.get_entity_mut(handle).unwrap();
        entity.insert(TransformComponent::at(Vec3::new(1.0, 2.0, 3.0)));
        entity.insert(render);
        init_animations(entity);

        system.update(&mut em, 0.5).unwrap();
        let transform = em.get_entity(handle).unwrap().get::<TransformComponent>().unwrap();
        assert_relative_eq!(transform.pos.x, 1.0);
    }
}
