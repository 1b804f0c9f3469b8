//! Ray picking against rendered entities
//!
//! Each candidate's box is its model bounds scaled and translated by the
//! entity transform. Entities without a resolved model, without a transform,
//! or flagged `ignore_raycast` are skipped.

use crate::components::{RenderComponent, TransformComponent};
use crate::ecs::{Entity, EntityManager};
use crate::foundation::collections::EntityHandle;
use crate::foundation::math::Vec3;
use crate::resources::ResourceManager;

use super::primitives::{ray_vs_aabb, ray_vs_plane, Aabb, Ray};

fn pick_box(entity: &Entity, resources: &ResourceManager) -> Option<Aabb> {
    let render = entity.get::<RenderComponent>()?;
    if render.ignore_raycast {
        return None;
    }
    let transform = entity.get::<TransformComponent>()?;
    let model = resources.model(render.model.as_ref()?.model)?;
    Some(Aabb::new(
        model.bounds.min.component_mul(&transform.scale) + transform.pos,
        model.bounds.max.component_mul(&transform.scale) + transform.pos,
    ))
}

/// Every entity hit by the ray, with its entry distance
pub fn raycast_all(ray: &Ray, entities: &EntityManager, resources: &ResourceManager) -> Vec<(EntityHandle, f32)> {
    entities
        .entities()
        .filter_map(|entity| {
            let aabb = pick_box(entity, resources)?;
            ray_vs_aabb(ray, &aabb.min, &aabb.max).map(|t| (entity.handle(), t))
        })
        .collect()
}

/// Nearest entity hit by the ray
pub fn raycast(ray: &Ray, entities: &EntityManager, resources: &ResourceManager) -> Option<(EntityHandle, f32)> {
    raycast_all(ray, entities, resources)
        .into_iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Point where the ray crosses a plane
pub fn raycast_plane(ray: &Ray, plane_normal: &Vec3, plane_pos: &Vec3) -> Option<Vec3> {
    ray_vs_plane(ray, plane_normal, plane_pos).map(|t| ray.point_at(t))
}
