//! Rigid body integration and collider overlap tracking
//!
//! Every frame the system
//! 1. applies gravity to each rigid body's velocity,
//! 2. tests every collider pair at the positions the bodies are about to
//!    reach, zeroing both velocities when two solid colliders would overlap,
//! 3. moves the bodies.
//!
//! Entities with a collider but no rigid body are static obstacles. Pair
//! states persist across frames so callers can react to entering and
//! leaving contacts through [`PhysicsSystem::events`].

use std::collections::HashMap;

use crate::components::{BoxColliderComponent, RigidBodyComponent, SphereColliderComponent, TransformComponent};
use crate::ecs::{ComponentId, ComponentType, Entity, EntityManager, System};
use crate::error::EngineResult;
use crate::foundation::collections::EntityHandle;
use crate::foundation::math::Vec3;
use crate::physics::{aabb_vs_aabb, sphere_vs_aabb, sphere_vs_sphere, Aabb, Sphere};

/// Contact state of a collider pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionState {
    /// Not touching
    #[default]
    NoCollision,
    /// Touching since this frame
    Entering,
    /// Touching for more than one frame
    Colliding,
    /// Stopped touching this frame
    Exiting,
}

impl CollisionState {
    fn next(self, colliding: bool) -> Self {
        match (self, colliding) {
            (Self::NoCollision | Self::Exiting, true) => Self::Entering,
            (Self::Entering | Self::Colliding, true) => Self::Colliding,
            (Self::Entering | Self::Colliding, false) => Self::Exiting,
            (Self::NoCollision | Self::Exiting, false) => Self::NoCollision,
        }
    }
}

/// Contact report for one pair, lower handle first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    /// First entity
    pub first: EntityHandle,
    /// Second entity
    pub second: EntityHandle,
    /// State after this frame
    pub state: CollisionState,
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Box(Aabb),
    Sphere(Sphere),
}

impl Shape {
    fn translated(self, offset: &Vec3) -> Self {
        match self {
            Self::Box(aabb) => Self::Box(Aabb::new(aabb.min + offset, aabb.max + offset)),
            Self::Sphere(sphere) => Self::Sphere(Sphere::new(sphere.center + offset, sphere.radius)),
        }
    }

    fn overlaps(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Box(a), Self::Box(b)) => aabb_vs_aabb(a, b),
            (Self::Sphere(a), Self::Sphere(b)) => sphere_vs_sphere(&a.center, a.radius, &b.center, b.radius),
            (Self::Sphere(s), Self::Box(b)) | (Self::Box(b), Self::Sphere(s)) => {
                sphere_vs_aabb(&s.center, s.radius, &b.center(), &b.size())
            }
        }
    }
}

#[derive(Debug)]
struct Collider<'a> {
    handle: EntityHandle,
    tag: &'a str,
    shape: Shape,
    trigger: bool,
    body: Option<&'a RigidBodyComponent>,
}

impl Collider<'_> {
    fn from_entity<'a>(entity: &'a Entity, dt: f32) -> Option<Collider<'a>> {
        let transform = entity.get::<TransformComponent>()?;
        let (shape, trigger) = if let Some(collider) = entity.get::<BoxColliderComponent>() {
            (Shape::Box(collider.world_box(transform)), collider.is_trigger)
        } else {
            let collider = entity.get::<SphereColliderComponent>()?;
            (Shape::Sphere(collider.world_sphere(transform)), collider.is_trigger)
        };
        let body = entity.get::<RigidBodyComponent>();
        let shape = match body {
            Some(body) => shape.translated(&(body.velocity * dt)),
            None => shape,
        };
        Some(Collider {
            handle: entity.handle(),
            tag: entity.tag(),
            shape,
            trigger,
            body,
        })
    }

    fn interacts_with(&self, other: &Self) -> bool {
        if self.body.is_none() && other.body.is_none() {
            return false;
        }
        let accepts = |a: &Self, b: &Self| a.body.map_or(true, |body| body.collisions_enabled && !body.ignores(b.tag));
        accepts(self, other) && accepts(other, self)
    }
}

/// Moves rigid bodies and tracks collider contacts
#[derive(Debug, Default)]
pub struct PhysicsSystem {
    states: HashMap<(EntityHandle, EntityHandle), CollisionState>,
    events: Vec<CollisionEvent>,
}

impl PhysicsSystem {
    /// Create a physics system with no contacts
    pub fn new() -> Self {
        Self::default()
    }

    /// Contacts that changed or persisted during the last update
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Current state of a pair, in either order
    pub fn state(&self, a: EntityHandle, b: EntityHandle) -> CollisionState {
        self.states
            .get(&(a.min(b), a.max(b)))
            .copied()
            .unwrap_or_default()
    }

    /// Update pair states; returns the bodies that must stop
    fn detect(&mut self, em: &EntityManager, dt: f32) -> Vec<EntityHandle> {
        let colliders: Vec<Collider<'_>> = em
            .entities()
            .filter(|entity| em.is_announced(entity.handle()))
            .filter_map(|entity| Collider::from_entity(entity, dt))
            .collect();

        let mut stopped = Vec::new();
        let mut tested = HashMap::new();
        for (i, a) in colliders.iter().enumerate() {
            for b in &colliders[i + 1..] {
                if !a.interacts_with(b) {
                    continue;
                }
                let colliding = a.shape.overlaps(&b.shape);
                if colliding && !a.trigger && !b.trigger {
                    stopped.extend(a.body.map(|_| a.handle));
                    stopped.extend(b.body.map(|_| b.handle));
                }
                let key = (a.handle.min(b.handle), a.handle.max(b.handle));
                tested.insert(key, colliding);
            }
        }

        // pairs that were not tested this frame (destroyed or filtered) are leaving
        for key in self.states.keys() {
            tested.entry(*key).or_insert(false);
        }

        self.events.clear();
        for (key, colliding) in tested {
            let state = self.states.get(&key).copied().unwrap_or_default().next(colliding);
            if state == CollisionState::NoCollision {
                self.states.remove(&key);
                continue;
            }
            self.states.insert(key, state);
            self.events.push(CollisionEvent {
                first: key.0,
                second: key.1,
                state,
            });
        }
        self.events.sort_by_key(|event| (event.first, event.second));
        stopped
    }
}

impl System for PhysicsSystem {
    fn name(&self) -> &str {
        "physics"
    }

    fn dependencies(&self) -> Vec<ComponentId> {
        vec![TransformComponent::component_id(), RigidBodyComponent::component_id()]
    }

    fn update(&mut self, em: &mut EntityManager, dt: f32) -> EngineResult<()> {
        let members = em.entities_for_system(self.name()).to_vec();
        for &handle in &members {
            if let Some(body) = em.get_entity_mut(handle).and_then(|e| e.get_mut::<RigidBodyComponent>()) {
                body.velocity += body.gravity * dt;
            }
        }

        for handle in self.detect(em, dt) {
            if let Some(body) = em.get_entity_mut(handle).and_then(|e| e.get_mut::<RigidBodyComponent>()) {
                body.velocity = Vec3::zeros();
            }
        }

        for handle in members {
            let Some(entity) = em.get_entity_mut(handle) else {
                continue;
            };
            let Some(velocity) = entity.get::<RigidBodyComponent>().map(|body| body.velocity) else {
                continue;
            };
            if let Some(transform) = entity.get_mut::<TransformComponent>() {
                transform.pos += velocity * dt;
            }
        }
        Ok(())
    }
}
