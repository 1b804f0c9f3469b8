//! # Systems
//!
//! Per-frame logic run over the entity manager, in this order each frame:
//!
//! 1. [`PhysicsSystem`]: gravity, contacts, movement
//! 2. [`ParticleSystem`]: particle spawning and aging
//! 3. [`RenderingSystem`]: animation playback, queue collection, drawing

mod animation;
mod particles;
mod physics;
mod rendering;

pub use animation::AnimationSystem;
pub use particles::ParticleSystem;
pub use physics::{CollisionEvent, CollisionState, PhysicsSystem};
pub use rendering::RenderingSystem;
