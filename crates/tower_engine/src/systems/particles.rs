//! Particle emission
//!
//! Each emitter keeps its live particles in its own component state. Every
//! update moves and ages the particles, ages the emitter and, once `rate`
//! seconds have passed, spawns a new burst inside the emission cone.
//!
//! An emitter with a finite `emitter_life` stops spawning when it expires
//! and its entity is destroyed once the last particle dies. In editor mode
//! the emitter restarts instead.

use std::f32::consts::{FRAC_PI_2, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::{Particle, ParticleEmitterComponent, RenderComponent, TransformComponent};
use crate::ecs::{ComponentId, ComponentType, EntityManager, System};
use crate::error::EngineResult;
use crate::foundation::math::{quat_from_euler_degrees, Vec3, Vec4};

/// Spawns, moves and retires particles
#[derive(Debug)]
pub struct ParticleSystem {
    rng: StdRng,
    editor_mode: bool,
}

impl ParticleSystem {
    /// Create a particle system seeded from the OS
    pub fn new(editor_mode: bool) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            editor_mode,
        }
    }

    /// Create a particle system with a fixed seed
    pub fn with_seed(seed: u64, editor_mode: bool) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            editor_mode,
        }
    }

    /// Whether expired emitters restart instead of being destroyed
    pub fn editor_mode(&self) -> bool {
        self.editor_mode
    }

    fn vary(&mut self, variance: f32) -> f32 {
        if variance > 0.0 {
            self.rng.gen_range(0.0..=variance)
        } else {
            0.0
        }
    }

    fn vary_vec<const D: usize>(
        &mut self,
        variance: &nalgebra::SVector<f32, D>,
    ) -> nalgebra::SVector<f32, D> {
        variance.map(|v| self.vary(v))
    }

    fn spawn(&mut self, emitter: &ParticleEmitterComponent, transform: &TransformComponent) -> Particle {
        let cone = (emitter.angle + self.vary(emitter.angle_variance)).to_radians();
        let theta = self.rng.gen::<f32>() * TAU;
        let phi = FRAC_PI_2 - self.rng.gen::<f32>() * cone;
        let local = Vec3::new(theta.cos() * phi.cos(), phi.sin(), theta.sin() * phi.cos());
        let direction = quat_from_euler_degrees(&transform.rotation) * local;

        let life = emitter.life
            + if emitter.life_variance > 0 {
                self.rng.gen_range(0..=emitter.life_variance)
            } else {
                0
            };
        #[allow(clippy::cast_precision_loss)]
        let frames = emitter.life.max(1) as f32;

        let color_start: Vec4 = emitter.color.start + self.vary_vec(&emitter.color.start_variance);
        let color_finish: Vec4 = emitter.color.finish + self.vary_vec(&emitter.color.finish_variance);
        let size_start: Vec3 = emitter.size.start + self.vary_vec(&emitter.size.start_variance);
        let size_finish: Vec3 = emitter.size.finish + self.vary_vec(&emitter.size.finish_variance);

        Particle {
            position: transform.pos,
            direction,
            speed: emitter.speed + self.vary(emitter.speed_variance),
            life,
            color: color_start,
            color_step: (color_finish - color_start) / frames,
            size: size_start.component_mul(&transform.scale),
            size_step: ((size_finish - size_start) / frames).component_mul(&transform.scale),
        }
    }

    /// Advance one emitter; returns `true` when its entity should be destroyed
    fn update_emitter(
        &mut self,
        emitter: &mut ParticleEmitterComponent,
        transform: &TransformComponent,
        displayed: bool,
        dt: f32,
    ) -> bool {
        emitter.state.since_spawn += dt;

        emitter.state.particles.retain_mut(|particle| {
            particle.position += particle.direction * dt * particle.speed;
            particle.life = particle.life.saturating_sub(1);
            particle.color += particle.color_step;
            particle.size += particle.size_step;
            particle.life > 0
        });

        if emitter.emitter_life > 0.0 {
            emitter.state.age += dt;
        }

        if emitter.is_expired() {
            if !emitter.state.particles.is_empty() {
                return false;
            }
            if self.editor_mode {
                emitter.state.age = 0.0;
                return false;
            }
            return true;
        }

        if emitter.state.since_spawn >= emitter.rate && displayed {
            let max = emitter.max_particles as usize;
            let room = max.saturating_sub(emitter.state.particles.len());
            let count = (emitter.spawn_nb as usize).min(room);
            for _ in 0..count {
                let particle = self.spawn(emitter, transform);
                emitter.state.particles.push(particle);
            }
            if count > 0 {
                emitter.state.since_spawn = 0.0;
            }
        }
        false
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(false)
    }
}

impl System for ParticleSystem {
    fn name(&self) -> &str {
        "particles"
    }

    fn dependencies(&self) -> Vec<ComponentId> {
        vec![ParticleEmitterComponent::component_id()]
    }

    fn update(&mut self, em: &mut EntityManager, dt: f32) -> EngineResult<()> {
        let mut finished = Vec::new();
        let members = em.entities_for_system(self.name()).to_vec();
        for handle in members {
            let Some(entity) = em.get_entity_mut(handle) else {
                continue;
            };
            let transform = entity.get::<TransformComponent>().cloned().unwrap_or_default();
            let displayed = entity.get::<RenderComponent>().map_or(true, |render| render.display);
            let Some(emitter) = entity.get_mut::<ParticleEmitterComponent>() else {
                continue;
            };
            if self.update_emitter(emitter, &transform, displayed, dt) {
                finished.push(handle);
            }
        }
        for handle in finished {
            log::debug!("Particle emitter {handle:?} expired");
            em.destroy_entity(handle);
        }
        Ok(())
    }
}
