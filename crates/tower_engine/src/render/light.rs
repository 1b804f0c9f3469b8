//! Directional lights

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Vec3;

/// A directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Ambient color
    pub ambient: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Direction the light travels
    pub direction: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            ambient: Vec3::new(0.3, 0.3, 0.3),
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            direction: Vec3::new(0.0, -1.0, 0.0),
        }
    }
}

impl Light {
    /// Fixed light used by the UI pass
    pub fn ui() -> Self {
        Self {
            ambient: Vec3::new(1.0, 1.0, 1.0),
            diffuse: Vec3::zeros(),
            direction: Vec3::new(0.0, 0.0, -1.0),
        }
    }

    /// Uniform block entry
    pub fn uniform(&self) -> LightUniform {
        LightUniform {
            ambient: [self.ambient.x, self.ambient.y, self.ambient.z, 0.0],
            diffuse: [self.diffuse.x, self.diffuse.y, self.diffuse.z, 0.0],
            direction: [self.direction.x, self.direction.y, self.direction.z, 0.0],
        }
    }
}

/// std140 layout of one light
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniform {
    /// Ambient color
    pub ambient: [f32; 4],
    /// Diffuse color
    pub diffuse: [f32; 4],
    /// Direction
    pub direction: [f32; 4],
}
