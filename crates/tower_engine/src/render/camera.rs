//! Camera consumed by the renderer

use bytemuck::{Pod, Zeroable};

use super::device::Viewport;
use crate::foundation::math::{mat4_to_cols, quat_from_euler_degrees, Mat4, Vec2, Vec3};

/// Projection model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Perspective with a vertical field of view
    #[default]
    Perspective,
    /// Orthographic in world units, `projection_size` tall
    Orthographic3d,
    /// Orthographic in pixels, origin at the bottom-left corner
    Orthographic2d,
}

impl Projection {
    /// Parse a JSON name, defaulting to perspective
    pub fn from_name(name: &str) -> Self {
        match name {
            "ORTHOGRAPHIC_3D" => Self::Orthographic3d,
            "ORTHOGRAPHIC_2D" => Self::Orthographic2d,
            _ => Self::Perspective,
        }
    }

    /// JSON name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Perspective => "PERSPECTIVE",
            Self::Orthographic3d => "ORTHOGRAPHIC_3D",
            Self::Orthographic2d => "ORTHOGRAPHIC_2D",
        }
    }
}

/// Normalized viewport rectangle, fractions of the target size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    /// Bottom-left corner
    pub offset: Vec2,
    /// Size
    pub extent: Vec2,
}

impl Default for ViewportRect {
    fn default() -> Self {
        Self {
            offset: Vec2::zeros(),
            extent: Vec2::new(1.0, 1.0),
        }
    }
}

impl ViewportRect {
    /// Pixel rectangle inside a `width` x `height` target
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn to_pixels(&self, width: u32, height: u32) -> Viewport {
        let (w, h) = (width as f32, height as f32);
        Viewport {
            x: (self.offset.x * w).round().max(0.0) as u32,
            y: (self.offset.y * h).round().max(0.0) as u32,
            width: (self.extent.x * w).round().max(1.0) as u32,
            height: (self.extent.y * h).round().max(1.0) as u32,
        }
    }
}

/// Camera state for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Projection model
    pub projection: Projection,
    /// Height of the orthographic volume
    pub projection_size: f32,
    /// Near plane
    pub near: f32,
    /// Far plane
    pub far: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Viewport inside the target
    pub viewport: ViewportRect,
    /// World position
    pub position: Vec3,
    /// Euler rotation in degrees
    pub rotation: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Projection::Perspective,
            projection_size: 500.0,
            near: 0.1,
            far: 100.0,
            fov: 45.0,
            viewport: ViewportRect::default(),
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
        }
    }
}

/// Camera uniform block
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    /// World to view
    pub view: [[f32; 4]; 4],
    /// View to clip
    pub proj: [[f32; 4]; 4],
    /// World position, `w` unused
    pub position: [f32; 4],
}

impl Camera {
    /// Screen-space camera used for UI and text
    pub fn screen() -> Self {
        Self {
            projection: Projection::Orthographic2d,
            near: -1.0,
            far: 1.0,
            ..Self::default()
        }
    }

    /// Camera at `position` looking toward `target`
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let dir = target - position;
        let yaw = (-dir.x).atan2(-dir.z).to_degrees();
        let pitch = dir.y.atan2(dir.x.hypot(dir.z)).to_degrees();
        Self {
            position,
            rotation: Vec3::new(pitch, yaw, 0.0),
            ..Self::default()
        }
    }

    /// World to view matrix
    pub fn view_matrix(&self) -> Mat4 {
        if self.projection == Projection::Orthographic2d {
            return Mat4::identity();
        }
        // yaw around Y, then pitch around X
        let yaw = quat_from_euler_degrees(&Vec3::new(0.0, self.rotation.y, 0.0));
        let pitch = quat_from_euler_degrees(&Vec3::new(self.rotation.x, 0.0, 0.0));
        let roll = quat_from_euler_degrees(&Vec3::new(0.0, 0.0, self.rotation.z));
        let world = Mat4::new_translation(&self.position) * (yaw * pitch * roll).to_homogeneous();
        world.try_inverse().unwrap_or_else(Mat4::identity)
    }

    /// View to clip matrix for a `width` x `height` viewport
    #[allow(clippy::cast_precision_loss)]
    pub fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        match self.projection {
            Projection::Perspective => Mat4::new_perspective(w / h, self.fov.to_radians(), self.near, self.far),
            Projection::Orthographic3d => {
                let half_h = self.projection_size * 0.5;
                let half_w = half_h * w / h;
                Mat4::new_orthographic(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
            Projection::Orthographic2d => Mat4::new_orthographic(0.0, w, 0.0, h, self.near, self.far),
        }
    }

    /// Uniform block contents
    pub fn uniform(&self, width: u32, height: u32) -> CameraUniform {
        CameraUniform {
            view: mat4_to_cols(&self.view_matrix()),
            proj: mat4_to_cols(&self.projection_matrix(width, height)),
            position: [self.position.x, self.position.y, self.position.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_projection_names() {
        assert_eq!(Projection::from_name("ORTHOGRAPHIC_2D"), Projection::Orthographic2d);
        assert_eq!(Projection::from_name("unknown"), Projection::Perspective);
    }

    #[test]
    fn test_viewport_to_pixels() {
        let rect = ViewportRect {
            offset: Vec2::new(0.5, 0.0),
            extent: Vec2::new(0.5, 1.0),
        };
        assert_eq!(
            rect.to_pixels(800, 600),
            Viewport { x: 400, y: 0, width: 400, height: 600 }
        );
    }

    #[test]
    fn test_view_moves_world_opposite_to_camera() {
        let camera = Camera {
            position: Vec3::new(0.0, 0.0, 10.0),
            ..Camera::default()
        };
        let p = camera.view_matrix().transform_point(&Point3::origin());
        assert_relative_eq!(p.z, -10.0, epsilon = 1e-5);
    }

    #[test]
    fn test_looking_at_centers_target() {
        let camera = Camera::looking_at(Vec3::new(5.0, 5.0, 5.0), Vec3::zeros());
        let p = camera.view_matrix().transform_point(&Point3::origin());
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-4);
        assert!(p.z < 0.0);
    }
}
