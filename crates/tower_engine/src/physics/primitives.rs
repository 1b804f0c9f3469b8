//! Primitive shapes and intersection tests
//!
//! Pure functions over plain vectors. Boxes are axis aligned; callers move
//! them into world space before testing.

use crate::foundation::math::{Vec2, Vec3};

/// A ray for picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin in world space
    pub origin: Vec3,
    /// Normalized direction
    pub direction: Vec3,
}

impl Ray {
    /// Ray from an origin toward a direction; the direction is normalized
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at distance `t` along the ray
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned box given by its corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Box from its corners
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Full extent
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }
}

/// Sphere given by center and radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center
    pub center: Vec3,
    /// Radius
    pub radius: f32,
}

impl Sphere {
    /// Sphere from center and radius
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Overlap of two spheres, touching counts
pub fn sphere_vs_sphere(c1: &Vec3, r1: f32, c2: &Vec3, r2: f32) -> bool {
    let radii = r1 + r2;
    (c1 - c2).magnitude_squared() <= radii * radii
}

/// Containment of a point in the box `[min, min + size]`, boundaries included
pub fn point_vs_aabb(point: &Vec3, box_min: &Vec3, box_size: &Vec3) -> bool {
    (0..3).all(|axis| point[axis] >= box_min[axis] && point[axis] <= box_min[axis] + box_size[axis])
}

/// Overlap of a sphere and a box given by its center and size
pub fn sphere_vs_aabb(center: &Vec3, radius: f32, box_center: &Vec3, box_size: &Vec3) -> bool {
    let min = box_center - box_size / 2.0;
    let max = min + box_size;
    let distance: f32 = (0..3)
        .map(|axis| {
            let v = center[axis];
            if v < min[axis] {
                (min[axis] - v).powi(2)
            } else if v > max[axis] {
                (v - max[axis]).powi(2)
            } else {
                0.0
            }
        })
        .sum();
    distance <= radius * radius
}

/// Entry distance of a ray into a box, slab method
///
/// `None` is a miss, including boxes entirely behind the origin. A ray
/// starting inside the box hits at `Some(0.0)`.
pub fn ray_vs_aabb(ray: &Ray, box_min: &Vec3, box_max: &Vec3) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];
        if direction == 0.0 {
            if origin < box_min[axis] || origin > box_max[axis] {
                return None;
            }
            continue;
        }
        let t1 = (box_min[axis] - origin) / direction;
        let t2 = (box_max[axis] - origin) / direction;
        t_near = t_near.max(t1.min(t2));
        t_far = t_far.min(t1.max(t2));
        if t_near > t_far || t_far < 0.0 {
            return None;
        }
    }
    Some(t_near.max(0.0))
}

/// Distance along a ray to a plane, if the ray hits it in front of the origin
pub fn ray_vs_plane(ray: &Ray, plane_normal: &Vec3, plane_pos: &Vec3) -> Option<f32> {
    let denom = plane_normal.dot(&ray.direction);
    if denom.abs() <= 1e-4 {
        return None;
    }
    let distance = (plane_pos - ray.origin).dot(plane_normal) / denom;
    (distance >= 0.0).then_some(distance)
}

/// Overlap of two 2D rectangles given by their corners, touching counts
pub fn rect_vs_rect(min1: &Vec2, max1: &Vec2, min2: &Vec2, max2: &Vec2) -> bool {
    !(max1.x < min2.x || min1.x > max2.x || max1.y < min2.y || min1.y > max2.y)
}

/// Overlap of two boxes given by their corners
pub fn aabb_vs_aabb(a: &Aabb, b: &Aabb) -> bool {
    (0..3).all(|axis| a.min[axis] <= b.max[axis] && a.max[axis] >= b.min[axis])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_vs_sphere() {
        assert!(sphere_vs_sphere(&Vec3::zeros(), 1.0, &Vec3::new(1.0, 0.0, 0.0), 1.0));
        assert!(!sphere_vs_sphere(&Vec3::zeros(), 1.0, &Vec3::new(3.0, 0.0, 0.0), 1.0));
        // exactly touching
        assert!(sphere_vs_sphere(&Vec3::zeros(), 1.0, &Vec3::new(2.0, 0.0, 0.0), 1.0));
    }

    #[test]
    fn test_point_vs_aabb() {
        let unit = Vec3::new(1.0, 1.0, 1.0);
        assert!(point_vs_aabb(&Vec3::new(0.5, 0.5, 0.5), &Vec3::zeros(), &unit));
        assert!(!point_vs_aabb(&Vec3::new(2.0, 0.0, 0.0), &Vec3::zeros(), &unit));
        assert!(point_vs_aabb(&unit, &Vec3::zeros(), &unit));
    }

    #[test]
    fn test_sphere_vs_aabb_uses_box_center() {
        let size = Vec3::new(2.0, 2.0, 2.0);
        assert!(sphere_vs_aabb(&Vec3::new(1.5, 0.0, 0.0), 0.6, &Vec3::zeros(), &size));
        assert!(!sphere_vs_aabb(&Vec3::new(1.5, 0.0, 0.0), 0.4, &Vec3::zeros(), &size));
        assert!(sphere_vs_aabb(&Vec3::zeros(), 0.1, &Vec3::zeros(), &size));
    }

    #[test]
    fn test_ray_vs_aabb_entry_distance() {
        let ray = Ray::new(Vec3::new(-5.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let t = ray_vs_aabb(&ray, &Vec3::zeros(), &Vec3::new(1.0, 1.0, 1.0)).unwrap();
        assert_relative_eq!(t, 5.0);
        assert_relative_eq!(ray.point_at(t).x, 0.0);
    }

    #[test]
    fn test_ray_vs_aabb_misses() {
        let (min, max) = (Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        // parallel and outside the Y slab
        let parallel = Ray::new(Vec3::new(-5.0, 3.0, 0.5), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ray_vs_aabb(&parallel, &min, &max), None);
        // box behind the origin
        let away = Ray::new(Vec3::new(5.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ray_vs_aabb(&away, &min, &max), None);
    }

    #[test]
    fn test_ray_inside_box_hits_at_zero() {
        let ray = Ray::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(ray_vs_aabb(&ray, &Vec3::zeros(), &Vec3::new(1.0, 1.0, 1.0)), Some(0.0));
    }

    #[test]
    fn test_ray_vs_plane() {
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let up = Vec3::new(0.0, 1.0, 0.0);
        assert_relative_eq!(ray_vs_plane(&ray, &up, &Vec3::zeros()).unwrap(), 10.0);
        let flat = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ray_vs_plane(&flat, &up, &Vec3::zeros()), None);
    }

    #[test]
    fn test_rect_vs_rect() {
        let (a_min, a_max) = (Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
        assert!(rect_vs_rect(&a_min, &a_max, &Vec2::new(1.0, 1.0), &Vec2::new(3.0, 3.0)));
        assert!(rect_vs_rect(&a_min, &a_max, &Vec2::new(2.0, 0.0), &Vec2::new(3.0, 1.0)));
        assert!(!rect_vs_rect(&a_min, &a_max, &Vec2::new(2.1, 0.0), &Vec2::new(3.0, 1.0)));
    }
}
