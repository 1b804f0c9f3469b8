//! Collision primitives and picking
//!
//! Geometry tests consumed by the physics system, the game's hit boxes and
//! mouse picking.

pub mod picking;
pub mod primitives;

pub use picking::{raycast, raycast_all, raycast_plane};
pub use primitives::{
    aabb_vs_aabb, point_vs_aabb, ray_vs_aabb, ray_vs_plane, rect_vs_rect, sphere_vs_aabb, sphere_vs_sphere, Aabb,
    Ray, Sphere,
};
