//! Built-in primitive models
//!
//! Every primitive fits in the unit cube centered on the origin.

use std::f32::consts::TAU;

use super::model::Vertex;

const SEGMENTS: u32 = 32;
const RINGS: u32 = 16;

/// Primitive shapes available without a model file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    /// Unit quad in the XY plane, facing +Z
    Plane,
    /// Unit cube
    Box,
    /// Sphere of diameter 1
    Sphere,
    /// Disc of diameter 1 in the XY plane
    Circle,
    /// Cone along +Y
    Cone,
    /// Quad with a top edge half as wide as the bottom
    Trapeze,
    /// Cylinder along Y
    Cylinder,
}

impl GeometryType {
    /// Every primitive
    pub const ALL: [Self; 7] = [
        Self::Plane,
        Self::Box,
        Self::Sphere,
        Self::Circle,
        Self::Cone,
        Self::Trapeze,
        Self::Cylinder,
    ];

    /// Parse a JSON name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.name() == name)
    }

    /// JSON name, also the model cache key
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plane => "PLANE",
            Self::Box => "BOX",
            Self::Sphere => "SPHERE",
            Self::Circle => "CIRCLE",
            Self::Cone => "CONE",
            Self::Trapeze => "TRAPEZE",
            Self::Cylinder => "CYLINDER",
        }
    }

    /// Vertices and indices
    pub fn build(self) -> (Vec<Vertex>, Vec<u32>) {
        match self {
            Self::Plane => quad(0.5),
            Self::Box => cube(),
            Self::Sphere => sphere(),
            Self::Circle => disc(0.0, 1.0),
            Self::Cone => cone(),
            Self::Trapeze => quad(0.25),
            Self::Cylinder => cylinder(),
        }
    }
}

fn quad(top_half_width: f32) -> (Vec<Vertex>, Vec<u32>) {
    let n = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex::new([-0.5, -0.5, 0.0], n, [0.0, 0.0]),
        Vertex::new([0.5, -0.5, 0.0], n, [1.0, 0.0]),
        Vertex::new([top_half_width, 0.5, 0.0], n, [1.0, 1.0]),
        Vertex::new([-top_half_width, 0.5, 0.0], n, [0.0, 1.0]),
    ];
    (vertices, vec![0, 1, 2, 2, 3, 0])
}

/// Unit cube with per-face normals
pub fn cube() -> (Vec<Vertex>, Vec<u32>) {
    // (normal, tangent u, tangent v)
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (n, u, v) in faces {
        let base = u32::try_from(vertices.len()).unwrap_or(u32::MAX);
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let p = [
                n[0] * 0.5 + u[0] * su + v[0] * sv,
                n[1] * 0.5 + u[1] * su + v[1] * sv,
                n[2] * 0.5 + u[2] * su + v[2] * sv,
            ];
            vertices.push(Vertex::new(p, n, [su + 0.5, sv + 0.5]));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

#[allow(clippy::cast_precision_loss)]
fn sphere() -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for ring in 0..=RINGS {
        let phi = std::f32::consts::PI * ring as f32 / RINGS as f32;
        for segment in 0..=SEGMENTS {
            let theta = TAU * segment as f32 / SEGMENTS as f32;
            let n = [phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()];
            vertices.push(Vertex::new(
                [n[0] * 0.5, n[1] * 0.5, n[2] * 0.5],
                n,
                [segment as f32 / SEGMENTS as f32, ring as f32 / RINGS as f32],
            ));
        }
    }
    let stride = SEGMENTS + 1;
    for ring in 0..RINGS {
        for segment in 0..SEGMENTS {
            let a = ring * stride + segment;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    (vertices, indices)
}

/// Disc at height `y` (XY plane when `y` is zero and `facing` is +Z)
#[allow(clippy::cast_precision_loss)]
fn disc(y: f32, facing: f32) -> (Vec<Vertex>, Vec<u32>) {
    let flat = y == 0.0;
    let n = if flat { [0.0, 0.0, facing] } else { [0.0, facing, 0.0] };
    let mut vertices = vec![Vertex::new([0.0, y, 0.0], n, [0.5, 0.5])];
    for segment in 0..=SEGMENTS {
        let theta = TAU * segment as f32 / SEGMENTS as f32;
        let (s, c) = theta.sin_cos();
        let p = if flat { [c * 0.5, s * 0.5, 0.0] } else { [c * 0.5, y, s * 0.5] };
        vertices.push(Vertex::new(p, n, [c * 0.5 + 0.5, s * 0.5 + 0.5]));
    }
    let indices = (1..=SEGMENTS)
        .flat_map(|i| if facing > 0.0 { [0, i, i + 1] } else { [0, i + 1, i] })
        .collect();
    (vertices, indices)
}

fn append(target: &mut (Vec<Vertex>, Vec<u32>), part: (Vec<Vertex>, Vec<u32>)) {
    let base = u32::try_from(target.0.len()).unwrap_or(u32::MAX);
    target.0.extend(part.0);
    target.1.extend(part.1.into_iter().map(|i| i + base));
}

#[allow(clippy::cast_precision_loss)]
fn cone() -> (Vec<Vertex>, Vec<u32>) {
    let mut side = (Vec::new(), Vec::new());
    for segment in 0..=SEGMENTS {
        let theta = TAU * segment as f32 / SEGMENTS as f32;
        let (s, c) = theta.sin_cos();
        let n = [c, 0.5, s];
        let u = segment as f32 / SEGMENTS as f32;
        side.0.push(Vertex::new([c * 0.5, -0.5, s * 0.5], n, [u, 0.0]));
        side.0.push(Vertex::new([0.0, 0.5, 0.0], n, [u, 1.0]));
    }
    for segment in 0..SEGMENTS {
        let a = segment * 2;
        side.1.extend_from_slice(&[a, a + 1, a + 2]);
    }
    append(&mut side, disc(-0.5, -1.0));
    side
}

#[allow(clippy::cast_precision_loss)]
fn cylinder() -> (Vec<Vertex>, Vec<u32>) {
    let mut side = (Vec::new(), Vec::new());
    for segment in 0..=SEGMENTS {
        let theta = TAU * segment as f32 / SEGMENTS as f32;
        let (s, c) = theta.sin_cos();
        let u = segment as f32 / SEGMENTS as f32;
        side.0.push(Vertex::new([c * 0.5, -0.5, s * 0.5], [c, 0.0, s], [u, 0.0]));
        side.0.push(Vertex::new([c * 0.5, 0.5, s * 0.5], [c, 0.0, s], [u, 1.0]));
    }
    for segment in 0..SEGMENTS {
        let a = segment * 2;
        side.1.extend_from_slice(&[a, a + 1, a + 2, a + 2, a + 1, a + 3]);
    }
    append(&mut side, disc(0.5, 1.0));
    append(&mut side, disc(-0.5, -1.0));
    side
}
