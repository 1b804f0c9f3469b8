//! CPU-side asset data owned by the resource manager

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::foundation::collections::{MaterialHandle, ModelHandle, TextureHandle};
use crate::foundation::math::{Vec2, Vec3};
use crate::render::device::GpuTextureId;

/// Interleaved vertex as uploaded to the GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Object space position
    pub position: [f32; 3],
    /// Object space normal
    pub normal: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
}

impl Vertex {
    /// Build a vertex
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, normal, uv }
    }
}

/// Axis-aligned bounds in object space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec3::zeros(),
            max: Vec3::zeros(),
        }
    }
}

impl Bounds {
    /// Bounds enclosing every vertex, or zero-sized when empty
    pub fn from_vertices<'a>(vertices: impl IntoIterator<Item = &'a Vertex>) -> Self {
        let mut vertices = vertices.into_iter();
        let Some(first) = vertices.next() else {
            return Self::default();
        };
        let start = Vec3::from(first.position);
        vertices.fold(Self { min: start, max: start }, |bounds, v| {
            let p = Vec3::from(v.position);
            Self {
                min: bounds.min.inf(&p),
                max: bounds.max.sup(&p),
            }
        })
    }

    /// Union of two bounds
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Size along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Indexed triangle list with one material
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertices
    pub vertices: Vec<Vertex>,
    /// Triangle indices
    pub indices: Vec<u32>,
    /// Default material
    pub material: MaterialHandle,
}

/// A loaded model: one or more meshes
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Cache key (file basename or primitive name)
    pub name: String,
    /// Meshes in file order
    pub meshes: Vec<Mesh>,
    /// Object space bounds of every mesh
    pub bounds: Bounds,
}

/// RGBA8 texture
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Cache key
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// RGBA8 pixels, empty for render targets
    pub pixels: Vec<u8>,
    /// Already resident on the GPU (render target output)
    pub gpu: Option<GpuTextureId>,
}

/// Metrics and bitmap of one font character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Bitmap size in pixels
    pub size: Vec2,
    /// Offset from the pen position to the bitmap's top-left corner
    pub bearing: Vec2,
    /// Horizontal pen advance in pixels
    pub advance: f32,
    /// Glyph bitmap
    pub texture: TextureHandle,
}

/// Font rasterized at one pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    /// Cache key
    pub name: String,
    /// Pixel size the glyphs were rasterized at
    pub size: u32,
    /// Glyphs by character
    pub glyphs: HashMap<char, Glyph>,
}

impl Font {
    /// Glyph of a character
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }
}

/// A model plus the material used for each of its meshes
///
/// Render components own one; the model itself stays shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInstance {
    /// Shared model
    pub model: ModelHandle,
    /// Material per mesh, same order as the model's meshes
    pub materials: Vec<MaterialHandle>,
}

impl ModelInstance {
    /// Instance using every mesh's default material
    pub fn new(model: ModelHandle, source: &Model) -> Self {
        Self {
            model,
            materials: source.meshes.iter().map(|mesh| mesh.material).collect(),
        }
    }
}
