//! Asset decoding boundary
//!
//! Model parsing, image decoding and font rasterization happen behind
//! [`AssetLoader`]. The engine only consumes the decoded data.

use std::path::Path;

use super::geometry;
use super::model::Vertex;
use crate::error::EngineResult;
use crate::foundation::math::Vec2;

/// One decoded mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertices
    pub vertices: Vec<Vertex>,
    /// Triangle indices
    pub indices: Vec<u32>,
    /// Name of the material the file assigns, if any
    pub material: Option<String>,
}

/// One decoded model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelData {
    /// Meshes in file order
    pub meshes: Vec<MeshData>,
}

/// One decoded image
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// RGBA8 pixels
    pub pixels: Vec<u8>,
}

/// One rasterized character
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphData {
    /// Character
    pub character: char,
    /// Bitmap size
    pub size: Vec2,
    /// Bearing from the pen position
    pub bearing: Vec2,
    /// Pen advance
    pub advance: f32,
    /// Bitmap
    pub bitmap: TextureData,
}

/// One rasterized font
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontData {
    /// Glyphs
    pub glyphs: Vec<GlyphData>,
}

/// Decoder for asset files
pub trait AssetLoader {
    /// Decode a model file
    fn load_model(&mut self, path: &Path) -> EngineResult<ModelData>;

    /// Decode an image file
    fn load_texture(&mut self, path: &Path) -> EngineResult<TextureData>;

    /// Rasterize a font at `size` pixels
    fn load_font(&mut self, path: &Path, size: u32) -> EngineResult<FontData>;
}

/// Loader that never touches the disk
///
/// Models become unit cubes, textures a single white pixel and fonts a
/// monospaced printable ASCII set. Used by tests and headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderLoader;

fn white_pixel() -> TextureData {
    TextureData {
        width: 1,
        height: 1,
        pixels: vec![255; 4],
    }
}

impl AssetLoader for PlaceholderLoader {
    fn load_model(&mut self, path: &Path) -> EngineResult<ModelData> {
        log::debug!("Placeholder model for {}", path.display());
        let (vertices, indices) = geometry::cube();
        Ok(ModelData {
            meshes: vec![MeshData {
                vertices,
                indices,
                material: None,
            }],
        })
    }

    fn load_texture(&mut self, path: &Path) -> EngineResult<TextureData> {
        log::debug!("Placeholder texture for {}", path.display());
        Ok(white_pixel())
    }

    #[allow(clippy::cast_precision_loss)]
    fn load_font(&mut self, path: &Path, size: u32) -> EngineResult<FontData> {
        log::debug!("Placeholder font for {}", path.display());
        let size = size as f32;
        let glyphs = (' '..='~')
            .map(|character| GlyphData {
                character,
                size: Vec2::new(size * 0.5, size),
                bearing: Vec2::new(0.0, size),
                advance: size * 0.6,
                bitmap: white_pixel(),
            })
            .collect();
        Ok(FontData { glyphs })
    }
}
