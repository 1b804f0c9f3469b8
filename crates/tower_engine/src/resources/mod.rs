//! Shared asset storage
//!
//! Models, materials, textures and fonts are owned by the
//! [`ResourceManager`]; components refer to them by handle.

pub mod geometry;
pub mod loader;
pub mod model;
pub mod resource_manager;

pub use geometry::GeometryType;
pub use loader::{AssetLoader, FontData, GlyphData, MeshData, ModelData, PlaceholderLoader, TextureData};
pub use model::{Bounds, Font, Glyph, Mesh, Model, ModelInstance, Texture, Vertex};
pub use resource_manager::{ResourceManager, DEFAULT_MATERIAL};
