//! # Rendering
//!
//! Device-agnostic multi-pass renderer. Systems fill a [`RenderQueue`] each
//! frame; the [`Renderer`] consumes it through a [`GraphicsDevice`],
//! drawing the scene, UI and text into a [`FramebufferChain`], blurring the
//! bright pass across the bloom tiers and compositing everything onto the
//! back buffer.
//!
//! ## Modules
//!
//! - [`device`]: the graphics device trait and its opaque object ids
//! - [`headless`]: a recording device used by tests and headless runs
//! - [`material`]: materials, blend factors and shader permutations
//! - [`render_queue`]: per-frame draw lists
//! - [`renderer`]: the pass pipeline
//! - [`framebuffer`]: scene framebuffer and bloom tiers
//! - [`buffer_pool`]: uniform buffer sub-allocation
//! - [`shader_cache`]: lazily compiled shader programs
//! - [`camera`], [`light`], [`text`]: per-frame inputs
//! - [`offscreen`]: model previews rendered into textures

pub mod buffer_pool;
pub mod camera;
pub mod device;
pub mod framebuffer;
pub mod headless;
pub mod light;
pub mod material;
pub mod offscreen;
pub mod render_queue;
pub mod renderer;
pub mod shader_cache;
pub mod text;

pub use buffer_pool::{BufferPool, UboRegion};
pub use camera::{Camera, CameraUniform, Projection, ViewportRect};
pub use device::{
    BufferId, FramebufferDesc, FramebufferId, GpuTextureId, GraphicsDevice, MeshId, RenderTarget, ShaderId,
    UniformSlot, Viewport,
};
pub use framebuffer::{BloomTier, FramebufferChain};
pub use headless::{DeviceCommand, HeadlessDevice};
pub use light::{Light, LightUniform};
pub use material::{BlendFactor, Material, MaterialDescriptor, MaterialOptions, ShaderPermutation};
pub use offscreen::OffscreenRenderer;
pub use render_queue::{DrawParams, RenderQueue, RenderableMesh, RenderableText};
pub use renderer::{FrameStats, InstanceData, Renderer};
pub use shader_cache::{ShaderCache, ShaderKind};
pub use text::{layout_text, measure_text, GlyphQuad};

/// Rendering errors
///
/// Converted into [`EngineError::InternalError`](crate::error::EngineError::InternalError)
/// when they leave the renderer.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// A rendering operation failed during execution
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Resource creation or management failed
    ///
    /// GPU objects (buffers, textures, framebuffers) could not be created,
    /// typically because of invalid sizes or exhausted memory.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// A framebuffer failed its completeness check
    #[error("Framebuffer incomplete: {0}")]
    FramebufferIncomplete(String),

    /// A shader program failed to compile or link
    #[error("Shader compilation failed: {0}")]
    ShaderCompilation(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
