//! Graphics device abstraction
//!
//! The renderer drives the GPU only through [`GraphicsDevice`]. A device
//! hands out opaque ids for the objects it creates; the renderer never sees
//! API-specific types. [`HeadlessDevice`](super::headless::HeadlessDevice)
//! implements it without a GPU.

use super::material::BlendFactor;
use super::shader_cache::ShaderKind;
use super::RenderResult;
use crate::resources::Vertex;

macro_rules! device_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

device_id!(
    /// Framebuffer created by the device
    FramebufferId
);
device_id!(
    /// Texture resident on the GPU
    GpuTextureId
);
device_id!(
    /// Compiled shader program
    ShaderId
);
device_id!(
    /// Uploaded vertex and index buffers
    MeshId
);
device_id!(
    /// Uniform buffer
    BufferId
);

/// Requested framebuffer layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Number of color attachments
    pub color_attachments: u32,
    /// Whether a depth attachment is created
    pub depth: bool,
}

/// Uniform binding points shared by every shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    /// View, projection and camera position
    Camera,
    /// Light array
    Lights,
    /// Per-draw model matrices and colors
    Instances,
}

/// Where draws land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// The window back buffer
    BackBuffer,
    /// One color attachment of a framebuffer
    Attachment(FramebufferId, u32),
    /// Every color attachment of a framebuffer
    Framebuffer(FramebufferId),
}

/// Pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Left edge
    pub x: u32,
    /// Bottom edge
    pub y: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

/// GPU command interface consumed by the renderer
pub trait GraphicsDevice {
    /// Back buffer size
    fn surface_size(&self) -> (u32, u32);

    /// Required alignment of uniform buffer offsets
    fn uniform_alignment(&self) -> u32;

    /// Create a framebuffer
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> RenderResult<FramebufferId>;

    /// Whether a framebuffer can be rendered to
    fn is_framebuffer_complete(&self, framebuffer: FramebufferId) -> bool;

    /// Release a framebuffer and its attachments
    fn destroy_framebuffer(&mut self, framebuffer: FramebufferId);

    /// Texture backing a color attachment
    fn color_attachment(&self, framebuffer: FramebufferId, index: u32) -> Option<GpuTextureId>;

    /// Direct subsequent draws and clears
    fn bind_target(&mut self, target: RenderTarget);

    /// Clear the bound target's color and depth
    fn clear(&mut self);

    /// Set the viewport rectangle
    fn set_viewport(&mut self, viewport: Viewport);

    /// Enable or disable depth test and depth writes
    fn set_depth_test(&mut self, enabled: bool);

    /// Set the blend function, or disable blending with `None`
    fn set_blend(&mut self, blend: Option<(BlendFactor, BlendFactor)>);

    /// Compile a shader program
    fn compile_shader(&mut self, kind: ShaderKind) -> RenderResult<ShaderId>;

    /// Make a program current
    fn use_shader(&mut self, shader: ShaderId);

    /// Upload a mesh
    fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> RenderResult<MeshId>;

    /// Bind a mesh's buffers
    fn bind_mesh(&mut self, mesh: MeshId);

    /// Upload an RGBA8 texture
    fn create_texture(&mut self, width: u32, height: u32, pixels: &[u8]) -> RenderResult<GpuTextureId>;

    /// Bind a texture unit; `None` unbinds it
    fn bind_texture(&mut self, unit: u32, texture: Option<GpuTextureId>);

    /// Allocate a uniform buffer
    fn create_uniform_buffer(&mut self, size: u32) -> RenderResult<BufferId>;

    /// Write bytes into a uniform buffer
    fn write_buffer(&mut self, buffer: BufferId, offset: u32, data: &[u8]);

    /// Bind a range of a uniform buffer to a slot
    fn bind_uniform_range(&mut self, slot: UniformSlot, buffer: BufferId, offset: u32, size: u32);

    /// Small per-draw constants
    fn push_constants(&mut self, data: &[u8]);

    /// Draw the bound mesh
    fn draw_indexed(&mut self, index_count: u32, instance_count: u32);

    /// Present the back buffer
    fn present(&mut self);
}
