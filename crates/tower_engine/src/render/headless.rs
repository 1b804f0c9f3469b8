//! Headless graphics device
//!
//! Implements [`GraphicsDevice`] without a GPU: object creation hands out
//! sequential ids and every state change or draw is appended to a command
//! log. Tests and the headless game loop inspect the log to check pass order,
//! sorting and state caching.

use std::collections::{HashMap, HashSet};

use super::device::{
    BufferId, FramebufferDesc, FramebufferId, GpuTextureId, GraphicsDevice, MeshId, RenderTarget, ShaderId,
    UniformSlot, Viewport,
};
use super::material::BlendFactor;
use super::shader_cache::ShaderKind;
use super::{RenderError, RenderResult};
use crate::resources::Vertex;

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Framebuffer created
    CreateFramebuffer(FramebufferId, FramebufferDesc),
    /// Framebuffer released
    DestroyFramebuffer(FramebufferId),
    /// Render target bound
    BindTarget(RenderTarget),
    /// Bound target cleared
    Clear,
    /// Viewport set
    Viewport(Viewport),
    /// Depth test toggled
    DepthTest(bool),
    /// Blend function set
    Blend(Option<(BlendFactor, BlendFactor)>),
    /// Program compiled
    CompileShader(ShaderKind, ShaderId),
    /// Program made current
    UseShader(ShaderId),
    /// Mesh uploaded
    CreateMesh(MeshId),
    /// Mesh bound
    BindMesh(MeshId),
    /// Texture uploaded
    CreateTexture(GpuTextureId),
    /// Texture unit bound
    BindTexture(u32, Option<GpuTextureId>),
    /// Uniform buffer created
    CreateBuffer(BufferId, u32),
    /// Uniform buffer written
    WriteBuffer(BufferId, u32, usize),
    /// Uniform range bound
    BindUniform(UniformSlot, BufferId, u32, u32),
    /// Push constants written
    PushConstants(usize),
    /// Non-instanced indexed draw
    DrawIndexed {
        /// Index count
        indices: u32,
    },
    /// Instanced indexed draw
    DrawInstanced {
        /// Index count
        indices: u32,
        /// Instance count
        instances: u32,
    },
    /// Back buffer presented
    Present,
}

impl DeviceCommand {
    /// Whether the command is a draw
    pub const fn is_draw(&self) -> bool {
        matches!(self, Self::DrawIndexed { .. } | Self::DrawInstanced { .. })
    }
}

#[derive(Debug)]
struct FramebufferRecord {
    attachments: Vec<GpuTextureId>,
}

/// Recording device
#[derive(Debug)]
pub struct HeadlessDevice {
    width: u32,
    height: u32,
    alignment: u32,
    next_id: u32,
    framebuffers: HashMap<FramebufferId, FramebufferRecord>,
    incomplete_framebuffers: bool,
    failing_shaders: HashSet<ShaderKind>,
    commands: Vec<DeviceCommand>,
}

impl HeadlessDevice {
    /// Device with a back buffer of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alignment: 256,
            next_id: 1,
            framebuffers: HashMap::new(),
            incomplete_framebuffers: false,
            failing_shaders: HashSet::new(),
            commands: Vec::new(),
        }
    }

    /// Report every framebuffer created from now on as incomplete
    pub fn with_incomplete_framebuffers(mut self) -> Self {
        self.incomplete_framebuffers = true;
        self
    }

    /// Make compiling `kind` fail
    pub fn with_failing_shader(mut self, kind: ShaderKind) -> Self {
        self.failing_shaders.insert(kind);
        self
    }

    /// Change the reported uniform alignment
    pub fn with_uniform_alignment(mut self, alignment: u32) -> Self {
        self.alignment = alignment;
        self
    }

    /// Resize the back buffer
    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Recorded commands
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Drop the command log
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of live framebuffers
    pub fn framebuffer_count(&self) -> usize {
        self.framebuffers.len()
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn uniform_alignment(&self) -> u32 {
        self.alignment
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> RenderResult<FramebufferId> {
        if desc.width == 0 || desc.height == 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "framebuffer size {}x{}",
                desc.width, desc.height
            )));
        }
        let id = FramebufferId(self.next());
        let attachments = (0..desc.color_attachments)
            .map(|_| GpuTextureId(self.next()))
            .collect();
        self.framebuffers.insert(id, FramebufferRecord { attachments });
        self.commands.push(DeviceCommand::CreateFramebuffer(id, *desc));
        Ok(id)
    }

    fn is_framebuffer_complete(&self, framebuffer: FramebufferId) -> bool {
        !self.incomplete_framebuffers && self.framebuffers.contains_key(&framebuffer)
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferId) {
        if self.framebuffers.remove(&framebuffer).is_some() {
            self.commands.push(DeviceCommand::DestroyFramebuffer(framebuffer));
        }
    }

    fn color_attachment(&self, framebuffer: FramebufferId, index: u32) -> Option<GpuTextureId> {
        self.framebuffers
            .get(&framebuffer)?
            .attachments
            .get(index as usize)
            .copied()
    }

    fn bind_target(&mut self, target: RenderTarget) {
        self.commands.push(DeviceCommand::BindTarget(target));
    }

    fn clear(&mut self) {
        self.commands.push(DeviceCommand::Clear);
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(DeviceCommand::Viewport(viewport));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.commands.push(DeviceCommand::DepthTest(enabled));
    }

    fn set_blend(&mut self, blend: Option<(BlendFactor, BlendFactor)>) {
        self.commands.push(DeviceCommand::Blend(blend));
    }

    fn compile_shader(&mut self, kind: ShaderKind) -> RenderResult<ShaderId> {
        if self.failing_shaders.contains(&kind) {
            return Err(RenderError::ShaderCompilation(format!("{kind:?}")));
        }
        let id = ShaderId(self.next());
        self.commands.push(DeviceCommand::CompileShader(kind, id));
        Ok(id)
    }

    fn use_shader(&mut self, shader: ShaderId) {
        self.commands.push(DeviceCommand::UseShader(shader));
    }

    fn create_mesh(&mut self, _vertices: &[Vertex], indices: &[u32]) -> RenderResult<MeshId> {
        if indices.is_empty() {
            return Err(RenderError::ResourceCreationFailed("mesh without indices".into()));
        }
        let id = MeshId(self.next());
        self.commands.push(DeviceCommand::CreateMesh(id));
        Ok(id)
    }

    fn bind_mesh(&mut self, mesh: MeshId) {
        self.commands.push(DeviceCommand::BindMesh(mesh));
    }

    fn create_texture(&mut self, _width: u32, _height: u32, _pixels: &[u8]) -> RenderResult<GpuTextureId> {
        let id = GpuTextureId(self.next());
        self.commands.push(DeviceCommand::CreateTexture(id));
        Ok(id)
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<GpuTextureId>) {
        self.commands.push(DeviceCommand::BindTexture(unit, texture));
    }

    fn create_uniform_buffer(&mut self, size: u32) -> RenderResult<BufferId> {
        let id = BufferId(self.next());
        self.commands.push(DeviceCommand::CreateBuffer(id, size));
        Ok(id)
    }

    fn write_buffer(&mut self, buffer: BufferId, offset: u32, data: &[u8]) {
        self.commands.push(DeviceCommand::WriteBuffer(buffer, offset, data.len()));
    }

    fn bind_uniform_range(&mut self, slot: UniformSlot, buffer: BufferId, offset: u32, size: u32) {
        self.commands.push(DeviceCommand::BindUniform(slot, buffer, offset, size));
    }

    fn push_constants(&mut self, data: &[u8]) {
        self.commands.push(DeviceCommand::PushConstants(data.len()));
    }

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32) {
        self.commands.push(if instance_count > 1 {
            DeviceCommand::DrawInstanced {
                indices: index_count,
                instances: instance_count,
            }
        } else {
            DeviceCommand::DrawIndexed { indices: index_count }
        });
    }

    fn present(&mut self) {
        self.commands.push(DeviceCommand::Present);
    }
}
