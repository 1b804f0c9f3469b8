//! # Multi-pass renderer
//!
//! Consumes a [`RenderQueue`] once per frame through a [`GraphicsDevice`]:
//!
//! 1. begin frame: clear the back buffer and every framebuffer of the chain
//! 2. scene pass: opaque then transparent meshes into the scene framebuffer
//! 3. UI pass: opaque then transparent UI meshes, depth test off
//! 4. text pass: one quad per glyph
//! 5. bloom: per tier downsample, horizontal blur, vertical blur
//! 6. composite: scene color plus every tier, blended additively
//! 7. present
//!
//! A missing camera skips the scene pass with a warning. A frame with no
//! queued light uses [`Light::default`]. Shader programs are switched only
//! when the permutation changes between consecutive draws.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use super::buffer_pool::{BufferPool, UboRegion};
use super::camera::Camera;
use super::device::{BufferId, GpuTextureId, GraphicsDevice, MeshId, RenderTarget, UniformSlot, Viewport};
use super::framebuffer::{FramebufferChain, SCENE_BRIGHT, SCENE_COLOR, TIER_HORIZONTAL, TIER_VERTICAL};
use super::light::{Light, LightUniform};
use super::material::BlendFactor;
use super::render_queue::{RenderQueue, RenderableMesh};
use super::shader_cache::{ShaderCache, ShaderKind};
use super::text::layout_text;
use super::RenderError;
use crate::config::RendererConfig;
use crate::error::EngineResult;
use crate::foundation::collections::{MaterialHandle, ModelHandle, TextureHandle};
use crate::foundation::math::{mat4_to_cols, Mat4, Vec4};
use crate::resources::{ResourceManager, Vertex};

/// Per-instance data written into pooled uniform ranges
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Model matrix, column major
    pub model: [[f32; 4]; 4],
    /// Tint
    pub color: [f32; 4],
}

impl InstanceData {
    /// Instance from a world matrix and a tint
    pub fn new(model: &Mat4, color: &Vec4) -> Self {
        Self {
            model: mat4_to_cols(model),
            color: [color.x, color.y, color.z, color.w],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct MaterialConstants {
    ambient: [f32; 4],
    diffuse: [f32; 4],
    bloom: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct GlyphConstants {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

/// Counters of the last rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Indexed draws issued, post-processing included
    pub draw_calls: u32,
    /// Shader program changes
    pub shader_switches: u32,
    /// Queued items that were not drawn
    pub skipped: u32,
}

#[derive(Debug, Clone, Copy)]
struct GpuMesh {
    id: MeshId,
    index_count: u32,
}

#[derive(Debug, Default)]
struct PassState {
    shader: Option<ShaderKind>,
    blend: Option<Option<(BlendFactor, BlendFactor)>>,
}

const CAMERA_SLOTS: u32 = 2;
const SCENE_SLOT: u32 = 0;
const SCREEN_SLOT: u32 = 1;

fn align_up(size: usize, alignment: u32) -> u32 {
    let size = u32::try_from(size).unwrap_or(u32::MAX);
    size.div_ceil(alignment.max(1)) * alignment.max(1)
}

fn unit_quad() -> (Vec<Vertex>, Vec<u32>) {
    let normal = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex::new([-0.5, -0.5, 0.0], normal, [0.0, 0.0]),
        Vertex::new([0.5, -0.5, 0.0], normal, [1.0, 0.0]),
        Vertex::new([0.5, 0.5, 0.0], normal, [1.0, 1.0]),
        Vertex::new([-0.5, 0.5, 0.0], normal, [0.0, 1.0]),
    ];
    (vertices, vec![0, 1, 2, 0, 2, 3])
}

/// Renderer driving a graphics device
#[derive(Debug)]
pub struct Renderer<D: GraphicsDevice> {
    device: D,
    config: RendererConfig,
    chain: FramebufferChain,
    shaders: ShaderCache,
    instances: BufferPool,
    singles: BufferPool,
    meshes: HashMap<(ModelHandle, usize), GpuMesh>,
    textures: HashMap<TextureHandle, GpuTextureId>,
    quad: GpuMesh,
    camera_buffer: BufferId,
    camera_stride: u32,
    light_buffer: BufferId,
    light_stride: u32,
    hide_dynamic: bool,
    stats: FrameStats,
}

impl<D: GraphicsDevice> Renderer<D> {
    /// Create the framebuffer chain and shared GPU objects
    ///
    /// An incomplete framebuffer is an [`EngineError::InternalError`](crate::error::EngineError::InternalError).
    pub fn new(mut device: D, config: &RendererConfig) -> EngineResult<Self> {
        let (width, height) = device.surface_size();
        let chain = FramebufferChain::new(&mut device, width, height, config.bloom_tiers)?;

        let alignment = device.uniform_alignment().max(config.ubo_alignment);
        let instance_bytes = std::mem::size_of::<InstanceData>() * config.instancing_max as usize;
        let instances = BufferPool::new(
            u32::try_from(instance_bytes).unwrap_or(u32::MAX),
            config.buffer_pool_chunk,
            alignment,
        );
        let singles = BufferPool::new(
            u32::try_from(std::mem::size_of::<InstanceData>()).unwrap_or(u32::MAX),
            config.buffer_pool_chunk,
            alignment,
        );

        let (vertices, indices) = unit_quad();
        let quad = GpuMesh {
            id: device.create_mesh(&vertices, &indices)?,
            index_count: 6,
        };

        let camera_stride = align_up(std::mem::size_of::<super::camera::CameraUniform>(), alignment);
        let camera_buffer = device.create_uniform_buffer(camera_stride * CAMERA_SLOTS)?;
        let light_bytes = 16 + std::mem::size_of::<LightUniform>() * config.max_lights.max(1);
        let light_stride = align_up(light_bytes, alignment);
        let light_buffer = device.create_uniform_buffer(light_stride * CAMERA_SLOTS)?;

        log::info!(
            "Renderer initialized: {width}x{height}, {} bloom tiers, {} instances per batch",
            config.bloom_tiers,
            config.instancing_max
        );
        Ok(Self {
            device,
            config: config.clone(),
            chain,
            shaders: ShaderCache::new(),
            instances,
            singles,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            quad,
            camera_buffer,
            camera_stride,
            light_buffer,
            light_stride,
            hide_dynamic: false,
            stats: FrameStats::default(),
        })
    }

    /// Graphics device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Graphics device, mutably
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Renderer settings
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Framebuffer chain of the main view
    pub fn chain(&self) -> &FramebufferChain {
        &self.chain
    }

    /// Counters of the last frame
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Skip items flagged `hide_dynamic` while set
    pub fn set_hide_dynamic(&mut self, hide: bool) {
        self.hide_dynamic = hide;
    }

    /// Rebuild the framebuffer chain for a new surface size
    pub fn resize(&mut self, width: u32, height: u32) -> EngineResult<()> {
        log::info!("Renderer resize to {width}x{height}");
        self.chain.recreate(&mut self.device, width, height)?;
        Ok(())
    }

    /// Reserve a uniform range for up to `instancing_max` instances
    pub fn allocate_ubo(&mut self) -> EngineResult<UboRegion> {
        Ok(self.instances.allocate(&mut self.device)?)
    }

    /// Reserve a uniform range for `count` instances
    ///
    /// A single instance gets a range of its own size instead of a full batch.
    pub fn allocate_ubo_for(&mut self, count: usize) -> EngineResult<UboRegion> {
        if count <= 1 {
            Ok(self.singles.allocate(&mut self.device)?)
        } else {
            self.allocate_ubo()
        }
    }

    /// Write instance data at the start of a reserved range
    ///
    /// Instances beyond the range capacity are dropped with a warning.
    pub fn write_ubo(&mut self, region: UboRegion, instances: &[InstanceData]) {
        let capacity = region.size as usize / std::mem::size_of::<InstanceData>();
        if instances.len() > capacity {
            log::warn!("Uniform range holds {capacity} instances, {} written", instances.len());
        }
        let count = instances.len().min(capacity);
        self.device
            .write_buffer(region.buffer, region.offset, bytemuck::cast_slice(&instances[..count]));
    }

    /// Return one uniform range to the pool
    pub fn free_ubo(&mut self, region: UboRegion) {
        if self.singles.owns(&region) {
            self.singles.free(region);
        } else {
            self.instances.free(region);
        }
    }

    /// Return every uniform range to the pool
    pub fn recycle_ubos(&mut self) {
        self.instances.free_all();
        self.singles.free_all();
    }

    /// Create a framebuffer chain separate from the main view
    pub fn create_chain(&mut self, width: u32, height: u32) -> EngineResult<FramebufferChain> {
        Ok(FramebufferChain::new(&mut self.device, width, height, self.config.bloom_tiers)?)
    }

    /// Render one frame to the back buffer and present it
    pub fn render(
        &mut self,
        queue: &mut RenderQueue,
        camera: Option<&Camera>,
        resources: &ResourceManager,
    ) -> EngineResult<()> {
        queue.sort();
        let chain = self.chain.clone();
        let (width, height) = self.device.surface_size();
        let output = Viewport {
            x: 0,
            y: 0,
            width,
            height,
        };
        chain.clear_all(&mut self.device);
        self.draw_frame(queue, camera, resources, &chain, RenderTarget::BackBuffer, output)?;
        self.device.present();
        log::debug!(
            "Frame: {} draws, {} shader switches, {} skipped",
            self.stats.draw_calls,
            self.stats.shader_switches,
            self.stats.skipped
        );
        Ok(())
    }

    /// Render one frame into `output` using `chain` instead of the main view
    pub fn render_to(
        &mut self,
        queue: &mut RenderQueue,
        camera: Option<&Camera>,
        resources: &ResourceManager,
        chain: &FramebufferChain,
        output: RenderTarget,
    ) -> EngineResult<()> {
        queue.sort();
        let (width, height) = chain.size();
        let viewport = Viewport {
            x: 0,
            y: 0,
            width,
            height,
        };
        self.device.bind_target(output);
        self.device.clear();
        chain.clear_framebuffers(&mut self.device);
        self.draw_frame(queue, camera, resources, chain, output, viewport)
    }

    fn draw_frame(
        &mut self,
        queue: &RenderQueue,
        camera: Option<&Camera>,
        resources: &ResourceManager,
        chain: &FramebufferChain,
        output: RenderTarget,
        output_viewport: Viewport,
    ) -> EngineResult<()> {
        self.stats = FrameStats::default();

        self.scene_pass(queue, camera, resources, chain)?;
        self.ui_pass(queue, resources, chain)?;
        self.text_pass(queue, resources, chain)?;
        self.bloom_pass(chain)?;
        self.composite(chain, output, output_viewport)
    }

    fn scene_pass(
        &mut self,
        queue: &RenderQueue,
        camera: Option<&Camera>,
        resources: &ResourceManager,
        chain: &FramebufferChain,
    ) -> EngineResult<()> {
        if queue.scene_len() == 0 {
            return Ok(());
        }
        let Some(camera) = camera else {
            log::warn!("No camera bound, skipping {} scene items", queue.scene_len());
            self.stats.skipped += u32::try_from(queue.scene_len()).unwrap_or(u32::MAX);
            return Ok(());
        };

        let (width, height) = chain.size();
        let viewport = camera.viewport.to_pixels(width, height);
        self.device.bind_target(RenderTarget::Framebuffer(chain.scene()));
        self.device.set_viewport(viewport);
        self.device.set_depth_test(true);

        self.bind_camera(SCENE_SLOT, camera, viewport.width, viewport.height);
        if queue.lights().is_empty() {
            self.bind_lights(SCENE_SLOT, &[Light::default()]);
        } else {
            self.bind_lights(SCENE_SLOT, queue.lights());
        }

        let mut state = PassState::default();
        self.draw_meshes(queue.opaque(), resources, false, &mut state)?;
        self.draw_meshes(queue.transparent(), resources, true, &mut state)
    }

    fn ui_pass(&mut self, queue: &RenderQueue, resources: &ResourceManager, chain: &FramebufferChain) -> EngineResult<()> {
        if queue.ui_opaque().is_empty() && queue.ui_transparent().is_empty() {
            return Ok(());
        }
        let (width, height) = chain.size();
        self.bind_screen(chain);
        self.bind_camera(SCREEN_SLOT, &Camera::screen(), width, height);
        self.bind_lights(SCREEN_SLOT, &[Light::ui()]);

        let mut state = PassState::default();
        self.draw_meshes(queue.ui_opaque(), resources, false, &mut state)?;
        self.draw_meshes(queue.ui_transparent(), resources, true, &mut state)
    }

    fn text_pass(&mut self, queue: &RenderQueue, resources: &ResourceManager, chain: &FramebufferChain) -> EngineResult<()> {
        if queue.texts().is_empty() {
            return Ok(());
        }
        let (width, height) = chain.size();
        self.bind_screen(chain);
        self.bind_camera(SCREEN_SLOT, &Camera::screen(), width, height);
        self.device
            .set_blend(Some((BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)));
        let program = self.shaders.get_or_compile(&mut self.device, ShaderKind::Text)?;
        self.device.use_shader(program);
        self.stats.shader_switches += 1;
        self.device.bind_mesh(self.quad.id);

        for text in queue.texts() {
            let Some(font) = resources.font(text.font) else {
                log::warn!("Text '{}' uses an unknown font", text.content);
                self.stats.skipped += 1;
                continue;
            };
            for glyph in layout_text(font, &text.content, text.position, text.font_size) {
                let texture = self.gpu_texture(resources, glyph.texture)?;
                self.device.bind_texture(0, texture);
                let constants = GlyphConstants {
                    model: mat4_to_cols(&glyph.model_matrix()),
                    color: [text.color.x, text.color.y, text.color.z, text.color.w],
                };
                self.device.push_constants(bytemuck::bytes_of(&constants));
                self.device.draw_indexed(self.quad.index_count, 1);
                self.stats.draw_calls += 1;
            }
        }
        Ok(())
    }

    fn bloom_pass(&mut self, chain: &FramebufferChain) -> EngineResult<()> {
        self.device.set_depth_test(false);
        self.device.set_blend(None);
        self.device.bind_mesh(self.quad.id);

        let mut input = self.attachment(chain.scene(), SCENE_BRIGHT)?;
        for tier in chain.tiers() {
            let viewport = Viewport {
                x: 0,
                y: 0,
                width: tier.width,
                height: tier.height,
            };
            let horizontal = self.attachment(tier.framebuffer, TIER_HORIZONTAL)?;
            let vertical = self.attachment(tier.framebuffer, TIER_VERTICAL)?;

            self.fullscreen(ShaderKind::Downsample, tier.vertical(), viewport, input)?;
            self.fullscreen(ShaderKind::Blur { horizontal: true }, tier.horizontal(), viewport, vertical)?;
            self.fullscreen(ShaderKind::Blur { horizontal: false }, tier.vertical(), viewport, horizontal)?;
            input = vertical;
        }
        Ok(())
    }

    fn composite(&mut self, chain: &FramebufferChain, output: RenderTarget, viewport: Viewport) -> EngineResult<()> {
        self.device.set_depth_test(false);
        self.device.set_blend(Some((BlendFactor::One, BlendFactor::One)));

        let scene = self.attachment(chain.scene(), SCENE_COLOR)?;
        self.fullscreen(ShaderKind::Composite, output, viewport, scene)?;
        for tier in chain.tiers() {
            let blurred = self.attachment(tier.framebuffer, TIER_VERTICAL)?;
            self.fullscreen(ShaderKind::Composite, output, viewport, blurred)?;
        }
        self.device.set_blend(None);
        Ok(())
    }

    fn fullscreen(
        &mut self,
        kind: ShaderKind,
        target: RenderTarget,
        viewport: Viewport,
        input: GpuTextureId,
    ) -> EngineResult<()> {
        let program = self.shaders.get_or_compile(&mut self.device, kind)?;
        self.device.use_shader(program);
        self.device.bind_target(target);
        self.device.set_viewport(viewport);
        self.device.bind_texture(0, Some(input));
        self.device.bind_mesh(self.quad.id);
        self.device.draw_indexed(self.quad.index_count, 1);
        self.stats.draw_calls += 1;
        Ok(())
    }

    fn draw_meshes(
        &mut self,
        items: &[RenderableMesh],
        resources: &ResourceManager,
        transparent: bool,
        state: &mut PassState,
    ) -> EngineResult<()> {
        for item in items {
            if self.hide_dynamic && item.hide_dynamic {
                self.stats.skipped += 1;
                continue;
            }
            let Some(mesh) = self.gpu_mesh(resources, item.model, item.mesh_index)? else {
                self.stats.skipped += 1;
                continue;
            };

            let kind = ShaderKind::Scene(item.permutation);
            if state.shader != Some(kind) {
                let program = self.shaders.get_or_compile(&mut self.device, kind)?;
                self.device.use_shader(program);
                state.shader = Some(kind);
                self.stats.shader_switches += 1;
            }
            let blend = transparent.then_some(item.blend);
            if state.blend != Some(blend) {
                self.device.set_blend(blend);
                state.blend = Some(blend);
            }

            self.bind_material(resources, item.material)?;
            self.device.bind_mesh(mesh.id);
            self.device
                .bind_uniform_range(UniformSlot::Instances, item.ubo.buffer, item.ubo.offset, item.ubo.size);
            self.device.draw_indexed(mesh.index_count, item.instance_count.max(1));
            self.stats.draw_calls += 1;
        }
        Ok(())
    }

    fn bind_screen(&mut self, chain: &FramebufferChain) {
        let (width, height) = chain.size();
        self.device.bind_target(RenderTarget::Framebuffer(chain.scene()));
        self.device.set_viewport(Viewport {
            x: 0,
            y: 0,
            width,
            height,
        });
        self.device.set_depth_test(false);
    }

    fn bind_camera(&mut self, slot: u32, camera: &Camera, width: u32, height: u32) {
        let offset = slot * self.camera_stride;
        let uniform = camera.uniform(width, height);
        self.device
            .write_buffer(self.camera_buffer, offset, bytemuck::bytes_of(&uniform));
        self.device
            .bind_uniform_range(UniformSlot::Camera, self.camera_buffer, offset, self.camera_stride);
    }

    fn bind_lights(&mut self, slot: u32, lights: &[Light]) {
        let offset = slot * self.light_stride;
        let lights = &lights[..lights.len().min(self.config.max_lights.max(1))];
        let count = u32::try_from(lights.len()).unwrap_or(u32::MAX);
        let uniforms: Vec<LightUniform> = lights.iter().map(Light::uniform).collect();
        self.device
            .write_buffer(self.light_buffer, offset, bytemuck::bytes_of(&[count, 0, 0, 0]));
        self.device
            .write_buffer(self.light_buffer, offset + 16, bytemuck::cast_slice(&uniforms));
        self.device
            .bind_uniform_range(UniformSlot::Lights, self.light_buffer, offset, self.light_stride);
    }

    fn bind_material(&mut self, resources: &ResourceManager, handle: MaterialHandle) -> EngineResult<()> {
        let material = resources
            .material(handle)
            .or_else(|| resources.material(resources.default_material()));
        let Some(material) = material else {
            return Ok(());
        };
        for (unit, texture) in (0_u32..).zip(material.textures()) {
            let gpu = match texture {
                Some(texture) => self.gpu_texture(resources, texture)?,
                None => None,
            };
            self.device.bind_texture(unit, gpu);
        }
        let constants = MaterialConstants {
            ambient: [material.ambient.x, material.ambient.y, material.ambient.z, 1.0],
            diffuse: [material.diffuse.x, material.diffuse.y, material.diffuse.z, 1.0],
            bloom: [material.bloom.x, material.bloom.y, material.bloom.z, 1.0],
        };
        self.device.push_constants(bytemuck::bytes_of(&constants));
        Ok(())
    }

    fn gpu_mesh(&mut self, resources: &ResourceManager, model: ModelHandle, index: usize) -> EngineResult<Option<GpuMesh>> {
        if let Some(mesh) = self.meshes.get(&(model, index)) {
            return Ok(Some(*mesh));
        }
        let Some(mesh) = resources.model(model).and_then(|m| m.meshes.get(index)) else {
            log::warn!("Queued mesh {index} of an unknown model");
            return Ok(None);
        };
        if mesh.indices.is_empty() {
            log::warn!("Skipping empty mesh {index}");
            return Ok(None);
        }
        let gpu = GpuMesh {
            id: self.device.create_mesh(&mesh.vertices, &mesh.indices)?,
            index_count: u32::try_from(mesh.indices.len()).unwrap_or(u32::MAX),
        };
        self.meshes.insert((model, index), gpu);
        Ok(Some(gpu))
    }

    fn gpu_texture(&mut self, resources: &ResourceManager, handle: TextureHandle) -> EngineResult<Option<GpuTextureId>> {
        if let Some(&gpu) = self.textures.get(&handle) {
            return Ok(Some(gpu));
        }
        let Some(texture) = resources.texture(handle) else {
            return Ok(None);
        };
        let gpu = match texture.gpu {
            Some(gpu) => gpu,
            None if texture.pixels.is_empty() => return Ok(None),
            None => self
                .device
                .create_texture(texture.width, texture.height, &texture.pixels)?,
        };
        self.textures.insert(handle, gpu);
        Ok(Some(gpu))
    }

    fn attachment(&self, framebuffer: super::device::FramebufferId, index: u32) -> EngineResult<GpuTextureId> {
        self.device
            .color_attachment(framebuffer, index)
            .ok_or_else(|| RenderError::RenderingFailed(format!("missing attachment {index} of {framebuffer:?}")).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::{FramebufferDesc, FramebufferId};
    use crate::render::headless::{DeviceCommand, HeadlessDevice};
    use crate::render::material::Material;
    use crate::render::render_queue::RenderableText;
    use crate::resources::{GeometryType, ModelInstance, PlaceholderLoader};
    use crate::foundation::math::{Vec2, Vec3};

    struct Fixture {
        renderer: Renderer<HeadlessDevice>,
        resources: ResourceManager,
        queue: RenderQueue,
        instance: ModelInstance,
    }

    fn fixture() -> Fixture {
        let config = RendererConfig::default();
        let renderer = Renderer::new(HeadlessDevice::new(320, 240), &config).unwrap();
        let mut resources = ResourceManager::new(PlaceholderLoader);
        let model = resources.geometry_model(GeometryType::Box);
        let instance = ModelInstance::new(model, resources.model(model).unwrap());
        Fixture {
            renderer,
            resources,
            queue: RenderQueue::new(&config),
            instance,
        }
    }

    fn draws(device: &HeadlessDevice) -> usize {
        device.commands().iter().filter(|c| c.is_draw()).count()
    }

    fn camera() -> Camera {
        Camera::looking_at(Vec3::new(0.0, 5.0, 5.0), Vec3::zeros())
    }

    #[test]
    fn test_incomplete_framebuffer_is_internal_error() {
        let device = HeadlessDevice::new(64, 64).with_incomplete_framebuffers();
        let err = Renderer::new(device, &RendererConfig::default()).unwrap_err();
        assert!(matches!(err, crate::error::EngineError::InternalError(_)));
    }

    #[test]
    fn test_missing_camera_skips_scene() {
        let mut f = fixture();
        let ubo = f.renderer.allocate_ubo().unwrap();
        f.queue.add_model(&f.resources, &f.instance, ubo, 1);
        f.renderer.device_mut().clear_commands();
        f.renderer.render(&mut f.queue, None, &f.resources).unwrap();

        let stats = f.renderer.stats();
        assert_eq!(stats.skipped, 1);
        // bloom (3 per tier) plus composite (scene + tiers)
        assert_eq!(draws(f.renderer.device()), 3 * 3 + 4);
        assert_eq!(f.renderer.device().commands().last(), Some(&DeviceCommand::Present));
    }

    #[test]
    fn test_shader_switch_is_memoized() {
        let mut f = fixture();
        let ubo = f.renderer.allocate_ubo().unwrap();
        for _ in 0..3 {
            f.queue.add_model(&f.resources, &f.instance, ubo, 1);
        }
        f.renderer.render(&mut f.queue, Some(&camera()), &f.resources).unwrap();
        assert_eq!(f.renderer.stats().shader_switches, 1);
        assert_eq!(f.renderer.stats().draw_calls, 3 + 3 * 3 + 4);
    }

    #[test]
    fn test_instanced_draw() {
        let mut f = fixture();
        let ubo = f.renderer.allocate_ubo().unwrap();
        f.queue.add_model(&f.resources, &f.instance, ubo, 8);
        f.renderer.render(&mut f.queue, Some(&camera()), &f.resources).unwrap();
        assert!(f
            .renderer
            .device()
            .commands()
            .iter()
            .any(|c| matches!(c, DeviceCommand::DrawInstanced { instances: 8, .. })));
    }

    #[test]
    fn test_transparent_uses_material_blend() {
        let mut f = fixture();
        let mut glass = Material::new("glass");
        glass.transparent = true;
        glass.dst_blend = BlendFactor::One;
        let glass = f.resources.add_material(glass);
        let instance = ModelInstance {
            model: f.instance.model,
            materials: vec![glass],
        };
        let ubo = f.renderer.allocate_ubo().unwrap();
        f.queue.add_model(&f.resources, &instance, ubo, 1);
        f.renderer.render(&mut f.queue, Some(&camera()), &f.resources).unwrap();
        assert!(f
            .renderer
            .device()
            .commands()
            .contains(&DeviceCommand::Blend(Some((BlendFactor::SrcAlpha, BlendFactor::One)))));
    }

    #[test]
    fn test_text_draws_one_quad_per_glyph() {
        let mut f = fixture();
        let font = f.resources.get_or_load_font("arial.ttf", 16).unwrap();
        f.queue.add_text(RenderableText {
            content: "ab\nc".into(),
            font,
            font_size: 16.0,
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            position: Vec2::new(10.0, 10.0),
            layer: 0,
        });
        f.renderer.render(&mut f.queue, None, &f.resources).unwrap();
        assert_eq!(f.renderer.stats().draw_calls, 3 + 3 * 3 + 4);
    }

    #[test]
    fn test_hide_dynamic() {
        let mut f = fixture();
        let ubo = f.renderer.allocate_ubo().unwrap();
        let params = crate::render::render_queue::DrawParams {
            hide_dynamic: true,
            ..Default::default()
        };
        f.queue.add_model_with(&f.resources, &f.instance, ubo, 1, params);
        f.renderer.set_hide_dynamic(true);
        f.renderer.render(&mut f.queue, Some(&camera()), &f.resources).unwrap();
        assert_eq!(f.renderer.stats().skipped, 1);
    }

    #[test]
    fn test_composite_targets_back_buffer_additively() {
        let mut f = fixture();
        f.renderer.render(&mut f.queue, None, &f.resources).unwrap();
        let commands = f.renderer.device().commands();
        let blend = commands
            .iter()
            .rposition(|c| *c == DeviceCommand::Blend(Some((BlendFactor::One, BlendFactor::One))))
            .unwrap();
        let composite_draws = commands[blend..].iter().filter(|c| c.is_draw()).count();
        assert_eq!(composite_draws, 4);
        assert!(commands[blend..].contains(&DeviceCommand::BindTarget(RenderTarget::BackBuffer)));
    }

    #[test]
    fn test_resize_rebuilds_chain() {
        let mut f = fixture();
        let old: FramebufferId = f.renderer.chain().scene();
        f.renderer.resize(640, 480).unwrap();
        assert_ne!(f.renderer.chain().scene(), old);
        assert_eq!(f.renderer.chain().size(), (640, 480));
    }

    #[test]
    fn test_offscreen_render_leaves_back_buffer_alone() {
        let mut f = fixture();
        let chain = f.renderer.create_chain(64, 64).unwrap();
        let desc = FramebufferDesc {
            width: 64,
            height: 64,
            color_attachments: 1,
            depth: false,
        };
        let output = f.renderer.device_mut().create_framebuffer(&desc).unwrap();
        let ubo = f.renderer.allocate_ubo().unwrap();
        f.queue.add_model(&f.resources, &f.instance, ubo, 1);

        f.renderer.device_mut().clear_commands();
        f.renderer
            .render_to(&mut f.queue, Some(&camera()), &f.resources, &chain, RenderTarget::Attachment(output, 0))
            .unwrap();

        let commands = f.renderer.device().commands();
        assert!(!commands.contains(&DeviceCommand::BindTarget(RenderTarget::BackBuffer)));
        assert!(!commands.contains(&DeviceCommand::Present));
        let clears = commands.iter().filter(|c| **c == DeviceCommand::Clear).count();
        // output, scene and one per bloom tier
        assert_eq!(clears, 2 + chain.tiers().len());
    }

    #[test]
    fn test_single_instance_range_fits_one_instance() {
        let mut f = fixture();
        let single = f.renderer.allocate_ubo_for(1).unwrap();
        let batch = f.renderer.allocate_ubo_for(2).unwrap();
        assert_eq!(single.size as usize, std::mem::size_of::<InstanceData>());
        assert_eq!(batch.size as usize, std::mem::size_of::<InstanceData>() * f.renderer.config().instancing_max as usize);
        assert_ne!(single.buffer, batch.buffer);

        f.renderer.free_ubo(single);
        assert_eq!(f.renderer.allocate_ubo_for(1).unwrap(), single);
    }
}
