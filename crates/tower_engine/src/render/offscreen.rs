//! Offscreen model previews
//!
//! Renders a single model through the scene and bloom passes into a
//! texture, which can then be shown on a plane in the world.

use super::camera::Camera;
use super::device::{FramebufferDesc, GraphicsDevice, RenderTarget};
use super::render_queue::RenderQueue;
use super::renderer::{InstanceData, Renderer};
use super::RenderError;
use crate::components::RenderComponent;
use crate::ecs::EntityManager;
use crate::error::{EngineError, EngineResult};
use crate::foundation::collections::TextureHandle;
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::resources::{ModelInstance, ResourceManager};

/// Renders models into textures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffscreenRenderer {
    width: u32,
    height: u32,
}

impl Default for OffscreenRenderer {
    fn default() -> Self {
        Self::new(256, 256)
    }
}

impl OffscreenRenderer {
    /// Renderer producing `width` x `height` textures
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Render `instance` framed by a camera in front of its bounds
    ///
    /// The texture is registered in `resources` under `name`.
    pub fn generate_texture_from_model<D: GraphicsDevice>(
        &self,
        renderer: &mut Renderer<D>,
        resources: &mut ResourceManager,
        instance: &ModelInstance,
        name: &str,
    ) -> EngineResult<TextureHandle> {
        let bounds = resources
            .model(instance.model)
            .map(|model| model.bounds)
            .ok_or_else(|| EngineError::invalid(format!("Unknown model for offscreen texture {name}")))?;
        let center = (bounds.min + bounds.max) * 0.5;
        let extent = bounds.size().max().max(f32::EPSILON);
        let camera = Camera::looking_at(center + Vec3::new(0.0, extent * 0.75, extent * 1.75), center);

        let chain = renderer.create_chain(self.width, self.height)?;
        let output_desc = FramebufferDesc {
            width: self.width,
            height: self.height,
            color_attachments: 1,
            depth: false,
        };
        let output = renderer.device_mut().create_framebuffer(&output_desc)?;
        if !renderer.device().is_framebuffer_complete(output) {
            chain.destroy(renderer.device_mut());
            renderer.device_mut().destroy_framebuffer(output);
            return Err(RenderError::FramebufferIncomplete(format!("offscreen output for {name}")).into());
        }

        let ubo = renderer.allocate_ubo_for(1)?;
        renderer.write_ubo(ubo, &[InstanceData::new(&Mat4::identity(), &Vec4::new(1.0, 1.0, 1.0, 1.0))]);
        let mut queue = RenderQueue::new(renderer.config());
        queue.add_model(resources, instance, ubo, 1);

        let result = renderer.render_to(&mut queue, Some(&camera), resources, &chain, RenderTarget::Attachment(output, 0));
        renderer.free_ubo(ubo);
        chain.destroy(renderer.device_mut());
        result?;

        let gpu = renderer
            .device()
            .color_attachment(output, 0)
            .ok_or_else(|| EngineError::internal(format!("Offscreen output for {name} has no color attachment")))?;
        log::info!("Generated offscreen texture {name} ({}x{})", self.width, self.height);
        Ok(resources.add_gpu_texture(name, self.width, self.height, gpu))
    }

    /// Show `texture` on the first mesh of the entity tagged `tag`
    ///
    /// The entity gets its own copy of its first material so other users of
    /// that material are unaffected.
    pub fn render_model_on_plane(
        entities: &mut EntityManager,
        resources: &mut ResourceManager,
        tag: &str,
        texture: TextureHandle,
    ) -> EngineResult<()> {
        let handle = entities
            .entity_by_tag(tag)
            .map(crate::ecs::Entity::handle)
            .ok_or_else(|| EngineError::invalid(format!("No entity tagged {tag}")))?;
        let Some(render) = entities.get_entity_mut(handle).and_then(|e| e.get_mut::<RenderComponent>()) else {
            return Err(EngineError::invalid(format!("Entity tagged {tag} has no render component")));
        };
        let instance = render.resolve(resources)?;
        let Some(&first) = instance.materials.first() else {
            return Err(EngineError::invalid(format!("Entity tagged {tag} has no mesh")));
        };

        let mut material = resources
            .material(first)
            .cloned()
            .unwrap_or_else(|| crate::render::Material::new(tag));
        material.name = format!("{tag}_offscreen");
        material.diffuse_texture = Some(texture);
        let material = resources.add_material(material);
        if let Some(slot) = render.model.as_mut().and_then(|m| m.materials.first_mut()) {
            *slot = material;
        }
        Ok(())
    }
}
