//! # Rendering System
//!
//! Collects every visible entity into the [`RenderQueue`] and hands the
//! queue to the [`Renderer`] once per frame.
//!
//! Scene entities sharing a model, its materials and their dynamic flags
//! are merged into instanced batches of at most `instancing_max` instances.
//! UI entities are laid out against the current surface size and queued
//! one by one on their layer. Texts, particles and lights follow, and the
//! first entity carrying a camera component provides the view.

use crate::components::{
    CameraComponent, LightComponent, ParticleEmitterComponent, RenderComponent, TextComponent, TransformComponent,
    UiComponent,
};
use crate::ecs::{ComponentId, ComponentType, Entity, EntityManager, System};
use crate::error::EngineResult;
use crate::foundation::math::{compose_trs, Vec2, Vec3};
use crate::render::{
    measure_text, Camera, DrawParams, GraphicsDevice, InstanceData, RenderQueue, RenderableText, Renderer,
};
use crate::resources::{ModelInstance, ResourceManager};

use super::animation::AnimationSystem;

/// Instances sharing a model, materials and dynamic flags
#[derive(Debug)]
struct Batch {
    instance: ModelInstance,
    dynamic: bool,
    hide_dynamic: bool,
    instances: Vec<InstanceData>,
}

/// Frame collection and submission
#[derive(Debug)]
pub struct RenderingSystem<D: GraphicsDevice> {
    renderer: Renderer<D>,
    queue: RenderQueue,
    resources: ResourceManager,
    animations: AnimationSystem,
    batches: Vec<Batch>,
    laid_out_for: Option<Vec2>,
}

impl<D: GraphicsDevice> RenderingSystem<D> {
    /// Rendering system drawing with `renderer` from `resources`
    pub fn new(renderer: Renderer<D>, resources: ResourceManager) -> Self {
        let queue = RenderQueue::new(renderer.config());
        Self {
            renderer,
            queue,
            resources,
            animations: AnimationSystem::new(),
            batches: Vec::new(),
            laid_out_for: None,
        }
    }

    /// Renderer
    pub fn renderer(&self) -> &Renderer<D> {
        &self.renderer
    }

    /// Renderer, mutably
    pub fn renderer_mut(&mut self) -> &mut Renderer<D> {
        &mut self.renderer
    }

    /// Queue of the last frame
    pub fn queue(&self) -> &RenderQueue {
        &self.queue
    }

    /// Shared resources
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Shared resources, mutably
    pub fn resources_mut(&mut self) -> &mut ResourceManager {
        &mut self.resources
    }

    /// Animation playback driven before each frame
    pub fn animations_mut(&mut self) -> &mut AnimationSystem {
        &mut self.animations
    }

    #[allow(clippy::cast_precision_loss)]
    fn window_size(&self) -> Vec2 {
        let (width, height) = self.renderer.device().surface_size();
        Vec2::new(width as f32, height as f32)
    }

    fn add_to_batch(&mut self, instance: &ModelInstance, dynamic: bool, hide_dynamic: bool, data: InstanceData) {
        let existing = self.batches.iter_mut().find(|batch| {
            batch.instance == *instance && batch.dynamic == dynamic && batch.hide_dynamic == hide_dynamic
        });
        match existing {
            Some(batch) => batch.instances.push(data),
            None => self.batches.push(Batch {
                instance: instance.clone(),
                dynamic,
                hide_dynamic,
                instances: vec![data],
            }),
        }
    }

    /// Upload `instances` in chunks and queue one draw per chunk
    fn queue_instanced(
        &mut self,
        instance: &ModelInstance,
        instances: &[InstanceData],
        params: DrawParams,
    ) -> EngineResult<()> {
        let chunk = self.renderer.config().instancing_max.max(1) as usize;
        for part in instances.chunks(chunk) {
            let ubo = self.renderer.allocate_ubo_for(part.len())?;
            self.renderer.write_ubo(ubo, part);
            let count = u32::try_from(part.len()).unwrap_or(u32::MAX);
            self.queue
                .add_model_with(&self.resources, instance, ubo, count, params);
        }
        Ok(())
    }

    fn flush_batches(&mut self) -> EngineResult<()> {
        let mut batches = std::mem::take(&mut self.batches);
        for batch in &batches {
            let params = DrawParams {
                dynamic: batch.dynamic,
                hide_dynamic: batch.hide_dynamic,
                ..DrawParams::default()
            };
            self.queue_instanced(&batch.instance, &batch.instances, params)?;
        }
        batches.clear();
        self.batches = batches;
        Ok(())
    }

    /// Queue the model and text of one render entity
    fn collect_entity(&mut self, entity: &mut Entity, window: Vec2, relayout: bool) -> EngineResult<()> {
        let handle = entity.handle();
        if entity
            .get::<ParticleEmitterComponent>()
            .is_some_and(|emitter| emitter.display_only_particles)
        {
            return Ok(());
        }
        let Some(render) = entity.get_mut::<RenderComponent>() else {
            return Ok(());
        };
        if !render.display {
            return Ok(());
        }
        let (color, dynamic, hide_dynamic) = (render.color, render.dynamic, render.hide_dynamic);
        let instance = match render.resolve(&mut self.resources) {
            Ok(instance) => instance.clone(),
            Err(err) => {
                log::warn!("Entity {handle:?}: cannot resolve model: {err}");
                return Ok(());
            }
        };
        let model_size = self
            .resources
            .model(instance.model)
            .map_or_else(|| Vec3::new(1.0, 1.0, 1.0), |model| model.bounds.size());

        let ui = entity.get::<UiComponent>().cloned();
        let Some(transform) = entity.get_mut::<TransformComponent>() else {
            log::warn!("Render entity {handle:?} has no transform");
            return Ok(());
        };
        let ui_size = match &ui {
            Some(ui) if relayout || ui.need_update => ui.layout(transform, model_size, window),
            _ => model_size.component_mul(&transform.scale).xy(),
        };
        let transform = transform.clone();
        let data = InstanceData::new(&transform.matrix(), &color);

        match &ui {
            Some(ui) => {
                if let Some(stored) = entity.get_mut::<UiComponent>() {
                    stored.need_update = false;
                }
                let ubo = self.renderer.allocate_ubo_for(1)?;
                self.renderer.write_ubo(ubo, &[data]);
                self.queue.add_ui_model(&self.resources, &instance, ubo, ui.layer);
            }
            None => self.add_to_batch(&instance, dynamic, hide_dynamic, data),
        }

        if let Some(text) = entity.get::<TextComponent>() {
            self.collect_text(text, &transform, ui.as_ref(), ui_size);
        }
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn collect_text(&mut self, text: &TextComponent, transform: &TransformComponent, ui: Option<&UiComponent>, ui_size: Vec2) {
        let font = match self.resources.get_or_load_font(&text.font_name, text.font_size) {
            Ok(font) => font,
            Err(err) => {
                log::warn!("Cannot load font {}: {err}", text.font_name);
                return;
            }
        };
        let font_size = text.font_size as f32;
        let offset = match (ui, self.resources.font(font)) {
            (Some(_), Some(loaded)) => {
                let text_size = measure_text(loaded, &text.content, font_size);
                text.alignment_offset(ui_size, text_size)
            }
            _ => text.offset,
        };
        self.queue.add_text(RenderableText {
            content: text.content.clone(),
            font,
            font_size,
            color: text.color,
            position: transform.pos.xy() + offset,
            layer: ui.map_or(0, |ui| ui.layer),
        });
    }

    fn collect_particles(&mut self, em: &mut EntityManager) -> EngineResult<()> {
        for handle in em.handles_with::<ParticleEmitterComponent>() {
            if !em.is_announced(handle) {
                continue;
            }
            let Some(entity) = em.get_entity_mut(handle) else {
                continue;
            };
            if entity.get::<RenderComponent>().is_some_and(|render| !render.display) {
                continue;
            }
            let layer = entity.get::<UiComponent>().map(|ui| ui.layer);
            let Some(emitter) = entity.get_mut::<ParticleEmitterComponent>() else {
                continue;
            };
            if emitter.state.particles.is_empty() {
                continue;
            }
            let instance = match emitter.resolve(&mut self.resources) {
                Ok(instance) => instance.clone(),
                Err(err) => {
                    log::warn!("Emitter {handle:?}: cannot resolve particle model: {err}");
                    continue;
                }
            };
            let instances: Vec<InstanceData> = emitter
                .state
                .particles
                .iter()
                .map(|particle| {
                    let matrix = compose_trs(&particle.position, &Vec3::zeros(), &particle.size);
                    InstanceData::new(&matrix, &particle.color)
                })
                .collect();
            let params = match layer {
                Some(layer) => DrawParams {
                    layer,
                    ui: true,
                    ..DrawParams::default()
                },
                None => DrawParams {
                    hide_dynamic: true,
                    ..DrawParams::default()
                },
            };
            self.queue_instanced(&instance, &instances, params)?;
        }
        Ok(())
    }

    fn collect_lights(&mut self, em: &EntityManager) {
        for entity in em.entities().filter(|entity| em.is_announced(entity.handle())) {
            if let Some(light) = entity.get::<LightComponent>() {
                self.queue.add_light(light.to_light(entity.get::<TransformComponent>()));
            }
        }
    }

    fn find_camera(em: &EntityManager) -> Option<Camera> {
        em.entities().filter(|entity| em.is_announced(entity.handle())).find_map(|entity| {
            let camera = entity.get::<CameraComponent>()?;
            Some(camera.camera(entity.get::<TransformComponent>()?))
        })
    }
}

impl<D: GraphicsDevice> System for RenderingSystem<D> {
    fn name(&self) -> &str {
        "rendering"
    }

    fn dependencies(&self) -> Vec<ComponentId> {
        vec![TransformComponent::component_id(), RenderComponent::component_id()]
    }

    fn register(&self, em: &mut EntityManager) {
        em.register_system(self.name().to_string(), self.dependencies());
        self.animations.register(em);
    }

    fn update(&mut self, em: &mut EntityManager, dt: f32) -> EngineResult<()> {
        self.queue.clear();
        self.renderer.recycle_ubos();
        self.animations.update(em, dt)?;

        let window = self.window_size();
        let relayout = self.laid_out_for != Some(window);
        self.laid_out_for = Some(window);

        let members = em.entities_for_system(self.name()).to_vec();
        for handle in members {
            if let Some(entity) = em.get_entity_mut(handle) {
                self.collect_entity(entity, window, relayout)?;
            }
        }
        self.flush_batches()?;
        self.collect_particles(em)?;
        self.collect_lights(em);

        let camera = Self::find_camera(em);
        self.renderer.render(&mut self.queue, camera.as_ref(), &self.resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Particle;
    use crate::config::RendererConfig;
    use crate::foundation::collections::EntityHandle;
    use crate::foundation::math::Vec4;
    use crate::render::HeadlessDevice;
    use crate::resources::{GeometryType, PlaceholderLoader};
    use approx::assert_relative_eq;

    fn system(em: &mut EntityManager, config: &RendererConfig) -> RenderingSystem<HeadlessDevice> {
        let renderer = Renderer::new(HeadlessDevice::new(800, 600), config).unwrap();
        let rendering = RenderingSystem::new(renderer, ResourceManager::new(PlaceholderLoader));
        rendering.register(em);
        rendering
    }

    fn spawn_box(em: &mut EntityManager, pos: Vec3) -> EntityHandle {
        let handle = em.create_entity();
        let entity = em.get_entity_mut(handle).unwrap();
        entity.insert(TransformComponent::at(pos));
        entity.insert(RenderComponent::geometry(GeometryType::Box));
        em.notify_entity_created(handle);
        handle
    }

    fn total_instances(meshes: &[crate::render::RenderableMesh]) -> u32 {
        meshes.iter().map(|mesh| mesh.instance_count).sum()
    }

    #[test]
    fn test_same_model_is_batched() {
        let mut em = EntityManager::new();
        for x in 0..3 {
            spawn_box(&mut em, Vec3::new(x as f32, 0.0, 0.0));
        }
        let mut rendering = system(&mut em, &RendererConfig::default());
        rendering.update(&mut em, 0.016).unwrap();

        assert_eq!(rendering.queue().opaque().len(), 1);
        assert_eq!(rendering.queue().opaque()[0].instance_count, 3);
    }

    #[test]
    fn test_batches_split_at_instancing_max() {
        let mut em = EntityManager::new();
        for x in 0..5 {
            spawn_box(&mut em, Vec3::new(x as f32, 0.0, 0.0));
        }
        let mut rendering = system(&mut em, &RendererConfig::default().with_instancing_max(2));
        rendering.update(&mut em, 0.016).unwrap();

        let opaque = rendering.queue().opaque();
        assert_eq!(opaque.len(), 3);
        assert_eq!(total_instances(opaque), 5);
        assert!(opaque.iter().all(|mesh| mesh.instance_count <= 2));
    }

    #[test]
    fn test_dynamic_flag_splits_batches() {
        let mut em = EntityManager::new();
        spawn_box(&mut em, Vec3::zeros());
        let moving = spawn_box(&mut em, Vec3::new(1.0, 0.0, 0.0));
        em.get_entity_mut(moving).unwrap().get_mut::<RenderComponent>().unwrap().dynamic = true;

        let mut rendering = system(&mut em, &RendererConfig::default());
        rendering.update(&mut em, 0.016).unwrap();
        assert_eq!(rendering.queue().opaque().len(), 2);
    }

    #[test]
    fn test_hidden_entities_are_skipped() {
        let mut em = EntityManager::new();
        let hidden = spawn_box(&mut em, Vec3::zeros());
        em.get_entity_mut(hidden).unwrap().get_mut::<RenderComponent>().unwrap().display = false;
        let emitter = spawn_box(&mut em, Vec3::zeros());
        em.get_entity_mut(emitter)
            .unwrap()
            .insert(ParticleEmitterComponent::default());

        let mut rendering = system(&mut em, &RendererConfig::default());
        rendering.update(&mut em, 0.016).unwrap();
        assert_eq!(rendering.queue().scene_len(), 0);
    }

    #[test]
    fn test_ui_entity_is_laid_out_and_queued_on_layer() {
        let mut em = EntityManager::new();
        let button = spawn_box(&mut em, Vec3::zeros());
        {
            let entity = em.get_entity_mut(button).unwrap();
            entity.insert(UiComponent {
                layer: 3,
                ..UiComponent::default()
            });
            entity.insert(TextComponent {
                content: "Play".to_string(),
                ..TextComponent::default()
            });
        }

        let mut rendering = system(&mut em, &RendererConfig::default());
        rendering.update(&mut em, 0.016).unwrap();

        let entity = em.get_entity(button).unwrap();
        let pos = entity.get::<TransformComponent>().unwrap().pos;
        assert_relative_eq!(pos, Vec3::new(400.0, 300.0, 0.0));
        assert!(!entity.get::<UiComponent>().unwrap().need_update);

        assert_eq!(rendering.queue().scene_len(), 0);
        assert_eq!(rendering.queue().ui_opaque().len(), 1);
        assert_eq!(rendering.queue().ui_opaque()[0].layer, 3);
        assert_eq!(
            rendering.queue().ui_opaque()[0].ubo.size as usize,
            std::mem::size_of::<InstanceData>()
        );
        assert_eq!(rendering.queue().texts().len(), 1);
        assert_eq!(rendering.queue().texts()[0].layer, 3);
    }

    #[test]
    fn test_resize_triggers_relayout() {
        let mut em = EntityManager::new();
        let button = spawn_box(&mut em, Vec3::zeros());
        em.get_entity_mut(button).unwrap().insert(UiComponent::default());

        let mut rendering = system(&mut em, &RendererConfig::default());
        rendering.update(&mut em, 0.016).unwrap();
        rendering.renderer_mut().device_mut().set_surface_size(1000, 1000);
        rendering.update(&mut em, 0.016).unwrap();

        let pos = em.get_entity(button).unwrap().get::<TransformComponent>().unwrap().pos;
        assert_relative_eq!(pos, Vec3::new(500.0, 500.0, 0.0));
    }

    #[test]
    fn test_particles_are_instanced() {
        let mut em = EntityManager::new();
        let handle = em.create_entity();
        let mut emitter = ParticleEmitterComponent::default();
        for i in 0..4 {
            emitter.state.particles.push(Particle {
                position: Vec3::new(i as f32, 0.0, 0.0),
                direction: Vec3::y(),
                speed: 1.0,
                life: 10,
                color: Vec4::new(1.0, 0.0, 0.0, 1.0),
                color_step: Vec4::zeros(),
                size: Vec3::new(1.0, 1.0, 1.0),
                size_step: Vec3::zeros(),
            });
        }
        let entity = em.get_entity_mut(handle).unwrap();
        entity.insert(TransformComponent::default());
        entity.insert(RenderComponent::geometry(GeometryType::Box));
        entity.insert(emitter);
        em.notify_entity_created(handle);

        let mut rendering = system(&mut em, &RendererConfig::default());
        rendering.update(&mut em, 0.016).unwrap();

        let queue = rendering.queue();
        assert_eq!(total_instances(queue.opaque()) + total_instances(queue.transparent()), 4);
        assert!(queue.opaque().iter().chain(queue.transparent()).all(|mesh| mesh.hide_dynamic));
    }

    #[test]
    fn test_lights_follow_rotation_and_camera_is_found() {
        let mut em = EntityManager::new();
        let sun = em.create_entity();
        {
            let entity = em.get_entity_mut(sun).unwrap();
            let mut transform = TransformComponent::default();
            transform.rotation = Vec3::new(0.0, 0.0, 90.0);
            entity.insert(transform);
            entity.insert(LightComponent::default());
        }
        em.notify_entity_created(sun);
        let camera = em.create_entity();
        {
            let entity = em.get_entity_mut(camera).unwrap();
            entity.insert(TransformComponent::at(Vec3::new(0.0, 10.0, 10.0)));
            entity.insert(CameraComponent::default());
        }
        em.notify_entity_created(camera);
        spawn_box(&mut em, Vec3::zeros());

        let mut rendering = system(&mut em, &RendererConfig::default());
        rendering.update(&mut em, 0.016).unwrap();

        let lights = rendering.queue().lights();
        assert_eq!(lights.len(), 1);
        assert_relative_eq!(lights[0].direction, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
        assert!(rendering.renderer().stats().draw_calls > 0);
        assert!(RenderingSystem::<HeadlessDevice>::find_camera(&em).is_some());
    }

    #[test]
    fn test_unannounced_entities_are_not_drawn() {
        let mut em = EntityManager::new();
        let mut rendering = system(&mut em, &RendererConfig::default());
        spawn_box(&mut em, Vec3::zeros());
        let preview = em.create_entity();
        {
            let entity = em.get_entity_mut(preview).unwrap();
            entity.insert(TransformComponent::default());
            entity.insert(RenderComponent::geometry(GeometryType::Box));
            entity.insert(LightComponent::default());
        }
        rendering.update(&mut em, 0.016).unwrap();

        assert_eq!(em.entities_for_system("rendering").len(), 1);
        let queue = rendering.queue();
        assert_eq!(total_instances(queue.opaque()) + total_instances(queue.transparent()), 1);
        assert!(queue.lights().is_empty());
    }
}
