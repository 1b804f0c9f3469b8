//! # Render Queue
//!
//! Per-frame collection of draw items. Systems fill it, the renderer consumes
//! it once, and it is cleared at the start of the next frame. Storage is
//! allocated once with the configured capacities and reused: clearing resets
//! lengths, never capacity. Items pushed past a category's capacity are
//! dropped with a warning.
//!
//! ## Categories
//!
//! - opaque and transparent scene meshes, split by the material's
//!   transparency flag
//! - opaque and transparent UI meshes
//! - texts
//! - lights

use std::cmp::Ordering;

use super::buffer_pool::UboRegion;
use super::light::Light;
use super::material::{BlendFactor, ShaderPermutation};
use crate::config::RendererConfig;
use crate::foundation::collections::{FontHandle, MaterialHandle, ModelHandle};
use crate::foundation::math::{Vec2, Vec4};
use crate::resources::{ModelInstance, ResourceManager};

/// One draw: a mesh of a model with a material and its uniform range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderableMesh {
    /// Model holding the mesh
    pub model: ModelHandle,
    /// Mesh index inside the model
    pub mesh_index: usize,
    /// Material
    pub material: MaterialHandle,
    /// Per-instance uniform data
    pub ubo: UboRegion,
    /// Number of instances in the uniform range
    pub instance_count: u32,
    /// Draw layer; higher layers sort first
    pub layer: i32,
    /// Shader variant
    pub permutation: ShaderPermutation,
    /// Blend factors used when transparent
    pub blend: (BlendFactor, BlendFactor),
    /// Drawn by the dynamic path
    pub dynamic: bool,
    /// Hidden while dynamic objects are hidden
    pub hide_dynamic: bool,
}

/// One text
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableText {
    /// Characters
    pub content: String,
    /// Font
    pub font: FontHandle,
    /// Glyph height in pixels
    pub font_size: f32,
    /// Color
    pub color: Vec4,
    /// Pen start in pixels
    pub position: Vec2,
    /// Draw layer
    pub layer: i32,
}

/// Placement flags for queued meshes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawParams {
    /// Draw layer
    pub layer: i32,
    /// Draw in the UI pass
    pub ui: bool,
    /// Dynamic flag
    pub dynamic: bool,
    /// Hide-dynamic flag
    pub hide_dynamic: bool,
}

/// Frame draw lists
#[derive(Debug)]
pub struct RenderQueue {
    opaque: Vec<RenderableMesh>,
    transparent: Vec<RenderableMesh>,
    ui_opaque: Vec<RenderableMesh>,
    ui_transparent: Vec<RenderableMesh>,
    texts: Vec<RenderableText>,
    lights: Vec<Light>,
    max_meshes: usize,
    max_texts: usize,
    max_lights: usize,
    dropped: usize,
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new(&RendererConfig::default())
    }
}

fn push_bounded<T>(list: &mut Vec<T>, max: usize, item: T, what: &str) -> bool {
    if list.len() >= max {
        log::warn!("Render queue full: dropping {what} (capacity {max})");
        return false;
    }
    list.push(item);
    true
}

fn compare_opaque(a: &RenderableMesh, b: &RenderableMesh) -> Ordering {
    b.layer
        .cmp(&a.layer)
        .then_with(|| b.permutation.cmp(&a.permutation))
}

fn compare_transparent(a: &RenderableMesh, b: &RenderableMesh) -> Ordering {
    compare_opaque(a, b)
        .then_with(|| a.blend.0.cmp(&b.blend.0))
        .then_with(|| a.blend.1.cmp(&b.blend.1))
}

impl RenderQueue {
    /// Queue with the configured capacities
    pub fn new(config: &RendererConfig) -> Self {
        let meshes = config.max_renderable_meshes;
        Self {
            opaque: Vec::with_capacity(meshes),
            transparent: Vec::with_capacity(meshes),
            ui_opaque: Vec::with_capacity(meshes),
            ui_transparent: Vec::with_capacity(meshes),
            texts: Vec::with_capacity(config.max_texts),
            lights: Vec::with_capacity(config.max_lights),
            max_meshes: meshes,
            max_texts: config.max_texts,
            max_lights: config.max_lights,
            dropped: 0,
        }
    }

    /// Reset every category to empty, keeping storage
    pub fn clear(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
        self.ui_opaque.clear();
        self.ui_transparent.clear();
        self.texts.clear();
        self.lights.clear();
        self.dropped = 0;
    }

    /// Queue one mesh; returns whether it was accepted
    ///
    /// A material missing from `resources` is treated as opaque.
    #[allow(clippy::too_many_arguments)]
    pub fn add_mesh(
        &mut self,
        resources: &ResourceManager,
        model: ModelHandle,
        mesh_index: usize,
        material: MaterialHandle,
        ubo: UboRegion,
        instance_count: u32,
        params: DrawParams,
    ) -> bool {
        let (transparent, permutation, blend) = resources.material(material).map_or(
            (false, ShaderPermutation::default(), (BlendFactor::One, BlendFactor::Zero)),
            |m| (m.transparent, m.permutation(instance_count > 1), (m.src_blend, m.dst_blend)),
        );
        let item = RenderableMesh {
            model,
            mesh_index,
            material,
            ubo,
            instance_count,
            layer: params.layer,
            permutation,
            blend,
            dynamic: params.dynamic,
            hide_dynamic: params.hide_dynamic,
        };
        let (list, what) = match (params.ui, transparent) {
            (false, false) => (&mut self.opaque, "opaque mesh"),
            (false, true) => (&mut self.transparent, "transparent mesh"),
            (true, false) => (&mut self.ui_opaque, "ui mesh"),
            (true, true) => (&mut self.ui_transparent, "transparent ui mesh"),
        };
        let accepted = push_bounded(list, self.max_meshes, item, what);
        if !accepted {
            self.dropped += 1;
        }
        accepted
    }

    /// Queue every mesh of a model instance; returns how many were accepted
    pub fn add_model_with(
        &mut self,
        resources: &ResourceManager,
        instance: &ModelInstance,
        ubo: UboRegion,
        instance_count: u32,
        params: DrawParams,
    ) -> usize {
        let Some(model) = resources.model(instance.model) else {
            log::warn!("Render queue: unknown model {:?}", instance.model);
            return 0;
        };
        (0..model.meshes.len())
            .filter(|&i| {
                let material = instance
                    .materials
                    .get(i)
                    .copied()
                    .unwrap_or(model.meshes[i].material);
                self.add_mesh(resources, instance.model, i, material, ubo, instance_count, params)
            })
            .count()
    }

    /// Queue a scene model
    pub fn add_model(
        &mut self,
        resources: &ResourceManager,
        instance: &ModelInstance,
        ubo: UboRegion,
        instance_count: u32,
    ) -> usize {
        self.add_model_with(resources, instance, ubo, instance_count, DrawParams::default())
    }

    /// Queue a UI model on a layer
    pub fn add_ui_model(
        &mut self,
        resources: &ResourceManager,
        instance: &ModelInstance,
        ubo: UboRegion,
        layer: i32,
    ) -> usize {
        let params = DrawParams {
            layer,
            ui: true,
            ..DrawParams::default()
        };
        self.add_model_with(resources, instance, ubo, 1, params)
    }

    /// Queue a text
    pub fn add_text(&mut self, text: RenderableText) -> bool {
        let accepted = push_bounded(&mut self.texts, self.max_texts, text, "text");
        if !accepted {
            self.dropped += 1;
        }
        accepted
    }

    /// Queue a light
    pub fn add_light(&mut self, light: Light) -> bool {
        let accepted = push_bounded(&mut self.lights, self.max_lights, light, "light");
        if !accepted {
            self.dropped += 1;
        }
        accepted
    }

    /// Sort every mesh list into draw order
    ///
    /// Opaque: layer descending, then shader permutation descending.
    /// Transparent: the same, then source and destination blend ascending.
    pub fn sort(&mut self) {
        self.opaque.sort_by(compare_opaque);
        self.ui_opaque.sort_by(compare_opaque);
        self.transparent.sort_by(compare_transparent);
        self.ui_transparent.sort_by(compare_transparent);
        self.texts.sort_by(|a, b| b.layer.cmp(&a.layer));
    }

    /// Opaque scene meshes
    pub fn opaque(&self) -> &[RenderableMesh] {
        &self.opaque
    }

    /// Transparent scene meshes
    pub fn transparent(&self) -> &[RenderableMesh] {
        &self.transparent
    }

    /// Opaque UI meshes
    pub fn ui_opaque(&self) -> &[RenderableMesh] {
        &self.ui_opaque
    }

    /// Transparent UI meshes
    pub fn ui_transparent(&self) -> &[RenderableMesh] {
        &self.ui_transparent
    }

    /// Texts
    pub fn texts(&self) -> &[RenderableText] {
        &self.texts
    }

    /// Lights
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Number of scene (non-UI) meshes
    pub fn scene_len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    /// Items dropped since the last clear
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Storage capacity of the mesh lists
    pub fn mesh_capacity(&self) -> usize {
        self.opaque.capacity()
    }
}
