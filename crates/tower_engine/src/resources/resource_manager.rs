//! # Resource Manager
//!
//! Sole owner of models, materials, textures and fonts. Everything else holds
//! slot map handles. Assets loaded from files are cached by file basename, so
//! `a/b/tower.DAE` and `c/tower.DAE` resolve to the same model; materials are
//! cached by name.

use std::collections::HashMap;
use std::path::Path;

use slotmap::SlotMap;

use super::geometry::GeometryType;
use super::loader::{AssetLoader, TextureData};
use super::model::{Bounds, Font, Glyph, Mesh, Model, Texture};
use crate::error::{EngineError, EngineResult};
use crate::foundation::collections::{FontHandle, MaterialHandle, ModelHandle, TextureHandle};
use crate::foundation::math::Vec3;
use crate::render::device::GpuTextureId;
use crate::render::material::{Material, MaterialDescriptor};

/// Name of the material assigned to meshes that name none
pub const DEFAULT_MATERIAL: &str = "default";

/// Arena of shared assets
pub struct ResourceManager {
    loader: Box<dyn AssetLoader>,
    models: SlotMap<ModelHandle, Model>,
    model_names: HashMap<String, ModelHandle>,
    materials: SlotMap<MaterialHandle, Material>,
    material_names: HashMap<String, MaterialHandle>,
    textures: SlotMap<TextureHandle, Texture>,
    texture_names: HashMap<String, TextureHandle>,
    fonts: SlotMap<FontHandle, Font>,
    font_names: HashMap<String, FontHandle>,
    default_material: MaterialHandle,
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("models", &self.models.len())
            .field("materials", &self.materials.len())
            .field("textures", &self.textures.len())
            .field("fonts", &self.fonts.len())
            .finish()
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

impl ResourceManager {
    /// Create a manager decoding assets with `loader`
    pub fn new(loader: impl AssetLoader + 'static) -> Self {
        let mut materials = SlotMap::with_key();
        let default_material = materials.insert(Material::new(DEFAULT_MATERIAL));
        let mut material_names = HashMap::new();
        material_names.insert(DEFAULT_MATERIAL.to_string(), default_material);

        Self {
            loader: Box::new(loader),
            models: SlotMap::with_key(),
            model_names: HashMap::new(),
            materials,
            material_names,
            textures: SlotMap::with_key(),
            texture_names: HashMap::new(),
            fonts: SlotMap::with_key(),
            font_names: HashMap::new(),
            default_material,
        }
    }

    /// Material used when nothing else is assigned
    pub fn default_material(&self) -> MaterialHandle {
        self.default_material
    }

    // Models

    /// Return the cached model with this file's basename, or load it
    pub fn get_or_load_model(&mut self, path: impl AsRef<Path>) -> EngineResult<ModelHandle> {
        let path = path.as_ref();
        let name = basename(path);
        if let Some(&handle) = self.model_names.get(&name) {
            return Ok(handle);
        }

        let data = self.loader.load_model(path)?;
        if data.meshes.is_empty() {
            return Err(EngineError::invalid(format!("Model {} has no mesh", path.display())));
        }
        let meshes = data
            .meshes
            .into_iter()
            .map(|mesh| {
                let material = mesh
                    .material
                    .as_deref()
                    .and_then(|m| self.get_material(m))
                    .unwrap_or(self.default_material);
                Mesh {
                    vertices: mesh.vertices,
                    indices: mesh.indices,
                    material,
                }
            })
            .collect();
        log::info!("Loaded model {name}");
        Ok(self.add_model(name, meshes))
    }

    /// Register a model built in code
    pub fn add_model(&mut self, name: impl Into<String>, meshes: Vec<Mesh>) -> ModelHandle {
        let name = name.into();
        let bounds = meshes
            .iter()
            .map(|mesh| Bounds::from_vertices(&mesh.vertices))
            .reduce(|a, b| a.merge(&b))
            .unwrap_or_default();
        let handle = self.models.insert(Model {
            name: name.clone(),
            meshes,
            bounds,
        });
        self.model_names.insert(name, handle);
        handle
    }

    /// Built-in primitive model, created on first use
    pub fn geometry_model(&mut self, geometry: GeometryType) -> ModelHandle {
        if let Some(&handle) = self.model_names.get(geometry.name()) {
            return handle;
        }
        let (vertices, indices) = geometry.build();
        let mesh = Mesh {
            vertices,
            indices,
            material: self.default_material,
        };
        self.add_model(geometry.name(), vec![mesh])
    }

    /// Model by handle
    pub fn model(&self, handle: ModelHandle) -> Option<&Model> {
        self.models.get(handle)
    }

    /// Model by cache key
    pub fn model_by_name(&self, name: &str) -> Option<ModelHandle> {
        self.model_names.get(name).copied()
    }

    // Materials

    /// Register a material, replacing any material of the same name in place
    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        if let Some(&handle) = self.material_names.get(&material.name) {
            if let Some(slot) = self.materials.get_mut(handle) {
                *slot = material;
                return handle;
            }
        }
        let name = material.name.clone();
        let handle = self.materials.insert(material);
        self.material_names.insert(name, handle);
        handle
    }

    /// Material handle by name
    pub fn get_material(&self, name: &str) -> Option<MaterialHandle> {
        self.material_names.get(name).copied()
    }

    /// Material by handle
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    /// Material by handle, mutably; every user sees the change
    pub fn material_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(handle)
    }

    /// Names of every material
    pub fn material_names(&self) -> impl Iterator<Item = &str> {
        self.material_names.keys().map(String::as_str)
    }

    /// Build a material from a `.mat` descriptor, loading its textures
    pub fn add_material_descriptor(&mut self, descriptor: &MaterialDescriptor) -> EngineResult<MaterialHandle> {
        let mut material = Material::new(descriptor.name.clone());
        material.ambient = Vec3::from(descriptor.ambient);
        material.diffuse = Vec3::from(descriptor.diffuse);
        material.bloom = Vec3::from(descriptor.bloom);
        material.ambient_texture = self.optional_texture(descriptor.ambient_texture.as_deref())?;
        material.diffuse_texture = self.optional_texture(descriptor.diffuse_texture.as_deref())?;
        material.bloom_texture = self.optional_texture(descriptor.bloom_texture.as_deref())?;
        material.bloom_alpha_texture = self.optional_texture(descriptor.bloom_alpha_texture.as_deref())?;
        material.src_blend = descriptor.src_blend;
        material.dst_blend = descriptor.dst_blend;
        material.transparent = descriptor.transparent;
        material.wireframe = descriptor.wireframe;
        Ok(self.add_material(material))
    }

    fn optional_texture(&mut self, path: Option<&str>) -> EngineResult<Option<TextureHandle>> {
        match path {
            Some(path) if !path.is_empty() => self.get_or_load_texture(path).map(Some),
            _ => Ok(None),
        }
    }

    /// Load every `.mat` file of a directory; returns how many were loaded
    ///
    /// A descriptor without a name is named after its file stem.
    pub fn load_materials_directory(&mut self, dir: impl AsRef<Path>) -> EngineResult<usize> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(EngineError::FileNotFound(dir.to_path_buf()));
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "mat"))
            .collect();
        paths.sort();

        for path in &paths {
            let mut descriptor: MaterialDescriptor = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            if descriptor.name.is_empty() {
                descriptor.name = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
            }
            self.add_material_descriptor(&descriptor)?;
            log::debug!("Loaded material {}", descriptor.name);
        }
        log::info!("Loaded {} materials from {}", paths.len(), dir.display());
        Ok(paths.len())
    }

    // Textures

    /// Return the cached texture with this file's basename, or load it
    pub fn get_or_load_texture(&mut self, path: impl AsRef<Path>) -> EngineResult<TextureHandle> {
        let path = path.as_ref();
        let name = basename(path);
        if let Some(&handle) = self.texture_names.get(&name) {
            return Ok(handle);
        }
        let data = self.loader.load_texture(path)?;
        Ok(self.insert_texture(name, data))
    }

    fn insert_texture(&mut self, name: String, data: TextureData) -> TextureHandle {
        let handle = self.textures.insert(Texture {
            name: name.clone(),
            width: data.width,
            height: data.height,
            pixels: data.pixels,
            gpu: None,
        });
        self.texture_names.insert(name, handle);
        handle
    }

    /// Register a texture that already lives on the GPU, such as a render target
    pub fn add_gpu_texture(&mut self, name: impl Into<String>, width: u32, height: u32, gpu: GpuTextureId) -> TextureHandle {
        let name = name.into();
        let texture = Texture {
            name: name.clone(),
            width,
            height,
            pixels: Vec::new(),
            gpu: Some(gpu),
        };
        if let Some(slot) = self.texture_names.get(&name).and_then(|&h| self.textures.get_mut(h)) {
            *slot = texture;
            return self.texture_names[&name];
        }
        let handle = self.textures.insert(texture);
        self.texture_names.insert(name, handle);
        handle
    }

    /// Texture by handle
    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle)
    }

    /// Texture handle by cache key
    pub fn texture_by_name(&self, name: &str) -> Option<TextureHandle> {
        self.texture_names.get(name).copied()
    }

    // Fonts

    /// Return the cached font, or rasterize it at `size` pixels
    pub fn get_or_load_font(&mut self, path: impl AsRef<Path>, size: u32) -> EngineResult<FontHandle> {
        let path = path.as_ref();
        let name = basename(path);
        if let Some(&handle) = self.font_names.get(&name) {
            return Ok(handle);
        }

        let data = self.loader.load_font(path, size)?;
        let mut glyphs = HashMap::with_capacity(data.glyphs.len());
        for glyph in data.glyphs {
            let texture = self.insert_texture(format!("{name}#{}", u32::from(glyph.character)), glyph.bitmap);
            glyphs.insert(
                glyph.character,
                Glyph {
                    size: glyph.size,
                    bearing: glyph.bearing,
                    advance: glyph.advance,
                    texture,
                },
            );
        }
        let handle = self.fonts.insert(Font {
            name: name.clone(),
            size,
            glyphs,
        });
        self.font_names.insert(name, handle);
        Ok(handle)
    }

    /// Font by handle
    pub fn font(&self, handle: FontHandle) -> Option<&Font> {
        self.fonts.get(handle)
    }

    /// Font handle by cache key
    pub fn font_by_name(&self, name: &str) -> Option<FontHandle> {
        self.font_names.get(name).copied()
    }
}
