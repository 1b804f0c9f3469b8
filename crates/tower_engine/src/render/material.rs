//! Materials and shader permutations
//!
//! A material is shared by every mesh that references it through its
//! [`MaterialHandle`](crate::foundation::collections::MaterialHandle);
//! editing it is visible to all of them on the next frame. The set of bound
//! textures and flags forms [`MaterialOptions`], which selects the shader
//! permutation used to draw it.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::collections::TextureHandle;
use crate::foundation::math::Vec3;

bitflags! {
    /// Material features that change the shader program
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct MaterialOptions: u32 {
        /// Ambient texture bound
        const AMBIENT_TEXTURE = 1;
        /// Diffuse texture bound
        const DIFFUSE_TEXTURE = 1 << 1;
        /// Bloom texture bound
        const BLOOM_TEXTURE = 1 << 2;
        /// Bloom alpha texture bound
        const BLOOM_ALPHA_TEXTURE = 1 << 3;
        /// Non-black bloom color
        const BLOOM = 1 << 4;
        /// Drawn as lines
        const WIREFRAME = 1 << 5;
    }
}

/// Shader program variant: material options plus the instancing bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ShaderPermutation(pub u32);

impl ShaderPermutation {
    const INSTANCED: u32 = 1 << 31;

    /// Build from material options
    pub const fn new(options: MaterialOptions, instanced: bool) -> Self {
        let bits = options.bits();
        Self(if instanced { bits | Self::INSTANCED } else { bits })
    }

    /// Material options part
    pub const fn options(self) -> MaterialOptions {
        MaterialOptions::from_bits_truncate(self.0)
    }

    /// Whether the variant reads per-instance data
    pub const fn is_instanced(self) -> bool {
        self.0 & Self::INSTANCED != 0
    }
}

/// Blend factor for transparent draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlendFactor {
    /// 0
    Zero,
    /// 1
    One,
    /// Source color
    SrcColor,
    /// 1 - source color
    OneMinusSrcColor,
    /// Source alpha
    SrcAlpha,
    /// 1 - source alpha
    OneMinusSrcAlpha,
    /// Destination alpha
    DstAlpha,
    /// 1 - destination alpha
    OneMinusDstAlpha,
    /// Destination color
    DstColor,
    /// 1 - destination color
    OneMinusDstColor,
}

/// Surface description shared by meshes
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Unique name, used to look the material up
    pub name: String,
    /// Ambient color
    pub ambient: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Bloom color
    pub bloom: Vec3,
    /// Ambient texture
    pub ambient_texture: Option<TextureHandle>,
    /// Diffuse texture
    pub diffuse_texture: Option<TextureHandle>,
    /// Bloom texture
    pub bloom_texture: Option<TextureHandle>,
    /// Bloom alpha texture
    pub bloom_alpha_texture: Option<TextureHandle>,
    /// Source blend factor
    pub src_blend: BlendFactor,
    /// Destination blend factor
    pub dst_blend: BlendFactor,
    /// Drawn in the transparent pass
    pub transparent: bool,
    /// Drawn as lines
    pub wireframe: bool,
}

impl Material {
    /// Opaque white material
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: Vec3::new(0.2, 0.2, 0.2),
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            bloom: Vec3::zeros(),
            ambient_texture: None,
            diffuse_texture: None,
            bloom_texture: None,
            bloom_alpha_texture: None,
            src_blend: BlendFactor::SrcAlpha,
            dst_blend: BlendFactor::OneMinusSrcAlpha,
            transparent: false,
            wireframe: false,
        }
    }

    /// Options derived from the bound textures and flags
    pub fn options(&self) -> MaterialOptions {
        let mut options = MaterialOptions::empty();
        options.set(MaterialOptions::AMBIENT_TEXTURE, self.ambient_texture.is_some());
        options.set(MaterialOptions::DIFFUSE_TEXTURE, self.diffuse_texture.is_some());
        options.set(MaterialOptions::BLOOM_TEXTURE, self.bloom_texture.is_some());
        options.set(MaterialOptions::BLOOM_ALPHA_TEXTURE, self.bloom_alpha_texture.is_some());
        options.set(MaterialOptions::BLOOM, self.bloom != Vec3::zeros());
        options.set(MaterialOptions::WIREFRAME, self.wireframe);
        options
    }

    /// Shader variant drawing this material
    pub fn permutation(&self, instanced: bool) -> ShaderPermutation {
        ShaderPermutation::new(self.options(), instanced)
    }

    /// Textures in binding order: ambient, diffuse, bloom, bloom alpha
    pub fn textures(&self) -> [Option<TextureHandle>; 4] {
        [
            self.ambient_texture,
            self.diffuse_texture,
            self.bloom_texture,
            self.bloom_alpha_texture,
        ]
    }
}

/// `.mat` file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDescriptor {
    /// Material name
    pub name: String,
    /// Ambient color
    pub ambient: [f32; 3],
    /// Diffuse color
    pub diffuse: [f32; 3],
    /// Bloom color
    pub bloom: [f32; 3],
    /// Ambient texture path
    pub ambient_texture: Option<String>,
    /// Diffuse texture path
    pub diffuse_texture: Option<String>,
    /// Bloom texture path
    pub bloom_texture: Option<String>,
    /// Bloom alpha texture path
    pub bloom_alpha_texture: Option<String>,
    /// Source blend factor
    pub src_blend: BlendFactor,
    /// Destination blend factor
    pub dst_blend: BlendFactor,
    /// Transparent pass
    pub transparent: bool,
    /// Wireframe
    pub wireframe: bool,
}

impl Default for MaterialDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: [0.2, 0.2, 0.2],
            diffuse: [1.0, 1.0, 1.0],
            bloom: [0.0, 0.0, 0.0],
            ambient_texture: None,
            diffuse_texture: None,
            bloom_texture: None,
            bloom_alpha_texture: None,
            src_blend: BlendFactor::SrcAlpha,
            dst_blend: BlendFactor::OneMinusSrcAlpha,
            transparent: false,
            wireframe: false,
        }
    }
}
