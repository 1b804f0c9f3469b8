//! Lazily compiled shader programs

use std::collections::HashMap;

use super::device::{GraphicsDevice, ShaderId};
use super::material::ShaderPermutation;
use super::RenderResult;

/// Every program the renderer uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderKind {
    /// Lit mesh shader for one material permutation
    Scene(ShaderPermutation),
    /// Glyph quads
    Text,
    /// Bloom downsample
    Downsample,
    /// Separable bloom blur
    Blur {
        /// Horizontal or vertical direction
        horizontal: bool,
    },
    /// Additive full-screen composite
    Composite,
}

/// Programs compiled so far, keyed by kind
#[derive(Debug, Default)]
pub struct ShaderCache {
    programs: HashMap<ShaderKind, ShaderId>,
}

impl ShaderCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the program for `kind`, compiling it on first use
    pub fn get_or_compile<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        kind: ShaderKind,
    ) -> RenderResult<ShaderId> {
        if let Some(&program) = self.programs.get(&kind) {
            return Ok(program);
        }
        let program = device.compile_shader(kind)?;
        log::debug!("Compiled shader {kind:?}");
        self.programs.insert(kind, program);
        Ok(program)
    }

    /// Number of compiled programs
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Whether nothing was compiled yet
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::HeadlessDevice;
    use crate::render::material::MaterialOptions;

    #[test]
    fn test_compiles_once_per_kind() {
        let mut device = HeadlessDevice::new(8, 8);
        let mut cache = ShaderCache::new();
        let kind = ShaderKind::Scene(ShaderPermutation::new(MaterialOptions::DIFFUSE_TEXTURE, false));
        let a = cache.get_or_compile(&mut device, kind).unwrap();
        let b = cache.get_or_compile(&mut device, kind).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
        assert_eq!(device.commands().len(), 1);
    }

    #[test]
    fn test_compile_failure_is_not_cached() {
        let mut device = HeadlessDevice::new(8, 8).with_failing_shader(ShaderKind::Composite);
        let mut cache = ShaderCache::new();
        assert!(cache.get_or_compile(&mut device, ShaderKind::Composite).is_err());
        assert!(cache.is_empty());
    }
}
