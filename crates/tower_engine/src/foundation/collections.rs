//! Handle types for arena-owned data
//!
//! Entities and shared resources live in [`SlotMap`]s; everything else
//! refers to them through these copyable, generation-checked keys.

pub use slotmap::{SecondaryMap, SlotMap};

slotmap::new_key_type! {
    /// Live entity handle
    pub struct EntityHandle;
    /// Model owned by the resource manager
    pub struct ModelHandle;
    /// Material owned by the resource manager
    pub struct MaterialHandle;
    /// Texture owned by the resource manager
    pub struct TextureHandle;
    /// Font owned by the resource manager
    pub struct FontHandle;
}
