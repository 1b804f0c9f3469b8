//! Archetypes: named entity templates loaded from JSON

mod bindings;
mod catalog;

pub use bindings::{apply_animation_values, init_animations, reverse_animations};
pub use catalog::{copy_entity_manager, ArchetypeCatalog, ArchetypeInfo};
