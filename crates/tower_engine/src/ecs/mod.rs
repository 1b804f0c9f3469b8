//! Entity Component System
//!
//! Type-erased components, entities holding at most one component per type,
//! and an entity manager that tracks which systems each entity belongs to.

pub mod component;
pub mod editor;
pub mod entity;
pub mod entity_manager;
pub mod system;

pub use component::{Component, ComponentId, ComponentType};
pub use editor::{EditorInput, ScriptedInput};
pub use entity::Entity;
pub use entity_manager::EntityManager;
pub use system::System;
