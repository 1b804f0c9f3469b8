//! Component trait and type identifiers
//!
//! Components are plain data. A concrete type implements [`ComponentType`]
//! (a name plus `Clone + Debug`); the blanket impl turns it into a
//! type-erased [`Component`] that entities and factories can store as
//! `Box<dyn Component>` and downcast back safely.

use std::any::Any;
use std::fmt;

use crate::error::{EngineError, EngineResult};

/// Stable identifier of a component type
///
/// A 64-bit FNV-1a hash of the type name, identical across runs and builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u64);

impl ComponentId {
    /// Hash a component type name
    pub const fn of_name(name: &str) -> Self {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0100_0000_01b3;

        let bytes = name.as_bytes();
        let mut hash = OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(PRIME);
            i += 1;
        }
        Self(hash)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// A concrete component type
pub trait ComponentType: Any + Clone + fmt::Debug {
    /// Registry name, as written in archetype files
    const NAME: &'static str;

    /// Identifier derived from [`Self::NAME`]
    fn component_id() -> ComponentId {
        ComponentId::of_name(Self::NAME)
    }
}

/// Type-erased component
pub trait Component: Any + fmt::Debug {
    /// Registry name of the concrete type
    fn name(&self) -> &'static str;

    /// Identifier of the concrete type
    fn id(&self) -> ComponentId {
        ComponentId::of_name(self.name())
    }

    /// Deep copy into a new box
    fn clone_component(&self) -> Box<dyn Component>;

    /// Overwrite every field from another instance of the same type
    ///
    /// Fails with [`EngineError::InternalError`] when `other` is a different type.
    fn update_from(&mut self, other: &dyn Component) -> EngineResult<()>;

    /// Upcast for downcasting by reference
    fn as_any(&self) -> &dyn Any;

    /// Upcast for downcasting by mutable reference
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: ComponentType> Component for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn update_from(&mut self, other: &dyn Component) -> EngineResult<()> {
        let other = other.downcast_ref::<T>().ok_or_else(|| {
            EngineError::internal(format!(
                "Cannot update {} from {}",
                T::NAME,
                other.name()
            ))
        })?;
        self.clone_from(other);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn Component + '_ {
    /// Downcast to a concrete component type
    pub fn downcast_ref<T: ComponentType>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast to a concrete component type, mutably
    pub fn downcast_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Check the concrete type
    pub fn is<T: ComponentType>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl Clone for Box<dyn Component> {
    fn clone(&self) -> Self {
        self.clone_component()
    }
}
