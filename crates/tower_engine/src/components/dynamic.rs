//! Marker for entities whose instance data changes every frame

use serde_json::Value;

use crate::ecs::ComponentType;
use crate::error::EngineResult;
use crate::registry::JsonComponent;

/// Marker without fields
///
/// Has no serializer: saving goes through the JSON it was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DynamicComponent;

impl ComponentType for DynamicComponent {
    const NAME: &'static str = "sDynamicComponent";
}

impl JsonComponent for DynamicComponent {
    fn load_from_json(_archetype: &str, _json: &Value) -> EngineResult<Self> {
        Ok(Self)
    }
}
