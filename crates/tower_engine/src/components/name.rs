//! Archetype name carried by every entity

use serde_json::{json, Value};

use crate::ecs::{ComponentType, EditorInput};
use crate::error::EngineResult;
use crate::foundation::json::JsonExt;
use crate::registry::JsonComponent;

/// Name of the archetype an entity was created from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameComponent {
    /// Archetype name
    pub value: String,
}

impl NameComponent {
    /// Name component with a value
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

impl ComponentType for NameComponent {
    const NAME: &'static str = "sNameComponent";
}

impl JsonComponent for NameComponent {
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        Ok(Self::new(json.get_string("name", "default")))
    }

    fn save_to_json(&self) -> Option<Value> {
        Some(json!({ "name": self.value }))
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        input.edit_string("name", &mut self.value)
    }
}
