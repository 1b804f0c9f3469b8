//! Clickable UI button

use serde_json::{json, Value};

use crate::ecs::{ComponentType, EditorInput};
use crate::error::EngineResult;
use crate::foundation::json::JsonExt;
use crate::registry::JsonComponent;

/// What happens to the level stack when the button is pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonAction {
    /// Nothing
    #[default]
    None,
    /// Pop the current level
    RemoveCurrentLevel,
    /// Swap the current level for `action_level`
    ReplaceCurrentLevel,
    /// Push `action_level`
    AddLevel,
}

impl ButtonAction {
    /// JSON names
    pub const NAMES: [&'static str; 4] = ["NONE", "REMOVE_CURRENT_LEVEL", "REPLACE_CURRENT_LEVEL", "ADD_LEVEL"];

    /// Parse a JSON name, defaulting to none
    pub fn from_name(name: &str) -> Self {
        match name {
            "REMOVE_CURRENT_LEVEL" => Self::RemoveCurrentLevel,
            "REPLACE_CURRENT_LEVEL" => Self::ReplaceCurrentLevel,
            "ADD_LEVEL" => Self::AddLevel,
            _ => Self::None,
        }
    }

    /// JSON name
    pub const fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

/// Button behavior
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ButtonComponent {
    /// Action on press
    pub action: ButtonAction,
    /// Level loaded by the replace and add actions
    pub action_level: String,
    /// Number of levels popped before the action runs
    pub remove_states: u32,
}

impl ComponentType for ButtonComponent {
    const NAME: &'static str = "sButtonComponent";
}

impl JsonComponent for ButtonComponent {
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        Ok(Self {
            action: ButtonAction::from_name(&json.get_string("action", "NONE")),
            action_level: json.get_string("action_level", ""),
            remove_states: json.get_u32("remove_states", 0),
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        Some(json!({
            "action": self.action.name(),
            "action_level": self.action_level,
            "remove_states": self.remove_states,
        }))
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut selected = self.action as usize;
        let mut changed = false;
        if input.edit_choice("action", &ButtonAction::NAMES, &mut selected) {
            if let Some(&name) = ButtonAction::NAMES.get(selected) {
                self.action = ButtonAction::from_name(name);
                changed = true;
            }
        }
        changed |= input.edit_string("action level", &mut self.action_level);
        changed
    }
}
