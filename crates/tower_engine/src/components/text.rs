//! Text drawn over a UI element

use serde_json::{json, Value};

use super::ui::{edit_alignments, HorizontalAlignment, VerticalAlignment};
use crate::ecs::{ComponentType, EditorInput};
use crate::error::EngineResult;
use crate::foundation::json::JsonExt;
use crate::foundation::math::{Vec2, Vec4};
use crate::registry::JsonComponent;

/// Text content and style
#[derive(Debug, Clone, PartialEq)]
pub struct TextComponent {
    /// Characters
    pub content: String,
    /// Color
    pub color: Vec4,
    /// Glyph height in pixels
    pub font_size: u32,
    /// Horizontal alignment inside the UI element
    pub horizontal_alignment: HorizontalAlignment,
    /// Vertical alignment inside the UI element
    pub vertical_alignment: VerticalAlignment,
    /// Extra offset in pixels
    pub offset: Vec2,
    /// Font file
    pub font_name: String,
}

impl Default for TextComponent {
    fn default() -> Self {
        Self {
            content: String::new(),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            font_size: 10,
            horizontal_alignment: HorizontalAlignment::Middle,
            vertical_alignment: VerticalAlignment::Middle,
            offset: Vec2::zeros(),
            font_name: "arial.ttf".to_string(),
        }
    }
}

impl TextComponent {
    /// Pen start relative to the element center
    ///
    /// `ui_size` is the element's on-screen size, `text_size` the laid out
    /// text's size.
    pub fn alignment_offset(&self, ui_size: Vec2, text_size: Vec2) -> Vec2 {
        let x = match self.horizontal_alignment {
            HorizontalAlignment::Left => -ui_size.x / 2.0,
            HorizontalAlignment::Middle => -text_size.x / 2.0,
            HorizontalAlignment::Right => ui_size.x / 2.0 - text_size.x,
        };
        let y = match self.vertical_alignment {
            VerticalAlignment::Top => ui_size.y / 2.0,
            VerticalAlignment::Middle => text_size.y / 2.0,
            VerticalAlignment::Bottom => -ui_size.y / 2.0 + text_size.y,
        };
        Vec2::new(x, y) + self.offset
    }
}

impl ComponentType for TextComponent {
    const NAME: &'static str = "sTextComponent";
}

impl JsonComponent for TextComponent {
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            content: json.get_string("content", ""),
            color: json.get_vec4("color", defaults.color),
            font_size: json.get_u32("font_size", defaults.font_size),
            horizontal_alignment: HorizontalAlignment::from_name(&json.get_string("horizontal_alignment", "MIDDLE")),
            vertical_alignment: VerticalAlignment::from_name(&json.get_string("vertical_alignment", "MIDDLE")),
            offset: json.get_vec2("offset", defaults.offset),
            font_name: json.get_string("font_name", &defaults.font_name),
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        let mut out = json!({
            "content": self.content,
            "font_size": self.font_size,
            "horizontal_alignment": self.horizontal_alignment.name(),
            "vertical_alignment": self.vertical_alignment.name(),
            "font_name": self.font_name,
        });
        out.set_vec4("color", &self.color);
        out.set_vec2("offset", &self.offset);
        Some(out)
    }

    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut changed = input.edit_string("content", &mut self.content);
        changed |= input.edit_color("color", &mut self.color);
        changed |= input.edit_string("font", &mut self.font_name);
        changed |= edit_alignments(input, &mut self.horizontal_alignment, &mut self.vertical_alignment);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let text = TextComponent::load_from_json("Label", &json!({"content": "Score"})).unwrap();
        assert_eq!(text.content, "Score");
        assert_eq!(text.font_size, 10);
        assert_eq!(text.font_name, "arial.ttf");
    }

    #[test]
    fn test_alignment_offset() {
        let mut text = TextComponent {
            horizontal_alignment: HorizontalAlignment::Right,
            vertical_alignment: VerticalAlignment::Bottom,
            offset: Vec2::new(1.0, 1.0),
            ..TextComponent::default()
        };
        let offset = text.alignment_offset(Vec2::new(100.0, 40.0), Vec2::new(30.0, 10.0));
        assert_eq!(offset, Vec2::new(50.0 - 30.0 + 1.0, -20.0 + 10.0 + 1.0));

        text.horizontal_alignment = HorizontalAlignment::Middle;
        assert_eq!(text.alignment_offset(Vec2::new(100.0, 40.0), Vec2::new(30.0, 10.0)).x, -15.0 + 1.0);
    }
}
