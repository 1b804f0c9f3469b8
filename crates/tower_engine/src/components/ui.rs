//! Screen-space placement for UI entities

use serde_json::{json, Value};

use super::transform::TransformComponent;
use crate::ecs::{ComponentType, EditorInput};
use crate::error::EngineResult;
use crate::foundation::json::JsonExt;
use crate::foundation::math::{Vec2, Vec3};
use crate::registry::JsonComponent;

/// Horizontal anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlignment {
    /// Left edge
    Left,
    /// Center
    #[default]
    Middle,
    /// Right edge
    Right,
}

impl HorizontalAlignment {
    /// JSON names
    pub const NAMES: [&'static str; 3] = ["LEFT", "MIDDLE", "RIGHT"];

    /// Parse a JSON name, defaulting to middle
    pub fn from_name(name: &str) -> Self {
        match name {
            "LEFT" => Self::Left,
            "RIGHT" => Self::Right,
            _ => Self::Middle,
        }
    }

    /// JSON name
    pub const fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

/// Vertical anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlignment {
    /// Top edge
    Top,
    /// Center
    #[default]
    Middle,
    /// Bottom edge
    Bottom,
}

impl VerticalAlignment {
    /// JSON names
    pub const NAMES: [&'static str; 3] = ["TOP", "MIDDLE", "BOTTOM"];

    /// Parse a JSON name, defaulting to middle
    pub fn from_name(name: &str) -> Self {
        match name {
            "TOP" => Self::Top,
            "BOTTOM" => Self::Bottom,
            _ => Self::Middle,
        }
    }

    /// JSON name
    pub const fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

pub(crate) fn edit_alignments(
    input: &mut dyn EditorInput,
    horizontal: &mut HorizontalAlignment,
    vertical: &mut VerticalAlignment,
) -> bool {
    let mut h = *horizontal as usize;
    let mut v = *vertical as usize;
    let mut changed = false;
    if input.edit_choice("horizontal alignment", &HorizontalAlignment::NAMES, &mut h) {
        if let Some(&name) = HorizontalAlignment::NAMES.get(h) {
            *horizontal = HorizontalAlignment::from_name(name);
            changed = true;
        }
    }
    if input.edit_choice("vertical alignment", &VerticalAlignment::NAMES, &mut v) {
        if let Some(&name) = VerticalAlignment::NAMES.get(v) {
            *vertical = VerticalAlignment::from_name(name);
            changed = true;
        }
    }
    changed
}

/// Anchors an entity to the window
#[derive(Debug, Clone, PartialEq)]
pub struct UiComponent {
    /// Offset in percent of the window size
    pub offset: Vec2,
    /// Draw layer
    pub layer: i32,
    /// Horizontal anchor
    pub horizontal_alignment: HorizontalAlignment,
    /// Vertical anchor
    pub vertical_alignment: VerticalAlignment,
    /// `size` is a fraction of the window rather than a scale
    pub percentage_size: bool,
    /// Size as a fraction of the window
    pub size: Vec2,
    /// Layout must be recomputed
    pub need_update: bool,
}

impl Default for UiComponent {
    fn default() -> Self {
        Self {
            offset: Vec2::zeros(),
            layer: 0,
            horizontal_alignment: HorizontalAlignment::Middle,
            vertical_alignment: VerticalAlignment::Middle,
            percentage_size: false,
            size: Vec2::new(0.1, 0.1),
            need_update: true,
        }
    }
}

impl UiComponent {
    /// Place `transform` in a `window`-sized screen for a model of `model_size`
    ///
    /// Returns the on-screen size of the element.
    pub fn layout(&self, transform: &mut TransformComponent, model_size: Vec3, window: Vec2) -> Vec2 {
        if self.percentage_size && model_size.x > 0.0 && model_size.y > 0.0 {
            transform.scale.x = window.x * self.size.x / model_size.x;
            transform.scale.y = window.y * self.size.y / model_size.y;
        }
        let size = model_size.component_mul(&transform.scale).xy();

        transform.pos.x = match self.horizontal_alignment {
            HorizontalAlignment::Left => size.x / 2.0,
            HorizontalAlignment::Middle => window.x / 2.0,
            HorizontalAlignment::Right => window.x - size.x / 2.0,
        };
        transform.pos.y = match self.vertical_alignment {
            VerticalAlignment::Top => window.y - size.y / 2.0,
            VerticalAlignment::Middle => window.y / 2.0,
            VerticalAlignment::Bottom => size.y / 2.0,
        };
        transform.pos.x += window.x * self.offset.x / 100.0;
        transform.pos.y += window.y * self.offset.y / 100.0;
        transform.pos.z = 0.0;
        size
    }
}

impl ComponentType for UiComponent {
    const NAME: &'static str = "sUiComponent";
}

impl JsonComponent for UiComponent {
    #[allow(clippy::cast_possible_truncation)]
    fn load_from_json(_archetype: &str, json: &Value) -> EngineResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            offset: json.get_vec2("offset", defaults.offset),
            layer: json.get_f32("layer", 0.0) as i32,
            horizontal_alignment: HorizontalAlignment::from_name(&json.get_string("horizontal_alignment", "MIDDLE")),
            vertical_alignment: VerticalAlignment::from_name(&json.get_string("vertical_alignment", "MIDDLE")),
            percentage_size: json.get_bool("percentage_size", false),
            size: json.get_vec2("size", defaults.size),
            need_update: true,
        })
    }

    fn save_to_json(&self) -> Option<Value> {
        let mut out = json!({
            "layer": self.layer,
            "horizontal_alignment": self.horizontal_alignment.name(),
            "vertical_alignment": self.vertical_alignment.name(),
            "percentage_size": self.percentage_size,
        });
        out.set_vec2("offset", &self.offset);
        out.set_vec2("size", &self.size);
        Some(out)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn update_editor(&mut self, input: &mut dyn EditorInput) -> bool {
        let mut changed = edit_alignments(input, &mut self.horizontal_alignment, &mut self.vertical_alignment);
        let mut offset = Vec3::new(self.offset.x, self.offset.y, 0.0);
        if input.edit_vec3("offset", &mut offset) {
            self.offset = offset.xy();
            changed = true;
        }
        let mut layer = self.layer as f32;
        if input.edit_f32("layer", &mut layer) {
            self.layer = layer as i32;
            changed = true;
        }
        changed |= input.edit_bool("percentage size", &mut self.percentage_size);
        if changed {
            self.need_update = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_alignment_names() {
        assert_eq!(HorizontalAlignment::from_name("RIGHT").name(), "RIGHT");
        assert_eq!(VerticalAlignment::from_name("nonsense"), VerticalAlignment::Middle);
        assert_eq!(VerticalAlignment::Bottom.name(), "BOTTOM");
    }

    #[test]
    fn test_layout_top_left_with_offset() {
        let ui = UiComponent::load_from_json(
            "Menu",
            &json!({"horizontal_alignment": "LEFT", "vertical_alignment": "TOP", "offset": [10, -10]}),
        )
        .unwrap();
        let mut transform = TransformComponent {
            scale: Vec3::new(100.0, 50.0, 1.0),
            ..TransformComponent::default()
        };
        let size = ui.layout(&mut transform, Vec3::new(1.0, 1.0, 1.0), Vec2::new(800.0, 600.0));
        assert_relative_eq!(size.x, 100.0);
        assert_relative_eq!(transform.pos.x, 50.0 + 80.0);
        assert_relative_eq!(transform.pos.y, 600.0 - 25.0 - 60.0);
    }

    #[test]
    fn test_percentage_size_scales() {
        let ui = UiComponent {
            percentage_size: true,
            size: Vec2::new(0.5, 0.25),
            ..UiComponent::default()
        };
        let mut transform = TransformComponent::default();
        ui.layout(&mut transform, Vec3::new(2.0, 2.0, 1.0), Vec2::new(800.0, 400.0));
        assert_relative_eq!(transform.scale.x, 200.0);
        assert_relative_eq!(transform.scale.y, 50.0);
        assert_relative_eq!(transform.pos.x, 400.0);
    }
}
