//! Editor data flow
//!
//! Component types route their editable fields through an [`EditorInput`].
//! Every method receives the current value, may overwrite it, and reports
//! whether it changed. The widget toolkit behind it is not part of the engine.

use crate::foundation::math::{Vec3, Vec4};

/// Source of field edits
pub trait EditorInput {
    /// Edit a float
    fn edit_f32(&mut self, label: &str, value: &mut f32) -> bool;

    /// Edit a 3D vector
    fn edit_vec3(&mut self, label: &str, value: &mut Vec3) -> bool;

    /// Edit an RGBA color
    fn edit_color(&mut self, label: &str, value: &mut Vec4) -> bool;

    /// Edit a checkbox
    fn edit_bool(&mut self, label: &str, value: &mut bool) -> bool;

    /// Edit a text field
    fn edit_string(&mut self, label: &str, value: &mut String) -> bool;

    /// Pick one entry of `choices`; `selected` is an index into it
    fn edit_choice(&mut self, label: &str, choices: &[&str], selected: &mut usize) -> bool;
}

/// Scripted input: applies queued edits keyed by label, leaves the rest alone
///
/// Used by tools and tests that drive editor updates without a UI.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    floats: Vec<(String, f32)>,
    vectors: Vec<(String, Vec3)>,
    colors: Vec<(String, Vec4)>,
    bools: Vec<(String, bool)>,
    strings: Vec<(String, String)>,
    choices: Vec<(String, String)>,
}

impl ScriptedInput {
    /// Empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a float edit
    pub fn with_f32(mut self, label: &str, value: f32) -> Self {
        self.floats.push((label.to_string(), value));
        self
    }

    /// Queue a vector edit
    pub fn with_vec3(mut self, label: &str, value: Vec3) -> Self {
        self.vectors.push((label.to_string(), value));
        self
    }

    /// Queue a color edit
    pub fn with_color(mut self, label: &str, value: Vec4) -> Self {
        self.colors.push((label.to_string(), value));
        self
    }

    /// Queue a checkbox edit
    pub fn with_bool(mut self, label: &str, value: bool) -> Self {
        self.bools.push((label.to_string(), value));
        self
    }

    /// Queue a text edit
    pub fn with_string(mut self, label: &str, value: &str) -> Self {
        self.strings.push((label.to_string(), value.to_string()));
        self
    }

    /// Queue a choice edit by entry name
    pub fn with_choice(mut self, label: &str, choice: &str) -> Self {
        self.choices.push((label.to_string(), choice.to_string()));
        self
    }
}

fn take<T: Clone + PartialEq>(queue: &[(String, T)], label: &str, value: &mut T) -> bool {
    match queue.iter().find(|(l, _)| l == label) {
        Some((_, v)) if v != value => {
            *value = v.clone();
            true
        }
        _ => false,
    }
}

impl EditorInput for ScriptedInput {
    fn edit_f32(&mut self, label: &str, value: &mut f32) -> bool {
        take(&self.floats, label, value)
    }

    fn edit_vec3(&mut self, label: &str, value: &mut Vec3) -> bool {
        take(&self.vectors, label, value)
    }

    fn edit_color(&mut self, label: &str, value: &mut Vec4) -> bool {
        take(&self.colors, label, value)
    }

    fn edit_bool(&mut self, label: &str, value: &mut bool) -> bool {
        take(&self.bools, label, value)
    }

    fn edit_string(&mut self, label: &str, value: &mut String) -> bool {
        take(&self.strings, label, value)
    }

    fn edit_choice(&mut self, label: &str, choices: &[&str], selected: &mut usize) -> bool {
        let Some((_, name)) = self.choices.iter().find(|(l, _)| l == label) else {
            return false;
        };
        match choices.iter().position(|c| c == name) {
            Some(index) if index != *selected => {
                *selected = index;
                true
            }
            _ => false,
        }
    }
}
