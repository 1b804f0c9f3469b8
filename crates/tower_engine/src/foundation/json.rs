//! Defaulting accessors over [`serde_json::Value`]
//!
//! Component loaders read every field through [`JsonExt`], so a missing or
//! mistyped key falls back to the documented default instead of failing.

use serde_json::{Map, Value};

use super::math::{Vec2, Vec3, Vec4};

/// Typed getters with defaults, and setters for serializers
pub trait JsonExt {
    /// Boolean field
    fn get_bool(&self, key: &str, default: bool) -> bool;
    /// Float field
    fn get_f32(&self, key: &str, default: f32) -> f32;
    /// Unsigned integer field
    fn get_u32(&self, key: &str, default: u32) -> u32;
    /// String field
    fn get_string(&self, key: &str, default: &str) -> String;
    /// Array of strings
    fn get_string_vec(&self, key: &str) -> Vec<String>;
    /// `[x, y]`
    fn get_vec2(&self, key: &str, default: Vec2) -> Vec2;
    /// `[x, y, z]`
    fn get_vec3(&self, key: &str, default: Vec3) -> Vec3;
    /// `[r, g, b, a]`
    fn get_vec4(&self, key: &str, default: Vec4) -> Vec4;
    /// Nested object, or `Value::Null` when absent
    fn get_object(&self, key: &str) -> &Value;

    /// Insert a field, turning `Null` into an object first
    fn set(&mut self, key: &str, value: impl Into<Value>);
    /// Insert a `[x, y]` array
    fn set_vec2(&mut self, key: &str, value: &Vec2);
    /// Insert a `[x, y, z]` array
    fn set_vec3(&mut self, key: &str, value: &Vec3);
    /// Insert a `[r, g, b, a]` array
    fn set_vec4(&mut self, key: &str, value: &Vec4);
}

static NULL: Value = Value::Null;

fn floats(value: Option<&Value>) -> Option<Vec<f32>> {
    let array = value?.as_array()?;
    array
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}

impl JsonExt for Value {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    fn get_f32(&self, key: &str, default: f32) -> f32 {
        self.get(key)
            .and_then(Value::as_f64)
            .map_or(default, |v| v as f32)
    }

    fn get_u32(&self, key: &str, default: u32) -> u32 {
        self.get(key)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(default)
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    fn get_string_vec(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|array| {
                array
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn get_vec2(&self, key: &str, default: Vec2) -> Vec2 {
        match floats(self.get(key)) {
            Some(v) if v.len() >= 2 => Vec2::new(v[0], v[1]),
            _ => default,
        }
    }

    fn get_vec3(&self, key: &str, default: Vec3) -> Vec3 {
        match floats(self.get(key)) {
            Some(v) if v.len() >= 3 => Vec3::new(v[0], v[1], v[2]),
            _ => default,
        }
    }

    fn get_vec4(&self, key: &str, default: Vec4) -> Vec4 {
        match floats(self.get(key)) {
            Some(v) if v.len() >= 4 => Vec4::new(v[0], v[1], v[2], v[3]),
            _ => default,
        }
    }

    fn get_object(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }

    fn set(&mut self, key: &str, value: impl Into<Value>) {
        if !self.is_object() {
            *self = Value::Object(Map::new());
        }
        if let Value::Object(map) = self {
            map.insert(key.to_string(), value.into());
        }
    }

    fn set_vec2(&mut self, key: &str, value: &Vec2) {
        self.set(key, vec![value.x, value.y]);
    }

    fn set_vec3(&mut self, key: &str, value: &Vec3) {
        self.set(key, vec![value.x, value.y, value.z]);
    }

    fn set_vec4(&mut self, key: &str, value: &Vec4) {
        self.set(key, vec![value.x, value.y, value.z, value.w]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_keys_use_defaults() {
        let value = json!({});
        assert!(value.get_bool("display", true));
        assert_eq!(value.get_f32("life", 80.0), 80.0);
        assert_eq!(value.get_string("model", "default"), "default");
        assert_eq!(value.get_vec3("scale", Vec3::new(1.0, 1.0, 1.0)), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_mistyped_keys_use_defaults() {
        let value = json!({"pos": "not an array", "life": "ten", "scale": [1.0, 2.0]});
        assert_eq!(value.get_vec3("pos", Vec3::zeros()), Vec3::zeros());
        assert_eq!(value.get_f32("life", 3.0), 3.0);
        assert_eq!(value.get_vec3("scale", Vec3::zeros()), Vec3::zeros());
    }

    #[test]
    fn test_integers_read_as_floats() {
        let value = json!({"x": 1, "color": [1, 0, 0, 1]});
        assert_eq!(value.get_f32("x", 0.0), 1.0);
        assert_eq!(value.get_vec4("color", Vec4::zeros()), Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_set_on_null_creates_object() {
        let mut value = Value::Null;
        value.set_vec3("pos", &Vec3::new(1.0, 2.0, 3.0));
        value.set("name", "tower");
        assert_eq!(value, json!({"pos": [1.0, 2.0, 3.0], "name": "tower"}));
    }
}
