//! Serialization round trips and clone independence for component types

use proptest::prelude::*;
use serde_json::{Map, Value};
use tower_engine::prelude::*;

fn coord() -> impl Strategy<Value = f32> {
    // quarter steps survive f32 -> JSON -> f32 exactly
    (-4000i32..4000).prop_map(|v| v as f32 / 4.0)
}

fn vec3_json() -> impl Strategy<Value = Value> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| serde_json::json!([x, y, z]))
}

fn vec2_json() -> impl Strategy<Value = Value> {
    (coord(), coord()).prop_map(|(x, y)| serde_json::json!([x, y]))
}

fn vec4_json() -> impl Strategy<Value = Value> {
    (coord(), coord(), coord(), coord()).prop_map(|(x, y, z, w)| serde_json::json!([x, y, z, w]))
}

fn count_json() -> BoxedStrategy<Value> {
    (0u32..500).prop_map(|v| serde_json::json!(v)).boxed()
}

fn bool_json() -> BoxedStrategy<Value> {
    any::<bool>().prop_map(Value::Bool).boxed()
}

fn text_json(pattern: &'static str) -> BoxedStrategy<Value> {
    pattern.prop_map(|s| serde_json::json!(s)).boxed()
}

fn one_of(names: &[&'static str]) -> BoxedStrategy<Value> {
    proptest::sample::select(names.to_vec()).prop_map(|s| serde_json::json!(s)).boxed()
}

fn keyframe(color: bool) -> BoxedStrategy<Value> {
    let value = if color { vec4_json().boxed() } else { vec3_json().boxed() };
    ((1i32..40).prop_map(|t| t as f32 / 4.0), value, one_of(&["NONE", "EASE_IN", "EASE_OUT"]))
        .prop_map(|(time, value, easing)| serde_json::json!({"time": time, "value": value, "easing": easing}))
        .boxed()
}

fn param_animation() -> impl Strategy<Value = Value> {
    proptest::sample::select(vec!["position", "rotation", "scale", "color", "wobble"]).prop_flat_map(|name| {
        proptest::collection::vec(keyframe(name == "color"), 0..4)
            .prop_map(move |frames| serde_json::json!({"name": name, "frames": frames}))
    })
}

fn animations() -> BoxedStrategy<Value> {
    let animation = (
        "[a-z]{1,8}",
        one_of(&["DEFAULT", "UI"]),
        any::<bool>(),
        proptest::collection::vec(param_animation(), 0..3),
    )
        .prop_map(|(name, layer, looped, params)| {
            serde_json::json!({"name": name, "layer": layer, "loop": looped, "params": params})
        });
    proptest::collection::vec(animation, 0..3)
        .prop_map(Value::Array)
        .boxed()
}

fn gradient(value: fn() -> BoxedStrategy<Value>) -> BoxedStrategy<Value> {
    subset(vec![
        ("start", value()),
        ("start_variance", value()),
        ("finish", value()),
        ("finish_variance", value()),
    ])
    .boxed()
}

/// Object holding any subset of the given keys
fn subset(entries: Vec<(&'static str, BoxedStrategy<Value>)>) -> impl Strategy<Value = Value> {
    let fields: Vec<_> = entries
        .into_iter()
        .map(|(key, strategy)| proptest::option::of(strategy).prop_map(move |v| v.map(|v| (key, v))))
        .collect();
    fields.prop_map(|pairs| {
        let map: Map<String, Value> = pairs.into_iter().flatten().map(|(k, v)| (k.to_string(), v)).collect();
        Value::Object(map)
    })
}

fn round_trips<T: JsonComponent + PartialEq>(json: &Value) -> Result<(), TestCaseError> {
    let loaded = T::load_from_json("Prop", json).map_err(|e| TestCaseError::fail(e.to_string()))?;
    let saved = loaded.save_to_json().ok_or_else(|| TestCaseError::fail("no serializer"))?;
    let reloaded = T::load_from_json("Prop", &saved).map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(reloaded, loaded);
    Ok(())
}

proptest! {
    #[test]
    fn transform_round_trip(json in subset(vec![
        ("pos", vec3_json().boxed()),
        ("scale", vec3_json().boxed()),
        ("rotation", vec3_json().boxed()),
    ])) {
        round_trips::<TransformComponent>(&json)?;
    }

    #[test]
    fn rigid_body_round_trip(json in subset(vec![
        ("gravity", vec3_json().boxed()),
        ("velocity", vec3_json().boxed()),
        ("collisions_enabled", any::<bool>().prop_map(Value::Bool).boxed()),
        ("ignored_tags", proptest::collection::vec("[A-Za-z]{1,8}", 0..4).prop_map(|t| serde_json::json!(t)).boxed()),
    ])) {
        round_trips::<RigidBodyComponent>(&json)?;
    }

    #[test]
    fn box_collider_round_trip(json in subset(vec![
        ("pos", vec3_json().boxed()),
        ("size", vec3_json().boxed()),
        ("isTrigger", any::<bool>().prop_map(Value::Bool).boxed()),
    ])) {
        round_trips::<BoxColliderComponent>(&json)?;
    }

    #[test]
    fn light_round_trip(json in subset(vec![
        ("ambient", vec3_json().boxed()),
        ("diffuse", vec3_json().boxed()),
        ("direction", vec3_json().boxed()),
    ])) {
        round_trips::<LightComponent>(&json)?;
    }

    #[test]
    fn ui_round_trip(json in subset(vec![
        ("offset", vec2_json().boxed()),
        ("size", vec2_json().boxed()),
        ("layer", (-10i32..10).prop_map(|l| serde_json::json!(l)).boxed()),
        ("horizontal_alignment", prop_oneof![Just("LEFT"), Just("MIDDLE"), Just("RIGHT")].prop_map(|s| serde_json::json!(s)).boxed()),
        ("vertical_alignment", prop_oneof![Just("TOP"), Just("MIDDLE"), Just("BOTTOM")].prop_map(|s| serde_json::json!(s)).boxed()),
        ("percentage_size", any::<bool>().prop_map(Value::Bool).boxed()),
    ])) {
        round_trips::<UiComponent>(&json)?;
    }

    #[test]
    fn text_round_trip(json in subset(vec![
        ("content", "[ -~]{0,16}".prop_map(|s| serde_json::json!(s)).boxed()),
        ("font_size", (1u32..96).prop_map(|s| serde_json::json!(s)).boxed()),
        ("offset", vec2_json().boxed()),
    ])) {
        round_trips::<TextComponent>(&json)?;
    }

    #[test]
    fn render_round_trip(json in subset(vec![
        ("animated", bool_json()),
        ("model", text_json("[a-z]{1,8}\\.obj")),
        ("type", one_of(&RenderKind::NAMES)),
        ("color", vec4_json().boxed()),
        ("texture", text_json("[a-z]{0,8}")),
        ("ignore_raycast", bool_json()),
        ("dynamic", bool_json()),
        ("hide_dynamic", bool_json()),
        ("display", bool_json()),
        ("materials", proptest::collection::vec("[a-z]{1,6}", 0..3).prop_map(|m| serde_json::json!(m)).boxed()),
        ("animations", animations()),
    ])) {
        round_trips::<RenderComponent>(&json)?;
    }

    #[test]
    fn particle_emitter_round_trip(json in subset(vec![
        ("rate", coord().prop_map(|v| serde_json::json!(v.abs())).boxed()),
        ("spawn_nb", count_json()),
        ("max_particles", count_json()),
        ("emitter_life", coord().prop_map(|v| serde_json::json!(v.abs())).boxed()),
        ("life", count_json()),
        ("life_variance", count_json()),
        ("angle", coord().prop_map(|v| serde_json::json!(v)).boxed()),
        ("angle_variance", coord().prop_map(|v| serde_json::json!(v)).boxed()),
        ("speed", coord().prop_map(|v| serde_json::json!(v)).boxed()),
        ("speed_variance", coord().prop_map(|v| serde_json::json!(v)).boxed()),
        ("color", gradient(|| vec4_json().boxed())),
        ("size", gradient(|| vec3_json().boxed())),
        ("display_only_particles", bool_json()),
        ("model", text_json("[a-z]{0,8}")),
        ("type", one_of(&RenderKind::NAMES)),
        ("texture", text_json("[a-z]{0,8}")),
    ])) {
        round_trips::<ParticleEmitterComponent>(&json)?;
    }

    #[test]
    fn camera_round_trip(json in subset(vec![
        ("projection", one_of(&["PERSPECTIVE", "ORTHOGRAPHIC_3D", "ORTHOGRAPHIC_2D"])),
        ("projection_size", coord().prop_map(|v| serde_json::json!(v)).boxed()),
        ("near", coord().prop_map(|v| serde_json::json!(v)).boxed()),
        ("far", coord().prop_map(|v| serde_json::json!(v)).boxed()),
        ("fov", coord().prop_map(|v| serde_json::json!(v)).boxed()),
        ("viewport", subset(vec![("offset", vec2_json().boxed()), ("extent", vec2_json().boxed())]).boxed()),
    ])) {
        round_trips::<CameraComponent>(&json)?;
    }

    #[test]
    fn sphere_collider_round_trip(json in subset(vec![
        ("pos", vec3_json().boxed()),
        ("radius", coord().prop_map(|v| serde_json::json!(v)).boxed()),
        ("isTrigger", bool_json()),
    ])) {
        round_trips::<SphereColliderComponent>(&json)?;
    }

    #[test]
    fn button_round_trip(json in subset(vec![
        ("action", one_of(&ButtonAction::NAMES)),
        ("action_level", text_json("[A-Za-z]{0,10}")),
        ("remove_states", count_json()),
    ])) {
        round_trips::<ButtonComponent>(&json)?;
    }

    #[test]
    fn name_round_trip(json in subset(vec![("name", text_json("[ -~]{0,16}"))])) {
        round_trips::<NameComponent>(&json)?;
    }

    #[test]
    fn transform_clone_is_independent(pos in (coord(), coord(), coord()), shift in 1.0f32..100.0) {
        let original = TransformComponent::at(Vec3::new(pos.0, pos.1, pos.2));
        let boxed: Box<dyn Component> = Box::new(original.clone());
        let mut copy = boxed.clone_component();
        copy.as_any_mut()
            .downcast_mut::<TransformComponent>()
            .ok_or_else(|| TestCaseError::fail("clone changed type"))?
            .pos
            .x += shift;
        let untouched = boxed.as_any().downcast_ref::<TransformComponent>().ok_or_else(|| TestCaseError::fail("type"))?;
        prop_assert_eq!(untouched, &original);
    }

    #[test]
    fn rigid_body_clone_is_independent(tags in proptest::collection::vec("[a-z]{1,6}", 0..4)) {
        let original = RigidBodyComponent {
            ignored_tags: tags.clone(),
            ..RigidBodyComponent::default()
        };
        let mut copy = original.clone_component();
        if let Some(body) = copy.as_any_mut().downcast_mut::<RigidBodyComponent>() {
            body.ignored_tags.push("Intruder".to_string());
            body.velocity.y = 9.0;
        }
        prop_assert_eq!(&original.ignored_tags, &tags);
        prop_assert_eq!(original.velocity, Vec3::zeros());
    }
}

#[test]
fn render_clone_shares_nothing_mutable() {
    let original = RenderComponent::load_from_json("Prop", &serde_json::json!({"type": "BOX", "color": [1, 0, 0, 1]})).unwrap();
    let mut copy = original.clone();
    copy.color = Vec4::new(0.0, 1.0, 0.0, 1.0);
    copy.display = !original.display;
    assert_eq!(original.color, Vec4::new(1.0, 0.0, 0.0, 1.0));
    assert_ne!(copy.display, original.display);
}
