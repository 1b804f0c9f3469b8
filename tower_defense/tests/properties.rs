//! Save and reload of the game component types

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use tower_defense::{DirectionComponent, EntityKind, HitBoxComponent, Orientation, PositionComponent, TypeComponent};
use tower_engine::registry::JsonComponent;

fn coord() -> impl Strategy<Value = f32> {
    // quarter steps survive f32 -> JSON -> f32 exactly
    (-4000i32..4000).prop_map(|v| v as f32 / 4.0)
}

fn number() -> BoxedStrategy<Value> {
    coord().prop_map(|v| json!(v)).boxed()
}

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

fn corner() -> BoxedStrategy<Value> {
    subset(vec![("x", number()), ("y", number())]).boxed()
}

fn round_trips<T: JsonComponent + PartialEq>(json: &Value) -> Result<(), TestCaseError> {
    let loaded = T::load_from_json("Map", json).map_err(|e| TestCaseError::fail(e.to_string()))?;
    let saved = loaded.save_to_json().ok_or_else(|| TestCaseError::fail("no serializer"))?;
    let reloaded = T::load_from_json("Map", &saved).map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(reloaded, loaded);
    Ok(())
}

proptest! {
    #[test]
    fn position_round_trip(json in subset(vec![("x", number()), ("y", number()), ("z", number())])) {
        round_trips::<PositionComponent>(&json)?;
    }

    #[test]
    fn type_round_trip(kind in proptest::sample::select(EntityKind::ALL.to_vec())) {
        round_trips::<TypeComponent>(&json!({"type": kind.as_str()}))?;
    }

    #[test]
    fn direction_round_trip(json in subset(vec![
        ("x", number()),
        ("y", number()),
        ("orientation", proptest::sample::select(Orientation::ALL.to_vec()).prop_map(|o| json!(o.as_str())).boxed()),
        ("speed", number()),
    ])) {
        round_trips::<DirectionComponent>(&json)?;
    }

    #[test]
    fn hit_box_round_trip(json in subset(vec![("min", corner()), ("max", corner())])) {
        round_trips::<HitBoxComponent>(&json)?;
    }
}
