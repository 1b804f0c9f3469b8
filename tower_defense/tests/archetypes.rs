//! Archetype loading through the game registry

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use serde_json::{json, Value};
use tower_defense::{load_catalog, EntityKind, Game, HitBoxComponent, PositionComponent, TypeComponent};
use tower_engine::foundation::math::Vec2;
use tower_engine::prelude::*;

fn write(dir: &Path, file: &str, contents: &Value) {
    fs::write(dir.join(file), serde_json::to_string_pretty(contents).unwrap()).unwrap();
}

#[test]
fn test_tile_gets_default_transform() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "tile.json",
        &json!({
            "name": "TestTile",
            "components": {
                "sNameComponent": {"name": "TestTile"},
                "sPositionComponent": {"x": 1, "y": 2, "z": 0}
            }
        }),
    );

    let catalog = load_catalog(dir.path()).unwrap();
    let mut em = EntityManager::new();
    let handle = catalog.create_entity(&mut em, "TestTile", None, true).unwrap();
    let entity = em.get_entity(handle).unwrap();

    let transform = entity.get::<TransformComponent>().unwrap();
    assert_relative_eq!(transform.scale, Vec3::new(1.0, 1.0, 1.0));
    let position = entity.get::<PositionComponent>().unwrap();
    assert_relative_eq!(position.value, Vec2::new(1.0, 2.0));
    assert_relative_eq!(position.z, 0.0);
    assert_eq!(entity.get::<NameComponent>().unwrap().value, "TestTile");
}

#[test]
fn test_game_and_engine_components_mix() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "wall.json",
        &json!({
            "name": "Wall",
            "components": {
                "sNameComponent": {},
                "sTypeComponent": {"type": "TILE_NOT_WALKABLE"},
                "sHitBoxComponent": {"min": {"x": 0, "y": 0}, "max": {"x": 1, "y": 1}},
                "sRenderComponent": {"type": "BOX"}
            }
        }),
    );

    let catalog = load_catalog(dir.path()).unwrap();
    assert_eq!(
        catalog.components("Wall").unwrap(),
        &["sNameComponent", "sTypeComponent", "sHitBoxComponent", "sRenderComponent", "sTransformComponent"]
    );

    let mut em = EntityManager::new();
    let a = catalog.create_entity(&mut em, "Wall", None, true).unwrap();
    let b = catalog.create_entity(&mut em, "Wall", None, true).unwrap();
    em.get_entity_mut(a).unwrap().get_mut::<HitBoxComponent>().unwrap().max = Vec2::new(5.0, 5.0);

    let other = em.get_entity(b).unwrap();
    assert_relative_eq!(other.get::<HitBoxComponent>().unwrap().max, Vec2::new(1.0, 1.0));
    assert_eq!(other.get::<TypeComponent>().unwrap().kind, EntityKind::TileNotWalkable);
}

#[test]
fn test_unknown_tile_type_aborts_load() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "lava.json",
        &json!({"name": "Lava", "components": {"sNameComponent": {}, "sTypeComponent": {"type": "LAVA"}}}),
    );
    assert!(load_catalog(dir.path()).is_err());
}

#[test]
fn test_saving_template_keeps_sibling_positions() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "tower.json",
        &json!({"name": "Tower", "components": {"sNameComponent": {}, "sPositionComponent": {"x": 0, "y": 0}}}),
    );

    let mut catalog = load_catalog(dir.path()).unwrap();
    let mut em = EntityManager::new();
    let edited = catalog.create_entity(&mut em, "Tower", None, true).unwrap();
    let sibling = catalog.create_entity(&mut em, "Tower", None, true).unwrap();
    em.get_entity_mut(edited).unwrap().get_mut::<PositionComponent>().unwrap().value = Vec2::new(7.0, 3.0);

    catalog.save_entity_template(&mut em, "Tower", edited).unwrap();
    let position = em.get_entity(sibling).unwrap().get::<PositionComponent>().unwrap();
    assert_relative_eq!(position.value, Vec2::zeros());
}

#[test]
fn test_headless_game_runs_frames() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "tile.json",
        &json!({
            "name": "TestTile",
            "components": {
                "sNameComponent": {},
                "sPositionComponent": {"x": 1, "y": 2},
                "sRenderComponent": {"type": "PLANE"}
            }
        }),
    );
    write(
        dir.path(),
        "camera.json",
        &json!({"name": "Camera", "components": {"sNameComponent": {}, "sCameraComponent": {}}}),
    );

    let mut config = EngineConfig::new().with_archetypes_dir(dir.path());
    config.frames = 3;
    let mut game = Game::new(config).unwrap();
    let spawned = game.spawn_archetypes().unwrap();
    assert_eq!(spawned.len(), 2);

    game.run().unwrap();
    assert_eq!(game.frame(), 3);
    assert_eq!(game.entities().len(), 2);
    assert!(game.rendering().renderer().stats().draw_calls > 0);
}
