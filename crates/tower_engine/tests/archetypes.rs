//! Archetype directory scenarios

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;
use tower_engine::prelude::*;

fn write(dir: &Path, file: &str, contents: &Value) {
    fs::write(dir.join(file), serde_json::to_string_pretty(contents).unwrap()).unwrap();
}

fn catalog() -> ArchetypeCatalog {
    ArchetypeCatalog::new(ComponentTypeRegistry::with_engine_components().unwrap())
}

fn enemy() -> Value {
    json!({
        "name": "Enemy",
        "tag": "Enemy",
        "components": {
            "sNameComponent": {"name": "Enemy"},
            "sRenderComponent": {"type": "SPHERE", "color": [1, 0, 0, 1]},
            "sRigidBodyComponent": {"velocity": [0, 0, 1]},
            "sSphereColliderComponent": {"radius": 0.5}
        }
    })
}

#[test]
fn test_every_archetype_has_name_and_transform() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "enemy.json", &enemy());
    fs::create_dir(dir.path().join("ui")).unwrap();
    write(
        &dir.path().join("ui"),
        "button.json",
        &json!({"name": "Button", "components": {"sNameComponent": {}, "sTransformComponent": {"scale": [2, 1, 1]}}}),
    );

    let mut catalog = catalog();
    assert_eq!(catalog.load_directory(dir.path()).unwrap(), 2);
    for name in catalog.archetype_names().to_vec() {
        let components = catalog.components(&name).unwrap();
        assert!(components.iter().any(|c| c == NameComponent::NAME), "{name} has no name");
        assert!(components.iter().any(|c| c == TransformComponent::NAME), "{name} has no transform");
    }

    let mut em = EntityManager::new();
    let enemy = catalog.create_entity(&mut em, "Enemy", None, true).unwrap();
    let entity = em.get_entity(enemy).unwrap();
    assert_eq!(entity.get::<TransformComponent>().unwrap(), &TransformComponent::default());
    assert_eq!(entity.tag(), "Enemy");
    let button = catalog.create_entity(&mut em, "Button", None, true).unwrap();
    assert_eq!(
        em.get_entity(button).unwrap().get::<TransformComponent>().unwrap().scale,
        Vec3::new(2.0, 1.0, 1.0)
    );
}

#[test]
fn test_unknown_component_types_are_skipped() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "tower.json",
        &json!({"name": "Tower", "components": {"sNameComponent": {}, "sScriptComponent": {"name": "Tower"}}}),
    );
    let mut catalog = catalog();
    catalog.load_directory(dir.path()).unwrap();
    assert_eq!(catalog.components("Tower").unwrap(), &["sNameComponent", "sTransformComponent"]);
}

#[test]
fn test_one_bad_file_aborts_everything() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "enemy.json", &enemy());
    fs::write(dir.path().join("broken.json"), "{ \"name\": ").unwrap();
    let mut catalog = catalog();
    assert!(catalog.load_directory(dir.path()).is_err());
}

#[test]
fn test_unknown_archetype_is_invalid() {
    let mut em = EntityManager::new();
    let error = catalog().create_entity(&mut em, "Ghost", None, true).unwrap_err();
    assert!(matches!(error, EngineError::InvalidParameters(_)));
    assert!(em.is_empty());
}

#[test]
fn test_template_edit_reaches_siblings_except_placement() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "enemy.json", &enemy());
    let mut catalog = catalog();
    catalog.load_directory(dir.path()).unwrap();

    let mut em = EntityManager::new();
    let e1 = catalog.create_entity(&mut em, "Enemy", Some(Vec3::new(1.0, 0.0, 0.0)), true).unwrap();
    let e2 = catalog.create_entity(&mut em, "Enemy", Some(Vec3::new(-4.0, 0.0, 2.0)), true).unwrap();
    {
        let entity = em.get_entity_mut(e1).unwrap();
        entity.get_mut::<SphereColliderComponent>().unwrap().radius = 2.0;
        let transform = entity.get_mut::<TransformComponent>().unwrap();
        transform.scale = Vec3::new(3.0, 3.0, 3.0);
        transform.rotation = Vec3::new(0.0, 45.0, 0.0);
    }
    catalog.save_entity_template(&mut em, "Enemy", e1).unwrap();

    let sibling = em.get_entity(e2).unwrap();
    assert_eq!(sibling.get::<SphereColliderComponent>().unwrap().radius, 2.0);
    let transform = sibling.get::<TransformComponent>().unwrap();
    assert_eq!(transform.scale, Vec3::new(3.0, 3.0, 3.0));
    assert_eq!(transform.pos, Vec3::new(-4.0, 0.0, 2.0));
    assert_eq!(transform.rotation, Vec3::zeros());
    assert_eq!(sibling.get::<NameComponent>().unwrap().value, "Enemy");
}

#[test]
fn test_saved_file_reloads_identically() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "enemy.json", &enemy());
    let mut catalog = catalog();
    catalog.load_directory(dir.path()).unwrap();

    let mut em = EntityManager::new();
    let handle = catalog.create_entity(&mut em, "Enemy", None, true).unwrap();
    em.get_entity_mut(handle)
        .unwrap()
        .get_mut::<RigidBodyComponent>()
        .unwrap()
        .velocity = Vec3::new(0.0, 0.0, 4.0);
    catalog.save_entity_template(&mut em, "Enemy", handle).unwrap();
    catalog.save_entity_template_to_json("Enemy").unwrap();

    let saved: Value = serde_json::from_str(&fs::read_to_string(dir.path().join("enemy.json")).unwrap()).unwrap();
    assert_eq!(saved["tag"], json!("Enemy"));
    let keys: Vec<&String> = saved["components"].as_object().unwrap().keys().collect();
    assert_eq!(
        keys,
        [
            "sNameComponent",
            "sRenderComponent",
            "sRigidBodyComponent",
            "sSphereColliderComponent",
            "sTransformComponent"
        ]
    );

    let mut reloaded = self::catalog();
    reloaded.load_directory(dir.path()).unwrap();
    let mut em = EntityManager::new();
    let copy = reloaded.create_entity(&mut em, "Enemy", None, true).unwrap();
    assert_eq!(
        em.get_entity(copy).unwrap().get::<RigidBodyComponent>().unwrap().velocity,
        Vec3::new(0.0, 0.0, 4.0)
    );
}

#[test]
fn test_new_entity_type_is_written_and_instantiated() {
    let dir = TempDir::new().unwrap();
    let mut catalog = catalog();
    let mut em = EntityManager::new();
    let handle = catalog.create_entity_type(&mut em, "Spawner", dir.path()).unwrap();

    assert!(dir.path().join("spawner.json").is_file());
    assert!(em.get_entity(handle).unwrap().has::<TransformComponent>());
    assert!(catalog.create_entity_type(&mut em, "Spawner", dir.path()).is_err());
}

#[test]
fn test_unstored_entity_is_left_out_of_the_frame() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "enemy.json", &enemy());
    let mut catalog = catalog();
    catalog.load_directory(dir.path()).unwrap();

    let mut em = EntityManager::new();
    let renderer = Renderer::new(HeadlessDevice::new(320, 240), &RendererConfig::default()).unwrap();
    let mut rendering = RenderingSystem::new(renderer, ResourceManager::new(PlaceholderLoader));
    rendering.register(&mut em);

    let stored = catalog.create_entity(&mut em, "Enemy", None, true).unwrap();
    let preview = catalog.create_entity(&mut em, "Enemy", Some(Vec3::new(5.0, 0.0, 0.0)), false).unwrap();
    rendering.update(&mut em, 1.0 / 60.0).unwrap();

    assert_eq!(em.entities_for_system(rendering.name()), &[stored]);
    assert!(!em.is_announced(preview));
    let queue = rendering.queue();
    let drawn: u32 = queue.opaque().iter().chain(queue.transparent()).map(|mesh| mesh.instance_count).sum();
    assert_eq!(drawn, 1);
}
