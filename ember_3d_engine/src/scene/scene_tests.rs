/// Tests for Scene, EntityCatalog and SceneCommand application

use super::*;
use crate::camera::Projection;
use crate::scene::EntityKind;
use glam::{Mat4, Vec3, Vec4};

fn scene_with_catalog() -> Scene {
    let mut scene = Scene::new();
    scene.catalog_mut().define(SceneEntity::new("crate", EntityKind::Mesh { mesh: "crate.mesh".into() }));
    scene.catalog_mut().define(SceneEntity::new("lamp", EntityKind::Light { intensity: 1.0 }).with_group("lights"));
    scene
}

#[test]
fn test_add_entity_by_name_resolves_catalog() {
    let mut scene = scene_with_catalog();
    assert!(scene.add_entity_by_name("crate", Some("props")));
    assert!(scene.add_entity_by_name("lamp", None));

    assert_eq!(scene.entities().len(), 2);
    assert_eq!(scene.entities().get("crate").unwrap().group(), Some("props"));
    assert_eq!(scene.entities().by_group("lights").count(), 1);
}

#[test]
fn test_add_entity_by_name_unresolved_is_noop() {
    let mut scene = scene_with_catalog();
    assert!(!scene.add_entity_by_name("ghost", None));
    assert!(scene.entities().is_empty());
}

#[test]
fn test_catalog_define_and_remove() {
    let mut scene = scene_with_catalog();
    assert_eq!(scene.catalog().len(), 2);
    assert!(scene.catalog_mut().remove("crate").is_some());
    assert!(scene.catalog().get("crate").is_none());
}

#[test]
fn test_apply_camera_commands() {
    let mut scene = Scene::new();
    let id = scene.cameras_mut().register_camera("main", Mat4::IDENTITY, Projection::default());

    scene.apply(SceneCommand::PushCamera(id));
    assert_eq!(scene.cameras().active(), Some(id));

    scene.apply(SceneCommand::PopCamera);
    scene.apply(SceneCommand::PopCamera);
    assert_eq!(scene.cameras().active(), None);
}

#[test]
fn test_apply_entity_commands() {
    let mut scene = Scene::new();
    scene.apply(SceneCommand::AddEntity {
        entity: SceneEntity::new("node", EntityKind::Empty),
        group: Some("g".into()),
    });
    assert_eq!(scene.entities().by_group("g").count(), 1);

    scene.apply(SceneCommand::RemoveEntity("node".into()));
    scene.apply(SceneCommand::RemoveEntity("node".into()));
    assert!(scene.entities().is_empty());
}

#[test]
fn test_apply_directional_light() {
    let mut scene = Scene::new();
    let light = DirectionalLight::new(Vec3::new(0.0, 0.0, -2.0), Vec4::ONE, Vec4::ZERO);
    scene.apply(SceneCommand::SetDirectionalLight(light));

    assert_eq!(scene.directional_light().direction, Vec3::new(0.0, 0.0, -1.0));
    assert_eq!(scene.directional_light().to_data().direction, [0.0, 0.0, -1.0, 0.0]);
}

#[test]
fn test_clear_resets_everything() {
    let mut scene = scene_with_catalog();
    scene.add_entity_by_name("crate", None);
    scene.cameras_mut().register_camera("main", Mat4::IDENTITY, Projection::default());
    scene.clear();

    assert!(scene.entities().is_empty());
    assert!(scene.catalog().is_empty());
    assert_eq!(scene.cameras().camera_count(), 0);
    assert_eq!(*scene.directional_light(), DirectionalLight::default());
}
