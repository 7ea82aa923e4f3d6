/// Scene: per-frame state read by the render pipeline.
///
/// Aggregates the camera registry/stack, the active entity registry, the
/// catalog of defined entities and the directional light. Renderables
/// read it through `FrameContext` while a frame sweeps; mutations they
/// request come back as `SceneCommand`s applied after the sweep.

use rustc_hash::FxHashMap;
use crate::camera::{CameraId, CameraManager};
use super::entity::SceneEntity;
use super::entity_registry::EntityRegistry;
use super::lighting::DirectionalLight;

/// A deferred scene mutation
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    PushCamera(CameraId),
    PopCamera,
    AddEntity { entity: SceneEntity, group: Option<String> },
    RemoveEntity(String),
    SetDirectionalLight(DirectionalLight),
}

/// Entities known to the host but not (necessarily) active in the scene.
///
/// This is the object directory `Scene::add_entity_by_name` resolves
/// names against.
#[derive(Default)]
pub struct EntityCatalog {
    entities: FxHashMap<String, SceneEntity>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) an entity
    pub fn define(&mut self, entity: SceneEntity) {
        self.entities.insert(entity.name().to_string(), entity);
    }

    pub fn get(&self, name: &str) -> Option<&SceneEntity> {
        self.entities.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<SceneEntity> {
        self.entities.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

pub struct Scene {
    cameras: CameraManager,
    entities: EntityRegistry,
    catalog: EntityCatalog,
    light: DirectionalLight,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            cameras: CameraManager::new(),
            entities: EntityRegistry::new(),
            catalog: EntityCatalog::new(),
            light: DirectionalLight::default(),
        }
    }

    pub fn cameras(&self) -> &CameraManager {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut CameraManager {
        &mut self.cameras
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityRegistry {
        &mut self.entities
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut EntityCatalog {
        &mut self.catalog
    }

    pub fn directional_light(&self) -> &DirectionalLight {
        &self.light
    }

    pub fn set_directional_light(&mut self, light: DirectionalLight) {
        self.light = light;
    }

    /// Activate a cataloged entity by name.
    ///
    /// Unresolved names are a no-op (returns false). Present entities are
    /// replaced with the catalog definition.
    pub fn add_entity_by_name(&mut self, name: &str, group: Option<&str>) -> bool {
        match self.catalog.get(name) {
            Some(entity) => {
                self.entities.add(entity.clone(), group);
                true
            }
            None => {
                crate::engine_debug!("ember3d::Scene", "addEntity: '{}' does not resolve", name);
                false
            }
        }
    }

    /// Apply a deferred mutation
    pub fn apply(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::PushCamera(id) => {
                self.cameras.push(id);
            }
            SceneCommand::PopCamera => {
                self.cameras.pop();
            }
            SceneCommand::AddEntity { entity, group } => {
                self.entities.add(entity, group.as_deref());
            }
            SceneCommand::RemoveEntity(name) => {
                self.entities.remove(&name);
            }
            SceneCommand::SetDirectionalLight(light) => {
                self.light = light;
            }
        }
    }

    /// Drop cameras, entities and catalog; reset the light
    pub fn clear(&mut self) {
        self.cameras.clear();
        self.entities.clear();
        self.catalog = EntityCatalog::new();
        self.light = DirectionalLight::default();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
