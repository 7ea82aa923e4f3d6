/// EntityRegistry: active scene entities keyed by name.
///
/// Uses a SlotMap for O(1) insert/remove. Iteration follows slot order:
/// insertion order until an entity is removed, after which new entities
/// may fill the freed slot.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use super::entity::SceneEntity;

new_key_type! {
    /// Stable key of an entity inside the registry
    pub struct EntityKey;
}

pub struct EntityRegistry {
    entities: SlotMap<EntityKey, SceneEntity>,
    names: FxHashMap<String, EntityKey>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            names: FxHashMap::default(),
        }
    }

    /// Add an entity, optionally overriding its group tag.
    ///
    /// If an entity with the same name is present it is replaced in
    /// place (last write wins). Returns the entity's key.
    pub fn add(&mut self, mut entity: SceneEntity, group: Option<&str>) -> EntityKey {
        if group.is_some() {
            entity.set_group(group);
        }

        if let Some(&key) = self.names.get(entity.name()) {
            if let Some(slot) = self.entities.get_mut(key) {
                *slot = entity;
                return key;
            }
        }

        let name = entity.name().to_string();
        let key = self.entities.insert(entity);
        self.names.insert(name, key);
        key
    }

    /// Remove an entity by name. Absent names are a no-op (returns None).
    pub fn remove(&mut self, name: &str) -> Option<SceneEntity> {
        let key = self.names.remove(name)?;
        self.entities.remove(key)
    }

    pub fn get(&self, name: &str) -> Option<&SceneEntity> {
        self.names.get(name).and_then(|&key| self.entities.get(key))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SceneEntity> {
        let key = *self.names.get(name)?;
        self.entities.get_mut(key)
    }

    pub fn key(&self, name: &str) -> Option<EntityKey> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over all entities
    pub fn iter(&self) -> impl Iterator<Item = &SceneEntity> {
        self.entities.values()
    }

    /// Lazy view of the entities tagged with `group`.
    ///
    /// Nothing is collected; each call to `EntityGroup::iter` walks the
    /// registry again, so the view can be iterated any number of times.
    pub fn by_group<'a>(&'a self, group: &'a str) -> EntityGroup<'a> {
        EntityGroup { registry: self, group }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.names.clear();
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Restartable view over the entities sharing a group tag
#[derive(Clone, Copy)]
pub struct EntityGroup<'a> {
    registry: &'a EntityRegistry,
    group: &'a str,
}

impl<'a> EntityGroup<'a> {
    pub fn group(&self) -> &'a str {
        self.group
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a SceneEntity> + 'a {
        let group = self.group;
        self.registry
            .entities
            .values()
            .filter(move |entity| entity.group() == Some(group))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a> IntoIterator for EntityGroup<'a> {
    type Item = &'a SceneEntity;
    type IntoIter = Box<dyn Iterator<Item = &'a SceneEntity> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
#[path = "entity_registry_tests.rs"]
mod tests;
