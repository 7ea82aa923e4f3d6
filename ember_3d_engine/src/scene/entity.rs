/// Scene entities.
///
/// An entity is identified by its unique name and carries its concrete
/// kind as a tagged variant, so consumers match on `EntityKind` instead
/// of narrowing a generic object at runtime.

use glam::Mat4;

/// Concrete kind of a scene entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    /// Transform-only node (grouping, attachment point)
    Empty,
    /// Renders a mesh asset
    Mesh { mesh: String },
    /// Point light source
    Light { intensity: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntity {
    name: String,
    kind: EntityKind,
    group: Option<String>,
    transform: Mat4,
}

impl SceneEntity {
    pub fn new(name: &str, kind: EntityKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            group: None,
            transform: Mat4::IDENTITY,
        }
    }

    /// Builder: set the world transform
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: set the group tag
    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    pub fn set_group(&mut self, group: Option<&str>) {
        self.group = group.map(str::to_string);
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, EntityKind::Mesh { .. })
    }
}
