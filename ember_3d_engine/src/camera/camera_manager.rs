/// Camera registry and active-camera stack.
///
/// Cameras are registered by name and receive a `CameraId` that is never
/// reused. The active-camera stack is LIFO and holds ids only; every id
/// on the stack resolves to a registered camera (unregistering a camera
/// removes all of its stack entries).
///
/// Lookup misses are not errors: pushing an unknown camera is a no-op,
/// popping an empty stack is a no-op, and lookups return `None`.

use glam::Mat4;
use rustc_hash::FxHashMap;
use super::camera::{CameraId, Projection, SceneCamera};

pub struct CameraManager {
    cameras: FxHashMap<CameraId, SceneCamera>,
    names: FxHashMap<String, CameraId>,
    stack: Vec<CameraId>,
    next_id: u32,
}

impl CameraManager {
    pub fn new() -> Self {
        Self {
            cameras: FxHashMap::default(),
            names: FxHashMap::default(),
            stack: Vec::new(),
            next_id: 0,
        }
    }

    // ===== REGISTRY =====

    /// Register a camera under a name.
    ///
    /// Registering a name that already exists updates that camera in
    /// place and returns its existing id. Once ids run out, new names
    /// are refused with `CameraId::INVALID`.
    pub fn register_camera(&mut self, name: &str, view: Mat4, projection: Projection) -> CameraId {
        if let Some(&id) = self.names.get(name) {
            if let Some(camera) = self.cameras.get_mut(&id) {
                camera.set_view(view);
                camera.set_projection(projection);
            }
            return id;
        }

        let id = CameraId(self.next_id);
        match self.next_id.checked_add(1) {
            Some(next_id) if id.is_valid() => self.next_id = next_id,
            _ => {
                crate::engine_error!("ember3d::CameraManager", "Camera ids exhausted, '{}' not registered", name);
                return CameraId::INVALID;
            }
        }
        self.cameras.insert(id, SceneCamera::new(id, name, view, projection));
        self.names.insert(name.to_string(), id);
        crate::engine_debug!("ember3d::CameraManager", "Registered camera '{}' as {}", name, id.0);
        id
    }

    /// Unregister a camera and drop every stack entry referring to it.
    ///
    /// Returns the removed camera, or None if the id was not registered.
    pub fn unregister_camera(&mut self, id: CameraId) -> Option<SceneCamera> {
        let camera = self.cameras.remove(&id)?;
        self.names.remove(camera.name());
        self.stack.retain(|&entry| entry != id);
        Some(camera)
    }

    /// Camera record for an id, or None if unregistered
    pub fn lookup(&self, id: CameraId) -> Option<&SceneCamera> {
        self.cameras.get(&id)
    }

    pub fn lookup_mut(&mut self, id: CameraId) -> Option<&mut SceneCamera> {
        self.cameras.get_mut(&id)
    }

    /// Id of the camera registered under a name
    pub fn find(&self, name: &str) -> Option<CameraId> {
        self.names.get(name).copied()
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    // ===== ACTIVE STACK =====

    /// Push a camera on the active stack.
    ///
    /// No-op (returns false) if the id is not registered.
    pub fn push(&mut self, id: CameraId) -> bool {
        if !self.cameras.contains_key(&id) {
            crate::engine_debug!("ember3d::CameraManager",
                "Ignoring push of unregistered camera {}", id.as_script_id());
            return false;
        }
        self.stack.push(id);
        true
    }

    /// Push a camera by name. No-op (returns false) if the name is unknown.
    pub fn push_by_name(&mut self, name: &str) -> bool {
        match self.find(name) {
            Some(id) => self.push(id),
            None => {
                crate::engine_debug!("ember3d::CameraManager",
                    "Ignoring push of unknown camera '{}'", name);
                false
            }
        }
    }

    /// Pop the top of the active stack. Popping an empty stack is a no-op.
    pub fn pop(&mut self) -> Option<CameraId> {
        self.stack.pop()
    }

    /// Top of the active stack, or None when empty
    pub fn active(&self) -> Option<CameraId> {
        self.stack.last().copied()
    }

    /// Record of the active camera
    pub fn active_camera(&self) -> Option<&SceneCamera> {
        self.active().and_then(|id| self.cameras.get(&id))
    }

    /// Active stack from bottom to top
    pub fn stack(&self) -> &[CameraId] {
        &self.stack
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Remove all cameras and empty the stack (ids are not reused)
    pub fn clear(&mut self) {
        self.cameras.clear();
        self.names.clear();
        self.stack.clear();
    }
}

impl Default for CameraManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "camera_manager_tests.rs"]
mod tests;
