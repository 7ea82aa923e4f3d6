/// SceneCamera: a registered camera record.
///
/// Cameras are registered with the `CameraManager` independently of the
/// active-camera stack. The stack only ever holds `CameraId`s.

use glam::{Mat4, Vec3};

/// Camera identity.
///
/// `CameraId::INVALID` is the sentinel returned by lookups that miss; it
/// maps to `-1` on the console command surface.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub u32);

impl CameraId {
    pub const INVALID: CameraId = CameraId(u32::MAX);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    /// Integer form used by the command surface (`-1` for INVALID)
    pub fn as_script_id(self) -> i32 {
        if self.is_valid() { self.0 as i32 } else { -1 }
    }

    /// Convert an optional id into its command surface form
    pub fn script_id(id: Option<CameraId>) -> i32 {
        id.unwrap_or(Self::INVALID).as_script_id()
    }
}

/// Projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    /// Right-handed projection matrix with a [0, 1] depth range
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective { fov_y, aspect, near, far } => {
                Mat4::perspective_rh(fov_y, aspect, near, far)
            }
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                Mat4::orthographic_rh(left, right, bottom, top, near, far)
            }
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneCamera {
    id: CameraId,
    name: String,
    view_matrix: Mat4,
    projection: Projection,
}

impl SceneCamera {
    pub(crate) fn new(id: CameraId, name: &str, view_matrix: Mat4, projection: Projection) -> Self {
        Self {
            id,
            name: name.to_string(),
            view_matrix,
            projection,
        }
    }

    pub fn id(&self) -> CameraId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// View matrix (inverse of the camera's world transform)
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    /// Combined view-projection matrix (projection * view)
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection.matrix() * self.view_matrix
    }

    /// World-space position recovered from the view matrix
    pub fn position(&self) -> Vec3 {
        self.view_matrix.inverse().w_axis.truncate()
    }

    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
