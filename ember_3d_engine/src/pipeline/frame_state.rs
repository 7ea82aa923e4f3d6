/// Snapshot of frame-level state served to loaded modules.
///
/// Captured from the scene right before a frame sweeps and read by the
/// link-table accessors (view matrix, canvas size, light), which must
/// not touch the scene lock held by the sweep.

use glam::Mat4;
use crate::camera::CameraId;
use crate::scene::{DirectionalLightData, Scene};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub frame_index: u64,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Active camera, None when the stack is empty
    pub active_camera: Option<CameraId>,
    /// Active camera view matrix (identity without a camera)
    pub view_matrix: Mat4,
    /// Active camera projection matrix (identity without a camera)
    pub projection_matrix: Mat4,
    pub light: DirectionalLightData,
}

impl FrameState {
    pub fn capture(scene: &Scene, frame_index: u64, canvas_width: u32, canvas_height: u32) -> Self {
        let camera = scene.cameras().active_camera();
        Self {
            frame_index,
            canvas_width,
            canvas_height,
            active_camera: camera.map(|c| c.id()),
            view_matrix: camera.map_or(Mat4::IDENTITY, |c| *c.view_matrix()),
            projection_matrix: camera.map_or(Mat4::IDENTITY, |c| c.projection_matrix()),
            light: scene.directional_light().to_data(),
        }
    }

    pub fn has_camera(&self) -> bool {
        self.active_camera.is_some()
    }
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            frame_index: 0,
            canvas_width: 0,
            canvas_height: 0,
            active_camera: None,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            light: DirectionalLightData::default(),
        }
    }
}
