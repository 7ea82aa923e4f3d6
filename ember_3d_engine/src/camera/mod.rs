//! Camera module: camera records and the active-camera stack.
//!
//! Cameras are owned by the `CameraManager` registry. The active stack
//! references them by `CameraId` and never owns their lifetime.

mod camera;
mod camera_manager;

pub use camera::{CameraId, Projection, SceneCamera};
pub use camera_manager::CameraManager;
