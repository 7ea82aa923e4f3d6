//! Render backend collaborator
//!
//! The engine core does not talk to a GPU. Everything a renderable
//! submits goes through the `RenderBackend` trait; a concrete backend
//! (bgfx, wgpu, ...) is registered with `Engine::create_renderer`.
//! Handles are plain integers so they can cross the link table.

mod render_backend;
mod recording_backend;

pub use render_backend::{
    RenderBackend, ShaderHandle, TextureHandle, UniformHandle, UniformKind,
    ClearFlags, RenderState, RenderLayer,
    RENDER_LAYER_0, RENDER_LAYER_1, RENDER_LAYER_2, RENDER_LAYER_3,
};
pub use recording_backend::{RecordingBackend, BackendCall};
