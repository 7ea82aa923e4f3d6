/// Recording backend (no GPU required)
///
/// Records every call in submission order. Used by headless hosts and
/// by tests that assert on what renderables and modules submitted.

use glam::Mat4;
use rustc_hash::FxHashMap;
use super::render_backend::{
    RenderBackend, RenderLayer, ShaderHandle, TextureHandle, UniformHandle, UniformKind,
    ClearFlags, RenderState,
};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    SetViewClear { layer: RenderLayer, flags: ClearFlags, rgba: u32, depth: f32, stencil: u8 },
    SetViewTransform { layer: RenderLayer, view: Option<Mat4>, projection: Mat4 },
    SetViewRect { layer: RenderLayer, x: u16, y: u16, width: u16, height: u16 },
    CreateUniform { name: String, kind: UniformKind, count: u16, handle: UniformHandle },
    SetUniform { uniform: UniformHandle, data: Vec<f32> },
    SetTexture { stage: u8, sampler: UniformHandle, texture: TextureHandle },
    SetProgram(ShaderHandle),
    SetState(RenderState),
    FullScreenQuad { width: u32, height: u32 },
    Submit(RenderLayer),
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    uniforms: FxHashMap<String, UniformHandle>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Drain recorded calls (keeps created uniforms)
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of `submit` calls recorded for a layer
    pub fn submit_count(&self, layer: RenderLayer) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::Submit(l) if *l == layer))
            .count()
    }

    /// Handle previously created for a uniform name
    pub fn uniform(&self, name: &str) -> Option<UniformHandle> {
        self.uniforms.get(name).copied()
    }
}

impl RenderBackend for RecordingBackend {
    fn set_view_clear(&mut self, layer: RenderLayer, flags: ClearFlags, rgba: u32, depth: f32, stencil: u8) {
        self.calls.push(BackendCall::SetViewClear { layer, flags, rgba, depth, stencil });
    }

    fn set_view_transform(&mut self, layer: RenderLayer, view: Option<&Mat4>, projection: &Mat4) {
        self.calls.push(BackendCall::SetViewTransform {
            layer,
            view: view.copied(),
            projection: *projection,
        });
    }

    fn set_view_rect(&mut self, layer: RenderLayer, x: u16, y: u16, width: u16, height: u16) {
        self.calls.push(BackendCall::SetViewRect { layer, x, y, width, height });
    }

    fn create_uniform(&mut self, name: &str, kind: UniformKind, count: u16) -> UniformHandle {
        // Same name returns the same handle, as shader uniforms are global by name
        let next = UniformHandle(self.uniforms.len() as u32);
        let handle = *self.uniforms.entry(name.to_string()).or_insert(next);
        self.calls.push(BackendCall::CreateUniform { name: name.to_string(), kind, count, handle });
        handle
    }

    fn set_uniform(&mut self, uniform: UniformHandle, data: &[f32]) {
        self.calls.push(BackendCall::SetUniform { uniform, data: data.to_vec() });
    }

    fn set_texture(&mut self, stage: u8, sampler: UniformHandle, texture: TextureHandle) {
        self.calls.push(BackendCall::SetTexture { stage, sampler, texture });
    }

    fn set_program(&mut self, program: ShaderHandle) {
        self.calls.push(BackendCall::SetProgram(program));
    }

    fn set_state(&mut self, state: RenderState) {
        self.calls.push(BackendCall::SetState(state));
    }

    fn draw_full_screen_quad(&mut self, width: u32, height: u32) {
        self.calls.push(BackendCall::FullScreenQuad { width, height });
    }

    fn submit(&mut self, layer: RenderLayer) {
        self.calls.push(BackendCall::Submit(layer));
    }
}

#[cfg(test)]
#[path = "recording_backend_tests.rs"]
mod tests;
