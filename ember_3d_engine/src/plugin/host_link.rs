/// Host side of the link table
///
/// Every entry point resolves the engine singleton on each call, so the
/// table itself is plain data and can be built once and frozen. Entry
/// points never unwind: failures are logged and reported through the
/// sentinel documented on the table.

use std::ffi::{c_char, c_void, CStr};
use glam::Mat4;
use crate::backend::{
    ClearFlags, RenderBackend, RenderState, ShaderHandle, TextureHandle, UniformHandle, UniformKind,
};
use crate::console::{CommandHandler, ForeignCommand, ForeignCommandFn};
use crate::engine::Engine;
use crate::log::LogSeverity;
use crate::pipeline::FrameState;
use crate::resource::ResourceManager;
use crate::scene::DirectionalLightData;
use super::module_lease::ModuleLease;
use super::link_table::{
    BackendLink, ConsoleLink, GraphicsLink, LinkTable, RenderingLink, INVALID_HANDLE,
    LINK_TABLE_VERSION,
};

/// Build the host's link table
pub(crate) fn host_link_table() -> LinkTable {
    LinkTable {
        version: LINK_TABLE_VERSION,
        size: std::mem::size_of::<LinkTable>() as u32,
        graphics: GraphicsLink {
            get_shader: host_get_shader,
            load_texture: host_load_texture,
            release_texture: host_release_texture,
            create_uniform: host_create_uniform,
            get_texture_sampler: host_get_texture_sampler,
        },
        backend: BackendLink {
            set_view_clear: host_set_view_clear,
            set_view_transform: host_set_view_transform,
            set_view_rect: host_set_view_rect,
            set_uniform: host_set_uniform,
            set_texture: host_set_texture,
            set_program: host_set_program,
            set_state: host_set_state,
            draw_full_screen_quad: host_draw_full_screen_quad,
            submit: host_submit,
        },
        console: ConsoleLink {
            add_command: host_add_command,
            remove_command: host_remove_command,
            log: host_log,
        },
        rendering: RenderingLink {
            frame_index: host_frame_index,
            canvas_size: host_canvas_size,
            view_matrix: host_view_matrix,
            projection_matrix: host_projection_matrix,
            directional_light: host_directional_light,
        },
    }
}

// ===== HELPERS =====

/// Borrow a module string (None for null or invalid UTF-8)
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

unsafe fn read_mat4(ptr: *const f32) -> Option<Mat4> {
    if ptr.is_null() {
        return None;
    }
    let cols = std::slice::from_raw_parts(ptr, 16);
    Some(Mat4::from_cols_slice(cols))
}

unsafe fn write_mat4(out: *mut f32, matrix: &Mat4) {
    if !out.is_null() {
        std::ptr::copy_nonoverlapping(matrix.to_cols_array().as_ptr(), out, 16);
    }
}

fn with_resources<T>(fallback: T, f: impl FnOnce(&mut ResourceManager) -> T) -> T {
    let Ok(resources) = Engine::resource_manager() else {
        return fallback;
    };
    let result = match resources.lock() {
        Ok(mut guard) => f(&mut *guard),
        Err(_) => fallback,
    };
    result
}

fn with_backend<T>(fallback: T, f: impl FnOnce(&mut dyn RenderBackend) -> T) -> T {
    let Ok(backend) = Engine::renderer() else {
        return fallback;
    };
    let result = match backend.lock() {
        Ok(mut guard) => f(&mut *guard),
        Err(_) => fallback,
    };
    result
}

fn frame_state() -> FrameState {
    Engine::frame_state().unwrap_or_default()
}

// ===== GRAPHICS =====

unsafe extern "C" fn host_get_shader(name: *const c_char) -> u32 {
    let Some(name) = str_arg(name) else {
        return INVALID_HANDLE;
    };
    with_resources(ShaderHandle::INVALID, |resources| resources.shader(name)).0
}

unsafe extern "C" fn host_load_texture(path: *const c_char) -> u32 {
    let Some(path) = str_arg(path) else {
        return INVALID_HANDLE;
    };
    with_resources(TextureHandle::INVALID, |resources| resources.load_texture(path)).0
}

unsafe extern "C" fn host_release_texture(texture: u32) -> bool {
    with_resources(false, |resources| resources.release_texture(TextureHandle(texture)))
}

unsafe extern "C" fn host_create_uniform(name: *const c_char, kind: u32, count: u16) -> u32 {
    let (Some(name), Some(kind)) = (str_arg(name), UniformKind::from_raw(kind)) else {
        return INVALID_HANDLE;
    };
    with_backend(UniformHandle::INVALID, |backend| backend.create_uniform(name, kind, count)).0
}

unsafe extern "C" fn host_get_texture_sampler(stage: u8) -> u32 {
    with_resources(UniformHandle::INVALID, |resources| resources.texture_sampler(stage)).0
}

// ===== BACKEND =====

unsafe extern "C" fn host_set_view_clear(layer: u8, flags: u16, rgba: u32, depth: f32, stencil: u8) {
    let flags = ClearFlags::from_bits_truncate(flags);
    with_backend((), |backend| backend.set_view_clear(layer, flags, rgba, depth, stencil));
}

unsafe extern "C" fn host_set_view_transform(layer: u8, view: *const f32, projection: *const f32) {
    let Some(projection) = read_mat4(projection) else {
        crate::engine_warn!("ember3d::LinkTable", "set_view_transform: null projection");
        return;
    };
    let view = read_mat4(view);
    with_backend((), |backend| backend.set_view_transform(layer, view.as_ref(), &projection));
}

unsafe extern "C" fn host_set_view_rect(layer: u8, x: u16, y: u16, width: u16, height: u16) {
    with_backend((), |backend| backend.set_view_rect(layer, x, y, width, height));
}

unsafe extern "C" fn host_set_uniform(uniform: u32, data: *const f32, count: u32) {
    if data.is_null() {
        return;
    }
    let data = std::slice::from_raw_parts(data, count as usize);
    with_backend((), |backend| backend.set_uniform(UniformHandle(uniform), data));
}

unsafe extern "C" fn host_set_texture(stage: u8, sampler: u32, texture: u32) {
    with_backend((), |backend| backend.set_texture(stage, UniformHandle(sampler), TextureHandle(texture)));
}

unsafe extern "C" fn host_set_program(program: u32) {
    with_backend((), |backend| backend.set_program(ShaderHandle(program)));
}

unsafe extern "C" fn host_set_state(state: u64) {
    let state = RenderState::from_bits_truncate(state);
    with_backend((), |backend| backend.set_state(state));
}

unsafe extern "C" fn host_draw_full_screen_quad(width: u32, height: u32) {
    with_backend((), |backend| backend.draw_full_screen_quad(width, height));
}

unsafe extern "C" fn host_submit(layer: u8) {
    with_backend((), |backend| backend.submit(layer));
}

// ===== CONSOLE =====

unsafe extern "C" fn host_add_command(
    namespace: *const c_char,
    name: *const c_char,
    usage: *const c_char,
    min_args: u32,
    max_args: u32,
    callback: ForeignCommandFn,
    user_data: *mut c_void,
) -> bool {
    let (Some(namespace), Some(name)) = (str_arg(namespace), str_arg(name)) else {
        return false;
    };
    let usage = str_arg(usage).unwrap_or("");
    let Ok(registry) = Engine::command_registry() else {
        return false;
    };
    let Ok(mut commands) = registry.lock() else {
        return false;
    };
    commands.add_command(
        namespace,
        name,
        usage,
        min_args as usize,
        max_args as usize,
        CommandHandler::Foreign(ForeignCommand { callback, user_data, lease: ModuleLease::current() }),
    )
}

unsafe extern "C" fn host_remove_command(namespace: *const c_char, name: *const c_char) -> bool {
    let (Some(namespace), Some(name)) = (str_arg(namespace), str_arg(name)) else {
        return false;
    };
    let Ok(registry) = Engine::command_registry() else {
        return false;
    };
    let Ok(mut commands) = registry.lock() else {
        return false;
    };
    commands.remove_command(namespace, name)
}

unsafe extern "C" fn host_log(severity: u32, source: *const c_char, message: *const c_char) {
    let Some(message) = str_arg(message) else {
        return;
    };
    let source = str_arg(source).unwrap_or("plugin");
    Engine::log(LogSeverity::from_raw(severity), source, message.to_string());
}

// ===== RENDERING =====

unsafe extern "C" fn host_frame_index() -> u64 {
    frame_state().frame_index
}

unsafe extern "C" fn host_canvas_size(width: *mut u32, height: *mut u32) {
    let state = frame_state();
    if !width.is_null() {
        *width = state.canvas_width;
    }
    if !height.is_null() {
        *height = state.canvas_height;
    }
}

unsafe extern "C" fn host_view_matrix(out: *mut f32) -> bool {
    let state = frame_state();
    write_mat4(out, &state.view_matrix);
    state.has_camera()
}

unsafe extern "C" fn host_projection_matrix(out: *mut f32) -> bool {
    let state = frame_state();
    write_mat4(out, &state.projection_matrix);
    state.has_camera()
}

unsafe extern "C" fn host_directional_light(out: *mut DirectionalLightData) {
    if !out.is_null() {
        *out = frame_state().light;
    }
}

#[cfg(test)]
#[path = "host_link_tests.rs"]
mod tests;
