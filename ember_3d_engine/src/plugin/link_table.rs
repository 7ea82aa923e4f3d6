/// Link table: the versioned struct of host entry points handed to modules
///
/// The layout is `#[repr(C)]` and append-only. Any change to an existing
/// entry bumps `LINK_TABLE_VERSION`; modules declare the range of
/// versions they were built against in their `ModuleDescriptor`.
///
/// # Calling contract
///
/// - Strings are NUL-terminated UTF-8. A null or non-UTF-8 string makes
///   the call a no-op returning the error sentinel.
/// - Handles are `u32`; `u32::MAX` is the invalid sentinel.
/// - Matrices are 16 `f32` in column-major order.
/// - Texture handles returned by `load_texture` are owned by the module
///   until passed back to `release_texture`. Commands registered with
///   `add_command` stay registered until `remove_command`.
/// - Nothing here blocks on I/O. Backend entry points are only valid
///   while a backend is registered; otherwise they log and do nothing.

use std::ffi::{c_char, c_void};
use crate::console::ForeignCommandFn;
use crate::scene::DirectionalLightData;

/// Current link table layout version
pub const LINK_TABLE_VERSION: u32 = 1;

/// Invalid handle sentinel shared by every handle-returning entry point
pub const INVALID_HANDLE: u32 = u32::MAX;

/// Resource acquisition
#[repr(C)]
#[derive(Clone, Copy)]
pub struct GraphicsLink {
    /// Shader program by asset name, `INVALID_HANDLE` if unknown
    pub get_shader: unsafe extern "C" fn(name: *const c_char) -> u32,
    /// Acquire a texture by path (reference counted)
    pub load_texture: unsafe extern "C" fn(path: *const c_char) -> u32,
    /// Release a texture acquired with `load_texture`; false if unknown
    pub release_texture: unsafe extern "C" fn(texture: u32) -> bool,
    /// Create a named uniform; `kind` is a `UniformKind` discriminant
    pub create_uniform: unsafe extern "C" fn(name: *const c_char, kind: u32, count: u16) -> u32,
    /// Sampler uniform of a texture stage
    pub get_texture_sampler: unsafe extern "C" fn(stage: u8) -> u32,
}

/// Backend submission, forwarded to the registered `RenderBackend`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct BackendLink {
    pub set_view_clear: unsafe extern "C" fn(layer: u8, flags: u16, rgba: u32, depth: f32, stencil: u8),
    /// `view` may be null (identity); `projection` must not be
    pub set_view_transform: unsafe extern "C" fn(layer: u8, view: *const f32, projection: *const f32),
    pub set_view_rect: unsafe extern "C" fn(layer: u8, x: u16, y: u16, width: u16, height: u16),
    /// `data` points to `count` floats
    pub set_uniform: unsafe extern "C" fn(uniform: u32, data: *const f32, count: u32),
    pub set_texture: unsafe extern "C" fn(stage: u8, sampler: u32, texture: u32),
    pub set_program: unsafe extern "C" fn(program: u32),
    /// `state` holds `RenderState` bits
    pub set_state: unsafe extern "C" fn(state: u64),
    pub draw_full_screen_quad: unsafe extern "C" fn(width: u32, height: u32),
    pub submit: unsafe extern "C" fn(layer: u8),
}

/// Console commands and logging
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ConsoleLink {
    pub add_command: unsafe extern "C" fn(
        namespace: *const c_char,
        name: *const c_char,
        usage: *const c_char,
        min_args: u32,
        max_args: u32,
        callback: ForeignCommandFn,
        user_data: *mut c_void,
    ) -> bool,
    pub remove_command: unsafe extern "C" fn(namespace: *const c_char, name: *const c_char) -> bool,
    /// `severity` is a `LogSeverity` discriminant (0 = Trace .. 4 = Error)
    pub log: unsafe extern "C" fn(severity: u32, source: *const c_char, message: *const c_char),
}

/// Frame state accessors (snapshot taken before each frame)
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RenderingLink {
    pub frame_index: unsafe extern "C" fn() -> u64,
    pub canvas_size: unsafe extern "C" fn(width: *mut u32, height: *mut u32),
    /// Writes 16 floats; returns false (identity written) without a camera
    pub view_matrix: unsafe extern "C" fn(out: *mut f32) -> bool,
    /// Writes 16 floats; returns false (identity written) without a camera
    pub projection_matrix: unsafe extern "C" fn(out: *mut f32) -> bool,
    pub directional_light: unsafe extern "C" fn(out: *mut DirectionalLightData),
}

/// The table itself
#[repr(C)]
#[derive(Clone, Copy)]
pub struct LinkTable {
    pub version: u32,
    /// `size_of::<LinkTable>()` of the publishing host
    pub size: u32,
    pub graphics: GraphicsLink,
    pub backend: BackendLink,
    pub console: ConsoleLink,
    pub rendering: RenderingLink,
}

impl LinkTable {
    /// True when this table's version lies in `min..=max` and the table
    /// is at least as large as the caller's view of it
    pub fn is_compatible(&self, min_version: u32, max_version: u32) -> bool {
        (min_version..=max_version).contains(&self.version)
            && self.size as usize >= std::mem::size_of::<LinkTable>()
    }
}
