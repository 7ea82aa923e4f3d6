/// Skybox instance state and rendering
///
/// All host access goes through the link table. Fields are atomics
/// because console commands and the render hook may touch the same
/// instance from different threads.

use std::ffi::{c_char, c_void, CStr, CString};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use ember_3d_engine::ember3d::backend::{
    ClearFlags, RenderState, ShaderHandle, TextureHandle, UniformHandle, UniformKind, RENDER_LAYER_1,
};
use ember_3d_engine::ember3d::console::ForeignCommandFn;
use ember_3d_engine::ember3d::log::LogSeverity;
use ember_3d_engine::ember3d::plugin::{LinkTable, INVALID_HANDLE};
use glam::Mat4;

/// Shader asset drawn by the skybox
pub const SKYBOX_SHADER: &CStr = c"Skybox:skyboxShader";
/// Inverse view matrix uniform
pub const SKYBOX_MATRIX_UNIFORM: &CStr = c"u_mtx";

const NAMESPACE: &CStr = c"Skybox";
const LOG_SOURCE: &CStr = c"Skybox";

/// Clear color of the skybox layer (blue, visible when the texture is missing)
const CLEAR_COLOR: u32 = 0x0000_ffff;

struct SkyboxCommand {
    name: &'static CStr,
    usage: &'static CStr,
    min_args: u32,
    max_args: u32,
    callback: ForeignCommandFn,
}

const COMMANDS: [SkyboxCommand; 3] = [
    SkyboxCommand {
        name: c"load",
        usage: c"Skybox.load <path>",
        min_args: 1,
        max_args: 1,
        callback: load_command,
    },
    SkyboxCommand {
        name: c"enable",
        usage: c"Skybox.enable",
        min_args: 0,
        max_args: 0,
        callback: enable_command,
    },
    SkyboxCommand {
        name: c"disable",
        usage: c"Skybox.disable",
        min_args: 0,
        max_args: 0,
        callback: disable_command,
    },
];

pub struct SkyboxContext {
    table: &'static LinkTable,
    enabled: AtomicBool,
    texture: AtomicU32,
    shader: AtomicU32,
    matrix_uniform: AtomicU32,
}

impl SkyboxContext {
    /// Resolve the shader and create the matrix uniform
    ///
    /// A missing shader is not fatal: the module loads but never draws.
    pub fn new(table: &'static LinkTable) -> Self {
        // SAFETY: link table entry points accept any NUL-terminated string
        let shader = unsafe { (table.graphics.get_shader)(SKYBOX_SHADER.as_ptr()) };
        let matrix_uniform = if shader == INVALID_HANDLE {
            log(table, LogSeverity::Warn, "Shader 'Skybox:skyboxShader' not found, skybox disabled");
            INVALID_HANDLE
        } else {
            unsafe {
                (table.graphics.create_uniform)(SKYBOX_MATRIX_UNIFORM.as_ptr(), UniformKind::Mat4 as u32, 1)
            }
        };

        Self {
            table,
            enabled: AtomicBool::new(false),
            texture: AtomicU32::new(INVALID_HANDLE),
            shader: AtomicU32::new(shader),
            matrix_uniform: AtomicU32::new(matrix_uniform),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn texture(&self) -> TextureHandle {
        TextureHandle(self.texture.load(Ordering::Acquire))
    }

    pub fn shader(&self) -> ShaderHandle {
        ShaderHandle(self.shader.load(Ordering::Acquire))
    }

    /// Acquire a new texture, then release the previous one
    ///
    /// On failure the current texture is kept.
    pub fn load_texture(&self, path: &CStr) -> bool {
        // SAFETY: `path` is NUL-terminated
        let texture = unsafe { (self.table.graphics.load_texture)(path.as_ptr()) };
        if texture == INVALID_HANDLE {
            log(self.table, LogSeverity::Warn, &format!("Failed to load texture '{}'", path.to_string_lossy()));
            return false;
        }

        let previous = self.texture.swap(texture, Ordering::AcqRel);
        if previous != INVALID_HANDLE {
            unsafe { (self.table.graphics.release_texture)(previous) };
        }
        log(self.table, LogSeverity::Debug, &format!("Loaded texture '{}'", path.to_string_lossy()));
        true
    }

    /// Register the console commands with `self` as user data
    ///
    /// `self` must stay at a fixed address until `release`.
    pub(crate) fn register_commands(&self) -> bool {
        let user_data = self as *const Self as *mut c_void;
        COMMANDS.iter().all(|command| unsafe {
            (self.table.console.add_command)(
                NAMESPACE.as_ptr(),
                command.name.as_ptr(),
                command.usage.as_ptr(),
                command.min_args,
                command.max_args,
                command.callback,
                user_data,
            )
        })
    }

    /// Give back everything acquired through the link table
    pub(crate) fn release(&self) {
        for command in &COMMANDS {
            unsafe { (self.table.console.remove_command)(NAMESPACE.as_ptr(), command.name.as_ptr()) };
        }
        let texture = self.texture.swap(INVALID_HANDLE, Ordering::AcqRel);
        if texture != INVALID_HANDLE {
            unsafe { (self.table.graphics.release_texture)(texture) };
        }
    }

    /// Draw the skybox on render layer 1 as a full screen quad
    ///
    /// Skipped (still a success) while disabled or without texture or shader.
    pub fn render(&self) -> bool {
        let texture = self.texture.load(Ordering::Acquire);
        let shader = self.shader.load(Ordering::Acquire);
        if !self.is_enabled() || texture == INVALID_HANDLE || shader == INVALID_HANDLE {
            return true;
        }

        let table = self.table;
        let (mut width, mut height) = (0u32, 0u32);
        let mut view = [0.0f32; 16];
        let projection = Mat4::orthographic_rh(0.0, 1.0, 1.0, 0.0, 0.0, 100.0).to_cols_array();

        // SAFETY: every pointer passed below refers to a live local
        unsafe {
            (table.rendering.canvas_size)(&mut width, &mut height);
            // Identity is written when no camera is active
            (table.rendering.view_matrix)(view.as_mut_ptr());

            (table.backend.set_view_clear)(RENDER_LAYER_1, ClearFlags::COLOR.bits(), CLEAR_COLOR, 1.0, 0);
            (table.backend.set_view_transform)(RENDER_LAYER_1, std::ptr::null(), projection.as_ptr());
            (table.backend.set_view_rect)(RENDER_LAYER_1, 0, 0, clamp_u16(width), clamp_u16(height));

            let matrix_uniform = self.matrix_uniform.load(Ordering::Acquire);
            if matrix_uniform != INVALID_HANDLE {
                let inverse_view = Mat4::from_cols_array(&view).inverse().to_cols_array();
                (table.backend.set_uniform)(matrix_uniform, inverse_view.as_ptr(), inverse_view.len() as u32);
            }

            let sampler = (table.graphics.get_texture_sampler)(0);
            (table.backend.set_texture)(0, sampler, texture);
            (table.backend.set_program)(shader);
            (table.backend.set_state)((RenderState::RGB_WRITE | RenderState::ALPHA_WRITE).bits());
            (table.backend.draw_full_screen_quad)(width, height);
            (table.backend.submit)(RENDER_LAYER_1);
        }
        true
    }

    /// Handle of the matrix uniform, invalid when the shader is missing
    pub fn matrix_uniform(&self) -> UniformHandle {
        UniformHandle(self.matrix_uniform.load(Ordering::Acquire))
    }
}

fn clamp_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn log(table: &LinkTable, severity: LogSeverity, message: &str) {
    if let Ok(message) = CString::new(message) {
        unsafe { (table.console.log)(severity.as_raw(), LOG_SOURCE.as_ptr(), message.as_ptr()) };
    }
}

// ===== CONSOLE CALLBACKS =====

unsafe fn instance<'a>(user_data: *mut c_void) -> Option<&'a SkyboxContext> {
    (user_data as *const SkyboxContext).as_ref()
}

unsafe extern "C" fn load_command(user_data: *mut c_void, argc: i32, argv: *const *const c_char) -> i32 {
    let Some(skybox) = instance(user_data) else {
        return -1;
    };
    if argc < 1 || argv.is_null() || (*argv).is_null() {
        return -1;
    }
    if skybox.load_texture(CStr::from_ptr(*argv)) { 0 } else { -1 }
}

unsafe extern "C" fn enable_command(user_data: *mut c_void, _argc: i32, _argv: *const *const c_char) -> i32 {
    match instance(user_data) {
        Some(skybox) => {
            skybox.set_enabled(true);
            0
        }
        None => -1,
    }
}

unsafe extern "C" fn disable_command(user_data: *mut c_void, _argc: i32, _argv: *const *const c_char) -> i32 {
    match instance(user_data) {
        Some(skybox) => {
            skybox.set_enabled(false);
            0
        }
        None => -1,
    }
}
