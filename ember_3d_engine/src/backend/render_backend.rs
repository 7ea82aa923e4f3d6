/// RenderBackend trait and the handle/flag types shared with modules

use bitflags::bitflags;
use glam::Mat4;

/// Render layer (view) index submissions are sorted by
pub type RenderLayer = u8;

/// Background layer, under the deferred/forward output
pub const RENDER_LAYER_0: RenderLayer = 0;
/// Layer reserved for backgrounds such as skyboxes
pub const RENDER_LAYER_1: RenderLayer = 1;
/// Deferred + forward output
pub const RENDER_LAYER_2: RenderLayer = 2;
/// Post-processing and overlays
pub const RENDER_LAYER_3: RenderLayer = 3;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Sentinel returned by lookups that miss
            pub const INVALID: $name = $name(u32::MAX);

            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

define_handle!(
    /// Compiled shader program
    ShaderHandle
);
define_handle!(
    /// GPU texture
    TextureHandle
);
define_handle!(
    /// Shader uniform (matrix, vector or sampler)
    UniformHandle
);

/// Uniform data layout
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Sampler = 0,
    Vec4 = 1,
    Mat3 = 2,
    Mat4 = 3,
}

impl UniformKind {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(UniformKind::Sampler),
            1 => Some(UniformKind::Vec4),
            2 => Some(UniformKind::Mat3),
            3 => Some(UniformKind::Mat4),
            _ => None,
        }
    }

    /// Number of f32 values per array element
    pub fn float_count(self) -> usize {
        match self {
            UniformKind::Sampler => 1,
            UniformKind::Vec4 => 4,
            UniformKind::Mat3 => 9,
            UniformKind::Mat4 => 16,
        }
    }
}

bitflags! {
    /// Which attachments a view clear touches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u16 {
        const COLOR = 0x0001;
        const DEPTH = 0x0002;
        const STENCIL = 0x0004;
    }
}

bitflags! {
    /// Fixed-function state for the next draw
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderState: u64 {
        const RGB_WRITE = 0x0001;
        const ALPHA_WRITE = 0x0002;
        const DEPTH_WRITE = 0x0004;
        const DEPTH_TEST_LESS = 0x0010;
        const CULL_CW = 0x0100;
        const CULL_CCW = 0x0200;
        const BLEND_ALPHA = 0x1000;

        const DEFAULT = Self::RGB_WRITE.bits()
            | Self::ALPHA_WRITE.bits()
            | Self::DEPTH_WRITE.bits()
            | Self::DEPTH_TEST_LESS.bits()
            | Self::CULL_CW.bits();
    }
}

/// Backend submission interface
///
/// Implemented by the graphics layer. Calls are issued from the render
/// thread while the pipeline sweeps its renderables, either directly by
/// in-process renderables or through the link table by loaded modules.
pub trait RenderBackend: Send + Sync {
    /// Configure how a layer is cleared at the start of the frame
    fn set_view_clear(&mut self, layer: RenderLayer, flags: ClearFlags, rgba: u32, depth: f32, stencil: u8);

    /// Set view and projection matrices of a layer (`None` view = identity)
    fn set_view_transform(&mut self, layer: RenderLayer, view: Option<&Mat4>, projection: &Mat4);

    /// Set the viewport rectangle of a layer
    fn set_view_rect(&mut self, layer: RenderLayer, x: u16, y: u16, width: u16, height: u16);

    /// Create a named uniform
    fn create_uniform(&mut self, name: &str, kind: UniformKind, count: u16) -> UniformHandle;

    /// Upload uniform data for the next draw
    fn set_uniform(&mut self, uniform: UniformHandle, data: &[f32]);

    /// Bind a texture to a sampler stage for the next draw
    fn set_texture(&mut self, stage: u8, sampler: UniformHandle, texture: TextureHandle);

    /// Select the program for the next draw
    fn set_program(&mut self, program: ShaderHandle);

    /// Set fixed-function state for the next draw
    fn set_state(&mut self, state: RenderState);

    /// Queue a screen-covering quad as the next draw's geometry
    fn draw_full_screen_quad(&mut self, width: u32, height: u32);

    /// Submit the pending draw to a layer
    fn submit(&mut self, layer: RenderLayer);
}
