/// Renderable contract driven by the render pipeline.

use std::fmt;
use std::sync::{Arc, Mutex};
use crate::error::Result;
use super::frame_context::FrameContext;

/// Identity of a registered renderable (unique per pipeline, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderableId(pub(crate) u64);

impl RenderableId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Ordering slot of a renderable.
///
/// Lower priorities run first in every phase; equal priorities run in
/// registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderPriority(pub i32);

impl RenderPriority {
    pub const DEFAULT: RenderPriority = RenderPriority(0);
    /// Backgrounds (skybox) before scene geometry
    pub const BACKGROUND: RenderPriority = RenderPriority(-100);
    /// Post-processing after everything else
    pub const POST_PROCESS: RenderPriority = RenderPriority(100);
}

impl Default for RenderPriority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The three frame phases, swept in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramePhase {
    Prepare,
    Execute,
    Finalize,
}

impl FramePhase {
    pub const ALL: [FramePhase; 3] = [FramePhase::Prepare, FramePhase::Execute, FramePhase::Finalize];
}

impl fmt::Display for FramePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramePhase::Prepare => write!(f, "prepare"),
            FramePhase::Execute => write!(f, "execute"),
            FramePhase::Finalize => write!(f, "finalize"),
        }
    }
}

/// A pipeline participant.
///
/// Within one frame the pipeline calls `prepare` on every renderable,
/// then `execute` on every renderable, then `finalize` on every
/// renderable. A hook that returns `Err` (or panics) stops that
/// renderable's remaining phases for the current frame only.
pub trait Renderable: Send {
    /// Name used in logs and frame reports
    fn name(&self) -> &str;

    fn prepare(&mut self, _ctx: &mut FrameContext<'_>) -> Result<()> {
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()>;

    fn finalize(&mut self, _ctx: &mut FrameContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Shared handle the pipeline stores and sweeps
pub type RenderableHandle = Arc<Mutex<dyn Renderable>>;

/// Wrap a renderable into a pipeline handle
pub fn renderable_handle<R: Renderable + 'static>(renderable: R) -> RenderableHandle {
    Arc::new(Mutex::new(renderable))
}

/// Identity comparison of two handles (data pointer only)
pub(crate) fn same_renderable(a: &RenderableHandle, b: &RenderableHandle) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
