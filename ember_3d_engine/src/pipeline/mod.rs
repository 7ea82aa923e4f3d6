//! Render pipeline module
//!
//! The `Renderable` contract, the per-hook `FrameContext`, the
//! `FrameState` snapshot served to modules, and the `RenderPipeline`
//! that sweeps renderables through prepare / execute / finalize.

mod renderable;
mod frame_context;
mod frame_state;
mod render_pipeline;

pub use renderable::{
    Renderable, RenderableHandle, RenderableId, RenderPriority, FramePhase, renderable_handle,
};
pub use frame_context::{FrameContext, FrameCommand};
pub use frame_state::FrameState;
pub use render_pipeline::{RenderPipeline, FrameReport, FrameOutcome, HookFailure};
