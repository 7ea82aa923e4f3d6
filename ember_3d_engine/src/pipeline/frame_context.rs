/// Per-hook view of the frame being rendered.
///
/// Hooks read the scene through the context and queue mutations on it.
/// Queued work is applied after the finalize sweep, so nothing a hook
/// requests changes the current frame.

use crate::scene::{Scene, SceneCommand};
use super::renderable::{FramePhase, RenderableHandle, RenderableId, RenderPriority};

/// Mutation queued by a hook
pub enum FrameCommand {
    Register { handle: RenderableHandle, priority: RenderPriority },
    Unregister(RenderableId),
    Scene(SceneCommand),
}

pub struct FrameContext<'a> {
    scene: &'a Scene,
    frame_index: u64,
    pub(crate) phase: FramePhase,
    pub(crate) renderable: RenderableId,
    pub(crate) commands: Vec<FrameCommand>,
}

impl<'a> FrameContext<'a> {
    pub(crate) fn new(scene: &'a Scene, frame_index: u64) -> Self {
        Self {
            scene,
            frame_index,
            phase: FramePhase::Prepare,
            renderable: RenderableId(0),
            commands: Vec::new(),
        }
    }

    /// Read-only scene state for this frame
    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Id of the renderable whose hook is running
    pub fn renderable_id(&self) -> RenderableId {
        self.renderable
    }

    /// Register a renderable starting next frame
    pub fn register(&mut self, handle: RenderableHandle, priority: RenderPriority) {
        self.commands.push(FrameCommand::Register { handle, priority });
    }

    /// Unregister a renderable starting next frame
    pub fn unregister(&mut self, id: RenderableId) {
        self.commands.push(FrameCommand::Unregister(id));
    }

    /// Queue a scene mutation applied after this frame
    pub fn defer(&mut self, command: SceneCommand) {
        self.commands.push(FrameCommand::Scene(command));
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }
}
