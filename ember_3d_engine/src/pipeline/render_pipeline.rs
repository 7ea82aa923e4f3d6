/// Render pipeline: ordered renderables swept through three frame phases.
///
/// `run_frame` snapshots the registered set, then runs prepare on all of
/// them, execute on all of them, finalize on all of them. The full
/// barrier between phases lets a later phase of one renderable consume
/// buffers written by an earlier phase of another.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{MutexGuard, PoisonError};
use rustc_hash::FxHashSet;
use crate::scene::{Scene, SceneCommand};
use super::frame_context::{FrameCommand, FrameContext};
use super::renderable::{
    same_renderable, FramePhase, Renderable, RenderableHandle, RenderableId, RenderPriority,
};

/// A hook that failed during a frame
#[derive(Debug, Clone, PartialEq)]
pub struct HookFailure {
    pub renderable: RenderableId,
    pub name: String,
    pub phase: FramePhase,
    pub message: String,
}

/// Summary of one `run_frame` call
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    /// Renderables in the frame snapshot
    pub renderable_count: usize,
    pub failures: Vec<HookFailure>,
}

impl FrameReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of a frame: the report plus scene mutations queued by hooks.
///
/// The caller applies `scene_commands` once it regains mutable access
/// to the scene.
pub struct FrameOutcome {
    pub report: FrameReport,
    pub scene_commands: Vec<SceneCommand>,
}

struct PipelineEntry {
    id: RenderableId,
    priority: RenderPriority,
    sequence: u64,
    name: String,
    handle: RenderableHandle,
}

pub struct RenderPipeline {
    entries: Vec<PipelineEntry>,
    next_id: u64,
    next_sequence: u64,
    frame_index: u64,
}

fn lock_renderable(handle: &RenderableHandle) -> MutexGuard<'_, dyn Renderable + 'static> {
    // A hook that panicked poisons its mutex; the renderable is still usable next frame
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            next_sequence: 0,
            frame_index: 0,
        }
    }

    // ===== REGISTRATION =====

    /// Register a renderable at the default priority.
    ///
    /// Registering a handle that is already registered returns its
    /// existing id and leaves the order unchanged.
    pub fn register(&mut self, handle: RenderableHandle) -> RenderableId {
        self.register_with_priority(handle, RenderPriority::DEFAULT)
    }

    /// Register a renderable in a priority slot (see `RenderPriority`)
    pub fn register_with_priority(&mut self, handle: RenderableHandle, priority: RenderPriority) -> RenderableId {
        if let Some(id) = self.id_of(&handle) {
            return id;
        }

        let id = RenderableId(self.next_id);
        self.next_id += 1;
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let name = lock_renderable(&handle).name().to_string();

        crate::engine_debug!("ember3d::RenderPipeline",
            "Registered renderable '{}' ({}) at priority {}", name, id.0, priority.0);

        // Insert after every entry that sorts before or equal to (priority, sequence)
        let index = self
            .entries
            .partition_point(|entry| (entry.priority, entry.sequence) <= (priority, sequence));
        self.entries.insert(index, PipelineEntry { id, priority, sequence, name, handle });
        id
    }

    /// Remove a renderable. No-op (returns false) if absent.
    pub fn unregister(&mut self, id: RenderableId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                let entry = self.entries.remove(index);
                crate::engine_debug!("ember3d::RenderPipeline",
                    "Unregistered renderable '{}' ({})", entry.name, id.0);
                true
            }
            None => false,
        }
    }

    /// Remove a renderable by handle. No-op (returns false) if absent.
    pub fn unregister_handle(&mut self, handle: &RenderableHandle) -> bool {
        match self.id_of(handle) {
            Some(id) => self.unregister(id),
            None => false,
        }
    }

    /// Id of a registered handle
    pub fn id_of(&self, handle: &RenderableHandle) -> Option<RenderableId> {
        self.entries
            .iter()
            .find(|entry| same_renderable(&entry.handle, handle))
            .map(|entry| entry.id)
    }

    pub fn contains(&self, id: RenderableId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Registered ids in sweep order
    pub fn ids(&self) -> Vec<RenderableId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// Registered names in sweep order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // ===== FRAME =====

    /// Run one frame over the currently registered renderables.
    ///
    /// Hook failures are contained: the failing renderable is logged,
    /// reported and skipped for the rest of this frame while every
    /// other renderable continues. Registrations queued by hooks are
    /// applied before returning; scene commands are handed back.
    pub fn run_frame(&mut self, scene: &Scene) -> FrameOutcome {
        let snapshot: Vec<(RenderableId, String, RenderableHandle)> = self
            .entries
            .iter()
            .map(|entry| (entry.id, entry.name.clone(), entry.handle.clone()))
            .collect();

        let frame_index = self.frame_index;
        self.frame_index += 1;

        let mut report = FrameReport {
            frame_index,
            renderable_count: snapshot.len(),
            failures: Vec::new(),
        };
        let mut failed: FxHashSet<RenderableId> = FxHashSet::default();
        let mut ctx = FrameContext::new(scene, frame_index);

        for phase in FramePhase::ALL {
            for (id, name, handle) in &snapshot {
                if failed.contains(id) {
                    continue;
                }

                ctx.phase = phase;
                ctx.renderable = *id;

                if let Err(message) = Self::run_hook(handle, phase, &mut ctx) {
                    crate::engine_warn!("ember3d::RenderPipeline",
                        "Frame {}: {} of '{}' failed: {}", frame_index, phase, name, message);
                    failed.insert(*id);
                    report.failures.push(HookFailure {
                        renderable: *id,
                        name: name.clone(),
                        phase,
                        message,
                    });
                }
            }
        }

        let commands = std::mem::take(&mut ctx.commands);
        drop(ctx);

        let mut scene_commands = Vec::new();
        for command in commands {
            match command {
                FrameCommand::Register { handle, priority } => {
                    self.register_with_priority(handle, priority);
                }
                FrameCommand::Unregister(id) => {
                    self.unregister(id);
                }
                FrameCommand::Scene(command) => scene_commands.push(command),
            }
        }

        FrameOutcome { report, scene_commands }
    }

    fn run_hook(handle: &RenderableHandle, phase: FramePhase, ctx: &mut FrameContext<'_>) -> Result<(), String> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut renderable = lock_renderable(handle);
            match phase {
                FramePhase::Prepare => renderable.prepare(ctx),
                FramePhase::Execute => renderable.execute(ctx),
                FramePhase::Finalize => renderable.finalize(ctx),
            }
        }));

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err.to_string()),
            Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
        }
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "render_pipeline_tests.rs"]
mod tests;
