/*!
# Ember 3D Engine

Render pipeline and extension-loading core of the Ember3D engine.

Independent render stages ("renderables") are swept once per frame
through three full phases (prepare, execute, finalize). The scene
supplies the active camera (a LIFO stack over registered cameras), the
active entities and the directional light. Extension modules compiled
separately (e.g. the skybox) are loaded at runtime through a versioned
`#[repr(C)]` link table and driven as renderables.

## Architecture

- **Engine**: singleton owning every subsystem
- **RenderPipeline / Renderable**: ordered three-sweep frame driver
- **CameraManager**: camera registry plus the active-camera stack
- **EntityRegistry**: name-keyed scene entities with optional groups
- **RenderBackend**: graphics collaborator receiving submissions
- **CommandRegistry**: console commands (`Scene.*`, module commands)
- **LinkTable / PluginManager**: module load protocol

A GPU backend implements `RenderBackend`; `RecordingBackend` is a
headless implementation that records every call.
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod backend;
pub mod resource;
pub mod camera;
pub mod scene;
pub mod pipeline;
pub mod console;
pub mod plugin;

// Main ember3d namespace module
pub mod ember3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton and its configuration
    pub use crate::engine::Engine;
    pub use crate::config::EngineConfig;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod config {
        pub use crate::config::{EngineConfig, ENV_LOG, ENV_CANVAS};
    }

    // Render backend collaborator
    pub mod backend {
        pub use crate::backend::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod pipeline {
        pub use crate::pipeline::*;
    }

    pub mod console {
        pub use crate::console::*;
    }

    // Module boundary (link table, descriptors, plugin manager)
    pub mod plugin {
        pub use crate::plugin::*;
    }
}

// Re-export math library at crate root
pub use glam;
