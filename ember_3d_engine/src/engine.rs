/// Ember3D Engine - Singleton manager for engine subsystems
///
/// This module provides global singleton management for the render
/// backend, resources, scene, render pipeline, console commands and
/// loaded plugins. It uses thread-safe static storage with RwLock for
/// safe concurrent access.
///
/// Lock order: scene before pipeline (frames), plugins before pipeline
/// (load/unload). Backend, resource and command locks are leaves and are
/// never held while calling into a renderable or a command handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock};
use std::time::SystemTime;
use glam::Mat4;
use crate::backend::{RenderBackend, UniformKind};
use crate::camera::{CameraId, Projection};
use crate::config::EngineConfig;
use crate::console::{
    parse_command_line, register_scene_commands, CommandHandler, CommandRegistry, CommandValue,
};
use crate::error::{Error, Result};
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::pipeline::{FrameReport, FrameState, RenderPipeline, RenderableHandle, RenderableId, RenderPriority};
use crate::plugin::{host_link_table, LinkTable, ModuleDescriptor, PluginKey, PluginManager};
use crate::resource::{ResourceManager, MAX_TEXTURE_STAGES};
use crate::scene::{DirectionalLight, Scene, SceneEntity};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Set once a custom logger replaced the default one
static CUSTOM_LOGGER: AtomicBool = AtomicBool::new(false);

/// Link table published to modules (frozen once built)
static LINK_TABLE: OnceLock<LinkTable> = OnceLock::new();

type Slot<T> = RwLock<Option<Arc<Mutex<T>>>>;

/// Internal state structure holding all engine singletons
struct EngineState {
    config: RwLock<EngineConfig>,
    /// Render backend (wrapped in Mutex for thread-safe mutable access)
    renderer: Slot<dyn RenderBackend>,
    resource_manager: Slot<ResourceManager>,
    scene: Slot<Scene>,
    pipeline: Slot<RenderPipeline>,
    commands: Slot<CommandRegistry>,
    plugins: Slot<PluginManager>,
    /// Snapshot served to modules, readable while a frame holds the scene
    frame_state: RwLock<FrameState>,
}

impl EngineState {
    /// Create a new empty engine state
    fn new() -> Self {
        Self {
            config: RwLock::new(EngineConfig::default()),
            renderer: RwLock::new(None),
            resource_manager: RwLock::new(None),
            scene: RwLock::new(None),
            pipeline: RwLock::new(None),
            commands: RwLock::new(None),
            plugins: RwLock::new(None),
            frame_state: RwLock::new(FrameState::default()),
        }
    }
}

/// Subsystem in a slot, without logging when missing
fn peek_slot<T: ?Sized>(slot: &Slot<T>) -> Option<Arc<Mutex<T>>> {
    slot.read().ok().and_then(|lock| lock.clone())
}

fn clear_slot<T: ?Sized>(slot: &Slot<T>) {
    if let Ok(mut lock) = slot.write() {
        *lock = None;
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Manages the lifecycle of all engine subsystems using a singleton
/// pattern with thread-safe access.
///
/// # Example
///
/// ```no_run
/// use ember_3d_engine::ember3d::{Engine, EngineConfig};
/// use ember_3d_engine::ember3d::backend::RecordingBackend;
///
/// Engine::initialize(EngineConfig::from_env())?;
/// Engine::create_renderer(RecordingBackend::new())?;
///
/// Engine::run_frame()?;
///
/// Engine::shutdown();
/// # Ok::<(), ember_3d_engine::ember3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Helper to log errors before returning them (internal use)
    ///
    /// This ensures all Engine errors are automatically logged with proper severity
    /// and source information.
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("ember3d::Engine", "Initialization failed: {}", msg);
            }
            Error::BackendError(msg) => {
                crate::engine_error!("ember3d::Engine", "Backend error: {}", msg);
            }
            _ => {
                crate::engine_error!("ember3d::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))
    }

    /// Clone a subsystem out of its slot
    fn subsystem<T: ?Sized>(slot: &Slot<T>, name: &str) -> Result<Arc<Mutex<T>>> {
        let lock = slot.read()
            .map_err(|_| crate::engine_err!("ember3d::Engine", "{} lock poisoned", name))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed(format!("{} not created", name))
            ))
    }

    fn lock<'a, T: ?Sized>(subsystem: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>> {
        subsystem.lock()
            .map_err(|_| crate::engine_err!("ember3d::Engine", "{} mutex poisoned", name))
    }

    /// Initialize the engine
    ///
    /// Creates the resource manager, scene, render pipeline, command
    /// registry (with the built-in `Scene.*` commands) and plugin
    /// manager. Unless a custom logger was installed, the default logger
    /// is configured with `config.log_severity`.
    ///
    /// Calling it again while initialized is a no-op.
    pub fn initialize(config: EngineConfig) -> Result<()> {
        let state = ENGINE_STATE.get_or_init(EngineState::new);

        let mut scene = state.scene.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Scene lock poisoned".to_string())
            ))?;
        if scene.is_some() {
            return Ok(());
        }

        if !CUSTOM_LOGGER.load(Ordering::SeqCst) {
            Self::install_logger(Box::new(DefaultLogger::with_min_severity(config.log_severity)));
        }

        let mut commands = CommandRegistry::new();
        register_scene_commands(&mut commands);

        *scene = Some(Arc::new(Mutex::new(Scene::new())));
        if let Ok(mut lock) = state.resource_manager.write() {
            *lock = Some(Arc::new(Mutex::new(ResourceManager::new())));
        }
        if let Ok(mut lock) = state.pipeline.write() {
            *lock = Some(Arc::new(Mutex::new(RenderPipeline::new())));
        }
        if let Ok(mut lock) = state.commands.write() {
            *lock = Some(Arc::new(Mutex::new(commands)));
        }
        if let Ok(mut lock) = state.plugins.write() {
            *lock = Some(Arc::new(Mutex::new(PluginManager::new())));
        }
        if let Ok(mut lock) = state.frame_state.write() {
            *lock = FrameState::default();
        }

        crate::engine_info!("ember3d::Engine", "Engine initialized for '{}' ({}x{})",
            config.app_name, config.canvas_width, config.canvas_height);

        if let Ok(mut lock) = state.config.write() {
            *lock = config;
        }
        Ok(())
    }

    /// Shutdown the entire engine and destroy all singletons
    ///
    /// Loaded plugins are unloaded first, most recent first, while the
    /// resources and commands they release are still alive. After this,
    /// `initialize()` must be called again before using the engine.
    pub fn shutdown() {
        let Some(state) = ENGINE_STATE.get() else {
            return;
        };

        if let (Some(plugins), Some(pipeline)) = (peek_slot(&state.plugins), peek_slot(&state.pipeline)) {
            if let (Ok(mut plugins), Ok(mut pipeline)) = (plugins.lock(), pipeline.lock()) {
                plugins.unload_all(&mut pipeline);
            }
        }

        clear_slot(&state.plugins);
        clear_slot(&state.pipeline);
        clear_slot(&state.commands);
        clear_slot(&state.scene);
        // Resources before the backend (resources reference GPU objects)
        clear_slot(&state.resource_manager);
        clear_slot(&state.renderer);
        if let Ok(mut lock) = state.frame_state.write() {
            *lock = FrameState::default();
        }

        crate::engine_info!("ember3d::Engine", "Engine shut down");
    }

    /// Current configuration
    pub fn config() -> Result<EngineConfig> {
        let state = Self::state()?;
        let config = state.config.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Config lock poisoned".to_string())
            ))?;
        Ok(config.clone())
    }

    /// Resize the canvas; takes effect from the next frame
    pub fn set_canvas_size(width: u32, height: u32) -> Result<()> {
        let state = Self::state()?;
        let mut config = state.config.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Config lock poisoned".to_string())
            ))?;
        config.canvas_width = width;
        config.canvas_height = height;
        crate::engine_debug!("ember3d::Engine", "Canvas resized to {}x{}", width, height);
        Ok(())
    }

    // ===== RENDERER API =====

    /// Create and register the render backend singleton
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A backend already exists
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ember_3d_engine::ember3d::{Engine, EngineConfig};
    /// use ember_3d_engine::ember3d::backend::RecordingBackend;
    ///
    /// Engine::initialize(EngineConfig::default())?;
    /// Engine::create_renderer(RecordingBackend::new())?;
    /// # Ok::<(), ember_3d_engine::ember3d::Error>(())
    /// ```
    pub fn create_renderer<R: RenderBackend + 'static>(renderer: R) -> Result<()> {
        let arc_renderer: Arc<Mutex<dyn RenderBackend>> = Arc::new(Mutex::new(renderer));
        Self::register_renderer(arc_renderer)
    }

    /// Register an already shared render backend
    ///
    /// Lets the caller keep its own typed handle to the backend (e.g. a
    /// `RecordingBackend` inspected after a frame). Creates one sampler
    /// uniform per texture stage.
    pub fn register_renderer(renderer: Arc<Mutex<dyn RenderBackend>>) -> Result<()> {
        let state = Self::state()?;
        let resources = Self::resource_manager()?;

        let mut lock = state.renderer.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Renderer lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("Renderer already exists. Call Engine::destroy_renderer() first.".to_string())
            ));
        }

        {
            let mut backend = Self::lock(&renderer, "Renderer")?;
            let mut resources = Self::lock(&resources, "ResourceManager")?;
            for stage in 0..MAX_TEXTURE_STAGES {
                let sampler = backend.create_uniform(&format!("s_texStage{}", stage), UniformKind::Sampler, 1);
                resources.set_texture_sampler(stage, sampler);
            }
        }

        *lock = Some(renderer);
        crate::engine_info!("ember3d::Engine", "Renderer singleton created successfully");
        Ok(())
    }

    /// Get the render backend singleton
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized or the backend
    /// has not been created.
    pub fn renderer() -> Result<Arc<Mutex<dyn RenderBackend>>> {
        Self::subsystem(&Self::state()?.renderer, "Renderer")
    }

    /// Destroy the render backend singleton
    ///
    /// All existing backend references remain valid until dropped.
    pub fn destroy_renderer() -> Result<()> {
        clear_slot(&Self::state()?.renderer);
        crate::engine_info!("ember3d::Engine", "Renderer singleton destroyed");
        Ok(())
    }

    // ===== SUBSYSTEM ACCESS =====

    pub fn resource_manager() -> Result<Arc<Mutex<ResourceManager>>> {
        Self::subsystem(&Self::state()?.resource_manager, "ResourceManager")
    }

    /// Scene singleton
    ///
    /// Held for the whole duration of `run_frame`; renderable hooks must
    /// read the scene through their `FrameContext` instead.
    pub fn scene() -> Result<Arc<Mutex<Scene>>> {
        Self::subsystem(&Self::state()?.scene, "Scene")
    }

    pub fn pipeline() -> Result<Arc<Mutex<RenderPipeline>>> {
        Self::subsystem(&Self::state()?.pipeline, "RenderPipeline")
    }

    pub fn command_registry() -> Result<Arc<Mutex<CommandRegistry>>> {
        Self::subsystem(&Self::state()?.commands, "CommandRegistry")
    }

    fn plugins() -> Result<Arc<Mutex<PluginManager>>> {
        Self::subsystem(&Self::state()?.plugins, "PluginManager")
    }

    /// Frame state captured before the last (or current) frame
    pub fn frame_state() -> Result<FrameState> {
        let state = Self::state()?;
        let frame_state = state.frame_state.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("FrameState lock poisoned".to_string())
            ))?;
        Ok(*frame_state)
    }

    // ===== FRAME API =====

    /// Register a renderable with the pipeline
    pub fn register_renderable(handle: RenderableHandle, priority: RenderPriority) -> Result<RenderableId> {
        let pipeline = Self::pipeline()?;
        let mut pipeline = Self::lock(&pipeline, "RenderPipeline")?;
        Ok(pipeline.register_with_priority(handle, priority))
    }

    /// Unregister a renderable. Ok(false) if it was not registered.
    pub fn unregister_renderable(id: RenderableId) -> Result<bool> {
        let pipeline = Self::pipeline()?;
        let mut pipeline = Self::lock(&pipeline, "RenderPipeline")?;
        Ok(pipeline.unregister(id))
    }

    /// Run one frame
    ///
    /// Captures the frame state, sweeps every renderable through
    /// prepare / execute / finalize, then applies the scene commands
    /// queued by hooks. The scene stays locked for the whole call, so
    /// scene mutations from other threads wait for the frame to end.
    ///
    /// Hook failures do not fail the frame; they are in the report.
    pub fn run_frame() -> Result<FrameReport> {
        let state = Self::state()?;
        let config = Self::config()?;
        let scene = Self::scene()?;
        let pipeline = Self::pipeline()?;

        let mut scene = Self::lock(&scene, "Scene")?;
        let mut pipeline = Self::lock(&pipeline, "RenderPipeline")?;

        let snapshot = FrameState::capture(&scene, pipeline.frame_count(), config.canvas_width, config.canvas_height);
        if let Ok(mut frame_state) = state.frame_state.write() {
            *frame_state = snapshot;
        }

        let outcome = pipeline.run_frame(&scene);
        for command in outcome.scene_commands {
            scene.apply(command);
        }

        crate::engine_trace!("ember3d::Engine", "Frame {} done: {} renderables, {} failures",
            outcome.report.frame_index, outcome.report.renderable_count, outcome.report.failures.len());
        Ok(outcome.report)
    }

    // ===== SCENE API =====

    fn with_scene<T>(f: impl FnOnce(&mut Scene) -> T) -> Result<T> {
        let scene = Self::scene()?;
        let mut scene = Self::lock(&scene, "Scene")?;
        Ok(f(&mut *scene))
    }

    /// Register (or update by name) a camera
    pub fn register_camera(name: &str, view: Mat4, projection: Projection) -> Result<CameraId> {
        Self::with_scene(|scene| scene.cameras_mut().register_camera(name, view, projection))
    }

    /// Unregister a camera, removing it from the active stack too
    pub fn unregister_camera(id: CameraId) -> Result<bool> {
        Self::with_scene(|scene| scene.cameras_mut().unregister_camera(id).is_some())
    }

    /// Define an entity in the catalog `add_entity` resolves against
    pub fn define_entity(entity: SceneEntity) -> Result<()> {
        Self::with_scene(|scene| scene.catalog_mut().define(entity))
    }

    /// Activate a cataloged entity. Unknown names are a no-op.
    pub fn add_entity(name: &str, group: Option<&str>) -> Result<()> {
        Self::with_scene(|scene| {
            scene.add_entity_by_name(name, group);
        })
    }

    /// Remove an active entity. Unknown names are a no-op.
    pub fn remove_entity(name: &str) -> Result<()> {
        Self::with_scene(|scene| {
            scene.entities_mut().remove(name);
        })
    }

    /// Top of the camera stack
    pub fn get_active_camera() -> Result<Option<CameraId>> {
        Self::with_scene(|scene| scene.cameras().active())
    }

    /// Push a registered camera by name. Unknown names are a no-op.
    pub fn push_active_camera(name: &str) -> Result<()> {
        Self::with_scene(|scene| {
            if !scene.cameras_mut().push_by_name(name) {
                crate::engine_debug!("ember3d::Engine", "pushActiveCamera: '{}' is not registered", name);
            }
        })
    }

    /// Pop the camera stack. Popping an empty stack is a no-op.
    pub fn pop_active_camera() -> Result<()> {
        Self::with_scene(|scene| {
            scene.cameras_mut().pop();
        })
    }

    /// Id of a registered camera
    pub fn get_camera(name: &str) -> Result<Option<CameraId>> {
        Self::with_scene(|scene| scene.cameras().find(name))
    }

    pub fn set_directional_light(light: DirectionalLight) -> Result<()> {
        Self::with_scene(|scene| scene.set_directional_light(light))
    }

    // ===== CONSOLE API =====

    /// Register a console command (see `CommandRegistry::add_command`)
    pub fn add_command(
        namespace: &str,
        name: &str,
        usage: &str,
        min_args: usize,
        max_args: usize,
        handler: CommandHandler,
    ) -> Result<bool> {
        let registry = Self::command_registry()?;
        let mut registry = Self::lock(&registry, "CommandRegistry")?;
        Ok(registry.add_command(namespace, name, usage, min_args, max_args, handler))
    }

    pub fn remove_command(namespace: &str, name: &str) -> Result<bool> {
        let registry = Self::command_registry()?;
        let mut registry = Self::lock(&registry, "CommandRegistry")?;
        Ok(registry.remove_command(namespace, name))
    }

    /// Execute a console command
    ///
    /// The registry is unlocked before the handler runs, so handlers may
    /// register or remove commands themselves.
    pub fn execute_command(namespace: &str, name: &str, args: &[&str]) -> Result<CommandValue> {
        let handler = {
            let registry = Self::command_registry()?;
            let registry = Self::lock(&registry, "CommandRegistry")?;
            registry.resolve(namespace, name, args.len())?
        };
        handler.invoke(args)
    }

    /// Parse and execute a console line (`Namespace.name arg...`)
    pub fn execute_line(line: &str) -> Result<CommandValue> {
        let (namespace, name, args) = parse_command_line(line)
            .ok_or_else(|| Error::CommandNotFound(line.trim().to_string()))?;
        Self::execute_command(namespace, name, &args)
    }

    // ===== PLUGIN API =====

    /// Build (once) and freeze the link table handed to modules
    pub fn publish_link_table() -> &'static LinkTable {
        LINK_TABLE.get_or_init(|| {
            let table = host_link_table();
            crate::engine_info!("ember3d::Engine", "Published link table v{} ({} bytes)",
                table.version, table.size);
            table
        })
    }

    fn published_link_table() -> Result<&'static LinkTable> {
        LINK_TABLE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::PluginLoadFailed("Link table not published. Call Engine::publish_link_table() first.".to_string())
            ))
    }

    /// Load a module from its descriptor
    ///
    /// # Errors
    ///
    /// - `PluginLoadFailed` if the link table is not published yet, the
    ///   module refuses to load or is already loaded
    /// - `AbiMismatch` if the module does not support the published version
    pub fn load_plugin(descriptor: &ModuleDescriptor) -> Result<PluginKey> {
        let table = Self::published_link_table()?;
        let plugins = Self::plugins()?;
        let pipeline = Self::pipeline()?;
        let mut plugins = Self::lock(&plugins, "PluginManager")?;
        let mut pipeline = Self::lock(&pipeline, "RenderPipeline")?;
        plugins.load(descriptor, table, &mut pipeline)
    }

    /// Load a module from a shared library
    #[cfg(feature = "dylib")]
    pub fn load_plugin_library(path: impl AsRef<std::path::Path>) -> Result<PluginKey> {
        let table = Self::published_link_table()?;
        let plugins = Self::plugins()?;
        let pipeline = Self::pipeline()?;
        let mut plugins = Self::lock(&plugins, "PluginManager")?;
        let mut pipeline = Self::lock(&pipeline, "RenderPipeline")?;
        plugins.load_library(path, table, &mut pipeline)
    }

    /// Unload a module. Ok(false) if it was not loaded.
    pub fn unload_plugin(key: PluginKey) -> Result<bool> {
        let plugins = Self::plugins()?;
        let pipeline = Self::pipeline()?;
        let mut plugins = Self::lock(&plugins, "PluginManager")?;
        let mut pipeline = Self::lock(&pipeline, "RenderPipeline")?;
        Ok(plugins.unload(key, &mut pipeline))
    }

    /// Key of a loaded module by name
    pub fn find_plugin(name: &str) -> Result<Option<PluginKey>> {
        let plugins = Self::plugins()?;
        let plugins = Self::lock(&plugins, "PluginManager")?;
        Ok(plugins.find(name))
    }

    /// Loaded module names in load order
    pub fn plugin_names() -> Result<Vec<String>> {
        let plugins = Self::plugins()?;
        let plugins = Self::lock(&plugins, "PluginManager")?;
        let names = plugins.names().into_iter().map(str::to_string).collect();
        Ok(names)
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        Self::shutdown();
        Self::reset_logger();
    }

    // ===== LOGGING API =====

    fn install_logger(logger: Box<dyn Logger>) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::new())));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = logger;
        }
    }

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file logger, network logger, etc.)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ember_3d_engine::ember3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        CUSTOM_LOGGER.store(true, Ordering::SeqCst);
        Self::install_logger(Box::new(logger));
    }

    /// Reset logger to default (DefaultLogger, every severity)
    pub fn reset_logger() {
        CUSTOM_LOGGER.store(false, Ordering::SeqCst);
        Self::install_logger(Box::new(DefaultLogger::new()));
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc. and by the
    /// link table `log` entry point.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::new())));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::new())));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
