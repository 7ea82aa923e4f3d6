//! Unit tests for Engine singleton manager
//!
//! Tests initialization, renderer management, the scene command surface,
//! frames, console commands and logging APIs.
//!
//! IMPORTANT: ENGINE_STATE is a global OnceLock shared across all tests.
//! All tests are marked with #[serial] to run sequentially and avoid RwLock poisoning.

use crate::ember3d::{Engine, EngineConfig, Error};
use crate::ember3d::backend::RecordingBackend;
use crate::ember3d::camera::Projection;
use crate::ember3d::console::{CommandHandler, CommandValue};
use crate::ember3d::log::{Logger, LogEntry, LogSeverity};
use crate::ember3d::pipeline::{renderable_handle, FrameContext, Renderable, RenderPriority};
use crate::ember3d::scene::{EntityKind, SceneCommand, SceneEntity};
use crate::ember3d::plugin::LINK_TABLE_VERSION;
use glam::{Mat4, Vec3};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.push(format!("{:?}: {}", entry.severity, entry.message));
    }
}

/// Setup function to reset engine state before each test
fn setup() {
    Engine::reset_for_testing();
    Engine::initialize(EngineConfig::default()).unwrap();
}

fn register_camera(name: &str) -> crate::ember3d::camera::CameraId {
    Engine::register_camera(name, Mat4::look_at_rh(Vec3::Z, Vec3::ZERO, Vec3::Y), Projection::default()).unwrap()
}

fn int(value: crate::ember3d::Result<CommandValue>) -> i32 {
    match value.unwrap() {
        CommandValue::Int(v) => v,
        CommandValue::Void => panic!("expected an Int result"),
    }
}

// ============================================================================
// INITIALIZATION AND SHUTDOWN TESTS
// ============================================================================

#[test]
#[serial]
fn test_engine_initialize_idempotent() {
    setup();
    Engine::define_entity(SceneEntity::new("kept", EntityKind::Empty)).unwrap();
    Engine::add_entity("kept", None).unwrap();

    Engine::initialize(EngineConfig::default()).unwrap();

    // Second call does not recreate the scene
    let scene = Engine::scene().unwrap();
    assert!(scene.lock().unwrap().entities().contains("kept"));
}

#[test]
#[serial]
fn test_initialize_registers_scene_commands() {
    setup();
    let registry = Engine::command_registry().unwrap();
    let registry = registry.lock().unwrap();
    for name in [
        "addEntity", "removeEntity", "getActiveCamera", "pushActiveCamera",
        "popActiveCamera", "getCamera", "setDirectionalLight",
    ] {
        assert!(registry.contains("Scene", name), "missing Scene.{}", name);
    }
}

#[test]
#[serial]
fn test_shutdown_clears_state() {
    setup();
    Engine::create_renderer(RecordingBackend::new()).unwrap();

    Engine::shutdown();

    assert!(matches!(Engine::scene(), Err(Error::InitializationFailed(_))));
    assert!(Engine::renderer().is_err());
    assert!(Engine::command_registry().is_err());

    // Shutdown twice is safe
    Engine::shutdown();
    Engine::initialize(EngineConfig::default()).unwrap();
    assert!(Engine::scene().is_ok());
    assert!(Engine::renderer().is_err());
}

#[test]
#[serial]
fn test_config_stored_and_canvas_resizable() {
    Engine::reset_for_testing();
    let config = EngineConfig { canvas_width: 800, canvas_height: 600, ..EngineConfig::default() };
    Engine::initialize(config).unwrap();

    assert_eq!(Engine::config().unwrap().canvas_width, 800);

    Engine::set_canvas_size(1024, 768).unwrap();
    Engine::run_frame().unwrap();

    let state = Engine::frame_state().unwrap();
    assert_eq!((state.canvas_width, state.canvas_height), (1024, 768));
}

// ============================================================================
// RENDERER API TESTS
// ============================================================================

#[test]
#[serial]
fn test_create_renderer_twice_fails() {
    setup();
    Engine::create_renderer(RecordingBackend::new()).unwrap();

    let result = Engine::create_renderer(RecordingBackend::new());
    assert!(matches!(result, Err(Error::InitializationFailed(_))));

    Engine::destroy_renderer().unwrap();
    assert!(Engine::create_renderer(RecordingBackend::new()).is_ok());
}

#[test]
#[serial]
fn test_register_renderer_creates_texture_samplers() {
    setup();
    let backend = Arc::new(Mutex::new(RecordingBackend::new()));
    Engine::register_renderer(backend.clone()).unwrap();

    let sampler = backend.lock().unwrap().uniform("s_texStage0").unwrap();
    let resources = Engine::resource_manager().unwrap();
    assert_eq!(resources.lock().unwrap().texture_sampler(0), sampler);
}

// ============================================================================
// SCENE COMMAND SURFACE TESTS
// ============================================================================

#[test]
#[serial]
fn test_camera_stack_through_commands() {
    setup();
    let a = register_camera("A");
    let b = register_camera("B");

    Engine::execute_command("Scene", "pushActiveCamera", &["A"]).unwrap();
    Engine::execute_command("Scene", "pushActiveCamera", &["B"]).unwrap();
    assert_eq!(int(Engine::execute_command("Scene", "getActiveCamera", &[])), b.as_script_id());

    Engine::execute_command("Scene", "popActiveCamera", &[]).unwrap();
    assert_eq!(int(Engine::execute_command("Scene", "getActiveCamera", &[])), a.as_script_id());

    Engine::execute_command("Scene", "popActiveCamera", &[]).unwrap();
    assert_eq!(int(Engine::execute_command("Scene", "getActiveCamera", &[])), -1);

    // Popping an empty stack is a no-op
    Engine::execute_command("Scene", "popActiveCamera", &[]).unwrap();
    assert_eq!(Engine::get_active_camera().unwrap(), None);
}

#[test]
#[serial]
fn test_push_unknown_camera_is_noop() {
    setup();
    let a = register_camera("A");
    Engine::push_active_camera("A").unwrap();

    Engine::execute_command("Scene", "pushActiveCamera", &["ghost"]).unwrap();
    assert_eq!(Engine::get_active_camera().unwrap(), Some(a));
}

#[test]
#[serial]
fn test_get_camera() {
    setup();
    let a = register_camera("A");
    assert_eq!(int(Engine::execute_command("Scene", "getCamera", &["A"])), a.as_script_id());
    assert_eq!(int(Engine::execute_command("Scene", "getCamera", &["missing"])), -1);
}

#[test]
#[serial]
fn test_add_and_remove_entity_through_commands() {
    setup();
    Engine::define_entity(SceneEntity::new("e1", EntityKind::Mesh { mesh: "crate".to_string() })).unwrap();
    Engine::define_entity(SceneEntity::new("e2", EntityKind::Empty)).unwrap();

    Engine::execute_line("Scene.addEntity e1 g1").unwrap();
    Engine::execute_line("Scene.addEntity e2").unwrap();
    Engine::execute_line("Scene.addEntity unknown").unwrap();
    Engine::execute_line("Scene.removeEntity e1").unwrap();
    Engine::execute_line("Scene.removeEntity e1").unwrap();

    let scene = Engine::scene().unwrap();
    let scene = scene.lock().unwrap();
    let names: Vec<&str> = scene.entities().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["e2"]);
}

#[test]
#[serial]
fn test_set_directional_light_command() {
    setup();
    Engine::execute_command("Scene", "setDirectionalLight", &["1,0,0", "1,0.5,0.25", "0.1,0.1,0.1"]).unwrap();

    let scene = Engine::scene().unwrap();
    let light = *scene.lock().unwrap().directional_light();
    assert_eq!(light.direction, Vec3::X);
    assert_eq!(light.color.y, 0.5);
}

#[test]
#[serial]
fn test_command_arity_and_unknown() {
    setup();
    assert!(matches!(
        Engine::execute_command("Scene", "removeEntity", &[]),
        Err(Error::InvalidArguments(_))
    ));
    assert!(matches!(Engine::execute_line("Scene.nothing"), Err(Error::CommandNotFound(_))));
    assert!(matches!(Engine::execute_line("   "), Err(Error::CommandNotFound(_))));
}

#[test]
#[serial]
fn test_handler_can_register_commands() {
    setup();
    Engine::add_command("Test", "install", "", 0, 0, CommandHandler::native(|_| {
        Engine::add_command("Test", "installed", "", 0, 0,
            CommandHandler::native(|_| Ok(CommandValue::Int(7))))?;
        Ok(CommandValue::Void)
    })).unwrap();

    Engine::execute_command("Test", "install", &[]).unwrap();
    assert_eq!(Engine::execute_command("Test", "installed", &[]), Ok(CommandValue::Int(7)));
    assert!(Engine::remove_command("Test", "installed").unwrap());
}

// ============================================================================
// FRAME TESTS
// ============================================================================

/// Reads the active camera during execute and queues a pop
struct CameraProbe {
    seen: Arc<Mutex<Vec<Option<u32>>>>,
}

impl Renderable for CameraProbe {
    fn name(&self) -> &str {
        "camera_probe"
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> crate::ember3d::Result<()> {
        let active = ctx.scene().cameras().active().map(|id| id.0);
        self.seen.lock().unwrap().push(active);
        ctx.defer(SceneCommand::PopCamera);
        Ok(())
    }
}

#[test]
#[serial]
fn test_run_frame_applies_deferred_scene_commands_after_frame() {
    setup();
    let a = register_camera("A");
    let b = register_camera("B");
    Engine::push_active_camera("A").unwrap();
    Engine::push_active_camera("B").unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    Engine::register_renderable(renderable_handle(CameraProbe { seen: seen.clone() }), RenderPriority::DEFAULT).unwrap();

    let report = Engine::run_frame().unwrap();
    assert!(report.is_clean());
    assert_eq!(Engine::get_active_camera().unwrap(), Some(a));
    assert_eq!(Engine::frame_state().unwrap().active_camera, Some(b));

    Engine::run_frame().unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![Some(b.0), Some(a.0)]);
    assert_eq!(Engine::get_active_camera().unwrap(), None);
}

#[test]
#[serial]
fn test_unregister_renderable() {
    setup();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let id = Engine::register_renderable(
        renderable_handle(CameraProbe { seen: seen.clone() }),
        RenderPriority::DEFAULT,
    ).unwrap();

    assert!(Engine::unregister_renderable(id).unwrap());
    assert!(!Engine::unregister_renderable(id).unwrap());

    Engine::run_frame().unwrap();
    assert!(seen.lock().unwrap().is_empty());
}

// ============================================================================
// LINK TABLE TESTS
// ============================================================================

#[test]
#[serial]
fn test_publish_link_table_is_frozen() {
    setup();
    let first = Engine::publish_link_table();
    let second = Engine::publish_link_table();

    assert!(std::ptr::eq(first, second));
    assert_eq!(first.version, LINK_TABLE_VERSION);
    assert!(first.is_compatible(LINK_TABLE_VERSION, LINK_TABLE_VERSION));
    assert!(!first.is_compatible(LINK_TABLE_VERSION + 1, LINK_TABLE_VERSION + 2));
}

// ============================================================================
// LOGGING API TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_captures_engine_logs() {
    setup();
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(TestLogger { entries: entries.clone() });

    Engine::log(LogSeverity::Info, "test", "hello".to_string());
    let _ = Engine::execute_line("Scene.nothing");
    Engine::set_canvas_size(640, 480).unwrap();

    {
        let entries = entries.lock().unwrap();
        assert!(entries.contains(&"Info: hello".to_string()));
        assert!(entries.iter().any(|e| e.starts_with("Debug: Canvas resized")));
    }

    // A custom logger survives re-initialization
    Engine::shutdown();
    Engine::initialize(EngineConfig::default()).unwrap();
    Engine::log(LogSeverity::Warn, "test", "still here".to_string());
    assert!(entries.lock().unwrap().contains(&"Warn: still here".to_string()));

    Engine::reset_logger();
}
