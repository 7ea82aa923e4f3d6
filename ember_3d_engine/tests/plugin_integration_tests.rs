//! Integration tests for the module load protocol
//!
//! Modules are defined in this file as `extern "C"` functions and loaded
//! through their descriptors, exactly as a shared library would be once
//! its `ember3d_module_descriptor` symbol is resolved.
//!
//! Run with: cargo test --test plugin_integration_tests

use std::ffi::{c_char, c_void};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use ember_3d_engine::ember3d::backend::{RecordingBackend, RENDER_LAYER_3};
use ember_3d_engine::ember3d::console::CommandValue;
use ember_3d_engine::ember3d::pipeline::{
    renderable_handle, FrameContext, FramePhase, Renderable, RenderPriority,
};
use ember_3d_engine::ember3d::plugin::{LinkTable, ModuleDescriptor, LINK_TABLE_VERSION};
use ember_3d_engine::ember3d::{Engine, EngineConfig, Error, Result};
use serial_test::serial;

/// Hook calls of every test module, as `hook:module`
static TRACE: Mutex<Vec<String>> = Mutex::new(Vec::new());

fn trace(entry: String) {
    TRACE.lock().unwrap().push(entry);
}

fn take_trace() -> Vec<String> {
    std::mem::take(&mut *TRACE.lock().unwrap())
}

fn fresh_engine() -> Arc<Mutex<RecordingBackend>> {
    Engine::shutdown();
    Engine::initialize(EngineConfig::default()).unwrap();
    let backend = Arc::new(Mutex::new(RecordingBackend::new()));
    Engine::register_renderer(backend.clone()).unwrap();
    Engine::publish_link_table();
    take_trace();
    backend
}

// ============================================================================
// TEST MODULES
// ============================================================================

/// Per-instance state handed back to every hook
struct Instance {
    name: &'static str,
    table: &'static LinkTable,
}

unsafe fn instance<'a>(context: *mut c_void) -> &'a Instance {
    &*(context as *const Instance)
}

unsafe extern "C" fn create_overlay(table: *const LinkTable, context: *mut *mut c_void) -> bool {
    let instance = Box::new(Instance { name: "Overlay", table: &*table });
    *context = Box::into_raw(instance) as *mut c_void;
    trace("create:Overlay".to_string());
    true
}

unsafe extern "C" fn create_broken(table: *const LinkTable, context: *mut *mut c_void) -> bool {
    let instance = Box::new(Instance { name: "Broken", table: &*table });
    *context = Box::into_raw(instance) as *mut c_void;
    trace("create:Broken".to_string());
    true
}

unsafe extern "C" fn create_refusing(_table: *const LinkTable, _context: *mut *mut c_void) -> bool {
    trace("create:Refusing".to_string());
    false
}

unsafe extern "C" fn destroy(context: *mut c_void) {
    let instance = Box::from_raw(context as *mut Instance);
    trace(format!("destroy:{}", instance.name));
}

unsafe extern "C" fn pre_render(context: *mut c_void) -> bool {
    trace(format!("pre_render:{}", instance(context).name));
    true
}

unsafe extern "C" fn render(context: *mut c_void) -> bool {
    let instance = instance(context);
    trace(format!("render:{}", instance.name));
    (instance.table.backend.submit)(RENDER_LAYER_3);
    true
}

unsafe extern "C" fn render_fails(context: *mut c_void) -> bool {
    trace(format!("render:{}", instance(context).name));
    false
}

unsafe extern "C" fn post_render(context: *mut c_void) -> bool {
    trace(format!("post_render:{}", instance(context).name));
    true
}

fn overlay() -> ModuleDescriptor {
    ModuleDescriptor {
        name: c"Overlay".as_ptr(),
        priority: RenderPriority::POST_PROCESS.0,
        min_link_version: LINK_TABLE_VERSION,
        max_link_version: LINK_TABLE_VERSION,
        create: create_overlay,
        destroy,
        pre_render: Some(pre_render),
        render: Some(render),
        post_render: Some(post_render),
    }
}

fn broken() -> ModuleDescriptor {
    ModuleDescriptor {
        name: c"Broken".as_ptr(),
        priority: RenderPriority::BACKGROUND.0,
        create: create_broken,
        render: Some(render_fails),
        ..overlay()
    }
}

fn refusing() -> ModuleDescriptor {
    ModuleDescriptor { name: c"Refusing".as_ptr(), create: create_refusing, ..overlay() }
}

fn from_the_future() -> ModuleDescriptor {
    ModuleDescriptor {
        name: c"Future".as_ptr(),
        min_link_version: LINK_TABLE_VERSION + 1,
        max_link_version: LINK_TABLE_VERSION + 1,
        ..overlay()
    }
}

/// Set once `Slow.wait` is running
static SLOW_STARTED: AtomicBool = AtomicBool::new(false);
/// Set by the slow module's destroy
static SLOW_DESTROYED: AtomicBool = AtomicBool::new(false);

/// Registers `Slow.wait` in create and leaves it registered on destroy
unsafe extern "C" fn create_slow(table: *const LinkTable, context: *mut *mut c_void) -> bool {
    let table = &*table;
    let instance = Box::into_raw(Box::new(Instance { name: "Slow", table })) as *mut c_void;
    *context = instance;
    (table.console.add_command)(
        c"Slow".as_ptr(),
        c"wait".as_ptr(),
        c"Slow.wait".as_ptr(),
        0,
        0,
        slow_wait_command,
        instance,
    )
}

unsafe extern "C" fn destroy_slow(context: *mut c_void) {
    SLOW_DESTROYED.store(true, Ordering::SeqCst);
    drop(Box::from_raw(context as *mut Instance));
}

/// Returns 0 if the instance was still alive after the wait
unsafe extern "C" fn slow_wait_command(user_data: *mut c_void, _argc: i32, _argv: *const *const c_char) -> i32 {
    SLOW_STARTED.store(true, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(300));
    if SLOW_DESTROYED.load(Ordering::SeqCst) || instance(user_data).name != "Slow" {
        return 1;
    }
    0
}

fn slow() -> ModuleDescriptor {
    ModuleDescriptor {
        name: c"Slow".as_ptr(),
        create: create_slow,
        destroy: destroy_slow,
        pre_render: None,
        render: None,
        post_render: None,
        ..overlay()
    }
}

/// In-process renderable sharing the trace with the modules
struct Native;

impl Renderable for Native {
    fn name(&self) -> &str {
        "Native"
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        trace(format!("{}:Native", ctx.phase()));
        Ok(())
    }
}

// ============================================================================
// LOADING
// ============================================================================

#[test]
#[serial]
fn test_integration_module_runs_in_all_three_sweeps() {
    let backend = fresh_engine();
    Engine::register_renderable(renderable_handle(Native), RenderPriority::DEFAULT).unwrap();
    Engine::load_plugin(&overlay()).unwrap();

    let report = Engine::run_frame().unwrap();

    assert!(report.is_clean());
    assert_eq!(take_trace(), vec![
        "create:Overlay",
        "pre_render:Overlay",
        "execute:Native",
        "render:Overlay",
        "post_render:Overlay",
    ]);
    assert_eq!(backend.lock().unwrap().submit_count(RENDER_LAYER_3), 1);
    Engine::shutdown();
}

#[test]
#[serial]
fn test_integration_version_mismatch_is_rejected_before_create() {
    fresh_engine();

    let result = Engine::load_plugin(&from_the_future());

    assert_eq!(result.err(), Some(Error::AbiMismatch {
        module: "Future".to_string(),
        expected_min: LINK_TABLE_VERSION + 1,
        expected_max: LINK_TABLE_VERSION + 1,
        found: LINK_TABLE_VERSION,
    }));
    assert!(Engine::plugin_names().unwrap().is_empty());
    assert!(Engine::pipeline().unwrap().lock().unwrap().is_empty());

    Engine::run_frame().unwrap();
    assert!(take_trace().is_empty());
    Engine::shutdown();
}

#[test]
#[serial]
fn test_integration_refusing_module_is_not_registered() {
    fresh_engine();

    assert!(matches!(Engine::load_plugin(&refusing()), Err(Error::PluginLoadFailed(_))));

    assert!(Engine::find_plugin("Refusing").unwrap().is_none());
    Engine::run_frame().unwrap();
    assert_eq!(take_trace(), vec!["create:Refusing"]);
    Engine::shutdown();
}

#[test]
#[serial]
fn test_integration_failing_hook_does_not_stop_other_modules() {
    fresh_engine();
    Engine::load_plugin(&broken()).unwrap();
    Engine::load_plugin(&overlay()).unwrap();
    take_trace();

    let report = Engine::run_frame().unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "Broken");
    assert_eq!(report.failures[0].phase, FramePhase::Execute);
    // Broken skips its post_render for this frame only
    assert_eq!(take_trace(), vec![
        "pre_render:Broken",
        "pre_render:Overlay",
        "render:Broken",
        "render:Overlay",
        "post_render:Overlay",
    ]);

    Engine::run_frame().unwrap();
    assert!(take_trace().contains(&"pre_render:Broken".to_string()));
    Engine::shutdown();
}

// ============================================================================
// UNLOADING
// ============================================================================

#[test]
#[serial]
fn test_integration_unload_destroys_module() {
    fresh_engine();
    let key = Engine::load_plugin(&overlay()).unwrap();
    take_trace();

    assert!(Engine::unload_plugin(key).unwrap());
    assert!(!Engine::unload_plugin(key).unwrap());
    Engine::run_frame().unwrap();

    assert_eq!(take_trace(), vec!["destroy:Overlay"]);
    assert!(Engine::find_plugin("Overlay").unwrap().is_none());
    Engine::shutdown();
}

#[test]
#[serial]
fn test_integration_shutdown_unloads_in_reverse_order() {
    fresh_engine();
    Engine::load_plugin(&broken()).unwrap();
    Engine::load_plugin(&overlay()).unwrap();
    assert_eq!(Engine::plugin_names().unwrap(), vec!["Broken".to_string(), "Overlay".to_string()]);
    take_trace();

    Engine::shutdown();

    assert_eq!(take_trace(), vec!["destroy:Overlay", "destroy:Broken"]);
}

#[test]
#[serial]
fn test_integration_unload_waits_for_running_command() {
    fresh_engine();
    SLOW_STARTED.store(false, Ordering::SeqCst);
    SLOW_DESTROYED.store(false, Ordering::SeqCst);
    let key = Engine::load_plugin(&slow()).unwrap();

    let caller = thread::spawn(|| Engine::execute_line("Slow.wait"));
    while !SLOW_STARTED.load(Ordering::SeqCst) {
        thread::yield_now();
    }
    assert!(Engine::unload_plugin(key).unwrap());

    assert!(SLOW_DESTROYED.load(Ordering::SeqCst));
    assert_eq!(caller.join().unwrap(), Ok(CommandValue::Int(0)));
    // The module left its command registered, the host refuses to run it
    assert!(matches!(Engine::execute_line("Slow.wait"), Err(Error::InvalidResource(_))));
    Engine::shutdown();
}
