/// Tests for PluginManager
///
/// Test modules are plain `extern "C"` functions with their own static
/// counters, loaded through statically linked descriptors.

use super::*;
use std::ffi::c_char;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use crate::plugin::{host_link_table, LINK_TABLE_VERSION};
use crate::scene::Scene;

/// Names of destroyed modules, in destroy order
static DESTROY_LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

fn table() -> &'static LinkTable {
    static TABLE: OnceLock<LinkTable> = OnceLock::new();
    TABLE.get_or_init(host_link_table)
}

fn destroyed(names: &[&str]) -> Vec<&'static str> {
    DESTROY_LOG
        .lock()
        .unwrap()
        .iter()
        .copied()
        .filter(|name| names.contains(name))
        .collect()
}

macro_rules! test_module {
    ($module:ident, $name:literal, $min:expr, $max:expr, $accept:expr) => {
        mod $module {
            use super::*;

            pub static CREATED: AtomicUsize = AtomicUsize::new(0);
            pub static DESTROYED: AtomicUsize = AtomicUsize::new(0);
            pub static RENDERED: AtomicUsize = AtomicUsize::new(0);
            pub static SEEN_VERSION: AtomicU32 = AtomicU32::new(0);

            unsafe extern "C" fn create(table: *const LinkTable, context: *mut *mut c_void) -> bool {
                CREATED.fetch_add(1, Ordering::SeqCst);
                SEEN_VERSION.store((*table).version, Ordering::SeqCst);
                *context = &RENDERED as *const AtomicUsize as *mut c_void;
                $accept
            }

            unsafe extern "C" fn destroy(_context: *mut c_void) {
                DESTROYED.fetch_add(1, Ordering::SeqCst);
                DESTROY_LOG.lock().unwrap().push($name);
            }

            unsafe extern "C" fn render(context: *mut c_void) -> bool {
                let rendered = &*(context as *const AtomicUsize);
                rendered.fetch_add(1, Ordering::SeqCst);
                true
            }

            pub fn descriptor() -> ModuleDescriptor {
                ModuleDescriptor {
                    name: concat!($name, "\0").as_ptr() as *const c_char,
                    priority: 0,
                    min_link_version: $min,
                    max_link_version: $max,
                    create,
                    destroy,
                    pre_render: None,
                    render: Some(render),
                    post_render: None,
                }
            }
        }
    };
}

test_module!(compatible, "compatible", LINK_TABLE_VERSION, LINK_TABLE_VERSION, true);
test_module!(future, "future", LINK_TABLE_VERSION + 1, LINK_TABLE_VERSION + 3, true);
test_module!(refusing, "refusing", 0, u32::MAX, false);
test_module!(duplicate, "duplicate", 0, u32::MAX, true);
test_module!(first, "first", 0, u32::MAX, true);
test_module!(second, "second", 0, u32::MAX, true);
test_module!(third, "third", 0, u32::MAX, true);

// ============================================================================
// Tests: Loading
// ============================================================================

#[test]
fn test_load_registers_renderable_and_runs_hooks() {
    let mut manager = PluginManager::new();
    let mut pipeline = RenderPipeline::new();

    let key = manager.load(&compatible::descriptor(), table(), &mut pipeline).unwrap();

    assert_eq!(compatible::CREATED.load(Ordering::SeqCst), 1);
    assert_eq!(compatible::SEEN_VERSION.load(Ordering::SeqCst), LINK_TABLE_VERSION);
    assert_eq!(manager.names(), vec!["compatible"]);
    assert_eq!(pipeline.names(), vec!["compatible"]);
    assert!(pipeline.contains(manager.renderable_id(key).unwrap()));

    let report = pipeline.run_frame(&Scene::new()).report;
    assert!(report.is_clean());
    assert_eq!(compatible::RENDERED.load(Ordering::SeqCst), 1);
}

#[test]
fn test_version_mismatch_never_creates_or_renders() {
    let mut manager = PluginManager::new();
    let mut pipeline = RenderPipeline::new();

    let result = manager.load(&future::descriptor(), table(), &mut pipeline);

    assert_eq!(
        result.err(),
        Some(Error::AbiMismatch {
            module: "future".to_string(),
            expected_min: LINK_TABLE_VERSION + 1,
            expected_max: LINK_TABLE_VERSION + 3,
            found: LINK_TABLE_VERSION,
        })
    );
    assert!(manager.is_empty());
    assert!(pipeline.is_empty());

    pipeline.run_frame(&Scene::new());
    assert_eq!(future::CREATED.load(Ordering::SeqCst), 0);
    assert_eq!(future::RENDERED.load(Ordering::SeqCst), 0);
}

#[test]
fn test_refusing_module_registers_nothing() {
    let mut manager = PluginManager::new();
    let mut pipeline = RenderPipeline::new();

    let result = manager.load(&refusing::descriptor(), table(), &mut pipeline);

    assert!(matches!(result, Err(Error::PluginLoadFailed(_))));
    assert_eq!(refusing::CREATED.load(Ordering::SeqCst), 1);
    assert!(manager.is_empty());
    assert!(pipeline.is_empty());

    pipeline.run_frame(&Scene::new());
    assert_eq!(refusing::RENDERED.load(Ordering::SeqCst), 0);
}

#[test]
fn test_duplicate_name_rejected() {
    let mut manager = PluginManager::new();
    let mut pipeline = RenderPipeline::new();

    manager.load(&duplicate::descriptor(), table(), &mut pipeline).unwrap();
    let second = manager.load(&duplicate::descriptor(), table(), &mut pipeline);

    assert!(matches!(second, Err(Error::PluginLoadFailed(_))));
    assert_eq!(duplicate::CREATED.load(Ordering::SeqCst), 1);
    assert_eq!(manager.len(), 1);
    assert_eq!(pipeline.len(), 1);
}

// ============================================================================
// Tests: Unloading
// ============================================================================

#[test]
fn test_unload_all_in_reverse_order() {
    let mut manager = PluginManager::new();
    let mut pipeline = RenderPipeline::new();

    let first_key = manager.load(&first::descriptor(), table(), &mut pipeline).unwrap();
    manager.load(&second::descriptor(), table(), &mut pipeline).unwrap();
    manager.load(&third::descriptor(), table(), &mut pipeline).unwrap();
    assert_eq!(manager.names(), vec!["first", "second", "third"]);

    manager.unload_all(&mut pipeline);

    assert_eq!(destroyed(&["first", "second", "third"]), vec!["third", "second", "first"]);
    assert!(manager.is_empty());
    assert!(pipeline.is_empty());
    assert!(!manager.contains(first_key));
    assert!(!manager.unload(first_key, &mut pipeline));

    pipeline.run_frame(&Scene::new());
    assert_eq!(first::RENDERED.load(Ordering::SeqCst), 0);
    assert_eq!(first::DESTROYED.load(Ordering::SeqCst), 1);
}
