/*!
# Ember 3D Engine - Skybox Module

Extension module drawing a textured skybox behind the scene.

The module only talks to the host through the `LinkTable` it receives
in `create`, so the same code runs as a shared library loaded with
`Engine::load_plugin_library` or linked statically and loaded with
`Engine::load_plugin(ember_3d_engine_plugin_skybox::descriptor())`.

## Console commands

- `Skybox.load <path>`: acquire the skybox texture (releases the previous one)
- `Skybox.enable` / `Skybox.disable`: toggle drawing

# Example

```no_run
use ember_3d_engine::ember3d::{Engine, EngineConfig};

Engine::initialize(EngineConfig::default())?;
Engine::publish_link_table();
Engine::load_plugin(ember_3d_engine_plugin_skybox::descriptor())?;
Engine::execute_line("Skybox.load textures/sky.dds")?;
Engine::execute_line("Skybox.enable")?;
# Ok::<(), ember_3d_engine::ember3d::Error>(())
```
*/

mod skybox;

use std::ffi::c_void;
use ember_3d_engine::ember3d::pipeline::RenderPriority;
use ember_3d_engine::ember3d::plugin::{LinkTable, ModuleDescriptor, LINK_TABLE_VERSION};

pub use skybox::{SkyboxContext, SKYBOX_SHADER, SKYBOX_MATRIX_UNIFORM};

/// Module name, also the console namespace of its commands
pub const MODULE_NAME: &str = "Skybox";

static DESCRIPTOR: ModuleDescriptor = ModuleDescriptor {
    name: c"Skybox".as_ptr(),
    priority: RenderPriority::BACKGROUND.0,
    min_link_version: LINK_TABLE_VERSION,
    max_link_version: LINK_TABLE_VERSION,
    create,
    destroy,
    pre_render: None,
    render: Some(render),
    post_render: None,
};

/// Descriptor for hosts linking the module statically
pub fn descriptor() -> &'static ModuleDescriptor {
    &DESCRIPTOR
}

/// Entry point resolved by the host when loading the shared library
#[no_mangle]
pub extern "C" fn ember3d_module_descriptor() -> *const ModuleDescriptor {
    &DESCRIPTOR
}

unsafe extern "C" fn create(table: *const LinkTable, context: *mut *mut c_void) -> bool {
    if table.is_null() || context.is_null() {
        return false;
    }
    // SAFETY: the host hands out its frozen table, which lives for the
    // rest of the process
    let table: &'static LinkTable = &*table;
    if !table.is_compatible(LINK_TABLE_VERSION, LINK_TABLE_VERSION) {
        return false;
    }

    let instance = Box::into_raw(Box::new(SkyboxContext::new(table)));
    if !(*instance).register_commands() {
        (*instance).release();
        drop(Box::from_raw(instance));
        return false;
    }
    *context = instance as *mut c_void;
    true
}

unsafe extern "C" fn destroy(context: *mut c_void) {
    if context.is_null() {
        return;
    }
    let instance = Box::from_raw(context as *mut SkyboxContext);
    instance.release();
}

unsafe extern "C" fn render(context: *mut c_void) -> bool {
    match (context as *const SkyboxContext).as_ref() {
        Some(instance) => instance.render(),
        None => false,
    }
}
