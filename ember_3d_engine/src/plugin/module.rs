/// Module descriptor exported by every plugin
///
/// A module is described by one `#[repr(C)]` value. Shared libraries
/// export it through the `ember3d_module_descriptor` symbol; modules
/// linked into the host hand it over directly.
///
/// ```ignore
/// #[no_mangle]
/// pub extern "C" fn ember3d_module_descriptor() -> *const ModuleDescriptor {
///     &DESCRIPTOR
/// }
/// ```

use std::ffi::{c_char, c_void, CStr};
use super::link_table::LinkTable;

/// Symbol name of the descriptor entry point (NUL-terminated)
pub const MODULE_DESCRIPTOR_SYMBOL: &[u8] = b"ember3d_module_descriptor\0";

/// `ember3d_module_descriptor` signature
pub type ModuleDescriptorFn = unsafe extern "C" fn() -> *const ModuleDescriptor;

/// Create the module instance.
///
/// Receives the frozen link table and writes the module's context
/// pointer (may stay null). Returns false to refuse loading, in which
/// case the module must not have registered anything.
pub type ModuleCreateFn = unsafe extern "C" fn(table: *const LinkTable, context: *mut *mut c_void) -> bool;

/// Release everything the instance acquired through the link table
pub type ModuleDestroyFn = unsafe extern "C" fn(context: *mut c_void);

/// Frame hook; false reports a failure for this frame
pub type ModuleHookFn = unsafe extern "C" fn(context: *mut c_void) -> bool;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct ModuleDescriptor {
    /// NUL-terminated module name
    pub name: *const c_char,
    /// Render priority of the module's renderable (lower runs first)
    pub priority: i32,
    /// Oldest link table version the module works with
    pub min_link_version: u32,
    /// Newest link table version the module works with
    pub max_link_version: u32,
    pub create: ModuleCreateFn,
    pub destroy: ModuleDestroyFn,
    /// Runs in the prepare sweep
    pub pre_render: Option<ModuleHookFn>,
    /// Runs in the execute sweep
    pub render: Option<ModuleHookFn>,
    /// Runs in the finalize sweep
    pub post_render: Option<ModuleHookFn>,
}

// SAFETY: `name` points to immutable static data of the module
unsafe impl Send for ModuleDescriptor {}
unsafe impl Sync for ModuleDescriptor {}

impl ModuleDescriptor {
    /// Module name, `<unnamed>` when missing
    ///
    /// # Safety
    ///
    /// `name` must be null or point to a NUL-terminated string that
    /// outlives this call.
    pub unsafe fn name(&self) -> String {
        if self.name.is_null() {
            return "<unnamed>".to_string();
        }
        CStr::from_ptr(self.name).to_string_lossy().into_owned()
    }

    /// True if the module can run against link table `version`
    pub fn supports(&self, version: u32) -> bool {
        (self.min_link_version..=self.max_link_version).contains(&version)
    }
}
