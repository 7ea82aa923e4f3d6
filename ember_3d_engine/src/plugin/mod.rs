//! Plugin module boundary
//!
//! The versioned `LinkTable` the host publishes, the `ModuleDescriptor`
//! every module exports, and the `PluginManager` that runs the
//! load/unload protocol and adapts modules into pipeline renderables.

mod link_table;
mod module;
mod host_link;
mod plugin_renderable;
mod plugin_manager;
mod module_lease;
#[cfg(feature = "dylib")]
mod library;

pub use link_table::{
    LinkTable, GraphicsLink, BackendLink, ConsoleLink, RenderingLink,
    LINK_TABLE_VERSION, INVALID_HANDLE,
};
pub use module::{
    ModuleDescriptor, ModuleDescriptorFn, ModuleCreateFn, ModuleDestroyFn, ModuleHookFn,
    MODULE_DESCRIPTOR_SYMBOL,
};
pub use plugin_manager::{PluginManager, PluginKey};
pub use module_lease::ModuleLease;
#[cfg(feature = "dylib")]
pub use library::ModuleLibrary;

pub(crate) use host_link::host_link_table;
