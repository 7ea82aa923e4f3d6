/// Plugin manager: module load/unload protocol
///
/// Loading checks the module's supported link table range against the
/// published table before the module runs any code. Only a module that
/// accepts the table (its `create` returns true) gets a renderable
/// registered with the pipeline.

use std::ffi::c_void;
use slotmap::{new_key_type, SlotMap};
use crate::error::{Error, Result};
use crate::pipeline::{renderable_handle, RenderPipeline, RenderableId, RenderPriority};
use super::link_table::LinkTable;
use super::module::ModuleDescriptor;
use super::module_lease::ModuleLease;
use super::plugin_renderable::{ModuleContext, PluginRenderable};

#[cfg(feature = "dylib")]
use super::library::ModuleLibrary;

new_key_type! {
    /// Key of a loaded plugin
    pub struct PluginKey;
}

struct LoadedPlugin {
    name: String,
    descriptor: ModuleDescriptor,
    context: ModuleContext,
    lease: ModuleLease,
    renderable: RenderableId,
    /// Dropped after `destroy` ran, which unloads the library
    #[cfg(feature = "dylib")]
    library: Option<ModuleLibrary>,
}

#[derive(Default)]
pub struct PluginManager {
    plugins: SlotMap<PluginKey, LoadedPlugin>,
    load_order: Vec<PluginKey>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a module against `table` and register its renderable.
    ///
    /// # Errors
    ///
    /// - `AbiMismatch` if the module does not support `table.version`
    ///   (the module's `create` is never called)
    /// - `PluginLoadFailed` if a module with the same name is loaded or
    ///   the module's `create` refuses the table
    pub fn load(
        &mut self,
        descriptor: &ModuleDescriptor,
        table: &'static LinkTable,
        pipeline: &mut RenderPipeline,
    ) -> Result<PluginKey> {
        // SAFETY: descriptors handed to the manager carry a valid name
        let name = unsafe { descriptor.name() };

        if !descriptor.supports(table.version) {
            let error = Error::AbiMismatch {
                module: name,
                expected_min: descriptor.min_link_version,
                expected_max: descriptor.max_link_version,
                found: table.version,
            };
            crate::engine_error!("ember3d::PluginManager", "{}", error);
            return Err(error);
        }

        if self.find(&name).is_some() {
            crate::engine_error!("ember3d::PluginManager", "Module '{}' is already loaded", name);
            return Err(Error::PluginLoadFailed(format!("module '{}' is already loaded", name)));
        }

        let mut context: *mut c_void = std::ptr::null_mut();
        let lease = ModuleLease::new();
        // SAFETY: `table` is 'static and frozen; `context` is a valid out pointer
        let accepted = lease
            .run(|| unsafe { (descriptor.create)(table, &mut context) })
            .unwrap_or(false);
        if !accepted {
            // Commands registered despite the refusal must never run
            lease.retire(|| {});
            crate::engine_error!("ember3d::PluginManager", "Module '{}' refused to load", name);
            return Err(Error::PluginLoadFailed(format!("module '{}' refused to load", name)));
        }

        let context = ModuleContext(context);
        let renderable = pipeline.register_with_priority(
            renderable_handle(PluginRenderable::new(name.clone(), descriptor, context, lease.clone())),
            RenderPriority(descriptor.priority),
        );

        crate::engine_info!("ember3d::PluginManager",
            "Loaded module '{}' (link table v{}, priority {})", name, table.version, descriptor.priority);

        let key = self.plugins.insert(LoadedPlugin {
            name,
            descriptor: *descriptor,
            context,
            lease,
            renderable,
            #[cfg(feature = "dylib")]
            library: None,
        });
        self.load_order.push(key);
        Ok(key)
    }

    /// Open a shared library module and load it
    #[cfg(feature = "dylib")]
    pub fn load_library(
        &mut self,
        path: impl AsRef<std::path::Path>,
        table: &'static LinkTable,
        pipeline: &mut RenderPipeline,
    ) -> Result<PluginKey> {
        let library = ModuleLibrary::open(path)?;
        let key = self.load(library.descriptor(), table, pipeline)?;
        if let Some(plugin) = self.plugins.get_mut(key) {
            plugin.library = Some(library);
        }
        Ok(key)
    }

    /// Unregister the module's renderable, then let it release its
    /// resources. No-op (returns false) for unknown keys.
    ///
    /// Blocks until console commands of the module already running on
    /// other threads return. Those resolved later fail with
    /// `InvalidResource` instead of reaching the destroyed context.
    pub fn unload(&mut self, key: PluginKey, pipeline: &mut RenderPipeline) -> bool {
        let Some(plugin) = self.plugins.remove(key) else {
            return false;
        };
        self.load_order.retain(|k| *k != key);

        pipeline.unregister(plugin.renderable);
        // SAFETY: the renderable is gone and the lease is held exclusively,
        // nothing else uses the context
        plugin.lease.retire(|| unsafe { (plugin.descriptor.destroy)(plugin.context.0) });

        crate::engine_info!("ember3d::PluginManager", "Unloaded module '{}'", plugin.name);
        true
    }

    /// Unload every module, most recently loaded first
    pub fn unload_all(&mut self, pipeline: &mut RenderPipeline) {
        while let Some(key) = self.load_order.last().copied() {
            self.unload(key, pipeline);
        }
    }

    pub fn find(&self, name: &str) -> Option<PluginKey> {
        self.plugins
            .iter()
            .find(|(_, plugin)| plugin.name == name)
            .map(|(key, _)| key)
    }

    pub fn contains(&self, key: PluginKey) -> bool {
        self.plugins.contains_key(key)
    }

    /// Pipeline id of a module's renderable
    pub fn renderable_id(&self, key: PluginKey) -> Option<RenderableId> {
        self.plugins.get(key).map(|plugin| plugin.renderable)
    }

    /// Loaded module names in load order
    pub fn names(&self) -> Vec<&str> {
        self.load_order
            .iter()
            .filter_map(|key| self.plugins.get(*key))
            .map(|plugin| plugin.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
#[path = "plugin_manager_tests.rs"]
mod tests;
