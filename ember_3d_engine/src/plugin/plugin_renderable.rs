/// Adapter that drives a loaded module as a pipeline renderable

use std::ffi::c_void;
use crate::error::{Error, Result};
use crate::pipeline::{FrameContext, Renderable};
use super::module::{ModuleDescriptor, ModuleHookFn};
use super::module_lease::ModuleLease;

/// Opaque per-instance context returned by a module's `create`
#[derive(Debug, Clone, Copy)]
pub(crate) struct ModuleContext(pub(crate) *mut c_void);

// SAFETY: the context is only handed back to the module that created
// it, from the render thread (hooks) or under the plugin manager lock
// (destroy); modules own its synchronization.
unsafe impl Send for ModuleContext {}
unsafe impl Sync for ModuleContext {}

pub(crate) struct PluginRenderable {
    name: String,
    pre_render: Option<ModuleHookFn>,
    render: Option<ModuleHookFn>,
    post_render: Option<ModuleHookFn>,
    context: ModuleContext,
    lease: ModuleLease,
}

impl PluginRenderable {
    pub(crate) fn new(name: String, descriptor: &ModuleDescriptor, context: ModuleContext, lease: ModuleLease) -> Self {
        Self {
            name,
            pre_render: descriptor.pre_render,
            render: descriptor.render,
            post_render: descriptor.post_render,
            context,
            lease,
        }
    }

    fn call(&self, hook: Option<ModuleHookFn>, label: &str) -> Result<()> {
        let Some(hook) = hook else {
            return Ok(());
        };
        // SAFETY: the context stays alive until the lease is retired
        let succeeded = self.lease.run(|| unsafe { hook(self.context.0) });
        match succeeded {
            Some(true) => Ok(()),
            Some(false) => Err(Error::HookFailed(format!("module '{}' {} reported failure", self.name, label))),
            None => Err(Error::HookFailed(format!("module '{}' is unloaded", self.name))),
        }
    }
}

impl Renderable for PluginRenderable {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&mut self, _ctx: &mut FrameContext<'_>) -> Result<()> {
        self.call(self.pre_render, "pre_render")
    }

    fn execute(&mut self, _ctx: &mut FrameContext<'_>) -> Result<()> {
        self.call(self.render, "render")
    }

    fn finalize(&mut self, _ctx: &mut FrameContext<'_>) -> Result<()> {
        self.call(self.post_render, "post_render")
    }
}
