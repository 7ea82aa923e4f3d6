/// Shared library modules (feature `dylib`)

use std::path::{Path, PathBuf};
use libloading::{Library, Symbol};
use crate::error::{Error, Result};
use super::module::{ModuleDescriptor, ModuleDescriptorFn, MODULE_DESCRIPTOR_SYMBOL};

/// An opened module library and a copy of its descriptor.
///
/// The descriptor's function pointers stay valid as long as this value
/// is alive.
pub struct ModuleLibrary {
    descriptor: ModuleDescriptor,
    path: PathBuf,
    _library: Library,
}

impl ModuleLibrary {
    /// Open a shared library and read its `ember3d_module_descriptor`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // SAFETY: loading runs the library's initializers; only trusted
        // module paths are passed here
        let library = unsafe { Library::new(path) }
            .map_err(|e| Error::PluginLoadFailed(format!("{}: {}", path.display(), e)))?;

        let descriptor = {
            // SAFETY: the symbol has the `ModuleDescriptorFn` signature by contract
            let entry: Symbol<ModuleDescriptorFn> = unsafe { library.get(MODULE_DESCRIPTOR_SYMBOL) }
                .map_err(|e| Error::PluginLoadFailed(format!("{}: {}", path.display(), e)))?;
            let raw = unsafe { entry() };
            if raw.is_null() {
                return Err(Error::PluginLoadFailed(format!(
                    "{}: module returned a null descriptor", path.display()
                )));
            }
            // SAFETY: non-null descriptors point to static module data
            unsafe { *raw }
        };

        Ok(Self {
            descriptor,
            path: path.to_path_buf(),
            _library: library,
        })
    }

    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
