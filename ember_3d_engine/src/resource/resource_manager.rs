/// Central resource manager for the engine.
///
/// Tracks the opaque handles renderables and modules acquire: shader
/// programs registered by the host under asset names, textures acquired
/// by path (reference counted), and per-stage sampler uniforms.
/// Decoding and GPU upload belong to the asset/graphics layers; this
/// type only owns identity and lifetime of the handles.

use rustc_hash::FxHashMap;
use crate::backend::{ShaderHandle, TextureHandle, UniformHandle};

/// Number of texture sampler stages exposed to renderables
pub const MAX_TEXTURE_STAGES: u8 = 4;

#[derive(Debug, Clone)]
struct TextureSlot {
    path: String,
    ref_count: u32,
}

pub struct ResourceManager {
    /// Shader asset name -> program handle
    shaders: FxHashMap<String, ShaderHandle>,
    /// Texture slots indexed by handle value (None = free)
    textures: Vec<Option<TextureSlot>>,
    /// Recycled texture indices
    free_textures: Vec<u32>,
    /// Path -> live texture handle
    texture_paths: FxHashMap<String, TextureHandle>,
    /// Sampler uniform per stage
    samplers: [UniformHandle; MAX_TEXTURE_STAGES as usize],
}

impl ResourceManager {
    /// Create a new empty resource manager
    pub fn new() -> Self {
        Self {
            shaders: FxHashMap::default(),
            textures: Vec::new(),
            free_textures: Vec::new(),
            texture_paths: FxHashMap::default(),
            samplers: [UniformHandle::INVALID; MAX_TEXTURE_STAGES as usize],
        }
    }

    // ===== SHADERS =====

    /// Register a shader asset (e.g. "Skybox:skyboxShader").
    ///
    /// Re-registering a name returns the existing handle.
    pub fn register_shader(&mut self, name: &str) -> ShaderHandle {
        let next = ShaderHandle(self.shaders.len() as u32);
        *self.shaders.entry(name.to_string()).or_insert(next)
    }

    /// Look up a shader by asset name; `ShaderHandle::INVALID` if unknown
    pub fn shader(&self, name: &str) -> ShaderHandle {
        self.shaders.get(name).copied().unwrap_or(ShaderHandle::INVALID)
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    // ===== TEXTURES =====

    /// Acquire a texture by path.
    ///
    /// Acquiring a path that is already live returns the same handle and
    /// bumps its reference count. Empty paths resolve to `INVALID`.
    pub fn load_texture(&mut self, path: &str) -> TextureHandle {
        if path.is_empty() {
            return TextureHandle::INVALID;
        }

        if let Some(&handle) = self.texture_paths.get(path) {
            if let Some(Some(slot)) = self.textures.get_mut(handle.0 as usize) {
                slot.ref_count += 1;
            }
            return handle;
        }

        let slot = TextureSlot { path: path.to_string(), ref_count: 1 };
        let handle = match self.free_textures.pop() {
            Some(index) => {
                self.textures[index as usize] = Some(slot);
                TextureHandle(index)
            }
            None => {
                self.textures.push(Some(slot));
                TextureHandle(self.textures.len() as u32 - 1)
            }
        };
        self.texture_paths.insert(path.to_string(), handle);
        handle
    }

    /// Release one reference to a texture.
    ///
    /// The handle is recycled when its last reference is released.
    /// Unknown or already released handles are ignored.
    /// Returns true if a reference was released.
    pub fn release_texture(&mut self, handle: TextureHandle) -> bool {
        let Some(entry) = self.textures.get_mut(handle.0 as usize) else {
            return false;
        };
        let Some(slot) = entry.as_mut() else {
            return false;
        };

        slot.ref_count -= 1;
        if slot.ref_count == 0 {
            let path = slot.path.clone();
            *entry = None;
            self.texture_paths.remove(&path);
            self.free_textures.push(handle.0);
        }
        true
    }

    /// Path a live texture was acquired from
    pub fn texture_path(&self, handle: TextureHandle) -> Option<&str> {
        self.textures
            .get(handle.0 as usize)
            .and_then(|slot| slot.as_ref())
            .map(|slot| slot.path.as_str())
    }

    /// Current reference count (0 if not live)
    pub fn texture_ref_count(&self, handle: TextureHandle) -> u32 {
        self.textures
            .get(handle.0 as usize)
            .and_then(|slot| slot.as_ref())
            .map_or(0, |slot| slot.ref_count)
    }

    /// Number of live textures
    pub fn texture_count(&self) -> usize {
        self.texture_paths.len()
    }

    // ===== SAMPLERS =====

    /// Set the sampler uniform used for a texture stage
    pub fn set_texture_sampler(&mut self, stage: u8, sampler: UniformHandle) {
        if let Some(slot) = self.samplers.get_mut(stage as usize) {
            *slot = sampler;
        }
    }

    /// Sampler uniform for a stage; `UniformHandle::INVALID` if unset or out of range
    pub fn texture_sampler(&self, stage: u8) -> UniformHandle {
        self.samplers.get(stage as usize).copied().unwrap_or(UniformHandle::INVALID)
    }

    /// Remove everything
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
