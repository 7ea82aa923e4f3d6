//! Resource management module
//!
//! Provides handle identity and lifetime for shaders, textures and samplers.

mod resource_manager;

pub use resource_manager::{ResourceManager, MAX_TEXTURE_STAGES};
