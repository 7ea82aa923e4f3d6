/// Directional light state consumed by lighting renderables.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels (normalized on set)
    pub direction: Vec3,
    /// Linear RGBA color
    pub color: Vec4,
    /// Linear RGBA ambient term
    pub ambient: Vec4,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Vec4, ambient: Vec4) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            color,
            ambient,
        }
    }

    /// GPU/link-table layout
    pub fn to_data(&self) -> DirectionalLightData {
        DirectionalLightData {
            direction: self.direction.extend(0.0).to_array(),
            color: self.color.to_array(),
            ambient: self.ambient.to_array(),
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -1.0, 0.0), Vec4::ONE, Vec4::new(0.1, 0.1, 0.1, 1.0))
    }
}

/// `#[repr(C)]` light layout shared with modules and uniform uploads
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct DirectionalLightData {
    pub direction: [f32; 4],
    pub color: [f32; 4],
    pub ambient: [f32; 4],
}
