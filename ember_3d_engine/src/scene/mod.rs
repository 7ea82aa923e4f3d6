//! Scene module
//!
//! Entity registry, entity catalog, lighting state and the `Scene`
//! aggregate the render pipeline reads each frame.

mod entity;
mod entity_registry;
mod lighting;
mod scene;

pub use entity::{EntityKind, SceneEntity};
pub use entity_registry::{EntityRegistry, EntityGroup, EntityKey};
pub use lighting::{DirectionalLight, DirectionalLightData};
pub use scene::{Scene, SceneCommand, EntityCatalog};
