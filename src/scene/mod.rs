//! Scene graph module
//!
//! Manages the node hierarchy and everything attached to it:
//! - [`SceneGraph`]: arenas of nodes and attachable objects
//! - [`Node`]: transform node (parent/children, attached objects)
//! - [`Transform`]: position, orientation, scale and the cached matrices
//! - [`Camera`]: perspective camera object
//! - [`Renderable`] / [`RawRenderableObject`]: objects the manager draws
//! - [`SceneManager`]: render queues and the per-frame draw loop

pub mod camera;
pub mod graph;
pub mod manager;
pub mod node;
pub mod object;
pub mod raw_renderable;
pub mod render_order;
pub mod renderable;
pub mod settings;
pub mod transform;

pub use camera::{Camera, Frustum};
pub use graph::{EnabledNodes, SceneGraph};
pub use manager::{RenderMatrices, RenderStats, SceneManager};
pub use node::Node;
pub use object::Attachable;
pub use raw_renderable::{RawRenderable, RawRenderableObject};
pub use render_order::RenderOrder;
pub use renderable::Renderable;
pub use settings::{CameraSettings, SceneSettings};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct ObjectHandle;
}
