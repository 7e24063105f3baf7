#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod core;
pub mod errors;
pub mod material;
pub mod objects;
pub mod render;
pub mod scene;

pub use errors::{PrismError, Result};
pub use material::{DiffuseMaterial, Material, ShaderLibrary, ShaderProgram, UnlitMaterial};
pub use objects::{Geometry, GeometryObject, ManualObject};
pub use render::{DeviceContext, PipelineStateDesc, PsoCache, RenderDevice, SwapChainDesc};
pub use scene::{
    Attachable, Camera, NodeHandle, ObjectHandle, RawRenderable, RawRenderableObject,
    RenderOrder, Renderable, SceneGraph, SceneManager, SceneSettings,
};
