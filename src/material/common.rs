use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Name of the per-draw transform constant buffer every program declares.
pub const COMMON_CONSTANTS_VS: &str = "CommonConstantsVS";

/// WGSL declaration matching [`CommonConstantsVs`].
pub const COMMON_CONSTANTS_WGSL: &str = r"
struct CommonConstantsVS {
    world_view_proj: mat4x4<f32>,
    world_view: mat4x4<f32>,
    view: mat4x4<f32>,
};
@group(0) @binding(0) var<uniform> common_vs: CommonConstantsVS;
";

/// Per-draw transforms uploaded before every renderable draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CommonConstantsVs {
    pub world_view_proj: Mat4,
    pub world_view: Mat4,
    pub view: Mat4,
}
