//! Per-vertex diffuse lighting from a single directional light.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use parking_lot::RwLock;

use crate::errors::Result;
use crate::material::common::{COMMON_CONSTANTS_VS, COMMON_CONSTANTS_WGSL, CommonConstantsVs};
use crate::material::{Material, ShaderLibrary, ShaderProgram};
use crate::render::{DeviceContext, RenderDevice};

const MATERIAL_CONSTANTS: &str = "Material";

const DIFFUSE_VS: &str = r"
struct MaterialConstants {
    color: vec4<f32>,
    light_direction: vec4<f32>,
};
@group(0) @binding(1) var<uniform> material: MaterialConstants;

struct VsIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

fn linear(m: mat4x4<f32>) -> mat3x3<f32> {
    return mat3x3<f32>(m[0].xyz, m[1].xyz, m[2].xyz);
}

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    out.position = common_vs.world_view_proj * vec4<f32>(in.position, 1.0);

    let n = normalize(linear(common_vs.world_view) * in.normal);
    let l = linear(common_vs.view) * -normalize(material.light_direction.xyz);
    out.color = material.color * max(dot(n, l), 0.0);
    return out;
}
";

const DIFFUSE_PS: &str = r"
struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return in.color;
}
";

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct DiffuseConstants {
    color: Vec4,
    light_direction: Vec4,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DiffuseParams {
    color: Vec4,
    light_direction: Vec3,
}

/// Lambert-shaded material for lit geometry.
///
/// Vertex inputs: position at location 0, normal at 1. The light direction
/// is given in world space and defaults to `(-1, -1, -1)`.
pub struct DiffuseMaterial {
    program: Arc<ShaderProgram>,
    params: RwLock<DiffuseParams>,
}

impl DiffuseMaterial {
    pub fn new(device: &mut dyn RenderDevice, library: &mut ShaderLibrary) -> Result<Self> {
        let vs = format!("{COMMON_CONSTANTS_WGSL}{DIFFUSE_VS}");
        let key = ShaderLibrary::source_key(&[&vs, DIFFUSE_PS]);

        let program = library.get_or_create(device, key, |device| {
            let mut program = ShaderProgram::compile(device, "DiffuseMaterial", &vs, DIFFUSE_PS)?;
            program.declare_constant::<CommonConstantsVs>(
                device,
                COMMON_CONSTANTS_VS,
                wgpu::ShaderStages::VERTEX,
            )?;
            program.declare_constant::<DiffuseConstants>(
                device,
                MATERIAL_CONSTANTS,
                wgpu::ShaderStages::VERTEX,
            )?;
            Ok(program)
        })?;

        Ok(Self {
            program,
            params: RwLock::new(DiffuseParams {
                color: Vec4::ONE,
                light_direction: Vec3::NEG_ONE,
            }),
        })
    }

    #[must_use]
    pub fn color(&self) -> Vec4 {
        self.params.read().color
    }

    pub fn set_color(&self, color: Vec4) {
        self.params.write().color = color;
    }

    #[must_use]
    pub fn light_direction(&self) -> Vec3 {
        self.params.read().light_direction
    }

    pub fn set_light_direction(&self, direction: Vec3) {
        self.params.write().light_direction = direction;
    }

    #[must_use]
    pub fn program(&self) -> &Arc<ShaderProgram> {
        &self.program
    }
}

impl Material for DiffuseMaterial {
    fn shader_program(&self) -> &ShaderProgram {
        &self.program
    }

    fn prepare_for_render(&self, context: &mut dyn DeviceContext) -> Result<()> {
        let params = *self.params.read();
        self.program.write_constant(
            context,
            MATERIAL_CONSTANTS,
            &DiffuseConstants {
                color: params.color,
                light_direction: params.light_direction.extend(0.0),
            },
        )
    }
}
