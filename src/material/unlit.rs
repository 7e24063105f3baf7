use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use parking_lot::RwLock;

use crate::errors::Result;
use crate::material::common::{COMMON_CONSTANTS_VS, COMMON_CONSTANTS_WGSL, CommonConstantsVs};
use crate::material::{Material, ShaderLibrary, ShaderProgram};
use crate::render::pipeline::{
    RenderTargetBlendDesc, SamplerDesc, ShaderVariableDesc, ShaderVariableType, StaticSamplerDesc,
};
use crate::render::{
    DeviceContext, PipelineStateDesc, RenderDevice, ResourceView, ShaderResourceBindingHandle,
    TextureHandle,
};

const MATERIAL_CONSTANTS: &str = "Material";
const TEXTURE_VARIABLE: &str = "g_texture";

const UNLIT_VS: &str = r"
struct MaterialConstants {
    color: vec4<f32>,
    opacity: f32,
};
@group(0) @binding(1) var<uniform> material: MaterialConstants;

struct VsIn {
    @location(0) position: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) uv: vec2<f32>,
};

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    out.position = common_vs.world_view_proj * vec4<f32>(in.position, 1.0);
    out.color = material.color * in.color;
    out.color.a = out.color.a * material.opacity;
    out.uv = in.uv;
    return out;
}
";

const UNLIT_PS: &str = r"
struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) uv: vec2<f32>,
};

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return in.color;
}
";

const UNLIT_TEXTURED_PS: &str = r"
@group(1) @binding(0) var g_texture: texture_2d<f32>;
@group(1) @binding(1) var g_texture_sampler: sampler;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) uv: vec2<f32>,
};

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return in.color * textureSample(g_texture, g_texture_sampler, in.uv);
}
";

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct UnlitConstants {
    color: Vec4,
    opacity: f32,
    _pad: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct UnlitParams {
    color: Vec4,
    opacity: f32,
}

/// Flat-colored material, optionally modulated by a texture.
///
/// Vertex inputs: position at location 0, color at 2, texture coordinates
/// at 3. Blending defaults to straight alpha.
pub struct UnlitMaterial {
    program: Arc<ShaderProgram>,
    params: RwLock<UnlitParams>,
    blend: RenderTargetBlendDesc,
    texture: Option<TextureHandle>,
}

impl UnlitMaterial {
    pub fn new(device: &mut dyn RenderDevice, library: &mut ShaderLibrary) -> Result<Self> {
        Self::build(device, library, None)
    }

    pub fn with_texture(
        device: &mut dyn RenderDevice,
        library: &mut ShaderLibrary,
        texture: TextureHandle,
    ) -> Result<Self> {
        Self::build(device, library, Some(texture))
    }

    fn build(
        device: &mut dyn RenderDevice,
        library: &mut ShaderLibrary,
        texture: Option<TextureHandle>,
    ) -> Result<Self> {
        let ps = if texture.is_some() {
            UNLIT_TEXTURED_PS
        } else {
            UNLIT_PS
        };
        let vs = format!("{COMMON_CONSTANTS_WGSL}{UNLIT_VS}");
        let key = ShaderLibrary::source_key(&[&vs, ps]);

        let program = library.get_or_create(device, key, |device| {
            let mut program = ShaderProgram::compile(device, "UnlitMaterial", &vs, ps)?;
            program.declare_constant::<CommonConstantsVs>(
                device,
                COMMON_CONSTANTS_VS,
                wgpu::ShaderStages::VERTEX,
            )?;
            program.declare_constant::<UnlitConstants>(
                device,
                MATERIAL_CONSTANTS,
                wgpu::ShaderStages::VERTEX,
            )?;
            Ok(program)
        })?;

        Ok(Self {
            program,
            params: RwLock::new(UnlitParams {
                color: Vec4::ONE,
                opacity: 1.0,
            }),
            blend: RenderTargetBlendDesc::alpha_blending(),
            texture,
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
    pub fn opacity(&self) -> f32 {
        self.params.read().opacity
    }

    pub fn set_opacity(&self, opacity: f32) {
        self.params.write().opacity = opacity;
    }

    #[must_use]
    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    #[must_use]
    pub fn blend_desc(&self) -> &RenderTargetBlendDesc {
        &self.blend
    }

    /// Only affects pipelines resolved after the change.
    pub fn set_blend_desc(&mut self, desc: RenderTargetBlendDesc) {
        self.blend = desc;
    }

    /// The shared program, e.g. to check sharing between materials.
    #[must_use]
    pub fn program(&self) -> &Arc<ShaderProgram> {
        &self.program
    }
}

impl Material for UnlitMaterial {
    fn shader_program(&self) -> &ShaderProgram {
        &self.program
    }

    fn setup_pso_desc(&self, desc: &mut PipelineStateDesc) {
        self.program.setup_pso_desc(desc);

        desc.graphics.blend.independent_blend = false;
        desc.graphics.blend.render_targets[0] = self.blend;

        if self.texture.is_some() {
            desc.resource_layout.variables.push(ShaderVariableDesc {
                stages: wgpu::ShaderStages::FRAGMENT,
                name: TEXTURE_VARIABLE.into(),
                variable_type: ShaderVariableType::Mutable,
            });
            desc.resource_layout.static_samplers.push(StaticSamplerDesc {
                stages: wgpu::ShaderStages::FRAGMENT,
                texture_name: TEXTURE_VARIABLE.into(),
                sampler: SamplerDesc::default(),
            });
        }
    }

    fn bind_srb(
        &self,
        device: &mut dyn RenderDevice,
        srb: ShaderResourceBindingHandle,
    ) -> Result<()> {
        match self.texture {
            Some(texture) => device.set_binding_variable(
                srb,
                wgpu::ShaderStages::FRAGMENT,
                TEXTURE_VARIABLE,
                ResourceView::Texture(texture),
            ),
            None => Ok(()),
        }
    }

    fn prepare_for_render(&self, context: &mut dyn DeviceContext) -> Result<()> {
        let params = *self.params.read();
        self.program.write_constant(
            context,
            MATERIAL_CONSTANTS,
            &UnlitConstants {
                color: params.color,
                opacity: params.opacity,
                _pad: [0.0; 3],
            },
        )
    }
}
