//! Pipeline-state descriptors.
//!
//! A [`PipelineStateDesc`] aggregates every piece of fixed-function and shader
//! state that determines the identity of a pipeline-state object. The types use
//! `wgpu` enums as their vocabulary and mirror the fields a backend needs to
//! build the pipeline. Floating-point fields are hashed by their bit pattern.
//!
//! The debug label ([`PipelineStateDesc::name`]) never participates in
//! equality or hashing: two descriptors that only differ in their label share
//! one pipeline.

use std::borrow::Cow;

use smallvec::SmallVec;

use crate::render::handles::ShaderHandle;

/// Number of simultaneously bound render targets a descriptor can describe.
pub const MAX_RENDER_TARGETS: usize = 8;

// ─── Resource Layout ─────────────────────────────────────────────────────────

/// How often a shader variable is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaderVariableType {
    /// Bound once on the pipeline-state object.
    #[default]
    Static,
    /// Bound once per shader resource binding.
    Mutable,
    /// May change between draws using the same binding.
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderVariableDesc {
    pub stages: wgpu::ShaderStages,
    pub name: Cow<'static, str>,
    pub variable_type: ShaderVariableType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDesc {
    pub min_filter: wgpu::FilterMode,
    pub mag_filter: wgpu::FilterMode,
    pub mip_filter: wgpu::FilterMode,
    pub address_u: wgpu::AddressMode,
    pub address_v: wgpu::AddressMode,
    pub address_w: wgpu::AddressMode,
    pub mip_lod_bias: f32,
    pub max_anisotropy: u32,
    pub comparison: Option<wgpu::CompareFunction>,
    pub border_color: [f32; 4],
    pub min_lod: f32,
    pub max_lod: f32,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            min_filter: wgpu::FilterMode::Linear,
            mag_filter: wgpu::FilterMode::Linear,
            mip_filter: wgpu::FilterMode::Linear,
            address_u: wgpu::AddressMode::ClampToEdge,
            address_v: wgpu::AddressMode::ClampToEdge,
            address_w: wgpu::AddressMode::ClampToEdge,
            mip_lod_bias: 0.0,
            max_anisotropy: 0,
            comparison: None,
            border_color: [0.0; 4],
            min_lod: 0.0,
            max_lod: f32::MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticSamplerDesc {
    pub stages: wgpu::ShaderStages,
    /// Name of the texture the sampler is combined with.
    pub texture_name: Cow<'static, str>,
    pub sampler: SamplerDesc,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineResourceLayoutDesc {
    pub default_variable_type: ShaderVariableType,
    pub variables: Vec<ShaderVariableDesc>,
    pub static_samplers: Vec<StaticSamplerDesc>,
}

// ─── Blend ───────────────────────────────────────────────────────────────────

/// Logic operation applied when `logic_operation_enable` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogicOperation {
    Clear,
    Set,
    Copy,
    CopyInverted,
    #[default]
    Noop,
    Invert,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Equiv,
    AndReverse,
    AndInverted,
    OrReverse,
    OrInverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetBlendDesc {
    pub blend_enable: bool,
    pub logic_operation_enable: bool,
    pub src_blend: wgpu::BlendFactor,
    pub dest_blend: wgpu::BlendFactor,
    pub blend_op: wgpu::BlendOperation,
    pub src_blend_alpha: wgpu::BlendFactor,
    pub dest_blend_alpha: wgpu::BlendFactor,
    pub blend_op_alpha: wgpu::BlendOperation,
    pub logic_op: LogicOperation,
    pub write_mask: wgpu::ColorWrites,
}

impl Default for RenderTargetBlendDesc {
    fn default() -> Self {
        Self {
            blend_enable: false,
            logic_operation_enable: false,
            src_blend: wgpu::BlendFactor::One,
            dest_blend: wgpu::BlendFactor::Zero,
            blend_op: wgpu::BlendOperation::Add,
            src_blend_alpha: wgpu::BlendFactor::One,
            dest_blend_alpha: wgpu::BlendFactor::Zero,
            blend_op_alpha: wgpu::BlendOperation::Add,
            logic_op: LogicOperation::Noop,
            write_mask: wgpu::ColorWrites::ALL,
        }
    }
}

impl RenderTargetBlendDesc {
    /// Standard non-premultiplied alpha blending.
    #[must_use]
    pub fn alpha_blending() -> Self {
        Self {
            blend_enable: true,
            src_blend: wgpu::BlendFactor::SrcAlpha,
            dest_blend: wgpu::BlendFactor::OneMinusSrcAlpha,
            blend_op: wgpu::BlendOperation::Add,
            src_blend_alpha: wgpu::BlendFactor::SrcAlpha,
            dest_blend_alpha: wgpu::BlendFactor::OneMinusSrcAlpha,
            blend_op_alpha: wgpu::BlendOperation::Add,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlendStateDesc {
    pub alpha_to_coverage: bool,
    pub independent_blend: bool,
    pub render_targets: [RenderTargetBlendDesc; MAX_RENDER_TARGETS],
}

// ─── Rasterizer ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerStateDesc {
    pub fill_mode: wgpu::PolygonMode,
    /// `None` disables culling.
    pub cull_mode: Option<wgpu::Face>,
    pub front_counter_clockwise: bool,
    pub depth_clip_enable: bool,
    pub scissor_enable: bool,
    pub antialiased_line_enable: bool,
    pub depth_bias: i32,
    pub depth_bias_clamp: f32,
    pub slope_scaled_depth_bias: f32,
}

impl Default for RasterizerStateDesc {
    fn default() -> Self {
        Self {
            fill_mode: wgpu::PolygonMode::Fill,
            cull_mode: Some(wgpu::Face::Back),
            front_counter_clockwise: false,
            depth_clip_enable: true,
            scissor_enable: false,
            antialiased_line_enable: false,
            depth_bias: 0,
            depth_bias_clamp: 0.0,
            slope_scaled_depth_bias: 0.0,
        }
    }
}

// ─── Depth / Stencil ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilOpDesc {
    pub fail_op: wgpu::StencilOperation,
    pub depth_fail_op: wgpu::StencilOperation,
    pub pass_op: wgpu::StencilOperation,
    pub func: wgpu::CompareFunction,
}

impl Default for StencilOpDesc {
    fn default() -> Self {
        Self {
            fail_op: wgpu::StencilOperation::Keep,
            depth_fail_op: wgpu::StencilOperation::Keep,
            pass_op: wgpu::StencilOperation::Keep,
            func: wgpu::CompareFunction::Always,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilStateDesc {
    pub depth_enable: bool,
    pub depth_write_enable: bool,
    pub depth_func: wgpu::CompareFunction,
    pub stencil_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front_face: StencilOpDesc,
    pub back_face: StencilOpDesc,
}

impl Default for DepthStencilStateDesc {
    fn default() -> Self {
        Self {
            depth_enable: true,
            depth_write_enable: true,
            depth_func: wgpu::CompareFunction::Less,
            stencil_enable: false,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            front_face: StencilOpDesc::default(),
            back_face: StencilOpDesc::default(),
        }
    }
}

// ─── Input Layout ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutElement {
    /// Shader input location.
    pub input_index: u32,
    pub buffer_slot: u32,
    pub format: wgpu::VertexFormat,
    /// `None` places the element right after the previous one in its slot.
    pub relative_offset: Option<u32>,
    /// `None` derives the stride from the elements of the slot.
    pub stride: Option<u32>,
    pub frequency: wgpu::VertexStepMode,
    pub instance_step_rate: u32,
}

impl LayoutElement {
    /// Per-vertex element in slot 0 with automatic offset and stride.
    #[must_use]
    pub fn new(input_index: u32, format: wgpu::VertexFormat) -> Self {
        Self {
            input_index,
            buffer_slot: 0,
            format,
            relative_offset: None,
            stride: None,
            frequency: wgpu::VertexStepMode::Vertex,
            instance_step_rate: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputLayoutDesc {
    pub elements: Vec<LayoutElement>,
}

impl InputLayoutDesc {
    /// Size in bytes of one vertex in slot 0 when offsets are automatic.
    #[must_use]
    pub fn packed_stride(&self) -> u64 {
        self.elements
            .iter()
            .filter(|e| e.buffer_slot == 0)
            .map(|e| e.format.size())
            .sum()
    }
}

// ─── Graphics / Compute ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleDesc {
    pub count: u8,
    pub quality: u8,
}

impl Default for SampleDesc {
    fn default() -> Self {
        Self {
            count: 1,
            quality: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsPipelineDesc {
    pub vs: Option<ShaderHandle>,
    pub ps: Option<ShaderHandle>,
    pub ds: Option<ShaderHandle>,
    pub hs: Option<ShaderHandle>,
    pub gs: Option<ShaderHandle>,
    pub blend: BlendStateDesc,
    pub sample_mask: u32,
    pub rasterizer: RasterizerStateDesc,
    pub depth_stencil: DepthStencilStateDesc,
    pub input_layout: InputLayoutDesc,
    pub primitive_topology: wgpu::PrimitiveTopology,
    pub num_viewports: u8,
    /// One entry per bound render target.
    pub render_target_formats: SmallVec<[wgpu::TextureFormat; MAX_RENDER_TARGETS]>,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub sample: SampleDesc,
    pub node_mask: u32,
}

impl Default for GraphicsPipelineDesc {
    fn default() -> Self {
        Self {
            vs: None,
            ps: None,
            ds: None,
            hs: None,
            gs: None,
            blend: BlendStateDesc::default(),
            sample_mask: u32::MAX,
            rasterizer: RasterizerStateDesc::default(),
            depth_stencil: DepthStencilStateDesc::default(),
            input_layout: InputLayoutDesc::default(),
            primitive_topology: wgpu::PrimitiveTopology::TriangleList,
            num_viewports: 1,
            render_target_formats: SmallVec::new(),
            depth_format: None,
            sample: SampleDesc::default(),
            node_mask: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComputePipelineDesc {
    pub cs: Option<ShaderHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineType {
    #[default]
    Graphics,
    Compute,
}

// ─── Pipeline State ──────────────────────────────────────────────────────────

/// Full description of a pipeline-state object.
///
/// Only the branch selected by [`pipeline_type`](Self::pipeline_type) is
/// hashed.
#[derive(Debug, Clone)]
pub struct PipelineStateDesc {
    pub name: Cow<'static, str>,
    pub pipeline_type: PipelineType,
    pub srb_allocation_granularity: u32,
    pub command_queue_mask: u64,
    pub resource_layout: PipelineResourceLayoutDesc,
    pub graphics: GraphicsPipelineDesc,
    pub compute: ComputePipelineDesc,
}

impl PipelineStateDesc {
    #[must_use]
    pub fn graphics(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            pipeline_type: PipelineType::Graphics,
            srb_allocation_granularity: 1,
            command_queue_mask: 1,
            resource_layout: PipelineResourceLayoutDesc::default(),
            graphics: GraphicsPipelineDesc::default(),
            compute: ComputePipelineDesc::default(),
        }
    }

    #[must_use]
    pub fn compute(name: impl Into<Cow<'static, str>>, cs: ShaderHandle) -> Self {
        Self {
            pipeline_type: PipelineType::Compute,
            compute: ComputePipelineDesc { cs: Some(cs) },
            ..Self::graphics(name)
        }
    }

    #[inline]
    #[must_use]
    pub fn is_compute(&self) -> bool {
        self.pipeline_type == PipelineType::Compute
    }
}

impl PartialEq for PipelineStateDesc {
    fn eq(&self, other: &Self) -> bool {
        self.pipeline_type == other.pipeline_type
            && self.srb_allocation_granularity == other.srb_allocation_granularity
            && self.command_queue_mask == other.command_queue_mask
            && self.resource_layout == other.resource_layout
            && match self.pipeline_type {
                PipelineType::Graphics => self.graphics == other.graphics,
                PipelineType::Compute => self.compute == other.compute,
            }
    }
}
