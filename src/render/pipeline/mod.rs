//! Pipeline-state descriptors, their structural hash, and the deduplication
//! cache.

pub mod cache;
pub mod desc;
mod hash;

pub use cache::PsoCache;
pub use desc::{
    BlendStateDesc, ComputePipelineDesc, DepthStencilStateDesc, GraphicsPipelineDesc,
    InputLayoutDesc, LayoutElement, LogicOperation, MAX_RENDER_TARGETS,
    PipelineResourceLayoutDesc, PipelineStateDesc, PipelineType, RasterizerStateDesc,
    RenderTargetBlendDesc, SampleDesc, SamplerDesc, ShaderVariableDesc, ShaderVariableType,
    StaticSamplerDesc, StencilOpDesc,
};
