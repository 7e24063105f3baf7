//! GPU-facing side of the renderer: backend traits, object handles and the
//! pipeline-state cache.

pub mod device;
pub mod handles;
pub mod pipeline;

pub use device::{
    BufferDesc, BufferUsage, DeviceContext, DrawIndexedAttribs, RenderDevice, ResourceView,
    SetVertexBuffersFlags, ShaderDesc, SwapChainDesc,
};
pub use handles::{
    BufferHandle, DeviceId, PipelineStateHandle, ShaderHandle, ShaderResourceBindingHandle,
    TextureHandle,
};
pub use pipeline::{PipelineStateDesc, PsoCache};
