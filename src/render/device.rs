//! Backend interface.
//!
//! The renderer core talks to the GPU only through the two traits defined
//! here. [`RenderDevice`] creates objects, [`DeviceContext`] records commands
//! on the immediate context. Every call is fallible; failures propagate to the
//! caller of [`SceneManager::render`](crate::scene::SceneManager::render) and
//! abort the frame.

use std::borrow::Cow;

use bitflags::bitflags;

use crate::errors::Result;
use crate::render::handles::{
    BufferHandle, DeviceId, PipelineStateHandle, ShaderHandle, ShaderResourceBindingHandle,
    TextureHandle,
};
use crate::render::pipeline::PipelineStateDesc;

// ─── Descriptors ─────────────────────────────────────────────────────────────

/// Formats and size of the surface the scene is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapChainDesc {
    pub width: u32,
    pub height: u32,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
}

impl Default for SwapChainDesc {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            depth_format: Some(wgpu::TextureFormat::Depth32Float),
        }
    }
}

/// How often the CPU updates a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Written once at creation.
    #[default]
    Immutable,
    /// Updated occasionally through [`DeviceContext::update_buffer`].
    Default,
    /// Rewritten every frame or more often.
    Dynamic,
}

#[derive(Debug, Clone)]
pub struct BufferDesc<'a> {
    pub name: Cow<'a, str>,
    pub size: u64,
    pub usage: BufferUsage,
    pub bind_flags: wgpu::BufferUsages,
}

#[derive(Debug, Clone)]
pub struct ShaderDesc<'a> {
    pub name: Cow<'a, str>,
    pub stage: wgpu::ShaderStages,
    pub source: &'a str,
    pub entry_point: &'a str,
}

/// A resource that can be bound to a named shader variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceView {
    ConstantBuffer(BufferHandle),
    Texture(TextureHandle),
}

bitflags! {
    /// Options for [`DeviceContext::set_vertex_buffers`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SetVertexBuffersFlags: u8 {
        /// Unbind every slot not covered by this call.
        const RESET = 1 << 0;
    }
}

/// Arguments of an indexed draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawIndexedAttribs {
    pub num_indices: u32,
    pub index_format: wgpu::IndexFormat,
    /// Ask the backend to validate bound state before drawing.
    pub verify: bool,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Object creation side of the backend.
pub trait RenderDevice {
    /// Stable identity of this device.
    fn id(&self) -> DeviceId;

    fn create_shader(&mut self, desc: &ShaderDesc<'_>) -> Result<ShaderHandle>;

    fn create_buffer(&mut self, desc: &BufferDesc<'_>, data: Option<&[u8]>)
    -> Result<BufferHandle>;

    fn create_pipeline_state(&mut self, desc: &PipelineStateDesc) -> Result<PipelineStateHandle>;

    /// Creates a binding for `pso`. With `init_static_resources` the static
    /// variables already set on the pipeline are copied into the binding.
    fn create_shader_resource_binding(
        &mut self,
        pso: PipelineStateHandle,
        init_static_resources: bool,
    ) -> Result<ShaderResourceBindingHandle>;

    /// Binds a resource to a static variable of a pipeline-state object.
    fn set_static_variable(
        &mut self,
        pso: PipelineStateHandle,
        stage: wgpu::ShaderStages,
        name: &str,
        resource: ResourceView,
    ) -> Result<()>;

    /// Binds a resource to a mutable variable of a shader resource binding.
    fn set_binding_variable(
        &mut self,
        srb: ShaderResourceBindingHandle,
        stage: wgpu::ShaderStages,
        name: &str,
        resource: ResourceView,
    ) -> Result<()>;
}

/// Command recording side of the backend.
pub trait DeviceContext {
    fn set_vertex_buffers(
        &mut self,
        start_slot: u32,
        buffers: &[BufferHandle],
        offsets: &[u64],
        flags: SetVertexBuffersFlags,
    ) -> Result<()>;

    fn set_index_buffer(&mut self, buffer: BufferHandle, offset: u64) -> Result<()>;

    fn set_pipeline_state(&mut self, pso: PipelineStateHandle) -> Result<()>;

    fn commit_shader_resources(&mut self, srb: ShaderResourceBindingHandle) -> Result<()>;

    fn draw_indexed(&mut self, attribs: &DrawIndexedAttribs) -> Result<()>;

    /// Overwrites the start of `buffer` with `data`.
    fn update_buffer(&mut self, buffer: BufferHandle, data: &[u8]) -> Result<()>;
}
