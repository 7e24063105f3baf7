use std::sync::Arc;

use crate::material::Material;
use crate::render::pipeline::{DepthStencilStateDesc, InputLayoutDesc, RasterizerStateDesc};
use crate::render::{BufferHandle, PipelineStateHandle, ShaderResourceBindingHandle};
use crate::scene::object::Attachable;
use crate::scene::render_order::RenderOrder;

/// An object drawn by the scene manager with a single indexed draw call.
///
/// Every setter that affects the pipeline state (material, topology,
/// rasterizer, depth-stencil, input layout) marks the cached pipeline as
/// stale. The scene manager re-resolves it on the next draw.
pub struct Renderable {
    material: Option<Arc<dyn Material>>,
    render_order: RenderOrder,

    rasterizer: RasterizerStateDesc,
    depth_stencil: DepthStencilStateDesc,
    input_layout: InputLayoutDesc,
    primitive_topology: wgpu::PrimitiveTopology,

    vertex_buffer: Option<BufferHandle>,
    index_buffer: Option<BufferHandle>,
    index_count: u32,

    pub(crate) pso: Option<PipelineStateHandle>,
    pub(crate) srb: Option<ShaderResourceBindingHandle>,
    pub(crate) pso_needs_update: bool,
    pub(crate) material_changed: bool,
}

impl Renderable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            material: None,
            render_order: RenderOrder::DEFAULT,
            rasterizer: RasterizerStateDesc::default(),
            depth_stencil: DepthStencilStateDesc::default(),
            input_layout: InputLayoutDesc::default(),
            primitive_topology: wgpu::PrimitiveTopology::TriangleList,
            vertex_buffer: None,
            index_buffer: None,
            index_count: 0,
            pso: None,
            srb: None,
            pso_needs_update: true,
            material_changed: false,
        }
    }

    // === Pipeline-affecting state ===

    #[inline]
    #[must_use]
    pub fn material(&self) -> Option<&Arc<dyn Material>> {
        self.material.as_ref()
    }

    pub fn set_material(&mut self, material: Arc<dyn Material>) {
        self.material = Some(material);
        self.pso_needs_update = true;
        self.material_changed = true;
    }

    #[inline]
    #[must_use]
    pub fn rasterizer(&self) -> &RasterizerStateDesc {
        &self.rasterizer
    }

    pub fn set_rasterizer(&mut self, rasterizer: RasterizerStateDesc) {
        self.rasterizer = rasterizer;
        self.pso_needs_update = true;
    }

    /// `None` disables culling.
    pub fn set_cull_mode(&mut self, cull_mode: Option<wgpu::Face>) {
        self.rasterizer.cull_mode = cull_mode;
        self.pso_needs_update = true;
    }

    #[inline]
    #[must_use]
    pub fn depth_stencil(&self) -> &DepthStencilStateDesc {
        &self.depth_stencil
    }

    pub fn set_depth_stencil(&mut self, depth_stencil: DepthStencilStateDesc) {
        self.depth_stencil = depth_stencil;
        self.pso_needs_update = true;
    }

    #[inline]
    #[must_use]
    pub fn input_layout(&self) -> &InputLayoutDesc {
        &self.input_layout
    }

    pub fn set_input_layout(&mut self, input_layout: InputLayoutDesc) {
        self.input_layout = input_layout;
        self.pso_needs_update = true;
    }

    #[inline]
    #[must_use]
    pub fn primitive_topology(&self) -> wgpu::PrimitiveTopology {
        self.primitive_topology
    }

    pub fn set_primitive_topology(&mut self, topology: wgpu::PrimitiveTopology) {
        self.primitive_topology = topology;
        self.pso_needs_update = true;
    }

    // === Ordering ===

    #[inline]
    #[must_use]
    pub fn render_order(&self) -> RenderOrder {
        self.render_order
    }

    pub fn set_render_order(&mut self, order: RenderOrder) {
        self.render_order = order;
    }

    // === Geometry ===

    #[inline]
    #[must_use]
    pub fn vertex_buffer(&self) -> Option<BufferHandle> {
        self.vertex_buffer
    }

    pub fn set_vertex_buffer(&mut self, buffer: BufferHandle) {
        self.vertex_buffer = Some(buffer);
    }

    #[inline]
    #[must_use]
    pub fn index_buffer(&self) -> Option<BufferHandle> {
        self.index_buffer
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Sets the 32-bit index buffer and the number of indices to draw.
    pub fn set_index_buffer(&mut self, buffer: BufferHandle, index_count: u32) {
        self.index_buffer = Some(buffer);
        self.index_count = index_count;
    }

    // === Cached pipeline ===

    #[inline]
    #[must_use]
    pub fn needs_pso_update(&self) -> bool {
        self.pso_needs_update
    }

    /// Pipeline resolved by the last draw, if any.
    #[inline]
    #[must_use]
    pub fn pso(&self) -> Option<PipelineStateHandle> {
        self.pso
    }

    #[inline]
    #[must_use]
    pub fn srb(&self) -> Option<ShaderResourceBindingHandle> {
        self.srb
    }
}

impl Default for Renderable {
    fn default() -> Self {
        Self::new()
    }
}

impl Attachable for Renderable {}
