//! Immediate-style geometry builder.
//!
//! ```ignore
//! let (graph, device) = manager.graph_and_device();
//! let mut quad = ManualObject::new();
//! quad.begin(material, wgpu::PrimitiveTopology::TriangleList);
//! quad.position(Vec3::new(-1.0, -1.0, 0.0));
//! quad.color(Vec4::ONE);
//! // ...three more vertices
//! quad.triangle(0, 1, 2);
//! quad.triangle(0, 2, 3);
//! quad.end(graph, device)?;
//!
//! let handle = graph.add_object(quad);
//! graph.attach(node, handle);
//! ```
//!
//! Every `begin`/`end` pair produces one section: a [`Renderable`] stored in
//! the scene graph next to the manual object. Sections follow the manual
//! object when it is attached or detached and are destroyed with it.

use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};

use crate::errors::{PrismError, Result};
use crate::material::Material;
use crate::render::pipeline::{
    DepthStencilStateDesc, InputLayoutDesc, LayoutElement, RasterizerStateDesc,
};
use crate::render::{BufferDesc, BufferUsage, RenderDevice};
use crate::scene::graph::SceneGraph;
use crate::scene::object::Attachable;
use crate::scene::render_order::RenderOrder;
use crate::scene::renderable::Renderable;
use crate::scene::{NodeHandle, ObjectHandle};

pub(crate) const POSITION_LOCATION: u32 = 0;
pub(crate) const NORMAL_LOCATION: u32 = 1;
pub(crate) const COLOR_LOCATION: u32 = 2;
pub(crate) const TEXCOORD_LOCATION: u32 = 3;

/// Attributes written for one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct VertexAttributes {
    normal: bool,
    color: bool,
    texture_coord: bool,
}

impl VertexAttributes {
    fn input_layout(self) -> InputLayoutDesc {
        let mut elements = vec![LayoutElement::new(POSITION_LOCATION, wgpu::VertexFormat::Float32x3)];
        if self.normal {
            elements.push(LayoutElement::new(NORMAL_LOCATION, wgpu::VertexFormat::Float32x3));
        }
        if self.color {
            elements.push(LayoutElement::new(COLOR_LOCATION, wgpu::VertexFormat::Float32x4));
        }
        if self.texture_coord {
            elements.push(LayoutElement::new(TEXCOORD_LOCATION, wgpu::VertexFormat::Float32x2));
        }
        InputLayoutDesc { elements }
    }
}

#[derive(Debug, Clone, Copy)]
struct StagedVertex {
    position: Vec3,
    normal: Option<Vec3>,
    color: Option<Vec4>,
    texture_coord: Option<Vec2>,
}

impl StagedVertex {
    fn attributes(&self) -> VertexAttributes {
        VertexAttributes {
            normal: self.normal.is_some(),
            color: self.color.is_some(),
            texture_coord: self.texture_coord.is_some(),
        }
    }
}

/// State of the section between `begin` and `end`.
struct SectionBuilder {
    material: Arc<dyn Material>,
    topology: wgpu::PrimitiveTopology,
    depth_stencil: DepthStencilStateDesc,

    layout: Option<VertexAttributes>,
    first_inconsistent: Option<usize>,
    staged: Option<StagedVertex>,
    vertex_count: usize,
    vertices: Vec<f32>,
    indices: Vec<u32>,
}

impl SectionBuilder {
    fn flush(&mut self) {
        let Some(vertex) = self.staged.take() else {
            return;
        };

        let attributes = vertex.attributes();
        let layout = *self.layout.get_or_insert(attributes);
        if layout != attributes && self.first_inconsistent.is_none() {
            self.first_inconsistent = Some(self.vertex_count);
        }

        // Attributes missing from this vertex are zero-filled to keep the
        // stride intact; the section is rejected at `end` anyway.
        self.vertices.extend_from_slice(&vertex.position.to_array());
        if layout.normal {
            self.vertices
                .extend_from_slice(&vertex.normal.unwrap_or_default().to_array());
        }
        if layout.color {
            self.vertices
                .extend_from_slice(&vertex.color.unwrap_or_default().to_array());
        }
        if layout.texture_coord {
            self.vertices
                .extend_from_slice(&vertex.texture_coord.unwrap_or_default().to_array());
        }
        self.vertex_count += 1;
    }

    fn staged_mut(&mut self, call: &str) -> &mut StagedVertex {
        match self.staged.as_mut() {
            Some(vertex) => vertex,
            None => panic!("ManualObject::{call}() must follow position()"),
        }
    }
}

pub struct ManualObject {
    sections: Vec<ObjectHandle>,
    current: Option<SectionBuilder>,
    render_order: RenderOrder,
    node: Option<NodeHandle>,
}

impl ManualObject {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            current: None,
            render_order: RenderOrder::DEFAULT,
            node: None,
        }
    }

    /// Starts a new section with default depth-stencil state.
    pub fn begin(&mut self, material: Arc<dyn Material>, topology: wgpu::PrimitiveTopology) {
        self.begin_with_depth_stencil(material, DepthStencilStateDesc::default(), topology);
    }

    pub fn begin_with_depth_stencil(
        &mut self,
        material: Arc<dyn Material>,
        depth_stencil: DepthStencilStateDesc,
        topology: wgpu::PrimitiveTopology,
    ) {
        if self.current.is_some() {
            log::warn!("ManualObject::begin() discards an unfinished section");
        }
        self.current = Some(SectionBuilder {
            material,
            topology,
            depth_stencil,
            layout: None,
            first_inconsistent: None,
            staged: None,
            vertex_count: 0,
            vertices: Vec::new(),
            indices: Vec::new(),
        });
    }

    fn builder(&mut self, call: &str) -> &mut SectionBuilder {
        match self.current.as_mut() {
            Some(builder) => builder,
            None => panic!("ManualObject::begin() must be called before {call}()"),
        }
    }

    /// Starts a new vertex.
    pub fn position(&mut self, position: Vec3) {
        let builder = self.builder("position");
        builder.flush();
        builder.staged = Some(StagedVertex {
            position,
            normal: None,
            color: None,
            texture_coord: None,
        });
    }

    pub fn normal(&mut self, normal: Vec3) {
        self.builder("normal").staged_mut("normal").normal = Some(normal);
    }

    pub fn color(&mut self, color: Vec4) {
        self.builder("color").staged_mut("color").color = Some(color);
    }

    pub fn texture_coord(&mut self, uv: Vec2) {
        self.builder("texture_coord")
            .staged_mut("texture_coord")
            .texture_coord = Some(uv);
    }

    pub fn index(&mut self, index: u32) {
        self.builder("index").indices.push(index);
    }

    pub fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.builder("triangle").indices.extend_from_slice(&[a, b, c]);
    }

    /// Uploads the current section and adds it to `graph`.
    ///
    /// When the manual object is attached, the new section is attached to the
    /// same node right away.
    ///
    /// # Panics
    ///
    /// Panics if no section was begun.
    pub fn end(&mut self, graph: &mut SceneGraph, device: &mut dyn RenderDevice) -> Result<ObjectHandle> {
        let Some(mut builder) = self.current.take() else {
            panic!("ManualObject::end() called without begin()");
        };
        builder.flush();

        if let Some(index) = builder.first_inconsistent {
            return Err(PrismError::InconsistentVertexLayout { index });
        }

        let vertex_buffer = device.create_buffer(
            &BufferDesc {
                name: "ManualObject vertex buffer".into(),
                size: std::mem::size_of_val(builder.vertices.as_slice()) as u64,
                usage: BufferUsage::Immutable,
                bind_flags: wgpu::BufferUsages::VERTEX,
            },
            Some(bytemuck::cast_slice(&builder.vertices)),
        )?;
        let index_buffer = device.create_buffer(
            &BufferDesc {
                name: "ManualObject index buffer".into(),
                size: std::mem::size_of_val(builder.indices.as_slice()) as u64,
                usage: BufferUsage::Immutable,
                bind_flags: wgpu::BufferUsages::INDEX,
            },
            Some(bytemuck::cast_slice(&builder.indices)),
        )?;

        let mut section = Renderable::new();
        section.set_material(builder.material);
        section.set_primitive_topology(builder.topology);
        section.set_depth_stencil(builder.depth_stencil);
        section.set_input_layout(builder.layout.unwrap_or_default().input_layout());
        section.set_rasterizer(RasterizerStateDesc {
            cull_mode: None,
            front_counter_clockwise: true,
            ..RasterizerStateDesc::default()
        });
        section.set_render_order(self.render_order);
        section.set_vertex_buffer(vertex_buffer);
        section.set_index_buffer(index_buffer, builder.indices.len() as u32);

        let handle = graph.add_object(section);
        if let Some(node) = self.node {
            graph.attach(node, handle);
        }
        self.sections.push(handle);

        log::debug!(
            "ManualObject section {handle:?}: {} vertices, {} indices",
            builder.vertex_count,
            builder.indices.len()
        );
        Ok(handle)
    }

    /// Destroys every section built so far.
    pub fn clear(&mut self, graph: &mut SceneGraph) {
        for section in self.sections.drain(..) {
            graph.destroy_object(section);
        }
    }

    /// Render order of sections ended from now on.
    pub fn set_render_order(&mut self, order: RenderOrder) {
        self.render_order = order;
    }

    #[inline]
    #[must_use]
    pub fn render_order(&self) -> RenderOrder {
        self.render_order
    }

    #[inline]
    #[must_use]
    pub fn sections(&self) -> &[ObjectHandle] {
        &self.sections
    }
}

impl Default for ManualObject {
    fn default() -> Self {
        Self::new()
    }
}

impl Attachable for ManualObject {
    fn on_attached(&mut self, graph: &mut SceneGraph, node: NodeHandle) {
        self.node = Some(node);
        for &section in &self.sections {
            if graph.contains_object(section) {
                graph.attach(node, section);
            }
        }
    }

    fn on_detached(&mut self, graph: &mut SceneGraph, node: NodeHandle) {
        self.node = None;
        for &section in &self.sections {
            if graph.object_node(section) == Some(node) {
                graph.detach(node, section);
            }
        }
    }

    fn on_destroy(&mut self, graph: &mut SceneGraph) {
        self.clear(graph);
    }
}
