//! Scene Manager
//!
//! Owns the scene graph, the backend handles and the per-frame render
//! queues, and drives a frame:
//!
//! 1. empty every render queue (the buckets themselves are kept)
//! 2. update derived transforms from the root
//! 3. derive view, projection and view-projection from the active camera
//! 4. walk the enabled part of the graph and bucket every [`Renderable`] and
//!    [`RawRenderableObject`] by its [`RenderOrder`]
//! 5. draw the buckets in ascending order, objects in insertion order
//!
//! Redundant state changes are elided within a frame: a pipeline is only bound
//! when it differs from the last bound one, and a material only uploads its
//! parameters when it differs from the material of the previous draw.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::core::type_tag::type_tag;
use crate::errors::{PrismError, Result};
use crate::material::{COMMON_CONSTANTS_VS, CommonConstantsVs, Material, ShaderLibrary, same_material};
use crate::render::pipeline::ShaderVariableType;
use crate::render::{
    DeviceContext, DrawIndexedAttribs, PipelineStateDesc, PipelineStateHandle, PsoCache,
    RenderDevice, SetVertexBuffersFlags, SwapChainDesc, TextureHandle,
};
use crate::scene::camera::Camera;
use crate::scene::graph::SceneGraph;
use crate::scene::object::downcast_mut;
use crate::scene::raw_renderable::RawRenderableObject;
use crate::scene::render_order::RenderOrder;
use crate::scene::renderable::Renderable;
use crate::scene::settings::SceneSettings;
use crate::scene::{NodeHandle, ObjectHandle};

/// Matrices visible to the object currently being drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderMatrices {
    pub world_view_proj: Mat4,
    pub world_view: Mat4,
    pub view: Mat4,
    pub view_proj: Mat4,
    pub proj: Mat4,
    pub camera_world_position: Vec3,
}

impl Default for RenderMatrices {
    fn default() -> Self {
        Self {
            world_view_proj: Mat4::IDENTITY,
            world_view: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            view_proj: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            camera_world_position: Vec3::ZERO,
        }
    }
}

impl RenderMatrices {
    /// Copy of these matrices with the per-object terms computed for `world`.
    #[must_use]
    pub fn for_world(&self, world: Mat4) -> Self {
        Self {
            world_view_proj: self.view_proj * world,
            world_view: self.view * world,
            ..*self
        }
    }
}

/// Counters of the last [`SceneManager::render`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub objects_collected: usize,
    pub draw_calls: usize,
    pub pipeline_binds: usize,
    pub material_prepares: usize,
    pub raw_renders: usize,
}

pub struct SceneManager {
    settings: SceneSettings,

    // === Scene ===
    graph: SceneGraph,
    root: NodeHandle,
    camera: ObjectHandle,
    environment_map: Option<TextureHandle>,
    next_stencil_id: u32,

    // === Backend ===
    device: Box<dyn RenderDevice>,
    context: Box<dyn DeviceContext>,
    swap_chain: SwapChainDesc,
    pso_cache: PsoCache,
    shader_library: ShaderLibrary,

    // === Frame state ===
    render_queues: BTreeMap<RenderOrder, Vec<ObjectHandle>>,
    frame_matrices: RenderMatrices,
    current_matrices: RenderMatrices,
    last_pso: Option<PipelineStateHandle>,
    last_material: Option<Arc<dyn Material>>,
    stats: RenderStats,
    in_render: bool,
}

impl SceneManager {
    pub fn new(
        device: Box<dyn RenderDevice>,
        context: Box<dyn DeviceContext>,
        swap_chain: SwapChainDesc,
    ) -> Self {
        Self::with_settings(device, context, swap_chain, SceneSettings::default())
    }

    /// Creates the root node and a default camera on a child of the root.
    pub fn with_settings(
        device: Box<dyn RenderDevice>,
        context: Box<dyn DeviceContext>,
        swap_chain: SwapChainDesc,
        settings: SceneSettings,
    ) -> Self {
        let mut graph = SceneGraph::new();
        let root = graph.create_node();
        let camera_node = graph.create_child(root);
        let camera = graph.add_object(Camera::with_frustum(settings.camera.frustum()));
        graph.attach(camera_node, camera);

        Self {
            next_stencil_id: settings.first_stencil_id,
            settings,
            graph,
            root,
            camera,
            environment_map: None,
            device,
            context,
            swap_chain,
            pso_cache: PsoCache::new(),
            shader_library: ShaderLibrary::new(),
            render_queues: BTreeMap::new(),
            frame_matrices: RenderMatrices::default(),
            current_matrices: RenderMatrices::default(),
            last_pso: None,
            last_material: None,
            stats: RenderStats::default(),
            in_render: false,
        }
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Renders one frame. Not re-entrant.
    ///
    /// # Panics
    ///
    /// Panics when called from inside a frame, e.g. from
    /// [`RawRenderable::render`](crate::scene::RawRenderable::render), where
    /// [`render_object`](Self::render_object) is the way to draw. Also panics
    /// when a collected [`Renderable`] has no material, vertex buffer or
    /// index buffer.
    pub fn render(&mut self) -> Result<RenderStats> {
        assert!(
            !self.in_render,
            "SceneManager::render() called while a frame is being rendered"
        );
        self.in_render = true;
        let result = self.render_frame();
        self.in_render = false;
        result
    }

    /// `true` while [`render`](Self::render) is running.
    #[inline]
    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.in_render
    }

    fn render_frame(&mut self) -> Result<RenderStats> {
        self.clear_render_queues();
        self.stats = RenderStats::default();

        self.graph.update_transforms(self.root);
        self.update_camera_matrices()?;
        self.stats.objects_collected = self.collect_render_queues();

        self.last_pso = None;
        self.last_material = None;

        let queues = std::mem::take(&mut self.render_queues);
        let result = self.draw_render_queues(&queues);
        self.render_queues = queues;
        self.current_matrices = self.frame_matrices;
        result?;

        log::trace!("Frame rendered: {:?}", self.stats);
        Ok(self.stats)
    }

    fn clear_render_queues(&mut self) {
        for queue in self.render_queues.values_mut() {
            queue.clear();
        }
    }

    fn update_camera_matrices(&mut self) -> Result<()> {
        let camera = self
            .graph
            .cast::<Camera>(self.camera)
            .ok_or_else(|| PrismError::NotACamera(format!("{:?}", self.camera)))?;
        let proj = camera.projection_matrix();

        let Some(camera_node) = self.graph.object_node(self.camera) else {
            log::warn!("Active camera is detached, nothing can be rendered");
            return Err(PrismError::CameraNotAttached);
        };

        let view_inv = Mat4::from(*self.graph[camera_node].derived_matrix());
        let view = view_inv.inverse();
        let view_proj = proj * view;

        self.frame_matrices = RenderMatrices {
            world_view_proj: view_proj,
            world_view: view,
            view,
            view_proj,
            proj,
            camera_world_position: view_inv.w_axis.truncate(),
        };
        self.current_matrices = self.frame_matrices;
        Ok(())
    }

    fn collect_render_queues(&mut self) -> usize {
        let renderable_tag = type_tag::<Renderable>();
        let raw_tag = type_tag::<RawRenderableObject>();
        let capacity = self.settings.queue_capacity;
        let mut collected = 0;

        for (_, node) in self.graph.enabled_nodes(self.root) {
            for &object in node.objects() {
                let order = match self.graph.object_tag(object) {
                    Some(tag) if tag == renderable_tag => self
                        .graph
                        .cast::<Renderable>(object)
                        .map(Renderable::render_order),
                    Some(tag) if tag == raw_tag => self
                        .graph
                        .cast::<RawRenderableObject>(object)
                        .map(RawRenderableObject::render_order),
                    _ => None,
                };

                if let Some(order) = order {
                    self.render_queues
                        .entry(order)
                        .or_insert_with(|| Vec::with_capacity(capacity))
                        .push(object);
                    collected += 1;
                }
            }
        }

        collected
    }

    fn draw_render_queues(&mut self, queues: &BTreeMap<RenderOrder, Vec<ObjectHandle>>) -> Result<()> {
        for objects in queues.values() {
            for &object in objects {
                // A raw renderable earlier in the frame may have restructured the graph.
                let Some(node) = self.graph.object_node(object) else {
                    continue;
                };
                let world = Mat4::from(*self.graph[node].derived_matrix());
                let matrices = self.frame_matrices.for_world(world);
                self.render_object(object, &matrices)?;
            }
        }
        Ok(())
    }

    /// Draws a single [`Renderable`] or [`RawRenderableObject`] with
    /// `matrices` installed as the current matrices.
    ///
    /// The previous current matrices are restored afterwards, so raw
    /// renderables can use this to draw sub-objects with their own transforms.
    /// Other object kinds are ignored.
    pub fn render_object(&mut self, object: ObjectHandle, matrices: &RenderMatrices) -> Result<()> {
        let previous = std::mem::replace(&mut self.current_matrices, *matrices);

        let result = match self.graph.object_tag(object) {
            Some(tag) if tag == type_tag::<Renderable>() => self.draw_renderable(object),
            Some(tag) if tag == type_tag::<RawRenderableObject>() => self.draw_raw(object),
            _ => Ok(()),
        };

        self.current_matrices = previous;
        result
    }

    fn draw_renderable(&mut self, object: ObjectHandle) -> Result<()> {
        let Self {
            settings,
            graph,
            device,
            context,
            swap_chain,
            pso_cache,
            current_matrices,
            last_pso,
            last_material,
            stats,
            ..
        } = self;

        let Some(renderable) = graph.cast_mut::<Renderable>(object) else {
            return Ok(());
        };
        let Some(material) = renderable.material().cloned() else {
            panic!("Renderable {object:?} has no material");
        };
        let (Some(vertex_buffer), Some(index_buffer)) =
            (renderable.vertex_buffer(), renderable.index_buffer())
        else {
            panic!("Renderable {object:?} has no vertex or index buffer");
        };

        // ── Pipeline resolution ──
        if renderable.pso_needs_update {
            let mut desc = PipelineStateDesc::graphics("Renderable PSO");
            desc.resource_layout.default_variable_type = ShaderVariableType::Static;
            desc.graphics.render_target_formats.push(swap_chain.color_format);
            desc.graphics.depth_format = swap_chain.depth_format;
            desc.graphics.primitive_topology = renderable.primitive_topology();
            desc.graphics.rasterizer = *renderable.rasterizer();
            desc.graphics.depth_stencil = *renderable.depth_stencil();
            desc.graphics.input_layout = renderable.input_layout().clone();
            material.setup_pso_desc(&mut desc);

            let pso = pso_cache.get_or_create(device.as_mut(), &desc)?;
            if renderable.pso != Some(pso) {
                material.bind_pso(device.as_mut(), pso)?;
                renderable.pso = Some(pso);
                renderable.srb = None;
            }
            if renderable.srb.is_none() || renderable.material_changed {
                let srb = device.create_shader_resource_binding(pso, true)?;
                material.bind_srb(device.as_mut(), srb)?;
                renderable.srb = Some(srb);
                renderable.material_changed = false;
            }
            renderable.pso_needs_update = false;
        }

        let (Some(pso), Some(srb)) = (renderable.pso, renderable.srb) else {
            panic!("Renderable {object:?} has no resolved pipeline state");
        };

        // ── Per-draw constants ──
        material.shader_program().write_constant(
            context.as_mut(),
            COMMON_CONSTANTS_VS,
            &CommonConstantsVs {
                world_view_proj: current_matrices.world_view_proj,
                world_view: current_matrices.world_view,
                view: current_matrices.view,
            },
        )?;

        if !last_material
            .as_ref()
            .is_some_and(|last| same_material(last, &material))
        {
            material.prepare_for_render(context.as_mut())?;
            *last_material = Some(material);
            stats.material_prepares += 1;
        }

        // ── Bind & draw ──
        context.set_vertex_buffers(0, &[vertex_buffer], &[0], SetVertexBuffersFlags::RESET)?;
        context.set_index_buffer(index_buffer, 0)?;

        if *last_pso != Some(pso) {
            context.set_pipeline_state(pso)?;
            *last_pso = Some(pso);
            stats.pipeline_binds += 1;
        }

        context.commit_shader_resources(srb)?;
        context.draw_indexed(&DrawIndexedAttribs {
            num_indices: renderable.index_count(),
            index_format: wgpu::IndexFormat::Uint32,
            verify: settings.verify_draws,
        })?;
        stats.draw_calls += 1;

        Ok(())
    }

    fn draw_raw(&mut self, object: ObjectHandle) -> Result<()> {
        // Already taken out: the object is asking to render itself.
        let Some(mut boxed) = self.graph.take_object(object) else {
            return Ok(());
        };

        let result = match downcast_mut::<RawRenderableObject>(boxed.as_mut()) {
            Some(raw) => {
                self.stats.raw_renders += 1;
                raw.render(self)
            }
            None => Ok(()),
        };

        self.graph.restore_object(object, boxed);
        result
    }

    /// Forgets the pipeline and material bound by the last draw. Raw
    /// renderables that bind their own pipeline state call this so the next
    /// renderable rebinds everything.
    pub fn invalidate_bound_state(&mut self) {
        self.last_pso = None;
        self.last_material = None;
    }

    // ========================================================================
    // Current matrices
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn render_matrices(&self) -> &RenderMatrices {
        &self.current_matrices
    }

    #[inline]
    #[must_use]
    pub fn world_view_proj(&self) -> Mat4 {
        self.current_matrices.world_view_proj
    }

    #[inline]
    #[must_use]
    pub fn world_view(&self) -> Mat4 {
        self.current_matrices.world_view
    }

    #[inline]
    #[must_use]
    pub fn view(&self) -> Mat4 {
        self.current_matrices.view
    }

    #[inline]
    #[must_use]
    pub fn view_proj(&self) -> Mat4 {
        self.current_matrices.view_proj
    }

    #[inline]
    #[must_use]
    pub fn proj(&self) -> Mat4 {
        self.current_matrices.proj
    }

    #[inline]
    #[must_use]
    pub fn camera_world_position(&self) -> Vec3 {
        self.current_matrices.camera_world_position
    }

    // ========================================================================
    // Scene access
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    #[inline]
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Handle of the active camera object.
    #[inline]
    #[must_use]
    pub fn camera(&self) -> ObjectHandle {
        self.camera
    }

    /// Node the active camera is attached to.
    #[must_use]
    pub fn camera_node(&self) -> Option<NodeHandle> {
        self.graph.object_node(self.camera)
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.graph.cast_mut::<Camera>(self.camera)
    }

    /// Makes `camera` the active camera.
    pub fn set_camera(&mut self, camera: ObjectHandle) -> Result<()> {
        if !self.graph.is::<Camera>(camera) {
            return Err(PrismError::NotACamera(format!("{camera:?}")));
        }
        self.camera = camera;
        Ok(())
    }

    /// Hands out a stencil reference value unique within this manager.
    pub fn request_stencil_id(&mut self) -> u32 {
        let id = self.next_stencil_id;
        self.next_stencil_id += 1;
        id
    }

    #[inline]
    #[must_use]
    pub fn environment_map(&self) -> Option<TextureHandle> {
        self.environment_map
    }

    pub fn set_environment_map(&mut self, texture: Option<TextureHandle>) {
        self.environment_map = texture;
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Counters of the last frame.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    // ========================================================================
    // Backend access
    // ========================================================================

    #[inline]
    pub fn device_mut(&mut self) -> &mut dyn RenderDevice {
        self.device.as_mut()
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut dyn DeviceContext {
        self.context.as_mut()
    }

    #[inline]
    #[must_use]
    pub fn swap_chain(&self) -> &SwapChainDesc {
        &self.swap_chain
    }

    #[inline]
    #[must_use]
    pub fn pso_cache(&self) -> &PsoCache {
        &self.pso_cache
    }

    #[inline]
    #[must_use]
    pub fn shader_library(&self) -> &ShaderLibrary {
        &self.shader_library
    }

    /// Device and shader library, as needed to create materials.
    pub fn material_resources(&mut self) -> (&mut dyn RenderDevice, &mut ShaderLibrary) {
        (self.device.as_mut(), &mut self.shader_library)
    }

    /// Graph and device, as needed to build geometry for attached objects.
    pub fn graph_and_device(&mut self) -> (&mut SceneGraph, &mut dyn RenderDevice) {
        (&mut self.graph, self.device.as_mut())
    }
}
