//! Recording backend shared by the integration tests.
//!
//! `MockDevice` and `MockContext` hand out sequential handles and append every
//! call to a shared [`Log`] so tests can assert on the exact command stream.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use prism::PrismError;
use prism::errors::Result;
use prism::material::{Material, UnlitMaterial};
use prism::render::pipeline::PipelineStateDesc;
use prism::render::{
    BufferDesc, BufferHandle, DeviceContext, DeviceId, DrawIndexedAttribs, PipelineStateHandle,
    RenderDevice, ResourceView, SetVertexBuffersFlags, ShaderDesc, ShaderHandle,
    ShaderResourceBindingHandle, SwapChainDesc,
};
use prism::scene::SceneManager;

// ============================================================================
// Log
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetVertexBuffers(Vec<BufferHandle>),
    SetIndexBuffer(BufferHandle),
    SetPipelineState(PipelineStateHandle),
    CommitShaderResources(ShaderResourceBindingHandle),
    DrawIndexed { num_indices: u32 },
    UpdateBuffer { buffer: BufferHandle, data: Vec<u8> },
}

#[derive(Debug, Default)]
pub struct Log {
    pub commands: Vec<Command>,
    pub shaders: Vec<String>,
    pub buffers: HashMap<BufferHandle, (String, Vec<u8>)>,
    pub pipelines: Vec<PipelineStateDesc>,
    pub bindings_created: usize,
    pub static_variables: Vec<(PipelineStateHandle, String)>,
    pub binding_variables: Vec<(ShaderResourceBindingHandle, String, ResourceView)>,
    pub fail_pipelines: bool,
}

impl Log {
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawIndexed { .. }))
            .count()
    }

    pub fn pipeline_binds(&self) -> Vec<PipelineStateHandle> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::SetPipelineState(pso) => Some(*pso),
                _ => None,
            })
            .collect()
    }

    /// Index buffers bound before each draw, in draw order.
    pub fn drawn_index_buffers(&self) -> Vec<BufferHandle> {
        let mut bound = None;
        let mut drawn = Vec::new();
        for command in &self.commands {
            match command {
                Command::SetIndexBuffer(buffer) => bound = Some(*buffer),
                Command::DrawIndexed { .. } => drawn.extend(bound),
                _ => {}
            }
        }
        drawn
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

pub type SharedLog = Rc<RefCell<Log>>;

// ============================================================================
// Device
// ============================================================================

pub struct MockDevice {
    id: DeviceId,
    next: u64,
    log: SharedLog,
}

impl MockDevice {
    pub fn new(id: u64, log: SharedLog) -> Self {
        Self {
            id: DeviceId::new(id),
            next: 1,
            log,
        }
    }

    fn next_raw(&mut self) -> u64 {
        let raw = self.next;
        self.next += 1;
        raw
    }
}

impl RenderDevice for MockDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn create_shader(&mut self, desc: &ShaderDesc<'_>) -> Result<ShaderHandle> {
        self.log.borrow_mut().shaders.push(desc.name.to_string());
        Ok(ShaderHandle::new(self.next_raw()))
    }

    fn create_buffer(&mut self, desc: &BufferDesc<'_>, data: Option<&[u8]>) -> Result<BufferHandle> {
        let handle = BufferHandle::new(self.next_raw());
        let contents = data.map_or_else(|| vec![0; desc.size as usize], <[u8]>::to_vec);
        self.log
            .borrow_mut()
            .buffers
            .insert(handle, (desc.name.to_string(), contents));
        Ok(handle)
    }

    fn create_pipeline_state(&mut self, desc: &PipelineStateDesc) -> Result<PipelineStateHandle> {
        if self.log.borrow().fail_pipelines {
            return Err(PrismError::PipelineCreationFailed {
                name: desc.name.to_string(),
                reason: "mock failure".to_owned(),
            });
        }
        self.log.borrow_mut().pipelines.push(desc.clone());
        Ok(PipelineStateHandle::new(self.next_raw()))
    }

    fn create_shader_resource_binding(
        &mut self,
        _pso: PipelineStateHandle,
        _init_static_resources: bool,
    ) -> Result<ShaderResourceBindingHandle> {
        self.log.borrow_mut().bindings_created += 1;
        Ok(ShaderResourceBindingHandle::new(self.next_raw()))
    }

    fn set_static_variable(
        &mut self,
        pso: PipelineStateHandle,
        _stage: wgpu::ShaderStages,
        name: &str,
        _resource: ResourceView,
    ) -> Result<()> {
        self.log
            .borrow_mut()
            .static_variables
            .push((pso, name.to_owned()));
        Ok(())
    }

    fn set_binding_variable(
        &mut self,
        srb: ShaderResourceBindingHandle,
        _stage: wgpu::ShaderStages,
        name: &str,
        resource: ResourceView,
    ) -> Result<()> {
        self.log
            .borrow_mut()
            .binding_variables
            .push((srb, name.to_owned(), resource));
        Ok(())
    }
}

// ============================================================================
// Context
// ============================================================================

pub struct MockContext {
    log: SharedLog,
}

impl MockContext {
    pub fn new(log: SharedLog) -> Self {
        Self { log }
    }

    fn record(&self, command: Command) -> Result<()> {
        self.log.borrow_mut().commands.push(command);
        Ok(())
    }
}

impl DeviceContext for MockContext {
    fn set_vertex_buffers(
        &mut self,
        _start_slot: u32,
        buffers: &[BufferHandle],
        _offsets: &[u64],
        _flags: SetVertexBuffersFlags,
    ) -> Result<()> {
        self.record(Command::SetVertexBuffers(buffers.to_vec()))
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle, _offset: u64) -> Result<()> {
        self.record(Command::SetIndexBuffer(buffer))
    }

    fn set_pipeline_state(&mut self, pso: PipelineStateHandle) -> Result<()> {
        self.record(Command::SetPipelineState(pso))
    }

    fn commit_shader_resources(&mut self, srb: ShaderResourceBindingHandle) -> Result<()> {
        self.record(Command::CommitShaderResources(srb))
    }

    fn draw_indexed(&mut self, attribs: &DrawIndexedAttribs) -> Result<()> {
        self.record(Command::DrawIndexed {
            num_indices: attribs.num_indices,
        })
    }

    fn update_buffer(&mut self, buffer: BufferHandle, data: &[u8]) -> Result<()> {
        self.record(Command::UpdateBuffer {
            buffer,
            data: data.to_vec(),
        })
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn new_log() -> SharedLog {
    let _ = env_logger::builder().is_test(true).try_init();
    Rc::new(RefCell::new(Log::default()))
}

/// Manager over a fresh mock backend.
pub fn new_manager() -> (SceneManager, SharedLog) {
    let log = new_log();
    let manager = SceneManager::new(
        Box::new(MockDevice::new(1, log.clone())),
        Box::new(MockContext::new(log.clone())),
        SwapChainDesc::default(),
    );
    (manager, log)
}

pub fn unlit(manager: &mut SceneManager) -> Arc<dyn Material> {
    let (device, library) = manager.material_resources();
    match UnlitMaterial::new(device, library) {
        Ok(material) => Arc::new(material),
        Err(e) => panic!("unlit material: {e}"),
    }
}

/// Buffer handle that is guaranteed not to collide with mock-created ones.
pub fn fake_buffer(raw: u64) -> BufferHandle {
    BufferHandle::new(1_000_000 + raw)
}
