use std::any::{TypeId, type_name};
use std::borrow::Cow;

use bytemuck::Pod;

use crate::errors::{PrismError, Result};
use crate::render::{
    BufferDesc, BufferHandle, BufferUsage, DeviceContext, PipelineStateDesc, PipelineStateHandle,
    RenderDevice, ResourceView, ShaderDesc, ShaderHandle,
};

/// A named constant buffer declared with a Rust type.
#[derive(Debug, Clone)]
struct ShaderConstant {
    name: String,
    stages: wgpu::ShaderStages,
    buffer: BufferHandle,
    type_id: TypeId,
    type_name: &'static str,
}

/// A vertex + pixel shader pair and the constant buffers it reads.
///
/// Constant buffers are owned by the program, so every material sharing the
/// program writes into the same buffers right before its draws.
#[derive(Debug)]
pub struct ShaderProgram {
    name: String,
    vertex_shader: ShaderHandle,
    pixel_shader: ShaderHandle,
    constants: Vec<ShaderConstant>,
}

impl ShaderProgram {
    /// Creates both stages from source. Entry points are `vs_main` and
    /// `fs_main`.
    pub fn compile(
        device: &mut dyn RenderDevice,
        name: &str,
        vs_source: &str,
        ps_source: &str,
    ) -> Result<Self> {
        let vertex_shader = device.create_shader(&ShaderDesc {
            name: Cow::Owned(format!("{name}_vs")),
            stage: wgpu::ShaderStages::VERTEX,
            source: vs_source,
            entry_point: "vs_main",
        })?;
        let pixel_shader = device.create_shader(&ShaderDesc {
            name: Cow::Owned(format!("{name}_ps")),
            stage: wgpu::ShaderStages::FRAGMENT,
            source: ps_source,
            entry_point: "fs_main",
        })?;

        log::debug!("Compiled shader program '{name}'");

        Ok(Self {
            name: name.to_owned(),
            vertex_shader,
            pixel_shader,
            constants: Vec::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn vertex_shader(&self) -> ShaderHandle {
        self.vertex_shader
    }

    #[inline]
    #[must_use]
    pub fn pixel_shader(&self) -> ShaderHandle {
        self.pixel_shader
    }

    /// Declares a constant buffer holding one `T`, visible to `stages`.
    pub fn declare_constant<T: Pod>(
        &mut self,
        device: &mut dyn RenderDevice,
        name: &str,
        stages: wgpu::ShaderStages,
    ) -> Result<BufferHandle> {
        let buffer = device.create_buffer(
            &BufferDesc {
                name: Cow::Borrowed(name),
                size: size_of::<T>() as u64,
                usage: BufferUsage::Dynamic,
                bind_flags: wgpu::BufferUsages::UNIFORM,
            },
            None,
        )?;

        let constant = ShaderConstant {
            name: name.to_owned(),
            stages,
            buffer,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        };
        match self.constants.iter_mut().find(|c| c.name == name) {
            Some(existing) => *existing = constant,
            None => self.constants.push(constant),
        }
        Ok(buffer)
    }

    /// Buffer backing the constant `name`.
    #[must_use]
    pub fn constant_buffer(&self, name: &str) -> Option<BufferHandle> {
        self.find(name).map(|c| c.buffer)
    }

    /// Uploads `value` into the constant `name`.
    ///
    /// Fails if the constant is unknown or was declared with another type.
    pub fn write_constant<T: Pod>(
        &self,
        context: &mut dyn DeviceContext,
        name: &str,
        value: &T,
    ) -> Result<()> {
        let constant = self
            .find(name)
            .ok_or_else(|| PrismError::ConstantNotFound(name.to_owned()))?;

        if constant.type_id != TypeId::of::<T>() {
            return Err(PrismError::ConstantTypeMismatch {
                name: name.to_owned(),
                declared: constant.type_name,
                written: type_name::<T>(),
            });
        }

        context.update_buffer(constant.buffer, bytemuck::bytes_of(value))
    }

    /// Writes both stages into `desc`.
    pub fn setup_pso_desc(&self, desc: &mut PipelineStateDesc) {
        desc.graphics.vs = Some(self.vertex_shader);
        desc.graphics.ps = Some(self.pixel_shader);
    }

    /// Binds every constant buffer as a static variable of `pso`.
    pub fn bind(&self, device: &mut dyn RenderDevice, pso: PipelineStateHandle) -> Result<()> {
        for c in &self.constants {
            device.set_static_variable(
                pso,
                c.stages,
                &c.name,
                ResourceView::ConstantBuffer(c.buffer),
            )?;
        }
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&ShaderConstant> {
        self.constants.iter().find(|c| c.name == name)
    }
}
