//! Materials
//!
//! A [`Material`] contributes its fragment of the pipeline-state descriptor,
//! binds its resources once per pipeline / shader resource binding, and
//! uploads its parameters before drawing. The scene manager calls
//! [`Material::prepare_for_render`] only when the material differs from the
//! one used by the previous draw.

pub mod common;
pub mod diffuse;
pub mod library;
pub mod shader_program;
pub mod unlit;

use std::sync::Arc;

pub use common::{COMMON_CONSTANTS_VS, CommonConstantsVs};
pub use diffuse::DiffuseMaterial;
pub use library::ShaderLibrary;
pub use shader_program::ShaderProgram;
pub use unlit::UnlitMaterial;

use crate::errors::Result;
use crate::render::{
    DeviceContext, PipelineStateDesc, PipelineStateHandle, RenderDevice,
    ShaderResourceBindingHandle,
};

pub trait Material {
    /// Program whose `CommonConstantsVS` buffer receives the per-draw
    /// transforms.
    fn shader_program(&self) -> &ShaderProgram;

    /// Fills in the shader stages and any state this material owns.
    fn setup_pso_desc(&self, desc: &mut PipelineStateDesc) {
        self.shader_program().setup_pso_desc(desc);
    }

    /// Called once for every newly resolved pipeline-state object.
    fn bind_pso(&self, device: &mut dyn RenderDevice, pso: PipelineStateHandle) -> Result<()> {
        self.shader_program().bind(device, pso)
    }

    /// Called once for every newly created shader resource binding.
    fn bind_srb(
        &self,
        _device: &mut dyn RenderDevice,
        _srb: ShaderResourceBindingHandle,
    ) -> Result<()> {
        Ok(())
    }

    /// Uploads per-material parameters before a run of draws.
    fn prepare_for_render(&self, _context: &mut dyn DeviceContext) -> Result<()> {
        Ok(())
    }
}

/// Identity comparison of two shared materials.
#[inline]
#[must_use]
pub fn same_material(a: &Arc<dyn Material>, b: &Arc<dyn Material>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
