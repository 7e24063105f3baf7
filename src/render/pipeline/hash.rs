//! Structural hash of pipeline-state descriptors.
//!
//! Field order is part of the contract: changing it changes every cache key.
//!
//! | Structure            | Order                                                                                 |
//! |----------------------|---------------------------------------------------------------------------------------|
//! | resource layout      | default variable type, variables (stages, name, type), static samplers                |
//! | blend                | alpha-to-coverage, independent blend, every render target                             |
//! | render-target blend  | blend enable, logic op enable, src/dest/op, alpha src/dest/op, logic op, write mask   |
//! | rasterizer           | fill, cull, front CCW, depth clip, scissor, AA line, bias, bias clamp, slope bias     |
//! | depth-stencil        | depth enable/write/func, stencil enable, read/write masks, front face, back face      |
//! | stencil face         | fail, depth-fail, pass, func                                                          |
//! | layout element       | input index, slot, format, offset, stride, frequency, step rate                       |
//! | graphics             | VS, PS, DS, HS, GS, blend, sample mask, rasterizer, depth-stencil, input layout,      |
//! |                      | topology, viewports, RT count, RT formats, depth format, sample count/quality, node mask |
//! | pipeline state       | type, SRB granularity, queue mask, resource layout, graphics or compute               |

use crate::core::hash::{
    StructuralHash, hash_combine, hash_combine_f32, hash_combine_nested, hash_combine_slice,
};
use crate::render::pipeline::desc::{
    BlendStateDesc, ComputePipelineDesc, DepthStencilStateDesc, GraphicsPipelineDesc,
    InputLayoutDesc, LayoutElement, PipelineResourceLayoutDesc, PipelineStateDesc, PipelineType,
    RasterizerStateDesc, RenderTargetBlendDesc, SamplerDesc, ShaderVariableDesc, StaticSamplerDesc,
    StencilOpDesc,
};

// ─── Resource Layout ─────────────────────────────────────────────────────────

impl StructuralHash for ShaderVariableDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.stages);
        hash_combine(&mut seed, &*self.name);
        hash_combine(&mut seed, &self.variable_type);
        seed
    }
}

impl StructuralHash for SamplerDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.min_filter);
        hash_combine(&mut seed, &self.mag_filter);
        hash_combine(&mut seed, &self.mip_filter);
        hash_combine(&mut seed, &self.address_u);
        hash_combine(&mut seed, &self.address_v);
        hash_combine(&mut seed, &self.address_w);
        hash_combine_f32(&mut seed, self.mip_lod_bias);
        hash_combine(&mut seed, &self.max_anisotropy);
        hash_combine(&mut seed, &self.comparison);
        for c in self.border_color {
            hash_combine_f32(&mut seed, c);
        }
        hash_combine_f32(&mut seed, self.min_lod);
        hash_combine_f32(&mut seed, self.max_lod);
        seed
    }
}

impl StructuralHash for StaticSamplerDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.stages);
        hash_combine(&mut seed, &*self.texture_name);
        hash_combine_nested(&mut seed, &self.sampler);
        seed
    }
}

impl StructuralHash for PipelineResourceLayoutDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.default_variable_type);
        hash_combine_slice(&mut seed, &self.variables);
        hash_combine_slice(&mut seed, &self.static_samplers);
        seed
    }
}

// ─── Blend ───────────────────────────────────────────────────────────────────

impl StructuralHash for RenderTargetBlendDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.blend_enable);
        hash_combine(&mut seed, &self.logic_operation_enable);
        hash_combine(&mut seed, &self.src_blend);
        hash_combine(&mut seed, &self.dest_blend);
        hash_combine(&mut seed, &self.blend_op);
        hash_combine(&mut seed, &self.src_blend_alpha);
        hash_combine(&mut seed, &self.dest_blend_alpha);
        hash_combine(&mut seed, &self.blend_op_alpha);
        hash_combine(&mut seed, &self.logic_op);
        hash_combine(&mut seed, &self.write_mask.bits());
        seed
    }
}

impl StructuralHash for BlendStateDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.alpha_to_coverage);
        hash_combine(&mut seed, &self.independent_blend);
        for rt in &self.render_targets {
            hash_combine_nested(&mut seed, rt);
        }
        seed
    }
}

// ─── Rasterizer / Depth-Stencil ──────────────────────────────────────────────

impl StructuralHash for RasterizerStateDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.fill_mode);
        hash_combine(&mut seed, &self.cull_mode);
        hash_combine(&mut seed, &self.front_counter_clockwise);
        hash_combine(&mut seed, &self.depth_clip_enable);
        hash_combine(&mut seed, &self.scissor_enable);
        hash_combine(&mut seed, &self.antialiased_line_enable);
        hash_combine(&mut seed, &self.depth_bias);
        hash_combine_f32(&mut seed, self.depth_bias_clamp);
        hash_combine_f32(&mut seed, self.slope_scaled_depth_bias);
        seed
    }
}

impl StructuralHash for StencilOpDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.fail_op);
        hash_combine(&mut seed, &self.depth_fail_op);
        hash_combine(&mut seed, &self.pass_op);
        hash_combine(&mut seed, &self.func);
        seed
    }
}

impl StructuralHash for DepthStencilStateDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.depth_enable);
        hash_combine(&mut seed, &self.depth_write_enable);
        hash_combine(&mut seed, &self.depth_func);
        hash_combine(&mut seed, &self.stencil_enable);
        hash_combine(&mut seed, &self.stencil_read_mask);
        hash_combine(&mut seed, &self.stencil_write_mask);
        hash_combine_nested(&mut seed, &self.front_face);
        hash_combine_nested(&mut seed, &self.back_face);
        seed
    }
}

// ─── Input Layout ────────────────────────────────────────────────────────────

impl StructuralHash for LayoutElement {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.input_index);
        hash_combine(&mut seed, &self.buffer_slot);
        hash_combine(&mut seed, &self.format);
        hash_combine(&mut seed, &self.relative_offset);
        hash_combine(&mut seed, &self.stride);
        hash_combine(&mut seed, &self.frequency);
        hash_combine(&mut seed, &self.instance_step_rate);
        seed
    }
}

impl StructuralHash for InputLayoutDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine_slice(&mut seed, &self.elements);
        seed
    }
}

// ─── Graphics / Compute ──────────────────────────────────────────────────────

impl StructuralHash for GraphicsPipelineDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.vs);
        hash_combine(&mut seed, &self.ps);
        hash_combine(&mut seed, &self.ds);
        hash_combine(&mut seed, &self.hs);
        hash_combine(&mut seed, &self.gs);
        hash_combine_nested(&mut seed, &self.blend);
        hash_combine(&mut seed, &self.sample_mask);
        hash_combine_nested(&mut seed, &self.rasterizer);
        hash_combine_nested(&mut seed, &self.depth_stencil);
        hash_combine_nested(&mut seed, &self.input_layout);
        hash_combine(&mut seed, &self.primitive_topology);
        hash_combine(&mut seed, &self.num_viewports);
        hash_combine(&mut seed, &self.render_target_formats.len());
        for format in &self.render_target_formats {
            hash_combine(&mut seed, format);
        }
        hash_combine(&mut seed, &self.depth_format);
        hash_combine(&mut seed, &self.sample.count);
        hash_combine(&mut seed, &self.sample.quality);
        hash_combine(&mut seed, &self.node_mask);
        seed
    }
}

impl StructuralHash for ComputePipelineDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.cs);
        seed
    }
}

impl StructuralHash for PipelineStateDesc {
    fn structural_hash(&self) -> u64 {
        let mut seed = 0;
        hash_combine(&mut seed, &self.pipeline_type);
        hash_combine(&mut seed, &self.srb_allocation_granularity);
        hash_combine(&mut seed, &self.command_queue_mask);
        hash_combine_nested(&mut seed, &self.resource_layout);
        match self.pipeline_type {
            PipelineType::Graphics => hash_combine_nested(&mut seed, &self.graphics),
            PipelineType::Compute => hash_combine_nested(&mut seed, &self.compute),
        }
        seed
    }
}
