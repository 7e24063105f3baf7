//! Material, shader program and settings tests
//!
//! Tests for:
//! - Program sharing through the shader library and weak release
//! - Typed constant buffers
//! - Unlit material pipeline contributions and bindings
//! - Scene settings deserialization

mod common;

use std::sync::Arc;

use glam::{Mat4, Vec4};
use prism::PrismError;
use prism::material::{
    COMMON_CONSTANTS_VS, CommonConstantsVs, DiffuseMaterial, Material, ShaderLibrary, ShaderProgram,
    UnlitMaterial, same_material,
};
use prism::render::pipeline::ShaderVariableType;
use prism::render::{
    PipelineStateDesc, PipelineStateHandle, ResourceView, ShaderResourceBindingHandle,
    SwapChainDesc, TextureHandle,
};
use prism::scene::{SceneManager, SceneSettings};

use common::{Command, MockContext, MockDevice, new_log, new_manager};

// ============================================================================
// Shader library
// ============================================================================

#[test]
fn materials_of_one_kind_share_a_program() {
    let log = new_log();
    let mut device = MockDevice::new(1, log.clone());
    let mut library = ShaderLibrary::new();

    let a = UnlitMaterial::new(&mut device, &mut library).unwrap();
    let b = UnlitMaterial::new(&mut device, &mut library).unwrap();

    assert!(Arc::ptr_eq(a.program(), b.program()));
    assert_eq!(log.borrow().shaders.len(), 2);
    assert_eq!(library.live_count(), 1);
}

#[test]
fn textured_variant_is_a_separate_program() {
    let log = new_log();
    let mut device = MockDevice::new(1, log.clone());
    let mut library = ShaderLibrary::new();

    let plain = UnlitMaterial::new(&mut device, &mut library).unwrap();
    let textured = UnlitMaterial::with_texture(&mut device, &mut library, TextureHandle::new(9)).unwrap();

    assert!(!Arc::ptr_eq(plain.program(), textured.program()));
    assert_eq!(library.live_count(), 2);
}

#[test]
fn programs_are_released_with_their_last_material() {
    let log = new_log();
    let mut device = MockDevice::new(1, log.clone());
    let mut library = ShaderLibrary::new();

    let material = UnlitMaterial::new(&mut device, &mut library).unwrap();
    drop(material);
    assert_eq!(library.live_count(), 0);
    library.purge();

    let _again = UnlitMaterial::new(&mut device, &mut library).unwrap();
    assert_eq!(log.borrow().shaders.len(), 4);
}

#[test]
fn programs_are_per_device() {
    let log = new_log();
    let mut first = MockDevice::new(1, log.clone());
    let mut second = MockDevice::new(2, log.clone());
    let mut library = ShaderLibrary::new();

    let a = UnlitMaterial::new(&mut first, &mut library).unwrap();
    let b = UnlitMaterial::new(&mut second, &mut library).unwrap();

    assert!(!Arc::ptr_eq(a.program(), b.program()));
    assert_eq!(library.live_count(), 2);
}

#[test]
fn diffuse_materials_share_their_own_program() {
    let log = new_log();
    let mut device = MockDevice::new(1, log.clone());
    let mut library = ShaderLibrary::new();

    let a = DiffuseMaterial::new(&mut device, &mut library).unwrap();
    let b = DiffuseMaterial::new(&mut device, &mut library).unwrap();
    let unlit = UnlitMaterial::new(&mut device, &mut library).unwrap();

    assert!(Arc::ptr_eq(a.program(), b.program()));
    assert!(!Arc::ptr_eq(a.program(), unlit.program()));
    assert_eq!(library.live_count(), 2);
    assert_eq!(
        log.borrow().shaders[..2],
        ["DiffuseMaterial_vs".to_owned(), "DiffuseMaterial_ps".to_owned()]
    );
    assert!(a.program().constant_buffer(COMMON_CONSTANTS_VS).is_some());
}

// ============================================================================
// Constants
// ============================================================================

#[test]
fn constant_writes_are_type_checked() {
    let log = new_log();
    let mut device = MockDevice::new(1, log.clone());
    let mut context = MockContext::new(log.clone());

    let mut program = ShaderProgram::compile(&mut device, "test", "vs", "ps").unwrap();
    let buffer = program
        .declare_constant::<CommonConstantsVs>(&mut device, COMMON_CONSTANTS_VS, wgpu::ShaderStages::VERTEX)
        .unwrap();
    assert_eq!(program.constant_buffer(COMMON_CONSTANTS_VS), Some(buffer));

    let value = CommonConstantsVs {
        world_view_proj: Mat4::IDENTITY,
        world_view: Mat4::IDENTITY,
        view: Mat4::IDENTITY,
    };
    program
        .write_constant(&mut context, COMMON_CONSTANTS_VS, &value)
        .unwrap();
    assert!(matches!(
        log.borrow().commands.last(),
        Some(Command::UpdateBuffer { buffer: b, data }) if *b == buffer && data.len() == 192
    ));

    let err = program
        .write_constant(&mut context, COMMON_CONSTANTS_VS, &Vec4::ONE)
        .unwrap_err();
    assert!(matches!(err, PrismError::ConstantTypeMismatch { .. }));

    let err = program.write_constant(&mut context, "Missing", &value).unwrap_err();
    assert!(matches!(err, PrismError::ConstantNotFound(name) if name == "Missing"));
}

#[test]
fn program_binds_its_constants_as_static_variables() {
    let log = new_log();
    let mut device = MockDevice::new(1, log.clone());
    let mut library = ShaderLibrary::new();
    let material = UnlitMaterial::new(&mut device, &mut library).unwrap();

    let pso = PipelineStateHandle::new(77);
    material.bind_pso(&mut device, pso).unwrap();

    let names: Vec<_> = log
        .borrow()
        .static_variables
        .iter()
        .filter(|(p, _)| *p == pso)
        .map(|(_, n)| n.clone())
        .collect();
    assert_eq!(names, vec![COMMON_CONSTANTS_VS.to_owned(), "Material".to_owned()]);
}

// ============================================================================
// Unlit material
// ============================================================================

#[test]
fn unlit_pso_desc_uses_alpha_blending() {
    let log = new_log();
    let mut device = MockDevice::new(1, log.clone());
    let mut library = ShaderLibrary::new();
    let material = UnlitMaterial::new(&mut device, &mut library).unwrap();

    let mut desc = PipelineStateDesc::graphics("unlit");
    material.setup_pso_desc(&mut desc);

    let rt = &desc.graphics.blend.render_targets[0];
    assert!(rt.blend_enable);
    assert_eq!(rt.src_blend, wgpu::BlendFactor::SrcAlpha);
    assert_eq!(rt.dest_blend, wgpu::BlendFactor::OneMinusSrcAlpha);
    assert_eq!(rt.src_blend_alpha, wgpu::BlendFactor::SrcAlpha);
    assert_eq!(desc.graphics.vs, Some(material.shader_program().vertex_shader()));
    assert!(desc.resource_layout.variables.is_empty());
}

#[test]
fn textured_unlit_declares_and_binds_texture() {
    let log = new_log();
    let mut device = MockDevice::new(1, log.clone());
    let mut library = ShaderLibrary::new();
    let texture = TextureHandle::new(5);
    let material = UnlitMaterial::with_texture(&mut device, &mut library, texture).unwrap();

    let mut desc = PipelineStateDesc::graphics("textured");
    material.setup_pso_desc(&mut desc);
    let variable = &desc.resource_layout.variables[0];
    assert_eq!(variable.name, "g_texture");
    assert_eq!(variable.variable_type, ShaderVariableType::Mutable);
    assert_eq!(desc.resource_layout.static_samplers.len(), 1);

    let srb = ShaderResourceBindingHandle::new(3);
    material.bind_srb(&mut device, srb).unwrap();
    assert_eq!(
        log.borrow().binding_variables,
        vec![(srb, "g_texture".to_owned(), ResourceView::Texture(texture))]
    );
}

#[test]
fn color_changes_upload_on_next_prepare() {
    let log = new_log();
    let mut device = MockDevice::new(1, log.clone());
    let mut context = MockContext::new(log.clone());
    let mut library = ShaderLibrary::new();
    let material = UnlitMaterial::new(&mut device, &mut library).unwrap();

    material.set_color(Vec4::new(0.25, 0.5, 0.75, 1.0));
    material.set_opacity(0.5);
    material.prepare_for_render(&mut context).unwrap();

    let log = log.borrow();
    let Some(Command::UpdateBuffer { data, .. }) = log.commands.last() else {
        panic!("no constant upload");
    };
    let floats: Vec<f32> = bytemuck::pod_collect_to_vec(data);
    assert_eq!(&floats[..5], &[0.25, 0.5, 0.75, 1.0, 0.5]);
}

#[test]
fn shared_materials_compare_by_identity() {
    let (mut manager, _log) = new_manager();
    let a = common::unlit(&mut manager);
    let b = common::unlit(&mut manager);
    assert!(same_material(&a, &a.clone()));
    assert!(!same_material(&a, &b));
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn settings_fill_missing_fields_with_defaults() {
    let json = r#"{ "camera": { "far_plane": 0.0 }, "verify_draws": true }"#;
    let settings: SceneSettings = serde_json::from_str(json).unwrap();

    assert!(settings.verify_draws);
    assert_eq!(settings.first_stencil_id, 10);
    assert!(settings.camera.far_plane.abs() < f32::EPSILON);
    assert!((settings.camera.near_plane - 1.0).abs() < f32::EPSILON);
}

#[test]
fn settings_configure_the_manager() {
    let log = new_log();
    let settings = SceneSettings {
        first_stencil_id: 100,
        ..SceneSettings::default()
    };
    let mut manager = SceneManager::with_settings(
        Box::new(MockDevice::new(1, log.clone())),
        Box::new(MockContext::new(log)),
        SwapChainDesc::default(),
        settings,
    );

    assert_eq!(manager.request_stencil_id(), 100);
    assert_eq!(manager.settings().queue_capacity, 16);
    manager.render().unwrap();
}
