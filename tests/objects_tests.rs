//! Built-in object tests
//!
//! Tests for:
//! - ManualObject sections: layout, buffers, cascading attach/detach/destroy
//! - GeometryObject interleaving and count validation
//! - GeometryObject drawn with the diffuse material

mod common;

use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};
use prism::PrismError;
use prism::material::{DiffuseMaterial, Material};
use prism::objects::{Geometry, GeometryObject, ManualObject};
use prism::render::pipeline::LayoutElement;
use prism::scene::{RenderOrder, Renderable};

use common::{Command, new_manager, unlit};

// ============================================================================
// ManualObject
// ============================================================================

#[test]
fn manual_section_layout_follows_first_vertex() {
    let (mut manager, log) = new_manager();
    let material = unlit(&mut manager);
    let (graph, device) = manager.graph_and_device();

    let mut object = ManualObject::new();
    object.set_render_order(RenderOrder::new(3, 1));
    object.begin(material, wgpu::PrimitiveTopology::TriangleList);
    for (p, uv) in [(Vec3::ZERO, Vec2::ZERO), (Vec3::X, Vec2::X), (Vec3::Y, Vec2::Y)] {
        object.position(p);
        object.color(Vec4::ONE);
        object.texture_coord(uv);
    }
    object.triangle(0, 1, 2);
    let section = object.end(graph, device).unwrap();

    let renderable = graph.cast::<Renderable>(section).unwrap();
    assert_eq!(
        renderable.input_layout().elements,
        vec![
            LayoutElement::new(0, wgpu::VertexFormat::Float32x3),
            LayoutElement::new(2, wgpu::VertexFormat::Float32x4),
            LayoutElement::new(3, wgpu::VertexFormat::Float32x2),
        ]
    );
    assert_eq!(renderable.index_count(), 3);
    assert_eq!(renderable.render_order(), RenderOrder::new(3, 1));
    assert_eq!(renderable.rasterizer().cull_mode, None);
    assert!(renderable.rasterizer().front_counter_clockwise);

    let log = log.borrow();
    let (name, data) = &log.buffers[&renderable.vertex_buffer().unwrap()];
    assert_eq!(name, "ManualObject vertex buffer");
    // 3 vertices * (3 + 4 + 2) floats
    assert_eq!(data.len(), 3 * 9 * 4);
    let floats: Vec<f32> = bytemuck::pod_collect_to_vec(data);
    assert_eq!(&floats[9..12], &[1.0, 0.0, 0.0]);
    assert_eq!(&floats[16..18], &[1.0, 0.0]);
}

#[test]
fn manual_sections_follow_owner() {
    let (mut manager, _log) = new_manager();
    let material = unlit(&mut manager);
    let root = manager.root();
    let (graph, device) = manager.graph_and_device();

    let mut object = ManualObject::new();
    for _ in 0..2 {
        object.begin(material.clone(), wgpu::PrimitiveTopology::TriangleList);
        object.position(Vec3::ZERO);
        object.position(Vec3::X);
        object.position(Vec3::Y);
        object.triangle(0, 1, 2);
        object.end(graph, device).unwrap();
    }
    let sections = object.sections().to_vec();

    let node = graph.create_child(root);
    let handle = graph.add_object(object);
    graph.attach(node, handle);
    for &s in &sections {
        assert_eq!(graph.object_node(s), Some(node));
    }

    let stats = manager.render().unwrap();
    assert_eq!(stats.draw_calls, 2);

    let graph = manager.graph_mut();
    graph.detach(node, handle);
    assert!(graph[node].objects().is_empty());

    graph.attach(node, handle);
    assert!(graph.destroy_object(handle));
    for &s in &sections {
        assert!(!graph.contains_object(s));
    }
    assert!(graph[node].objects().is_empty());
}

#[test]
fn section_ended_while_attached_is_attached() {
    let (mut manager, _log) = new_manager();
    let material = unlit(&mut manager);
    let root = manager.root();
    let (graph, device) = manager.graph_and_device();

    let node = graph.create_child(root);
    let handle = graph.add_object(ManualObject::new());
    graph.attach(node, handle);

    let section = graph
        .with_object_mut::<ManualObject, _>(handle, |object, graph| {
            object.begin(material, wgpu::PrimitiveTopology::PointList);
            object.position(Vec3::ZERO);
            object.index(0);
            object.end(graph, device)
        })
        .unwrap()
        .unwrap();

    assert_eq!(graph.object_node(section), Some(node));

    graph
        .with_object_mut::<ManualObject, _>(handle, |object, graph| object.clear(graph))
        .unwrap();
    assert!(!graph.contains_object(section));
    assert_eq!(graph[node].objects(), &[handle]);
}

#[test]
#[should_panic(expected = "is checked out")]
fn owner_cannot_be_detached_while_checked_out() {
    let (mut manager, _log) = new_manager();
    let material = unlit(&mut manager);
    let root = manager.root();
    let (graph, device) = manager.graph_and_device();

    let node = graph.create_child(root);
    let handle = graph.add_object(ManualObject::new());
    graph.attach(node, handle);

    graph.with_object_mut::<ManualObject, _>(handle, |object, graph| {
        object.begin(material, wgpu::PrimitiveTopology::PointList);
        object.position(Vec3::ZERO);
        object.index(0);
        object.end(graph, device).unwrap();
        // The sections would stay attached without the owner's hook.
        graph.detach_from_node(handle);
    });
}

#[test]
fn inconsistent_vertices_are_rejected() {
    let (mut manager, _log) = new_manager();
    let material = unlit(&mut manager);
    let (graph, device) = manager.graph_and_device();

    let mut object = ManualObject::new();
    object.begin(material, wgpu::PrimitiveTopology::TriangleList);
    object.position(Vec3::ZERO);
    object.normal(Vec3::Z);
    object.position(Vec3::X);
    object.position(Vec3::Y);
    object.normal(Vec3::Z);

    let err = object.end(graph, device).unwrap_err();
    assert!(matches!(err, PrismError::InconsistentVertexLayout { index: 1 }));
    assert!(object.sections().is_empty());
}

#[test]
#[should_panic(expected = "must be called before position()")]
fn vertex_before_begin_panics() {
    let mut object = ManualObject::new();
    object.position(Vec3::ZERO);
}

#[test]
#[should_panic(expected = "must follow position()")]
fn attribute_before_position_panics() {
    let (mut manager, _log) = new_manager();
    let material = unlit(&mut manager);
    let mut object = ManualObject::new();
    object.begin(material, wgpu::PrimitiveTopology::TriangleList);
    object.color(Vec4::ONE);
}

// ============================================================================
// GeometryObject
// ============================================================================

#[test]
fn geometry_object_interleaves_and_culls_back_faces() {
    let (mut manager, log) = new_manager();
    let material = unlit(&mut manager);
    let cube = Geometry::cuboid(1.0, 1.0, 1.0);
    let colors = vec![Vec4::new(1.0, 0.0, 0.0, 1.0); cube.vertex_count()];

    let renderable =
        GeometryObject::build(manager.device_mut(), &cube, Some(colors.as_slice()), material).unwrap();

    assert_eq!(renderable.index_count(), 36);
    assert_eq!(renderable.rasterizer().cull_mode, Some(wgpu::Face::Back));
    assert!(renderable.rasterizer().front_counter_clockwise);
    assert_eq!(renderable.input_layout().packed_stride(), 40);

    let log = log.borrow();
    let (_, data) = &log.buffers[&renderable.vertex_buffer().unwrap()];
    assert_eq!(data.len(), 24 * 40);
    let floats: Vec<f32> = bytemuck::pod_collect_to_vec(data);
    assert_eq!(&floats[6..10], &[1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn geometry_count_mismatch_is_an_error() {
    let (mut manager, log) = new_manager();
    let material = unlit(&mut manager);
    let buffers_before = log.borrow().buffers.len();

    let mut geometry = Geometry::cuboid(1.0, 1.0, 1.0);
    geometry.normals.pop();
    let err = GeometryObject::build(manager.device_mut(), &geometry, None, material.clone())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        PrismError::VertexCountMismatch { attribute: "normal", expected: 24, actual: 23 }
    ));

    let geometry = Geometry::cuboid(1.0, 1.0, 1.0);
    let colors = vec![Vec4::ONE; 3];
    let err = GeometryObject::build(manager.device_mut(), &geometry, Some(colors.as_slice()), material)
        .err()
        .unwrap();
    assert!(matches!(err, PrismError::VertexCountMismatch { attribute: "color", .. }));

    assert_eq!(log.borrow().buffers.len(), buffers_before);
}

#[test]
fn geometry_object_draws_with_diffuse_material() {
    let (mut manager, log) = new_manager();
    let (device, library) = manager.material_resources();
    let diffuse = Arc::new(DiffuseMaterial::new(device, library).unwrap());
    diffuse.set_color(Vec4::new(0.2, 0.4, 0.6, 1.0));
    let material: Arc<dyn Material> = diffuse.clone();

    let cube = Geometry::cuboid(2.0, 2.0, 2.0);
    let renderable = GeometryObject::build(manager.device_mut(), &cube, None, material).unwrap();
    let root = manager.root();
    let graph = manager.graph_mut();
    let node = graph.create_child(root);
    graph[node].set_position(Vec3::new(0.0, 0.0, -5.0));
    let object = graph.add_object(renderable);
    graph.attach(node, object);

    let stats = manager.render().unwrap();
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.material_prepares, 1);

    let log = log.borrow();
    assert!(log.commands.contains(&Command::DrawIndexed { num_indices: 36 }));

    let desc = &log.pipelines[0];
    assert_eq!(desc.graphics.vs, Some(diffuse.program().vertex_shader()));
    assert_eq!(
        desc.graphics.input_layout.elements,
        vec![
            LayoutElement::new(0, wgpu::VertexFormat::Float32x3),
            LayoutElement::new(1, wgpu::VertexFormat::Float32x3),
        ]
    );

    // Material block: color, then the world-space light direction.
    let material_block = diffuse.program().constant_buffer("Material").unwrap();
    let upload = log
        .commands
        .iter()
        .find_map(|c| match c {
            Command::UpdateBuffer { buffer, data } if *buffer == material_block => {
                Some(bytemuck::pod_collect_to_vec::<u8, f32>(data))
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(upload, vec![0.2, 0.4, 0.6, 1.0, -1.0, -1.0, -1.0, 0.0]);
}
