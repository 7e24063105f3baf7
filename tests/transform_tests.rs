//! Transform and hierarchy propagation tests
//!
//! Tests for:
//! - Derived matrix composition along parent chains
//! - Disabled subtrees keeping their previous matrices
//! - Reparenting and the next update
//! - look_at orientation
//! - Camera projection through the scene settings

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{Mat4, Quat, Vec3, Vec4};
use prism::scene::{CameraSettings, Frustum, SceneGraph, Transform};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

// ============================================================================
// Propagation
// ============================================================================

#[test]
fn derived_is_parent_times_local() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node();
    let child = graph.create_child(root);
    let grandchild = graph.create_child(child);

    graph[root].set_position(Vec3::new(10.0, 0.0, 0.0));
    graph[child].set_orientation(Quat::from_rotation_y(FRAC_PI_2));
    graph[grandchild].set_position(Vec3::new(0.0, 0.0, 1.0));

    graph.update_transforms(root);

    // +Z rotated a quarter turn about Y points along +X.
    assert!(vec3_approx(graph[grandchild].derived_position(), Vec3::new(11.0, 0.0, 0.0)));

    let expected = Mat4::from(*graph[child].derived_matrix()) * Mat4::from(*graph[grandchild].local_matrix());
    assert!(Mat4::from(*graph[grandchild].derived_matrix()).abs_diff_eq(expected, EPSILON));
}

#[test]
fn scale_propagates_to_children() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node();
    let child = graph.create_child(root);

    graph[root].set_scale(Vec3::splat(2.0));
    graph[child].set_position(Vec3::new(1.0, 1.0, 1.0));
    graph.update_transforms(root);

    assert!(vec3_approx(graph[child].derived_position(), Vec3::splat(2.0)));
}

#[test]
fn disabled_subtree_keeps_previous_matrices() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node();
    let child = graph.create_child(root);
    let grandchild = graph.create_child(child);
    graph[grandchild].set_position(Vec3::X);
    graph.update_transforms(root);

    graph[child].set_enabled(false);
    graph[root].set_position(Vec3::new(0.0, 5.0, 0.0));
    graph.update_transforms(root);

    assert!(vec3_approx(graph[root].derived_position(), Vec3::new(0.0, 5.0, 0.0)));
    assert!(vec3_approx(graph[grandchild].derived_position(), Vec3::X));

    graph[child].set_enabled(true);
    graph.update_transforms(root);
    assert!(vec3_approx(graph[grandchild].derived_position(), Vec3::new(1.0, 5.0, 0.0)));
}

#[test]
fn reparented_node_follows_new_parent() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node();
    let a = graph.create_child(root);
    let b = graph.create_child(root);
    let leaf = graph.create_child(a);

    graph[a].set_position(Vec3::X);
    graph[b].set_position(Vec3::Y);
    graph.update_transforms(root);
    assert!(vec3_approx(graph[leaf].derived_position(), Vec3::X));

    graph.add_child(b, leaf);
    graph.update_transforms(root);
    assert!(vec3_approx(graph[leaf].derived_position(), Vec3::Y));
}

#[test]
fn subtree_update_uses_parent_derived() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node();
    let child = graph.create_child(root);
    graph[root].set_position(Vec3::Z);
    graph.update_transforms(root);

    graph[child].set_position(Vec3::X);
    graph.update_transforms(child);

    assert!(vec3_approx(graph[child].derived_position(), Vec3::new(1.0, 0.0, 1.0)));
}

// ============================================================================
// Rotation helpers
// ============================================================================

#[test]
fn rotate_post_multiplies() {
    let mut t = Transform::new();
    t.rotate_y(FRAC_PI_2);
    t.rotate_x(FRAC_PI_4);
    let expected = Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_x(FRAC_PI_4);
    assert!(t.orientation.abs_diff_eq(expected, EPSILON));
}

#[test]
fn look_at_points_negative_z_at_target() {
    let mut t = Transform::new();
    t.position = Vec3::new(0.0, 0.0, 5.0);
    t.look_at(Vec3::new(5.0, 0.0, 5.0), Vec3::Y);

    let forward = t.orientation * Vec3::NEG_Z;
    assert!(vec3_approx(forward, Vec3::X));
    let up = t.orientation * Vec3::Y;
    assert!(vec3_approx(up, Vec3::Y));
}

#[test]
fn look_at_with_parallel_up_is_ignored() {
    let mut t = Transform::new();
    t.look_at(Vec3::new(0.0, -3.0, 0.0), Vec3::Y);
    assert!(t.orientation.abs_diff_eq(Quat::IDENTITY, EPSILON));
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn camera_settings_build_matching_frustum() {
    let settings = CameraSettings {
        fov: FRAC_PI_2,
        near_plane: 0.5,
        far_plane: 50.0,
        aspect: 1.0,
    };
    let frustum = settings.frustum();
    assert_eq!(frustum.principal, Frustum::default().principal);

    let proj = frustum.projection_matrix();
    let reference = Mat4::perspective_rh_gl(FRAC_PI_2, 1.0, 0.5, 50.0);
    assert!(proj.abs_diff_eq(reference, 1e-4));
}

#[test]
fn point_on_near_plane_maps_to_ndc_minus_one() {
    let proj = Frustum::default().projection_matrix();
    let clip = proj * Vec4::new(0.0, 0.0, -1.0, 1.0);
    assert!((clip.z / clip.w + 1.0).abs() < 1e-4);
}
