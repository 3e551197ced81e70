//! Transform and TransformGraph tests
//!
//! Tests for:
//! - Transform TRS helpers (euler, look_at, matrix decomposition)
//! - Hierarchical propagation through the graph
//! - Dirty tracking and the read-after-traverse contract
//! - Re-parenting that preserves world placement
//! - Cycle rejection and subtree removal

use glam::{Affine3A, EulerRot, Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use vesper::errors::VesperError;
use vesper::scene::{Transform, TransformGraph};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

fn translation(x: f32, y: f32, z: f32) -> Affine3A {
    Affine3A::from_translation(Vec3::new(x, y, z))
}

// ============================================================================
// Transform Unit Tests
// ============================================================================

#[test]
fn transform_default_is_identity() {
    let t = Transform::new();
    assert_eq!(t.position, Vec3::ZERO);
    assert_eq!(t.rotation, Quat::IDENTITY);
    assert_eq!(t.scale, Vec3::ONE);
    assert_eq!(t.matrix(), Affine3A::IDENTITY);
}

#[test]
fn transform_matrix_reflects_trs() {
    let t = Transform::from_translation(Vec3::new(10.0, 20.0, 30.0)).with_scale(Vec3::splat(2.0));
    let mat = t.matrix();
    assert!(vec3_approx(mat.translation.into(), Vec3::new(10.0, 20.0, 30.0)));
    assert!(vec3_approx(mat.transform_vector3(Vec3::X), Vec3::new(2.0, 0.0, 0.0)));
}

#[test]
fn transform_euler_roundtrip() {
    let mut t = Transform::new();
    let (x, y, z) = (0.3, 0.7, 1.2);
    t.set_rotation_euler(x, y, z);

    let euler = t.rotation_euler();
    assert!(approx_eq(euler.x, x));
    assert!(approx_eq(euler.y, y));
    assert!(approx_eq(euler.z, z));
}

#[test]
fn transform_euler_with_order() {
    let mut t = Transform::new();
    t.set_rotation_euler_with_order(0.5, 0.3, 0.1, EulerRot::YXZ);
    assert!((t.rotation.length() - 1.0).abs() < 1e-4);
    assert_ne!(t.rotation, Quat::IDENTITY);
}

#[test]
fn transform_look_at_basic() {
    let mut t = Transform::new();
    t.look_at(Vec3::new(0.0, 0.0, -10.0), Vec3::Y);

    let forward = -t.matrix().z_axis;
    assert!(vec3_approx(forward.into(), Vec3::NEG_Z));
}

#[test]
fn transform_look_at_collinear_up_noop() {
    let mut t = Transform::new();
    t.look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::Y);
    assert_eq!(t.rotation, Quat::IDENTITY);
}

#[test]
fn transform_from_matrix_decomposition() {
    let original_pos = Vec3::new(5.0, -3.0, 7.0);
    let original_rot = Quat::from_rotation_y(FRAC_PI_4);
    let original_scale = Vec3::new(2.0, 3.0, 1.5);
    let mat = Affine3A::from_scale_rotation_translation(original_scale, original_rot, original_pos);

    let t = Transform::from_matrix(&mat);
    assert!(vec3_approx(t.position, original_pos));
    assert!(vec3_approx(t.scale, original_scale));
    assert!(t.rotation.angle_between(original_rot) < 1e-4);
}

// ============================================================================
// Propagation
// ============================================================================

#[test]
fn three_level_chain_accumulates_translation() {
    let mut graph = TransformGraph::new();
    let root = graph.create_node_with(translation(1.0, 0.0, 0.0), Affine3A::IDENTITY);
    let mid = graph
        .add_child(root, translation(1.0, 0.0, 0.0), Affine3A::IDENTITY)
        .unwrap();
    let leaf = graph
        .add_child(mid, translation(1.0, 0.0, 0.0), Affine3A::IDENTITY)
        .unwrap();

    graph.traverse_all();

    assert!(vec3_approx(graph.world_position(root), Vec3::new(1.0, 0.0, 0.0)));
    assert!(vec3_approx(graph.world_position(mid), Vec3::new(2.0, 0.0, 0.0)));
    assert!(vec3_approx(graph.world_position(leaf), Vec3::new(3.0, 0.0, 0.0)));
}

#[test]
fn parent_rotation_carries_children() {
    let mut graph = TransformGraph::new();
    let root = graph.create_node_with(Affine3A::from_rotation_y(FRAC_PI_2), Affine3A::IDENTITY);
    let child = graph
        .add_child(root, translation(1.0, 0.0, 0.0), Affine3A::IDENTITY)
        .unwrap();

    graph.traverse_all();

    // +X rotated a quarter turn about +Y lands on -Z.
    assert!(vec3_approx(graph.world_position(child), Vec3::new(0.0, 0.0, -1.0)));
}

#[test]
fn global_applies_after_local() {
    let mut graph = TransformGraph::new();
    let node = graph.create_node_with(Affine3A::from_rotation_y(FRAC_PI_2), translation(5.0, 0.0, 0.0));
    graph.traverse_all();

    let total = graph.total(node);
    // Rotation happens about the node's own origin, then the pivot offset.
    assert!(vec3_approx(total.transform_point3(Vec3::ZERO), Vec3::new(5.0, 0.0, 0.0)));
    assert!(vec3_approx(total.transform_point3(Vec3::X), Vec3::new(5.0, 0.0, -1.0)));
}

#[test]
fn editing_mid_node_updates_leaf_only_below() {
    let mut graph = TransformGraph::new();
    let root = graph.create_node_with(translation(1.0, 0.0, 0.0), Affine3A::IDENTITY);
    let mid = graph
        .add_child(root, translation(0.0, 1.0, 0.0), Affine3A::IDENTITY)
        .unwrap();
    let leaf = graph
        .add_child(mid, translation(0.0, 0.0, 1.0), Affine3A::IDENTITY)
        .unwrap();
    graph.traverse_all();

    graph.set_local(mid, translation(0.0, 4.0, 0.0)).unwrap();
    assert!(!graph.is_dirty(root));
    assert!(graph.is_dirty(mid));
    assert!(graph.is_dirty(leaf));

    graph.traverse_all();
    assert!(vec3_approx(graph.world_position(leaf), Vec3::new(1.0, 4.0, 1.0)));
    assert!(!graph.is_dirty(leaf));
}

#[test]
fn update_local_edits_in_place() {
    let mut graph = TransformGraph::new();
    let node = graph.create_node_with(translation(1.0, 0.0, 0.0), Affine3A::IDENTITY);
    graph
        .update_local(node, |local| local.translation.x += 2.0)
        .unwrap();
    graph.traverse_all();
    assert!(vec3_approx(graph.world_position(node), Vec3::new(3.0, 0.0, 0.0)));
}

// ============================================================================
// Dirty Contract
// ============================================================================

#[test]
#[should_panic(expected = "dirty")]
fn reading_dirty_total_panics() {
    let mut graph = TransformGraph::new();
    let root = graph.create_node();
    let child = graph
        .add_child(root, Affine3A::IDENTITY, Affine3A::IDENTITY)
        .unwrap();
    graph.traverse_all();

    graph.set_local(root, translation(1.0, 0.0, 0.0)).unwrap();
    let _ = graph.total(child);
}

#[test]
fn try_total_reports_dirty_as_none() {
    let mut graph = TransformGraph::new();
    let node = graph.create_node();
    assert!(graph.try_total(node).is_none());
    graph.traverse_all();
    assert!(graph.try_total(node).is_some());
}

#[test]
#[should_panic(expected = "dirty")]
fn traversing_below_a_dirty_parent_panics() {
    let mut graph = TransformGraph::new();
    let root = graph.create_node();
    let child = graph
        .add_child(root, Affine3A::IDENTITY, Affine3A::IDENTITY)
        .unwrap();
    graph.traverse(child);
}

// ============================================================================
// Re-parenting
// ============================================================================

#[test]
fn reparent_preserves_world_placement() {
    let mut graph = TransformGraph::new();
    let a = graph.create_node_with(
        Affine3A::from_rotation_y(FRAC_PI_4),
        translation(10.0, 0.0, 0.0),
    );
    let b = graph.create_node_with(Affine3A::from_rotation_z(FRAC_PI_2), translation(0.0, 5.0, 0.0));
    let c = graph
        .add_child(a, translation(2.0, 0.0, 0.0), translation(0.0, 1.0, 0.0))
        .unwrap();
    graph.traverse_all();
    let before = *graph.total(c);

    graph.set_parent(c, Some(b)).unwrap();
    assert_eq!(graph.parent(c), Some(b));
    assert!(graph.children(a).is_empty());
    graph.traverse_all();

    let after = *graph.total(c);
    assert!(after.abs_diff_eq(before, EPSILON));
}

#[test]
fn reparent_to_root_preserves_world_placement() {
    let mut graph = TransformGraph::new();
    let a = graph.create_node_with(Affine3A::IDENTITY, translation(3.0, 0.0, 0.0));
    let c = graph
        .add_child(a, translation(1.0, 2.0, 0.0), Affine3A::IDENTITY)
        .unwrap();
    graph.traverse_all();
    let before = graph.world_position(c);

    graph.set_parent(c, None).unwrap();
    assert!(graph.roots().contains(&c));
    graph.traverse_all();
    assert!(vec3_approx(graph.world_position(c), before));
}

#[test]
fn reparent_uses_fresh_ancestor_worlds() {
    let mut graph = TransformGraph::new();
    let a = graph.create_node();
    let b = graph.create_node();
    let c = graph
        .add_child(a, translation(1.0, 0.0, 0.0), Affine3A::IDENTITY)
        .unwrap();
    graph.traverse_all();

    // Edit without traversing: the cached totals are stale.
    graph.set_local(a, translation(0.0, 7.0, 0.0)).unwrap();
    let expected = graph.compute_world(c);

    graph.set_parent(c, Some(b)).unwrap();
    graph.traverse_all();
    assert!(vec3_approx(graph.world_position(c), expected.translation.into()));
    assert!(vec3_approx(graph.world_position(c), Vec3::new(1.0, 7.0, 0.0)));
}

#[test]
fn reparent_into_own_subtree_is_rejected() {
    let mut graph = TransformGraph::new();
    let root = graph.create_node();
    let mid = graph
        .add_child(root, Affine3A::IDENTITY, Affine3A::IDENTITY)
        .unwrap();
    let leaf = graph
        .add_child(mid, Affine3A::IDENTITY, Affine3A::IDENTITY)
        .unwrap();

    let err = graph.set_parent(root, Some(leaf)).unwrap_err();
    assert!(matches!(err, VesperError::InvalidHierarchy(_)));
    let err = graph.set_parent(mid, Some(mid)).unwrap_err();
    assert!(matches!(err, VesperError::InvalidHierarchy(_)));

    // Nothing moved.
    assert_eq!(graph.parent(leaf), Some(mid));
    assert_eq!(graph.parent(root), None);
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn removed_handles_stop_resolving() {
    let mut graph = TransformGraph::new();
    let root = graph.create_node();
    let child = graph
        .add_child(root, Affine3A::IDENTITY, Affine3A::IDENTITY)
        .unwrap();
    let other = graph.create_node();

    assert!(graph.remove_node(root));
    assert_eq!(graph.len(), 1);
    assert!(!graph.contains(child));
    assert!(matches!(
        graph.set_local(child, Affine3A::IDENTITY),
        Err(VesperError::MissingNode)
    ));
    assert!(matches!(
        graph.set_parent(other, Some(root)),
        Err(VesperError::MissingNode)
    ));
    assert!(graph.try_total(child).is_none());
}
