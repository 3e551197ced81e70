//! Shape generator tests
//!
//! Tests for:
//! - Vertex / index counts of box, plane and sphere
//! - Index validity and attribute ranges
//! - Rejection of degenerate parameters

use glam::Vec3;
use vesper::errors::VesperError;
use vesper::resources::ResourceDesc;
use vesper::resources::primitives::{MeshData, PlaneOptions, SphereOptions, Vertex, create_box, create_plane, create_sphere};

// ============================================================================
// Helpers
// ============================================================================

const EPSILON: f32 = 1e-4;

fn indices_in_range(mesh: &MeshData) -> bool {
    mesh.indices
        .iter()
        .all(|&i| usize::from(i) < mesh.vertices.len())
}

fn normals_are_unit(mesh: &MeshData) -> bool {
    mesh.vertices
        .iter()
        .all(|v| (Vec3::from(v.normal).length() - 1.0).abs() < EPSILON)
}

fn assert_invalid(result: Result<MeshData, VesperError>, expected_shape: &str) {
    match result {
        Err(VesperError::InvalidShape { shape, .. }) => assert_eq!(shape, expected_shape),
        other => panic!("expected InvalidShape for {expected_shape}, got {other:?}"),
    }
}

// ============================================================================
// Box
// ============================================================================

#[test]
fn box_has_four_vertices_per_face() {
    let mesh = create_box(2.0, 4.0, 6.0).unwrap();
    assert_eq!(mesh.vertices.len(), 24);
    assert_eq!(mesh.index_count(), 36);
    assert!(indices_in_range(&mesh));
    assert!(normals_are_unit(&mesh));
}

#[test]
fn box_extents_match_dimensions() {
    let mesh = create_box(2.0, 4.0, 6.0).unwrap();
    let max = mesh
        .vertices
        .iter()
        .fold(Vec3::splat(f32::MIN), |acc, v| acc.max(Vec3::from(v.position)));
    let min = mesh
        .vertices
        .iter()
        .fold(Vec3::splat(f32::MAX), |acc, v| acc.min(Vec3::from(v.position)));
    assert!((max - Vec3::new(1.0, 2.0, 3.0)).length() < EPSILON);
    assert!((min + Vec3::new(1.0, 2.0, 3.0)).length() < EPSILON);
}

#[test]
fn box_rejects_non_positive_extent() {
    assert_invalid(create_box(0.0, 1.0, 1.0), "box");
    assert_invalid(create_box(1.0, -1.0, 1.0), "box");
    assert_invalid(create_box(1.0, 1.0, f32::NAN), "box");
}

// ============================================================================
// Plane
// ============================================================================

#[test]
fn plane_grid_counts() {
    let mesh = create_plane(&PlaneOptions {
        width: 2.0,
        height: 1.0,
        width_segments: 4,
        height_segments: 3,
    })
    .unwrap();
    assert_eq!(mesh.vertices.len(), 5 * 4);
    assert_eq!(mesh.indices.len(), 4 * 3 * 6);
    assert!(indices_in_range(&mesh));
    assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
}

#[test]
fn plane_uvs_cover_unit_square() {
    let mesh = create_plane(&PlaneOptions::default()).unwrap();
    assert_eq!(mesh.vertices.len(), 4);
    for v in &mesh.vertices {
        assert!((0.0..=1.0).contains(&v.uv[0]));
        assert!((0.0..=1.0).contains(&v.uv[1]));
    }
}

#[test]
fn plane_rejects_zero_segments() {
    assert_invalid(
        create_plane(&PlaneOptions {
            width_segments: 0,
            ..PlaneOptions::default()
        }),
        "plane",
    );
}

#[test]
fn plane_rejects_grids_beyond_sixteen_bit_indices() {
    assert_invalid(
        create_plane(&PlaneOptions {
            width_segments: 300,
            height_segments: 300,
            ..PlaneOptions::default()
        }),
        "plane",
    );
}

#[test]
fn plane_rejects_maximal_segment_counts() {
    assert_invalid(
        create_plane(&PlaneOptions {
            width_segments: u32::MAX,
            ..PlaneOptions::default()
        }),
        "plane",
    );
    assert_invalid(
        create_plane(&PlaneOptions {
            width_segments: u32::MAX,
            height_segments: u32::MAX,
            ..PlaneOptions::default()
        }),
        "plane",
    );
}

// ============================================================================
// Sphere
// ============================================================================

#[test]
fn sphere_counts_follow_segments() {
    let (w, h) = (8u32, 6u32);
    let mesh = create_sphere(&SphereOptions {
        radius: 2.0,
        width_segments: w,
        height_segments: h,
    })
    .unwrap();

    assert_eq!(mesh.vertices.len() as u32, (w + 1) * (h + 1));
    // Pole rows contribute one triangle per cell, the rest two.
    assert_eq!(mesh.index_count(), 3 * w * (2 * h - 2));
    assert!(indices_in_range(&mesh));
}

#[test]
fn sphere_vertices_lie_on_surface() {
    let mesh = create_sphere(&SphereOptions {
        radius: 3.0,
        ..SphereOptions::default()
    })
    .unwrap();
    for v in &mesh.vertices {
        assert!((Vec3::from(v.position).length() - 3.0).abs() < 1e-3);
    }
    assert!(normals_are_unit(&mesh));
}

#[test]
fn minimal_sphere_is_accepted() {
    let mesh = create_sphere(&SphereOptions {
        radius: 1.0,
        width_segments: 3,
        height_segments: 2,
    })
    .unwrap();
    assert_eq!(mesh.index_count(), 3 * 3 * 2);
}

#[test]
fn degenerate_sphere_is_rejected() {
    assert_invalid(
        create_sphere(&SphereOptions {
            width_segments: 2,
            ..SphereOptions::default()
        }),
        "sphere",
    );
    assert_invalid(
        create_sphere(&SphereOptions {
            height_segments: 1,
            ..SphereOptions::default()
        }),
        "sphere",
    );
    assert_invalid(
        create_sphere(&SphereOptions {
            radius: 0.0,
            ..SphereOptions::default()
        }),
        "sphere",
    );
}

#[test]
fn sphere_rejects_maximal_segment_counts() {
    assert_invalid(
        create_sphere(&SphereOptions {
            width_segments: 8,
            height_segments: u32::MAX,
            ..SphereOptions::default()
        }),
        "sphere",
    );
    assert_invalid(
        create_sphere(&SphereOptions {
            width_segments: u32::MAX,
            height_segments: u32::MAX,
            ..SphereOptions::default()
        }),
        "sphere",
    );
}

// ============================================================================
// Buffer Descriptions
// ============================================================================

#[test]
fn mesh_descriptions_report_element_counts() {
    let mesh = create_box(1.0, 1.0, 1.0).unwrap();

    let vertices = mesh.vertex_desc();
    assert_eq!(vertices.element_count(), Some(24));
    match vertices {
        ResourceDesc::VertexBuffer { stride, .. } => assert_eq!(stride as usize, std::mem::size_of::<Vertex>()),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(mesh.index_desc().element_count(), Some(36));
}
