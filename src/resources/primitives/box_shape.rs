use super::{MeshData, Vertex, check_extent};
use crate::errors::Result;

/// Axis-aligned box centered at the origin, 4 vertices per face.
pub fn create_box(width: f32, height: f32, depth: f32) -> Result<MeshData> {
    check_extent("box", "width", width)?;
    check_extent("box", "height", height)?;
    check_extent("box", "depth", depth)?;

    let w = width / 2.0;
    let h = height / 2.0;
    let d = depth / 2.0;

    // (normal, four corners counter-clockwise seen from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // Front (+Z)
        ([0.0, 0.0, 1.0], [[-w, -h, d], [w, -h, d], [w, h, d], [-w, h, d]]),
        // Back (-Z)
        ([0.0, 0.0, -1.0], [[w, -h, -d], [-w, -h, -d], [-w, h, -d], [w, h, -d]]),
        // Top (+Y)
        ([0.0, 1.0, 0.0], [[-w, h, d], [w, h, d], [w, h, -d], [-w, h, -d]]),
        // Bottom (-Y)
        ([0.0, -1.0, 0.0], [[-w, -h, -d], [w, -h, -d], [w, -h, d], [-w, -h, d]]),
        // Right (+X)
        ([1.0, 0.0, 0.0], [[w, -h, d], [w, -h, -d], [w, h, -d], [w, h, d]]),
        // Left (-X)
        ([-1.0, 0.0, 0.0], [[-w, -h, -d], [-w, -h, d], [-w, h, d], [-w, h, -d]]),
    ];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut mesh = MeshData {
        vertices: Vec::with_capacity(24),
        indices: Vec::with_capacity(36),
    };

    for (face, (normal, corners)) in faces.iter().enumerate() {
        for (corner, uv) in corners.iter().zip(uvs) {
            mesh.vertices.push(Vertex {
                position: *corner,
                normal: *normal,
                uv,
            });
        }
        let base = (face * 4) as u16;
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Ok(mesh)
}
