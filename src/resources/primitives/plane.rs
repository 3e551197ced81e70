use super::{MeshData, Vertex, check_extent, check_vertex_budget};
use crate::errors::{Result, VesperError};

pub struct PlaneOptions {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for PlaneOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            width_segments: 1,
            height_segments: 1,
        }
    }
}

/// Subdivided plane in the XY plane facing +Z.
pub fn create_plane(options: &PlaneOptions) -> Result<MeshData> {
    check_extent("plane", "width", options.width)?;
    check_extent("plane", "height", options.height)?;
    if options.width_segments == 0 || options.height_segments == 0 {
        return Err(VesperError::InvalidShape {
            shape: "plane",
            reason: format!(
                "needs at least one segment per axis, got {}x{}",
                options.width_segments, options.height_segments
            ),
        });
    }

    let grid_x = options.width_segments;
    let grid_y = options.height_segments;
    check_vertex_budget(
        "plane",
        (u64::from(grid_x) + 1).saturating_mul(u64::from(grid_y) + 1),
    )?;
    let grid_x1 = grid_x + 1;
    let grid_y1 = grid_y + 1;

    let width_half = options.width / 2.0;
    let height_half = options.height / 2.0;
    let segment_width = options.width / grid_x as f32;
    let segment_height = options.height / grid_y as f32;

    let mut mesh = MeshData::default();

    for iy in 0..grid_y1 {
        let y = iy as f32 * segment_height - height_half;
        for ix in 0..grid_x1 {
            let x = ix as f32 * segment_width - width_half;
            // -y so that v grows downward like the uv convention
            mesh.vertices.push(Vertex {
                position: [x, -y, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: [ix as f32 / grid_x as f32, 1.0 - (iy as f32 / grid_y as f32)],
            });
        }
    }

    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = (ix + grid_x1 * iy) as u16;
            let b = (ix + grid_x1 * (iy + 1)) as u16;
            let c = ((ix + 1) + grid_x1 * (iy + 1)) as u16;
            let d = ((ix + 1) + grid_x1 * iy) as u16;

            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Ok(mesh)
}
