use std::f32::consts::PI;

use super::{MeshData, Vertex, check_extent, check_vertex_budget};
use crate::errors::{Result, VesperError};

pub struct SphereOptions {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }
}

/// UV sphere centered at the origin (Y-up).
///
/// Needs at least 3 longitudinal and 2 latitudinal segments; anything less
/// has no volume.
pub fn create_sphere(options: &SphereOptions) -> Result<MeshData> {
    check_extent("sphere", "radius", options.radius)?;
    if options.width_segments < 3 {
        return Err(VesperError::InvalidShape {
            shape: "sphere",
            reason: format!(
                "width_segments must be at least 3, got {}",
                options.width_segments
            ),
        });
    }
    if options.height_segments < 2 {
        return Err(VesperError::InvalidShape {
            shape: "sphere",
            reason: format!(
                "height_segments must be at least 2, got {}",
                options.height_segments
            ),
        });
    }

    let radius = options.radius;
    let width_segments = options.width_segments;
    let height_segments = options.height_segments;
    check_vertex_budget(
        "sphere",
        (u64::from(width_segments) + 1).saturating_mul(u64::from(height_segments) + 1),
    )?;
    let stride = width_segments + 1;

    let mut mesh = MeshData::default();

    for y in 0..=height_segments {
        let v_ratio = y as f32 / height_segments as f32;
        // Latitude: 0 at the south pole, PI at the north pole
        let theta = v_ratio * PI;
        let py = -radius * theta.cos();
        let ring_radius = radius * theta.sin();

        for x in 0..=width_segments {
            let u_ratio = x as f32 / width_segments as f32;
            let phi = u_ratio * 2.0 * PI;

            let px = -ring_radius * phi.cos();
            let pz = ring_radius * phi.sin();

            mesh.vertices.push(Vertex {
                position: [px, py, pz],
                normal: [px / radius, py / radius, pz / radius],
                uv: [u_ratio, 1.0 - v_ratio],
            });
        }
    }

    for y in 0..height_segments {
        for x in 0..width_segments {
            let v0 = y * stride + x;
            let v1 = v0 + 1;
            let v2 = (y + 1) * stride + x;
            let v3 = v2 + 1;

            // Pole rows produce one degenerate triangle per cell; skip it.
            if y != 0 {
                mesh.indices
                    .extend_from_slice(&[v0 as u16, v1 as u16, v2 as u16]);
            }
            if y != height_segments - 1 {
                mesh.indices
                    .extend_from_slice(&[v1 as u16, v3 as u16, v2 as u16]);
            }
        }
    }

    Ok(mesh)
}
