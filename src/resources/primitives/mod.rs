//! Shape generators
//!
//! CPU-side mesh data for common shapes. Generators validate their
//! parameters and return [`VesperError::InvalidShape`] for degenerate input
//! instead of clamping silently; nothing is touched on failure.

pub mod sphere;
pub mod plane;
pub mod box_shape;

pub use box_shape::create_box;
pub use sphere::{create_sphere, SphereOptions};
pub use plane::{create_plane, PlaneOptions};

use bytemuck::{Pod, Zeroable};

use crate::errors::{Result, VesperError};
use crate::resources::{ResourceDesc, VertexElement, VertexFormat};

/// Interleaved vertex used by every generator.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Input layout elements matching the memory layout of [`Vertex`].
    pub const ELEMENTS: [VertexElement; 3] = [
        VertexElement {
            semantic: "POSITION",
            format: VertexFormat::Float32x3,
            offset: 0,
        },
        VertexElement {
            semantic: "NORMAL",
            format: VertexFormat::Float32x3,
            offset: 12,
        },
        VertexElement {
            semantic: "TEXCOORD",
            format: VertexFormat::Float32x2,
            offset: 24,
        },
    ];
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl MeshData {
    #[must_use]
    pub fn vertex_desc(&self) -> ResourceDesc {
        ResourceDesc::vertex_buffer(&self.vertices)
    }

    #[must_use]
    pub fn index_desc(&self) -> ResourceDesc {
        ResourceDesc::index_buffer(&self.indices)
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

fn check_extent(shape: &'static str, name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(VesperError::InvalidShape {
            shape,
            reason: format!("{name} must be a positive finite number, got {value}"),
        })
    }
}

/// 16-bit indices address at most 65 536 vertices.
fn check_vertex_budget(shape: &'static str, vertex_count: u64) -> Result<()> {
    if vertex_count <= u64::from(u16::MAX) + 1 {
        Ok(())
    } else {
        Err(VesperError::InvalidShape {
            shape,
            reason: format!("{vertex_count} vertices exceed the 16-bit index range"),
        })
    }
}
