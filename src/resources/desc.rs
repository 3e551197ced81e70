//! Resource descriptions
//!
//! A [`ResourceDesc`] is the construction recipe for one bindable object.
//! It is a plain value: handles keep a copy so an object destroyed by the
//! store (or lost with the device) can be re-created on next access.
//! Bulk payloads are shared through `Arc` so cloning a recipe is cheap.

use std::borrow::Cow;
use std::sync::Arc;

use crate::backend::{BindSlot, ClientArea, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    #[must_use]
    pub const fn size(self) -> u32 {
        match self {
            Self::Float32x2 => 8,
            Self::Float32x3 => 12,
            Self::Float32x4 => 16,
        }
    }
}

/// One element of an input layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexElement {
    pub semantic: &'static str,
    pub format: VertexFormat,
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
    Anisotropic,
}

/// Construction recipe for a bindable object.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceDesc {
    VertexBuffer {
        data: Arc<[u8]>,
        stride: u32,
    },
    IndexBuffer {
        indices: Arc<[u16]>,
    },
    VertexShader {
        name: Cow<'static, str>,
    },
    PixelShader {
        name: Cow<'static, str>,
    },
    /// The layout is validated against the vertex shader it was built for.
    InputLayout {
        elements: Arc<[VertexElement]>,
        shader: Cow<'static, str>,
    },
    Topology(PrimitiveTopology),
    ConstantBuffer {
        stage: ShaderStage,
        slot: u32,
        data: Arc<[u8]>,
    },
    Texture {
        label: Cow<'static, str>,
        width: u32,
        height: u32,
        pixels: Arc<[u8]>,
        slot: u32,
    },
    Sampler {
        filter: FilterMode,
        slot: u32,
    },
    Viewport {
        width: f32,
        height: f32,
    },
    DepthStencil {
        width: u32,
        height: u32,
    },
    RenderTarget {
        width: u32,
        height: u32,
    },
}

impl ResourceDesc {
    // ========================================================================
    // Constructors
    // ========================================================================

    #[must_use]
    pub fn vertex_buffer<V: bytemuck::Pod>(vertices: &[V]) -> Self {
        Self::VertexBuffer {
            data: Arc::from(bytemuck::cast_slice::<V, u8>(vertices)),
            stride: std::mem::size_of::<V>() as u32,
        }
    }

    #[must_use]
    pub fn index_buffer(indices: &[u16]) -> Self {
        Self::IndexBuffer {
            indices: Arc::from(indices),
        }
    }

    #[must_use]
    pub fn vertex_shader(name: impl Into<Cow<'static, str>>) -> Self {
        Self::VertexShader { name: name.into() }
    }

    #[must_use]
    pub fn pixel_shader(name: impl Into<Cow<'static, str>>) -> Self {
        Self::PixelShader { name: name.into() }
    }

    #[must_use]
    pub fn input_layout(elements: &[VertexElement], shader: impl Into<Cow<'static, str>>) -> Self {
        Self::InputLayout {
            elements: Arc::from(elements),
            shader: shader.into(),
        }
    }

    #[must_use]
    pub fn vertex_constants<T: bytemuck::Pod>(slot: u32, value: &T) -> Self {
        Self::ConstantBuffer {
            stage: ShaderStage::Vertex,
            slot,
            data: Arc::from(bytemuck::bytes_of(value)),
        }
    }

    #[must_use]
    pub fn pixel_constants<T: bytemuck::Pod>(slot: u32, value: &T) -> Self {
        Self::ConstantBuffer {
            stage: ShaderStage::Pixel,
            slot,
            data: Arc::from(bytemuck::bytes_of(value)),
        }
    }

    /// A single-color RGBA8 texture.
    #[must_use]
    pub fn solid_texture(label: impl Into<Cow<'static, str>>, rgba: [u8; 4], slot: u32) -> Self {
        Self::Texture {
            label: label.into(),
            width: 1,
            height: 1,
            pixels: Arc::from(rgba.as_slice()),
            slot,
        }
    }

    /// Viewport covering the whole client area.
    #[must_use]
    pub fn viewport_for(area: &impl ClientArea) -> Self {
        let (width, height) = area.client_size();
        Self::Viewport {
            width: width as f32,
            height: height as f32,
        }
    }

    /// Depth target matching the client area.
    #[must_use]
    pub fn depth_stencil_for(area: &impl ClientArea) -> Self {
        let (width, height) = area.client_size();
        Self::DepthStencil { width, height }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::VertexBuffer { .. } => ResourceKind::VertexBuffer,
            Self::IndexBuffer { .. } => ResourceKind::IndexBuffer,
            Self::VertexShader { .. } => ResourceKind::VertexShader,
            Self::PixelShader { .. } => ResourceKind::PixelShader,
            Self::InputLayout { .. } => ResourceKind::InputLayout,
            Self::Topology(_) => ResourceKind::Topology,
            Self::ConstantBuffer {
                stage: ShaderStage::Vertex,
                ..
            } => ResourceKind::VertexConstantBuffer,
            Self::ConstantBuffer {
                stage: ShaderStage::Pixel,
                ..
            } => ResourceKind::PixelConstantBuffer,
            Self::Texture { .. } => ResourceKind::Texture,
            Self::Sampler { .. } => ResourceKind::Sampler,
            Self::Viewport { .. } => ResourceKind::Viewport,
            Self::DepthStencil { .. } => ResourceKind::DepthStencil,
            Self::RenderTarget { .. } => ResourceKind::RenderTarget,
        }
    }

    /// The binding point the created object occupies.
    #[must_use]
    pub fn bind_slot(&self) -> BindSlot {
        let slot = match self {
            Self::ConstantBuffer { slot, .. }
            | Self::Texture { slot, .. }
            | Self::Sampler { slot, .. } => *slot,
            _ => 0,
        };
        BindSlot::new(self.kind(), slot)
    }

    /// Number of elements a draw can address: vertices for a vertex buffer,
    /// indices for an index buffer.
    #[must_use]
    pub fn element_count(&self) -> Option<u32> {
        match self {
            Self::VertexBuffer { data, stride } if *stride > 0 => {
                Some((data.len() / *stride as usize) as u32)
            }
            Self::IndexBuffer { indices } => Some(indices.len() as u32),
            _ => None,
        }
    }

    /// Same recipe re-targeted at another slot. Kinds without slots are
    /// returned unchanged.
    #[must_use]
    pub fn at_slot(mut self, new_slot: u32) -> Self {
        match &mut self {
            Self::ConstantBuffer { slot, .. }
            | Self::Texture { slot, .. }
            | Self::Sampler { slot, .. } => *slot = new_slot,
            _ => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_buffer_kind_follows_stage() {
        let vs = ResourceDesc::vertex_constants(1, &[0.0f32; 4]);
        let ps = ResourceDesc::pixel_constants(2, &[0.0f32; 4]);
        assert_eq!(vs.bind_slot(), BindSlot::new(ResourceKind::VertexConstantBuffer, 1));
        assert_eq!(ps.bind_slot(), BindSlot::new(ResourceKind::PixelConstantBuffer, 2));
    }

    #[test]
    fn viewport_matches_client_area() {
        let desc = ResourceDesc::viewport_for(&(800, 600));
        assert_eq!(
            desc,
            ResourceDesc::Viewport {
                width: 800.0,
                height: 600.0
            }
        );
    }

    #[test]
    fn at_slot_retargets_only_slotted_kinds() {
        let tex = ResourceDesc::solid_texture("white", [255; 4], 0).at_slot(3);
        assert_eq!(tex.bind_slot().slot, 3);

        let topo = ResourceDesc::Topology(PrimitiveTopology::TriangleList).at_slot(3);
        assert_eq!(topo.bind_slot().slot, 0);
    }
}
