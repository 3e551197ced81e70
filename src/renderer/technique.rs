//! Rendering techniques
//!
//! A technique is the fixed part of a draw: shader pair, input layout,
//! topology, and the slot layout its shaders expect. The set of techniques
//! is closed; each one lists its resources as cached handles so every
//! renderer using the same technique shares one set of objects.

use bytemuck::{Pod, Zeroable};

use crate::backend::{BindSlot, ResourceKind};
use crate::resources::primitives::Vertex;
use crate::resources::{FilterMode, PrimitiveTopology, ResourceDesc, ResourceHandle};

// Tag markers for the shared technique objects.
struct FlatVertexShader;
struct FlatPixelShader;
struct FlatInputLayout;
struct TexturedVertexShader;
struct TexturedPixelShader;
struct TexturedInputLayout;
struct TriangleListTopology;
struct FallbackTexture;
struct LinearSampler;

/// Per-frame vertex constants (slot 0).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameConstants {
    pub view_projection: [[f32; 4]; 4],
}

/// Per-object vertex constants.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    pub model: [[f32; 4]; 4],
}

/// Per-material pixel constants.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    pub color: [f32; 4],
}

/// Material families a technique knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Flat,
    Textured,
}

/// Where a technique expects a component's resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAssignment {
    pub object_constants: BindSlot,
    pub material_constants: BindSlot,
    /// `None` when the technique does not sample textures.
    pub texture: Option<BindSlot>,
    pub sampler: Option<BindSlot>,
}

pub const FRAME_CONSTANTS_SLOT: BindSlot = BindSlot::new(ResourceKind::VertexConstantBuffer, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Technique {
    /// Solid color per material; textures are ignored.
    Flat,
    /// Color × texture. Materials without a texture sample a white fallback.
    Textured,
}

impl Technique {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Textured => "textured",
        }
    }

    /// Cached handles for the technique's own objects.
    #[must_use]
    pub fn resources(self) -> Vec<ResourceHandle> {
        let topology =
            ResourceHandle::cached::<TriangleListTopology>(ResourceDesc::Topology(PrimitiveTopology::TriangleList));
        match self {
            Self::Flat => vec![
                ResourceHandle::cached::<FlatVertexShader>(ResourceDesc::vertex_shader("flat_vs")),
                ResourceHandle::cached::<FlatPixelShader>(ResourceDesc::pixel_shader("flat_ps")),
                ResourceHandle::cached::<FlatInputLayout>(ResourceDesc::input_layout(&Vertex::ELEMENTS, "flat_vs")),
                topology,
            ],
            Self::Textured => vec![
                ResourceHandle::cached::<TexturedVertexShader>(ResourceDesc::vertex_shader("textured_vs")),
                ResourceHandle::cached::<TexturedPixelShader>(ResourceDesc::pixel_shader("textured_ps")),
                ResourceHandle::cached::<TexturedInputLayout>(ResourceDesc::input_layout(
                    &Vertex::ELEMENTS,
                    "textured_vs",
                )),
                topology,
            ],
        }
    }

    /// Texture and sampler used when a material brings none.
    #[must_use]
    pub fn fallbacks(self) -> Option<(ResourceHandle, ResourceHandle)> {
        match self {
            Self::Flat => None,
            Self::Textured => Some((
                ResourceHandle::cached::<FallbackTexture>(ResourceDesc::solid_texture("white", [255; 4], 0)),
                ResourceHandle::cached::<LinearSampler>(ResourceDesc::Sampler {
                    filter: FilterMode::Linear,
                    slot: 0,
                }),
            )),
        }
    }

    #[must_use]
    pub fn assign_slots(self, _material: MaterialKind) -> SlotAssignment {
        let object_constants = BindSlot::new(ResourceKind::VertexConstantBuffer, 1);
        let material_constants = BindSlot::new(ResourceKind::PixelConstantBuffer, 0);
        match self {
            Self::Flat => SlotAssignment {
                object_constants,
                material_constants,
                texture: None,
                sampler: None,
            },
            Self::Textured => SlotAssignment {
                object_constants,
                material_constants,
                texture: Some(BindSlot::new(ResourceKind::Texture, 0)),
                sampler: Some(BindSlot::new(ResourceKind::Sampler, 0)),
            },
        }
    }
}
