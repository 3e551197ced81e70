//! Draw components
//!
//! A [`DrawComponent`] bundles what one draw call needs: geometry handles, a
//! material, a per-object constant buffer, an optional transform node and
//! the draw range. Syncing it with a [`Renderer`] materializes every handle
//! and produces the [`RenderDescriptor`] the render loop diffs against.

use std::borrow::Cow;

use glam::Affine3A;

use crate::backend::GpuBackend;
use crate::errors::Result;
use crate::renderer::{
    MaterialConstants, MaterialKind, ObjectConstants, RenderDescriptor, Renderer, RendererId,
};
use crate::resources::primitives::MeshData;
use crate::resources::{ResourceDesc, ResourceHandle, ResourceStore};
use crate::scene::NodeHandle;

// Object constants live in their own vertex slot; the renderer picks the
// slot actually bound.
const OBJECT_CONSTANTS_SLOT: u32 = 1;
const MATERIAL_CONSTANTS_SLOT: u32 = 0;

fn identity_constants() -> ObjectConstants {
    ObjectConstants {
        model: glam::Mat4::IDENTITY.to_cols_array_2d(),
    }
}

// ============================================================================
// Material
// ============================================================================

pub enum Material {
    Flat {
        color: ResourceHandle,
    },
    Textured {
        color: ResourceHandle,
        texture: ResourceHandle,
        sampler: ResourceHandle,
    },
}

impl Material {
    /// Solid color, owned constant buffer.
    #[must_use]
    pub fn flat(rgba: [f32; 4]) -> Self {
        Self::Flat {
            color: ResourceHandle::owned(ResourceDesc::pixel_constants(
                MATERIAL_CONSTANTS_SLOT,
                &MaterialConstants { color: rgba },
            )),
        }
    }

    /// Tinted texture. Texture and sampler are usually cached handles shared
    /// between materials.
    #[must_use]
    pub fn textured(tint: [f32; 4], texture: ResourceHandle, sampler: ResourceHandle) -> Self {
        Self::Textured {
            color: ResourceHandle::owned(ResourceDesc::pixel_constants(
                MATERIAL_CONSTANTS_SLOT,
                &MaterialConstants { color: tint },
            )),
            texture,
            sampler,
        }
    }

    #[must_use]
    pub fn kind(&self) -> MaterialKind {
        match self {
            Self::Flat { .. } => MaterialKind::Flat,
            Self::Textured { .. } => MaterialKind::Textured,
        }
    }

    /// Secondary sort key: keeps same-geometry draws of one material family
    /// next to each other.
    #[must_use]
    pub fn type_tag(&self) -> u32 {
        match self {
            Self::Flat { .. } => 0,
            Self::Textured { .. } => 1,
        }
    }

    fn release(self, store: &mut ResourceStore, backend: &mut dyn GpuBackend) {
        match self {
            Self::Flat { color } => color.release(store, backend),
            Self::Textured {
                color,
                texture,
                sampler,
            } => {
                color.release(store, backend);
                texture.release(store, backend);
                sampler.release(store, backend);
            }
        }
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Material").field(&self.kind()).finish()
    }
}

// ============================================================================
// Draw component
// ============================================================================

/// Indexed draw arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawRange {
    /// Index count; `0` means "every index in the index buffer".
    pub count: u32,
    pub start: u32,
    pub base_vertex: i32,
}

#[derive(Debug)]
pub struct DrawComponent {
    name: Cow<'static, str>,
    vertices: ResourceHandle,
    indices: ResourceHandle,
    material: Material,
    object_constants: ResourceHandle,
    node: Option<NodeHandle>,
    range: DrawRange,
    descriptor: Option<RenderDescriptor>,
}

impl DrawComponent {
    #[must_use]
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        vertices: ResourceHandle,
        indices: ResourceHandle,
        material: Material,
    ) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
            material,
            object_constants: ResourceHandle::owned(ResourceDesc::vertex_constants(
                OBJECT_CONSTANTS_SLOT,
                &identity_constants(),
            )),
            node: None,
            range: DrawRange::default(),
            descriptor: None,
        }
    }

    /// Builds geometry handles from mesh data. With a `geometry_tag` the
    /// buffers are cached under `"<tag>-vertices"` / `"<tag>-indices"` and
    /// shared by every component using the same tag; without one each
    /// component owns its buffers.
    #[must_use]
    pub fn from_mesh(
        name: impl Into<Cow<'static, str>>,
        mesh: &MeshData,
        geometry_tag: Option<&str>,
        material: Material,
    ) -> Self {
        let (vertices, indices) = match geometry_tag {
            Some(tag) => (
                ResourceHandle::cached_named(format!("{tag}-vertices"), mesh.vertex_desc()),
                ResourceHandle::cached_named(format!("{tag}-indices"), mesh.index_desc()),
            ),
            None => (
                ResourceHandle::owned(mesh.vertex_desc()),
                ResourceHandle::owned(mesh.index_desc()),
            ),
        };
        Self::new(name, vertices, indices, material)
    }

    #[must_use]
    pub fn with_node(mut self, node: NodeHandle) -> Self {
        self.node = Some(node);
        self
    }

    #[must_use]
    pub fn with_range(mut self, range: DrawRange) -> Self {
        self.range = range;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> Option<NodeHandle> {
        self.node
    }

    pub fn set_node(&mut self, node: Option<NodeHandle>) {
        self.node = node;
    }

    #[inline]
    #[must_use]
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Swapping the material drops the previous descriptor; the scene must
    /// be re-sorted before the next render.
    pub fn set_material(&mut self, material: Material, store: &mut ResourceStore, backend: &mut dyn GpuBackend) {
        let previous = std::mem::replace(&mut self.material, material);
        previous.release(store, backend);
        self.descriptor = None;
    }

    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &ResourceHandle {
        &self.vertices
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> &ResourceHandle {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn object_constants(&self) -> &ResourceHandle {
        &self.object_constants
    }

    #[inline]
    #[must_use]
    pub fn range(&self) -> DrawRange {
        self.range
    }

    // ========================================================================
    // Sync
    // ========================================================================

    /// Materializes every handle and builds the descriptor for `renderer`.
    ///
    /// Binding order: technique objects, geometry, object constants,
    /// material. The vertex buffer identity is the primary sort key.
    pub fn sync(
        &mut self,
        renderer: &Renderer,
        store: &mut ResourceStore,
        backend: &mut dyn GpuBackend,
    ) -> Result<()> {
        let vb = self.vertices.materialize(store, backend)?;
        let ib = self.indices.materialize(store, backend)?;
        let object = self.object_constants.materialize(store, backend)?;

        let slots = renderer.assign_slots(self.material.kind());
        let mut descriptor = RenderDescriptor::new(renderer.id(), vb, self.material.type_tag());

        for binding in renderer.technique_bindings() {
            descriptor.push(binding.id, binding.slot);
        }
        descriptor.push(vb, self.vertices.resolve(store).slot());
        descriptor.push(ib, self.indices.resolve(store).slot());
        descriptor.push(object, slots.object_constants);

        match &mut self.material {
            Material::Flat { color } => {
                let color = color.materialize(store, backend)?;
                descriptor.push(color, slots.material_constants);
                // Textured techniques still sample something.
                if let (Some(texture_slot), Some(sampler_slot), Some((texture, sampler))) =
                    (slots.texture, slots.sampler, renderer.fallback_ids())
                {
                    descriptor.push(texture, texture_slot);
                    descriptor.push(sampler, sampler_slot);
                }
            }
            Material::Textured {
                color,
                texture,
                sampler,
            } => {
                let color = color.materialize(store, backend)?;
                descriptor.push(color, slots.material_constants);
                let texture = texture.materialize(store, backend)?;
                let sampler = sampler.materialize(store, backend)?;
                if let (Some(texture_slot), Some(sampler_slot)) = (slots.texture, slots.sampler) {
                    descriptor.push(texture, texture_slot);
                    descriptor.push(sampler, sampler_slot);
                }
            }
        }

        if self.range.count == 0 {
            self.range.count = self
                .indices
                .resolve(store)
                .element_count()
                .unwrap_or_default();
        }

        log::trace!("DrawComponent '{}': synced {:?}", self.name, descriptor.header());
        self.descriptor = Some(descriptor);
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the component was never synced with a renderer.
    #[must_use]
    pub fn descriptor(&self) -> &RenderDescriptor {
        self.descriptor
            .as_ref()
            .unwrap_or_else(|| panic!("DrawComponent '{}' rendered before sync", self.name))
    }

    #[must_use]
    pub fn try_descriptor(&self) -> Option<&RenderDescriptor> {
        self.descriptor.as_ref()
    }

    #[must_use]
    pub fn is_synced_for(&self, renderer: RendererId) -> bool {
        self.descriptor.as_ref().is_some_and(|d| d.renderer() == renderer)
    }

    /// Uploads the model matrix into the object constant buffer.
    pub(crate) fn upload_transform(
        &self,
        model: &Affine3A,
        store: &ResourceStore,
        backend: &mut dyn GpuBackend,
    ) -> Result<()> {
        let constants = ObjectConstants {
            model: glam::Mat4::from(*model).to_cols_array_2d(),
        };
        let handle = self.object_constants.resolve(store).backend_handle();
        backend.write_resource(handle, bytemuck::bytes_of(&constants))
    }

    /// Releases every handle; owned objects are destroyed.
    pub fn release(self, store: &mut ResourceStore, backend: &mut dyn GpuBackend) {
        self.vertices.release(store, backend);
        self.indices.release(store, backend);
        self.object_constants.release(store, backend);
        self.material.release(store, backend);
    }
}
