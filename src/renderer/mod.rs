//! Rendering System
//!
//! The renderer turns a sorted [`Scene`] into backend calls.
//!
//! # Frame flow
//!
//! 1. [`Scene::sort_for`] syncs the renderer and every draw component,
//!    producing one [`RenderDescriptor`] per component
//! 2. [`Renderer::render`] walks the layers in order. Per layer it binds the
//!    bindees, then for every component binds only the bindings its
//!    predecessor did not have, and issues the draw
//! 3. [`Renderer::present`]
//!
//! Every bind goes through the renderer's [`RebindGuard`], so even the
//! bindings that survive the diff are dropped when the slot already holds
//! the same object.

pub mod descriptor;
pub mod rebind;
pub mod settings;
pub mod technique;

use std::sync::atomic::{AtomicU32, Ordering};

use glam::Affine3A;
use smallvec::SmallVec;

use crate::backend::GpuBackend;
use crate::errors::Result;
use crate::resources::{ResourceDesc, ResourceHandle, ResourceId, ResourceStore};
use crate::scene::{Scene, TransformGraph};

pub use descriptor::{Binding, DescriptorHeader, RenderDescriptor};
pub use rebind::{BindStats, RebindGuard};
pub use settings::{EngineSettings, TagCacheConfig};
pub use technique::{
    FRAME_CONSTANTS_SLOT, FrameConstants, MaterialConstants, MaterialKind, ObjectConstants, SlotAssignment,
    Technique,
};

static NEXT_RENDERER_ID: AtomicU32 = AtomicU32::new(1);

/// Identifies one renderer configuration. A renderer takes a new id
/// whenever its technique bindings change, which makes descriptors
/// produced earlier detectably stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererId(pub(crate) u32);

impl RendererId {
    fn next() -> Self {
        Self(NEXT_RENDERER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Per-frame counters returned by [`Renderer::render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub layers: u32,
    pub draws: u32,
    /// Bind requests that reached the guard.
    pub binds_requested: u64,
    /// Requests the guard forwarded to the backend.
    pub binds_performed: u64,
    /// Requests the guard dropped as redundant.
    pub binds_suppressed: u64,
    /// Bindings never requested because the previous draw had them.
    pub binds_skipped_by_diff: u64,
}

pub struct Renderer {
    id: RendererId,
    technique: Technique,

    technique_resources: Vec<ResourceHandle>,
    fallbacks: Option<(ResourceHandle, ResourceHandle)>,
    frame_constants: ResourceHandle,

    technique_bindings: Vec<Binding>,
    fallback_ids: Option<(ResourceId, ResourceId)>,

    guard: RebindGuard,
    clear_color: [f32; 4],
    synced: bool,
}

impl Renderer {
    #[must_use]
    pub fn new(technique: Technique, settings: &EngineSettings) -> Self {
        let mut guard = RebindGuard::new();
        guard.set_always_rebind(settings.always_rebind);

        Self {
            id: RendererId::next(),
            technique,
            technique_resources: technique.resources(),
            fallbacks: technique.fallbacks(),
            frame_constants: ResourceHandle::owned(ResourceDesc::vertex_constants(
                FRAME_CONSTANTS_SLOT.slot,
                &FrameConstants {
                    view_projection: glam::Mat4::IDENTITY.to_cols_array_2d(),
                },
            )),
            technique_bindings: Vec::new(),
            fallback_ids: None,
            guard,
            clear_color: settings.clear_color,
            synced: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> RendererId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn technique(&self) -> Technique {
        self.technique
    }

    /// Switches technique. Scenes must be re-sorted before the next render.
    pub fn set_technique(&mut self, technique: Technique, store: &mut ResourceStore, backend: &mut dyn GpuBackend) {
        if technique == self.technique {
            return;
        }
        for handle in self.technique_resources.drain(..) {
            handle.release(store, backend);
        }
        if let Some((texture, sampler)) = self.fallbacks.take() {
            texture.release(store, backend);
            sampler.release(store, backend);
        }

        self.technique = technique;
        self.technique_resources = technique.resources();
        self.fallbacks = technique.fallbacks();
        self.technique_bindings.clear();
        self.fallback_ids = None;
        self.id = RendererId::next();
        self.synced = false;
        log::info!("Renderer {:?}: technique set to '{}'", self.id, technique.name());
    }

    /// Materializes the technique's objects. Cached objects are shared with
    /// every other renderer using the same technique.
    pub fn sync(&mut self, store: &mut ResourceStore, backend: &mut dyn GpuBackend) -> Result<()> {
        let mut bindings = Vec::with_capacity(self.technique_resources.len() + 1);
        for handle in &mut self.technique_resources {
            let id = handle.materialize(store, backend)?;
            bindings.push(Binding {
                id,
                slot: handle.resolve(store).slot(),
            });
        }
        let frame = self.frame_constants.materialize(store, backend)?;
        bindings.push(Binding {
            id: frame,
            slot: FRAME_CONSTANTS_SLOT,
        });

        let fallback_ids = match &mut self.fallbacks {
            Some((texture, sampler)) => Some((texture.materialize(store, backend)?, sampler.materialize(store, backend)?)),
            None => None,
        };

        if !self.technique_bindings.is_empty()
            && (bindings != self.technique_bindings || fallback_ids != self.fallback_ids)
        {
            let previous = self.id;
            self.id = RendererId::next();
            log::debug!("Renderer {previous:?}: technique objects changed, now {:?}", self.id);
        }
        self.technique_bindings = bindings;
        self.fallback_ids = fallback_ids;
        self.synced = true;
        Ok(())
    }

    /// Technique objects every descriptor starts with.
    #[inline]
    #[must_use]
    pub fn technique_bindings(&self) -> &[Binding] {
        &self.technique_bindings
    }

    /// Fallback texture and sampler identities, for techniques that sample.
    #[inline]
    #[must_use]
    pub fn fallback_ids(&self) -> Option<(ResourceId, ResourceId)> {
        self.fallback_ids
    }

    #[must_use]
    pub fn assign_slots(&self, material: MaterialKind) -> SlotAssignment {
        self.technique.assign_slots(material)
    }

    #[inline]
    #[must_use]
    pub fn guard(&self) -> &RebindGuard {
        &self.guard
    }

    /// Forgets every bound slot and requires a new [`sync`](Self::sync).
    pub fn reset_state(&mut self) {
        self.guard.reset();
        self.synced = false;
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Draws every layer of `scene`.
    ///
    /// The graph must have been traversed this frame.
    ///
    /// # Panics
    ///
    /// - the renderer was never synced
    /// - a component was not synced for this renderer
    /// - a descriptor names an identity the store no longer holds
    /// - a component or camera node is dirty in `graph`
    pub fn render(
        &mut self,
        scene: &Scene,
        graph: &TransformGraph,
        store: &ResourceStore,
        backend: &mut dyn GpuBackend,
    ) -> Result<FrameStats> {
        assert!(self.synced, "Renderer {:?} used before sync", self.id);

        let view = scene.view(graph);
        let frame = FrameConstants {
            view_projection: view.view_projection.to_cols_array_2d(),
        };
        backend.write_resource(
            self.frame_constants.resolve(store).backend_handle(),
            bytemuck::bytes_of(&frame),
        )?;
        backend.clear(self.clear_color)?;

        let before = self.guard.stats();
        let force = self.guard.always_rebind();
        let mut stats = FrameStats::default();
        let mut previous: SmallVec<[Binding; 12]> = SmallVec::new();

        for layer in scene.layers() {
            stats.layers += 1;
            for bindee in layer.bindees() {
                stats.binds_requested += 1;
                bindee.bind(store, &mut self.guard, backend)?;
            }
            previous.clear();

            for &key in layer.components() {
                let component = scene
                    .component(key)
                    .unwrap_or_else(|| panic!("layer '{}' lists removed component {key:?}", layer.name()));
                let descriptor = component.descriptor();
                assert_eq!(
                    descriptor.renderer(),
                    self.id,
                    "component '{}' was synced for another renderer; sort the scene first",
                    component.name()
                );

                let model = component.node().map_or(Affine3A::IDENTITY, |node| *graph.total(node));
                component.upload_transform(&model, store, backend)?;

                for binding in descriptor.bindings() {
                    let bindable = store.get(binding.id).unwrap_or_else(|| {
                        panic!(
                            "{:?} needed by '{}' is not in the store",
                            binding.id,
                            component.name()
                        )
                    });
                    if !force && !bindable.always_rebind() && previous.contains(binding) {
                        stats.binds_skipped_by_diff += 1;
                        continue;
                    }
                    stats.binds_requested += 1;
                    bindable.bind_at(binding.id, binding.slot, &mut self.guard, backend)?;
                }

                let range = component.range();
                backend.issue_draw(range.count, range.start, range.base_vertex)?;
                stats.draws += 1;

                previous.clear();
                previous.extend_from_slice(descriptor.bindings());
            }
        }

        let after = self.guard.stats();
        stats.binds_performed = after.performed - before.performed;
        stats.binds_suppressed = after.suppressed - before.suppressed;
        Ok(stats)
    }

    pub fn present(&mut self, backend: &mut dyn GpuBackend) -> Result<()> {
        backend.present()
    }

    /// Releases the renderer's own objects. Shared technique objects stay
    /// in the store.
    pub fn release(self, store: &mut ResourceStore, backend: &mut dyn GpuBackend) {
        for handle in self.technique_resources {
            handle.release(store, backend);
        }
        if let Some((texture, sampler)) = self.fallbacks {
            texture.release(store, backend);
            sampler.release(store, backend);
        }
        self.frame_constants.release(store, backend);
    }
}
