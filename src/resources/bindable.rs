use std::fmt;

use crate::backend::{BackendHandle, BindSlot, GpuBackend, ResourceKind};
use crate::errors::Result;
use crate::renderer::RebindGuard;

use super::ResourceDesc;

/// Identity of a materialized resource inside a [`ResourceStore`](super::ResourceStore).
///
/// Identities are handed out in increasing order and never reused by the
/// same store, so a destroyed identity can never alias a newer object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub(crate) u64);

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.0)
    }
}

/// A device object owned by the store, ready to be attached to the pipeline.
#[derive(Debug, Clone)]
pub struct Bindable {
    handle: BackendHandle,
    slot: BindSlot,
    element_count: Option<u32>,
    always_rebind: bool,
}

impl Bindable {
    pub(crate) fn create(backend: &mut dyn GpuBackend, desc: &ResourceDesc) -> Result<Self> {
        let handle = backend.create_resource(desc.kind(), desc)?;
        Ok(Self {
            handle,
            slot: desc.bind_slot(),
            element_count: desc.element_count(),
            always_rebind: false,
        })
    }

    #[inline]
    #[must_use]
    pub fn backend_handle(&self) -> BackendHandle {
        self.handle
    }

    #[inline]
    #[must_use]
    pub fn slot(&self) -> BindSlot {
        self.slot
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.slot.kind
    }

    /// Vertex count of a vertex buffer, index count of an index buffer.
    #[inline]
    #[must_use]
    pub fn element_count(&self) -> Option<u32> {
        self.element_count
    }

    #[inline]
    #[must_use]
    pub fn always_rebind(&self) -> bool {
        self.always_rebind
    }

    /// Marks this object as one that must be re-attached on every request,
    /// bypassing the rebind guard (e.g. state the backend may clobber).
    pub fn set_always_rebind(&mut self, always: bool) {
        self.always_rebind = always;
    }

    /// Binds at the object's own slot through the guard. Returns whether a
    /// backend call was made.
    pub fn bind(
        &self,
        id: ResourceId,
        guard: &mut RebindGuard,
        backend: &mut dyn GpuBackend,
    ) -> Result<bool> {
        self.bind_at(id, self.slot, guard, backend)
    }

    /// Binds at a slot chosen by the renderer.
    pub fn bind_at(
        &self,
        id: ResourceId,
        slot: BindSlot,
        guard: &mut RebindGuard,
        backend: &mut dyn GpuBackend,
    ) -> Result<bool> {
        debug_assert_eq!(slot.kind, self.slot.kind, "{id:?} bound into a slot of another kind");
        guard.bind(slot, id, self.always_rebind, || backend.bind(self.handle, slot))
    }
}
