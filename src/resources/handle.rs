//! Resource handles
//!
//! A [`ResourceHandle`] pairs a construction recipe with the identity it
//! materialized to. Materialization is lazy and restartable: when the store
//! no longer holds the identity (destroyed, evicted-and-destroyed, or wiped
//! after device loss) the next [`materialize`](ResourceHandle::materialize)
//! replays the recipe and picks up a fresh identity.

use super::store::HandleId;
use super::tag_cache::TagKey;
use super::{Bindable, ResourceDesc, ResourceId, ResourceStore};
use crate::backend::GpuBackend;
use crate::errors::Result;
use crate::renderer::RebindGuard;

/// How the object behind a handle is owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleMode {
    /// The handle is the exclusive owner; releasing it destroys the object.
    Owned,
    /// The store owns the object; the handle only observes it.
    Stored,
    /// Stored and deduplicated: every request with the same tag shares one
    /// object while the tag stays in the cache.
    Cached(TagKey),
}

#[derive(Debug)]
pub struct ResourceHandle {
    id: HandleId,
    mode: HandleMode,
    desc: ResourceDesc,
    always_rebind: bool,
    state: Option<ResourceId>,
}

impl ResourceHandle {
    fn with_mode(mode: HandleMode, desc: ResourceDesc) -> Self {
        Self {
            id: HandleId::next(),
            mode,
            desc,
            always_rebind: false,
            state: None,
        }
    }

    #[must_use]
    pub fn owned(desc: ResourceDesc) -> Self {
        Self::with_mode(HandleMode::Owned, desc)
    }

    #[must_use]
    pub fn stored(desc: ResourceDesc) -> Self {
        Self::with_mode(HandleMode::Stored, desc)
    }

    /// Shared resource keyed by the marker type `T`.
    #[must_use]
    pub fn cached<T: 'static>(desc: ResourceDesc) -> Self {
        Self::with_mode(HandleMode::Cached(TagKey::of::<T>()), desc)
    }

    /// Shared resource keyed by a runtime name.
    #[must_use]
    pub fn cached_named(name: impl Into<std::borrow::Cow<'static, str>>, desc: ResourceDesc) -> Self {
        Self::with_mode(HandleMode::Cached(TagKey::named(name)), desc)
    }

    /// The materialized object bypasses the rebind guard.
    ///
    /// The flag lives on the object, not on the handle. For a
    /// [`HandleMode::Cached`] handle it therefore applies to every holder of
    /// the same tag, and it stays set until the tag's object is destroyed.
    /// Give the handle its own tag (or use an owned handle) to limit it to
    /// one draw.
    #[must_use]
    pub fn with_always_rebind(mut self) -> Self {
        self.always_rebind = true;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn handle_id(&self) -> HandleId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> &HandleMode {
        &self.mode
    }

    #[inline]
    #[must_use]
    pub fn desc(&self) -> &ResourceDesc {
        &self.desc
    }

    /// Identity from the last materialization. May be stale; check with
    /// [`is_valid`](Self::is_valid).
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<ResourceId> {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self, store: &ResourceStore) -> bool {
        self.state.is_some_and(|id| store.contains(id))
    }

    /// Forgets the materialized identity. The next access re-materializes.
    pub fn invalidate(&mut self) {
        self.state = None;
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// Materializes the handle if it has no live identity, then returns it.
    pub fn materialize(
        &mut self,
        store: &mut ResourceStore,
        backend: &mut dyn GpuBackend,
    ) -> Result<ResourceId> {
        if let Some(id) = self.state {
            if store.contains(id) {
                return Ok(id);
            }
            log::debug!("{:?}: {id:?} is gone, re-materializing", self.id);
        }

        let id = match &self.mode {
            HandleMode::Owned | HandleMode::Stored => store.load(self.id, &self.desc, backend)?.0,
            HandleMode::Cached(tag) => {
                store
                    .cache_tagged(self.id, tag.clone(), &self.desc, backend)?
                    .0
            }
        };

        if self.always_rebind
            && let Some(bindable) = store.get_mut(id)
        {
            bindable.set_always_rebind(true);
        }

        self.state = Some(id);
        Ok(id)
    }

    /// Resolves the handle to its object.
    ///
    /// # Panics
    ///
    /// Panics if the handle was never materialized or its object was
    /// destroyed. Callers must [`materialize`](Self::materialize) first.
    #[must_use]
    pub fn resolve<'s>(&self, store: &'s ResourceStore) -> &'s Bindable {
        self.resolve_with_id(store).1
    }

    fn resolve_with_id<'s>(&self, store: &'s ResourceStore) -> (ResourceId, &'s Bindable) {
        let Some(id) = self.state else {
            panic!("{:?} resolved before materialization", self.id);
        };
        let bindable = store
            .get(id)
            .unwrap_or_else(|| panic!("{:?} resolved stale {id:?}", self.id));
        (id, bindable)
    }

    /// Resolves the handle and binds its object at the object's own slot.
    ///
    /// # Panics
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn bind(
        &self,
        store: &ResourceStore,
        guard: &mut RebindGuard,
        backend: &mut dyn GpuBackend,
    ) -> Result<bool> {
        let (id, bindable) = self.resolve_with_id(store);
        bindable.bind(id, guard, backend)
    }

    /// Swaps the recipe (e.g. a viewport after a resize) and materializes
    /// the new object. The previous object is destroyed if this handle
    /// owned it.
    pub fn rebuild(
        &mut self,
        desc: ResourceDesc,
        store: &mut ResourceStore,
        backend: &mut dyn GpuBackend,
    ) -> Result<ResourceId> {
        self.destroy_if_owner(store, backend);
        self.state = None;
        self.desc = desc;
        self.materialize(store, backend)
    }

    /// Releases the handle. Objects are destroyed only when the handle is
    /// `Owned` and the store still records it as the owner.
    pub fn release(mut self, store: &mut ResourceStore, backend: &mut dyn GpuBackend) {
        self.destroy_if_owner(store, backend);
    }

    fn destroy_if_owner(&mut self, store: &mut ResourceStore, backend: &mut dyn GpuBackend) {
        if self.mode != HandleMode::Owned {
            return;
        }
        if let Some(id) = self.state.take()
            && store.owner_of(id) == Some(self.id)
        {
            store.destroy(id, backend);
        }
    }
}
