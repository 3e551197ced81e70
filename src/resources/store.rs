//! Resource Store
//!
//! Authoritative table of every materialized bindable object.
//!
//! # Ownership
//!
//! Every entry records the [`HandleId`] that requested it. Ownership is
//! single and explicit:
//!
//! - objects behind `Owned` handles are destroyed when that handle is
//!   released;
//! - `Stored` and `Cached` objects live until [`ResourceStore::destroy`] or
//!   [`ResourceStore::clear`] is called, regardless of how many handles
//!   observe them.
//!
//! # Tag cache
//!
//! [`ResourceStore::cache`] deduplicates requests through a bounded
//! [`TagCache`]. Eviction from the tag cache only breaks the tag → identity
//! shortcut; the object stays in the table and every identity already
//! handed out keeps resolving.

use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

use super::tag_cache::{TagCache, TagKey};
use super::{Bindable, ResourceDesc, ResourceId};
use crate::backend::GpuBackend;
use crate::errors::Result;
use crate::renderer::settings::{EngineSettings, TagCacheConfig};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`ResourceHandle`](super::ResourceHandle),
/// recorded by the store as the owner of the objects it requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
struct StoreEntry {
    bindable: Bindable,
    owner: HandleId,
    tag: Option<TagKey>,
}

/// Counters for instrumentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub loads: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
    pub destroyed: u64,
}

pub struct ResourceStore {
    entries: FxHashMap<ResourceId, StoreEntry>,
    tags: TagCache,
    next_id: u64,
    stats: StoreStats,
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::with_tags(TagCache::default())
    }
}

impl ResourceStore {
    /// # Errors
    ///
    /// [`VesperError::InvalidSettings`](crate::errors::VesperError::InvalidSettings)
    /// when the tag cache could not hold a single tag.
    pub fn new(tag_cache: TagCacheConfig) -> Result<Self> {
        Ok(Self::with_tags(TagCache::new(tag_cache)?))
    }

    pub fn with_settings(settings: &EngineSettings) -> Result<Self> {
        Self::new(settings.tag_cache)
    }

    fn with_tags(tags: TagCache) -> Self {
        Self {
            entries: FxHashMap::default(),
            tags,
            next_id: 1,
            stats: StoreStats::default(),
        }
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Creates a new object and registers it under `owner`. Never deduplicates.
    pub fn load(
        &mut self,
        owner: HandleId,
        desc: &ResourceDesc,
        backend: &mut dyn GpuBackend,
    ) -> Result<(ResourceId, &Bindable)> {
        self.insert_new(owner, None, desc, backend)
    }

    /// Returns the object cached under the marker type `T`, creating it on a
    /// miss.
    pub fn cache<T: 'static>(
        &mut self,
        owner: HandleId,
        desc: &ResourceDesc,
        backend: &mut dyn GpuBackend,
    ) -> Result<(ResourceId, &Bindable)> {
        self.cache_tagged(owner, TagKey::of::<T>(), desc, backend)
    }

    /// Returns the object cached under `tag`, creating it on a miss.
    ///
    /// On a hit no object is constructed and `desc` is ignored.
    pub fn cache_tagged(
        &mut self,
        owner: HandleId,
        tag: TagKey,
        desc: &ResourceDesc,
        backend: &mut dyn GpuBackend,
    ) -> Result<(ResourceId, &Bindable)> {
        if let Some(id) = self.tags.get(&tag) {
            if self.entries.contains_key(&id) {
                self.stats.cache_hits += 1;
                return Ok((id, &self.entries[&id].bindable));
            }
            // Only reachable if an entry vanished without going through
            // `destroy`; heal the cache instead of handing out a dead id.
            log::warn!("ResourceStore: {tag:?} pointed at missing {id:?}");
            self.tags.remove(&tag);
        }

        self.stats.cache_misses += 1;
        let (id, _) = self.insert_new(owner, Some(tag.clone()), desc, backend)?;
        if let Some((evicted_tag, evicted_id)) = self.tags.insert(tag, id) {
            self.stats.evictions += 1;
            log::debug!("ResourceStore: evicted {evicted_tag:?} -> {evicted_id:?} from tag cache");
            if let Some(entry) = self.entries.get_mut(&evicted_id) {
                entry.tag = None;
            }
        }
        Ok((id, &self.entries[&id].bindable))
    }

    fn insert_new(
        &mut self,
        owner: HandleId,
        tag: Option<TagKey>,
        desc: &ResourceDesc,
        backend: &mut dyn GpuBackend,
    ) -> Result<(ResourceId, &Bindable)> {
        let bindable = Bindable::create(backend, desc)?;
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.stats.loads += 1;

        log::trace!("ResourceStore: created {id:?} ({:?}) for {owner:?}", bindable.kind());

        self.entries.insert(
            id,
            StoreEntry {
                bindable,
                owner,
                tag,
            },
        );
        Ok((id, &self.entries[&id].bindable))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn get(&self, id: ResourceId) -> Option<&Bindable> {
        self.entries.get(&id).map(|e| &e.bindable)
    }

    #[inline]
    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut Bindable> {
        self.entries.get_mut(&id).map(|e| &mut e.bindable)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: ResourceId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Identity currently cached under `tag`, without touching LRU order.
    #[must_use]
    pub fn search(&self, tag: &TagKey) -> Option<ResourceId> {
        self.tags.peek(tag)
    }

    #[must_use]
    pub fn search_tag<T: 'static>(&self) -> Option<ResourceId> {
        self.search(&TagKey::of::<T>())
    }

    #[must_use]
    pub fn owner_of(&self, id: ResourceId) -> Option<HandleId> {
        self.entries.get(&id).map(|e| e.owner)
    }

    /// Tag the object is currently reachable through, if it was cached and
    /// the tag has not been evicted.
    #[must_use]
    pub fn tag_of(&self, id: ResourceId) -> Option<&TagKey> {
        self.entries.get(&id).and_then(|e| e.tag.as_ref())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn tag_cache_len(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    #[must_use]
    pub fn tag_cache_capacity(&self) -> usize {
        self.tags.capacity()
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    pub fn ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.entries.keys().copied()
    }

    // ========================================================================
    // Destruction
    // ========================================================================

    /// Destroys an object. Every handle observing `id` is invalid afterwards
    /// and will re-materialize on its next access.
    ///
    /// Returns `false` if `id` was not live.
    pub fn destroy(&mut self, id: ResourceId, backend: &mut dyn GpuBackend) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };
        if entry.tag.is_some() {
            self.tags.remove_id(id);
        }
        backend.destroy_resource(entry.bindable.backend_handle());
        self.stats.destroyed += 1;
        log::trace!("ResourceStore: destroyed {id:?} (owner {:?})", entry.owner);
        true
    }

    /// Destroys every object.
    pub fn clear(&mut self, backend: &mut dyn GpuBackend) {
        for (_, entry) in self.entries.drain() {
            backend.destroy_resource(entry.bindable.backend_handle());
            self.stats.destroyed += 1;
        }
        self.tags.clear();
    }

    /// Forgets every object without calling the backend. Used after device
    /// loss, when the backend objects no longer exist.
    pub fn abandon(&mut self) {
        let count = self.entries.len();
        self.stats.destroyed += count as u64;
        self.entries.clear();
        self.tags.clear();
        log::info!("ResourceStore: abandoned {count} objects");
    }
}
