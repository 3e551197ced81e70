//! Bounded tag → identity cache
//!
//! Set-associative LRU: each [`TagKey`] hashes to one bucket; a bucket holds
//! at most `depth` entries and evicts its least-recently-used entry when a
//! new tag arrives. Evicting a tag never touches the object it pointed at.

use std::any::{TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use smallvec::SmallVec;

use super::ResourceId;
use crate::errors::Result;
use crate::renderer::settings::TagCacheConfig;

/// Key of a canonically shared resource.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TagKey {
    /// Keyed by a marker type, requested through `cache::<T>()`.
    Type(TypeId, &'static str),
    /// Keyed by a runtime name.
    Named(Cow<'static, str>),
}

impl TagKey {
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self::Type(TypeId::of::<T>(), type_name::<T>())
    }

    #[must_use]
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Debug for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(_, name) => write!(f, "Tag<{name}>"),
            Self::Named(name) => write!(f, "Tag({name:?})"),
        }
    }
}

#[derive(Debug, Clone)]
struct TagEntry {
    key: TagKey,
    id: ResourceId,
    last_used: u64,
}

#[derive(Debug)]
pub struct TagCache {
    buckets: Vec<SmallVec<[TagEntry; 4]>>,
    depth: usize,
    tick: u64,
    len: usize,
}

impl Default for TagCache {
    fn default() -> Self {
        Self::with_geometry(TagCacheConfig::default())
    }
}

impl TagCache {
    /// # Errors
    ///
    /// [`VesperError::InvalidSettings`](crate::errors::VesperError::InvalidSettings)
    /// for zero buckets or a zero depth.
    pub fn new(config: TagCacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_geometry(config))
    }

    fn with_geometry(config: TagCacheConfig) -> Self {
        Self {
            buckets: (0..config.buckets).map(|_| SmallVec::new()).collect(),
            depth: config.depth,
            tick: 0,
            len: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len() * self.depth
    }

    fn bucket_index(&self, key: &TagKey) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        (hasher.finish() % self.buckets.len() as u64) as usize
    }

    /// Looks a tag up and marks it as most recently used.
    pub fn get(&mut self, key: &TagKey) -> Option<ResourceId> {
        self.tick += 1;
        let tick = self.tick;
        let index = self.bucket_index(key);
        let entry = self.buckets[index].iter_mut().find(|e| &e.key == key)?;
        entry.last_used = tick;
        Some(entry.id)
    }

    /// Looks a tag up without touching its recency.
    #[must_use]
    pub fn peek(&self, key: &TagKey) -> Option<ResourceId> {
        let index = self.bucket_index(key);
        self.buckets[index]
            .iter()
            .find(|e| &e.key == key)
            .map(|e| e.id)
    }

    /// Inserts (or re-points) a tag. Returns the entry evicted to make room.
    pub fn insert(&mut self, key: TagKey, id: ResourceId) -> Option<(TagKey, ResourceId)> {
        self.tick += 1;
        let tick = self.tick;
        let depth = self.depth;
        let index = self.bucket_index(&key);
        let bucket = &mut self.buckets[index];

        if let Some(entry) = bucket.iter_mut().find(|e| e.key == key) {
            entry.id = id;
            entry.last_used = tick;
            return None;
        }

        let mut evicted = None;
        if bucket.len() >= depth {
            let lru = bucket
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(i, _)| i);
            if let Some(i) = lru {
                let old = bucket.swap_remove(i);
                evicted = Some((old.key, old.id));
                self.len -= 1;
            }
        }

        bucket.push(TagEntry {
            key,
            id,
            last_used: tick,
        });
        self.len += 1;
        evicted
    }

    pub fn remove(&mut self, key: &TagKey) -> Option<ResourceId> {
        let index = self.bucket_index(key);
        let bucket = &mut self.buckets[index];
        let pos = bucket.iter().position(|e| &e.key == key)?;
        self.len -= 1;
        Some(bucket.swap_remove(pos).id)
    }

    /// Drops every tag pointing at `id`. Returns how many were dropped.
    pub fn remove_id(&mut self, id: ResourceId) -> usize {
        let mut removed = 0;
        for bucket in &mut self.buckets {
            let before = bucket.len();
            bucket.retain(|e| e.id != id);
            removed += before - bucket.len();
        }
        self.len -= removed;
        removed
    }

    pub fn ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.buckets.iter().flat_map(|b| b.iter().map(|e| e.id))
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_bucket(depth: usize) -> TagCache {
        TagCache::new(TagCacheConfig { buckets: 1, depth }).unwrap()
    }

    #[test]
    fn zero_geometry_is_rejected() {
        assert!(TagCache::new(TagCacheConfig { buckets: 0, depth: 2 }).is_err());
        assert!(TagCache::new(TagCacheConfig { buckets: 2, depth: 0 }).is_err());
    }

    #[test]
    fn full_bucket_evicts_least_recently_used() {
        let mut cache = single_bucket(2);
        cache.insert(TagKey::named("a"), ResourceId(1));
        cache.insert(TagKey::named("b"), ResourceId(2));

        // Touch "a" so "b" becomes the LRU entry.
        assert_eq!(cache.get(&TagKey::named("a")), Some(ResourceId(1)));

        let evicted = cache.insert(TagKey::named("c"), ResourceId(3));
        assert_eq!(evicted, Some((TagKey::named("b"), ResourceId(2))));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek(&TagKey::named("b")), None);
    }

    #[test]
    fn remove_id_drops_all_aliases() {
        let mut cache = single_bucket(4);
        cache.insert(TagKey::named("a"), ResourceId(7));
        cache.insert(TagKey::named("b"), ResourceId(7));
        cache.insert(TagKey::named("c"), ResourceId(8));

        assert_eq!(cache.remove_id(ResourceId(7)), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn type_keys_differ_per_type() {
        struct A;
        struct B;
        assert_ne!(TagKey::of::<A>(), TagKey::of::<B>());
        assert_eq!(TagKey::of::<A>(), TagKey::of::<A>());
    }
}
