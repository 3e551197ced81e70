//! Rebind guard
//!
//! Remembers the last object bound to every slot and swallows requests that
//! would re-attach the same object. One guard belongs to one rendering
//! context; nothing here is global.

use rustc_hash::FxHashMap;

use crate::backend::BindSlot;
use crate::errors::Result;
use crate::resources::ResourceId;

/// Bind counters. Purely informational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindStats {
    /// Requests forwarded to the backend.
    pub performed: u64,
    /// Requests dropped because the object was already bound.
    pub suppressed: u64,
}

#[derive(Debug, Default)]
pub struct RebindGuard {
    last_bound: FxHashMap<BindSlot, ResourceId>,
    always_rebind: bool,
    stats: BindStats,
}

impl RebindGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard that forwards every request (driver workaround / debugging).
    #[must_use]
    pub fn always_rebinding() -> Self {
        Self {
            always_rebind: true,
            ..Self::default()
        }
    }

    pub fn set_always_rebind(&mut self, always: bool) {
        self.always_rebind = always;
    }

    #[inline]
    #[must_use]
    pub fn always_rebind(&self) -> bool {
        self.always_rebind
    }

    /// Binds `candidate` at `slot` unless it is already bound there.
    ///
    /// `always` is the candidate's own always-rebind flag. Returns `true`
    /// when `do_bind` ran. If `do_bind` fails the slot is forgotten, since
    /// the backend state is unknown afterwards.
    pub fn bind<F>(&mut self, slot: BindSlot, candidate: ResourceId, always: bool, do_bind: F) -> Result<bool>
    where
        F: FnOnce() -> Result<()>,
    {
        let redundant = self.last_bound.get(&slot) == Some(&candidate);
        if redundant && !always && !self.always_rebind {
            self.stats.suppressed += 1;
            return Ok(false);
        }

        if let Err(e) = do_bind() {
            self.last_bound.remove(&slot);
            return Err(e);
        }

        self.last_bound.insert(slot, candidate);
        self.stats.performed += 1;
        Ok(true)
    }

    #[inline]
    #[must_use]
    pub fn last_bound(&self, slot: BindSlot) -> Option<ResourceId> {
        self.last_bound.get(&slot).copied()
    }

    /// Forgets all bound state (new device, or state clobbered externally).
    pub fn reset(&mut self) {
        self.last_bound.clear();
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> BindStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = BindStats::default();
    }
}
