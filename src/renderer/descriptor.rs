//! Render descriptors
//!
//! What a draw component produces after syncing with a renderer: a small
//! sortable header and the full list of bindings the draw depends on.
//!
//! # Ordering
//!
//! Ordering and equality look at the header only (primary identity, then
//! type tag). Two descriptors with equal headers compare equal no matter
//! what their binding lists contain, so a stable sort keeps their relative
//! order.

use std::cmp::Ordering;

use smallvec::SmallVec;

use super::RendererId;
use crate::backend::BindSlot;
use crate::resources::ResourceId;

/// Sort / dedup key of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorHeader {
    pub primary: ResourceId,
    pub type_tag: u32,
}

/// One dependency of a draw: which object, bound where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub id: ResourceId,
    pub slot: BindSlot,
}

#[derive(Debug, Clone)]
pub struct RenderDescriptor {
    header: DescriptorHeader,
    bindings: SmallVec<[Binding; 12]>,
    renderer: RendererId,
}

impl RenderDescriptor {
    #[must_use]
    pub fn new(renderer: RendererId, primary: ResourceId, type_tag: u32) -> Self {
        Self {
            header: DescriptorHeader { primary, type_tag },
            bindings: SmallVec::new(),
            renderer,
        }
    }

    /// Appends a dependency. A binding already present is not duplicated.
    pub fn push(&mut self, id: ResourceId, slot: BindSlot) {
        let binding = Binding { id, slot };
        if !self.bindings.contains(&binding) {
            self.bindings.push(binding);
        }
    }

    #[must_use]
    pub fn with(mut self, id: ResourceId, slot: BindSlot) -> Self {
        self.push(id, slot);
        self
    }

    #[inline]
    #[must_use]
    pub fn header(&self) -> DescriptorHeader {
        self.header
    }

    /// Renderer the descriptor was produced under.
    #[inline]
    #[must_use]
    pub fn renderer(&self) -> RendererId {
        self.renderer
    }

    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Every identity the draw depends on, in insertion order.
    pub fn identities(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.bindings.iter().map(|b| b.id)
    }

    #[must_use]
    pub fn contains(&self, id: ResourceId) -> bool {
        self.bindings.iter().any(|b| b.id == id)
    }
}

impl PartialEq for RenderDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
    }
}

impl Eq for RenderDescriptor {}

impl PartialOrd for RenderDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RenderDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.header.cmp(&other.header)
    }
}
