use std::borrow::Cow;

use crate::resources::ResourceHandle;
use crate::scene::ComponentKey;

/// Position of a layer inside its [`Scene`](crate::scene::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) usize);

impl LayerId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// An ordered run of draws sharing some per-layer state.
///
/// Bindees (viewport, render target, depth buffer...) are bound once when
/// the layer starts; components are drawn in list order, which
/// [`Scene::sort_for`](crate::scene::Scene::sort_for) sorts by descriptor.
#[derive(Debug)]
pub struct Layer {
    name: Cow<'static, str>,
    pub(crate) components: Vec<ComponentKey>,
    pub(crate) bindees: Vec<ResourceHandle>,
}

impl Layer {
    pub(crate) fn new(name: Cow<'static, str>) -> Self {
        Self {
            name,
            components: Vec::new(),
            bindees: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn components(&self) -> &[ComponentKey] {
        &self.components
    }

    #[inline]
    #[must_use]
    pub fn bindees(&self) -> &[ResourceHandle] {
        &self.bindees
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
