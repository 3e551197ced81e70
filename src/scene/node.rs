use crate::scene::NodeHandle;
use glam::Affine3A;

/// One frame of reference in the [`TransformGraph`](crate::scene::TransformGraph).
///
/// # Transforms
///
/// - `local`: authored motion (animation, controllers)
/// - `global`: pivot / offset relative to the parent
/// - `total`: cached world transform, `parent_total * global * local`
///
/// `total` is only meaningful while the node is clean. Writes to `local` or
/// `global` go through the graph, which marks the node and its whole subtree
/// dirty; only a traversal makes them clean again.
///
/// # Hierarchy
///
/// - `parent`: generation-checked handle, `None` for roots
/// - `children`: handles used to cascade invalidation and traversal
#[derive(Debug, Clone)]
pub struct TransformNode {
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub(crate) local: Affine3A,
    pub(crate) global: Affine3A,
    pub(crate) total: Affine3A,
    pub(crate) dirty: bool,
}

impl TransformNode {
    /// New nodes start dirty: their total has never been computed.
    #[must_use]
    pub fn new(local: Affine3A, global: Affine3A) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            local,
            global,
            total: Affine3A::IDENTITY,
            dirty: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn local(&self) -> &Affine3A {
        &self.local
    }

    #[inline]
    #[must_use]
    pub fn global(&self) -> &Affine3A {
        &self.global
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// `global * local`: the node's placement relative to its parent.
    #[inline]
    #[must_use]
    pub fn relative(&self) -> Affine3A {
        self.global * self.local
    }
}

impl Default for TransformNode {
    fn default() -> Self {
        Self::new(Affine3A::IDENTITY, Affine3A::IDENTITY)
    }
}
