//! Transform graph
//!
//! Arena of [`TransformNode`]s addressed by generation-checked
//! [`NodeHandle`]s. Removing a node removes its subtree; handles to removed
//! nodes simply stop resolving.
//!
//! # Frame contract
//!
//! 1. apply this frame's edits (`set_local`, `set_global`, `set_parent`)
//! 2. [`TransformGraph::traverse_all`] exactly once
//! 3. read totals
//!
//! Reading a total between 1 and 2 is a contract violation and panics.

use glam::{Affine3A, Vec3};
use slotmap::SlotMap;

use crate::errors::{Result, VesperError};
use crate::scene::NodeHandle;
use crate::scene::node::TransformNode;

#[derive(Debug, Default)]
pub struct TransformGraph {
    nodes: SlotMap<NodeHandle, TransformNode>,
    roots: Vec<NodeHandle>,
}

impl TransformGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Construction / removal
    // ========================================================================

    /// Adds an identity root node.
    pub fn create_node(&mut self) -> NodeHandle {
        self.create_node_with(Affine3A::IDENTITY, Affine3A::IDENTITY)
    }

    /// Adds a root node with the given local and global transforms.
    pub fn create_node_with(&mut self, local: Affine3A, global: Affine3A) -> NodeHandle {
        let handle = self.nodes.insert(TransformNode::new(local, global));
        self.roots.push(handle);
        handle
    }

    /// Adds a node directly under `parent`. `global` is taken as relative to
    /// the parent (no world-placement preservation, unlike [`set_parent`](Self::set_parent)).
    pub fn add_child(&mut self, parent: NodeHandle, local: Affine3A, global: Affine3A) -> Result<NodeHandle> {
        if !self.nodes.contains_key(parent) {
            return Err(VesperError::MissingNode);
        }
        let mut node = TransformNode::new(local, global);
        node.parent = Some(parent);
        let handle = self.nodes.insert(node);
        self.nodes[parent].children.push(handle);
        Ok(handle)
    }

    /// Removes a node and its whole subtree. Returns `false` if the handle
    /// was already stale.
    pub fn remove_node(&mut self, handle: NodeHandle) -> bool {
        let Some(node) = self.nodes.get(handle) else {
            return false;
        };
        let parent = node.parent;
        self.unlink(handle, parent);

        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(removed) = self.nodes.remove(current) {
                stack.extend(removed.children);
            }
        }
        true
    }

    fn unlink(&mut self, handle: NodeHandle, parent: Option<NodeHandle>) {
        match parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(p)
                    && let Some(i) = parent_node.children.iter().position(|&c| c == handle)
                {
                    parent_node.children.remove(i);
                }
            }
            None => {
                if let Some(i) = self.roots.iter().position(|&r| r == handle) {
                    self.roots.remove(i);
                }
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    #[inline]
    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&TransformNode> {
        self.nodes.get(handle)
    }

    #[must_use]
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.nodes.get(handle).map_or(&[], |n| n.children.as_slice())
    }

    #[must_use]
    pub fn local(&self, handle: NodeHandle) -> Option<&Affine3A> {
        self.nodes.get(handle).map(|n| &n.local)
    }

    #[must_use]
    pub fn global(&self, handle: NodeHandle) -> Option<&Affine3A> {
        self.nodes.get(handle).map(|n| &n.global)
    }

    /// `true` for dirty nodes and for stale handles.
    #[must_use]
    pub fn is_dirty(&self, handle: NodeHandle) -> bool {
        self.nodes.get(handle).is_none_or(|n| n.dirty)
    }

    /// Cached world transform.
    ///
    /// # Panics
    ///
    /// Panics if the node is dirty (edited since the last traversal) or the
    /// handle is stale.
    #[must_use]
    pub fn total(&self, handle: NodeHandle) -> &Affine3A {
        let node = self
            .nodes
            .get(handle)
            .unwrap_or_else(|| panic!("total() on removed node {handle:?}"));
        assert!(
            !node.dirty,
            "total() on dirty node {handle:?}: traverse the graph before reading transforms"
        );
        &node.total
    }

    /// Cached world transform, or `None` when dirty or stale.
    #[must_use]
    pub fn try_total(&self, handle: NodeHandle) -> Option<&Affine3A> {
        self.nodes
            .get(handle)
            .filter(|n| !n.dirty)
            .map(|n| &n.total)
    }

    /// World translation of a clean node. Same preconditions as [`total`](Self::total).
    #[must_use]
    pub fn world_position(&self, handle: NodeHandle) -> Vec3 {
        self.total(handle).translation.into()
    }

    /// World transform computed on the spot from the ancestor chain,
    /// regardless of dirty state. Identity for stale handles.
    #[must_use]
    pub fn compute_world(&self, handle: NodeHandle) -> Affine3A {
        let mut world = Affine3A::IDENTITY;
        let mut current = Some(handle);
        while let Some(h) = current {
            let Some(node) = self.nodes.get(h) else {
                break;
            };
            world = node.relative() * world;
            current = node.parent;
        }
        world
    }

    /// Whether `handle` sits somewhere below `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, handle: NodeHandle, ancestor: NodeHandle) -> bool {
        let mut current = self.parent(handle);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.parent(h);
        }
        false
    }

    // ========================================================================
    // Edits
    // ========================================================================

    pub fn set_local(&mut self, handle: NodeHandle, local: Affine3A) -> Result<()> {
        let node = self.nodes.get_mut(handle).ok_or(VesperError::MissingNode)?;
        node.local = local;
        self.mark_dirty(handle);
        Ok(())
    }

    pub fn set_global(&mut self, handle: NodeHandle, global: Affine3A) -> Result<()> {
        let node = self.nodes.get_mut(handle).ok_or(VesperError::MissingNode)?;
        node.global = global;
        self.mark_dirty(handle);
        Ok(())
    }

    /// Edits `local` in place.
    pub fn update_local(&mut self, handle: NodeHandle, f: impl FnOnce(&mut Affine3A)) -> Result<()> {
        let node = self.nodes.get_mut(handle).ok_or(VesperError::MissingNode)?;
        f(&mut node.local);
        self.mark_dirty(handle);
        Ok(())
    }

    /// Marks a node and every descendant dirty.
    pub fn mark_dirty(&mut self, handle: NodeHandle) {
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current) else {
                continue;
            };
            // A dirty node always has a dirty subtree.
            if node.dirty && current != handle {
                continue;
            }
            node.dirty = true;
            stack.extend_from_slice(&node.children);
        }
    }

    /// Moves `handle` under `new_parent` (or to the roots with `None`),
    /// keeping its world placement: `global` is recomputed as
    /// `inverse(new_parent_world) * old_parent_world * global`.
    pub fn set_parent(&mut self, handle: NodeHandle, new_parent: Option<NodeHandle>) -> Result<()> {
        let Some(node) = self.nodes.get(handle) else {
            return Err(VesperError::MissingNode);
        };
        let old_parent = node.parent;
        if old_parent == new_parent {
            return Ok(());
        }

        if let Some(p) = new_parent {
            if !self.nodes.contains_key(p) {
                return Err(VesperError::MissingNode);
            }
            if p == handle {
                return Err(VesperError::InvalidHierarchy(format!(
                    "{handle:?} cannot be its own parent"
                )));
            }
            if self.is_descendant_of(p, handle) {
                return Err(VesperError::InvalidHierarchy(format!(
                    "{p:?} is a descendant of {handle:?}"
                )));
            }
        }

        let old_parent_world = old_parent.map_or(Affine3A::IDENTITY, |p| self.compute_world(p));
        let new_parent_world = new_parent.map_or(Affine3A::IDENTITY, |p| self.compute_world(p));

        self.unlink(handle, old_parent);
        match new_parent {
            Some(p) => self.nodes[p].children.push(handle),
            None => self.roots.push(handle),
        }

        let node = &mut self.nodes[handle];
        node.global = new_parent_world.inverse() * old_parent_world * node.global;
        node.parent = new_parent;
        self.mark_dirty(handle);
        Ok(())
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Recomputes totals for `root` and its subtree; the only way back to clean.
    ///
    /// Nodes that are clean and whose parent did not change are skipped.
    ///
    /// # Panics
    ///
    /// Panics if `root` has a dirty parent: totals must be computed top-down.
    pub fn traverse(&mut self, root: NodeHandle) {
        let Some(node) = self.nodes.get(root) else {
            return;
        };
        let parent_total = match node.parent {
            Some(p) => *self.total(p),
            None => Affine3A::IDENTITY,
        };

        // (node, parent total, parent recomputed)
        let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);
        stack.push((root, parent_total, false));

        while let Some((handle, parent_total, parent_changed)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };

            let recompute = node.dirty || parent_changed;
            if recompute {
                node.total = parent_total * node.global * node.local;
                node.dirty = false;
            }

            let total = node.total;
            for &child in node.children.iter().rev() {
                stack.push((child, total, recompute));
            }
        }
    }

    /// Traverses every root. Call once per frame after all edits.
    pub fn traverse_all(&mut self) {
        for i in 0..self.roots.len() {
            let root = self.roots[i];
            self.traverse(root);
        }
    }
}
