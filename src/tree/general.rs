//! Trees with an ordered, resizable list of children per node.
//!
//! Children are owning links; every node also keeps a back-reference to its parent.
//! The parent reference is what makes adoption safe: a node can only be adopted while
//! it has no parent, and never by one of its own descendants.

use crate::{
    render::TreeDisplay, Arena, ArenaIndex, LinkTreeError, Nodelike, Order, Result, TraversalIterator,
    DEFAULT_MAX_DEPTH,
};
use itertools::Itertools;
use std::collections::HashSet;
use tracing::debug;
use tracing_attributes::instrument;

/// A node of a general (N-ary) tree
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralTree {
    value: Option<f64>,
    children: Vec<ArenaIndex>,
    parent: Option<ArenaIndex>,
}

impl GeneralTree {
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn children(&self) -> &[ArenaIndex] {
        &self.children
    }

    /// Number of direct children
    pub fn n_children(&self) -> usize {
        self.children.len()
    }

    pub fn parent(&self) -> Option<ArenaIndex> {
        self.parent
    }
}

impl Nodelike for GeneralTree {
    fn value(&self) -> Option<f64> {
        self.value
    }

    fn successors(&self) -> impl DoubleEndedIterator<Item = ArenaIndex> + '_ {
        self.children.iter().copied()
    }
}

/// Arena that owns the nodes of any number of [GeneralTree]s
#[derive(Debug)]
pub struct GeneralTrees {
    nodes: Arena<GeneralTree>,
    max_depth: usize,
}

impl GeneralTrees {
    pub fn new() -> Self {
        GeneralTrees {
            nodes: Arena::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        GeneralTrees {
            nodes: Arena::with_capacity(capacity),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the capacity hint for traversals. Does not limit the depth of the trees.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.nodes.reserve(additional)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: ArenaIndex) -> bool {
        self.nodes.contains(node)
    }

    pub fn node(&self, node: ArenaIndex) -> Result<&GeneralTree> {
        self.nodes.get(node)
    }

    pub fn value(&self, node: ArenaIndex) -> Result<Option<f64>> {
        Ok(self.nodes.get(node)?.value)
    }

    pub fn set_value(&mut self, node: ArenaIndex, value: impl Into<Option<f64>>) -> Result<()> {
        self.nodes.get_mut(node)?.value = value.into();
        Ok(())
    }

    pub fn children(&self, node: ArenaIndex) -> Result<&[ArenaIndex]> {
        Ok(&self.nodes.get(node)?.children)
    }

    /// Number of direct children
    pub fn count(&self, node: ArenaIndex) -> Result<usize> {
        Ok(self.nodes.get(node)?.children.len())
    }

    /// Checks that `parent` may adopt `children`: they exist, are distinct, are not
    /// attached elsewhere, and are neither `parent` itself nor one of its ancestors.
    fn check_adoptable(&self, parent: Option<ArenaIndex>, children: &[ArenaIndex]) -> Result<()> {
        let mut seen = HashSet::with_capacity(children.len());
        for child in children.iter().copied() {
            self.nodes.get(child)?;
            if !seen.insert(child) {
                return Err(LinkTreeError::AlreadyAdopted(child));
            }
        }
        let mut ancestor = parent;
        while let Some(index) = ancestor {
            if seen.contains(&index) {
                return Err(LinkTreeError::CycleDetected(index));
            }
            ancestor = self.nodes.get(index)?.parent;
        }
        for child in children.iter().copied() {
            if self.nodes.get(child)?.parent.is_some_and(|p| Some(p) != parent) {
                return Err(LinkTreeError::AlreadyAdopted(child));
            }
        }
        Ok(())
    }

    fn attach(&mut self, parent: ArenaIndex, children: &[ArenaIndex]) -> Result<()> {
        for child in children.iter().copied() {
            self.nodes.get_mut(child)?.parent = Some(parent);
        }
        Ok(())
    }

    fn detach(&mut self, children: &[ArenaIndex]) -> Result<()> {
        for child in children.iter().copied() {
            self.nodes.get_mut(child)?.parent = None;
        }
        Ok(())
    }

    /// Removes `node` from the children of its parent (if any)
    fn unlink_from_parent(&mut self, node: ArenaIndex) -> Result<()> {
        if let Some(parent) = self.nodes.get_mut(node)?.parent.take() {
            self.nodes.get_mut(parent)?.children.retain(|child| *child != node);
        }
        Ok(())
    }

    /// Creates a node that adopts `children`. Ownership is transferred, nothing is copied.
    pub fn create(&mut self, value: impl Into<Option<f64>>, children: Vec<ArenaIndex>) -> Result<ArenaIndex> {
        self.check_adoptable(None, &children)?;
        let n_children = children.len();
        let index = self.nodes.insert(GeneralTree {
            value: value.into(),
            children: vec![],
            parent: None,
        })?;
        self.attach(index, &children)?;
        self.nodes.get_mut(index)?.children = children;
        debug!(%index, n_children, "created tree node");
        Ok(index)
    }

    /// Creates a leaf without value
    pub fn create_empty(&mut self) -> Result<ArenaIndex> {
        self.create(None::<f64>, vec![])
    }

    /// Creates one leaf per value, e.g., to be passed to [GeneralTrees::create] or
    /// [GeneralTrees::set_children]. Empty values are allowed.
    pub fn make_children<I, V>(&mut self, values: I) -> Result<Vec<ArenaIndex>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Option<f64>>,
    {
        let values = values.into_iter().map(Into::into).collect_vec();
        self.nodes.reserve(values.len())?;
        values
            .into_iter()
            .map(|value| {
                self.nodes.insert(GeneralTree {
                    value,
                    children: vec![],
                    parent: None,
                })
            })
            .collect()
    }

    /// Detaches and returns all children of `node`. The children survive as roots of
    /// their own trees; releasing them is now up to the caller.
    pub fn take_children(&mut self, node: ArenaIndex) -> Result<Vec<ArenaIndex>> {
        let children = std::mem::take(&mut self.nodes.get_mut(node)?.children);
        self.detach(&children)?;
        Ok(children)
    }

    /// Replaces the children of `node`. Previous children are *not* released but detached
    /// and returned; a child present in both lists stays attached and is not returned.
    pub fn set_children(&mut self, node: ArenaIndex, children: Vec<ArenaIndex>) -> Result<Vec<ArenaIndex>> {
        self.check_adoptable(Some(node), &children)?;
        let previous = std::mem::take(&mut self.nodes.get_mut(node)?.children);
        let dropped = previous.into_iter().filter(|child| !children.contains(child)).collect_vec();
        self.detach(&dropped)?;
        self.attach(node, &children)?;
        debug!(%node, n_children = children.len(), n_dropped = dropped.len(), "replaced children");
        self.nodes.get_mut(node)?.children = children;
        Ok(dropped)
    }

    /// Releases the nodes in `nodes` (e.g., created by [GeneralTrees::make_children]).
    ///
    /// With `deep`, all their descendants are released as well. Otherwise, their children
    /// survive as roots and are returned.
    pub fn free_all(&mut self, nodes: &[ArenaIndex], deep: bool) -> Result<Vec<ArenaIndex>> {
        let mut orphans = vec![];
        for node in nodes.iter().copied() {
            if deep {
                self.free_deep(node)?;
            } else {
                self.unlink_from_parent(node)?;
                let released = self.nodes.remove(node)?;
                self.detach(&released.children)?;
                orphans.extend(released.children);
            }
        }
        Ok(orphans)
    }

    /// Shallow release: releases the direct children of `node`. The grandchildren survive
    /// as roots of their own trees and are returned. `node` itself is untouched.
    pub fn free_children(&mut self, node: ArenaIndex) -> Result<Vec<ArenaIndex>> {
        let children = std::mem::take(&mut self.nodes.get_mut(node)?.children);
        self.detach(&children)?;
        let orphans = self.free_all(&children, false)?;
        debug!(%node, released = children.len(), n_orphans = orphans.len(), "released children");
        Ok(orphans)
    }

    /// Deep release: releases all descendants of `node`. `node` itself is untouched.
    pub fn free_children_deep(&mut self, node: ArenaIndex) -> Result<()> {
        let children = std::mem::take(&mut self.nodes.get_mut(node)?.children);
        let mut released = 0;
        for child in children {
            released += self.nodes.remove_deep(child)?;
        }
        debug!(%node, released, "released subtrees");
        Ok(())
    }

    /// Releases `node` and all its descendants. `node` is removed from its parent's children.
    pub fn free_deep(&mut self, node: ArenaIndex) -> Result<()> {
        self.unlink_from_parent(node)?;
        let released = self.nodes.remove_deep(node)?;
        debug!(%node, released, "released tree");
        Ok(())
    }

    /// Iterates over the subtree rooted in `root`. Unchecked: does not terminate on cycles.
    pub fn iter(&self, root: ArenaIndex, order: Order) -> TraversalIterator<'_, GeneralTree> {
        TraversalIterator::new(&self.nodes, root, order, self.max_depth)
    }

    /// Collects the subtree rooted in `root` in the given order
    #[instrument(level = "trace", skip(self))]
    pub fn traverse(&self, root: ArenaIndex, order: Order) -> Result<Vec<ArenaIndex>> {
        self.iter(root, order).map_ok(|(index, _)| index).collect()
    }

    /// Pre-order traversal (node before its children, children first to last). The
    /// number of visited nodes is the length of the result.
    pub fn depth_first_traverse(&self, root: ArenaIndex) -> Result<Vec<ArenaIndex>> {
        self.traverse(root, Order::DepthFirst)
    }

    /// Like [GeneralTrees::depth_first_traverse] but fails with [LinkTreeError::CycleDetected]
    /// instead of looping if a node is reachable twice.
    #[instrument(level = "trace", skip(self))]
    pub fn depth_first_traverse_checked(&self, root: ArenaIndex) -> Result<Vec<ArenaIndex>> {
        self.iter(root, Order::DepthFirst)
            .checked()
            .map_ok(|(index, _)| index)
            .collect()
    }

    pub fn breadth_first_traverse(&self, root: ArenaIndex) -> Result<Vec<ArenaIndex>> {
        self.traverse(root, Order::BreadthFirst)
    }

    /// Values of the subtree rooted in `root` in the given order
    pub fn values(&self, root: ArenaIndex, order: Order) -> Result<Vec<Option<f64>>> {
        self.iter(root, order).map_ok(|(_, node)| node.value).collect()
    }

    /// Renders the subtree as `1(2, 3(4))`
    pub fn display(&self, root: ArenaIndex) -> TreeDisplay<'_, GeneralTree> {
        TreeDisplay::new(&self.nodes, root)
    }
}

impl Default for GeneralTrees {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Layout used in most tests
    ///
    /// ```text
    ///     1
    ///    / \
    ///   2   3
    ///  / \   \
    /// 4   5   6
    /// ```
    fn sample(trees: &mut GeneralTrees) -> ArenaIndex {
        let left = trees.make_children([4.0, 5.0]).unwrap();
        let right = trees.make_children([6.0]).unwrap();
        let two = trees.create(2.0, left).unwrap();
        let three = trees.create(3.0, right).unwrap();
        trees.create(1.0, vec![two, three]).unwrap()
    }

    fn values(trees: &GeneralTrees, nodes: &[ArenaIndex]) -> Vec<f64> {
        nodes.iter().map(|n| trees.value(*n).unwrap().unwrap()).collect_vec()
    }

    #[test_log::test]
    fn test_depth_first_traverse() {
        let mut trees = GeneralTrees::new();
        let children = trees.make_children([2.0, 3.0]).unwrap();
        let root = trees.create(1.0, children).unwrap();

        let result = trees.depth_first_traverse(root).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(values(&trees, &result), &[1.0, 2.0, 3.0]);
        assert_eq!(trees.count(root).unwrap(), 2);
    }

    #[test_log::test]
    fn test_traversal_orders() {
        let mut trees = GeneralTrees::new().with_max_depth(3);
        let root = sample(&mut trees);

        let depth = trees.depth_first_traverse(root).unwrap();
        assert_eq!(values(&trees, &depth), &[1.0, 2.0, 4.0, 5.0, 3.0, 6.0]);
        assert_eq!(trees.depth_first_traverse_checked(root).unwrap(), depth);

        let breadth = trees.breadth_first_traverse(root).unwrap();
        assert_eq!(values(&trees, &breadth), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let sub = trees.depth_first_traverse(depth[1]).unwrap();
        assert_eq!(values(&trees, &sub), &[2.0, 4.0, 5.0]);

        let leaf = trees.depth_first_traverse(depth[2]).unwrap();
        assert_eq!(leaf, &[depth[2]]);
    }

    #[test_log::test]
    fn test_create_rejects_double_adoption() {
        let mut trees = GeneralTrees::new();
        let children = trees.make_children([2.0, 3.0]).unwrap();
        let root = trees.create(1.0, children.clone()).unwrap();

        assert_eq!(
            trees.create(7.0, vec![children[0]]),
            Err(LinkTreeError::AlreadyAdopted(children[0]))
        );
        let loose = trees.create_empty().unwrap();
        assert_eq!(
            trees.create(7.0, vec![loose, loose]),
            Err(LinkTreeError::AlreadyAdopted(loose))
        );
        assert_eq!(trees.node(children[0]).unwrap().parent(), Some(root));
        assert_eq!(trees.len(), 4);
    }

    #[test_log::test]
    fn test_set_children_cannot_create_cycles() {
        let mut trees = GeneralTrees::new();
        let root = sample(&mut trees);
        let two = trees.children(root).unwrap()[0];
        let four = trees.children(two).unwrap()[0];

        // `root` has no parent, but it is an ancestor of `four`
        assert_eq!(
            trees.set_children(four, vec![root]),
            Err(LinkTreeError::CycleDetected(root))
        );
        assert_eq!(trees.set_children(two, vec![two]), Err(LinkTreeError::CycleDetected(two)));
        assert_eq!(trees.depth_first_traverse(root).unwrap().len(), 6);
    }

    #[test_log::test]
    fn test_take_and_set_children() {
        let mut trees = GeneralTrees::new();
        let root = sample(&mut trees);
        let taken = trees.take_children(root).unwrap();
        assert_eq!(values(&trees, &taken), &[2.0, 3.0]);
        assert_eq!(trees.count(root).unwrap(), 0);
        assert!(trees.node(root).unwrap().is_leaf());
        assert_eq!(trees.node(taken[0]).unwrap().parent(), None);

        // re-parent in reversed order
        let dropped = trees.set_children(root, vec![taken[1], taken[0]]).unwrap();
        assert!(dropped.is_empty());
        let depth = trees.depth_first_traverse(root).unwrap();
        assert_eq!(values(&trees, &depth), &[1.0, 3.0, 6.0, 2.0, 4.0, 5.0]);

        // swapping keeps shared children and hands back the others
        let new = trees.make_children([7.0]).unwrap();
        let dropped = trees.set_children(root, vec![taken[0], new[0]]).unwrap();
        assert_eq!(dropped, &[taken[1]]);
        assert_eq!(trees.node(taken[1]).unwrap().parent(), None);
        assert_eq!(trees.node(taken[0]).unwrap().parent(), Some(root));
        // nothing has been released
        assert_eq!(trees.len(), 7);
    }

    #[test_log::test]
    fn test_free_children_shallow() {
        let mut trees = GeneralTrees::new();
        let root = sample(&mut trees);

        let orphans = trees.free_children(root).unwrap();
        assert_eq!(values(&trees, &orphans), &[4.0, 5.0, 6.0]);
        assert_eq!(trees.count(root).unwrap(), 0);
        assert_eq!(trees.value(root).unwrap(), Some(1.0));
        assert_eq!(trees.len(), 4);
        assert!(orphans.iter().all(|o| trees.node(*o).unwrap().parent().is_none()));
    }

    #[test_log::test]
    fn test_free_children_deep() {
        let mut trees = GeneralTrees::new();
        let root = sample(&mut trees);
        let other = trees.create_empty().unwrap();

        trees.free_children_deep(root).unwrap();
        assert_eq!(trees.count(root).unwrap(), 0);
        assert_eq!(trees.value(root).unwrap(), Some(1.0));
        assert_eq!(trees.len(), 2);
        assert!(trees.contains(other));
    }

    #[test_log::test]
    fn test_free_deep_detaches_from_parent() {
        let mut trees = GeneralTrees::new();
        let root = sample(&mut trees);
        let two = trees.children(root).unwrap()[0];

        trees.free_deep(two).unwrap();
        assert_eq!(trees.count(root).unwrap(), 1);
        assert_eq!(trees.values(root, Order::DepthFirst).unwrap(), &[Some(1.0), Some(3.0), Some(6.0)]);

        trees.free_deep(root).unwrap();
        assert!(trees.is_empty());
        assert_eq!(trees.free_deep(root), Err(LinkTreeError::Released(root)));
    }

    #[test_log::test]
    fn test_free_all() {
        let mut trees = GeneralTrees::new();
        let leaves = trees.make_children([Some(1.0), None, Some(3.0)]).unwrap();
        assert_eq!(trees.value(leaves[1]).unwrap(), None);
        assert!(trees.free_all(&leaves, false).unwrap().is_empty());
        assert!(trees.is_empty());

        let root = sample(&mut trees);
        let children = trees.children(root).unwrap().to_vec();
        assert!(trees.free_all(&children, true).unwrap().is_empty());
        assert_eq!(trees.len(), 1);
        assert_eq!(trees.count(root).unwrap(), 0);
    }

    #[test_log::test]
    fn test_checked_traversal_reports_corrupted_tree() {
        let mut trees = GeneralTrees::new();
        let root = sample(&mut trees);
        let leaf = trees.depth_first_traverse(root).unwrap()[2];
        // bypasses the adoption checks on purpose
        trees.nodes.get_mut(leaf).unwrap().children.push(root);

        assert_eq!(
            trees.depth_first_traverse_checked(root),
            Err(LinkTreeError::CycleDetected(root))
        );
    }
}
