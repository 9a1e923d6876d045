//! Binary search trees.
//!
//! For every node, all values in the left subtree are smaller than the node's value and
//! all values in the right subtree are greater or equal (duplicates are routed right).
//! Values are ordered by [f64::total_cmp]; the empty value sorts before every number.

use crate::{
    render::BinaryDisplay, Arena, ArenaIndex, LinkTreeError, Nodelike, Order, Result, TraversalIterator,
    DEFAULT_MAX_DEPTH,
};
use itertools::Itertools;
use std::cmp::Ordering;
use tracing::{debug, trace};
use tracing_attributes::instrument;

/// Total order on node values: empty first, then [f64::total_cmp]
fn compare(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.total_cmp(&b),
    }
}

/// A node of a binary (search) tree
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryTree {
    value: Option<f64>,
    left: Option<ArenaIndex>,
    right: Option<ArenaIndex>,
    parent: Option<ArenaIndex>,
}

impl BinaryTree {
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn left(&self) -> Option<ArenaIndex> {
        self.left
    }

    pub fn right(&self) -> Option<ArenaIndex> {
        self.right
    }

    pub fn parent(&self) -> Option<ArenaIndex> {
        self.parent
    }
}

impl Nodelike for BinaryTree {
    fn value(&self) -> Option<f64> {
        self.value
    }

    fn successors(&self) -> impl DoubleEndedIterator<Item = ArenaIndex> + '_ {
        self.left.into_iter().chain(self.right)
    }
}

/// In-order (left, node, right) iterator, yielding values in ascending order for search trees
pub struct InOrderIterator<'a> {
    nodes: &'a Arena<BinaryTree>,
    stack: Vec<ArenaIndex>,
    current: Option<ArenaIndex>,
}

impl<'a> InOrderIterator<'a> {
    fn new(nodes: &'a Arena<BinaryTree>, root: Option<ArenaIndex>, max_depth: usize) -> Self {
        InOrderIterator {
            nodes,
            stack: Vec::with_capacity(max_depth),
            current: root,
        }
    }
}

impl<'a> Iterator for InOrderIterator<'a> {
    type Item = Result<(ArenaIndex, &'a BinaryTree)>;

    fn next(&mut self) -> Option<Self::Item> {
        // descend to the leftmost node not visited yet
        while let Some(index) = self.current {
            match self.nodes.get(index) {
                Ok(node) => {
                    self.stack.push(index);
                    self.current = node.left;
                }
                Err(error) => {
                    self.current = None;
                    self.stack.clear();
                    return Some(Err(error));
                }
            }
        }
        let index = self.stack.pop()?;
        Some(self.nodes.get(index).map(|node| {
            self.current = node.right;
            (index, node)
        }))
    }
}

/// Arena that owns the nodes of any number of [BinaryTree]s
#[derive(Debug)]
pub struct BinaryTrees {
    nodes: Arena<BinaryTree>,
    max_depth: usize,
}

impl BinaryTrees {
    pub fn new() -> Self {
        BinaryTrees {
            nodes: Arena::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        BinaryTrees {
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

    pub fn node(&self, node: ArenaIndex) -> Result<&BinaryTree> {
        self.nodes.get(node)
    }

    pub fn value(&self, node: ArenaIndex) -> Result<Option<f64>> {
        Ok(self.nodes.get(node)?.value)
    }

    /// Overwrites the value of a node. This can break the search tree ordering.
    pub fn set_value(&mut self, node: ArenaIndex, value: impl Into<Option<f64>>) -> Result<()> {
        self.nodes.get_mut(node)?.value = value.into();
        Ok(())
    }

    fn check_adoptable(&self, child: Option<ArenaIndex>) -> Result<()> {
        if let Some(child) = child {
            if self.nodes.get(child)?.parent.is_some() {
                return Err(LinkTreeError::AlreadyAdopted(child));
            }
        }
        Ok(())
    }

    /// Creates a node that adopts `left` and `right`. Search tree ordering is not checked.
    pub fn create(
        &mut self,
        value: impl Into<Option<f64>>,
        left: Option<ArenaIndex>,
        right: Option<ArenaIndex>,
    ) -> Result<ArenaIndex> {
        self.check_adoptable(left)?;
        self.check_adoptable(right)?;
        if let Some(child) = left.filter(|_| left == right) {
            return Err(LinkTreeError::AlreadyAdopted(child));
        }
        let index = self.nodes.insert(BinaryTree {
            value: value.into(),
            left,
            right,
            parent: None,
        })?;
        for child in left.into_iter().chain(right) {
            self.nodes.get_mut(child)?.parent = Some(index);
        }
        Ok(index)
    }

    /// Creates a leaf without value
    pub fn create_empty(&mut self) -> Result<ArenaIndex> {
        self.create(None::<f64>, None, None)
    }

    /// Inserts `value` into the search tree rooted in `root` and returns the root.
    ///
    /// Without a root, a new single-node tree is created. Otherwise, the tree is descended
    /// to the left for smaller values and to the right for others (including duplicates)
    /// until a free slot is found. The empty value is accepted and sorts first.
    pub fn insert(&mut self, root: Option<ArenaIndex>, value: impl Into<Option<f64>>) -> Result<ArenaIndex> {
        let value = value.into();
        let Some(root) = root else {
            return self.create(value, None, None);
        };

        let mut current = root;
        let mut depth = 1;
        let goes_left = loop {
            let node = self.nodes.get(current)?;
            let goes_left = compare(value, node.value) == Ordering::Less;
            let child = if goes_left { node.left } else { node.right };
            match child {
                Some(child) => current = child,
                None => break goes_left,
            }
            depth += 1;
        };

        let leaf = self.nodes.insert(BinaryTree {
            value,
            left: None,
            right: None,
            parent: Some(current),
        })?;
        let parent = self.nodes.get_mut(current)?;
        if goes_left {
            parent.left = Some(leaf);
        } else {
            parent.right = Some(leaf);
        }
        trace!(%root, %leaf, depth, "inserted into search tree");
        Ok(root)
    }

    /// Inserts all values, returning the (possibly new) root
    pub fn insert_many<I, V>(&mut self, root: Option<ArenaIndex>, values: I) -> Result<Option<ArenaIndex>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Option<f64>>,
    {
        values
            .into_iter()
            .try_fold(root, |root, value| self.insert(root, value).map(Some))
    }

    /// Looks up a node with the given value
    pub fn find(&self, root: Option<ArenaIndex>, value: impl Into<Option<f64>>) -> Result<Option<ArenaIndex>> {
        let value = value.into();
        let mut current = root;
        while let Some(index) = current {
            let node = self.nodes.get(index)?;
            current = match compare(value, node.value) {
                Ordering::Less => node.left,
                Ordering::Equal => return Ok(Some(index)),
                Ordering::Greater => node.right,
            };
        }
        Ok(None)
    }

    /// In-order iteration. An empty tree (`None`) yields nothing.
    pub fn iter_in_order(&self, root: Option<ArenaIndex>) -> InOrderIterator<'_> {
        InOrderIterator::new(&self.nodes, root, self.max_depth)
    }

    /// Values in in-order, that is, sorted ascending for a search tree. The number of
    /// nodes is the length of the result.
    #[instrument(level = "trace", skip(self))]
    pub fn sorted_values(&self, root: Option<ArenaIndex>) -> Result<Vec<Option<f64>>> {
        self.iter_in_order(root).map_ok(|(_, node)| node.value).collect()
    }

    /// Pre-order or breadth-first iteration. Unchecked: does not terminate on cycles.
    pub fn iter(&self, root: ArenaIndex, order: Order) -> TraversalIterator<'_, BinaryTree> {
        TraversalIterator::new(&self.nodes, root, order, self.max_depth)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn depth_first_traverse(&self, root: ArenaIndex) -> Result<Vec<ArenaIndex>> {
        self.iter(root, Order::DepthFirst).map_ok(|(index, _)| index).collect()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn breadth_first_traverse(&self, root: ArenaIndex) -> Result<Vec<ArenaIndex>> {
        self.iter(root, Order::BreadthFirst).map_ok(|(index, _)| index).collect()
    }

    /// Removes the link from the parent of `node` (if any)
    fn unlink_from_parent(&mut self, node: ArenaIndex) -> Result<()> {
        if let Some(parent) = self.nodes.get_mut(node)?.parent.take() {
            let parent = self.nodes.get_mut(parent)?;
            if parent.left == Some(node) {
                parent.left = None;
            }
            if parent.right == Some(node) {
                parent.right = None;
            }
        }
        Ok(())
    }

    /// Shallow release: releases the direct children of `node`. Their own children survive
    /// as roots of their own trees and are returned (left before right).
    pub fn free_children(&mut self, node: ArenaIndex) -> Result<Vec<ArenaIndex>> {
        let parent = self.nodes.get_mut(node)?;
        let children = [parent.left.take(), parent.right.take()];
        let mut orphans = vec![];
        for child in children.into_iter().flatten() {
            let released = self.nodes.remove(child)?;
            for orphan in released.successors() {
                self.nodes.get_mut(orphan)?.parent = None;
                orphans.push(orphan);
            }
        }
        debug!(%node, n_orphans = orphans.len(), "released children");
        Ok(orphans)
    }

    /// Deep release: releases both subtrees of `node`. `node` itself is untouched.
    pub fn free_children_deep(&mut self, node: ArenaIndex) -> Result<()> {
        let parent = self.nodes.get_mut(node)?;
        let children = [parent.left.take(), parent.right.take()];
        let mut released = 0;
        for child in children.into_iter().flatten() {
            released += self.nodes.remove_deep(child)?;
        }
        debug!(%node, released, "released subtrees");
        Ok(())
    }

    /// Releases `node` and both its subtrees. `node` is unlinked from its parent.
    pub fn free_deep(&mut self, node: ArenaIndex) -> Result<()> {
        self.unlink_from_parent(node)?;
        let released = self.nodes.remove_deep(node)?;
        debug!(%node, released, "released tree");
        Ok(())
    }

    /// Renders the subtree as `5(3(1, 4), 8)`, with `X` for a missing child
    pub fn display(&self, root: ArenaIndex) -> BinaryDisplay<'_> {
        BinaryDisplay::new(&self.nodes, root)
    }
}

impl Default for BinaryTrees {
    fn default() -> Self {
        Self::new()
    }
}
