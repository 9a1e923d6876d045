//! [Arena memory allocated](https://en.wikipedia.org/wiki/Region-based_memory_management)
//! node storage shared by all linked structures of this crate.
//!
//! Nodes never hold pointers to each other. Links are [ArenaIndex] handles into the arena
//! that owns the nodes. A handle carries the generation of its slot: once a node is released,
//! the slot's generation is bumped and every handle to the old node is rejected with
//! [LinkTreeError::Released] instead of silently aliasing whatever reuses the slot.

pub mod iterators;

pub use iterators::{TraversalIterator, Walk};

use crate::{LinkTreeError, Result};
use core::fmt;
use std::collections::HashSet;
use tracing::trace;

/// Handle of a node in an [Arena].
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, PartialOrd, Ord)]
pub struct ArenaIndex {
    slot: usize,
    generation: u32,
}

impl ArenaIndex {
    /// Position in the arena allocation
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Number of times the slot had been released when this handle was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ArenaIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.slot, self.generation)
    }
}

#[derive(Debug)]
enum Slot<N> {
    Occupied { generation: u32, node: N },
    Vacant { generation: u32, next_free: Option<usize> },
}

impl<N> Slot<N> {
    fn generation(&self) -> u32 {
        match self {
            Slot::Occupied { generation, .. } | Slot::Vacant { generation, .. } => *generation,
        }
    }
}

/// Generational arena. Released slots are chained into a free list and recycled.
#[derive(Debug)]
pub struct Arena<N> {
    slots: Vec<Slot<N>>,
    free_head: Option<usize>,
    n_free: usize,
}

impl<N> Arena<N> {
    pub fn new() -> Self {
        Arena {
            slots: vec![],
            free_head: None,
            n_free: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Arena {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            n_free: 0,
        }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.slots.len() - self.n_free
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes sure that the next `additional` calls to [Arena::insert] cannot fail.
    ///
    /// Operations that insert several nodes reserve first, so a failing allocation never
    /// leaves a partially rewired structure behind.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let missing = additional.saturating_sub(self.n_free);
        if missing > 0 {
            self.slots.try_reserve(missing)?;
        }
        Ok(())
    }

    /// Moves a node into the arena and returns its handle
    pub fn insert(&mut self, node: N) -> Result<ArenaIndex> {
        self.reserve(1)?;
        let index = match self.free_head {
            Some(slot) => {
                let generation = self.slots[slot].generation();
                let vacated = std::mem::replace(&mut self.slots[slot], Slot::Occupied { generation, node });
                self.free_head = match vacated {
                    Slot::Vacant { next_free, .. } => next_free,
                    Slot::Occupied { .. } => unreachable!("free list points to an occupied slot"),
                };
                self.n_free -= 1;
                ArenaIndex { slot, generation }
            }
            None => {
                let slot = self.slots.len();
                self.slots.push(Slot::Occupied { generation: 0, node });
                ArenaIndex { slot, generation: 0 }
            }
        };
        trace!(%index, "allocated node");
        Ok(index)
    }

    /// Releases a node and returns it. The handle (and all copies of it) becomes stale.
    pub fn remove(&mut self, index: ArenaIndex) -> Result<N> {
        if !self.contains(index) {
            return Err(LinkTreeError::Released(index));
        }
        let vacant = Slot::Vacant {
            generation: index.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        match std::mem::replace(&mut self.slots[index.slot], vacant) {
            Slot::Occupied { node, .. } => {
                self.free_head = Some(index.slot);
                self.n_free += 1;
                trace!(%index, "released node");
                Ok(node)
            }
            Slot::Vacant { .. } => unreachable!("checked to be occupied"),
        }
    }

    pub fn contains(&self, index: ArenaIndex) -> bool {
        matches!(
            self.slots.get(index.slot),
            Some(Slot::Occupied { generation, .. }) if *generation == index.generation
        )
    }

    pub fn get(&self, index: ArenaIndex) -> Result<&N> {
        match self.slots.get(index.slot) {
            Some(Slot::Occupied { generation, node }) if *generation == index.generation => Ok(node),
            _ => Err(LinkTreeError::Released(index)),
        }
    }

    pub fn get_mut(&mut self, index: ArenaIndex) -> Result<&mut N> {
        match self.slots.get_mut(index.slot) {
            Some(Slot::Occupied { generation, node }) if *generation == index.generation => Ok(node),
            _ => Err(LinkTreeError::Released(index)),
        }
    }

    /// Iterates over all live nodes in slot order
    pub fn iter(&self) -> impl Iterator<Item = (ArenaIndex, &N)> {
        self.slots.iter().enumerate().filter_map(|(slot, entry)| match entry {
            Slot::Occupied { generation, node } => Some((
                ArenaIndex {
                    slot,
                    generation: *generation,
                },
                node,
            )),
            Slot::Vacant { .. } => None,
        })
    }
}

impl<N> Arena<N>
where
    N: Nodelike,
{
    /// Releases a node and, transitively, every node reachable through owning links.
    /// Returns the number of released nodes.
    ///
    /// All reachable nodes are collected before the first one is released. If one of them
    /// is stale ([LinkTreeError::Released]) or reached twice ([LinkTreeError::CycleDetected]),
    /// nothing is released.
    pub fn remove_deep(&mut self, root: ArenaIndex) -> Result<usize> {
        let doomed = self.owned_from(root)?;
        for index in doomed.iter().copied() {
            self.remove(index)?;
        }
        Ok(doomed.len())
    }

    /// `root` and every node reachable from it through owning links, parents first.
    /// Iterative, so long chains and degenerate trees do not exhaust the call stack.
    fn owned_from(&self, root: ArenaIndex) -> Result<Vec<ArenaIndex>> {
        let mut visited = HashSet::new();
        let mut pending = vec![root];
        let mut owned = vec![];
        while let Some(index) = pending.pop() {
            if !visited.insert(index) {
                return Err(LinkTreeError::CycleDetected(index));
            }
            pending.extend(self.get(index)?.successors());
            owned.push(index);
        }
        Ok(owned)
    }
}

impl<N> Default for Arena<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Container that holds a payload and owning links to other nodes.
///
/// Only *owning* links are reported as successors. Back-references (e.g., `prev` or a
/// parent) are never followed by traversals.
pub trait Nodelike {
    fn value(&self) -> Option<f64>;

    /// Owning links in traversal order
    fn successors(&self) -> impl DoubleEndedIterator<Item = ArenaIndex> + '_;

    fn is_leaf(&self) -> bool {
        self.successors().next().is_none()
    }
}
