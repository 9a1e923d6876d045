/*! Iterators over nodes stored in an [Arena]. None of them protect against cycles unless
 * created with `checked()`; an unchecked walk over a cyclic structure does not terminate. */

use super::{Arena, ArenaIndex, Nodelike};
use crate::{LinkTreeError, Result};
use std::collections::{HashSet, VecDeque};

/// Order of tree traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Pre-order: a node before its children, children from first to last
    DepthFirst,
    /// Level by level, from the root downwards
    BreadthFirst,
}

/// Follows a single link (e.g., `next` or `prev`) starting with (and including) a node.
pub struct Walk<'a, N, F> {
    arena: &'a Arena<N>,
    current: Option<ArenaIndex>,
    step: F,
    visited: Option<HashSet<ArenaIndex>>,
}

impl<'a, N, F> Walk<'a, N, F>
where
    F: Fn(&N) -> Option<ArenaIndex>,
{
    pub fn new(arena: &'a Arena<N>, start: Option<ArenaIndex>, step: F) -> Self {
        Walk {
            arena,
            current: start,
            step,
            visited: None,
        }
    }

    /// Remember visited nodes and stop with [LinkTreeError::CycleDetected] on the first revisit
    pub fn checked(mut self) -> Self {
        self.visited = Some(HashSet::new());
        self
    }
}

impl<'a, N, F> Iterator for Walk<'a, N, F>
where
    F: Fn(&N) -> Option<ArenaIndex>,
{
    type Item = Result<(ArenaIndex, &'a N)>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current.take()?;
        if let Some(visited) = self.visited.as_mut() {
            if !visited.insert(index) {
                return Some(Err(LinkTreeError::CycleDetected(index)));
            }
        }
        Some(self.arena.get(index).map(|node| {
            self.current = (self.step)(node);
            (index, node)
        }))
    }
}

/// Iterator for depth- or breadth-first traversal along the owning links ([Nodelike::successors]).
pub struct TraversalIterator<'a, N> {
    arena: &'a Arena<N>,
    order: Order,
    pending: VecDeque<ArenaIndex>,
    visited: Option<HashSet<ArenaIndex>>,
}

impl<'a, N> TraversalIterator<'a, N>
where
    N: Nodelike,
{
    /// `max_depth` is only a capacity hint for the internal queue
    pub fn new(arena: &'a Arena<N>, root: ArenaIndex, order: Order, max_depth: usize) -> Self {
        let mut pending = VecDeque::with_capacity(max_depth);
        pending.push_back(root);
        TraversalIterator {
            arena,
            order,
            pending,
            visited: None,
        }
    }

    /// Remember visited nodes and stop with [LinkTreeError::CycleDetected] on the first revisit
    pub fn checked(mut self) -> Self {
        self.visited = Some(HashSet::new());
        self
    }

    fn fail(&mut self, error: LinkTreeError) -> Option<Result<(ArenaIndex, &'a N)>> {
        self.pending.clear();
        Some(Err(error))
    }
}

impl<'a, N> Iterator for TraversalIterator<'a, N>
where
    N: Nodelike,
{
    type Item = Result<(ArenaIndex, &'a N)>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = match self.order {
            Order::DepthFirst => self.pending.pop_back()?,
            Order::BreadthFirst => self.pending.pop_front()?,
        };
        if let Some(visited) = self.visited.as_mut() {
            if !visited.insert(index) {
                return self.fail(LinkTreeError::CycleDetected(index));
            }
        }
        let node = match self.arena.get(index) {
            Ok(node) => node,
            Err(error) => return self.fail(error),
        };
        match self.order {
            // reversed, so the first child is popped first
            Order::DepthFirst => self.pending.extend(node.successors().rev()),
            Order::BreadthFirst => self.pending.extend(node.successors()),
        }
        Some(Ok((index, node)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    /// Minimal node with an arbitrary number of owning links
    struct Fanout(f64, Vec<ArenaIndex>);

    impl Nodelike for Fanout {
        fn value(&self) -> Option<f64> {
            Some(self.0)
        }

        fn successors(&self) -> impl DoubleEndedIterator<Item = ArenaIndex> + '_ {
            self.1.iter().copied()
        }
    }

    fn values<'a>(iter: impl Iterator<Item = Result<(ArenaIndex, &'a Fanout)>>) -> Vec<f64> {
        iter.map_ok(|(_, n)| n.0).collect::<Result<Vec<_>>>().unwrap()
    }

    #[test_log::test]
    fn test_traversal_orders() {
        //     0
        //    / \
        //   1   4
        //  / \
        // 2   3
        let mut arena = Arena::new();
        let two = arena.insert(Fanout(2.0, vec![])).unwrap();
        let three = arena.insert(Fanout(3.0, vec![])).unwrap();
        let one = arena.insert(Fanout(1.0, vec![two, three])).unwrap();
        let four = arena.insert(Fanout(4.0, vec![])).unwrap();
        let root = arena.insert(Fanout(0.0, vec![one, four])).unwrap();

        let depth = values(TraversalIterator::new(&arena, root, Order::DepthFirst, 4));
        assert_eq!(depth, &[0.0, 1.0, 2.0, 3.0, 4.0]);

        let breadth = values(TraversalIterator::new(&arena, root, Order::BreadthFirst, 4));
        assert_eq!(breadth, &[0.0, 1.0, 4.0, 2.0, 3.0]);

        let sub = values(TraversalIterator::new(&arena, one, Order::DepthFirst, 4));
        assert_eq!(sub, &[1.0, 2.0, 3.0]);
        assert!(arena.get(two).unwrap().is_leaf());
        assert!(!arena.get(one).unwrap().is_leaf());
    }

    #[test_log::test]
    fn test_checked_traversal_reports_cycle() {
        let mut arena = Arena::new();
        let leaf = arena.insert(Fanout(1.0, vec![])).unwrap();
        let root = arena.insert(Fanout(0.0, vec![leaf])).unwrap();
        arena.get_mut(leaf).unwrap().1.push(root);

        let result = TraversalIterator::new(&arena, root, Order::DepthFirst, 4)
            .checked()
            .collect::<Result<Vec<_>>>();
        assert_eq!(result.err(), Some(LinkTreeError::CycleDetected(root)));
    }

    #[test_log::test]
    fn test_walk_stops_at_released_node() {
        let mut arena: Arena<(f64, Option<ArenaIndex>)> = Arena::new();
        let tail = arena.insert((2.0, None)).unwrap();
        let head = arena.insert((1.0, Some(tail))).unwrap();
        assert_eq!(Walk::new(&arena, Some(head), |n| n.1).count(), 2);

        arena.remove(tail).unwrap();
        let result = Walk::new(&arena, Some(head), |n| n.1).collect::<Result<Vec<_>>>();
        assert_eq!(result.err(), Some(LinkTreeError::Released(tail)));
    }

    #[test_log::test]
    fn test_checked_walk_reports_cycle() {
        let mut arena: Arena<(f64, Option<ArenaIndex>)> = Arena::new();
        let first = arena.insert((1.0, None)).unwrap();
        let second = arena.insert((2.0, Some(first))).unwrap();
        arena.get_mut(first).unwrap().1 = Some(second);

        let result = Walk::new(&arena, Some(first), |n| n.1).checked().take(10).collect::<Result<Vec<_>>>();
        assert_eq!(result.err(), Some(LinkTreeError::CycleDetected(first)));
    }
}
