//! Doubly-linked lists.
//!
//! `next` is the owning direction, `prev` is a back-reference. Every operation that rewires
//! a node restores the symmetry `a.next == b <=> b.prev == a` on both neighbours before it returns.

use super::non_empty_values;
use crate::{render::ChainDisplay, Arena, ArenaIndex, LinkTreeError, Nodelike, Result, Span, Walk};
use itertools::Itertools;
use tracing::debug;

/// Shortcut for walks along one direction of a [DoubleLink] chain
pub type DoubleWalk<'a> = Walk<'a, DoubleLink, fn(&DoubleLink) -> Option<ArenaIndex>>;

/// A bidirectional chain node
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleLink {
    value: Option<f64>,
    prev: Option<ArenaIndex>,
    next: Option<ArenaIndex>,
}

impl DoubleLink {
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn prev(&self) -> Option<ArenaIndex> {
        self.prev
    }

    pub fn next(&self) -> Option<ArenaIndex> {
        self.next
    }
}

impl Nodelike for DoubleLink {
    fn value(&self) -> Option<f64> {
        self.value
    }

    fn successors(&self) -> impl DoubleEndedIterator<Item = ArenaIndex> + '_ {
        self.next.into_iter()
    }
}

/// Arena that owns [DoubleLink] nodes of any number of chains.
#[derive(Debug, Default)]
pub struct DoubleLinks {
    nodes: Arena<DoubleLink>,
}

impl DoubleLinks {
    pub fn new() -> Self {
        DoubleLinks { nodes: Arena::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        DoubleLinks {
            nodes: Arena::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Reserves storage for `additional` more nodes, see [Arena::reserve]
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.nodes.reserve(additional)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, link: ArenaIndex) -> bool {
        self.nodes.contains(link)
    }

    pub fn node(&self, link: ArenaIndex) -> Result<&DoubleLink> {
        self.nodes.get(link)
    }

    pub fn value(&self, link: ArenaIndex) -> Result<Option<f64>> {
        Ok(self.nodes.get(link)?.value)
    }

    pub fn prev(&self, link: ArenaIndex) -> Result<Option<ArenaIndex>> {
        Ok(self.nodes.get(link)?.prev)
    }

    pub fn next(&self, link: ArenaIndex) -> Result<Option<ArenaIndex>> {
        Ok(self.nodes.get(link)?.next)
    }

    pub fn set_value(&mut self, link: ArenaIndex, value: impl Into<Option<f64>>) -> Result<()> {
        self.nodes.get_mut(link)?.value = value.into();
        Ok(())
    }

    /// Creates a solitary node. The value is not validated and may be empty.
    /// Use [DoubleLinks::insert_prev] and [DoubleLinks::insert_next] to grow a chain around it.
    pub fn create(&mut self, value: impl Into<Option<f64>>) -> Result<ArenaIndex> {
        self.create_between(value, None, None)
    }

    /// Creates a node between `prev` and `next` and links both neighbours back to it.
    /// The value is not validated and may be empty.
    ///
    /// `prev` has to be a tail or the predecessor of `next`, and `next` has to be a head or
    /// the successor of `prev`. Otherwise the call fails with [LinkTreeError::AlreadyAdopted].
    /// Connecting the tail of a chain to its own head fails with [LinkTreeError::CycleDetected].
    pub fn create_between(
        &mut self,
        value: impl Into<Option<f64>>,
        prev: Option<ArenaIndex>,
        next: Option<ArenaIndex>,
    ) -> Result<ArenaIndex> {
        if let Some(prev) = prev {
            let taken = self.nodes.get(prev)?.next;
            if taken.is_some() && taken != next {
                return Err(LinkTreeError::AlreadyAdopted(prev));
            }
        }
        if let Some(next) = next {
            let taken = self.nodes.get(next)?.prev;
            if taken.is_some() && taken != prev {
                return Err(LinkTreeError::AlreadyAdopted(next));
            }
        }
        if let (Some(prev), Some(next)) = (prev, next) {
            let joins = self.nodes.get(prev)?.next.is_none();
            if joins
                && self
                    .iter_next(next)
                    .process_results(|mut walk| walk.any(|(index, _)| index == prev))?
            {
                return Err(LinkTreeError::CycleDetected(next));
            }
        }

        let created = self.nodes.insert(DoubleLink {
            value: value.into(),
            prev,
            next,
        })?;
        if let Some(prev) = prev {
            self.nodes.get_mut(prev)?.next = Some(created);
        }
        if let Some(next) = next {
            self.nodes.get_mut(next)?.prev = Some(created);
        }
        Ok(created)
    }

    pub fn create_empty(&mut self) -> Result<ArenaIndex> {
        self.create(None::<f64>)
    }

    /// Walk along `next`, starting with (and including) `link`
    pub fn iter_next(&self, link: ArenaIndex) -> DoubleWalk<'_> {
        Walk::new(&self.nodes, Some(link), DoubleLink::next as fn(&DoubleLink) -> Option<ArenaIndex>)
    }

    /// Walk along `prev`, starting with (and including) `link`
    pub fn iter_prev(&self, link: ArenaIndex) -> DoubleWalk<'_> {
        Walk::new(&self.nodes, Some(link), DoubleLink::prev as fn(&DoubleLink) -> Option<ArenaIndex>)
    }

    /// Number of links before `link`. Does not terminate on a cyclic chain.
    pub fn count_prev(&self, link: ArenaIndex) -> Result<usize> {
        Ok(self.iter_prev(link).process_results(|walk| walk.count())? - 1)
    }

    /// Number of links after `link`. Does not terminate on a cyclic chain.
    pub fn count_next(&self, link: ArenaIndex) -> Result<usize> {
        Ok(self.iter_next(link).process_results(|walk| walk.count())? - 1)
    }

    /// Number of links in the whole chain `link` is part of
    pub fn count_links(&self, link: ArenaIndex) -> Result<usize> {
        Ok(self.count_prev(link)? + self.count_next(link)? + 1)
    }

    pub fn count_prev_checked(&self, link: ArenaIndex) -> Result<usize> {
        Ok(self.iter_prev(link).checked().process_results(|walk| walk.count())? - 1)
    }

    pub fn count_next_checked(&self, link: ArenaIndex) -> Result<usize> {
        Ok(self.iter_next(link).checked().process_results(|walk| walk.count())? - 1)
    }

    pub fn count_links_checked(&self, link: ArenaIndex) -> Result<usize> {
        Ok(self.count_prev_checked(link)? + self.count_next_checked(link)? + 1)
    }

    /// Values from `link` to the tail
    pub fn values(&self, link: ArenaIndex) -> Result<Vec<Option<f64>>> {
        self.iter_next(link).map_ok(|(_, node)| node.value).collect()
    }

    /// Inserts a new node between `head.prev` and `head` and returns it.
    pub fn insert_prev(&mut self, head: ArenaIndex, value: impl Into<Option<f64>>) -> Result<ArenaIndex> {
        let value = value.into().ok_or(LinkTreeError::InvalidArgument)?;
        let prev = self.nodes.get(head)?.prev;
        if let Some(prev) = prev {
            self.nodes.get(prev)?;
        }
        let inserted = self.nodes.insert(DoubleLink {
            value: Some(value),
            prev,
            next: Some(head),
        })?;
        if let Some(prev) = prev {
            self.nodes.get_mut(prev)?.next = Some(inserted);
        }
        self.nodes.get_mut(head)?.prev = Some(inserted);
        Ok(inserted)
    }

    /// Inserts a new node between `head` and `head.next` and returns it.
    pub fn insert_next(&mut self, head: ArenaIndex, value: impl Into<Option<f64>>) -> Result<ArenaIndex> {
        let value = value.into().ok_or(LinkTreeError::InvalidArgument)?;
        let next = self.nodes.get(head)?.next;
        if let Some(next) = next {
            self.nodes.get(next)?;
        }
        let inserted = self.nodes.insert(DoubleLink {
            value: Some(value),
            prev: Some(head),
            next,
        })?;
        if let Some(next) = next {
            self.nodes.get_mut(next)?.prev = Some(inserted);
        }
        self.nodes.get_mut(head)?.next = Some(inserted);
        Ok(inserted)
    }

    /// Inserts new nodes right before `head` such that they appear in the given order.
    ///
    /// Returns the first (farthest from `head`) and last (adjacent to `head`) inserted node,
    /// or `None` if `values` is empty. Every value is checked before anything is inserted.
    pub fn insert_prev_many<I, V>(&mut self, head: ArenaIndex, values: I) -> Result<Option<Span>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Option<f64>>,
    {
        let values = non_empty_values(values)?;
        self.nodes.get(head)?;
        if values.is_empty() {
            return Ok(None);
        }
        self.nodes.reserve(values.len())?;

        let mut first = None;
        let mut last = head;
        for value in values.iter().copied() {
            last = self.insert_prev(head, value)?;
            first.get_or_insert(last);
        }
        debug!(%head, inserted = values.len(), "inserted prev links");
        Ok(first.map(|first| (first, last)))
    }

    /// Inserts new nodes right after `head`, in the given order.
    ///
    /// Returns the first (adjacent to `head`) and last inserted node, or `None` if `values`
    /// is empty. Every value is checked before anything is inserted.
    pub fn insert_next_many<I, V>(&mut self, head: ArenaIndex, values: I) -> Result<Option<Span>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Option<f64>>,
    {
        let values = non_empty_values(values)?;
        self.nodes.get(head)?;
        if values.is_empty() {
            return Ok(None);
        }
        self.nodes.reserve(values.len())?;

        let mut first = None;
        let mut last = head;
        for value in values.iter().copied() {
            last = self.insert_next(last, value)?;
            first.get_or_insert(last);
        }
        debug!(%head, inserted = values.len(), "inserted next links");
        Ok(first.map(|first| (first, last)))
    }

    /// Reverses the part of the chain from `head` to the tail and returns the new head
    /// (the former tail).
    ///
    /// `prev` and `next` are swapped on every node of that part. A predecessor of `head`
    /// is reconnected to the new head, so the chain as a whole stays well-formed.
    pub fn reverse(&mut self, head: ArenaIndex) -> Result<ArenaIndex> {
        let before = self.nodes.get(head)?.prev;
        if let Some(before) = before {
            self.nodes.get(before)?;
        }
        let n_next = self.count_next(head)?;

        let mut current = head;
        loop {
            let link = self.nodes.get_mut(current)?;
            std::mem::swap(&mut link.prev, &mut link.next);
            // `prev` now holds the former `next`
            match link.prev {
                Some(next) => current = next,
                None => break,
            }
        }
        self.nodes.get_mut(head)?.next = None;
        self.nodes.get_mut(current)?.prev = before;
        if let Some(before) = before {
            self.nodes.get_mut(before)?.next = Some(current);
        }
        debug!(%head, new_head = %current, n_links = n_next + 1, "reversed chain");
        Ok(current)
    }

    /// Releases all links before `link` (but not `link` itself)
    pub fn free_prev_links(&mut self, link: ArenaIndex) -> Result<()> {
        let mut current = self.nodes.get_mut(link)?.prev.take();
        let mut released = 0;
        while let Some(index) = current {
            current = self.nodes.remove(index)?.prev;
            released += 1;
        }
        debug!(%link, released, "released prev links");
        Ok(())
    }

    /// Releases all links after `link` (but not `link` itself)
    pub fn free_next_links(&mut self, link: ArenaIndex) -> Result<()> {
        let released = match self.nodes.get(link)?.next {
            Some(next) => self.nodes.remove_deep(next)?,
            None => 0,
        };
        self.nodes.get_mut(link)?.next = None;
        debug!(%link, released, "released next links");
        Ok(())
    }

    /// Releases the whole chain `link` is part of. Each node is visited exactly once,
    /// no matter where in the chain `link` is.
    pub fn free_deep(&mut self, link: ArenaIndex) -> Result<()> {
        self.free_prev_links(link)?;
        self.free_next_links(link)?;
        self.nodes.remove(link)?;
        Ok(())
    }

    /// Renders the chain from `link` to the tail as `[1]===[2]===[X]`. If `link` has
    /// predecessors, the output starts with `[...]===`.
    pub fn display(&self, link: ArenaIndex) -> ChainDisplay<'_, DoubleLink> {
        let truncated = matches!(self.prev(link), Ok(Some(_)));
        ChainDisplay::new(&self.nodes, link, "===", truncated)
    }
}
