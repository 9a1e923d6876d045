//! Singly-linked lists

use super::non_empty_values;
use crate::{render::ChainDisplay, Arena, ArenaIndex, LinkTreeError, Nodelike, Result, Span, Walk};
use itertools::Itertools;
use tracing::debug;

/// A forward-only chain node. `next` is an owning link.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleLink {
    value: Option<f64>,
    next: Option<ArenaIndex>,
}

impl SingleLink {
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn next(&self) -> Option<ArenaIndex> {
        self.next
    }
}

impl Nodelike for SingleLink {
    fn value(&self) -> Option<f64> {
        self.value
    }

    fn successors(&self) -> impl DoubleEndedIterator<Item = ArenaIndex> + '_ {
        self.next.into_iter()
    }
}

/// Arena that owns [SingleLink] nodes of any number of chains.
#[derive(Debug, Default)]
pub struct SingleLinks {
    nodes: Arena<SingleLink>,
}

impl SingleLinks {
    pub fn new() -> Self {
        SingleLinks { nodes: Arena::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        SingleLinks {
            nodes: Arena::with_capacity(capacity),
        }
    }

    /// Number of live nodes in all chains
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

    pub fn node(&self, link: ArenaIndex) -> Result<&SingleLink> {
        self.nodes.get(link)
    }

    pub fn value(&self, link: ArenaIndex) -> Result<Option<f64>> {
        Ok(self.nodes.get(link)?.value)
    }

    pub fn next(&self, link: ArenaIndex) -> Result<Option<ArenaIndex>> {
        Ok(self.nodes.get(link)?.next)
    }

    pub fn set_value(&mut self, link: ArenaIndex, value: impl Into<Option<f64>>) -> Result<()> {
        self.nodes.get_mut(link)?.value = value.into();
        Ok(())
    }

    /// Creates a node in front of `next`. The value is not validated and may be empty.
    ///
    /// The new node takes over `next`, which fails with [LinkTreeError::AlreadyAdopted]
    /// if another node already links to it.
    pub fn create(&mut self, value: impl Into<Option<f64>>, next: Option<ArenaIndex>) -> Result<ArenaIndex> {
        if let Some(next) = next {
            self.nodes.get(next)?;
            if self.nodes.iter().any(|(_, link)| link.next == Some(next)) {
                return Err(LinkTreeError::AlreadyAdopted(next));
            }
        }
        self.nodes.insert(SingleLink {
            value: value.into(),
            next,
        })
    }

    /// Creates a solitary node without value
    pub fn create_empty(&mut self) -> Result<ArenaIndex> {
        self.create(None::<f64>, None)
    }

    /// Forward walk over the chain, starting with `head`
    pub fn iter(&self, head: ArenaIndex) -> Walk<'_, SingleLink, fn(&SingleLink) -> Option<ArenaIndex>> {
        Walk::new(&self.nodes, Some(head), SingleLink::next as fn(&SingleLink) -> Option<ArenaIndex>)
    }

    /// Number of links after `head`. Does not terminate on a cyclic chain.
    pub fn count_next(&self, head: ArenaIndex) -> Result<usize> {
        Ok(self.iter(head).process_results(|walk| walk.count())? - 1)
    }

    /// Like [SingleLinks::count_next] but fails with [LinkTreeError::CycleDetected] on cyclic chains
    pub fn count_next_checked(&self, head: ArenaIndex) -> Result<usize> {
        Ok(self.iter(head).checked().process_results(|walk| walk.count())? - 1)
    }

    /// Number of links in the chain including `head`
    pub fn count_links(&self, head: ArenaIndex) -> Result<usize> {
        Ok(self.count_next(head)? + 1)
    }

    pub fn count_links_checked(&self, head: ArenaIndex) -> Result<usize> {
        Ok(self.count_next_checked(head)? + 1)
    }

    /// Values of the chain starting with `head`
    pub fn values(&self, head: ArenaIndex) -> Result<Vec<Option<f64>>> {
        self.iter(head).map_ok(|(_, link)| link.value).collect()
    }

    /// Inserts a new node between `head` and its next link and returns it.
    pub fn insert_one(&mut self, head: ArenaIndex, value: impl Into<Option<f64>>) -> Result<ArenaIndex> {
        let value = value.into().ok_or(LinkTreeError::InvalidArgument)?;
        let next = self.nodes.get(head)?.next;
        let inserted = self.nodes.insert(SingleLink {
            value: Some(value),
            next,
        })?;
        self.nodes.get_mut(head)?.next = Some(inserted);
        Ok(inserted)
    }

    /// Inserts new nodes between `head` and its next link, in the order given.
    ///
    /// Returns the first and the last inserted node, or `None` if `values` is empty.
    /// All values are checked and storage is reserved up front: on error, the chain is unchanged.
    pub fn insert_many<I, V>(&mut self, head: ArenaIndex, values: I) -> Result<Option<Span>>
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

        let mut last = head;
        let mut first = None;
        for value in values.iter().copied() {
            last = self.insert_one(last, value)?;
            first.get_or_insert(last);
        }
        debug!(%head, inserted = values.len(), "inserted links");
        Ok(first.map(|first| (first, last)))
    }

    /// Reverses the chain starting at `head` and returns the new head (the former tail).
    ///
    /// The chain is validated before any link is rewired. Any predecessor of `head`
    /// still points to `head`, which becomes the tail.
    pub fn reverse(&mut self, head: ArenaIndex) -> Result<ArenaIndex> {
        let n_next = self.count_next(head)?;

        let mut previous = None;
        let mut current = head;
        loop {
            let link = self.nodes.get_mut(current)?;
            let next = std::mem::replace(&mut link.next, previous);
            match next {
                Some(next) => {
                    previous = Some(current);
                    current = next;
                }
                None => break,
            }
        }
        debug!(%head, new_head = %current, n_links = n_next + 1, "reversed chain");
        Ok(current)
    }

    /// Releases all links after `head` (but not `head` itself); `head` becomes the tail.
    pub fn free_next_links(&mut self, head: ArenaIndex) -> Result<()> {
        let released = match self.nodes.get(head)?.next {
            Some(next) => self.nodes.remove_deep(next)?,
            None => 0,
        };
        self.nodes.get_mut(head)?.next = None;
        debug!(%head, released, "released next links");
        Ok(())
    }

    /// Releases `head` and all links after it
    pub fn free_deep(&mut self, head: ArenaIndex) -> Result<()> {
        let released = self.nodes.remove_deep(head)?;
        debug!(%head, released, "released chain");
        Ok(())
    }

    /// Renders the chain as `[1]-->[2]-->[X]`
    pub fn display(&self, head: ArenaIndex) -> ChainDisplay<'_, SingleLink> {
        ChainDisplay::new(&self.nodes, head, "-->", false)
    }
}
