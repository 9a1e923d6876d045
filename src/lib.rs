//! ## About
//!
//! This crate contains elementary linked structures for learning about ownership in
//! self-referential node graphs:
//!
//! * [SingleLinks] – forward-only chains
//! * [DoubleLinks] – bidirectional chains
//! * [GeneralTrees] – trees with an ordered, resizable list of children per node
//! * [BinaryTrees] – binary search trees
//!
//! All nodes live in an [arena](https://en.wikipedia.org/wiki/Region-based_memory_management)
//! owned by the respective container and are addressed through generational [ArenaIndex] handles.
//! Owning links (`next`, children) and back-references (`prev`, parents) are both handles, but
//! only owning links are followed when releasing nodes deeply. Released handles become stale;
//! using them again yields [LinkTreeError::Released] rather than undefined behavior.
//!
//! Every node carries an `Option<f64>` payload. `None` is the *empty* value.
//!
//! ## Naming conventions
//! * Structs – substantives; containers use the plural of the node they hold
//! * Methods – imperative forms with the exception of getters and factories, which
//!             use substantives (i.e., omit a `get_` prefix) much like the standard library.
//!             Methods that release nodes start with `free_`.

pub mod arena;
pub mod errors;
pub mod link;
pub mod render;
pub mod tree;

pub use arena::{Arena, ArenaIndex, Nodelike, TraversalIterator, Walk};
pub use arena::iterators::{
    Order,
    Order::{BreadthFirst, DepthFirst},
};
pub use errors::{LinkTreeError, Result};
pub use link::{DoubleLink, DoubleLinks, SingleLink, SingleLinks};
pub use render::{BinaryDisplay, ChainDisplay, TreeDisplay};
pub use tree::{BinaryTree, BinaryTrees, GeneralTree, GeneralTrees, InOrderIterator};

/// First and last node inserted by the bulk insertion methods
pub type Span = (ArenaIndex, ArenaIndex);

/// Capacity hint for the stacks and queues used in tree traversals
pub const DEFAULT_MAX_DEPTH: usize = 42;
