//! Linked lists. A list has no container object of its own: any node can serve as the
//! head (or anchor) of the chain reachable from it. The arena a node lives in
//! ([SingleLinks], [DoubleLinks]) provides the operations.
//!
//! Counting, reversal, and traversal assume acyclic chains. Cycles have to be avoided by
//! the caller; the `*_checked` variants detect them at the cost of a visited set.

pub mod double;
pub mod single;

pub use double::{DoubleLink, DoubleLinks};
pub use single::{SingleLink, SingleLinks};

use crate::{LinkTreeError, Result};

/// Checks a sequence of values for insertion and collects them. Nothing has been
/// inserted if this fails.
pub(crate) fn non_empty_values<I, V>(values: I) -> Result<Vec<f64>>
where
    I: IntoIterator<Item = V>,
    V: Into<Option<f64>>,
{
    values
        .into_iter()
        .map(|value| value.into().ok_or(LinkTreeError::InvalidArgument))
        .collect()
}
