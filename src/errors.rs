//! Provides the error type used throughout this crate.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::ArenaIndex;

/// The error type used throughout this crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkTreeError {
    /// An inserting operation received an empty value
    #[error("Cannot insert a node without a value")]
    InvalidArgument,
    /// The arena could not grow to hold new nodes
    #[error("Could not allocate node storage: {0}")]
    AllocationFailure(#[from] TryReserveError),
    /// The handle refers to a node that has been released (or never existed)
    #[error("Node {0} has been released")]
    Released(ArenaIndex),
    /// A checked traversal reached a node twice
    #[error("Cycle detected at node {0}")]
    CycleDetected(ArenaIndex),
    /// A tree node was adopted while it still has a parent
    #[error("Node {0} already has a parent")]
    AlreadyAdopted(ArenaIndex),
}

/// Shortcut for results of this crate
pub type Result<T> = std::result::Result<T, LinkTreeError>;
