//! Trees whose nodes own their children.
//!
//! Both tree kinds keep a non-owning parent reference per node. It is used to unlink a
//! released subtree from its parent and to refuse adopting a node that already has one.

pub mod binary;
pub mod general;

pub use binary::{BinaryTree, BinaryTrees, InOrderIterator};
pub use general::{GeneralTree, GeneralTrees};
