/*! Human-readable rendering of chains and trees for debugging.
 *
 * The adapters only borrow the arena and walk owning links, so rendering never changes
 * a structure. A node that cannot be reached (released handle) ends the output with `[!]`.
 */

use crate::{Arena, ArenaIndex, BinaryTree, Nodelike};
use core::fmt;

/// Marks the end of a chain
const SENTINEL: &str = "X";

/// Writes a payload, using `_` for the empty value
fn write_value(f: &mut fmt::Formatter<'_>, value: Option<f64>) -> fmt::Result {
    match value {
        Some(value) => write!(f, "{value}"),
        None => write!(f, "_"),
    }
}

/// Renders a chain along owning links, e.g. `[1]-->[2]-->[X]`
pub struct ChainDisplay<'a, N> {
    nodes: &'a Arena<N>,
    head: ArenaIndex,
    arrow: &'static str,
    truncated: bool,
}

impl<'a, N> ChainDisplay<'a, N> {
    /// `truncated` indicates that `head` has predecessors, which are abbreviated as `[...]`
    pub fn new(nodes: &'a Arena<N>, head: ArenaIndex, arrow: &'static str, truncated: bool) -> Self {
        ChainDisplay {
            nodes,
            head,
            arrow,
            truncated,
        }
    }
}

impl<N> fmt::Display for ChainDisplay<'_, N>
where
    N: Nodelike,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.truncated {
            write!(f, "[...]{}", self.arrow)?;
        }
        let mut current = Some(self.head);
        while let Some(index) = current {
            let Ok(node) = self.nodes.get(index) else {
                return write!(f, "[!]");
            };
            write!(f, "[")?;
            write_value(f, node.value())?;
            write!(f, "]{}", self.arrow)?;
            current = node.successors().next();
        }
        write!(f, "[{SENTINEL}]")
    }
}

/// Renders a (sub-)tree in bracket notation, e.g. `1(2, 3(4))`. Leaves have no brackets.
pub struct TreeDisplay<'a, N> {
    nodes: &'a Arena<N>,
    root: ArenaIndex,
}

impl<'a, N> TreeDisplay<'a, N> {
    pub fn new(nodes: &'a Arena<N>, root: ArenaIndex) -> Self {
        TreeDisplay { nodes, root }
    }

    fn write_subtree(&self, f: &mut fmt::Formatter<'_>, index: ArenaIndex) -> fmt::Result
    where
        N: Nodelike,
    {
        let Ok(node) = self.nodes.get(index) else {
            return write!(f, "[!]");
        };
        write_value(f, node.value())?;
        if node.is_leaf() {
            return Ok(());
        }
        write!(f, "(")?;
        for (position, child) in node.successors().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            self.write_subtree(f, child)?;
        }
        write!(f, ")")
    }
}

impl<N> fmt::Display for TreeDisplay<'_, N>
where
    N: Nodelike,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_subtree(f, self.root)
    }
}

/// Renders a binary (sub-)tree as `5(3(1, 4), 8)`, with `X` for a missing child.
/// Leaves have no brackets.
pub struct BinaryDisplay<'a> {
    nodes: &'a Arena<BinaryTree>,
    root: ArenaIndex,
}

impl<'a> BinaryDisplay<'a> {
    pub fn new(nodes: &'a Arena<BinaryTree>, root: ArenaIndex) -> Self {
        BinaryDisplay { nodes, root }
    }

    fn write_subtree(&self, f: &mut fmt::Formatter<'_>, index: Option<ArenaIndex>) -> fmt::Result {
        let Some(index) = index else {
            return write!(f, "{SENTINEL}");
        };
        let Ok(node) = self.nodes.get(index) else {
            return write!(f, "[!]");
        };
        write_value(f, node.value())?;
        if node.is_leaf() {
            return Ok(());
        }
        write!(f, "(")?;
        self.write_subtree(f, node.left())?;
        write!(f, ", ")?;
        self.write_subtree(f, node.right())?;
        write!(f, ")")
    }
}

impl fmt::Display for BinaryDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_subtree(f, Some(self.root))
    }
}

#[cfg(test)]
mod tests {
    use crate::{BinaryTrees, DoubleLinks, GeneralTrees, SingleLinks};

    #[test_log::test]
    fn test_chain_display() {
        let mut links = SingleLinks::new();
        let tail = links.create(2.5, None).unwrap();
        let head = links.create(1.0, Some(tail)).unwrap();
        assert_eq!(links.display(head).to_string(), "[1]-->[2.5]-->[X]");

        links.set_value(tail, None::<f64>).unwrap();
        assert_eq!(links.display(head).to_string(), "[1]-->[_]-->[X]");
    }

    #[test_log::test]
    fn test_double_chain_display_marks_predecessors() {
        let mut links = DoubleLinks::new();
        let head = links.create(1.0).unwrap();
        let second = links.insert_next(head, 2.0).unwrap();
        assert_eq!(links.display(head).to_string(), "[1]===[2]===[X]");
        assert_eq!(links.display(second).to_string(), "[...]===[2]===[X]");
    }

    #[test_log::test]
    fn test_tree_display() {
        let mut trees = GeneralTrees::new();
        let grandchild = trees.make_children([4.0]).unwrap();
        let three = trees.create(3.0, grandchild).unwrap();
        let two = trees.create(2.0, vec![]).unwrap();
        let root = trees.create(1.0, vec![two, three]).unwrap();
        assert_eq!(trees.display(root).to_string(), "1(2, 3(4))");
        assert_eq!(trees.display(two).to_string(), "2");
    }

    #[test_log::test]
    fn test_binary_display_marks_missing_children() {
        let mut trees = BinaryTrees::new();
        let root = trees.insert_many(None, [5.0, 8.0, 9.0]).unwrap().unwrap();
        assert_eq!(trees.display(root).to_string(), "5(X, 8(X, 9))");
    }
}
