//! Upward traversal of a [`RootedTree`].

use super::RootedTree;
use crate::equivalence::Equivalence;

/// An iterator that walks from a starting vertex up to the root, both included.
///
/// A start vertex that is not in the tree is yielded alone.
pub struct Ancestors<'a, V, G, L>
where
    G: Equivalence<V>,
    L: Equivalence<V>,
{
    tree: &'a RootedTree<V, G, L>,
    /// The next vertex to yield. `None` once the root has been yielded.
    current: Option<&'a V>,
}

impl<'a, V, G, L> Ancestors<'a, V, G, L>
where
    V: Clone,
    G: Equivalence<V>,
    L: Equivalence<V>,
{
    pub fn new(tree: &'a RootedTree<V, G, L>, start: &'a V) -> Self {
        Ancestors {
            tree,
            current: Some(start),
        }
    }
}

impl<'a, V, G, L> Iterator for Ancestors<'a, V, G, L>
where
    V: Clone,
    G: Equivalence<V>,
    L: Equivalence<V>,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let vertex = self.current?;
        self.current = self
            .tree
            .try_parent_and_edge_in(vertex)
            .map(|(parent, _)| parent);
        Some(vertex)
    }
}

impl<V, G, L> Clone for Ancestors<'_, V, G, L>
where
    G: Equivalence<V>,
    L: Equivalence<V>,
{
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            current: self.current,
        }
    }
}
