//! Equality strategies for vertices.
//!
//! A [`RootedTree`](crate::tree::RootedTree) compares vertices in two different ways:
//!
//! *   **global** equality identifies a vertex across the whole tree. It decides membership
//!     ([`contains_vertex`](crate::tree::RootedTree::contains_vertex)) and rejects duplicates.
//! *   **local** equality only resolves "which child of this parent", so that a freshly built
//!     query value can find the stored child it describes.
//!
//! Both are expressed as an [`Equivalence`]: a projection from a vertex to a hashable key.
//! Two vertices are equivalent exactly when their keys compare equal.

use std::{hash::Hash, marker::PhantomData, ops::Deref};

use by_address::ByAddress;

use crate::tree::Edge;

/// A strategy deciding when two vertices are "the same".
pub trait Equivalence<V> {
    /// The key vertices are compared and hashed by.
    type Key: Hash + Eq + Clone;

    /// Projects `vertex` onto its key.
    fn key(&self, vertex: &V) -> Self::Key;

    /// Returns true when `a` and `b` are equivalent under this strategy.
    fn equivalent(&self, a: &V, b: &V) -> bool {
        self.key(a) == self.key(b)
    }
}

/// Compares vertices by their own `Eq` implementation.
///
/// The key is a clone of the vertex, made on every lookup. With `String` vertices each
/// `contains_vertex`, `depth` or `try_get_edge` call allocates; prefer `Rc<str>` or
/// `Arc<str>`, whose clones only bump a counter, where lookups are hot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ByValue;

impl<V: Hash + Eq + Clone> Equivalence<V> for ByValue {
    type Key = V;

    fn key(&self, vertex: &V) -> V {
        vertex.clone()
    }
}

/// Compares pointer-like vertices (`Rc<T>`, `Arc<T>`, `&T`, ...) by the address they point to.
///
/// Two separately allocated values are never equivalent, even when their contents are equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ByIdentity;

impl<V: Deref + Clone> Equivalence<V> for ByIdentity {
    type Key = ByAddress<V>;

    fn key(&self, vertex: &V) -> ByAddress<V> {
        ByAddress(vertex.clone())
    }
}

/// Compares vertices by a key extracted with a closure, e.g. a name field.
pub struct KeyFn<F, K> {
    extract: F,
    _key: PhantomData<fn() -> K>,
}

impl<F, K> KeyFn<F, K> {
    pub fn new(extract: F) -> Self {
        KeyFn {
            extract,
            _key: PhantomData,
        }
    }
}

impl<F: Clone, K> Clone for KeyFn<F, K> {
    fn clone(&self) -> Self {
        KeyFn::new(self.extract.clone())
    }
}

impl<V, K, F> Equivalence<V> for KeyFn<F, K>
where
    F: Fn(&V) -> K,
    K: Hash + Eq + Clone,
{
    type Key = K;

    fn key(&self, vertex: &V) -> K {
        (self.extract)(vertex)
    }
}

/// Lifts a vertex equivalence to edges: two edges are equivalent when both their sources and
/// their targets are.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EdgeVia<E>(pub E);

impl<V, E: Equivalence<V>> Equivalence<Edge<V>> for EdgeVia<E> {
    type Key = (E::Key, E::Key);

    fn key(&self, edge: &Edge<V>) -> Self::Key {
        (self.0.key(&edge.source), self.0.key(&edge.target))
    }
}
