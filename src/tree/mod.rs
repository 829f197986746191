//! A directed, rooted tree over caller-supplied vertices.
//!
//! [`RootedTree`] keeps three maps in sync:
//!
//! *   the forward map, from a parent (keyed by **global** equality) to its children, which are
//!     keyed by **local** equality and kept in insertion order;
//! *   the reverse cache, from a child (global) to its parent and the edge into it;
//! *   the depth map, from a vertex (global) to its distance from the root.
//!
//! Vertices only enter the tree together with the edge that connects them to an existing
//! vertex ([`RootedTree::add_edge`]), and removing an edge truncates the whole subtree below
//! it in post-order ([`RootedTree::remove_edge`]). The tree therefore stays connected and
//! single-rooted through any sequence of mutations, and `vertex_count() - 1 == edge_count()`.
//!
//! Which equality is used where:
//!
//! | operation | parent | child |
//! |---|---|---|
//! | [`contains_vertex`](RootedTree::contains_vertex) | global | - |
//! | [`try_get_edge`](RootedTree::try_get_edge), [`try_child_get`](RootedTree::try_child_get) | global | local |
//! | [`try_parent_and_edge_in`](RootedTree::try_parent_and_edge_in) | - | global |

use std::fmt::{self, Debug, Write};

use ahash::AHashMap;
use indexmap::IndexMap;
use itertools::Itertools;
use thiserror::Error;
use tracing::trace;

use crate::{
    equivalence::{ByValue, Equivalence},
    hierarchy::{ChildMany, PostOrder},
};

pub mod iterato;

pub use iterato::Ancestors;

#[cfg(test)]
mod test;

/// A parent to child connection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge<V> {
    pub source: V,
    pub target: V,
}

impl<V> Edge<V> {
    pub fn new(source: V, target: V) -> Self {
        Edge { source, target }
    }
}

type ChildMap<K, V> = IndexMap<K, Edge<V>, ahash::RandomState>;

/// Forward map entry: the stored vertex and the edges out of it.
#[derive(Clone)]
struct VertexEntry<V, K> {
    vertex: V,
    children: ChildMap<K, V>,
}

impl<V, K> VertexEntry<V, K> {
    fn new(vertex: V) -> Self {
        VertexEntry {
            vertex,
            children: ChildMap::default(),
        }
    }
}

/// Reverse cache entry.
#[derive(Clone)]
struct ParentLink<V> {
    parent: V,
    edge: Edge<V>,
}

/// Errors raised by the indexed (non-`try`) accessors of [`RootedTree`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError<V> {
    #[error("Vertex {0:?} is not in the tree")]
    VertexNotFound(V),
    #[error("Vertex {parent:?} has no child matching {child:?}")]
    ChildNotFound { parent: V, child: V },
    #[error("Vertex {0:?} has no parent: it is the root or not in the tree")]
    NoParent(V),
    #[error("Vertex {0:?} is not at its parent's depth plus one")]
    DepthMismatch(V),
    #[error("Vertex {0:?} is not listed among its parent's children")]
    BrokenLink(V),
    #[error("Tree holds {vertices} vertices but {edges} edges")]
    CountMismatch { vertices: usize, edges: usize },
}

/// A directed tree with a fixed root, comparing vertices globally with `G` and locally with `L`.
///
/// See the [module documentation](self) for the roles of the two equivalences.
#[derive(Clone)]
pub struct RootedTree<V, G = ByValue, L = ByValue>
where
    G: Equivalence<V>,
    L: Equivalence<V>,
{
    root: V,
    /// parent (global) -> children (local) -> edge
    out_edges: IndexMap<G::Key, VertexEntry<V, L::Key>, ahash::RandomState>,
    /// child (global) -> parent and edge into the child
    parents: AHashMap<G::Key, ParentLink<V>>,
    /// vertex (global) -> depth
    depths: AHashMap<G::Key, usize>,
    global: G,
    local: L,
}

impl<V: std::hash::Hash + Eq + Clone> RootedTree<V> {
    /// Creates a tree holding only `root`, comparing vertices by value both globally and locally.
    pub fn new(root: V) -> Self {
        Self::with_equivalence(root, ByValue, ByValue)
    }
}

impl<V, G, L> RootedTree<V, G, L>
where
    V: Clone,
    G: Equivalence<V>,
    L: Equivalence<V>,
{
    /// Creates a tree holding only `root`.
    ///
    /// `global` must never consider two distinct vertices equal; `local` only has to tell
    /// siblings apart.
    pub fn with_equivalence(root: V, global: G, local: L) -> Self {
        let mut tree = RootedTree {
            root,
            out_edges: IndexMap::default(),
            parents: AHashMap::new(),
            depths: AHashMap::new(),
            global,
            local,
        };
        tree.insert_root();
        tree
    }

    fn insert_root(&mut self) {
        let key = self.global.key(&self.root);
        self.out_edges
            .insert(key.clone(), VertexEntry::new(self.root.clone()));
        self.depths.insert(key, 0);
    }

    pub fn global_equivalence(&self) -> &G {
        &self.global
    }

    pub fn local_equivalence(&self) -> &L {
        &self.local
    }

    // --- Mutation ---

    /// Inserts `edge.target` as a new child of `edge.source`.
    ///
    /// Returns false, and leaves the tree untouched, when the source is not in the tree, the
    /// target already is, or a sibling under the source is locally equal to the target.
    pub fn add_edge(&mut self, edge: Edge<V>) -> bool {
        let source = self.global.key(&edge.source);
        let target = self.global.key(&edge.target);

        if self.out_edges.contains_key(&target) {
            return false;
        }
        let Some(&parent_depth) = self.depths.get(&source) else {
            return false;
        };
        let local = self.local.key(&edge.target);
        let Some(parent) = self.out_edges.get_mut(&source) else {
            return false;
        };
        if parent.children.contains_key(&local) {
            return false;
        }

        parent.children.insert(local, edge.clone());
        self.parents.insert(
            target.clone(),
            ParentLink {
                parent: edge.source.clone(),
                edge: edge.clone(),
            },
        );
        self.depths.insert(target.clone(), parent_depth + 1);
        self.out_edges.insert(target, VertexEntry::new(edge.target));

        trace!(depth = parent_depth + 1, vertices = self.vertex_count(), "edge added");
        true
    }

    /// Adds every edge in order, returning how many were accepted.
    pub fn add_edge_range(&mut self, edges: impl IntoIterator<Item = Edge<V>>) -> usize {
        edges
            .into_iter()
            .filter(|edge| self.add_edge(edge.clone()))
            .count()
    }

    /// Disconnects `edge` and deletes the subtree below it.
    ///
    /// Returns false when `edge.source` is not in the tree or `edge` is not one of its
    /// out-edges.
    pub fn remove_edge(&mut self, edge: &Edge<V>) -> bool {
        self.truncate(edge).is_some()
    }

    /// Like [`remove_edge`](Self::remove_edge), but hands back every removed edge.
    ///
    /// Edges come out in post-order: each edge is listed after all the edges below it, and
    /// `edge` itself comes last.
    pub fn truncate(&mut self, edge: &Edge<V>) -> Option<Vec<Edge<V>>> {
        let source = self.global.key(&edge.source);
        let target = self.global.key(&edge.target);

        if !self.out_edges.contains_key(&source) {
            return None;
        }
        let link = self.parents.get(&target)?;
        if self.global.key(&link.parent) != source {
            return None;
        }

        let start = &self.out_edges.get(&target)?.vertex;
        let doomed: Vec<V> = PostOrder::new(&*self, start).cloned().collect();

        let mut removed = Vec::with_capacity(doomed.len());
        for vertex in &doomed {
            removed.extend(self.delete_in(vertex));
        }

        trace!(
            removed = removed.len(),
            vertices = self.vertex_count(),
            "subtree truncated"
        );
        Some(removed)
    }

    /// Unregisters a vertex that has no children left, together with the edge into it.
    ///
    /// The root has no edge in and is never deleted.
    fn delete_in(&mut self, vertex: &V) -> Option<Edge<V>> {
        let key = self.global.key(vertex);
        let link = self.parents.remove(&key)?;

        let local = self.local.key(vertex);
        let parent_key = self.global.key(&link.parent);
        if let Some(parent) = self.out_edges.get_mut(&parent_key) {
            parent.children.shift_remove(&local);
        }
        self.out_edges.swap_remove(&key);
        self.depths.remove(&key);

        Some(link.edge)
    }

    /// Removes every edge matching `predicate`, returning how many removals happened.
    ///
    /// Edges already gone because an earlier removal truncated their subtree are not counted.
    pub fn remove_edge_if(&mut self, mut predicate: impl FnMut(&Edge<V>) -> bool) -> usize {
        let matching = self.edges().filter(|e| predicate(e)).cloned().collect_vec();
        matching
            .iter()
            .filter(|edge| self.remove_edge(edge))
            .count()
    }

    /// Removes the out-edges of `parent` matching `predicate`.
    pub fn remove_out_edge_if(
        &mut self,
        parent: &V,
        mut predicate: impl FnMut(&Edge<V>) -> bool,
    ) -> usize {
        let Some(out_edges) = self.out_edges(parent) else {
            return 0;
        };
        let matching = out_edges.filter(|e| predicate(e)).cloned().collect_vec();
        matching
            .iter()
            .filter(|edge| self.remove_edge(edge))
            .count()
    }

    /// Truncates every subtree below `parent`.
    pub fn clear_out_edges(&mut self, parent: &V) {
        self.remove_out_edge_if(parent, |_| true);
    }

    /// Removes everything but the root.
    pub fn clear(&mut self) {
        let dropped = self.edge_count();
        self.out_edges.clear();
        self.parents.clear();
        self.depths.clear();
        self.insert_root();
        trace!(dropped, "tree cleared");
    }

    // --- Queries ---

    pub fn root(&self) -> &V {
        &self.root
    }

    /// Is `vertex` in the tree, under global equality?
    pub fn contains_vertex(&self, vertex: &V) -> bool {
        self.out_edges.contains_key(&self.global.key(vertex))
    }

    /// The stored vertex globally equal to `vertex`.
    pub fn try_get_vertex(&self, vertex: &V) -> Option<&V> {
        self.out_edges
            .get(&self.global.key(vertex))
            .map(|entry| &entry.vertex)
    }

    /// Is there an edge from `parent` (global) to a child locally equal to `child`?
    pub fn contains_edge(&self, parent: &V, child: &V) -> bool {
        self.try_get_edge(parent, child).is_some()
    }

    /// The edge from `parent` (global) to the child locally equal to `child`.
    ///
    /// The returned edge holds the stored child, not the query.
    pub fn try_get_edge(&self, parent: &V, child: &V) -> Option<&Edge<V>> {
        self.out_edges
            .get(&self.global.key(parent))?
            .children
            .get(&self.local.key(child))
    }

    /// The stored child of `parent` that is locally equal to `child`.
    pub fn try_child_get(&self, parent: &V, child: &V) -> Option<&V> {
        self.try_get_edge(parent, child).map(|e| &e.target)
    }

    pub fn child_get(&self, parent: &V, child: &V) -> Result<&V, TreeError<V>> {
        self.try_child_get(parent, child).ok_or_else(|| {
            if self.contains_vertex(parent) {
                TreeError::ChildNotFound {
                    parent: parent.clone(),
                    child: child.clone(),
                }
            } else {
                TreeError::VertexNotFound(parent.clone())
            }
        })
    }

    /// The children of `parent`, in insertion order, or `None` if `parent` is not in the tree.
    pub fn try_child_get_many(&self, parent: &V) -> Option<impl Iterator<Item = &V> + '_> {
        self.out_edges(parent).map(|edges| edges.map(|e| &e.target))
    }

    pub fn child_get_many(&self, parent: &V) -> Result<impl Iterator<Item = &V> + '_, TreeError<V>> {
        self.try_child_get_many(parent)
            .ok_or_else(|| TreeError::VertexNotFound(parent.clone()))
    }

    /// The parent of `child` and the edge into it. `None` for the root and unknown vertices.
    pub fn try_parent_and_edge_in(&self, child: &V) -> Option<(&V, &Edge<V>)> {
        self.parents
            .get(&self.global.key(child))
            .map(|link| (&link.parent, &link.edge))
    }

    pub fn parent_and_edge_in(&self, child: &V) -> Result<(&V, &Edge<V>), TreeError<V>> {
        self.try_parent_and_edge_in(child)
            .ok_or_else(|| TreeError::NoParent(child.clone()))
    }

    /// The out-edges of `parent`, in insertion order.
    pub fn out_edges(&self, parent: &V) -> Option<impl Iterator<Item = &Edge<V>> + '_> {
        self.out_edges
            .get(&self.global.key(parent))
            .map(|entry| entry.children.values())
    }

    /// The `index`-th out-edge of `parent`.
    pub fn out_edge(&self, parent: &V, index: usize) -> Option<&Edge<V>> {
        self.out_edges
            .get(&self.global.key(parent))?
            .children
            .get_index(index)
            .map(|(_, edge)| edge)
    }

    pub fn out_degree(&self, parent: &V) -> Option<usize> {
        self.out_edges
            .get(&self.global.key(parent))
            .map(|entry| entry.children.len())
    }

    /// True when `parent` has no children, or is not in the tree at all.
    pub fn is_out_edges_empty(&self, parent: &V) -> bool {
        self.out_degree(parent).map_or(true, |degree| degree == 0)
    }

    pub fn depth(&self, vertex: &V) -> Option<usize> {
        self.depths.get(&self.global.key(vertex)).copied()
    }

    /// Walks from `start` up to the root, both included.
    pub fn ancestors<'a>(&'a self, start: &'a V) -> Ancestors<'a, V, G, L> {
        Ancestors::new(self, start)
    }

    /// Resolves a chain of child queries starting below the root.
    ///
    /// Each query is matched locally against the children of the previous hit. Returns the
    /// stored vertices found, or `None` as soon as one query has no match.
    pub fn traverse_try<'q>(&self, queries: impl IntoIterator<Item = &'q V>) -> Option<Vec<&V>>
    where
        V: 'q,
    {
        let mut parent = &self.root;
        let mut found = Vec::new();
        for query in queries {
            parent = self.try_child_get(parent, query)?;
            found.push(parent);
        }
        Some(found)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &V> + '_ {
        self.out_edges.values().map(|entry| &entry.vertex)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge<V>> + '_ {
        self.out_edges
            .values()
            .flat_map(|entry| entry.children.values())
    }

    pub fn vertex_count(&self) -> usize {
        self.out_edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.parents.len()
    }

    pub fn is_vertices_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    pub fn is_edges_empty(&self) -> bool {
        self.edge_count() == 0
    }

    /// Checks the structural invariants: edge count, depths and parent/child agreement.
    pub fn validate(&self) -> Result<(), TreeError<V>> {
        if self.vertex_count() != self.edge_count() + 1 {
            return Err(TreeError::CountMismatch {
                vertices: self.vertex_count(),
                edges: self.edge_count(),
            });
        }
        if self.depth(&self.root) != Some(0) {
            return Err(TreeError::DepthMismatch(self.root.clone()));
        }
        for link in self.parents.values() {
            let child = &link.edge.target;
            if !self.contains_edge(&link.parent, child) {
                return Err(TreeError::BrokenLink(child.clone()));
            }
            match (self.depth(child), self.depth(&link.parent)) {
                (Some(c), Some(p)) if c == p + 1 => {}
                _ => return Err(TreeError::DepthMismatch(child.clone())),
            }
        }
        Ok(())
    }

    /// Renders the tree with box-drawing connectors, one vertex per line in pre-order.
    pub fn debug_draw(&self, mut format_vertex: impl FnMut(&V) -> String) -> String {
        let mut lines = vec![format_vertex(&self.root)];

        let mut stack: Vec<(&V, String, bool)> = Vec::new();
        self.push_children(&mut stack, &self.root, "");

        while let Some((vertex, prefix, is_last_child)) = stack.pop() {
            let connector = if is_last_child {
                "└── "
            } else {
                "├── "
            };
            let mut line = String::new();
            let _ = write!(line, "{prefix}{connector}{}", format_vertex(vertex));
            lines.push(line);

            let child_prefix = format!("{}{}", prefix, if is_last_child { "    " } else { "│   " });
            self.push_children(&mut stack, vertex, &child_prefix);
        }

        lines.iter().join("\n")
    }

    fn push_children<'a>(&'a self, stack: &mut Vec<(&'a V, String, bool)>, parent: &V, prefix: &str) {
        let children = self
            .try_child_get_many(parent)
            .map(|children| children.collect_vec())
            .unwrap_or_default();
        let num_children = children.len();
        for (i, child) in children.into_iter().enumerate().rev() {
            stack.push((child, prefix.to_owned(), i + 1 == num_children));
        }
    }
}

impl<V, G, L> ChildMany for RootedTree<V, G, L>
where
    V: Clone,
    G: Equivalence<V>,
    L: Equivalence<V>,
{
    type Item = V;

    fn try_child_get_many<'a>(
        &'a self,
        parent: &V,
    ) -> Option<impl Iterator<Item = &'a V> + 'a> {
        RootedTree::try_child_get_many(self, parent)
    }
}

impl<V, G, L> Debug for RootedTree<V, G, L>
where
    V: Debug,
    G: Equivalence<V>,
    L: Equivalence<V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootedTree")
            .field("root", &self.root)
            .field("vertices", &self.out_edges.len())
            .field("edges", &self.parents.len())
            .finish()
    }
}
