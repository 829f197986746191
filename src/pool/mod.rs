//! A hierarchical identifier-to-element pool.
//!
//! A [`Pool`] maps identifiers to elements one-to-one, and arranges the identifiers in a
//! [`RootedTree`]. The identifier space is larger than the set of elements: adding
//! `//foo/bar` also puts `//foo` into the identifier tree, as an *implicit* (unmapped)
//! identifier, when nothing was mapped there yet. Removing elements prunes implicit
//! identifiers again once nothing below them is left.
//!
//! How identifiers relate to each other is decided by an [`IdScheme`]; [`path`] provides the
//! delimited-string scheme.
//!
//! ```
//! use treepool::pool::path::{PathPool, RootConvention};
//!
//! let mut pool = PathPool::with_root("root", '/', RootConvention::Separator, |e: &&str| {
//!     e.to_string()
//! });
//! pool.add("//foo/bar".to_string(), "bar").unwrap();
//!
//! assert_eq!(pool.try_get(&"//foo/bar".to_string()), Some(&"bar"));
//! assert_eq!(pool.try_get(&"//foo".to_string()), None);
//! assert!(pool.contains_any_id(&"//foo".to_string()));
//! ```

use std::hash::Hash;

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    equivalence::{ByValue, Equivalence},
    hierarchy::ChildMany,
    mirror::{MirrorError, MirrorMap},
    tree::{Edge, RootedTree},
};

pub mod path;


/// How identifiers are derived from each other.
///
/// Implementations must satisfy `parent_id_of(&child_id_of(r, p)) == Some(p)`, and following
/// `parent_id_of` from any identifier must either reach the root identifier or stop with
/// `None`, never loop.
pub trait IdScheme<Id, E> {
    /// The identifier of `child` relative to its parent, i.e. its "name".
    fn relative_id_of(&self, child: &E) -> Id;

    /// The full identifier of a child named `relative` under `parent`.
    fn child_id_of(&self, relative: &Id, parent: &Id) -> Id;

    /// The full identifier of the parent of `child`, or `None` if `child` has none.
    fn parent_id_of(&self, child: &Id) -> Option<Id>;
}

/// An [`IdScheme`] assembled from three closures.
#[derive(Clone, Copy, Debug)]
pub struct FnScheme<R, C, P> {
    relative: R,
    child: C,
    parent: P,
}

impl<R, C, P> FnScheme<R, C, P> {
    pub fn new(relative: R, child: C, parent: P) -> Self {
        FnScheme {
            relative,
            child,
            parent,
        }
    }
}

impl<Id, E, R, C, P> IdScheme<Id, E> for FnScheme<R, C, P>
where
    R: Fn(&E) -> Id,
    C: Fn(&Id, &Id) -> Id,
    P: Fn(&Id) -> Option<Id>,
{
    fn relative_id_of(&self, child: &E) -> Id {
        (self.relative)(child)
    }

    fn child_id_of(&self, relative: &Id, parent: &Id) -> Id {
        (self.child)(relative, parent)
    }

    fn parent_id_of(&self, child: &Id) -> Option<Id> {
        (self.parent)(child)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PoolError<Id> {
    #[error("Identifier {0:?} is not mapped to an element")]
    IdNotFound(Id),
    #[error("Element is not in the pool")]
    ElementNotFound,
    #[error("Identifier {0:?} is already mapped to an element")]
    IdOccupied(Id),
    #[error("Element is already mapped under identifier {0:?}")]
    ElementMapped(Id),
    #[error("Identifier {0:?} cannot be reached from the root identifier through its parents")]
    Detached(Id),
    #[error("Identifier {0:?} collides with an existing sibling")]
    SiblingCollision(Id),
}

/// Identifiers arranged in a tree, a subset of them mapped one-to-one to elements.
///
/// `G` and `L` are the global and local equivalences of the identifier tree (see
/// [`RootedTree`]). Identifiers given to the pool are first resolved to the stored vertex
/// they are globally equal to, and only stored vertices are mapped, so two globally equal
/// identifiers always share one element.
pub struct Pool<Id, E, S, G = ByValue, L = ByValue>
where
    G: Equivalence<Id>,
    L: Equivalence<Id>,
{
    ids: RootedTree<Id, G, L>,
    elements: MirrorMap<Id, E>,
    root_id: Id,
    root: E,
    scheme: S,
}

impl<Id, E, S> Pool<Id, E, S>
where
    Id: Hash + Eq + Clone,
    E: Hash + Eq + Clone,
    S: IdScheme<Id, E>,
{
    /// Creates a pool holding only `root`, mapped under `root_id`.
    pub fn new(root: E, root_id: Id, scheme: S) -> Self {
        Self::with_equivalence(root, root_id, scheme, ByValue, ByValue)
    }
}

impl<Id, E, S, G, L> Pool<Id, E, S, G, L>
where
    Id: Hash + Eq + Clone,
    E: Hash + Eq + Clone,
    S: IdScheme<Id, E>,
    G: Equivalence<Id>,
    L: Equivalence<Id>,
{
    pub fn with_equivalence(root: E, root_id: Id, scheme: S, global: G, local: L) -> Self {
        let mut pool = Pool {
            ids: RootedTree::with_equivalence(root_id.clone(), global, local),
            elements: MirrorMap::new(),
            root_id,
            root,
            scheme,
        };
        pool.map_root();
        pool
    }

    fn map_root(&mut self) {
        let mapped = self.elements.insert(self.root_id.clone(), self.root.clone());
        debug_assert!(mapped.is_ok(), "root goes into an empty element map");
    }

    // --- Add ---

    /// Maps `id` to `element`, materializing any missing ancestor identifiers as implicit ones.
    ///
    /// If `id` is already present as an implicit identifier it simply becomes mapped. Nothing
    /// is changed when an error is returned. [`PoolError::IdOccupied`] carries the stored
    /// identifier `id` is globally equal to, which may differ from `id` itself.
    pub fn add(&mut self, id: Id, element: E) -> Result<(), PoolError<Id>> {
        self.insert(id, element, None)
    }

    /// Adds `child` below the element `parent`, deriving its identifier through the scheme.
    ///
    /// Returns the identifier `child` was mapped under.
    pub fn add_child(&mut self, parent: &E, child: E) -> Result<Id, PoolError<Id>> {
        let parent_id = self
            .elements
            .get_key(parent)
            .ok_or(PoolError::ElementNotFound)?
            .clone();
        let relative = self.scheme.relative_id_of(&child);
        let id = self.scheme.child_id_of(&relative, &parent_id);

        if self.scheme.parent_id_of(&id).as_ref() != Some(&parent_id) {
            debug!("derived identifier does not lead back to its parent");
            return Err(PoolError::Detached(id));
        }

        self.insert(id.clone(), child, Some(parent_id))?;
        Ok(id)
    }

    fn insert(&mut self, id: Id, element: E, parent: Option<Id>) -> Result<(), PoolError<Id>> {
        let stored = self.ids.try_get_vertex(&id).cloned();
        if let Some(stored) = &stored {
            if self.elements.contains_key(stored) {
                debug!("identifier already mapped");
                return Err(PoolError::IdOccupied(stored.clone()));
            }
        }
        if let Some(existing) = self.elements.get_key(&element) {
            debug!("element already mapped");
            return Err(PoolError::ElementMapped(existing.clone()));
        }

        if let Some(stored) = stored {
            return self.map(stored, element);
        }

        let (anchor, missing) = match parent {
            Some(parent) => (parent, Vec::new()),
            None => self.plan_ancestors(&id)?,
        };
        let attached = missing.last().unwrap_or(&id);
        if self.ids.contains_edge(&anchor, attached) {
            debug!("identifier collides with a sibling");
            return Err(PoolError::SiblingCollision(attached.clone()));
        }

        self.map(id.clone(), element)?;
        let parent = self.materialize(anchor, missing);
        let added = self.ids.add_edge(Edge::new(parent, id));
        debug_assert!(added, "edge into a fresh identifier is always accepted");
        Ok(())
    }

    fn map(&mut self, id: Id, element: E) -> Result<(), PoolError<Id>> {
        match self.elements.insert(id.clone(), element.clone()) {
            Ok(()) => Ok(()),
            Err(MirrorError::KeyPresent) => Err(PoolError::IdOccupied(id)),
            Err(MirrorError::ValuePresent) => Err(PoolError::ElementMapped(
                self.elements.get_key(&element).cloned().unwrap_or(id),
            )),
        }
    }

    /// The stored identifier `id` resolves to, if it is mapped.
    fn mapped(&self, id: &Id) -> Option<&Id> {
        self.ids
            .try_get_vertex(id)
            .filter(|stored| self.elements.contains_key(stored))
    }

    /// Finds the closest ancestor of `id` already in the identifier tree.
    ///
    /// Returns it together with the missing identifiers in between, nearest to `id` first.
    fn plan_ancestors(&self, id: &Id) -> Result<(Id, Vec<Id>), PoolError<Id>> {
        let mut missing: Vec<Id> = Vec::new();
        let mut current = id.clone();
        loop {
            let Some(parent) = self.scheme.parent_id_of(&current) else {
                return Err(PoolError::Detached(id.clone()));
            };
            if self.ids.contains_vertex(&parent) {
                return Ok((parent, missing));
            }
            if parent == current || parent == *id || missing.contains(&parent) {
                return Err(PoolError::Detached(id.clone()));
            }
            missing.push(parent.clone());
            current = parent;
        }
    }

    /// Inserts the planned implicit identifiers, top-down. Returns the one nearest to the
    /// identifier being added, or `anchor` if none were missing.
    fn materialize(&mut self, anchor: Id, missing: Vec<Id>) -> Id {
        let mut parent = anchor;
        for implicit in missing.into_iter().rev() {
            let added = self.ids.add_edge(Edge::new(parent, implicit.clone()));
            debug_assert!(added, "implicit identifiers are planned absent");
            trace!(depth = self.ids.depth(&implicit), "implicit identifier materialized");
            parent = implicit;
        }
        parent
    }

    // --- Remove ---

    /// Unmaps `element` and prunes the identifiers that became useless.
    ///
    /// Returns false when `element` is not in the pool or is the root element.
    pub fn remove(&mut self, element: &E) -> bool {
        match self.elements.get_key(element).cloned() {
            Some(id) => self.remove_id(&id).is_some(),
            None => false,
        }
    }

    /// Unmaps `id` and prunes the identifiers that became useless.
    ///
    /// Returns how many identifiers were removed from the identifier tree: `id` itself if it
    /// has no children left, and then each implicit ancestor left childless. `None` when `id`
    /// is not mapped or is the root identifier, which is never removed.
    pub fn remove_id(&mut self, id: &Id) -> Option<usize> {
        let stored = self.mapped(id)?.clone();
        if self.ids.global_equivalence().equivalent(&stored, &self.root_id) {
            return None;
        }
        self.elements.remove(&stored);
        Some(self.truncate_unused(stored))
    }

    /// Walks up from an unmapped identifier, deleting it while it is a leaf, and continuing
    /// with its parent as long as that parent is unmapped too.
    fn truncate_unused(&mut self, id: Id) -> usize {
        let mut current = id;
        let mut truncated = 0;

        while self.ids.is_out_edges_empty(&current) {
            let Some((parent, edge)) = self
                .ids
                .try_parent_and_edge_in(&current)
                .map(|(parent, edge)| (parent.clone(), edge.clone()))
            else {
                break;
            };
            if !self.ids.remove_edge(&edge) {
                break;
            }
            truncated += 1;

            if self.elements.contains_key(&parent) {
                break;
            }
            current = parent;
        }

        trace!(truncated, "unused identifiers pruned");
        truncated
    }

    /// Drops every element and identifier but the root.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.elements.clear();
        self.map_root();
    }

    // --- Get ---

    pub fn get(&self, id: &Id) -> Result<&E, PoolError<Id>> {
        self.try_get(id)
            .ok_or_else(|| PoolError::IdNotFound(id.clone()))
    }

    pub fn try_get(&self, id: &Id) -> Option<&E> {
        self.elements.get(self.mapped(id)?)
    }

    pub fn get_key(&self, element: &E) -> Result<&Id, PoolError<Id>> {
        self.try_get_key(element).ok_or(PoolError::ElementNotFound)
    }

    pub fn try_get_key(&self, element: &E) -> Option<&Id> {
        self.elements.get_key(element)
    }

    /// Every identifier directly below `id`, mapped or not.
    ///
    /// Use [`try_get`](Self::try_get) to keep only the mapped ones.
    pub fn try_child_get_many(&self, id: &Id) -> Option<impl Iterator<Item = &Id> + '_> {
        self.ids.try_child_get_many(id)
    }

    pub fn child_get_many(&self, id: &Id) -> Result<impl Iterator<Item = &Id> + '_, PoolError<Id>> {
        self.try_child_get_many(id)
            .ok_or_else(|| PoolError::IdNotFound(id.clone()))
    }

    // --- Checks ---

    /// Is `element` mapped?
    pub fn contains(&self, element: &E) -> bool {
        self.elements.contains_value(element)
    }

    /// Is `id` mapped to an element?
    pub fn contains_id(&self, id: &Id) -> bool {
        self.mapped(id).is_some()
    }

    /// Is `id` in the identifier tree, mapped or implicit?
    pub fn contains_any_id(&self, id: &Id) -> bool {
        self.ids.contains_vertex(id)
    }

    /// Number of mapped elements, the root included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always false: the root element cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The mapped `(identifier, element)` pairs, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Id, &E)> + '_ {
        self.elements.iter()
    }

    /// Every identifier, mapped or implicit.
    pub fn ids(&self) -> impl Iterator<Item = &Id> + '_ {
        self.ids.vertices()
    }

    pub fn depth(&self, id: &Id) -> Option<usize> {
        self.ids.depth(id)
    }

    pub fn root(&self) -> &E {
        &self.root
    }

    pub fn root_id(&self) -> &Id {
        &self.root_id
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    /// The identifier tree, mapped and implicit identifiers alike.
    pub fn id_tree(&self) -> &RootedTree<Id, G, L> {
        &self.ids
    }
}

impl<Id, E, S, G, L> ChildMany for Pool<Id, E, S, G, L>
where
    Id: Hash + Eq + Clone,
    E: Hash + Eq + Clone,
    S: IdScheme<Id, E>,
    G: Equivalence<Id>,
    L: Equivalence<Id>,
{
    type Item = Id;

    fn try_child_get_many<'a>(
        &'a self,
        parent: &Id,
    ) -> Option<impl Iterator<Item = &'a Id> + 'a> {
        Pool::try_child_get_many(self, parent)
    }
}
