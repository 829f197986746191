//! # Treepool
//!
//! Treepool keeps elements in a hierarchy addressed by identifiers, such as assets addressed
//! by `//textures/stone`.
//!
//! It is built from two layers:
//!
//! *   [`tree::RootedTree`], a directed rooted tree that compares vertices with two
//!     equivalences: a global one identifying a vertex anywhere in the tree, and a local one
//!     that only tells siblings apart (see [`equivalence`]).
//! *   [`pool::Pool`], a one-to-one map between identifiers and elements whose identifiers
//!     live in such a tree. Missing intermediate identifiers are created on demand and pruned
//!     once nothing needs them. [`pool::path`] specializes it to delimited string paths.
//!
//! [`hierarchy`] holds the traversals shared by both, and [`graph`] a small directed graph
//! with a topological sort.

pub mod equivalence;
pub mod graph;
pub mod hierarchy;
pub mod mirror;
pub mod pool;
pub mod tree;
