//! A small directed graph over hashable nodes, mostly here to order things topologically.

use std::{collections::VecDeque, fmt::Debug, hash::Hash};

use indexmap::IndexSet;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopoError<N: Debug> {
    #[error("Not a DAG: {nodes_processed} nodes processed out of {total_nodes} total nodes. Remaining nodes with non-zero in-degrees: {remaining_nodes:?}")]
    NotDag {
        nodes_processed: usize,
        total_nodes: usize,
        remaining_nodes: Vec<(N, usize)>,
    },
}

/// Nodes and `(from, to)` edges, both kept in insertion order. Parallel edges collapse.
#[derive(Clone, Debug)]
pub struct DirectedGraph<N> {
    nodes: IndexSet<N, ahash::RandomState>,
    edges: IndexSet<(N, N), ahash::RandomState>,
}

impl<N> Default for DirectedGraph<N> {
    fn default() -> Self {
        DirectedGraph {
            nodes: IndexSet::default(),
            edges: IndexSet::default(),
        }
    }
}

impl<N: Hash + Eq + Clone> DirectedGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `node` was not there yet.
    pub fn add_node(&mut self, node: N) -> bool {
        self.nodes.insert(node)
    }

    /// Adds both nodes and the edge `a -> b`, or `b -> a` when `forward` is false.
    ///
    /// A self-loop only adds its node, unless `allow_self_loop` is set. Returns true if an
    /// edge was added.
    pub fn add_edge(&mut self, a: N, b: N, forward: bool, allow_self_loop: bool) -> bool {
        self.add_node(a.clone());
        self.add_node(b.clone());
        if a == b && !allow_self_loop {
            return false;
        }
        let edge = if forward { (a, b) } else { (b, a) };
        self.edges.insert(edge)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&N, &N)> + '_ {
        self.edges.iter().map(|(from, to)| (from, to))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Kahn's algorithm. Among nodes that are ready at the same time, the one added first
    /// comes first.
    pub fn sort_topological(&self) -> Result<Vec<N>, TopoError<N>>
    where
        N: Debug,
    {
        let mut indeg = vec![0usize; self.nodes.len()];
        let mut out: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (from, to) in &self.edges {
            let (Some(from), Some(to)) = (self.nodes.get_index_of(from), self.nodes.get_index_of(to))
            else {
                continue;
            };
            out[from].push(to);
            indeg[to] += 1;
        }

        let mut q: VecDeque<usize> = (0..indeg.len()).filter(|&i| indeg[i] == 0).collect();

        let mut order = Vec::with_capacity(indeg.len());
        while let Some(v) = q.pop_front() {
            order.push(v);
            for &u in &out[v] {
                indeg[u] -= 1;
                if indeg[u] == 0 {
                    q.push_back(u);
                }
            }
        }

        if order.len() != indeg.len() {
            let remaining_nodes: Vec<(N, usize)> = indeg
                .iter()
                .enumerate()
                .filter_map(|(i, &degree)| {
                    if degree > 0 {
                        Some((self.nodes.get_index(i)?.clone(), degree))
                    } else {
                        None
                    }
                })
                .collect();
            debug!(remaining = remaining_nodes.len(), "cycle found");

            return Err(TopoError::NotDag {
                nodes_processed: order.len(),
                total_nodes: indeg.len(),
                remaining_nodes,
            });
        }

        Ok(order
            .into_iter()
            .filter_map(|i| self.nodes.get_index(i).cloned())
            .collect())
    }
}
