//! Read-only adjacency model consumed by every enumeration variant.
//!
//! A graph is a set of vertex ids `[0, order)` plus a symmetric adjacency
//! relation without self-loops. Both invariants are validated once, at
//! construction; everything downstream relies on them and only ever reads.

use foldhash::HashSet;
use thiserror::Error;

/// Vertex id; the graph owns ids `0..order`.
pub type Vertex = u32;

/// Neighbour/candidate/excluded sets are hash sets keyed by vertex id.
pub type VertexSet = HashSet<Vertex>;

// ============================================================================
// Errors
// ============================================================================

/// Rejection reasons for a malformed adjacency list.
///
/// Malformed input is never silently repaired; construction either yields a
/// valid graph or one of these.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// A vertex listed itself as a neighbour.
    #[error("vertex {0} is adjacent to itself")]
    SelfLoop(Vertex),
    /// `w ∈ N(v)` without `v ∈ N(w)` (or `w` is not a valid vertex id).
    #[error("edge {0}-{1} has no mirror image")]
    Asymmetric(Vertex, Vertex),
}

// ============================================================================
// UndirectedGraph
// ============================================================================

/// An immutable undirected graph in adjacency-set representation.
///
/// Invariants (established by [`UndirectedGraph::new`]):
/// - `w ∈ N(v) ⇔ v ∈ N(w)`
/// - `v ∉ N(v)`
#[derive(Clone, Debug)]
pub struct UndirectedGraph {
    adjacencies: Vec<VertexSet>,
}

impl UndirectedGraph {
    /// Validates the given adjacency list and wraps it.
    ///
    /// # Errors
    /// Returns [`GraphError`] if any neighbour set contains the vertex itself
    /// or an edge that the other endpoint does not mirror.
    pub fn new(adjacencies: Vec<VertexSet>) -> Result<Self, GraphError> {
        for (v, neighbours) in adjacencies.iter().enumerate() {
            let v = v as Vertex;
            for &w in neighbours {
                if w == v {
                    return Err(GraphError::SelfLoop(v));
                }
                let mirrored = adjacencies
                    .get(w as usize)
                    .is_some_and(|ws| ws.contains(&v));
                if !mirrored {
                    return Err(GraphError::Asymmetric(v, w));
                }
            }
        }
        Ok(Self { adjacencies })
    }

    /// Returns the number of vertices.
    #[inline(always)]
    pub fn order(&self) -> usize {
        self.adjacencies.len()
    }

    /// Returns the number of edges.
    pub fn size(&self) -> usize {
        let total: usize = self.adjacencies.iter().map(VertexSet::len).sum();
        debug_assert_eq!(total % 2, 0, "symmetric adjacency has even degree sum");
        total / 2
    }

    /// Returns the degree of vertex `v`.
    #[inline(always)]
    pub fn degree(&self, v: Vertex) -> usize {
        self.adjacencies[v as usize].len()
    }

    /// Returns the neighbour set of vertex `v`, read-only.
    #[inline(always)]
    pub fn neighbours(&self, v: Vertex) -> &VertexSet {
        &self.adjacencies[v as usize]
    }

    /// Iterates over all vertices with at least one neighbour.
    pub fn connected_vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.adjacencies
            .iter()
            .enumerate()
            .filter(|(_, neighbours)| !neighbours.is_empty())
            .map(|(v, _)| v as Vertex)
    }

    /// Returns a vertex of maximum degree, or `None` for an edgeless graph.
    pub fn max_degree_vertex(&self) -> Option<Vertex> {
        (0..self.order() as Vertex)
            .max_by_key(|&v| self.degree(v))
            .filter(|&v| self.degree(v) > 0)
    }
}

/// Convenience constructor used throughout the tests: an `order`-vertex graph
/// from an explicit edge list.
#[cfg(test)]
pub(crate) fn graph_from_edges(order: usize, edges: &[(Vertex, Vertex)]) -> UndirectedGraph {
    let mut adjacencies = vec![VertexSet::default(); order];
    for &(v, w) in edges {
        adjacencies[v as usize].insert(w);
        adjacencies[w as usize].insert(v);
    }
    UndirectedGraph::new(adjacencies).expect("test edge list forms a simple graph")
}

// ============================================================================
// Tests
// ============================================================================
