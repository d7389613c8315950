use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{DirectedGraph, Frc, Length, RoadClassifier};

#[derive(Debug, Clone, Copy)]
pub struct ShortestPathConfig {
    /// Edges of lower importance than this class are not followed.
    /// Edges that cannot be classified are always followed.
    pub lowest_frc: Frc,
    /// Paths longer than this length are not explored.
    pub max_length: Length,
}

impl Default for ShortestPathConfig {
    fn default() -> Self {
        Self {
            lowest_frc: Frc::Frc7,
            max_length: Length::MAX,
        }
    }
}

/// Sequence of connected edges and the vertices they connect.
/// An empty path has no edges and a single vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Path<VertexId, EdgeId> {
    pub length: Length,
    pub vertices: Vec<VertexId>,
    pub edges: Vec<EdgeId>,
}

impl<VertexId: Copy, EdgeId> Path<VertexId, EdgeId> {
    pub fn origin(&self) -> Option<VertexId> {
        self.vertices.first().copied()
    }

    pub fn destination(&self) -> Option<VertexId> {
        self.vertices.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeapElement<VertexId> {
    /// Current shortest distance from origin to this vertex.
    distance: Length,
    vertex: VertexId,
}

// The priority queue depends on the implementation of the Ord trait.
// By default std::BinaryHeap is a max heap.
// Explicitly implement the trait so the queue becomes a min heap.
impl<VertexId: Ord> Ord for HeapElement<VertexId> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .cmp(&self.distance)
            // breaking ties in a deterministic way
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl<VertexId: Ord> PartialOrd for HeapElement<VertexId> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest paths from an origin vertex to all the vertices explored by the search.
#[derive(Debug)]
pub struct ShortestPathTree<VertexId, EdgeId> {
    origin: VertexId,
    /// (current) shortest distance from origin to this vertex
    distances: FxHashMap<VertexId, Length>,
    /// previous vertex (value) on the current best known path from origin to this vertex (key)
    previous: FxHashMap<VertexId, (EdgeId, VertexId)>,
}

impl<VertexId, EdgeId> ShortestPathTree<VertexId, EdgeId>
where
    VertexId: Debug + Copy + Ord + std::hash::Hash,
    EdgeId: Copy,
{
    pub const fn origin(&self) -> VertexId {
        self.origin
    }

    pub fn distance(&self, vertex: VertexId) -> Option<Length> {
        self.distances.get(&vertex).copied()
    }

    /// Last edge of the shortest path from origin to the vertex.
    pub fn previous_edge(&self, vertex: VertexId) -> Option<EdgeId> {
        self.previous.get(&vertex).map(|&(edge, _)| edge)
    }

    /// Unpacks the shortest path from the origin to the vertex, if the vertex was reached.
    pub fn path_to(&self, vertex: VertexId) -> Option<Path<VertexId, EdgeId>> {
        let length = self.distance(vertex)?;

        // walk the predecessors back to the origin, then reverse once
        let mut edges = vec![];
        let mut vertices = vec![vertex];
        let mut next = vertex;
        while let Some(&(edge, previous)) = self.previous.get(&next) {
            edges.push(edge);
            vertices.push(previous);
            next = previous;
        }
        edges.reverse();
        vertices.reverse();

        debug_assert_eq!(vertices.first(), Some(&self.origin));

        Some(Path {
            length,
            vertices,
            edges,
        })
    }
}

/// Dijkstra search from the origin, following only the allowed edges and never exceeding the
/// max length. The search stops as soon as the destination (if any) is settled.
fn search<G: DirectedGraph>(
    graph: &G,
    origin: G::VertexId,
    destination: Option<G::VertexId>,
    max_length: Length,
    is_allowed: impl Fn(G::EdgeId) -> bool,
) -> ShortestPathTree<G::VertexId, G::EdgeId> {
    let mut tree = ShortestPathTree {
        origin,
        distances: FxHashMap::from_iter([(origin, Length::ZERO)]),
        previous: FxHashMap::default(),
    };

    // priority queue of discovered vertices that may need to be visited
    let mut frontier = BinaryHeap::from([HeapElement {
        vertex: origin,
        distance: Length::ZERO,
    }]);

    while let Some(element) = frontier.pop() {
        if Some(element.vertex) == destination {
            break;
        }

        // check if we already know a cheaper way to get to the end of this path from the origin
        let shortest_distance = tree.distance(element.vertex).unwrap_or(Length::MAX);
        if element.distance > shortest_distance {
            continue;
        }

        for (edge, vertex_to) in graph.vertex_exiting_edges(element.vertex) {
            let Some(edge_length) = graph.get_edge_length(edge) else {
                continue;
            };

            let distance = element.distance + edge_length;
            if distance > max_length || !is_allowed(edge) {
                continue;
            }

            // check if we can follow the current path to reach the neighbor in a cheaper way
            let shortest_distance = tree.distance(vertex_to).unwrap_or(Length::MAX);
            if distance < shortest_distance {
                trace!("Relaxing {vertex_to:?} through {edge:?} at {distance}");
                // Relax: we have now found a better way that we are going to explore
                tree.distances.insert(vertex_to, distance);
                tree.previous.insert(vertex_to, (edge, element.vertex));
                frontier.push(HeapElement {
                    vertex: vertex_to,
                    distance,
                });
            }
        }
    }

    tree
}

/// Returns true if the edge can be followed by a search restricted to the lowest FRC.
fn is_edge_allowed<G: DirectedGraph, C: RoadClassifier>(
    graph: &G,
    classifier: &C,
    lowest_frc: Frc,
    edge: G::EdgeId,
) -> bool {
    graph
        .get_edge_tags(edge)
        .and_then(|tags| classifier.infer_frc(tags))
        .is_none_or(|frc| frc <= lowest_frc)
}

/// Computes the shortest path between origin and destination.
/// Returns None if the destination cannot be reached within the configured constraints.
/// The shortest path from a vertex to itself is the empty path.
pub fn shortest_path<G: DirectedGraph, C: RoadClassifier>(
    config: &ShortestPathConfig,
    graph: &G,
    classifier: &C,
    origin: G::VertexId,
    destination: G::VertexId,
) -> Option<Path<G::VertexId, G::EdgeId>> {
    debug!("Computing shortest path {origin:?} -> {destination:?} with {config:?}");

    let tree = search(graph, origin, Some(destination), config.max_length, |edge| {
        is_edge_allowed(graph, classifier, config.lowest_frc, edge)
    });

    tree.path_to(destination)
}

/// Computes the shortest non empty path that starts and ends at the given vertex.
/// Returns None if no such circuit exists within the configured constraints.
pub fn shortest_circuit<G: DirectedGraph, C: RoadClassifier>(
    config: &ShortestPathConfig,
    graph: &G,
    classifier: &C,
    vertex: G::VertexId,
) -> Option<Path<G::VertexId, G::EdgeId>> {
    debug!("Computing shortest circuit through {vertex:?} with {config:?}");

    let mut best: Option<Path<G::VertexId, G::EdgeId>> = None;

    // close the circuit with each of the edges entering the vertex
    for (edge, start) in graph.vertex_entering_edges(vertex) {
        if !is_edge_allowed(graph, classifier, config.lowest_frc, edge) {
            continue;
        }

        let Some(edge_length) = graph.get_edge_length(edge) else {
            continue;
        };

        if edge_length > config.max_length {
            continue;
        }

        let config = ShortestPathConfig {
            max_length: config.max_length - edge_length,
            ..*config
        };

        if let Some(mut path) = shortest_path(&config, graph, classifier, vertex, start) {
            path.length += edge_length;
            path.edges.push(edge);
            path.vertices.push(vertex);

            if best.as_ref().is_none_or(|best| path.length < best.length) {
                best = Some(path);
            }
        }
    }

    best
}

/// Computes the shortest paths from the origin to all the vertices reachable within max length,
/// following every edge of the graph.
pub fn shortest_path_tree<G: DirectedGraph>(
    graph: &G,
    origin: G::VertexId,
    max_length: Length,
) -> ShortestPathTree<G::VertexId, G::EdgeId> {
    debug!("Computing shortest path tree from {origin:?} up to {max_length}");
    search(graph, origin, None, max_length, |_| true)
}
