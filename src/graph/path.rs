use crate::{DirectedGraph, Length};

/// Returns true only if all the edges of the path are sequentially connected in the given graph.
pub fn is_path_connected<G: DirectedGraph>(graph: &G, path: &[G::EdgeId]) -> bool {
    path.windows(2).all(|window| {
        let [e1, e2] = [window[0], window[1]];
        graph
            .get_edge_end_vertex(e1)
            .is_some_and(|vertex| graph.vertex_exiting_edges(vertex).any(|(e, _)| e == e2))
    })
}

/// Returns the sequence of vertices connected by the path edges, from the start vertex of the
/// first edge to the end vertex of the last one.
/// Returns None if the path is empty or any of its edges doesn't belong to the graph.
pub fn path_vertices<G: DirectedGraph>(graph: &G, path: &[G::EdgeId]) -> Option<Vec<G::VertexId>> {
    let first = graph.get_edge_start_vertex(*path.first()?)?;

    let mut vertices = Vec::with_capacity(path.len() + 1);
    vertices.push(first);
    for &edge in path {
        vertices.push(graph.get_edge_end_vertex(edge)?);
    }

    Some(vertices)
}

/// Total length of the path edges, edges not found in the graph are ignored.
pub fn path_length<G: DirectedGraph>(graph: &G, path: &[G::EdgeId]) -> Length {
    path.iter().filter_map(|&e| graph.get_edge_length(e)).sum()
}
