use tracing::{debug, warn};

use crate::encoder::lrp::LocRefPoint;
use crate::{
    DirectedGraph, EncodeError, EncoderConfig, LocationError, RoadClassifier, shortest_path_tree,
};

/// Resolves all the LRPs that are necessary to encode the given path.
///
/// The path is covered by a concatenation of shortest paths, each one starting at an LRP and
/// no longer than the maximum LRP distance. The last LRP is placed at the end of the path.
pub fn resolve_lrps<G: DirectedGraph, C: RoadClassifier>(
    config: &EncoderConfig,
    graph: &G,
    classifier: &C,
    path: &[G::EdgeId],
) -> Result<Vec<LocRefPoint<G::EdgeId>>, EncodeError> {
    let &last_edge = path.last().ok_or(LocationError::Empty)?;

    let mut lrps = vec![];
    let mut start = 0;

    // Step – 3 Determine coverage of the location by a shortest-path.
    while start < path.len() {
        let end = resolve_coverage(config, graph, &path[start..])?;
        debug!("Path {:?} covered by a shortest path", &path[start..start + end]);

        // Step – 4 Create a new LRP at the start of the covered segment
        let segment = &path[start..start + end];
        lrps.push(LocRefPoint::from_segment(config, graph, classifier, segment, start)?);

        start += end;
    }

    // Step – 5 Create the last LRP at the end of the location
    let last_lrp =
        LocRefPoint::from_last_edge(config, graph, classifier, last_edge, path.len() - 1)?;
    lrps.push(last_lrp);

    debug_assert!(
        path.iter().eq(lrps.iter().flat_map(|lrp| &lrp.edges)),
        "Resolved LRPs don't cover the exact location edges"
    );

    Ok(lrps)
}

/// Returns the number of edges from the start of the path that form a shortest path.
/// A single edge is always covered, as long as it doesn't exceed the maximum LRP distance.
fn resolve_coverage<G: DirectedGraph>(
    config: &EncoderConfig,
    graph: &G,
    path: &[G::EdgeId],
) -> Result<usize, EncodeError> {
    let &first_edge = path.first().ok_or(LocationError::Empty)?;
    let origin = graph
        .get_edge_start_vertex(first_edge)
        .ok_or(LocationError::NotConnected)?;

    let tree = shortest_path_tree(graph, origin, config.max_lrp_distance);

    // the tree path to the end of each edge is the path prefix as long as every edge is the
    // previous edge of its end vertex
    let covered = path
        .iter()
        .take_while(|&&edge| {
            graph
                .get_edge_end_vertex(edge)
                .is_some_and(|vertex| tree.previous_edge(vertex) == Some(edge))
        })
        .count();

    if covered > 0 {
        return Ok(covered);
    }

    let length = graph
        .get_edge_length(first_edge)
        .ok_or(LocationError::NotConnected)?;

    if length > config.max_lrp_distance {
        warn!("Maximum LRP distance exceeded by {first_edge:?} of {length}");
        return Err(EncodeError::MaxDistanceExceeded);
    }

    warn!("{first_edge:?} is not the shortest path between its vertices");
    Ok(1)
}
