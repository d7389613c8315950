use tracing::debug;

use crate::{Coordinate, DecodeError, DecoderConfig, DirectedGraph, Length, Point, RatingScore};

/// List of candidate vertices for a Location Reference Point (LRP).
/// Vertices are sorted based on their distance to the point (closest to farthest).
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateVertices<VertexId> {
    pub lrp: Point,
    pub vertices: Vec<CandidateVertex<VertexId>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateVertex<VertexId> {
    pub vertex: VertexId,
    pub coordinate: Coordinate,
    pub distance_to_lrp: Length,
    /// Proximity of the vertex to the LRP, 1 if the vertex lies exactly on the LRP and 0 if it
    /// lies at the maximum search distance.
    pub score: RatingScore,
}

/// Each location reference point contains coordinates specifying a node in the encoder map. The
/// decoder tries to find so called candidate vertices in the decoder map whereby the coordinates
/// of the candidate vertices are close to the coordinates of the location reference point.
/// The straight line distance is used to identify close-by vertices, vertices farther than the
/// maximum node distance are not considered. Several candidate vertices might exist for one
/// location reference point, nearest vertices are yielded first.
pub fn find_candidate_vertices<'a, G: DirectedGraph>(
    config: &DecoderConfig,
    graph: &'a G,
    lrp: &Point,
) -> impl Iterator<Item = CandidateVertex<G::VertexId>> + use<'a, G> {
    debug!("Finding candidate vertices for {lrp:?}");

    let radius = config.max_node_distance;

    graph
        .nearest_vertices_within_distance(lrp.coordinate, radius)
        .filter(move |&(_, distance_to_lrp)| distance_to_lrp <= radius)
        .filter_map(move |(vertex, distance_to_lrp)| {
            let coordinate = graph.get_vertex_coordinate(vertex)?;

            Some(CandidateVertex {
                vertex,
                coordinate,
                distance_to_lrp,
                score: proximity_score(distance_to_lrp, radius),
            })
        })
}

/// Finds the candidate vertices of every LRP.
/// Fails if any of the LRPs has no candidate.
pub fn find_all_candidate_vertices<G: DirectedGraph>(
    config: &DecoderConfig,
    graph: &G,
    points: &[Point],
) -> Result<Vec<CandidateVertices<G::VertexId>>, DecodeError> {
    points
        .iter()
        .map(|lrp| {
            let vertices: Vec<_> = find_candidate_vertices(config, graph, lrp).collect();
            debug!("Found {} candidate vertices for {lrp:?}", vertices.len());

            if vertices.is_empty() {
                Err(DecodeError::NoCandidate(*lrp))
            } else {
                Ok(CandidateVertices {
                    lrp: *lrp,
                    vertices,
                })
            }
        })
        .collect()
}

fn proximity_score(distance: Length, radius: Length) -> RatingScore {
    if radius <= Length::ZERO {
        return if distance <= Length::ZERO {
            RatingScore::ONE
        } else {
            RatingScore::ZERO
        };
    }

    RatingScore::from(1.0 - distance.meters() / radius.meters()).clamped()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use test_log::test;

    use super::*;
    use crate::Tags;
    use crate::graph::tests::{EdgeId, TEST_GRAPH, TestGraph, VertexId};

    fn lrp(lon: f64, lat: f64) -> Point {
        Point {
            coordinate: Coordinate { lon, lat },
            ..Default::default()
        }
    }

    #[test]
    fn decoder_find_candidate_vertices_001() {
        let graph: &TestGraph = &TEST_GRAPH;
        let config = DecoderConfig::default();

        let candidates: Vec<_> =
            find_candidate_vertices(&config, graph, &lrp(4.4020, 51.2000)).collect();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].vertex, VertexId(2));
        assert_eq!(candidates[0].distance_to_lrp, Length::ZERO);
        assert_eq!(candidates[0].score, RatingScore::ONE);
    }

    #[test]
    fn decoder_find_candidate_vertices_radius() {
        let graph: &TestGraph = &TEST_GRAPH;

        // vertex 2 is ~7m away
        let point = lrp(4.4021, 51.2000);
        let vertex = graph.get_vertex_coordinate(VertexId(2)).unwrap();
        let distance = vertex.distance(&point.coordinate);

        let config = DecoderConfig {
            max_node_distance: distance,
            ..Default::default()
        };
        let candidates: Vec<_> = find_candidate_vertices(&config, graph, &point).collect();
        assert_eq!(candidates.len(), 1);
        assert_relative_eq!(candidates[0].score.value(), 0.0);

        let config = DecoderConfig {
            max_node_distance: distance * 0.5,
            ..Default::default()
        };
        assert_eq!(find_candidate_vertices(&config, graph, &point).count(), 0);

        let config = DecoderConfig {
            max_node_distance: distance * 2.0,
            ..Default::default()
        };
        let candidates: Vec<_> = find_candidate_vertices(&config, graph, &point).collect();
        assert_relative_eq!(candidates[0].score.value(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn decoder_find_candidate_vertices_default_radius() {
        let graph: &TestGraph = &TEST_GRAPH;
        let config = DecoderConfig::default();
        assert_eq!(config.max_node_distance, Length::from_meters(20.0));

        // north of vertex 2 along its meridian
        let meters_per_degree = 6_371_008.8_f64.to_radians();
        let north_of_vertex = |meters: f64| lrp(4.4020, 51.2000 + meters / meters_per_degree);

        let candidates: Vec<_> =
            find_candidate_vertices(&config, graph, &north_of_vertex(0.0)).collect();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].score, RatingScore::ONE);

        let candidates: Vec<_> =
            find_candidate_vertices(&config, graph, &north_of_vertex(19.9999)).collect();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].vertex, VertexId(2));
        assert_relative_eq!(candidates[0].distance_to_lrp.meters(), 19.9999, epsilon = 1e-6);
        assert_relative_eq!(candidates[0].score.value(), 0.0, epsilon = 1e-4);

        let point = north_of_vertex(25.0);
        assert_eq!(find_candidate_vertices(&config, graph, &point).count(), 0);
        assert_eq!(
            find_all_candidate_vertices(&config, graph, &[point]),
            Err(DecodeError::NoCandidate(point))
        );
    }

    /// Ignores the search radius it is given.
    struct UnboundedGraph(&'static TestGraph);

    impl DirectedGraph for UnboundedGraph {
        type VertexId = VertexId;
        type EdgeId = EdgeId;

        fn get_vertex_coordinate(&self, vertex: VertexId) -> Option<Coordinate> {
            self.0.get_vertex_coordinate(vertex)
        }

        fn get_edge_start_vertex(&self, edge: EdgeId) -> Option<VertexId> {
            self.0.get_edge_start_vertex(edge)
        }

        fn get_edge_end_vertex(&self, edge: EdgeId) -> Option<VertexId> {
            self.0.get_edge_end_vertex(edge)
        }

        fn get_edge_length(&self, edge: EdgeId) -> Option<Length> {
            self.0.get_edge_length(edge)
        }

        fn get_edge_tags(&self, edge: EdgeId) -> Option<&Tags> {
            self.0.get_edge_tags(edge)
        }

        fn get_edge_coordinates(&self, edge: EdgeId) -> impl Iterator<Item = Coordinate> {
            self.0.get_edge_coordinates(edge)
        }

        fn vertex_exiting_edges(
            &self,
            vertex: VertexId,
        ) -> impl Iterator<Item = (EdgeId, VertexId)> {
            self.0.vertex_exiting_edges(vertex)
        }

        fn vertex_entering_edges(
            &self,
            vertex: VertexId,
        ) -> impl Iterator<Item = (EdgeId, VertexId)> {
            self.0.vertex_entering_edges(vertex)
        }

        fn nearest_vertices_within_distance(
            &self,
            coordinate: Coordinate,
            _: Length,
        ) -> impl Iterator<Item = (VertexId, Length)> {
            self.0.nearest_vertices_within_distance(coordinate, Length::MAX)
        }
    }

    #[test]
    fn decoder_find_candidate_vertices_beyond_radius() {
        let graph = UnboundedGraph(&TEST_GRAPH);
        let config = DecoderConfig::default();

        // ~89m from vertices 2 and 4
        let far = lrp(4.4030, 51.2005);
        assert_eq!(find_candidate_vertices(&config, &graph, &far).count(), 0);
        assert_eq!(
            find_all_candidate_vertices(&config, &graph, &[far]),
            Err(DecodeError::NoCandidate(far))
        );

        let candidates: Vec<_> = find_candidate_vertices(&config, &graph, &lrp(4.4020, 51.2000))
            .map(|c| c.vertex)
            .collect();
        assert_eq!(candidates, [VertexId(2)]);
    }

    #[test]
    fn decoder_find_candidate_vertices_nearest_first() {
        let graph: &TestGraph = &TEST_GRAPH;
        let config = DecoderConfig {
            max_node_distance: Length::from_meters(120.0),
            ..Default::default()
        };

        let candidates: Vec<_> = find_candidate_vertices(&config, graph, &lrp(4.4021, 51.2001))
            .map(|c| c.vertex)
            .collect();

        assert_eq!(candidates, [VertexId(2), VertexId(4)]);
    }

    #[test]
    fn decoder_find_all_candidate_vertices() {
        let graph: &TestGraph = &TEST_GRAPH;
        let config = DecoderConfig::default();

        let points = [lrp(4.4000, 51.2000), lrp(4.4040, 51.2000)];
        let candidates = find_all_candidate_vertices(&config, graph, &points).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].vertices[0].vertex, VertexId(3));

        let far = lrp(4.5, 51.3);
        assert_eq!(
            find_all_candidate_vertices(&config, graph, &[points[0], far]),
            Err(DecodeError::NoCandidate(far))
        );
    }
}
