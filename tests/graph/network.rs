use std::collections::HashMap;
use std::sync::LazyLock;

use geo::Distance;
use graph::prelude::{DirectedCsrGraph, DirectedNeighborsWithValues};
use openlr_referenced::{Bearing, Coordinate, DirectedGraph, Length, Tags};

use crate::graph::{GEOJSON_GRAPH, GeojsonGraph};

pub static NETWORK_GRAPH: LazyLock<NetworkGraph> =
    LazyLock::new(|| NetworkGraph::from_geojson_graph(&GEOJSON_GRAPH));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub i64);

impl VertexId {
    const fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub i64);

impl EdgeId {
    const fn is_reversed(&self) -> bool {
        self.0.is_negative()
    }

    const fn undirected(&self) -> Self {
        Self(self.0.abs())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct EdgeProperties {
    length: Length,
    tags: Tags,
    geometry: geo::LineString,
    vertices: [VertexId; 2],
}

pub struct NetworkGraph {
    network: DirectedCsrGraph<usize, (), EdgeId>,
    geospatial_nodes: rstar::RTree<GeospatialNode>,
    vertices: HashMap<VertexId, Coordinate>,
    edge_properties: HashMap<EdgeId, EdgeProperties>,
}

#[derive(Debug)]
struct GeospatialNode {
    vertex: VertexId,
    location: Coordinate,
}

impl rstar::RTreeObject for GeospatialNode {
    type Envelope = rstar::AABB<geo::Point>;
    fn envelope(&self) -> Self::Envelope {
        geo::Point::new(self.location.lon, self.location.lat).envelope()
    }
}

impl rstar::PointDistance for GeospatialNode {
    fn distance_2(&self, point: &geo::Point) -> f64 {
        let location = geo::Point::new(self.location.lon, self.location.lat);
        geo::Haversine.distance(location, *point).powf(2.0)
    }
}

impl DirectedGraph for NetworkGraph {
    type EdgeId = EdgeId;
    type VertexId = VertexId;

    fn get_vertex_coordinate(&self, vertex: Self::VertexId) -> Option<Coordinate> {
        self.vertices.get(&vertex).copied()
    }

    fn get_edge_start_vertex(&self, edge: Self::EdgeId) -> Option<Self::VertexId> {
        self.edge_properties
            .get(&edge.undirected())
            .map(|EdgeProperties { vertices, .. }| {
                if edge.is_reversed() {
                    vertices[1]
                } else {
                    vertices[0]
                }
            })
    }

    fn get_edge_end_vertex(&self, edge: Self::EdgeId) -> Option<Self::VertexId> {
        self.edge_properties
            .get(&edge.undirected())
            .map(|EdgeProperties { vertices, .. }| {
                if edge.is_reversed() {
                    vertices[0]
                } else {
                    vertices[1]
                }
            })
    }

    fn get_edge_length(&self, edge: Self::EdgeId) -> Option<Length> {
        self.edge_properties
            .get(&edge.undirected())
            .map(|EdgeProperties { length, .. }| *length)
    }

    fn get_edge_tags(&self, edge: Self::EdgeId) -> Option<&Tags> {
        self.edge_properties
            .get(&edge.undirected())
            .map(|EdgeProperties { tags, .. }| tags)
    }

    fn get_edge_coordinates(&self, edge: Self::EdgeId) -> impl Iterator<Item = Coordinate> {
        self.edge_properties
            .get(&edge.undirected())
            .into_iter()
            .flat_map(move |EdgeProperties { geometry, .. }| {
                let geometry = geometry.coords().map(|coordinate| Coordinate {
                    lon: coordinate.x,
                    lat: coordinate.y,
                });

                let geometry: Box<dyn Iterator<Item = Coordinate>> = if edge.is_reversed() {
                    Box::new(geometry.rev())
                } else {
                    Box::new(geometry)
                };

                geometry
            })
    }

    fn vertex_exiting_edges(
        &self,
        vertex: Self::VertexId,
    ) -> impl Iterator<Item = (Self::EdgeId, Self::VertexId)> {
        let mut edges: Vec<_> = self
            .network
            .out_neighbors_with_values(vertex.index())
            .map(|item| (item.value, VertexId(item.target as i64)))
            .collect();

        edges.sort();
        edges.into_iter()
    }

    fn vertex_entering_edges(
        &self,
        vertex: Self::VertexId,
    ) -> impl Iterator<Item = (Self::EdgeId, Self::VertexId)> {
        let mut edges: Vec<_> = self
            .network
            .in_neighbors_with_values(vertex.index())
            .map(|item| (item.value, VertexId(item.target as i64)))
            .collect();

        edges.sort();
        edges.into_iter()
    }

    fn nearest_vertices_within_distance(
        &self,
        coordinate: Coordinate,
        max_distance: Length,
    ) -> impl Iterator<Item = (Self::VertexId, Length)> {
        let max_distance_2 = max_distance.meters() * max_distance.meters();
        let point = geo::Point::new(coordinate.lon, coordinate.lat);

        self.geospatial_nodes
            .nearest_neighbor_iter_with_distance_2(&point)
            .take_while(move |(_, distance_2)| *distance_2 <= max_distance_2)
            .map(|(node, distance_2)| {
                let length = Length::from_meters(distance_2.sqrt());
                (node.vertex, length)
            })
    }
}

impl NetworkGraph {
    fn from_geojson_graph(graph: &GeojsonGraph) -> NetworkGraph {
        let edge_properties = graph
            .lines
            .iter()
            .map(|(&line_id, line)| {
                let property = EdgeProperties {
                    length: line.length,
                    tags: line.tags.clone(),
                    geometry: line.geometry.clone(),
                    vertices: [VertexId(line.start_id), VertexId(line.end_id)],
                };

                (EdgeId(line_id), property)
            })
            .collect();

        let network_edges: Vec<(usize, usize, EdgeId)> = graph
            .nodes
            .iter()
            .flat_map(|(&from_id, node)| {
                let from_id: usize = from_id.try_into().unwrap();
                node.outgoing_lines.iter().map(move |&(line_id, to_id)| {
                    let to_id: usize = to_id.try_into().unwrap();
                    (from_id, to_id, EdgeId(line_id))
                })
            })
            .collect();

        let geospatial_nodes: Vec<GeospatialNode> = graph
            .nodes
            .iter()
            .map(|(&node_id, node)| GeospatialNode {
                vertex: VertexId(node_id),
                location: node.location,
            })
            .collect();

        let vertices = graph
            .nodes
            .iter()
            .map(|(&node_id, node)| (VertexId(node_id), node.location))
            .collect();

        NetworkGraph {
            network: graph::prelude::GraphBuilder::new()
                .edges_with_values(network_edges)
                .build(),
            geospatial_nodes: rstar::RTree::bulk_load(geospatial_nodes),
            vertices,
            edge_properties,
        }
    }
}

#[test]
fn network_graph_edge_bearing() {
    let graph = &NETWORK_GRAPH;
    let distance = Length::from_meters(20.0);

    assert_eq!(
        graph.get_edge_bearing(EdgeId(1), distance),
        Some(Bearing::from_degrees(90))
    );
    assert_eq!(
        graph.get_edge_bearing(EdgeId(-1), distance),
        Some(Bearing::from_degrees(270))
    );
    assert_eq!(
        graph.get_edge_bearing(EdgeId(4), distance),
        Some(Bearing::from_degrees(0))
    );
    assert_eq!(
        graph.get_edge_bearing(EdgeId(5), distance),
        Some(Bearing::from_degrees(72))
    );
    assert_eq!(
        graph.get_edge_reverse_bearing(EdgeId(5), distance),
        Some(Bearing::from_degrees(288))
    );
    assert_eq!(
        graph.get_edge_reverse_bearing(EdgeId(1), distance),
        Some(Bearing::from_degrees(270))
    );
    assert_eq!(graph.get_edge_bearing(EdgeId(100), distance), None);
}

#[test]
fn network_graph_edge_vertices() {
    let graph = &NETWORK_GRAPH;

    assert_eq!(graph.get_edge_start_vertex(EdgeId(-1)), Some(VertexId(2)));
    assert_eq!(graph.get_edge_end_vertex(EdgeId(-1)), Some(VertexId(1)));
    assert_eq!(
        graph.get_edge_start_vertex(EdgeId(-4)).unwrap(),
        graph.get_edge_end_vertex(EdgeId(4)).unwrap()
    );

    assert_eq!(
        graph.vertex_exiting_edges(VertexId(1)).collect::<Vec<_>>(),
        [(EdgeId(1), VertexId(2))]
    );
    assert_eq!(
        graph.vertex_exiting_edges(VertexId(2)).collect::<Vec<_>>(),
        [
            (EdgeId(-1), VertexId(1)),
            (EdgeId(2), VertexId(3)),
            (EdgeId(4), VertexId(4))
        ]
    );
    assert_eq!(
        graph.vertex_entering_edges(VertexId(2)).collect::<Vec<_>>(),
        [
            (EdgeId(-4), VertexId(4)),
            (EdgeId(-2), VertexId(3)),
            (EdgeId(1), VertexId(1)),
            (EdgeId(7), VertexId(7))
        ]
    );
    assert_eq!(graph.vertex_entering_edges(VertexId(7)).count(), 0);
    assert_eq!(graph.vertex_exiting_edges(VertexId(10)).count(), 0);
}

#[test]
fn network_graph_edge_properties() {
    let graph = &NETWORK_GRAPH;

    assert_eq!(graph.get_edge_length(EdgeId(1)), Some(Length::from_meters(139.0)));
    assert_eq!(graph.get_edge_length(EdgeId(-1)), Some(Length::from_meters(139.0)));
    assert_eq!(graph.get_edge_length(EdgeId(5)), Some(Length::from_meters(146.0)));
    assert_eq!(graph.get_edge_length(EdgeId(100)), None);

    let tags = graph.get_edge_tags(EdgeId(-4)).unwrap();
    assert!(tags.has("highway", "residential"));
    assert!(graph.get_edge_tags(EdgeId(9)).unwrap().has("highway", "construction"));

    assert_eq!(
        graph.get_vertex_coordinate(VertexId(5)),
        Some(Coordinate {
            lon: 4.4040,
            lat: 51.2010
        })
    );
    assert_eq!(graph.get_vertex_coordinate(VertexId(100)), None);
}

#[test]
fn network_graph_edge_coordinates() {
    let graph = &NETWORK_GRAPH;

    assert_eq!(
        graph.get_edge_coordinates(EdgeId(5)).collect::<Vec<_>>(),
        [
            Coordinate {
                lon: 4.4020,
                lat: 51.2010
            },
            Coordinate {
                lon: 4.4030,
                lat: 51.2012
            },
            Coordinate {
                lon: 4.4040,
                lat: 51.2010
            }
        ]
    );

    assert_eq!(
        graph.get_edge_coordinates(EdgeId(-1)).collect::<Vec<_>>(),
        [
            Coordinate {
                lon: 4.4020,
                lat: 51.2000
            },
            Coordinate {
                lon: 4.4000,
                lat: 51.2000
            }
        ]
    );

    assert_eq!(graph.get_edge_coordinates(EdgeId(100)).count(), 0);
}

#[test]
fn network_graph_nearest_vertices() {
    let graph = &NETWORK_GRAPH;

    let coordinate = Coordinate {
        lon: 4.4021,
        lat: 51.2001,
    };

    const MAX_DISTANCE: Length = Length::from_meters(140.0);

    let neighbours: Vec<VertexId> = graph
        .nearest_vertices_within_distance(coordinate, MAX_DISTANCE)
        .map(|(vertex, distance)| {
            assert!(distance <= MAX_DISTANCE);
            vertex
        })
        .collect();

    assert_eq!(
        neighbours,
        [VertexId(2), VertexId(4), VertexId(7), VertexId(3)]
    );

    let far = Coordinate {
        lon: 4.5000,
        lat: 51.3000,
    };
    assert_eq!(
        graph
            .nearest_vertices_within_distance(far, MAX_DISTANCE)
            .count(),
        0
    );
}
