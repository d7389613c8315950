use std::collections::HashMap;
use std::sync::LazyLock;

use geo::CoordsIter;
use geojson::{Feature, FeatureCollection, Value};
use openlr_referenced::{Coordinate, Length, Tags};

pub static GEOJSON_GRAPH: LazyLock<GeojsonGraph> = LazyLock::new(|| {
    let geojson = include_str!("../data/network.geojson");
    GeojsonGraph::parse_geojson(geojson)
});

type NodeId = i64;

/// Identify a directed line (negative value represent a reversed edge).
type LineId = i64;

#[derive(Debug, Default)]
pub struct GeojsonGraph {
    pub nodes: HashMap<NodeId, Node>,
    pub lines: HashMap<LineId, Line>,
}

#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub location: Coordinate,
    pub outgoing_lines: Vec<(LineId, NodeId)>,
}

#[derive(Debug)]
pub struct Line {
    pub id: LineId,
    pub start_id: NodeId,
    pub end_id: NodeId,
    pub length: Length,
    pub tags: Tags,
    pub geometry: geo::LineString,
}

impl GeojsonGraph {
    fn parse_geojson(geojson: &str) -> Self {
        let FeatureCollection { features, .. } = geojson.parse().unwrap();

        let mut graph = GeojsonGraph::default();

        for Feature {
            geometry,
            properties,
            ..
        } in &features
        {
            let geometry = geometry.as_ref().unwrap();
            let properties = properties.as_ref().unwrap();

            if let Value::Point(point) = &geometry.value {
                let id = properties.get("id").unwrap().as_i64().unwrap();

                let location = Coordinate {
                    lon: point[0],
                    lat: point[1],
                };

                graph.nodes.insert(
                    id,
                    Node {
                        id,
                        location,
                        outgoing_lines: vec![],
                    },
                );
            }
        }

        for Feature {
            geometry,
            properties,
            ..
        } in features
        {
            let geometry = geometry.as_ref().unwrap();
            let properties = properties.as_ref().unwrap();

            if let Value::LineString(lines) = &geometry.value {
                let id = properties.get("id").unwrap().as_i64().unwrap();
                let start_id = properties.get("startId").unwrap().as_i64().unwrap();
                let end_id = properties.get("endId").unwrap().as_i64().unwrap();
                let length = properties.get("length").unwrap().as_i64().unwrap() as f64;
                let highway = properties.get("highway").unwrap().as_str().unwrap();
                let oneway = properties.get("oneway").unwrap().as_bool().unwrap();

                let geometry = lines
                    .iter()
                    .map(|line| geo::coord! { x: line[0], y: line[1] });

                let node = graph.nodes.get_mut(&start_id).unwrap();
                node.outgoing_lines.push((id, end_id));

                if !oneway && start_id != end_id {
                    // both directions
                    let node = graph.nodes.get_mut(&end_id).unwrap();
                    node.outgoing_lines.push((-id, start_id));
                }

                graph.lines.insert(
                    id,
                    Line {
                        id,
                        start_id,
                        end_id,
                        length: Length::from_meters(length),
                        tags: Tags::from([("highway", highway)]),
                        geometry: geo::LineString::from_iter(geometry),
                    },
                );
            }
        }

        graph
    }
}

#[test]
fn geojson_graph_line_attributes() {
    let graph = &GEOJSON_GRAPH;

    let line = graph.lines.get(&1).unwrap();
    assert_eq!(line.id, 1);
    assert_eq!(line.start_id, 1);
    assert_eq!(line.end_id, 2);
    assert_eq!(line.length, Length::from_meters(139.0));
    assert_eq!(line.tags.get("highway"), Some("primary"));
    assert_eq!(line.geometry.coords_count(), 2);

    let line = graph.lines.get(&5).unwrap();
    assert_eq!(line.id, 5);
    assert_eq!(line.start_id, 4);
    assert_eq!(line.end_id, 5);
    assert_eq!(line.length, Length::from_meters(146.0));
    assert_eq!(line.tags.get("highway"), Some("residential"));
    assert_eq!(line.geometry.coords_count(), 3);
}

#[test]
fn geojson_graph_node_attributes() {
    let graph = &GEOJSON_GRAPH;

    let node = graph.nodes.get(&1).unwrap();
    assert_eq!(node.id, 1);
    assert_eq!(node.location.lon, 4.4);
    assert_eq!(node.location.lat, 51.2);
    assert_eq!(node.outgoing_lines, vec![(1, 2)]);

    let node = graph.nodes.get(&2).unwrap();
    assert_eq!(node.outgoing_lines, vec![(-1, 1), (2, 3), (4, 4)]);

    let node = graph.nodes.get(&5).unwrap();
    assert_eq!(node.outgoing_lines, vec![(6, 3)]);

    let node = graph.nodes.get(&10).unwrap();
    assert!(node.outgoing_lines.is_empty());
}
