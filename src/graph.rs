use std::fmt::Debug;
use std::hash::Hash;

use crate::{Bearing, Coordinate, Length, Tags};

/// Directed graph.
/// Exposes the behavior of a Geospatial Index and of a Road Network Graph.
/// Should be implemented by the graph that represents the map the decoder and encoder run on.
/// The graph is only read, implementations that are `Sync` can be shared by concurrent
/// decoding and encoding calls.
pub trait DirectedGraph {
    /// Uniquely identify a vertex that belongs to the graph.
    type VertexId: Debug + Copy + Ord + Hash;
    /// Uniquely identify a directed edge that belongs to the graph.
    type EdgeId: Debug + Copy + Ord + Hash;

    /// Gets the vertex coordinate.
    fn get_vertex_coordinate(&self, vertex: Self::VertexId) -> Option<Coordinate>;

    /// Gets the start vertex of the directed edge.
    fn get_edge_start_vertex(&self, edge: Self::EdgeId) -> Option<Self::VertexId>;

    /// Gets the end vertex of the directed edge.
    fn get_edge_end_vertex(&self, edge: Self::EdgeId) -> Option<Self::VertexId>;

    /// Gets the total length of the directed edge.
    fn get_edge_length(&self, edge: Self::EdgeId) -> Option<Length>;

    /// Gets the descriptive tags of the edge.
    fn get_edge_tags(&self, edge: Self::EdgeId) -> Option<&Tags>;

    /// Gets the geometry of the directed edge, from its start vertex to its end vertex.
    fn get_edge_coordinates(&self, edge: Self::EdgeId) -> impl Iterator<Item = Coordinate>;

    /// Gets an iterator over all the outgoing edges from the given vertex.
    /// For each edge returns the edge ID and the edge end vertex.
    fn vertex_exiting_edges(
        &self,
        vertex: Self::VertexId,
    ) -> impl Iterator<Item = (Self::EdgeId, Self::VertexId)>;

    /// Gets an iterator over all the incoming edges to the given vertex.
    /// For each edge returns the edge ID and the edge start vertex.
    fn vertex_entering_edges(
        &self,
        vertex: Self::VertexId,
    ) -> impl Iterator<Item = (Self::EdgeId, Self::VertexId)>;

    /// Gets an iterator over all the vertices that are within a max distance (inclusive) from the
    /// coordinate. For each vertex also returns the distance from the coordinate.
    /// Vertices must be returned sorted by their distance to the coordinate.
    /// Returns an empty iterator if no vertex can be found within max distance.
    fn nearest_vertices_within_distance(
        &self,
        coordinate: Coordinate,
        max_distance: Length,
    ) -> impl Iterator<Item = (Self::VertexId, Length)>;

    /// Gets the bearing of the first section of the edge, from its start vertex to the point
    /// of the geometry at the given distance.
    fn get_edge_bearing(&self, edge: Self::EdgeId, distance: Length) -> Option<Bearing> {
        bearing_along(self.get_edge_coordinates(edge), distance)
    }

    /// Gets the bearing of the last section of the edge, from its end vertex back to the point
    /// of the geometry at the given distance.
    fn get_edge_reverse_bearing(&self, edge: Self::EdgeId, distance: Length) -> Option<Bearing> {
        let mut coordinates: Vec<_> = self.get_edge_coordinates(edge).collect();
        coordinates.reverse();
        bearing_along(coordinates.into_iter(), distance)
    }
}

/// Bearing from the first coordinate of the polyline to the coordinate found after walking
/// the given distance along it, or to the last coordinate if the polyline is shorter.
fn bearing_along(
    mut coordinates: impl Iterator<Item = Coordinate>,
    distance: Length,
) -> Option<Bearing> {
    let start = coordinates.next()?;
    let mut previous = start;
    let mut walked = Length::ZERO;
    let mut end = start;

    for coordinate in coordinates {
        let segment = previous.distance(&coordinate);
        if walked + segment >= distance && !segment.is_zero() {
            let ratio = (distance - walked).meters() / segment.meters();
            end = previous.interpolate(&coordinate, ratio);
            break;
        }

        walked += segment;
        previous = coordinate;
        end = coordinate;
    }

    if end == start {
        return None;
    }

    Some(Bearing::from_angle(start.bearing(&end)))
}

pub mod path;
