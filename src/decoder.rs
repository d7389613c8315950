//! The decoder resolves a (map-dependent) location using its own map.
//! This map might differ from the one used during encoding.
//!
//! 1. Decode physical data and check its validity.
//! 2. For each location reference point find candidate vertices.
//! 3. Determine and rate candidate routes between two subsequent location reference points.
//! 4. Select the best routes, consistent with each other.
//! 5. Concatenate the routes to form the location and trim path according to the offsets.

pub mod candidates;
mod line;
pub mod resolver;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::decoder::line::{decode_closed_line, decode_line, decode_poi, decode_point_along_line};
use crate::error::DecodeError;
use crate::{
    DeserializeError, DirectedGraph, Length, Location, LocationReference, RoadClassifier,
    deserialize_binary_openlr,
};

/// Scoring function applied to every candidate route found between two LRPs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteScoring {
    /// Any route found is equally good.
    Feasibility,
    /// Routes are rated by how well they agree with the bearing, distance and attributes
    /// described by the LRPs.
    #[default]
    Hints,
}

#[derive(Debug, Clone, Copy)]
pub struct DecoderConfig {
    /// Maximum distance from the LRP to the vertices of the graph that will be considered.
    pub max_node_distance: Length,
    /// The length of the segment used to compute the lines bearing (distance from the start of
    /// the segment to its end).
    pub bearing_distance: Length,
    /// Variance allowed to the resolver when computing distance between LRPs.
    pub next_point_variance: Length,
    /// Number of classes a route is allowed to fall below the lowest FRC to next point.
    pub frc_variance: u8,
    pub scoring: RouteScoring,
    /// Bearing weight applied by the hints scoring.
    pub bearing_weight: f64,
    /// Distance weight applied by the hints scoring.
    pub distance_weight: f64,
    /// Attributes (FRC and FOW) weight applied by the hints scoring.
    pub attribute_weight: f64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_node_distance: Length::from_meters(20.0),
            bearing_distance: Length::from_meters(20.0),
            next_point_variance: Length::from_meters(150.0),
            frc_variance: 2,
            scoring: RouteScoring::Hints,
            bearing_weight: 1.0,
            distance_weight: 1.0,
            attribute_weight: 1.0,
        }
    }
}

/// Decodes an OpenLR Location Reference encoded in Base64.
pub fn decode_base64_openlr<G: DirectedGraph, C: RoadClassifier>(
    config: &DecoderConfig,
    graph: &G,
    classifier: &C,
    data: impl AsRef<[u8]>,
) -> Result<Location<G::EdgeId>, DecodeError> {
    let data = BASE64_STANDARD
        .decode(data)
        .map_err(DeserializeError::from)?;
    decode_binary_openlr(config, graph, classifier, &data)
}

/// Decodes an OpenLR Location Reference encoded in binary.
pub fn decode_binary_openlr<G: DirectedGraph, C: RoadClassifier>(
    config: &DecoderConfig,
    graph: &G,
    classifier: &C,
    data: &[u8],
) -> Result<Location<G::EdgeId>, DecodeError> {
    // Step – 1 Decode physical data and check its validity
    let location = deserialize_binary_openlr(data)?;

    use LocationReference::*;
    let location = match location {
        Line(line) => Location::Line(decode_line(config, graph, classifier, line)?),
        PointAlongLine(point) => {
            Location::PointAlongLine(decode_point_along_line(config, graph, classifier, point)?)
        }
        Poi(poi) => Location::Poi(decode_poi(config, graph, classifier, poi)?),
        ClosedLine(line) => {
            Location::ClosedLine(decode_closed_line(config, graph, classifier, line)?)
        }
        GeoCoordinate(coordinate) => Location::GeoCoordinate(coordinate),
        Circle(circle) => Location::Circle(circle),
        Rectangle(rectangle) => Location::Rectangle(rectangle),
        Grid(grid) => Location::Grid(grid),
        Polygon(polygon) => Location::Polygon(polygon),
    };

    Ok(location)
}
