//! The OpenLR encoder generates a map-independent location reference for a (map-dependent)
//! location.
//!
//! 1. Check validity of the location and trim the lines covered by the offsets.
//! 2. Cover the location with a concatenation of shortest paths.
//! 3. Create a location reference point at the start of each shortest path, and a last one at
//!    the end of the location.
//! 4. Create the physical representation of the location reference.

mod line;
pub mod lrp;
pub mod resolver;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::encoder::line::{encode_closed_line, encode_line, encode_poi, encode_point_along_line};
use crate::{
    DirectedGraph, EncodeError, Length, Location, LocationReference, RoadClassifier,
    serialize_binary_openlr,
};

#[derive(Debug, Clone, Copy)]
pub struct EncoderConfig {
    /// The maximum distance allowed between consecutive LRPs.
    pub max_lrp_distance: Length,
    /// The length of the segment used to compute the lines bearing (distance from the start of
    /// the segment to its end).
    pub bearing_distance: Length,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        // The smaller the max LRP distance the higher the offsets precision, however more LRPs
        // make the location reference longer and give the decoder more routes to resolve.
        const DEFAULT_MAX_LRP_DISTANCE: Length = Length::from_meters(4000.0);
        debug_assert!(DEFAULT_MAX_LRP_DISTANCE <= Length::MAX_BINARY_LRP_DISTANCE);

        Self {
            max_lrp_distance: DEFAULT_MAX_LRP_DISTANCE,
            bearing_distance: Length::from_meters(20.0),
        }
    }
}

/// Encodes an OpenLR Location Reference into Base64.
pub fn encode_base64_openlr<G: DirectedGraph, C: RoadClassifier>(
    config: &EncoderConfig,
    graph: &G,
    classifier: &C,
    location: Location<G::EdgeId>,
) -> Result<String, EncodeError> {
    let data = encode_binary_openlr(config, graph, classifier, location)?;
    Ok(BASE64_STANDARD.encode(data))
}

/// Encodes an OpenLR Location Reference into binary.
pub fn encode_binary_openlr<G: DirectedGraph, C: RoadClassifier>(
    config: &EncoderConfig,
    graph: &G,
    classifier: &C,
    location: Location<G::EdgeId>,
) -> Result<Vec<u8>, EncodeError> {
    let location = encode_location(config, graph, classifier, location)?;

    // Step – 4 Create physical representation of the location reference.
    serialize_binary_openlr(&location).map_err(EncodeError::SerializeError)
}

/// Encodes the location into its (logical) location reference.
pub fn encode_location<G: DirectedGraph, C: RoadClassifier>(
    config: &EncoderConfig,
    graph: &G,
    classifier: &C,
    location: Location<G::EdgeId>,
) -> Result<LocationReference, EncodeError> {
    use LocationReference::*;
    let location = match location {
        Location::Line(line) => Line(encode_line(config, graph, classifier, line)?),
        Location::PointAlongLine(point) => {
            PointAlongLine(encode_point_along_line(config, graph, classifier, point)?)
        }
        Location::Poi(poi) => Poi(encode_poi(config, graph, classifier, poi)?),
        Location::ClosedLine(line) => {
            ClosedLine(encode_closed_line(config, graph, classifier, line)?)
        }
        Location::GeoCoordinate(coordinate) => GeoCoordinate(coordinate),
        Location::Circle(circle) => Circle(circle),
        Location::Rectangle(rectangle) => Rectangle(rectangle),
        Location::Grid(grid) => Grid(grid),
        Location::Polygon(polygon) => Polygon(polygon),
    };

    Ok(location)
}
